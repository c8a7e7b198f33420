pub mod favorite;
pub mod place;
pub mod planned_route;
pub mod rating;
pub mod user;
