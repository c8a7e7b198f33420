pub mod auth;
pub mod contracts;
pub mod error;
pub mod favorites;
pub mod jwt;
pub mod password;
pub mod places;
pub mod planned_routes;
pub mod ratings;
pub mod translator;
