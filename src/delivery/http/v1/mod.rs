pub mod auth;
pub mod favorites;
pub mod middleware;
pub mod places;
pub mod ratings;
pub mod routes;
