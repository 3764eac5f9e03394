// src/api/mod.rs
mod response;
mod routes;

pub use response::ApiError;
pub use routes::Api;
