//! HTTP layer: router, auth middleware and handlers

pub mod generate;
pub mod middleware;
pub mod routes;

pub use routes::build_router;
