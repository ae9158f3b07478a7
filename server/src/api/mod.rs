//! API server and routes

pub mod auth;
pub mod extractors;
pub mod fallback;
pub mod middleware;
pub mod openapi;
pub mod routes;
mod server;
#[cfg(test)]
pub mod test_support;
pub mod types;

pub use server::{ApiServer, GatewayState, build_router};
