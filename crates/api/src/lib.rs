//! Solarfy API server library.
//!
//! Exposes config, state, error handling, and the route tree so integration
//! tests and the binary entrypoint build the exact same application.

pub mod auth;
pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod integrations;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
