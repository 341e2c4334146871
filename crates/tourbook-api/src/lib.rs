//! # Tourbook API
//! 
//! HTTP handlers, session middleware, response envelope and router.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::{AppState, Gateways, StateSettings};
