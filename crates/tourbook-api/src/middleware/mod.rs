//! Request middleware and the session extractors it feeds.

pub mod auth;

pub use auth::{session_middleware, AuthenticatedUser, Session};
