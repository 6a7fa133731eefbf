//! Web framework integrations serving the host endpoints.
//!
//! - [`axum`] - router, handlers and request metadata extraction

pub mod axum;
