//! Jikan API v4 gateway implementation.
//!
//! This module provides a paced, retry-once gateway for the Jikan API
//! (MyAnimeList unofficial API) together with its endpoint and response
//! types.

pub mod client;
pub mod endpoint;
pub mod error;
pub mod rate_limiter;
pub mod types;

pub use client::{JikanGateway, JikanGatewayBuilder};
pub use endpoint::Endpoint;
pub use error::GatewayError;
pub use rate_limiter::Pacer;
pub use types::*;
