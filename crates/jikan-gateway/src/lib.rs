//! Rate-limited gateway to the Jikan anime catalog API.
//!
//! All outbound calls go through a single [`JikanGateway`], which keeps
//! dispatches at least a minimum interval apart, grants pacing turns in
//! call order and retries once on HTTP 429.

pub mod api;
pub mod feed;
pub mod format;

pub use api::{Endpoint, GatewayError, JikanGateway, JikanGatewayBuilder, Pacer};
