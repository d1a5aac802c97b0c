//! Stats provider integration
//!
//! [`RateLimitedApiClient`] talks to the provider over HTTP Basic auth,
//! paced by a shared [`RateLimiter`]. Responses are validated into the typed
//! payloads in [`models`] before anything downstream sees them.

pub mod client;
pub mod models;
pub mod params;
pub mod rate_limit;

pub use client::RateLimitedApiClient;
pub use params::QueryParams;
pub use rate_limit::RateLimiter;
