//! External service interactions
//!
//! - Generator backend HTTP client
//! - Background request execution
//! - Saving downloaded archives

pub mod api;
pub mod content_disposition;
pub mod download;
pub mod request_runner;
