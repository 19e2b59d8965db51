//! Outbound HTTP helper for calling sibling Orientati services.
//!
//! A single [`UpstreamClient`] is built at startup and shared through the
//! application state. Every call goes through [`UpstreamClient::send`],
//! which normalizes failures into [`UpstreamError`].

pub mod client;
pub mod error;

pub use client::{HttpMethod, UpstreamClient};
pub use error::UpstreamError;
