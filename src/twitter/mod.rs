//! Upstream API client for post lookups.
//!
//! - [`client`]: guest credential handling and the lookup call
//! - [`normalize`]: envelope to [`CanonicalPost`] mapping
//! - [`error`]: the error taxonomy every lookup returns
//! - [`models`] / [`constants`]: the upstream wire contract

pub mod client;
pub mod constants;
pub mod error;
pub mod models;
pub mod normalize;

pub use client::{ClientOptions, LookupClient};
pub use error::{ErrorCode, LookupResult, UpstreamError};
pub use normalize::{CanonicalPost, Media, MediaKind};
