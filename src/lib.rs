//! xcard: link-preview proxy for X posts.
//!
//! Link-preview bots get a small HTML document with Open Graph tags built
//! from the post's metadata; everyone else is redirected to the post.
//!
//! - [`twitter`]: guest-authenticated upstream client and response normalizer
//! - [`render`]: escaping and the preview document
//! - [`server`]: axum router deciding between redirect and preview
//! - [`config`], [`logging`], [`cli`]: process plumbing

pub mod cli;
pub mod config;
pub mod logging;
pub mod render;
pub mod server;
pub mod twitter;
