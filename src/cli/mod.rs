//! CLI subcommand definitions and handlers.
//!
//! - `start` (default) -- run the preview proxy
//! - `lookup <id>` -- run one upstream lookup and print the result
//! - `version` -- print build/version info

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::{self, Config};
use crate::twitter::{CanonicalPost, LookupClient, LookupResult};

/// Link-preview proxy for X posts.
#[derive(Parser, Debug)]
#[command(
    name = "xcard",
    version = env!("CARGO_PKG_VERSION"),
    about = "Serves Open Graph preview cards for X posts to link-preview bots"
)]
pub struct Cli {
    /// Path to a JSON5 config file (default: $XCARD_CONFIG, then ./xcard.json5 if present).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the preview proxy (default when no subcommand is given).
    Start {
        /// Override the bind address (e.g. 127.0.0.1:8787).
        #[arg(long)]
        bind: Option<String>,
    },

    /// Look up one post upstream and print it as JSON.
    Lookup {
        /// Numeric post identifier.
        id: String,
    },

    /// Print version and build information.
    Version,
}

// ---------------------------------------------------------------------------
// Subcommand handlers
// ---------------------------------------------------------------------------

/// Load configuration for any subcommand.
pub fn load(config_path: Option<&Path>) -> Result<Config, config::ConfigError> {
    config::load_config(config_path)
}

/// Run the `lookup <id>` subcommand. Returns whether the lookup succeeded.
pub async fn handle_lookup(config: &Config, id: &str) -> Result<bool, Box<dyn std::error::Error>> {
    let mut client = LookupClient::new(config.upstream.client_options())?;
    let result = client.get_post_info(id).await;
    println!("{}", format_lookup(&result)?);
    Ok(result.is_ok())
}

/// Pretty JSON for a lookup outcome: the post, or `{ "error": ... }`.
pub fn format_lookup(result: &LookupResult<CanonicalPost>) -> Result<String, serde_json::Error> {
    match result {
        Ok(post) => serde_json::to_string_pretty(post),
        Err(err) => serde_json::to_string_pretty(&serde_json::json!({ "error": err })),
    }
}

/// Run the `version` subcommand.
pub fn handle_version() {
    println!("xcard {}", env!("CARGO_PKG_VERSION"));
    println!("  commit: {}", env!("XCARD_GIT_HASH"));
    println!("  built:  {}", env!("XCARD_BUILD_DATE"));
}
