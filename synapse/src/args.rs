use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Synapse vision caption filter
#[derive(Debug, Parser)]
#[command(
    name = "synapse-vision",
    about = "Replaces image attachments in chat requests with captions from a vision model"
)]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "synapse.toml", env = "SYNAPSE_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "SYNAPSE_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Log filter directives, e.g. `info,synapse_vision=debug`
    #[arg(long, default_value = "info", env = "SYNAPSE_LOG")]
    pub log_filter: String,
}
