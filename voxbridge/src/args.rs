use std::path::PathBuf;

use clap::Parser;

/// Voice message transcription bot
#[derive(Debug, Parser)]
#[command(name = "voxbridge", about = "Telegram voice-to-text bot with transcription provider failover")]
pub struct Args {
    /// Path to configuration file (environment variables alone are enough without one)
    #[arg(short, long, env = "VOXBRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the webhook listen address
    #[arg(long, env = "VOXBRIDGE_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,
}
