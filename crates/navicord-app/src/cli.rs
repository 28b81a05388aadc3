use std::path::PathBuf;

use clap::Parser;

/// navicord: shows what your music server is playing as a "Listening to" presence.
///
/// Reads now-playing updates as JSON lines on stdin.
#[derive(Parser, Debug)]
#[command(name = "navicord", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log filter override (e.g. "navicord=debug").
    #[arg(long)]
    pub log_level: Option<String>,

    /// Load and validate the configuration, print it as JSON, and exit.
    #[arg(long)]
    pub check_config: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
