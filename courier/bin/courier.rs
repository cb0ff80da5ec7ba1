#![deny(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::must_use_candidate)]

#[cfg(not(any(target_os = "macos", unix)))]
compile_error!("Only macos and unix are currently supported");

use clap::Parser;
use courier::{
    config::{self, Config},
    controller::Courier,
};

/// Delayed SMTP submission agent
#[derive(Parser, Debug)]
#[command(name = "courier")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Run with the built-in defaults when no configuration file is found
    #[arg(long)]
    defaults: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match config::find_config_file() {
        Ok(path) => Config::load(&path)?,
        Err(config::ConfigError::NotFound { .. }) if cli.defaults => Config::default(),
        Err(e) => return Err(e.into()),
    };

    Courier::new(config).run().await
}
