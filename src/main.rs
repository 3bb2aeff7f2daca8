//! # audiocfg
//!
//! Scans an audio root laid out as one folder per genre, optionally runs an
//! external loudness normalizer over each source file, and writes the JSON
//! track list a front-end player reads.
//!
//! Logging goes through `env_logger` and defaults to `info`; set `RUST_LOG`
//! to change it (e.g. `RUST_LOG=debug audiocfg ./audio`).

use clap::Parser;
use log::error;

mod cli;
mod config;
mod library;
mod normalize;
mod output;
mod runtime;

#[cfg(test)]
mod test_support;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = cli::Cli::parse();

    if let Err(e) = runtime::run(cli) {
        error!("error during execution: {e:#}");
        return Err(e);
    }
    Ok(())
}
