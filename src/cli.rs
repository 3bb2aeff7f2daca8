//! Command-line interface.
//!
//! ```bash
//! audiocfg ./public/audio
//! audiocfg ./public/audio --normalizer /opt/loudness/audio_normalizer
//! audiocfg --dump-config > ~/.config/audiocfg/config.toml
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Scan genre folders, normalize loudness and write the player's audio config.
#[derive(Debug, Parser)]
#[command(name = "audiocfg")]
#[command(version)]
pub struct Cli {
    /// Audio root containing the genre folders (defaults to the current directory)
    pub root: Option<PathBuf>,

    /// Loudness normalizer executable (overrides `normalizer.path`)
    #[arg(long, value_name = "PATH")]
    pub normalizer: Option<PathBuf>,

    /// Skip loudness normalization for this run
    #[arg(long, conflicts_with = "normalizer")]
    pub no_normalize: bool,

    /// Config document name inside the audio root (overrides `output.file_name`)
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<String>,

    /// Print the effective settings as TOML and exit
    #[arg(long)]
    pub dump_config: bool,
}
