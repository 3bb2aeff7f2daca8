use std::env;

use anyhow::{Context, Result};

use crate::cli::Cli;

mod generator;
mod settings;
mod startup;

pub use generator::Generator;

pub fn run(cli: Cli) -> Result<()> {
    let mut settings = settings::load_settings();
    startup::apply_overrides(&mut settings, &cli);

    if cli.dump_config {
        print!("{}", toml::to_string_pretty(&settings)?);
        return Ok(());
    }

    let root = match &cli.root {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("failed to resolve the current directory")?,
    };

    let normalizer = startup::build_normalizer(&settings, &cli);
    let generator = Generator::new(root, settings, normalizer);
    let summary = generator.run()?;

    print!("{summary}");
    Ok(())
}
