use crate::cli::Cli;
use crate::config;
use crate::normalize::{self, Disabled, Normalizer};

/// Fold command-line overrides into the loaded settings.
pub fn apply_overrides(settings: &mut config::Settings, cli: &Cli) {
    if let Some(path) = &cli.normalizer {
        settings.normalizer.path = Some(path.clone());
    }
    if cli.no_normalize {
        settings.normalizer.path = None;
    }
    if let Some(name) = &cli.output {
        settings.output.file_name = name.clone();
    }
}

pub fn build_normalizer(settings: &config::Settings, cli: &Cli) -> Box<dyn Normalizer> {
    if cli.no_normalize {
        log::info!("normalization disabled on the command line");
        return Box::new(Disabled);
    }
    normalize::from_settings(&settings.normalizer)
}
