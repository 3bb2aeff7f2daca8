use std::collections::HashSet;
use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then environment variables
/// (prefix `AUDIOCFG__`) on top of it, and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("AUDIOCFG")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.library.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err("library.extensions must not be empty".to_string());
        }
        if self.library.normalized_prefix.is_empty() {
            return Err("library.normalized_prefix must not be empty".to_string());
        }
        if self.output.file_name.trim().is_empty() {
            return Err("output.file_name must not be empty".to_string());
        }
        if !self.output.album_cover_template.contains("{id}") {
            return Err("output.album_cover_template must contain {id}".to_string());
        }

        let mut seen = HashSet::new();
        for genre in &self.library.genres {
            if !seen.insert(genre.folder.to_lowercase()) {
                return Err(format!("library.genres: duplicate folder {:?}", genre.folder));
            }
        }
        Ok(())
    }
}

/// Resolve the config path from `AUDIOCFG_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("AUDIOCFG_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/audiocfg/config.toml`
/// or `~/.config/audiocfg/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".config"))
    } else {
        None
    };

    config_home.map(|d| d.join("audiocfg").join("config.toml"))
}
