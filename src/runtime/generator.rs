use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{error, info, warn};

use crate::config::Settings;
use crate::library::{ConfigDocument, GenreEntry, find_genre_folders, process_genre_folder};
use crate::normalize::Normalizer;
use crate::output::{self, SaveError};

/// One pass over an audio root: scan, normalize, describe, write.
pub struct Generator {
    root: PathBuf,
    settings: Settings,
    normalizer: Box<dyn Normalizer>,
}

/// What a run produced, for the closing report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub genres: usize,
    pub tracks: usize,
    /// Whether a document landed on disk (even one that then failed validation).
    pub written: bool,
    pub config_path: PathBuf,
    pub backup_path: Option<PathBuf>,
}

impl Generator {
    pub fn new(root: impl Into<PathBuf>, settings: Settings, normalizer: Box<dyn Normalizer>) -> Self {
        Self {
            root: root.into(),
            settings,
            normalizer,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(&self.settings.output.file_name)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.root.join(self.settings.output.backup_name())
    }

    /// Build the document in memory. Nothing is written.
    pub fn generate(&self) -> Result<ConfigDocument> {
        let mut document = ConfigDocument::new();

        for folder in find_genre_folders(&self.root, &self.settings.library.genres)? {
            let genre = &folder.genre;
            info!("processing genre: {} ({})", genre.name, folder.folder_name);

            let tracks = process_genre_folder(&folder, &self.settings, self.normalizer.as_ref())
                .with_context(|| format!("failed to process {}", folder.path.display()))?;
            if tracks.is_empty() {
                info!("  no audio files found");
                continue;
            }
            info!("  added {} tracks", tracks.len());

            let entry = GenreEntry {
                id: genre.id.clone(),
                genre_name: genre.name.clone(),
                album_cover: self.settings.output.album_cover(&genre.id),
                tracks,
            };
            if document.insert(genre.id.clone(), entry).is_some() {
                warn!(
                    "genre {} matched more than one folder, keeping {}",
                    genre.id, folder.folder_name
                );
            }
        }

        Ok(document)
    }

    /// Back up the previous document, generate a new one and save it.
    ///
    /// Save and validation failures are logged, not returned; anything else
    /// aborts the run.
    pub fn run(&self) -> Result<RunSummary> {
        let config_path = self.config_path();
        let backup_path = self.backup_path();

        info!("target directory: {}", self.root.display());
        info!("config file: {}", config_path.display());
        if self.normalizer.is_available() {
            info!("audio normalizer found");
        }

        let backed_up = output::backup_existing(&config_path, &backup_path)
            .with_context(|| format!("failed to back up {}", config_path.display()))?;
        if backed_up {
            info!("backed up existing config to {}", backup_path.display());
        }

        let document = self.generate()?;
        let tracks = document.values().map(|g| g.tracks.len()).sum();

        let written = if document.is_empty() {
            warn!("no audio files found or processed");
            false
        } else {
            match output::save_document(&document, &config_path) {
                Ok(()) => true,
                Err(e @ SaveError::Validate { .. }) => {
                    error!("{e}");
                    true
                }
                Err(e) => {
                    error!("error saving config: {e}");
                    false
                }
            }
        };

        Ok(RunSummary {
            genres: document.len(),
            tracks,
            written,
            config_path,
            backup_path: backed_up.then_some(backup_path),
        })
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.genres == 0 {
            return writeln!(f, "No audio files found or processed");
        }
        writeln!(f, "Generated config with {} genres", self.genres)?;
        writeln!(f, "Total tracks: {}", self.tracks)?;
        if self.written {
            writeln!(f, "Config file: {}", self.config_path.display())?;
        } else {
            writeln!(f, "Config file was not written, see errors above")?;
        }
        if let Some(backup) = &self.backup_path {
            writeln!(f, "Backup: {}", backup.display())?;
        }
        Ok(())
    }
}
