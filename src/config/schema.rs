use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level generator settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/audiocfg/config.toml` or `~/.config/audiocfg/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `AUDIOCFG__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub artists: ArtistSettings,
    pub normalizer: NormalizerSettings,
    pub output: OutputSettings,
}

/// One row of the genre table: a folder name mapped to an id and a label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GenreMapping {
    /// Folder name, matched case-insensitively.
    pub folder: String,
    pub id: String,
    pub name: String,
}

impl GenreMapping {
    fn new(folder: &str, id: &str, name: &str) -> Self {
        Self {
            folder: folder.to_string(),
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Filename prefix that marks the output of a previous normalization.
    pub normalized_prefix: String,
    /// Substrings that flag a track as a hit when found in its display name.
    pub hit_markers: Vec<String>,
    /// Folder name -> (genre id, genre label).
    pub genres: Vec<GenreMapping>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: ["mp3", "wav", "flac", "ogg", "m4a", "aiff", "au"]
                .into_iter()
                .map(String::from)
                .collect(),
            normalized_prefix: "normalized_".to_string(),
            hit_markers: ["hit", "人気", "popular", "best"]
                .into_iter()
                .map(String::from)
                .collect(),
            genres: vec![
                GenreMapping::new("idol", "idol", "IDOL"),
                GenreMapping::new("pop", "jpop", "J-POP"),
                GenreMapping::new("rock", "jrock", "J-ROCK"),
                GenreMapping::new("orchestra", "orchestra", "ORCHESTRA"),
                GenreMapping::new("edm", "edm", "EDM"),
                GenreMapping::new("game music - bgm", "bgm", "BGM"),
            ],
        }
    }
}

/// A filename marker and the artist it implies.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArtistRule {
    pub marker: String,
    pub artist: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ArtistSettings {
    /// Checked in order; the first marker found in the filename wins.
    pub rules: Vec<ArtistRule>,
    /// Genre id whose tracks fall back to `orchestra_default`.
    pub orchestra_genre: String,
    pub orchestra_default: String,
    pub default_artist: String,
}

impl Default for ArtistSettings {
    fn default() -> Self {
        let rule = |marker: &str, artist: &str| ArtistRule {
            marker: marker.to_string(),
            artist: artist.to_string(),
        };
        Self {
            rules: vec![
                rule("shintou", "Shintou"),
                rule("koyaka", "Koyaka"),
                rule("sn0w", "sn0w"),
            ],
            orchestra_genre: "orchestra".to_string(),
            orchestra_default: "Sakuma遙".to_string(),
            default_artist: "Dulcets".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NormalizerSettings {
    /// Path to the loudness normalizer executable.
    /// When unset or missing on disk, normalization is skipped for the run.
    pub path: Option<PathBuf>,
    /// Integrated loudness target passed as `-l <target>`.
    pub target_lufs: i32,
}

impl Default for NormalizerSettings {
    fn default() -> Self {
        Self {
            path: None,
            target_lufs: -14,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Config document name, relative to the audio root.
    pub file_name: String,
    /// Appended to `file_name` for the backup copy.
    pub backup_suffix: String,
    /// Album cover path; `{id}` is replaced with the genre id.
    pub album_cover_template: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            file_name: "audio-config.json".to_string(),
            backup_suffix: ".backup".to_string(),
            album_cover_template: "/images/music/{id}-cover.svg".to_string(),
        }
    }
}

impl OutputSettings {
    pub fn album_cover(&self, genre_id: &str) -> String {
        self.album_cover_template.replace("{id}", genre_id)
    }

    pub fn backup_name(&self) -> String {
        format!("{}{}", self.file_name, self.backup_suffix)
    }
}
