use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{GenreMapping, LibrarySettings, Settings};
use crate::normalize::{self, Normalizer, SourcePlan};

use super::artist::resolve_artist;
use super::display::{clean_display_name, is_hit};
use super::duration::resolve_duration;
use super::model::Track;

/// A subdirectory of the audio root that matched the genre table.
#[derive(Debug, Clone)]
pub struct GenreFolder {
    pub path: PathBuf,
    /// Name as found on disk, used verbatim in track paths.
    pub folder_name: String,
    pub genre: GenreMapping,
}

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// List the immediate subdirectories of `root` whose names match the genre
/// table, case-insensitively, in folder-name order.
pub fn find_genre_folders(root: &Path, genres: &[GenreMapping]) -> Result<Vec<GenreFolder>> {
    let mut folders = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("failed to list {}", root.display()))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let folder_name = entry.file_name().to_string_lossy().into_owned();
        let key = folder_name.to_lowercase();
        match genres.iter().find(|g| g.folder.to_lowercase() == key) {
            Some(genre) => folders.push(GenreFolder {
                path: path.to_path_buf(),
                folder_name,
                genre: genre.clone(),
            }),
            None => debug!("ignoring unrecognized folder {folder_name}"),
        }
    }

    Ok(folders)
}

/// Source audio files in `folder`, sorted by lowercase filename.
///
/// Files carrying the normalized prefix are outputs of an earlier run and are
/// left out.
pub fn audio_candidates(folder: &Path, settings: &LibrarySettings) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();

    for entry in WalkDir::new(folder).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("failed to list {}", folder.display()))?;
        let path = entry.path();
        if !path.is_file() || !is_audio_file(path, settings) {
            continue;
        }
        if file_name_of(path).starts_with(&settings.normalized_prefix) {
            debug!("skipping normalized output {}", path.display());
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort_by_cached_key(|p| file_name_of(p).to_lowercase());
    Ok(files)
}

/// Pick the file backing a track and read its duration from that file.
fn resolve_source(source: &Path, prefix: &str, normalizer: &dyn Normalizer) -> (PathBuf, String) {
    let normalized = normalize::normalized_path(source, prefix);

    match SourcePlan::decide(normalizer.is_available(), normalized.exists()) {
        SourcePlan::Original => {
            info!("    using original file (no normalizer)");
            (source.to_path_buf(), resolve_duration(source))
        }
        SourcePlan::ReuseNormalized => {
            info!("    using existing normalized file");
            let duration = resolve_duration(&normalized);
            (normalized, duration)
        }
        SourcePlan::Normalize => {
            info!("    normalizing...");
            match normalizer.normalize(source, &normalized) {
                Ok(()) => {
                    info!("    normalized successfully");
                    let duration = resolve_duration(&normalized);
                    (normalized, duration)
                }
                Err(e) => {
                    warn!("normalization failed for {}, using original: {e}", file_name_of(source));
                    (source.to_path_buf(), resolve_duration(source))
                }
            }
        }
    }
}

/// Build the track list for one genre folder.
///
/// Normalization and duration failures are absorbed per file; enumeration
/// errors are returned.
pub fn process_genre_folder(
    folder: &GenreFolder,
    settings: &Settings,
    normalizer: &dyn Normalizer,
) -> Result<Vec<Track>> {
    let candidates = audio_candidates(&folder.path, &settings.library)?;
    let mut tracks = Vec::with_capacity(candidates.len());

    for (index, source) in candidates.iter().enumerate() {
        let file_name = file_name_of(source);
        info!("  processing {file_name}");

        let (chosen, duration) =
            resolve_source(source, &settings.library.normalized_prefix, normalizer);

        // Naming always comes from the original file, never the prefixed rendition.
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let display_name = clean_display_name(&stem);
        let artist = resolve_artist(&file_name, &folder.genre.id, &settings.artists);
        let hit = is_hit(&display_name, &settings.library.hit_markers);

        info!("    added: {display_name} by {artist} ({duration})");
        tracks.push(Track {
            id: format!("{}-{}", folder.genre.id, index + 1),
            file_name: format!("{}/{}", folder.folder_name, file_name_of(&chosen)),
            display_name,
            artist,
            duration,
            is_hit: hit,
        });
    }

    Ok(tracks)
}
