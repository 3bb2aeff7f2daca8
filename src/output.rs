//! Writing the config document.
//!
//! The document goes to a temporary file next to the target and is renamed
//! into place, then read back and parsed once as a sanity check.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::info;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::library::ConfigDocument;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to serialize config: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("JSON validation failed for {path}: {source}")]
    Validate {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Copy an existing document to `backup`, replacing any older backup.
///
/// Returns `false` when there was nothing to back up.
pub fn backup_existing(config: &Path, backup: &Path) -> io::Result<bool> {
    if !config.is_file() {
        return Ok(false);
    }
    fs::copy(config, backup)?;
    Ok(true)
}

/// Pretty-printed (2-space) JSON with non-ASCII text left as-is.
pub fn render(document: &ConfigDocument) -> Result<String, SaveError> {
    let mut text = serde_json::to_string_pretty(document).map_err(SaveError::Serialize)?;
    text.push('\n');
    Ok(text)
}

/// Write `document` to `path`, then re-read and parse it.
///
/// A validation failure is reported after the file is already in place; the
/// write is not undone.
pub fn save_document(document: &ConfigDocument, path: &Path) -> Result<(), SaveError> {
    let text = render(document)?;
    write_atomic(path, text.as_bytes()).map_err(|source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("configuration saved to {}", path.display());

    validate(path)?;
    info!("JSON validation passed");
    Ok(())
}

/// Parse the file at `path` as JSON.
pub fn validate(path: &Path) -> Result<(), SaveError> {
    let text = fs::read_to_string(path).map_err(|source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str::<serde_json::Value>(&text).map_err(|source| SaveError::Validate {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    if let Some(perms) = target_permissions(path) {
        tmp.as_file().set_permissions(perms)?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(io::Error::from)?;
    Ok(())
}

/// Keep the mode of the document being replaced.
fn target_permissions(path: &Path) -> Option<fs::Permissions> {
    match fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => new_file_permissions(),
    }
}

/// Temp files are created owner-only; the player needs to read a new document.
#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{GenreEntry, Track};
    use tempfile::tempdir;

    fn document() -> ConfigDocument {
        let mut doc = ConfigDocument::new();
        doc.insert(
            "orchestra".into(),
            GenreEntry {
                id: "orchestra".into(),
                genre_name: "ORCHESTRA".into(),
                album_cover: "/images/music/orchestra-cover.svg".into(),
                tracks: vec![
                    Track {
                        id: "orchestra-1".into(),
                        file_name: "Orchestra/normalized_序曲.mp3".into(),
                        display_name: "序曲".into(),
                        artist: "Sakuma遙".into(),
                        duration: "4:02".into(),
                        is_hit: false,
                    },
                    Track {
                        id: "orchestra-2".into(),
                        file_name: "Orchestra/Best.wav".into(),
                        display_name: "Best".into(),
                        artist: "Sakuma遙".into(),
                        duration: "3:30".into(),
                        is_hit: true,
                    },
                ],
            },
        );
        doc
    }

    #[test]
    fn render_uses_two_space_indent_and_keeps_unicode() {
        let text = render(&document()).unwrap();
        assert!(text.contains("\n  \"orchestra\": {\n    \"id\": \"orchestra\""));
        assert!(text.contains("Sakuma遙"));
        assert!(text.contains("序曲"));
        assert!(!text.contains("\\u"));
        assert!(text.contains("\"genreName\": \"ORCHESTRA\""));
        assert!(text.contains("\"albumCover\""));
        assert!(text.contains("\"fileName\": \"Orchestra/Best.wav\""));
        assert_eq!(text.matches("\"isHit\": true").count(), 1);
        assert!(!text.contains("false"));
    }

    #[test]
    fn save_document_writes_readable_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audio-config.json");

        save_document(&document(), &path).unwrap();

        let parsed: ConfigDocument =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, document());
        // Only the target is left behind, no temp files.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn save_document_keeps_existing_mode_and_defaults_new_files_to_0644() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let fresh = dir.path().join("fresh.json");
        save_document(&document(), &fresh).unwrap();
        let mode = fs::metadata(&fresh).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);

        let existing = dir.path().join("audio-config.json");
        fs::write(&existing, "{}").unwrap();
        fs::set_permissions(&existing, fs::Permissions::from_mode(0o640)).unwrap();
        save_document(&document(), &existing).unwrap();
        let mode = fs::metadata(&existing).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
        assert_eq!(read_back(&existing), document());
    }

    fn read_back(path: &Path) -> ConfigDocument {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn save_document_reports_unwritable_target() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("audio-config.json");

        let err = save_document(&document(), &path).unwrap_err();
        assert!(matches!(err, SaveError::Io { .. }));
    }

    #[test]
    fn validate_flags_broken_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audio-config.json");
        fs::write(&path, "{\"edm\": ").unwrap();

        assert!(matches!(validate(&path), Err(SaveError::Validate { .. })));
    }

    #[test]
    fn backup_overwrites_previous_backup() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("audio-config.json");
        let backup = dir.path().join("audio-config.json.backup");

        assert!(!backup_existing(&config, &backup).unwrap());
        assert!(!backup.exists());

        fs::write(&backup, "old backup").unwrap();
        fs::write(&config, "{\"current\": true}").unwrap();
        assert!(backup_existing(&config, &backup).unwrap());
        assert_eq!(fs::read_to_string(&backup).unwrap(), "{\"current\": true}");
    }
}
