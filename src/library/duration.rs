use std::path::Path;
use std::time::Duration;

use lofty::error::LoftyError;
use lofty::prelude::AudioFile;
use log::warn;
use thiserror::Error;

/// Placeholder reported when a file's length cannot be read.
/// It means "unknown", not a measured value.
pub const FALLBACK_DURATION: &str = "3:30";

#[derive(Debug, Error)]
enum DurationError {
    #[error(transparent)]
    Read(#[from] LoftyError),
    #[error("no length in stream properties")]
    Missing,
}

/// Read the track length from the file's container metadata as `M:SS`.
///
/// Never fails: any problem is logged and [`FALLBACK_DURATION`] is returned.
pub fn resolve_duration(path: &Path) -> String {
    match read_duration(path) {
        Ok(duration) => format_duration(duration),
        Err(e) => {
            warn!("could not get duration for {}: {e}", display_name(path));
            FALLBACK_DURATION.to_string()
        }
    }
}

fn read_duration(path: &Path) -> Result<Duration, DurationError> {
    let tagged = lofty::read_from_path(path)?;
    let duration = tagged.properties().duration();
    // lofty reports zero when the stream carries no usable length
    if duration.is_zero() {
        return Err(DurationError::Missing);
    }
    Ok(duration)
}

/// Minutes are unpadded and never roll over into hours; seconds are truncated.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
