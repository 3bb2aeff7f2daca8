//! Loudness normalization through an external executable.
//!
//! The tool is invoked as `<tool> -l <target LUFS> <input> <output>` and
//! signals success with exit code 0. Failures are never fatal to a run: the
//! caller falls back to the source file.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, warn};
use thiserror::Error;

use crate::config::NormalizerSettings;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("normalizer is not available")]
    Unavailable,
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("normalizer exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

pub trait Normalizer {
    /// Whether normalization can run at all this session.
    fn is_available(&self) -> bool;

    /// Write a normalized rendition of `input` to `output`.
    fn normalize(&self, input: &Path, output: &Path) -> Result<(), NormalizeError>;
}

/// Runs a loudness normalizer binary as a blocking subprocess.
#[derive(Debug, Clone)]
pub struct ExternalNormalizer {
    program: PathBuf,
    target_lufs: i32,
}

impl ExternalNormalizer {
    pub fn new(program: impl Into<PathBuf>, target_lufs: i32) -> Self {
        Self {
            program: program.into(),
            target_lufs,
        }
    }
}

impl Normalizer for ExternalNormalizer {
    fn is_available(&self) -> bool {
        self.program.exists()
    }

    fn normalize(&self, input: &Path, output: &Path) -> Result<(), NormalizeError> {
        debug!(
            "running {} -l {} {} {}",
            self.program.display(),
            self.target_lufs,
            input.display(),
            output.display()
        );

        // No timeout: a hung tool stalls the run.
        let out = Command::new(&self.program)
            .arg("-l")
            .arg(self.target_lufs.to_string())
            .arg(input)
            .arg(output)
            .output()
            .map_err(|source| NormalizeError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if out.status.success() {
            Ok(())
        } else {
            Err(NormalizeError::Failed {
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            })
        }
    }
}

/// Stand-in used when no normalizer is configured or `--no-normalize` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disabled;

impl Normalizer for Disabled {
    fn is_available(&self) -> bool {
        false
    }

    fn normalize(&self, _input: &Path, _output: &Path) -> Result<(), NormalizeError> {
        Err(NormalizeError::Unavailable)
    }
}

/// Build the normalizer for a run. Emits the "not found" warning once, here,
/// rather than per file.
pub fn from_settings(settings: &NormalizerSettings) -> Box<dyn Normalizer> {
    match &settings.path {
        Some(path) => {
            let normalizer = ExternalNormalizer::new(path, settings.target_lufs);
            if !normalizer.is_available() {
                warn!(
                    "audio normalizer not found at {}, skipping normalization",
                    path.display()
                );
            }
            Box::new(normalizer)
        }
        None => {
            warn!("no audio normalizer configured, skipping normalization");
            Box::new(Disabled)
        }
    }
}

/// Where a track's audio comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePlan {
    /// No normalizer this run: use the source file.
    Original,
    /// A normalized rendition is already on disk: use it without re-running the tool.
    ReuseNormalized,
    /// Run the normalizer, falling back to the source on failure.
    Normalize,
}

impl SourcePlan {
    pub fn decide(normalizer_available: bool, normalized_exists: bool) -> Self {
        match (normalizer_available, normalized_exists) {
            (false, _) => Self::Original,
            (true, true) => Self::ReuseNormalized,
            (true, false) => Self::Normalize,
        }
    }
}

/// `<dir>/<prefix><stem>.mp3`, next to the source file.
pub fn normalized_path(source: &Path, prefix: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = format!("{prefix}{stem}.mp3");
    match source.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn plan_prefers_original_without_tool_even_if_cached() {
        assert_eq!(SourcePlan::decide(false, true), SourcePlan::Original);
        assert_eq!(SourcePlan::decide(false, false), SourcePlan::Original);
    }

    #[test]
    fn plan_reuses_existing_rendition() {
        assert_eq!(SourcePlan::decide(true, true), SourcePlan::ReuseNormalized);
        assert_eq!(SourcePlan::decide(true, false), SourcePlan::Normalize);
    }

    #[test]
    fn normalized_path_is_prefixed_mp3_sibling() {
        assert_eq!(
            normalized_path(Path::new("/music/edm/Drop_Full_3_Mastered.wav"), "normalized_"),
            PathBuf::from("/music/edm/normalized_Drop_Full_3_Mastered.mp3")
        );
        assert_eq!(
            normalized_path(Path::new("song.flac"), "n_"),
            PathBuf::from("n_song.mp3")
        );
    }

    #[test]
    fn missing_program_is_unavailable() {
        let dir = tempdir().unwrap();
        let n = ExternalNormalizer::new(dir.path().join("no-such-normalizer"), -14);
        assert!(!n.is_available());

        let err = n
            .normalize(Path::new("in.wav"), Path::new("out.mp3"))
            .unwrap_err();
        assert!(matches!(err, NormalizeError::Launch { .. }));
    }

    #[test]
    fn disabled_is_never_available() {
        assert!(!Disabled.is_available());
        assert!(matches!(
            Disabled.normalize(Path::new("a"), Path::new("b")),
            Err(NormalizeError::Unavailable)
        ));
    }

    #[test]
    fn unconfigured_settings_build_a_disabled_normalizer() {
        let n = from_settings(&NormalizerSettings::default());
        assert!(!n.is_available());
    }

    #[cfg(unix)]
    #[test]
    fn exit_status_decides_success() {
        let ok = Path::new("/bin/true");
        let fail = Path::new("/bin/false");
        if !ok.exists() || !fail.exists() {
            return;
        }

        let n = ExternalNormalizer::new(ok, -14);
        assert!(n.is_available());
        assert!(n.normalize(Path::new("in.wav"), Path::new("out.mp3")).is_ok());

        let n = ExternalNormalizer::new(fail, -14);
        let err = n
            .normalize(Path::new("in.wav"), Path::new("out.mp3"))
            .unwrap_err();
        assert!(matches!(err, NormalizeError::Failed { .. }));
    }

    /// Write an `sh` script that records one argument per line to `log`
    /// and exits with status 3.
    #[cfg(unix)]
    fn recording_script(dir: &Path, log: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("record-args.sh");
        std::fs::write(
            &script,
            format!("#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\nexit 3\n", log.display()),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    /// A freshly written script can briefly report ETXTBSY while another
    /// test thread forks; retry the launch in that case only.
    #[cfg(unix)]
    fn normalize_retrying(n: &dyn Normalizer, input: &Path, output: &Path) -> NormalizeError {
        for _ in 0..10 {
            match n.normalize(input, output) {
                Err(NormalizeError::Launch { source, .. }) if source.raw_os_error() == Some(26) => {
                    std::thread::sleep(std::time::Duration::from_millis(50));
                }
                Err(e) => return e,
                Ok(()) => panic!("script exits non-zero"),
            }
        }
        panic!("script never launched");
    }

    #[cfg(unix)]
    fn recorded_args(log: &Path) -> Vec<String> {
        std::fs::read_to_string(log)
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    #[cfg(unix)]
    #[test]
    fn passes_target_then_input_then_output() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("args.txt");
        let script = recording_script(dir.path(), &log);
        let input = dir.path().join("in put.wav");
        let output = dir.path().join("normalized_in put.mp3");

        let n = ExternalNormalizer::new(&script, -14);
        let err = normalize_retrying(&n, &input, &output);

        match err {
            NormalizeError::Failed { status, .. } => assert!(status.contains('3'), "{status}"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            recorded_args(&log),
            vec![
                "-l".to_string(),
                "-14".to_string(),
                input.display().to_string(),
                output.display().to_string(),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn configured_target_reaches_the_command_line() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("args.txt");
        let script = recording_script(dir.path(), &log);

        let n = from_settings(&NormalizerSettings {
            path: Some(script),
            target_lufs: -16,
        });
        assert!(n.is_available());
        let err = normalize_retrying(n.as_ref(), Path::new("a.flac"), Path::new("b.mp3"));

        assert!(matches!(err, NormalizeError::Failed { .. }));
        assert_eq!(recorded_args(&log), vec!["-l", "-16", "a.flac", "b.mp3"]);
    }
}
