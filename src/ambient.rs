//! Ambient clip collection
//!
//! Fixed local set of short audio assets the idle watchdog plays before
//! disconnecting. Absence of any asset is a non-fatal condition: the
//! watchdog simply disconnects without playing anything.

use rand::seq::SliceRandom;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File extensions recognized as audio clips
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "ogg", "wav", "flac", "m4a", "opus"];

/// Immutable collection of ambient clips, scanned once at startup.
#[derive(Debug, Clone, Default)]
pub struct AmbientLibrary {
    clips: Vec<PathBuf>,
}

impl AmbientLibrary {
    /// Empty library: [`pick`](AmbientLibrary::pick) always returns `None`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Scan `dir` for audio files.
    ///
    /// A missing or unreadable directory yields an empty library with a
    /// warning, not an error.
    pub fn scan(dir: &Path) -> Self {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Ambient clip directory {} unavailable: {}", dir.display(), e);
                return Self::default();
            }
        };

        let mut clips: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_audio_file(path))
            .collect();
        clips.sort();

        debug!("Loaded {} ambient clips from {}", clips.len(), dir.display());
        Self { clips }
    }

    /// Choose one clip uniformly at random.
    pub fn pick(&self) -> Option<&Path> {
        self.clips
            .choose(&mut rand::thread_rng())
            .map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
