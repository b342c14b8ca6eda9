// Files - fixed export filenames and blob load/save

use log::info;
use std::fs;
use std::path::{Path, PathBuf};

pub const MIDI_EXTENSIONS: &[&str] = &["mid", "midi"];
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "ogg", "m4a"];

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unsupported file type: {0}")]
    UnsupportedType(PathBuf),
}

/// What a panel exports, each with its fixed filename
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    Recording,
    DrumGrid,
    SynthRecording,
    PianoRoll,
}

impl ExportTarget {
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportTarget::Recording => "recording.wav",
            ExportTarget::DrumGrid => "drum-grid.mid",
            ExportTarget::SynthRecording => "synth-recording.mid",
            ExportTarget::PianoRoll => "piano-roll.mid",
        }
    }

    /// Extensions accepted when importing into the same panel
    pub fn import_extensions(&self) -> &'static [&'static str] {
        match self {
            ExportTarget::Recording => AUDIO_EXTENSIONS,
            _ => MIDI_EXTENSIONS,
        }
    }
}

/// Lowercase extension of `path`
pub fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

pub fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    extension(path).is_some_and(|ext| allowed.contains(&ext.as_str()))
}

/// Write `bytes` to `path`, creating parent directories
pub fn save_blob_to(path: &Path, bytes: &[u8]) -> Result<(), FileError> {
    let write_err = |source| FileError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, bytes).map_err(write_err)?;
    info!("Saved {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Save under the target's fixed filename in `dir`; returns the full path
pub fn save_blob(dir: &Path, target: ExportTarget, bytes: &[u8]) -> Result<PathBuf, FileError> {
    let path = dir.join(target.file_name());
    save_blob_to(&path, bytes)?;
    Ok(path)
}

/// Read a file to import, checking its extension first
pub fn load_blob(path: &Path, allowed: &[&str]) -> Result<Vec<u8>, FileError> {
    if !has_extension(path, allowed) {
        return Err(FileError::UnsupportedType(path.to_path_buf()));
    }
    fs::read(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })
}
