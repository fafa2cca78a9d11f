use std::fs;
use std::path::{Path, PathBuf};

use crate::io::recovery::atomic_write;
use crate::model::{STRING_COUNT, Tablature};

/// Error type for tab file I/O
#[derive(Debug, thiserror::Error)]
pub enum TabError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not serialize tablature: {0}")]
    SerializeError(#[from] serde_json::Error),
    #[error("invalid tablature {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// Load a tab file. A path that does not exist yields a fresh document.
pub fn load(path: &Path) -> Result<Tablature, TabError> {
    if !path.exists() {
        log::info!("{} does not exist, starting a new tablature", path.display());
        return Ok(Tablature::default());
    }
    let text = fs::read_to_string(path).map_err(|e| TabError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut tab: Tablature = serde_json::from_str(&text).map_err(|e| TabError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&tab).map_err(|reason| TabError::Invalid {
        path: path.to_path_buf(),
        reason,
    })?;
    tab.repair();
    tab.changed = false;
    log::info!("loaded {} ({} bars)", path.display(), tab.bars.len());
    Ok(tab)
}

/// Serialize the document to its file format
pub fn to_json(tab: &Tablature) -> Result<String, TabError> {
    Ok(serde_json::to_string_pretty(tab)?)
}

/// Save atomically. Clears the dirty flag on success.
pub fn save(tab: &mut Tablature, path: &Path) -> Result<(), TabError> {
    let mut text = to_json(tab)?;
    text.push('\n');
    atomic_write(path, text.as_bytes()).map_err(|e| TabError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;
    tab.changed = false;
    log::info!("saved {}", path.display());
    Ok(())
}

fn validate(tab: &Tablature) -> Result<(), String> {
    if tab.bars.is_empty() {
        return Err("no bars".to_string());
    }
    for (b, bar) in tab.bars.iter().enumerate() {
        let b = b + 1;
        if bar.chords.is_empty() {
            return Err(format!("bar {b} has no chords"));
        }
        if bar.sig_num == 0 || bar.sig_den == 0 {
            return Err(format!("bar {b} has signature {}/{}", bar.sig_num, bar.sig_den));
        }
        for (c, chord) in bar.chords.iter().enumerate() {
            let c = c + 1;
            if chord.duration.is_zero() {
                return Err(format!("chord {b},{c} has zero duration"));
            }
            if let Some(&string) = chord.strings.keys().find(|&&s| usize::from(s) >= STRING_COUNT) {
                return Err(format!("chord {b},{c} uses string {string}"));
            }
        }
    }
    Ok(())
}
