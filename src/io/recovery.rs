use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

/// Size past which the oldest entries are dropped on the next append (1 MB)
const MAX_LOG_SIZE: u64 = 1_048_576;

/// Why a document ended up in the recovery log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryCategory {
    /// Saving to the tab file failed
    Write,
    /// Unsaved changes were thrown away with `:q!` or `:e`
    Discard,
}

impl fmt::Display for RecoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryCategory::Write => write!(f, "write"),
            RecoveryCategory::Discard => write!(f, "discard"),
        }
    }
}

/// One line of the recovery log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    pub category: RecoveryCategory,
    /// File the document belonged to, if it had a name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    pub description: String,
    /// The serialized document
    pub body: String,
}

impl RecoveryEntry {
    pub fn new(
        category: RecoveryCategory,
        file: Option<&Path>,
        description: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        RecoveryEntry {
            timestamp: Utc::now(),
            category,
            file: file.map(Path::to_path_buf),
            description: description.into(),
            body: body.into(),
        }
    }

    /// One-line summary for listings
    pub fn summary(&self) -> String {
        let file = self
            .file
            .as_ref()
            .map_or_else(|| "[No Name]".to_string(), |p| p.display().to_string());
        format!(
            "{} {} {}: {}",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.category,
            file,
            self.description
        )
    }
}

/// Return the path to the recovery log file.
pub fn recovery_log_path(state_dir: &Path) -> PathBuf {
    state_dir.join("recovery.log")
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Append an entry to the log. Failures are logged and otherwise ignored:
/// the log is the last resort, there is nowhere further to report to.
pub fn log_recovery(state_dir: &Path, entry: &RecoveryEntry) {
    match log_recovery_inner(state_dir, entry) {
        Ok(()) => log::info!("recovery entry written: {}", entry.description),
        Err(e) => log::warn!("could not write to recovery log: {e}"),
    }
}

fn log_recovery_inner(state_dir: &Path, entry: &RecoveryEntry) -> io::Result<()> {
    std::fs::create_dir_all(state_dir)?;
    let path = recovery_log_path(state_dir);

    if let Ok(meta) = std::fs::metadata(&path)
        && meta.len() > MAX_LOG_SIZE
    {
        trim_oldest(&path)?;
    }

    let mut line = serde_json::to_string(entry).map_err(io::Error::other)?;
    line.push('\n');
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    file.write_all(line.as_bytes())
}

/// Drop the oldest half of the entries
fn trim_oldest(path: &Path) -> io::Result<()> {
    let content = std::fs::read_to_string(path)?;
    let lines: Vec<&str> = content.lines().collect();
    let keep = &lines[lines.len() / 2..];
    let mut out = keep.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    log::debug!("trimming recovery log to {} entries", keep.len());
    atomic_write(path, out.as_bytes())
}

/// Read entries, most recent first. Unparseable lines are skipped.
pub fn read_recovery_entries(state_dir: &Path, limit: Option<usize>) -> Vec<RecoveryEntry> {
    let content = match std::fs::read_to_string(recovery_log_path(state_dir)) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };
    let mut entries: Vec<RecoveryEntry> = content
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect();
    entries.reverse();
    if let Some(n) = limit {
        entries.truncate(n);
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn log_and_read_back() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("state");
        let first = RecoveryEntry::new(
            RecoveryCategory::Write,
            Some(Path::new("song.tab")),
            "save failed",
            "{}",
        );
        let second = RecoveryEntry::new(RecoveryCategory::Discard, None, "q!", "{\"bars\":[]}");
        log_recovery(&dir, &first);
        log_recovery(&dir, &second);

        let entries = read_recovery_entries(&dir, None);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], second);
        assert_eq!(entries[1], first);

        let limited = read_recovery_entries(&dir, Some(1));
        assert_eq!(limited, vec![second]);
    }

    #[test]
    fn garbage_lines_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let entry = RecoveryEntry::new(RecoveryCategory::Write, None, "x", "body");
        let mut content = String::from("not json\n");
        content.push_str(&serde_json::to_string(&entry).unwrap());
        content.push('\n');
        std::fs::write(recovery_log_path(tmp.path()), content).unwrap();
        assert_eq!(read_recovery_entries(tmp.path(), None), vec![entry]);
    }

    #[test]
    fn missing_log_reads_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(read_recovery_entries(tmp.path(), None).is_empty());
    }

    #[test]
    fn summary_names_file_and_category() {
        let entry = RecoveryEntry::new(
            RecoveryCategory::Write,
            Some(Path::new("a.tab")),
            "disk full",
            "",
        );
        let summary = entry.summary();
        assert!(summary.contains("write a.tab: disk full"));
        let unnamed = RecoveryEntry::new(RecoveryCategory::Discard, None, "q!", "");
        assert!(unnamed.summary().contains("[No Name]"));
    }

    #[test]
    fn oversized_log_is_trimmed() {
        let tmp = TempDir::new().unwrap();
        let path = recovery_log_path(tmp.path());
        let big = "x".repeat(1024);
        let entry = RecoveryEntry::new(RecoveryCategory::Write, None, "big", big);
        let line = serde_json::to_string(&entry).unwrap();
        let count = (MAX_LOG_SIZE as usize / line.len()) + 10;
        let content: String = (0..count).map(|_| format!("{line}\n")).collect();
        std::fs::write(&path, content).unwrap();

        log_recovery(tmp.path(), &entry);
        let entries = read_recovery_entries(tmp.path(), None);
        assert!(entries.len() < count);
        assert!(std::fs::metadata(&path).unwrap().len() <= MAX_LOG_SIZE);
    }

    #[test]
    fn atomic_write_replaces_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.txt");
        atomic_write(&path, b"one").unwrap();
        atomic_write(&path, b"two").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "two");
    }
}
