//! High score persisted as a small JSON file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::HighScoreStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct HighScoreFile {
    #[serde(default)]
    high_score: u32,
}

/// [`HighScoreStore`] backed by a JSON file.
///
/// The file is read once on open. A missing or malformed file reads as 0.
#[derive(Debug, Clone)]
pub struct JsonHighScore {
    path: PathBuf,
    record: HighScoreFile,
}

impl JsonHighScore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let record = match fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_default(),
            Err(_) => HighScoreFile::default(),
        };
        Self { path, record }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for JsonHighScore {
    fn get_high_score(&mut self) -> u32 {
        self.record.high_score
    }

    fn set_high_score(&mut self, score: u32) -> io::Result<()> {
        let record = HighScoreFile { high_score: score };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&record).map_err(io::Error::other)?;
        fs::write(&self.path, data)?;
        self.record = record;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record_high_score;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("splitris-{}-{}", std::process::id(), name))
    }

    #[test]
    fn missing_file_reads_zero() {
        let mut store = JsonHighScore::open(temp_path("missing.json"));
        assert_eq!(store.get_high_score(), 0);
    }

    #[test]
    fn malformed_file_reads_zero() {
        let path = temp_path("malformed.json");
        fs::write(&path, "not json").unwrap();
        let mut store = JsonHighScore::open(&path);
        assert_eq!(store.get_high_score(), 0);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn record_survives_reopen() {
        let path = temp_path("roundtrip.json");
        let _ = fs::remove_file(&path);

        let mut store = JsonHighScore::open(&path);
        assert!(record_high_score(&mut store, 4500).unwrap());
        assert!(!record_high_score(&mut store, 3000).unwrap());

        let mut reopened = JsonHighScore::open(&path);
        assert_eq!(reopened.get_high_score(), 4500);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn failed_write_keeps_previous_value() {
        let dir = temp_path("blocker");
        let _ = fs::remove_dir_all(&dir);
        fs::write(&dir, "a file, not a directory").unwrap();

        let mut store = JsonHighScore::open(dir.join("hs.json"));
        assert!(store.set_high_score(10).is_err());
        assert_eq!(store.get_high_score(), 0);
        let _ = fs::remove_file(&dir);
    }
}
