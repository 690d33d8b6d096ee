//! Whole-file reads and crash-safe writes
//!
//! Writes go to a sibling `.tmp` file that is synced and then renamed over
//! the target, so readers only ever see the old or the new contents.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::SaverError;

fn persistence(action: &str, path: &Path, err: impl std::fmt::Display) -> SaverError {
    SaverError::Persistence(format!("Failed to {} {}: {}", action, path.display(), err))
}

/// File contents as text; a missing file is `None`
pub fn read_text<P: AsRef<Path>>(path: P) -> Result<Option<String>, SaverError> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(persistence("read", path, e)),
    }
}

/// Deserialize a JSON file, falling back to `T::default()` when it is absent
pub fn read_json<T, P>(path: P) -> Result<T, SaverError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    match read_text(path)? {
        Some(text) => serde_json::from_str(&text).map_err(|e| persistence("parse", path, e)),
        None => Ok(T::default()),
    }
}

pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), SaverError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let bytes = serde_json::to_vec_pretty(data).map_err(|e| persistence("serialize", path, e))?;
    write_bytes_atomic(path, &bytes)
}

/// Replace `path` with `bytes`, creating parent directories as needed
pub fn write_bytes_atomic<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<(), SaverError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| persistence("create directory", parent, e))?;
    }

    // Same directory as the target so the rename never crosses filesystems
    let mut staged = path.as_os_str().to_owned();
    staged.push(".tmp");
    let staged = PathBuf::from(staged);

    let written = File::create(&staged).and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&staged);
        return Err(persistence("write", &staged, e));
    }

    fs::rename(&staged, path).map_err(|e| {
        let _ = fs::remove_file(&staged);
        persistence("replace", path, e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct TestData {
        name: String,
        value: i32,
    }

    #[test]
    fn test_read_nonexistent_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent.json");

        let data: TestData = read_json(&path).unwrap();
        assert_eq!(data, TestData::default());
        assert!(read_text(&path).unwrap().is_none());
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.json");

        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };

        write_json_atomic(&path, &data).unwrap();
        let loaded: TestData = read_json(&path).unwrap();
        assert_eq!(data, loaded);
    }

    #[test]
    fn test_atomic_write_no_temp_file_left() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.b64");

        write_bytes_atomic(&path, b"abc").unwrap();

        assert_eq!(read_text(&path).unwrap().as_deref(), Some("abc"));
        assert!(!temp_dir.path().join("ledger.b64.tmp").exists());
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("test.json");

        write_json_atomic(&path, &TestData::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_corrupt_file_is_persistence_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        fs::write(&path, "not json at all").unwrap();

        let err = read_json::<TestData, _>(&path).unwrap_err();
        assert!(matches!(err, SaverError::Persistence(_)));
    }
}
