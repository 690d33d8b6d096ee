//! Where Budget Saver keeps its files
//!
//! The base directory is `BUDGET_SAVER_DATA_DIR` when set, otherwise the
//! platform config directory: `$XDG_CONFIG_HOME/budget-saver` or
//!    `~/.config/budget-saver` on Linux, `~/Library/Application Support/budget-saver`
//!    on macOS, `%APPDATA%\budget-saver` on Windows

use std::path::PathBuf;

use crate::error::SaverError;

pub const DATA_DIR_ENV: &str = "BUDGET_SAVER_DATA_DIR";

/// Layout under the base directory: `config.json`, `audit.log` and
/// `data/ledger.{json,b64}`
#[derive(Debug, Clone)]
pub struct SaverPaths {
    base_dir: PathBuf,
}

impl SaverPaths {
    /// Fails only when the platform has no home directory
    pub fn new() -> Result<Self, SaverError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.trim().is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Categories and transactions as plain JSON
    pub fn ledger_file(&self) -> PathBuf {
        self.data_dir().join("ledger.json")
    }

    pub fn encoded_ledger_file(&self) -> PathBuf {
        self.data_dir().join("ledger.b64")
    }

    pub fn ensure_directories(&self) -> Result<(), SaverError> {
        let data_dir = self.data_dir();
        std::fs::create_dir_all(&data_dir).map_err(|e| {
            SaverError::Io(format!("Cannot create {}: {}", data_dir.display(), e))
        })
    }

    /// `saver init` has run here
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, SaverError> {
    let dirs = directories::BaseDirs::new()
        .ok_or_else(|| SaverError::Config("Could not determine home directory".into()))?;
    Ok(dirs.config_dir().join("budget-saver"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SaverPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();
        let custom_path = temp_dir.path().to_str().unwrap();

        std::env::set_var(DATA_DIR_ENV, custom_path);
        let paths = SaverPaths::new().unwrap();
        std::env::remove_var(DATA_DIR_ENV);

        assert_eq!(paths.base_dir(), temp_dir.path());
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SaverPaths::with_base_dir(temp_dir.path().join("nested"));

        paths.ensure_directories().unwrap();

        assert!(paths.data_dir().exists());
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_file_paths() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SaverPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(
            paths.ledger_file(),
            temp_dir.path().join("data").join("ledger.json")
        );
        assert_eq!(
            paths.encoded_ledger_file(),
            temp_dir.path().join("data").join("ledger.b64")
        );
    }
}
