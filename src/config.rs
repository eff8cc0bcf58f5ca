//! Engine configuration
//!
//! Thresholds used for size accounting and for flagging entries that need
//! extended ISO9660 features. Persisted to
//! `<data dir>/Disc Project Tree/tree_config.json`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, TreeError};

/// Optical media block size in bytes
pub const SECTOR_SIZE: u64 = 2048;

/// Files at or above this size need ISO9660 level 3
pub const OVERSIZE_BYTES: u64 = 2 * 1024 * 1024 * 1024;

/// Depth (root excluded) at which a file is considered deep
pub const DEEP_FILE_DEPTH: usize = 6;

/// Depth (root excluded) at which a directory is considered deep
pub const DEEP_DIR_DEPTH: usize = 5;

fn default_sector_size() -> u64 {
    SECTOR_SIZE
}

fn default_oversize_bytes() -> u64 {
    OVERSIZE_BYTES
}

fn default_deep_file_depth() -> usize {
    DEEP_FILE_DEPTH
}

fn default_deep_dir_depth() -> usize {
    DEEP_DIR_DEPTH
}

/// Tunables for a project tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Accounting unit for sizes, in bytes
    #[serde(default = "default_sector_size")]
    pub sector_size: u64,
    /// Files whose byte size reaches this value are counted as oversized
    #[serde(default = "default_oversize_bytes")]
    pub oversize_bytes: u64,
    /// Files at this depth or deeper are flagged deep
    #[serde(default = "default_deep_file_depth")]
    pub deep_file_depth: usize,
    /// Directories at this depth or deeper are flagged deep
    #[serde(default = "default_deep_dir_depth")]
    pub deep_dir_depth: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            sector_size: SECTOR_SIZE,
            oversize_bytes: OVERSIZE_BYTES,
            deep_file_depth: DEEP_FILE_DEPTH,
            deep_dir_depth: DEEP_DIR_DEPTH,
        }
    }
}

impl TreeConfig {
    const CONFIG_FILE: &'static str = "tree_config.json";

    /// Convert a byte count to whole sectors, rounding up
    pub fn bytes_to_sectors(&self, bytes: u64) -> u64 {
        if self.sector_size == 0 {
            return 0;
        }
        bytes.div_ceil(self.sector_size)
    }

    /// Whether a file of `bytes` needs the oversize counter
    pub fn is_oversized(&self, bytes: u64) -> bool {
        bytes >= self.oversize_bytes
    }

    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("Disc Project Tree").join(Self::CONFIG_FILE))
    }

    /// Load the configuration from its default location, or return defaults
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            log::debug!("No data directory, using default tree config");
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(config) => {
                log::debug!("Loaded tree config from {}", path.display());
                config
            }
            Err(e) => {
                log::debug!("Using default tree config: {}", e);
                Self::default()
            }
        }
    }

    /// Load the configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TreeError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save the configuration to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;

        log::debug!("Saved tree config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = TreeConfig::default();
        assert_eq!(config.sector_size, 2048);
        assert_eq!(config.deep_file_depth, 6);
        assert_eq!(config.deep_dir_depth, 5);
        assert_eq!(config.oversize_bytes, 2_147_483_648);
    }

    #[test]
    fn test_bytes_to_sectors_rounds_up() {
        let config = TreeConfig::default();
        assert_eq!(config.bytes_to_sectors(0), 0);
        assert_eq!(config.bytes_to_sectors(1), 1);
        assert_eq!(config.bytes_to_sectors(2048), 1);
        assert_eq!(config.bytes_to_sectors(2049), 2);
    }

    #[test]
    fn test_is_oversized() {
        let config = TreeConfig::default();
        assert!(!config.is_oversized(OVERSIZE_BYTES - 1));
        assert!(config.is_oversized(OVERSIZE_BYTES));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("tree_config.json");

        let config = TreeConfig {
            deep_file_depth: 8,
            ..TreeConfig::default()
        };
        config.save_to(&path).unwrap();

        let loaded = TreeConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("partial.json");
        std::fs::write(&path, r#"{ "deep_dir_depth": 3 }"#).unwrap();

        let loaded = TreeConfig::load_from(&path).unwrap();
        assert_eq!(loaded.deep_dir_depth, 3);
        assert_eq!(loaded.sector_size, SECTOR_SIZE);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = TreeConfig::load_from(&temp_dir.path().join("absent.json"));
        assert!(matches!(result, Err(TreeError::Config(_))));
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(TreeConfig::load_from(&path).is_err());
    }
}
