//! Configuration file loading.
//!
//! ```toml
//! store = "/home/me/cells.json"
//! unknown_operation = "fallback"   # or "reject"
//!
//! [engine]
//! resolution = "last_write"        # or "first_match"
//! coercion = "lenient"             # or "strict"
//! dedup = "structural"             # or "legacy_key"
//! find_mode = "literal"            # or "pattern"
//! ```

use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use sheetgrid_core::{EngineOptions, SheetOptions, UnknownOperation};

use crate::error::ConfigError;

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub store: Option<PathBuf>,
    pub unknown_operation: UnknownOperation,
    pub engine: EngineOptions,
}

impl Config {
    pub fn sheet_options(&self) -> SheetOptions {
        SheetOptions {
            engine: self.engine,
            unknown_operation: self.unknown_operation,
        }
    }

    /// Store file: the command line wins over the config file, which wins
    /// over the per-user data directory.
    pub fn store_path(&self, override_path: Option<&Path>) -> Result<PathBuf, ConfigError> {
        override_path
            .map(Path::to_path_buf)
            .or_else(|| self.store.clone())
            .or_else(default_store_path)
            .ok_or(ConfigError::NoStorePath)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "sheetgrid")
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(project_dirs()?.config_dir().join("config.toml"))
}

pub fn default_store_path() -> Option<PathBuf> {
    Some(project_dirs()?.data_dir().join("cells.json"))
}

/// Load config from `explicit`, or from the default location if it exists.
/// An explicit path must exist; a missing default file means defaults.
pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.is_file() => path,
            _ => {
                tracing::debug!("no config file, using defaults");
                return Ok(Config::default());
            }
        },
    };

    let io_err = |source| ConfigError::Io {
        path: path.clone(),
        source,
    };
    let len = std::fs::metadata(&path).map_err(io_err)?.len();
    if len > MAX_CONFIG_FILE_BYTES {
        return Err(io_err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("file is larger than {} bytes", MAX_CONFIG_FILE_BYTES),
        )));
    }
    let content = std::fs::read_to_string(&path).map_err(io_err)?;
    let config = parse(&content).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

pub fn parse(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetgrid_engine::engine::{Coercion, Dedup, FindMode, Resolution};

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_full_config() {
        let config = parse(
            r#"
store = "/tmp/cells.json"
unknown_operation = "reject"

[engine]
resolution = "first_match"
coercion = "strict"
dedup = "legacy_key"
find_mode = "pattern"
"#,
        )
        .unwrap();
        assert_eq!(config.store, Some(PathBuf::from("/tmp/cells.json")));
        let options = config.sheet_options();
        assert_eq!(options.unknown_operation, UnknownOperation::Reject);
        assert_eq!(
            options.engine,
            EngineOptions {
                resolution: Resolution::FirstMatch,
                coercion: Coercion::Strict,
                dedup: Dedup::LegacyKey,
                find_mode: FindMode::Pattern,
            }
        );
    }

    #[test]
    fn test_partial_engine_table_keeps_defaults() {
        let config = parse("[engine]\ncoercion = \"strict\"\n").unwrap();
        assert_eq!(config.engine.coercion, Coercion::Strict);
        assert_eq!(config.engine.resolution, Resolution::LastWrite);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(parse("stor = \"x\"").is_err());
        assert!(parse("[engine]\nresolution = \"newest\"").is_err());
    }

    #[test]
    fn test_store_path_precedence() {
        let config = Config {
            store: Some(PathBuf::from("from-config.json")),
            ..Config::default()
        };
        assert_eq!(
            config.store_path(Some(Path::new("from-cli.json"))).unwrap(),
            PathBuf::from("from-cli.json")
        );
        assert_eq!(config.store_path(None).unwrap(), PathBuf::from("from-config.json"));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_default_paths_file_names() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("config.toml"));
        }
        if let Some(path) = default_store_path() {
            assert!(path.ends_with("cells.json"));
            assert_eq!(Config::default().store_path(None).unwrap(), path);
        }
    }
}
