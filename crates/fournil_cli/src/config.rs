//! Runtime configuration resolution.
//!
//! Priority order for every setting:
//! 1. Command-line argument
//! 2. Environment variable (handled by clap `env`)
//! 3. OS-dependent default under the local data directory

use anyhow::{anyhow, Context, Result};
use fournil_core::{default_log_level, LogLevel};
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "fournil";
const DB_FILE_NAME: &str = "fournil.sqlite3";
const LOG_DIR_NAME: &str = "logs";

/// Settings after defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub db_path: PathBuf,
    pub log_level: LogLevel,
    /// Always absolute.
    pub log_dir: PathBuf,
}

impl CliConfig {
    pub fn resolve(
        db_path: Option<PathBuf>,
        log_level: Option<&str>,
        log_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let data_dir = default_data_dir();
        let log_level = match log_level {
            Some(level) => level.parse::<LogLevel>().map_err(|err| anyhow!("{err}"))?,
            None => default_log_level(),
        };
        let log_dir = absolute(log_dir.unwrap_or_else(|| data_dir.join(LOG_DIR_NAME)))?;
        let db_path = db_path.unwrap_or_else(|| data_dir.join(DB_FILE_NAME));

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }

    /// Creates the database parent directory when missing.
    pub fn prepare_db_dir(&self) -> Result<()> {
        if let Some(parent) = self.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        Ok(())
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(format!("./{APP_DIR_NAME}_data")))
}

fn absolute(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    Ok(cwd.join(Path::new(&path)))
}

#[cfg(test)]
mod tests {
    use super::CliConfig;
    use fournil_core::LogLevel;
    use std::path::PathBuf;

    #[test]
    fn explicit_values_win_over_defaults() {
        let config = CliConfig::resolve(
            Some(PathBuf::from("/tmp/shop.sqlite3")),
            Some("WARN"),
            Some(PathBuf::from("/tmp/fournil-logs")),
        )
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/shop.sqlite3"));
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.log_dir, PathBuf::from("/tmp/fournil-logs"));
    }

    #[test]
    fn relative_log_dir_is_made_absolute() {
        let config = CliConfig::resolve(None, None, Some(PathBuf::from("logs"))).unwrap();
        assert!(config.log_dir.is_absolute());
        assert!(config.log_dir.ends_with("logs"));
    }

    #[test]
    fn unknown_level_is_rejected() {
        assert!(CliConfig::resolve(None, Some("chatty"), None).is_err());
    }
}
