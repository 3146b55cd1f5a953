//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use attend_core::ShiftType;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
///
/// The schedule itself lives in the database so every scanner sees the same
/// one; this file only covers the local installation.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Shift used when a command does not pass `--shift`.
    pub default_shift: ShiftType,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("default_shift", &self.default_shift)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("attend.db"),
            default_shift: ShiftType::Day,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Sources, later ones winning: defaults, `config.toml` in the platform
    /// config directory, `config_path`, `ATTEND_*` environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("ATTEND_"));

        figment.extract()
    }

    /// Lock file serializing scans on this machine.
    pub fn lock_path(&self) -> PathBuf {
        self.database_path.with_extension("lock")
    }
}

/// Returns the platform-specific config directory for attend.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("attend"))
}

/// Returns the platform-specific data directory for attend.
///
/// On Linux: `~/.local/share/attend`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("attend"))
}
