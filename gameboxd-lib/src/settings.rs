//! Application settings.
//!
//! Loaded from `~/.config/gameboxd/settings.toml` (or an explicit path),
//! then overridden by `GAMEBOXD_*` environment variables. Every field has a
//! default, so a missing file or section is not an error.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Canonical path to the settings file: `~/.config/gameboxd/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("gameboxd").join("settings.toml")
}

/// Default database file: `~/.local/share/gameboxd/gameboxd.db` (platform data dir).
pub fn default_database_path() -> PathBuf {
    let data = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    data.join("gameboxd").join("gameboxd.db")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub rate_limit: RateLimitSettings,
    pub import: ImportSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Bearer token for admin routes. Admin routes are open when unset.
    pub admin_token: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            admin_token: None,
        }
    }
}

/// Which store adapter backs the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sqlite,
    Memory,
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown backend '{other}' (expected sqlite or memory)")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub backend: Backend,
    pub path: Option<PathBuf>,
}

impl DatabaseSettings {
    /// The configured path, or the platform default.
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_database_path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Requests allowed per client per window. Zero disables limiting.
    pub requests: u32,
    pub window_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            requests: 60,
            window_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    pub detail_concurrency: usize,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            detail_concurrency: 5,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from [`settings_path`] when `None`.
    ///
    /// An explicit path must exist; the default path may be absent.
    /// Environment overrides are applied afterwards.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut settings = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default = settings_path();
                if default.exists() {
                    Self::from_file(&default)?
                } else {
                    Self::default()
                }
            }
        };
        settings.apply_env(|var| std::env::var(var).ok())?;
        Ok(settings)
    }

    /// Parse a settings file without applying environment overrides.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path).map_err(|e| SettingsError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&contents).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Apply `GAMEBOXD_*` overrides using `lookup` to read variables.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), SettingsError> {
        if let Some(host) = lookup("GAMEBOXD_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("GAMEBOXD_PORT") {
            self.server.port = port.trim().parse().map_err(|_| SettingsError::InvalidEnv {
                var: "GAMEBOXD_PORT",
                value: port.clone(),
            })?;
        }
        if let Some(path) = lookup("GAMEBOXD_DB_PATH") {
            self.database.path = Some(PathBuf::from(path));
        }
        if let Some(backend) = lookup("GAMEBOXD_BACKEND") {
            self.database.backend = backend.parse().map_err(|_| SettingsError::InvalidEnv {
                var: "GAMEBOXD_BACKEND",
                value: backend.clone(),
            })?;
        }
        if let Some(token) = lookup("GAMEBOXD_ADMIN_TOKEN") {
            self.server.admin_token = Some(token).filter(|t| !t.trim().is_empty());
        }
        Ok(())
    }

    /// Admin token, ignoring blank values.
    pub fn admin_token(&self) -> Option<&str> {
        self.server
            .admin_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }

    /// Pretty-printed TOML, for display.
    pub fn to_toml_string(&self) -> Option<String> {
        toml::to_string_pretty(self).ok()
    }
}
