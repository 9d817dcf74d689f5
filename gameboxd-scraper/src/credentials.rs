use std::path::{Path, PathBuf};

use crate::error::ScrapeError;

/// Environment variable holding the RAWG API key.
pub const API_KEY_ENV: &str = "RAWG_API_KEY";

/// Credentials for authenticating with the RAWG API.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
}

/// Where the API key came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from an environment variable.
    EnvVar(&'static str),
    /// Loaded from the config file.
    ConfigFile,
    /// Not set anywhere.
    Missing,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::ConfigFile => write!(f, "config file"),
            Self::Missing => write!(f, "not set"),
        }
    }
}

/// TOML config file format.
#[derive(Debug, serde::Deserialize)]
struct ConfigFile {
    rawg: Option<RawgConfig>,
}

#[derive(Debug, serde::Deserialize)]
struct RawgConfig {
    api_key: Option<String>,
}

impl Credentials {
    /// Load credentials from the environment or the config file.
    ///
    /// Priority: env var > config file.
    pub fn load() -> Result<Self, ScrapeError> {
        let from_file = config_path().and_then(|p| api_key_from_file(&p));
        Self::resolve(std::env::var(API_KEY_ENV).ok(), from_file)
    }

    /// Load credentials from an explicit config file, still honoring the env var.
    pub fn load_from(path: &Path) -> Result<Self, ScrapeError> {
        Self::resolve(std::env::var(API_KEY_ENV).ok(), api_key_from_file(path))
    }

    fn resolve(env: Option<String>, file: Option<String>) -> Result<Self, ScrapeError> {
        let api_key = env
            .filter(|k| !k.trim().is_empty())
            .or(file)
            .ok_or_else(|| {
                ScrapeError::Config(format!(
                    "Missing RAWG API key. Set {API_KEY_ENV} env var or add [rawg] api_key to the credentials file"
                ))
            })?;
        Ok(Self {
            api_key: api_key.trim().to_string(),
        })
    }
}

/// Return the path to the credentials config file.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gameboxd").join("credentials.toml"))
}

/// Determine where the API key is coming from.
pub fn credential_source() -> CredentialSource {
    if std::env::var(API_KEY_ENV).is_ok_and(|k| !k.trim().is_empty()) {
        CredentialSource::EnvVar(API_KEY_ENV)
    } else if config_path().and_then(|p| api_key_from_file(&p)).is_some() {
        CredentialSource::ConfigFile
    } else {
        CredentialSource::Missing
    }
}

fn api_key_from_file(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let config: ConfigFile = toml::from_str(&content).ok()?;
    config
        .rawg?
        .api_key
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_wins_over_file() {
        let creds = Credentials::resolve(Some("from-env".into()), Some("from-file".into())).unwrap();
        assert_eq!(creds.api_key, "from-env");
    }

    #[test]
    fn blank_env_falls_back_to_file() {
        let creds = Credentials::resolve(Some("  ".into()), Some("from-file".into())).unwrap();
        assert_eq!(creds.api_key, "from-file");
    }

    #[test]
    fn missing_everywhere_is_config_error() {
        let err = Credentials::resolve(None, None).unwrap_err();
        assert!(matches!(err, ScrapeError::Config(_)));
    }

    #[test]
    fn reads_rawg_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");
        std::fs::write(&path, "[rawg]\napi_key = \" abc123 \"\n").unwrap();
        assert_eq!(api_key_from_file(&path).as_deref(), Some("abc123"));

        std::fs::write(&path, "[other]\nvalue = 1\n").unwrap();
        assert_eq!(api_key_from_file(&path), None);
    }
}
