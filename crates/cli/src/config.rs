//! CLI configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the data directory
pub const STATE_DIR_ENV: &str = "MOVIE_CHECKER_STATE_DIR";

/// Settings layered from defaults, an optional file and `MOVIE_CHECKER__*`
/// environment variables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the Movie Checker backend
    pub backend_url: String,

    /// Request timeout in seconds (0 = transport default)
    pub timeout_secs: u64,

    /// Overrides the client's user agent
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Refresh tokens this many seconds before they expire
    pub expiry_buffer_secs: u64,

    /// Where the session token and logs are kept
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8080".to_string(),
            timeout_secs: 30,
            user_agent: None,
            expiry_buffer_secs: 30,
            data_dir: None,
        }
    }
}

impl Settings {
    /// Load settings, reading `file` if given
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("backend_url", defaults.backend_url)?
            .set_default("timeout_secs", defaults.timeout_secs)?
            .set_default("expiry_buffer_secs", defaults.expiry_buffer_secs)?;

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix("MOVIE_CHECKER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn expiry_buffer(&self) -> Duration {
        Duration::from_secs(self.expiry_buffer_secs)
    }
}

/// Pick the data directory: command line, then settings, then the
/// environment, then the platform data directory
pub fn resolve_data_dir(cli: Option<PathBuf>, settings: &Settings) -> PathBuf {
    cli.or_else(|| settings.data_dir.clone())
        .or_else(|| std::env::var_os(STATE_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("movie-checker")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let settings = Settings::load(None).unwrap();
        assert!(!settings.backend_url.is_empty());
        assert_eq!(settings.expiry_buffer(), Duration::from_secs(settings.expiry_buffer_secs));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "backend_url = \"https://movies.example.com/api\"\ntimeout_secs = 0\ndata_dir = \"/tmp/mc\""
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.backend_url, "https://movies.example.com/api");
        assert_eq!(settings.timeout(), None);
        assert_eq!(settings.data_dir, Some(PathBuf::from("/tmp/mc")));
    }

    #[test]
    fn test_command_line_data_dir_wins() {
        let settings = Settings {
            data_dir: Some(PathBuf::from("/from/settings")),
            ..Settings::default()
        };
        assert_eq!(
            resolve_data_dir(Some(PathBuf::from("/from/cli")), &settings),
            PathBuf::from("/from/cli")
        );
        assert_eq!(
            resolve_data_dir(None, &settings),
            PathBuf::from("/from/settings")
        );
    }
}
