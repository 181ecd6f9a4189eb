use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use capquiz_providers::REST_COUNTRIES_URL;
use capquiz_types::UiOptions;

use crate::pairing::DEFAULT_ERROR_DELAY;

/// Countries per round.
pub const DEFAULT_SAMPLE_SIZE: usize = 5;

/// Raw `~/.capquiz/config.toml` contents. Every field is optional.
///
/// ```toml
/// [quiz]
/// sample_size = 5
/// error_delay_ms = 3000
/// countries_url = "https://restcountries.com/v3.1/all"
///
/// [app]
/// ascii_only = false
/// high_contrast = false
/// reduced_motion = false
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct QuizConfig {
    pub quiz: Option<QuizSection>,
    pub app: Option<AppConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuizSection {
    pub sample_size: Option<usize>,
    pub error_delay_ms: Option<u64>,
    pub countries_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Use ASCII-only glyphs for borders and spinners.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
    /// Freeze the loading spinner.
    #[serde(default)]
    pub reduced_motion: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

impl QuizConfig {
    /// Loads the user config. `Ok(None)` when there is no home dir or no file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".capquiz").join("config.toml"))
}

/// Effective settings after defaults, config file and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSettings {
    pub sample_size: usize,
    pub error_delay: Duration,
    pub countries_url: String,
    pub ui: UiOptions,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            error_delay: DEFAULT_ERROR_DELAY,
            countries_url: REST_COUNTRIES_URL.to_string(),
            ui: UiOptions::default(),
        }
    }
}

impl QuizSettings {
    /// Loads the config file (falling back to defaults on any error) and
    /// applies `CAPQUIZ_*` environment overrides.
    #[must_use]
    pub fn load() -> Self {
        let config = QuizConfig::load().ok().flatten();
        Self::resolve(config.as_ref(), |key| env::var(key).ok())
    }

    /// `env` looks up an environment variable by name.
    pub fn resolve(config: Option<&QuizConfig>, env: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(quiz) = config.and_then(|cfg| cfg.quiz.as_ref()) {
            if let Some(size) = quiz.sample_size {
                settings.sample_size = size;
            }
            if let Some(ms) = quiz.error_delay_ms {
                settings.error_delay = Duration::from_millis(ms);
            }
            if let Some(url) = quiz.countries_url.as_deref().map(str::trim)
                && !url.is_empty()
            {
                settings.countries_url = url.to_string();
            }
        }

        if let Some(app) = config.and_then(|cfg| cfg.app.as_ref()) {
            settings.ui = UiOptions {
                ascii_only: app.ascii_only,
                high_contrast: app.high_contrast,
                reduced_motion: app.reduced_motion,
            };
        }

        if let Some(raw) = env("CAPQUIZ_SAMPLE_SIZE") {
            match raw.trim().parse::<usize>() {
                Ok(size) => settings.sample_size = size,
                Err(_) => tracing::warn!("Ignoring invalid CAPQUIZ_SAMPLE_SIZE: {raw}"),
            }
        }
        if let Some(raw) = env("CAPQUIZ_ERROR_DELAY_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) => settings.error_delay = Duration::from_millis(ms),
                Err(_) => tracing::warn!("Ignoring invalid CAPQUIZ_ERROR_DELAY_MS: {raw}"),
            }
        }
        if let Some(url) = env("CAPQUIZ_COUNTRIES_URL")
            && !url.trim().is_empty()
        {
            settings.countries_url = url.trim().to_string();
        }

        settings.sample_size = settings.sample_size.max(1);
        settings
    }
}
