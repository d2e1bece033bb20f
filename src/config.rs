// Configuration loading and parsing (captain.toml, credentials.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub fpl: FplConfig,
    pub narrator: NarratorConfig,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// captain.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire captain.toml file.
#[derive(Debug, Clone, Deserialize)]
struct CaptainFile {
    fpl: FplConfig,
    narrator: NarratorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FplConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    crate::fpl::client::DEFAULT_BASE_URL.to_string()
}

/// Which backend the narrator routes to. An explicit config value, not an
/// environment switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarratorMode {
    Hosted,
    Local,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NarratorConfig {
    pub mode: NarratorMode,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    pub hosted: HostedModelConfig,
    pub local: LocalModelConfig,
}

fn default_max_tokens() -> u32 {
    300
}

fn default_temperature() -> f64 {
    0.4
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostedModelConfig {
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalModelConfig {
    pub model: String,
    #[serde(default = "default_local_url")]
    pub url: String,
}

fn default_local_url() -> String {
    "http://localhost:11434".to_string()
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub anthropic_api_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/captain.toml` and (optionally)
/// `config/credentials.toml`, both relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- captain.toml (required) ---
    let captain_path = config_dir.join("captain.toml");
    let captain_text = read_file(&captain_path)?;
    let captain_file: CaptainFile =
        toml::from_str(&captain_text).map_err(|e| ConfigError::ParseError {
            path: captain_path.clone(),
            source: e,
        })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        fpl: captain_file.fpl,
        narrator: captain_file.narrator,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };

        // Skip .example template files
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                // File already exists in config/, skip it
            }
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.fpl.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "fpl.base_url".into(),
            message: "must not be empty".into(),
        });
    }

    let narrator = &config.narrator;
    if narrator.max_tokens == 0 {
        return Err(ConfigError::ValidationError {
            field: "narrator.max_tokens".into(),
            message: "must be greater than 0".into(),
        });
    }

    let temp = narrator.temperature;
    if !(0.0..=2.0).contains(&temp) {
        return Err(ConfigError::ValidationError {
            field: "narrator.temperature".into(),
            message: format!("must be between 0.0 and 2.0 inclusive, got {temp}"),
        });
    }

    // The selected mode must name a model; the other mode's model may be blank.
    let (field, model) = match narrator.mode {
        NarratorMode::Hosted => ("narrator.hosted.model", &narrator.hosted.model),
        NarratorMode::Local => ("narrator.local.model", &narrator.local.model),
    };
    if model.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: field.into(),
            message: "a model identifier is required for the selected mode".into(),
        });
    }

    if narrator.mode == NarratorMode::Local && narrator.local.url.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "narrator.local.url".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
