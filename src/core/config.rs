//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.bookmate/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BookmateConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub picker: PickerConfig,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub base_url: Option<String>,
    pub analysis_delay_ms: Option<u64>,
    /// 0 disables the timeout.
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PickerConfig {
    pub moods: Option<Vec<String>>,
    pub genres: Option<Vec<String>>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_ANALYSIS_DELAY_MS: u64 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const DEFAULT_MOODS: &[&str] = &[
    "triste", "feliz", "pensativo", "motivado", "aburrido", "ansioso", "curioso",
];
const DEFAULT_GENRES: &[&str] = &[
    "cualquiera", "filosofia", "romance", "distopia", "aventura", "clasica",
];
const DEFAULT_SUGGESTIONS: &[&str] = &[
    "Me siento triste y quiero algo que me acompañe",
    "Estoy pensativo, quiero reflexionar sobre la vida",
    "Quiero una aventura épica",
    "Sorpréndeme con un clásico",
];

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub analysis_delay: Duration,
    pub request_timeout: Option<Duration>,
    pub moods: Vec<String>,
    pub genres: Vec<String>,
    pub suggestions: Vec<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.bookmate/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".bookmate").join("config.toml"))
}

/// Load config from `~/.bookmate/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `BookmateConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<BookmateConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(BookmateConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(BookmateConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: BookmateConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# BookMate Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# base_url = "http://localhost:5000"   # Or set BOOKMATE_BASE_URL env var
# analysis_delay_ms = 1000             # Delay before the analysis follow-up message
# request_timeout_secs = 30            # 0 = wait forever

# [picker]
# moods = ["triste", "feliz", "pensativo"]
# genres = ["cualquiera", "romance", "aventura"]

# suggestions = [
#   "Quiero una aventura épica",
# ]
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_base_url` comes from the `--base-url` flag (None = not specified).
pub fn resolve(config: &BookmateConfig, cli_base_url: Option<&str>) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli_base_url
        .map(|s| s.to_string())
        .or_else(|| std::env::var("BOOKMATE_BASE_URL").ok())
        .or_else(|| config.general.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // Analysis delay: env → config → default
    let analysis_delay_ms = std::env::var("BOOKMATE_ANALYSIS_DELAY_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .or(config.general.analysis_delay_ms)
        .unwrap_or(DEFAULT_ANALYSIS_DELAY_MS);

    let timeout_secs = config
        .general
        .request_timeout_secs
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

    let suggestions = if config.suggestions.is_empty() {
        owned(DEFAULT_SUGGESTIONS)
    } else {
        config.suggestions.clone()
    };

    ResolvedConfig {
        base_url,
        analysis_delay: Duration::from_millis(analysis_delay_ms),
        request_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        moods: config
            .picker
            .moods
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| owned(DEFAULT_MOODS)),
        genres: config
            .picker
            .genres
            .clone()
            .filter(|g| !g.is_empty())
            .unwrap_or_else(|| owned(DEFAULT_GENRES)),
        suggestions,
    }
}
