//! Application configuration.
//!
//! Loaded from a TOML file layered with `DEVMATCH__SECTION__KEY` environment
//! variables. Every section has defaults, so an empty or missing file is a
//! valid configuration.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::assessment::AssessmentServiceConfig;
use crate::ats::AtsServiceConfig;
use crate::proctoring::{ProctoringServiceConfig, ProctoringSettings, SimulatedFaceDetector};

pub const APP_NAME: &str = "devmatch";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub profile: String,
    pub logging: LoggingConfig,
    pub server: ServerConfig,
    pub proctoring: ProctoringConfig,
    pub assessments: AssessmentsConfig,
    pub ats: AtsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: "default".to_string(),
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
            proctoring: ProctoringConfig::default(),
            assessments: AssessmentsConfig::default(),
            ats: AtsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProctoringConfig {
    /// Violation count that ends a session when `auto_terminate` is on.
    pub max_violations: usize,
    pub auto_terminate: bool,
    pub require_webcam: bool,
    pub require_microphone: bool,
    pub require_screen_share: bool,
    pub require_fullscreen: bool,
    /// Chance that a simulated snapshot contains no face.
    pub no_face_probability: f64,
    /// Chance that a simulated snapshot contains several faces.
    pub multiple_faces_probability: f64,
}

impl Default for ProctoringConfig {
    fn default() -> Self {
        let settings = ProctoringSettings::default();
        let detector = SimulatedFaceDetector::default();
        Self {
            max_violations: settings.max_violations,
            auto_terminate: settings.auto_terminate,
            require_webcam: settings.require_webcam,
            require_microphone: settings.require_microphone,
            require_screen_share: settings.require_screen_share,
            require_fullscreen: settings.require_fullscreen,
            no_face_probability: detector.no_face_probability(),
            multiple_faces_probability: detector.multiple_faces_probability(),
        }
    }
}

impl ProctoringConfig {
    pub fn service_config(&self) -> ProctoringServiceConfig {
        ProctoringServiceConfig {
            default_settings: ProctoringSettings {
                max_violations: self.max_violations,
                auto_terminate: self.auto_terminate,
                require_webcam: self.require_webcam,
                require_microphone: self.require_microphone,
                require_screen_share: self.require_screen_share,
                require_fullscreen: self.require_fullscreen,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentsConfig {
    /// Passing percentage for assessments created without one.
    pub default_passing_score: u8,
    /// Cap applied to simulated prediction probabilities.
    pub max_prediction: u8,
}

impl Default for AssessmentsConfig {
    fn default() -> Self {
        let defaults = AssessmentServiceConfig::default();
        Self {
            default_passing_score: defaults.default_passing_score,
            max_prediction: defaults.max_prediction,
        }
    }
}

impl AssessmentsConfig {
    pub fn service_config(&self) -> AssessmentServiceConfig {
        AssessmentServiceConfig {
            default_passing_score: self.default_passing_score,
            max_prediction: self.max_prediction,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AtsConfig {
    /// Upper bound on candidates returned by one simulated sync.
    pub max_sync_batch: u64,
}

impl Default for AtsConfig {
    fn default() -> Self {
        Self {
            max_sync_batch: AtsServiceConfig::default().max_sync_batch,
        }
    }
}

impl AtsConfig {
    pub fn service_config(&self) -> AtsServiceConfig {
        AtsServiceConfig {
            max_sync_batch: self.max_sync_batch,
        }
    }
}

/// Load the config file at `path` (optional) and apply environment overrides.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let env_prefix = env_prefix();
    let built = Config::builder()
        .set_default("profile", "default")?
        .set_default("logging.level", "info")?
        .add_source(
            File::from(path)
                .format(FileFormat::Toml)
                .required(false),
        )
        .add_source(Environment::with_prefix(env_prefix.as_str()).separator("__"))
        .build()
        .with_context(|| format!("reading config from {}", path.display()))?;

    built
        .try_deserialize()
        .with_context(|| format!("parsing config from {}", path.display()))
}

/// Write the default configuration, creating parent directories.
pub fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating config directory {parent:?}"))?;
    }

    let config = AppConfig::default();
    let toml = toml::to_string_pretty(&config).context("serializing default config to TOML")?;
    let mut body = default_config_header(path);
    body.push_str(&toml);
    fs::write(path, body).with_context(|| format!("writing config file to {}", path.display()))
}

fn default_config_header(path: &Path) -> String {
    let mut buffer = String::new();
    buffer.push_str("# Configuration for ");
    buffer.push_str(APP_NAME);
    buffer.push('\n');
    buffer.push_str("# File: ");
    buffer.push_str(&path.display().to_string());
    buffer.push_str("\n# Override any key with DEVMATCH__SECTION__KEY\n\n");
    buffer
}

/// Environment variable prefix derived from the app name.
pub fn env_prefix() -> String {
    APP_NAME
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}
