//! Configuration for hiit.
//!
//! Two layers live here:
//! - [`Config`], the application config loaded from `$XDG_CONFIG_HOME/hiit/config.toml`
//! - [`SessionConfig`], the per-session parameters handed to the engine

use crate::catalog::{ExerciseCatalog, WorkoutDefinition};
use crate::types::ExerciseDescriptor;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_WORK_SECS: u32 = 45;
pub const DEFAULT_REST_SECS: u32 = 15;
pub const DEFAULT_INTENSITY: u8 = 50;
pub const MAX_INTENSITY: u8 = 100;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub session: SessionDefaults,

    #[serde(default)]
    pub workouts: Vec<WorkoutDefinition>,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Default interval lengths and intensity
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionDefaults {
    #[serde(default = "default_work_secs")]
    pub work_secs: u32,

    #[serde(default = "default_rest_secs")]
    pub rest_secs: u32,

    #[serde(default = "default_intensity")]
    pub intensity: u8,

    #[serde(default = "default_workout")]
    pub workout: String,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            work_secs: default_work_secs(),
            rest_secs: default_rest_secs(),
            intensity: default_intensity(),
            workout: default_workout(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("hiit")
}

fn default_work_secs() -> u32 {
    DEFAULT_WORK_SECS
}

fn default_rest_secs() -> u32 {
    DEFAULT_REST_SECS
}

fn default_intensity() -> u8 {
    DEFAULT_INTENSITY
}

fn default_workout() -> String {
    "full_body_hiit".into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("hiit").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

/// Parameters of a single session
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    pub session_key: String,
    exercises: Vec<ExerciseDescriptor>,
    pub work_secs: u32,
    pub rest_secs: u32,
    pub intensity: u8,
}

impl SessionConfig {
    /// Create a session config with default durations and intensity
    ///
    /// An empty exercise list is replaced by a single placeholder exercise.
    pub fn new(session_key: impl Into<String>, exercises: Vec<ExerciseDescriptor>) -> Self {
        let session_key = session_key.into();
        let exercises = if exercises.is_empty() {
            tracing::warn!(
                "Workout {} has no exercises, substituting a rest/recovery placeholder",
                session_key
            );
            vec![ExerciseDescriptor::placeholder()]
        } else {
            exercises
        };

        Self {
            session_key,
            exercises,
            work_secs: DEFAULT_WORK_SECS,
            rest_secs: DEFAULT_REST_SECS,
            intensity: DEFAULT_INTENSITY,
        }
    }

    /// Pull the exercise list for `session_key` from a catalog
    pub fn from_catalog(catalog: &dyn ExerciseCatalog, session_key: &str) -> Result<Self> {
        let exercises = catalog.exercises(session_key)?;
        Ok(Self::new(session_key, exercises))
    }

    /// Apply interval lengths and intensity from the application config
    pub fn with_defaults(self, defaults: &SessionDefaults) -> Self {
        self.with_durations(defaults.work_secs, defaults.rest_secs)
            .with_intensity(defaults.intensity)
    }

    pub fn with_durations(mut self, work_secs: u32, rest_secs: u32) -> Self {
        self.work_secs = work_secs;
        self.rest_secs = rest_secs;
        self
    }

    pub fn with_intensity(mut self, intensity: u8) -> Self {
        self.intensity = intensity.min(MAX_INTENSITY);
        self
    }

    /// Never empty
    pub fn exercises(&self) -> &[ExerciseDescriptor] {
        &self.exercises
    }

    /// Reject durations the countdown cannot run
    pub fn validate(&self) -> Result<()> {
        if self.work_secs == 0 {
            return Err(Error::Config("work duration must be at least 1 second".into()));
        }
        if self.rest_secs == 0 {
            return Err(Error::Config("rest duration must be at least 1 second".into()));
        }
        Ok(())
    }
}
