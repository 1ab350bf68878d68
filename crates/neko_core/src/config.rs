use crate::state::{MOOD_MAX, MOOD_MIN, MOOD_TARGET};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NekoConfig {
    pub persona: PersonaConfig,
    pub mood: MoodConfig,
    pub expression: ExpressionConfig,
    pub content: ContentConfig,
}

impl NekoConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied and the result validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Try to load from path; if the file is missing or invalid, use
    /// defaults with env overrides. The fallback is validated too, so a bad
    /// override is an error on either path.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::load_or_default_with_env(path, |key| std::env::var(key).ok())
    }

    fn load_with_env<P, F>(path: P, env: F) -> Result<Self>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: NekoConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides(&env);
        config.validate()?;
        Ok(config)
    }

    fn load_or_default_with_env<P, F>(path: P, env: F) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        match Self::load_with_env(path, &env) {
            Ok(cfg) => Ok(cfg),
            Err(e) => {
                tracing::info!("Config file not found or invalid ({:#}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides(&env);
                cfg.validate()?;
                Ok(cfg)
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides<F: Fn(&str) -> Option<String>>(&mut self, env: F) {
        if let Some(v) = env("NEKO_CONTENT_DIR") {
            self.content.dir = Some(PathBuf::from(v));
        }
        if let Some(v) = env("NEKO_NAME_TRIGGER") {
            self.persona.name_trigger = v.to_lowercase();
        }
        if let Some(v) = env("NEKO_INITIAL_MOOD") {
            match v.parse() {
                Ok(n) => self.mood.initial = Some(n),
                Err(_) => tracing::warn!("Ignoring NEKO_INITIAL_MOOD={:?}: not an integer", v),
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.mood.validate()?;
        self.expression.validate()?;
        if self.persona.name_trigger.split_whitespace().count() != 1 {
            return Err(ConfigError::NameTrigger(self.persona.name_trigger.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("mood bounds invalid: min {min} must be below max {max}, both within the hard limits")]
    MoodBounds { min: i32, max: i32 },

    #[error("mood {field} {value} is outside [{min}, {max}]")]
    MoodOutOfBounds {
        field: &'static str,
        value: i32,
        min: i32,
        max: i32,
    },

    #[error("mood {0} must not be negative")]
    NegativeStep(&'static str),

    #[error("{0} chance {1} is outside [0, 1]")]
    Chance(&'static str, f64),

    #[error("name trigger {0:?} must be a single word")]
    NameTrigger(String),
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PersonaConfig {
    /// Display name used by the front end.
    pub name: String,
    /// Token that counts as calling the responder by name.
    pub name_trigger: String,
    /// Opening line printed before the first prompt.
    pub scene: String,
    /// Line printed on the sleep command.
    pub farewell: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: "Hanekawa".to_string(),
            name_trigger: "hanekawa".to_string(),
            scene: "Rain taps softly against the windows.".to_string(),
            farewell: "Hanekawa yawns and turns away.".to_string(),
        }
    }
}

/// Mood homeostasis and perturbation parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MoodConfig {
    pub min: i32,
    pub max: i32,
    /// Equilibrium mood drifts toward every turn.
    pub target: i32,
    /// Pull per turn when below target.
    pub rise_step: i32,
    /// Pull per turn when above target.
    pub fall_step: i32,
    /// Template deltas are capped to `[-delta_cap, delta_cap]`.
    pub delta_cap: i32,
    pub unknown_penalty: i32,
    pub name_spam_penalty: i32,
    /// Streak length at which the name-spam penalty starts firing.
    pub name_spam_threshold: u32,
    /// Starting mood for a new session; `None` starts at `target`.
    pub initial: Option<i32>,
}

impl Default for MoodConfig {
    fn default() -> Self {
        Self {
            min: MOOD_MIN,
            max: MOOD_MAX,
            target: MOOD_TARGET,
            rise_step: 2,
            fall_step: 1,
            delta_cap: 9,
            unknown_penalty: 1,
            name_spam_penalty: 3,
            name_spam_threshold: 3,
            initial: None,
        }
    }
}

impl MoodConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min >= self.max || self.min < MOOD_MIN || self.max > MOOD_MAX {
            return Err(ConfigError::MoodBounds {
                min: self.min,
                max: self.max,
            });
        }
        if !(self.min..=self.max).contains(&self.target) {
            return Err(ConfigError::MoodOutOfBounds {
                field: "target",
                value: self.target,
                min: self.min,
                max: self.max,
            });
        }
        for (name, value) in [
            ("rise_step", self.rise_step),
            ("fall_step", self.fall_step),
            ("delta_cap", self.delta_cap),
            ("unknown_penalty", self.unknown_penalty),
            ("name_spam_penalty", self.name_spam_penalty),
        ] {
            if value < 0 {
                return Err(ConfigError::NegativeStep(name));
            }
        }
        Ok(())
    }

    /// Mood a fresh session starts with.
    pub fn starting_mood(&self) -> i32 {
        self.initial.unwrap_or(self.target).clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExpressionConfig {
    /// Probability of appending a mood-zone trait line.
    pub trait_chance: f64,
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self { trait_chance: 0.35 }
    }
}

impl ExpressionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.trait_chance) {
            return Err(ConfigError::Chance("trait", self.trait_chance));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Directory holding the JSON content resources; `None` uses the
    /// built-in content.
    pub dir: Option<PathBuf>,
}

// ============================================================================
// Tests
// ============================================================================
