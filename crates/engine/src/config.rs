use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable naming a TOML config file.
pub const CONFIG_ENV: &str = "INTENT_CONFIG";

/// Tunables of the resolution pipeline. Every field has a default, so a
/// config file only needs the keys it changes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    pub scoring: ScoringConfig,
    pub confidence: ConfidenceConfig,
    pub assist: AssistConfig,
    pub limits: LimitsConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    pub ai_bonus: f64,
    pub category_bonus: f64,
    pub specificity_bonus: f64,
    /// Bonus applies when a candidate has strictly more suggested actions.
    pub specificity_min_actions: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            ai_bonus: 0.1,
            category_bonus: 0.2,
            specificity_bonus: 0.1,
            specificity_min_actions: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfidenceConfig {
    pub medium_threshold: f64,
    pub focus_bonus: f64,
    pub density_bonus: f64,
    /// Density bonus applies above this many total matches.
    pub density_min_matches: usize,
    pub short_text_penalty: f64,
    /// Penalty applies below this many characters of original text.
    pub short_text_chars: usize,
    pub floor: f64,
    pub ceiling: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            medium_threshold: 0.5,
            focus_bonus: 0.1,
            density_bonus: 0.1,
            density_min_matches: 2,
            short_text_penalty: 0.2,
            short_text_chars: 10,
            floor: 0.1,
            ceiling: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssistConfig {
    pub enabled: bool,
    pub timeout_ms: u64,
    pub max_candidates: usize,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: 10_000,
            max_candidates: 3,
        }
    }
}

impl AssistConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    pub max_relevant_files: usize,
    pub max_questions: usize,
    pub max_alternatives: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_relevant_files: 5,
            max_questions: 5,
            max_alternatives: 2,
        }
    }
}

impl ResolverConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(raw).context("Failed to parse resolver config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Explicit path first, then `INTENT_CONFIG`, then defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::load(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render resolver config")
    }

    pub fn validate(&self) -> Result<()> {
        let s = &self.scoring;
        validate_unit("scoring.ai_bonus", s.ai_bonus)?;
        validate_unit("scoring.category_bonus", s.category_bonus)?;
        validate_unit("scoring.specificity_bonus", s.specificity_bonus)?;

        let c = &self.confidence;
        validate_unit("confidence.focus_bonus", c.focus_bonus)?;
        validate_unit("confidence.density_bonus", c.density_bonus)?;
        validate_unit("confidence.short_text_penalty", c.short_text_penalty)?;
        validate_unit("confidence.floor", c.floor)?;
        validate_unit("confidence.ceiling", c.ceiling)?;
        if c.floor > c.ceiling {
            return Err(anyhow!(
                "confidence.floor ({}) must not exceed confidence.ceiling ({})",
                c.floor,
                c.ceiling
            ));
        }
        if !(c.floor..=c.ceiling).contains(&c.medium_threshold) {
            return Err(anyhow!(
                "confidence.medium_threshold ({}) must lie within [{}, {}]",
                c.medium_threshold,
                c.floor,
                c.ceiling
            ));
        }

        if self.assist.timeout_ms == 0 {
            return Err(anyhow!("assist.timeout_ms must be greater than zero"));
        }
        validate_positive("assist.max_candidates", self.assist.max_candidates)?;
        validate_positive("limits.max_relevant_files", self.limits.max_relevant_files)?;
        validate_positive("limits.max_questions", self.limits.max_questions)?;
        validate_positive("limits.max_alternatives", self.limits.max_alternatives)?;
        Ok(())
    }
}

fn validate_unit(key: &str, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(anyhow!("{key} must be within [0, 1] (got {value})"));
    }
    Ok(())
}

fn validate_positive(key: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(anyhow!("{key} must be greater than zero"));
    }
    Ok(())
}
