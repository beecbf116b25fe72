//! # Intent Protocol
//!
//! Wire types shared by the resolution engine and the collaborators around it.
//!
//! Inputs come from outside the engine (`ProjectContext` from a file scanner,
//! `Preferences` from the user's settings); outputs go to a code generator and a
//! response formatter (`ResolutionResult`). Struct fields travel as camelCase,
//! enum values as snake_case.

use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod interpretation;
pub mod paths;

pub use interpretation::{
    ActionTag, Area, AssistReport, AssistStatus, BonusKind, Candidate, CandidateSource, Category,
    ContextAnalysis, Intensity, PatternFamily, PatternMatchSet, RankedCandidate,
    ResolutionResult, ScoreAdjustment, FALLBACK_INTERPRETATION,
};

/// Project situation supplied by the file scanner / git analyzer.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContext {
    pub primary_language: Option<String>,
    #[serde(default)]
    pub framework: Option<String>,
    #[serde(default)]
    pub focus_area: Option<FocusArea>,
    /// Pre-ranked by the supplier, most relevant first.
    #[serde(default)]
    pub relevant_files: Vec<RelevantFile>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FocusArea {
    pub directory: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelevantFile {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl RelevantFile {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub ai_personality: Option<AiPersonality>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AiPersonality {
    /// 1 (polite) ..= 10 (maximum sass).
    #[serde(default = "default_sass_level")]
    pub sass_level: u8,
    #[serde(default)]
    pub verbosity: Verbosity,
    /// Only used by the response decorator, never by the engine.
    #[serde(default)]
    pub explanation_style: Option<String>,
}

impl Default for AiPersonality {
    fn default() -> Self {
        Self {
            sass_level: default_sass_level(),
            verbosity: Verbosity::default(),
            explanation_style: None,
        }
    }
}

const fn default_sass_level() -> u8 {
    5
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    Concise,
    #[default]
    Normal,
    Detailed,
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub hint: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            hint: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}
