//! AI-assisted candidate producer.
//!
//! The external text generator is unreliable by contract: every failure mode
//! (transport, timeout, malformed reply) ends here as an empty candidate list
//! plus an [`AssistReport`] describing what went wrong.

use std::fmt::Write as _;

use async_trait::async_trait;
use intent_protocol::{
    ActionTag, AssistReport, AssistStatus, Candidate, CandidateSource, Category, ContextAnalysis,
    PatternMatchSet, Preferences, ProjectContext, Verbosity,
};
use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::AssistConfig;
use crate::error::ExternalServiceError;

/// System + user prompt and the JSON shape the reply must follow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
    pub response_schema: serde_json::Value,
}

/// External text-generation collaborator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &PromptPair) -> Result<String, ExternalServiceError>;
}

/// Reply contract sent to the generator.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssistReply {
    pub interpretations: Vec<ReplyInterpretation>,
    #[serde(default)]
    pub clarifying_questions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplyInterpretation {
    pub description: String,
    pub action: ActionTag,
    pub confidence: f64,
    #[serde(default)]
    pub suggested_actions: Vec<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub clarifying_questions: Vec<String>,
}

static REPLY_SCHEMA: Lazy<serde_json::Value> = Lazy::new(|| {
    serde_json::to_value(schemars::schema_for!(AssistReply)).unwrap_or(serde_json::Value::Null)
});

/// Everything the prompt is built from.
pub struct AssistRequest<'a> {
    pub text: &'a str,
    pub patterns: &'a PatternMatchSet,
    pub analysis: &'a ContextAnalysis,
    pub context: Option<&'a ProjectContext>,
    pub preferences: Option<&'a Preferences>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssistOutcome {
    pub candidates: Vec<Candidate>,
    pub report: AssistReport,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedReply {
    pub candidates: Vec<Candidate>,
    pub clarifying_questions: Vec<String>,
}

pub fn build_prompt(request: &AssistRequest<'_>) -> PromptPair {
    let personality = request
        .preferences
        .and_then(|p| p.ai_personality.clone())
        .unwrap_or_default();
    let sass = personality.sass_level.clamp(1, 10);

    let tone = match sass {
        1..=3 => "polite and neutral",
        4..=7 => "casual, with light humour",
        _ => "playfully sarcastic, but still helpful",
    };
    let length = match personality.verbosity {
        Verbosity::Concise => "Keep each description under 12 words.",
        Verbosity::Normal => "Keep each description to one sentence.",
        Verbosity::Detailed => "Descriptions may use two or three sentences.",
    };
    let actions = ActionTag::ALL
        .iter()
        .map(|a| a.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let categories = [
        Category::Debugging,
        Category::Frontend,
        Category::Backend,
        Category::Testing,
        Category::Config,
        Category::Improvement,
        Category::General,
    ]
    .iter()
    .map(|c| c.as_str())
    .collect::<Vec<_>>()
    .join(", ");

    let system = format!(
        "You interpret deliberately vague programming requests from a developer.\n\
         Reply with one JSON object and nothing else, shaped as \
         {{\"interpretations\": [...], \"clarifyingQuestions\": [...]}}.\n\
         Give 2 or 3 interpretations. Each has: description, action (one of: {actions}), \
         confidence (0 to 1), suggestedActions (list of short steps), \
         category (optional, one of: {categories}).\n\
         Tone: {tone} (sass level {sass}/10). {length}"
    );

    let mut user = String::new();
    let _ = writeln!(user, "Request: \"{}\"", request.text.trim());

    let fired = request.patterns.fired_families();
    if fired.is_empty() {
        let _ = writeln!(user, "Detected patterns: none");
    } else {
        let parts: Vec<String> = fired
            .iter()
            .map(|f| format!("{}=[{}]", f.as_str(), request.patterns.get(*f).join(", ")))
            .collect();
        let _ = writeln!(user, "Detected patterns: {}", parts.join("; "));
    }
    let _ = writeln!(user, "Intensity: {:?}", request.patterns.intensity);
    let _ = writeln!(user, "Likely area: {}", request.analysis.area.as_str());

    if let Some(ctx) = request.context {
        if let Some(language) = &ctx.primary_language {
            let _ = writeln!(user, "Language: {language}");
        }
        if let Some(framework) = &ctx.framework {
            let _ = writeln!(user, "Framework: {framework}");
        }
    }
    if let Some(focus) = &request.analysis.suggested_focus {
        let _ = writeln!(user, "Focus: {focus}");
    }
    if !request.analysis.relevant_files.is_empty() {
        let _ = writeln!(user, "Relevant files:");
        for file in &request.analysis.relevant_files {
            let _ = writeln!(user, "- {}", file.path);
        }
    }

    PromptPair {
        system,
        user,
        response_schema: REPLY_SCHEMA.clone(),
    }
}

/// Parse a generator reply. Any schema violation rejects the whole reply.
pub fn decode_reply(raw: &str, max_candidates: usize) -> Result<DecodedReply, String> {
    let json = extract_json_object(raw).ok_or_else(|| "no JSON object in reply".to_string())?;
    let reply: AssistReply =
        serde_json::from_str(json).map_err(|err| format!("reply does not match schema: {err}"))?;

    if reply.interpretations.is_empty() {
        return Err("reply has no interpretations".to_string());
    }

    let mut questions = reply.clarifying_questions;
    let mut candidates = Vec::new();
    for (idx, item) in reply.interpretations.into_iter().enumerate() {
        if !item.confidence.is_finite() || !(0.0..=1.0).contains(&item.confidence) {
            return Err(format!(
                "interpretation {idx} has confidence {} outside [0, 1]",
                item.confidence
            ));
        }
        let description = item.description.trim();
        if description.is_empty() {
            return Err(format!("interpretation {idx} has an empty description"));
        }
        questions.extend(item.clarifying_questions);
        if candidates.len() < max_candidates {
            candidates.push(Candidate {
                description: description.to_string(),
                action: item.action,
                confidence: item.confidence,
                suggested_actions: item
                    .suggested_actions
                    .into_iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                source: CandidateSource::AiEnhanced,
                category: item.category.unwrap_or_else(|| item.action.default_category()),
            });
        }
    }

    Ok(DecodedReply {
        candidates,
        clarifying_questions: questions,
    })
}

/// Outermost `{ ... }` span; tolerates code fences and surrounding prose.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Ask the generator for candidates. Never fails: problems are reported in
/// the outcome's [`AssistReport`].
pub async fn assist_candidates(
    generator: Option<&dyn TextGenerator>,
    request: &AssistRequest<'_>,
    cfg: &AssistConfig,
) -> AssistOutcome {
    let Some(generator) = generator.filter(|_| cfg.enabled) else {
        return AssistOutcome::default();
    };

    let prompt = build_prompt(request);
    let timeout = cfg.timeout();
    let reply = match tokio::time::timeout(timeout, generator.complete(&prompt)).await {
        Ok(Ok(reply)) => reply,
        Ok(Err(err)) => {
            log::warn!("Assist producer failed: {err}");
            let status = match &err {
                ExternalServiceError::Timeout(_) => AssistStatus::TimedOut,
                ExternalServiceError::MalformedReply(_) => AssistStatus::DecodeFailed,
                _ => AssistStatus::ServiceFailed,
            };
            return AssistOutcome {
                candidates: Vec::new(),
                report: AssistReport::failed(status, err.to_string()),
            };
        }
        Err(_) => {
            let err = ExternalServiceError::Timeout(timeout);
            log::warn!("Assist producer failed: {err}");
            return AssistOutcome {
                candidates: Vec::new(),
                report: AssistReport::failed(AssistStatus::TimedOut, err.to_string()),
            };
        }
    };

    match decode_reply(&reply, cfg.max_candidates) {
        Ok(decoded) => {
            log::debug!("Assist producer returned {} candidates", decoded.candidates.len());
            AssistOutcome {
                report: AssistReport {
                    status: AssistStatus::Produced,
                    candidates: decoded.candidates.len(),
                    detail: None,
                    clarifying_questions: decoded.clarifying_questions,
                },
                candidates: decoded.candidates,
            }
        }
        Err(reason) => {
            log::warn!("Assist reply rejected: {reason}");
            AssistOutcome {
                candidates: Vec::new(),
                report: AssistReport::failed(AssistStatus::DecodeFailed, reason),
            }
        }
    }
}
