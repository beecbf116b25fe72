use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use intent_protocol::{Preferences, ProjectContext, ResolutionResult};
use sha2::{Digest, Sha256};

use crate::assist::{assist_candidates, AssistRequest, TextGenerator};
use crate::clarify::{assumptions, clarify, Clarification, ClarificationLimits};
use crate::confidence::overall_confidence;
use crate::config::ResolverConfig;
use crate::context::ContextAnalyzer;
use crate::error::{ResolveError, Result};
use crate::normalize::normalize;
use crate::patterns::PatternExtractor;
use crate::rank::Ranker;
use crate::rules::rule_candidates;

/// Stateless resolution engine. Holds only immutable configuration and an
/// optional text generator, so one instance can serve concurrent requests.
#[derive(Clone)]
pub struct IntentResolver {
    config: ResolverConfig,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl IntentResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            generator: None,
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Resolve one request. Fails only with [`ResolveError::EmptyInput`] or
    /// [`ResolveError::EngineFailure`]; generator problems are absorbed and
    /// reported in `result.assist`.
    pub async fn resolve(
        &self,
        text: &str,
        context: Option<&ProjectContext>,
        preferences: Option<&Preferences>,
    ) -> Result<ResolutionResult> {
        let hash = input_hash(text);
        let cfg = &self.config;

        let normalized = guarded("normalize", &hash, || normalize(text))?;
        if normalized.is_empty() {
            log::debug!("Rejecting empty request (input {hash})");
            return Err(ResolveError::EmptyInput);
        }
        log::debug!("Normalized request: '{normalized}'");

        let patterns = guarded("extract_patterns", &hash, || {
            PatternExtractor::extract(&normalized)
        })?;
        log::debug!(
            "Fired families: {:?}, intensity={:?}",
            patterns.fired_families(),
            patterns.intensity
        );

        let analysis = guarded("analyze_context", &hash, || {
            ContextAnalyzer::new(cfg.limits.max_relevant_files).analyze(&normalized, context)
        })?;

        // Rules never wait on the generator.
        let mut candidates = guarded("rule_candidates", &hash, || {
            rule_candidates(&patterns, analysis.area)
        })?;

        let assist = assist_candidates(
            self.generator.as_deref(),
            &AssistRequest {
                text,
                patterns: &patterns,
                analysis: &analysis,
                context,
                preferences,
            },
            &cfg.assist,
        )
        .await;
        candidates.extend(assist.candidates);

        let ranked = guarded("rank", &hash, || {
            Ranker::new(&cfg.scoring).rank(&candidates, analysis.area)
        })?;
        let Some(top) = ranked.first().cloned() else {
            return Err(failure("rank", &hash, "no candidates to rank".to_string()));
        };

        let confidence = guarded("confidence", &hash, || {
            overall_confidence(&top.candidate, context, &patterns, text, &cfg.confidence)
        })?;
        let needs_more_info = confidence < cfg.confidence.medium_threshold;

        let stated = guarded("assumptions", &hash, || assumptions(&top.candidate, context))?;
        let clarification = if needs_more_info {
            guarded("clarify", &hash, || {
                clarify(
                    &ranked,
                    &assist.report.clarifying_questions,
                    &ClarificationLimits {
                        max_questions: cfg.limits.max_questions,
                        max_alternatives: cfg.limits.max_alternatives,
                    },
                )
            })?
        } else {
            Clarification::default()
        };

        log::info!(
            "Resolved request {hash}: action={} confidence={confidence:.3} needs_more_info={needs_more_info} assist={:?}",
            top.candidate.action.as_str(),
            assist.report.status
        );

        Ok(ResolutionResult {
            original_text: text.to_string(),
            interpretation: top.candidate.description.clone(),
            specific_action: top.candidate.action,
            top_candidate: top,
            assumptions: stated,
            confidence,
            alternative_interpretations: clarification.alternatives,
            needs_more_info,
            clarifying_questions: clarification.questions,
            detected_patterns: patterns,
            context_analysis: analysis,
            assist: assist.report,
        })
    }

    /// Like [`resolve`](Self::resolve), but an engine failure becomes the
    /// generic fallback result. Empty input is still an error so the caller
    /// can re-prompt.
    pub async fn resolve_or_fallback(
        &self,
        text: &str,
        context: Option<&ProjectContext>,
        preferences: Option<&Preferences>,
    ) -> Result<ResolutionResult> {
        match self.resolve(text, context, preferences).await {
            // Already logged at error level where the failure was raised.
            Err(ResolveError::EngineFailure { .. }) => Ok(ResolutionResult::fallback(text)),
            other => other,
        }
    }
}

impl Default for IntentResolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

/// First 16 hex chars of the SHA-256 of the raw text; identifies a request in
/// logs without printing it.
pub fn input_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest
        .iter()
        .take(8)
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn failure(stage: &'static str, hash: &str, message: String) -> ResolveError {
    let err = ResolveError::EngineFailure {
        stage,
        input_hash: hash.to_string(),
        message,
    };
    log::error!("{err}");
    err
}

/// Run one deterministic stage, turning a panic into an engine failure. The
/// process panic hook still runs first, so the default hook prints the panic
/// to stderr before it is caught here.
fn guarded<T>(stage: &'static str, hash: &str, f: impl FnOnce() -> T) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unexpected panic".to_string());
        failure(stage, hash, message)
    })
}
