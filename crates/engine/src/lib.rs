//! # Intent Engine
//!
//! Turns a deliberately vague programming request ("make the thing work") into a
//! ranked, explainable set of concrete interpretations.
//!
//! ## Pipeline
//!
//! ```text
//! raw text ──> Normalizer
//!                 │
//!                 ├──> Pattern Extractor (five lexical families + intensity)
//!                 │
//!                 ├──> Context Analyzer (frontend/backend/testing/config)
//!                 │
//!                 ├──> Interpretation Generator
//!                 │      ├─ rule table (deterministic)
//!                 │      └─ text generator (best effort, bounded by a timeout)
//!                 │
//!                 ├──> Ranker (base confidence + bonuses, stable sort)
//!                 │
//!                 ├──> Confidence Calculator
//!                 │
//!                 └──> Assumptions & Clarifying Questions
//!                        └─> ResolutionResult
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use intent_engine::{IntentResolver, ResolverConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let resolver = IntentResolver::new(ResolverConfig::default());
//!     let result = resolver.resolve("fix the error", None, None).await?;
//!     println!("{} ({:.2})", result.interpretation, result.confidence);
//!     Ok(())
//! }
//! ```

mod assist;
mod clarify;
mod confidence;
mod config;
mod context;
mod error;
mod normalize;
mod patterns;
mod rank;
mod resolver;
mod rules;

pub use assist::{
    build_prompt, decode_reply, AssistReply, AssistRequest, DecodedReply, PromptPair,
    ReplyInterpretation, TextGenerator,
};
pub use config::{
    AssistConfig, ConfidenceConfig, LimitsConfig, ResolverConfig, ScoringConfig, CONFIG_ENV,
};
pub use context::ContextAnalyzer;
pub use error::{ExternalServiceError, ResolveError, Result};
pub use normalize::normalize;
pub use patterns::PatternExtractor;
pub use rank::Ranker;
pub use resolver::{input_hash, IntentResolver};
pub use rules::rule_candidates;

// Re-export wire types for convenience
pub use intent_protocol::{
    ActionTag, Area, AssistReport, AssistStatus, Candidate, CandidateSource, Category,
    ContextAnalysis, Intensity, PatternFamily, PatternMatchSet, Preferences, ProjectContext,
    RankedCandidate, ResolutionResult,
};
