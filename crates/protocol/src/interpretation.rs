use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::RelevantFile;

pub const FALLBACK_INTERPRETATION: &str = "I couldn't understand that — try rephrasing";

/// Named group of lexical rules. Declaration order is the serialization order.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum PatternFamily {
    ThingReferences,
    MakeActions,
    VagueDescriptions,
    ErrorFixes,
    UiActions,
}

impl PatternFamily {
    pub const ALL: [PatternFamily; 5] = [
        PatternFamily::ThingReferences,
        PatternFamily::MakeActions,
        PatternFamily::VagueDescriptions,
        PatternFamily::ErrorFixes,
        PatternFamily::UiActions,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            PatternFamily::ThingReferences => "thing_references",
            PatternFamily::MakeActions => "make_actions",
            PatternFamily::VagueDescriptions => "vague_descriptions",
            PatternFamily::ErrorFixes => "error_fixes",
            PatternFamily::UiActions => "ui_actions",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Low,
    #[default]
    Medium,
    High,
}

/// Literal matches per family. Every family is always present.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatternMatchSet {
    pub matches: BTreeMap<PatternFamily, Vec<String>>,
    pub intensity: Intensity,
}

impl Default for PatternMatchSet {
    fn default() -> Self {
        Self {
            matches: PatternFamily::ALL
                .iter()
                .map(|family| (*family, Vec::new()))
                .collect(),
            intensity: Intensity::Medium,
        }
    }
}

impl PatternMatchSet {
    pub fn get(&self, family: PatternFamily) -> &[String] {
        self.matches
            .get(&family)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn fired(&self, family: PatternFamily) -> bool {
        !self.get(family).is_empty()
    }

    pub fn fired_families(&self) -> Vec<PatternFamily> {
        PatternFamily::ALL
            .into_iter()
            .filter(|family| self.fired(*family))
            .collect()
    }

    pub fn total_matches(&self) -> usize {
        self.matches.values().map(Vec::len).sum()
    }
}

/// Coarse project bucket a request most likely applies to.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Area {
    Frontend,
    Backend,
    Testing,
    Config,
    #[default]
    Unknown,
}

impl Area {
    /// Scoring buckets in tie-break order.
    pub const BUCKETS: [Area; 4] = [Area::Frontend, Area::Backend, Area::Testing, Area::Config];

    pub const fn as_str(self) -> &'static str {
        match self {
            Area::Frontend => "frontend",
            Area::Backend => "backend",
            Area::Testing => "testing",
            Area::Config => "config",
            Area::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContextAnalysis {
    pub area: Area,
    pub relevant_files: Vec<RelevantFile>,
    pub suggested_focus: Option<String>,
}

impl ContextAnalysis {
    pub fn unknown() -> Self {
        Self::default()
    }
}

/// Concrete thing the downstream code generator is asked to do.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActionTag {
    DebugAndFix,
    CreateUiComponent,
    ImplementFrontendFeature,
    ImplementBackendFeature,
    WriteTests,
    UpdateConfiguration,
    GeneralImplementation,
    ImproveCode,
}

impl ActionTag {
    pub const ALL: [ActionTag; 8] = [
        ActionTag::DebugAndFix,
        ActionTag::CreateUiComponent,
        ActionTag::ImplementFrontendFeature,
        ActionTag::ImplementBackendFeature,
        ActionTag::WriteTests,
        ActionTag::UpdateConfiguration,
        ActionTag::GeneralImplementation,
        ActionTag::ImproveCode,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ActionTag::DebugAndFix => "debug_and_fix",
            ActionTag::CreateUiComponent => "create_ui_component",
            ActionTag::ImplementFrontendFeature => "implement_frontend_feature",
            ActionTag::ImplementBackendFeature => "implement_backend_feature",
            ActionTag::WriteTests => "write_tests",
            ActionTag::UpdateConfiguration => "update_configuration",
            ActionTag::GeneralImplementation => "general_implementation",
            ActionTag::ImproveCode => "improve_code",
        }
    }

    /// Natural-language restatement, completes "You want me to ...".
    pub const fn phrase(self) -> &'static str {
        match self {
            ActionTag::DebugAndFix => "find and fix the errors in your code",
            ActionTag::CreateUiComponent => "build or adjust a user interface component",
            ActionTag::ImplementFrontendFeature => "implement a feature on the frontend",
            ActionTag::ImplementBackendFeature => "implement a feature on the backend",
            ActionTag::WriteTests => "write or update tests",
            ActionTag::UpdateConfiguration => "change the project configuration",
            ActionTag::GeneralImplementation => "implement the requested functionality",
            ActionTag::ImproveCode => "improve the existing code",
        }
    }

    pub const fn default_category(self) -> Category {
        match self {
            ActionTag::DebugAndFix => Category::Debugging,
            ActionTag::CreateUiComponent | ActionTag::ImplementFrontendFeature => {
                Category::Frontend
            }
            ActionTag::ImplementBackendFeature => Category::Backend,
            ActionTag::WriteTests => Category::Testing,
            ActionTag::UpdateConfiguration => Category::Config,
            ActionTag::GeneralImplementation => Category::General,
            ActionTag::ImproveCode => Category::Improvement,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Debugging,
    Frontend,
    Backend,
    Testing,
    Config,
    Improvement,
    General,
}

impl Category {
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Debugging => "debugging",
            Category::Frontend => "frontend",
            Category::Backend => "backend",
            Category::Testing => "testing",
            Category::Config => "config",
            Category::Improvement => "improvement",
            Category::General => "general",
        }
    }

    /// `Area::Unknown` matches nothing.
    pub const fn matches_area(self, area: Area) -> bool {
        matches!(
            (self, area),
            (Category::Frontend, Area::Frontend)
                | (Category::Backend, Area::Backend)
                | (Category::Testing, Area::Testing)
                | (Category::Config, Area::Config)
        )
    }

    pub const fn assumption(self) -> Option<&'static str> {
        match self {
            Category::Debugging => Some("There are existing errors that need fixing"),
            Category::Frontend => Some("The change affects the user interface"),
            Category::Backend => Some("The change affects server-side logic"),
            Category::Testing => Some("Tests need to be written or updated"),
            Category::Config => Some("The project configuration needs to change"),
            Category::Improvement => Some("The existing code works but should be improved"),
            Category::General => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    RuleBased,
    AiEnhanced,
}

/// One possible reading of the request.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub description: String,
    pub action: ActionTag,
    pub confidence: f64,
    pub suggested_actions: Vec<String>,
    pub source: CandidateSource,
    pub category: Category,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BonusKind {
    AiEnhanced,
    CategoryMatch,
    Specificity,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreAdjustment {
    pub kind: BonusKind,
    pub amount: f64,
}

/// Candidate plus the score it was ranked by.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub final_score: f64,
    pub score_breakdown: Vec<ScoreAdjustment>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssistStatus {
    #[default]
    Disabled,
    Produced,
    TimedOut,
    ServiceFailed,
    DecodeFailed,
}

impl AssistStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            AssistStatus::Disabled => "disabled",
            AssistStatus::Produced => "produced",
            AssistStatus::TimedOut => "timed_out",
            AssistStatus::ServiceFailed => "service_failed",
            AssistStatus::DecodeFailed => "decode_failed",
        }
    }
}

/// What the AI-assisted producer did for this request.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssistReport {
    pub status: AssistStatus,
    pub candidates: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clarifying_questions: Vec<String>,
}

impl AssistReport {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn failed(status: AssistStatus, detail: impl Into<String>) -> Self {
        Self {
            status,
            candidates: 0,
            detail: Some(detail.into()),
            clarifying_questions: Vec::new(),
        }
    }

    /// True when a generator was consulted but contributed nothing.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self.status,
            AssistStatus::TimedOut | AssistStatus::ServiceFailed | AssistStatus::DecodeFailed
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    pub original_text: String,
    pub interpretation: String,
    pub specific_action: ActionTag,
    pub top_candidate: RankedCandidate,
    pub assumptions: Vec<String>,
    pub confidence: f64,
    pub alternative_interpretations: Vec<RankedCandidate>,
    pub needs_more_info: bool,
    pub clarifying_questions: Vec<String>,
    pub detected_patterns: PatternMatchSet,
    pub context_analysis: ContextAnalysis,
    pub assist: AssistReport,
}

impl ResolutionResult {
    /// Generic stand-in a caller shows when the engine itself failed.
    pub fn fallback(original_text: impl Into<String>) -> Self {
        let candidate = Candidate {
            description: FALLBACK_INTERPRETATION.to_string(),
            action: ActionTag::GeneralImplementation,
            confidence: 0.1,
            suggested_actions: Vec::new(),
            source: CandidateSource::RuleBased,
            category: Category::General,
        };
        Self {
            original_text: original_text.into(),
            interpretation: FALLBACK_INTERPRETATION.to_string(),
            specific_action: candidate.action,
            top_candidate: RankedCandidate {
                candidate,
                final_score: 0.1,
                score_breakdown: Vec::new(),
            },
            assumptions: Vec::new(),
            confidence: 0.1,
            alternative_interpretations: Vec::new(),
            needs_more_info: true,
            clarifying_questions: vec!["Could you rephrase what you would like me to do?".into()],
            detected_patterns: PatternMatchSet::default(),
            context_analysis: ContextAnalysis::unknown(),
            assist: AssistReport::disabled(),
        }
    }
}
