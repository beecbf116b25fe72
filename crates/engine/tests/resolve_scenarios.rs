use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use intent_engine::{
    ActionTag, Area, AssistStatus, CandidateSource, Category, ExternalServiceError,
    IntentResolver, PatternFamily, PromptPair, ResolveError, ResolverConfig, TextGenerator,
};
use intent_protocol::{
    AiPersonality, FocusArea, Preferences, ProjectContext, RelevantFile, Verbosity,
};
use pretty_assertions::assert_eq;

const AI_REPLY: &str = r#"{
    "interpretations": [
        {
            "description": "Wire the header component to the session store",
            "action": "implement_frontend_feature",
            "confidence": 0.65,
            "suggestedActions": ["Open Header.tsx", "Read the session", "Render the user", "Add a test"]
        },
        {
            "description": "Fix the broken header render",
            "action": "debug_and_fix",
            "confidence": 0.3,
            "suggestedActions": ["Check the console"]
        }
    ],
    "clarifyingQuestions": ["Which header do you mean?"]
}"#;

struct Scripted {
    reply: Result<String, ()>,
    calls: AtomicUsize,
}

impl Scripted {
    fn ok(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Err(()),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TextGenerator for Scripted {
    async fn complete(&self, _prompt: &PromptPair) -> Result<String, ExternalServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply
            .clone()
            .map_err(|_| ExternalServiceError::Status {
                status: 503,
                body: "overloaded".to_string(),
            })
    }
}

struct Hanging;

#[async_trait]
impl TextGenerator for Hanging {
    async fn complete(&self, _prompt: &PromptPair) -> Result<String, ExternalServiceError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(AI_REPLY.to_string())
    }
}

fn frontend_context() -> ProjectContext {
    ProjectContext {
        primary_language: Some("typescript".to_string()),
        framework: Some("react".to_string()),
        focus_area: None,
        relevant_files: vec![
            RelevantFile::new("src/components/Header.tsx"),
            RelevantFile::new("src/components/Footer.tsx"),
        ],
    }
}

fn assert_invariants(result: &intent_engine::ResolutionResult) {
    assert!((0.1..=1.0).contains(&result.confidence), "{}", result.confidence);
    assert_eq!(result.needs_more_info, result.confidence < 0.5);
    assert_eq!(result.needs_more_info, !result.clarifying_questions.is_empty());
    assert!(result.clarifying_questions.len() <= 5);
    assert!(result.alternative_interpretations.len() <= 2);
    assert!(!result
        .alternative_interpretations
        .iter()
        .any(|alt| alt == &result.top_candidate));
}

#[tokio::test]
async fn fix_the_error_is_a_confident_debugging_request() {
    let result = IntentResolver::default()
        .resolve("fix the error", None, None)
        .await
        .unwrap();

    assert!(result.detected_patterns.fired(PatternFamily::ErrorFixes));
    assert_eq!(result.top_candidate.candidate.category, Category::Debugging);
    assert_eq!(result.specific_action, ActionTag::DebugAndFix);
    assert!(result.confidence >= 0.8);
    assert!(!result.needs_more_info);
    assert!(result.clarifying_questions.is_empty());
    assert!(result.alternative_interpretations.is_empty());
    assert_eq!(
        result.assumptions,
        vec![
            "You want me to find and fix the errors in your code",
            "There are existing errors that need fixing",
        ]
    );
    assert_invariants(&result);
}

#[tokio::test]
async fn do_stuff_needs_more_information() {
    let result = IntentResolver::default()
        .resolve("do stuff", None, None)
        .await
        .unwrap();

    assert_eq!(
        result.detected_patterns.fired_families(),
        vec![PatternFamily::VagueDescriptions]
    );
    assert_eq!(result.top_candidate.candidate.confidence, 0.5);
    assert!(result.confidence < 0.5);
    assert!(result.needs_more_info);
    assert!(result.clarifying_questions.len() >= 2);
    assert_invariants(&result);
}

#[tokio::test]
async fn make_the_thing_work_prefers_the_frontend_reading() {
    let ctx = frontend_context();
    let result = IntentResolver::default()
        .resolve("make the thing work", Some(&ctx), None)
        .await
        .unwrap();

    assert_eq!(result.context_analysis.area, Area::Frontend);
    let top = &result.top_candidate;
    assert_eq!(top.candidate.action, ActionTag::ImplementFrontendFeature);
    assert_eq!(top.candidate.category, Category::Frontend);
    assert_eq!(top.final_score, 0.8);
    assert!(result
        .top_candidate
        .score_breakdown
        .iter()
        .any(|adj| adj.kind == intent_protocol::BonusKind::CategoryMatch));
    assert_eq!(result.context_analysis.relevant_files.len(), 2);
    assert_eq!(
        result.context_analysis.suggested_focus.as_deref(),
        Some("src/components")
    );
    assert!(result
        .assumptions
        .contains(&"You're working in typescript".to_string()));
    assert_invariants(&result);
}

#[tokio::test]
async fn same_request_without_context_gets_no_area_bonus() {
    let result = IntentResolver::default()
        .resolve("make the thing work", None, None)
        .await
        .unwrap();

    assert_eq!(result.context_analysis.area, Area::Unknown);
    assert_eq!(result.specific_action, ActionTag::GeneralImplementation);
    assert!(result.top_candidate.score_breakdown.is_empty());
    assert_invariants(&result);
}

#[tokio::test]
async fn empty_and_blank_input_are_rejected() {
    let resolver = IntentResolver::default();
    let ctx = frontend_context();
    for text in ["", "   ", "\n\t", "?!..."] {
        let err = resolver.resolve(text, Some(&ctx), None).await.unwrap_err();
        assert!(matches!(err, ResolveError::EmptyInput), "{text:?}: {err}");
        assert_eq!(err.code(), "empty_input");
    }
    assert!(matches!(
        resolver.resolve_or_fallback("  ", None, None).await,
        Err(ResolveError::EmptyInput)
    ));
}

#[tokio::test]
async fn repeated_calls_serialize_identically() {
    let generator = Scripted::ok(AI_REPLY);
    let resolver = IntentResolver::default().with_generator(generator.clone());
    let ctx = frontend_context();
    let prefs = Preferences {
        ai_personality: Some(AiPersonality {
            sass_level: 8,
            verbosity: Verbosity::Detailed,
            explanation_style: None,
        }),
    };

    let first = resolver
        .resolve("make the header thing work asap", Some(&ctx), Some(&prefs))
        .await
        .unwrap();
    let second = resolver
        .resolve("make the header thing work asap", Some(&ctx), Some(&prefs))
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn ai_candidates_are_ranked_with_their_bonus() {
    let resolver = IntentResolver::default().with_generator(Scripted::ok(AI_REPLY));
    let ctx = frontend_context();
    let result = resolver
        .resolve("make the header thing work", Some(&ctx), None)
        .await
        .unwrap();

    assert_eq!(result.assist.status, AssistStatus::Produced);
    assert_eq!(result.assist.candidates, 2);
    // 0.65 + ai 0.1 + category 0.2 + specificity 0.1, capped
    assert_eq!(result.top_candidate.candidate.source, CandidateSource::AiEnhanced);
    assert_eq!(result.top_candidate.final_score, 1.0);
    assert_eq!(
        result.interpretation,
        "Wire the header component to the session store"
    );
    assert_invariants(&result);
}

#[tokio::test]
async fn generator_failure_degrades_to_rules() {
    let resolver = IntentResolver::default().with_generator(Scripted::failing());
    let result = resolver.resolve("do stuff", None, None).await.unwrap();

    assert_eq!(result.assist.status, AssistStatus::ServiceFailed);
    assert!(result.assist.is_degraded());
    assert_eq!(result.top_candidate.candidate.source, CandidateSource::RuleBased);
    assert!(result
        .alternative_interpretations
        .iter()
        .all(|alt| alt.candidate.source == CandidateSource::RuleBased));
    assert!(result.needs_more_info);
    assert_invariants(&result);
}

#[tokio::test(start_paused = true)]
async fn generator_timeout_degrades_to_rules() {
    let mut config = ResolverConfig::default();
    config.assist.timeout_ms = 250;
    let resolver = IntentResolver::new(config).with_generator(Arc::new(Hanging));

    let result = resolver.resolve("fix the error", None, None).await.unwrap();

    assert_eq!(result.assist.status, AssistStatus::TimedOut);
    assert_eq!(result.specific_action, ActionTag::DebugAndFix);
    assert!(!result.needs_more_info);
    assert_invariants(&result);
}

#[tokio::test]
async fn malformed_reply_degrades_to_rules() {
    let resolver =
        IntentResolver::default().with_generator(Scripted::ok("Sorry, I can't help with that."));
    let result = resolver.resolve("fix the error", None, None).await.unwrap();
    assert_eq!(result.assist.status, AssistStatus::DecodeFailed);
    assert_eq!(result.top_candidate.candidate.source, CandidateSource::RuleBased);
}

#[tokio::test]
async fn degraded_and_disabled_runs_agree_on_the_answer() {
    let disabled = IntentResolver::default()
        .resolve("add a button to the page", None, None)
        .await
        .unwrap();
    let degraded = IntentResolver::default()
        .with_generator(Scripted::failing())
        .resolve("add a button to the page", None, None)
        .await
        .unwrap();

    assert_eq!(disabled.assist.status, AssistStatus::Disabled);
    assert_eq!(disabled.top_candidate, degraded.top_candidate);
    assert_eq!(disabled.confidence, degraded.confidence);
    assert_eq!(disabled.needs_more_info, degraded.needs_more_info);
}

#[tokio::test]
async fn focus_area_raises_confidence_and_is_assumed() {
    let mut ctx = frontend_context();
    ctx.focus_area = Some(FocusArea {
        directory: "src/components".to_string(),
    });
    let result = IntentResolver::default()
        .resolve("make the thing work", Some(&ctx), None)
        .await
        .unwrap();

    // 0.6 base + 0.1 focus + 0.1 density (thing, make, work)
    assert_eq!(result.confidence, 0.8);
    assert!(result
        .assumptions
        .contains(&"Changes should focus on src/components".to_string()));
}

#[tokio::test]
async fn low_confidence_lists_alternatives_and_a_menu() {
    // only thing_references fires, so the rules offer just the 0.3 fallback
    let result = IntentResolver::default()
        .with_generator(Scripted::ok(
            r#"{"interpretations": [
                {"description": "Speed up the build", "action": "update_configuration", "confidence": 0.2},
                {"description": "Refactor the parser", "action": "improve_code", "confidence": 0.25}
            ]}"#,
        ))
        .resolve("the thing", None, None)
        .await
        .unwrap();

    assert!(result.needs_more_info);
    assert_eq!(result.alternative_interpretations.len(), 2);
    assert_eq!(
        result.clarifying_questions[0],
        format!("Did you mean: {}?", result.interpretation)
    );
    assert_invariants(&result);
}

#[tokio::test]
async fn disabling_assist_in_config_skips_the_generator() {
    let generator = Scripted::ok(AI_REPLY);
    let mut config = ResolverConfig::default();
    config.assist.enabled = false;
    let resolver = IntentResolver::new(config).with_generator(generator.clone());

    let result = resolver.resolve("fix the error", None, None).await.unwrap();

    assert_eq!(result.assist.status, AssistStatus::Disabled);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}
