use intent_protocol::{Candidate, PatternMatchSet, ProjectContext};

use crate::config::ConfidenceConfig;
use crate::rank::round_score;

/// Overall confidence in the top candidate. Starts from its base confidence,
/// not its ranking score.
pub fn overall_confidence(
    top: &Candidate,
    context: Option<&ProjectContext>,
    patterns: &PatternMatchSet,
    original_text: &str,
    cfg: &ConfidenceConfig,
) -> f64 {
    let mut confidence = top.confidence;

    if context.is_some_and(|ctx| ctx.focus_area.is_some()) {
        confidence += cfg.focus_bonus;
    }
    if patterns.total_matches() > cfg.density_min_matches {
        confidence += cfg.density_bonus;
    }
    if original_text.chars().count() < cfg.short_text_chars {
        confidence -= cfg.short_text_penalty;
    }

    round_score(confidence.clamp(cfg.floor, cfg.ceiling))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternExtractor;
    use intent_protocol::{ActionTag, CandidateSource, FocusArea};

    fn top(confidence: f64) -> Candidate {
        Candidate {
            description: String::new(),
            action: ActionTag::GeneralImplementation,
            confidence,
            suggested_actions: vec![],
            source: CandidateSource::RuleBased,
            category: ActionTag::GeneralImplementation.default_category(),
        }
    }

    fn focused() -> ProjectContext {
        ProjectContext {
            focus_area: Some(FocusArea {
                directory: "src".to_string(),
            }),
            ..ProjectContext::default()
        }
    }

    #[test]
    fn short_text_is_penalized() {
        let cfg = ConfidenceConfig::default();
        let patterns = PatternExtractor::extract("do stuff");
        assert_eq!(overall_confidence(&top(0.5), None, &patterns, "do stuff", &cfg), 0.3);
    }

    #[test]
    fn focus_and_density_add_up() {
        let cfg = ConfidenceConfig::default();
        let text = "make the thing work";
        let patterns = PatternExtractor::extract(text);
        let ctx = focused();
        assert_eq!(
            overall_confidence(&top(0.6), Some(&ctx), &patterns, text, &cfg),
            0.8
        );
    }

    #[test]
    fn two_matches_are_not_dense() {
        let cfg = ConfidenceConfig::default();
        let text = "fix the error";
        let patterns = PatternExtractor::extract(text);
        assert_eq!(overall_confidence(&top(0.8), None, &patterns, text, &cfg), 0.8);
    }

    #[test]
    fn context_without_focus_gives_nothing() {
        let cfg = ConfidenceConfig::default();
        let text = "refactor the parser module";
        let patterns = PatternExtractor::extract(text);
        let ctx = ProjectContext::default();
        assert_eq!(overall_confidence(&top(0.5), Some(&ctx), &patterns, text, &cfg), 0.5);
    }

    #[test]
    fn clamped_to_bounds() {
        let cfg = ConfidenceConfig::default();
        let patterns = PatternExtractor::extract("x");
        assert_eq!(overall_confidence(&top(0.2), None, &patterns, "x", &cfg), 0.1);

        let text = "fix the broken button and make it work asap";
        let patterns = PatternExtractor::extract(text);
        let ctx = focused();
        assert_eq!(overall_confidence(&top(1.0), Some(&ctx), &patterns, text, &cfg), 1.0);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let cfg = ConfidenceConfig::default();
        // 9 characters, 17 bytes
        let text = "почини ёж";
        let patterns = PatternExtractor::extract(text);
        assert_eq!(overall_confidence(&top(0.5), None, &patterns, text, &cfg), 0.3);
    }
}
