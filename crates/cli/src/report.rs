use intent_protocol::{CandidateSource, ResolutionResult};

/// Human-readable summary of one resolution.
pub fn render_text_report(result: &ResolutionResult) -> String {
    let mut out = String::new();
    let top = &result.top_candidate;

    out.push_str(&format!("Request:        {}\n", truncate_one_line(&result.original_text, 120)));
    out.push_str(&format!("Interpretation: {}\n", result.interpretation));
    out.push_str(&format!(
        "Action:         {} ({})\n",
        result.specific_action.as_str(),
        top.candidate.category.as_str()
    ));
    out.push_str(&format!(
        "Confidence:     {:.2}{}\n",
        result.confidence,
        if result.needs_more_info {
            "  (needs more info)"
        } else {
            ""
        }
    ));
    out.push_str(&format!(
        "Area:           {}\n",
        result.context_analysis.area.as_str()
    ));
    if let Some(focus) = &result.context_analysis.suggested_focus {
        out.push_str(&format!("Focus:          {focus}\n"));
    }

    if !top.candidate.suggested_actions.is_empty() {
        out.push_str("\nSteps:\n");
        for (idx, step) in top.candidate.suggested_actions.iter().enumerate() {
            out.push_str(&format!("  {}. {step}\n", idx + 1));
        }
    }

    if !result.assumptions.is_empty() {
        out.push_str("\nAssumptions:\n");
        for assumption in &result.assumptions {
            out.push_str(&format!("  - {assumption}\n"));
        }
    }

    if !result.alternative_interpretations.is_empty() {
        out.push_str("\nAlternatives:\n");
        for alt in &result.alternative_interpretations {
            out.push_str(&format!(
                "  - {} [{}, score {:.2}{}]\n",
                alt.candidate.description,
                alt.candidate.action.as_str(),
                alt.final_score,
                source_suffix(alt.candidate.source)
            ));
        }
    }

    if !result.clarifying_questions.is_empty() {
        out.push_str("\nQuestions:\n");
        for question in &result.clarifying_questions {
            out.push_str(&format!("  ? {question}\n"));
        }
    }

    out.push_str(&format!("\nAssist: {}", result.assist.status.as_str()));
    if let Some(detail) = &result.assist.detail {
        out.push_str(&format!(" ({})", truncate_one_line(detail, 80)));
    }
    out.push('\n');

    out
}

fn source_suffix(source: CandidateSource) -> &'static str {
    match source {
        CandidateSource::RuleBased => "",
        CandidateSource::AiEnhanced => ", ai",
    }
}

fn truncate_one_line(text: &str, max_chars: usize) -> String {
    let one_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if one_line.chars().count() <= max_chars {
        return one_line;
    }
    let mut out: String = one_line.chars().take(max_chars.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
