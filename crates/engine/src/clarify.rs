use intent_protocol::{Candidate, ProjectContext, RankedCandidate};

const MENU_SIZE: usize = 3;
const FUNCTIONALITY_QUESTION: &str = "What specific functionality should this have?";
const SCOPE_QUESTION: &str = "Which files or components should be affected?";

/// Statements the code generator will act on unless the user objects.
pub fn assumptions(top: &Candidate, context: Option<&ProjectContext>) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(ctx) = context {
        if let Some(language) = non_empty(ctx.primary_language.as_deref()) {
            out.push(format!("You're working in {language}"));
        }
        if let Some(framework) = non_empty(ctx.framework.as_deref()) {
            out.push(format!("The project uses {framework}"));
        }
        if let Some(dir) = non_empty(ctx.focus_area.as_ref().map(|f| f.directory.as_str())) {
            out.push(format!("Changes should focus on {dir}"));
        }
    }

    out.push(format!("You want me to {}", top.action.phrase()));
    if let Some(statement) = top.category.assumption() {
        out.push(statement.to_string());
    }

    out
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clarification {
    pub questions: Vec<String>,
    pub alternatives: Vec<RankedCandidate>,
}

pub struct ClarificationLimits {
    pub max_questions: usize,
    pub max_alternatives: usize,
}

/// Only called when confidence is below the medium threshold. Produces a menu
/// of the top candidates (when there is a choice), the two generic questions,
/// then any questions the assist producer suggested, capped at
/// `max_questions`.
pub fn clarify(
    ranked: &[RankedCandidate],
    assist_questions: &[String],
    limits: &ClarificationLimits,
) -> Clarification {
    let mut questions: Vec<String> = Vec::new();
    let mut push = |q: String| {
        if !questions.contains(&q) {
            questions.push(q);
        }
    };

    if ranked.len() > 1 {
        for r in ranked.iter().take(MENU_SIZE) {
            push(format!("Did you mean: {}?", r.candidate.description));
        }
    }
    push(FUNCTIONALITY_QUESTION.to_string());
    push(SCOPE_QUESTION.to_string());
    for q in assist_questions {
        let q = q.trim();
        if !q.is_empty() {
            push(q.to_string());
        }
    }
    questions.truncate(limits.max_questions);

    let alternatives = ranked
        .iter()
        .skip(1)
        .take(limits.max_alternatives)
        .cloned()
        .collect();

    Clarification {
        questions,
        alternatives,
    }
}
