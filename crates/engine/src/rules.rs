use intent_protocol::{
    ActionTag, Area, Candidate, CandidateSource, Category, PatternFamily, PatternMatchSet,
};

/// Which area a row applies to. `Any` rows ignore the analyzed area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AreaGuard {
    Any,
    Only(Area),
}

/// What must have fired for a row to produce a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Family(PatternFamily, AreaGuard),
    /// No earlier row produced anything.
    Nothing,
}

#[derive(Debug)]
struct Rule {
    trigger: Trigger,
    action: ActionTag,
    confidence: f64,
    category: Category,
    description: &'static str,
    suggested_actions: &'static [&'static str],
}

/// Evaluated top to bottom; every matching row yields one candidate.
const RULES: &[Rule] = &[
    Rule {
        trigger: Trigger::Family(PatternFamily::ErrorFixes, AreaGuard::Any),
        action: ActionTag::DebugAndFix,
        confidence: 0.8,
        category: Category::Debugging,
        description: "Find and fix the errors in the existing code",
        suggested_actions: &[
            "Reproduce the failure",
            "Read the error output and stack trace",
            "Locate the failing code path",
            "Apply a fix and re-run the checks",
        ],
    },
    Rule {
        trigger: Trigger::Family(PatternFamily::UiActions, AreaGuard::Any),
        action: ActionTag::CreateUiComponent,
        confidence: 0.7,
        category: Category::Frontend,
        description: "Create or adjust a user interface component",
        suggested_actions: &[
            "Identify the component to change",
            "Update its markup and styles",
            "Wire up the interaction",
        ],
    },
    Rule {
        trigger: Trigger::Family(PatternFamily::MakeActions, AreaGuard::Only(Area::Frontend)),
        action: ActionTag::ImplementFrontendFeature,
        confidence: 0.6,
        category: Category::Frontend,
        description: "Implement the requested feature in the frontend",
        suggested_actions: &[
            "Find the components involved",
            "Implement the behaviour",
            "Check it in the browser",
        ],
    },
    Rule {
        trigger: Trigger::Family(PatternFamily::MakeActions, AreaGuard::Only(Area::Backend)),
        action: ActionTag::ImplementBackendFeature,
        confidence: 0.6,
        category: Category::Backend,
        description: "Implement the requested feature in the backend",
        suggested_actions: &[
            "Find the endpoint or service involved",
            "Implement the logic",
            "Cover it with a request-level test",
        ],
    },
    Rule {
        trigger: Trigger::Family(PatternFamily::MakeActions, AreaGuard::Only(Area::Testing)),
        action: ActionTag::WriteTests,
        confidence: 0.6,
        category: Category::Testing,
        description: "Write or update tests for the code in focus",
        suggested_actions: &["Pick the behaviour to cover", "Write the test cases", "Run the suite"],
    },
    Rule {
        trigger: Trigger::Family(PatternFamily::MakeActions, AreaGuard::Only(Area::Config)),
        action: ActionTag::UpdateConfiguration,
        confidence: 0.6,
        category: Category::Config,
        description: "Change the project configuration",
        suggested_actions: &["Find the configuration file", "Apply the change", "Verify the build"],
    },
    Rule {
        trigger: Trigger::Family(PatternFamily::MakeActions, AreaGuard::Only(Area::Unknown)),
        action: ActionTag::GeneralImplementation,
        confidence: 0.5,
        category: Category::General,
        description: "Implement the requested functionality",
        suggested_actions: &["Clarify the expected behaviour", "Implement it"],
    },
    Rule {
        trigger: Trigger::Family(PatternFamily::VagueDescriptions, AreaGuard::Any),
        action: ActionTag::ImproveCode,
        confidence: 0.5,
        category: Category::Improvement,
        description: "Improve or clean up the existing code",
        suggested_actions: &["Review the current implementation", "Refactor the rough spots"],
    },
    Rule {
        trigger: Trigger::Nothing,
        action: ActionTag::GeneralImplementation,
        confidence: 0.3,
        category: Category::General,
        description: "Work out what needs to be built and implement it",
        suggested_actions: &["Ask what the change should achieve"],
    },
];

impl Rule {
    fn applies(&self, patterns: &PatternMatchSet, area: Area, produced: bool) -> bool {
        match self.trigger {
            Trigger::Family(family, guard) => {
                patterns.fired(family)
                    && match guard {
                        AreaGuard::Any => true,
                        AreaGuard::Only(expected) => expected == area,
                    }
            }
            Trigger::Nothing => !produced,
        }
    }

    fn candidate(&self) -> Candidate {
        Candidate {
            description: self.description.to_string(),
            action: self.action,
            confidence: self.confidence,
            suggested_actions: self
                .suggested_actions
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            source: CandidateSource::RuleBased,
            category: self.category,
        }
    }
}

/// Deterministic candidates for the fired families and the analyzed area.
pub fn rule_candidates(patterns: &PatternMatchSet, area: Area) -> Vec<Candidate> {
    let mut out = Vec::new();
    for rule in RULES {
        if rule.applies(patterns, area, !out.is_empty()) {
            out.push(rule.candidate());
        }
    }
    log::debug!(
        "Rule table produced {} candidates for area={}",
        out.len(),
        area.as_str()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternExtractor;
    use pretty_assertions::assert_eq;

    fn actions(text: &str, area: Area) -> Vec<(ActionTag, f64)> {
        rule_candidates(&PatternExtractor::extract(text), area)
            .into_iter()
            .map(|c| (c.action, c.confidence))
            .collect()
    }

    #[test]
    fn error_fix_rule() {
        let out = rule_candidates(&PatternExtractor::extract("fix the error"), Area::Unknown);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].action, ActionTag::DebugAndFix);
        assert_eq!(out[0].category, Category::Debugging);
        assert_eq!(out[0].confidence, 0.8);
        assert_eq!(out[0].source, CandidateSource::RuleBased);
    }

    #[test]
    fn make_action_follows_area() {
        assert_eq!(
            actions("make a login", Area::Frontend),
            vec![(ActionTag::ImplementFrontendFeature, 0.6)]
        );
        assert_eq!(
            actions("make a login", Area::Backend),
            vec![(ActionTag::ImplementBackendFeature, 0.6)]
        );
        assert_eq!(
            actions("make a login", Area::Testing),
            vec![(ActionTag::WriteTests, 0.6)]
        );
        assert_eq!(
            actions("make a login", Area::Config),
            vec![(ActionTag::UpdateConfiguration, 0.6)]
        );
        assert_eq!(
            actions("make a login", Area::Unknown),
            vec![(ActionTag::GeneralImplementation, 0.5)]
        );
    }

    #[test]
    fn rows_are_emitted_in_table_order() {
        assert_eq!(
            actions("fix the button and make it work", Area::Frontend),
            vec![
                (ActionTag::DebugAndFix, 0.8),
                (ActionTag::CreateUiComponent, 0.7),
                (ActionTag::ImplementFrontendFeature, 0.6),
                (ActionTag::ImproveCode, 0.5),
            ]
        );
    }

    #[test]
    fn vague_only() {
        assert_eq!(
            actions("do stuff", Area::Unknown),
            vec![(ActionTag::ImproveCode, 0.5)]
        );
    }

    #[test]
    fn nothing_fired_falls_back() {
        assert_eq!(
            actions("hello there", Area::Backend),
            vec![(ActionTag::GeneralImplementation, 0.3)]
        );
    }

    #[test]
    fn thing_references_alone_fall_back() {
        assert_eq!(
            actions("the thingy", Area::Unknown),
            vec![(ActionTag::GeneralImplementation, 0.3)]
        );
    }

    #[test]
    fn table_is_reproducible() {
        let patterns = PatternExtractor::extract("make the thing work asap");
        assert_eq!(
            rule_candidates(&patterns, Area::Frontend),
            rule_candidates(&patterns, Area::Frontend)
        );
    }

    #[test]
    fn rule_categories_agree_with_action_defaults() {
        for rule in RULES {
            assert_eq!(rule.category, rule.action.default_category(), "{:?}", rule.action);
        }
    }
}
