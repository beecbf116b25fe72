use intent_protocol::{Intensity, PatternFamily, PatternMatchSet};
use once_cell::sync::Lazy;
use regex::Regex;

/// Rules are matched against normalized text, so apostrophes are already spaces
/// ("doesn t work") and multi-word phrases are listed before their single words.
const THING_REFERENCES: &[&str] = &[
    "whatchamacallit",
    "doohickey",
    "thingie",
    "thingy",
    "things",
    "thing",
    "gizmo",
    "widget",
];

const MAKE_ACTIONS: &[&str] = &[
    "set up",
    "setup",
    "make",
    "build",
    "create",
    "add",
    "implement",
    "write",
    "generate",
];

const VAGUE_DESCRIPTIONS: &[&str] = &[
    "stuff",
    "something",
    "whatever",
    "somehow",
    "etc",
    "kinda",
    "sorta",
    "better",
    "nicer",
    "properly",
    "working",
    "works",
    "work",
];

const ERROR_FIXES: &[&str] = &[
    "doesn t work",
    "isn t working",
    "not working",
    "fixed",
    "fix",
    "debug",
    "errors",
    "error",
    "bugs",
    "bug",
    "broken",
    "crashing",
    "crashes",
    "crash",
    "failing",
    "failed",
    "fails",
    "fail",
];

const UI_ACTIONS: &[&str] = &[
    "button",
    "click",
    "page",
    "screen",
    "form",
    "modal",
    "menu",
    "layout",
    "styles",
    "style",
    "css",
    "ui",
    "display",
    "responsive",
    "navbar",
    "sidebar",
];

const URGENCY_WORDS: &[&str] = &["asap", "urgent", "urgently", "now", "immediately", "quickly"];
const DEFERRAL_WORDS: &[&str] = &["whenever", "maybe", "later", "eventually", "someday"];

fn word_set(words: &[&str]) -> Regex {
    let alternation = words
        .iter()
        .map(|word| regex::escape(word))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{alternation})\b")).expect("static lexicon compiles")
}

static FAMILY_RULES: Lazy<Vec<(PatternFamily, Regex)>> = Lazy::new(|| {
    PatternFamily::ALL
        .into_iter()
        .map(|family| (family, word_set(lexicon(family))))
        .collect()
});

static URGENCY: Lazy<Regex> = Lazy::new(|| word_set(URGENCY_WORDS));
static DEFERRAL: Lazy<Regex> = Lazy::new(|| word_set(DEFERRAL_WORDS));

const fn lexicon(family: PatternFamily) -> &'static [&'static str] {
    match family {
        PatternFamily::ThingReferences => THING_REFERENCES,
        PatternFamily::MakeActions => MAKE_ACTIONS,
        PatternFamily::VagueDescriptions => VAGUE_DESCRIPTIONS,
        PatternFamily::ErrorFixes => ERROR_FIXES,
        PatternFamily::UiActions => UI_ACTIONS,
    }
}

pub struct PatternExtractor;

impl PatternExtractor {
    /// Collect literal matches per family, in order of appearance.
    #[must_use]
    pub fn extract(normalized: &str) -> PatternMatchSet {
        let matches = FAMILY_RULES
            .iter()
            .map(|(family, rule)| {
                let found = rule
                    .find_iter(normalized)
                    .map(|m| m.as_str().to_string())
                    .collect();
                (*family, found)
            })
            .collect();

        PatternMatchSet {
            matches,
            intensity: Self::intensity(normalized),
        }
    }

    /// Urgency wins over deferral when both are present.
    #[must_use]
    pub fn intensity(normalized: &str) -> Intensity {
        if URGENCY.is_match(normalized) {
            Intensity::High
        } else if DEFERRAL.is_match(normalized) {
            Intensity::Low
        } else {
            Intensity::Medium
        }
    }
}
