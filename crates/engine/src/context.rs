use intent_protocol::paths::{normalize_context_path, parent_directory};
use intent_protocol::{Area, ContextAnalysis, ProjectContext, RelevantFile};

const FRONTEND_KEYWORDS: &[&str] = &[
    "frontend",
    "component",
    "components",
    "ui",
    "page",
    "pages",
    "view",
    "views",
    "css",
    "scss",
    "html",
    "jsx",
    "tsx",
    "vue",
    "svelte",
    "react",
    "angular",
    "style",
    "styles",
    "button",
    "layout",
    "client",
];

const BACKEND_KEYWORDS: &[&str] = &[
    "backend",
    "server",
    "api",
    "endpoint",
    "route",
    "routes",
    "controller",
    "controllers",
    "handler",
    "database",
    "db",
    "sql",
    "model",
    "models",
    "service",
    "services",
    "auth",
    "migration",
];

const TESTING_KEYWORDS: &[&str] = &[
    "test", "tests", "testing", "spec", "specs", "jest", "pytest", "mocha", "vitest", "coverage",
    "mock", "fixture", "e2e",
];

const CONFIG_KEYWORDS: &[&str] = &[
    "config",
    "configuration",
    "settings",
    "env",
    "yaml",
    "yml",
    "toml",
    "ini",
    "docker",
    "dockerfile",
    "webpack",
    "vite",
    "tsconfig",
    "package",
    "ci",
];

const fn keywords(area: Area) -> &'static [&'static str] {
    match area {
        Area::Frontend => FRONTEND_KEYWORDS,
        Area::Backend => BACKEND_KEYWORDS,
        Area::Testing => TESTING_KEYWORDS,
        Area::Config => CONFIG_KEYWORDS,
        Area::Unknown => &[],
    }
}

pub struct ContextAnalyzer {
    max_relevant_files: usize,
}

impl ContextAnalyzer {
    pub fn new(max_relevant_files: usize) -> Self {
        Self { max_relevant_files }
    }

    /// Without a context the area is `unknown` and nothing downstream gets a
    /// context bonus.
    pub fn analyze(&self, normalized: &str, context: Option<&ProjectContext>) -> ContextAnalysis {
        let Some(context) = context else {
            return ContextAnalysis::unknown();
        };

        let relevant_files: Vec<RelevantFile> = context
            .relevant_files
            .iter()
            .take(self.max_relevant_files)
            .map(|file| RelevantFile {
                path: normalize_context_path(&file.path),
                content: file.content.clone(),
            })
            .collect();

        let names = Self::context_names(context);
        let area = Self::select_area(normalized, &names);

        let suggested_focus = context
            .focus_area
            .as_ref()
            .map(|focus| normalize_context_path(&focus.directory))
            .filter(|dir| !dir.is_empty())
            .or_else(|| {
                relevant_files
                    .first()
                    .and_then(|file| parent_directory(&file.path))
            });

        log::debug!(
            "Context analysis: area={} files={} focus={:?}",
            area.as_str(),
            relevant_files.len(),
            suggested_focus
        );

        ContextAnalysis {
            area,
            relevant_files,
            suggested_focus,
        }
    }

    /// Lower-cased names scored by substring: every relevant file path, the
    /// framework and the focus directory.
    fn context_names(context: &ProjectContext) -> Vec<String> {
        let mut names: Vec<String> = context
            .relevant_files
            .iter()
            .map(|file| normalize_context_path(&file.path).to_lowercase())
            .collect();
        if let Some(framework) = &context.framework {
            names.push(framework.to_lowercase());
        }
        if let Some(focus) = &context.focus_area {
            names.push(normalize_context_path(&focus.directory).to_lowercase());
        }
        names
    }

    /// Highest hit count wins; ties keep the earlier bucket; all-zero is unknown.
    fn select_area(normalized: &str, names: &[String]) -> Area {
        let mut best = Area::Unknown;
        let mut best_hits = 0usize;
        for area in Area::BUCKETS {
            let hits = Self::bucket_hits(area, normalized, names);
            if hits > best_hits {
                best = area;
                best_hits = hits;
            }
        }
        best
    }

    fn bucket_hits(area: Area, normalized: &str, names: &[String]) -> usize {
        let words = keywords(area);
        let text_hits = normalized
            .split_whitespace()
            .filter(|token| words.contains(token))
            .count();
        let name_hits: usize = names
            .iter()
            .map(|name| words.iter().filter(|kw| name.contains(*kw)).count())
            .sum();
        text_hits + name_hits
    }
}
