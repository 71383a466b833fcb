//! Idiom and side-effect detection over raw text
//!
//! Every test is case-sensitive containment or a small regex. Categories are
//! evaluated in a fixed order and each category yields at most one match.

use codelens_shared::{PatternKind, PatternMatch, Result, SideEffect, SideEffectKind};
use regex::Regex;

/// Detects coding idioms and side-effect categories in a snippet
pub struct PatternDetector {
    async_keyword: Regex,
    await_keyword: Regex,
    callback_argument: Regex,
}

impl PatternDetector {
    pub fn new() -> Result<Self> {
        Ok(Self {
            async_keyword: Regex::new(r"\basync\b")?,
            await_keyword: Regex::new(r"\bawait\b")?,
            // a `function (...)` literal appearing as a call argument
            callback_argument: Regex::new(r"[\w$\])]\s*\((?:[^()]*,)?\s*function\s*[\w$]*\s*\(")?,
        })
    }

    /// Detected idioms, in category order: async style, functional, module, serialization
    pub fn detect_patterns(&self, text: &str) -> Vec<PatternMatch> {
        [
            self.async_style(text),
            functional_style(text),
            module_style(text),
            serialization(text),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Side-effect categories present in the text, each reported once
    pub fn detect_side_effects(&self, text: &str) -> Vec<SideEffect> {
        let checks: [(SideEffectKind, &[&str], &str); 4] = [
            (
                SideEffectKind::Dom,
                &["document.", "window.", "element."],
                "Modifies the DOM",
            ),
            (
                SideEffectKind::Network,
                &["fetch(", "axios.", "XMLHttpRequest"],
                "Makes network requests",
            ),
            (
                SideEffectKind::Storage,
                &["localStorage", "sessionStorage", "cookies"],
                "Accesses browser storage",
            ),
            (
                SideEffectKind::Timer,
                &["setTimeout", "setInterval"],
                "Schedules timers",
            ),
        ];

        checks
            .into_iter()
            .filter(|(_, needles, _)| contains_any(text, needles))
            .map(|(kind, _, description)| SideEffect {
                kind,
                description: description.to_string(),
            })
            .collect()
    }

    /// async/await wins over promise chains, which win over callbacks
    fn async_style(&self, text: &str) -> Option<PatternMatch> {
        // either keyword alone is enough
        let name = if self.async_keyword.is_match(text) || self.await_keyword.is_match(text) {
            "Async/Await"
        } else if text.contains(".then(") && text.contains(".catch(") {
            "Promise Chain"
        } else if self.callback_argument.is_match(text) {
            "Callback"
        } else {
            return None;
        };
        Some(pattern(PatternKind::Async, name))
    }
}

fn functional_style(text: &str) -> Option<PatternMatch> {
    (contains_any(text, &[".map(", ".filter(", ".reduce("]) && text.contains("=>"))
        .then(|| pattern(PatternKind::Functional, "Functional Array Methods"))
}

fn module_style(text: &str) -> Option<PatternMatch> {
    if text.contains("module.exports") {
        Some(pattern(PatternKind::Module, "CommonJS Module"))
    } else if contains_any(text, &["export default", "export const"]) {
        Some(pattern(PatternKind::Module, "ES Module"))
    } else {
        None
    }
}

fn serialization(text: &str) -> Option<PatternMatch> {
    contains_any(text, &["JSON.parse", "JSON.stringify"])
        .then(|| pattern(PatternKind::Serialization, "JSON Serialization"))
}

fn pattern(kind: PatternKind, name: &str) -> PatternMatch {
    PatternMatch {
        kind,
        name: name.to_string(),
    }
}

pub(crate) fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}
