//! Tiered natural-language explanations
//!
//! Every tier is assembled from ordered lists of rule functions. A rule
//! inspects the [`ComposeContext`] and either yields a fragment or passes.
//! For "pick one" positions the first rule that fires wins and the last
//! rule in the list always fires.

use crate::analysis::complexity::ComplexityScorer;
use crate::analysis::patterns::contains_any;
use codelens_shared::{
    ClassKind, ComplexityConfig, ComplexityResult, ConditionalKind, Explanation, FunctionRecord,
    PatternMatch, Result, ReturnValue, SideEffect, StructuralInventory,
};

/// Variables listed by name in the detailed tier
const DETAILED_VARIABLE_LIMIT: usize = 3;

/// Parameters listed by name in a function behavior sentence
const LISTED_PARAMETER_LIMIT: usize = 3;

/// Everything a rule may look at
pub struct ComposeContext<'a> {
    pub inventory: &'a StructuralInventory,
    pub source: &'a str,
    pub patterns: &'a [PatternMatch],
    pub complexity: ComplexityResult,
}

type Rule = fn(&ComposeContext<'_>) -> Option<String>;

/// Opening clause of the simple tier, by inventory shape
const SUBJECT_RULES: &[Rule] = &[
    single_function_subject,
    function_count_subject,
    class_subject,
    variable_subject,
    generic_subject,
];

/// Second clause of the simple tier, by what the text does
const ACTIVITY_RULES: &[Rule] = &[
    reduce_activity,
    map_activity,
    filter_activity,
    network_activity,
    storage_activity,
    event_activity,
    generic_activity,
];

/// Sentences appended to the simple tier to form the detailed tier, all that fire
const DETAILED_RULES: &[Rule] = &[
    function_purposes,
    variable_summary,
    pattern_summary,
    complexity_summary,
];

/// Whole-file idiom checklist of the technical tier. A feature is present
/// when every group has at least one needle in the text.
const LANGUAGE_FEATURES: &[(&str, &[&[&str]])] = &[
    ("Async/await", &[&["async", "await"]]),
    ("Try/catch error handling", &[&["try"], &["catch"]]),
    ("Functional array methods", &[&[".map(", ".filter(", ".reduce("]]),
    ("Arrow functions", &[&["=>"]]),
    ("Spread/rest operator", &[&["..."]]),
];

/// Renders explanation tiers from extracted structure
pub struct ExplanationComposer {
    scorer: ComplexityScorer,
}

impl ExplanationComposer {
    pub fn new(thresholds: ComplexityConfig) -> Result<Self> {
        Ok(Self {
            scorer: ComplexityScorer::new(thresholds)?,
        })
    }

    /// Compose all three tiers. Identical inputs always give identical output.
    pub fn compose(
        &self,
        inventory: &StructuralInventory,
        source: &str,
        patterns: &[PatternMatch],
    ) -> Explanation {
        let ctx = ComposeContext {
            inventory,
            source,
            patterns,
            complexity: self.scorer.score_structure(inventory),
        };

        let simple = Self::simple(&ctx);
        let detailed = Self::detailed(&ctx, &simple);
        let technical = Self::technical(&ctx);

        Explanation {
            simple,
            detailed,
            technical,
            complexity: ctx.complexity.level,
        }
    }

    fn simple(ctx: &ComposeContext<'_>) -> String {
        format!(
            "{}. {}.",
            first_match(SUBJECT_RULES, ctx),
            first_match(ACTIVITY_RULES, ctx)
        )
    }

    fn detailed(ctx: &ComposeContext<'_>, simple: &str) -> String {
        std::iter::once(simple.to_string())
            .chain(DETAILED_RULES.iter().filter_map(|rule| rule(ctx)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn technical(ctx: &ComposeContext<'_>) -> String {
        let inventory = ctx.inventory;
        let mut lines = vec![
            "## Technical Analysis".to_string(),
            String::new(),
            format!(
                "**Complexity:** {} (score {})",
                ctx.complexity.level, ctx.complexity.score
            ),
            String::new(),
            "### Structure".to_string(),
            format!("- Functions: {}", inventory.functions.len()),
            format!("- Classes: {}", inventory.classes.len()),
            format!("- Loops: {}", inventory.loops.len()),
            format!("- Conditionals: {}", inventory.conditionals.len()),
            format!("- Variables: {}", inventory.variables.len()),
            format!("- Imports: {}", inventory.imports.len()),
        ];

        if !inventory.functions.is_empty() {
            lines.push(String::new());
            lines.push("### Functions".to_string());
            lines.extend(inventory.functions.iter().map(|function| {
                format!(
                    "- `{}({})`: {}",
                    function.name,
                    function.params.join(", "),
                    function_role(&function.name)
                )
            }));
        }

        if !inventory.classes.is_empty() {
            lines.push(String::new());
            lines.push("### Classes".to_string());
            lines.extend(inventory.classes.iter().map(|class| {
                let kind = match class.kind {
                    ClassKind::Class => "class",
                    ClassKind::Interface => "interface",
                    ClassKind::Enum => "enum",
                };
                match &class.extends {
                    Some(base) => format!("- `{}` ({}) extends `{}`", class.name, kind, base),
                    None => format!("- `{}` ({})", class.name, kind),
                }
            }));
        }

        if !ctx.patterns.is_empty() {
            lines.push(String::new());
            lines.push("### Patterns".to_string());
            lines.extend(ctx.patterns.iter().map(|pattern| format!("- {}", pattern.name)));
        }

        lines.push(String::new());
        lines.push("### Language Features".to_string());
        lines.extend(LANGUAGE_FEATURES.iter().map(|(label, groups)| {
            let present = groups.iter().all(|needles| contains_any(ctx.source, needles));
            let mark = if present { 'x' } else { ' ' };
            format!("- [{}] {}", mark, label)
        }));

        let mut report = lines.join("\n");
        report.push('\n');
        report
    }

    /// One-paragraph summary of a single function's behavior
    pub fn describe_behavior(
        function: &FunctionRecord,
        return_value: &ReturnValue,
        side_effects: &[SideEffect],
        patterns: &[PatternMatch],
    ) -> String {
        let mut sentence = format!(
            "The function `{}` {}",
            function.name,
            describe_params(&function.params)
        );

        match (return_value.exists, &return_value.value) {
            (true, Some(value)) => sentence.push_str(&format!(" and returns `{}`.", value)),
            _ => sentence.push_str(" and doesn't explicitly return a value."),
        }

        if !side_effects.is_empty() {
            let effects: Vec<String> = side_effects
                .iter()
                .map(|effect| effect.description.to_lowercase())
                .collect();
            sentence.push_str(&format!(" Side effects: {}.", effects.join(", ")));
        }

        if !patterns.is_empty() {
            let names: Vec<&str> = patterns.iter().map(|p| p.name.as_str()).collect();
            sentence.push_str(&format!(" Patterns used: {}.", names.join(", ")));
        }

        sentence
    }
}

fn first_match(rules: &[Rule], ctx: &ComposeContext<'_>) -> String {
    rules.iter().find_map(|rule| rule(ctx)).unwrap_or_default()
}

fn single_function_subject(ctx: &ComposeContext<'_>) -> Option<String> {
    let [function] = ctx.inventory.functions.as_slice() else {
        return None;
    };

    let focus = if let Some(first_loop) = ctx.inventory.loops.first() {
        format!(" that iterates with a {} loop", first_loop.kind.describe())
    } else if let Some(first_conditional) = ctx.inventory.conditionals.first() {
        match first_conditional.kind {
            ConditionalKind::If => " that makes decisions with an if statement".to_string(),
            ConditionalKind::Switch => " that branches with a switch statement".to_string(),
        }
    } else {
        String::new()
    };

    Some(format!(
        "This code defines a function called `{}`{}",
        function.name, focus
    ))
}

fn function_count_subject(ctx: &ComposeContext<'_>) -> Option<String> {
    let count = ctx.inventory.functions.len();
    (count > 1).then(|| format!("This code defines {} functions", count))
}

fn class_subject(ctx: &ComposeContext<'_>) -> Option<String> {
    let class = ctx.inventory.classes.first()?;
    let noun = match class.kind {
        ClassKind::Class => "a class",
        ClassKind::Interface => "an interface",
        ClassKind::Enum => "an enum",
    };
    Some(format!("This code defines {} called `{}`", noun, class.name))
}

fn variable_subject(ctx: &ComposeContext<'_>) -> Option<String> {
    match ctx.inventory.variables.as_slice() {
        [] => None,
        [variable] => Some(format!("This code declares a variable called `{}`", variable.name)),
        variables => Some(format!("This code declares {} variables", variables.len())),
    }
}

fn generic_subject(_: &ComposeContext<'_>) -> Option<String> {
    Some("This code contains a piece of program logic".to_string())
}

fn reduce_activity(ctx: &ComposeContext<'_>) -> Option<String> {
    ctx.source
        .contains(".reduce(")
        .then(|| "It combines a collection into a single value using reduce".to_string())
}

fn map_activity(ctx: &ComposeContext<'_>) -> Option<String> {
    ctx.source
        .contains(".map(")
        .then(|| "It transforms each item of a collection using map".to_string())
}

fn filter_activity(ctx: &ComposeContext<'_>) -> Option<String> {
    ctx.source
        .contains(".filter(")
        .then(|| "It selects matching items from a collection using filter".to_string())
}

fn network_activity(ctx: &ComposeContext<'_>) -> Option<String> {
    contains_any(ctx.source, &["fetch(", "axios"])
        .then(|| "It requests data over the network".to_string())
}

fn storage_activity(ctx: &ComposeContext<'_>) -> Option<String> {
    contains_any(ctx.source, &["localStorage", "sessionStorage"])
        .then(|| "It reads or writes browser storage".to_string())
}

fn event_activity(ctx: &ComposeContext<'_>) -> Option<String> {
    ctx.source
        .contains("addEventListener")
        .then(|| "It responds to user events".to_string())
}

fn generic_activity(_: &ComposeContext<'_>) -> Option<String> {
    Some("It performs operations on the data".to_string())
}

fn function_purposes(ctx: &ComposeContext<'_>) -> Option<String> {
    if ctx.inventory.functions.is_empty() {
        return None;
    }
    let clauses: Vec<String> = ctx
        .inventory
        .functions
        .iter()
        .map(|f| format!("`{}` {}", f.name, function_purpose(&f.name)))
        .collect();
    Some(format!("In this code, {}.", clauses.join(", and ")))
}

fn variable_summary(ctx: &ComposeContext<'_>) -> Option<String> {
    let variables = &ctx.inventory.variables;
    if variables.is_empty() {
        return None;
    }

    let listed: Vec<String> = variables
        .iter()
        .take(DETAILED_VARIABLE_LIMIT)
        .map(|v| format!("`{}` ({})", v.name, v.kind.keyword()))
        .collect();
    let remainder = variables.len().saturating_sub(DETAILED_VARIABLE_LIMIT);

    let mut sentence = format!("It declares {}", listed.join(", "));
    if remainder > 0 {
        sentence.push_str(&format!(" and {} more", remainder));
    }
    sentence.push('.');
    Some(sentence)
}

fn pattern_summary(ctx: &ComposeContext<'_>) -> Option<String> {
    if ctx.patterns.is_empty() {
        return None;
    }
    let names: Vec<&str> = ctx.patterns.iter().map(|p| p.name.as_str()).collect();
    Some(format!("It uses these patterns: {}.", names.join(", ")))
}

fn complexity_summary(ctx: &ComposeContext<'_>) -> Option<String> {
    Some(format!("Overall complexity is {}.", ctx.complexity.level))
}

/// Verb phrase for the detailed tier
fn function_purpose(name: &str) -> &'static str {
    match name_intent(name) {
        Some(Intent::Retrieve) => "retrieves data",
        Some(Intent::Mutate) => "updates state",
        Some(Intent::Handle) => "responds to events",
        Some(Intent::Compute) => "performs a calculation",
        Some(Intent::Render) | None => "carries out a specific task",
    }
}

/// Noun phrase for the technical tier
fn function_role(name: &str) -> &'static str {
    match name_intent(name) {
        Some(Intent::Retrieve) => "Data retrieval",
        Some(Intent::Mutate) => "State mutation",
        Some(Intent::Handle) => "Event handling",
        Some(Intent::Compute) => "Computation",
        Some(Intent::Render) => "UI rendering",
        None => "General logic",
    }
}

enum Intent {
    Retrieve,
    Mutate,
    Handle,
    Compute,
    Render,
}

fn name_intent(name: &str) -> Option<Intent> {
    let starts = |prefixes: &[&str]| prefixes.iter().any(|p| name.starts_with(p));

    if starts(&["get", "fetch"]) {
        Some(Intent::Retrieve)
    } else if starts(&["set", "update"]) {
        Some(Intent::Mutate)
    } else if starts(&["handle"]) || name.ends_with("Handler") {
        Some(Intent::Handle)
    } else if starts(&["calc", "compute"]) {
        Some(Intent::Compute)
    } else if starts(&["render", "display"]) {
        Some(Intent::Render)
    } else {
        None
    }
}

fn describe_params(params: &[String]) -> String {
    match params.len() {
        0 => "takes no parameters".to_string(),
        n if n <= LISTED_PARAMETER_LIMIT => {
            let listed: Vec<String> = params.iter().map(|p| format!("`{}`", p)).collect();
            let noun = if n == 1 { "parameter" } else { "parameters" };
            format!("takes {} {} ({})", n, noun, listed.join(", "))
        }
        n => format!("takes {} parameters", n),
    }
}
