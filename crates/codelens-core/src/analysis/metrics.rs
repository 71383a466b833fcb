//! Per-language idiom tallies
//!
//! This module turns one file into a [`CodeMetrics`] map:
//! - Lines of code and comment lines, for every language
//! - Idiom counts (modern syntax, functional style, type safety, ...)
//! - Issue counts: long functions, nested callbacks, debug logging calls
//!
//! Languages are dispatched through a lookup table of [`TallyRules`].
//! Languages without an entry (markup, style sheets, `Other`) only get the
//! line tally.

use crate::analysis::source::{self, LineIndex};
use codelens_shared::{Language, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Counted quantities, usable as keys of [`CodeMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    // Lines
    TotalLines,
    CommentLines,

    // Issues
    LongFunctions,
    NestedCallbacks,
    DebugLogs,

    // Modern syntax
    ArrowFunctions,
    AsyncAwait,
    Destructuring,
    TemplateLiterals,
    SpreadOperator,
    OptionalChaining,
    FStrings,
    PatternMatching,
    ClassSyntax,

    // Functional style
    ArrayMethods,
    ListComprehensions,
    Lambdas,
    Streams,
    Linq,

    // Type safety
    TypeAnnotations,
    Interfaces,
    Generics,

    // Other advanced idioms
    Decorators,
    ContextManagers,
    SmartPointers,
    Concurrency,

    // Best practices
    ErrorHandling,
    Tests,
    DocComments,
}

impl Metric {
    /// Idioms that raise the skill score one point per occurrence
    pub const ADVANCED: &'static [Metric] = &[
        Metric::ArrowFunctions,
        Metric::AsyncAwait,
        Metric::Destructuring,
        Metric::TemplateLiterals,
        Metric::SpreadOperator,
        Metric::OptionalChaining,
        Metric::FStrings,
        Metric::PatternMatching,
        Metric::ClassSyntax,
        Metric::ArrayMethods,
        Metric::ListComprehensions,
        Metric::Lambdas,
        Metric::Streams,
        Metric::Linq,
        Metric::Generics,
        Metric::Decorators,
        Metric::ContextManagers,
        Metric::SmartPointers,
        Metric::Concurrency,
    ];

    /// Counts that lower the skill score one point per occurrence
    pub const ISSUES: &'static [Metric] =
        &[Metric::LongFunctions, Metric::NestedCallbacks, Metric::DebugLogs];
}

/// Groups of idioms reported together as a strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IdiomCluster {
    ModernSyntax,
    Functional,
    ErrorHandling,
    TypeSafety,
}

impl IdiomCluster {
    pub const ALL: [IdiomCluster; 4] = [
        IdiomCluster::ModernSyntax,
        IdiomCluster::Functional,
        IdiomCluster::ErrorHandling,
        IdiomCluster::TypeSafety,
    ];

    pub fn members(self) -> &'static [Metric] {
        match self {
            IdiomCluster::ModernSyntax => &[
                Metric::ArrowFunctions,
                Metric::AsyncAwait,
                Metric::Destructuring,
                Metric::TemplateLiterals,
                Metric::SpreadOperator,
                Metric::OptionalChaining,
                Metric::FStrings,
                Metric::PatternMatching,
                Metric::ClassSyntax,
            ],
            IdiomCluster::Functional => &[
                Metric::ArrayMethods,
                Metric::ListComprehensions,
                Metric::Lambdas,
                Metric::Streams,
                Metric::Linq,
            ],
            IdiomCluster::ErrorHandling => &[Metric::ErrorHandling],
            IdiomCluster::TypeSafety => {
                &[Metric::TypeAnnotations, Metric::Interfaces, Metric::Generics]
            }
        }
    }

    /// Name used in strengths and learning path areas
    pub fn label(self) -> &'static str {
        match self {
            IdiomCluster::ModernSyntax => "Modern Syntax",
            IdiomCluster::Functional => "Functional Programming",
            IdiomCluster::ErrorHandling => "Error Handling",
            IdiomCluster::TypeSafety => "Type Safety",
        }
    }
}

/// Ordered metric counts. Absent keys read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeMetrics {
    counts: BTreeMap<Metric, usize>,
}

impl CodeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, metric: Metric) -> usize {
        self.counts.get(&metric).copied().unwrap_or(0)
    }

    pub fn add(&mut self, metric: Metric, count: usize) {
        if count > 0 {
            *self.counts.entry(metric).or_insert(0) += count;
        }
    }

    pub fn set(&mut self, metric: Metric, count: usize) {
        self.counts.insert(metric, count);
    }

    pub fn merge(&mut self, other: &CodeMetrics) {
        for (metric, count) in &other.counts {
            self.add(*metric, *count);
        }
    }

    pub fn sum(&self, metrics: &[Metric]) -> usize {
        metrics.iter().map(|m| self.get(*m)).sum()
    }

    pub fn cluster_total(&self, cluster: IdiomCluster) -> usize {
        self.sum(cluster.members())
    }

    /// Comment lines over total lines, `None` when nothing was counted
    pub fn comment_ratio(&self) -> Option<f64> {
        let total = self.get(Metric::TotalLines);
        (total > 0).then(|| self.get(Metric::CommentLines) as f64 / total as f64)
    }
}

/// Lines of code breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinesOfCode {
    pub total: usize,
    pub source: usize,
    pub comments: usize,
    pub blank: usize,
}

impl LinesOfCode {
    /// Count lines, treating a line that starts with any of `comment_prefixes` as a comment
    pub fn calculate(content: &str, comment_prefixes: &[&str]) -> Self {
        let mut loc = LinesOfCode::default();

        for line in content.lines() {
            let trimmed = line.trim();
            loc.total += 1;

            if trimmed.is_empty() {
                loc.blank += 1;
            } else if comment_prefixes.iter().any(|p| trimmed.starts_with(p)) {
                loc.comments += 1;
            } else {
                loc.source += 1;
            }
        }

        loc
    }
}

/// How a language delimits function bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyStyle {
    /// `{ ... }`, the header pattern ends at the opening brace
    Braces,
    /// Body is every following line indented deeper than the header
    Indentation,
    /// Body runs to the `end` matching the header
    EndKeyword,
}

/// Tally patterns of one language
pub struct TallyRules {
    idioms: Vec<(Metric, Regex)>,
    debug_logs: Vec<Regex>,
    comment_prefixes: &'static [&'static str],
    function_header: Regex,
    body_style: BodyStyle,
    nested_callbacks: bool,
}

const C_COMMENTS: &[&str] = &["//", "/*", "*"];
const HASH_COMMENTS: &[&str] = &["#"];
const GENERIC_COMMENTS: &[&str] = &["//", "#", "/*", "*", "--", "<!--", ";"];

/// Names a C-family header pattern can pick up that are control flow, not functions
const CONTROL_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "else", "return", "using", "lock", "foreach",
];

/// Ruby openers that are closed by `end`
const RUBY_BLOCK_OPENERS: &[&str] = &[
    "def", "class", "module", "if", "unless", "while", "until", "case", "begin", "for",
];

/// Language to tally rules lookup
pub struct TallyRegistry {
    rules: HashMap<Language, TallyRules>,
    callback_literal: Regex,
    trailing_do: Regex,
    long_function_lines: usize,
}

impl TallyRegistry {
    /// Create a registry that flags functions longer than `long_function_lines`
    pub fn new(long_function_lines: usize) -> Result<Self> {
        let mut rules = HashMap::new();
        rules.insert(Language::JavaScript, javascript_rules(false)?);
        rules.insert(Language::TypeScript, javascript_rules(true)?);
        rules.insert(Language::Python, python_rules()?);
        rules.insert(Language::Java, java_rules()?);
        rules.insert(Language::CSharp, csharp_rules()?);
        rules.insert(Language::Cpp, cpp_rules()?);
        rules.insert(Language::Php, php_rules()?);
        rules.insert(Language::Ruby, ruby_rules()?);
        rules.insert(Language::Rust, rust_rules()?);
        rules.insert(Language::Go, go_rules()?);

        Ok(Self {
            rules,
            callback_literal: Regex::new(concat!(
                r"[(,]\s*(?:async\s+)?",
                r"(?:function\s*[\w$]*\s*\([^)]*\)|\([^)]*\)\s*=>|[A-Za-z_$][\w$]*\s*=>)\s*\{",
            ))?,
            trailing_do: Regex::new(r"\bdo\s*(?:\|[^|]*\|)?\s*$")?,
            long_function_lines,
        })
    }

    /// Tally one file
    pub fn tally(&self, language: Language, content: &str) -> CodeMetrics {
        let mut metrics = CodeMetrics::new();

        let Some(rules) = self.rules.get(&language) else {
            let loc = LinesOfCode::calculate(content, generic_comment_prefixes(language));
            metrics.add(Metric::TotalLines, loc.total);
            metrics.add(Metric::CommentLines, loc.comments);
            return metrics;
        };

        let loc = LinesOfCode::calculate(content, rules.comment_prefixes);
        metrics.add(Metric::TotalLines, loc.total);
        metrics.add(Metric::CommentLines, loc.comments);

        for (metric, pattern) in &rules.idioms {
            metrics.add(*metric, pattern.find_iter(content).count());
        }

        let debug_logs: usize = rules
            .debug_logs
            .iter()
            .map(|pattern| pattern.find_iter(content).count())
            .sum();
        metrics.add(Metric::DebugLogs, debug_logs);

        metrics.add(Metric::LongFunctions, self.long_functions(rules, content));

        if rules.nested_callbacks {
            metrics.add(Metric::NestedCallbacks, self.nested_callbacks(content));
        }

        metrics
    }

    fn long_functions(&self, rules: &TallyRules, content: &str) -> usize {
        let spans = match rules.body_style {
            BodyStyle::Braces => brace_function_lines(&rules.function_header, content),
            BodyStyle::Indentation => indented_function_lines(&rules.function_header, content),
            BodyStyle::EndKeyword => {
                self.end_keyword_function_lines(&rules.function_header, content)
            }
        };
        spans
            .into_iter()
            .filter(|lines| *lines > self.long_function_lines)
            .count()
    }

    /// Callback literals whose body opens inside another callback body
    fn nested_callbacks(&self, content: &str) -> usize {
        let mut open_ends: Vec<usize> = Vec::new();
        let mut nested = 0;

        for m in self.callback_literal.find_iter(content) {
            let open = m.end() - 1;
            let span = source::block_span(content, open);

            while open_ends.last().is_some_and(|end| *end <= open) {
                open_ends.pop();
            }
            if !open_ends.is_empty() {
                nested += 1;
            }
            open_ends.push(span.end);
        }

        nested
    }

    /// Line spans of `def ... end` functions
    fn end_keyword_function_lines(&self, header: &Regex, content: &str) -> Vec<usize> {
        let lines: Vec<&str> = content.lines().collect();
        let index = LineIndex::new(content);

        header
            .find_iter(content)
            .map(|m| {
                let start = index.position(m.start()).line;
                let mut depth = 0usize;

                for (i, line) in lines.iter().enumerate().skip(start) {
                    let trimmed = line.trim();
                    let first_word = trimmed
                        .split(|c: char| !c.is_alphanumeric() && c != '_')
                        .next()
                        .unwrap_or("");

                    if RUBY_BLOCK_OPENERS.contains(&first_word)
                        || self.trailing_do.is_match(trimmed)
                    {
                        depth += 1;
                    }
                    if first_word == "end" {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            return i - start + 1;
                        }
                    }
                }
                lines.len().saturating_sub(start)
            })
            .collect()
    }
}

fn generic_comment_prefixes(language: Language) -> &'static [&'static str] {
    match language {
        Language::Html => &["<!--"],
        Language::Css => &["/*", "*", "//"],
        _ => GENERIC_COMMENTS,
    }
}

/// Line spans of brace-delimited functions; the header match ends at `{`
fn brace_function_lines(header: &Regex, content: &str) -> Vec<usize> {
    header
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            if let Some(name) = caps.name("name") {
                if CONTROL_KEYWORDS.contains(&name.as_str()) {
                    return None;
                }
            }
            let open = whole.end() - 1;
            Some(source::line_count(content, source::block_span(content, open)))
        })
        .collect()
}

/// Line spans of indentation-delimited functions; group 1 is the header indent
fn indented_function_lines(header: &Regex, content: &str) -> Vec<usize> {
    let lines: Vec<&str> = content.lines().collect();
    let index = LineIndex::new(content);

    header
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let indent = caps.get(1).map_or(0, |m| m.as_str().len());
            let start = index.position(whole.start()).line;

            let mut last = start;
            for (i, line) in lines.iter().enumerate().skip(start + 1) {
                if line.trim().is_empty() {
                    continue;
                }
                let line_indent = line.len() - line.trim_start().len();
                if line_indent <= indent {
                    break;
                }
                last = i;
            }
            Some(last - start + 1)
        })
        .collect()
}

fn compile(patterns: &[(Metric, &str)]) -> Result<Vec<(Metric, Regex)>> {
    patterns
        .iter()
        .map(|(metric, pattern)| -> Result<(Metric, Regex)> { Ok((*metric, Regex::new(pattern)?)) })
        .collect()
}

fn compile_all(patterns: &[&str]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| -> Result<Regex> { Ok(Regex::new(pattern)?) })
        .collect()
}

fn javascript_rules(typed: bool) -> Result<TallyRules> {
    let mut idioms = vec![
        (Metric::ArrowFunctions, r"=>"),
        (Metric::AsyncAwait, r"\basync\b|\bawait\b"),
        (Metric::Destructuring, r"\b(?:const|let|var)\s*[{\[]"),
        (Metric::TemplateLiterals, r"`[^`]*\$\{"),
        (Metric::SpreadOperator, r"\.\.\.[A-Za-z_$\[{(]"),
        (Metric::OptionalChaining, r"\?\.[A-Za-z_$\[(]"),
        (Metric::ClassSyntax, r"\bclass\s+[A-Za-z_$]"),
        (Metric::ArrayMethods, r"\.(?:map|filter|reduce|forEach|find|some|every|flatMap)\("),
        (Metric::ErrorHandling, r"\btry\s*\{|\.catch\("),
        (Metric::Tests, r#"\b(?:describe|it|test)\s*\(\s*['"`]"#),
        (Metric::DocComments, r"/\*\*"),
    ];
    if typed {
        idioms.extend([
            (
                Metric::TypeAnnotations,
                r"[\w)]\s*\??:\s*(?:string|number|boolean|any|unknown|void|never)\b",
            ),
            (Metric::Interfaces, r"\binterface\s+[A-Za-z_$]"),
            (Metric::Generics, r"\b[A-Za-z_$][\w$]*<[A-Z][\w$]*(?:\s*,\s*[A-Z][\w$]*)*>"),
        ]);
    }

    Ok(TallyRules {
        idioms: compile(&idioms)?,
        debug_logs: compile_all(&[r"\bconsole\.(?:log|debug)\s*\(", r"\bdebugger\s*;"])?,
        comment_prefixes: C_COMMENTS,
        function_header: Regex::new(r"(?:\bfunction\b[^{;]*|=>\s*)\{")?,
        body_style: BodyStyle::Braces,
        nested_callbacks: true,
    })
}

fn python_rules() -> Result<TallyRules> {
    Ok(TallyRules {
        idioms: compile(&[
            (Metric::ListComprehensions, r"[\[{(][^\]\n]*\bfor\b[^\]\n]*\bin\b"),
            (Metric::Decorators, r"(?m)^[ \t]*@[A-Za-z_]"),
            (Metric::ContextManagers, r"(?m)^[ \t]*(?:async[ \t]+)?with[ \t]"),
            (Metric::FStrings, r#"\bf["']"#),
            (Metric::Lambdas, r"\blambda\b"),
            (Metric::AsyncAwait, r"\basync[ \t]+def\b|\bawait\b"),
            (
                Metric::TypeAnnotations,
                concat!(
                    r"\)[ \t]*->[ \t]*[\w\[]",
                    r"|\b\w+:[ \t]*(?:int|str|float|bool|list|dict|List|Dict|Optional)\b",
                ),
            ),
            (Metric::ClassSyntax, r"(?m)^[ \t]*class[ \t]+[A-Za-z_]"),
            (Metric::PatternMatching, r"(?m)^[ \t]*match[ \t]+[^\n]+:[ \t]*$"),
            (Metric::ErrorHandling, r"(?m)^[ \t]*try[ \t]*:"),
            (Metric::Tests, r"(?m)^[ \t]*(?:async[ \t]+)?def[ \t]+test_"),
            (Metric::DocComments, r#"(?m)^[ \t]*[rRbBuU]?(?:"""|''')"#),
        ])?,
        debug_logs: compile_all(&[r"\bprint\s*\(", r"\bbreakpoint\(\)|\bpdb\.set_trace\("])?,
        comment_prefixes: HASH_COMMENTS,
        function_header: Regex::new(r"(?m)^([ \t]*)(?:async[ \t]+)?def[ \t]+\w+")?,
        body_style: BodyStyle::Indentation,
        nested_callbacks: false,
    })
}

/// Header of a braced C-family method: modifiers, return type, named group `name`, params
const C_FAMILY_METHOD: &str = concat!(
    r"(?m)^[ \t]*(?:(?:public|private|protected|internal|static|final|abstract|synchronized",
    r"|virtual|override|async|inline|const)[ \t]+)*",
    r"[\w<>\[\],.?:*&]+[ \t]+[*&]?(?P<name>\w+)[ \t]*\([^)]*\)[^{;\n]*\{",
);

fn java_rules() -> Result<TallyRules> {
    Ok(TallyRules {
        idioms: compile(&[
            (Metric::Lambdas, r"\)\s*->|\b\w+\s*->"),
            (Metric::Streams, r"\.stream\(\)|\.parallelStream\(\)"),
            (Metric::Generics, r"\b[A-Z]\w*<[A-Z?][\w<>,?\s]*>"),
            (Metric::Interfaces, r"\binterface\s+\w+"),
            (Metric::ClassSyntax, r"\bclass\s+\w+"),
            (
                Metric::Decorators,
                r"(?m)^[ \t]*@(?:Override|FunctionalInterface|Deprecated|SuppressWarnings)\b",
            ),
            (Metric::Concurrency, r"\b(?:CompletableFuture|ExecutorService|synchronized)\b"),
            (Metric::ErrorHandling, r"\btry\s*[{(]"),
            (Metric::Tests, r"@Test\b"),
            (Metric::DocComments, r"/\*\*"),
        ])?,
        debug_logs: compile_all(&[
            r"System\.(?:out|err)\.print(?:ln|f)?\s*\(",
            r"\.printStackTrace\(\)",
        ])?,
        comment_prefixes: C_COMMENTS,
        function_header: Regex::new(C_FAMILY_METHOD)?,
        body_style: BodyStyle::Braces,
        nested_callbacks: false,
    })
}

fn csharp_rules() -> Result<TallyRules> {
    Ok(TallyRules {
        idioms: compile(&[
            (
                Metric::Linq,
                concat!(
                    r"\.(?:Where|Select|SelectMany|OrderBy|GroupBy",
                    r"|Any|All|Aggregate|FirstOrDefault)\(",
                    r"|\bfrom\s+\w+\s+in\b",
                ),
            ),
            (Metric::Lambdas, r"=>"),
            (Metric::AsyncAwait, r"\basync\b|\bawait\b"),
            (Metric::Generics, r"\b[A-Z]\w*<[A-Z][\w<>,\s]*>"),
            (Metric::Interfaces, r"\binterface\s+\w+"),
            (Metric::ClassSyntax, r"\b(?:class|record)\s+\w+"),
            (Metric::PatternMatching, r"\bswitch\s*\{|\bis\s+(?:not\s+)?[A-Z]\w*\s+[a-z]\w*"),
            (Metric::Concurrency, r"\bTask\.(?:Run|WhenAll)\b|\bParallel\.|\block\s*\("),
            (Metric::ErrorHandling, r"\btry\s*\{"),
            (Metric::Tests, r"\[(?:Test|Fact|Theory|TestMethod)\]"),
            (Metric::DocComments, r"///"),
        ])?,
        debug_logs: compile_all(&[
            r"\bConsole\.Write(?:Line)?\s*\(",
            r"\bDebug\.Write(?:Line)?\s*\(",
        ])?,
        comment_prefixes: C_COMMENTS,
        function_header: Regex::new(C_FAMILY_METHOD)?,
        body_style: BodyStyle::Braces,
        nested_callbacks: false,
    })
}

fn cpp_rules() -> Result<TallyRules> {
    Ok(TallyRules {
        idioms: compile(&[
            (
                Metric::SmartPointers,
                r"\b(?:unique_ptr|shared_ptr|weak_ptr|make_unique|make_shared)\b",
            ),
            (Metric::Lambdas, r"\[[^\]\n]*\]\s*\([^)]*\)\s*(?:mutable\s*)?(?:->\s*[\w:<>]+\s*)?\{"),
            (Metric::Generics, r"\btemplate\s*<"),
            (Metric::ClassSyntax, r"\b(?:class|struct)\s+\w+"),
            (Metric::Concurrency, r"\bstd::(?:thread|async|mutex|atomic|future)\b"),
            (Metric::ErrorHandling, r"\btry\s*\{"),
            (Metric::DocComments, r"/\*\*|///"),
        ])?,
        debug_logs: compile_all(&[r"\bstd::cout\s*<<|\bcout\s*<<", r"\bprintf\s*\("])?,
        comment_prefixes: C_COMMENTS,
        function_header: Regex::new(C_FAMILY_METHOD)?,
        body_style: BodyStyle::Braces,
        nested_callbacks: false,
    })
}

fn php_rules() -> Result<TallyRules> {
    Ok(TallyRules {
        idioms: compile(&[
            (Metric::ArrowFunctions, r"\bfn\s*\("),
            (Metric::Lambdas, r"\bfunction\s*\([^)]*\)\s*(?:use\s*\([^)]*\)\s*)?\{"),
            (Metric::ArrayMethods, r"\barray_(?:map|filter|reduce)\s*\("),
            (Metric::SpreadOperator, r"\.\.\.\$"),
            (Metric::PatternMatching, r"\bmatch\s*\("),
            (Metric::ClassSyntax, r"\bclass\s+\w+"),
            (Metric::Interfaces, r"\binterface\s+\w+"),
            (Metric::TypeAnnotations, r"\bfunction\s+\w+\s*\([^)]*\)\s*:\s*\??\w+"),
            (Metric::ErrorHandling, r"\btry\s*\{"),
            (Metric::Tests, r"\bfunction\s+test\w*\s*\("),
            (Metric::DocComments, r"/\*\*"),
        ])?,
        debug_logs: compile_all(&[r"\b(?:var_dump|print_r|dd|error_log)\s*\("])?,
        comment_prefixes: &["//", "#", "/*", "*"],
        function_header: Regex::new(r"\bfunction\s+(?P<name>\w+)\s*\([^)]*\)[^{;]*\{")?,
        body_style: BodyStyle::Braces,
        nested_callbacks: false,
    })
}

fn ruby_rules() -> Result<TallyRules> {
    Ok(TallyRules {
        idioms: compile(&[
            (Metric::Lambdas, r"\blambda\b|->\s*[({]"),
            (
                Metric::ArrayMethods,
                r"\.(?:map|select|reject|reduce|inject|each_with_object)\s*(?:\{|do\b)",
            ),
            (Metric::TemplateLiterals, r#""[^"\n]*#\{"#),
            (Metric::ClassSyntax, r"(?m)^[ \t]*class[ \t]+[A-Z]"),
            (Metric::ErrorHandling, r"\brescue\b"),
            (Metric::Tests, r#"(?m)^[ \t]*(?:it|describe|context)[ \t]+['"]|\bdef[ \t]+test_"#),
            (Metric::DocComments, r"(?m)^[ \t]*#[ \t]*@(?:param|return|example)\b"),
        ])?,
        debug_logs: compile_all(&[
            r"(?m)^[ \t]*(?:puts|pp|p)[ \t(]",
            r"\bbinding\.pry\b|\bbyebug\b",
        ])?,
        comment_prefixes: HASH_COMMENTS,
        function_header: Regex::new(r"(?m)^[ \t]*def[ \t]+")?,
        body_style: BodyStyle::EndKeyword,
        nested_callbacks: false,
    })
}

fn rust_rules() -> Result<TallyRules> {
    Ok(TallyRules {
        idioms: compile(&[
            (Metric::PatternMatching, r"\bmatch\b[^{;]*\{|\bif\s+let\b|\blet\s+else\b"),
            (Metric::Lambdas, r"\bmove\s*\||[(,=]\s*\|[^|\n]*\|"),
            (Metric::ArrayMethods, r"\.(?:map|filter|fold|filter_map|flat_map|for_each)\("),
            (Metric::Generics, r"\bimpl\s*<|\bfn\s+\w+\s*<"),
            (Metric::Interfaces, r"\btrait\s+\w+"),
            (Metric::SmartPointers, r"\b(?:Box|Rc|Arc|RefCell|Weak)(?:::new\b|<)"),
            (Metric::AsyncAwait, r"\basync\b|\.await\b"),
            (Metric::Concurrency, r"::spawn\b|\b(?:Mutex|RwLock|mpsc)\b"),
            (Metric::ClassSyntax, r"\bstruct\s+\w+"),
            (Metric::ErrorHandling, r"\bResult<|\?[;.)]"),
            (Metric::Tests, r"#\[(?:tokio::)?test\]"),
            (Metric::DocComments, r"(?m)^[ \t]*(?:///|//!)"),
        ])?,
        debug_logs: compile_all(&[r"\b(?:println|eprintln|print|dbg)!\s*\("])?,
        comment_prefixes: &["//", "/*", "*"],
        function_header: Regex::new(r"\bfn\s+(?P<name>\w+)[^{;]*\{")?,
        body_style: BodyStyle::Braces,
        nested_callbacks: false,
    })
}

fn go_rules() -> Result<TallyRules> {
    Ok(TallyRules {
        idioms: compile(&[
            (Metric::Concurrency, r"\bgo\s+(?:func\b|[\w.]+\()|\bchan\b|\bsync\."),
            (Metric::Lambdas, r"[=:(,]\s*func\s*\("),
            (Metric::Generics, r"\bfunc\s+\w+\s*\[[A-Z]"),
            (Metric::Interfaces, r"\btype\s+\w+\s+interface\b"),
            (Metric::ClassSyntax, r"\btype\s+\w+\s+struct\b"),
            (Metric::ErrorHandling, r"\bif\s+err\s*!=\s*nil\b"),
            (Metric::Tests, r"\bfunc\s+Test\w*\s*\(\s*t\s+\*testing\.T"),
            (Metric::DocComments, r"(?m)^//[ \t]*[A-Z]\w*[ \t]"),
        ])?,
        debug_logs: compile_all(&[r"\bfmt\.Print(?:ln|f)?\s*\(", r"\blog\.Print(?:ln|f)?\s*\("])?,
        comment_prefixes: &["//", "/*", "*"],
        function_header: Regex::new(r"(?m)^func\b[^{\n]*\{")?,
        body_style: BodyStyle::Braces,
        nested_callbacks: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TallyRegistry {
        TallyRegistry::new(50).unwrap()
    }

    #[test]
    fn test_loc_calculation() {
        let code = r#"
// This is a comment
function main() {
    run(); // trailing comments count as source

    /* block */
}
"#;
        let loc = LinesOfCode::calculate(code, C_COMMENTS);
        assert_eq!(loc.total, code.lines().count());
        assert_eq!(loc.comments, 2);
        assert_eq!(loc.blank, 2);
        assert_eq!(loc.source, 3);
    }

    #[test]
    fn test_javascript_idioms() {
        let code = r#"
/** Loads users */
const load = async ({ id }) => {
    try {
        const users = await api.get(`/users/${id}`);
        return users?.items.map(u => ({ ...u }));
    } catch (err) {
        console.log(err);
    }
};
"#;
        let metrics = registry().tally(Language::JavaScript, code);

        assert_eq!(metrics.get(Metric::ArrowFunctions), 2);
        assert_eq!(metrics.get(Metric::AsyncAwait), 2);
        assert_eq!(metrics.get(Metric::TemplateLiterals), 1);
        assert_eq!(metrics.get(Metric::SpreadOperator), 1);
        assert_eq!(metrics.get(Metric::OptionalChaining), 1);
        assert_eq!(metrics.get(Metric::ArrayMethods), 1);
        assert_eq!(metrics.get(Metric::ErrorHandling), 1);
        assert_eq!(metrics.get(Metric::DocComments), 1);
        assert_eq!(metrics.get(Metric::DebugLogs), 1);
        assert_eq!(metrics.get(Metric::CommentLines), 1);
        // TypeScript-only idioms are not counted for JavaScript
        assert_eq!(metrics.get(Metric::Interfaces), 0);
    }

    #[test]
    fn test_typescript_type_safety() {
        let code = concat!(
            "interface User { name: string; }\n",
            "function wrap<T>(x: T): Array<User> { return [x]; }\n",
        );
        let metrics = registry().tally(Language::TypeScript, code);
        assert_eq!(metrics.get(Metric::Interfaces), 1);
        assert!(metrics.get(Metric::TypeAnnotations) >= 1);
        // `wrap<T>` and `Array<User>`
        assert_eq!(metrics.get(Metric::Generics), 2);
    }

    #[test]
    fn test_nested_callbacks() {
        let code = r#"
getData(function(a) {
    getMore(a, function(b) {
        getMoreAgain(b, (c) => {
            done(c);
        });
    });
});
other(function() {});
"#;
        let metrics = registry().tally(Language::JavaScript, code);
        assert_eq!(metrics.get(Metric::NestedCallbacks), 2);
    }

    #[test]
    fn test_long_brace_function() {
        let code = format!(
            "function big() {{\n{}}}\nfunction small() {{ return 1; }}\n",
            "    step();\n".repeat(60)
        );
        let metrics = registry().tally(Language::JavaScript, &code);
        assert_eq!(metrics.get(Metric::LongFunctions), 1);

        let java = format!(
            "class A {{\n    public void run() {{\n{}    }}\n    if (x) {{\n{}    }}\n}}\n",
            "        step();\n".repeat(55),
            "        step();\n".repeat(55)
        );
        let metrics = registry().tally(Language::Java, &java);
        assert_eq!(metrics.get(Metric::LongFunctions), 1);
    }

    #[test]
    fn test_long_python_function() {
        let code = format!(
            "def long_one():\n{}\ndef short():\n    return 1\n",
            "    x = 1\n".repeat(55)
        );
        let metrics = registry().tally(Language::Python, &code);
        assert_eq!(metrics.get(Metric::LongFunctions), 1);
    }

    #[test]
    fn test_long_ruby_function() {
        let body = "    if ready\n      go\n    end\n".repeat(20);
        let code = format!("def long_one\n{}end\n\ndef short\n  1\nend\n", body);
        let metrics = registry().tally(Language::Ruby, &code);
        assert_eq!(metrics.get(Metric::LongFunctions), 1);
    }

    #[test]
    fn test_python_idioms() {
        let code = r#"
@cache
def squares(n: int) -> list:
    """Squares."""
    with open("data") as fh:
        print(f"{n}")
    return [x * x for x in range(n)]
"#;
        let metrics = registry().tally(Language::Python, code);
        assert_eq!(metrics.get(Metric::Decorators), 1);
        assert_eq!(metrics.get(Metric::ContextManagers), 1);
        assert_eq!(metrics.get(Metric::FStrings), 1);
        assert_eq!(metrics.get(Metric::ListComprehensions), 1);
        assert_eq!(metrics.get(Metric::DocComments), 1);
        assert_eq!(metrics.get(Metric::DebugLogs), 1);
        assert!(metrics.get(Metric::TypeAnnotations) >= 1);
    }

    #[test]
    fn test_generic_languages_only_count_lines() {
        let registry = registry();
        let metrics = registry.tally(Language::Html, "<!-- nav -->\n<div>() => x</div>\n");
        assert_eq!(metrics.get(Metric::TotalLines), 2);
        assert_eq!(metrics.get(Metric::CommentLines), 1);
        assert_eq!(metrics.get(Metric::ArrowFunctions), 0);

        let metrics = registry.tally(Language::Other, "-- sql comment\nselect 1;\n");
        assert_eq!(metrics.get(Metric::CommentLines), 1);
    }

    #[test]
    fn test_metrics_map() {
        let mut a = CodeMetrics::new();
        a.add(Metric::Lambdas, 2);
        a.add(Metric::Streams, 0);
        let mut b = CodeMetrics::new();
        b.add(Metric::Lambdas, 3);
        b.add(Metric::TotalLines, 10);
        b.add(Metric::CommentLines, 1);
        a.merge(&b);

        assert_eq!(a.get(Metric::Lambdas), 5);
        assert_eq!(a.get(Metric::Streams), 0);
        assert_eq!(a.cluster_total(IdiomCluster::Functional), 5);
        assert_eq!(a.comment_ratio(), Some(0.1));
        assert_eq!(CodeMetrics::new().comment_ratio(), None);
        assert_eq!(a.counts.iter().count(), 3);
    }
}
