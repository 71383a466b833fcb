//! Core types used throughout Codelens

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Languages recognized by Codelens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    Java,
    CSharp,
    Html,
    Css,
    Cpp,
    Php,
    Ruby,
    Rust,
    Go,
    Other,
}

/// Source extensions that are code but have no dedicated analysis
const GENERIC_CODE_EXTENSIONS: &[&str] = &[
    "kt", "kts", "swift", "scala", "sh", "bash", "vue", "svelte", "lua", "dart", "ex", "exs",
    "hs", "clj", "pl", "r", "sql",
];

impl Language {
    /// Get file extensions for this language
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Language::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Language::TypeScript => &["ts", "tsx", "mts", "cts"],
            Language::Python => &["py", "pyi"],
            Language::Java => &["java"],
            Language::CSharp => &["cs"],
            Language::Html => &["html", "htm"],
            Language::Css => &["css", "scss", "sass", "less"],
            Language::Cpp => &["cpp", "cxx", "cc", "hpp", "hxx", "c", "h"],
            Language::Php => &["php"],
            Language::Ruby => &["rb"],
            Language::Rust => &["rs"],
            Language::Go => &["go"],
            Language::Other => &[],
        }
    }

    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "ts" | "tsx" | "mts" | "cts" => Language::TypeScript,
            "py" | "pyi" => Language::Python,
            "java" => Language::Java,
            "cs" => Language::CSharp,
            "html" | "htm" => Language::Html,
            "css" | "scss" | "sass" | "less" => Language::Css,
            "cpp" | "cxx" | "cc" | "hpp" | "hxx" | "c" | "h" => Language::Cpp,
            "php" => Language::Php,
            "rb" => Language::Ruby,
            "rs" => Language::Rust,
            "go" => Language::Go,
            _ => Language::Other,
        }
    }

    /// Detect language from a file path
    pub fn from_path(path: &Path) -> Self {
        Self::from_extension(path.extension().and_then(|ext| ext.to_str()).unwrap_or(""))
    }

    /// Resolve an editor language identifier (`javascriptreact`, `ts`, ...)
    pub fn from_tag(tag: &str) -> Option<Self> {
        let language = match tag.trim().to_lowercase().as_str() {
            "javascript" | "javascriptreact" | "js" | "jsx" => Language::JavaScript,
            "typescript" | "typescriptreact" | "ts" | "tsx" => Language::TypeScript,
            "python" | "py" => Language::Python,
            "java" => Language::Java,
            "csharp" | "c#" | "cs" => Language::CSharp,
            "html" => Language::Html,
            "css" | "scss" | "less" => Language::Css,
            "cpp" | "c++" | "c" => Language::Cpp,
            "php" => Language::Php,
            "ruby" | "rb" => Language::Ruby,
            "rust" | "rs" => Language::Rust,
            "go" | "golang" => Language::Go,
            _ => return None,
        };
        Some(language)
    }

    /// Human readable name
    pub fn display_name(self) -> &'static str {
        match self {
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Python => "Python",
            Language::Java => "Java",
            Language::CSharp => "C#",
            Language::Html => "HTML",
            Language::Css => "CSS",
            Language::Cpp => "C++",
            Language::Php => "PHP",
            Language::Ruby => "Ruby",
            Language::Rust => "Rust",
            Language::Go => "Go",
            Language::Other => "Other",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Whether a path looks like source code worth profiling
pub fn is_code_file(path: &Path) -> bool {
    if Language::from_path(path) != Language::Other {
        return true;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| GENERIC_CODE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Location of a construct in the analysed text. Line and character are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Position {
    /// Byte offset from the start of the text
    pub offset: usize,
    pub line: usize,
    pub character: usize,
}

/// Byte span `[start, end)` in the analysed text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    Declaration,
    Expression,
    Arrow,
    Method,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FunctionRef {
    pub name: String,
    pub kind: FunctionKind,
    pub params: Vec<String>,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClassRef {
    pub name: String,
    pub kind: ClassKind,
    pub extends: Option<String>,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoopKind {
    For,
    ForOf,
    ForIn,
    While,
    DoWhile,
}

impl LoopKind {
    pub fn describe(self) -> &'static str {
        match self {
            LoopKind::For => "for",
            LoopKind::ForOf => "for...of",
            LoopKind::ForIn => "for...in",
            LoopKind::While => "while",
            LoopKind::DoWhile => "do...while",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoopRef {
    pub kind: LoopKind,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionalKind {
    If,
    Switch,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConditionalRef {
    pub kind: ConditionalKind,
    pub position: Position,
}

/// Declaration keyword of a variable binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Var,
    Let,
    Const,
}

impl DeclarationKind {
    pub fn keyword(self) -> &'static str {
        match self {
            DeclarationKind::Var => "var",
            DeclarationKind::Let => "let",
            DeclarationKind::Const => "const",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VariableRef {
    pub name: String,
    pub kind: DeclarationKind,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    /// `import ... from "module"`
    Es,
    /// `require("module")`
    CommonJs,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ImportRef {
    pub module: String,
    pub kind: ImportKind,
    pub position: Position,
}

/// Flat structural inventory of a source snapshot, every list ordered by offset
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct StructuralInventory {
    pub functions: Vec<FunctionRef>,
    pub classes: Vec<ClassRef>,
    pub loops: Vec<LoopRef>,
    pub conditionals: Vec<ConditionalRef>,
    pub variables: Vec<VariableRef>,
    pub imports: Vec<ImportRef>,
}

impl StructuralInventory {
    /// True when nothing structural was recognized
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
            && self.classes.is_empty()
            && self.loops.is_empty()
            && self.conditionals.is_empty()
            && self.variables.is_empty()
            && self.imports.is_empty()
    }
}

/// Complexity buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
}

impl ComplexityLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ComplexityLevel::Low => "low",
            ComplexityLevel::Medium => "medium",
            ComplexityLevel::High => "high",
        }
    }
}

impl std::fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ComplexityResult {
    pub level: ComplexityLevel,
    pub score: f64,
}

/// Idiom categories. At most one match per category is ever reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Async,
    Functional,
    Module,
    Serialization,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PatternMatch {
    #[serde(rename = "type")]
    pub kind: PatternKind,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum SideEffectKind {
    #[serde(rename = "DOM")]
    Dom,
    #[serde(rename = "network")]
    Network,
    #[serde(rename = "storage")]
    Storage,
    #[serde(rename = "timer")]
    Timer,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SideEffect {
    #[serde(rename = "type")]
    pub kind: SideEffectKind,
    pub description: String,
}

/// A function lifted out of its source, ready for behavior analysis
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FunctionRecord {
    pub name: String,
    pub params: Vec<String>,
    pub body: String,
    pub position: Position,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnValue {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_variable: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Import,
    Require,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Dependency {
    pub module: String,
    pub kind: DependencyKind,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionBehavior {
    pub function: FunctionRecord,
    pub complexity: ComplexityResult,
    pub return_value: ReturnValue,
    pub dependencies: Vec<Dependency>,
    pub side_effects: Vec<SideEffect>,
    pub patterns: Vec<PatternMatch>,
    pub explanation: String,
}

/// Three explanation tiers for one snippet
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Explanation {
    pub simple: String,
    pub detailed: String,
    pub technical: String,
    pub complexity: ComplexityLevel,
}

/// Non-fatal observations made while analysing a snippet
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AnalysisWarning {
    /// The text matched no structural pattern at all
    NoStructureFound,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetAnalysis {
    pub language: Language,
    pub inventory: StructuralInventory,
    pub patterns: Vec<PatternMatch>,
    pub side_effects: Vec<SideEffect>,
    pub explanation: Explanation,
    pub warnings: Vec<AnalysisWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    /// The level above this one, saturating at advanced
    pub fn next(self) -> Self {
        match self {
            SkillLevel::Beginner => SkillLevel::Intermediate,
            SkillLevel::Intermediate | SkillLevel::Advanced => SkillLevel::Advanced,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SkillLevel::Beginner => "beginner",
            SkillLevel::Intermediate => "intermediate",
            SkillLevel::Advanced => "advanced",
        }
    }
}

impl std::fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mentor character attached to a learning path item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterTag {
    Architect,
    Detective,
    Scribe,
    Explorer,
    Mentor,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LearningPathItem {
    pub area: String,
    pub challenge: String,
    pub difficulty: SkillLevel,
    /// Set by whoever tracks challenge progress; always false when generated
    pub completed: bool,
    pub character: CharacterTag,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceProfile {
    pub skill_level: SkillLevel,
    pub skill_score: i64,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub learning_path: Vec<LearningPathItem>,
    pub language_usage: BTreeMap<Language, usize>,
    pub files_analyzed: usize,
    pub files_skipped: usize,
}

/// A workspace file whose contents were already read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}
