//! Fixed challenge catalog for learning paths

use crate::analysis::metrics::IdiomCluster;
use codelens_shared::{CharacterTag, SkillLevel};

/// Areas the profiler can flag for improvement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImprovementArea {
    CodeComplexity,
    DebuggingPractices,
    Documentation,
    ModernFeatures,
}

impl ImprovementArea {
    pub fn label(self) -> &'static str {
        match self {
            ImprovementArea::CodeComplexity => "Code Complexity",
            ImprovementArea::DebuggingPractices => "Debugging Practices",
            ImprovementArea::Documentation => "Documentation",
            ImprovementArea::ModernFeatures => "Modern Language Features",
        }
    }

    pub fn character(self) -> CharacterTag {
        match self {
            ImprovementArea::CodeComplexity => CharacterTag::Architect,
            ImprovementArea::DebuggingPractices => CharacterTag::Detective,
            ImprovementArea::Documentation => CharacterTag::Scribe,
            ImprovementArea::ModernFeatures => CharacterTag::Explorer,
        }
    }

    /// Every challenge listed for this area at `level`
    pub fn challenges(self, level: SkillLevel) -> &'static [&'static str] {
        use ImprovementArea::*;
        use SkillLevel::*;

        match (self, level) {
            (CodeComplexity, Beginner) => &[
                "Split a long function into three smaller helpers",
                "Replace a nested callback chain with named functions",
            ],
            (CodeComplexity, Intermediate) => &[
                "Flatten nested conditionals with early returns",
                "Refactor a callback pyramid into async/await",
                "Extract a reusable module from a large file",
            ],
            (CodeComplexity, Advanced) => &[
                "Introduce a strategy pattern to remove a long switch",
                "Reduce the cyclomatic complexity of your most complex function by half",
            ],

            (DebuggingPractices, Beginner) => &[
                "Replace console logging with a breakpoint-driven debugging session",
                "Remove leftover debug prints from a finished feature",
            ],
            (DebuggingPractices, Intermediate) => &[
                "Introduce a leveled logger instead of ad hoc prints",
                "Write a failing test that reproduces a bug before fixing it",
            ],
            (DebuggingPractices, Advanced) => &[
                "Add structured logging with context fields to a service",
                "Track down a bug using conditional breakpoints only",
            ],

            (Documentation, Beginner) => &[
                "Add a doc comment to every exported function in one file",
                "Write a README section explaining how to run the project",
            ],
            (Documentation, Intermediate) => &[
                "Document the parameters and return values of a public API",
                "Add usage examples to your most used module",
            ],
            (Documentation, Advanced) => &[
                "Write an architecture overview for a subsystem",
                "Generate API docs and fix every warning",
            ],

            (ModernFeatures, Beginner) => &[
                "Rewrite three functions using arrow functions",
                "Use destructuring to simplify a function's parameters",
            ],
            (ModernFeatures, Intermediate) => &[
                "Replace string concatenation with template literals",
                "Use optional chaining to remove defensive null checks",
                "Convert a promise chain to async/await",
            ],
            (ModernFeatures, Advanced) => &[
                "Adopt pattern matching or exhaustive switches in a state machine",
            ],
        }
    }
}

/// Character attached to stretch challenges built on a strength
pub const STRENGTH_CHARACTER: CharacterTag = CharacterTag::Mentor;

/// Stretch challenges for an idiom cluster the developer is already strong in
pub fn strength_challenges(cluster: IdiomCluster, level: SkillLevel) -> &'static [&'static str] {
    use IdiomCluster::*;
    use SkillLevel::*;

    match (cluster, level) {
        (ModernSyntax, Beginner) => &["Rewrite a small utility using only modern syntax"],
        (ModernSyntax, Intermediate) => &[
            "Build a small feature with async iterators",
            "Use generators to stream a large data set",
        ],
        (ModernSyntax, Advanced) => &[
            "Write a tagged template literal for safe HTML",
            "Design a plugin API around async generators",
        ],

        (Functional, Beginner) => &["Replace a for loop with map and filter"],
        (Functional, Intermediate) => &[
            "Compose a data pipeline from small pure functions",
            "Implement memoization for an expensive pure function",
        ],
        (Functional, Advanced) => &[
            "Implement a small immutable collection library",
            "Model errors as values instead of exceptions in one module",
        ],

        (ErrorHandling, Beginner) => &["Wrap a risky operation in try/catch with a useful message"],
        (ErrorHandling, Intermediate) => &[
            "Define custom error types for a module",
            "Add retry with backoff to a network call",
        ],
        (ErrorHandling, Advanced) => &[
            "Design an error boundary that recovers gracefully",
            "Propagate typed errors through an async pipeline",
        ],

        (TypeSafety, Beginner) => &["Add type annotations to one untyped module"],
        (TypeSafety, Intermediate) => &[
            "Replace a loose object type with a discriminated union",
            "Write a generic helper with constrained type parameters",
        ],
        (TypeSafety, Advanced) => &[
            "Encode a state machine in the type system",
            "Eliminate every any/unknown cast in a module",
        ],
    }
}
