//! Code Analysis and Workspace Profiling
//!
//! This module provides the heuristic analysis pipeline:
//! - Structural extraction of JavaScript/TypeScript snippets
//! - Pattern and side-effect detection
//! - Complexity scoring
//! - Three-tier explanation composition
//! - Per-function behavior analysis
//! - Multi-language workspace profiling and learning paths

pub mod behavior;
pub mod catalog;
pub mod complexity;
pub mod explain;
pub mod metrics;
pub mod parser;
pub mod patterns;
pub mod profile;
pub mod source;
pub mod workspace;

// Re-export main types
pub use behavior::FunctionBehaviorAnalyzer;
pub use catalog::ImprovementArea;
pub use complexity::ComplexityScorer;
pub use explain::ExplanationComposer;
pub use metrics::{CodeMetrics, IdiomCluster, LinesOfCode, Metric, TallyRegistry};
pub use parser::StructuralExtractor;
pub use patterns::PatternDetector;
pub use profile::{ProfileContext, WorkspaceProfiler};
pub use workspace::{profile_source, FsWorkspace, WorkspaceSource};
