//! # Codelens Core
//!
//! Core engine for Codelens - heuristic code explanations and workspace skill profiles
//!
//! This crate provides the analysis components of the Codelens ecosystem:
//! - Structural extraction of JavaScript/TypeScript snippets
//! - Pattern, side-effect and complexity detection
//! - Simple, detailed and technical explanations
//! - Function behavior analysis
//! - Workspace profiling with learning paths
//! - Configuration discovery

pub mod analysis;
pub mod config;
pub mod engine;

// Re-export commonly used types
pub use codelens_shared::*;

pub use analysis::{
    ExplanationComposer, FsWorkspace, FunctionBehaviorAnalyzer, StructuralExtractor,
    WorkspaceProfiler, WorkspaceSource,
};
pub use config::ConfigManager;
pub use engine::CodelensEngine;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
