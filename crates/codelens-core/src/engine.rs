//! Core engine that orchestrates all Codelens components

use crate::analysis::{
    profile_source, ExplanationComposer, FunctionBehaviorAnalyzer, PatternDetector,
    StructuralExtractor, WorkspaceProfiler, WorkspaceSource,
};
use codelens_shared::{
    AnalysisError, AnalysisWarning, CodelensConfig, FunctionBehavior, FunctionRecord, Result,
    SnippetAnalysis, SourceFile, WorkspaceProfile,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Main engine that coordinates all Codelens components
///
/// Every component is built once from the configuration; analysis calls
/// borrow the engine immutably and keep no state between calls.
pub struct CodelensEngine {
    /// Structural extraction for JavaScript/TypeScript
    extractor: Arc<StructuralExtractor>,

    /// Pattern and side-effect detection
    detector: Arc<PatternDetector>,

    /// Three-tier explanations
    composer: Arc<ExplanationComposer>,

    /// Per-function behavior records
    behavior: Arc<FunctionBehaviorAnalyzer>,

    /// Workspace skill profiling
    profiler: Arc<WorkspaceProfiler>,

    /// Current configuration
    config: CodelensConfig,
}

impl CodelensEngine {
    /// Create a new engine with default configuration and environment overrides
    #[instrument]
    pub async fn new() -> Result<Self> {
        info!("Initializing Codelens engine with default configuration");

        let config = CodelensConfig::load_with_env()?;
        Self::with_config(config).await
    }

    /// Create a new engine with the provided configuration
    #[instrument(skip(config))]
    pub async fn with_config(config: CodelensConfig) -> Result<Self> {
        info!("Initializing Codelens engine with custom configuration");

        config.validate()?;

        let extractor = Arc::new(StructuralExtractor::new()?);
        let detector = Arc::new(PatternDetector::new()?);
        let composer = Arc::new(ExplanationComposer::new(config.complexity.clone())?);
        let behavior = Arc::new(FunctionBehaviorAnalyzer::new(config.complexity.clone())?);
        let profiler = Arc::new(WorkspaceProfiler::new(config.profile.clone())?);

        info!("Codelens engine initialized successfully");

        Ok(Self {
            extractor,
            detector,
            composer,
            behavior,
            profiler,
            config,
        })
    }

    /// Get the current configuration
    pub fn config(&self) -> &CodelensConfig {
        &self.config
    }

    /// Get the structural extractor
    pub fn extractor(&self) -> &StructuralExtractor {
        &self.extractor
    }

    /// Get the workspace profiler
    pub fn profiler(&self) -> &WorkspaceProfiler {
        &self.profiler
    }

    /// Extract, detect and explain one snippet
    #[instrument(skip(self, text), fields(len = text.len()))]
    pub fn explain(&self, text: &str, language_tag: &str) -> Result<SnippetAnalysis> {
        let language = StructuralExtractor::resolve_language(language_tag)?;
        let inventory = self.extractor.extract_language(text, language)?;
        let patterns = self.detector.detect_patterns(text);
        let side_effects = self.detector.detect_side_effects(text);
        let explanation = self.composer.compose(&inventory, text, &patterns);

        let mut warnings = Vec::new();
        if inventory.is_empty() {
            debug!("Snippet has no recognizable structure, explaining generically");
            warnings.push(AnalysisWarning::NoStructureFound);
        }

        debug!(
            "Explained {} snippet: {} functions, {} patterns, complexity {}",
            language,
            inventory.functions.len(),
            patterns.len(),
            explanation.complexity
        );

        Ok(SnippetAnalysis {
            language,
            inventory,
            patterns,
            side_effects,
            explanation,
            warnings,
        })
    }

    /// Behavior records for every function found in `text`, in source order
    #[instrument(skip(self, text), fields(len = text.len()))]
    pub fn analyze_functions(
        &self,
        text: &str,
        language_tag: &str,
    ) -> Result<Vec<FunctionBehavior>> {
        let language = StructuralExtractor::resolve_language(language_tag)?;
        let records = self.extractor.function_records(text, language)?;

        Ok(records
            .iter()
            .map(|record| self.behavior.analyze(record))
            .collect())
    }

    /// Behavior record of the first function called `name`
    pub fn analyze_named_function(
        &self,
        text: &str,
        language_tag: &str,
        name: &str,
    ) -> Result<FunctionBehavior> {
        let language = StructuralExtractor::resolve_language(language_tag)?;
        let record = self
            .extractor
            .function_records(text, language)?
            .into_iter()
            .find(|record| record.name == name)
            .ok_or_else(|| AnalysisError::FunctionNotFound {
                name: name.to_string(),
            })?;

        Ok(self.behavior.analyze(&record))
    }

    /// Behavior record of an already extracted function
    pub fn analyze_function(&self, record: &FunctionRecord) -> FunctionBehavior {
        self.behavior.analyze(record)
    }

    /// Profile files whose contents are already in memory
    pub fn profile(&self, files: &[SourceFile]) -> WorkspaceProfile {
        self.profiler.profile(files)
    }

    /// Profile everything a workspace source lists
    #[instrument(skip(self, source))]
    pub async fn profile_workspace(
        &self,
        source: &dyn WorkspaceSource,
    ) -> Result<WorkspaceProfile> {
        profile_source(&self.profiler, source).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::FsWorkspace;
    use codelens_shared::{
        CodelensError, ComplexityLevel, Language, Position, SideEffectKind, SkillLevel, Span,
    };
    use tempfile::TempDir;

    async fn engine() -> CodelensEngine {
        CodelensEngine::with_config(CodelensConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_engine_with_default_config() {
        let engine = engine().await;
        assert_eq!(engine.config(), &CodelensConfig::default());
    }

    #[tokio::test]
    async fn test_engine_rejects_invalid_config() {
        let mut config = CodelensConfig::default();
        config.complexity.low_max = 10.0;
        let result = CodelensEngine::with_config(config).await;
        assert!(matches!(result, Err(CodelensError::Config { .. })));
    }

    #[tokio::test]
    async fn test_explain_snippet() {
        let engine = engine().await;
        let analysis = engine
            .explain(
                "function sum(a, b) { return a + b; }",
                "javascript",
            )
            .unwrap();

        assert_eq!(analysis.language, Language::JavaScript);
        assert_eq!(analysis.inventory.functions.len(), 1);
        assert!(analysis.explanation.simple.contains("sum"));
        assert_eq!(analysis.explanation.complexity, ComplexityLevel::Low);
        assert!(analysis.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_explain_without_structure_warns() {
        let engine = engine().await;
        let analysis = engine.explain("", "typescript").unwrap();

        assert!(analysis.inventory.is_empty());
        assert_eq!(analysis.warnings, vec![AnalysisWarning::NoStructureFound]);
        assert!(!analysis.explanation.simple.is_empty());
    }

    #[tokio::test]
    async fn test_explain_unsupported_language() {
        let engine = engine().await;
        let result = engine.explain("def f(): pass", "python");
        assert!(matches!(result, Err(CodelensError::UnsupportedLanguage { .. })));
    }

    #[tokio::test]
    async fn test_snippet_analysis_json_shape() {
        let engine = engine().await;
        let analysis = engine
            .explain("const x = JSON.parse(raw);", "typescript")
            .unwrap();
        let value = serde_json::to_value(&analysis).unwrap();

        assert_eq!(value["language"], "TypeScript");
        assert!(value["sideEffects"].as_array().unwrap().is_empty());
        assert_eq!(value["patterns"][0]["type"], "serialization");
        assert_eq!(value["explanation"]["complexity"], "low");
    }

    #[tokio::test]
    async fn test_analyze_functions() {
        let engine = engine().await;
        let text = r#"
async function load(url) {
  try { const r = await fetch(url); return await r.json(); } catch(e) { return null; }
}
const double = (x) => x * 2;
"#;
        let behaviors = engine.analyze_functions(text, "js").unwrap();
        let names: Vec<&str> = behaviors.iter().map(|b| b.function.name.as_str()).collect();
        assert_eq!(names, vec!["load", "double"]);
        assert!(
            behaviors[0]
                .side_effects
                .iter()
                .any(|e| e.kind == SideEffectKind::Network)
        );

        let found = engine.analyze_named_function(text, "js", "double").unwrap();
        assert_eq!(found.function.params, vec!["x".to_string()]);

        let missing = engine.analyze_named_function(text, "js", "absent");
        assert!(matches!(missing, Err(CodelensError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_analyze_function_record() {
        let engine = engine().await;
        let record = FunctionRecord {
            name: "save".to_string(),
            params: vec!["item".to_string()],
            body: "localStorage.setItem('k', item);".to_string(),
            position: Position::default(),
            range: Span::default(),
        };

        let behavior = engine.analyze_function(&record);
        assert!(
            behavior
                .side_effects
                .iter()
                .any(|e| e.kind == SideEffectKind::Storage)
        );
        assert!(!behavior.return_value.exists);
    }

    #[tokio::test]
    async fn test_profile_workspace_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("app.js"), "console.log('hi');\n").unwrap();
        std::fs::write(temp_dir.path().join("README.md"), "# readme\n").unwrap();

        let engine = engine().await;
        let workspace = FsWorkspace::new(temp_dir.path(), &engine.config().workspace).unwrap();
        let profile = engine.profile_workspace(&workspace).await.unwrap();

        assert_eq!(profile.files_analyzed, 1);
        assert_eq!(profile.files_skipped, 0);
        assert_eq!(profile.skill_level, SkillLevel::Beginner);

        let in_memory = engine.profile(&[SourceFile::new("app.js", "console.log('hi');\n")]);
        assert_eq!(in_memory, profile);
    }
}
