//! Workspace skill profiling
//!
//! Profiling runs in two steps. Files are folded one at a time into a
//! caller-owned [`ProfileContext`]; [`WorkspaceProfiler::assess`] then turns
//! the accumulated counts into a [`WorkspaceProfile`]. Nothing is kept
//! between runs.

use crate::analysis::catalog::{self, ImprovementArea};
use crate::analysis::metrics::{CodeMetrics, IdiomCluster, Metric, TallyRegistry};
use codelens_shared::{
    is_code_file, Language, LearningPathItem, ProfileConfig, Result, SkillLevel, SourceFile,
    WorkspaceProfile,
};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Skill bonus for each best practice above its threshold
const BEST_PRACTICE_BONUS: i64 = 5;

/// Aggregation state of one profiling run
pub struct ProfileContext<'a> {
    registry: &'a TallyRegistry,
    pub language_usage: BTreeMap<Language, usize>,
    pub metrics: CodeMetrics,
    pub files_analyzed: usize,
    pub files_skipped: usize,
}

impl<'a> ProfileContext<'a> {
    fn new(registry: &'a TallyRegistry) -> Self {
        Self {
            registry,
            language_usage: BTreeMap::new(),
            metrics: CodeMetrics::new(),
            files_analyzed: 0,
            files_skipped: 0,
        }
    }

    /// Tally one file into the running totals
    pub fn record_file(&mut self, path: &Path, content: &str) {
        let language = Language::from_path(path);
        let file_metrics = self.registry.tally(language, content);

        debug!(
            "Tallied {} as {} ({} lines)",
            path.display(),
            language,
            file_metrics.get(Metric::TotalLines)
        );

        *self.language_usage.entry(language).or_insert(0) += 1;
        self.metrics.merge(&file_metrics);
        self.files_analyzed += 1;
    }

    /// Note a file that could not be read
    pub fn record_skipped(&mut self, path: &Path) {
        debug!("Skipped {}", path.display());
        self.files_skipped += 1;
    }
}

/// Folds per-file tallies into a skill profile
pub struct WorkspaceProfiler {
    config: ProfileConfig,
    registry: TallyRegistry,
}

impl WorkspaceProfiler {
    pub fn new(config: ProfileConfig) -> Result<Self> {
        let registry = TallyRegistry::new(config.long_function_lines)?;
        Ok(Self { config, registry })
    }

    /// Start a fresh aggregation context
    pub fn begin(&self) -> ProfileContext<'_> {
        ProfileContext::new(&self.registry)
    }

    /// Profile already-read files. Paths that are not source code are ignored.
    #[instrument(skip(self, files), fields(files = files.len()))]
    pub fn profile(&self, files: &[SourceFile]) -> WorkspaceProfile {
        let mut context = self.begin();
        for file in files.iter().filter(|f| is_code_file(&f.path)) {
            context.record_file(&file.path, &file.content);
        }
        self.assess(&context)
    }

    /// Classify accumulated counts
    pub fn assess(&self, context: &ProfileContext<'_>) -> WorkspaceProfile {
        let metrics = &context.metrics;
        let skill_score = self.skill_score(metrics);
        let skill_level = self.skill_level(skill_score);

        let clusters = self.strong_clusters(metrics);
        let mut strengths = self.language_strengths(&context.language_usage);
        strengths.extend(clusters.iter().map(|(cluster, _)| cluster.label().to_string()));

        let areas = self.improvement_areas(metrics, skill_level);
        let learning_path = Self::learning_path(&areas, &clusters, skill_level);

        info!(
            "Profiled {} files: {} (score {}), {} strengths, {} areas for improvement",
            context.files_analyzed,
            skill_level,
            skill_score,
            strengths.len(),
            areas.len()
        );

        WorkspaceProfile {
            skill_level,
            skill_score,
            strengths,
            areas_for_improvement: areas.iter().map(|a| a.label().to_string()).collect(),
            learning_path,
            language_usage: context.language_usage.clone(),
            files_analyzed: context.files_analyzed,
            files_skipped: context.files_skipped,
        }
    }

    /// Advanced idioms, plus a bonus per best practice, minus issues
    fn skill_score(&self, metrics: &CodeMetrics) -> i64 {
        let config = &self.config;
        let advanced = metrics.sum(Metric::ADVANCED) as i64;
        let issues = metrics.sum(Metric::ISSUES) as i64;

        let best_practices = [
            metrics.get(Metric::ErrorHandling) > config.error_handling_min,
            metrics.get(Metric::DocComments) > config.documentation_min,
            metrics.cluster_total(IdiomCluster::TypeSafety) > config.type_safety_min,
            metrics.get(Metric::Tests) > config.testing_min,
        ];
        let bonus = best_practices.iter().filter(|met| **met).count() as i64 * BEST_PRACTICE_BONUS;

        advanced + bonus - issues
    }

    fn skill_level(&self, score: i64) -> SkillLevel {
        if score > self.config.advanced_score {
            SkillLevel::Advanced
        } else if score > self.config.intermediate_score {
            SkillLevel::Intermediate
        } else {
            SkillLevel::Beginner
        }
    }

    /// Up to two most used languages, each above the file threshold
    fn language_strengths(&self, usage: &BTreeMap<Language, usize>) -> Vec<String> {
        let mut ranked: Vec<(Language, usize)> = usage
            .iter()
            .filter(|(language, _)| **language != Language::Other)
            .map(|(language, count)| (*language, *count))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| a.0.display_name().cmp(b.0.display_name()))
        });

        ranked
            .into_iter()
            .take(2)
            .filter(|(_, count)| *count > self.config.language_strength_min_files)
            .map(|(language, _)| format!("{} Development", language))
            .collect()
    }

    /// Clusters whose combined count exceeds the strength threshold, in cluster order
    fn strong_clusters(&self, metrics: &CodeMetrics) -> Vec<(IdiomCluster, usize)> {
        IdiomCluster::ALL
            .iter()
            .map(|cluster| (*cluster, metrics.cluster_total(*cluster)))
            .filter(|(_, total)| *total > self.config.cluster_strength_min)
            .collect()
    }

    fn improvement_areas(&self, metrics: &CodeMetrics, level: SkillLevel) -> Vec<ImprovementArea> {
        let config = &self.config;
        let mut areas = Vec::new();

        if metrics.get(Metric::LongFunctions) > config.long_function_max
            || metrics.get(Metric::NestedCallbacks) > config.nested_callback_max
        {
            areas.push(ImprovementArea::CodeComplexity);
        }

        if metrics.get(Metric::DebugLogs) > config.debug_log_max {
            areas.push(ImprovementArea::DebuggingPractices);
        }

        // no lines counted means no evidence either way
        if metrics
            .comment_ratio()
            .is_some_and(|ratio| ratio < config.comment_ratio_min)
        {
            areas.push(ImprovementArea::Documentation);
        }

        if metrics.cluster_total(IdiomCluster::ModernSyntax) == 0 && level != SkillLevel::Advanced {
            areas.push(ImprovementArea::ModernFeatures);
        }

        areas
    }

    /// Every catalog challenge for each area, then one stretch item for the strongest cluster
    fn learning_path(
        areas: &[ImprovementArea],
        clusters: &[(IdiomCluster, usize)],
        level: SkillLevel,
    ) -> Vec<LearningPathItem> {
        let mut path: Vec<LearningPathItem> = areas
            .iter()
            .flat_map(|area| {
                area.challenges(level).iter().map(move |challenge| LearningPathItem {
                    area: area.label().to_string(),
                    challenge: challenge.to_string(),
                    difficulty: level,
                    completed: false,
                    character: area.character(),
                })
            })
            .collect();

        // first cluster wins ties
        let strongest = clusters
            .iter()
            .fold(None::<(IdiomCluster, usize)>, |best, (cluster, total)| match best {
                Some((_, best_total)) if best_total >= *total => best,
                _ => Some((*cluster, *total)),
            });

        if let Some((cluster, _)) = strongest {
            let stretch = level.next();
            if let Some(challenge) = catalog::strength_challenges(cluster, stretch).first() {
                path.push(LearningPathItem {
                    area: cluster.label().to_string(),
                    challenge: challenge.to_string(),
                    difficulty: stretch,
                    completed: false,
                    character: catalog::STRENGTH_CHARACTER,
                });
            }
        }

        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codelens_shared::CharacterTag;
    use std::path::PathBuf;

    fn profiler() -> WorkspaceProfiler {
        WorkspaceProfiler::new(ProfileConfig::default()).unwrap()
    }

    #[test]
    fn test_complexity_and_modern_feature_areas() {
        let profiler = profiler();
        let mut context = profiler.begin();
        context.metrics.set(Metric::LongFunctions, 3);
        context.metrics.set(Metric::NestedCallbacks, 4);
        context.metrics.set(Metric::DebugLogs, 1);

        let profile = profiler.assess(&context);

        assert_eq!(profile.skill_score, -8);
        assert_eq!(profile.skill_level, SkillLevel::Beginner);
        assert_eq!(
            profile.areas_for_improvement,
            vec!["Code Complexity", "Modern Language Features"]
        );

        let complexity_items: Vec<&LearningPathItem> = profile
            .learning_path
            .iter()
            .filter(|item| item.area == "Code Complexity")
            .collect();
        assert_eq!(
            complexity_items.len(),
            ImprovementArea::CodeComplexity
                .challenges(SkillLevel::Beginner)
                .len()
        );
        assert!(complexity_items
            .iter()
            .all(|item| item.character == CharacterTag::Architect && !item.completed));
    }

    #[test]
    fn test_skill_levels() {
        let profiler = profiler();

        let mut context = profiler.begin();
        context.metrics.set(Metric::ArrowFunctions, 6);
        assert_eq!(profiler.assess(&context).skill_level, SkillLevel::Intermediate);

        // exactly the threshold stays below it
        context.metrics.set(Metric::ArrowFunctions, 5);
        assert_eq!(profiler.assess(&context).skill_level, SkillLevel::Beginner);

        context.metrics.set(Metric::ArrowFunctions, 15);
        context.metrics.set(Metric::Tests, 4);
        let profile = profiler.assess(&context);
        assert_eq!(profile.skill_score, 20);
        assert_eq!(profile.skill_level, SkillLevel::Intermediate);

        context.metrics.set(Metric::ErrorHandling, 6);
        let profile = profiler.assess(&context);
        assert_eq!(profile.skill_score, 25);
        assert_eq!(profile.skill_level, SkillLevel::Advanced);
        assert!(!profile
            .areas_for_improvement
            .contains(&"Modern Language Features".to_string()));
    }

    #[test]
    fn test_strengths_and_stretch_item() {
        let profiler = profiler();
        let mut context = profiler.begin();
        context.language_usage.insert(Language::TypeScript, 9);
        context.language_usage.insert(Language::Python, 4);
        context.language_usage.insert(Language::Go, 4);
        context.language_usage.insert(Language::Other, 20);
        context.metrics.set(Metric::ArrowFunctions, 12);
        context.metrics.set(Metric::ArrayMethods, 30);

        let profile = profiler.assess(&context);

        assert_eq!(
            profile.strengths,
            vec![
                "TypeScript Development",
                "Go Development",
                "Modern Syntax",
                "Functional Programming"
            ]
        );

        let stretch = profile.learning_path.last().unwrap();
        assert_eq!(stretch.area, "Functional Programming");
        assert_eq!(stretch.character, CharacterTag::Mentor);
        assert_eq!(stretch.difficulty, profile.skill_level.next());
    }

    #[test]
    fn test_language_strength_needs_more_than_threshold() {
        let profiler = profiler();
        let mut context = profiler.begin();
        context.language_usage.insert(Language::Rust, 3);
        assert!(profiler.assess(&context).strengths.is_empty());
    }

    #[test]
    fn test_documentation_area() {
        let profiler = profiler();
        let files = vec![SourceFile::new(
            "src/app.js",
            "const a = () => 1;\nconst b = () => 2;\nconst c = () => 3;\n",
        )];
        let profile = profiler.profile(&files);
        assert!(profile
            .areas_for_improvement
            .contains(&"Documentation".to_string()));

        // an empty run has no lines and so no documentation verdict
        let profile = profiler.profile(&[]);
        assert!(!profile
            .areas_for_improvement
            .contains(&"Documentation".to_string()));
    }

    #[test]
    fn test_profile_files() {
        let files = vec![
            SourceFile::new("web/app.js", "// entry\nconst f = async () => { await go(); };\n"),
            SourceFile::new("web/util.ts", "export const id = <T>(x: T): T => x;\n"),
            SourceFile::new("scripts/job.py", "print('x')\n"),
            SourceFile::new("App.vue", "<template></template>\n"),
            SourceFile::new("logo.png", "\u{0}\u{1}"),
        ];
        let profile = profiler().profile(&files);

        assert_eq!(profile.files_analyzed, 4);
        assert_eq!(profile.language_usage.get(&Language::JavaScript), Some(&1));
        assert_eq!(profile.language_usage.get(&Language::Other), Some(&1));
        assert_eq!(profile.files_skipped, 0);
    }

    #[test]
    fn test_skipped_files_are_counted() {
        let profiler = profiler();
        let mut context = profiler.begin();
        context.record_skipped(&PathBuf::from("locked.js"));
        context.record_file(Path::new("ok.js"), "let x = 1;\n");

        let profile = profiler.assess(&context);
        assert_eq!(profile.files_skipped, 1);
        assert_eq!(profile.files_analyzed, 1);
    }

    #[test]
    fn test_assessment_is_deterministic() {
        let files = vec![
            SourceFile::new("a.js", "const f = (x) => x.map(y => y);\n"),
            SourceFile::new("b.rs", "fn main() { println!(\"hi\"); }\n"),
        ];
        let profiler = profiler();
        assert_eq!(profiler.profile(&files), profiler.profile(&files));
    }
}
