//! Workspace file enumeration
//!
//! The profiler never touches storage itself. A [`WorkspaceSource`] lists and
//! reads files; [`profile_source`] feeds them through one profiling run,
//! skipping any file that cannot be read.

use crate::analysis::profile::WorkspaceProfiler;
use async_trait::async_trait;
use codelens_shared::{is_code_file, AnalysisError, Result, WorkspaceConfig, WorkspaceProfile};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

/// Supplies workspace files to the profiler
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkspaceSource: Send + Sync {
    /// Candidate file paths, in a stable order
    async fn list_files(&self) -> Result<Vec<PathBuf>>;

    /// Full text of one listed file
    async fn read_file(&self, path: &Path) -> Result<String>;
}

/// Local directory tree
pub struct FsWorkspace {
    root: PathBuf,
    ignore_patterns: Vec<String>,
    max_file_bytes: u64,
}

impl FsWorkspace {
    /// Create a source rooted at `root`, which must be an existing directory
    pub fn new(root: impl Into<PathBuf>, config: &WorkspaceConfig) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(AnalysisError::InvalidWorkspace {
                path: root.display().to_string(),
            }
            .into());
        }

        Ok(Self {
            root,
            ignore_patterns: config.ignore_patterns.clone(),
            max_file_bytes: config.max_file_bytes,
        })
    }

    /// True when any path component is an ignored name
    fn should_ignore_path(&self, path: &Path) -> bool {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .components()
            .any(|component| {
                let name = component.as_os_str().to_string_lossy();
                self.ignore_patterns.iter().any(|pattern| *pattern == name)
            })
    }
}

#[async_trait]
impl WorkspaceSource for FsWorkspace {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn list_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !self.should_ignore_path(e.path()))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !is_code_file(entry.path()) {
                continue;
            }

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            if size > self.max_file_bytes {
                debug!(
                    "Skipping {} ({} bytes over the {} byte cap)",
                    entry.path().display(),
                    size,
                    self.max_file_bytes
                );
                continue;
            }

            files.push(entry.into_path());
        }

        debug!("Found {} candidate files", files.len());
        Ok(files)
    }

    async fn read_file(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path).await?)
    }
}

/// Profile every code file a source lists. Unreadable files are logged and counted as skipped.
#[instrument(skip(profiler, source))]
pub async fn profile_source(
    profiler: &WorkspaceProfiler,
    source: &dyn WorkspaceSource,
) -> Result<WorkspaceProfile> {
    let paths = source.list_files().await?;
    let mut context = profiler.begin();

    for path in paths.iter().filter(|p| is_code_file(p)) {
        match source.read_file(path).await {
            Ok(content) => context.record_file(path, &content),
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                context.record_skipped(path);
            }
        }
    }

    let profile = profiler.assess(&context);
    info!(
        "Workspace profile ready: {} analyzed, {} skipped",
        profile.files_analyzed, profile.files_skipped
    );
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codelens_shared::{CodelensError, Language, ProfileConfig};
    use std::io;
    use tempfile::TempDir;

    async fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.unwrap();
        }
        fs::write(path, content).await.unwrap();
    }

    #[tokio::test]
    async fn test_fs_workspace_listing() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        write(root, "src/app.js", "const a = 1;").await;
        write(root, "src/builder.ts", "let b = 2;").await;
        write(root, "node_modules/lib/index.js", "module.exports = {};").await;
        write(root, "build/out.js", "var c;").await;
        write(root, "docs/logo.png", "png").await;
        write(root, "big.py", &"x = 1\n".repeat(100)).await;

        let config = WorkspaceConfig {
            max_file_bytes: 200,
            ..WorkspaceConfig::default()
        };
        let workspace = FsWorkspace::new(root, &config).unwrap();
        let files = workspace.list_files().await.unwrap();

        let relative: Vec<PathBuf> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            relative,
            vec![PathBuf::from("src/app.js"), PathBuf::from("src/builder.ts")]
        );

        let content = workspace.read_file(&files[0]).await.unwrap();
        assert_eq!(content, "const a = 1;");
    }

    #[tokio::test]
    async fn test_fs_workspace_rejects_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        let result = FsWorkspace::new(&missing, &WorkspaceConfig::default());
        assert!(matches!(result, Err(CodelensError::Analysis { .. })));
        assert!(FsWorkspace::new(temp_dir.path(), &WorkspaceConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_unreadable_files_are_skipped() {
        let mut source = MockWorkspaceSource::new();
        source.expect_list_files().returning(|| {
            Ok(vec![
                PathBuf::from("a.js"),
                PathBuf::from("locked.js"),
                PathBuf::from("notes.txt"),
            ])
        });
        source
            .expect_read_file()
            .times(2)
            .returning(|path: &Path| {
                if path.ends_with("locked.js") {
                    Err(CodelensError::Io(io::Error::new(
                        io::ErrorKind::PermissionDenied,
                        "denied",
                    )))
                } else {
                    Ok("const f = () => 1;\n".to_string())
                }
            });

        let profiler = WorkspaceProfiler::new(ProfileConfig::default()).unwrap();
        let profile = profile_source(&profiler, &source).await.unwrap();

        assert_eq!(profile.files_analyzed, 1);
        assert_eq!(profile.files_skipped, 1);
        assert_eq!(profile.language_usage.get(&Language::JavaScript), Some(&1));
    }

    #[tokio::test]
    async fn test_listing_failure_is_an_error() {
        let mut source = MockWorkspaceSource::new();
        source.expect_list_files().returning(|| {
            Err(AnalysisError::InvalidWorkspace {
                path: "/gone".to_string(),
            }
            .into())
        });
        source.expect_read_file().never();

        let profiler = WorkspaceProfiler::new(ProfileConfig::default()).unwrap();
        assert!(profile_source(&profiler, &source).await.is_err());
    }
}
