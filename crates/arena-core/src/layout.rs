use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use crate::error::ArenaError;

/// On-disk layout of one arena run.
///
/// ```text
/// <root>/
///   task.md
///   variations/variation_{n}.md
///   workspaces/variation_{n}/
///   results/variation_{n}.md
///   evaluation.md
///   arena.json
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunLayout {
    root: PathBuf,
}

impl RunLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<base>/arena-YYYYMMDD-HHMMSS`.
    pub fn timestamped<Tz>(base: &Path, now: DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        Self::new(base.join(format!("arena-{}", now.format("%Y%m%d-%H%M%S"))))
    }

    /// Creates the root and its fixed subdirectories.
    pub async fn create(&self) -> Result<(), ArenaError> {
        for dir in [
            self.root.clone(),
            self.variations_dir(),
            self.workspaces_dir(),
            self.results_dir(),
        ] {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| ArenaError::io(&dir, e))?;
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn task_file(&self) -> PathBuf {
        self.root.join("task.md")
    }

    pub fn variations_dir(&self) -> PathBuf {
        self.root.join("variations")
    }

    pub fn variation_file(&self, number: u32) -> PathBuf {
        self.variations_dir().join(format!("variation_{number}.md"))
    }

    pub fn workspaces_dir(&self) -> PathBuf {
        self.root.join("workspaces")
    }

    pub fn workspace(&self, number: u32) -> PathBuf {
        self.workspaces_dir().join(format!("variation_{number}"))
    }

    pub fn results_dir(&self) -> PathBuf {
        self.root.join("results")
    }

    pub fn result_file(&self, number: u32) -> PathBuf {
        self.results_dir().join(format!("variation_{number}.md"))
    }

    pub fn evaluation_file(&self) -> PathBuf {
        self.root.join("evaluation.md")
    }

    pub fn summary_file(&self) -> PathBuf {
        self.root.join("arena.json")
    }

    /// Path of `file` relative to the root, as the judge sees it from its
    /// working directory.
    pub fn relative(&self, file: &Path) -> String {
        file.strip_prefix(&self.root)
            .unwrap_or(file)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

/// Writes `content` to `path`, mapping failures to [`ArenaError::Io`].
pub(crate) async fn write_file(path: &Path, content: &str) -> Result<(), ArenaError> {
    tokio::fs::write(path, content)
        .await
        .map_err(|e| ArenaError::io(path, e))
}
