//! Per-run scratch directory for downloaded images and the encoded video.
//!
//! Every file the pipeline may write is reserved up front, so cleanup can
//! issue a removal for each of them no matter which stage failed.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A file that could not be removed during cleanup.
#[derive(Debug, Clone)]
pub struct CleanupFailure {
    pub path: PathBuf,
    pub error: String,
}

/// What cleanup did with each reserved file.
#[derive(Debug, Clone, Default)]
pub struct CleanupReport {
    /// Files that existed and were removed.
    pub removed: Vec<PathBuf>,
    /// Files that were never written (nothing to remove).
    pub missing: Vec<PathBuf>,
    /// Files whose removal failed.
    pub failed: Vec<CleanupFailure>,
    /// Whether the scratch directory itself is gone.
    pub directory_removed: bool,
}

impl CleanupReport {
    /// Every path a removal was issued for.
    pub fn attempted(&self) -> Vec<&Path> {
        self.removed
            .iter()
            .chain(self.missing.iter())
            .map(PathBuf::as_path)
            .chain(self.failed.iter().map(|f| f.path.as_path()))
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.directory_removed
    }
}

/// Scratch directory owned by one pipeline run.
pub struct ScratchSpace {
    dir: TempDir,
    files: Vec<PathBuf>,
}

impl ScratchSpace {
    /// Create a fresh `slidereel-*` directory under `root`.
    pub fn create_in(root: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(root)?;
        let dir = tempfile::Builder::new()
            .prefix("slidereel-")
            .tempdir_in(root)?;
        Ok(Self {
            dir,
            files: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Reserve `file_name` inside the scratch directory and return its path.
    pub fn reserve(&mut self, file_name: &str) -> PathBuf {
        let path = self.dir.path().join(file_name);
        self.files.push(path.clone());
        path
    }

    pub fn reserved(&self) -> &[PathBuf] {
        &self.files
    }

    /// Remove every reserved file, then the directory. Never fails; problems
    /// are recorded in the report and logged.
    pub async fn cleanup(self) -> CleanupReport {
        let mut report = CleanupReport::default();

        for path in self.files {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => report.removed.push(path),
                Err(e) if e.kind() == io::ErrorKind::NotFound => report.missing.push(path),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to remove scratch file"
                    );
                    report.failed.push(CleanupFailure {
                        path,
                        error: e.to_string(),
                    });
                }
            }
        }

        match tokio::fs::remove_dir_all(self.dir.path()).await {
            Ok(()) => report.directory_removed = true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => report.directory_removed = true,
            Err(e) => {
                tracing::warn!(
                    path = %self.dir.path().display(),
                    error = %e,
                    "Failed to remove scratch directory"
                );
            }
        }

        report
    }
}
