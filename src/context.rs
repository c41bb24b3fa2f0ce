//! Per-invocation run context
//!
//! Populated once at process start from CLI flags and the environment,
//! then passed explicitly to everything that needs a path or the clock.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Settings file location, relative to the clone directory
pub const DEFAULT_SETTINGS_FILE: &str = ".github/settings.yml";

/// Directory collecting build artifacts, relative to the clone directory
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// Resolved paths and timestamp for one invocation
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Root of the repository checkout
    pub clone_dir: PathBuf,

    /// Settings file (absolute, or relative to the working directory)
    pub settings_file: PathBuf,

    /// When the invocation started; source of every derived date
    pub started_at: DateTime<Utc>,

    /// Output channel (`GITHUB_OUTPUT`)
    pub output_path: Option<PathBuf>,

    /// Step summary channel (`GITHUB_STEP_SUMMARY`)
    pub summary_path: Option<PathBuf>,
}

impl RunContext {
    /// Context for a checkout, using the default settings file location
    pub fn new(clone_dir: impl Into<PathBuf>) -> Self {
        let clone_dir = clone_dir.into();
        Self {
            settings_file: clone_dir.join(DEFAULT_SETTINGS_FILE),
            clone_dir,
            started_at: Utc::now(),
            output_path: None,
            summary_path: None,
        }
    }

    pub fn with_settings_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_file = path.into();
        self
    }

    pub fn with_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = started_at;
        self
    }

    pub fn with_output_path(mut self, path: Option<PathBuf>) -> Self {
        self.output_path = path;
        self
    }

    pub fn with_summary_path(mut self, path: Option<PathBuf>) -> Self {
        self.summary_path = path;
        self
    }

    /// Build date used in versions and artifact names
    pub fn build_date(&self) -> String {
        self.started_at.format("%Y%m%d-%H%M%S").to_string()
    }

    /// Settings file path as it appears in repository links
    pub fn settings_file_in_repo(&self) -> String {
        let relative = self
            .settings_file
            .strip_prefix(&self.clone_dir)
            .unwrap_or(&self.settings_file);
        relative.to_string_lossy().replace('\\', "/")
    }

    pub fn default_artifacts_dir(&self) -> PathBuf {
        self.clone_dir.join(DEFAULT_ARTIFACTS_DIR)
    }

    /// Whether the checkout carries Debian packaging
    pub fn has_debian_packaging(&self) -> bool {
        self.clone_dir.join("debian").join("control").is_file()
    }

    pub fn output_path(&self) -> Result<&Path> {
        self.output_path
            .as_deref()
            .ok_or(Error::MissingEnv(gha_output::GITHUB_OUTPUT))
    }

    pub fn summary_path(&self) -> Result<&Path> {
        self.summary_path
            .as_deref()
            .ok_or(Error::MissingEnv(gha_output::GITHUB_STEP_SUMMARY))
    }
}
