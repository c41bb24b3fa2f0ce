//! gha-settings - GitHub Actions settings helper
//!
//! Computes derived configuration values (build versions, image tags,
//! test runner matrices, registry login flags) from a repository's
//! settings file and the workflow run context, writes them to the
//! `GITHUB_OUTPUT` channel, and renders release reports into the step
//! summary.

pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod outputs;
pub mod scm;
pub mod workflows;

pub use config::{configuration, Configuration, SettingsFile};
pub use context::RunContext;
pub use error::{Error, Result};
pub use scm::{CliScm, Scm, StaticScm};
pub use workflows::Workflow;
