//! Source control collaborators
//!
//! Commit and review lookups go through the [`Scm`] trait so that settings
//! derivation can run against a fixed answer in tests.

use std::path::PathBuf;
use std::process::Command;

use crate::error::{Error, Result};

/// Queries answered by the repository checkout and its hosting service
pub trait Scm {
    /// Abbreviated hash of the checked-out commit
    fn sha_short(&self) -> Result<String>;

    /// Review decision of a pull request (e.g. `APPROVED`), or an empty
    /// string when no decision exists yet
    fn review_decision(&self, repository: &str, pr_number: i64) -> Result<String>;
}

/// [`Scm`] backed by the `git` and `gh` command-line tools
#[derive(Debug, Clone)]
pub struct CliScm {
    clone_dir: PathBuf,
}

impl CliScm {
    pub fn new(clone_dir: impl Into<PathBuf>) -> Self {
        Self {
            clone_dir: clone_dir.into(),
        }
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        let command = format!("{} {}", program, args.join(" "));
        tracing::debug!(%command, cwd = %self.clone_dir.display(), "running");

        let output = Command::new(program)
            .args(args)
            .current_dir(&self.clone_dir)
            .output()
            .map_err(|e| Error::Command {
                command: command.clone(),
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::Command {
                command,
                detail: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Scm for CliScm {
    fn sha_short(&self) -> Result<String> {
        self.run("git", &["rev-parse", "--short", "HEAD"])
    }

    fn review_decision(&self, repository: &str, pr_number: i64) -> Result<String> {
        // The pull_request payload carries no review state, ask the API
        self.run("gh", &["repo", "set-default", repository])?;
        let pr = pr_number.to_string();
        self.run(
            "gh",
            &[
                "pr",
                "view",
                &pr,
                "--json",
                "reviewDecision",
                "--jq",
                ".reviewDecision",
            ],
        )
    }
}

/// [`Scm`] with canned answers
#[derive(Debug, Clone, Default)]
pub struct StaticScm {
    pub sha: String,
    pub review_decision: String,
}

impl StaticScm {
    pub fn new(sha: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            review_decision: String::new(),
        }
    }

    pub fn with_review_decision(mut self, decision: impl Into<String>) -> Self {
        self.review_decision = decision.into();
        self
    }
}

impl Scm for StaticScm {
    fn sha_short(&self) -> Result<String> {
        Ok(self.sha.clone())
    }

    fn review_decision(&self, _repository: &str, _pr_number: i64) -> Result<String> {
        Ok(self.review_decision.clone())
    }
}
