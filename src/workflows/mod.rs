//! Per-workflow configure and summarize steps
//!
//! A workflow either computes extra outputs for its jobs (`configure`) or
//! renders a Markdown report for the step summary (`summarize`).

mod ci_build;
mod deb_build;
mod deb_release;
mod markdown;
mod pull_request;
mod release;
mod release_notes;

pub use pull_request::{triggers, PullRequestEvent, Triggers};
pub use release::ReleaseSummary;
pub use release_notes::{DockerManifests, ImageLayer, ReleaseNotes, TrackerSummary};

use gha_output::Outputs;
use gha_tree::ConfigNode;

use crate::config::Configuration;
use crate::context::RunContext;
use crate::error::{Error, Result};
use crate::scm::Scm;

/// Workflows with a configure or summarize step
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Workflow {
    #[value(name = "ci_build", alias = "ci-build")]
    CiBuild,
    #[value(name = "deb_build", alias = "deb-build")]
    DebBuild,
    #[value(name = "deb_release", alias = "deb-release")]
    DebRelease,
    #[value(name = "pull_request", alias = "pull-request")]
    PullRequest,
    #[value(name = "release")]
    Release,
    #[value(name = "release_notes", alias = "release-notes")]
    ReleaseNotes,
}

impl Workflow {
    pub fn name(&self) -> &'static str {
        match self {
            Workflow::CiBuild => "ci_build",
            Workflow::DebBuild => "deb_build",
            Workflow::DebRelease => "deb_release",
            Workflow::PullRequest => "pull_request",
            Workflow::Release => "release",
            Workflow::ReleaseNotes => "release_notes",
        }
    }
}

impl std::fmt::Display for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Inputs shared by every workflow step
pub struct WorkflowContext<'a> {
    pub run: &'a RunContext,
    pub scm: &'a dyn Scm,
    pub config: &'a Configuration,
}

impl<'a> WorkflowContext<'a> {
    pub fn cfg(&self) -> &'a ConfigNode {
        &self.config.cfg
    }

    pub fn github(&self) -> &'a ConfigNode {
        &self.config.github
    }

    /// Workflow inputs, required by `workflow`
    pub fn inputs(&self, workflow: Workflow) -> Result<&'a ConfigNode> {
        self.config
            .inputs
            .as_ref()
            .ok_or(Error::MissingInputs(workflow.name()))
    }
}

/// Compute the outputs of a workflow's configure step
pub fn configure(workflow: Workflow, ctx: &WorkflowContext<'_>) -> Result<Outputs> {
    let outputs = match workflow {
        Workflow::CiBuild => ci_build::configure(ctx)?,
        Workflow::DebBuild => deb_build::configure(ctx)?,
        Workflow::DebRelease => deb_release::configure(ctx)?,
        Workflow::PullRequest => pull_request::configure(ctx)?,
        Workflow::Release | Workflow::ReleaseNotes => {
            return Err(Error::UnsupportedOperation {
                workflow: workflow.name(),
                operation: "configure",
            })
        }
    };
    tracing::debug!(%workflow, outputs = outputs.len(), "configured workflow");
    Ok(outputs)
}

/// Render the Markdown report of a workflow's summarize step
pub fn summarize(workflow: Workflow, ctx: &WorkflowContext<'_>) -> Result<String> {
    match workflow {
        Workflow::Release => Ok(ReleaseSummary::collect(ctx)?.to_string()),
        Workflow::ReleaseNotes => Ok(ReleaseNotes::collect(ctx)?.to_string()),
        Workflow::CiBuild | Workflow::DebBuild | Workflow::DebRelease | Workflow::PullRequest => {
            Err(Error::UnsupportedOperation {
                workflow: workflow.name(),
                operation: "summarize",
            })
        }
    }
}
