//! Configuration assembly
//!
//! Combines the settings file, the derived settings and the run context
//! into the `cfg` tree the workflows and output selectors read from.

use gha_tree::{merge, to_mapping, to_tree, ConfigNode, Mapping};
use serde_json::{json, Value};

use super::derived::derive_settings;
use super::loader::{parse_context, SettingsFile};
use crate::context::RunContext;
use crate::error::Result;
use crate::scm::Scm;

/// Everything a workflow may read
#[derive(Debug, Clone)]
pub struct Configuration {
    /// `github` context of the workflow run
    pub github: ConfigNode,

    /// Workflow inputs, when any were passed
    pub inputs: Option<ConfigNode>,

    /// The loaded settings file
    pub settings: SettingsFile,

    /// Merged configuration as a tree
    pub cfg: ConfigNode,
}

/// Load settings and compute the merged configuration for a run
pub fn configuration(
    run: &RunContext,
    scm: &dyn Scm,
    github_json: &str,
    inputs_json: Option<&str>,
) -> Result<Configuration> {
    let github_mapping = parse_context("github", github_json)?;
    let github = to_tree(&github_mapping)?;

    let inputs_mapping = match inputs_json {
        Some(text) if !text.trim().is_empty() => Some(parse_context("inputs", text)?),
        _ => None,
    };
    let inputs = inputs_mapping.as_ref().map(to_tree).transpose()?;

    let settings = SettingsFile::load(&run.settings_file)?;
    let settings_tree = to_tree(&settings.mapping)?;

    let derived = derive_settings(run, scm, &settings_tree, &github, &settings.digest)?;
    let cfg_mapping = merge(&derived, &to_mapping(&settings_tree));

    let mut build = Mapping::new();
    build.insert(
        "artifacts_dir".to_string(),
        json!(run.default_artifacts_dir().to_string_lossy()),
    );
    build.insert("clone_dir".to_string(), json!(run.clone_dir.to_string_lossy()));
    let mut run_settings = Mapping::new();
    run_settings.insert("build".to_string(), Value::Object(build));
    let cfg_mapping = merge(&cfg_mapping, &run_settings);
    let cfg = to_tree(&cfg_mapping)?;

    tracing::debug!(
        settings = %settings.path.display(),
        keys = cfg_mapping.len(),
        "assembled configuration"
    );

    Ok(Configuration {
        github,
        inputs,
        settings,
        cfg,
    })
}
