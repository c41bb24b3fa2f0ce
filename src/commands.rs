//! Command implementations behind the CLI

use gha_output::{append_summary, export_env, write_outputs, Outputs};
use serde_json::Value;

use crate::config::configuration;
use crate::context::RunContext;
use crate::error::Result;
use crate::outputs::{env_mapping, parse_output_specs, select_outputs, Contexts};
use crate::scm::Scm;
use crate::workflows::{self, Workflow, WorkflowContext};

/// Arguments of the `configure` command
#[derive(Debug, Clone, Default)]
pub struct ConfigureArgs {
    /// `github` context, JSON encoded
    pub github: String,

    /// `inputs` context, JSON encoded
    pub inputs: Option<String>,

    /// `VAR = ctx.path` lines
    pub outputs: Option<String>,

    pub workflow: Option<Workflow>,

    /// Environment variables re-exported as outputs
    pub export_env: Vec<String>,
}

/// Compute the requested outputs and append them to the output channel.
///
/// Outputs are written in order: re-exported environment variables,
/// selected values, then workflow outputs. A later output replaces an
/// earlier one with the same name.
pub fn configure(run: &RunContext, scm: &dyn Scm, args: &ConfigureArgs) -> Result<Outputs> {
    let config = configuration(run, scm, &args.github, args.inputs.as_deref())?;

    let mut outputs = export_env(&args.export_env);

    if let Some(text) = &args.outputs {
        let specs = parse_output_specs(text)?;
        let env = env_mapping();
        let contexts = Contexts {
            cfg: &config.cfg,
            env: &env,
            github: &config.github,
            inputs: config.inputs.as_ref(),
        };
        outputs.extend(select_outputs(&specs, &contexts)?);
    }

    if let Some(workflow) = args.workflow {
        let ctx = WorkflowContext {
            run,
            scm,
            config: &config,
        };
        outputs.extend(workflows::configure(workflow, &ctx)?);
    }

    if !outputs.is_empty() {
        write_outputs(run.output_path()?, &outputs)?;
    }
    Ok(outputs)
}

/// Render a workflow report and append it to the step summary
pub fn summarize(
    run: &RunContext,
    scm: &dyn Scm,
    workflow: Workflow,
    github: &str,
    inputs: Option<&str>,
) -> Result<String> {
    let config = configuration(run, scm, github, inputs)?;
    let ctx = WorkflowContext {
        run,
        scm,
        config: &config,
    };
    let summary = workflows::summarize(workflow, &ctx)?;
    append_summary(run.summary_path()?, &summary)?;
    Ok(summary)
}

/// Select a value from the merged configuration
pub fn select(run: &RunContext, scm: &dyn Scm, github: &str, path: &str) -> Result<Value> {
    let config = configuration(run, scm, github, None)?;
    Ok(gha_tree::select(&config.cfg, path)?)
}
