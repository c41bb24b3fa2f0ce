//! Output selection
//!
//! `--outputs` takes one `VAR = ctx.path` assignment per line. `ctx` names
//! one of the selection contexts (`cfg`, `env`, `github`, `inputs`) and
//! `path` is a dotted selector evaluated against it.

use gha_output::{validate_name, OutputValue, Outputs};
use gha_tree::{select, ConfigNode, Mapping, Selectable};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Context an output selector reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextName {
    Cfg,
    Env,
    GitHub,
    Inputs,
}

impl FromStr for ContextName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cfg" => Ok(ContextName::Cfg),
            "env" => Ok(ContextName::Env),
            "github" => Ok(ContextName::GitHub),
            "inputs" => Ok(ContextName::Inputs),
            other => Err(Error::UnknownContext(other.to_string())),
        }
    }
}

impl fmt::Display for ContextName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContextName::Cfg => "cfg",
            ContextName::Env => "env",
            ContextName::GitHub => "github",
            ContextName::Inputs => "inputs",
        };
        f.write_str(name)
    }
}

/// One `VAR = ctx.path` assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    pub name: String,
    pub context: ContextName,
    pub path: String,
}

impl OutputSpec {
    pub fn parse(line: &str) -> Result<Self> {
        let invalid = |reason| Error::InvalidOutputSpec {
            line: line.to_string(),
            reason,
        };

        let (name, selector) = line.split_once('=').ok_or_else(|| invalid("missing '='"))?;
        let name = name.trim();
        let selector = selector.trim();
        validate_name(name)?;

        let (context, path) = selector
            .split_once('.')
            .ok_or_else(|| invalid("selector must be <context>.<path>"))?;

        Ok(Self {
            name: name.to_string(),
            context: context.parse()?,
            path: path.to_string(),
        })
    }
}

/// Parse `--outputs` text, skipping blank lines
pub fn parse_output_specs(text: &str) -> Result<Vec<OutputSpec>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(OutputSpec::parse)
        .collect()
}

static NO_INPUTS: ConfigNode = ConfigNode::Empty;

/// Roots the output selectors are evaluated against
#[derive(Debug, Clone, Copy)]
pub struct Contexts<'a> {
    pub cfg: &'a ConfigNode,
    pub env: &'a Mapping,
    pub github: &'a ConfigNode,
    pub inputs: Option<&'a ConfigNode>,
}

impl<'a> Contexts<'a> {
    fn root(&self, context: ContextName) -> Selectable<'a> {
        match context {
            ContextName::Cfg => self.cfg.into(),
            ContextName::Env => self.env.into(),
            ContextName::GitHub => self.github.into(),
            ContextName::Inputs => self.inputs.unwrap_or(&NO_INPUTS).into(),
        }
    }
}

/// Evaluate every selector and collect the results in order
pub fn select_outputs(specs: &[OutputSpec], contexts: &Contexts<'_>) -> Result<Outputs> {
    let mut outputs = Outputs::new();
    for spec in specs {
        let value = select(contexts.root(spec.context), &spec.path)?;
        let value = OutputValue::from_json(&spec.name, &value)?;
        tracing::debug!(
            name = %spec.name,
            context = %spec.context,
            path = %spec.path,
            "selected output"
        );
        outputs.insert(spec.name.clone(), value);
    }
    Ok(outputs)
}

/// Environment variables as a selection context
pub fn env_mapping() -> Mapping {
    std::env::vars()
        .map(|(key, value)| (key, serde_json::Value::String(value)))
        .collect()
}
