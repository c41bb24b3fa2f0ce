//! Debian package build: one job per builder base image and architecture

use gha_output::Outputs;

use super::{Workflow, WorkflowContext};
use crate::config::runner_json;
use crate::error::Result;

pub(super) fn configure(ctx: &WorkflowContext<'_>) -> Result<Outputs> {
    let cfg = ctx.cfg();
    let inputs = ctx.inputs(Workflow::DebBuild)?;

    let architecture = inputs.str_at("build_architecture")?;
    let base_image = inputs.str_at("base_image")?;

    let builder_tag = base_image.replace([':', '/'], "-");
    let repo = cfg.str_at("build.repository.name")?;
    let version = cfg.str_at("build.version")?;
    let date = cfg.str_at("build.date")?;

    let test_id = format!("deb-{}-{}__{}", builder_tag, architecture, version);
    let test_artifact = format!("{}-debtest-{}__{}", repo, test_id, date);
    let deb_artifact = format!(
        "{}-deb-{}-{}__{}__{}",
        repo, builder_tag, architecture, version, date
    );
    let builder = format!("{}:{}", cfg.str_at("debian.builder.repo")?, builder_tag);

    Ok(Outputs::new()
        .with("DEB_ARTIFACT", deb_artifact)
        .with("DEB_BUILDER", builder)
        .with(
            "DEB_RUNNER",
            runner_json(cfg, &format!("linux/{}", architecture))?,
        )
        .with("TEST_ARTIFACT", test_artifact)
        .with("TEST_ID", test_id))
}
