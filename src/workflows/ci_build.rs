//! CI build: one job per build platform and base image

use gha_output::Outputs;

use super::{Workflow, WorkflowContext};
use crate::config::runner_json;
use crate::error::Result;

pub(super) fn configure(ctx: &WorkflowContext<'_>) -> Result<Outputs> {
    let cfg = ctx.cfg();
    let inputs = ctx.inputs(Workflow::CiBuild)?;

    let build_platform = inputs.str_at("build_platform")?;
    let base_image = inputs.str_at("base_image")?;

    let platform_label = build_platform.replace('/', "-");
    let base_image_tag = base_image.replace(':', "-");
    let tester_image = format!("{}:{}", cfg.str_at("ci.images.tester.repo")?, base_image_tag);

    let test_id = format!("ci-{}__{}", platform_label, cfg.str_at("build.version")?);
    let test_artifact = format!(
        "{}-test-{}__{}",
        cfg.str_at("build.repository.name")?,
        test_id,
        cfg.str_at("build.date")?
    );

    Ok(Outputs::new()
        .with("CI_RUNNER", runner_json(cfg, build_platform)?)
        .with("CI_TESTER_IMAGE", tester_image)
        .with("TEST_ARTIFACT", test_artifact)
        .with("TEST_ID", test_id))
}
