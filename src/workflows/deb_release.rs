//! Debian package release
//!
//! Packages are built for tags, and for `workflow_run` events on the
//! release branch (`debian.release_branch`, `master` when unset).

use gha_output::Outputs;

use super::WorkflowContext;
use crate::error::Result;

const DEFAULT_RELEASE_BRANCH: &str = "master";

pub(super) fn configure(ctx: &WorkflowContext<'_>) -> Result<Outputs> {
    let cfg = ctx.cfg();
    let github = ctx.github();

    let release_branch = match cfg.find("debian.release_branch")? {
        Some(_) => cfg
            .opt_str_at("debian.release_branch")?
            .unwrap_or(DEFAULT_RELEASE_BRANCH),
        None => DEFAULT_RELEASE_BRANCH,
    };

    let event_name = github.str_at("event_name")?;
    let ref_name = github.str_at("ref_name")?;
    let ref_type = github.str_at("ref_type")?;
    let deb_build = should_build(event_name, ref_name, ref_type, release_branch);

    tracing::info!(
        event = event_name,
        ref_name,
        ref_type,
        deb_build,
        "debian release trigger"
    );

    Ok(Outputs::new()
        .with("DEB_BUILD", deb_build)
        .with("DEB_IMAGES", cfg.str_at("debian.builder.base_images_matrix")?)
        .with("DEB_PLATFORMS", cfg.str_at("debian.builder.architectures_matrix")?)
        .with(
            "DEB_ARTIFACTS_PREFIX",
            format!("{}-deb-", cfg.str_at("build.repository.name")?),
        ))
}

fn should_build(event_name: &str, ref_name: &str, ref_type: &str, release_branch: &str) -> bool {
    (event_name == "workflow_run" && ref_name == release_branch) || ref_type == "tag"
}
