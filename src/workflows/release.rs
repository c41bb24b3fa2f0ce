//! Release summary: images and packages produced by a release run

use std::fmt;
use std::path::PathBuf;

use super::markdown::{deb_packages, html_list, RepoLinks};
use super::WorkflowContext;
use crate::error::Result;

/// Summary of a release run
#[derive(Debug, Clone)]
pub struct ReleaseSummary {
    pub repository: String,
    pub repository_url: String,
    pub name: String,
    pub profile: String,
    pub version: String,
    pub sha: String,
    pub settings_file: String,

    /// Tag name, for tagged runs
    pub tag: Option<String>,

    pub prerelease_image: String,
    pub release_images: Vec<String>,
    pub deb_packages: Vec<PathBuf>,
}

/// Tag name of a tag-triggered run
pub(super) fn run_tag(ctx: &WorkflowContext<'_>) -> Result<Option<String>> {
    let github = ctx.github();
    Ok(if github.str_at("ref_type")? == "tag" {
        Some(github.str_at("ref_name")?.to_string())
    } else {
        None
    })
}

impl ReleaseSummary {
    pub fn collect(ctx: &WorkflowContext<'_>) -> Result<Self> {
        let cfg = ctx.cfg();
        let artifacts_dir = PathBuf::from(cfg.str_at("build.artifacts_dir")?);

        Ok(Self {
            repository: ctx.github().str_at("repository")?.to_string(),
            repository_url: cfg.str_at("build.repository.url")?.to_string(),
            name: cfg.str_at("build.repository.name")?.to_string(),
            profile: cfg.str_at("build.profile")?.to_string(),
            version: cfg.str_at("build.version")?.to_string(),
            sha: ctx.github().str_at("sha")?.to_string(),
            settings_file: cfg.str_at("build.settings_file")?.to_string(),
            tag: run_tag(ctx)?,
            prerelease_image: cfg.str_at("release.prerelease_image")?.to_string(),
            release_images: cfg.strings_at("release.final_images")?,
            deb_packages: deb_packages(&artifacts_dir)?,
        })
    }

    fn links(&self) -> RepoLinks<'_> {
        RepoLinks {
            repository: &self.repository,
            url: &self.repository_url,
            tag: self.tag.as_deref(),
        }
    }
}

impl fmt::Display for ReleaseSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let links = self.links();

        writeln!(f, "# {} - {} release - {}", self.name, self.profile, self.version)?;
        writeln!(f)?;
        writeln!(f, "| Property | Value |")?;
        writeln!(f, "|----------|-------|")?;
        writeln!(f, "| **Commit SHA** | {} |", links.commit(&self.sha))?;
        writeln!(
            f,
            "| **Release Settings** | {} |",
            links.settings(&self.sha, &self.settings_file)
        )?;
        writeln!(f, "| **Pre-release Image** | {} |", links.image(&self.prerelease_image))?;
        writeln!(
            f,
            "| **Release Images** | {} |",
            html_list(self.release_images.iter().map(|img| links.image(img)))
        )?;
        if self.deb_packages.is_empty() {
            writeln!(f, "| **Debian Packages** | No packages were generated. |")?;
        } else {
            writeln!(
                f,
                "| **Debian Packages** | {} |",
                html_list(self.deb_packages.iter().map(|pkg| links.deb_package(pkg)))
            )?;
        }
        Ok(())
    }
}
