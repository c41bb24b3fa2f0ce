//! Release notes
//!
//! The release tracker leaves two files in the artifacts directory:
//! - `release-tracker.commit`: commit of the tracker repository
//! - `release-tracker-summary.json`: the tracker entry for this release
//!
//! The entry points to the Docker manifests recorded for the release
//! (`<storage>/<track>/<version id>/docker-manifests.json`, relative to the
//! workspace). The notes cross-reference those manifests with the images
//! and packages the release was expected to produce.

use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use super::markdown::{deb_matcher, deb_packages, html_list, RepoLinks};
use super::release::run_tag;
use super::WorkflowContext;
use crate::error::{Error, Result};

pub const TRACKER_COMMIT_FILE: &str = "release-tracker.commit";
pub const TRACKER_SUMMARY_FILE: &str = "release-tracker-summary.json";
pub const DOCKER_MANIFESTS_FILE: &str = "docker-manifests.json";

/// Annotation of attestation layers naming the layer they describe
pub const REFERENCE_DIGEST_ANNOTATION: &str = "vnd.docker.reference.digest";

/// Release tracker summary of one release
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerSummary {
    pub storage: String,
    pub track: String,
    pub entry: TrackerEntry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerEntry {
    pub created_at: Value,
    pub version: String,
}

impl TrackerSummary {
    /// Identifier of the release in the tracker
    pub fn version_id(&self) -> String {
        let created_at = match &self.entry.created_at {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        format!("{}__{}", created_at, self.entry.version)
    }

    /// Manifests file, relative to the workspace
    pub fn manifests_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.storage,
            self.track,
            self.version_id(),
            DOCKER_MANIFESTS_FILE
        )
    }
}

/// Docker manifests recorded for a release, by image
#[derive(Debug, Clone, Deserialize)]
pub struct DockerManifests {
    pub images: BTreeMap<String, ImageManifest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageManifest {
    #[serde(default)]
    pub manifests: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    pub digest: String,
    pub platform: Platform,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Platform {
    pub os: String,
    pub architecture: String,
}

impl Platform {
    fn is_unknown(&self) -> bool {
        self.os == "unknown"
    }
}

/// One manifest layer of a released image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLayer {
    pub image: String,
    pub digest: String,
    pub platform: Platform,

    /// Attestation layer, reported with the platform it describes
    pub unknown: bool,
}

impl DockerManifests {
    /// Platform layers of every image, followed by the image's attestation
    /// layers. An attestation layer whose reference cannot be resolved
    /// keeps its own platform.
    pub fn layers(&self) -> Vec<ImageLayer> {
        let mut layers = Vec::new();
        for (image, manifest) in &self.images {
            let (unknown, known): (Vec<&ManifestEntry>, Vec<&ManifestEntry>) = manifest
                .manifests
                .iter()
                .partition(|entry| entry.platform.is_unknown());

            for entry in &known {
                layers.push(ImageLayer {
                    image: image.clone(),
                    digest: entry.digest.clone(),
                    platform: entry.platform.clone(),
                    unknown: false,
                });
            }

            for entry in unknown {
                let platform = entry
                    .annotations
                    .get(REFERENCE_DIGEST_ANNOTATION)
                    .and_then(|reference| known.iter().find(|base| &base.digest == reference))
                    .map(|base| base.platform.clone())
                    .unwrap_or_else(|| entry.platform.clone());
                layers.push(ImageLayer {
                    image: image.clone(),
                    digest: entry.digest.clone(),
                    platform,
                    unknown: true,
                });
            }
        }
        layers
    }
}

/// Release notes of a release run
#[derive(Debug, Clone)]
pub struct ReleaseNotes {
    pub repository: String,
    pub repository_url: String,
    pub name: String,
    pub profile: String,
    pub version: String,
    pub sha: String,
    pub settings_file: String,
    pub tag: Option<String>,

    pub version_id: String,
    pub release_log_url: String,

    pub prerelease_image: String,
    pub generated_images: Vec<String>,
    pub missing_images: Vec<String>,
    pub deb_packages: Vec<PathBuf>,

    /// Expected package patterns that matched no package
    pub missing_deb_packages: Vec<String>,

    pub layers: Vec<ImageLayer>,
}

fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    serde_json::from_str(&read_to_string(path)?)
        .map_err(|e| Error::MalformedConfig(format!("{}: {}", path.display(), e)))
}

impl ReleaseNotes {
    pub fn collect(ctx: &WorkflowContext<'_>) -> Result<Self> {
        let cfg = ctx.cfg();
        let github = ctx.github();

        let workspace = match github.find("workspace")?.and_then(|n| n.as_str()) {
            Some(workspace) => PathBuf::from(workspace),
            None => ctx.run.clone_dir.clone(),
        };
        let artifacts_dir = PathBuf::from(cfg.str_at("build.artifacts_dir")?);

        let tracker_commit = read_to_string(&artifacts_dir.join(TRACKER_COMMIT_FILE))?;
        let tracker_commit = tracker_commit.trim();
        let tracker: TrackerSummary = read_json(&artifacts_dir.join(TRACKER_SUMMARY_FILE))?;
        let manifests_path = tracker.manifests_path();
        let manifests: DockerManifests = read_json(&workspace.join(&manifests_path))?;

        let profile = cfg.str_at("build.profile")?;
        let release_log_url = format!(
            "{}/blob/{}/{}/{}",
            cfg.str_at("release.tracker.url")?,
            tracker_commit,
            profile,
            manifests_path
        );

        let generated: BTreeSet<&str> = manifests.images.keys().map(String::as_str).collect();
        let expected = cfg.strings_at("release.final_images")?;
        let missing_images: BTreeSet<String> = expected
            .into_iter()
            .filter(|image| !generated.contains(image.as_str()))
            .collect();

        let name = cfg.str_at("build.repository.name")?;
        let packages = deb_packages(&artifacts_dir)?;
        let architectures = match cfg.find("debian.builder.architectures")? {
            Some(_) => cfg.strings_at("debian.builder.architectures")?,
            None => Vec::new(),
        };
        let missing_deb_packages = missing_packages(name, &architectures, &packages)?;

        tracing::info!(
            version_id = %tracker.version_id(),
            images = generated.len(),
            missing_images = missing_images.len(),
            packages = packages.len(),
            missing_packages = missing_deb_packages.len(),
            "collected release artifacts"
        );

        Ok(Self {
            repository: github.str_at("repository")?.to_string(),
            repository_url: cfg.str_at("build.repository.url")?.to_string(),
            name: name.to_string(),
            profile: profile.to_string(),
            version: cfg.str_at("build.version")?.to_string(),
            sha: github.str_at("sha")?.to_string(),
            settings_file: cfg.str_at("build.settings_file")?.to_string(),
            tag: run_tag(ctx)?,
            version_id: tracker.version_id(),
            release_log_url,
            prerelease_image: cfg.str_at("release.prerelease_image")?.to_string(),
            generated_images: generated.iter().map(|s| s.to_string()).collect(),
            missing_images: missing_images.into_iter().collect(),
            deb_packages: packages,
            missing_deb_packages,
            layers: manifests.layers(),
        })
    }

    fn links(&self) -> RepoLinks<'_> {
        RepoLinks {
            repository: &self.repository,
            url: &self.repository_url,
            tag: self.tag.as_deref(),
        }
    }

    fn has_missing(&self) -> bool {
        !self.missing_images.is_empty() || !self.missing_deb_packages.is_empty()
    }
}

/// Patterns `<name>_*_<arch>.deb` that match none of `packages`
fn missing_packages(
    name: &str,
    architectures: &[String],
    packages: &[PathBuf],
) -> Result<Vec<String>> {
    let mut missing = Vec::new();
    for arch in architectures {
        let pattern = format!("{}_*_{}.deb", name, arch);
        let matcher = deb_matcher(&format!(
            "{}_*_{}.deb",
            globset::escape(name),
            globset::escape(arch)
        ))?;
        let found = packages.iter().any(|pkg| {
            pkg.file_name()
                .is_some_and(|file| matcher.is_match(Path::new(file)))
        });
        if !found {
            missing.push(pattern);
        }
    }
    Ok(missing)
}

impl fmt::Display for ReleaseNotes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let links = self.links();

        writeln!(f, "# {} - {} release - {}", self.name, self.profile, self.version)?;
        writeln!(f)?;
        writeln!(f, "## Configuration")?;
        writeln!(f)?;
        writeln!(f, "| Property | Value |")?;
        writeln!(f, "|----------|-------|")?;
        writeln!(
            f,
            "| **CI Settings** | {} |",
            links.settings(&self.sha, &self.settings_file)
        )?;
        writeln!(f, "| **Source Commit** | {} |", links.commit(&self.sha))?;
        writeln!(
            f,
            "| **Release Log** | [{}]({}) |",
            self.version_id, self.release_log_url
        )?;
        writeln!(f)?;

        writeln!(f, "## Artifacts")?;
        writeln!(f)?;
        writeln!(f, "| Type | Artifacts |")?;
        writeln!(f, "|------|-----------|")?;
        writeln!(f, "| **Pre-release Image** | {} |", links.image(&self.prerelease_image))?;
        writeln!(
            f,
            "| **Release Images** | {} |",
            html_list(self.generated_images.iter().map(|img| links.image(img)))
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
        writeln!(f)?;

        if self.has_missing() {
            writeln!(f, "## Missing Artifacts")?;
            writeln!(f)?;
            writeln!(f, "| Type | Artifacts |")?;
            writeln!(f, "|------|-----------|")?;
            writeln!(
                f,
                "| **Release Images** | {} |",
                html_list(self.missing_images.iter().map(|img| links.image(img)))
            )?;
            writeln!(
                f,
                "| **Debian Packages** | {} |",
                html_list(self.missing_deb_packages.iter().map(|p| format!("`{}`", p)))
            )?;
            writeln!(f)?;
        }

        writeln!(f, "## Docker Image Manifests")?;
        writeln!(f)?;
        writeln!(f, "| **Image** | **Manifest** | **Platform** |")?;
        writeln!(f, "|-----------|--------------|--------------|")?;
        for layer in &self.layers {
            writeln!(
                f,
                "| `{}` | `{}` | `{}`/`{}`{} |",
                layer.image,
                layer.digest,
                layer.platform.os,
                layer.platform.architecture,
                if layer.unknown { " (unknown)" } else { "" }
            )?;
        }
        Ok(())
    }
}
