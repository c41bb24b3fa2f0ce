//! Settings derived from the settings file and the workflow run
//!
//! The git ref selects the build profile:
//! - tags build the `stable` profile, versioned by the tag name
//! - anything else builds `nightly`, versioned `<ref>@<short sha>`
//!
//! Each derived section is merged over the matching section of the
//! settings file, so computed values win and file values fill the gaps.

use gha_tree::{merge, to_mapping, ConfigNode, Mapping};
use serde_json::{json, Value};
use std::collections::BTreeSet;

use super::registry::{extract_registries, login_flags};
use crate::context::RunContext;
use crate::error::{Error, Result};
use crate::scm::Scm;

/// Release channel selected by the git ref
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildProfile {
    Stable,
    Nightly,
}

impl BuildProfile {
    pub fn from_ref_type(ref_type: &str) -> Self {
        if ref_type == "tag" {
            BuildProfile::Stable
        } else {
            BuildProfile::Nightly
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildProfile::Stable => "stable",
            BuildProfile::Nightly => "nightly",
        }
    }
}

impl std::fmt::Display for BuildProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split `owner/name`
pub fn split_repository(repository: &str) -> Result<(&str, &str)> {
    repository
        .split_once('/')
        .filter(|(owner, name)| !owner.is_empty() && !name.is_empty())
        .ok_or_else(|| {
            Error::MalformedConfig(format!(
                "github.repository must be <owner>/<name>, found {:?}",
                repository
            ))
        })
}

/// JSON encoding of the runner configured for a platform
/// (`ci.runners.<platform>`, with `/` in the platform normalized)
pub fn runner_json(cfg: &ConfigNode, platform: &str) -> Result<String> {
    let runners = cfg.node_at("ci.runners")?;
    let runner = runners
        .get(platform)
        .ok_or_else(|| gha_tree::TreeError::PathNotFound {
            path: format!("ci.runners.{}", platform),
            segment: platform.to_string(),
        })?;
    Ok(runner.to_value().to_string())
}

/// Optional string field: missing and null both select `None`
fn optional_str<'a>(node: &'a ConfigNode, path: &str) -> Result<Option<&'a str>> {
    match node.find(path)? {
        None => Ok(None),
        Some(_) => Ok(node.opt_str_at(path)?),
    }
}

fn section(node: &ConfigNode, path: &str) -> Result<Mapping> {
    Ok(node.find(path)?.map(to_mapping).unwrap_or_default())
}

fn object(value: Value) -> Mapping {
    match value {
        Value::Object(map) => map,
        _ => Mapping::new(),
    }
}

/// Compute the derived `build`, `ci`, `debian` and `release` sections
pub fn derive_settings(
    run: &RunContext,
    scm: &dyn Scm,
    settings: &ConfigNode,
    github: &ConfigNode,
    settings_digest: &str,
) -> Result<Mapping> {
    let repository = github.str_at("repository")?;
    let (owner, repo) = split_repository(repository)?;
    let ref_type = github.str_at("ref_type")?;
    let ref_name = github.str_at("ref_name")?;

    let profile = BuildProfile::from_ref_type(ref_type);
    let version = match profile {
        BuildProfile::Stable => ref_name.to_string(),
        BuildProfile::Nightly => format!("{}@{}", ref_name, scm.sha_short()?),
    }
    .replace('/', "-");

    let derivation = Derivation {
        run,
        settings,
        repository,
        owner,
        repo,
        profile,
        version,
        date: run.build_date(),
    };

    tracing::info!(
        profile = %derivation.profile,
        version = %derivation.version,
        date = %derivation.date,
        "derived build settings"
    );

    let mut derived = Mapping::new();
    derived.insert("build".to_string(), derivation.build(settings_digest));
    derived.insert("ci".to_string(), derivation.ci()?);
    derived.insert("debian".to_string(), derivation.debian()?);
    derived.insert("release".to_string(), derivation.release()?);
    Ok(derived)
}

struct Derivation<'a> {
    run: &'a RunContext,
    settings: &'a ConfigNode,
    repository: &'a str,
    owner: &'a str,
    repo: &'a str,
    profile: BuildProfile,
    version: String,
    date: String,
}

impl Derivation<'_> {
    fn profile_settings(&self) -> Result<&ConfigNode> {
        Ok(self
            .settings
            .node_at(&format!("release.profiles.{}", self.profile))?)
    }

    fn build(&self, settings_digest: &str) -> Value {
        json!({
            "date": self.date,
            "profile": self.profile.as_str(),
            "repository": {
                "name": self.repo,
                "owner": self.owner,
                "url": format!("https://github.com/{}", self.repository),
            },
            "settings": {
                "artifact": format!("{}-settings__{}", self.repo, self.date),
                "digest": settings_digest,
            },
            "settings_file": self.run.settings_file_in_repo(),
            "version": self.version,
        })
    }

    /// Distinct base images across all release profiles
    fn release_base_images(&self) -> Result<Vec<String>> {
        let mut images = BTreeSet::new();
        for (_, profile) in self.settings.node_at("release.profiles")?.fields() {
            images.insert(profile.str_at("base_image")?.to_string());
        }
        Ok(images.into_iter().collect())
    }

    fn release(&self) -> Result<Value> {
        let settings = self.settings;
        let profile_cfg = self.profile_settings()?;

        let tag_suffix = optional_str(profile_cfg, "tag_suffix")?;
        let release_tag = format!("{}{}", profile_cfg.str_at("tag")?, tag_suffix.unwrap_or(""));
        let base_image = profile_cfg.str_at("base_image")?;
        let build_platforms = profile_cfg.strings_at("build_platforms")?;

        let flavor_config = tag_suffix
            .map(|suffix| format!("suffix={},onlatest=true", suffix))
            .unwrap_or_default();

        let prerelease_repo = format!(
            "{}-{}",
            settings.str_at("release.prerelease_repo")?,
            self.profile
        );
        let prerelease_image = format!("{}:{}", prerelease_repo, release_tag);
        let (package_org, package) = match optional_str(settings, "release.prerelease_package")? {
            Some(package) if !package.is_empty() => {
                let package = format!("{}-{}", package, self.profile);
                match package.split_once('/') {
                    Some((org, name)) => (org.to_string(), name.to_string()),
                    None => (String::new(), package),
                }
            }
            _ => (String::new(), String::new()),
        };
        let prerelease_registries =
            extract_registries(self.owner, [base_image, prerelease_image.as_str()]);

        let final_repos = settings.strings_at("release.final_repos")?;
        let final_images: Vec<String> = final_repos
            .iter()
            .map(|repo| format!("{}:{}", repo, release_tag))
            .collect();
        let release_registries = extract_registries(
            self.owner,
            final_images
                .iter()
                .map(String::as_str)
                .chain([prerelease_image.as_str()]),
        );

        let test_runners = build_platforms
            .iter()
            .map(|platform| runner_json(settings, platform))
            .collect::<Result<Vec<String>>>()?;

        let test_id = format!("release-{}__{}", self.profile, self.version);
        let test_artifact = format!("{}-test-{}__{}", self.repo, test_id, self.date);

        let badge_filename = format!(
            "{}-badge-{}",
            self.repository.replace('/', "-"),
            self.profile
        );
        let mut badge_base_image = section(profile_cfg, "badge.base_image")?;
        badge_base_image.insert("message".to_string(), json!(base_image));
        badge_base_image.insert(
            "filename".to_string(),
            json!(format!("{}-base-image.json", badge_filename)),
        );
        let mut badge_version = section(profile_cfg, "badge.version")?;
        badge_version.insert("message".to_string(), json!(self.version));
        badge_version.insert(
            "filename".to_string(),
            json!(format!("{}-version.json", badge_filename)),
        );

        let computed = json!({
            "badge": {
                "base_image": badge_base_image,
                "version": badge_version,
            },
            "build_platforms_config": build_platforms.join(","),
            "final_images": final_images,
            "final_repos_config": final_repos.join("\n"),
            "flavor_config": flavor_config,
            "login": login_flags(&release_registries),
            "login_prerel": login_flags(&prerelease_registries),
            "prerelease_image": prerelease_image,
            "prerelease_package": package,
            "prerelease_package_org": package_org,
            "prerelease_repo": prerelease_repo,
            "tag": release_tag,
            "test_artifact": test_artifact,
            "test_id": test_id,
            "test_runners_matrix": json!(test_runners).to_string(),
        });

        Ok(Value::Object(merge(&object(computed), &to_mapping(profile_cfg))))
    }

    fn ci(&self) -> Result<Value> {
        let settings = self.settings;
        let mut images = Mapping::new();

        if let Some(admin) = settings.find("ci.images.admin")? {
            let image = admin.str_at("image")?;
            let repo = image.split(':').next().unwrap_or(image);
            let tag = image.rsplit(':').next().unwrap_or(image);
            let mut pulled = vec![image];
            if let Some(base_image) = optional_str(admin, "base_image")? {
                pulled.push(base_image);
            }
            let registries = extract_registries(self.owner, pulled);

            images.insert(
                "admin".to_string(),
                json!({
                    "build_platforms_config": admin.strings_at("build_platforms")?.join(","),
                    "login": login_flags(&registries),
                    "repo": repo,
                    "tag": tag,
                    "tags_config": tag,
                }),
            );
        }

        if let Some(tester) = settings.find("ci.images.tester")? {
            let base_images = self.release_base_images()?;
            let mut pulled: Vec<&str> = base_images.iter().map(String::as_str).collect();
            if let Some(repo) = optional_str(tester, "repo")? {
                pulled.push(repo);
            }
            let registries = extract_registries(self.owner, pulled);
            let build_platforms = self.profile_settings()?.strings_at("build_platforms")?;

            images.insert(
                "tester".to_string(),
                json!({
                    "base_images_matrix": json!(base_images).to_string(),
                    "build_platforms_config": build_platforms.join(","),
                    "login": login_flags(&registries),
                }),
            );
        }

        let computed = json!({ "images": images });
        Ok(Value::Object(merge(&object(computed), &section(settings, "ci")?)))
    }

    fn debian(&self) -> Result<Value> {
        let settings = self.settings;
        let mut computed = Mapping::new();
        computed.insert("enabled".to_string(), json!(self.run.has_debian_packaging()));

        if let Some(builder) = settings.find("debian.builder")? {
            let base_images = builder.strings_at("base_images")?;
            let architectures = builder.strings_at("architectures")?;
            let builder_repo = builder.str_at("repo")?;

            let registries = extract_registries(
                self.owner,
                std::iter::once(builder_repo).chain(base_images.iter().map(String::as_str)),
            );
            let build_platforms: Vec<String> = architectures
                .iter()
                .map(|arch| format!("linux/{}", arch))
                .collect();

            computed.insert(
                "builder".to_string(),
                json!({
                    "architectures_matrix": json!(architectures).to_string(),
                    "base_images_matrix": json!(base_images).to_string(),
                    "build_platforms_config": build_platforms.join(","),
                    "login": login_flags(&registries),
                }),
            );
        }

        Ok(Value::Object(merge(&computed, &section(settings, "debian")?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scm::StaticScm;
    use chrono::{TimeZone, Utc};
    use gha_tree::to_tree;

    fn tree(value: Value) -> ConfigNode {
        ConfigNode::from_value(&value).unwrap()
    }

    fn settings() -> ConfigNode {
        tree(json!({
            "ci": {
                "runners": {
                    "linux/amd64": "ubuntu-24.04",
                    "linux/arm64": ["self-hosted", "arm64"]
                },
                "images": {
                    "admin": {
                        "image": "ghcr.io/acme/ci-admin:latest",
                        "base_image": "ubuntu:24.04",
                        "build_platforms": ["linux/amd64"]
                    },
                    "tester": {"repo": "ghcr.io/acme/ci-tester"}
                }
            },
            "debian": {
                "builder": {
                    "repo": "ghcr.io/acme/deb-builder",
                    "base_images": ["debian:bookworm", "ubuntu:noble"],
                    "architectures": ["amd64", "arm64"]
                }
            },
            "release": {
                "prerelease_repo": "ghcr.io/acme/app-prerelease",
                "prerelease_package": "acme/app-prerelease",
                "final_repos": ["ghcr.io/acme/app", "acme/app"],
                "profiles": {
                    "stable": {
                        "tag": "latest",
                        "tag_suffix": null,
                        "base_image": "ubuntu:24.04",
                        "build_platforms": ["linux/amd64", "linux/arm64"],
                        "badge": {"version": {"color": "green"}}
                    },
                    "nightly": {
                        "tag": "nightly",
                        "tag_suffix": "-dev",
                        "base_image": "ubuntu:25.04",
                        "build_platforms": ["linux/amd64"],
                        "badge": {"version": {"color": "orange"}}
                    }
                }
            }
        }))
    }

    fn run() -> RunContext {
        RunContext::new("/nonexistent/checkout")
            .with_started_at(Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap())
    }

    fn derive(github: Value) -> ConfigNode {
        let mapping = derive_settings(
            &run(),
            &StaticScm::new("abc1234"),
            &settings(),
            &tree(github),
            "d1g3st",
        )
        .unwrap();
        to_tree(&mapping).unwrap()
    }

    #[test]
    fn test_split_repository() {
        assert_eq!(split_repository("acme/app").unwrap(), ("acme", "app"));
        assert!(split_repository("acme").is_err());
        assert!(split_repository("/app").is_err());
    }

    #[test]
    fn test_nightly_build_settings() {
        let cfg = derive(json!({
            "repository": "acme/app",
            "ref_type": "branch",
            "ref_name": "feature/login"
        }));

        assert_eq!(cfg.str_at("build.profile").unwrap(), "nightly");
        assert_eq!(cfg.str_at("build.version").unwrap(), "feature-login@abc1234");
        assert_eq!(cfg.str_at("build.date").unwrap(), "20240501-123000");
        assert_eq!(
            cfg.str_at("build.settings.artifact").unwrap(),
            "app-settings__20240501-123000"
        );
        assert_eq!(cfg.str_at("build.settings.digest").unwrap(), "d1g3st");
        assert_eq!(
            cfg.str_at("build.repository.url").unwrap(),
            "https://github.com/acme/app"
        );
    }

    #[test]
    fn test_stable_release_settings() {
        let cfg = derive(json!({
            "repository": "acme/app",
            "ref_type": "tag",
            "ref_name": "1.2.0"
        }));

        assert_eq!(cfg.str_at("build.version").unwrap(), "1.2.0");
        assert_eq!(cfg.str_at("release.tag").unwrap(), "latest");
        assert_eq!(cfg.str_at("release.flavor_config").unwrap(), "");
        assert_eq!(
            cfg.str_at("release.prerelease_image").unwrap(),
            "ghcr.io/acme/app-prerelease-stable:latest"
        );
        assert_eq!(cfg.str_at("release.prerelease_package_org").unwrap(), "acme");
        assert_eq!(
            cfg.str_at("release.prerelease_package").unwrap(),
            "app-prerelease-stable"
        );
        assert_eq!(
            cfg.strings_at("release.final_images").unwrap(),
            vec!["ghcr.io/acme/app:latest", "acme/app:latest"]
        );
        assert_eq!(
            cfg.str_at("release.final_repos_config").unwrap(),
            "ghcr.io/acme/app\nacme/app"
        );
        assert!(cfg.bool_at("release.login.github").unwrap());
        assert!(cfg.bool_at("release.login.dockerhub").unwrap());
        assert!(cfg.bool_at("release.login_prerel.github").unwrap());
        assert!(!cfg.bool_at("release.login_prerel.dockerhub").unwrap());
        assert_eq!(
            cfg.str_at("release.build_platforms_config").unwrap(),
            "linux/amd64,linux/arm64"
        );
        assert_eq!(
            cfg.str_at("release.test_runners_matrix").unwrap(),
            r#"["\"ubuntu-24.04\"","[\"self-hosted\",\"arm64\"]"]"#
        );
        assert_eq!(cfg.str_at("release.test_id").unwrap(), "release-stable__1.2.0");
    }

    #[test]
    fn test_nightly_tag_suffix() {
        let cfg = derive(json!({
            "repository": "acme/app",
            "ref_type": "branch",
            "ref_name": "main"
        }));

        assert_eq!(cfg.str_at("release.tag").unwrap(), "nightly-dev");
        assert_eq!(
            cfg.str_at("release.flavor_config").unwrap(),
            "suffix=-dev,onlatest=true"
        );
        // Profile values fill the gaps
        assert_eq!(cfg.str_at("release.base_image").unwrap(), "ubuntu:25.04");
    }

    #[test]
    fn test_badges() {
        let cfg = derive(json!({
            "repository": "acme/app",
            "ref_type": "tag",
            "ref_name": "2.0"
        }));

        assert_eq!(cfg.str_at("release.badge.version.color").unwrap(), "green");
        assert_eq!(cfg.str_at("release.badge.version.message").unwrap(), "2.0");
        assert_eq!(
            cfg.str_at("release.badge.version.filename").unwrap(),
            "acme-app-badge-stable-version.json"
        );
        assert_eq!(
            cfg.str_at("release.badge.base_image.message").unwrap(),
            "ubuntu:24.04"
        );
    }

    #[test]
    fn test_ci_images() {
        let cfg = derive(json!({
            "repository": "acme/app",
            "ref_type": "tag",
            "ref_name": "2.0"
        }));

        assert_eq!(cfg.str_at("ci.images.admin.repo").unwrap(), "ghcr.io/acme/ci-admin");
        assert_eq!(cfg.str_at("ci.images.admin.tag").unwrap(), "latest");
        assert!(cfg.bool_at("ci.images.admin.login.github").unwrap());
        assert!(!cfg.bool_at("ci.images.admin.login.dockerhub").unwrap());
        assert_eq!(
            cfg.str_at("ci.images.tester.base_images_matrix").unwrap(),
            r#"["ubuntu:24.04","ubuntu:25.04"]"#
        );
        // File values pass through
        assert_eq!(cfg.str_at("ci.images.tester.repo").unwrap(), "ghcr.io/acme/ci-tester");
        assert_eq!(cfg.str_at("ci.runners.linux_amd64").unwrap(), "ubuntu-24.04");
    }

    #[test]
    fn test_debian_builder() {
        let cfg = derive(json!({
            "repository": "acme/app",
            "ref_type": "tag",
            "ref_name": "2.0"
        }));

        assert!(!cfg.bool_at("debian.enabled").unwrap());
        assert_eq!(
            cfg.str_at("debian.builder.build_platforms_config").unwrap(),
            "linux/amd64,linux/arm64"
        );
        assert_eq!(
            cfg.str_at("debian.builder.architectures_matrix").unwrap(),
            r#"["amd64","arm64"]"#
        );
        assert!(cfg.bool_at("debian.builder.login.github").unwrap());
    }

    #[test]
    fn test_missing_runner() {
        let err = runner_json(&settings(), "linux/riscv64").unwrap_err();
        assert!(err.to_string().contains("ci.runners.linux/riscv64"));
    }
}
