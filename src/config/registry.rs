//! Container registry detection
//!
//! Images are attributed to a registry from their name:
//! - `ghcr.io/<org>/...` is the GitHub container registry
//! - `<org>/...` is Docker Hub
//! - anything else belongs to a registry that needs no login

use serde_json::{json, Value};
use std::collections::BTreeSet;

/// Registries the workflows can log into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Registry {
    GitHub,
    DockerHub,
}

/// Registry hosting `image`, when it belongs to `org`
pub fn registry_from_image(org: &str, image: &str) -> Option<Registry> {
    if image.starts_with(&format!("ghcr.io/{}/", org)) {
        Some(Registry::GitHub)
    } else if image.starts_with(&format!("{}/", org)) {
        Some(Registry::DockerHub)
    } else {
        None
    }
}

/// Registries needed to pull or push all of `images`
pub fn extract_registries<I, S>(org: &str, images: I) -> BTreeSet<Registry>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    images
        .into_iter()
        .filter_map(|image| registry_from_image(org, image.as_ref()))
        .collect()
}

/// Login flags record, as consumed by the workflows
pub fn login_flags(registries: &BTreeSet<Registry>) -> Value {
    json!({
        "dockerhub": registries.contains(&Registry::DockerHub),
        "github": registries.contains(&Registry::GitHub),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_from_image() {
        assert_eq!(
            registry_from_image("acme", "ghcr.io/acme/app:latest"),
            Some(Registry::GitHub)
        );
        assert_eq!(
            registry_from_image("acme", "acme/app:latest"),
            Some(Registry::DockerHub)
        );
        assert_eq!(registry_from_image("acme", "ubuntu:24.04"), None);
        assert_eq!(registry_from_image("acme", "ghcr.io/other/app"), None);
    }

    #[test]
    fn test_org_prefix_must_be_whole_segment() {
        assert_eq!(registry_from_image("acme", "acme-labs/app"), None);
    }

    #[test]
    fn test_extract_registries() {
        let registries = extract_registries(
            "acme",
            ["ghcr.io/acme/app:1", "acme/app:1", "debian:12", "acme/tool:2"],
        );
        assert_eq!(
            registries.into_iter().collect::<Vec<_>>(),
            vec![Registry::GitHub, Registry::DockerHub]
        );
    }

    #[test]
    fn test_login_flags() {
        let flags = login_flags(&extract_registries("acme", ["ghcr.io/acme/app"]));
        assert_eq!(flags, json!({"dockerhub": false, "github": true}));
    }
}
