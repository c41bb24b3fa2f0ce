//! Markdown fragments shared by the release reports

use globset::Glob;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Repository coordinates used to build links
#[derive(Debug, Clone)]
pub(super) struct RepoLinks<'a> {
    /// `<owner>/<name>`
    pub repository: &'a str,

    /// `https://github.com/<owner>/<name>`
    pub url: &'a str,

    /// Tag name, when the run was triggered by a tag
    pub tag: Option<&'a str>,
}

impl RepoLinks<'_> {
    /// Link an image to its registry page
    pub fn image(&self, image: &str) -> String {
        let image_repo = image.split(':').next().unwrap_or(image);
        let repo_name = image_repo.rsplit('/').next().unwrap_or(image_repo);
        let url = if image.starts_with("ghcr.io/") {
            format!("{}/pkgs/container/{}", self.url, repo_name)
        } else if image.starts_with(self.repository) {
            format!("https://hub.docker.com/r/{}", image_repo)
        } else {
            format!("https://{}", image_repo)
        };
        format!("[`{}`]({})", image, url)
    }

    /// Link a package to its release download, for tagged runs
    pub fn deb_package(&self, package: &Path) -> String {
        let name = package
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match self.tag {
            Some(tag) => format!(
                "[`{}`]({}/releases/download/{}/{})",
                name, self.url, tag, name
            ),
            None => format!("`{}`", name),
        }
    }

    pub fn commit(&self, sha: &str) -> String {
        format!("[`{}`]({}/tree/{})", sha, self.url, sha)
    }

    pub fn settings(&self, sha: &str, settings_file: &str) -> String {
        let name = settings_file.rsplit('/').next().unwrap_or(settings_file);
        format!("[{}]({}/blob/{}/{})", name, self.url, sha, settings_file)
    }
}

/// HTML list, as used inside table cells
pub(super) fn html_list<I>(items: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let items: String = items
        .into_iter()
        .map(|item| format!("<li>{}</li>", item))
        .collect();
    format!("<ul>{}</ul>", items)
}

/// Debian packages in a directory, sorted by name
pub(super) fn deb_packages(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let matcher = deb_matcher("*.deb")?;
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    let mut packages = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        let matched = path
            .file_name()
            .is_some_and(|name| matcher.is_match(Path::new(name)));
        if matched && path.is_file() {
            packages.push(path);
        }
    }
    packages.sort();
    Ok(packages)
}

/// Compile a file name pattern
pub(super) fn deb_matcher(pattern: &str) -> Result<globset::GlobMatcher> {
    Glob::new(pattern)
        .map(|glob| glob.compile_matcher())
        .map_err(|e| {
            Error::MalformedConfig(format!("invalid package pattern {:?}: {}", pattern, e))
        })
}
