//! Summarize step tests
//!
//! Render the release reports from a checkout with release artifacts and
//! check what is appended to the step summary.

use std::fs;
use std::path::Path;

use chrono::{TimeZone, Utc};
use gha_settings::commands;
use gha_settings::{Error, RunContext, StaticScm, Workflow};
use serde_json::json;
use tempfile::TempDir;

const SETTINGS: &str = include_str!("fixtures/settings.yml");

const VERSION_ID: &str = "2024-05-01T12:00:00Z__1.0.0";

fn checkout() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join(".github")).unwrap();
    fs::write(dir.path().join(".github/settings.yml"), SETTINGS).unwrap();
    fs::create_dir_all(dir.path().join("artifacts")).unwrap();
    dir
}

fn run_context(dir: &Path) -> RunContext {
    RunContext::new(dir)
        .with_started_at(Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap())
        .with_summary_path(Some(dir.join("step_summary.md")))
}

fn tag_push(dir: &Path) -> String {
    json!({
        "repository": "acme/widget",
        "ref_type": "tag",
        "ref_name": "1.0.0",
        "sha": "abc123",
        "event_name": "push",
        "workspace": dir.to_string_lossy()
    })
    .to_string()
}

/// Write the files the release tracker leaves behind
fn write_tracker_artifacts(dir: &Path, images: serde_json::Value) {
    let artifacts = dir.join("artifacts");
    fs::write(artifacts.join("release-tracker.commit"), "deadbeef\n").unwrap();
    fs::write(
        artifacts.join("release-tracker-summary.json"),
        json!({
            "storage": "releases",
            "track": "widget",
            "entry": {"created_at": "2024-05-01T12:00:00Z", "version": "1.0.0"}
        })
        .to_string(),
    )
    .unwrap();

    let manifests_dir = dir.join("releases/widget").join(VERSION_ID);
    fs::create_dir_all(&manifests_dir).unwrap();
    fs::write(
        manifests_dir.join("docker-manifests.json"),
        json!({ "images": images }).to_string(),
    )
    .unwrap();
}

fn image_manifest() -> serde_json::Value {
    json!({
        "manifests": [
            {"digest": "sha256:aaa", "platform": {"os": "linux", "architecture": "amd64"}},
            {
                "digest": "sha256:bbb",
                "platform": {"os": "unknown", "architecture": "unknown"},
                "annotations": {"vnd.docker.reference.digest": "sha256:aaa"}
            }
        ]
    })
}

// =============================================================================
// Release summary
// =============================================================================

#[test]
fn test_release_summary() {
    let dir = checkout();
    fs::write(dir.path().join("artifacts/widget_1.0.0_amd64.deb"), b"").unwrap();
    let run = run_context(dir.path());

    let summary = commands::summarize(
        &run,
        &StaticScm::new("1234567"),
        Workflow::Release,
        &tag_push(dir.path()),
        None,
    )
    .unwrap();

    assert!(summary.starts_with("# widget - stable release - 1.0.0\n"));
    assert!(summary.contains(
        "| **Pre-release Image** | [`ghcr.io/acme/widget-prerelease-stable:latest`](https://github.com/acme/widget/pkgs/container/widget-prerelease-stable) |"
    ));
    assert!(summary.contains(
        "<li>[`acme/widget:latest`](https://hub.docker.com/r/acme/widget)</li>"
    ));
    assert!(summary.contains(
        "[`widget_1.0.0_amd64.deb`](https://github.com/acme/widget/releases/download/1.0.0/widget_1.0.0_amd64.deb)"
    ));

    // Appended with a trailing newline
    let written = fs::read_to_string(dir.path().join("step_summary.md")).unwrap();
    assert_eq!(written, format!("{}\n", summary));
}

#[test]
fn test_summary_appends() {
    let dir = checkout();
    let run = run_context(dir.path());
    fs::write(dir.path().join("step_summary.md"), "previous step\n").unwrap();

    commands::summarize(
        &run,
        &StaticScm::new("1234567"),
        Workflow::Release,
        &tag_push(dir.path()),
        None,
    )
    .unwrap();

    let written = fs::read_to_string(dir.path().join("step_summary.md")).unwrap();
    assert!(written.starts_with("previous step\n# widget - stable release"));
}

#[test]
fn test_summary_requires_channel() {
    let dir = checkout();
    let run = RunContext::new(dir.path());

    let err = commands::summarize(
        &run,
        &StaticScm::new("1234567"),
        Workflow::Release,
        &tag_push(dir.path()),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, Error::MissingEnv("GITHUB_STEP_SUMMARY")));
}

#[test]
fn test_ci_build_has_no_summary() {
    let dir = checkout();
    let run = run_context(dir.path());

    let err = commands::summarize(
        &run,
        &StaticScm::new("1234567"),
        Workflow::CiBuild,
        &tag_push(dir.path()),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperation { .. }));
}

// =============================================================================
// Release notes
// =============================================================================

#[test]
fn test_release_notes_complete_release() {
    let dir = checkout();
    write_tracker_artifacts(
        dir.path(),
        json!({
            "acme/widget:latest": image_manifest(),
            "ghcr.io/acme/widget:latest": image_manifest()
        }),
    );
    fs::write(dir.path().join("artifacts/widget_1.0.0_amd64.deb"), b"").unwrap();
    fs::write(dir.path().join("artifacts/widget_1.0.0_arm64.deb"), b"").unwrap();
    let run = run_context(dir.path());

    let notes = commands::summarize(
        &run,
        &StaticScm::new("1234567"),
        Workflow::ReleaseNotes,
        &tag_push(dir.path()),
        None,
    )
    .unwrap();

    assert!(notes.contains(&format!(
        "| **Release Log** | [{}](https://github.com/acme/release-tracker/blob/deadbeef/stable/releases/widget/{}/docker-manifests.json) |",
        VERSION_ID, VERSION_ID
    )));
    assert!(!notes.contains("## Missing Artifacts"));
    assert!(notes.contains("| `ghcr.io/acme/widget:latest` | `sha256:aaa` | `linux`/`amd64` |"));
    assert!(notes.contains(
        "| `ghcr.io/acme/widget:latest` | `sha256:bbb` | `linux`/`amd64` (unknown) |"
    ));
}

#[test]
fn test_release_notes_missing_artifacts() {
    let dir = checkout();
    write_tracker_artifacts(
        dir.path(),
        json!({ "ghcr.io/acme/widget:latest": image_manifest() }),
    );
    fs::write(dir.path().join("artifacts/widget_1.0.0_amd64.deb"), b"").unwrap();
    let run = run_context(dir.path());

    let notes = commands::summarize(
        &run,
        &StaticScm::new("1234567"),
        Workflow::ReleaseNotes,
        &tag_push(dir.path()),
        None,
    )
    .unwrap();

    assert!(notes.contains("## Missing Artifacts"));
    assert!(notes.contains(
        "| **Release Images** | <ul><li>[`acme/widget:latest`](https://hub.docker.com/r/acme/widget)</li></ul> |"
    ));
    assert!(notes.contains("| **Debian Packages** | <ul><li>`widget_*_arm64.deb`</li></ul> |"));
}

#[test]
fn test_release_notes_without_tracker() {
    let dir = checkout();
    let run = run_context(dir.path());

    let err = commands::summarize(
        &run,
        &StaticScm::new("1234567"),
        Workflow::ReleaseNotes,
        &tag_push(dir.path()),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}
