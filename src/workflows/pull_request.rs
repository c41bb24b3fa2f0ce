//! Pull request validation triggers
//!
//! - draft pull requests trigger nothing
//! - an approving review triggers the full validation
//! - any other `pull_request` event triggers the basic validation; on
//!   `ready_for_review` the full validation also runs if the pull request
//!   was already approved
//! - Debian validation runs with the full validation, when the checkout
//!   has Debian packaging

use gha_output::Outputs;
use gha_tree::ConfigNode;

use super::WorkflowContext;
use crate::error::Result;

/// The parts of a pull request event that decide which validations run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestEvent {
    pub number: i64,
    pub draft: bool,
    pub event_name: String,
    pub action: Option<String>,

    /// State of the submitted review (`pull_request_review` events only)
    pub review_state: Option<String>,
}

impl PullRequestEvent {
    pub fn from_github(github: &ConfigNode) -> Result<Self> {
        let event_name = github.str_at("event_name")?.to_string();
        let draft = match github.find("event.pull_request.draft")? {
            Some(node) => node.as_leaf().and_then(|v| v.as_bool()).unwrap_or(false),
            None => false,
        };
        let action = match github.find("event.action")? {
            Some(node) => node.as_str().map(str::to_string),
            None => None,
        };
        let review_state = if event_name == "pull_request_review" {
            github.find("event.review.state")?.and_then(|n| n.as_str()).map(str::to_string)
        } else {
            None
        };

        Ok(Self {
            number: github.i64_at("event.pull_request.number")?,
            draft,
            event_name,
            action,
            review_state,
        })
    }
}

/// Validations to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Triggers {
    pub basic: bool,
    pub full: bool,
    pub deb: bool,
}

fn is_approved(state: &str) -> bool {
    state.eq_ignore_ascii_case("approved")
}

/// Decide the validations for an event.
///
/// `review_decision` is only called for `ready_for_review` events.
pub fn triggers<F>(
    event: &PullRequestEvent,
    has_debian_packaging: bool,
    review_decision: F,
) -> Result<Triggers>
where
    F: FnOnce() -> Result<String>,
{
    let pr = event.number;
    let mut triggers = Triggers::default();

    if event.draft {
        tracing::info!("PR #{} is still in draft, no validation required yet", pr);
    } else if event.event_name == "pull_request_review"
        && event.review_state.as_deref().is_some_and(is_approved)
    {
        tracing::info!("PR #{} reviewed and approved", pr);
        triggers.full = true;
    } else if event.event_name == "pull_request" {
        tracing::info!("PR #{} updated ({})", pr, event.action.as_deref().unwrap_or(""));
        triggers.basic = true;
        if event.action.as_deref() == Some("ready_for_review") {
            let decision = review_decision()?;
            tracing::info!("PR #{} detected review state: '{}'", pr, decision);
            triggers.full = is_approved(&decision);
        }
    }

    triggers.deb = triggers.full && has_debian_packaging;

    tracing::info!(
        draft = event.draft,
        event = %event.event_name,
        action = event.action.as_deref().unwrap_or(""),
        review = event.review_state.as_deref().unwrap_or(""),
        basic = triggers.basic,
        full = triggers.full,
        deb = triggers.deb,
        "PR #{} job configuration",
        pr
    );

    Ok(triggers)
}

pub(super) fn configure(ctx: &WorkflowContext<'_>) -> Result<Outputs> {
    let cfg = ctx.cfg();
    let github = ctx.github();
    let event = PullRequestEvent::from_github(github)?;

    let triggers = triggers(&event, ctx.run.has_debian_packaging(), || {
        ctx.scm
            .review_decision(github.str_at("repository")?, event.number)
    })?;

    let matrix = |path: &str| -> Result<String> {
        Ok(cfg
            .value_at(&format!("pull_request.validation.{}", path))?
            .to_string())
    };

    Ok(Outputs::new()
        .with("BASIC_VALIDATION_BASE_IMAGES", matrix("basic.base_images")?)
        .with("BASIC_VALIDATION_BUILD_PLATFORMS", matrix("basic.build_platforms")?)
        .with("DEB_VALIDATION_BASE_IMAGES", matrix("deb.base_images")?)
        .with(
            "DEB_VALIDATION_BUILD_ARCHITECTURES",
            matrix("deb.build_architectures")?,
        )
        .with("FULL_VALIDATION_BASE_IMAGES", matrix("full.base_images")?)
        .with("FULL_VALIDATION_BUILD_PLATFORMS", matrix("full.build_platforms")?)
        .with("VALIDATE_FULL", triggers.full)
        .with("VALIDATE_DEB", triggers.deb)
        .with("VALIDATE_BASIC", triggers.basic))
}
