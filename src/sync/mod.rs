//! Release synchronization.
//!
//! A run moves through these steps:
//!
//! 1. Locate the source release (by tag or latest). Missing is fatal.
//! 2. Pick the destination tag, defaulting to the source release's tag.
//! 3. Locate the destination release and create it from the source's
//!    metadata when absent.
//! 4. Transfer every uploaded source asset onto the destination release.

mod creator;
mod error;
mod locator;
mod transfer;

use log::info;

use crate::config::Config;
use crate::github::{ReleaseClient, ReleaseTag};

pub use creator::{ReleaseTemplate, create_release};
pub use error::{AssetTransferError, SyncError, TransferStage};
pub use locator::locate_release;
pub use transfer::{Endpoint, FailurePolicy, TransferReport, transfer_assets};

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub source_tag: String,
    pub destination_tag: String,
    /// Whether the destination release was created by this run.
    pub created: bool,
    /// Web page of the destination release, when the API reports one.
    pub html_url: Option<String>,
    pub report: TransferReport,
}

/// Mirrors one release from a source repository onto a destination repository.
pub struct ReleaseSync<S: ReleaseClient, D: ReleaseClient> {
    source: S,
    destination: D,
    config: Config,
    policy: FailurePolicy,
}

impl<S: ReleaseClient, D: ReleaseClient> ReleaseSync<S, D> {
    pub fn new(source: S, destination: D, config: Config) -> Self {
        Self::with_policy(source, destination, config, FailurePolicy::default())
    }

    pub fn with_policy(source: S, destination: D, config: Config, policy: FailurePolicy) -> Self {
        Self {
            source,
            destination,
            config,
            policy,
        }
    }

    #[tracing::instrument(skip(self), fields(source = %self.config.source_repo, destination = %self.config.dest_repo))]
    pub async fn run(&self) -> Result<SyncSummary, SyncError> {
        let config = &self.config;

        let source_release =
            locate_release(&self.source, &config.source_repo, &config.source_tag)
                .await?
                .ok_or_else(|| SyncError::SourceReleaseMissing {
                    repo: config.source_repo.clone(),
                    tag: config.source_tag.clone(),
                })?;

        let destination_tag = match &config.destination_tag {
            Some(tag) => tag.clone(),
            None => {
                info!(
                    "Destination tag not set, using source release tag {}",
                    source_release.tag_name
                );
                source_release.tag_name.clone()
            }
        };

        // An explicit destination tag is always a concrete tag name, even "latest"
        let lookup = ReleaseTag::Named(destination_tag.clone());
        let (destination_release, created) =
            match locate_release(&self.destination, &config.dest_repo, &lookup).await? {
                Some(release) => (release, false),
                None => {
                    let release = create_release(
                        &self.destination,
                        &config.dest_repo,
                        &destination_tag,
                        ReleaseTemplate::from(&source_release),
                    )
                    .await?;
                    (release, true)
                }
            };

        let report = transfer_assets(
            Endpoint {
                client: &self.source,
                repo: &config.source_repo,
                release: &source_release,
            },
            Endpoint {
                client: &self.destination,
                repo: &config.dest_repo,
                release: &destination_release,
            },
            self.policy,
        )
        .await?;

        info!(
            "Synced release {} of {} to {} of {}: {} transferred, {} skipped",
            source_release.tag_name,
            config.source_repo,
            destination_release.tag_name,
            config.dest_repo,
            report.transferred.len(),
            report.skipped.len()
        );
        if let Some(url) = &destination_release.html_url {
            info!("Destination release: {}", url);
        }

        Ok(SyncSummary {
            source_tag: source_release.tag_name,
            destination_tag: destination_release.tag_name,
            created,
            html_url: destination_release.html_url,
            report,
        })
    }
}
