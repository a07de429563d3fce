//! Asset transfer between two releases.
//!
//! Every asset of the source release gets its own transfer future and all of
//! them run concurrently on the current task. Each transfer downloads the whole
//! asset into memory from the source and uploads it to the destination release.
//! There is no resume and no deduplication against assets already present on
//! the destination: a duplicate name fails for that asset only.

use anyhow::anyhow;
use futures_util::StreamExt;
use futures_util::future::join_all;
use futures_util::stream::FuturesUnordered;
use log::{info, warn};

use crate::github::{AssetState, AssetUpload, Release, ReleaseAsset, ReleaseClient, RepoId};

use super::error::{AssetTransferError, SyncError, TransferStage};

/// What to do with sibling transfers once one asset fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Let every transfer finish, then report all failures together.
    #[default]
    CollectAll,
    /// Report the first failure and cancel the transfers still in flight.
    FailFast,
}

/// One side of a transfer: a client and the release it acts on.
#[derive(Clone, Copy)]
pub struct Endpoint<'a> {
    pub client: &'a dyn ReleaseClient,
    pub repo: &'a RepoId,
    pub release: &'a Release,
}

/// Names of the assets handled by a successful transfer run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferReport {
    pub transferred: Vec<String>,
    pub skipped: Vec<String>,
}

impl TransferReport {
    fn record(&mut self, outcome: AssetOutcome) {
        match outcome {
            AssetOutcome::Transferred(name) => self.transferred.push(name),
            AssetOutcome::Skipped(name) => self.skipped.push(name),
        }
    }
}

#[derive(Debug)]
enum AssetOutcome {
    Transferred(String),
    Skipped(String),
}

/// Copies every uploaded asset of `source.release` onto `destination.release`.
#[tracing::instrument(skip_all, fields(source = %source.repo, destination = %destination.repo))]
pub async fn transfer_assets(
    source: Endpoint<'_>,
    destination: Endpoint<'_>,
    policy: FailurePolicy,
) -> Result<TransferReport, SyncError> {
    info!(
        "Syncing release {} to {} on {}",
        source.release.tag_name, destination.release.tag_name, destination.repo
    );

    let transfers = source
        .release
        .assets
        .iter()
        .map(|asset| transfer_asset(source, destination, asset));

    let mut report = TransferReport::default();

    match policy {
        FailurePolicy::CollectAll => {
            let mut failures = Vec::new();
            for outcome in join_all(transfers).await {
                match outcome {
                    Ok(outcome) => report.record(outcome),
                    Err(e) => {
                        warn!("{}", e.detail());
                        failures.push(e);
                    }
                }
            }
            if !failures.is_empty() {
                return Err(SyncError::AssetTransfers(failures));
            }
        }
        FailurePolicy::FailFast => {
            let mut pending: FuturesUnordered<_> = transfers.collect();
            while let Some(outcome) = pending.next().await {
                match outcome {
                    Ok(outcome) => report.record(outcome),
                    Err(e) => {
                        warn!(
                            "{}; cancelling {} remaining transfer(s)",
                            e.detail(),
                            pending.len()
                        );
                        return Err(SyncError::AssetTransfers(vec![e]));
                    }
                }
            }
        }
    }

    Ok(report)
}

async fn transfer_asset(
    source: Endpoint<'_>,
    destination: Endpoint<'_>,
    asset: &ReleaseAsset,
) -> Result<AssetOutcome, AssetTransferError> {
    info!(
        "Syncing asset {} to {} on {}",
        asset.name, destination.release.tag_name, destination.repo
    );

    if asset.state != AssetState::Uploaded {
        warn!("Asset {} is {}, not uploaded, skipping", asset.name, asset.state);
        return Ok(AssetOutcome::Skipped(asset.name.clone()));
    }

    let failed = |stage: TransferStage, source: anyhow::Error| AssetTransferError {
        asset: asset.name.clone(),
        url: asset.browser_download_url.clone(),
        stage,
        source,
    };

    info!(
        "Downloading asset {} from {}",
        asset.name, asset.browser_download_url
    );
    let data = source
        .client
        .download_asset(source.repo, asset)
        .await
        .map_err(|e| failed(TransferStage::Download, e))?;

    if data.len() as u64 != asset.size {
        return Err(failed(
            TransferStage::Download,
            anyhow!("expected {} bytes, received {}", asset.size, data.len()),
        ));
    }

    info!(
        "Uploading asset {} to {} on {}",
        asset.name, destination.release.tag_name, destination.repo
    );
    let upload = AssetUpload {
        name: asset.name.clone(),
        label: asset.label.clone(),
        content_type: asset.content_type_or_default().to_string(),
        data,
    };
    destination
        .client
        .upload_asset(destination.repo, destination.release, upload)
        .await
        .map_err(|e| failed(TransferStage::Upload, e))?;

    Ok(AssetOutcome::Transferred(asset.name.clone()))
}
