use std::fmt;

use thiserror::Error;

use crate::github::{ReleaseTag, RepoId};

/// Which half of an asset transfer failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStage {
    Download,
    Upload,
}

impl fmt::Display for TransferStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferStage::Download => write!(f, "download"),
            TransferStage::Upload => write!(f, "upload"),
        }
    }
}

/// Failure of a single asset; siblings are unaffected.
#[derive(Debug, Error)]
#[error("Failed to {stage} asset {asset} ({url})")]
pub struct AssetTransferError {
    pub asset: String,
    pub url: String,
    pub stage: TransferStage,
    #[source]
    pub source: anyhow::Error,
}

impl AssetTransferError {
    /// Message including the whole cause chain.
    pub fn detail(&self) -> String {
        format!("{}: {:#}", self, self.source)
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Source release {tag} on {repo} does not exist")]
    SourceReleaseMissing { repo: RepoId, tag: ReleaseTag },

    #[error("Failed to get release {tag} on {repo}")]
    Remote {
        repo: RepoId,
        tag: ReleaseTag,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to create release {tag} on {repo}")]
    CreateRelease {
        repo: RepoId,
        tag: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{} asset transfer(s) failed:\n{}", .0.len(), format_failures(.0))]
    AssetTransfers(Vec<AssetTransferError>),
}

fn format_failures(failures: &[AssetTransferError]) -> String {
    failures
        .iter()
        .map(|f| format!("  - {}", f.detail()))
        .collect::<Vec<_>>()
        .join("\n")
}
