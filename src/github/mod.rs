//! GitHub release API: repository identities, release types and the client.

mod client;
mod repo;
mod types;

#[cfg(test)]
pub use client::MockReleaseClient;
pub use client::{
    DEFAULT_API_URL, DEFAULT_UPLOAD_URL, GitHub, ReleaseClient, default_upload_url,
};
pub use repo::{ReleaseTag, RepoId};
pub use types::{
    AssetState, AssetUpload, DEFAULT_CONTENT_TYPE, NewRelease, Release, ReleaseAsset,
};
