use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use reqwest::Url;

use crate::http::HttpClient;

use super::repo::RepoId;
use super::types::{AssetUpload, DEFAULT_CONTENT_TYPE, NewRelease, Release, ReleaseAsset};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_UPLOAD_URL: &str = "https://uploads.github.com";

/// Release operations against a remote repository host.
///
/// A missing release or asset surfaces as [`crate::http::NonRetryableError::NotFound`]
/// somewhere in the error chain; use [`crate::http::is_not_found`] to tell it apart
/// from other failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseClient: Send + Sync {
    async fn get_release_by_tag(&self, repo: &RepoId, tag: &str) -> Result<Release>;
    async fn get_latest_release(&self, repo: &RepoId) -> Result<Release>;
    async fn create_release(&self, repo: &RepoId, request: &NewRelease) -> Result<Release>;
    /// Downloads the binary content of an asset by its id.
    async fn download_asset(&self, repo: &RepoId, asset: &ReleaseAsset) -> Result<Bytes>;
    async fn upload_asset(
        &self,
        repo: &RepoId,
        release: &Release,
        upload: AssetUpload,
    ) -> Result<ReleaseAsset>;
}

pub struct GitHub {
    http: HttpClient,
    api_url: String,
    upload_url: String,
}

impl GitHub {
    #[tracing::instrument(skip(http))]
    pub fn new(http: HttpClient, api_url: Option<String>, upload_url: Option<String>) -> Self {
        let api_url = api_url
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let upload_url = upload_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| default_upload_url(&api_url));
        Self {
            http,
            api_url,
            upload_url,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    fn repo_endpoint(&self, base: &str, repo: &RepoId, rest: &[&str]) -> Result<Url> {
        let mut segments = vec!["repos", repo.owner.as_str(), repo.name.as_str()];
        segments.extend_from_slice(rest);
        endpoint(base, &segments)
    }
}

/// Derives the uploads host from an API base URL.
///
/// `https://api.github.com` uploads to `https://uploads.github.com`; GitHub
/// Enterprise (`https://host/api/v3`) uploads to `https://host/api/uploads`.
/// Any other base is assumed to serve uploads itself.
pub fn default_upload_url(api_url: &str) -> String {
    let api_url = api_url.trim_end_matches('/');
    if api_url == DEFAULT_API_URL {
        DEFAULT_UPLOAD_URL.to_string()
    } else if let Some(host) = api_url.strip_suffix("/api/v3") {
        format!("{}/api/uploads", host)
    } else {
        api_url.to_string()
    }
}

/// Appends percent-encoded path segments to a base URL.
fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base).with_context(|| format!("Invalid base URL '{}'", base))?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("Base URL '{}' cannot have a path", base))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[async_trait]
impl ReleaseClient for GitHub {
    #[tracing::instrument(skip(self))]
    async fn get_release_by_tag(&self, repo: &RepoId, tag: &str) -> Result<Release> {
        let url = self.repo_endpoint(&self.api_url, repo, &["releases", "tags", tag])?;
        debug!("Fetching release {} of {} from {}...", tag, repo, url);

        self.http
            .get_json(url.as_str())
            .await
            .with_context(|| format!("Failed to fetch release {} of {}", tag, repo))
    }

    #[tracing::instrument(skip(self))]
    async fn get_latest_release(&self, repo: &RepoId) -> Result<Release> {
        let url = self.repo_endpoint(&self.api_url, repo, &["releases", "latest"])?;
        debug!("Fetching latest release of {} from {}...", repo, url);

        self.http
            .get_json(url.as_str())
            .await
            .with_context(|| format!("Failed to fetch latest release of {}", repo))
    }

    #[tracing::instrument(skip(self))]
    async fn create_release(&self, repo: &RepoId, request: &NewRelease) -> Result<Release> {
        let url = self.repo_endpoint(&self.api_url, repo, &["releases"])?;
        debug!("Creating release {} at {}...", request.tag_name, url);

        self.http.post_json(url.as_str(), request).await
    }

    #[tracing::instrument(skip(self, asset), fields(asset = %asset.name))]
    async fn download_asset(&self, repo: &RepoId, asset: &ReleaseAsset) -> Result<Bytes> {
        let id = asset.id.to_string();
        let url = self.repo_endpoint(&self.api_url, repo, &["releases", "assets", &id])?;

        self.http.get_bytes(url.as_str(), DEFAULT_CONTENT_TYPE).await
    }

    #[tracing::instrument(skip(self, release, upload), fields(release = %release.tag_name, asset = %upload.name))]
    async fn upload_asset(
        &self,
        repo: &RepoId,
        release: &Release,
        upload: AssetUpload,
    ) -> Result<ReleaseAsset> {
        let id = release.id.to_string();
        let url = self.repo_endpoint(&self.upload_url, repo, &["releases", &id, "assets"])?;

        let mut query = vec![("name", upload.name.as_str())];
        if let Some(label) = upload.label.as_deref().filter(|l| !l.is_empty()) {
            query.push(("label", label));
        }

        self.http
            .post_bytes(url.as_str(), &query, &upload.content_type, upload.data)
            .await
    }
}
