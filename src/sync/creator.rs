use log::info;

use crate::github::{NewRelease, Release, ReleaseClient, RepoId};

use super::error::SyncError;

/// Descriptive metadata copied onto a newly created release.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReleaseTemplate {
    pub body: Option<String>,
    pub name: Option<String>,
    pub draft: bool,
    pub prerelease: bool,
}

impl From<&Release> for ReleaseTemplate {
    fn from(release: &Release) -> Self {
        Self {
            body: release.body.clone(),
            name: release.name.clone(),
            draft: release.draft,
            prerelease: release.prerelease,
        }
    }
}

impl ReleaseTemplate {
    fn into_request(self, tag: &str) -> NewRelease {
        NewRelease {
            tag_name: tag.to_string(),
            name: self.name,
            body: self.body,
            draft: self.draft,
            prerelease: self.prerelease,
        }
    }
}

/// Creates a release on `repo` at `tag`. Assets are not copied.
///
/// Only call this after the release was found to be absent; creating an
/// existing tag fails remotely.
#[tracing::instrument(skip(client, template))]
pub async fn create_release<C: ReleaseClient + ?Sized>(
    client: &C,
    repo: &RepoId,
    tag: &str,
    template: ReleaseTemplate,
) -> Result<Release, SyncError> {
    info!("Creating release {} on {}", tag, repo);

    let request = template.into_request(tag);
    let release = client
        .create_release(repo, &request)
        .await
        .map_err(|source| SyncError::CreateRelease {
            repo: repo.clone(),
            tag: tag.to_string(),
            source,
        })?;

    info!("Created release {} (id {}) on {}", release.tag_name, release.id, repo);
    Ok(release)
}
