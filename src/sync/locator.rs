use log::info;

use crate::github::{Release, ReleaseClient, ReleaseTag, RepoId};
use crate::http::is_not_found;

use super::error::SyncError;

/// Looks up a release by tag, or the latest release.
///
/// Returns `Ok(None)` when the release does not exist; every other failure
/// is a [`SyncError::Remote`].
#[tracing::instrument(skip(client))]
pub async fn locate_release<C: ReleaseClient + ?Sized>(
    client: &C,
    repo: &RepoId,
    tag: &ReleaseTag,
) -> Result<Option<Release>, SyncError> {
    info!("Getting release {} on {}", tag, repo);

    let result = match tag {
        ReleaseTag::Latest => client.get_latest_release(repo).await,
        ReleaseTag::Named(name) => client.get_release_by_tag(repo, name).await,
    };

    match result {
        Ok(release) => {
            info!("Release {} on {} found", tag, repo);
            Ok(Some(release))
        }
        Err(e) if is_not_found(&e) => {
            info!("Release {} on {} does not exist", tag, repo);
            Ok(None)
        }
        Err(e) => Err(SyncError::Remote {
            repo: repo.clone(),
            tag: tag.clone(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::MockReleaseClient;
    use crate::http::NonRetryableError;
    use mockall::predicate::eq;

    fn repo() -> RepoId {
        RepoId::new("owner", "repo")
    }

    fn release(tag: &str) -> Release {
        Release {
            id: 1,
            tag_name: tag.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_locate_named_release() {
        let mut client = MockReleaseClient::new();
        client
            .expect_get_release_by_tag()
            .with(eq(repo()), eq("v1.0.0"))
            .times(1)
            .returning(|_, tag| Ok(release(tag)));

        let found = locate_release(&client, &repo(), &ReleaseTag::Named("v1.0.0".into()))
            .await
            .unwrap();

        assert_eq!(found.unwrap().tag_name, "v1.0.0");
    }

    #[tokio::test]
    async fn test_locate_latest_release() {
        let mut client = MockReleaseClient::new();
        client
            .expect_get_latest_release()
            .times(1)
            .returning(|_| Ok(release("v3.2.1")));
        client.expect_get_release_by_tag().never();

        let found = locate_release(&client, &repo(), &ReleaseTag::Latest)
            .await
            .unwrap();

        assert_eq!(found.unwrap().tag_name, "v3.2.1");
    }

    #[tokio::test]
    async fn test_locate_missing_release_is_none() {
        let mut client = MockReleaseClient::new();
        client.expect_get_release_by_tag().returning(|_, _| {
            Err(anyhow::Error::from(NonRetryableError::NotFound("HTTP 404".into()))
                .context("Failed to fetch release"))
        });

        let found = locate_release(&client, &repo(), &ReleaseTag::Named("v9".into()))
            .await
            .unwrap();

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_locate_other_failures_are_remote_errors() {
        let mut client = MockReleaseClient::new();
        client.expect_get_latest_release().returning(|_| {
            Err(anyhow::Error::from(NonRetryableError::AuthenticationFailed(
                "HTTP 401".into(),
            )))
        });

        let err = locate_release(&client, &repo(), &ReleaseTag::Latest)
            .await
            .unwrap_err();

        match err {
            SyncError::Remote { repo: r, tag, source } => {
                assert_eq!(r, repo());
                assert_eq!(tag, ReleaseTag::Latest);
                assert!(source.to_string().contains("Authentication failed"));
            }
            other => panic!("Expected Remote error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_locate_network_failure_is_remote_error() {
        let mut client = MockReleaseClient::new();
        client
            .expect_get_release_by_tag()
            .returning(|_, _| Err(anyhow::anyhow!("connection reset")));

        let err = locate_release(&client, &repo(), &ReleaseTag::Named("v1".into()))
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Remote { .. }));
        assert_eq!(err.to_string(), "Failed to get release v1 on owner/repo");
    }
}
