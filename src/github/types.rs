use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Content type used when an asset does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Upload state of a release asset.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssetState {
    Uploaded,
    Starter,
    Pending,
}

impl std::fmt::Display for AssetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetState::Uploaded => write!(f, "uploaded"),
            AssetState::Starter => write!(f, "starter"),
            AssetState::Pending => write!(f, "pending"),
        }
    }
}

/// Represents a GitHub release asset
#[derive(Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct ReleaseAsset {
    pub id: u64,
    pub name: String,
    pub label: Option<String>,
    pub size: u64,
    pub content_type: Option<String>,
    pub state: AssetState,
    #[serde(default)]
    pub browser_download_url: String,
}

impl ReleaseAsset {
    pub fn content_type_or_default(&self) -> &str {
        self.content_type
            .as_deref()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

/// Represents a GitHub release
#[derive(Deserialize, Serialize, Debug, PartialEq, Clone, Default)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    pub name: Option<String>,
    pub body: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    pub html_url: Option<String>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// Request body for creating a release.
#[derive(Serialize, Debug, PartialEq, Clone)]
pub struct NewRelease {
    pub tag_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub draft: bool,
    pub prerelease: bool,
}

/// Binary content and metadata for one asset upload.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetUpload {
    pub name: String,
    pub label: Option<String>,
    pub content_type: String,
    pub data: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_deserialize() {
        let release: Release = serde_json::from_str(
            r#"{
                "id": 7,
                "tag_name": "v1.0.0",
                "name": "Release 1.0",
                "body": "notes",
                "draft": false,
                "prerelease": true,
                "html_url": "https://github.com/o/r/releases/tag/v1.0.0",
                "upload_url": "https://uploads.github.com/repos/o/r/releases/7/assets{?name,label}",
                "assets": [{
                    "id": 11,
                    "name": "tool.tar.gz",
                    "label": null,
                    "size": 1024,
                    "content_type": "application/gzip",
                    "state": "uploaded",
                    "browser_download_url": "https://github.com/o/r/releases/download/v1.0.0/tool.tar.gz"
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(release.id, 7);
        assert!(release.prerelease);
        assert_eq!(release.assets.len(), 1);
        assert_eq!(release.assets[0].state, AssetState::Uploaded);
        assert_eq!(release.assets[0].content_type_or_default(), "application/gzip");
    }

    #[test]
    fn test_asset_state_deserialize() {
        let state: AssetState = serde_json::from_str(r#""starter""#).unwrap();
        assert_eq!(state, AssetState::Starter);
        let state: AssetState = serde_json::from_str(r#""pending""#).unwrap();
        assert_eq!(state, AssetState::Pending);
    }

    #[test]
    fn test_content_type_default() {
        let mut asset = ReleaseAsset {
            id: 1,
            name: "a".into(),
            label: None,
            size: 0,
            content_type: None,
            state: AssetState::Uploaded,
            browser_download_url: String::new(),
        };
        assert_eq!(asset.content_type_or_default(), DEFAULT_CONTENT_TYPE);

        asset.content_type = Some(String::new());
        assert_eq!(asset.content_type_or_default(), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_new_release_omits_missing_fields() {
        let request = NewRelease {
            tag_name: "v1".into(),
            name: None,
            body: None,
            draft: true,
            prerelease: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"tag_name": "v1", "draft": true, "prerelease": false})
        );
    }
}
