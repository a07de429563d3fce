//! Input resolution.
//!
//! Turns the raw inputs of one run plus the ambient CI environment
//! (`GITHUB_REPOSITORY`, `GITHUB_REF`, `GITHUB_TOKEN`) into a validated [`Config`].
//! Nothing here touches the network or the process environment.

use std::fmt;

use thiserror::Error;

use crate::github::{ReleaseTag, RepoId};

const TAG_REF_PREFIX: &str = "refs/tags/";

/// Raw inputs as given by the user. Empty strings count as unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub tag: Option<String>,
    pub destination_tag: Option<String>,
    pub token: Option<String>,
    pub destination_token: Option<String>,
}

/// Context provided by the CI environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ambient {
    /// `GITHUB_REPOSITORY`
    pub repository: Option<String>,
    /// `GITHUB_REF`
    pub git_ref: Option<String>,
    /// `GITHUB_TOKEN`
    pub token: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Either source or destination or both should be provided.")]
    MissingRepositories,

    #[error(
        "Could not determine the {0} repository: it was not provided and GITHUB_REPOSITORY is not set."
    )]
    UnknownCurrentRepository(&'static str),

    #[error("Invalid {side} repository '{value}'. Expected the format 'owner/repo'.")]
    InvalidRepository { side: &'static str, value: String },

    #[error("Source and destination repositories cannot be the same ({0}).")]
    SameRepository(RepoId),

    #[error(
        "No tag provided. Set 'tag' to a tag name, 'refs/tags/<tag>' or 'latest', or make sure GITHUB_REF is set."
    )]
    MissingTag,

    #[error("Could not determine the source or destination GitHub token. Set 'token' or GITHUB_TOKEN.")]
    MissingToken,
}

/// A validated sync configuration.
#[derive(Clone, PartialEq)]
pub struct Config {
    pub source_repo: RepoId,
    pub dest_repo: RepoId,
    pub source_tag: ReleaseTag,
    /// Explicit destination tag; `None` means "use the source release's tag".
    pub destination_tag: Option<String>,
    pub source_token: String,
    pub destination_token: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("source_repo", &self.source_repo)
            .field("dest_repo", &self.dest_repo)
            .field("source_tag", &self.source_tag)
            .field("destination_tag", &self.destination_tag)
            .field("source_token", &mask_token(&self.source_token))
            .field("destination_token", &mask_token(&self.destination_token))
            .finish()
    }
}

impl Config {
    pub fn resolve(inputs: Inputs, ambient: &Ambient) -> Result<Self, ConfigError> {
        let (source_repo, dest_repo) = resolve_repositories(
            inputs.source.as_deref(),
            inputs.destination.as_deref(),
            ambient.repository.as_deref(),
        )?;

        let source_tag = non_empty(inputs.tag.as_deref())
            .or_else(|| non_empty(ambient.git_ref.as_deref()))
            .map(parse_tag)
            .and_then(|tag| non_empty(Some(tag)))
            .map(ReleaseTag::from)
            .ok_or(ConfigError::MissingTag)?;

        let destination_tag = non_empty(inputs.destination_tag.as_deref())
            .map(parse_tag)
            .and_then(|tag| non_empty(Some(tag)))
            .or_else(|| source_tag.as_named())
            .map(str::to_string);

        let source_token = non_empty(inputs.token.as_deref())
            .or_else(|| non_empty(ambient.token.as_deref()))
            .ok_or(ConfigError::MissingToken)?
            .to_string();
        let destination_token = non_empty(inputs.destination_token.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| source_token.clone());

        Ok(Self {
            source_repo,
            dest_repo,
            source_tag,
            destination_tag,
            source_token,
            destination_token,
        })
    }
}

/// Picks the source and destination repositories, defaulting the missing one
/// to the current repository.
pub fn resolve_repositories(
    source: Option<&str>,
    destination: Option<&str>,
    current: Option<&str>,
) -> Result<(RepoId, RepoId), ConfigError> {
    let current = non_empty(current);
    let (source, destination) = match (non_empty(source), non_empty(destination)) {
        (None, None) => return Err(ConfigError::MissingRepositories),
        (Some(source), Some(destination)) => (source, destination),
        (Some(source), None) => (
            source,
            current.ok_or(ConfigError::UnknownCurrentRepository("destination"))?,
        ),
        (None, Some(destination)) => (
            current.ok_or(ConfigError::UnknownCurrentRepository("source"))?,
            destination,
        ),
    };

    let source_repo = parse_repo("source", source)?;
    let dest_repo = parse_repo("destination", destination)?;

    // Repository names on GitHub are case-insensitive
    if source_repo.owner.eq_ignore_ascii_case(&dest_repo.owner)
        && source_repo.name.eq_ignore_ascii_case(&dest_repo.name)
    {
        return Err(ConfigError::SameRepository(source_repo));
    }

    Ok((source_repo, dest_repo))
}

/// Strips any `refs/tags/` prefix from a tag or ref.
pub fn parse_tag(tag: &str) -> &str {
    let mut tag = tag.trim();
    while let Some(rest) = tag.strip_prefix(TAG_REF_PREFIX) {
        tag = rest;
    }
    tag
}

/// Shows only the edges of a token, for logs.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len().min(8));
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}

fn parse_repo(side: &'static str, value: &str) -> Result<RepoId, ConfigError> {
    value
        .parse::<RepoId>()
        .map_err(|_| ConfigError::InvalidRepository {
            side,
            value: value.to_string(),
        })
}

/// Trims a value and treats blank as unset.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
