use anyhow::{Result, anyhow};
use std::fmt;
use std::str::FromStr;

/// Repository identifier (owner/name format).
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            Err(anyhow!(
                "Invalid repository '{}'. Expected the format 'owner/repo'.",
                s
            ))
        } else {
            Ok(RepoId::new(parts[0], parts[1]))
        }
    }
}

/// Which release of a repository to look up.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ReleaseTag {
    /// The most recent non-draft, non-prerelease release
    Latest,
    Named(String),
}

impl ReleaseTag {
    pub fn as_named(&self) -> Option<&str> {
        match self {
            ReleaseTag::Latest => None,
            ReleaseTag::Named(tag) => Some(tag),
        }
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseTag::Latest => write!(f, "latest"),
            ReleaseTag::Named(tag) => write!(f, "{}", tag),
        }
    }
}

impl From<&str> for ReleaseTag {
    fn from(tag: &str) -> Self {
        if tag == "latest" {
            ReleaseTag::Latest
        } else {
            ReleaseTag::Named(tag.to_string())
        }
    }
}
