//! Construction of the authenticated GitHub clients used by a sync run.

use anyhow::Result;
use log::debug;
use reqwest::{
    Client,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue},
};

use crate::{
    config::{Config, mask_token, non_empty},
    github::GitHub,
    http::{HttpClient, RetryPolicy},
};

const USER_AGENT: &str = concat!("ghrs/", env!("GHRS_VERSION"));
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Endpoints the clients talk to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Endpoints {
    pub api_url: Option<String>,
    pub upload_url: Option<String>,
}

impl Endpoints {
    /// Blank URLs count as unset.
    pub fn new(api_url: Option<&str>, upload_url: Option<&str>) -> Self {
        Self {
            api_url: non_empty(api_url).map(str::to_string),
            upload_url: non_empty(upload_url).map(str::to_string),
        }
    }
}

/// Build an HTTP client with optional authentication token
pub fn build_http_client(token: Option<&str>, policy: RetryPolicy) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));

    if let Some(token) = token {
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);
        debug!("HTTP client configured with token {}", mask_token(token));
    }

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .build()?;

    Ok(HttpClient::with_policy(client, policy))
}

pub fn build_github(token: &str, endpoints: &Endpoints, policy: RetryPolicy) -> Result<GitHub> {
    let http = build_http_client(Some(token), policy)?;
    Ok(GitHub::new(
        http,
        endpoints.api_url.clone(),
        endpoints.upload_url.clone(),
    ))
}

/// Builds the source and destination clients, each with its own token.
pub fn build_clients(config: &Config, endpoints: &Endpoints) -> Result<(GitHub, GitHub)> {
    let policy = RetryPolicy::default();
    let source = build_github(&config.source_token, endpoints, policy)?;
    let destination = build_github(&config.destination_token, endpoints, policy)?;
    Ok((source, destination))
}
