use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser};
use log::debug;

use ghrs::config::{Ambient, Config, Inputs};
use ghrs::services::{Endpoints, build_clients};
use ghrs::sync::{FailurePolicy, ReleaseSync, SyncSummary};

/// ghrs - GitHub Release Sync
///
/// Mirror a release and its assets from one repository to another.
/// Every option falls back to the matching GitHub Actions input variable,
/// and missing values default to the current workflow's repository, ref
/// and token.
///
/// Examples:
///   ghrs --source owner/app --destination owner/app-mirror --tag v1.2.0
///   ghrs --source owner/app --tag latest --destination-tag stable
#[derive(Parser, Debug)]
#[command(author, version = env!("GHRS_VERSION"), about)]
struct Cli {
    /// Source repository; defaults to the current repository
    #[arg(long, env = "INPUT_SOURCE", value_name = "OWNER/REPO")]
    source: Option<String>,

    /// Destination repository; defaults to the current repository
    #[arg(long, env = "INPUT_DESTINATION", value_name = "OWNER/REPO")]
    destination: Option<String>,

    /// Release tag, "refs/tags/<tag>" or "latest"; defaults to GITHUB_REF
    #[arg(long, env = "INPUT_TAG")]
    tag: Option<String>,

    /// Tag of the destination release; defaults to the source release's tag
    #[arg(long = "destination-tag", env = "INPUT_DESTINATION-TAG")]
    destination_tag: Option<String>,

    /// Token for the source repository; defaults to GITHUB_TOKEN
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Token for the destination repository; defaults to the source token
    #[arg(
        long = "destination-token",
        env = "INPUT_DESTINATION-TOKEN",
        hide_env_values = true
    )]
    destination_token: Option<String>,

    /// Stop at the first failed asset instead of attempting all of them
    #[arg(
        long = "fail-fast",
        env = "INPUT_FAIL-FAST",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        value_parser = parse_switch
    )]
    fail_fast: bool,

    /// GitHub API URL (defaults to https://api.github.com)
    #[arg(long = "api-url", env = "GITHUB_API_URL", value_name = "URL")]
    api_url: Option<String>,

    /// GitHub uploads URL (derived from the API URL by default)
    #[arg(long = "upload-url", env = "GHRS_UPLOAD_URL", value_name = "URL")]
    upload_url: Option<String>,

    #[arg(long, env = "GITHUB_REPOSITORY", hide = true)]
    current_repository: Option<String>,

    #[arg(long, env = "GITHUB_REF", hide = true)]
    current_ref: Option<String>,

    #[arg(long, env = "GITHUB_TOKEN", hide = true, hide_env_values = true)]
    current_token: Option<String>,
}

impl Cli {
    fn failure_policy(&self) -> FailurePolicy {
        if self.fail_fast {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::CollectAll
        }
    }

    fn endpoints(&self) -> Endpoints {
        Endpoints::new(self.api_url.as_deref(), self.upload_url.as_deref())
    }

    fn into_inputs(self) -> (Inputs, Ambient) {
        let inputs = Inputs {
            source: self.source,
            destination: self.destination,
            tag: self.tag,
            destination_tag: self.destination_tag,
            token: self.token,
            destination_token: self.destination_token,
        };
        let ambient = Ambient {
            repository: self.current_repository,
            git_ref: self.current_ref,
            token: self.current_token,
        };
        (inputs, ambient)
    }
}

/// Parses a switch value the way Actions inputs spell booleans. Blank is off.
fn parse_switch(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "f" | "no" | "n" | "off" | "0" => Ok(false),
        "true" | "t" | "yes" | "y" | "on" | "1" => Ok(true),
        other => Err(format!("'{}' is not a boolean", other)),
    }
}

async fn run(cli: Cli) -> Result<SyncSummary> {
    let endpoints = cli.endpoints();
    let policy = cli.failure_policy();
    let (inputs, ambient) = cli.into_inputs();

    let config = Config::resolve(inputs, &ambient)?;
    debug!("Resolved {:?}", config);

    let (source, destination) = build_clients(&config, &endpoints)?;
    let summary = ReleaseSync::with_policy(source, destination, config, policy)
        .run()
        .await?;
    Ok(summary)
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
