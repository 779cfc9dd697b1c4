use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Parser};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feedstock_dispatch::auth::authorize;
use feedstock_dispatch::config::Settings;
use feedstock_dispatch::dispatch::{ExecutionContext, dispatch, parse_event};
use feedstock_dispatch::git::LocalGit;
use feedstock_dispatch::github::OctocrabClient;
use feedstock_dispatch::messages::RunLink;
use feedstock_dispatch::tools::{CommandTools, ToolCommand};

/// Rerender, version-update or lint a feedstock PR named by a
/// `repository_dispatch` event.
#[derive(Parser)]
#[command(name = "feedstock-dispatch", version)]
struct Cli {
    /// Name of the triggering event.
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    event_name: String,

    /// File holding the event payload.
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: PathBuf,

    /// Token used for the API and for pushing.
    #[arg(long, env = "INPUT_GITHUB_TOKEN", hide_env_values = true)]
    github_token: String,

    /// Identity to push as. Looked up from the token when absent.
    #[arg(long, env = "GITHUB_ACTOR")]
    actor: Option<String>,

    /// Whether a deploy key is available, which allows workflow changes.
    #[arg(long, env = "HAS_SSH_PRIVATE_KEY", default_value_t = false, action = ArgAction::Set)]
    has_ssh_private_key: bool,

    #[arg(long, env = "GITHUB_RUN_ID")]
    run_id: String,

    #[arg(long, env = "GITHUB_SERVER_URL", default_value = "https://github.com")]
    server_url: String,

    /// Rerender command line.
    #[arg(long, env = "DISPATCH_RERENDER_CMD", default_value = "feedstock-rerender")]
    rerender_cmd: String,

    /// Version-update command line.
    #[arg(long, env = "DISPATCH_UPDATE_VERSION_CMD", default_value = "feedstock-update-version")]
    update_version_cmd: String,

    /// Lint command line.
    #[arg(long, env = "DISPATCH_LINT_CMD", default_value = "feedstock-lint")]
    lint_cmd: String,

    /// Limit on each executor run, in seconds.
    #[arg(long, env = "DISPATCH_TOOL_TIMEOUT_SECS", default_value_t = 1800)]
    tool_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feedstock_dispatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = format!("{e:#}"), "dispatch failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let payload = tokio::fs::read(&cli.event_path)
        .await
        .with_context(|| format!("reading event payload {}", cli.event_path.display()))?;
    let event = parse_event(&cli.event_name, &payload)?;
    tracing::info!(kind = %event.kind, pr = %event.pr, repo = %event.repository, "received event");

    let settings = Settings::from_env();
    let github = OctocrabClient::from_token(cli.github_token.clone(), event.repository.clone())
        .context("building GitHub client")?
        .with_retry(settings.retry);

    let credentials = authorize(
        &github,
        cli.actor.as_deref(),
        cli.github_token,
        cli.has_ssh_private_key,
        &settings.privileged_actors,
    )
    .await;

    let workdir = tempfile::tempdir().context("creating working directory")?;
    let git = LocalGit::new(workdir.path().join("feedstock"));

    let tools = CommandTools::new(
        ToolCommand::parse(&cli.rerender_cmd),
        ToolCommand::parse(&cli.update_version_cmd),
        ToolCommand::parse(&cli.lint_cmd),
    )
    .with_timeout(Duration::from_secs(cli.tool_timeout_secs));

    let run_link = RunLink::new(&cli.server_url, &event.repository, &cli.run_id);
    let ctx = ExecutionContext::new(github, git, tools, credentials, settings, run_link);

    dispatch(&ctx, &event).await?;
    Ok(())
}
