mod bot;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::bot::commands::default_commands;
use crate::bot::router::Router;
use crate::bot::runtime::BotRuntime;
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::infra::jira::JiraClient;
use crate::infra::slack::SlackClient;

#[derive(Parser)]
#[command(name = "jirabot", author, version, about = "Slack bot for driving Jira from chat")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    let app_token = config.slack.app_token.clone().ok_or_else(|| {
        AppError::Configuration("Slack app token not configured".to_string())
    })?;
    let bot_token = config.slack.bot_token.clone().ok_or_else(|| {
        AppError::Configuration("Slack bot token not configured".to_string())
    })?;

    let tracker = Arc::new(JiraClient::new(config.jira.clone())?);
    let slack = Arc::new(SlackClient::new(app_token, bot_token)?);

    tracing::info!(
        host = %config.jira.host,
        user = %config.jira.user,
        "starting jirabot"
    );

    let auto_reconnect = config.slack.auto_reconnect;
    let context = AppContext::new(config, tracker, slack.clone());
    let router = Router::new(context.chat.clone(), default_commands(&context));

    BotRuntime::new(slack, router, auto_reconnect).run().await
}
