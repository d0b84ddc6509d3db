//! # Main Entry Point
//!
//! Initializes the bot:
//! - Domain: Configuration and Types
//! - Infrastructure: Matrix, News API, Browser
//! - Application: Pipeline, Trigger Listener
//!

mod application;
mod domain;
mod infrastructure;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;
use matrix_sdk::{
    config::SyncSettings,
    room::Room,
    ruma::events::room::message::{MessageType, SyncRoomMessageEvent},
    Client,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::listener::TriggerListener;
use crate::application::pipeline::ReportPipeline;
use crate::domain::config::{AppConfig, NewsConfig};
use crate::infrastructure::browser::BrowserCompositor;
use crate::infrastructure::matrix::MatrixChannel;
use crate::infrastructure::news::NewsClient;

#[derive(Parser, Debug)]
#[command(name = "dailycard", about = "AI daily-report card bot")]
struct Args {
    /// Path to the application config file
    #[arg(long, default_value = "data/config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Load Configuration
    let config_content = fs::read_to_string(&args.config)
        .with_context(|| format!("Failed to read {}", args.config.display()))?;
    let config: AppConfig =
        serde_yaml::from_str(&config_content).context("Failed to parse config.yaml")?;

    // 2. Logging Setup
    if !Path::new("data").exists() {
        fs::create_dir("data").context("Failed to create data directory")?;
    }

    let file_appender = tracing_appender::rolling::never("data", "session.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "info,matrix_sdk=warn,matrix_sdk_base=warn,matrix_sdk_crypto=error,ruma=warn,hyper=warn",
        )
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::info!("Starting dailycard...");

    // 3. Plugin Configuration (loaded once, injected into the pipeline)
    let news_config = NewsConfig::load(Path::new(&config.news.config_path));
    if let Err(e) = &news_config {
        tracing::error!("News API配置加载失败: {e} (每次触发都会返回该错误)");
    }

    // 4. Build the Pipeline
    let pipeline = Arc::new(ReportPipeline::new(
        news_config,
        Arc::new(NewsClient::new()),
        Arc::new(BrowserCompositor::new()),
    ));
    let listener = Arc::new(TriggerListener::new(pipeline));

    // 5. Matrix Setup
    let client = Client::builder()
        .homeserver_url(&config.services.matrix.homeserver)
        .build()
        .await?;

    client
        .matrix_auth()
        .login_username(
            &config.services.matrix.username,
            &config.services.matrix.password,
        )
        .send()
        .await?;

    tracing::info!("Logged in as {}", config.services.matrix.username);

    // 6. Event Loop
    let start_time = std::time::SystemTime::now();
    let loop_listener = listener.clone();

    client.add_event_handler(move |ev: SyncRoomMessageEvent, room: Room| {
        let listener = loop_listener.clone();

        async move {
            if let Some(original_msg) = ev.as_original() {
                // Ignore events older than start_time
                let ts = ev.origin_server_ts();
                let event_time =
                    std::time::UNIX_EPOCH + std::time::Duration::from_millis(ts.get().into());
                if event_time < start_time {
                    return;
                }

                if original_msg.sender == room.own_user_id() {
                    return;
                }

                if let MessageType::Text(text_content) = &original_msg.content.msgtype {
                    let channel = Arc::new(MatrixChannel::new(room));
                    // Break/Continue only matters to hosts with more
                    // handlers in the chain; ours has one.
                    let _ = listener.on_text_event(&text_content.body, channel);
                }
            }
        }
    });

    // 7. Sync
    client.sync(SyncSettings::default()).await?;

    Ok(())
}
