use std::{fs::read_to_string, path::PathBuf, sync::Arc};

use clap::Parser;

use crate::core::{settings::Settings, store::ParticipantStore};

pub mod core;
pub mod error;
pub mod web;

#[derive(Parser, Debug)]
#[command(name = "PrizeDraw")]
#[command(version = "0.1")]
#[command(about = "A registration and prize draw service for meetup events.", long_about = None)]
struct Args {
    /// Location of a Json settings file.
    /// If not provided, settings are read from the environment
    /// (STORE_URL, WEB_PORT, ADMIN_PASSWORD).
    #[arg(short, long)]
    settings_file: Option<PathBuf>,

    /// Port for the HTTP API, overriding the settings file.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let mut settings = match &args.settings_file {
        Some(path) => serde_json::from_str::<Settings>(&read_to_string(path)?)?,
        None => Settings::from_env(),
    };

    if let Some(port) = args.port {
        settings.web_port = Some(port);
    }

    if settings.store_url.is_none() {
        log::warn!("No store URL is configured, registrations and draws will fail until one is set");
    }

    let store = Arc::new(ParticipantStore::new(settings.store_url.as_deref())?);
    let settings = Arc::new(settings);

    log::info!(
        "PrizeDraw initialized, serving on port {}",
        settings.web_port.unwrap_or(web::DEFAULT_WEB_PORT)
    );

    web::run_http_server(store, settings).await
}
