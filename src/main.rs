use std::error::Error;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};
use uuid::Uuid;

use pixelroom::common::{DEFAULT_ROOM, NetworkCommand, NetworkEvent, Pixel, PixelBatch};
use pixelroom::config::{self, AppConfig};
use pixelroom::handlers::{self, ChannelProvider};
use pixelroom::network::{self, PubsubClient};
use pixelroom::storage::Stores;

#[derive(Parser)]
#[command(
    name = "pixelroom",
    version,
    about = "Shared pixel canvas + chat ingestion node"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand)]
enum Mode {
    /// Subscribe to the pixel/chat channels and ingest into the store
    Serve,
    /// Publish a single pixel to a room and exit (JSON batch format)
    Paint {
        #[arg(long, default_value = DEFAULT_ROOM)]
        room: String,
        #[arg(long)]
        x: i32,
        #[arg(long)]
        y: i32,
        #[arg(long)]
        color: String,
        #[arg(long, default_value = "cli")]
        username: String,
    },
    /// Publish a chat message to a room and exit
    Say {
        #[arg(long, default_value = DEFAULT_ROOM)]
        room: String,
        #[arg(long, default_value = "cli")]
        username: String,
        message: String,
    },
    /// Add a bootstrap node multiaddr to the config file and exit
    AddBootstrap { addr: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let app_config = config::load_config(&cli.config);

    match cli.mode.unwrap_or(Mode::Serve) {
        Mode::Serve => serve(app_config).await,
        Mode::Paint {
            room,
            x,
            y,
            color,
            username,
        } => {
            let batch = PixelBatch {
                pixels: vec![Pixel {
                    x,
                    y,
                    color,
                    user_id: username.clone(),
                    username,
                }],
                room,
                timestamp: Utc::now().timestamp(),
                batch_id: Uuid::new_v4().to_string(),
                source_id: "cli".to_string(),
            };
            let payload = serde_json::to_vec(&batch)?;
            publish(app_config, NetworkCommand::PublishPixels(payload)).await
        }
        Mode::Say {
            room,
            username,
            message,
        } => {
            let payload = serde_json::to_vec(&json!({
                "messageId": Uuid::new_v4().to_string(),
                "userId": username.clone(),
                "username": username,
                "message": message,
                "timestamp": Utc::now().timestamp(),
                "room": room,
            }))?;
            publish(app_config, NetworkCommand::PublishChat(payload)).await
        }
        Mode::AddBootstrap { addr } => {
            if network::parse_bootstrap_addrs(std::slice::from_ref(&addr)).is_empty() {
                return Err(format!("invalid multiaddr: {addr}").into());
            }
            let mut app_config = app_config;
            if app_config.bootstrap_nodes.contains(&addr) {
                log::info!("bootstrap node already configured: {addr}");
            } else {
                app_config.bootstrap_nodes.push(addr);
                config::save_config(&cli.config, &app_config)?;
                log::info!("config updated: {}", cli.config);
            }
            Ok(())
        }
    }
}

async fn serve(config: AppConfig) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = std::path::Path::new(&config.db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let stores = Arc::new(Stores::open(&config.db_path)?);
    log::info!("store open at {}", config.db_path);

    // The command sender stays alive for the lifetime of the server; the
    // client shuts down when it drops.
    let (_cmd_tx, cmd_rx) = mpsc::channel(1);
    let (event_tx, mut event_rx) = mpsc::channel(100);
    let client = PubsubClient::new(
        event_tx,
        cmd_rx,
        &config.pixel_topic,
        &config.chat_topic,
        &config.bootstrap_nodes,
    );
    let channels = client.channel_directory();
    tokio::spawn(async move {
        if let Err(err) = client.run().await {
            log::error!("pubsub client terminated: {err}");
        }
    });

    for topic in [config.pixel_topic.as_str(), config.chat_topic.as_str()] {
        match channels.channel_url(topic) {
            Ok(url) => log::info!("channel {topic} available at {url}"),
            Err(err) => log::warn!("channel {topic}: {err}"),
        }
    }

    while let Some(event) = event_rx.recv().await {
        match event {
            NetworkEvent::PixelPayload(payload) => {
                handlers::pubsub::on_pixel_update(
                    &stores,
                    config.write_mode,
                    config.pixel_encoding,
                    &payload,
                );
            }
            NetworkEvent::ChatPayload(payload) => {
                handlers::pubsub::on_chat_message(
                    &stores,
                    config.write_mode,
                    config.chat_encoding,
                    &payload,
                );
            }
            NetworkEvent::PeerConnected(peer) => log::info!("peer connected: {peer}"),
            NetworkEvent::PeerDisconnected(peer) => log::info!("peer disconnected: {peer}"),
        }
    }

    Ok(())
}

async fn publish(config: AppConfig, command: NetworkCommand) -> Result<(), Box<dyn Error>> {
    let (cmd_tx, cmd_rx) = mpsc::channel(1);
    let (event_tx, mut event_rx) = mpsc::channel(100);
    let client = PubsubClient::new(
        event_tx,
        cmd_rx,
        &config.pixel_topic,
        &config.chat_topic,
        &config.bootstrap_nodes,
    );
    let handle = tokio::spawn(async move {
        if let Err(err) = client.run().await {
            log::error!("pubsub client terminated: {err}");
        }
    });

    // Wait for a peer before publishing, up to a short deadline.
    let deadline = sleep(Duration::from_secs(5));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            event = event_rx.recv() => {
                if let Some(NetworkEvent::PeerConnected(peer)) = event {
                    log::info!("connected to {peer}");
                    break;
                }
            }
            _ = &mut deadline => {
                log::warn!("no peers discovered; publishing anyway");
                break;
            }
        }
    }
    // Give gossipsub a heartbeat to graft the mesh.
    sleep(Duration::from_secs(1)).await;
    cmd_tx.send(command).await?;
    sleep(Duration::from_secs(1)).await;
    handle.abort();
    Ok(())
}
