use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codec::{ChatEncoding, PixelEncoding};
use crate::service::WriteMode;

pub const DEFAULT_CONFIG_PATH: &str = "config/pixelroom.json";

/// Runtime configuration. Decode modes are bound per channel here, on
/// purpose: a channel is JSON or binary by declaration, never by sniffing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub db_path: String,
    pub pixel_topic: String,
    pub chat_topic: String,
    pub pixel_encoding: PixelEncoding,
    pub chat_encoding: ChatEncoding,
    pub write_mode: WriteMode,
    /// Multiaddrs dialed at swarm startup for WAN peers; mdns still covers
    /// the local network when this is empty.
    pub bootstrap_nodes: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: "data/pixelroom.db".to_string(),
            pixel_topic: "canvas-pixels".to_string(),
            chat_topic: "canvas-chat".to_string(),
            pixel_encoding: PixelEncoding::default(),
            chat_encoding: ChatEncoding::default(),
            write_mode: WriteMode::default(),
            bootstrap_nodes: Vec::new(),
        }
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}

pub fn save_config(path: &str, config: &AppConfig) -> std::io::Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)
}
