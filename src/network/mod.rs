pub mod behavior;
pub mod client;
pub mod transport;

pub use client::{PubsubClient, parse_bootstrap_addrs};

use crate::handlers::{ChannelError, ChannelProvider};

/// Directory of the channels this process carries. Subscriptions happen at
/// swarm startup, so `subscribe` only verifies the channel is bound here;
/// `channel_url` answers with the dispatcher's websocket bridge path.
pub struct TopicDirectory {
    channels: Vec<String>,
    base_path: String,
}

impl TopicDirectory {
    pub fn new(channels: &[String]) -> Self {
        Self {
            channels: channels.to_vec(),
            base_path: "/ws".to_string(),
        }
    }

    fn known(&self, channel: &str) -> bool {
        self.channels.iter().any(|c| c == channel)
    }
}

impl ChannelProvider for TopicDirectory {
    fn subscribe(&self, channel: &str) -> Result<(), ChannelError> {
        if self.known(channel) {
            Ok(())
        } else {
            Err(format!("unknown channel {channel}").into())
        }
    }

    fn channel_url(&self, channel: &str) -> Result<String, ChannelError> {
        self.subscribe(channel)?;
        Ok(format!("{}/{channel}", self.base_path))
    }
}
