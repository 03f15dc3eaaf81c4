use std::collections::hash_map::DefaultHasher;
use std::error::Error;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use libp2p::gossipsub::{self, IdentTopic};
use libp2p::mdns;
use libp2p::swarm::NetworkBehaviour;
use libp2p::{PeerId, identity};

#[derive(NetworkBehaviour)]
pub struct CanvasBehavior {
    pub gossipsub: gossipsub::Behaviour,
    pub mdns: mdns::tokio::Behaviour,
}

/// The two channels a node carries: pixel batches and chat messages, one
/// gossipsub topic each.
pub struct ChannelTopics {
    pub pixels: IdentTopic,
    pub chat: IdentTopic,
}

impl ChannelTopics {
    pub fn new(pixel_topic: &str, chat_topic: &str) -> Self {
        Self {
            pixels: IdentTopic::new(pixel_topic),
            chat: IdentTopic::new(chat_topic),
        }
    }
}

pub fn build_behavior(
    local_key: &identity::Keypair,
    local_peer_id: PeerId,
    topics: &ChannelTopics,
) -> Result<CanvasBehavior, Box<dyn Error>> {
    // Content-address messages so gossip duplicates collapse to one event.
    let message_id_fn = |message: &gossipsub::Message| {
        let mut hasher = DefaultHasher::new();
        message.data.hash(&mut hasher);
        gossipsub::MessageId::from(hasher.finish().to_string())
    };

    let gossipsub_config = gossipsub::ConfigBuilder::default()
        .heartbeat_interval(Duration::from_secs(10))
        .validation_mode(gossipsub::ValidationMode::Strict)
        .message_id_fn(message_id_fn)
        .build()?;

    let mut gossipsub = gossipsub::Behaviour::new(
        gossipsub::MessageAuthenticity::Signed(local_key.clone()),
        gossipsub_config,
    )?;

    gossipsub.subscribe(&topics.pixels)?;
    gossipsub.subscribe(&topics.chat)?;

    let mdns_behaviour = mdns::tokio::Behaviour::new(mdns::Config::default(), local_peer_id)?;

    Ok(CanvasBehavior {
        gossipsub,
        mdns: mdns_behaviour,
    })
}
