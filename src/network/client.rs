use std::error::Error;

use futures::StreamExt;
use libp2p::gossipsub;
use libp2p::swarm::{Config as SwarmConfig, SwarmEvent};
use libp2p::{Multiaddr, PeerId, Swarm, identity, mdns};
use tokio::sync::mpsc;

use crate::common::{NetworkCommand, NetworkEvent};

use super::TopicDirectory;
use super::behavior::{CanvasBehavior, CanvasBehaviorEvent, ChannelTopics, build_behavior};
use super::transport::build_transport;

/// Parses configured bootstrap entries, dropping anything that is not a
/// valid multiaddr. Entries keep their `/p2p/` suffix; the dial resolves it.
pub fn parse_bootstrap_addrs(entries: &[String]) -> Vec<Multiaddr> {
    entries
        .iter()
        .filter_map(|entry| match entry.parse::<Multiaddr>() {
            Ok(addr) => Some(addr),
            Err(err) => {
                log::warn!("invalid bootstrap multiaddr `{entry}`: {err}");
                None
            }
        })
        .collect()
}

/// Bridges gossipsub to the ingestion pipeline: inbound topic payloads go
/// up as `NetworkEvent`s carrying raw bytes, publish requests come down as
/// `NetworkCommand`s. Delivery is at-most-once from this node's view; there
/// is no offset or replay.
pub struct PubsubClient {
    event_sender: mpsc::Sender<NetworkEvent>,
    command_receiver: mpsc::Receiver<NetworkCommand>,
    topics: ChannelTopics,
    bootstrap_addrs: Vec<Multiaddr>,
}

impl PubsubClient {
    pub fn new(
        event_sender: mpsc::Sender<NetworkEvent>,
        command_receiver: mpsc::Receiver<NetworkCommand>,
        pixel_topic: &str,
        chat_topic: &str,
        bootstrap_nodes: &[String],
    ) -> Self {
        Self {
            event_sender,
            command_receiver,
            topics: ChannelTopics::new(pixel_topic, chat_topic),
            bootstrap_addrs: parse_bootstrap_addrs(bootstrap_nodes),
        }
    }

    /// Directory over the channels this client is bound to. Backs
    /// `get_channel_url` on the dispatch surface.
    pub fn channel_directory(&self) -> TopicDirectory {
        TopicDirectory::new(&[
            self.topics.pixels.to_string(),
            self.topics.chat.to_string(),
        ])
    }

    pub async fn run(mut self) -> Result<(), Box<dyn Error>> {
        let local_key = identity::Keypair::generate_ed25519();
        let local_peer_id = PeerId::from(local_key.public());
        log::info!("local peer id: {local_peer_id}");

        let transport = build_transport(&local_key)?;
        let behavior = build_behavior(&local_key, local_peer_id, &self.topics)?;

        let mut swarm = Swarm::new(
            transport,
            behavior,
            local_peer_id,
            SwarmConfig::with_tokio_executor(),
        );

        swarm.listen_on("/ip4/0.0.0.0/tcp/0".parse()?)?;

        // WAN peers come from config; mdns fills in the local network.
        for addr in &self.bootstrap_addrs {
            log::info!("dialing bootstrap node {addr}");
            if let Err(err) = swarm.dial(addr.clone()) {
                log::warn!("failed to dial bootstrap node {addr}: {err}");
            }
        }

        log::info!("pubsub event loop started");

        loop {
            tokio::select! {
                command = self.command_receiver.recv() => {
                    match command {
                        Some(command) => self.handle_command(command, &mut swarm),
                        None => break,
                    }
                }
                event = swarm.select_next_some() => {
                    self.handle_swarm_event(event, &mut swarm).await;
                }
            }
        }

        Ok(())
    }

    fn handle_command(&self, command: NetworkCommand, swarm: &mut Swarm<CanvasBehavior>) {
        let (topic, payload) = match command {
            NetworkCommand::PublishPixels(payload) => (self.topics.pixels.clone(), payload),
            NetworkCommand::PublishChat(payload) => (self.topics.chat.clone(), payload),
        };
        if let Err(err) = swarm.behaviour_mut().gossipsub.publish(topic, payload) {
            log::warn!("publish error: {err:?}");
        }
    }

    async fn handle_swarm_event(
        &mut self,
        event: SwarmEvent<CanvasBehaviorEvent>,
        swarm: &mut Swarm<CanvasBehavior>,
    ) {
        match event {
            SwarmEvent::Behaviour(CanvasBehaviorEvent::Gossipsub(gossipsub::Event::Message {
                message,
                ..
            })) => {
                let event = if message.topic == self.topics.pixels.hash() {
                    NetworkEvent::PixelPayload(message.data)
                } else if message.topic == self.topics.chat.hash() {
                    NetworkEvent::ChatPayload(message.data)
                } else {
                    log::debug!("message on unbound topic {}", message.topic);
                    return;
                };
                if self.event_sender.send(event).await.is_err() {
                    log::warn!("pipeline receiver dropped, discarding payload");
                }
            }
            SwarmEvent::Behaviour(CanvasBehaviorEvent::Mdns(mdns::Event::Discovered(list))) => {
                for (peer_id, _) in list {
                    swarm.behaviour_mut().gossipsub.add_explicit_peer(&peer_id);
                    let _ = self
                        .event_sender
                        .send(NetworkEvent::PeerConnected(peer_id.to_string()))
                        .await;
                }
            }
            SwarmEvent::Behaviour(CanvasBehaviorEvent::Mdns(mdns::Event::Expired(list))) => {
                for (peer_id, _) in list {
                    swarm
                        .behaviour_mut()
                        .gossipsub
                        .remove_explicit_peer(&peer_id);
                    let _ = self
                        .event_sender
                        .send(NetworkEvent::PeerDisconnected(peer_id.to_string()))
                        .await;
                }
            }
            SwarmEvent::NewListenAddr { address, .. } => {
                log::info!("listening on {address}");
            }
            _ => {}
        }
    }
}
