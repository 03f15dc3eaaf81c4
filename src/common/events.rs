/// Events delivered by the transport layer to the ingestion pipeline.
#[derive(Debug, Clone)]
pub enum NetworkEvent {
    /// Raw payload from the pixel channel, decoded by the bound pixel format.
    PixelPayload(Vec<u8>),
    /// Raw payload from the chat channel, decoded by the bound chat format.
    ChatPayload(Vec<u8>),
    PeerConnected(String),
    PeerDisconnected(String),
}
