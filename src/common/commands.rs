/// Requests from the application down into the transport layer.
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Publish an already-encoded pixel batch on the pixel channel.
    PublishPixels(Vec<u8>),
    /// Publish an already-encoded chat message on the chat channel.
    PublishChat(Vec<u8>),
}
