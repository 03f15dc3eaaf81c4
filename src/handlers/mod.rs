//! Entry points invoked by the external dispatcher, plus the traits that
//! describe what it hands us. Handlers return a numeric status to the
//! dispatcher: 0 for success, non-zero for an aborted event.

pub mod http;
pub mod pubsub;

use serde::Serialize;

pub type ChannelError = Box<dyn std::error::Error + Send + Sync>;

/// HTTP-shaped event as the dispatcher exposes it: query parameters, a
/// header sink, and a status+body writer.
pub trait HttpEvent {
    fn query(&self, name: &str) -> Option<String>;
    fn set_header(&mut self, name: &str, value: &str);
    fn write(&mut self, body: &[u8]);
    fn set_status(&mut self, status: u16);
}

/// Pubsub channel collaborator: named channels, subscription, and transport
/// URL resolution. No offsets, no replay.
pub trait ChannelProvider {
    fn subscribe(&self, channel: &str) -> Result<(), ChannelError>;
    fn channel_url(&self, channel: &str) -> Result<String, ChannelError>;
}

pub(crate) fn set_cors_headers(h: &mut dyn HttpEvent) {
    h.set_header("Access-Control-Allow-Origin", "*");
    h.set_header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS");
    h.set_header("Access-Control-Allow-Headers", "Content-Type, Authorization");
}

pub(crate) fn respond_error(h: &mut dyn HttpEvent, message: &str, status: u16) -> u32 {
    h.write(message.as_bytes());
    h.set_status(status);
    1
}

pub(crate) fn respond_json<T: Serialize>(h: &mut dyn HttpEvent, data: &T) -> u32 {
    match serde_json::to_vec(data) {
        Ok(body) => {
            h.set_header("Content-Type", "application/json");
            h.write(&body);
            h.set_status(200);
            0
        }
        Err(err) => {
            log::error!("response serialization failed: {err}");
            respond_error(h, r#"{"error":"failed to encode response"}"#, 500)
        }
    }
}

/// Optional `room` parameter: absent defaults, invalid answers 400.
pub(crate) fn room_param(h: &mut dyn HttpEvent) -> Result<String, u32> {
    let room = h.query("room").unwrap_or_default();
    crate::common::normalize_room(&room)
        .map_err(|err| respond_error(h, &err.to_string(), 400))
}

/// Required `room` parameter: absent or invalid answers 400.
pub(crate) fn room_param_required(h: &mut dyn HttpEvent) -> Result<String, u32> {
    let Some(room) = h.query("room") else {
        return Err(respond_error(h, "room parameter required", 400));
    };
    crate::common::normalize_room(&room)
        .map_err(|err| respond_error(h, &err.to_string(), 400))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;

    use super::HttpEvent;

    /// Records what a handler wrote, standing in for the dispatcher.
    #[derive(Default)]
    pub struct RecordedEvent {
        pub params: HashMap<String, String>,
        pub headers: HashMap<String, String>,
        pub body: Vec<u8>,
        pub status: Option<u16>,
    }

    impl RecordedEvent {
        pub fn with_params(params: &[(&str, &str)]) -> Self {
            Self {
                params: params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                ..Self::default()
            }
        }

        pub fn body_str(&self) -> &str {
            std::str::from_utf8(&self.body).unwrap()
        }
    }

    impl HttpEvent for RecordedEvent {
        fn query(&self, name: &str) -> Option<String> {
            self.params.get(name).cloned()
        }

        fn set_header(&mut self, name: &str, value: &str) {
            self.headers.insert(name.to_string(), value.to_string());
        }

        fn write(&mut self, body: &[u8]) {
            self.body.extend_from_slice(body);
        }

        fn set_status(&mut self, status: u16) {
            self.status = Some(status);
        }
    }
}
