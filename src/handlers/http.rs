//! HTTP query handlers: canvas snapshot, chat history, room clear, and
//! channel URL resolution.

use crate::service::{self, ClearTarget};
use crate::storage::Stores;

use super::{
    ChannelProvider, HttpEvent, respond_error, respond_json, room_param, room_param_required,
    set_cors_headers,
};

/// `GET ?room=` — the full 90x90 grid for a room as a JSON 2-D array.
pub fn get_canvas(h: &mut dyn HttpEvent, stores: &Stores) -> u32 {
    set_cors_headers(h);
    let room = match room_param_required(h) {
        Ok(room) => room,
        Err(status) => return status,
    };
    log::debug!("get_canvas room={room}");
    let canvas = service::build_canvas(stores, &room);
    respond_json(h, &canvas)
}

/// `GET ?room=` — the room's chat history, ascending by timestamp.
pub fn get_messages(h: &mut dyn HttpEvent, stores: &Stores) -> u32 {
    set_cors_headers(h);
    let room = match room_param_required(h) {
        Ok(room) => room,
        Err(status) => return status,
    };
    log::debug!("get_messages room={room}");
    let messages = service::list_messages(stores, &room);
    respond_json(h, &messages)
}

/// `GET ?type=canvas|chat&room=` — bulk delete of a room's namespace.
pub fn clear_data(h: &mut dyn HttpEvent, stores: &Stores) -> u32 {
    set_cors_headers(h);
    let room = match room_param(h) {
        Ok(room) => room,
        Err(status) => return status,
    };
    let Some(target) = h.query("type") else {
        return respond_error(h, "type parameter required (canvas or chat)", 400);
    };
    let Ok(target) = target.parse::<ClearTarget>() else {
        return respond_error(h, "type must be 'canvas' or 'chat'", 400);
    };
    match service::clear_room(stores, target, &room) {
        Ok(_) => {
            let body = match target {
                ClearTarget::Canvas => "Canvas cleared",
                ClearTarget::Chat => "Chat cleared",
            };
            h.write(body.as_bytes());
            h.set_status(200);
            0
        }
        Err(err) => respond_error(h, &err.to_string(), 500),
    }
}

/// `GET ?channel=` — subscribes the channel and returns its transport URL
/// as plain text.
pub fn get_channel_url(h: &mut dyn HttpEvent, channels: &dyn ChannelProvider) -> u32 {
    set_cors_headers(h);
    let Some(channel) = h.query("channel") else {
        return respond_error(h, "channel parameter required", 400);
    };
    if let Err(err) = channels.subscribe(&channel) {
        return respond_error(h, &err.to_string(), 500);
    }
    match channels.channel_url(&channel) {
        Ok(url) => {
            h.set_header("Content-Type", "text/plain");
            h.write(url.as_bytes());
            h.set_status(200);
            0
        }
        Err(err) => respond_error(h, &err.to_string(), 500),
    }
}
