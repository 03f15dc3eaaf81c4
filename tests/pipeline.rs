//! End-to-end tests: raw payloads through the pubsub handlers into an
//! in-memory store, then back out through the query services.

use serde_json::json;

use pixelroom::codec::{ChatEncoding, PixelEncoding};
use pixelroom::common::{BACKGROUND_COLOR, CANVAS_HEIGHT, CANVAS_WIDTH, DEFAULT_ROOM, PixelBatch};
use pixelroom::handlers::pubsub::{on_chat_message, on_pixel_update};
use pixelroom::service::{self, ClearTarget, WriteMode};
use pixelroom::storage::Stores;

fn pixel_payload(room: &str, pixels: &[(i32, i32, &str)]) -> Vec<u8> {
    let pixels: Vec<_> = pixels
        .iter()
        .map(|&(x, y, color)| {
            json!({"x": x, "y": y, "color": color, "userId": "u1", "username": "alice"})
        })
        .collect();
    serde_json::to_vec(&json!({"pixels": pixels, "room": room})).unwrap()
}

fn chat_payload(room: &str, id: &str, timestamp: i64) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "messageId": id,
        "userId": "u1",
        "username": "alice",
        "message": format!("message {id}"),
        "timestamp": timestamp,
        "room": room,
    }))
    .unwrap()
}

fn binary_pixels(records: &[(u16, u16, u32)]) -> Vec<u8> {
    let mut data = (records.len() as u32).to_le_bytes().to_vec();
    for &(x, y, rgb) in records {
        data.extend_from_slice(&x.to_le_bytes());
        data.extend_from_slice(&y.to_le_bytes());
        data.extend_from_slice(&rgb.to_le_bytes());
    }
    data
}

fn painted_cells(canvas: &[Vec<String>]) -> Vec<(usize, usize, String)> {
    let mut cells = Vec::new();
    for (y, row) in canvas.iter().enumerate() {
        for (x, color) in row.iter().enumerate() {
            if color != BACKGROUND_COLOR {
                cells.push((x, y, color.clone()));
            }
        }
    }
    cells
}

#[test]
fn ingested_pixel_is_visible_at_y_x() {
    let stores = Stores::in_memory().unwrap();
    let payload = pixel_payload("r1", &[(10, 5, "#ff0000")]);
    assert_eq!(
        on_pixel_update(&stores, WriteMode::Sync, PixelEncoding::Json, &payload),
        0
    );

    let canvas = service::build_canvas(&stores, "r1");
    assert_eq!(canvas.len(), CANVAS_HEIGHT);
    assert_eq!(canvas[0].len(), CANVAS_WIDTH);
    assert_eq!(canvas[5][10], "#ff0000");
    assert_eq!(painted_cells(&canvas).len(), 1);

    // a different room is untouched
    let other = service::build_canvas(&stores, "r2");
    assert!(painted_cells(&other).is_empty());
}

#[test]
fn all_wire_formats_paint_the_same_canvas() {
    let array = serde_json::to_vec(&json!([
        {"x": 3, "y": 4, "color": "#00ff00"},
        {"x": 7, "y": 8, "color": "#0000ff"}
    ]))
    .unwrap();
    let object = serde_json::to_vec(&json!({
        "pixels": [
            {"x": 3, "y": 4, "color": "#00ff00"},
            {"x": 7, "y": 8, "color": "#0000ff"}
        ]
    }))
    .unwrap();
    let compressed =
        serde_json::to_vec(&json!({"p": [[3, 4, "#00ff00"], [7, 8, "#0000ff"]], "s": "src"}))
            .unwrap();
    let binary = binary_pixels(&[(3, 4, 0x00ff00), (7, 8, 0x0000ff)]);
    let mut framed = 3u32.to_le_bytes().to_vec();
    framed.extend_from_slice(b"b-1");
    framed.extend_from_slice(&binary);

    let cases = [
        (PixelEncoding::Json, array),
        (PixelEncoding::Json, object),
        (PixelEncoding::Json, compressed),
        (PixelEncoding::Binary, binary),
        (PixelEncoding::FramedBinary, framed),
    ];

    let mut canvases = Vec::new();
    for (encoding, payload) in cases {
        let stores = Stores::in_memory().unwrap();
        assert_eq!(
            on_pixel_update(&stores, WriteMode::Sync, encoding, &payload),
            0
        );
        canvases.push(service::build_canvas(&stores, DEFAULT_ROOM));
    }
    for canvas in &canvases[1..] {
        assert_eq!(canvas, &canvases[0]);
    }
    assert_eq!(canvases[0][4][3], "#00ff00");
    assert_eq!(canvases[0][8][7], "#0000ff");
}

#[test]
fn out_of_range_pixels_are_never_persisted() {
    let stores = Stores::in_memory().unwrap();
    let payload = pixel_payload(
        "r1",
        &[(90, 0, "#111111"), (0, 90, "#222222"), (-1, 5, "#333333")],
    );
    // the batch itself succeeds; the pixels are clamped out by omission
    assert_eq!(
        on_pixel_update(&stores, WriteMode::Sync, PixelEncoding::Json, &payload),
        0
    );
    assert!(stores.canvas.list("r1").unwrap().is_empty());
    assert!(painted_cells(&service::build_canvas(&stores, "r1")).is_empty());
}

#[test]
fn binary_overrun_rejects_whole_batch() {
    let stores = Stores::in_memory().unwrap();
    // declares 3 records, carries 1
    let mut payload = 3u32.to_le_bytes().to_vec();
    payload.extend_from_slice(&binary_pixels(&[(1, 1, 0xabcdef)])[4..]);
    assert_eq!(
        on_pixel_update(&stores, WriteMode::Sync, PixelEncoding::Binary, &payload),
        1
    );
    // no partially applied pixels
    assert!(stores.canvas.list(DEFAULT_ROOM).unwrap().is_empty());
}

#[test]
fn last_write_wins_per_cell() {
    let stores = Stores::in_memory().unwrap();
    let first = pixel_payload("r1", &[(1, 1, "#111111")]);
    let second = pixel_payload("r1", &[(1, 1, "#999999")]);
    on_pixel_update(&stores, WriteMode::Sync, PixelEncoding::Json, &first);
    on_pixel_update(&stores, WriteMode::Sync, PixelEncoding::Json, &second);
    assert_eq!(stores.canvas.list("r1").unwrap().len(), 1);
    assert_eq!(service::build_canvas(&stores, "r1")[1][1], "#999999");
}

#[tokio::test]
async fn detached_write_is_awaitable() {
    let stores = Stores::in_memory().unwrap();
    let batch: PixelBatch = serde_json::from_slice(&pixel_payload("r1", &[(2, 2, "#abcdef")]))
        .unwrap();
    let task = service::ingest_pixels(&stores, WriteMode::Detached, batch).unwrap();
    assert_eq!(task.wait().await, 1);
    assert_eq!(service::build_canvas(&stores, "r1")[2][2], "#abcdef");
}

#[test]
fn chat_history_sorts_by_timestamp_then_id() {
    let stores = Stores::in_memory().unwrap();
    for (id, timestamp) in [("m-c", 30), ("m-a", 10), ("m-z", 20), ("m-b", 20)] {
        let payload = chat_payload("r1", id, timestamp);
        assert_eq!(
            on_chat_message(&stores, WriteMode::Sync, ChatEncoding::Json, &payload),
            0
        );
    }
    let ids: Vec<_> = service::list_messages(&stores, "r1")
        .into_iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(ids, vec!["m-a", "m-b", "m-z", "m-c"]);
}

#[test]
fn binary_chat_frame_lands_in_default_room() {
    let stores = Stores::in_memory().unwrap();
    let mut payload = Vec::new();
    for field in ["m1", "u1", "alice", "hello"] {
        payload.extend_from_slice(&(field.len() as u32).to_le_bytes());
        payload.extend_from_slice(field.as_bytes());
    }
    payload.extend_from_slice(&123u32.to_le_bytes());
    assert_eq!(
        on_chat_message(&stores, WriteMode::Sync, ChatEncoding::Binary, &payload),
        0
    );
    let messages = service::list_messages(&stores, DEFAULT_ROOM);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].username, "alice");
    assert_eq!(messages[0].timestamp, 123);
}

#[test]
fn clear_removes_one_room_and_namespace_only() {
    let stores = Stores::in_memory().unwrap();
    on_pixel_update(
        &stores,
        WriteMode::Sync,
        PixelEncoding::Json,
        &pixel_payload("r1", &[(1, 1, "#111111")]),
    );
    on_pixel_update(
        &stores,
        WriteMode::Sync,
        PixelEncoding::Json,
        &pixel_payload("r2", &[(2, 2, "#222222")]),
    );
    on_chat_message(
        &stores,
        WriteMode::Sync,
        ChatEncoding::Json,
        &chat_payload("r1", "m1", 1),
    );

    let deleted = service::clear_room(&stores, ClearTarget::Canvas, "r1").unwrap();
    assert_eq!(deleted, 1);
    assert!(painted_cells(&service::build_canvas(&stores, "r1")).is_empty());
    // other room and the chat namespace are unaffected
    assert_eq!(service::build_canvas(&stores, "r2")[2][2], "#222222");
    assert_eq!(service::list_messages(&stores, "r1").len(), 1);

    service::clear_room(&stores, ClearTarget::Chat, "r1").unwrap();
    assert!(service::list_messages(&stores, "r1").is_empty());
}

#[test]
fn corrupt_and_stray_records_are_skipped_on_read() {
    let stores = Stores::in_memory().unwrap();
    on_pixel_update(
        &stores,
        WriteMode::Sync,
        PixelEncoding::Json,
        &pixel_payload("r1", &[(4, 4, "#444444")]),
    );
    // corrupt payload at a valid coordinate, stray keys with bad suffixes
    stores.canvas.put("r1", "5:5", b"not json").unwrap();
    stores.canvas.put("r1", "not-a-coord", b"{}").unwrap();
    stores.canvas.put("r1", "300:300", b"{}").unwrap();
    stores.chat.put("r1", "m-bad", b"not json").unwrap();
    stores
        .chat
        .put(
            "r1",
            "m-good",
            &serde_json::to_vec(&json!({
                "messageId": "m-good", "userId": "u", "username": "n",
                "message": "hi", "timestamp": 1
            }))
            .unwrap(),
        )
        .unwrap();

    let canvas = service::build_canvas(&stores, "r1");
    assert_eq!(canvas[4][4], "#444444");
    assert_eq!(canvas[5][5], BACKGROUND_COLOR);
    assert_eq!(painted_cells(&canvas).len(), 1);

    let messages = service::list_messages(&stores, "r1");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].id, "m-good");
}
