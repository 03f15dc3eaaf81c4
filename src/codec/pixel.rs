//! Pixel batch decoders. The same logical event arrives in four wire shapes
//! that evolved independently: a bare JSON array, a JSON batch object, a
//! compressed positional-triple JSON object, and a fixed binary layout (with
//! a framed variant carrying a batch id). Each shape is its own entry point;
//! the channel config decides which one a payload is parsed as.

use serde::Deserialize;
use serde_json::Value;

use crate::common::{DEFAULT_ROOM, Pixel, PixelBatch};

use super::{ByteReader, DecodeError, PixelEncoding};

/// Bytes per binary pixel record: `u16 x + u16 y + u32 rgb`.
const PIXEL_RECORD_LEN: usize = 8;

/// Decodes a payload according to the channel's bound encoding.
pub fn decode(encoding: PixelEncoding, data: &[u8]) -> Result<PixelBatch, DecodeError> {
    match encoding {
        PixelEncoding::Json => decode_json(data),
        PixelEncoding::Binary => decode_binary(data),
        PixelEncoding::FramedBinary => decode_framed_binary(data),
    }
}

/// Ordered strategy list for JSON channels: compressed first (what live
/// senders mostly emit), then the batch object, then the bare array. A
/// compressed parse that yields no pixels falls through to the next
/// strategy rather than masking a batch object.
pub fn decode_json(data: &[u8]) -> Result<PixelBatch, DecodeError> {
    if let Ok(batch) = decode_compressed_json(data) {
        if !batch.pixels.is_empty() {
            return Ok(batch);
        }
    }
    if let Ok(batch) = decode_json_batch(data) {
        return Ok(batch);
    }
    decode_json_array(data).map_err(|_| DecodeError::Unrecognized("pixel batch"))
}

/// Format 1: bare JSON array of pixel objects. Room defaults.
pub fn decode_json_array(data: &[u8]) -> Result<PixelBatch, DecodeError> {
    let pixels: Vec<Pixel> = serde_json::from_slice(data)?;
    Ok(PixelBatch {
        pixels,
        room: DEFAULT_ROOM.to_string(),
        ..PixelBatch::default()
    })
}

/// Format 2: `{pixels, room, timestamp, batchId, sourceId}`.
pub fn decode_json_batch(data: &[u8]) -> Result<PixelBatch, DecodeError> {
    let mut batch: PixelBatch = serde_json::from_slice(data)?;
    if batch.room.is_empty() {
        batch.room = DEFAULT_ROOM.to_string();
    }
    Ok(batch)
}

#[derive(Deserialize)]
struct CompressedBatch {
    #[serde(default)]
    p: Vec<Vec<Value>>,
    #[serde(default)]
    r: String,
    #[serde(default)]
    t: i64,
    #[serde(default)]
    b: String,
    #[serde(default)]
    s: String,
}

/// Format 3: `{p: [[x, y, color], ...], r, t, b, s}`. Triples are
/// positional; entries that are not (number, number, string) are skipped.
/// The sender id `s` stands in for the per-pixel user id.
pub fn decode_compressed_json(data: &[u8]) -> Result<PixelBatch, DecodeError> {
    let compressed: CompressedBatch = serde_json::from_slice(data)?;
    let mut pixels = Vec::with_capacity(compressed.p.len());
    for triple in &compressed.p {
        if triple.len() < 3 {
            continue;
        }
        let (Some(x), Some(y), Some(color)) =
            (triple[0].as_f64(), triple[1].as_f64(), triple[2].as_str())
        else {
            continue;
        };
        pixels.push(Pixel {
            x: x as i32,
            y: y as i32,
            color: color.to_string(),
            user_id: compressed.s.clone(),
            username: "unknown".to_string(),
        });
    }
    let room = if compressed.r.is_empty() {
        DEFAULT_ROOM.to_string()
    } else {
        compressed.r
    };
    Ok(PixelBatch {
        pixels,
        room,
        timestamp: compressed.t,
        batch_id: compressed.b,
        source_id: compressed.s,
    })
}

/// Format 4: `u32 count`, then `count` records of `u16 x, u16 y, u32 rgb`,
/// all little-endian. The color is the low 24 bits rendered `#rrggbb`.
pub fn decode_binary(data: &[u8]) -> Result<PixelBatch, DecodeError> {
    let mut reader = ByteReader::new(data);
    let pixels = read_pixel_records(&mut reader)?;
    Ok(PixelBatch {
        pixels,
        room: DEFAULT_ROOM.to_string(),
        ..PixelBatch::default()
    })
}

/// Framed variant of format 4: `u32 id_len` + batch id bytes before the
/// count field.
pub fn decode_framed_binary(data: &[u8]) -> Result<PixelBatch, DecodeError> {
    let mut reader = ByteReader::new(data);
    let batch_id = reader.length_prefixed_str()?.to_string();
    let pixels = read_pixel_records(&mut reader)?;
    Ok(PixelBatch {
        pixels,
        room: DEFAULT_ROOM.to_string(),
        batch_id,
        ..PixelBatch::default()
    })
}

fn read_pixel_records(reader: &mut ByteReader<'_>) -> Result<Vec<Pixel>, DecodeError> {
    let count = reader.u32_le()? as usize;
    let declared = count
        .checked_mul(PIXEL_RECORD_LEN)
        .ok_or(DecodeError::MalformedField("pixel count"))?;
    // Reject the whole batch before reading a single record; no partial
    // acceptance when the declared count overruns the buffer.
    if declared > reader.remaining() {
        return Err(DecodeError::Truncated {
            needed: declared,
            remaining: reader.remaining(),
        });
    }
    let mut pixels = Vec::with_capacity(count);
    for _ in 0..count {
        let x = reader.u16_le()? as i32;
        let y = reader.u16_le()? as i32;
        let rgb = reader.u32_le()?;
        pixels.push(Pixel {
            x,
            y,
            color: format!("#{:06x}", rgb & 0x00ff_ffff),
            user_id: "unknown".to_string(),
            username: "unknown".to_string(),
        });
    }
    Ok(pixels)
}
