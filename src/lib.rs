//! Ingestion pipeline for a shared pixel canvas and chat room system.
//!
//! Pixel batches and chat messages arrive over pubsub channels in several
//! independently-evolved wire encodings. The pipeline decodes them with the
//! format bound to each channel, drops out-of-range pixels, and persists
//! records into a namespaced key-value store from which full canvas
//! snapshots and chat histories are rebuilt on demand.

pub mod codec;
pub mod common;
pub mod config;
pub mod handlers;
pub mod network;
pub mod service;
pub mod storage;
