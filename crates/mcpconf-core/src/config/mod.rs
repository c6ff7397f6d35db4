//! Configuration model and persistence.
//!
//! - `server`: the canonical [`ServerEntry`] model
//! - `client_config`: JSON and TOML document serializers
//! - `format`: per-format-tag normalize / denormalize
//! - `merge`: global overlay and delta computation
//! - `global`: the global overlay store

pub mod client_config;
pub mod format;
pub mod global;
pub mod merge;
pub mod server;

pub use client_config::{ConfigFormat, ConfigSerializer, serializer_for_format};
pub use format::{denormalize, normalize};
pub use global::GlobalStore;
pub use merge::{delta_against_global, overlay_servers};
pub use server::{ServerEntry, ServerMap};
