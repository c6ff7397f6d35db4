//! mcpconf core library
//!
//! Reads and edits the MCP server entries that desktop assistants and editor
//! extensions keep in their own configuration files. Every client's native
//! shape is normalized into one [`config::ServerMap`], overlaid with a global
//! server store, and written back without disturbing the rest of the file.

pub mod client;
pub mod config;
pub mod context;
pub mod env_index;
pub mod error;
pub mod inventory;
pub mod manager;
pub mod propagation;
pub mod transfer;
pub mod types;

pub use context::{EngineConfig, WritePolicy};
pub use error::{ConfigError, Result};
pub use manager::{ConfigManager, EffectiveClientConfig};

/// Re-exports of commonly used types
pub mod prelude {
    pub use crate::client::{ClientDescriptor, ClientRegistry};
    pub use crate::config::{GlobalStore, ServerEntry, ServerMap};
    pub use crate::context::{EngineConfig, WritePolicy};
    pub use crate::env_index::{EnvVarIndexEntry, EnvVarLocation, mask_env_value};
    pub use crate::error::{ConfigError, Result};
    pub use crate::inventory::{ClientSummary, ServerInventoryEntry};
    pub use crate::manager::{ConfigManager, EffectiveClientConfig};
    pub use crate::propagation::{BatchResult, BatchStatus, BatchSummary, EnvTarget, RenameReport};
    pub use crate::transfer::{ConfigExport, ImportKind, ServerExport};
    pub use crate::types::{FormatTag, PathTemplate, Platform};
}
