//! Client descriptors, the registry that holds them, and detection.
//!
//! A client is an external application (desktop assistant, editor
//! extension) whose own configuration file embeds MCP server definitions.
//! The engine never infers client data; it only consumes descriptors.

pub mod detect;
pub mod registry;

use serde::{Deserialize, Serialize};

use crate::types::{FormatTag, PathTemplate};

pub use detect::ClientDetector;
pub use registry::ClientRegistry;

/// Static description of one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDescriptor {
    pub id: String,
    pub display_name: String,
    pub path_template: PathTemplate,
    pub format: FormatTag,
}

impl ClientDescriptor {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        path_template: PathTemplate,
        format: FormatTag,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            path_template,
            format,
        }
    }
}
