//! Shared value types: platforms, path templates and format tags.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Operating systems a path template distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Macos,
    Windows,
    Linux,
}

impl Platform {
    /// The platform this binary was compiled for. Anything that is neither
    /// macOS nor Windows uses the Linux paths.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Macos
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }
}

/// Per-OS path of a client configuration file.
///
/// Templates may start with `~/` or contain `{home}` / `{appdata}`
/// placeholders. Relative results are resolved against the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathTemplate {
    pub macos: String,
    pub windows: String,
    pub linux: String,
}

impl PathTemplate {
    pub fn new(
        macos: impl Into<String>,
        windows: impl Into<String>,
        linux: impl Into<String>,
    ) -> Self {
        Self {
            macos: macos.into(),
            windows: windows.into(),
            linux: linux.into(),
        }
    }

    /// Same path on every platform.
    pub fn uniform(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(path.clone(), path.clone(), path)
    }

    pub fn for_platform(&self, platform: Platform) -> &str {
        match platform {
            Platform::Macos => &self.macos,
            Platform::Windows => &self.windows,
            Platform::Linux => &self.linux,
        }
    }

    /// Expand the template for `platform` into a concrete path.
    pub fn resolve(&self, platform: Platform, roots: &PathRoots<'_>) -> PathBuf {
        let raw = self.for_platform(platform);
        let expanded = if let Some(rest) = raw.strip_prefix("~/") {
            roots.home.join(rest).to_string_lossy().into_owned()
        } else if raw == "~" {
            roots.home.to_string_lossy().into_owned()
        } else {
            raw.to_string()
        };
        let expanded = expanded
            .replace("{home}", &roots.home.to_string_lossy())
            .replace("{appdata}", &roots.appdata.to_string_lossy());

        let path = PathBuf::from(expanded);
        if path.is_absolute() {
            path
        } else {
            roots.project_root.join(path)
        }
    }
}

/// Base directories a [`PathTemplate`] expands against.
#[derive(Debug, Clone, Copy)]
pub struct PathRoots<'a> {
    pub home: &'a Path,
    pub appdata: &'a Path,
    pub project_root: &'a Path,
}

/// Where a client nests its servers map inside its configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatTag {
    /// JSON, `{ "mcpServers": { ... } }`
    #[serde(rename = "mcpServers")]
    McpServers,
    /// JSON, `{ "mcp": { "servers": { ... } } }`
    #[serde(rename = "mcp.servers")]
    NestedMcpServers,
    /// TOML, `[mcp_servers.<name>]` tables
    #[serde(rename = "mcp_servers")]
    TomlMcpServers,
    /// Any tag this build does not understand.
    #[serde(other)]
    Unknown,
}

impl FormatTag {
    /// Key path of the servers map, or `None` for unknown tags.
    pub fn servers_path(self) -> Option<&'static [&'static str]> {
        match self {
            FormatTag::McpServers => Some(&["mcpServers"]),
            FormatTag::NestedMcpServers => Some(&["mcp", "servers"]),
            FormatTag::TomlMcpServers => Some(&["mcp_servers"]),
            FormatTag::Unknown => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FormatTag::McpServers => "mcpServers",
            FormatTag::NestedMcpServers => "mcp.servers",
            FormatTag::TomlMcpServers => "mcp_servers",
            FormatTag::Unknown => "unknown",
        }
    }

    /// Every tag the normalizer can round-trip.
    pub fn known() -> [FormatTag; 3] {
        [
            FormatTag::McpServers,
            FormatTag::NestedMcpServers,
            FormatTag::TomlMcpServers,
        ]
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
