//! Standard paths used by the traverse server

use std::path::PathBuf;

/// Environment variable that overrides the config file location
pub const CONFIG_ENV: &str = "TRAVERSE_MCP_CONFIG";

/// Standard traverse paths
pub struct Paths {
    /// Config directory (~/.config/traverse-mcp)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("traverse-mcp");

        Self { config }
    }

    /// Config file path, honouring `TRAVERSE_MCP_CONFIG`
    pub fn config_file(&self) -> PathBuf {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => self.config.join("config.toml"),
        }
    }
}
