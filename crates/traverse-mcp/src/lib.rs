//! Traverse MCP Server
//!
//! Exposes UI automation tools (open, click, type, press key, refresh
//! traversal) to AI assistants via the Model Context Protocol (MCP).
//! Implements MCP over stdio using JSON-RPC 2.0.

pub mod args;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod options;
pub mod protocol;
pub mod server;
pub mod tools;

pub use config::Config;
pub use handler::ToolHandler;
pub use server::McpServer;
