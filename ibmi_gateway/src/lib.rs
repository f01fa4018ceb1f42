//! Secure IBM i command gateway.
//!
//! Bridges tool-invoking callers (MCP agents, the CLI) to an IBM i
//! system: every command string is gated through the allowlist validator
//! in [`ibmi_gateway_core`] before a single SSH session is opened, the
//! command is executed, and the session is torn down.

pub mod bridge;
pub mod config;
pub mod env;
pub mod error;
pub mod mcp;
pub mod session;

pub use bridge::ExecutionBridge;
pub use config::GatewayConfig;
pub use error::{Error, Result};

/// Exit status and optional message a CLI subcommand hands back to main.
#[derive(Debug)]
pub struct CmdExit {
    pub code: exitcode::ExitCode,
    pub message: Option<String>,
}
