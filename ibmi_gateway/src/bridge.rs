//! Orchestration: the validation gate in front of the remote session.
//!
//! Every caller-visible operation reduces to "build or accept a command
//! string, gate it, run it on a fresh session, flatten the outcome". The
//! bridge owns the ordering contract: rejected commands never reach the
//! transport, and configuration is only resolved for accepted commands.

use ibmi_gateway_core::{compile::CompileRequest, queries, validate, Verdict};
use tracing::{info, warn};

use crate::config::GatewayConfig;
use crate::env::Environment;
use crate::error::{Error, Result};
use crate::session::{RemoteOutput, Transport};

/// Flatten an error into the single human-readable outcome string the
/// tool layer returns. Nothing propagates past this point un-flattened.
#[must_use]
pub fn render_error(err: &Error) -> String {
    match err {
        Error::Security(message) => message.clone(),
        Error::Config(message) => format!("Configuration Error: {message}"),
        Error::Connection { .. } => format!("Connection Error: {err}"),
        other => format!("Execution Error: {other}"),
    }
}

pub struct ExecutionBridge<'a> {
    env: &'a dyn Environment,
    transport: &'a dyn Transport,
}

impl<'a> ExecutionBridge<'a> {
    #[must_use]
    pub fn new(env: &'a dyn Environment, transport: &'a dyn Transport) -> Self {
        Self { env, transport }
    }

    /// Gate `raw` through the validator, then run it on a fresh session.
    ///
    /// Exit points, in order: security rejection (no config read, no
    /// session), configuration error (no session), connection error,
    /// execution error, captured output. The session closes on drop on
    /// every path.
    ///
    /// # Errors
    /// One of `Error::Security`, `Error::Config`, `Error::Connection`,
    /// `Error::Execution`.
    pub fn handle(&self, raw: &str) -> Result<RemoteOutput> {
        match validate(raw) {
            Verdict::Rejected { reason } => {
                warn!(%reason, "command rejected");
                return Err(Error::Security(
                    ibmi_gateway_core::policy_message().to_string(),
                ));
            }
            Verdict::Allowed => {}
        }

        let config = GatewayConfig::from_env(self.env)?;
        let mut session = self.transport.open(&config)?;
        session.run(raw)
    }

    /// Run a raw command or query, returning one flat string.
    ///
    /// A non-empty remote stderr dominates the result even though it is
    /// not a transport failure.
    #[must_use]
    pub fn handle_to_text(&self, raw: &str) -> String {
        match self.handle(raw) {
            Ok(output) if !output.stderr.is_empty() => format!("Error: {}", output.stderr),
            Ok(output) => output.stdout,
            Err(err) => render_error(&err),
        }
    }

    /// Build and run a compile command. The rendered string goes through
    /// the same validation gate as caller text.
    #[must_use]
    pub fn compile_program(&self, request: &CompileRequest) -> String {
        let command = match request.render() {
            Ok(command) => command,
            Err(err) => return format!("Error: {err}"),
        };
        info!(verb = request.language.verb(), member = %request.member, "compiling member");
        match self.handle(&command) {
            Ok(output) if !output.stderr.is_empty() => format!("Compile Error: {}", output.stderr),
            Ok(output) => format!(
                "Compiled {} in {} successfully\n{}",
                request.program_name(),
                request.target_library(),
                output.stdout
            ),
            Err(err) => render_error(&err),
        }
    }

    /// List objects in a library (the WRKOBJPDM equivalent).
    #[must_use]
    pub fn list_library_objects(&self, library: &str, object_type: &str) -> String {
        let query = match queries::library_objects(library, object_type) {
            Ok(query) => query,
            Err(err) => return format!("Error: {err}"),
        };
        match self.handle(&query) {
            Ok(output) if !output.stderr.is_empty() => format!("Error: {}", output.stderr),
            Ok(output) if output.stdout.trim().is_empty() => {
                format!("No objects found in library {library}.")
            }
            Ok(output) => format!(
                "Objects in {library} (type {object_type}):\n{}",
                output.stdout
            ),
            Err(err) => render_error(&err),
        }
    }

    /// List members of a source file (the WRKMBRPDM equivalent).
    #[must_use]
    pub fn list_source_members(&self, library: &str, source_file: &str) -> String {
        let query = match queries::source_members(library, source_file) {
            Ok(query) => query,
            Err(err) => return format!("Error: {err}"),
        };
        match self.handle(&query) {
            Ok(output) if !output.stderr.is_empty() => format!("Error: {}", output.stderr),
            Ok(output) if output.stdout.trim().is_empty() => {
                format!("No members found in {library}/{source_file}.")
            }
            Ok(output) => format!(
                "Members in {library}/{source_file} (most recent first):\n{}",
                output.stdout
            ),
            Err(err) => render_error(&err),
        }
    }

    /// Read the full source of one member.
    #[must_use]
    pub fn read_source_member(&self, library: &str, source_file: &str, member: &str) -> String {
        let query = match queries::member_source(library, source_file, member) {
            Ok(query) => query,
            Err(err) => return format!("Error: {err}"),
        };
        match self.handle(&query) {
            Ok(output) if !output.stderr.is_empty() => format!("Error: {}", output.stderr),
            Ok(output) if output.stdout.trim().is_empty() => {
                format!("Member {library}/{source_file}.{member} is empty or does not exist.")
            }
            Ok(output) => format!(
                "Source of {library}/{source_file}.{member}:\n{}",
                output.stdout
            ),
            Err(err) => render_error(&err),
        }
    }
}
