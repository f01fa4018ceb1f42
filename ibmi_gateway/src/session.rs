//! SSH session management for the remote system.
//!
//! One session per executed command: opened, used for exactly one
//! command, and closed when the session value drops. The [`Transport`]
//! trait is the seam between the bridge and the real `ssh2` stack; tests
//! inject [`MockTransport`] so no network is touched.

use std::io::Read;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ssh2::{MethodType, Session};
use tracing::debug;

use crate::config::{GatewayConfig, AUTH_TIMEOUT_SECS};
use crate::error::{Error, Result};

/// Captured output streams of one remote command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Opens authenticated sessions to the remote system.
pub trait Transport: Send + Sync {
    /// Establish one authenticated session.
    ///
    /// # Errors
    /// `Error::Connection` naming the failed phase (connect, handshake,
    /// auth).
    fn open(&self, config: &GatewayConfig) -> Result<Box<dyn RemoteSession>>;
}

/// One open session. Dropping the value releases the connection, so the
/// bridge gets guaranteed teardown on every exit path.
pub trait RemoteSession {
    /// Send one command, blocking until both output streams are fully
    /// captured.
    ///
    /// A non-empty stderr is remote-side data, not a transport failure;
    /// only transport errors surface as `Error::Execution`.
    fn run(&mut self, command: &str) -> Result<RemoteOutput>;
}

/// Wrap a CL command for the remote `system` utility so the native CL
/// interpreter executes it. SQL text addresses the query path directly
/// and passes through untouched.
#[must_use]
pub fn wrap_for_remote(command: &str) -> String {
    if command.trim_start().to_uppercase().starts_with("SELECT") {
        command.to_string()
    } else {
        format!("system \"{command}\"")
    }
}

// ---------------------------------------------------------------------------
// ssh2-backed implementation
// ---------------------------------------------------------------------------

/// Host-key preference pinned to the pre-RSA-SHA2 families. Older IBM i
/// releases advertise nonstandard signature algorithm sets and the
/// rsa-sha2-* negotiation fails against them.
const LEGACY_HOSTKEY_PREF: &str =
    "ssh-ed25519,ecdsa-sha2-nistp256,ecdsa-sha2-nistp384,ecdsa-sha2-nistp521,ssh-rsa";

/// Production [`Transport`] over libssh2.
pub struct SshTransport;

impl Transport for SshTransport {
    fn open(&self, config: &GatewayConfig) -> Result<Box<dyn RemoteSession>> {
        let addr = format!("{}:{}", config.host, config.port);
        let socket = addr
            .to_socket_addrs()
            .map_err(|e| connection("connect", &e))?
            .next()
            .ok_or_else(|| Error::Connection {
                phase: "connect",
                message: format!("could not resolve {addr}"),
            })?;
        let tcp = TcpStream::connect_timeout(&socket, config.connect_timeout)
            .map_err(|e| connection("connect", &e))?;

        let mut session = Session::new().map_err(|e| connection("handshake", &e))?;
        session
            .method_pref(MethodType::HostKey, LEGACY_HOSTKEY_PREF)
            .map_err(|e| connection("handshake", &e))?;
        // Blocking-call bound for handshake and auth; the legacy peer is
        // far slower here than on the TCP connect.
        session.set_timeout(u32::try_from(AUTH_TIMEOUT_SECS * 1000).unwrap_or(u32::MAX));
        session.set_tcp_stream(tcp);
        session.handshake().map_err(|e| connection("handshake", &e))?;

        session
            .userauth_password(&config.user, &config.password)
            .map_err(|e| connection("auth", &e))?;
        if !session.authenticated() {
            return Err(Error::Connection {
                phase: "auth",
                message: "authentication failed".to_string(),
            });
        }

        debug!(host = %config.host, port = config.port, "ssh session established");
        Ok(Box::new(SshSession { session }))
    }
}

fn connection(phase: &'static str, err: &dyn std::fmt::Display) -> Error {
    Error::Connection {
        phase,
        message: err.to_string(),
    }
}

struct SshSession {
    session: Session,
}

impl RemoteSession for SshSession {
    fn run(&mut self, command: &str) -> Result<RemoteOutput> {
        let wrapped = wrap_for_remote(command);
        let mut channel = self
            .session
            .channel_session()
            .map_err(|e| Error::Execution(e.to_string()))?;
        channel
            .exec(&wrapped)
            .map_err(|e| Error::Execution(e.to_string()))?;

        let mut stdout = String::new();
        channel
            .read_to_string(&mut stdout)
            .map_err(|e| Error::Execution(e.to_string()))?;
        let mut stderr = String::new();
        channel
            .stderr()
            .read_to_string(&mut stderr)
            .map_err(|e| Error::Execution(e.to_string()))?;

        channel
            .wait_close()
            .map_err(|e| Error::Execution(e.to_string()))?;
        debug!(
            exit_status = channel.exit_status().unwrap_or(-1),
            stdout_len = stdout.len(),
            stderr_len = stderr.len(),
            "remote command completed"
        );
        Ok(RemoteOutput { stdout, stderr })
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        // Best effort; idempotent from libssh2's point of view.
        let _ = self
            .session
            .disconnect(None, "session complete", None);
    }
}

// ---------------------------------------------------------------------------
// Scripted implementation (used in tests — zero network I/O)
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MockState {
    output: RemoteOutput,
    fail_open: Option<String>,
    fail_run: Option<String>,
    opens: AtomicUsize,
    commands: Mutex<Vec<String>>,
}

/// A scripted [`Transport`] for tests. Records every open and every
/// executed command so callers can assert on collaborator interactions.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<MockState>,
}

impl MockTransport {
    /// A transport whose sessions always return the given streams.
    #[must_use]
    pub fn returning(stdout: &str, stderr: &str) -> Self {
        Self {
            state: Arc::new(MockState {
                output: RemoteOutput {
                    stdout: stdout.to_string(),
                    stderr: stderr.to_string(),
                },
                ..MockState::default()
            }),
        }
    }

    /// A transport that fails while opening a session.
    #[must_use]
    pub fn failing_open(message: &str) -> Self {
        Self {
            state: Arc::new(MockState {
                fail_open: Some(message.to_string()),
                ..MockState::default()
            }),
        }
    }

    /// A transport whose sessions fail on `run`.
    #[must_use]
    pub fn failing_run(message: &str) -> Self {
        Self {
            state: Arc::new(MockState {
                fail_run: Some(message.to_string()),
                ..MockState::default()
            }),
        }
    }

    /// How many sessions have been opened.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.state.opens.load(Ordering::SeqCst)
    }

    /// Every command string handed to `run`, in order.
    #[must_use]
    pub fn executed(&self) -> Vec<String> {
        self.state.commands.lock().expect("mock lock").clone()
    }
}

impl Transport for MockTransport {
    fn open(&self, _config: &GatewayConfig) -> Result<Box<dyn RemoteSession>> {
        self.state.opens.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.state.fail_open {
            return Err(Error::Connection {
                phase: "connect",
                message: message.clone(),
            });
        }
        Ok(Box::new(MockSession {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockSession {
    state: Arc<MockState>,
}

impl RemoteSession for MockSession {
    fn run(&mut self, command: &str) -> Result<RemoteOutput> {
        self.state
            .commands
            .lock()
            .expect("mock lock")
            .push(command.to_string());
        if let Some(message) = &self.state.fail_run {
            return Err(Error::Execution(message.clone()));
        }
        Ok(self.state.output.clone())
    }
}
