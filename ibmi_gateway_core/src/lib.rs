//! IBM i Gateway Core - command validation engine and builders
//!
//! This crate holds the pure, I/O-free half of the gateway: the lexical
//! allowlist/denylist classifier that gates every outbound command, the
//! compile-command builders, and the Db2 for i catalog query builders.
//! Nothing here opens a connection or reads the environment.

pub mod compile;
pub mod errors;
pub mod names;
pub mod queries;
pub mod validate;

pub use compile::{CompileRequest, Language};
pub use errors::{Error, Result};
pub use validate::{policy_message, validate, Verdict};
