// ── minsftp-sftp / sftp module ────────────────────────────────────────────────
//
// Layers, leaf first:
//   • endpoint / credential  – what to connect to and how to prove identity
//   • environment            – process-wide transport library lifecycle
//   • transport              – collaborator traits (stream, session, sftp)
//   • ssh2_transport         – libssh2-backed implementation of those traits
//   • service                – SftpClient state machine (init / shutdown)
//   • file_ops / dir_ops     – tree operations over the four primitives

pub mod types;
pub mod error;
pub mod endpoint;
pub mod credential;
pub mod environment;
pub mod transport;
pub mod ssh2_transport;
pub mod prompt;
pub mod service;
pub mod file_ops;
pub mod dir_ops;

#[cfg(test)]
pub(crate) mod mock;

pub use credential::Credential;
pub use endpoint::Endpoint;
pub use error::{result_to_string, ResultCode, SftpError, SftpResult};
pub use file_ops::null_terminate;
pub use prompt::{ConsolePrompter, KbdPrompt, Prompter, ScriptedPrompter};
pub use service::SftpClient;
pub use ssh2_transport::Ssh2Transport;
pub use types::*;
