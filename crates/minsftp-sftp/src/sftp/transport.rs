// ── Transport boundary ────────────────────────────────────────────────────────
//
// The session state machine and the tree engine only ever talk to these
// traits. Every handle type releases its remote resource in `Drop`, so the
// client's teardown order is simply the order in which it drops them.

use crate::sftp::environment::Environment;
use crate::sftp::prompt::Prompter;
use crate::sftp::types::{ClientConfig, FileAttributes};
use std::fmt;
use std::io;
use std::net::SocketAddrV4;
use std::sync::Arc;

// ── Remote error ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    AlreadyExists,
    NotFound,
    PermissionDenied,
    Other,
}

/// A failure reported by the transport or the remote server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    /// Raw library / protocol status, when there is one.
    pub code: Option<i32>,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Other, message)
    }

    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    pub fn is_already_exists(&self) -> bool {
        self.kind == RemoteErrorKind::AlreadyExists
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for RemoteError {}

impl From<io::Error> for RemoteError {
    fn from(e: io::Error) -> Self {
        let kind = match e.kind() {
            io::ErrorKind::AlreadyExists => RemoteErrorKind::AlreadyExists,
            io::ErrorKind::NotFound => RemoteErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => RemoteErrorKind::PermissionDenied,
            _ => RemoteErrorKind::Other,
        };
        RemoteError::new(kind, e.to_string())
    }
}

// ── Traits ───────────────────────────────────────────────────────────────────

/// Factory for the three resources a session acquires, in order.
pub trait Transport {
    type Stream;
    type Session: TransportSession<Stream = Self::Stream>;

    /// Process-wide environment every session must hold while alive.
    fn environment(&self) -> Arc<Environment>;

    fn connect(&self, addr: SocketAddrV4, config: &ClientConfig) -> io::Result<Self::Stream>;

    fn new_session(&self) -> Result<Self::Session, RemoteError>;
}

/// A secure-channel session over a connected stream.
pub trait TransportSession {
    type Stream;
    type Fs: RemoteFs;

    fn configure(&mut self, _config: &ClientConfig) {}

    fn handshake(&mut self, stream: &Self::Stream) -> Result<(), RemoteError>;

    /// `SHA256:<base64>` of the server host key.
    fn host_key_fingerprint(&self) -> Option<String>;

    /// Comma-separated method list, or `None` when the server sent none
    /// (which it does when "none" auth already succeeded).
    fn auth_methods(&self, user: &str) -> Option<String>;

    fn is_authenticated(&self) -> bool;

    fn auth_password(&mut self, user: &str, password: &str) -> Result<(), RemoteError>;

    fn auth_public_key(
        &mut self,
        user: &str,
        private_key: &[u8],
        passphrase: Option<&str>,
    ) -> Result<(), RemoteError>;

    fn auth_keyboard_interactive(
        &mut self,
        user: &str,
        prompter: &mut dyn Prompter,
    ) -> Result<(), RemoteError>;

    fn open_sftp(&self) -> Result<Self::Fs, RemoteError>;
}

/// The file-transfer subsystem primitives.
pub trait RemoteFs {
    type File: RemoteFile;
    type Dir: RemoteDir;

    fn open_read(&self, path: &str) -> Result<Self::File, RemoteError>;
    /// Create if absent, truncate if present.
    fn open_write(&self, path: &str, mode: i32) -> Result<Self::File, RemoteError>;
    fn open_dir(&self, path: &str) -> Result<Self::Dir, RemoteError>;
    fn mkdir(&self, path: &str, mode: i32) -> Result<(), RemoteError>;
    fn rename(&self, old: &str, new: &str) -> Result<(), RemoteError>;
    fn unlink(&self, path: &str) -> Result<(), RemoteError>;
    fn rmdir(&self, path: &str) -> Result<(), RemoteError>;
}

/// An open remote file handle.
pub trait RemoteFile: io::Read + io::Write {
    fn attributes(&mut self) -> Result<FileAttributes, RemoteError>;
}

/// An open remote directory handle.
pub trait RemoteDir {
    /// Next raw entry name (dot entries included), `Ok(None)` at the end.
    fn read_entry(&mut self) -> Result<Option<String>, RemoteError>;
}
