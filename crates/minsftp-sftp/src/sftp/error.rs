//! Result codes and the SFTP error type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed outcome enumeration. Every operation maps to exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ResultCode {
    Ok = 0,
    /// Process-wide network / transport library could not start.
    EnvironmentInitFailed = 2,
    /// Endpoint string was not `user@ipv4:port`.
    InvalidEndpoint = 3,
    /// TCP connect failed.
    ConnectionFailed = 5,
    /// Transport session object could not be created.
    SessionInitFailed = 6,
    /// Banner / key exchange failed.
    HandshakeFailed = 7,
    AuthPasswordFailed = 8,
    AuthKeyboardFailed = 9,
    AuthPublicKeyFailed = 10,
    /// The server does not offer the credential's method.
    NoAuthMethods = 11,
    SftpInitFailed = 12,
    OpenFailed = 13,
    NotInitialized = 14,
    WriteFailed = 15,
    MoveFailed = 16,
    DeleteFailed = 17,
    ReadFailed = 18,
    MkdirFailed = 19,
    /// A local file (private key, config) could not be read.
    LocalIoFailed = 20,
}

impl ResultCode {
    pub const ALL: [ResultCode; 19] = [
        ResultCode::Ok,
        ResultCode::EnvironmentInitFailed,
        ResultCode::InvalidEndpoint,
        ResultCode::ConnectionFailed,
        ResultCode::SessionInitFailed,
        ResultCode::HandshakeFailed,
        ResultCode::AuthPasswordFailed,
        ResultCode::AuthKeyboardFailed,
        ResultCode::AuthPublicKeyFailed,
        ResultCode::NoAuthMethods,
        ResultCode::SftpInitFailed,
        ResultCode::OpenFailed,
        ResultCode::NotInitialized,
        ResultCode::WriteFailed,
        ResultCode::MoveFailed,
        ResultCode::DeleteFailed,
        ResultCode::ReadFailed,
        ResultCode::MkdirFailed,
        ResultCode::LocalIoFailed,
    ];

    pub fn as_raw(self) -> i32 {
        self as i32
    }

    pub fn from_raw(raw: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_raw() == raw)
    }

    pub fn is_ok(self) -> bool {
        self == ResultCode::Ok
    }

    pub fn describe(self) -> &'static str {
        match self {
            ResultCode::Ok => "Operation succeeded.",
            ResultCode::EnvironmentInitFailed => "Failed to initialize the network environment.",
            ResultCode::InvalidEndpoint => "Invalid endpoint, expected user@host:port.",
            ResultCode::ConnectionFailed => "Failed to establish a connection.",
            ResultCode::SessionInitFailed => "Failed to initialize SSH session.",
            ResultCode::HandshakeFailed => "Failed to start SSH session.",
            ResultCode::AuthPasswordFailed => "Password authentication failed.",
            ResultCode::AuthKeyboardFailed => "Keyboard-interactive authentication failed.",
            ResultCode::AuthPublicKeyFailed => "Public key authentication failed.",
            ResultCode::NoAuthMethods => "No available authentication methods.",
            ResultCode::SftpInitFailed => "Failed to initialize SFTP session.",
            ResultCode::OpenFailed => "Failed to open file via SFTP.",
            ResultCode::NotInitialized => "SFTP session not initialized.",
            ResultCode::WriteFailed => "Failed to write to file via SFTP.",
            ResultCode::MoveFailed => "Failed to move or rename file/directory.",
            ResultCode::DeleteFailed => "Failed to delete file/directory.",
            ResultCode::ReadFailed => "Failed to read from file via SFTP.",
            ResultCode::MkdirFailed => "Failed to create directory via SFTP.",
            ResultCode::LocalIoFailed => "Failed to read local file.",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Description lookup for a raw code, e.g. a process exit status.
pub fn result_to_string(raw: i32) -> &'static str {
    ResultCode::from_raw(raw)
        .map(ResultCode::describe)
        .unwrap_or("Unknown error.")
}

// ── Error ────────────────────────────────────────────────────────────────────

/// A failed operation: the result code plus whatever context the origin had.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SftpError {
    pub code: ResultCode,
    pub message: String,
    /// Remote (or local) path the failing step was working on.
    pub path: Option<String>,
}

pub type SftpResult<T> = Result<T, SftpError>;

impl SftpError {
    pub fn new(code: ResultCode, msg: impl Into<String>) -> Self {
        debug_assert!(!code.is_ok(), "SftpError built with ResultCode::Ok");
        Self {
            code,
            message: msg.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    // ── Convenience constructors ─────────────────────────────────

    pub fn not_initialized() -> Self {
        Self::new(ResultCode::NotInitialized, "sftp session is not initialized")
    }

    pub fn open_failed(path: &str, cause: impl fmt::Display) -> Self {
        Self::new(
            ResultCode::OpenFailed,
            format!("unable to open '{}': {}", path, cause),
        )
        .with_path(path)
    }

    pub fn read_failed(path: &str, cause: impl fmt::Display) -> Self {
        Self::new(
            ResultCode::ReadFailed,
            format!("error reading '{}': {}", path, cause),
        )
        .with_path(path)
    }

    pub fn write_failed(path: &str, cause: impl fmt::Display) -> Self {
        Self::new(
            ResultCode::WriteFailed,
            format!("error writing '{}': {}", path, cause),
        )
        .with_path(path)
    }

    pub fn mkdir_failed(path: &str, cause: impl fmt::Display) -> Self {
        Self::new(
            ResultCode::MkdirFailed,
            format!("mkdir '{}' failed: {}", path, cause),
        )
        .with_path(path)
    }

    pub fn move_failed(old: &str, new: &str, cause: impl fmt::Display) -> Self {
        Self::new(
            ResultCode::MoveFailed,
            format!("rename '{}' → '{}' failed: {}", old, new, cause),
        )
        .with_path(old)
    }

    pub fn delete_failed(path: &str, cause: impl fmt::Display) -> Self {
        Self::new(
            ResultCode::DeleteFailed,
            format!("delete '{}' failed: {}", path, cause),
        )
        .with_path(path)
    }
}

impl fmt::Display for SftpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[SFTP {:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for SftpError {}
