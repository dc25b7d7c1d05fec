// ── Types ─────────────────────────────────────────────────────────────────────

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// POSIX file-type mask and directory bit as carried in SFTP attributes.
pub const S_IFMT: u32 = 0o170000;
pub const S_IFDIR: u32 = 0o040000;
pub const S_IFREG: u32 = 0o100000;

// ── Serde default helpers ────────────────────────────────────────────────────

fn default_buffer_size() -> usize {
    4096
}
fn default_file_mode() -> i32 {
    0o644
}
fn default_dir_mode() -> i32 {
    0o755
}

// ── Client configuration ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Size of the intermediate buffer used for every read and write call.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    /// Permission bits for files created by `write_bytes`.
    #[serde(default = "default_file_mode")]
    pub file_mode: i32,
    /// Permission bits for directories created by `copy_dir` / `create_dir`.
    #[serde(default = "default_dir_mode")]
    pub dir_mode: i32,
    /// Per-call blocking timeout. `None` blocks until the remote answers.
    #[serde(default)]
    pub timeout_ms: Option<u32>,
    #[serde(default)]
    pub compress: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            file_mode: default_file_mode(),
            dir_mode: default_dir_mode(),
            timeout_ms: None,
            compress: false,
        }
    }
}

impl ClientConfig {
    /// Load a JSON config file; missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, String> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read config '{}': {}", path.display(), e))?;
        let mut config: ClientConfig = serde_json::from_str(&raw)
            .map_err(|e| format!("Invalid config '{}': {}", path.display(), e))?;
        if config.buffer_size == 0 {
            config.buffer_size = default_buffer_size();
        }
        Ok(config)
    }
}

// ── Session state machine ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Unconnected,
    SocketConnected,
    TransportHandshaked,
    Authenticated,
    TransferReady,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Unconnected => "unconnected",
            SessionState::SocketConnected => "socket-connected",
            SessionState::TransportHandshaked => "transport-handshaked",
            SessionState::Authenticated => "authenticated",
            SessionState::TransferReady => "transfer-ready",
            SessionState::Closed => "closed",
        };
        f.write_str(s)
    }
}

// ── Session info ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub auth_method: String,
    pub host_key_fingerprint: Option<String>,
    pub connected_at: DateTime<Utc>,
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub operations_count: u64,
}

// ── Directory listing / attributes ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirEntry {
    pub name: String,
}

impl DirEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// `.` and `..` are never handed to callers.
    pub fn is_dot(name: &str) -> bool {
        name == "." || name == ".."
    }
}

/// Subset of SFTP attributes returned by an fstat on an open handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAttributes {
    pub size: Option<u64>,
    pub permissions: Option<u32>,
}

impl FileAttributes {
    pub fn is_dir(&self) -> bool {
        self.permissions
            .map(|p| p & S_IFMT == S_IFDIR)
            .unwrap_or(false)
    }
}
