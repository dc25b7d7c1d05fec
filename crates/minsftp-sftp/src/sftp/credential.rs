// ── Credential – one authentication mechanism per session ────────────────────

use crate::sftp::error::{ResultCode, SftpError, SftpResult};
use secrecy::{ExposeSecret, Secret, SecretString, SecretVec};
use std::fmt;
use std::path::Path;

/// Authentication material. The variant is fixed when the client is built.
pub enum Credential {
    Password {
        secret: SecretString,
    },
    /// Private key blob (PEM / OpenSSH format). No public half is needed.
    PublicKey {
        private_key: SecretVec<u8>,
        passphrase: SecretString,
    },
    /// Answers are gathered from the client's prompter during auth.
    KeyboardInteractive,
}

impl Credential {
    pub fn password(secret: impl Into<String>) -> Self {
        Credential::Password {
            secret: SecretString::new(secret.into()),
        }
    }

    pub fn public_key(private_key: Vec<u8>, passphrase: impl Into<String>) -> Self {
        Credential::PublicKey {
            private_key: Secret::new(private_key),
            passphrase: SecretString::new(passphrase.into()),
        }
    }

    /// Read a private key blob from local disk.
    pub fn public_key_from_file(path: &Path, passphrase: impl Into<String>) -> SftpResult<Self> {
        let data = read_private_key(path)?;
        Ok(Self::public_key(data, passphrase))
    }

    pub fn keyboard_interactive() -> Self {
        Credential::KeyboardInteractive
    }

    /// SSH method name as it appears in the server's advertised list.
    pub fn method_name(&self) -> &'static str {
        match self {
            Credential::Password { .. } => "password",
            Credential::PublicKey { .. } => "publickey",
            Credential::KeyboardInteractive => "keyboard-interactive",
        }
    }

    /// The code reported when this mechanism is rejected.
    pub fn failure_code(&self) -> ResultCode {
        match self {
            Credential::Password { .. } => ResultCode::AuthPasswordFailed,
            Credential::PublicKey { .. } => ResultCode::AuthPublicKeyFailed,
            Credential::KeyboardInteractive => ResultCode::AuthKeyboardFailed,
        }
    }

    /// Passphrase to hand to the transport; an empty one means "unencrypted key".
    pub(crate) fn passphrase(&self) -> Option<&str> {
        match self {
            Credential::PublicKey { passphrase, .. } => {
                let p = passphrase.expose_secret();
                if p.is_empty() {
                    None
                } else {
                    Some(p.as_str())
                }
            }
            _ => None,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Password { .. } => f
                .debug_struct("Password")
                .field("secret", &"[REDACTED]")
                .finish(),
            Credential::PublicKey { private_key, .. } => f
                .debug_struct("PublicKey")
                .field("private_key_len", &private_key.expose_secret().len())
                .field("passphrase", &"[REDACTED]")
                .finish(),
            Credential::KeyboardInteractive => f.write_str("KeyboardInteractive"),
        }
    }
}

/// Whole-file read of a local key file.
pub fn read_private_key(path: &Path) -> SftpResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        SftpError::new(
            ResultCode::LocalIoFailed,
            format!("failed to open private key file '{}': {}", path.display(), e),
        )
        .with_path(path.display().to_string())
    })
}
