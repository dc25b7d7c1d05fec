// ── libssh2 transport ─────────────────────────────────────────────────────────

use crate::sftp::environment::Environment;
use crate::sftp::prompt::{KbdPrompt, Prompter};
use crate::sftp::transport::{
    RemoteDir, RemoteError, RemoteErrorKind, RemoteFile, RemoteFs, Transport, TransportSession,
};
use crate::sftp::types::{ClientConfig, FileAttributes};
use lazy_static::lazy_static;
use log::{debug, warn};
use ssh2::{ErrorCode, OpenFlags, OpenType, Session, Sftp};
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, SocketAddrV4, TcpStream};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// libssh2 error returned by `sftp_readdir` once the listing is exhausted.
const LIBSSH2_ERROR_FILE: i32 = -16;

// SFTP status codes (draft-ietf-secsh-filexfer-02 plus extensions).
const FX_NO_SUCH_FILE: i32 = 2;
const FX_PERMISSION_DENIED: i32 = 3;
const FX_NO_SUCH_PATH: i32 = 10;
const FX_FILE_ALREADY_EXISTS: i32 = 11;

lazy_static! {
    static ref SSH2_ENVIRONMENT: Arc<Environment> = Environment::new(
        "libssh2",
        || {
            ssh2::init();
            Ok(())
        },
        // libssh2_exit is registered at process exit by the bindings.
        || debug!("libssh2 released by last session"),
    );
}

impl From<ssh2::Error> for RemoteError {
    fn from(e: ssh2::Error) -> Self {
        let (kind, raw) = match e.code() {
            ErrorCode::SFTP(FX_FILE_ALREADY_EXISTS) => {
                (RemoteErrorKind::AlreadyExists, FX_FILE_ALREADY_EXISTS)
            }
            ErrorCode::SFTP(c) if c == FX_NO_SUCH_FILE || c == FX_NO_SUCH_PATH => {
                (RemoteErrorKind::NotFound, c)
            }
            ErrorCode::SFTP(FX_PERMISSION_DENIED) => {
                (RemoteErrorKind::PermissionDenied, FX_PERMISSION_DENIED)
            }
            ErrorCode::SFTP(c) | ErrorCode::Session(c) => (RemoteErrorKind::Other, c),
        };
        RemoteError::new(kind, e.message()).with_code(raw)
    }
}

/// `SHA256:<base64>` form of a raw host-key hash.
pub fn encode_fingerprint(hash: &[u8]) -> String {
    let encoded = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, hash);
    format!("SHA256:{}", encoded)
}

// ── Transport ────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Ssh2Transport {
    environment: Arc<Environment>,
}

impl Default for Ssh2Transport {
    fn default() -> Self {
        Self {
            environment: Arc::clone(&SSH2_ENVIRONMENT),
        }
    }
}

impl Transport for Ssh2Transport {
    type Stream = Ssh2Stream;
    type Session = Ssh2Session;

    fn environment(&self) -> Arc<Environment> {
        Arc::clone(&self.environment)
    }

    fn connect(&self, addr: SocketAddrV4, config: &ClientConfig) -> io::Result<Ssh2Stream> {
        let tcp = match config.timeout_ms {
            Some(ms) => {
                TcpStream::connect_timeout(&SocketAddr::V4(addr), Duration::from_millis(ms as u64))?
            }
            None => TcpStream::connect(addr)?,
        };
        tcp.set_nonblocking(false)?;
        Ok(Ssh2Stream { tcp })
    }

    fn new_session(&self) -> Result<Ssh2Session, RemoteError> {
        Ok(Ssh2Session {
            session: Session::new()?,
            handshaked: false,
        })
    }
}

// ── Stream ───────────────────────────────────────────────────────────────────

pub struct Ssh2Stream {
    tcp: TcpStream,
}

impl Drop for Ssh2Stream {
    fn drop(&mut self) {
        if let Err(e) = self.tcp.shutdown(Shutdown::Both) {
            debug!("socket shutdown: {}", e);
        }
    }
}

// ── Session ──────────────────────────────────────────────────────────────────

pub struct Ssh2Session {
    session: Session,
    handshaked: bool,
}

impl Drop for Ssh2Session {
    fn drop(&mut self) {
        if self.handshaked {
            if let Err(e) = self.session.disconnect(None, "normal Shutdown", None) {
                warn!("SSH disconnect failed: {}", e);
            }
        }
    }
}

/// Forwards libssh2's keyboard-interactive callback to a `Prompter`.
struct PromptBridge<'a> {
    inner: &'a mut dyn Prompter,
}

impl ssh2::KeyboardInteractivePrompt for PromptBridge<'_> {
    fn prompt(
        &mut self,
        name: &str,
        instructions: &str,
        prompts: &[ssh2::Prompt],
    ) -> Vec<String> {
        let prompts: Vec<KbdPrompt> = prompts
            .iter()
            .map(|p| KbdPrompt::new(p.text.to_string(), p.echo))
            .collect();
        let mut responses = self.inner.respond(name, instructions, &prompts);
        responses.resize(prompts.len(), String::new());
        responses
    }
}

impl TransportSession for Ssh2Session {
    type Stream = Ssh2Stream;
    type Fs = Ssh2Fs;

    fn configure(&mut self, config: &ClientConfig) {
        self.session.set_blocking(true);
        if let Some(ms) = config.timeout_ms {
            self.session.set_timeout(ms);
        }
        if config.compress {
            self.session.set_compress(true);
        }
    }

    fn handshake(&mut self, stream: &Ssh2Stream) -> Result<(), RemoteError> {
        self.session.set_tcp_stream(stream.tcp.try_clone()?);
        self.session.handshake()?;
        self.handshaked = true;
        Ok(())
    }

    fn host_key_fingerprint(&self) -> Option<String> {
        self.session
            .host_key_hash(ssh2::HashType::Sha256)
            .map(encode_fingerprint)
    }

    fn auth_methods(&self, user: &str) -> Option<String> {
        // libssh2 yields NULL (an error here) once "none" auth has succeeded.
        self.session.auth_methods(user).ok().map(str::to_string)
    }

    fn is_authenticated(&self) -> bool {
        self.session.authenticated()
    }

    fn auth_password(&mut self, user: &str, password: &str) -> Result<(), RemoteError> {
        Ok(self.session.userauth_password(user, password)?)
    }

    fn auth_public_key(
        &mut self,
        user: &str,
        private_key: &[u8],
        passphrase: Option<&str>,
    ) -> Result<(), RemoteError> {
        // Key material goes through a private (0600) temp file that is removed on drop.
        let mut tmp = tempfile::NamedTempFile::new()?;
        tmp.write_all(private_key)?;
        tmp.flush()?;
        let result = self
            .session
            .userauth_pubkey_file(user, None, tmp.path(), passphrase);
        drop(tmp);
        Ok(result?)
    }

    fn auth_keyboard_interactive(
        &mut self,
        user: &str,
        prompter: &mut dyn Prompter,
    ) -> Result<(), RemoteError> {
        let mut bridge = PromptBridge { inner: prompter };
        Ok(self.session.userauth_keyboard_interactive(user, &mut bridge)?)
    }

    fn open_sftp(&self) -> Result<Ssh2Fs, RemoteError> {
        Ok(Ssh2Fs {
            sftp: self.session.sftp()?,
        })
    }
}

// ── SFTP subsystem ───────────────────────────────────────────────────────────

pub struct Ssh2Fs {
    sftp: Sftp,
}

impl RemoteFs for Ssh2Fs {
    type File = Ssh2File;
    type Dir = Ssh2Dir;

    fn open_read(&self, path: &str) -> Result<Ssh2File, RemoteError> {
        let file = self
            .sftp
            .open_mode(Path::new(path), OpenFlags::READ, 0, OpenType::File)?;
        Ok(Ssh2File { file })
    }

    fn open_write(&self, path: &str, mode: i32) -> Result<Ssh2File, RemoteError> {
        let file = self.sftp.open_mode(
            Path::new(path),
            OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::TRUNCATE,
            mode,
            OpenType::File,
        )?;
        Ok(Ssh2File { file })
    }

    fn open_dir(&self, path: &str) -> Result<Ssh2Dir, RemoteError> {
        Ok(Ssh2Dir {
            file: self.sftp.opendir(Path::new(path))?,
        })
    }

    fn mkdir(&self, path: &str, mode: i32) -> Result<(), RemoteError> {
        Ok(self.sftp.mkdir(Path::new(path), mode)?)
    }

    fn rename(&self, old: &str, new: &str) -> Result<(), RemoteError> {
        Ok(self.sftp.rename(Path::new(old), Path::new(new), None)?)
    }

    fn unlink(&self, path: &str) -> Result<(), RemoteError> {
        Ok(self.sftp.unlink(Path::new(path))?)
    }

    fn rmdir(&self, path: &str) -> Result<(), RemoteError> {
        Ok(self.sftp.rmdir(Path::new(path))?)
    }
}

// ── Handles ──────────────────────────────────────────────────────────────────

pub struct Ssh2File {
    file: ssh2::File,
}

impl Read for Ssh2File {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for Ssh2File {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl RemoteFile for Ssh2File {
    fn attributes(&mut self) -> Result<FileAttributes, RemoteError> {
        let stat = self.file.stat()?;
        Ok(FileAttributes {
            size: stat.size,
            permissions: stat.perm,
        })
    }
}

pub struct Ssh2Dir {
    file: ssh2::File,
}

impl RemoteDir for Ssh2Dir {
    fn read_entry(&mut self) -> Result<Option<String>, RemoteError> {
        match self.file.readdir() {
            Ok((name, _stat)) => Ok(Some(name.to_string_lossy().into_owned())),
            Err(e) if e.code() == ErrorCode::Session(LIBSSH2_ERROR_FILE) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
