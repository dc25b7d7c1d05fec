// ── SftpClient – session lifecycle ────────────────────────────────────────────

use crate::sftp::credential::Credential;
use crate::sftp::endpoint::Endpoint;
use crate::sftp::environment::EnvironmentGuard;
use crate::sftp::error::{ResultCode, SftpError, SftpResult};
use crate::sftp::prompt::{ConsolePrompter, Prompter};
use crate::sftp::ssh2_transport::Ssh2Transport;
use crate::sftp::transport::{Transport, TransportSession};
use crate::sftp::types::{ClientConfig, SessionInfo, SessionState};
use chrono::Utc;
use log::{debug, info, warn};
use secrecy::ExposeSecret;

pub(crate) type FsOf<T> = <<T as Transport>::Session as TransportSession>::Fs;

/// One SFTP session against one endpoint with one credential.
///
/// `init` walks the session from `Unconnected` to `TransferReady`; every
/// file and directory operation refuses to run in any other state.
/// `shutdown` (also run on drop) releases the SFTP subsystem, the SSH
/// session, the socket and the process-wide environment hold, in that order.
pub struct SftpClient<T: Transport = Ssh2Transport> {
    transport: T,
    endpoint: Endpoint,
    credential: Credential,
    pub(crate) config: ClientConfig,
    prompter: Box<dyn Prompter>,
    state: SessionState,
    sftp: Option<FsOf<T>>,
    session: Option<T::Session>,
    stream: Option<T::Stream>,
    environment: Option<EnvironmentGuard>,
    info: Option<SessionInfo>,
}

impl SftpClient<Ssh2Transport> {
    pub fn new(endpoint: Endpoint, credential: Credential) -> Self {
        Self::with_transport(Ssh2Transport::default(), endpoint, credential)
    }
}

impl<T: Transport> SftpClient<T> {
    pub fn with_transport(transport: T, endpoint: Endpoint, credential: Credential) -> Self {
        Self {
            transport,
            endpoint,
            credential,
            config: ClientConfig::default(),
            prompter: Box::new(ConsolePrompter::stdio()),
            state: SessionState::Unconnected,
            sftp: None,
            session: None,
            stream: None,
            environment: None,
            info: None,
        }
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the console prompter used for keyboard-interactive auth.
    pub fn with_prompter(mut self, prompter: impl Prompter + 'static) -> Self {
        self.prompter = Box::new(prompter);
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state == SessionState::TransferReady
    }

    pub fn session_info(&self) -> Option<&SessionInfo> {
        self.info.as_ref()
    }

    // ── Init ─────────────────────────────────────────────────────────────────

    pub fn init(&mut self) -> SftpResult<()> {
        match self.state {
            SessionState::TransferReady => return Ok(()),
            SessionState::Closed => return Err(SftpError::not_initialized()),
            _ => {}
        }

        if !self.endpoint.is_valid() {
            return Err(SftpError::new(
                ResultCode::InvalidEndpoint,
                "endpoint has no user, expected user@host:port",
            ));
        }

        self.try_init().map_err(|e| {
            warn!("SFTP init to {} failed: {}", self.endpoint, e);
            self.shutdown();
            e
        })
    }

    /// Resources are held in locals until the session is ready, so an early
    /// return drops them in reverse acquisition order.
    fn try_init(&mut self) -> SftpResult<()> {
        let addr = self.endpoint.socket_addr();

        let environment = self
            .transport
            .environment()
            .acquire()
            .map_err(|e| SftpError::new(ResultCode::EnvironmentInitFailed, e))?;

        let stream = self.transport.connect(addr, &self.config).map_err(|e| {
            SftpError::new(
                ResultCode::ConnectionFailed,
                format!("TCP connection to {} failed: {}", addr, e),
            )
        })?;
        self.transition(SessionState::SocketConnected);

        let mut session = self.transport.new_session().map_err(|e| {
            SftpError::new(
                ResultCode::SessionInitFailed,
                format!("Failed to create SSH session: {}", e),
            )
        })?;
        session.configure(&self.config);
        session.handshake(&stream).map_err(|e| {
            SftpError::new(
                ResultCode::HandshakeFailed,
                format!("SSH handshake failed: {}", e),
            )
        })?;
        self.transition(SessionState::TransportHandshaked);

        let fingerprint = session.host_key_fingerprint();
        if let Some(ref fp) = fingerprint {
            info!("SFTP host key for {}: {}", addr, fp);
        }

        let auth_method = self.authenticate(&mut session)?;
        self.transition(SessionState::Authenticated);

        let sftp = session.open_sftp().map_err(|e| {
            SftpError::new(
                ResultCode::SftpInitFailed,
                format!("Failed to open SFTP channel: {}", e),
            )
        })?;

        self.environment = Some(environment);
        self.stream = Some(stream);
        self.session = Some(session);
        self.sftp = Some(sftp);
        self.info = Some(SessionInfo {
            host: self.endpoint.host.to_string(),
            port: self.endpoint.port,
            username: self.endpoint.user.clone(),
            auth_method: auth_method.to_string(),
            host_key_fingerprint: fingerprint,
            connected_at: Utc::now(),
            bytes_read: 0,
            bytes_written: 0,
            operations_count: 0,
        });
        self.transition(SessionState::TransferReady);

        info!(
            "SFTP connected to {} as {} via {}",
            addr, self.endpoint.user, auth_method
        );
        Ok(())
    }

    fn authenticate(&mut self, session: &mut T::Session) -> SftpResult<&'static str> {
        let user = self.endpoint.user.as_str();
        let method = self.credential.method_name();

        match session.auth_methods(user) {
            None if session.is_authenticated() => {
                info!("SFTP server accepted 'none' authentication for {}", user);
                return Ok("none");
            }
            None => {
                return Err(SftpError::new(
                    ResultCode::NoAuthMethods,
                    "server advertised no authentication methods",
                ));
            }
            Some(list) => {
                debug!("SFTP auth methods offered to {}: {}", user, list);
                if !list.split(',').any(|m| m.trim() == method) {
                    return Err(SftpError::new(
                        ResultCode::NoAuthMethods,
                        format!("server does not offer '{}' (offers: {})", method, list),
                    ));
                }
            }
        }

        let result = match &self.credential {
            Credential::Password { secret } => session.auth_password(user, secret.expose_secret()),
            Credential::PublicKey { private_key, .. } => session.auth_public_key(
                user,
                private_key.expose_secret(),
                self.credential.passphrase(),
            ),
            Credential::KeyboardInteractive => {
                session.auth_keyboard_interactive(user, self.prompter.as_mut())
            }
        };

        let code = self.credential.failure_code();
        if let Err(e) = result {
            return Err(SftpError::new(code, format!("{} {}", code.describe(), e)));
        }
        if !session.is_authenticated() {
            return Err(SftpError::new(
                code,
                "Authentication failed, not authenticated after auth attempt",
            ));
        }

        info!("SFTP authenticated {} via {}", user, method);
        Ok(method)
    }

    fn transition(&mut self, next: SessionState) {
        debug!("SFTP {} {} -> {}", self.endpoint, self.state, next);
        self.state = next;
    }

    // ── Shutdown ─────────────────────────────────────────────────────────────

    /// Release everything still held. Safe to call repeatedly and from any
    /// state; once closed the client cannot be re-initialised.
    pub fn shutdown(&mut self) {
        if self.sftp.take().is_some() {
            debug!("SFTP subsystem released");
        }
        if self.session.take().is_some() {
            debug!("SSH session released");
        }
        if self.stream.take().is_some() {
            debug!("socket released");
        }
        self.environment.take();

        if self.state != SessionState::Closed {
            self.transition(SessionState::Closed);
            info!("SFTP session {} closed", self.endpoint);
        }
    }

    // ── Helpers for the operation modules ────────────────────────────────────

    /// The subsystem handle, or `NotInitialized` without touching the remote.
    pub(crate) fn fs(&self) -> SftpResult<&FsOf<T>> {
        if self.state != SessionState::TransferReady {
            return Err(SftpError::not_initialized());
        }
        self.sftp.as_ref().ok_or_else(SftpError::not_initialized)
    }

    pub(crate) fn record(&mut self, bytes_read: u64, bytes_written: u64) {
        if let Some(info) = self.info.as_mut() {
            info.bytes_read += bytes_read;
            info.bytes_written += bytes_written;
            info.operations_count += 1;
        }
    }
}

impl<T: Transport> Drop for SftpClient<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
