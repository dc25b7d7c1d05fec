use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use minsftp_sftp::sftp::transport::Transport;
use minsftp_sftp::sftp::{
    ClientConfig, ConsolePrompter, Credential, Endpoint, ResultCode, ScriptedPrompter, SftpClient,
    SftpError, SftpResult,
};

/// minsftp - minimal SFTP client for whole-file and whole-tree operations.
#[derive(Parser, Debug)]
#[command(name = "minsftp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a JSON client configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Remote endpoint as user@ipv4:port
    pub endpoint: String,

    #[command(flatten)]
    pub auth: AuthArgs,

    /// Operation to run once the session is ready
    #[command(subcommand)]
    pub command: Commands,
}

/// Exactly one mechanism is used; a key wins over keyboard-interactive,
/// which wins over a password.
#[derive(Args, Debug, Clone, Default)]
pub struct AuthArgs {
    /// Password authentication
    #[arg(long, env = "MINSFTP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Private key file for public key authentication
    #[arg(long, value_name = "FILE")]
    pub key: Option<PathBuf>,

    /// Passphrase for an encrypted private key
    #[arg(long, env = "MINSFTP_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,

    /// Keyboard-interactive authentication
    #[arg(long)]
    pub keyboard_interactive: bool,

    /// Preset keyboard-interactive answer, in prompt order (repeatable).
    /// Without any, prompts are answered on the terminal.
    #[arg(long = "kbd-response", value_name = "ANSWER")]
    pub kbd_responses: Vec<String>,
}

impl AuthArgs {
    /// `None` when no mechanism was selected.
    pub fn credential(&self) -> Option<SftpResult<Credential>> {
        if let Some(ref key) = self.key {
            let passphrase = self.passphrase.clone().unwrap_or_default();
            return Some(Credential::public_key_from_file(key, passphrase));
        }
        if self.keyboard_interactive {
            return Some(Ok(Credential::keyboard_interactive()));
        }
        self.password
            .as_ref()
            .map(|pw| Ok(Credential::password(pw.clone())))
    }
}

/// Available remote operations.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List a remote directory
    Ls { path: String },

    /// Print a remote file to stdout
    Cat {
        path: String,
        /// Append a NUL byte unless the content already ends in one
        #[arg(long)]
        null_terminate: bool,
    },

    /// Download a remote file
    Get { remote: String, local: PathBuf },

    /// Upload a local file (created or truncated remotely)
    Put { local: PathBuf, remote: String },

    /// Rename or move a remote path
    Mv { old: String, new: String },

    /// Delete a remote file
    Rm { path: String },

    /// Delete a remote directory and everything below it
    Rmdir { path: String },

    /// Copy a remote file
    Cp { old: String, new: String },

    /// Copy a remote directory tree
    Cpdir { old: String, new: String },

    /// Create a remote directory
    Mkdir { path: String },

    /// Report whether a remote path is a directory
    Isdir { path: String },

    /// SHA-256 of a remote file
    Sha256 { path: String },

    /// Print session details as JSON
    Info,
}

fn local_io(path: &std::path::Path, e: impl std::fmt::Display) -> SftpError {
    SftpError::new(
        ResultCode::LocalIoFailed,
        format!("local file '{}': {}", path.display(), e),
    )
    .with_path(path.display().to_string())
}

/// Load the config file named on the command line, or the defaults.
pub fn load_config(cli: &Cli) -> SftpResult<ClientConfig> {
    match cli.config {
        Some(ref path) => ClientConfig::load(path).map_err(|e| local_io(path, e)),
        None => Ok(ClientConfig::default()),
    }
}

/// Build the client described by `cli`, with the production transport.
pub fn build_client(cli: &Cli, credential: Credential) -> SftpResult<SftpClient> {
    let endpoint: Endpoint = cli.endpoint.parse()?;
    let config = load_config(cli)?;
    let client = SftpClient::new(endpoint, credential).with_config(config);
    Ok(if cli.auth.kbd_responses.is_empty() {
        client.with_prompter(ConsolePrompter::stdio())
    } else {
        client.with_prompter(ScriptedPrompter::new(cli.auth.kbd_responses.clone()))
    })
}

/// Run one command against a ready client, writing results to `out`.
pub fn execute<T: Transport>(
    client: &mut SftpClient<T>,
    command: &Commands,
    out: &mut dyn Write,
) -> SftpResult<()> {
    let stdout_err = |e: std::io::Error| {
        SftpError::new(ResultCode::LocalIoFailed, format!("stdout: {}", e))
    };

    match command {
        Commands::Ls { path } => {
            for entry in client.list_directory(path)? {
                writeln!(out, "{}", entry.name).map_err(stdout_err)?;
            }
        }
        Commands::Cat {
            path,
            null_terminate,
        } => {
            let data = client.read_bytes(path, *null_terminate)?;
            out.write_all(&data).map_err(stdout_err)?;
        }
        Commands::Get { remote, local } => {
            let data = client.read_bytes(remote, false)?;
            std::fs::write(local, &data).map_err(|e| local_io(local, e))?;
            writeln!(out, "{} bytes", data.len()).map_err(stdout_err)?;
        }
        Commands::Put { local, remote } => {
            let data = std::fs::read(local).map_err(|e| local_io(local, e))?;
            client.write_bytes(remote, &data)?;
            writeln!(out, "{} bytes", data.len()).map_err(stdout_err)?;
        }
        Commands::Mv { old, new } => client.rename(old, new)?,
        Commands::Rm { path } => client.delete_file(path)?,
        Commands::Rmdir { path } => {
            let removed = client.delete_dir(path)?;
            writeln!(out, "{} removed", removed).map_err(stdout_err)?;
        }
        Commands::Cp { old, new } => client.copy_file(old, new)?,
        Commands::Cpdir { old, new } => {
            let copied = client.copy_dir(old, new)?;
            writeln!(out, "{} files copied", copied).map_err(stdout_err)?;
        }
        Commands::Mkdir { path } => client.create_dir(path)?,
        Commands::Isdir { path } => {
            let is_dir = client.is_directory(path)?;
            writeln!(out, "{}", is_dir).map_err(stdout_err)?;
        }
        Commands::Sha256 { path } => {
            let digest = client.checksum(path)?;
            writeln!(out, "{}  {}", digest, path).map_err(stdout_err)?;
        }
        Commands::Info => {
            let info = client.session_info().ok_or_else(SftpError::not_initialized)?;
            let json = serde_json::to_string_pretty(info).map_err(|e| {
                SftpError::new(ResultCode::LocalIoFailed, format!("serialise session info: {}", e))
            })?;
            writeln!(out, "{}", json).map_err(stdout_err)?;
        }
    }
    out.flush().map_err(stdout_err)
}
