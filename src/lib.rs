pub mod cli;

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use cli::Cli;
use minsftp_sftp::sftp::{ResultCode, SftpError};
use tracing_subscriber::EnvFilter;

/// Install the tracing subscriber. `RUST_LOG` overrides the level chosen
/// by `verbose`; `log` records from the library are bridged in.
pub fn init_logging(verbose: bool, json: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json || cfg!(feature = "logs-json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn exit_code(code: ResultCode) -> ExitCode {
    ExitCode::from(code.as_raw() as u8)
}

fn report(err: &SftpError) -> ExitCode {
    eprintln!("minsftp: {} {}", err.code.describe(), err.message);
    exit_code(err.code)
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    let credential = match cli.auth.credential() {
        Some(Ok(credential)) => credential,
        Some(Err(e)) => return report(&e),
        None => Cli::command()
            .error(
                clap::error::ErrorKind::MissingRequiredArgument,
                "one of --password, --key or --keyboard-interactive is required",
            )
            .exit(),
    };

    let mut client = match cli::build_client(&cli, credential) {
        Ok(client) => client,
        Err(e) => return report(&e),
    };

    tracing::info!("minsftp {} starting against {}", env!("CARGO_PKG_VERSION"), client.endpoint());
    if let Err(e) = client.init() {
        return report(&e);
    }

    let mut stdout = std::io::stdout().lock();
    let result = cli::execute(&mut client, &cli.command, &mut stdout);
    client.shutdown();

    match result {
        Ok(()) => {
            tracing::debug!("{:?} finished", cli.command);
            exit_code(ResultCode::Ok)
        }
        Err(e) => report(&e),
    }
}
