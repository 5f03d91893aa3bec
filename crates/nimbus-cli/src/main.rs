//! Nimbus CLI binary entrypoint.
//!
//! This is the main entry point for the `nimbus` command-line tool.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use nimbus_cli::cli::{Cli, Commands};
use nimbus_cli::commands::{ConfigCommand, Context, EdgeCommand};
use nimbus_cli::config::{CliConfig, Environment, client_config, config_path};
use nimbus_cli::{CliError, GlobalFlags, Printer};
use nimbus_sdk::HttpClient;

/// Exit status after a second interrupt, as a shell reports SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbosity
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.globals.verbosity.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(run(cli));
    // A prompt read interrupted by Ctrl-C is still blocked on stdin
    runtime.shutdown_background();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        debug!("interrupt received");
        on_interrupt.cancel();
        // Blocking steps such as the kubeconfig prompt cannot observe the token
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Error: {}", CliError::Cancelled);
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });

    let env = Environment::from_process();
    let path = config_path(&env)?;
    let config = CliConfig::load(&path)?;
    let globals = GlobalFlags::resolve(&cli.globals, &env, &config)?;
    let printer = Printer::stdio(globals.verbosity);

    match cli.command {
        Commands::Config { command } => {
            let cmd = ConfigCommand::new(path, &printer);
            cmd.execute(&command, &cli.globals, globals.output_format)?;
        }
        Commands::Edge { command } => {
            let client =
                HttpClient::new(client_config(&env, &config)?).map_err(CliError::RequestFailed)?;
            let cmd = EdgeCommand::new(Context::new(&client, &printer, &globals, &cancel));
            cmd.execute(&command).await?;
        }
    }
    Ok(())
}
