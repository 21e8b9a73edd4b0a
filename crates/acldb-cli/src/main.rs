mod commands;
mod opts;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::run::RunArgs;
use commands::serve::ServeArgs;
use opts::GlobalOpts;

/// Exit status for malformed command-line arguments.
const EXIT_INVALID_ARGS: u8 = 255;

#[derive(Parser, Debug)]
#[command(name = "acldb", version, about = "Delegatable access-control variable store")]
struct Cli {
    #[command(flatten)]
    opts: GlobalOpts,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Listen on 127.0.0.1:<PORT> and run one client program at a time
    Serve(ServeArgs),

    /// Run program files in order against a fresh in-memory store
    Run(RunArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(EXIT_INVALID_ARGS)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    setup_logging();

    let result = match &cli.command {
        Command::Serve(args) => commands::serve::cmd_serve(&cli.opts, args).await,
        Command::Run(args) => commands::run::cmd_run(&cli.opts, args),
    };
    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; stdout carries status records only.
fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
