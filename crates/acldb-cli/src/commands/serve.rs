//! `acldb serve` command.

use std::process::ExitCode;

use acldb_host::Server;
use anyhow::Result;
use clap::Args;
use tokio::sync::broadcast;

use crate::opts::{GlobalOpts, parse_password, parse_port};

/// Exit status when the port is already bound.
const EXIT_PORT_TAKEN: u8 = 63;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on (1024-65535, decimal, no leading zero)
    #[arg(value_parser = parse_port)]
    pub port: u16,

    /// Initial admin password
    #[arg(value_parser = parse_password)]
    pub password: Option<String>,
}

pub async fn cmd_serve(opts: &GlobalOpts, args: &ServeArgs) -> Result<ExitCode> {
    let config = opts.host_config(args.port, args.password.as_deref());
    let server = match Server::bind(config).await {
        Ok(server) => server,
        Err(err) if err.is_addr_in_use() => {
            tracing::error!("{err}");
            return Ok(ExitCode::from(EXIT_PORT_TAKEN));
        }
        Err(err) => return Err(err.into()),
    };

    let (shutdown_tx, _) = broadcast::channel(1);
    let server = server.with_shutdown(&shutdown_tx);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(());
        }
    });

    server.run().await?;
    Ok(ExitCode::SUCCESS)
}
