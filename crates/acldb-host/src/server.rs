use std::net::SocketAddr;

use acldb_kernel::{Kernel, Status, StatusCode};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::time::{Instant, timeout_at};

use crate::buffer::{Feed, ProgramBuffer};
use crate::config::HostConfig;
use crate::error::HostError;

const READ_CHUNK: usize = 8 * 1024;

/// What a connection ended with.
enum Reply {
    Program(String),
    Overflow,
    Timeout,
    Closed,
}

/// Accepts one client at a time and runs its program on the shared kernel.
pub struct Server {
    listener: TcpListener,
    config: HostConfig,
    kernel: Kernel,
    shutdown_rx: Option<broadcast::Receiver<()>>,
}

impl Server {
    pub async fn bind(config: HostConfig) -> Result<Self, HostError> {
        let listener = TcpListener::bind(config.bind)
            .await
            .map_err(|source| HostError::Bind {
                addr: config.bind,
                source,
            })?;
        let kernel = Kernel::new(config.kernel_config());
        Ok(Self {
            listener,
            config,
            kernel,
            shutdown_rx: None,
        })
    }

    /// Stops the accept loop when a message arrives on `shutdown_tx`.
    pub fn with_shutdown(mut self, shutdown_tx: &broadcast::Sender<()>) -> Self {
        self.shutdown_rx = Some(shutdown_tx.subscribe());
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr, HostError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves until an admin `exit` commits or a shutdown signal arrives.
    pub async fn run(mut self) -> Result<(), HostError> {
        tracing::info!(addr = %self.local_addr()?, "listening");
        loop {
            let accepted = match self.shutdown_rx.as_mut() {
                Some(shutdown_rx) => tokio::select! {
                    res = self.listener.accept() => res,
                    _ = shutdown_rx.recv() => {
                        tracing::info!("shutdown requested");
                        return Ok(());
                    }
                },
                None => self.listener.accept().await,
            };
            let (stream, peer) = match accepted {
                Ok(conn) => conn,
                Err(err) => {
                    tracing::warn!(error = %err, "accept failed");
                    continue;
                }
            };

            match self.serve_connection(stream).await {
                Ok(true) => {
                    tracing::info!(%peer, "admin exit; stopping");
                    return Ok(());
                }
                Ok(false) => {}
                Err(err) => tracing::warn!(%peer, error = %err, "connection error"),
            }
        }
    }

    /// Returns true when the program asked the server to stop.
    async fn serve_connection<S>(&mut self, mut stream: S) -> Result<bool, HostError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let reply = self.receive(&mut stream).await?;
        let (output, shutdown) = match reply {
            Reply::Program(text) => {
                let outcome = self.kernel.run_program(&text);
                tracing::debug!(verdict = ?outcome.verdict, statuses = outcome.statuses.len(), "program finished");
                (outcome.to_ndjson(), outcome.shutdown)
            }
            Reply::Overflow => {
                tracing::debug!("program too large");
                (line(StatusCode::Failed), false)
            }
            Reply::Timeout => {
                tracing::debug!("client timed out");
                (line(StatusCode::Timeout), false)
            }
            Reply::Closed => return Ok(false),
        };
        // The program is already committed; a lost reply must not cancel its exit.
        if let Err(err) = deliver(&mut stream, &output).await {
            tracing::warn!(error = %err, "failed to send reply");
        }
        Ok(shutdown)
    }

    async fn receive<S>(&self, stream: &mut S) -> Result<Reply, HostError>
    where
        S: AsyncRead + Unpin,
    {
        let deadline = Instant::now() + self.config.program_timeout;
        let mut buffer = ProgramBuffer::new(self.config.max_program_bytes);
        let mut chunk = vec![0u8; READ_CHUNK];
        loop {
            let read = match timeout_at(deadline, stream.read(&mut chunk)).await {
                Ok(read) => read?,
                Err(_) => return Ok(Reply::Timeout),
            };
            if read == 0 {
                return Ok(Reply::Closed);
            }
            match buffer.push(&chunk[..read]) {
                Feed::Pending => continue,
                Feed::Ready(text) => return Ok(Reply::Program(text)),
                Feed::Overflow => return Ok(Reply::Overflow),
            }
        }
    }
}

async fn deliver<S>(stream: &mut S, output: &str) -> std::io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(output.as_bytes()).await?;
    stream.shutdown().await
}

fn line(code: StatusCode) -> String {
    Status::new(code).to_json() + "\n"
}
