use std::net::SocketAddr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl HostError {
    /// True when binding failed because another process holds the port.
    pub fn is_addr_in_use(&self) -> bool {
        matches!(
            self,
            HostError::Bind { source, .. } if source.kind() == std::io::ErrorKind::AddrInUse
        )
    }
}
