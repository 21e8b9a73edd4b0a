use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use acldb_kernel::KernelConfig;

pub const DEFAULT_PORT: u16 = 1024;
pub const DEFAULT_MAX_PROGRAM_BYTES: usize = 1_000_000;
pub const DEFAULT_PROGRAM_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Loopback address the server listens on.
    pub bind: SocketAddr,
    /// Largest accepted program, terminator included.
    pub max_program_bytes: usize,
    /// Time a client has, from connecting, to deliver a complete program.
    pub program_timeout: Duration,
    pub admin_password: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            max_program_bytes: DEFAULT_MAX_PROGRAM_BYTES,
            program_timeout: DEFAULT_PROGRAM_TIMEOUT,
            admin_password: KernelConfig::default().admin_password,
        }
    }
}

impl HostConfig {
    pub fn with_port(port: u16) -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, port)),
            ..Self::default()
        }
    }

    pub fn kernel_config(&self) -> KernelConfig {
        KernelConfig {
            admin_password: self.admin_password.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_protocol_limits() {
        let config = HostConfig::with_port(4000);
        assert_eq!(config.bind.to_string(), "127.0.0.1:4000");
        assert_eq!(config.max_program_bytes, 1_000_000);
        assert_eq!(config.program_timeout, Duration::from_secs(30));
        assert_eq!(config.kernel_config().admin_password, "admin");
    }
}
