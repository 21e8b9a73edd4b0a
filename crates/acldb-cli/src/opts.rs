//! Global options and argument validation.

use std::time::Duration;

use acldb_host::HostConfig;
use acldb_kernel::KernelConfig;
use acldb_lang::lexical::is_valid_string_body;
use clap::Args;

/// Longest accepted command-line argument.
pub const MAX_ARG_LEN: usize = 4096;

/// Options shared by every command; each can also come from the environment.
#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Initial admin password (env: ACLDB_ADMIN_PASSWORD)
    #[arg(
        long,
        global = true,
        env = "ACLDB_ADMIN_PASSWORD",
        value_parser = parse_password,
        hide_env_values = true
    )]
    pub admin_password: Option<String>,

    /// Time a client has to deliver a full program, in milliseconds (env: ACLDB_TIMEOUT_MS)
    #[arg(long, global = true, env = "ACLDB_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Largest accepted program in bytes (env: ACLDB_MAX_PROGRAM_BYTES)
    #[arg(long, global = true, env = "ACLDB_MAX_PROGRAM_BYTES")]
    pub max_program_bytes: Option<usize>,
}

impl GlobalOpts {
    pub fn kernel_config(&self) -> KernelConfig {
        match &self.admin_password {
            Some(password) => KernelConfig {
                admin_password: password.clone(),
            },
            None => KernelConfig::default(),
        }
    }

    /// Host configuration for `port`; `password` wins over `--admin-password`.
    pub fn host_config(&self, port: u16, password: Option<&str>) -> HostConfig {
        let mut config = HostConfig::with_port(port);
        if let Some(password) = password.or(self.admin_password.as_deref()) {
            config.admin_password = password.to_string();
        }
        if let Some(ms) = self.timeout_ms {
            config.program_timeout = Duration::from_millis(ms);
        }
        if let Some(bytes) = self.max_program_bytes {
            config.max_program_bytes = bytes;
        }
        config
    }
}

fn check_len(arg: &str) -> Result<(), String> {
    if arg.len() > MAX_ARG_LEN {
        Err(format!("argument longer than {MAX_ARG_LEN} characters"))
    } else {
        Ok(())
    }
}

/// Decimal port in 1024..=65535 with no leading zero or sign.
pub fn parse_port(arg: &str) -> Result<u16, String> {
    check_len(arg)?;
    if arg.is_empty() || arg.starts_with('0') || !arg.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{arg}' is not a decimal port"));
    }
    match arg.parse::<u16>() {
        Ok(port) if port >= 1024 => Ok(port),
        _ => Err(format!("port {arg} is outside 1024-65535")),
    }
}

/// A password must be a valid string literal body.
pub fn parse_password(arg: &str) -> Result<String, String> {
    check_len(arg)?;
    if is_valid_string_body(arg) {
        Ok(arg.to_string())
    } else {
        Err("password contains characters outside [A-Za-z0-9_ ,;.?!-]".into())
    }
}
