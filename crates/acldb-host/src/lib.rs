//! TCP boundary around the kernel: program framing, size and time limits,
//! and the accept loop.

pub mod buffer;
pub mod config;
pub mod error;
pub mod server;

pub use buffer::{Feed, ProgramBuffer};
pub use config::HostConfig;
pub use error::HostError;
pub use server::Server;
