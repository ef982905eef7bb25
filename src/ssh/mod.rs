//! SSH module - authenticated connections for the uploader
//!
//! # Features
//! - SSH agent authentication (`SSH_AUTH_SOCK`)
//! - Host key verification via ~/.ssh/known_hosts (trust on first use, optional strict mode)
//! - Connection timeout and keepalive

mod agent;
mod client;
mod config;
mod error;
pub mod known_hosts;

pub use agent::{SshAgentClient, AGENT_SOCK_ENV};
pub use client::{ClientHandler, SshClient, SshSession};
pub use config::{parse_addr, SshConfig};
pub use error::SshError;
pub use known_hosts::{get_known_hosts, HostKeyVerification, KnownHostsStore};
