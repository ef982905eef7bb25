//! SSH Client implementation using russh

use std::net::ToSocketAddrs;
use std::sync::Arc;
use std::time::Duration;

use russh::client::{self, Handle, Msg};
use russh::keys::PublicKey;
use russh::{Channel, Disconnect};
use tracing::{debug, info, warn};

use super::agent::SshAgentClient;
use super::config::SshConfig;
use super::error::SshError;
use super::known_hosts::{get_known_hosts, HostKeyVerification};

/// Connects and authenticates through the SSH agent
pub struct SshClient {
    config: SshConfig,
}

impl SshClient {
    pub fn new(config: SshConfig) -> Self {
        Self { config }
    }

    /// Connect to the SSH server and return an authenticated session
    pub async fn connect(self) -> Result<SshSession, SshError> {
        let addr = self.config.address();

        // Agent first, so a missing agent fails before any network traffic
        let mut agent = SshAgentClient::connect().await?;

        info!("Connecting to SSH server at {}", addr);

        let socket_addr = addr
            .to_socket_addrs()
            .map_err(|e| SshError::ConnectionFailed(format!("Failed to resolve {}: {}", addr, e)))?
            .next()
            .ok_or_else(|| SshError::ConnectionFailed(format!("No address found for {}", addr)))?;

        let ssh_config = client::Config {
            inactivity_timeout: None,
            keepalive_interval: Some(Duration::from_secs(30)),
            keepalive_max: 3,
            ..Default::default()
        };

        let handler = ClientHandler::new(
            self.config.host.clone(),
            self.config.port,
            self.config.strict_host_key_checking,
        );

        let mut handle = tokio::time::timeout(
            Duration::from_secs(self.config.timeout_secs),
            client::connect(Arc::new(ssh_config), socket_addr, handler),
        )
        .await
        .map_err(|_| SshError::Timeout(format!("Connection to {} timed out", addr)))?
        .map_err(|e| match e {
            rejected @ SshError::HostKeyRejected(_) => rejected,
            other => SshError::ConnectionFailed(other.to_string()),
        })?;

        debug!("SSH handshake completed");

        agent
            .authenticate(&mut handle, &self.config.username)
            .await?;

        Ok(SshSession { handle, addr })
    }
}

/// Authenticated SSH connection
pub struct SshSession {
    handle: Handle<ClientHandler>,
    addr: String,
}

impl SshSession {
    /// Open a plain session channel (used for subsystems)
    pub async fn open_session_channel(&self) -> Result<Channel<Msg>, SshError> {
        self.handle
            .channel_open_session()
            .await
            .map_err(|e| SshError::ChannelError(e.to_string()))
    }

    /// Disconnect from the server
    pub async fn close(self) -> Result<(), SshError> {
        debug!("Disconnecting from {}", self.addr);
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await?;
        Ok(())
    }
}

/// russh callback handler, verifies the server key against known_hosts
pub struct ClientHandler {
    host: String,
    port: u16,
    /// - true: reject unknown keys
    /// - false: trust and record unknown keys
    strict: bool,
}

impl ClientHandler {
    pub fn new(host: String, port: u16, strict: bool) -> Self {
        Self { host, port, strict }
    }
}

impl client::Handler for ClientHandler {
    type Error = SshError;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        let known_hosts = get_known_hosts();

        let verification = known_hosts
            .verify(&self.host, self.port, server_public_key)
            .map_err(|e| {
                warn!("Failed to read {}: {}", known_hosts.path().display(), e);
                SshError::HostKeyRejected(format!(
                    "cannot check key for {}:{} against {}: {}",
                    self.host,
                    self.port,
                    known_hosts.path().display(),
                    e
                ))
            })?;

        match verification {
            HostKeyVerification::Verified => {
                debug!("Host key verified for {}:{}", self.host, self.port);
                Ok(true)
            }
            HostKeyVerification::Unknown { fingerprint } if self.strict => {
                warn!(
                    "Unknown host key for {}:{} ({}), strict checking enabled",
                    self.host, self.port, fingerprint
                );
                Err(SshError::HostKeyRejected(format!(
                    "unknown host {}:{} (fingerprint {}). \
                     Add it to ~/.ssh/known_hosts or disable strict host key checking.",
                    self.host, self.port, fingerprint
                )))
            }
            HostKeyVerification::Unknown { fingerprint } => {
                info!(
                    "New host {}:{}, adding to known_hosts (fingerprint: {})",
                    self.host, self.port, fingerprint
                );
                if let Err(e) = known_hosts.add_host(&self.host, self.port, server_public_key) {
                    warn!("Failed to save host key: {}", e);
                }
                Ok(true)
            }
            HostKeyVerification::Changed {
                line,
                expected_fingerprint,
                actual_fingerprint,
            } => {
                warn!(
                    "HOST KEY CHANGED for {}:{}! Expected {}, got {}",
                    self.host, self.port, expected_fingerprint, actual_fingerprint
                );
                Err(SshError::HostKeyRejected(format!(
                    "key for {}:{} has changed! Expected: {}, Actual: {}. \
                     If the change is legitimate, remove the old key from {} (line {})",
                    self.host,
                    self.port,
                    expected_fingerprint,
                    actual_fingerprint,
                    known_hosts.path().display(),
                    line
                )))
            }
        }
    }
}
