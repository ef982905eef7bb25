//! SSH Agent authentication
//!
//! All credential material stays inside the running agent. This module only
//! asks the agent for its public identities and forwards signing challenges
//! from the server back to it.
//!
//! # Platform Support
//! - **Unix/Linux/macOS**: Unix domain socket named by `SSH_AUTH_SOCK`
//! - **Windows**: `\\.\pipe\openssh-ssh-agent` named pipe (OpenSSH for Windows)
//!
//! # Authentication Flow
//! 1. Connect to the agent socket/pipe
//! 2. Request identity list ([`AgentClient::request_identities`])
//! 3. For each key, attempt [`Handle::authenticate_publickey_with`] with [`AgentSigner`]
//! 4. The first key the server accepts completes authentication

use std::future::Future;

use russh::client::Handle;
use russh::keys::agent::client::{AgentClient, AgentStream};
use russh::keys::ssh_key;
use russh::{AgentAuthError, CryptoVec, Signer};
use tracing::{debug, info, warn};

use super::client::ClientHandler;
use super::error::SshError;

/// Environment variable naming the agent socket on Unix
pub const AGENT_SOCK_ENV: &str = "SSH_AUTH_SOCK";

type DynAgent = AgentClient<Box<dyn AgentStream + Send + Unpin + 'static>>;

/// [`Signer`] over a borrowed agent.
///
/// The key is cloned before the returned future is built so the future
/// holds no borrow of the caller's `PublicKey` across `.await`.
struct AgentSigner<'a> {
    agent: &'a mut DynAgent,
}

impl Signer for AgentSigner<'_> {
    type Error = AgentAuthError;

    fn auth_publickey_sign(
        &mut self,
        key: &ssh_key::PublicKey,
        hash_alg: Option<ssh_key::HashAlg>,
        to_sign: CryptoVec,
    ) -> impl Future<Output = Result<CryptoVec, Self::Error>> + Send {
        let key_owned = key.clone();
        async move {
            self.agent
                .sign_request(&key_owned, hash_alg, to_sign)
                .await
                .map_err(Into::into)
        }
    }
}

/// SSH agent client wrapper
pub struct SshAgentClient {
    agent: DynAgent,
}

impl SshAgentClient {
    /// Connect to the running SSH agent
    pub async fn connect() -> Result<Self, SshError> {
        #[cfg(unix)]
        {
            let sock = std::env::var_os(AGENT_SOCK_ENV).ok_or_else(|| {
                SshError::AgentNotAvailable(format!(
                    "{} is not set. Start ssh-agent and add a key with ssh-add.",
                    AGENT_SOCK_ENV
                ))
            })?;
            debug!("Connecting to SSH agent at {:?}", sock);

            let agent = AgentClient::connect_uds(&sock).await.map_err(|e| {
                SshError::AgentNotAvailable(format!(
                    "Failed to connect to SSH agent at {}: {}",
                    std::path::Path::new(&sock).display(),
                    e
                ))
            })?;
            info!("Connected to SSH agent");
            Ok(Self {
                agent: agent.dynamic(),
            })
        }

        #[cfg(windows)]
        {
            let agent = AgentClient::connect_named_pipe(r"\\.\pipe\openssh-ssh-agent")
                .await
                .map_err(|e| {
                    SshError::AgentNotAvailable(format!(
                        "Failed to connect to SSH agent via named pipe: {}. \
                         Make sure the OpenSSH Authentication Agent service is running.",
                        e
                    ))
                })?;
            info!("Connected to SSH agent via named pipe");
            Ok(Self {
                agent: agent.dynamic(),
            })
        }

        #[cfg(not(any(unix, windows)))]
        {
            Err(SshError::AgentNotAvailable(
                "SSH agent is not supported on this platform".to_string(),
            ))
        }
    }

    /// Authenticate `username` using agent-held keys, trying each in turn.
    pub async fn authenticate(
        &mut self,
        handle: &mut Handle<ClientHandler>,
        username: &str,
    ) -> Result<(), SshError> {
        let keys = self
            .agent
            .request_identities()
            .await
            .map_err(|e| SshError::AgentError(format!("Failed to list agent keys: {}", e)))?;

        if keys.is_empty() {
            return Err(SshError::AgentError(
                "SSH agent has no keys loaded. Add keys with: ssh-add".to_string(),
            ));
        }

        debug!("SSH agent reports {} key(s)", keys.len());

        let mut last_error: Option<String> = None;
        for key in &keys {
            debug!("Trying agent key: {} ({})", key.algorithm(), key.comment());

            match handle
                .authenticate_publickey_with(
                    username,
                    key.clone(),
                    None,
                    &mut AgentSigner {
                        agent: &mut self.agent,
                    },
                )
                .await
            {
                Ok(result) if result.success() => {
                    info!("Authenticated as {} with key {}", username, key.comment());
                    return Ok(());
                }
                Ok(_) => {
                    debug!("Key rejected by server: {}", key.comment());
                }
                Err(e) => {
                    warn!("Agent signing error for key {}: {}", key.comment(), e);
                    last_error = Some(e.to_string());
                }
            }
        }

        Err(SshError::AuthenticationFailed(format!(
            "no agent key was accepted by the server (tried {} key(s)){}",
            keys.len(),
            last_error
                .map(|e| format!(". Last error: {}", e))
                .unwrap_or_default()
        )))
    }
}
