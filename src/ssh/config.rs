//! SSH Configuration

use super::error::SshError;

/// SSH connection configuration
#[derive(Debug, Clone)]
pub struct SshConfig {
    /// Remote host address
    pub host: String,

    /// SSH port (default: 22)
    pub port: u16,

    /// Username for authentication
    pub username: String,

    /// Connection timeout in seconds
    pub timeout_secs: u64,

    /// Strict host key checking (default: false)
    /// - true: reject connections to hosts missing from known_hosts
    /// - false: trust unknown hosts on first use and record them, still reject changed keys
    pub strict_host_key_checking: bool,
}

impl SshConfig {
    /// Build a config from a `host:port` address string.
    ///
    /// A bare host means port 22. IPv6 literals must be bracketed when a
    /// port is given (`[::1]:2222`).
    pub fn from_addr(addr: &str, username: impl Into<String>) -> Result<Self, SshError> {
        let (host, port) = parse_addr(addr)?;
        Ok(Self {
            host,
            port,
            username: username.into(),
            ..Default::default()
        })
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_strict_host_key_checking(mut self, strict: bool) -> Self {
        self.strict_host_key_checking = strict;
        self
    }

    /// `host:port` form used for socket resolution and logging
    pub fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Split `host:port` into its parts.
pub fn parse_addr(addr: &str) -> Result<(String, u16), SshError> {
    let addr = addr.trim();
    if addr.is_empty() {
        return Err(SshError::InvalidAddress("empty address".to_string()));
    }

    // [v6]:port or [v6]
    if let Some(rest) = addr.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| SshError::InvalidAddress(format!("unclosed bracket in {}", addr)))?;
        let port = match tail {
            "" => default_port(),
            t => parse_port(t.strip_prefix(':').unwrap_or(t), addr)?,
        };
        return Ok((host.to_string(), port));
    }

    match addr.rsplit_once(':') {
        // Unbracketed IPv6 literal without port
        Some((host, _)) if host.contains(':') => Ok((addr.to_string(), default_port())),
        Some((host, port)) => {
            if host.is_empty() {
                return Err(SshError::InvalidAddress(format!("missing host in {}", addr)));
            }
            Ok((host.to_string(), parse_port(port, addr)?))
        }
        None => Ok((addr.to_string(), default_port())),
    }
}

fn parse_port(port: &str, addr: &str) -> Result<u16, SshError> {
    port.parse::<u16>()
        .map_err(|_| SshError::InvalidAddress(format!("invalid port in {}", addr)))
}

fn default_port() -> u16 {
    22
}

fn default_timeout() -> u64 {
    30
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: default_port(),
            username: String::new(),
            timeout_secs: default_timeout(),
            strict_host_key_checking: false,
        }
    }
}
