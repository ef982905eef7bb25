//! Known hosts management for SSH host key verification
//!
//! Lookups and appends go through russh's known_hosts reader, which matches
//! both plain and hashed (`|1|salt|hash`) host patterns.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use russh::keys::known_hosts::{known_host_keys_path, learn_known_hosts_path};
use russh::keys::{PublicKey, PublicKeyBase64};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::error::SshError;

/// Result of host key verification
#[derive(Debug, Clone, PartialEq)]
pub enum HostKeyVerification {
    /// Key matches known_hosts entry
    Verified,
    /// Host not in known_hosts (first connection)
    Unknown { fingerprint: String },
    /// Key changed from known_hosts entry
    Changed {
        /// 1-based line of the conflicting entry
        line: usize,
        expected_fingerprint: String,
        actual_fingerprint: String,
    },
}

/// Known hosts store backed by an OpenSSH known_hosts file
pub struct KnownHostsStore {
    path: PathBuf,
}

impl Default for KnownHostsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KnownHostsStore {
    /// Use `~/.ssh/known_hosts`
    pub fn new() -> Self {
        let path = dirs::home_dir()
            .map(|h| h.join(".ssh").join("known_hosts"))
            .unwrap_or_else(|| PathBuf::from("~/.ssh/known_hosts"));
        Self::with_path(path)
    }

    /// Use a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// SHA256 fingerprint of a public key, OpenSSH style
    pub fn fingerprint(key: &PublicKey) -> String {
        let hash = Sha256::digest(key.public_key_bytes());
        format!("SHA256:{}", BASE64.encode(hash).trim_end_matches('='))
    }

    /// Verify a host's public key.
    ///
    /// A recorded key of the same algorithm that differs is `Changed`; a host
    /// only known under other algorithms is `Unknown`. An unparseable key on
    /// a line naming this host is an error.
    pub fn verify(
        &self,
        host: &str,
        port: u16,
        key: &PublicKey,
    ) -> Result<HostKeyVerification, SshError> {
        let host = host.to_lowercase();
        let recorded = known_host_keys_path(&host, port, &self.path)?;

        if recorded.iter().any(|(_, k)| k.key_data() == key.key_data()) {
            debug!("Host key verified for {}:{} ({})", host, port, key.algorithm());
            return Ok(HostKeyVerification::Verified);
        }

        let fingerprint = Self::fingerprint(key);
        match recorded.iter().find(|(_, k)| k.algorithm() == key.algorithm()) {
            Some((line, stored)) => Ok(HostKeyVerification::Changed {
                line: *line,
                expected_fingerprint: Self::fingerprint(stored),
                actual_fingerprint: fingerprint,
            }),
            None => {
                if recorded.is_empty() {
                    debug!("Unknown host: {}:{}", host, port);
                } else {
                    debug!("Host {}:{} known but no {} key stored", host, port, key.algorithm());
                }
                Ok(HostKeyVerification::Unknown { fingerprint })
            }
        }
    }

    /// Append a host key to the file
    pub fn add_host(&self, host: &str, port: u16, key: &PublicKey) -> Result<(), SshError> {
        learn_known_hosts_path(&host.to_lowercase(), port, key, &self.path)?;
        info!("Added host key for {}:{} ({}) to known_hosts", host, port, key.algorithm());
        Ok(())
    }
}

/// Global singleton for known hosts
static KNOWN_HOSTS: std::sync::OnceLock<KnownHostsStore> = std::sync::OnceLock::new();

/// Get the global known hosts store
pub fn get_known_hosts() -> &'static KnownHostsStore {
    KNOWN_HOSTS.get_or_init(KnownHostsStore::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use russh::keys::ssh_key::public::{Ed25519PublicKey, KeyData};
    use std::fs;
    use tempfile::tempdir;

    /// `ssh-keygen -H` style pattern for `files.example.com` (salt 0x01..=0x14)
    const HASHED_FILES_EXAMPLE: &str = "|1|AQIDBAUGBwgJCgsMDQ4PEBESExQ=|SLy8atYgsX6Dlu4he2VUBH6hV24=";
    /// Same salt, for `[files.example.com]:2222`
    const HASHED_FILES_EXAMPLE_2222: &str =
        "|1|AQIDBAUGBwgJCgsMDQ4PEBESExQ=|6ISQuY1s5Vd1CgS4heWphKaD+VI=";

    fn test_key(seed: u8) -> PublicKey {
        PublicKey::new(KeyData::Ed25519(Ed25519PublicKey([seed; 32])), "")
    }

    fn entry(hosts: &str, key: &PublicKey) -> String {
        format!("{} ssh-ed25519 {}\n", hosts, key.public_key_base64())
    }

    #[test]
    fn test_unknown_then_verified_after_add() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ssh").join("known_hosts");
        let store = KnownHostsStore::with_path(path.clone());
        let key = test_key(7);

        assert!(matches!(
            store.verify("files.example.com", 2222, &key).unwrap(),
            HostKeyVerification::Unknown { .. }
        ));

        store.add_host("files.example.com", 2222, &key).unwrap();
        assert_eq!(
            store.verify("files.example.com", 2222, &key).unwrap(),
            HostKeyVerification::Verified
        );

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("[files.example.com]:2222 ssh-ed25519 "));
    }

    #[test]
    fn test_changed_key_detected() {
        let dir = tempdir().unwrap();
        let store = KnownHostsStore::with_path(dir.path().join("known_hosts"));
        let original = test_key(1);
        let imposter = test_key(2);

        store.add_host("files.example.com", 22, &original).unwrap();
        match store.verify("files.example.com", 22, &imposter).unwrap() {
            HostKeyVerification::Changed {
                expected_fingerprint,
                actual_fingerprint,
                ..
            } => {
                assert_eq!(expected_fingerprint, KnownHostsStore::fingerprint(&original));
                assert_eq!(actual_fingerprint, KnownHostsStore::fingerprint(&imposter));
            }
            other => panic!("expected Changed, got {:?}", other),
        }
    }

    #[test]
    fn test_port_scoped_entries() {
        let dir = tempdir().unwrap();
        let store = KnownHostsStore::with_path(dir.path().join("known_hosts"));
        let key = test_key(3);

        store.add_host("files.example.com", 22, &key).unwrap();
        assert!(matches!(
            store.verify("files.example.com", 2200, &key).unwrap(),
            HostKeyVerification::Unknown { .. }
        ));
    }

    #[test]
    fn test_hashed_host_entry_is_matched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("known_hosts");
        let real = test_key(5);
        let imposter = test_key(6);
        fs::write(&path, entry(HASHED_FILES_EXAMPLE, &real)).unwrap();
        let store = KnownHostsStore::with_path(path);

        assert_eq!(
            store.verify("files.example.com", 22, &real).unwrap(),
            HostKeyVerification::Verified
        );
        assert!(matches!(
            store.verify("files.example.com", 22, &imposter).unwrap(),
            HostKeyVerification::Changed { line: 1, .. }
        ));
        assert!(matches!(
            store.verify("other.example.com", 22, &imposter).unwrap(),
            HostKeyVerification::Unknown { .. }
        ));
    }

    #[test]
    fn test_hashed_host_entry_with_port() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("known_hosts");
        let real = test_key(8);
        fs::write(&path, entry(HASHED_FILES_EXAMPLE_2222, &real)).unwrap();
        let store = KnownHostsStore::with_path(path);

        assert_eq!(
            store.verify("files.example.com", 2222, &real).unwrap(),
            HostKeyVerification::Verified
        );
        assert!(matches!(
            store.verify("files.example.com", 22, &real).unwrap(),
            HostKeyVerification::Unknown { .. }
        ));
    }

    #[test]
    fn test_comments_and_aliases() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("known_hosts");
        let key = test_key(9);
        let other = test_key(10);
        fs::write(
            &path,
            format!("# {}{}", entry("beta", &other), entry("alpha,beta", &key)),
        )
        .unwrap();

        let store = KnownHostsStore::with_path(path);
        assert_eq!(store.verify("beta", 22, &key).unwrap(), HostKeyVerification::Verified);
        assert_eq!(store.verify("Alpha", 22, &key).unwrap(), HostKeyVerification::Verified);
    }

    #[test]
    fn test_missing_file_is_unknown() {
        let dir = tempdir().unwrap();
        let store = KnownHostsStore::with_path(dir.path().join("absent"));
        assert!(matches!(
            store.verify("files.example.com", 22, &test_key(4)).unwrap(),
            HostKeyVerification::Unknown { .. }
        ));
    }
}
