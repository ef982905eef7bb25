//! Upload local files into a fresh, randomly named directory on a remote
//! host over SFTP, authenticating through the running SSH agent.

pub mod cli;
pub mod sftp;
pub mod ssh;
pub mod upload;

#[cfg(test)]
mod test_support;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
///
/// Logs go to stderr; stdout carries only the resulting remote path.
/// `RUST_LOG` overrides the default level.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "sftp_drop=debug,info" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
