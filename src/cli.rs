//! Command line interface

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;

use crate::ssh::{SshConfig, SshError};
use crate::upload::{NamingPolicy, UploadError, UploadReport, UploadRequest};

/// Flags that may also be spelled with a single dash (`-user alice`)
const SINGLE_DASH_FLAGS: &[&str] = &["user", "addr", "dir", "url", "long", "timeout"];

/// Boolean flags that also take an explicit value (`-long=false`)
const BOOL_FLAGS: &[&str] = &["long"];

/// Upload files to a new randomly named directory on a remote server via SSH.
///
/// Each invocation creates a fresh subdirectory under the remote directory
/// and prints its path.
#[derive(Parser, Debug)]
#[command(name = "upload", version, about, long_about = None)]
#[command(override_usage = "upload [flags] file...")]
pub struct Cli {
    /// SSH connection username
    #[arg(long, env = "USER", default_value_t = default_user(), hide_env_values = true)]
    pub user: String,

    /// SSH host:port
    #[arg(long, default_value = "localhost:22")]
    pub addr: String,

    /// Remote directory to upload files to
    #[arg(long, default_value = "/tmp")]
    pub dir: String,

    /// Remote URL base to open after upload
    #[arg(long)]
    pub url: Option<String>,

    /// Generate long subdirectory name (also accepts -long=true / -long=false)
    #[arg(long)]
    pub long: bool,

    /// Connection timeout in seconds
    #[arg(long, default_value_t = 30, value_name = "SECS")]
    pub timeout: u64,

    /// Reject hosts not present in ~/.ssh/known_hosts
    #[arg(long)]
    pub strict_host_key_checking: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Local files to upload
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

fn default_user() -> String {
    whoami::username()
}

impl Cli {
    /// Parse process arguments, accepting single-dash long flags
    pub fn try_parse_args() -> Result<Self, clap::Error> {
        Self::try_parse_from(normalize_args(std::env::args_os()))
    }

    pub fn upload_request(&self) -> UploadRequest {
        UploadRequest::new(
            self.files.clone(),
            self.dir.clone(),
            NamingPolicy::from_long_flag(self.long),
        )
    }

    /// Validated request and connection settings, checked in that order so
    /// local input problems win over a bad address.
    pub fn prepare(&self) -> Result<(UploadRequest, SshConfig), UploadError> {
        let request = self.upload_request();
        request.validate()?;
        Ok((request, self.ssh_config()?))
    }

    pub fn ssh_config(&self) -> Result<SshConfig, SshError> {
        Ok(SshConfig::from_addr(&self.addr, self.user.clone())?
            .with_timeout(self.timeout)
            .with_strict_host_key_checking(self.strict_host_key_checking))
    }
}

/// Rewrite `-name` / `-name=value` to `--name...` for known flags, and
/// fold `name=<bool>` on boolean flags into the bare flag or nothing.
/// Everything after a bare `--` is left alone.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut out = Vec::new();
    let mut passthrough = false;

    for arg in args {
        if passthrough {
            out.push(arg);
            continue;
        }
        if arg == "--" {
            passthrough = true;
            out.push(arg);
            continue;
        }

        let Some(s) = arg.to_str() else {
            out.push(arg);
            continue;
        };
        let single_dash = !s.starts_with("--");
        let Some(body) = s.strip_prefix("--").or_else(|| s.strip_prefix('-')) else {
            out.push(arg);
            continue;
        };
        let (name, value) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };

        if let Some(on) = value.filter(|_| BOOL_FLAGS.contains(&name)).and_then(parse_bool) {
            if on {
                out.push(OsString::from(format!("--{}", name)));
            }
            continue;
        }

        if single_dash && SINGLE_DASH_FLAGS.contains(&name) {
            out.push(OsString::from(format!("-{}", s)));
        } else {
            out.push(arg);
        }
    }

    out
}

/// Boolean spellings accepted after `=`
fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Write the outcome of an upload run.
///
/// The remote directory goes to `out` whenever one was created, including
/// after a partial upload; the error goes to `err`. Returns the directory
/// that was printed.
pub fn write_outcome<'a, O, E>(
    out: &mut O,
    err: &mut E,
    result: &'a Result<UploadReport, UploadError>,
) -> std::io::Result<Option<&'a str>>
where
    O: Write,
    E: Write,
{
    let remote_dir = match result {
        Ok(report) => Some(report.remote_dir.as_str()),
        Err(e) => e.remote_dir(),
    };

    if let Some(dir) = remote_dir {
        writeln!(out, "{}", dir)?;
        out.flush()?;
    }
    if let Err(e) = result {
        writeln!(err, "{}", e)?;
    }
    Ok(remote_dir)
}
