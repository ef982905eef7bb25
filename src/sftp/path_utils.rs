//! Path utilities for SFTP operations
//!
//! Remote SFTP paths always use `/` as separator (per SFTP protocol), even
//! when the server runs on Windows. Local paths use the platform's rules.

use std::path::Path;

/// Join remote SFTP path components using `/` separator.
pub fn join_remote_path(base: &str, component: &str) -> String {
    if base.is_empty() {
        component.to_string()
    } else if base.ends_with('/') {
        format!("{}{}", base, component)
    } else {
        format!("{}/{}", base, component)
    }
}

/// Last segment of a remote path, ignoring trailing slashes.
pub fn remote_base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// File name of a local path with every directory component stripped.
///
/// Returns `None` for paths with no usable final component (`/`, `..`).
pub fn local_base_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// URL under which an uploaded directory is browsable: `base` joined with
/// the last segment of `remote_dir`.
pub fn browse_url(base: &str, remote_dir: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        remote_base_name(remote_dir)
    )
}
