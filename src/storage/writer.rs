//! Artifact writing
//!
//! Writes rendered suites atomically (temp file + rename), creating parent
//! directories as needed. Files whose content is already identical are left
//! untouched so unchanged inputs don't churn timestamps.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// A failed write, attributed to the suite that produced it
#[derive(Debug, Error)]
#[error("Cannot save suite {suite} to {}: {source}", .path.display())]
pub struct WriteError {
    pub suite: String,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Result of writing one artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

/// Writes `content` to `path` on behalf of `suite`
pub fn write_artifact(
    suite: &str,
    path: &Path,
    content: &str,
    executable: bool,
) -> Result<WriteOutcome, WriteError> {
    let fail = |source: io::Error| WriteError {
        suite: suite.to_string(),
        path: path.to_path_buf(),
        source,
    };

    if fs::read(path).is_ok_and(|existing| existing == content.as_bytes()) {
        return Ok(WriteOutcome::Unchanged);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(fail)?;
    }

    let mut temp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, content).map_err(fail)?;

    let finished = if executable {
        make_executable(&temp_path)
    } else {
        Ok(())
    }
    .and_then(|()| fs::rename(&temp_path, path));

    if let Err(source) = finished {
        let _ = fs::remove_file(&temp_path);
        return Err(fail(source));
    }

    Ok(WriteOutcome::Written)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(perms.mode() | 0o755);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
