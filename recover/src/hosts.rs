use std::{fs, io::ErrorKind, path::Path};

use anyhow::{Context, Result};
use tracing::{debug, info};

/// Whether the VPN client left a hosts backup behind.
pub fn pending(backup: &Path) -> bool {
    backup.is_file()
}

/// Puts the VPN client's hosts backup back in place of the file it rewrote.
/// Returns false when there is no backup.
pub fn restore(backup: &Path, target: &Path) -> Result<bool> {
    if !pending(backup) {
        debug!(backup = %backup.display(), "no hosts backup");
        return Ok(false);
    }

    info!(target = %target.display(), "deleting VPN hosts file");
    match fs::remove_file(target) {
        Err(e) if e.kind() != ErrorKind::NotFound => {
            return Err(e).with_context(|| format!("failed to remove {}", target.display()));
        }
        _ => {}
    }

    info!(backup = %backup.display(), target = %target.display(), "restoring hosts file");
    fs::rename(backup, target).with_context(|| {
        format!(
            "failed to rename {} to {}",
            backup.display(),
            target.display()
        )
    })?;

    Ok(true)
}
