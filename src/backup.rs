use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub const BACKUP_DIR: &str = "backups";
pub const BACKUP_PREFIX: &str = "config_backup_";
pub const BACKUP_SUFFIX: &str = ".json";

/// Second-precision stamp embedded in backup file names. Two snapshots within
/// the same second collide and overwrite each other; that is accepted.
const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Metadata for one rotating backup, discovered by listing the backup
/// directory. Nothing here is persisted as structured data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub filename: String,
    pub filepath: PathBuf,
    /// Human-readable mtime, `%Y-%m-%d %H:%M:%S`.
    pub timestamp: String,
    pub size: u64,
}

/// Copy `source` into `backup_dir` under a timestamped name, then prune the
/// directory down to the `max_retain` newest backups.
///
/// A missing `source` is a no-op: there is nothing to back up yet.
pub fn snapshot(source: &Path, backup_dir: &Path, max_retain: usize) -> anyhow::Result<()> {
    if !source.exists() {
        return Ok(());
    }
    std::fs::create_dir_all(backup_dir)?;
    let stamp = Local::now().format(STAMP_FORMAT);
    let dest = backup_dir.join(format!("{BACKUP_PREFIX}{stamp}{BACKUP_SUFFIX}"));
    std::fs::copy(source, &dest)?;
    tracing::debug!("configuration backed up to {}", dest.display());
    prune(backup_dir, max_retain)?;
    Ok(())
}

/// One-off copy of a corrupt configuration file, written beside the original
/// as `<path>.backup_<stamp>` so it stays out of the rotating set.
pub fn forensic_copy(path: &Path) -> anyhow::Result<PathBuf> {
    let stamp = Local::now().format(STAMP_FORMAT);
    let dest = PathBuf::from(format!("{}.backup_{stamp}", path.display()));
    std::fs::copy(path, &dest)?;
    tracing::info!("corrupt configuration preserved at {}", dest.display());
    Ok(dest)
}

/// List the rotating backups in `backup_dir`, newest first. A missing
/// directory yields an empty list; listing errors are logged and swallowed.
pub fn list_backups(backup_dir: &Path) -> Vec<BackupInfo> {
    if !backup_dir.exists() {
        return Vec::new();
    }
    let mut backups = Vec::new();
    match backup_files(backup_dir) {
        Ok(files) => {
            for (path, modified) in files {
                let Ok(meta) = std::fs::metadata(&path) else {
                    continue;
                };
                let filename = path
                    .file_name()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                backups.push(BackupInfo {
                    filename,
                    timestamp: DateTime::<Local>::from(modified)
                        .format("%Y-%m-%d %H:%M:%S")
                        .to_string(),
                    size: meta.len(),
                    filepath: path,
                });
            }
        }
        Err(err) => {
            tracing::error!("failed to list backups in {}: {err}", backup_dir.display());
            return Vec::new();
        }
    }
    backups.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.filename.cmp(&a.filename))
    });
    backups
}

fn prune(backup_dir: &Path, max_retain: usize) -> anyhow::Result<()> {
    let mut files = backup_files(backup_dir)?;
    // Newest first; the stamped filename breaks mtime ties deterministically.
    files.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));
    for (path, _) in files.into_iter().skip(max_retain) {
        tracing::debug!("removing old backup {}", path.display());
        std::fs::remove_file(path)?;
    }
    Ok(())
}

fn backup_files(backup_dir: &Path) -> anyhow::Result<Vec<(PathBuf, SystemTime)>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(backup_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with(BACKUP_PREFIX) || !name.ends_with(BACKUP_SUFFIX) {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        out.push((entry.path(), modified));
    }
    Ok(out)
}
