use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::path::PathBuf;

use crate::config::TaskOptions;

pub const DEFAULT_BACKUPS_DIR: &str = "backups";
pub const BACKUP_FILE_NAME: &str = "db_backup.sql";

/// Where one environment's dump goes for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupPaths {
    /// `<backups_dir>/<environment>/<YYYYMMDD>/<HH-MM-SS>`
    pub dir: PathBuf,
    /// `<dir>/db_backup.sql`
    pub file: PathBuf,
}

/// Backup paths for `environment` stamped with the current local time.
pub fn generate_backup_paths(environment: &str, options: &TaskOptions) -> BackupPaths {
    generate_backup_paths_at(environment, options, Local::now().naive_local())
}

/// Backup paths for `environment` stamped with `at`. Touches no files.
pub fn generate_backup_paths_at(
    environment: &str,
    options: &TaskOptions,
    at: NaiveDateTime,
) -> BackupPaths {
    let root = options
        .backups_dir
        .as_deref()
        .filter(|d| !d.is_empty())
        .unwrap_or(DEFAULT_BACKUPS_DIR);

    let dir = PathBuf::from(root)
        .join(environment)
        .join(at.format("%Y%m%d").to_string())
        .join(at.format("%H-%M-%S").to_string());
    let file = dir.join(BACKUP_FILE_NAME);

    BackupPaths { dir, file }
}
