use anyhow::Context;

use crate::config::EnvironmentConfig;
use crate::error::{SyncError, SyncResult};
use crate::mysql;
use crate::paths::BackupPaths;
use crate::runner::ProcessRunner;

/// Snapshot `config`'s database into `paths.file`, creating `paths.dir` first.
pub async fn dump(
    runner: &dyn ProcessRunner,
    environment: &str,
    config: &EnvironmentConfig,
    paths: &BackupPaths,
) -> SyncResult<()> {
    let fail = |source: anyhow::Error| SyncError::Dump {
        environment: environment.to_string(),
        source,
    };

    tokio::fs::create_dir_all(&paths.dir)
        .await
        .with_context(|| format!("Cannot create {}", paths.dir.display()))
        .map_err(fail)?;

    let command = mysql::dump_command(config, paths);
    tracing::info!(
        environment = %environment,
        database = %config.database,
        remote = config.is_remote(),
        file = %paths.file.display(),
        "Dumping database"
    );

    runner
        .run(&command)
        .await
        .and_then(|out| out.check(&command.program))
        .map_err(fail)?;

    tracing::info!(environment = %environment, file = %paths.file.display(), "Database dumped");
    Ok(())
}
