use std::path::Path;

use crate::config::EnvironmentConfig;
use crate::error::{SyncError, SyncResult};
use crate::mysql;
use crate::runner::ProcessRunner;

/// Load `source` into `config`'s database, over ssh when `ssh_host` is set.
pub async fn import(
    runner: &dyn ProcessRunner,
    environment: &str,
    config: &EnvironmentConfig,
    source: &Path,
) -> SyncResult<()> {
    let command = mysql::import_command(config, source);

    if mysql::is_remote_command(&command) {
        tracing::info!(
            environment = %environment,
            ssh_host = config.ssh_host().unwrap_or_default(),
            file = %source.display(),
            "Importing dump into remote database"
        );
    } else {
        tracing::info!(
            environment = %environment,
            file = %source.display(),
            "Importing dump into local database"
        );
    }

    runner
        .run(&command)
        .await
        .and_then(|out| out.check(&command.program))
        .map_err(|source| SyncError::Import {
            environment: environment.to_string(),
            source,
        })?;

    tracing::info!(environment = %environment, "Database imported");
    Ok(())
}
