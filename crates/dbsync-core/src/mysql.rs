//! Builders for the `mysqldump`, `mysql` and `ssh` invocations.
//!
//! Local environments get the database tool as argv directly. Environments with an
//! `ssh_host` get `ssh <host> '<tool ...>'`, with the tool command quoted for the
//! remote shell and the redirections kept on the local side.

use std::path::Path;

use crate::config::EnvironmentConfig;
use crate::paths::BackupPaths;
use crate::runner::{shell_quote, CommandSpec};

pub const DUMP_PROGRAM: &str = "mysqldump";
pub const CLIENT_PROGRAM: &str = "mysql";
pub const SSH_PROGRAM: &str = "ssh";

/// Connection flags shared by both tools. Password flag omitted when empty.
pub fn connection_args(config: &EnvironmentConfig) -> Vec<String> {
    let mut args = vec![
        "-h".to_string(),
        config.host.clone(),
        "-u".to_string(),
        config.user.clone(),
    ];
    if !config.pass.is_empty() {
        args.push(format!("-p{}", config.pass));
    }
    args.push("--port".to_string());
    args.push(config.port.to_string());
    args.push(config.database.clone());
    args
}

/// Snapshot of `config.database` written to `paths.file`.
pub fn dump_command(config: &EnvironmentConfig, paths: &BackupPaths) -> CommandSpec {
    topology_command(config, DUMP_PROGRAM).stdout_to(&paths.file)
}

/// Client fed `source` on standard input.
pub fn import_command(config: &EnvironmentConfig, source: &Path) -> CommandSpec {
    topology_command(config, CLIENT_PROGRAM).stdin_from(source)
}

fn topology_command(config: &EnvironmentConfig, program: &str) -> CommandSpec {
    let args = connection_args(config);

    match config.ssh_host() {
        None => CommandSpec::new(program)
            .args(args)
            .secret(config.pass.clone()),
        Some(ssh_host) => {
            // The remote command carries the password flag already quoted.
            let mut secrets = Vec::new();
            if !config.pass.is_empty() {
                secrets.push(shell_quote(&format!("-p{}", config.pass)));
                secrets.push(config.pass.clone());
            }
            let remote = std::iter::once(program.to_string())
                .chain(args.iter().map(|a| shell_quote(a)))
                .collect::<Vec<_>>()
                .join(" ");
            CommandSpec::new(SSH_PROGRAM)
                .arg(ssh_host)
                .arg(remote)
                .secrets(secrets)
        }
    }
}

/// True when `command` goes through the remote wrapper.
pub fn is_remote_command(command: &CommandSpec) -> bool {
    command.program == SSH_PROGRAM
}
