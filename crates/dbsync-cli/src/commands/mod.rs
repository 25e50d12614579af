use std::path::PathBuf;

use clap::{Args, Subcommand};

pub mod sync;
pub mod targets;
pub mod validate;

#[derive(Subcommand)]
pub enum Commands {
    /// Push the local database to a target
    Push(sync::SyncArgs),
    /// Pull a target's database into local
    Pull(sync::SyncArgs),
    /// Check a deployments file without touching any database
    Validate(ConfigArgs),
    /// List the targets defined in a deployments file
    Targets(ConfigArgs),
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Path to the deployments YAML file
    #[arg(short, long, env = "DBSYNC_CONFIG", default_value = "deployments.yaml")]
    pub config: PathBuf,
}
