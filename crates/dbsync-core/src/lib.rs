//! Push and pull a MySQL database between `local` and named targets.
//!
//! A run dumps the source, rewrites environment URLs inside the dump, takes a
//! safety dump of the destination and imports the rewritten dump into it.

pub mod config;
pub mod dump;
pub mod error;
pub mod event;
pub mod import;
pub mod mysql;
pub mod orchestrator;
pub mod paths;
pub mod plan;
pub mod report;
pub mod rewrite;
pub mod runner;

pub use config::{DeploymentsConfig, EnvironmentConfig, TaskOptions};
pub use error::{SyncError, SyncResult};
pub use orchestrator::SyncOrchestrator;
pub use paths::{generate_backup_paths, BackupPaths};
pub use plan::{Direction, SyncPlan};
pub use report::SyncReport;
pub use runner::{CommandSpec, ProcessOutput, ProcessRunner, TokioProcessRunner};
