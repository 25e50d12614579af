use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::config::{DeploymentsConfig, EnvironmentConfig, LOCAL_ENVIRONMENT};
use crate::error::SyncResult;
use crate::mysql;
use crate::paths::{generate_backup_paths_at, BackupPaths};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Local database into the target.
    Push,
    /// Target database into local.
    Pull,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Push => write!(f, "push"),
            Self::Pull => write!(f, "pull"),
        }
    }
}

/// One named environment taking part in a run.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub name: String,
    pub config: EnvironmentConfig,
    pub backup: BackupPaths,
}

#[derive(Debug, Clone)]
pub enum SyncStep {
    /// Snapshot of the source that will be rewritten and imported.
    DumpSource { endpoint: Endpoint },
    Rewrite {
        from: String,
        to: String,
        file: PathBuf,
    },
    /// Snapshot of the destination taken before it is overwritten.
    SafetyDump { endpoint: Endpoint },
    Import {
        endpoint: Endpoint,
        source: PathBuf,
    },
}

impl SyncStep {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DumpSource { .. } => "dump_source",
            Self::Rewrite { .. } => "rewrite",
            Self::SafetyDump { .. } => "safety_dump",
            Self::Import { .. } => "import",
        }
    }

    /// Environment the step acts on. Rewrites act on a local file only.
    pub fn environment(&self) -> Option<&str> {
        match self {
            Self::DumpSource { endpoint }
            | Self::SafetyDump { endpoint }
            | Self::Import { endpoint, .. } => Some(&endpoint.name),
            Self::Rewrite { .. } => None,
        }
    }
}

impl fmt::Display for SyncStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DumpSource { endpoint } | Self::SafetyDump { endpoint } => {
                let label = if matches!(self, Self::SafetyDump { .. }) {
                    "Safety dump"
                } else {
                    "Dump"
                };
                writeln!(f, "{label} '{}' ({})", endpoint.name, endpoint.config.title)?;
                write!(
                    f,
                    "    $ {}",
                    mysql::dump_command(&endpoint.config, &endpoint.backup)
                )
            }
            Self::Rewrite { from, to, file } => {
                writeln!(f, "Rewrite references in {}", file.display())?;
                write!(f, "    {from} -> {to}")
            }
            Self::Import { endpoint, source } => {
                writeln!(f, "Import into '{}' ({})", endpoint.name, endpoint.config.title)?;
                write!(f, "    $ {}", mysql::import_command(&endpoint.config, source))
            }
        }
    }
}

/// The fixed, ordered steps of one push or pull.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub direction: Direction,
    pub target: String,
    pub source: Endpoint,
    pub destination: Endpoint,
    pub steps: Vec<SyncStep>,
}

impl SyncPlan {
    /// Resolve the target and lay out the steps, stamping paths with the current time.
    pub fn build(
        direction: Direction,
        config: &DeploymentsConfig,
        override_target: Option<&str>,
    ) -> SyncResult<Self> {
        Self::build_at(direction, config, override_target, Local::now().naive_local())
    }

    /// Like [`SyncPlan::build`] with an explicit timestamp. Touches no files.
    pub fn build_at(
        direction: Direction,
        config: &DeploymentsConfig,
        override_target: Option<&str>,
        at: NaiveDateTime,
    ) -> SyncResult<Self> {
        let target = config.resolve_target(override_target)?;

        let local = Endpoint {
            name: LOCAL_ENVIRONMENT.to_string(),
            config: config.local.clone(),
            backup: generate_backup_paths_at(LOCAL_ENVIRONMENT, &config.options, at),
        };
        let remote = Endpoint {
            name: target.name.to_string(),
            config: target.config.clone(),
            backup: generate_backup_paths_at(target.name, &config.options, at),
        };

        let (source, destination) = match direction {
            Direction::Push => (local, remote),
            Direction::Pull => (remote, local),
        };

        let steps = vec![
            SyncStep::DumpSource {
                endpoint: source.clone(),
            },
            SyncStep::Rewrite {
                from: source.config.url.clone(),
                to: destination.config.url.clone(),
                file: source.backup.file.clone(),
            },
            SyncStep::SafetyDump {
                endpoint: destination.clone(),
            },
            SyncStep::Import {
                endpoint: destination.clone(),
                source: source.backup.file.clone(),
            },
        ];

        Ok(Self {
            direction,
            target: target.name.to_string(),
            source,
            destination,
            steps,
        })
    }
}

impl fmt::Display for SyncPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Plan: {} '{}' -> '{}'",
            self.direction, self.source.config.title, self.destination.config.title
        )?;
        for (i, step) in self.steps.iter().enumerate() {
            writeln!(f, "  {}. {step}", i + 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn config() -> DeploymentsConfig {
        DeploymentsConfig::from_yaml_str(
            r#"
options:
  backups_dir: /srv/backups
local:
  url: http://dev.local
  host: localhost
  user: root
  database: devdb
staging:
  title: Staging
  url: http://staging.example.com
  host: localhost
  user: deploy
  pass: pw
  database: stagedb
  ssh_host: staging.example.com
"#,
        )
        .unwrap()
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
    }

    #[test]
    fn push_dumps_local_then_protects_target() {
        let plan = SyncPlan::build_at(Direction::Push, &config(), Some("staging"), at()).unwrap();
        let names: Vec<_> = plan.steps.iter().map(SyncStep::name).collect();
        assert_eq!(names, ["dump_source", "rewrite", "safety_dump", "import"]);
        let envs: Vec<_> = plan.steps.iter().map(SyncStep::environment).collect();
        assert_eq!(envs, [Some("local"), None, Some("staging"), Some("staging")]);

        match &plan.steps[1] {
            SyncStep::Rewrite { from, to, file } => {
                assert_eq!(from, "http://dev.local");
                assert_eq!(to, "http://staging.example.com");
                assert_eq!(
                    file,
                    &PathBuf::from("/srv/backups/local/20240102/03-04-05/db_backup.sql")
                );
            }
            other => panic!("unexpected step {other:?}"),
        }
        match &plan.steps[3] {
            SyncStep::Import { source, .. } => assert_eq!(source, &plan.source.backup.file),
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn pull_is_the_mirror() {
        let plan = SyncPlan::build_at(Direction::Pull, &config(), Some("staging"), at()).unwrap();
        assert_eq!(plan.source.name, "staging");
        assert_eq!(plan.destination.name, "local");
        let envs: Vec<_> = plan.steps.iter().map(SyncStep::environment).collect();
        assert_eq!(envs, [Some("staging"), None, Some("local"), Some("local")]);

        match &plan.steps[1] {
            SyncStep::Rewrite { from, to, .. } => {
                assert_eq!(from, "http://staging.example.com");
                assert_eq!(to, "http://dev.local");
            }
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn unresolved_target_builds_nothing() {
        let err = SyncPlan::build_at(Direction::Push, &config(), None, at()).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn display_lists_commands_without_password() {
        let plan = SyncPlan::build_at(Direction::Push, &config(), Some("staging"), at()).unwrap();
        let shown = plan.to_string();
        assert!(shown.contains("Plan: push 'Local' -> 'Staging'"));
        assert!(shown.contains("$ mysqldump -h localhost -u root --port 3306 devdb"));
        assert!(shown.contains("$ ssh staging.example.com"));
        assert!(!shown.contains("-ppw"));
    }
}
