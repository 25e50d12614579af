use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{SyncError, SyncResult};

/// Name of the environment every sync reads from or writes to.
pub const LOCAL_ENVIRONMENT: &str = "local";

/// Top-level config file structure.
///
/// ```yaml
/// options:
///   target: staging
///   backups_dir: backups
/// local:
///   url: http://dev.local
///   host: 127.0.0.1
///   user: root
///   database: devdb
/// staging:
///   url: http://staging.example.com
///   host: 127.0.0.1
///   user: deploy
///   pass: secret
///   database: stagedb
///   ssh_host: deploy@staging.example.com
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentsConfig {
    #[serde(default)]
    pub options: TaskOptions,
    pub local: EnvironmentConfig,
    /// Every other top-level entry is a named target.
    #[serde(flatten)]
    pub targets: BTreeMap<String, EnvironmentConfig>,
}

/// Process-wide defaults shared by push and pull.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskOptions {
    /// Target used when none is given on the command line.
    pub target: Option<String>,
    /// Root of the generated backup tree. Defaults to `backups`.
    pub backups_dir: Option<String>,
}

/// One database endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Human label. Filled with the environment name when omitted.
    #[serde(default)]
    pub title: String,
    /// Environment-identifying string rewritten inside dumps, usually the site URL.
    pub url: String,
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
    #[serde(default)]
    pub pass: String,
    pub database: String,
    /// When set, dump and import run on this host through `ssh`.
    #[serde(default)]
    pub ssh_host: Option<String>,
}

fn default_port() -> u16 {
    3306
}

impl EnvironmentConfig {
    /// Remote host to tunnel through, ignoring blank values.
    pub fn ssh_host(&self) -> Option<&str> {
        self.ssh_host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
    }

    pub fn is_remote(&self) -> bool {
        self.ssh_host().is_some()
    }

    /// Problems that make this environment unusable, one message each.
    pub fn problems(&self, name: &str) -> Vec<String> {
        let mut problems = Vec::new();
        let required = [
            ("url", &self.url),
            ("host", &self.host),
            ("user", &self.user),
            ("database", &self.database),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                problems.push(format!("environment '{name}': '{field}' must not be empty"));
            }
        }
        if self.port == 0 {
            problems.push(format!("environment '{name}': 'port' must be non-zero"));
        }
        problems
    }
}

/// A target picked out of the config for one run.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedTarget<'a> {
    pub name: &'a str,
    pub config: &'a EnvironmentConfig,
}

impl DeploymentsConfig {
    pub fn from_file(path: &Path) -> SyncResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SyncError::Config(format!("Cannot read {}: {e}", path.display())))?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> SyncResult<Self> {
        let mut config: Self = serde_yaml::from_str(content)
            .map_err(|e| SyncError::Config(format!("Invalid YAML: {e}")))?;
        if config.local.title.is_empty() {
            config.local.title = "Local".to_string();
        }
        for (name, env) in config.targets.iter_mut() {
            if env.title.is_empty() {
                env.title = name.clone();
            }
        }
        Ok(config)
    }

    pub fn backups_dir(&self) -> &str {
        self.options.backups_dir.as_deref().unwrap_or(crate::paths::DEFAULT_BACKUPS_DIR)
    }

    /// Every problem found across `local` and all targets.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = self.local.problems(LOCAL_ENVIRONMENT);
        for (name, env) in &self.targets {
            problems.extend(env.problems(name));
        }
        problems.extend(self.default_target_problem());
        problems
    }

    /// Set when `options.target` names something that is not a configured target.
    pub fn default_target_problem(&self) -> Option<String> {
        let default = self.options.target.as_deref()?;
        (!self.targets.contains_key(default))
            .then(|| format!("options.target '{default}' is not a configured target"))
    }

    /// Pick the target for this run: the override if given, else `options.target`.
    /// A blank override counts as not given.
    ///
    /// Fails when neither is set, when the name is unknown, or when it names `local`.
    pub fn resolve_target<'a>(&'a self, override_target: Option<&'a str>) -> SyncResult<ResolvedTarget<'a>> {
        let not_blank = |n: &&'a str| !n.trim().is_empty();
        let name = override_target
            .filter(not_blank)
            .or(self.options.target.as_deref().filter(not_blank))
            .map(str::trim)
            .ok_or_else(|| {
                SyncError::Config(
                    "No target specified. Pass --target or set options.target".into(),
                )
            })?;

        if name == LOCAL_ENVIRONMENT {
            return Err(SyncError::Config(
                "'local' cannot be used as a sync target".into(),
            ));
        }

        let (name, config) = self.targets.get_key_value(name).ok_or_else(|| {
            SyncError::Config(format!(
                "Invalid target '{name}'. Known targets: {}",
                self.target_names().join(", ")
            ))
        })?;

        let problems = config.problems(name);
        if !problems.is_empty() {
            return Err(SyncError::Config(problems.join("; ")));
        }
        let local_problems = self.local.problems(LOCAL_ENVIRONMENT);
        if !local_problems.is_empty() {
            return Err(SyncError::Config(local_problems.join("; ")));
        }

        Ok(ResolvedTarget { name: name.as_str(), config })
    }

    pub fn target_names(&self) -> Vec<&str> {
        self.targets.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
options:
  target: staging
local:
  url: http://dev.local
  host: 127.0.0.1
  user: root
  database: devdb
staging:
  title: Staging
  url: http://staging.example.com
  host: 127.0.0.1
  port: 3307
  user: deploy
  pass: secret
  database: stagedb
  ssh_host: staging.example.com
production:
  url: https://example.com
  host: db.internal
  user: deploy
  database: proddb
"#;

    #[test]
    fn parses_targets_and_defaults() {
        let config = DeploymentsConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.target_names(), vec!["production", "staging"]);
        assert_eq!(config.local.port, 3306);
        assert_eq!(config.local.title, "Local");
        assert!(config.local.pass.is_empty());
        assert!(!config.local.is_remote());

        let prod = &config.targets["production"];
        assert_eq!(prod.title, "production");
        assert_eq!(prod.port, 3306);

        let staging = &config.targets["staging"];
        assert_eq!(staging.port, 3307);
        assert_eq!(staging.ssh_host(), Some("staging.example.com"));
        assert_eq!(config.backups_dir(), "backups");
    }

    #[test]
    fn override_wins_over_default_target() {
        let config = DeploymentsConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.resolve_target(None).unwrap().name, "staging");
        assert_eq!(
            config.resolve_target(Some("production")).unwrap().name,
            "production"
        );
    }

    #[test]
    fn blank_override_falls_back_to_default_target() {
        let config = DeploymentsConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.resolve_target(Some("")).unwrap().name, "staging");
        assert_eq!(config.resolve_target(Some("   ")).unwrap().name, "staging");
        assert!(config.default_target_problem().is_none());
    }

    #[test]
    fn unknown_or_missing_target_is_config_error() {
        let config = DeploymentsConfig::from_yaml_str(SAMPLE).unwrap();
        assert!(config.resolve_target(Some("qa")).unwrap_err().is_config());
        assert!(config.resolve_target(Some("local")).unwrap_err().is_config());

        let mut no_default = config.clone();
        no_default.options.target = None;
        assert!(no_default.resolve_target(None).unwrap_err().is_config());
        assert!(no_default.resolve_target(Some("  ")).unwrap_err().is_config());
    }

    #[test]
    fn missing_required_field_fails_to_parse() {
        let err = DeploymentsConfig::from_yaml_str("local:\n  host: x\n  user: y\n  database: z\n")
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn blank_fields_are_reported() {
        let mut config = DeploymentsConfig::from_yaml_str(SAMPLE).unwrap();
        config.targets.get_mut("production").unwrap().database = " ".into();
        config.options.target = Some("nowhere".into());

        let problems = config.problems();
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("'database'"));
        assert_eq!(
            config.default_target_problem().as_deref(),
            Some("options.target 'nowhere' is not a configured target")
        );
        assert!(config.resolve_target(Some("production")).unwrap_err().is_config());
    }

    #[test]
    fn blank_ssh_host_means_local() {
        let mut env = DeploymentsConfig::from_yaml_str(SAMPLE).unwrap().local;
        env.ssh_host = Some("   ".into());
        assert!(!env.is_remote());
    }
}
