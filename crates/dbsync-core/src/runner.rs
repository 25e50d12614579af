use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;

/// A subprocess invocation: argv plus optional file redirections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Fed to the child as standard input (`< file`).
    pub stdin: Option<PathBuf>,
    /// Receives the child's standard output (`> file`).
    pub stdout: Option<PathBuf>,
    /// Substrings masked when the command is displayed.
    pub secrets: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            stdout: None,
            secrets: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdin_from(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdin = Some(path.into());
        self
    }

    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout = Some(path.into());
        self
    }

    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        if !secret.is_empty() {
            self.secrets.push(secret);
        }
        self
    }

    pub fn secrets(mut self, secrets: Vec<String>) -> Self {
        for s in secrets {
            self = self.secret(s);
        }
        self
    }

    fn redact(&self, text: &str) -> String {
        self.secrets
            .iter()
            .fold(text.to_string(), |acc, s| acc.replace(s.as_str(), "****"))
    }
}

/// Shell-like rendering with secrets masked. For logs and dry runs only.
///
/// Masking runs on the raw argument, before quoting can split a secret apart.
impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(&self.redact(arg)))?;
        }
        if let Some(ref path) = self.stdin {
            write!(f, " < {}", shell_quote(&path.to_string_lossy()))?;
        }
        if let Some(ref path) = self.stdout {
            write!(f, " > {}", shell_quote(&path.to_string_lossy()))?;
        }
        Ok(())
    }
}

/// Quote `value` for a POSIX shell. Plain words pass through unchanged.
pub fn shell_quote(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@,+%".contains(c));
    if plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

/// What the runner reports back once the child has exited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Turn a non-zero exit into an error naming the program.
    pub fn check(self, program: &str) -> anyhow::Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            let stderr = self.stderr.trim();
            if stderr.is_empty() {
                anyhow::bail!("{program} exited with status {}", self.exit_code)
            } else {
                anyhow::bail!("{program} exited with status {}: {stderr}", self.exit_code)
            }
        }
    }
}

/// Runs external commands to completion.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `command` and wait for it to exit.
    ///
    /// `Err` means the process could not be started or its redirections could
    /// not be opened. A started process that fails is reported through
    /// `ProcessOutput::exit_code`.
    async fn run(&self, command: &CommandSpec) -> anyhow::Result<ProcessOutput>;
}

/// Spawns real child processes through tokio.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, command: &CommandSpec) -> anyhow::Result<ProcessOutput> {
        use anyhow::Context;

        let mut cmd = tokio::process::Command::new(&command.program);
        cmd.args(&command.args).stderr(Stdio::piped());

        match command.stdin {
            Some(ref path) => {
                let file = std::fs::File::open(path)
                    .with_context(|| format!("Cannot open {} for reading", path.display()))?;
                cmd.stdin(Stdio::from(file));
            }
            None => {
                cmd.stdin(Stdio::null());
            }
        }

        match command.stdout {
            Some(ref path) => {
                let file = std::fs::File::create(path)
                    .with_context(|| format!("Cannot create {}", path.display()))?;
                cmd.stdout(Stdio::from(file));
            }
            None => {
                cmd.stdout(Stdio::null());
            }
        }

        tracing::debug!(command = %command, "Spawning process");

        let output = cmd
            .output()
            .await
            .with_context(|| format!("Failed to run {}", command.program))?;

        Ok(ProcessOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
