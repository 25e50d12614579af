use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

use crate::plan::Direction;

/// Record of a single step.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub step: String,
    pub environment: Option<String>,
    pub duration: Duration,
}

/// Summary of a completed push or pull.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub run_id: Uuid,
    pub direction: Direction,
    pub target: String,
    pub source: String,
    pub destination: String,

    /// Rewritten dump that was imported.
    pub source_dump: PathBuf,
    /// Destination contents as they were before the import.
    pub safety_dump: PathBuf,
    pub replacements: usize,

    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub total_duration: Duration,
    pub steps: Vec<StepRecord>,
}

fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    if total_secs >= 60 {
        format!("{}m {}s", total_secs / 60, total_secs % 60)
    } else if d.as_millis() < 1000 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{}.{}s", total_secs, d.subsec_millis() / 100)
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bar = "=".repeat(72);
        let thin = "-".repeat(72);

        writeln!(f, "\n{bar}")?;
        writeln!(f, "  SYNC REPORT")?;
        writeln!(f, "{bar}\n")?;

        writeln!(f, "  Run:          {}", self.run_id)?;
        writeln!(f, "  Direction:    {}", self.direction)?;
        writeln!(f, "  From:         {}", self.source)?;
        writeln!(f, "  To:           {}", self.destination)?;
        writeln!(f, "  Replacements: {}", self.replacements)?;

        writeln!(f, "\n{thin}")?;
        writeln!(f, "  STEPS ({})", self.steps.len())?;
        writeln!(f, "{thin}\n")?;
        writeln!(f, "  {:<4} {:<14} {:<16} {}", "#", "STEP", "ENVIRONMENT", "DURATION")?;
        for (i, s) in self.steps.iter().enumerate() {
            writeln!(
                f,
                "  {:<4} {:<14} {:<16} {}",
                i + 1,
                s.step,
                s.environment.as_deref().unwrap_or("-"),
                format_duration(s.duration)
            )?;
        }

        writeln!(f, "\n{thin}")?;
        writeln!(f, "  BACKUPS")?;
        writeln!(f, "{thin}\n")?;
        writeln!(f, "  Imported dump: {}", self.source_dump.display())?;
        writeln!(f, "  Safety dump:   {}", self.safety_dump.display())?;

        writeln!(f, "\n{thin}")?;
        writeln!(
            f,
            "  Started:    {}",
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(
            f,
            "  Completed:  {}",
            self.completed_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(f, "  Total:      {}", format_duration(self.total_duration))?;
        writeln!(f, "{bar}")?;

        Ok(())
    }
}
