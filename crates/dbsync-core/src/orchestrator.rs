use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::config::DeploymentsConfig;
use crate::error::SyncResult;
use crate::event::{EventSink, SyncEvent};
use crate::plan::{Direction, SyncPlan, SyncStep};
use crate::report::{StepRecord, SyncReport};
use crate::runner::ProcessRunner;
use crate::{dump, import, rewrite};

/// Runs push and pull workflows one step at a time.
pub struct SyncOrchestrator {
    runner: Arc<dyn ProcessRunner>,
    event_sinks: Vec<Arc<dyn EventSink>>,
}

impl SyncOrchestrator {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            runner,
            event_sinks: Vec::new(),
        }
    }

    pub fn add_event_sink(&mut self, sink: Arc<dyn EventSink>) {
        self.event_sinks.push(sink);
    }

    async fn emit(&self, event: SyncEvent) {
        for sink in &self.event_sinks {
            sink.emit(event.clone()).await;
        }
    }

    /// Local database into the target.
    pub async fn run_push(
        &self,
        config: &DeploymentsConfig,
        override_target: Option<&str>,
    ) -> SyncResult<SyncReport> {
        self.run(Direction::Push, config, override_target).await
    }

    /// Target database into local.
    pub async fn run_pull(
        &self,
        config: &DeploymentsConfig,
        override_target: Option<&str>,
    ) -> SyncResult<SyncReport> {
        self.run(Direction::Pull, config, override_target).await
    }

    pub async fn run(
        &self,
        direction: Direction,
        config: &DeploymentsConfig,
        override_target: Option<&str>,
    ) -> SyncResult<SyncReport> {
        let plan = SyncPlan::build(direction, config, override_target)?;
        self.execute(&plan).await
    }

    /// Run every step of `plan` in order, stopping at the first failure.
    ///
    /// Nothing is retried or undone. After a failed import the destination can
    /// be restored by hand from the safety dump.
    pub async fn execute(&self, plan: &SyncPlan) -> SyncResult<SyncReport> {
        let run_id = Uuid::new_v4();
        let started_at = chrono::Utc::now();
        let run_start = Instant::now();

        tracing::info!(
            run_id = %run_id,
            direction = %plan.direction,
            "{} database from '{}' to '{}'",
            match plan.direction {
                Direction::Push => "Pushing",
                Direction::Pull => "Pulling",
            },
            plan.source.config.title,
            plan.destination.config.title
        );

        self.emit(SyncEvent::Started {
            run_id,
            direction: plan.direction,
            target: plan.target.clone(),
            at: started_at,
        })
        .await;

        let mut records = Vec::with_capacity(plan.steps.len());
        let mut replacements = 0;

        for step in &plan.steps {
            let environment = step.environment().map(str::to_string);
            self.emit(SyncEvent::StepStarted {
                run_id,
                step: step.name(),
                environment: environment.clone(),
            })
            .await;

            let step_start = Instant::now();
            let result = match step {
                SyncStep::DumpSource { endpoint } | SyncStep::SafetyDump { endpoint } => {
                    dump::dump(
                        self.runner.as_ref(),
                        &endpoint.name,
                        &endpoint.config,
                        &endpoint.backup,
                    )
                    .await
                }
                SyncStep::Rewrite { from, to, file } => rewrite::rewrite(from, to, file)
                    .await
                    .map(|count| replacements = count),
                SyncStep::Import { endpoint, source } => {
                    import::import(self.runner.as_ref(), &endpoint.name, &endpoint.config, source)
                        .await
                }
            };

            if let Err(e) = result {
                tracing::error!(
                    run_id = %run_id,
                    step = step.name(),
                    environment = environment.as_deref().unwrap_or("-"),
                    error = %e,
                    "Sync step failed, aborting"
                );
                self.emit(SyncEvent::StepFailed {
                    run_id,
                    step: step.name(),
                    environment,
                    error: e.to_string(),
                })
                .await;
                return Err(e);
            }

            records.push(StepRecord {
                step: step.name().to_string(),
                environment: environment.clone(),
                duration: step_start.elapsed(),
            });
            self.emit(SyncEvent::StepCompleted {
                run_id,
                step: step.name(),
                environment,
            })
            .await;
        }

        let completed_at = chrono::Utc::now();
        self.emit(SyncEvent::Completed {
            run_id,
            at: completed_at,
        })
        .await;
        tracing::info!(run_id = %run_id, "Operations completed");

        Ok(SyncReport {
            run_id,
            direction: plan.direction,
            target: plan.target.clone(),
            source: plan.source.name.clone(),
            destination: plan.destination.name.clone(),
            source_dump: plan.source.backup.file.clone(),
            safety_dump: plan.destination.backup.file.clone(),
            replacements,
            started_at,
            completed_at,
            total_duration: run_start.elapsed(),
            steps: records,
        })
    }
}
