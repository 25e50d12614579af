use std::sync::Arc;

use clap::Args;

use dbsync_core::event::TracingEventSink;
use dbsync_core::{DeploymentsConfig, Direction, SyncOrchestrator, SyncPlan, TokioProcessRunner};

use super::ConfigArgs;

#[derive(Args)]
pub struct SyncArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
    /// Target environment, overriding options.target
    #[arg(short, long)]
    pub target: Option<String>,
    /// Print the steps and commands without running them
    #[arg(long)]
    pub dry_run: bool,
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(direction: Direction, args: SyncArgs) -> anyhow::Result<()> {
    let config = DeploymentsConfig::from_file(&args.config.config)?;
    let plan = SyncPlan::build(direction, &config, args.target.as_deref())?;

    tracing::debug!(
        direction = %direction,
        target = %plan.target,
        steps = plan.steps.len(),
        "Built sync plan"
    );

    if args.dry_run {
        tracing::info!("Dry-run mode: nothing will be executed");
        print!("{plan}");
        return Ok(());
    }

    let mut orchestrator = SyncOrchestrator::new(Arc::new(TokioProcessRunner));
    orchestrator.add_event_sink(Arc::new(TracingEventSink));

    let report = orchestrator.execute(&plan).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    Ok(())
}
