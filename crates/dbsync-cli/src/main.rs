use clap::Parser;
use dbsync_core::Direction;

mod commands;

#[derive(Parser)]
#[command(
    name = "dbsync",
    about = "Push and pull MySQL databases between local and remote environments",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: commands::Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        commands::Commands::Push(args) => commands::sync::execute(Direction::Push, args).await,
        commands::Commands::Pull(args) => commands::sync::execute(Direction::Pull, args).await,
        commands::Commands::Validate(args) => commands::validate::execute(args),
        commands::Commands::Targets(args) => commands::targets::execute(args),
    }
}
