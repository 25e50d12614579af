use dbsync_core::DeploymentsConfig;

use super::ConfigArgs;

pub fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    let config = DeploymentsConfig::from_file(&args.config)?;

    if config.targets.is_empty() {
        println!("No targets defined in {}", args.config.display());
        return Ok(());
    }

    let default = config.options.target.as_deref();
    println!("  {:<2} {:<16} {:<24} {:<28} {}", "", "NAME", "TITLE", "VIA", "URL");
    for (name, env) in &config.targets {
        let marker = if Some(name.as_str()) == default { "*" } else { "" };
        let via = env
            .ssh_host()
            .map(|h| format!("ssh {h}"))
            .unwrap_or_else(|| "local".to_string());
        println!(
            "  {:<2} {:<16} {:<24} {:<28} {}",
            marker, name, env.title, via, env.url
        );
    }
    println!("\n  Backups: {}", config.backups_dir());

    Ok(())
}
