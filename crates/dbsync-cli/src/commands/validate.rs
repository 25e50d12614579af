use dbsync_core::config::LOCAL_ENVIRONMENT;
use dbsync_core::DeploymentsConfig;

use super::ConfigArgs;

pub fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    println!("Validating {}...", args.config.display());

    let config = DeploymentsConfig::from_file(&args.config)?;
    println!("  YAML parsing: OK");
    println!("  Targets found: {}", config.targets.len());

    let environments =
        std::iter::once((LOCAL_ENVIRONMENT, &config.local)).chain(
            config.targets.iter().map(|(name, env)| (name.as_str(), env)),
        );
    for (name, env) in environments {
        if env.problems(name).is_empty() {
            println!("  Environment '{name}': OK");
        } else {
            println!("  Environment '{name}': INVALID");
        }
    }

    match (config.options.target.as_deref(), config.default_target_problem()) {
        (Some(default), Some(_)) => println!("  Default target '{default}': NOT FOUND"),
        (Some(default), None) => println!("  Default target '{default}': OK"),
        (None, _) => println!("  Default target: (none, --target required)"),
    }

    let errors = config.problems();
    println!();
    if errors.is_empty() {
        println!("Validation PASSED");
        Ok(())
    } else {
        println!("Validation FAILED with {} error(s):", errors.len());
        for err in &errors {
            eprintln!("  - {err}");
        }
        anyhow::bail!("{} invalid setting(s) in {}", errors.len(), args.config.display())
    }
}
