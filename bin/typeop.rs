use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use typeop::config::Config;
use typeop::extensions::builtin::register_builtin_types;
use typeop::extensions::registry::TypeRegistry;

#[cfg_attr(not(feature = "extensions"), allow(unused_variables))]
fn run(config: &Config) -> typeop::Result<TypeRegistry> {
    let registry = TypeRegistry::new();
    register_builtin_types(&registry)?;

    #[cfg(feature = "extensions")]
    {
        let loaded = typeop::extensions::loader::load_all_extensions(&registry, config.enabled_extensions())?;
        info!(loaded, "extensions loaded");
    }

    Ok(registry)
}

pub fn main() -> ExitCode {
    let config = Config::from_env();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_filter()))
        .with_writer(std::io::stderr)
        .init();

    let registry = match run(&config) {
        Ok(registry) => registry,
        Err(e) => {
            error!(error = %e, "type registration failed");
            return ExitCode::FAILURE;
        }
    };
    info!(types = registry.len(), "type catalog ready");

    let report = registry.report();
    let output = if config.pretty() {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    };
    match output {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "failed to serialize catalog report");
            ExitCode::FAILURE
        }
    }
}
