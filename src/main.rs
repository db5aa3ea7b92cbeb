use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use secretscan_plugins::{Config, PluginClass, PluginRegistry};

/// Secretscan plugins - inspect the detector plugin registry
#[derive(Parser)]
#[command(name = "secretscan-plugins", version, about)]
struct Cli {
    /// Config file (defaults to secretscan.toml in the user config directory)
    #[arg(short, long, env = "SECRETSCAN_CONFIG")]
    config: Option<PathBuf>,

    /// Additional plugin file or directory (repeatable, scanned in order)
    #[arg(long = "custom-plugins", value_name = "PATH")]
    custom_plugins: Vec<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List concrete plugin classes
    List,
    /// Show the secret type to class name mapping
    SecretTypes,
    /// Show the plugin class that detects a secret type
    Resolve {
        /// Secret type label (e.g., "AWS Access Key")
        secret_type: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn,secretscan_plugins=info",
        1 => "info,secretscan_plugins=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_with_options(cli.config.as_deref())?
        .with_custom_plugin_paths(cli.custom_plugins);
    tracing::debug!(?config, "loaded configuration");

    let registry = PluginRegistry::from_config(&config);
    let paths = &config.custom_plugin_paths;

    let output = match cli.command {
        Command::List => {
            let plugins = registry.import_plugins(paths)?;
            let classes: Vec<&PluginClass> = plugins.values().map(|plugin| &**plugin).collect();
            serde_json::to_string_pretty(&classes)?
        }
        Command::SecretTypes => {
            let index = registry.secret_type_index(paths)?;
            serde_json::to_string_pretty(&*index)?
        }
        Command::Resolve { secret_type } => {
            let class = registry
                .class_for_secret_type(paths, &secret_type)?
                .ok_or_else(|| anyhow::anyhow!("no plugin detects secret type '{secret_type}'"))?;
            serde_json::to_string_pretty(&*class)?
        }
    };

    println!("{output}");
    Ok(())
}
