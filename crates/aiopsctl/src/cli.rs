use aiops_core::ConnectionConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::commands;
use crate::output::Format;

/// aiopsctl - run Bedrock Agents and DevOps Guru modules
#[derive(Parser, Debug)]
#[command(name = "aiopsctl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Connection defaults file (YAML): region, profile, endpoint_url, ...
    #[arg(long, global = true, env = "AIOPS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a module (verb-first: run bedrock_agent args.yaml)
    Run {
        /// Module name
        module: String,

        /// Arguments file (JSON or YAML), optionally wrapped in ANSIBLE_MODULE_ARGS
        args_file: Option<PathBuf>,

        /// Extra argument as key=value; numbers, booleans, [lists] and {maps} are typed, the rest is a string
        #[arg(short = 'a', long = "arg", value_name = "KEY=VALUE")]
        args: Vec<String>,

        /// Report what would change without changing anything
        #[arg(long)]
        check: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        output: Format,
    },

    /// List resources (verb-first: get modules)
    Get {
        /// Resource type (modules)
        resource_type: String,

        /// Output format (wide, json, yaml, name)
        #[arg(short, long, default_value = "wide")]
        output: String,
    },

    /// Describe a resource in detail (verb-first: describe module <name>)
    Describe {
        /// Resource type (module)
        resource_type: String,

        /// Resource name
        name: String,

        /// Output format (text, json, yaml)
        #[arg(short, long, default_value = "text")]
        output: String,
    },

    /// Show version information
    Version,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: commands::completion::Shell,
    },
}

impl Cli {
    pub async fn execute(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Commands::Run {
                module,
                args_file,
                args,
                check,
                output,
            } => {
                let config = load_config(self.config.as_deref())?;
                commands::run::execute(&module, args_file.as_deref(), &args, check, output, config).await
            }
            Commands::Get { resource_type, output } => {
                commands::get::execute(&resource_type, &output)?;
                Ok(ExitCode::SUCCESS)
            }
            Commands::Describe {
                resource_type,
                name,
                output,
            } => {
                commands::describe::execute(&resource_type, &name, &output)?;
                Ok(ExitCode::SUCCESS)
            }
            Commands::Version => {
                commands::version::execute();
                Ok(ExitCode::SUCCESS)
            }
            Commands::Completion { shell } => {
                commands::completion::execute(shell)?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

/// Load the connection defaults file, if one was given
fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<Option<ConnectionConfig>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let config = ConnectionConfig::from_file(path)?;
    tracing::info!("Loaded connection defaults from {:?}", path);
    Ok(Some(config))
}
