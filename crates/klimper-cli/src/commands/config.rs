//! Configuration management command.

use std::path::Path;

use clap::{Args, Subcommand};
use klimper_config::{KlimperConfig, default_config_path};

use super::common::load_config;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,

    /// Print the built-in defaults as TOML
    Default,

    /// Print the path of the user configuration file
    Path,

    /// Write the defaults to the configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate the configuration and report every problem
    Check,
}

pub fn run(args: ConfigArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    match args.command.unwrap_or(ConfigCommand::Show) {
        ConfigCommand::Show => {
            let config = load_config(config_path)?;
            print!("{}", config.to_toml()?);
        }

        ConfigCommand::Default => {
            print!("{}", KlimperConfig::default().to_toml()?);
        }

        ConfigCommand::Path => {
            println!("{}", default_config_path().display());
        }

        ConfigCommand::Init { force } => {
            let path = config_path.map_or_else(default_config_path, Path::to_path_buf);
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            KlimperConfig::default().save(&path)?;
            println!("Wrote {}", path.display());
        }

        ConfigCommand::Check => {
            let config = load_config(config_path)?;
            config.validate()?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}
