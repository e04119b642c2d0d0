//! `notorii config`: create and inspect `~/.notorii/config.yaml`.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use notorii_core::config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a default config file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Print the effective config, including environment overrides.
    Show,
}

pub fn run(command: ConfigCommand) -> Result<()> {
    let home = config::home().context("could not determine home directory")?;

    match command {
        ConfigCommand::Init { force } => {
            let path = config::init_at(&home, force).context("failed to write config")?;
            println!("wrote {}", path.display());
            println!("set notion.database_id, then export NOTION_TOKEN and TORII_API_KEY");
        }
        ConfigCommand::Show => {
            let path = config::config_path_at(&home);
            let effective = config::load_effective_at(&home).context("failed to load config")?;
            let source = if path.exists() {
                path.display().to_string()
            } else {
                "defaults (no config file)".to_string()
            };
            println!("# {source}");
            print!(
                "{}",
                serde_yaml::to_string(&effective).context("failed to render config")?
            );
            for name in [&effective.notion.token_env, &effective.torii.token_env] {
                println!("# {name}: {}", secret_status(name));
            }
        }
    }
    Ok(())
}

fn secret_status(name: &str) -> String {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => "set".green().to_string(),
        _ => "not set".red().to_string(),
    }
}
