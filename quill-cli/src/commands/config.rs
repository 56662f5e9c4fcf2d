use crate::config::{ConfigLoader, QuillConfig};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration (merged)
    Show,
    /// Show configuration file paths
    Path,
}

pub fn run(settings: &QuillConfig, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(settings),
        ConfigCommands::Path => show_paths(settings),
    }
}

fn show_config(settings: &QuillConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(settings)?;
    println!("{}", toml_str);
    Ok(())
}

fn show_paths(settings: &QuillConfig) -> Result<()> {
    println!("User config:    {}", ConfigLoader::user_config_path().display());
    println!("Project config: {}", ConfigLoader::project_config_path().display());
    println!("Profiles:       {}", settings.storage.dir.display());
    Ok(())
}
