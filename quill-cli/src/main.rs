use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod output;

use commands::Context;
use config::ConfigLoader;

#[derive(Parser)]
#[command(name = "quill", about = "Manage AI provider profiles and generate text")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage provider profiles
    Providers(commands::providers::ProvidersArgs),
    /// Test the connection to a provider
    Test(commands::test::TestArgs),
    /// List the models a provider offers
    Models(commands::models::ModelsArgs),
    /// Generate text with the active profile
    Generate(commands::generate::GenerateArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = ConfigLoader::load()?;
    let json = cli.json;

    match cli.command {
        Commands::Config(args) => commands::config::run(&settings, args),
        Commands::Providers(args) => {
            commands::providers::run(Context::open(settings, json).await, args).await
        }
        Commands::Test(args) => commands::test::run(Context::open(settings, json).await, args).await,
        Commands::Models(args) => {
            commands::models::run(Context::open(settings, json).await, args).await
        }
        Commands::Generate(args) => {
            commands::generate::run(Context::open(settings, json).await, args).await
        }
    }
}
