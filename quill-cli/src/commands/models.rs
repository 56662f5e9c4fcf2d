//! Model listing commands.
//!
//! Lists the models a provider profile exposes, as reported by its
//! `/v1/models` endpoint. Lists are cached in the data directory between
//! runs until `--refresh` or `--clear-cache`.

use anyhow::{Result, bail};
use clap::Args;
use comfy_table::{Cell, Color};
use quill_config::StoreOutcome;
use quill_models::{Availability, Capability, ModelDescriptor};

use super::Context;
use crate::output::{print_json, print_success, table};

#[derive(Args, Debug)]
pub struct ModelsArgs {
    /// Profile id, id prefix, or name (defaults to the active profile)
    pub profile: Option<String>,

    /// Ignore cached results and ask the provider again
    #[arg(long)]
    pub refresh: bool,

    /// Drop every cached model list and exit
    #[arg(long, conflicts_with = "refresh")]
    pub clear_cache: bool,
}

pub async fn run(ctx: Context, args: ModelsArgs) -> Result<()> {
    if args.clear_cache {
        ctx.store.clear_all_model_cache().await;
        if !ctx.json {
            print_success("Model cache cleared")?;
        }
        return Ok(());
    }

    let config = ctx.resolve_or_active(args.profile.as_deref()).await?;
    let outcome = if args.refresh {
        ctx.store.refresh_models(&config.id).await
    } else {
        ctx.store.load_models(&config.id, false).await
    };

    let models = match outcome {
        StoreOutcome::Done(models) => models,
        StoreOutcome::NotFound => bail!("Profile '{}' not found", config.name),
        StoreOutcome::Failed(message) => bail!(message),
    };

    if ctx.json {
        return print_json(&models);
    }

    if models.is_empty() {
        println!("{} reported no models.", config.name);
        return Ok(());
    }

    let mut table = table(&["Model", "Type", "Capabilities", "Max tokens", "Cost / 1K", "Status"]);
    for model in &models {
        let status = match model.availability {
            Availability::Available => Cell::new("available").fg(Color::Green),
            Availability::Unavailable => Cell::new("unavailable").fg(Color::Red),
        };
        table.add_row(vec![
            Cell::new(&model.id),
            Cell::new(model.kind.as_str()),
            Cell::new(format_capabilities(&model.capabilities)),
            Cell::new(format_optional(model.max_tokens)),
            Cell::new(format_cost(model)),
            status,
        ]);
    }

    println!("{table}");
    Ok(())
}

/// Format capabilities as a comma-separated string.
fn format_capabilities(capabilities: &[Capability]) -> String {
    if capabilities.is_empty() {
        return "-".to_string();
    }
    capabilities
        .iter()
        .map(Capability::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_optional<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn format_cost(model: &ModelDescriptor) -> String {
    model
        .cost_per_1k_tokens
        .map_or_else(|| "-".to_string(), |cost| format!("${cost:.4}"))
}
