//! Provider profile management commands.

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use comfy_table::Cell;
use dialoguer::{Password, theme::ColorfulTheme};
use quill_config::StoreOutcome;
use quill_models::{ApiKey, CustomHeader, NewProviderConfig, ProviderConfig, ProviderConfigPatch};
use serde::Serialize;

use super::{Context, resolve_id};
use crate::output::{print_json, print_success, short_id, table};

#[derive(Args, Debug)]
pub struct ProvidersArgs {
    #[command(subcommand)]
    pub command: ProvidersCommand,
}

#[derive(Subcommand, Debug)]
pub enum ProvidersCommand {
    /// List provider profiles
    List,
    /// Add a provider profile
    Add(AddArgs),
    /// Change fields of a provider profile
    Update(UpdateArgs),
    /// Remove a provider profile
    Remove {
        /// Profile id, id prefix, or name
        profile: String,
    },
    /// Select the profile used for generation
    Use {
        /// Profile id, id prefix, or name
        #[arg(required_unless_present = "none")]
        profile: Option<String>,

        /// Clear the selection
        #[arg(long, conflicts_with = "profile")]
        none: bool,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// Base URL of the OpenAI-compatible API (e.g., https://api.openai.com)
    #[arg(long)]
    pub endpoint: String,

    /// Default model identifier
    #[arg(long)]
    pub model: String,

    /// API key (prompted for when omitted)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Extra request header, repeatable
    #[arg(long = "header", value_name = "KEY=VALUE", value_parser = parse_header)]
    pub headers: Vec<CustomHeader>,

    /// Request timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Retries for transient failures
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Store the profile disabled
    #[arg(long)]
    pub disabled: bool,

    /// Select the new profile for generation
    #[arg(long)]
    pub activate: bool,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Profile id, id prefix, or name
    pub profile: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub endpoint: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long, conflicts_with = "prompt_key")]
    pub api_key: Option<String>,

    /// Enter a new API key interactively
    #[arg(long)]
    pub prompt_key: bool,

    /// Replace the extra headers, repeatable
    #[arg(long = "header", value_name = "KEY=VALUE", value_parser = parse_header)]
    pub headers: Vec<CustomHeader>,

    /// Remove all extra headers
    #[arg(long, conflicts_with = "headers")]
    pub clear_headers: bool,

    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    #[arg(long)]
    pub max_retries: Option<u32>,

    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    #[arg(long)]
    pub disable: bool,
}

pub async fn run(ctx: Context, args: ProvidersArgs) -> Result<()> {
    match args.command {
        ProvidersCommand::List => list(&ctx).await,
        ProvidersCommand::Add(add_args) => add(&ctx, add_args).await,
        ProvidersCommand::Update(update_args) => update(&ctx, update_args).await,
        ProvidersCommand::Remove { profile } => remove(&ctx, &profile).await,
        ProvidersCommand::Use { profile, none } => {
            let profile = if none { None } else { profile };
            select(&ctx, profile.as_deref()).await
        }
    }
}

/// Profile as shown to the user; the credential never leaves the store.
#[derive(Debug, Serialize)]
struct ProfileView<'a> {
    id: &'a str,
    name: &'a str,
    endpoint: &'a str,
    model: &'a str,
    enabled: bool,
    selected: bool,
    timeout_secs: u64,
    max_retries: u32,
    headers: Vec<&'a str>,
    updated_at: DateTime<Utc>,
}

impl<'a> ProfileView<'a> {
    fn new(config: &'a ProviderConfig, active_id: Option<&str>) -> Self {
        Self {
            id: &config.id,
            name: &config.name,
            endpoint: &config.endpoint,
            model: &config.model,
            enabled: config.is_active,
            selected: active_id == Some(config.id.as_str()),
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
            headers: config.custom_headers.iter().map(|h| h.key.as_str()).collect(),
            updated_at: config.updated_at,
        }
    }
}

async fn list(ctx: &Context) -> Result<()> {
    let configs = ctx.store.configs().await;
    let active_id = ctx.store.active_id().await;
    let views: Vec<_> = configs
        .iter()
        .map(|c| ProfileView::new(c, active_id.as_deref()))
        .collect();

    if ctx.json {
        return print_json(&views);
    }

    if views.is_empty() {
        println!("No provider profiles configured.");
        println!();
        println!("Add one with: quill providers add --name <name> --endpoint <url> --model <model>");
        return Ok(());
    }

    let mut table = table(&["", "ID", "Name", "Endpoint", "Model", "Enabled", "Updated"]);
    for view in &views {
        table.add_row(vec![
            Cell::new(if view.selected { "*" } else { "" }),
            Cell::new(short_id(view.id)),
            Cell::new(view.name),
            Cell::new(view.endpoint),
            Cell::new(view.model),
            Cell::new(if view.enabled { "yes" } else { "no" }),
            Cell::new(view.updated_at.format("%Y-%m-%d %H:%M")),
        ]);
    }
    println!("{table}");
    Ok(())
}

async fn add(ctx: &Context, args: AddArgs) -> Result<()> {
    ctx.ensure_writable().await?;

    let api_key = match args.api_key {
        Some(key) => ApiKey::new(key),
        None => prompt_api_key(&args.name)?,
    };
    let mut new = NewProviderConfig::new(args.name, args.endpoint, api_key, args.model)
        .with_timeout_secs(args.timeout.unwrap_or(ctx.settings.provider.timeout_secs))
        .with_max_retries(args.max_retries.unwrap_or(ctx.settings.provider.max_retries))
        .with_active(!args.disabled);
    new.custom_headers = args.headers;

    let first = ctx.store.configs().await.is_empty();
    let config = ctx.store.add(new).await;
    if args.activate || first {
        let _ = ctx.store.set_active(Some(&config.id)).await;
    }
    ctx.store.close().await?;

    let active_id = ctx.store.active_id().await;
    if ctx.json {
        return print_json(&ProfileView::new(&config, active_id.as_deref()));
    }
    print_success(&format!("Added profile '{}' ({})", config.name, short_id(&config.id)))?;
    if active_id.as_deref() == Some(config.id.as_str()) {
        println!("  Selected for generation.");
    }
    Ok(())
}

async fn update(ctx: &Context, args: UpdateArgs) -> Result<()> {
    ctx.ensure_writable().await?;
    let id = resolve_id(&ctx.store.configs().await, &args.profile)?;

    let api_key = match (args.api_key, args.prompt_key) {
        (Some(key), _) => Some(ApiKey::new(key)),
        (None, true) => Some(prompt_api_key(&args.profile)?),
        (None, false) => None,
    };
    let custom_headers = if args.clear_headers {
        Some(Vec::new())
    } else if args.headers.is_empty() {
        None
    } else {
        Some(args.headers)
    };
    let is_active = match (args.enable, args.disable) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };
    let patch = ProviderConfigPatch {
        name: args.name,
        endpoint: args.endpoint,
        api_key,
        model: args.model,
        custom_headers,
        timeout_secs: args.timeout,
        max_retries: args.max_retries,
        is_active,
    };
    if patch.is_empty() {
        bail!("Nothing to update. Pass at least one field, e.g. --model <model>");
    }

    let updated = match ctx.store.update(&id, patch).await {
        StoreOutcome::Done(config) => config,
        StoreOutcome::NotFound => bail!("Profile '{}' not found", args.profile),
        StoreOutcome::Failed(message) => bail!(message),
    };
    ctx.store.close().await?;

    if ctx.json {
        let active_id = ctx.store.active_id().await;
        return print_json(&ProfileView::new(&updated, active_id.as_deref()));
    }
    print_success(&format!("Updated profile '{}'", updated.name))?;
    Ok(())
}

async fn remove(ctx: &Context, reference: &str) -> Result<()> {
    ctx.ensure_writable().await?;
    let id = resolve_id(&ctx.store.configs().await, reference)?;

    let removed = match ctx.store.remove(&id).await {
        StoreOutcome::Done(config) => config,
        StoreOutcome::NotFound => bail!("Profile '{reference}' not found"),
        StoreOutcome::Failed(message) => bail!(message),
    };
    ctx.store.close().await?;

    if ctx.json {
        return print_json(&ProfileView::new(&removed, None));
    }
    print_success(&format!("Removed profile '{}'", removed.name))?;
    Ok(())
}

async fn select(ctx: &Context, reference: Option<&str>) -> Result<()> {
    ctx.ensure_writable().await?;
    let id = match reference {
        Some(reference) => Some(resolve_id(&ctx.store.configs().await, reference)?),
        None => None,
    };

    match ctx.store.set_active(id.as_deref()).await {
        StoreOutcome::Done(_) => {}
        StoreOutcome::NotFound => bail!("Profile '{}' not found", reference.unwrap_or_default()),
        StoreOutcome::Failed(message) => bail!(message),
    }
    ctx.store.close().await?;

    let active = ctx.store.active_config().await;
    if ctx.json {
        return print_json(&serde_json::json!({ "active_id": active.as_ref().map(|c| &c.id) }));
    }
    match active {
        Some(config) => print_success(&format!("Using profile '{}' for generation", config.name))?,
        None => print_success("Cleared the active profile")?,
    }
    Ok(())
}

fn prompt_api_key(profile: &str) -> Result<ApiKey> {
    println!("Enter API key for {profile}");
    let key = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("API key")
        .interact()?;

    if key.is_empty() {
        bail!("API key cannot be empty");
    }
    Ok(ApiKey::new(key))
}

/// Parse a `KEY=VALUE` header argument.
fn parse_header(raw: &str) -> Result<CustomHeader, String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("header name cannot be empty".to_string());
    }
    Ok(CustomHeader::new(key, value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct ProvidersCli {
        #[command(subcommand)]
        command: ProvidersCommand,
    }

    fn parse(args: &[&str]) -> Result<ProvidersCommand, clap::Error> {
        ProvidersCli::try_parse_from(std::iter::once("providers").chain(args.iter().copied()))
            .map(|cli| cli.command)
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let add = ["add", "--name", "A", "--endpoint", "http://x", "--model", "m"];

        let err = parse(&[&add[..], &["--timeout", "0"][..]].concat()).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert!(parse(&["update", "A", "--timeout", "0"]).is_err());

        match parse(&[&add[..], &["--timeout", "5"][..]].concat()).unwrap() {
            ProvidersCommand::Add(args) => assert_eq!(args.timeout, Some(5)),
            other => panic!("unexpected command: {other:?}"),
        }
        match parse(&["update", "A", "--timeout", "1"]).unwrap() {
            ProvidersCommand::Update(args) => assert_eq!(args.timeout, Some(1)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parse_header_splits_on_first_equals() {
        let header = parse_header("X-Token = a=b").unwrap();
        assert_eq!(header.key, "X-Token");
        assert_eq!(header.value, "a=b");
    }

    #[test]
    fn parse_header_rejects_malformed() {
        assert!(parse_header("no-separator").is_err());
        assert!(parse_header("=value").is_err());
    }

    #[test]
    fn profile_view_hides_credential() {
        let config = NewProviderConfig::new("Main", "https://api.example.com", "sk-secret", "gpt-4o")
            .with_header("X-Org", "writers")
            .into_config("id-1", Utc::now());

        let json = serde_json::to_string(&ProfileView::new(&config, Some("id-1"))).unwrap();
        assert!(!json.contains("sk-secret"));
        assert!(json.contains("\"selected\":true"));
        assert!(json.contains("X-Org"));
        assert!(!json.contains("writers"));
    }
}
