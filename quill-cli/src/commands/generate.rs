//! Text generation through the active profile.

use anyhow::{Result, bail};
use clap::Args;
use quill_config::StoreOutcome;
use quill_models::providers::GenerationRequest;
use tokio::io::AsyncReadExt;
use tracing::debug;

use super::Context;
use crate::output::print_json;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Prompt text, or "-" to read it from stdin
    pub prompt: String,

    /// Model to use instead of the profile's default
    #[arg(long)]
    pub model: Option<String>,

    /// Maximum tokens to generate
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Sampling temperature
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Nucleus sampling cutoff
    #[arg(long)]
    pub top_p: Option<f32>,
}

impl GenerateArgs {
    fn into_request(self, prompt: String) -> GenerationRequest {
        GenerationRequest {
            prompt,
            model: self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }
}

pub async fn run(ctx: Context, args: GenerateArgs) -> Result<()> {
    let prompt = if args.prompt == "-" {
        let mut buffer = String::new();
        tokio::io::stdin().read_to_string(&mut buffer).await?;
        buffer
    } else {
        args.prompt.clone()
    };
    if prompt.trim().is_empty() {
        bail!("Prompt cannot be empty");
    }

    let request = args.into_request(prompt);
    debug!(model = ?request.model, "generating text");

    let result = match ctx.store.generate_text(&request).await {
        StoreOutcome::Done(result) => result,
        StoreOutcome::NotFound => {
            bail!("No active profile. Select one with: quill providers use <profile>")
        }
        StoreOutcome::Failed(message) => bail!(message),
    };

    if ctx.json {
        return print_json(&result);
    }

    println!("{}", result.content);
    if let Some(usage) = result.usage {
        eprintln!(
            "\n[{}] {} prompt + {} completion = {} tokens",
            result.model, usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        );
    }
    Ok(())
}
