use super::{emit_html, load_document, load_theme};
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use blockmail_compiler_html::{render_document, RenderOptions};
use blockmail_resolver::{
    load_profile, tokens, OfferBlockResolver, PreviewOutput, Previewer, Profile, ResolveOutcome,
    StaticOfferSource, StaticProfileSource,
};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Document JSON file
    pub document: PathBuf,

    /// Test profile JSON (a single contact, or a map of them with --profile-id)
    #[arg(short, long)]
    pub profile: Option<PathBuf>,

    /// Pick one contact out of a profile map
    #[arg(long, requires = "profile")]
    pub profile_id: Option<String>,

    /// Offer decision fixtures keyed by decision id
    #[arg(long)]
    pub offers: Option<PathBuf>,

    /// Theme JSON file
    #[arg(short, long)]
    pub theme: Option<PathBuf>,

    /// Output to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,

    /// Output file (overrides config outDir)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub async fn preview(args: PreviewArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let handle = load_document(cwd, &args.document)?;
    let theme = load_theme(cwd, args.theme.as_deref())?;
    let profile = read_profile(cwd, &args, &config).await?;

    let offers = match &args.offers {
        Some(path) => {
            let path = cwd.join(path);
            let source = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            StaticOfferSource::from_json(&source)
                .with_context(|| format!("Invalid offer fixtures {}", path.display()))?
        }
        None => StaticOfferSource::default(),
    };

    let mut options = RenderOptions::preview()
        .with_theme(theme)
        .with_pretty(config.pretty_html);
    options.simulate_content = config.simulate_content;
    let html = render_document(handle.document(), &options);

    let unresolved = unresolved_tokens(&html, profile.as_ref());
    debug!(unresolved = unresolved.len(), "Rendered preview document");

    let previewer = Previewer::new(OfferBlockResolver::new(
        Arc::new(offers),
        config.resolver_config(),
    ));
    let output = PreviewOutput::new();
    let html = match previewer.preview(&html, profile.as_ref(), &output).await {
        ResolveOutcome::Current { html, .. } => html,
        ResolveOutcome::Superseded { .. } => return Err(anyhow!("Preview was superseded")),
    };

    let target = emit_html(
        &html,
        args.stdout,
        args.out.as_deref(),
        &args.document,
        config.get_out_dir(cwd),
        Some("preview"),
    )?;
    if !args.stdout {
        println!("  {} {} → {}", "✓".green(), args.document.display(), target);
        if !unresolved.is_empty() {
            println!(
                "  {} Unresolved tokens: {}",
                "⚠️".yellow(),
                unresolved.join(", ").dimmed()
            );
        }
    }
    Ok(())
}

/// Tokens in `html` the profile has no value for (all of them without a profile).
fn unresolved_tokens(html: &str, profile: Option<&Profile>) -> Vec<String> {
    let Some(profile) = profile else {
        return tokens(html);
    };
    tokens(html)
        .into_iter()
        .filter(|token| {
            token
                .split_once('.')
                .map_or(true, |(_, field)| profile.get(field).is_none())
        })
        .collect()
}

async fn read_profile(cwd: &Path, args: &PreviewArgs, config: &Config) -> Result<Option<Profile>> {
    let Some(path) = &args.profile else {
        return Ok(None);
    };
    let path = cwd.join(path);
    let source = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    match &args.profile_id {
        Some(id) => {
            let profiles = StaticProfileSource::from_json(&source)
                .with_context(|| format!("Invalid profile map {}", path.display()))?;
            let profile = load_profile(&profiles, id, &config.resolver_config()).await?;
            Ok(Some(profile))
        }
        None => {
            let value: serde_json::Value = serde_json::from_str(&source)
                .with_context(|| format!("Invalid profile {}", path.display()))?;
            Profile::from_value(value)
                .map(Some)
                .ok_or_else(|| anyhow!("Profile {} must be a JSON object", path.display()))
        }
    }
}
