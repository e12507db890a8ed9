use super::load_document;
use anyhow::{anyhow, Result};
use blockmail_compiler_html::{render_document, RenderOptions};
use blockmail_model::validate_tree;
use blockmail_resolver::{find_markers, tokens};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Document JSON files
    #[arg(required = true)]
    pub documents: Vec<PathBuf>,
}

pub fn validate(args: ValidateArgs, cwd: &Path) -> Result<()> {
    let mut failed = 0;

    for path in &args.documents {
        let handle = match load_document(cwd, path) {
            Ok(handle) => handle,
            Err(err) => {
                failed += 1;
                eprintln!("  {} {} - {}", "✗".red(), path.display(), format!("{:#}", err).red());
                continue;
            }
        };

        let issues = validate_tree(&handle.document().blocks);
        debug!(path = %path.display(), issues = issues.len(), "Checked document");
        if issues.is_empty() {
            let html = render_document(handle.document(), &RenderOptions::export());
            println!(
                "  {} {} ({} personalization token(s), {} offer marker(s))",
                "✓".green(),
                path.display(),
                tokens(&html).len(),
                find_markers(&html).len()
            );
        } else {
            failed += 1;
            eprintln!("  {} {}", "✗".red(), path.display());
            for issue in &issues {
                eprintln!("      {}", issue.to_string().red());
            }
        }
    }

    println!();
    if failed == 0 {
        println!("{} {} document(s) valid", "✅".green(), args.documents.len());
        Ok(())
    } else {
        Err(anyhow!("{} of {} document(s) failed validation", failed, args.documents.len()))
    }
}
