use super::{emit_html, load_document, load_theme};
use crate::config::Config;
use anyhow::Result;
use blockmail_compiler_html::{render_document, RenderOptions};
use blockmail_model::validate_tree;
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Document JSON file
    pub document: PathBuf,

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

pub fn render(args: RenderArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let handle = load_document(cwd, &args.document)?;
    let theme = load_theme(cwd, args.theme.as_deref())?;

    // Rendering is total; structural problems are only reported.
    let issues = validate_tree(&handle.document().blocks);
    debug!(issues = issues.len(), "Validated block tree");
    if !issues.is_empty() && !args.stdout {
        eprintln!(
            "{} {} structural issue(s), run `blockmail validate` for details",
            "⚠️".yellow(),
            issues.len()
        );
    }

    let options = RenderOptions::export()
        .with_theme(theme)
        .with_pretty(config.pretty_html);
    let html = render_document(handle.document(), &options);

    let target = emit_html(
        &html,
        args.stdout,
        args.out.as_deref(),
        &args.document,
        config.get_out_dir(cwd),
        None,
    )?;
    if !args.stdout {
        println!("  {} {} → {}", "✓".green(), args.document.display(), target);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(out: Option<PathBuf>) -> RenderArgs {
        RenderArgs {
            document: PathBuf::from("doc.json"),
            theme: None,
            stdout: false,
            out,
        }
    }

    #[test]
    fn test_render_writes_export_html() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("doc.json"),
            r#"{"blocks": [
                {"id": "t", "type": "text", "content": "Hello {{contacts.first_name}}"},
                {"id": "e", "type": "text", "content": ""}
            ]}"#,
        )
        .unwrap();

        render(args(None), temp_dir.path()).unwrap();

        let html = fs::read_to_string(temp_dir.path().join("dist/doc.html")).unwrap();
        assert!(html.contains("Hello {{contacts.first_name}}"));
        assert!(!html.contains(blockmail_compiler_html::placeholders::PLACEHOLDER_TEXT));
    }

    #[test]
    fn test_render_honours_out_and_theme() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("doc.json"),
            r#"{"blocks": [{"id": "b", "type": "button", "label": "Go", "url": "https://shop.test"}]}"#,
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("theme.json"),
            r##"{"components": {"button": {"backgroundColor": "#123456"}}}"##,
        )
        .unwrap();

        let mut args = args(Some(temp_dir.path().join("out/email.html")));
        args.theme = Some(PathBuf::from("theme.json"));
        render(args, temp_dir.path()).unwrap();

        let html = fs::read_to_string(temp_dir.path().join("out/email.html")).unwrap();
        assert!(html.contains("https://shop.test"));
        assert!(html.contains("#123456"));
    }
}
