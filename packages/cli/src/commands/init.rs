use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use blockmail_editor::default_block;
use blockmail_model::{BlockKind, BlockTree, BlockType, BodyStyle, Document, IdGenerator, Variant};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Starter document file name
    #[arg(short, long, default_value = "welcome.json")]
    pub document: String,

    /// Force overwrite existing files
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Blockmail project...".bright_blue().bold());

    let config_json = serde_json::to_string_pretty(&Config::default())?;
    fs::write(&config_path, config_json)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    let document_path = cwd.join(&args.document);
    if !document_path.exists() || args.force {
        fs::write(&document_path, starter_document().to_json()?)?;
        println!("  {} Created {}", "✓".green(), args.document);
    }

    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {}", args.document);
    println!("  2. Run: blockmail render {}", args.document);
    println!("  3. Check output in dist/");

    Ok(())
}

/// Heading, a two-column row and a button.
fn starter_document() -> Document {
    let mut ids = IdGenerator::new();
    let mut heading = default_block(BlockType::Text, None, &mut ids);
    heading.kind = BlockKind::Text {
        content: "Hello {{contacts.first_name}},".to_string(),
    };
    let row = default_block(BlockType::Structure, Some(&Variant::parse("2-2")), &mut ids);
    let button = default_block(BlockType::Button, None, &mut ids);

    Document::new(BlockTree::from_blocks(vec![heading, row, button]), BodyStyle::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockmail_model::validate_tree;

    #[test]
    fn test_starter_document_is_valid() {
        let document = starter_document();
        assert_eq!(document.blocks.len(), 3);
        assert!(validate_tree(&document.blocks).is_empty());
        assert!(document.blocks.blocks[1].is_structure());
    }
}
