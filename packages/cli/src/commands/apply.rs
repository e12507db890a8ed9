use super::load_document;
use crate::config::Config;
use anyhow::{Context, Result};
use blockmail_editor::{EditorState, Mutation, MutationOutcome};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Document JSON file, rewritten in place
    pub document: PathBuf,

    /// JSON array of mutations, e.g. `[{ "op": "delete", "id": "b1" }]`
    pub mutations: PathBuf,

    /// Print the resulting document instead of saving it
    #[arg(long)]
    pub dry_run: bool,
}

pub fn apply(args: ApplyArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let mut handle = load_document(cwd, &args.document)?;

    let path = cwd.join(&args.mutations);
    let source = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mutations: Vec<Mutation> =
        serde_json::from_str(&source).with_context(|| format!("Invalid mutations {}", path.display()))?;

    let mut state = EditorState::new(handle.document().clone(), config.editor_config());
    let mut applied = 0;
    for (index, mutation) in mutations.into_iter().enumerate() {
        debug!(index, ?mutation, "Applying mutation");
        match state
            .apply(mutation)
            .with_context(|| format!("Mutation #{} rejected", index + 1))?
        {
            MutationOutcome::Applied { .. } => applied += 1,
            MutationOutcome::Noop => {
                println!("  {} mutation #{} matched nothing", "⚠️".yellow(), index + 1);
            }
        }
    }

    handle.replace(state.to_document());
    if args.dry_run {
        println!("{}", handle.to_json()?);
        return Ok(());
    }

    handle.save()?;
    println!(
        "{} Applied {} mutation(s) to {}",
        "✅".green(),
        applied,
        args.document.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockmail_model::{BlockId, BlockKind, Document};
    use tempfile::TempDir;

    const DOCUMENT: &str = r#"{"blocks": [
        {"id": "t", "type": "text", "content": "old"},
        {"id": "d", "type": "divider"}
    ]}"#;

    fn project(mutations: &str) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("doc.json"), DOCUMENT).unwrap();
        fs::write(temp_dir.path().join("edits.json"), mutations).unwrap();
        temp_dir
    }

    fn args(dry_run: bool) -> ApplyArgs {
        ApplyArgs {
            document: PathBuf::from("doc.json"),
            mutations: PathBuf::from("edits.json"),
            dry_run,
        }
    }

    fn saved(temp_dir: &TempDir) -> Document {
        Document::from_json(&fs::read_to_string(temp_dir.path().join("doc.json")).unwrap()).unwrap()
    }

    const EDITS: &str = r#"[
        {"op": "updateField", "id": "t", "field": "content", "value": "new"},
        {"op": "delete", "id": "d"},
        {"op": "delete", "id": "gone"}
    ]"#;

    #[test]
    fn test_apply_saves_mutated_document() {
        let temp_dir = project(EDITS);
        apply(args(false), temp_dir.path()).unwrap();

        let document = saved(&temp_dir);
        assert_eq!(document.blocks.len(), 1);
        assert_eq!(document.blocks.blocks[0].id, BlockId::from("t"));
        assert_eq!(
            document.blocks.blocks[0].kind,
            BlockKind::Text {
                content: "new".to_string()
            }
        );
    }

    #[test]
    fn test_dry_run_leaves_file_alone() {
        let temp_dir = project(EDITS);
        apply(args(true), temp_dir.path()).unwrap();
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("doc.json")).unwrap(),
            DOCUMENT
        );
    }

    #[test]
    fn test_rejected_mutation_aborts_without_saving() {
        let temp_dir = project(
            r#"[
                {"op": "delete", "id": "d"},
                {"op": "updateField", "id": "t", "field": "type", "value": "image"}
            ]"#,
        );
        let err = apply(args(false), temp_dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Mutation #2 rejected"));
        assert_eq!(saved(&temp_dir).blocks.len(), 2);
    }

    #[test]
    fn test_malformed_mutations_are_reported() {
        let temp_dir = project(r#"[{"op": "explode"}]"#);
        let err = apply(args(false), temp_dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid mutations"));
    }
}
