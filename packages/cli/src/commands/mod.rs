pub mod apply;
pub mod init;
pub mod preview;
pub mod render;
pub mod validate;

pub use apply::{apply, ApplyArgs};
pub use init::{init, InitArgs};
pub use preview::{preview, PreviewArgs};
pub use render::{render, RenderArgs};
pub use validate::{validate, ValidateArgs};

use anyhow::{Context, Result};
use blockmail_editor::DocumentHandle;
use blockmail_model::Theme;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load a document given relative to `cwd`.
pub(crate) fn load_document(cwd: &Path, path: &Path) -> Result<DocumentHandle> {
    let path = cwd.join(path);
    debug!(path = %path.display(), "Loading document");
    DocumentHandle::load(&path).with_context(|| format!("Failed to load {}", path.display()))
}

pub(crate) fn load_theme(cwd: &Path, path: Option<&Path>) -> Result<Option<Theme>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let path = cwd.join(path);
    let source = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let theme = serde_json::from_str(&source).with_context(|| format!("Invalid theme {}", path.display()))?;
    Ok(Some(theme))
}

/// Print `html` or write it to `out`, else to `<out_dir>/<document stem>.<suffix>.html`.
pub(crate) fn emit_html(
    html: &str,
    stdout: bool,
    out: Option<&Path>,
    document: &Path,
    default_dir: PathBuf,
    suffix: Option<&str>,
) -> Result<String> {
    if stdout {
        println!("{}", html);
        return Ok("stdout".to_string());
    }

    let output_file = match out {
        Some(out) => out.to_path_buf(),
        None => {
            let stem = document
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("document");
            let name = match suffix {
                Some(suffix) => format!("{}.{}.html", stem, suffix),
                None => format!("{}.html", stem),
            };
            default_dir.join(name)
        }
    };

    if let Some(parent) = output_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output_file, html)?;
    debug!(path = %output_file.display(), bytes = html.len(), "Wrote HTML");
    Ok(output_file.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_emit_html_default_and_explicit_paths() {
        let temp_dir = TempDir::new().unwrap();
        let dist = temp_dir.path().join("dist");

        let target = emit_html(
            "<p>a</p>",
            false,
            None,
            Path::new("docs/welcome.json"),
            dist.clone(),
            Some("preview"),
        )
        .unwrap();
        assert_eq!(target, dist.join("welcome.preview.html").display().to_string());
        assert_eq!(fs::read_to_string(dist.join("welcome.preview.html")).unwrap(), "<p>a</p>");

        let out = temp_dir.path().join("nested/out.html");
        emit_html("<p>b</p>", false, Some(&out), Path::new("x.json"), dist, None).unwrap();
        assert_eq!(fs::read_to_string(out).unwrap(), "<p>b</p>");
    }

    #[test]
    fn test_missing_document_names_path() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_document(temp_dir.path(), Path::new("nope.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("nope.json"));
    }
}
