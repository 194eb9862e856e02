//! Filepath: src/infra/tmp.rs
//! Temp-dir staging for the two files this tool ever writes:
//! the snippet handed to the external linter and the optional
//! debug dump of the parsed tree. Files are written once and
//! read once, never concurrently.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

/// Environment variable overriding the temp-dir root.
pub const TMPDIR_ENV: &str = "PYTUTOR_TMPDIR";

/// Filename for the debug dump of the parsed tree.
pub const TREE_DUMP_FNAME: &str = "ast_output.scm";

/// Resolve the temp root: `$PYTUTOR_TMPDIR` if set, otherwise the
/// OS temp dir, with a `pytutor` subfolder either way.
pub fn tmp_root() -> PathBuf {
    let base = std::env::var_os(TMPDIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir);
    base.join("pytutor")
}

/// Ensure the temp root exists and return it.
fn ensure_tmp_root() -> Result<PathBuf> {
    let root = tmp_root();
    fs::create_dir_all(&root)
        .with_context(|| format!("Failed to create temp dir {}", root.display()))?;
    Ok(root)
}

/// Stage a snippet for the external linter. The file must end with
/// exactly one newline: end-of-file checks only trigger with a
/// trailing newline, and a second one triggers blank-line checks.
pub fn stage_snippet(snippet: &str) -> Result<NamedTempFile> {
    use std::io::Write;

    let root = ensure_tmp_root()?;
    let mut file = tempfile::Builder::new()
        .prefix("snippet-")
        .suffix(".py")
        .tempfile_in(&root)
        .context("Failed to create staging file for linter")?;

    file.write_all(snippet.trim_end_matches('\n').as_bytes())
        .and_then(|()| file.write_all(b"\n"))
        .context("Failed to write staged snippet")?;

    Ok(file)
}

/// Write the S-expression dump of a parsed tree for debugging and
/// return the path written to.
pub fn dump_tree(sexp: &str) -> Result<PathBuf> {
    let root = ensure_tmp_root()?;
    let path = root.join(TREE_DUMP_FNAME);
    fs::write(&path, sexp)
        .with_context(|| format!("Failed to write tree dump {}", path.display()))?;
    Ok(path)
}
