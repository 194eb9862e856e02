//! Filepath: src/infra/walk.rs
//! Gitignore-aware project walker for Python modules.
//! - Respects .gitignore, .git/info/exclude, and global gitignore
//! - Extra ignore globs (early prune + late filter)
//! - Excluded folder names pruned during traversal (virtual envs,
//!   storage folders) so their contents are never visited
//! - Hard cap on module count: a project walk that finds more than
//!   the cap is fatal to that invocation rather than silently slow
//! - Deterministic ordering for stable output across runs
//!
//! Backed by ripgrep's `ignore` crate and `globset`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};
use tracing::debug;

/// Gitignore-aware walker with extra ignore globs and a folder-name
/// exclusion list. Extra globs are applied in two places:
///   1) Early: prune directories during traversal (filter_entry).
///   2) Late: filter out files that still slipped through.
pub struct ProjectWalker {
    /// Compiled set of additional ignore patterns
    ignore_patterns: GlobSet,

    /// Folder names never descended into
    exclude_folders: HashSet<String>,
}

impl ProjectWalker {
    /// Build a walker with additional ignore patterns (e.g. "*.pyc",
    /// "__pycache__/") and folder names to skip outright.
    pub fn new(additional_ignores: &[String], exclude_folders: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();

        for pattern in additional_ignores {
            builder.add(Glob::new(pattern)?);
        }

        Ok(Self {
            ignore_patterns: builder.build()?,
            exclude_folders: exclude_folders.iter().cloned().collect(),
        })
    }

    /// Collect every Python module under `root`, sorted for
    /// deterministic output. Fails when the count exceeds
    /// `max_modules` - almost always a sign the walk strayed into a
    /// virtual environment that should have been excluded.
    pub fn python_files(&self, root: &Path, max_modules: usize) -> Result<Vec<PathBuf>> {
        let mut walker = WalkBuilder::new(root);

        // Skip dotfiles; teaching projects keep code out of them.
        walker.hidden(true);

        // Respect .ignore/.gitignore/.git/info/exclude and global gitignore
        walker.git_ignore(true);
        walker.git_global(true);
        walker.git_exclude(true);

        // Early directory pruning: extra globs plus excluded folder names.
        let extra = self.ignore_patterns.clone();
        let excluded = self.exclude_folders.clone();
        walker.filter_entry(move |ent: &DirEntry| {
            let is_dir = ent.file_type().map(|ft| ft.is_dir()).unwrap_or(false);

            if is_dir {
                if extra.is_match(ent.path()) {
                    return false;
                }
                if let Some(name) = ent.file_name().to_str()
                    && excluded.contains(name)
                {
                    return false;
                }
            }
            true
        });

        let mut files = Vec::new();
        for entry in walker.build() {
            let Ok(entry) = entry else { continue };

            let is_file = entry.file_type().map(|ft| ft.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }

            let path = entry.into_path();
            if path.extension().and_then(|e| e.to_str()) != Some("py") {
                continue;
            }

            // Late filter for files matched by extra ignore globs.
            if self.ignore_patterns.is_match(&path) {
                continue;
            }

            files.push(path);
        }

        if files.len() > max_modules {
            bail!(
                "Too many modules to process - {} found under {} (cap is {}). \
                 Exclude storage or virtual-env folders and try again.",
                files.len(),
                root.display(),
                max_modules
            );
        }

        files.sort();
        debug!(count = files.len(), root = %root.display(), "project walk complete");
        Ok(files)
    }
}
