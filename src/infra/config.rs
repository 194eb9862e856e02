use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Extra ignore patterns for project walking (in addition to .gitignore)
    pub ignore_patterns: Vec<String>,

    /// Folder names skipped during project walking (virtual envs etc.)
    pub exclude_folders: Vec<String>,

    /// Cap on items inspected per collection before truncation
    pub max_items_evaluated: usize,

    /// Cap on modules processed in project mode (fatal when exceeded)
    pub max_project_modules: usize,

    /// Run the external linter advisor
    pub include_linting: bool,

    /// Dump the parsed tree to the temp dir for debugging
    pub record_ast: bool,

    /// Linter rules suppressed when invoking the external linter
    pub ignored_lint_rules: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignore_patterns: vec![
                ".git/".to_string(),
                "*.pyc".to_string(),
                "__pycache__/".to_string(),
                ".mypy_cache/".to_string(),
                ".pytest_cache/".to_string(),
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
            ],
            exclude_folders: vec![
                "env".to_string(),
                "venv".to_string(),
                ".venv".to_string(),
                "site-packages".to_string(),
                "node_modules".to_string(),
            ],
            max_items_evaluated: 25,
            max_project_modules: 200,
            include_linting: true,
            record_ast: false,
            // Alignment and comment-style rules that fight common
            // teaching snippets more than they help them.
            ignored_lint_rules: vec![
                "E128".to_string(),
                "E262".to_string(),
                "E266".to_string(),
                "E305".to_string(),
            ],
        }
    }
}

pub fn load_config() -> Result<Config> {
    let mut builder = config::Config::builder();

    // Load from config files in priority order
    let config_paths = ["pytutor.toml", ".pytutor.toml"];

    for path in &config_paths {
        if Path::new(path).exists() {
            builder = builder.add_source(config::File::with_name(path));
            break;
        }
    }

    // Add environment variables with PYTUTOR_ prefix
    builder = builder.add_source(config::Environment::with_prefix("PYTUTOR").separator("__"));

    let cfg = builder.build().context("Failed to load configuration")?;

    // An absent file plus no env vars yields an empty source set, so
    // fill every missing key from the defaults via serde.
    let defaults = Config::default();
    let parsed = Config {
        ignore_patterns: cfg
            .get("ignore_patterns")
            .unwrap_or(defaults.ignore_patterns),
        exclude_folders: cfg
            .get("exclude_folders")
            .unwrap_or(defaults.exclude_folders),
        max_items_evaluated: cfg
            .get("max_items_evaluated")
            .unwrap_or(defaults.max_items_evaluated),
        max_project_modules: cfg
            .get("max_project_modules")
            .unwrap_or(defaults.max_project_modules),
        include_linting: cfg
            .get("include_linting")
            .unwrap_or(defaults.include_linting),
        record_ast: cfg.get("record_ast").unwrap_or(defaults.record_ast),
        ignored_lint_rules: cfg
            .get("ignored_lint_rules")
            .unwrap_or(defaults.ignored_lint_rules),
    };

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_documented_caps() {
        let cfg = Config::default();
        assert_eq!(cfg.max_items_evaluated, 25);
        assert_eq!(cfg.max_project_modules, 200);
        assert!(cfg.include_linting);
        assert!(!cfg.record_ast);
    }

    #[test]
    fn default_config_serializes_to_toml() {
        let cfg = Config::default();
        let rendered = toml::to_string_pretty(&cfg).unwrap();
        assert!(rendered.contains("max_items_evaluated = 25"));
    }
}
