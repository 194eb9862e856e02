use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::analysis::registry::Registry;
use crate::helpers;
use crate::infra::config::load_config;
use crate::pipeline::{DetailLevel, HelpRequest, OutputFormat, OutputSettings, Theme, show_help};

#[derive(Debug, Parser)]
#[command(name = "pyt")]
#[command(about = "pytutor - educational advice about Python code, for humans")]
#[command(version, long_about = None)]
pub struct Cli {
    /// Python code - usually only a line or snippet. An alternative
    /// to --file-path and --project-path
    #[arg(short, long, conflicts_with_all = ["file_path", "project_path"])]
    pub code: Option<String>,

    /// File location of a line, snippet, or script of Python code.
    /// An alternative to --code and --project-path
    #[arg(short, long, conflicts_with = "project_path")]
    pub file_path: Option<String>,

    /// Project folder containing all the modules you want advice on.
    /// An alternative to --code and --file-path
    #[arg(short, long)]
    pub project_path: Option<String>,

    /// Folder names to skip in project mode - usually storage
    /// folders or a virtual env, e.g. --exclude-folders store env
    #[arg(short, long, num_args = 0..)]
    pub exclude_folders: Vec<String>,

    /// What level of detail do you want?
    #[arg(short, long, value_enum, default_value = "extra")]
    pub detail_level: DetailLevel,

    /// How do you want your advice shown?
    #[arg(short, long, value_enum, default_value = "cli")]
    pub output: OutputFormat,

    /// Show warnings only
    #[arg(short, long)]
    pub warnings_only: bool,

    /// Execute the code to enable additional checks (off by
    /// default - execution runs the supplied snippet)
    #[arg(short = 'x', long)]
    pub execute_code: bool,

    /// Output theme - currently only affects cli and html output
    #[arg(short, long, value_enum, default_value = "dark")]
    pub theme: Theme,

    /// List available advice and exit
    #[arg(short, long)]
    pub advice_list: bool,
}

/// Run the CLI: list advisors, or drive the pipeline end to end.
pub fn run(cli: Cli) -> Result<()> {
    let mut registry = Registry::new();
    helpers::register_all(&mut registry);

    if cli.advice_list {
        print_advice_list(&registry);
        return Ok(());
    }

    let config = load_config().unwrap_or_default();

    let settings = OutputSettings {
        format: cli.output,
        theme: cli.theme,
        detail_level: cli.detail_level,
        warnings_only: cli.warnings_only,
        execute_code: cli.execute_code,
    };
    let request = HelpRequest {
        code: cli.code,
        file_path: cli.file_path.map(expand_path),
        project_path: cli.project_path.map(expand_path),
        exclude_folders: cli.exclude_folders,
    };

    show_help(&request, &registry, &settings, &config)
}

/// Expand ~ and environment variables in user-supplied paths.
fn expand_path(raw: String) -> PathBuf {
    PathBuf::from(shellexpand::full(&raw).map(|s| s.into_owned()).unwrap_or(raw))
}

fn print_advice_list(registry: &Registry) {
    println!("=====================================");
    println!("Specific advice available from pytutor");
    println!("=====================================\n");

    let rows = registry.advice_listing();
    let num_width = rows.len().to_string().len();
    for (n, (comment, source, warning)) in rows.iter().enumerate() {
        let warning_lbl = if *warning { "Warning: " } else { "" };
        println!("{:>num_width$}) {warning_lbl}{comment} ({source})", n + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_declaration_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn source_flags_are_mutually_exclusive() {
        let err = Cli::try_parse_from(["pyt", "-c", "x = 1", "-f", "demo.py"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn defaults_match_documented_behavior() {
        let cli = Cli::try_parse_from(["pyt"]).unwrap();
        assert_eq!(cli.detail_level, DetailLevel::Extra);
        assert_eq!(cli.output, OutputFormat::Cli);
        assert!(!cli.execute_code);
        assert!(!cli.warnings_only);
    }

    #[test]
    fn tilde_paths_expand() {
        let expanded = expand_path("~/code/demo.py".to_string());
        assert!(!expanded.to_string_lossy().starts_with('~'));
    }
}
