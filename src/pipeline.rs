//! Filepath: src/pipeline.rs
//! The pipeline driver: code items in, formatted advice out, in
//! three stages. Stage one resolves where the code comes from
//! (string, file, project walk, or the built-in default snippet);
//! stage two analyzes each item, converting every per-item failure
//! into a system message instead of crashing the run; stage three
//! renders with the chosen formatter.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ValueEnum;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::analysis::blocks::block_specs;
use crate::analysis::dispatch::{DispatchOptions, dispatch};
use crate::analysis::error::AnalysisError;
use crate::analysis::messages::{self, SnippetMessages};
use crate::analysis::registry::Registry;
use crate::analysis::tree::PySource;
use crate::format::{html, md, term};
use crate::infra::config::Config;
use crate::infra::tmp;
use crate::infra::walk::ProjectWalker;

/// How much of each message to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DetailLevel {
    Brief,
    Main,
    Extra,
}

/// Which formatter renders the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Html,
    Cli,
    Md,
}

/// Terminal / page color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Theme {
    Dark,
    Light,
}

/// Everything the output side needs to know.
#[derive(Debug, Clone)]
pub struct OutputSettings {
    pub format: OutputFormat,
    pub theme: Theme,
    pub detail_level: DetailLevel,
    pub warnings_only: bool,
    pub execute_code: bool,
}

/// Where the code to analyze comes from. At most one of the three
/// explicit sources may be set.
#[derive(Debug, Clone, Default)]
pub struct HelpRequest {
    pub code: Option<String>,
    pub file_path: Option<PathBuf>,
    pub project_path: Option<PathBuf>,
    pub exclude_folders: Vec<String>,
}

/// One unit of source code entering the pipeline.
#[derive(Debug, Clone)]
pub struct CodeItem {
    pub code: String,
    pub file_path: Option<PathBuf>,
}

/// One unit of source code after analysis.
#[derive(Debug, Clone)]
pub struct AnalyzedItem {
    pub code: String,
    pub file_path: Option<PathBuf>,
    pub messages: SnippetMessages,
    pub multi_block: bool,
}

/// The snippet used when no source is supplied at all.
pub const DEFAULT_SNIPPET: &str = "\
word = 'Incomprehensibilities'
len_word = len(word)
if len_word == 1:
    status = 'single-letter'
elif len_word < 4:
    status = 'short'
elif len_word > 12:
    status = 'long'
if len('chicken') > 2:
    print('cluck!')
";

/// Magic input: exactly this snippet gets a community greeting.
const COMMUNITY_SNIPPET: &str = "import community";

/// Magic input: a snippet containing all of these gets the famous
/// warning instead of analysis.
const DANGER_WORDS: [&str; 3] = ["os.system", "rm", "-rf"];

/// Stage one: resolve the source selection into ordered code items.
pub fn code_items(request: &HelpRequest, config: &Config) -> Result<Vec<CodeItem>> {
    let supplied = [
        request.code.is_some(),
        request.file_path.is_some(),
        request.project_path.is_some(),
    ]
    .iter()
    .filter(|set| **set)
    .count();
    if supplied > 1 {
        return Err(AnalysisError::AmbiguousSource.into());
    }

    if let Some(code) = &request.code {
        return Ok(vec![CodeItem {
            code: code.trim_matches('\n').to_string(),
            file_path: None,
        }]);
    }

    if let Some(file_path) = &request.file_path {
        let code = std::fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read {}", file_path.display()))?;
        return Ok(vec![CodeItem {
            code: code.trim_matches('\n').to_string(),
            file_path: Some(file_path.clone()),
        }]);
    }

    if let Some(project_path) = &request.project_path {
        let exclude = if request.exclude_folders.is_empty() {
            config.exclude_folders.clone()
        } else {
            request.exclude_folders.clone()
        };
        let walker = ProjectWalker::new(&config.ignore_patterns, &exclude)?;
        let files = walker.python_files(project_path, config.max_project_modules)?;

        let mut items = Vec::with_capacity(files.len());
        for file_path in files {
            let code = std::fs::read_to_string(&file_path)
                .with_context(|| format!("Failed to read {}", file_path.display()))?;
            items.push(CodeItem {
                code: code.trim_matches('\n').to_string(),
                file_path: Some(file_path),
            });
        }
        return Ok(items);
    }

    info!("using the default snippet because no code was provided");
    Ok(vec![CodeItem {
        code: DEFAULT_SNIPPET.trim_matches('\n').to_string(),
        file_path: None,
    }])
}

/// Stage two for one item: parse, segment, dispatch. Per-item
/// failures become system messages; the pipeline never dies on a
/// single bad source.
pub fn analyze_item(
    item: CodeItem,
    registry: &Registry,
    settings: &OutputSettings,
    config: &Config,
) -> AnalyzedItem {
    let (messages, multi_block) = analyze_code(&item.code, registry, settings, config);
    AnalyzedItem {
        code: item.code,
        file_path: item.file_path,
        messages,
        multi_block,
    }
}

/// Analyze one snippet string into messages plus the multi-block
/// flag formatters use to choose wording.
pub fn analyze_code(
    code: &str,
    registry: &Registry,
    settings: &OutputSettings,
    config: &Config,
) -> (SnippetMessages, bool) {
    // Community / easter-egg short-circuits bypass analysis.
    if code.trim() == COMMUNITY_SNIPPET {
        return (messages::community_messages(code), false);
    }
    if DANGER_WORDS.iter().all(|word| code.contains(word)) {
        return (messages::danger_words_messages(code), false);
    }

    let src = match PySource::parse(code) {
        Ok(src) => src,
        Err(err) => return (messages::error_messages(&err, code), false),
    };

    if config.record_ast {
        match tmp::dump_tree(&src.sexp()) {
            Ok(path) => debug!(path = %path.display(), "wrote tree dump"),
            Err(err) => debug!(error = %err, "failed to write tree dump"),
        }
    }

    let blocks = block_specs(&src);
    let multi_block = blocks.len() > 1;

    let opts = DispatchOptions {
        warnings_only: settings.warnings_only,
        execute_code: settings.execute_code,
        max_items: config.max_items_evaluated,
        include_linting: config.include_linting,
        ignored_lint_rules: config.ignored_lint_rules.clone(),
    };
    match dispatch(&src, &blocks, registry, &opts) {
        Ok(messages) => (messages, multi_block),
        Err(err) => (messages::error_messages(&err, code), multi_block),
    }
}

/// Stage two across items. Project runs fan out across cores;
/// input order is preserved either way, and no dispatcher state is
/// shared between items.
pub fn analyzed_items(
    items: Vec<CodeItem>,
    registry: &Registry,
    settings: &OutputSettings,
    config: &Config,
) -> Vec<AnalyzedItem> {
    if items.len() > 1 {
        items
            .into_par_iter()
            .map(|item| analyze_item(item, registry, settings, config))
            .collect()
    } else {
        items
            .into_iter()
            .map(|item| analyze_item(item, registry, settings, config))
            .collect()
    }
}

/// Stage three for one item: render with the chosen formatter.
pub fn render_item(item: &AnalyzedItem, settings: &OutputSettings) -> String {
    let file_path = item.file_path.as_deref();
    match settings.format {
        OutputFormat::Md => md::render(
            &item.code,
            file_path,
            &item.messages,
            settings,
            item.multi_block,
        ),
        OutputFormat::Cli => term::render(
            &item.code,
            file_path,
            &item.messages,
            settings,
            item.multi_block,
        ),
        OutputFormat::Html => html::render(
            &item.code,
            file_path,
            &item.messages,
            settings,
            item.multi_block,
        ),
    }
}

/// Run the whole pipeline and return the lazy formatted sequence.
pub fn formatted_help(
    request: &HelpRequest,
    registry: &Registry,
    settings: &OutputSettings,
    config: &Config,
) -> Result<impl Iterator<Item = (String, Option<PathBuf>)> + use<>> {
    let items = code_items(request, config)?;
    let analyzed = analyzed_items(items, registry, settings, config);
    let settings = settings.clone();

    Ok(analyzed
        .into_iter()
        .map(move |item| (render_item(&item, &settings), item.file_path)))
}

/// Run the whole pipeline and display the results: terminal and
/// markdown output print to stdout; HTML pages are written to the
/// temp dir and their locations printed.
pub fn show_help(
    request: &HelpRequest,
    registry: &Registry,
    settings: &OutputSettings,
    config: &Config,
) -> Result<()> {
    let html_output = matches!(settings.format, OutputFormat::Html);

    for (n, (text, file_path)) in formatted_help(request, registry, settings, config)?.enumerate() {
        if html_output {
            let fname = match &file_path {
                Some(path) => format!(
                    "help_{}_{n}.html",
                    path.file_stem().and_then(|s| s.to_str()).unwrap_or("script")
                ),
                None => format!("help_snippet_{n}.html"),
            };
            let out_path = tmp::tmp_root().join(&fname);
            std::fs::create_dir_all(tmp::tmp_root())
                .and_then(|()| std::fs::write(&out_path, &text))
                .with_context(|| format!("Failed to write {}", out_path.display()))?;
            println!("Advice written to {}", out_path.display());
        } else {
            println!("{text}");
        }
    }
    Ok(())
}
