//! **pytutor** - educational static analysis for Python code
//!
//! Given a snippet, file, or project tree of Python, produce
//! pedagogical, level-tiered advice about each syntactic block and
//! about the snippet as a whole. Parsing is tree-sitter based; the
//! advisor corpus is a plug-in registry of plain functions.

/// Command-line interface with clap integration
pub mod cli;

/// Pipeline driver - code items in, formatted advice out
pub mod pipeline;

/// Analysis engine - parsing, segmentation, dispatch
pub mod analysis {
    /// Typed failures the pipeline distinguishes
    pub mod error;

    /// Queryable source tree built on tree-sitter
    pub mod tree;

    /// Grammar compatibility shim (resolved once per process)
    pub mod grammar;

    /// Line-range resolution for tree nodes
    pub mod lines;

    /// Block segmentation into per-statement specs
    pub mod blocks;

    /// Assignment-target (name binding) resolution
    pub mod names;

    /// Optional live evaluation in a fresh interpreter
    pub mod exec;

    /// Collection-literal inspection with truncation
    pub mod collections;

    /// Advisor registry and scope classification
    pub mod registry;

    /// The dispatcher: run advisors, collect messages, fail soft
    pub mod dispatch;

    /// Message model and level completion
    pub mod messages;
}

/// The advisor corpus. Every module registers its advisors through
/// the explicit discovery step below - no import-time side effects.
pub mod helpers {
    /// Message text shared by more than one advisor
    pub mod shared;

    /// Lists assigned to names
    pub mod list_help;

    /// Dictionaries assigned to names
    pub mod dict_help;

    /// Strings assigned to names
    pub mod str_help;

    /// Functions and methods
    pub mod func_help;

    /// Manual counters around for loops
    pub mod loop_help;

    /// Unpacking, used and missed
    pub mod packing_help;

    /// External linter integration
    pub mod lint_help;

    use crate::analysis::registry::Registry;

    /// Explicit discovery step: append every built-in advisor,
    /// module by module, in a stable order.
    pub fn register_all(reg: &mut Registry) {
        list_help::register(reg);
        dict_help::register(reg);
        str_help::register(reg);
        func_help::register(reg);
        loop_help::register(reg);
        packing_help::register(reg);
        lint_help::register(reg);
    }
}

/// Output formatters - same records, different markup
pub mod format {
    /// Shared arrangement and detail-level selection
    pub mod common;

    /// Plain markdown
    pub mod md;

    /// ANSI terminal with dark/light themes
    pub mod term;

    /// Standalone HTML page with detail-level radio buttons
    pub mod html;
}

/// Infrastructure - configuration, walking, temp staging, text
pub mod infra {
    /// Configuration with TOML file and env-var layering
    pub mod config;

    /// Gitignore-aware project walking with a module cap
    pub mod walk;

    /// Temp-dir staging for the linter and debug dumps
    pub mod tmp;

    /// Text-shaping helpers for messages
    pub mod utils;
}

// Strategic re-exports for library consumers
pub use analysis::messages::{Message, MessageRecord, SnippetMessages};
pub use analysis::registry::Registry;
pub use cli::Cli;
pub use infra::config::{Config, load_config};
pub use pipeline::{
    DetailLevel, HelpRequest, OutputFormat, OutputSettings, Theme, formatted_help, show_help,
};
