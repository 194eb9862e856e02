//! Shared test utilities for integration tests
//!
//! Provides a one-call analysis harness with execution and linting
//! disabled, so scenario tests are deterministic on any machine.

#![allow(dead_code)]

use pytutor::analysis::registry::Registry;
use pytutor::pipeline::{DetailLevel, OutputFormat, OutputSettings, Theme, analyze_code};
use pytutor::{Config, SnippetMessages, helpers};

/// Analyze a snippet with the built-in advisors, no live
/// evaluation, no external linter.
pub fn advice_for(code: &str) -> SnippetMessages {
    let mut registry = Registry::new();
    helpers::register_all(&mut registry);

    let settings = OutputSettings {
        format: OutputFormat::Md,
        theme: Theme::Dark,
        detail_level: DetailLevel::Extra,
        warnings_only: false,
        execute_code: false,
    };
    let config = Config {
        include_linting: false,
        ..Config::default()
    };

    let (messages, _) = analyze_code(code, &registry, &settings, &config);
    messages
}

/// Every record from both scopes, for assertions that don't care
/// where a message was attached.
pub fn all_records(messages: &SnippetMessages) -> Vec<&pytutor::MessageRecord> {
    messages
        .block_level
        .iter()
        .chain(messages.snippet_level.iter())
        .collect()
}

/// Records produced by one advisor.
pub fn records_from<'a>(
    messages: &'a SnippetMessages,
    source: &str,
) -> Vec<&'a pytutor::MessageRecord> {
    all_records(messages)
        .into_iter()
        .filter(|record| record.source == source)
        .collect()
}
