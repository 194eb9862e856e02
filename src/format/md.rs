//! Filepath: src/format/md.rs
//! Plain markdown formatter - advisors already write markdown, so
//! this formatter is mostly arrangement and headings.

use std::path::Path;

use crate::analysis::messages::{MessageRecord, SnippetMessages};
use crate::format::common::{arranged, heading_for, level_text};
use crate::pipeline::OutputSettings;

/// Render one analyzed snippet as a markdown document.
pub fn render(
    code: &str,
    file_path: Option<&Path>,
    messages: &SnippetMessages,
    settings: &OutputSettings,
    multi_block: bool,
) -> String {
    let (block_level, snippet_level) = arranged(messages);

    let mut out = format!("# {}\n\n", heading_for(file_path, multi_block));

    if !block_level.is_empty() {
        let mut last_line = None;
        for record in &block_level {
            // One code quotation per block, however many messages.
            if record.first_line != last_line {
                out += &format!(
                    "## Line {}\n\n```python\n{}\n```\n\n",
                    record.first_line.unwrap_or(1),
                    record.code_str.trim_end_matches('\n'),
                );
                last_line = record.first_line;
            }
            out += &render_record(record, settings);
        }
    }

    if !snippet_level.is_empty() {
        out += "## Snippet as a whole\n\n";
        for record in &snippet_level {
            out += &render_record(record, settings);
        }
    }

    // The snippet itself, for context, when nothing was block-tied.
    if block_level.is_empty() && !code.trim().is_empty() {
        out += &format!("```python\n{}\n```\n", code.trim_end_matches('\n'));
    }

    out
}

fn render_record(record: &MessageRecord, settings: &OutputSettings) -> String {
    let mut text = level_text(&record.message, settings.detail_level)
        .trim_end()
        .to_string();
    if record.warning {
        text = format!("⚠ {text}");
    }
    text + "\n\n"
}
