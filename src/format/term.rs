//! Filepath: src/format/term.rs
//! ANSI terminal formatter. Renders the markdown the advisors write
//! line by line, coloring headings, code, and warnings; the dark
//! and light themes only differ in the colors chosen.

use std::path::Path;

use owo_colors::OwoColorize;

use crate::analysis::messages::{MessageRecord, SnippetMessages};
use crate::format::common::{arranged, heading_for, level_text};
use crate::pipeline::{OutputSettings, Theme};

/// Render one analyzed snippet for the terminal.
pub fn render(
    code: &str,
    file_path: Option<&Path>,
    messages: &SnippetMessages,
    settings: &OutputSettings,
    multi_block: bool,
) -> String {
    let (block_level, snippet_level) = arranged(messages);
    let theme = settings.theme;

    let heading = heading_for(file_path, multi_block);
    let rule = "=".repeat(heading.chars().count());
    let mut out = format!(
        "{}\n{}\n{}\n\n",
        rule,
        paint_heading(&heading, theme),
        rule
    );

    let mut last_line = None;
    for record in &block_level {
        if record.first_line != last_line {
            out += &format!(
                "{}\n{}\n\n",
                paint_heading(
                    &format!("--- line {} ---", record.first_line.unwrap_or(1)),
                    theme
                ),
                paint_code(record.code_str.trim_end_matches('\n'), theme),
            );
            last_line = record.first_line;
        }
        out += &render_record(record, settings);
    }

    if !snippet_level.is_empty() {
        out += &format!(
            "{}\n\n",
            paint_heading("--- snippet as a whole ---", theme)
        );
        for record in &snippet_level {
            out += &render_record(record, settings);
        }
    }

    if block_level.is_empty() && !code.trim().is_empty() {
        out += &format!("{}\n", paint_code(code.trim_end_matches('\n'), theme));
    }

    out
}

fn render_record(record: &MessageRecord, settings: &OutputSettings) -> String {
    let text = level_text(&record.message, settings.detail_level);
    let mut out = String::new();

    if record.warning {
        out += &format!("{}\n", paint_warning("WARNING", settings.theme));
    }
    for line in text.trim_end().lines() {
        if let Some(title) = line
            .strip_prefix("### ")
            .or_else(|| line.strip_prefix("#### "))
        {
            out += &format!("{}\n", paint_heading(title, settings.theme));
        } else {
            out += line;
            out.push('\n');
        }
    }
    out.push('\n');
    out
}

fn paint_heading(text: &str, theme: Theme) -> String {
    match theme {
        Theme::Dark => text.bright_cyan().bold().to_string(),
        Theme::Light => text.blue().bold().to_string(),
    }
}

fn paint_code(text: &str, theme: Theme) -> String {
    match theme {
        Theme::Dark => text.bright_yellow().to_string(),
        Theme::Light => text.magenta().to_string(),
    }
}

fn paint_warning(text: &str, theme: Theme) -> String {
    match theme {
        Theme::Dark => text.bright_red().bold().to_string(),
        Theme::Light => text.red().bold().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::messages::{Message, MessageRecord};
    use crate::pipeline::{DetailLevel, OutputFormat};

    fn settings(theme: Theme) -> OutputSettings {
        OutputSettings {
            format: OutputFormat::Cli,
            theme,
            detail_level: DetailLevel::Brief,
            warnings_only: false,
            execute_code: false,
        }
    }

    fn warning_messages() -> SnippetMessages {
        SnippetMessages {
            snippet_level: vec![],
            block_level: vec![MessageRecord {
                code_str: "mixed = {1: 'a', '1': 'b'}".to_string(),
                message: Message {
                    brief: "### Keys mixed\n\nDetails here.".to_string(),
                    main: "### Keys mixed\n\nDetails here.".to_string(),
                    extra: String::new(),
                },
                first_line: Some(1),
                warning: true,
                source: "mixed_key_types".to_string(),
            }],
        }
    }

    #[test]
    fn warnings_get_a_marker() {
        let out = render(
            "mixed = {1: 'a', '1': 'b'}",
            None,
            &warning_messages(),
            &settings(Theme::Dark),
            false,
        );
        assert!(out.contains("WARNING"));
        assert!(out.contains("Keys mixed"));
    }

    #[test]
    fn themes_pick_different_colors() {
        let dark = render(
            "x = 1",
            None,
            &warning_messages(),
            &settings(Theme::Dark),
            false,
        );
        let light = render(
            "x = 1",
            None,
            &warning_messages(),
            &settings(Theme::Light),
            false,
        );
        assert_ne!(dark, light);
    }
}
