//! Filepath: src/format/html.rs
//! Standalone HTML page formatter. All three detail levels are
//! rendered into the page; CSS wired to three radio buttons decides
//! which level is visible, so the reader can change verbosity
//! without re-running the tool.

use std::path::Path;

use crate::analysis::messages::{MessageRecord, SnippetMessages};
use crate::format::common::{arranged, heading_for};
use crate::pipeline::{DetailLevel, OutputSettings, Theme};

const PAGE_CSS: &str = "\
body { margin: 40px auto; max-width: 720px; font-family: sans-serif; }
h1 { font-size: 24px; }
pre.code { padding: 8px 12px; border-radius: 6px; overflow-x: auto; }
div.advice { margin: 12px 0 24px 0; white-space: pre-wrap; }
div.advice.warning { border-left: 4px solid #c0392b; padding-left: 12px; }
.level-main, .level-extra { display: none; }
#level-main:checked ~ .messages .level-main { display: block; }
#level-main:checked ~ .messages .level-brief { display: none; }
#level-extra:checked ~ .messages .level-extra { display: block; }
#level-extra:checked ~ .messages .level-brief { display: none; }
.theme-dark { background: #1e1e1e; color: #dcdcdc; }
.theme-dark pre.code { background: #2b2b2b; color: #f0e68c; }
.theme-light { background: #ffffff; color: #111111; }
.theme-light pre.code { background: #f4f4f4; color: #333333; }
";

/// Render one analyzed snippet as a self-contained HTML page.
pub fn render(
    code: &str,
    file_path: Option<&Path>,
    messages: &SnippetMessages,
    settings: &OutputSettings,
    multi_block: bool,
) -> String {
    let (block_level, snippet_level) = arranged(messages);
    let heading = escape(&heading_for(file_path, multi_block));

    let theme_class = match settings.theme {
        Theme::Dark => "theme-dark",
        Theme::Light => "theme-light",
    };
    let (brief_checked, main_checked, extra_checked) = match settings.detail_level {
        DetailLevel::Brief => (" checked", "", ""),
        DetailLevel::Main => ("", " checked", ""),
        DetailLevel::Extra => ("", "", " checked"),
    };

    let mut body = String::new();
    let mut last_line = None;
    for record in &block_level {
        if record.first_line != last_line {
            body += &format!(
                "<h2>Line {}</h2>\n<pre class=\"code\">{}</pre>\n",
                record.first_line.unwrap_or(1),
                escape(record.code_str.trim_end_matches('\n')),
            );
            last_line = record.first_line;
        }
        body += &record_html(record);
    }
    if !snippet_level.is_empty() {
        body += "<h2>Snippet as a whole</h2>\n";
        for record in &snippet_level {
            body += &record_html(record);
        }
    }
    if block_level.is_empty() && !code.trim().is_empty() {
        body += &format!(
            "<pre class=\"code\">{}</pre>\n",
            escape(code.trim_end_matches('\n'))
        );
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{heading}</title>\n<style>\n{PAGE_CSS}</style>\n</head>\n\
         <body class=\"{theme_class}\">\n<h1>{heading}</h1>\n\
         <input type=\"radio\" id=\"level-brief\" name=\"level\"{brief_checked}>\
         <label for=\"level-brief\">Brief</label>\n\
         <input type=\"radio\" id=\"level-main\" name=\"level\"{main_checked}>\
         <label for=\"level-main\">Main</label>\n\
         <input type=\"radio\" id=\"level-extra\" name=\"level\"{extra_checked}>\
         <label for=\"level-extra\">Extra</label>\n\
         <div class=\"messages\">\n{body}</div>\n</body>\n</html>\n"
    )
}

/// One record: every level present, CSS chooses what shows.
fn record_html(record: &MessageRecord) -> String {
    let warning_class = if record.warning { " warning" } else { "" };
    let extra = if record.message.extra.trim().is_empty() {
        record.message.main.clone()
    } else {
        format!("{}\n\n{}", record.message.main.trim_end(), record.message.extra)
    };
    format!(
        "<div class=\"advice{warning_class}\">\
         <div class=\"level-brief\">{}</div>\
         <div class=\"level-main\">{}</div>\
         <div class=\"level-extra\">{}</div>\
         </div>\n",
        escape(&record.message.brief),
        escape(&record.message.main),
        escape(&extra),
    )
}

/// Minimal HTML escaping for text interpolated into the page.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::messages::{Message, MessageRecord};
    use crate::pipeline::OutputFormat;

    fn settings() -> OutputSettings {
        OutputSettings {
            format: OutputFormat::Html,
            theme: Theme::Dark,
            detail_level: DetailLevel::Main,
            warnings_only: false,
            execute_code: false,
        }
    }

    fn sample() -> SnippetMessages {
        SnippetMessages {
            snippet_level: vec![],
            block_level: vec![MessageRecord {
                code_str: "x = 1 < 2".to_string(),
                message: Message {
                    brief: "brief".to_string(),
                    main: "main".to_string(),
                    extra: "extra".to_string(),
                },
                first_line: Some(1),
                warning: false,
                source: "test".to_string(),
            }],
        }
    }

    #[test]
    fn page_carries_all_levels_and_radios() {
        let out = render("x = 1 < 2", None, &sample(), &settings(), false);
        assert!(out.contains("level-brief"));
        assert!(out.contains("level-main\" name=\"level\" checked"));
        assert!(out.contains("level-extra"));
    }

    #[test]
    fn code_is_escaped() {
        let out = render("x = 1 < 2", None, &sample(), &settings(), false);
        assert!(out.contains("1 &lt; 2"));
    }
}
