//! Filepath: src/format/common.rs
//! Shared formatter plumbing: output order and detail-level
//! selection. Formatters differ in markup, never in which records
//! they show or in what order.

use crate::analysis::messages::{Message, MessageRecord, SnippetMessages};
use crate::pipeline::DetailLevel;

/// Records in display order: block-level advice sorted by
/// `(first_line, warning)` so warnings come last within a block,
/// then snippet-wide advice with warnings last.
pub fn arranged(messages: &SnippetMessages) -> (Vec<&MessageRecord>, Vec<&MessageRecord>) {
    let mut block_level: Vec<&MessageRecord> = messages.block_level.iter().collect();
    block_level.sort_by_key(|record| (record.first_line.unwrap_or(0), record.warning));

    let mut snippet_level: Vec<&MessageRecord> = messages.snippet_level.iter().collect();
    snippet_level.sort_by_key(|record| record.warning);

    (block_level, snippet_level)
}

/// The text for the chosen detail level. Extra is progressive: it
/// shows the main text plus whatever extra depth exists.
pub fn level_text(message: &Message, level: DetailLevel) -> String {
    match level {
        DetailLevel::Brief => message.brief.clone(),
        DetailLevel::Main => message.main.clone(),
        DetailLevel::Extra => {
            if message.extra.trim().is_empty() {
                message.main.clone()
            } else {
                format!("{}\n\n{}", message.main.trim_end(), message.extra)
            }
        }
    }
}

/// Wording chosen by every formatter for the top of the output.
pub fn heading_for(file_path: Option<&std::path::Path>, multi_block: bool) -> String {
    let source = match file_path {
        Some(path) => path.display().to_string(),
        None => "your snippet".to_string(),
    };
    if multi_block {
        format!("Advice on {source} - block by block")
    } else {
        format!("Advice on {source}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::messages::MessageRecord;

    fn record(first_line: Option<usize>, warning: bool, label: &str) -> MessageRecord {
        MessageRecord {
            code_str: String::new(),
            message: Message {
                brief: label.to_string(),
                main: format!("{label} main"),
                extra: String::new(),
            },
            first_line,
            warning,
            source: label.to_string(),
        }
    }

    #[test]
    fn warnings_sort_last_within_a_block() {
        let messages = SnippetMessages {
            snippet_level: vec![],
            block_level: vec![
                record(Some(1), true, "warn1"),
                record(Some(1), false, "info1"),
                record(Some(3), false, "info3"),
            ],
        };

        let (block_level, _) = arranged(&messages);
        let order: Vec<&str> = block_level.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(order, vec!["info1", "warn1", "info3"]);
    }

    #[test]
    fn extra_level_is_progressive() {
        let with_extra = Message {
            brief: "b".to_string(),
            main: "m".to_string(),
            extra: "e".to_string(),
        };
        assert_eq!(level_text(&with_extra, DetailLevel::Extra), "m\n\ne");

        let without_extra = Message {
            brief: "b".to_string(),
            main: "m".to_string(),
            extra: String::new(),
        };
        assert_eq!(level_text(&without_extra, DetailLevel::Extra), "m");
    }

    #[test]
    fn heading_mentions_the_file() {
        let heading = heading_for(Some(std::path::Path::new("demo.py")), false);
        assert!(heading.contains("demo.py"));
    }
}
