//! Filepath: src/analysis/messages.rs
//! The unit of advice: three detail-level strings, the code they
//! relate to, an optional line, a warning flag, and the advisor
//! that produced them. Records are completed once and immutable
//! afterwards.

use anyhow::Result;

use crate::analysis::error::AnalysisError;

/// Source label for messages produced by the tool itself rather
/// than by an advisor.
pub const SYSTEM_SOURCE: &str = "system";

/// Shown when a snippet attracted no advice at all.
pub const NO_ADVICE_MESSAGE: &str = "No advice to give - looks fine to us :-)";

/// What an advisor returns: `brief` is mandatory, the rest default.
#[derive(Debug, Clone, Default)]
pub struct MessageLevels {
    pub brief: String,
    pub main: Option<String>,
    pub extra: Option<String>,
}

impl MessageLevels {
    /// A message with only the mandatory level.
    pub fn brief(brief: impl Into<String>) -> Self {
        Self {
            brief: brief.into(),
            main: None,
            extra: None,
        }
    }

    /// A message with every level spelled out.
    pub fn new(
        brief: impl Into<String>,
        main: impl Into<String>,
        extra: impl Into<String>,
    ) -> Self {
        Self {
            brief: brief.into(),
            main: Some(main.into()),
            extra: Some(extra.into()),
        }
    }

    /// Brief plus main, extra defaulted.
    pub fn with_main(brief: impl Into<String>, main: impl Into<String>) -> Self {
        Self {
            brief: brief.into(),
            main: Some(main.into()),
            extra: None,
        }
    }
}

/// A completed message: every level populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub brief: String,
    pub main: String,
    pub extra: String,
}

/// Complete a message: `main` falls back to `brief`, `extra` to
/// empty. A missing `brief` is a programmer error in the advisor.
pub fn complete_message(levels: MessageLevels, source: &str) -> Result<Message> {
    if levels.brief.trim().is_empty() {
        return Err(AnalysisError::EmptyBrief {
            advisor: source.to_string(),
        }
        .into());
    }

    let main = match levels.main {
        Some(main) if !main.trim().is_empty() => main,
        _ => levels.brief.clone(),
    };

    Ok(Message {
        brief: levels.brief,
        main,
        extra: levels.extra.unwrap_or_default(),
    })
}

/// Everything needed to render one piece of advice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    /// The code the message relates to (block or whole snippet)
    pub code_str: String,

    /// The completed levels
    pub message: Message,

    /// 1-based first line for block-level advice, `None` for
    /// snippet-wide advice
    pub first_line: Option<usize>,

    /// Warning-level advice (displayers decide what that means)
    pub warning: bool,

    /// Advisor name, or [`SYSTEM_SOURCE`] - useful for auditing
    pub source: String,
}

/// The advice for one snippet, split by scope.
#[derive(Debug, Clone, Default)]
pub struct SnippetMessages {
    /// Advice about the snippet as a whole
    pub snippet_level: Vec<MessageRecord>,

    /// Advice tied to individual blocks
    pub block_level: Vec<MessageRecord>,
}

impl SnippetMessages {
    pub fn is_empty(&self) -> bool {
        self.snippet_level.is_empty() && self.block_level.is_empty()
    }

    /// Total record count across both scopes.
    pub fn len(&self) -> usize {
        self.snippet_level.len() + self.block_level.len()
    }
}

/// One snippet-wide system message in the standard shape, so the
/// displayers can consume it the way they consume everything else.
pub fn system_messages(snippet: &str, brief: &str, warning: bool) -> SnippetMessages {
    let message = Message {
        brief: brief.to_string(),
        main: brief.to_string(),
        extra: String::new(),
    };
    SnippetMessages {
        snippet_level: vec![MessageRecord {
            code_str: snippet.to_string(),
            message,
            first_line: None,
            warning,
            source: SYSTEM_SOURCE.to_string(),
        }],
        block_level: Vec::new(),
    }
}

/// The standard shape for "we could not analyze this at all".
pub fn error_messages(err: &anyhow::Error, snippet: &str) -> SnippetMessages {
    let brief = format!(
        "### No advice sorry :-(\n\nUnable to provide advice - some sort of \
         problem.\n\nDetails: {err}\n"
    );
    system_messages(snippet, &brief, true)
}

/// Canned response for the `import community` easter egg.
pub fn community_messages(snippet: &str) -> SnippetMessages {
    let brief = "### Join in!\n\nPython has always had a great community. \
                 Learn more at <https://www.python.org/community/>. Better \
                 still - get involved :-)\n"
        .to_string();
    system_messages(snippet, &brief, false)
}

/// Canned response when the snippet contains all of the famously
/// risky words.
pub fn danger_words_messages(snippet: &str) -> SnippetMessages {
    let brief = "### According to xkcd this code could be *very* dangerous\n\n\
                 See <https://xkcd.com/2261/>\n"
        .to_string();
    system_messages(snippet, &brief, false)
}
