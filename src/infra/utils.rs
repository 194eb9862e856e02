//! Filepath: src/infra/utils.rs
//! Small text-shaping helpers shared by advisors and formatters.
//! All advisor output is markdown; formatters decide how to render
//! it. Organized as focused structs with associated functions to
//! keep call sites discoverable and unit-testable.

use itertools::Itertools;

/// Number-to-prose helpers for friendly message text.
pub struct NiceNumbers;

impl NiceNumbers {
    /// Render a small count as a word, larger counts with
    /// thousands separators ("three", but "12,345").
    pub fn int2nice(n: usize) -> String {
        // Words cover the counts that appear in most advice.
        const WORDS: [&str; 11] = [
            "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
        ];

        if n < WORDS.len() {
            return WORDS[n].to_string();
        }

        Self::with_separators(n)
    }

    /// Format with thousands separators only (always digits).
    pub fn with_separators(n: usize) -> String {
        let digits = n.to_string();
        let bytes = digits.as_bytes();

        // Insert a comma before every group of three from the right.
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, b) in bytes.iter().enumerate() {
            if i > 0 && (bytes.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(*b as char);
        }
        out
    }

    /// "s" when a count needs pluralising, "" otherwise.
    pub fn plural_s(n: usize) -> &'static str {
        if n == 1 { "" } else { "s" }
    }
}

/// Prose list helpers ("`a`, `b`, and `c`").
pub struct NiceLists;

impl NiceLists {
    /// Join items into an English list, wrapping each item in
    /// `quoter` (pass "" for no wrapping).
    pub fn str_list<S: AsRef<str>>(items: &[S], quoter: &str) -> String {
        let quoted: Vec<String> = items
            .iter()
            .map(|item| format!("{quoter}{}{quoter}", item.as_ref()))
            .collect();

        match quoted.len() {
            0 => String::new(),
            1 => quoted[0].clone(),
            2 => format!("{} and {}", quoted[0], quoted[1]),
            _ => {
                let head = quoted[..quoted.len() - 1].iter().join(", ");
                format!("{head}, and {}", quoted[quoted.len() - 1])
            }
        }
    }

    /// Join (name, description) pairs into an English list with a
    /// glue phrase, e.g. "`items` defaults to a list".
    pub fn pairs<S1: AsRef<str>, S2: AsRef<str>>(pairs: &[(S1, S2)], glue: &str) -> String {
        let rendered: Vec<String> = pairs
            .iter()
            .map(|(left, right)| format!("`{}`{glue}{}", left.as_ref(), right.as_ref()))
            .collect();
        Self::str_list(&rendered, "")
    }
}

/// Markdown builders used by advisors when assembling messages.
pub struct Md;

impl Md {
    /// A level-3 heading followed by a blank line.
    pub fn h3(title: &str) -> String {
        format!("### {title}\n\n")
    }

    /// A level-4 heading followed by a blank line.
    pub fn h4(title: &str) -> String {
        format!("#### {title}\n\n")
    }

    /// A paragraph terminated with a blank line.
    pub fn para(text: &str) -> String {
        format!("{}\n\n", text.trim_end())
    }

    /// A fenced python code block terminated with a blank line.
    pub fn code_block(code: &str) -> String {
        format!("```python\n{}\n```\n\n", code.trim_end_matches('\n'))
    }

    /// Upper-case the first character, leaving the rest untouched
    /// (`str::to_uppercase` on the whole string would mangle names).
    pub fn capitalize_first(text: &str) -> String {
        let mut chars = text.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    }
}
