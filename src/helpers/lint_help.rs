//! Filepath: src/helpers/lint_help.rs
//! Snippet-level advisor that shells out to a flake8-compatible
//! linter. The snippet is staged to a temp file with exactly one
//! trailing newline, the linter's stdout is parsed with a fixed
//! regex, related finding kinds are consolidated into pedagogical
//! buckets, and one message per bucket carries per-line details.
//! No linter on the machine, or a silent linter, means no message.

use std::process::Command;
use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;
use tracing::debug;

use crate::analysis::messages::MessageLevels;
use crate::analysis::registry::{HelperCtx, HelperSpec, Registry};
use crate::infra::tmp::stage_snippet;
use crate::infra::utils::{Md, NiceLists, NiceNumbers};

pub fn register(reg: &mut Registry) {
    reg.register(HelperSpec::SnippetStr {
        name: "lint_snippet",
        comment: "Report what a flake8-compatible linter finds",
        warning: true,
        run: lint_snippet,
    });
}

/// One parsed linter finding.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LintFinding {
    line_no: usize,
    kind: String,
    msg: String,
}

/// `path:line:col: KIND message` - the format every flake8-family
/// linter emits by default.
fn lint_line_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?x)
            ^.*?:               # staged file path
            (?P<line>\d+):      # 1-based line
            (?P<col>\d+):\s+    # 1-based column
            (?P<kind>[A-Z]\d+)\s+
            (?P<msg>.*)$
        ")
        .expect("lint regex is valid")
    })
}

/// Parse every stdout line that matches the documented format.
fn parse_lint_output(stdout: &str) -> Vec<LintFinding> {
    let regex = lint_line_regex();
    stdout
        .lines()
        .filter_map(|line| {
            let caps = regex.captures(line.trim())?;
            Some(LintFinding {
                line_no: caps["line"].parse().ok()?,
                kind: caps["kind"].to_string(),
                msg: caps["msg"].to_string(),
            })
        })
        .collect()
}

/// Merge related kinds into one pedagogical bucket; everything else
/// keeps its own kind.
fn consolidated_kind(kind: &str) -> &str {
    match kind {
        // Continuation-line indentation family.
        "E121" | "E122" | "E123" | "E124" | "E125" | "E126" | "E127" | "E128" | "E129"
        | "E131" => "E12x",
        // Blank-line family.
        "E301" | "E302" | "E303" | "E305" | "E306" => "E30x",
        // Trailing whitespace family.
        "W291" | "W293" => "W29x",
        other => other,
    }
}

/// A supplement for kinds that deserve more than the linter's own
/// one-liner. (brief text, main text)
fn supplement(kind: &str) -> Option<(&'static str, &'static str)> {
    match kind {
        "E501" => Some((
            "One or more lines are longer than the recommended 79 \
             characters. This is not necessarily a problem but long lines \
             should be the exception to the rule.",
            "One or more lines are longer than the recommended 79 \
             characters. This is not necessarily a problem given that \
             monitors are wider than when the guideline was written - but \
             all being equal, short lines are easier to read and understand \
             than long ones. There are multiple strategies for shortening \
             lines; the overall goal has to be readability. Read PEP 8, \
             especially \"A Foolish Consistency is the Hobgoblin of Little \
             Minds\".",
        )),
        "F401" => Some((
            "One or more imports not used in the snippet.",
            "One or more imports not used in the snippet. If the snippet \
             was extracted from a larger piece of code and the imports are \
             used there, there is no problem.",
        )),
        _ => None,
    }
}

/// Group findings per consolidated kind and render one detail line
/// each: "Message (lines: 1 and 3)".
fn bucket_details(findings: &[LintFinding]) -> IndexMap<String, String> {
    // kind -> message -> sorted line numbers
    let mut grouped: IndexMap<String, IndexMap<String, Vec<usize>>> = IndexMap::new();
    for finding in findings {
        grouped
            .entry(consolidated_kind(&finding.kind).to_string())
            .or_default()
            .entry(finding.msg.clone())
            .or_default()
            .push(finding.line_no);
    }

    let mut details = IndexMap::new();
    for (kind, msgs) in grouped {
        let mut parts = Vec::new();
        for (msg, mut lines) in msgs {
            lines.sort_unstable();
            lines.dedup();
            let nice_lines: Vec<String> = lines.iter().map(|n| n.to_string()).collect();
            parts.push(format!(
                "{} (line{}: {})",
                Md::capitalize_first(&msg),
                NiceNumbers::plural_s(lines.len()),
                NiceLists::str_list(&nice_lines, ""),
            ));
        }
        details.insert(kind, parts.join("; "));
    }
    details
}

fn lint_snippet(snippet: &str, ctx: &HelperCtx) -> Option<MessageLevels> {
    if !ctx.include_linting {
        return None;
    }

    let linter = which::which("flake8").ok()?;
    let staged = stage_snippet(snippet).ok()?;

    let mut command = Command::new(&linter);
    command.arg(staged.path());
    if !ctx.ignored_lint_rules.is_empty() {
        command.arg(format!("--ignore={}", ctx.ignored_lint_rules.join(",")));
    }

    let output = match command.output() {
        Ok(output) => output,
        Err(err) => {
            debug!(error = %err, "failed to run linter");
            return None;
        }
    };

    // Exit status is not meaningful on its own: findings exit
    // non-zero too. No stdout means nothing to report.
    let stdout = String::from_utf8_lossy(&output.stdout);
    if stdout.trim().is_empty() {
        return None;
    }

    let findings = parse_lint_output(&stdout);
    if findings.is_empty() {
        return None;
    }
    let details = bucket_details(&findings);

    let title = Md::h3("Python code issues (found by a linter)");
    let findings_intro = Md::para("Here is what the linter reported about your snippet.");

    let mut brief_body = String::new();
    let mut main_body = String::new();
    let mut misc_started = false;
    for (kind, detail) in &details {
        match supplement(kind) {
            Some((brief_extra, main_extra)) => {
                brief_body += &Md::para(&format!("{brief_extra}\n\nDetails: {detail}"));
                main_body += &Md::para(&format!("{main_extra}\n\nDetails: {detail}"));
            }
            None => {
                if !misc_started {
                    brief_body += &Md::h4("Misc lint issues");
                    main_body += &Md::h4("Misc lint issues");
                    misc_started = true;
                }
                brief_body += &format!("* {detail}\n");
                main_body += &format!("* {detail}\n");
            }
        }
    }

    let linting_background = if ctx.repeat {
        String::new()
    } else {
        Md::para(
            "\"Linters\" are software tools. They detect everything from \
             trivial style mistakes through to show-stopper syntax errors. \
             Linting is especially useful for an interpreted language like \
             Python because there is no compiler to pick up the \"lint\".",
        )
    };
    let obviousness = if ctx.repeat {
        String::new()
    } else {
        Md::h4("Good code is simple enough to reason about")
            + &Md::para(
                "Linting is no substitute for unit testing, and neither \
                 substitutes for readable code that can be reasoned about \
                 with confidence - the single best protection against code \
                 not doing what it is meant to do. The goal is code where \
                 there is obviously nothing wrong, rather than code where \
                 there is nothing obviously wrong.",
            )
    };

    Some(MessageLevels::new(
        title.clone() + &findings_intro + &brief_body,
        title + &linting_background + &findings_intro + &main_body,
        obviousness,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_documented_lint_format() {
        let stdout = "/tmp/snippet.py:1:80: E501 line too long (91 > 79 characters)\n\
                      /tmp/snippet.py:3:1: F401 'os' imported but unused\n";
        let findings = parse_lint_output(stdout);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].kind, "E501");
        assert_eq!(findings[0].line_no, 1);
        assert_eq!(findings[1].msg, "'os' imported but unused");
    }

    #[test]
    fn unmatched_lines_are_skipped() {
        let findings = parse_lint_output("some noise\nnot a finding\n");
        assert!(findings.is_empty());
    }

    #[test]
    fn related_kinds_consolidate() {
        assert_eq!(consolidated_kind("E122"), "E12x");
        assert_eq!(consolidated_kind("E131"), "E12x");
        assert_eq!(consolidated_kind("E302"), "E30x");
        assert_eq!(consolidated_kind("E501"), "E501");
    }

    #[test]
    fn buckets_merge_lines_per_message() {
        let findings = vec![
            LintFinding {
                line_no: 3,
                kind: "E501".to_string(),
                msg: "line too long (91 > 79 characters)".to_string(),
            },
            LintFinding {
                line_no: 1,
                kind: "E501".to_string(),
                msg: "line too long (91 > 79 characters)".to_string(),
            },
        ];
        let details = bucket_details(&findings);
        let detail = details.get("E501").unwrap();
        assert!(detail.contains("lines: 1 and 3"));
    }

    #[test]
    fn disabled_linting_returns_none() {
        let ctx = HelperCtx {
            repeat: false,
            execute_code: false,
            max_items: 25,
            include_linting: false,
            ignored_lint_rules: Vec::new(),
        };
        assert!(lint_snippet("x=1\n", &ctx).is_none());
    }
}
