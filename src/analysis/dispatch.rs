//! Filepath: src/analysis/dispatch.rs
//! The analysis dispatcher: run every registered advisor over its
//! scope and collect message records. Three guarantees matter here:
//!   - repeat suppression: an advisor fires with `repeat = false`
//!     at most once per dispatch call, and the tracking state lives
//!     in this call's stack frame, not in any global;
//!   - fail-soft: a crashing advisor becomes one warning message
//!     and every other advisor still runs;
//!   - scope resolution: query-filtered advisors run once per
//!     matching block, in body order, without duplicates.

use std::collections::HashSet;
use std::panic::{AssertUnwindSafe, catch_unwind};

use anyhow::Result;
use tracing::debug;

use crate::analysis::blocks::BlockSpec;
use crate::analysis::messages::{
    self, Message, MessageLevels, MessageRecord, SnippetMessages, complete_message,
};
use crate::analysis::registry::{HelperCtx, HelperSpec, Registry};
use crate::analysis::tree::{PySource, block_ancestor};

/// Dispatch-wide options, mostly threaded through to advisors.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    pub warnings_only: bool,
    pub execute_code: bool,
    pub max_items: usize,
    pub include_linting: bool,
    pub ignored_lint_rules: Vec<String>,
}

/// Run every advisor and collect the snippet-level and block-level
/// messages. When nothing fires at all, a single "no advice" system
/// message is emitted so the run never ends silently.
pub fn dispatch(
    src: &PySource,
    blocks: &[BlockSpec],
    registry: &Registry,
    opts: &DispatchOptions,
) -> Result<SnippetMessages> {
    // Repeat-suppression state, scoped to this call and discarded
    // with it. A fresh dispatch starts with every advisor unfired.
    let mut fired: HashSet<&'static str> = HashSet::new();
    let mut out = SnippetMessages::default();

    for spec in registry.specs() {
        if opts.warnings_only && !spec.warning() {
            continue;
        }

        let ctx = |repeat: bool| HelperCtx {
            repeat,
            execute_code: opts.execute_code,
            max_items: opts.max_items,
            include_linting: opts.include_linting,
            ignored_lint_rules: opts.ignored_lint_rules.clone(),
        };

        match spec {
            HelperSpec::SnippetStr { name, run, .. } => {
                let repeat = !fired.insert(*name);
                let call = || run(src.code(), &ctx(repeat));
                if let Some(record) =
                    guarded_record(spec, call, src.code().to_string(), None)?
                {
                    out.snippet_level.push(record);
                }
            }
            HelperSpec::MultiBlock { name, run, .. } => {
                let repeat = !fired.insert(*name);
                let call = || run(blocks, src, &ctx(repeat));
                if let Some(record) =
                    guarded_record(spec, call, src.code().to_string(), None)?
                {
                    out.snippet_level.push(record);
                }
            }
            HelperSpec::IndivBlock {
                name, query, run, ..
            } => {
                let in_scope = match query {
                    Some(pattern) => filtered_blocks(src, blocks, name, pattern),
                    None => blocks.iter().collect(),
                };

                for block in in_scope {
                    // The first call in this run gets the full
                    // pedagogical text; every later call a summary.
                    let repeat = !fired.insert(*name);
                    let call = || run(block, src, &ctx(repeat));
                    if let Some(record) = guarded_record(
                        spec,
                        call,
                        block.block_code.clone(),
                        Some(block.first_line),
                    )? {
                        out.block_level.push(record);
                    }
                }
            }
        }
    }

    if out.is_empty() {
        return Ok(messages::system_messages(
            src.code(),
            messages::NO_ADVICE_MESSAGE,
            false,
        ));
    }
    Ok(out)
}

/// Blocks containing at least one query match, unique, in body
/// order - the block in scope for a filtered advisor.
fn filtered_blocks<'b, 't>(
    src: &PySource,
    blocks: &'b [BlockSpec<'t>],
    name: &str,
    pattern: &str,
) -> Vec<&'b BlockSpec<'t>> {
    let hits = match src.query_nodes(pattern) {
        Ok(hits) => hits,
        Err(err) => {
            // A broken pattern is a defect in the advisor, not in
            // the user's snippet; log and treat as no matches.
            debug!(advisor = name, error = %err, "query pattern failed to compile");
            return Vec::new();
        }
    };

    if hits.is_empty() {
        debug!(advisor = name, "no query matches");
        return Vec::new();
    }
    debug!(advisor = name, matches = hits.len(), "query matched");

    let hit_block_ids: HashSet<usize> = hits
        .into_iter()
        .filter_map(block_ancestor)
        .map(|node| node.id())
        .collect();

    blocks
        .iter()
        .filter(|block| hit_block_ids.contains(&block.element.id()))
        .collect()
}

/// Invoke one advisor call, absorbing panics and completing the
/// returned levels. `Ok(None)` means nothing to report.
fn guarded_record(
    spec: &HelperSpec,
    call: impl FnOnce() -> Option<MessageLevels>,
    code_str: String,
    first_line: Option<usize>,
) -> Result<Option<MessageRecord>> {
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(None) => Ok(None),
        Ok(Some(levels)) => {
            let message = complete_message(levels, spec.name())?;
            Ok(Some(MessageRecord {
                code_str,
                message,
                first_line,
                warning: spec.warning(),
                source: spec.name().to_string(),
            }))
        }
        Err(payload) => {
            let detail = panic_text(payload.as_ref());
            let brief = format!(
                "### Advisor \"`{name}`\" unable to run\n\nAdvisor {name} \
                 ({comment}) failed while examining this code: {detail}\n",
                name = spec.name(),
                comment = spec.comment(),
            );
            Ok(Some(MessageRecord {
                code_str,
                message: Message {
                    brief: brief.clone(),
                    main: brief,
                    extra: String::new(),
                },
                first_line,
                warning: true,
                source: spec.name().to_string(),
            }))
        }
    }
}

/// Best-effort text of a panic payload.
fn panic_text(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}
