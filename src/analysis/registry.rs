//! Filepath: src/analysis/registry.rs
//! Advisor registry. Advisors are plain functions classified by the
//! scope they examine (one block, every block together, or the raw
//! snippet string) and registered through an explicit discovery
//! step - no import-time side effects, no globals, so registration
//! order is testable and stable within a run.

use crate::analysis::blocks::BlockSpec;
use crate::analysis::messages::MessageLevels;
use crate::analysis::tree::PySource;

/// Per-call context handed to every advisor.
#[derive(Debug, Clone)]
pub struct HelperCtx {
    /// True when this advisor has already fired in this run; the
    /// advisor is expected to emit a shortened message
    pub repeat: bool,

    /// Live evaluation allowed (the executor refuses otherwise)
    pub execute_code: bool,

    /// Cap on items inspected per collection before truncation
    pub max_items: usize,

    /// External linter advisor enabled
    pub include_linting: bool,

    /// Linter rules suppressed when invoking the external linter
    pub ignored_lint_rules: Vec<String>,
}

/// An advisor examining one block spec at a time.
pub type IndivBlockFn = fn(&BlockSpec, &PySource, &HelperCtx) -> Option<MessageLevels>;

/// An advisor examining all block specs together.
pub type MultiBlockFn = fn(&[BlockSpec], &PySource, &HelperCtx) -> Option<MessageLevels>;

/// An advisor examining the raw snippet string.
pub type SnippetStrFn = fn(&str, &HelperCtx) -> Option<MessageLevels>;

/// A registered advisor: scope, metadata, and the function itself.
pub enum HelperSpec {
    /// Called per block; with a query pattern only for blocks
    /// containing a match, without one for every block.
    IndivBlock {
        name: &'static str,
        comment: &'static str,
        query: Option<&'static str>,
        warning: bool,
        run: IndivBlockFn,
    },

    /// Called once with every block spec.
    MultiBlock {
        name: &'static str,
        comment: &'static str,
        warning: bool,
        run: MultiBlockFn,
    },

    /// Called once with the snippet source string.
    SnippetStr {
        name: &'static str,
        comment: &'static str,
        warning: bool,
        run: SnippetStrFn,
    },
}

impl HelperSpec {
    pub fn name(&self) -> &'static str {
        match self {
            HelperSpec::IndivBlock { name, .. }
            | HelperSpec::MultiBlock { name, .. }
            | HelperSpec::SnippetStr { name, .. } => name,
        }
    }

    pub fn comment(&self) -> &'static str {
        match self {
            HelperSpec::IndivBlock { comment, .. }
            | HelperSpec::MultiBlock { comment, .. }
            | HelperSpec::SnippetStr { comment, .. } => comment,
        }
    }

    pub fn warning(&self) -> bool {
        match self {
            HelperSpec::IndivBlock { warning, .. }
            | HelperSpec::MultiBlock { warning, .. }
            | HelperSpec::SnippetStr { warning, .. } => *warning,
        }
    }
}

/// Ordered collection of advisor specs. Registration order is the
/// order advisors run in; output is line-sorted later, so ordering
/// only affects tie-breaks, never correctness.
#[derive(Default)]
pub struct Registry {
    specs: Vec<HelperSpec>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one advisor spec.
    pub fn register(&mut self, spec: HelperSpec) {
        self.specs.push(spec);
    }

    /// All specs in registration order.
    pub fn specs(&self) -> &[HelperSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// `(comment, name, warning)` rows for the advice listing,
    /// sorted by advisor name for a stable listing.
    pub fn advice_listing(&self) -> Vec<(&'static str, &'static str, bool)> {
        let mut rows: Vec<_> = self
            .specs
            .iter()
            .map(|spec| (spec.comment(), spec.name(), spec.warning()))
            .collect();
        rows.sort_by_key(|(_, name, _)| *name);
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_indiv(
        _block: &BlockSpec,
        _src: &PySource,
        _ctx: &HelperCtx,
    ) -> Option<MessageLevels> {
        None
    }

    #[test]
    fn registration_order_is_preserved() {
        let mut reg = Registry::new();
        reg.register(HelperSpec::IndivBlock {
            name: "second_listed",
            comment: "b",
            query: None,
            warning: false,
            run: quiet_indiv,
        });
        reg.register(HelperSpec::IndivBlock {
            name: "first_listed",
            comment: "a",
            query: None,
            warning: true,
            run: quiet_indiv,
        });

        let names: Vec<_> = reg.specs().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["second_listed", "first_listed"]);
    }

    #[test]
    fn advice_listing_sorts_by_name() {
        let mut reg = Registry::new();
        reg.register(HelperSpec::IndivBlock {
            name: "zeta",
            comment: "z",
            query: None,
            warning: false,
            run: quiet_indiv,
        });
        reg.register(HelperSpec::IndivBlock {
            name: "alpha",
            comment: "a",
            query: None,
            warning: true,
            run: quiet_indiv,
        });

        let listing = reg.advice_listing();
        assert_eq!(listing[0].1, "alpha");
        assert!(listing[0].2);
        assert_eq!(listing[1].1, "zeta");
    }
}
