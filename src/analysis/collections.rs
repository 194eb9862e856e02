//! Filepath: src/analysis/collections.rs
//! Collection inspection: what is inside a collection literal?
//! Two strategies - live evaluation when the caller allows it, with
//! a structural fall-back that interprets the tree directly. Either
//! way oversized collections are truncated at a configured cap and
//! the truncation is disclosed in prose.

use tree_sitter::Node;

use crate::analysis::blocks::BlockSpec;
use crate::analysis::exec::{self, ExecOutcome, RunValue};
use crate::analysis::grammar::grammar;
use crate::analysis::names::assigned_names;
use crate::analysis::registry::HelperCtx;
use crate::analysis::tree::{PySource, PyValue};
use crate::infra::utils::NiceLists;

/// Contents of one collection, as far as they could be determined.
/// `Unknown` means the collection as a whole resisted inspection;
/// individual unreadable items inside a known collection appear as
/// `PyValue::Unknown` entries instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Collected {
    /// list / tuple / set items in order
    Seq(Vec<PyValue>),

    /// dict entries as (key, value) pairs in order
    Pairs(Vec<(PyValue, PyValue)>),

    /// Could not be determined at all
    Unknown,
}

impl Collected {
    /// Item count, when the contents are known.
    pub fn len(&self) -> Option<usize> {
        match self {
            Collected::Seq(items) => Some(items.len()),
            Collected::Pairs(pairs) => Some(pairs.len()),
            Collected::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Collected::Unknown)
    }

    /// True when any individual item resisted inspection.
    pub fn has_unknown_items(&self) -> bool {
        match self {
            Collected::Seq(items) => items.iter().any(PyValue::is_unknown),
            Collected::Pairs(pairs) => pairs
                .iter()
                .any(|(k, v)| k.is_unknown() || v.is_unknown()),
            Collected::Unknown => true,
        }
    }

    /// Truncate to `cap` items; true when anything was dropped.
    fn truncate(&mut self, cap: usize) -> bool {
        match self {
            Collected::Seq(items) if items.len() > cap => {
                items.truncate(cap);
                true
            }
            Collected::Pairs(pairs) if pairs.len() > cap => {
                pairs.truncate(cap);
                true
            }
            _ => false,
        }
    }
}

/// Names with their inspected contents, plus a ready-made prose
/// disclosure about truncated collections and about any import the
/// live evaluation found missing (both empty when not applicable).
#[derive(Debug, Clone)]
pub struct CollectionsDets {
    pub named: Vec<(String, Collected)>,
    pub oversized_msg: String,
    pub import_hint: String,
}

/// Inspect each collection node assigned to a name within a block.
/// With `ctx.execute_code` the live value wins; on any failure the
/// structural interpretation is used instead.
pub fn collections_dets(
    collection_nodes: &[Node],
    block: &BlockSpec,
    src: &PySource,
    ctx: &HelperCtx,
    collection_plural: &str,
) -> CollectionsDets {
    let mut named = Vec::new();
    let mut oversized_names = Vec::new();
    let mut missing_import = None;

    for node in collection_nodes {
        for binding in assigned_names(*node, src.bytes()).into_iter().flatten() {
            let name_str = binding.name_str();

            let mut items = if ctx.execute_code {
                match exec::resolve_value(&block.pre_block_code, &block.block_code, &name_str) {
                    ExecOutcome::Value(RunValue::Seq(items)) => Collected::Seq(items),
                    ExecOutcome::Value(RunValue::Pairs(pairs)) => Collected::Pairs(pairs),
                    ExecOutcome::MissingImport(module) => {
                        missing_import.get_or_insert(module);
                        ast_collection_items(*node, src.bytes())
                    }
                    _ => ast_collection_items(*node, src.bytes()),
                }
            } else {
                ast_collection_items(*node, src.bytes())
            };

            if items.truncate(ctx.max_items) {
                oversized_names.push(name_str.clone());
            }
            named.push((name_str, items));
        }
    }

    let oversized_msg = oversized_disclosure(&oversized_names, collection_plural, ctx.max_items);
    let import_hint = missing_import
        .map(|module| {
            format!(
                "Note: the snippet imports `{module}` which is not installed \
                 here, so contents were read from the code alone. This tool \
                 only runs snippets that rely on the standard library.\n\n"
            )
        })
        .unwrap_or_default();

    CollectionsDets {
        named,
        oversized_msg,
        import_hint,
    }
}

/// Structural interpretation of a collection literal (or a call to
/// `list` / `tuple` / `set` / `dict`). Comprehensions are never
/// statically evaluated.
pub fn ast_collection_items(node: Node, bytes: &[u8]) -> Collected {
    let g = grammar();

    match node.kind() {
        "list" | "tuple" | "set" => {
            let items = literal_children(node, bytes);
            Collected::Seq(items)
        }
        "dictionary" => {
            let mut pairs = Vec::with_capacity(node.named_child_count());
            for i in 0..node.named_child_count() {
                let Some(child) = node.named_child(i) else {
                    continue;
                };
                match child.kind() {
                    "pair" => {
                        let key = child
                            .child_by_field_name("key")
                            .and_then(|k| g.literal(k, bytes))
                            .unwrap_or(PyValue::Unknown);
                        let value = child
                            .child_by_field_name("value")
                            .and_then(|v| g.literal(v, bytes))
                            .unwrap_or(PyValue::Unknown);
                        pairs.push((key, value));
                    }
                    "comment" => {}
                    // dictionary_splat and friends
                    _ => pairs.push((PyValue::Unknown, PyValue::Unknown)),
                }
            }
            Collected::Pairs(pairs)
        }
        "list_comprehension" | "set_comprehension" | "dictionary_comprehension"
        | "generator_expression" => Collected::Unknown,
        "call" => call_items(node, bytes),
        _ => Collected::Unknown,
    }
}

/// Items of `list(...)` / `tuple(...)` / `set(...)` / `dict(...)`.
fn call_items(call: Node, bytes: &[u8]) -> Collected {
    let g = grammar();
    let Some(name) = g.call_name(call, bytes) else {
        return Collected::Unknown;
    };

    let args: Vec<Node> = call
        .child_by_field_name("arguments")
        .map(|arguments| {
            (0..arguments.named_child_count())
                .filter_map(|i| arguments.named_child(i))
                .filter(|n| n.kind() != "comment")
                .collect()
        })
        .unwrap_or_default();

    match name {
        "list" | "tuple" | "set" => match args.as_slice() {
            [] => Collected::Seq(Vec::new()),
            [only] if matches!(only.kind(), "list" | "tuple" | "set") => {
                Collected::Seq(literal_children(*only, bytes))
            }
            _ => Collected::Unknown,
        },
        "dict" => match args.as_slice() {
            [] => Collected::Pairs(Vec::new()),
            [only] if matches!(only.kind(), "list" | "tuple") => {
                // A sequence of two-tuples, or nothing we understand.
                let mut pairs = Vec::new();
                for i in 0..only.named_child_count() {
                    let Some(tup) = only.named_child(i) else {
                        continue;
                    };
                    if tup.kind() == "comment" {
                        continue;
                    }
                    if tup.kind() != "tuple" || tup.named_child_count() != 2 {
                        return Collected::Unknown;
                    }
                    let items = literal_children(tup, bytes);
                    pairs.push((items[0].clone(), items[1].clone()));
                }
                Collected::Pairs(pairs)
            }
            _ => Collected::Unknown,
        },
        _ => Collected::Unknown,
    }
}

/// Decode each named child as a literal; non-literal items become
/// the explicit unknown-item sentinel.
fn literal_children(node: Node, bytes: &[u8]) -> Vec<PyValue> {
    let g = grammar();
    (0..node.named_child_count())
        .filter_map(|i| node.named_child(i))
        .filter(|child| child.kind() != "comment")
        .map(|child| g.literal(child, bytes).unwrap_or(PyValue::Unknown))
        .collect()
}

/// Compose the truncation disclosure sentence.
fn oversized_disclosure(names: &[String], collection_plural: &str, cap: usize) -> String {
    match names {
        [] => String::new(),
        [only] => format!(
            "Because `{only}` is large only the first {cap} items were examined.\n\n"
        ),
        many => {
            let nice_names = NiceLists::str_list(many, "`");
            format!(
                "Because the following {collection_plural} were large only \
                 the first {cap} items of each were examined: {nice_names}.\n\n"
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::blocks::block_specs;
    use crate::analysis::tree::descendants_of_kind;

    fn no_exec_ctx() -> HelperCtx {
        HelperCtx {
            repeat: false,
            execute_code: false,
            max_items: 25,
            include_linting: false,
            ignored_lint_rules: Vec::new(),
        }
    }

    #[test]
    fn list_literal_items_decode_in_order() {
        let src = PySource::parse("nums = [1, 2, 3]\n").unwrap();
        let node = descendants_of_kind(src.root(), &["list"])[0];
        assert_eq!(
            ast_collection_items(node, src.bytes()),
            Collected::Seq(vec![PyValue::Int(1), PyValue::Int(2), PyValue::Int(3)])
        );
    }

    #[test]
    fn non_literal_items_become_unknown_sentinels() {
        let src = PySource::parse("vals = [1, len(x), 'a']\n").unwrap();
        let node = descendants_of_kind(src.root(), &["list"])[0];
        let Collected::Seq(items) = ast_collection_items(node, src.bytes()) else {
            panic!("expected seq");
        };
        assert_eq!(items[0], PyValue::Int(1));
        assert!(items[1].is_unknown());
        assert_eq!(items[2], PyValue::Str("a".to_string()));
    }

    #[test]
    fn dict_pairs_keep_key_types_distinct() {
        let src = PySource::parse("mixed = {1: 'a', '1': 'b'}\n").unwrap();
        let node = descendants_of_kind(src.root(), &["dictionary"])[0];
        let Collected::Pairs(pairs) = ast_collection_items(node, src.bytes()) else {
            panic!("expected pairs");
        };
        assert_eq!(pairs[0].0, PyValue::Int(1));
        assert_eq!(pairs[1].0, PyValue::Str("1".to_string()));
    }

    #[test]
    fn comprehension_is_always_unknown() {
        let src = PySource::parse("sq = [x * x for x in range(9)]\n").unwrap();
        let node = descendants_of_kind(src.root(), &["list_comprehension"])[0];
        assert!(ast_collection_items(node, src.bytes()).is_unknown());
    }

    #[test]
    fn constructor_calls_resolve_like_literals() {
        let src = PySource::parse("a = list()\nb = set(['x', 'y'])\nc = dict()\n").unwrap();
        let calls = descendants_of_kind(src.root(), &["call"]);

        assert_eq!(
            ast_collection_items(calls[0], src.bytes()),
            Collected::Seq(Vec::new())
        );
        assert_eq!(
            ast_collection_items(calls[1], src.bytes()),
            Collected::Seq(vec![
                PyValue::Str("x".to_string()),
                PyValue::Str("y".to_string())
            ])
        );
        assert_eq!(
            ast_collection_items(calls[2], src.bytes()),
            Collected::Pairs(Vec::new())
        );
    }

    #[test]
    fn dict_call_with_pair_tuples() {
        let src = PySource::parse("d = dict([('a', 1), ('b', 2)])\n").unwrap();
        let call = descendants_of_kind(src.root(), &["call"])[0];
        let Collected::Pairs(pairs) = ast_collection_items(call, src.bytes()) else {
            panic!("expected pairs");
        };
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], (PyValue::Str("a".to_string()), PyValue::Int(1)));
    }

    #[test]
    fn small_collections_come_back_exactly() {
        let code = "nums = [1, 2, 3, 4, 5]\n";
        let src = PySource::parse(code).unwrap();
        let specs = block_specs(&src);
        let lists = descendants_of_kind(src.root(), &["list"]);

        let dets = collections_dets(&lists, &specs[0], &src, &no_exec_ctx(), "lists");
        assert_eq!(dets.named.len(), 1);
        assert_eq!(dets.named[0].0, "nums");
        assert_eq!(dets.named[0].1.len(), Some(5));
        assert!(dets.oversized_msg.is_empty());
    }

    #[test]
    fn oversized_collections_truncate_and_disclose() {
        let items: Vec<String> = (0..30).map(|n| n.to_string()).collect();
        let code = format!("big = [{}]\n", items.join(", "));
        let src = PySource::parse(&code).unwrap();
        let specs = block_specs(&src);
        let lists = descendants_of_kind(src.root(), &["list"]);

        let dets = collections_dets(&lists, &specs[0], &src, &no_exec_ctx(), "lists");
        assert_eq!(dets.named[0].1.len(), Some(25));
        assert!(dets.oversized_msg.contains("`big`"));
    }
}
