//! Filepath: src/helpers/dict_help.rs
//! Advice on dictionary definitions: an overview of each dict
//! assigned to a name, and a warning when keys mix data types
//! (`{1: ..., '1': ...}` is legal and a reliable source of bugs).

use std::collections::BTreeSet;

use tree_sitter::Node;

use crate::analysis::blocks::BlockSpec;
use crate::analysis::collections::{Collected, collections_dets};
use crate::analysis::grammar::grammar;
use crate::analysis::messages::MessageLevels;
use crate::analysis::registry::{HelperCtx, HelperSpec, Registry};
use crate::analysis::tree::{PySource, PyValue, descendants_of_kind};
use crate::infra::utils::{Md, NiceLists, NiceNumbers};

const ASSIGN_DICT_QUERY: &str =
    "(assignment right: (dictionary)) @a\n(assignment right: (call)) @a";

pub fn register(reg: &mut Registry) {
    reg.register(HelperSpec::IndivBlock {
        name: "dict_overview",
        comment: "General overview of dictionaries assigned to names",
        query: Some(ASSIGN_DICT_QUERY),
        warning: false,
        run: dict_overview,
    });
    reg.register(HelperSpec::IndivBlock {
        name: "mixed_key_types",
        comment: "Warns about dictionaries whose keys mix data types",
        query: Some(ASSIGN_DICT_QUERY),
        warning: true,
        run: mixed_key_types,
    });
}

/// Dict-valued assignment nodes within a block: dict literals plus
/// `dict(...)` constructor calls.
fn dict_nodes<'t>(block: &BlockSpec<'t>, src: &PySource) -> Vec<Node<'t>> {
    descendants_of_kind(block.element, &["assignment"])
        .into_iter()
        .filter_map(|assign| {
            let right = assign.child_by_field_name("right")?;
            match right.kind() {
                "dictionary" => Some(right),
                "call" if grammar().call_name(right, src.bytes()) == Some("dict") => Some(right),
                _ => None,
            }
        })
        .collect()
}

fn dict_overview(block: &BlockSpec, src: &PySource, ctx: &HelperCtx) -> Option<MessageLevels> {
    let nodes = dict_nodes(block, src);
    if nodes.is_empty() {
        return None;
    }

    let dets = collections_dets(&nodes, block, src, ctx, "dictionaries");
    if dets.named.is_empty() {
        return None;
    }

    let title = Md::h3(&format!(
        "Dictionar{} defined",
        if dets.named.len() == 1 { "y" } else { "ies" }
    ));

    let mut summary = String::new();
    for (name, items) in &dets.named {
        match items {
            Collected::Pairs(pairs) if pairs.is_empty() => {
                summary += &Md::para(&format!("`{name}` is an empty dictionary."));
            }
            Collected::Pairs(pairs) => {
                summary += &Md::para(&format!(
                    "`{name}` is a dictionary with {} key-value pair{}.",
                    NiceNumbers::int2nice(pairs.len()),
                    NiceNumbers::plural_s(pairs.len()),
                ));
            }
            _ => {
                summary += &Md::para(&format!(
                    "`{name}` is a dictionary but its contents could not be \
                     determined."
                ));
            }
        }
    }

    let explanation = if ctx.repeat {
        String::new()
    } else {
        let demo_name = &dets.named[0].0;
        Md::para(
            "Dictionaries map keys to values, and looking a value up by its \
             key is fast no matter how big the dictionary gets. Keys must be \
             unique; assigning to an existing key replaces its value.",
        ) + &Md::para("Values are read and written with square brackets:")
            + &Md::code_block(&format!(
                "{demo_name}[key]  ## read\n{demo_name}[key] = value  ## write"
            ))
            + &Md::para(
                "Use `.get(key, default)` when the key might be absent and a \
                 fallback makes sense; a plain lookup raises `KeyError` \
                 instead, which is the right behavior when absence is a bug.",
            )
    };

    let prefix = dets.import_hint.clone() + &dets.oversized_msg;
    Some(MessageLevels::with_main(
        title.clone() + &prefix + &summary,
        title + &prefix + &summary + &explanation,
    ))
}

fn mixed_key_types(block: &BlockSpec, src: &PySource, ctx: &HelperCtx) -> Option<MessageLevels> {
    let nodes = dict_nodes(block, src);
    if nodes.is_empty() {
        return None;
    }

    let dets = collections_dets(&nodes, block, src, ctx, "dictionaries");
    let mut mixed: Vec<(String, Vec<&'static str>)> = Vec::new();
    for (name, items) in &dets.named {
        let Collected::Pairs(pairs) = items else {
            continue;
        };
        let key_types: BTreeSet<&'static str> = pairs
            .iter()
            .map(|(key, _)| key)
            .filter(|key| !key.is_unknown())
            .map(PyValue::nice_type_name)
            .collect();
        if key_types.len() > 1 {
            mixed.push((name.clone(), key_types.into_iter().collect()));
        }
    }
    if mixed.is_empty() {
        return None;
    }

    let title = Md::h3("Dictionary keys mix different data types");
    let mut warning_text = String::new();
    for (name, key_types) in &mixed {
        warning_text += &Md::para(&format!(
            "`{name}` has keys of more than one data type \
             ({}). That is legal Python but almost always a mistake: `1` and \
             `'1'` are different keys that are easy to confuse.",
            NiceLists::str_list(key_types, ""),
        ));
    }

    let advice = if ctx.repeat {
        String::new()
    } else {
        Md::para(
            "If the mix is deliberate, consider whether separate \
             dictionaries, or converting every key to a single type up \
             front, would make the intent clearer.",
        )
    };

    Some(MessageLevels::with_main(
        title.clone() + &dets.oversized_msg + &warning_text,
        title + &dets.oversized_msg + &warning_text + &advice,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::blocks::block_specs;

    fn ctx() -> HelperCtx {
        HelperCtx {
            repeat: false,
            execute_code: false,
            max_items: 25,
            include_linting: false,
            ignored_lint_rules: Vec::new(),
        }
    }

    #[test]
    fn overview_counts_pairs() {
        let src = PySource::parse("ages = {'amy': 12, 'bo': 9}\n").unwrap();
        let blocks = block_specs(&src);

        let msg = dict_overview(&blocks[0], &src, &ctx()).unwrap();
        assert!(msg.brief.contains("`ages`"));
        assert!(msg.brief.contains("two key-value pair"));
    }

    #[test]
    fn mixed_keys_warn_with_dict_name() {
        let src = PySource::parse("mixed = {1: 'a', '1': 'b'}\n").unwrap();
        let blocks = block_specs(&src);

        let msg = mixed_key_types(&blocks[0], &src, &ctx()).unwrap();
        assert!(msg.brief.contains("`mixed`"));
        assert!(msg.brief.contains("integer"));
        assert!(msg.brief.contains("string"));
    }

    #[test]
    fn uniform_keys_do_not_warn() {
        let src = PySource::parse("ages = {'amy': 12, 'bo': 9}\n").unwrap();
        let blocks = block_specs(&src);
        assert!(mixed_key_types(&blocks[0], &src, &ctx()).is_none());
    }

    #[test]
    fn dict_constructor_call_is_covered() {
        let src = PySource::parse("empty = dict()\n").unwrap();
        let blocks = block_specs(&src);

        let msg = dict_overview(&blocks[0], &src, &ctx()).unwrap();
        assert!(msg.brief.contains("empty dictionary"));
    }
}
