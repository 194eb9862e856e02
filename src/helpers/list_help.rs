//! Filepath: src/helpers/list_help.rs
//! Advice on list definitions: an overview of each list assigned to
//! a name, and a warning when one mixes item types.

use std::collections::BTreeSet;

use tree_sitter::Node;

use crate::analysis::blocks::BlockSpec;
use crate::analysis::collections::{Collected, collections_dets};
use crate::analysis::grammar::grammar;
use crate::analysis::messages::MessageLevels;
use crate::analysis::registry::{HelperCtx, HelperSpec, Registry};
use crate::analysis::tree::{PySource, PyValue, descendants_of_kind};
use crate::infra::utils::{Md, NiceLists, NiceNumbers};

/// Broad pattern: any assignment whose value is a list literal or a
/// call (the advisor re-checks that calls are really `list(...)`).
const ASSIGN_LIST_QUERY: &str = "(assignment right: (list)) @a\n(assignment right: (call)) @a";

pub fn register(reg: &mut Registry) {
    reg.register(HelperSpec::IndivBlock {
        name: "list_overview",
        comment: "General overview of lists assigned to names",
        query: Some(ASSIGN_LIST_QUERY),
        warning: false,
        run: list_overview,
    });
    reg.register(HelperSpec::IndivBlock {
        name: "mixed_list_types",
        comment: "Warns about lists containing a mix of data types",
        query: Some(ASSIGN_LIST_QUERY),
        warning: true,
        run: mixed_list_types,
    });
}

/// List-valued assignment nodes within a block: list literals plus
/// `list(...)` constructor calls.
fn list_nodes<'t>(block: &BlockSpec<'t>, src: &PySource) -> Vec<Node<'t>> {
    descendants_of_kind(block.element, &["assignment"])
        .into_iter()
        .filter_map(|assign| {
            let right = assign.child_by_field_name("right")?;
            match right.kind() {
                "list" => Some(right),
                "call" if grammar().call_name(right, src.bytes()) == Some("list") => Some(right),
                _ => None,
            }
        })
        .collect()
}

/// Distinct reader-friendly type names across known items.
fn item_type_names(items: &[PyValue]) -> Vec<&'static str> {
    let names: BTreeSet<&'static str> = items
        .iter()
        .filter(|item| !item.is_unknown())
        .map(PyValue::nice_type_name)
        .collect();
    names.into_iter().collect()
}

fn list_overview(block: &BlockSpec, src: &PySource, ctx: &HelperCtx) -> Option<MessageLevels> {
    let nodes = list_nodes(block, src);
    if nodes.is_empty() {
        return None;
    }

    let dets = collections_dets(&nodes, block, src, ctx, "lists");
    if dets.named.is_empty() {
        return None;
    }

    let title = Md::h3(&format!(
        "List{} defined",
        NiceNumbers::plural_s(dets.named.len())
    ));

    let mut summary = String::new();
    for (name, items) in &dets.named {
        match items {
            Collected::Unknown => {
                summary += &Md::para(&format!(
                    "`{name}` is a list but its contents could not be determined."
                ));
            }
            Collected::Seq(values) if values.is_empty() => {
                summary += &Md::para(&format!("`{name}` is an empty list."));
            }
            Collected::Seq(values) => {
                summary += &Md::para(&format!(
                    "`{name}` is a list with {} item{}.",
                    NiceNumbers::int2nice(values.len()),
                    NiceNumbers::plural_s(values.len()),
                ));
            }
            // A dict here means the name was rebound at runtime;
            // stick to the structural story.
            Collected::Pairs(_) => {
                summary += &Md::para(&format!("`{name}` is assigned a collection."));
            }
        }
    }

    let brief_overview = if ctx.repeat {
        String::new()
    } else {
        Md::para(
            "Lists, along with dictionaries, are the workhorses of Python \
             data structures. Lists have an order, and can contain duplicate \
             items and items of different types (usually not advisable).",
        )
    };

    let grow_demo = if ctx.repeat {
        String::new()
    } else {
        let demo_name = &dets.named[0].0;
        Md::para("Extra items can be added to lists using the `.append()` method:")
            + &Md::code_block(&format!("{demo_name}.append('kiwifruit')"))
            + &Md::para(
                "If you want to add multiple items at once, `.extend()` is \
                 useful, and whole lists can be joined with `+`:",
            )
            + &Md::code_block(&format!(
                "{demo_name}.extend(['apple', 'banana'])\nguests = friends + family"
            ))
            + &Md::para(
                "GOTCHA: if you are adding tuples to your list it is easy to \
                 forget the nested parentheses:",
            )
            + &Md::code_block(
                "coordinates.append((x, y))  ## correct\n\
                 coordinates.append(x, y)  ## oops - append takes one item",
            )
    };

    let prefix = dets.import_hint.clone() + &dets.oversized_msg;
    Some(MessageLevels::with_main(
        title.clone() + &prefix + &summary + &brief_overview,
        title + &prefix + &summary + &grow_demo,
    ))
}

fn mixed_list_types(block: &BlockSpec, src: &PySource, ctx: &HelperCtx) -> Option<MessageLevels> {
    let nodes = list_nodes(block, src);
    if nodes.is_empty() {
        return None;
    }

    let dets = collections_dets(&nodes, block, src, ctx, "lists");
    let mut mixed: Vec<(String, Vec<&'static str>)> = Vec::new();
    for (name, items) in &dets.named {
        let Collected::Seq(values) = items else {
            continue;
        };
        let type_names = item_type_names(values);
        if type_names.len() > 1 {
            mixed.push((name.clone(), type_names));
        }
    }
    if mixed.is_empty() {
        return None;
    }

    let title = Md::h3("List(s) with a mix of different data types");
    let mut warning_text = String::new();
    for (name, _) in &mixed {
        warning_text += &Md::para(&format!(
            "`{name}` contains more than one data type - which is probably a \
             bad idea."
        ));
    }

    let type_details: Vec<String> = mixed
        .iter()
        .map(|(name, type_names)| {
            format!("`{name}` mixes {}", NiceLists::str_list(type_names, ""))
        })
        .collect();
    let details = Md::para(&format!(
        "The data types found were: {}.",
        NiceLists::str_list(&type_details, "")
    ));

    Some(MessageLevels::with_main(
        title.clone() + &dets.oversized_msg + &warning_text,
        title + &dets.oversized_msg + &warning_text + &details,
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
    fn overview_counts_items() {
        let src = PySource::parse("names = ['Noor', 'Grant', 'Hyeji']\n").unwrap();
        let blocks = block_specs(&src);

        let msg = list_overview(&blocks[0], &src, &ctx()).unwrap();
        assert!(msg.brief.contains("`names`"));
        assert!(msg.brief.contains("three item"));
    }

    #[test]
    fn empty_list_is_called_out() {
        let src = PySource::parse("empty = []\n").unwrap();
        let blocks = block_specs(&src);

        let msg = list_overview(&blocks[0], &src, &ctx()).unwrap();
        assert!(msg.brief.contains("empty list"));
    }

    #[test]
    fn non_list_block_returns_none() {
        let src = PySource::parse("total = 1 + 2\n").unwrap();
        let blocks = block_specs(&src);
        assert!(list_overview(&blocks[0], &src, &ctx()).is_none());
    }

    #[test]
    fn mixed_types_warn_with_name() {
        let src = PySource::parse("mixedTypes = [1, 'Noor', False]\n").unwrap();
        let blocks = block_specs(&src);

        let msg = mixed_list_types(&blocks[0], &src, &ctx()).unwrap();
        assert!(msg.brief.contains("`mixedTypes`"));
    }

    #[test]
    fn uniform_list_does_not_warn() {
        let src = PySource::parse("nums = [1, 2, 3]\n").unwrap();
        let blocks = block_specs(&src);
        assert!(mixed_list_types(&blocks[0], &src, &ctx()).is_none());
    }

    #[test]
    fn repeat_run_is_shorter() {
        let src = PySource::parse("names = ['a', 'b']\n").unwrap();
        let blocks = block_specs(&src);

        let full = list_overview(&blocks[0], &src, &ctx()).unwrap();
        let mut repeat_ctx = ctx();
        repeat_ctx.repeat = true;
        let short = list_overview(&blocks[0], &src, &repeat_ctx).unwrap();

        assert!(short.main.unwrap().len() < full.main.unwrap().len());
    }
}
