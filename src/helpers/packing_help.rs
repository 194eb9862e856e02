//! Filepath: src/helpers/packing_help.rs
//! Unpacking advice, both directions: celebrate unpacking where it
//! is used, and spot the tell-tale pattern of a missed opportunity
//! (one source indexed with several different constants).

use indexmap::IndexMap;
use std::collections::BTreeSet;

use crate::analysis::blocks::BlockSpec;
use crate::analysis::grammar::grammar;
use crate::analysis::messages::MessageLevels;
use crate::analysis::registry::{HelperCtx, HelperSpec, Registry};
use crate::analysis::tree::{PySource, descendants_of_kind};
use crate::helpers::shared::unpacking_msg;
use crate::infra::utils::{Md, NiceLists};

const UNPACKING_QUERY: &str =
    "(assignment left: (pattern_list)) @a\n(assignment left: (tuple_pattern)) @a";

pub fn register(reg: &mut Registry) {
    reg.register(HelperSpec::IndivBlock {
        name: "unpacking",
        comment: "Identify name unpacking e.g. x, y = coord",
        query: Some(UNPACKING_QUERY),
        warning: false,
        run: unpacking,
    });
    reg.register(HelperSpec::MultiBlock {
        name: "unpacking_opportunity",
        comment: "Look for repeated indexing that unpacking would replace",
        warning: false,
        run: unpacking_opportunity,
    });
}

fn unpacking(block: &BlockSpec, src: &PySource, ctx: &HelperCtx) -> Option<MessageLevels> {
    let mut summaries = Vec::new();

    for assign in descendants_of_kind(block.element, &["assignment"]) {
        let Some(left) = assign.child_by_field_name("left") else {
            continue;
        };
        if !matches!(left.kind(), "pattern_list" | "tuple_pattern") {
            continue;
        }

        let names: Vec<String> = (0..left.named_child_count())
            .filter_map(|i| left.named_child(i))
            .filter(|child| child.kind() == "identifier")
            .map(|child| child.utf8_text(src.bytes()).unwrap_or("").to_string())
            .collect();
        if names.is_empty() {
            continue;
        }
        summaries.push(format!(
            "Your code uses unpacking to assign names {}.",
            NiceLists::str_list(&names, "`")
        ));
    }
    if summaries.is_empty() {
        return None;
    }

    let title = Md::h3("Name unpacking");
    let mut summary = String::new();
    for line in &summaries {
        summary += &Md::para(line);
    }

    let extra = if ctx.repeat {
        String::new()
    } else {
        unpacking_msg()
    };

    Some(MessageLevels::new(
        title.clone() + &summary,
        title + &summary,
        extra,
    ))
}

fn unpacking_opportunity(
    blocks: &[BlockSpec],
    src: &PySource,
    ctx: &HelperCtx,
) -> Option<MessageLevels> {
    let g = grammar();

    // Which sources get sliced, and with which constant indexes?
    let mut source_slices: IndexMap<String, BTreeSet<i64>> = IndexMap::new();
    for block in blocks {
        for assign in descendants_of_kind(block.element, &["assignment"]) {
            let Some(right) = assign.child_by_field_name("right") else {
                continue;
            };
            if right.kind() != "subscript" {
                continue;
            }
            let Some(value) = right.child_by_field_name("value") else {
                continue;
            };
            if value.kind() != "identifier" {
                continue;
            }
            let Some(index) = g.subscript_index(right, src.bytes()) else {
                continue;
            };
            let source = value.utf8_text(src.bytes()).unwrap_or("").to_string();
            source_slices.entry(source).or_default().insert(index);
        }
    }

    let candidates: Vec<String> = source_slices
        .into_iter()
        .filter(|(_, indexes)| indexes.len() > 1)
        .map(|(source, _)| source)
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let title = Md::h3("Unpacking opportunity");
    let summary = if candidates.len() > 1 {
        Md::para(&format!(
            "{} have multiple items extracted by indexing so might be \
             suitable candidates for unpacking.",
            NiceLists::str_list(&candidates, "`")
        ))
    } else {
        Md::para(&format!(
            "Name (variable) `{}` has multiple items extracted by indexing \
             so might be a suitable candidate for unpacking.",
            candidates[0]
        ))
    };

    let extra = if ctx.repeat {
        String::new()
    } else {
        unpacking_msg()
    };

    Some(MessageLevels::new(
        title.clone() + &summary,
        title + &summary + &extra,
        extra,
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
    fn unpacking_is_celebrated() {
        let src = PySource::parse("x, y = coord\n").unwrap();
        let blocks = block_specs(&src);

        let msg = unpacking(&blocks[0], &src, &ctx()).unwrap();
        assert!(msg.brief.contains("`x` and `y`"));
    }

    #[test]
    fn repeated_indexing_names_the_source() {
        let code = "coord = (1, 2, 3)\nx = coord[0]\ny = coord[1]\n";
        let src = PySource::parse(code).unwrap();
        let blocks = block_specs(&src);
        assert_eq!(blocks.len(), 3);

        let msg = unpacking_opportunity(&blocks, &src, &ctx()).unwrap();
        assert!(msg.brief.contains("`coord`"));
    }

    #[test]
    fn single_index_is_not_an_opportunity() {
        let code = "coord = (1, 2)\nx = coord[0]\n";
        let src = PySource::parse(code).unwrap();
        let blocks = block_specs(&src);
        assert!(unpacking_opportunity(&blocks, &src, &ctx()).is_none());
    }

    #[test]
    fn same_index_twice_is_not_an_opportunity() {
        let code = "x = coord[0]\ny = coord[0]\n";
        let src = PySource::parse(code).unwrap();
        let blocks = block_specs(&src);
        assert!(unpacking_opportunity(&blocks, &src, &ctx()).is_none());
    }
}
