//! Filepath: src/helpers/loop_help.rs
//! Detect manual counter handling around for loops: a counter
//! initialised to 0, 1, or -1 before the loop and incremented by
//! one inside it is exactly what `enumerate()` exists for. Needs
//! the init and the increment to agree on a name, so it examines
//! all blocks together.

use std::collections::BTreeSet;

use tree_sitter::Node;

use crate::analysis::blocks::BlockSpec;
use crate::analysis::grammar::grammar;
use crate::analysis::messages::MessageLevels;
use crate::analysis::registry::{HelperCtx, HelperSpec, Registry};
use crate::analysis::tree::{PySource, descendants_of_kind};
use crate::infra::utils::Md;

pub fn register(reg: &mut Registry) {
    reg.register(HelperSpec::MultiBlock {
        name: "manual_incrementing",
        comment: "Look for manual counter incrementing inside for loops",
        warning: false,
        run: manual_incrementing,
    });
}

/// Counter names initialised to 0, 1, or -1 by statements preceding
/// the for loop at its own level.
fn init_vars(for_node: Node, bytes: &[u8]) -> BTreeSet<String> {
    let g = grammar();
    let mut names = BTreeSet::new();

    let mut sibling = for_node.prev_named_sibling();
    while let Some(sib) = sibling {
        for assign in descendants_of_kind(sib, &["assignment"]) {
            let Some(right) = assign.child_by_field_name("right") else {
                continue;
            };
            let Some(repr) = g.num_repr(right, bytes) else {
                continue;
            };
            if !matches!(repr.as_str(), "0" | "1" | "-1") {
                continue;
            }
            let Some(left) = assign.child_by_field_name("left") else {
                continue;
            };
            if left.kind() == "identifier"
                && let Ok(name) = left.utf8_text(bytes)
            {
                names.insert(name.to_string());
            }
        }
        sibling = sib.prev_named_sibling();
    }
    names
}

/// Counter names incremented by one anywhere inside the loop body.
fn incrementing_vars(for_node: Node, bytes: &[u8]) -> BTreeSet<String> {
    let g = grammar();
    let Some(body) = for_node.child_by_field_name("body") else {
        return BTreeSet::new();
    };

    let mut names = BTreeSet::new();
    for node in descendants_of_kind(body, &["augmented_assignment", "assignment"]) {
        if let Some(name) = g
            .plus_equalled_target(node, bytes)
            .or_else(|| g.equal_plussed_target(node, bytes))
        {
            names.insert(name);
        }
    }
    names
}

/// First counter that is both initialised before the loop and
/// incremented inside it.
fn manual_incrementing_var(for_node: Node, bytes: &[u8]) -> Option<String> {
    let init = init_vars(for_node, bytes);
    if init.is_empty() {
        return None;
    }
    let incrementing = incrementing_vars(for_node, bytes);
    init.intersection(&incrementing).next().cloned()
}

fn manual_incrementing(
    blocks: &[BlockSpec],
    src: &PySource,
    ctx: &HelperCtx,
) -> Option<MessageLevels> {
    let counter = blocks
        .iter()
        .flat_map(|block| descendants_of_kind(block.element, &["for_statement"]))
        .find_map(|for_node| manual_incrementing_var(for_node, src.bytes()))?;

    let summary = Md::h3("Possible option of using `enumerate()`")
        + &Md::para(&format!(
            "It looks like your code is manually incrementing `{counter}`. \
             In Python you can use the `enumerate` function to handle this \
             for you."
        ));

    let demo = if ctx.repeat {
        String::new()
    } else {
        Md::para("Here is an example of the manual approach:")
            + &Md::code_block(
                "n = 1\n\
                 for image in images:\n\
                 \x20   if n % 10 == 0:\n\
                 \x20       print(f\"Just processed image {n}\")\n\
                 \x20   process_image(image)\n\
                 \x20   n += 1",
            )
            + &Md::para("Here is how we can use `enumerate()` instead:")
            + &Md::code_block(
                "for n, image in enumerate(images, 1):\n\
                 \x20   if n % 10 == 0:\n\
                 \x20       print(f\"Just processed image {n}\")\n\
                 \x20   process_image(image)",
            )
            + &Md::para(
                "Often you want counting from 0, in which case you don't \
                 need to specify the start value (0 is the default). You can \
                 give the enumerated value any name that makes sense, but \
                 reserve `i` for counting from 0 and prefer `n` when \
                 starting at 1.",
            )
    };

    Some(MessageLevels::with_main(
        summary.clone(),
        summary + &demo,
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
    fn detects_init_plus_augmented_increment() {
        let code = "n = 1\nfor image in images:\n    if n % 10 == 0: print(n)\n    n += 1\n";
        let src = PySource::parse(code).unwrap();
        let blocks = block_specs(&src);

        let msg = manual_incrementing(&blocks, &src, &ctx()).unwrap();
        assert!(msg.brief.contains("`n`"));
        assert!(msg.brief.contains("enumerate"));
    }

    #[test]
    fn detects_long_form_increment() {
        let code = "count = 0\nfor item in items:\n    count = count + 1\n";
        let src = PySource::parse(code).unwrap();
        let blocks = block_specs(&src);

        let msg = manual_incrementing(&blocks, &src, &ctx()).unwrap();
        assert!(msg.brief.contains("`count`"));
    }

    #[test]
    fn no_init_means_no_message() {
        let code = "for item in items:\n    n += 1\n";
        let src = PySource::parse(code).unwrap();
        let blocks = block_specs(&src);
        assert!(manual_incrementing(&blocks, &src, &ctx()).is_none());
    }

    #[test]
    fn init_without_increment_means_no_message() {
        let code = "n = 0\nfor item in items:\n    total = item\n";
        let src = PySource::parse(code).unwrap();
        let blocks = block_specs(&src);
        assert!(manual_incrementing(&blocks, &src, &ctx()).is_none());
    }

    #[test]
    fn unrelated_names_do_not_pair_up() {
        let code = "n = 0\nfor item in items:\n    m += 1\n";
        let src = PySource::parse(code).unwrap();
        let blocks = block_specs(&src);
        assert!(manual_incrementing(&blocks, &src, &ctx()).is_none());
    }
}
