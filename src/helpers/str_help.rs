//! Filepath: src/helpers/str_help.rs
//! Advice on strings assigned to names. When live evaluation is
//! allowed the real value feeds the demonstrations; otherwise the
//! literal read from the tree does.

use crate::analysis::blocks::BlockSpec;
use crate::analysis::exec::{self, ExecOutcome, RunValue};
use crate::analysis::grammar::grammar;
use crate::analysis::messages::MessageLevels;
use crate::analysis::names::assigned_name;
use crate::analysis::registry::{HelperCtx, HelperSpec, Registry};
use crate::analysis::tree::{PySource, PyValue};
use crate::infra::utils::{Md, NiceLists};

const ASSIGN_STR_QUERY: &str = "(assignment right: (string)) @a";

pub fn register(reg: &mut Registry) {
    reg.register(HelperSpec::IndivBlock {
        name: "assigned_str_overview",
        comment: "Overview of strings assigned to names",
        query: Some(ASSIGN_STR_QUERY),
        warning: false,
        run: assigned_str_overview,
    });
}

fn assigned_str_overview(
    block: &BlockSpec,
    src: &PySource,
    ctx: &HelperCtx,
) -> Option<MessageLevels> {
    let str_nodes = grammar().assigned_string_nodes(block.element);
    if str_nodes.is_empty() {
        return None;
    }

    // Resolve every assigned name; skip targets we cannot name.
    let mut names: Vec<String> = Vec::new();
    let mut first_value: Option<String> = None;

    for node in &str_nodes {
        let Some(binding) = assigned_name(*node, src.bytes()) else {
            continue;
        };
        let name_str = binding.name_str();

        if first_value.is_none() {
            first_value = resolve_str_value(block, src, ctx, &name_str, *node);
        }
        names.push(name_str);
    }
    if names.is_empty() {
        return None;
    }

    let title = Md::h4("String Overview");
    let summary = if names.len() > 1 {
        let mut sorted = names.clone();
        sorted.sort();
        Md::para(&format!(
            "{} are all strings.",
            NiceLists::str_list(&sorted, "`")
        ))
    } else {
        Md::para(&format!("`{}` is a string.", names[0]))
    };

    if ctx.repeat {
        return Some(MessageLevels::brief(title + &summary));
    }

    // Demonstrate with the user's own value when we have it.
    let (demo_name, demo_value) = match first_value {
        Some(value) => (names[0].clone(), value),
        None => ("address".to_string(), "Waiuku, New Zealand".to_string()),
    };

    let cool = Md::para("Python makes it easy to do lots of cool things with strings.");
    let demo = Md::para(&format!(
        "For illustration, imagine we have the string '{demo_value}' assigned \
         to `{demo_name}`:"
    )) + &Md::para(&format!(
        "`{demo_name}.upper()` returns '{}'; `len({demo_name})` returns {} \
         because that is how many characters are in the string (spaces \
         count too).",
        demo_value.to_uppercase(),
        demo_value.chars().count(),
    ));
    let methods_note = Md::para(
        "`.upper()`, `.center()` etc are abilities available with all Python \
         strings - technically, methods of string objects. To see the full \
         list enter `dir(str)` into a Python command line. `len()` is \
         different: a function that can be used on lots of things, not just \
         strings.",
    );

    Some(MessageLevels::new(
        title.clone() + &summary + &cool,
        title + &summary + &cool + &demo,
        methods_note,
    ))
}

/// The string bound to `name_str`: live value when allowed and
/// resolvable, literal text otherwise, `None` when neither works.
fn resolve_str_value(
    block: &BlockSpec,
    src: &PySource,
    ctx: &HelperCtx,
    name_str: &str,
    node: tree_sitter::Node,
) -> Option<String> {
    if ctx.execute_code
        && let ExecOutcome::Value(RunValue::Scalar(PyValue::Str(value))) =
            exec::resolve_value(&block.pre_block_code, &block.block_code, name_str)
    {
        return Some(value);
    }

    match grammar().literal(node, src.bytes()) {
        Some(PyValue::Str(value)) => Some(value),
        _ => None,
    }
}
