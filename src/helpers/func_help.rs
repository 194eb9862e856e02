//! Filepath: src/helpers/func_help.rs
//! Covers functions and methods: a general overview (arguments,
//! exits), plus warnings for excessive length, excessive parameter
//! counts, mutable default arguments, risky positional booleans and
//! numbers, and missing or skimpy docstrings.

use tree_sitter::Node;

use crate::analysis::blocks::BlockSpec;
use crate::analysis::grammar::grammar;
use crate::analysis::lines::el_line_span;
use crate::analysis::messages::MessageLevels;
use crate::analysis::registry::{HelperCtx, HelperSpec, Registry};
use crate::analysis::tree::{PySource, descendants_of_kind};
use crate::infra::utils::{Md, NiceLists, NiceNumbers};

const FUNC_QUERY: &str = "(function_definition) @f";

/// Functions longer than this (non-empty lines) attract a warning.
const MAX_FUNC_LOC: usize = 35;

/// Functions with more parameters than this attract a warning.
const MAX_FUNC_ARGS: usize = 6;

/// Minimum docstring lines for a zero-parameter function.
const MIN_DOCSTRING_LINES: usize = 3;

pub fn register(reg: &mut Registry) {
    reg.register(HelperSpec::IndivBlock {
        name: "func_overview",
        comment: "Advise on function and method definitions",
        query: Some(FUNC_QUERY),
        warning: false,
        run: func_overview,
    });
    reg.register(HelperSpec::IndivBlock {
        name: "func_len_check",
        comment: "Warn about functions that might be too long",
        query: Some(FUNC_QUERY),
        warning: true,
        run: func_len_check,
    });
    reg.register(HelperSpec::IndivBlock {
        name: "func_excess_parameters",
        comment: "Warn about functions with many parameters",
        query: Some(FUNC_QUERY),
        warning: true,
        run: func_excess_parameters,
    });
    reg.register(HelperSpec::IndivBlock {
        name: "mutable_default",
        comment: "Warn about mutable default argument values",
        query: Some(FUNC_QUERY),
        warning: true,
        run: mutable_default,
    });
    reg.register(HelperSpec::IndivBlock {
        name: "positional_boolean",
        comment: "Warn about boolean or numeric parameters not forced to keywords",
        query: Some(FUNC_QUERY),
        warning: true,
        run: positional_boolean,
    });
    reg.register(HelperSpec::IndivBlock {
        name: "docstring_issues",
        comment: "Check function docstrings exist and cover the parameters",
        query: Some(FUNC_QUERY),
        warning: true,
        run: docstring_issues,
    });
}

/// One declared parameter with everything the checks need.
#[derive(Debug)]
struct ParamSlot<'t> {
    name: String,
    default: Option<Node<'t>>,
    kw_only: bool,
}

/// Parameters of one function, classified.
#[derive(Debug, Default)]
struct FuncParams<'t> {
    slots: Vec<ParamSlot<'t>>,
    vararg: Option<String>,
    kwarg: Option<String>,
}

impl FuncParams<'_> {
    /// Declared parameter count, packed args excluded.
    fn n_args(&self) -> usize {
        self.slots.len()
    }

    fn has_packing(&self) -> bool {
        self.vararg.is_some() || self.kwarg.is_some()
    }
}

/// Classify the parameters of a function definition. Positional /
/// keyword-only status follows the separators (`/`, `*`, `*args`).
fn func_params<'t>(func: Node<'t>, bytes: &[u8]) -> FuncParams<'t> {
    let mut params = FuncParams::default();
    let Some(parameters) = func.child_by_field_name("parameters") else {
        return params;
    };

    let mut kw_only = false;
    for i in 0..parameters.named_child_count() {
        let Some(child) = parameters.named_child(i) else {
            continue;
        };
        match child.kind() {
            "identifier" => params.slots.push(ParamSlot {
                name: child.utf8_text(bytes).unwrap_or("").to_string(),
                default: None,
                kw_only,
            }),
            "typed_parameter" => {
                if let Some(name_node) = child.named_child(0)
                    && name_node.kind() == "identifier"
                {
                    params.slots.push(ParamSlot {
                        name: name_node.utf8_text(bytes).unwrap_or("").to_string(),
                        default: None,
                        kw_only,
                    });
                }
            }
            "default_parameter" | "typed_default_parameter" => {
                let name = child
                    .child_by_field_name("name")
                    .map(|n| n.utf8_text(bytes).unwrap_or("").to_string())
                    .unwrap_or_default();
                params.slots.push(ParamSlot {
                    name,
                    default: child.child_by_field_name("value"),
                    kw_only,
                });
            }
            "list_splat_pattern" => {
                params.vararg = child
                    .named_child(0)
                    .map(|n| n.utf8_text(bytes).unwrap_or("").to_string());
                kw_only = true;
            }
            "dictionary_splat_pattern" => {
                params.kwarg = child
                    .named_child(0)
                    .map(|n| n.utf8_text(bytes).unwrap_or("").to_string());
            }
            "keyword_separator" => kw_only = true,
            // positional_separator and anything exotic change
            // nothing the checks below care about
            _ => {}
        }
    }
    params
}

/// Is this function a direct member of a class body?
fn is_method(func: Node) -> bool {
    let Some(body) = func.parent() else {
        return false;
    };
    matches!(body.parent(), Some(p) if p.kind() == "class_definition")
}

fn func_type_lbl(func: Node) -> &'static str {
    if is_method(func) { "method" } else { "function" }
}

/// "function" unless every definition in scope is a method.
fn overall_type_lbl(funcs: &[Node]) -> &'static str {
    if !funcs.is_empty() && funcs.iter().all(|f| is_method(*f)) {
        "method"
    } else {
        "function"
    }
}

fn func_name(func: Node, bytes: &[u8]) -> String {
    func.child_by_field_name("name")
        .map(|n| n.utf8_text(bytes).unwrap_or("").to_string())
        .unwrap_or_else(|| "anonymous".to_string())
}

/// How the function receives arguments, as a sentence fragment
/// without the trailing full stop.
fn arg_comment(params: &FuncParams, repeat: bool) -> String {
    if params.has_packing() {
        let mut comment = "receives a variable number of arguments".to_string();
        if !repeat {
            if let Some(vararg) = &params.vararg {
                comment += &format!(
                    ". All positional arguments received are packed together \
                     into a list called `{vararg}` using the *{vararg} syntax"
                );
            }
            if let Some(kwarg) = &params.kwarg {
                comment += &format!(
                    ". All keyword arguments received are packed together \
                     into a dictionary called `{kwarg}` using the **{kwarg} \
                     syntax"
                );
            }
        }
        return comment;
    }

    let n = params.n_args();
    if n == 0 {
        "doesn't take any arguments".to_string()
    } else {
        format!(
            "receives {} argument{}",
            NiceNumbers::int2nice(n),
            NiceNumbers::plural_s(n)
        )
    }
}

/// How the function exits, as a sentence fragment without the
/// trailing full stop.
fn exit_comment(func: Node, type_lbl: &str, repeat: bool) -> String {
    let returns = descendants_of_kind(func, &["return_statement"]);
    let yields = descendants_of_kind(func, &["yield"]);

    if !yields.is_empty() {
        return if returns.is_empty() {
            "It is a generator function".to_string()
        } else {
            "It has both `return` and `yield`. That probably doesn't make \
             any sense"
                .to_string()
        };
    }

    if returns.is_empty() {
        let mut comment = format!("The {type_lbl} does not explicitly return anything");
        if !repeat {
            comment += ". In which case, in Python, it implicitly returns `None`";
        }
        return comment;
    }

    let n = returns.len();
    let mut comment = format!(
        "The {type_lbl} exits via an explicit `return` statement {} time{}",
        NiceNumbers::int2nice(n),
        NiceNumbers::plural_s(n)
    );
    if n > 1 && !repeat {
        comment += ". Some people prefer a single exit point for clarity; \
                    others use early returns to short-circuit validation. \
                    Whatever approach you take, make sure it is easy to \
                    reason about what is returned and where";
    }
    comment
}

fn func_overview(block: &BlockSpec, src: &PySource, ctx: &HelperCtx) -> Option<MessageLevels> {
    let funcs = descendants_of_kind(block.element, &["function_definition"]);
    if funcs.is_empty() {
        return None;
    }
    let overall_lbl = overall_type_lbl(&funcs);

    let title = Md::h3(&format!("{} Details", Md::capitalize_first(overall_lbl)));
    let mut details = String::new();
    for func in &funcs {
        let type_lbl = func_type_lbl(*func);
        let name = func_name(*func, src.bytes());
        let params = func_params(*func, src.bytes());
        details += &Md::para(&format!(
            "The {type_lbl} named `{name}` {}. {}.",
            arg_comment(&params, ctx.repeat),
            exit_comment(*func, type_lbl, ctx.repeat),
        ));
    }

    let (args_vs_params, methods_note) = if ctx.repeat {
        (String::new(), String::new())
    } else {
        let args_vs_params = Md::para(&format!(
            "There is often confusion about the difference between arguments \
             and parameters. {}s define parameters but receive arguments. \
             You can think of parameters as being like car parks and \
             arguments as the cars that fill them.",
            Md::capitalize_first(overall_lbl)
        ));
        let methods_note = if funcs.iter().any(|f| is_method(*f)) {
            Md::para(
                "Methods are functions that sit directly inside a class \
                 definition. Unless defined as static methods they take the \
                 instance as the first parameter - almost always named \
                 `self`. But they are basically functions.",
            )
        } else {
            String::new()
        };
        (args_vs_params, methods_note)
    };

    Some(MessageLevels::new(
        title.clone() + &details,
        title + &details + &methods_note,
        args_vs_params,
    ))
}

fn func_len_check(block: &BlockSpec, src: &PySource, ctx: &HelperCtx) -> Option<MessageLevels> {
    let funcs = descendants_of_kind(block.element, &["function_definition"]);
    if funcs.is_empty() {
        return None;
    }
    let overall_lbl = overall_type_lbl(&funcs);
    let block_lines: Vec<&str> = block.block_code.split('\n').collect();

    let mut long_funcs: Vec<(String, usize)> = Vec::new();
    for func in &funcs {
        let name = func_name(*func, src.bytes());

        // Exact extent only - trailing blank lines are not "length".
        let span = el_line_span(*func, true);
        let start = span.first.saturating_sub(block.first_line);
        let end = (span.last + 1 - block.first_line).min(block_lines.len());
        let code_lines = block_lines[start..end]
            .iter()
            .filter(|line| !line.trim().is_empty())
            .count();

        if code_lines > MAX_FUNC_LOC {
            long_funcs.push((name, code_lines));
        }
    }
    if long_funcs.is_empty() {
        return None;
    }

    let title = Md::h3(&format!(
        "{} possibly too long",
        Md::capitalize_first(overall_lbl)
    ));
    let mut summary = String::new();
    for (name, n_lines) in &long_funcs {
        summary += &Md::para(&format!(
            "`{name}` has {} lines of code (including comments but with \
             empty lines ignored).",
            NiceNumbers::int2nice(*n_lines)
        ));
    }
    let advice = if ctx.repeat {
        String::new()
    } else {
        Md::para(&format!(
            "Sometimes it is OK for a {overall_lbl} to be that long but you \
             should consider refactoring the code into smaller units."
        ))
    };

    Some(MessageLevels::brief(title + &summary + &advice))
}

fn func_excess_parameters(
    block: &BlockSpec,
    src: &PySource,
    ctx: &HelperCtx,
) -> Option<MessageLevels> {
    let funcs = descendants_of_kind(block.element, &["function_definition"]);
    if funcs.is_empty() {
        return None;
    }
    let overall_lbl = overall_type_lbl(&funcs);

    let mut excess: Vec<(String, usize)> = Vec::new();
    for func in &funcs {
        let n_args = func_params(*func, src.bytes()).n_args();
        if n_args > MAX_FUNC_ARGS {
            excess.push((func_name(*func, src.bytes()), n_args));
        }
    }
    if excess.is_empty() {
        return None;
    }

    let title = Md::h3(&format!("Possibly too many {overall_lbl} parameters"));
    let mut summary = String::new();
    for (name, n_args) in &excess {
        summary += &Md::para(&format!("`{name}` has {n_args} parameters."));
    }
    if !ctx.repeat {
        summary += &Md::para(&format!(
            "Sometimes it is OK for a {overall_lbl} to have that many but \
             you should consider refactoring, or collecting related \
             parameters into a single parameter (e.g. one dictionary of \
             image size details instead of separate width and height \
             arguments)."
        ));
    }

    Some(MessageLevels::brief(title + &summary))
}

fn mutable_default(block: &BlockSpec, src: &PySource, ctx: &HelperCtx) -> Option<MessageLevels> {
    let funcs = descendants_of_kind(block.element, &["function_definition"]);
    if funcs.is_empty() {
        return None;
    }
    let overall_lbl = overall_type_lbl(&funcs);

    // (function name, [(param, rendered default)]) per offender.
    let mut offenders: Vec<(String, Vec<(String, String)>)> = Vec::new();
    for func in &funcs {
        let params = func_params(*func, src.bytes());
        let mutable_args: Vec<(String, String)> = params
            .slots
            .iter()
            .filter_map(|slot| {
                let default = slot.default?;
                if matches!(default.kind(), "list" | "dictionary" | "set") {
                    let rendered = default.utf8_text(src.bytes()).unwrap_or("").to_string();
                    Some((slot.name.clone(), rendered))
                } else {
                    None
                }
            })
            .collect();
        if !mutable_args.is_empty() {
            offenders.push((func_name(*func, src.bytes()), mutable_args));
        }
    }
    if offenders.is_empty() {
        return None;
    }

    let title = Md::h3(&format!(
        "{} has mutable default arguments",
        Md::capitalize_first(overall_lbl)
    ));
    let mut summary = String::new();
    for (name, mutable_args) in &offenders {
        summary += &Md::para(&format!(
            "`{name}` has the following parameters with mutable defaults: {}.",
            NiceLists::pairs(mutable_args, " defaults to ")
        ));
    }

    let explanation = if ctx.repeat {
        String::new()
    } else {
        Md::para(
            "Mutable default arguments are a well-known \"gotcha\" in \
             Python. The default is created once, when the function is \
             defined, so every call shares one and the same object - and \
             mutations survive from call to call. It is better to default \
             to `None` and set the desired mutable inside the function.",
        ) + &Md::code_block(
            "## BAD (people list persists across calls)\n\
             def communicate(person, msg, people=[]):\n\
             \x20   people.append(person)\n\
             \n\
             ## GOOD (no mutable defaults)\n\
             def communicate(person, msg, people=None):\n\
             \x20   if people is None:\n\
             \x20       people = []\n\
             \x20   people.append(person)",
        )
    };

    Some(MessageLevels::with_main(
        title.clone() + &summary,
        title + &summary + &explanation,
    ))
}

fn positional_boolean(block: &BlockSpec, src: &PySource, ctx: &HelperCtx) -> Option<MessageLevels> {
    let funcs = descendants_of_kind(block.element, &["function_definition"]);
    if funcs.is_empty() {
        return None;
    }
    let overall_lbl = overall_type_lbl(&funcs);

    let mut risky: Vec<(String, Vec<(String, String)>)> = Vec::new();
    for func in &funcs {
        let params = func_params(*func, src.bytes());
        let danger_args: Vec<(String, String)> = params
            .slots
            .iter()
            .filter(|slot| !slot.kw_only)
            .filter_map(|slot| {
                let default = slot.default?;
                if matches!(default.kind(), "true" | "false" | "integer" | "float") {
                    let rendered = default.utf8_text(src.bytes()).unwrap_or("").to_string();
                    Some((slot.name.clone(), rendered))
                } else {
                    None
                }
            })
            .collect();
        if !danger_args.is_empty() {
            risky.push((func_name(*func, src.bytes()), danger_args));
        }
    }
    if risky.is_empty() {
        return None;
    }

    let title = Md::h3(&format!(
        "{} expects risky positional arguments",
        Md::capitalize_first(overall_lbl)
    ));
    let mut summary = String::new();
    for (name, danger_args) in &risky {
        summary += &Md::para(&format!(
            "A partial analysis of `{name}` found the following risky \
             non-keyword (positional) parameters: {}.",
            NiceLists::pairs(danger_args, " defaulting to ")
        ));
    }

    let (demo, explained) = if ctx.repeat {
        (String::new(), String::new())
    } else {
        let demo = Md::para(
            "Parameters which expect numbers or booleans without requiring \
             keywords are risky: `greeting(formal=True)` is more \
             intelligible than `greeting(True)`, and intelligible code is \
             safer to maintain. Using an asterisk as a pseudo-parameter \
             forces everything to its right to be a keyword:",
        ) + &Md::code_block("def greeting(name, *, formal=False):\n    ...");
        let explained = Md::para(
            "The asterisk mops up any remaining positional arguments when \
             the function is called. There can't be any other positional \
             arguments afterwards, so only keyword arguments are allowed \
             from there on.",
        );
        (demo, explained)
    };

    Some(MessageLevels {
        brief: title.clone() + &summary + &demo,
        main: None,
        extra: if explained.is_empty() {
            None
        } else {
            Some(explained)
        },
    })
}

fn docstring_issues(block: &BlockSpec, src: &PySource, ctx: &HelperCtx) -> Option<MessageLevels> {
    let funcs = descendants_of_kind(block.element, &["function_definition"]);
    if funcs.is_empty() {
        return None;
    }

    enum Problem {
        Missing,
        TooShort,
    }

    let mut issues: Vec<(String, &'static str, Problem)> = Vec::new();
    for func in &funcs {
        let name = func_name(*func, src.bytes());
        let type_lbl = func_type_lbl(*func);
        let n_args = func_params(*func, src.bytes()).n_args();

        match grammar().docstring(*func, src.bytes()) {
            None => issues.push((name, type_lbl, Problem::Missing)),
            Some(doc) => {
                let n_doc_lines = doc.lines().count();
                if n_doc_lines < MIN_DOCSTRING_LINES + n_args {
                    issues.push((name, type_lbl, Problem::TooShort));
                }
            }
        }
    }
    if issues.is_empty() {
        return None;
    }

    let title = Md::h3("Function / method docstring issues");
    let example = Md::code_block(
        "def greet(name, greet_word='Hi'):\n\
         \x20   \"\"\"\n\
         \x20   Get a greeting for the supplied person.\n\
         \n\
         \x20   :param str name: person being greeted\n\
         \x20   :param str greet_word: the word to start the greeting\n\
         \x20   :return: a greeting message to the person\n\
         \x20   :rtype: str\n\
         \x20   \"\"\"\n\
         \x20   return f\"{greet_word} {name} - how are you?\"",
    );

    let mut summary = String::new();
    for (i, (name, type_lbl, problem)) in issues.iter().enumerate() {
        let first = i == 0;
        match problem {
            Problem::Missing => {
                summary += &Md::para(&format!(
                    "`{name}` lacks a docstring - you should probably add one. \
                     Note: `#` comments at the top of the {type_lbl} do not \
                     work as docstrings; Python completely ignores them."
                ));
                if first && !ctx.repeat {
                    summary += &Md::para(
                        "A proper docstring can be accessed by running \
                         `help(...)` on the function, which matters once it \
                         is used in bigger projects. Here is an example \
                         using one of several valid formats:",
                    );
                    summary += &example;
                }
            }
            Problem::TooShort => {
                summary += &Md::para(&format!(
                    "The docstring for `{name}` seems a little short given \
                     its parameters. You might want to rework it."
                ));
                if first && !ctx.repeat {
                    summary += &example;
                }
            }
        }
    }

    Some(MessageLevels::brief(title + &summary))
}
