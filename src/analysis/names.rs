//! Filepath: src/analysis/names.rs
//! Name-binding resolution: given any node, recover the assignment
//! target(s) of the nearest enclosing assignment. Failure paths are
//! structural (`None` entries), never exceptional - advisors decide
//! what an unresolvable target means for them.

use tree_sitter::Node;

use crate::analysis::grammar::grammar;
use crate::analysis::tree::ancestor_or_self;

/// The shape of an assignment target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignedName {
    /// `x = ...`
    Std { name: String },

    /// `obj.attr = ...`
    ObjAttr { obj: String, attr: String },

    /// `d['k'] = ...` / `d[0] = ...`
    DictKey {
        mapping: String,
        key: String,
        quoted: bool,
    },
}

/// An assignment target plus its position when it came from a
/// tuple-unpacking target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameBinding {
    pub name: AssignedName,
    pub unpack_idx: Option<usize>,
}

impl NameBinding {
    /// Render the name the way it appears in source: `x`, `o.a`,
    /// `d['k']`, `d[0]`.
    pub fn name_str(&self) -> String {
        match &self.name {
            AssignedName::Std { name } => name.clone(),
            AssignedName::ObjAttr { obj, attr } => format!("{obj}.{attr}"),
            AssignedName::DictKey {
                mapping,
                key,
                quoted,
            } => {
                let quote = if *quoted { "'" } else { "" };
                format!("{mapping}[{quote}{key}{quote}]")
            }
        }
    }
}

/// Resolve the assignment targets for the nearest enclosing
/// assignment of `node`. One entry per target name; a single `None`
/// entry when the target shape is unsupported (starred elements,
/// nested destructuring, chained assignment) or when no assignment
/// encloses the node.
pub fn assigned_names(node: Node, bytes: &[u8]) -> Vec<Option<NameBinding>> {
    let Some(assign) = ancestor_or_self(node, "assignment") else {
        return vec![None];
    };
    let Some(left) = assign.child_by_field_name("left") else {
        return vec![None];
    };

    match left.kind() {
        "pattern_list" | "tuple_pattern" => {
            let mut bindings = Vec::with_capacity(left.named_child_count());
            for idx in 0..left.named_child_count() {
                let Some(item) = left.named_child(idx) else {
                    return vec![None];
                };
                match single_target(item, bytes) {
                    Some(name) => bindings.push(Some(NameBinding {
                        name,
                        unpack_idx: Some(idx),
                    })),
                    // A starred or nested element poisons the whole
                    // resolution - give up structurally.
                    None => return vec![None],
                }
            }
            bindings
        }
        _ => match single_target(left, bytes) {
            Some(name) => vec![Some(NameBinding {
                name,
                unpack_idx: None,
            })],
            None => vec![None],
        },
    }
}

/// Resolve the single binding of `node`'s nearest assignment,
/// or `None` when there is anything other than exactly one.
pub fn assigned_name(node: Node, bytes: &[u8]) -> Option<NameBinding> {
    let mut names = assigned_names(node, bytes);
    if names.len() == 1 { names.pop()? } else { None }
}

/// One non-tuple target resolved to its shape, or `None` for
/// unsupported shapes.
fn single_target(target: Node, bytes: &[u8]) -> Option<AssignedName> {
    match target.kind() {
        "identifier" => Some(AssignedName::Std {
            name: target.utf8_text(bytes).ok()?.to_string(),
        }),
        "attribute" => {
            let obj = target.child_by_field_name("object")?;
            if obj.kind() != "identifier" {
                return None;
            }
            let attr = target.child_by_field_name("attribute")?;
            Some(AssignedName::ObjAttr {
                obj: obj.utf8_text(bytes).ok()?.to_string(),
                attr: attr.utf8_text(bytes).ok()?.to_string(),
            })
        }
        "subscript" => {
            let value = target.child_by_field_name("value")?;
            if value.kind() != "identifier" {
                return None;
            }
            let (key, quoted) = grammar().dict_key(target, bytes)?;
            Some(AssignedName::DictKey {
                mapping: value.utf8_text(bytes).ok()?.to_string(),
                key,
                quoted,
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tree::{PySource, descendants_of_kind};

    fn bindings_for(code: &str) -> Vec<Option<NameBinding>> {
        let src = PySource::parse(code).unwrap();
        let assign = descendants_of_kind(src.root(), &["assignment"])
            .into_iter()
            .next()
            .unwrap();
        assigned_names(assign, src.bytes())
    }

    #[test]
    fn simple_name() {
        let names = bindings_for("pet = 'cat'\n");
        assert_eq!(names.len(), 1);
        let binding = names[0].as_ref().unwrap();
        assert_eq!(binding.name_str(), "pet");
        assert_eq!(binding.unpack_idx, None);
    }

    #[test]
    fn object_attribute() {
        let names = bindings_for("conf.debug = True\n");
        assert_eq!(names[0].as_ref().unwrap().name_str(), "conf.debug");
    }

    #[test]
    fn dict_key_string_and_int() {
        let quoted = bindings_for("scores['alice'] = 1\n");
        assert_eq!(quoted[0].as_ref().unwrap().name_str(), "scores['alice']");

        let unquoted = bindings_for("scores[0] = 1\n");
        assert_eq!(unquoted[0].as_ref().unwrap().name_str(), "scores[0]");
    }

    #[test]
    fn tuple_unpacking_carries_indexes() {
        let names = bindings_for("x, y = coord\n");
        assert_eq!(names.len(), 2);
        assert_eq!(names[0].as_ref().unwrap().name_str(), "x");
        assert_eq!(names[0].as_ref().unwrap().unpack_idx, Some(0));
        assert_eq!(names[1].as_ref().unwrap().unpack_idx, Some(1));
    }

    #[test]
    fn starred_target_resolves_to_none_without_crashing() {
        let names = bindings_for("first, *rest = items\n");
        assert_eq!(names, vec![None]);
    }

    #[test]
    fn resolution_climbs_from_value_to_assignment() {
        let src = PySource::parse("total = len(items)\n").unwrap();
        let call = descendants_of_kind(src.root(), &["call"])
            .into_iter()
            .next()
            .unwrap();
        let binding = assigned_name(call, src.bytes()).unwrap();
        assert_eq!(binding.name_str(), "total");
    }
}
