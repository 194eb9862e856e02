//! Filepath: src/analysis/grammar.rs
//! Grammar compatibility shim. Node-kind spellings drift across
//! grammar versions (function bodies have been "block" in some and
//! "suite" in others), so every version-sensitive accessor lives
//! behind named methods here and the rest of the crate stays
//! grammar-oblivious. The shim is resolved exactly once per process
//! by probing the linked grammar with a tiny parse - no per-call
//! dispatch afterwards.

use std::sync::OnceLock;

use tree_sitter::{Language, Node, Parser};

use crate::analysis::tree::{PyValue, descendants_of_kind};

/// Resolved grammar facts plus the accessors built on them.
pub struct Grammar {
    /// Kind of a function/class body node ("block" or "suite")
    pub body_kind: &'static str,
}

static GRAMMAR: OnceLock<Grammar> = OnceLock::new();

/// The process-wide grammar shim, resolved on first use.
pub fn grammar() -> &'static Grammar {
    GRAMMAR.get_or_init(Grammar::probe)
}

impl Grammar {
    /// Parse a tiny function and read off the spelling the linked
    /// grammar uses for suite/body nodes.
    fn probe() -> Self {
        let language: Language = tree_sitter_python::LANGUAGE.into();
        let mut parser = Parser::new();

        let body_kind = parser
            .set_language(&language)
            .ok()
            .and_then(|()| parser.parse("def f():\n    pass\n", None))
            .and_then(|tree| {
                let root = tree.root_node();
                let func = root.named_child(0)?;
                let body = func.child_by_field_name("body")?;
                match body.kind() {
                    "suite" => Some("suite"),
                    _ => Some("block"),
                }
            })
            .unwrap_or("block");

        Self { body_kind }
    }

    /// Decode a literal constant node into a typed value. Returns
    /// `None` for nodes that are not literal constants; returns
    /// `Some(PyValue::Unknown)` for literal nodes whose value cannot
    /// be statically determined (f-strings, oversized integers).
    pub fn literal(&self, node: Node, bytes: &[u8]) -> Option<PyValue> {
        let text = node.utf8_text(bytes).unwrap_or("");

        match node.kind() {
            "integer" => Some(parse_int(text)),
            "float" => Some(
                text.replace('_', "")
                    .parse::<f64>()
                    .map(PyValue::Float)
                    .unwrap_or(PyValue::Unknown),
            ),
            "true" => Some(PyValue::Bool(true)),
            "false" => Some(PyValue::Bool(false)),
            "none" => Some(PyValue::None),
            "string" => {
                // Interpolated strings have no static value.
                if !descendants_of_kind(node, &["interpolation"]).is_empty() {
                    return Some(PyValue::Unknown);
                }
                Some(PyValue::Str(unquote_python_string(text)))
            }
            "concatenated_string" => {
                // Adjacent literal concatenation: join the segments.
                let mut acc = String::new();
                for i in 0..node.named_child_count() {
                    let seg = node.named_child(i)?;
                    match self.literal(seg, bytes)? {
                        PyValue::Str(s) => acc.push_str(&s),
                        _ => return Some(PyValue::Unknown),
                    }
                }
                Some(PyValue::Str(acc))
            }
            "unary_operator" => {
                let op = node
                    .child_by_field_name("operator")
                    .map(|o| o.utf8_text(bytes).unwrap_or(""))?;
                let arg = node.child_by_field_name("argument")?;
                match (op, self.literal(arg, bytes)?) {
                    ("-", PyValue::Int(n)) => Some(PyValue::Int(-n)),
                    ("-", PyValue::Float(f)) => Some(PyValue::Float(-f)),
                    ("+", value @ (PyValue::Int(_) | PyValue::Float(_))) => Some(value),
                    _ => Some(PyValue::Unknown),
                }
            }
            _ => None,
        }
    }

    /// Source spelling of a number node (including a leading minus
    /// from a wrapping unary operator), or `None` for non-numbers.
    pub fn num_repr(&self, node: Node, bytes: &[u8]) -> Option<String> {
        match self.literal(node, bytes)? {
            PyValue::Int(n) => Some(n.to_string()),
            PyValue::Float(f) => Some(f.to_string()),
            _ => None,
        }
    }

    /// PEP 257 docstring of a function or class definition: the
    /// first statement of the body must be a string literal.
    pub fn docstring(&self, def_node: Node, bytes: &[u8]) -> Option<String> {
        let body = def_node.child_by_field_name("body")?;

        // The body node is usually the suite itself; some grammar
        // variants nest it one level down.
        let suite = if body.kind() == self.body_kind {
            body
        } else {
            let mut found = None;
            for i in 0..body.named_child_count() {
                let child = body.named_child(i)?;
                if child.kind() == self.body_kind {
                    found = Some(child);
                    break;
                }
            }
            found?
        };

        let first_stmt = suite.named_child(0)?;
        if first_stmt.kind() != "expression_statement" {
            return None;
        }

        let lit = first_stmt.named_child(0)?;
        match self.literal(lit, bytes)? {
            PyValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the called function when it is a plain identifier
    /// (`list(...)` yes, `np.array(...)` no).
    pub fn call_name<'a>(&self, call: Node, bytes: &'a [u8]) -> Option<&'a str> {
        let func = call.child_by_field_name("function")?;
        if func.kind() != "identifier" {
            return None;
        }
        func.utf8_text(bytes).ok()
    }

    /// Constant integer index of a subscript expression (`coord[0]`).
    pub fn subscript_index(&self, subscript: Node, bytes: &[u8]) -> Option<i64> {
        let index = subscript.child_by_field_name("subscript")?;
        match self.literal(index, bytes)? {
            PyValue::Int(n) => Some(n),
            _ => None,
        }
    }

    /// Constant key of a subscript used as an assignment target,
    /// with whether rendering it needs quoting (`d['k']` vs `d[0]`).
    pub fn dict_key(&self, subscript: Node, bytes: &[u8]) -> Option<(String, bool)> {
        let index = subscript.child_by_field_name("subscript")?;
        match self.literal(index, bytes)? {
            PyValue::Str(s) => Some((s, true)),
            PyValue::Int(n) => Some((n.to_string(), false)),
            PyValue::Float(f) => Some((f.to_string(), false)),
            _ => None,
        }
    }

    /// Target name of `x += 1`, or `None` for any other shape.
    pub fn plus_equalled_target(&self, node: Node, bytes: &[u8]) -> Option<String> {
        if node.kind() != "augmented_assignment" {
            return None;
        }
        let op = node.child_by_field_name("operator")?;
        if op.utf8_text(bytes).unwrap_or("") != "+=" {
            return None;
        }

        let right = node.child_by_field_name("right")?;
        if self.literal(right, bytes)? != PyValue::Int(1) {
            return None;
        }

        let left = node.child_by_field_name("left")?;
        if left.kind() != "identifier" {
            return None;
        }
        Some(left.utf8_text(bytes).ok()?.to_string())
    }

    /// Target name of `x = x + 1` (either operand order), or `None`.
    pub fn equal_plussed_target(&self, node: Node, bytes: &[u8]) -> Option<String> {
        if node.kind() != "assignment" {
            return None;
        }
        let left = node.child_by_field_name("left")?;
        if left.kind() != "identifier" {
            return None;
        }
        let target = left.utf8_text(bytes).ok()?;

        let right = node.child_by_field_name("right")?;
        if right.kind() != "binary_operator" {
            return None;
        }
        let op = right.child_by_field_name("operator")?;
        if op.utf8_text(bytes).unwrap_or("") != "+" {
            return None;
        }

        let lhs = right.child_by_field_name("left")?;
        let rhs = right.child_by_field_name("right")?;

        // x = x + 1 or x = 1 + x, nothing else.
        let matches_shape = |name_el: Node, one_el: Node| {
            name_el.kind() == "identifier"
                && name_el.utf8_text(bytes).ok() == Some(target)
                && self.literal(one_el, bytes) == Some(PyValue::Int(1))
        };

        if matches_shape(lhs, rhs) || matches_shape(rhs, lhs) {
            Some(target.to_string())
        } else {
            None
        }
    }

    /// String literal nodes assigned to names anywhere in a block
    /// (`greeting = 'Hi'`, including inside nested statements).
    pub fn assigned_string_nodes<'t>(&self, block: Node<'t>) -> Vec<Node<'t>> {
        descendants_of_kind(block, &["assignment"])
            .into_iter()
            .filter_map(|assign| {
                let right = assign.child_by_field_name("right")?;
                if right.kind() == "string" {
                    Some(right)
                } else {
                    None
                }
            })
            .collect()
    }
}

/// Parse an integer literal's source text, honoring base prefixes
/// and digit-group underscores. Out-of-range values degrade to the
/// explicit unknown sentinel rather than a wrong number.
fn parse_int(text: &str) -> PyValue {
    let cleaned = text.replace('_', "");
    let lower = cleaned.to_ascii_lowercase();

    let parsed = if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16)
    } else if let Some(oct) = lower.strip_prefix("0o") {
        i64::from_str_radix(oct, 8)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i64::from_str_radix(bin, 2)
    } else {
        cleaned.parse::<i64>()
    };

    parsed.map(PyValue::Int).unwrap_or(PyValue::Unknown)
}

/// Strip Python string prefixes/quotes and perform a light unescape
/// plus dedent for triple-quoted strings.
fn unquote_python_string(s: &str) -> String {
    // Trim leading/trailing whitespace around the literal.
    let ss = s.trim();

    // Compute prefix length (r, u, b, f, and combinations).
    let pref_len = leading_alpha_len(ss);
    let (prefix, rest) = ss.split_at(pref_len);

    // Raw strings skip unescaping.
    let is_raw = prefix.chars().any(|c| c == 'r' || c == 'R');

    // Handle triple quotes first.
    if rest.len() >= 6 {
        if rest.starts_with(r#"""""#) && rest.ends_with(r#"""""#) {
            let inner = &rest[3..rest.len() - 3];
            return dedent_and_unescape(inner, is_raw);
        }
        if rest.starts_with("'''") && rest.ends_with("'''") {
            let inner = &rest[3..rest.len() - 3];
            return dedent_and_unescape(inner, is_raw);
        }
    }

    // Handle single-quoted strings.
    if rest.len() >= 2
        && ((rest.starts_with('"') && rest.ends_with('"'))
            || (rest.starts_with('\'') && rest.ends_with('\'')))
    {
        let inner = &rest[1..rest.len() - 1];
        return basic_unescape(inner, is_raw);
    }

    // Fallback: return as-is.
    rest.to_string()
}

/// Return the count of leading ASCII alphabetic chars.
/// Used to slice off string literal prefixes.
fn leading_alpha_len(s: &str) -> usize {
    let mut i = 0;
    for ch in s.chars() {
        if ch.is_ascii_alphabetic() {
            i += ch.len_utf8();
        } else {
            break;
        }
    }
    i
}

/// Dedent triple-quoted content and unescape if not raw.
/// Also strips a single leading/trailing blank line.
fn dedent_and_unescape(s: &str, is_raw: bool) -> String {
    // Split into lines and drop symmetric blank edges.
    let mut lines: Vec<&str> = s.lines().collect();
    if !lines.is_empty() && lines[0].trim().is_empty() {
        lines.remove(0);
    }
    if !lines.is_empty() && lines[lines.len() - 1].trim().is_empty() {
        lines.pop();
    }

    // Compute common leading spaces across non-empty lines.
    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.chars().take_while(|c| *c == ' ').count())
        .min()
        .unwrap_or(0);

    // Dedent and join with newlines.
    let mut out = String::new();
    for l in &lines {
        if !out.is_empty() {
            out.push('\n');
        }
        if l.len() >= indent {
            out.push_str(&l[indent..]);
        } else {
            out.push_str(l);
        }
    }

    // Apply basic unescape only if not raw.
    if is_raw { out } else { basic_unescape(&out, false) }
}

/// Minimal unescape for common sequences when not raw.
/// Intended for docstrings and simple values, not general parsing.
fn basic_unescape(s: &str, is_raw: bool) -> String {
    if is_raw {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut it = s.chars();
    while let Some(c) = it.next() {
        if c == '\\' {
            if let Some(n) = it.next() {
                match n {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    '\\' => out.push('\\'),
                    '"' => out.push('"'),
                    '\'' => out.push('\''),
                    _ => {
                        out.push('\\');
                        out.push(n);
                    }
                }
            } else {
                out.push('\\');
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tree::PySource;

    fn first_of<'t>(src: &'t PySource, kind: &str) -> Node<'t> {
        descendants_of_kind(src.root(), &[kind])
            .into_iter()
            .next()
            .expect("node of kind")
    }

    #[test]
    fn int_and_digit_string_decode_to_distinct_values() {
        let src = PySource::parse("a = 1\nb = '1'\n").unwrap();
        let g = grammar();

        let int_node = first_of(&src, "integer");
        let str_node = first_of(&src, "string");

        assert_eq!(g.literal(int_node, src.bytes()), Some(PyValue::Int(1)));
        assert_eq!(
            g.literal(str_node, src.bytes()),
            Some(PyValue::Str("1".to_string()))
        );
    }

    #[test]
    fn negative_and_underscored_numbers_decode() {
        let src = PySource::parse("a = -1\nb = 1_000\nc = 1.23E-7\n").unwrap();
        let g = grammar();

        let neg = first_of(&src, "unary_operator");
        assert_eq!(g.literal(neg, src.bytes()), Some(PyValue::Int(-1)));

        let underscored = descendants_of_kind(src.root(), &["integer"])
            .into_iter()
            .find(|n| n.utf8_text(src.bytes()).unwrap_or("").contains('_'))
            .unwrap();
        assert_eq!(g.literal(underscored, src.bytes()), Some(PyValue::Int(1000)));

        let float_node = first_of(&src, "float");
        assert_eq!(g.literal(float_node, src.bytes()), Some(PyValue::Float(1.23e-7)));
    }

    #[test]
    fn fstring_value_is_unknown_not_text() {
        let src = PySource::parse("msg = f\"Hi {name}!\"\n").unwrap();
        let g = grammar();
        let node = first_of(&src, "string");
        assert_eq!(g.literal(node, src.bytes()), Some(PyValue::Unknown));
    }

    #[test]
    fn docstring_extraction_triple_quoted() {
        let code = "def f():\n    \"\"\"Say hi.\n\n    Longer text.\n    \"\"\"\n    return 1\n";
        let src = PySource::parse(code).unwrap();
        let g = grammar();
        let func = first_of(&src, "function_definition");

        let doc = g.docstring(func, src.bytes()).unwrap();
        assert!(doc.starts_with("Say hi."));
        assert!(doc.contains("Longer text."));
    }

    #[test]
    fn non_first_string_is_not_a_docstring() {
        let code = "def f():\n    x = 1\n    'not a docstring'\n    return x\n";
        let src = PySource::parse(code).unwrap();
        let g = grammar();
        let func = first_of(&src, "function_definition");
        assert!(g.docstring(func, src.bytes()).is_none());
    }

    #[test]
    fn increment_shapes_are_detected() {
        let src = PySource::parse("n += 1\nm = m + 1\nk = 1 + k\nj += 2\n").unwrap();
        let g = grammar();

        let aug = first_of(&src, "augmented_assignment");
        assert_eq!(g.plus_equalled_target(aug, src.bytes()), Some("n".to_string()));

        let assigns = descendants_of_kind(src.root(), &["assignment"]);
        let targets: Vec<_> = assigns
            .iter()
            .filter_map(|a| g.equal_plussed_target(*a, src.bytes()))
            .collect();
        assert_eq!(targets, vec!["m".to_string(), "k".to_string()]);

        // += 2 is not an increment-by-one.
        let augs = descendants_of_kind(src.root(), &["augmented_assignment"]);
        assert!(g.plus_equalled_target(augs[1], src.bytes()).is_none());
    }

    #[test]
    fn subscript_index_and_dict_key() {
        let src = PySource::parse("x = coord[0]\nd['k'] = 1\n").unwrap();
        let g = grammar();

        let subscripts = descendants_of_kind(src.root(), &["subscript"]);
        assert_eq!(g.subscript_index(subscripts[0], src.bytes()), Some(0));
        assert_eq!(
            g.dict_key(subscripts[1], src.bytes()),
            Some(("k".to_string(), true))
        );
    }
}
