//! Filepath: src/analysis/tree.rs
//! Queryable source tree built on Tree-sitter 0.25.x.
//! Goals:
//!   - Parse once per run; the tree is fixed afterwards.
//!   - Expose structural queries (tree-sitter query patterns) plus
//!     programmatic walks; queries stay broad and stable, advisors
//!     do fine-grained shape checks themselves.
//!   - Keep the literal-type distinction first-class: `1` and `"1"`
//!     must never be confused, so literal content is only ever read
//!     through the typed `PyValue` decoder in the grammar layer.
//!
//! Notes:
//!   - We always pass the same byte slice that the parser parsed.
//!   - We rely on tree_sitter::StreamingIterator for matches.
//!   - Tree-sitter is error-tolerant; a root containing error or
//!     missing nodes is reported as a parse error instead of being
//!     analyzed half-blind.

use anyhow::{Context, Result, anyhow};
use tree_sitter::{Language, Node, Parser, Query, QueryCursor, StreamingIterator, Tree};

use crate::analysis::error::AnalysisError;

/// A literal constant decoded from the tree with its runtime type
/// preserved. `Unknown` is an explicit sentinel for "could not
/// determine"; it is a variant, never a magic value.
#[derive(Debug, Clone, PartialEq)]
pub enum PyValue {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    None,
    Unknown,
}

impl PyValue {
    /// Python type name, as `type(x).__name__` would report it.
    pub fn type_name(&self) -> &'static str {
        match self {
            PyValue::Int(_) => "int",
            PyValue::Float(_) => "float",
            PyValue::Str(_) => "str",
            PyValue::Bool(_) => "bool",
            PyValue::None => "NoneType",
            PyValue::Unknown => "unknown",
        }
    }

    /// Reader-friendly type name for message text.
    pub fn nice_type_name(&self) -> &'static str {
        match self {
            PyValue::Int(_) => "integer",
            PyValue::Float(_) => "float",
            PyValue::Str(_) => "string",
            PyValue::Bool(_) => "boolean",
            PyValue::None => "None",
            PyValue::Unknown => "unknown",
        }
    }

    /// Render the value the way it would appear in Python source.
    pub fn render(&self) -> String {
        match self {
            PyValue::Int(n) => n.to_string(),
            PyValue::Float(f) => f.to_string(),
            PyValue::Str(s) => format!("'{s}'"),
            PyValue::Bool(true) => "True".to_string(),
            PyValue::Bool(false) => "False".to_string(),
            PyValue::None => "None".to_string(),
            PyValue::Unknown => "?".to_string(),
        }
    }

    /// True for the explicit could-not-determine sentinel.
    pub fn is_unknown(&self) -> bool {
        matches!(self, PyValue::Unknown)
    }
}

/// A parsed snippet plus its source text. The tree is immutable for
/// the duration of the run; every node handle borrows from here.
#[derive(Debug)]
pub struct PySource {
    code: String,
    tree: Tree,
}

impl PySource {
    /// Parse `code`, failing with a parse-error kind when the tree
    /// contains error or missing nodes.
    pub fn parse(code: &str) -> Result<Self> {
        let language: Language = tree_sitter_python::LANGUAGE.into();

        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .context("set Python language")?;

        let tree = parser
            .parse(code, None)
            .ok_or_else(|| anyhow!("Failed to parse Python source"))?;

        if tree.root_node().has_error() {
            let line = first_error_line(tree.root_node());
            return Err(AnalysisError::Parse { line }.into());
        }

        Ok(Self {
            code: code.to_string(),
            tree,
        })
    }

    /// The source text exactly as parsed.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The source text as bytes - the slice every node position
    /// refers into.
    pub fn bytes(&self) -> &[u8] {
        self.code.as_bytes()
    }

    /// The module root.
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Text of a node; empty for out-of-range or non-UTF-8 spans
    /// (neither occurs for nodes of this tree).
    pub fn text(&self, node: Node) -> &str {
        node.utf8_text(self.bytes()).unwrap_or("")
    }

    /// The top-level block elements: direct named children of the
    /// module root that are statements. Comments are not blocks.
    pub fn block_elements(&self) -> Vec<Node<'_>> {
        let root = self.root();
        let mut blocks = Vec::with_capacity(root.named_child_count());

        for i in 0..root.named_child_count() {
            let Some(child) = root.named_child(i) else {
                continue;
            };
            if child.kind() != "comment" {
                blocks.push(child);
            }
        }
        blocks
    }

    /// Run a query pattern against the whole tree and return every
    /// captured node in match order.
    pub fn query_nodes(&self, pattern: &str) -> Result<Vec<Node<'_>>> {
        let language: Language = tree_sitter_python::LANGUAGE.into();
        let query = Query::new(&language, pattern)
            .with_context(|| format!("compile query pattern: {pattern}"))?;

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, self.root(), self.bytes());

        let mut out = Vec::new();
        while let Some(m) = matches.next() {
            for cap in m.captures {
                out.push(cap.node);
            }
        }
        Ok(out)
    }

    /// S-expression dump of the tree for debugging.
    pub fn sexp(&self) -> String {
        self.root().to_sexp()
    }
}

/// 1-based line of the first error or missing node, falling back to
/// line 1 when the error cannot be localized.
fn first_error_line(root: Node) -> usize {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return node.start_position().row + 1;
        }
        // Push in reverse so document order is preserved.
        for i in (0..node.child_count()).rev() {
            if let Some(child) = node.child(i) {
                stack.push(child);
            }
        }
    }
    1
}

/// Pre-order walk collecting every descendant (including `node`
/// itself) whose kind is in `kinds`.
pub fn descendants_of_kind<'t>(node: Node<'t>, kinds: &[&str]) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    let mut stack = vec![node];

    while let Some(current) = stack.pop() {
        if kinds.contains(&current.kind()) {
            out.push(current);
        }
        for i in (0..current.named_child_count()).rev() {
            if let Some(child) = current.named_child(i) {
                stack.push(child);
            }
        }
    }
    out
}

/// Find the nearest ancestor (or self) of the given kind.
pub fn ancestor_or_self<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut current = Some(node);
    while let Some(n) = current {
        if n.kind() == kind {
            return Some(n);
        }
        current = n.parent();
    }
    None
}

/// True if `node` has a strict ancestor of the given kind.
pub fn has_ancestor(mut node: Node, kind: &str) -> bool {
    while let Some(p) = node.parent() {
        if p.kind() == kind {
            return true;
        }
        node = p;
    }
    false
}

/// The direct body child of the module that contains `node` - the
/// block element this node belongs to. Returns `node` itself when
/// it already sits immediately under the root.
pub fn block_ancestor<'t>(node: Node<'t>) -> Option<Node<'t>> {
    let mut current = node;
    while let Some(parent) = current.parent() {
        if parent.kind() == "module" {
            return Some(current);
        }
        current = parent;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_exposes_blocks() {
        let src = PySource::parse("x = 1\ny = 2\n").unwrap();
        let blocks = src.block_elements();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].kind(), "expression_statement");
    }

    #[test]
    fn comments_are_not_blocks() {
        let src = PySource::parse("# leading comment\nx = 1\n").unwrap();
        assert_eq!(src.block_elements().len(), 1);
    }

    #[test]
    fn syntax_errors_are_parse_errors_with_a_line() {
        let err = PySource::parse("def broken(:\n    pass\n").unwrap_err();
        let parse = err.downcast_ref::<AnalysisError>().expect("typed error");
        assert!(matches!(parse, AnalysisError::Parse { .. }));
    }

    #[test]
    fn query_nodes_finds_assignments() {
        let src = PySource::parse("x = 1\nfor i in y:\n    pass\n").unwrap();
        let hits = src.query_nodes("(assignment) @a").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind(), "assignment");
    }

    #[test]
    fn block_ancestor_climbs_to_top_level() {
        let src = PySource::parse("if x:\n    y = 1\n").unwrap();
        let assigns = descendants_of_kind(src.root(), &["assignment"]);
        assert_eq!(assigns.len(), 1);

        let block = block_ancestor(assigns[0]).unwrap();
        assert_eq!(block.kind(), "if_statement");
    }

    #[test]
    fn int_and_str_values_stay_distinct() {
        // The load-bearing distinction for every typed inspection.
        assert_ne!(PyValue::Int(1), PyValue::Str("1".to_string()));
        assert_eq!(PyValue::Int(1).type_name(), "int");
        assert_eq!(PyValue::Str("1".into()).type_name(), "str");
    }
}
