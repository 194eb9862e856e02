//! Filepath: src/analysis/lines.rs
//! Line-range resolution for tree nodes. Tree-sitter reports exact
//! end rows (multi-line literals included), so no padding heuristic
//! is needed for the final block. The interesting case is trailing
//! content *between* statements: comments and blank lines after a
//! statement belong to that statement's range so that block slices
//! tile the source without gaps.

use tree_sitter::Node;

/// Inclusive 1-based line range of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub first: usize,
    pub last: usize,
}

/// Compute the line range of `node`.
///
/// With `ignore_trailing` the range is the node's own exact extent -
/// the mode used for "how long is this function really" metrics.
///
/// Without it, the range extends up to the line before the next
/// statement sibling (searched up the ancestor chain), so trailing
/// comments and blank lines attach to the preceding node. When no
/// following statement exists anywhere up the chain the exact end
/// row is already correct.
pub fn el_line_span(node: Node, ignore_trailing: bool) -> LineSpan {
    let first = node.start_position().row + 1;
    let exact_last = node.end_position().row + 1;

    if ignore_trailing {
        return LineSpan {
            first,
            last: exact_last,
        };
    }

    if let Some(next_first) = next_statement_line(node) {
        // Floor at `first` so a same-line following statement
        // (semicolon-joined) cannot produce an inverted range.
        let last = next_first.saturating_sub(1).max(first);
        return LineSpan { first, last };
    }

    LineSpan {
        first,
        last: exact_last,
    }
}

/// First line of the nearest following statement, walking following
/// siblings at each ancestor level. Comments are skipped: they are
/// trailing content, not statements.
fn next_statement_line(node: Node) -> Option<usize> {
    let mut current = node;

    loop {
        let mut sibling = current.next_named_sibling();
        while let Some(sib) = sibling {
            if sib.kind() != "comment" {
                return Some(sib.start_position().row + 1);
            }
            sibling = sib.next_named_sibling();
        }
        current = current.parent()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tree::PySource;

    #[test]
    fn single_expression_spans_one_line() {
        let src = PySource::parse("x = 1\n").unwrap();
        let block = src.block_elements()[0];
        let span = el_line_span(block, false);
        assert_eq!(span, LineSpan { first: 1, last: 1 });
    }

    #[test]
    fn trailing_comment_attaches_to_preceding_block() {
        let code = "x = 1\n# about y\n\ny = 2\n";
        let src = PySource::parse(code).unwrap();
        let blocks = src.block_elements();

        let first = el_line_span(blocks[0], false);
        let second = el_line_span(blocks[1], false);

        assert_eq!(first, LineSpan { first: 1, last: 3 });
        assert_eq!(second, LineSpan { first: 4, last: 4 });
    }

    #[test]
    fn exact_mode_stops_at_the_node_end() {
        let code = "x = 1\n# trailing\n\ny = 2\n";
        let src = PySource::parse(code).unwrap();
        let block = src.block_elements()[0];
        assert_eq!(el_line_span(block, true), LineSpan { first: 1, last: 1 });
    }

    #[test]
    fn multi_line_literal_has_exact_end() {
        let code = "d = {\n    1: 1,\n}\n";
        let src = PySource::parse(code).unwrap();
        let block = src.block_elements()[0];
        assert_eq!(el_line_span(block, false), LineSpan { first: 1, last: 3 });
    }

    #[test]
    fn nested_statement_sees_following_top_level_block() {
        let code = "for x in y:\n    total = x\nprint(total)\n";
        let src = PySource::parse(code).unwrap();

        let for_block = src.block_elements()[0];
        assert_eq!(el_line_span(for_block, false), LineSpan { first: 1, last: 2 });
    }
}
