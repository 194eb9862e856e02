//! Filepath: src/analysis/blocks.rs
//! Block segmentation: one spec per top-level statement, each
//! carrying its own code slice, the code preceding it, and its line
//! range. Pre-block code exists so the optional live evaluation can
//! run everything a block depends on.

use tree_sitter::Node;

use crate::analysis::lines::el_line_span;
use crate::analysis::tree::PySource;

/// One top-level syntactic statement plus its code-string slice,
/// pre-slice, and line range.
#[derive(Debug, Clone)]
pub struct BlockSpec<'t> {
    /// The statement node immediately under the module root
    pub element: Node<'t>,

    /// Every source line before `first_line`, joined and terminated
    /// with a single newline so it concatenates onto any fragment
    /// without syntax damage
    pub pre_block_code: String,

    /// The lines of this statement, inclusive of trailing comment
    /// and blank lines up to the next statement
    pub block_code: String,

    /// 1-based first line
    pub first_line: usize,

    /// 1-based last line
    pub last_line: usize,
}

/// Segment a parsed source into ordered block specs.
pub fn block_specs<'t>(src: &'t PySource) -> Vec<BlockSpec<'t>> {
    let lines: Vec<&str> = src.code().split('\n').collect();

    src.block_elements()
        .into_iter()
        .map(|element| {
            let span = el_line_span(element, false);

            let last_idx = span.last.min(lines.len());
            let block_code = lines[span.first - 1..last_idx].join("\n");
            let pre_block_code = format!("{}\n", lines[..span.first - 1].join("\n"));

            BlockSpec {
                element,
                pre_block_code,
                block_code,
                first_line: span.first,
                last_line: span.last,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_spec_per_top_level_statement() {
        let src = PySource::parse("x = 1\ny = 2\nz = 3\n").unwrap();
        let specs = block_specs(&src);
        assert_eq!(specs.len(), 3);
        assert_eq!(specs[0].block_code, "x = 1");
        assert_eq!(specs[2].first_line, 3);
    }

    #[test]
    fn single_expression_first_equals_last() {
        let src = PySource::parse("len('chicken')\n").unwrap();
        let specs = block_specs(&src);
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].first_line, specs[0].last_line);
    }

    #[test]
    fn pre_block_code_ends_with_single_newline() {
        let src = PySource::parse("a = 1\nb = a + 1\n").unwrap();
        let specs = block_specs(&src);

        assert_eq!(specs[0].pre_block_code, "\n");
        assert_eq!(specs[1].pre_block_code, "a = 1\n");
    }

    #[test]
    fn ranges_are_monotonic_and_non_overlapping() {
        let code = "import os\n\nx = 1\n\nfor i in range(3):\n    x += i\n\nprint(x)\n";
        let src = PySource::parse(code).unwrap();
        let specs = block_specs(&src);

        for pair in specs.windows(2) {
            assert!(pair[0].first_line <= pair[0].last_line);
            assert!(pair[0].last_line < pair[1].first_line);
        }
    }

    #[test]
    fn block_slices_tile_the_source() {
        // Concatenating block codes with interstitial leading lines
        // reproduces the source byte-for-byte.
        let code = "# intro\nx = 1\n# middle note\n\nfor i in range(3):\n    x += i\nprint(x)\n";
        let src = PySource::parse(code).unwrap();
        let specs = block_specs(&src);
        let lines: Vec<&str> = code.split('\n').collect();

        let mut rebuilt: Vec<String> = Vec::new();

        // Lines before the first block are interstitial.
        rebuilt.extend(
            lines[..specs[0].first_line - 1]
                .iter()
                .map(|l| l.to_string()),
        );
        for spec in &specs {
            rebuilt.push(spec.block_code.clone());
        }
        // Lines after the last block (the trailing empty split) too.
        rebuilt.extend(
            lines[specs.last().unwrap().last_line..]
                .iter()
                .map(|l| l.to_string()),
        );

        assert_eq!(rebuilt.join("\n"), code);
    }
}
