pub mod bin_lexer;
pub mod persisting;

use crate::diagram::{Diagram, Node, NodeRef};
use crate::error::{AnalysisError, Result};
use bin_lexer::{lex_header, lex_node, lex_root, RECORD_WIDTH, SUPPORTED_VERSION};
use log::debug;
use std::fs;
use std::path::Path;

/// Reads a diagram dump from disk and parses it.
pub fn build_diagram(path: &Path) -> Result<Diagram> {
    let bytes = fs::read(path)?;
    parse_diagram(&bytes)
}

/// Parses a diagram from a raw byte buffer.
///
/// Purely functional: no side effects, no retries. A failing buffer is
/// reported once and the caller decides what to exclude.
///
/// # Examples
///
/// ```
/// use zeddra::parser;
///
/// // A trivial dump: no nodes, root is the BASE terminal.
/// let mut bytes = b"ZDDB".to_vec();
/// for word in [1u32, 0, 0, 1] {
///     bytes.extend_from_slice(&word.to_le_bytes());
/// }
///
/// let diagram = parser::parse_diagram(&bytes).unwrap();
/// assert_eq!(diagram.node_count(), 0);
/// ```
pub fn parse_diagram(bytes: &[u8]) -> Result<Diagram> {
    let (rest, header) =
        lex_header(bytes).map_err(|_| AnalysisError::corrupt("missing or malformed header"))?;

    if header.version > SUPPORTED_VERSION {
        return Err(AnalysisError::UnsupportedVersion {
            found: header.version,
        });
    }

    let node_count = header.node_count as usize;

    // One size check up front covers truncation and trailing garbage, and
    // keeps a lying node_count from driving a huge allocation.
    let expected = node_count * RECORD_WIDTH + 4;
    if rest.len() != expected {
        return Err(AnalysisError::corrupt(format!(
            "expected {} bytes after the header for {} records, found {}",
            expected,
            node_count,
            rest.len()
        )));
    }

    let mut rest = rest;
    let mut nodes = Vec::with_capacity(node_count);

    for index in 0..node_count {
        let (after, raw) = lex_node(rest)
            .map_err(|_| AnalysisError::corrupt(format!("truncated record {index}")))?;
        rest = after;

        if raw.variable >= header.variable_count {
            return Err(AnalysisError::corrupt(format!(
                "record {index} tests variable {} outside the declared range of {}",
                raw.variable, header.variable_count
            )));
        }

        let low = NodeRef::decode(raw.low, node_count).ok_or_else(|| {
            AnalysisError::corrupt(format!(
                "record {index} has out-of-range low reference {}",
                raw.low
            ))
        })?;
        let high = NodeRef::decode(raw.high, node_count).ok_or_else(|| {
            AnalysisError::corrupt(format!(
                "record {index} has out-of-range high reference {}",
                raw.high
            ))
        })?;

        if high == NodeRef::Empty {
            // Redundant under zero-suppression; tolerated, the edge simply
            // contributes nothing.
            debug!("record {index} has an EMPTY high child");
        }

        nodes.push(Node::new(raw.variable, low, high));
    }

    let (rest, raw_root) =
        lex_root(rest).map_err(|_| AnalysisError::corrupt("missing root reference"))?;
    debug_assert!(rest.is_empty());

    let root = NodeRef::decode(raw_root, node_count).ok_or_else(|| {
        AnalysisError::corrupt(format!("out-of-range root reference {raw_root}"))
    })?;

    let diagram = Diagram {
        version: header.version,
        variable_count: header.variable_count,
        nodes,
        root,
    };
    check_ordering(&diagram)?;

    Ok(diagram)
}

// Variables must strictly increase along every root-to-terminal path,
// equivalently across every parent-child edge. A violation also rules out
// reference cycles, so downstream traversals never revisit a path.
fn check_ordering(diagram: &Diagram) -> Result<()> {
    for (index, node) in diagram.nodes.iter().enumerate() {
        for child in [node.low, node.high] {
            if let NodeRef::Index(child_index) = child {
                let child_variable = diagram.nodes[child_index].variable;
                if child_variable <= node.variable {
                    return Err(AnalysisError::corrupt(format!(
                        "record {index} (variable {}) references record {child_index} \
                         (variable {child_variable}) out of order",
                        node.variable
                    )));
                }
            }
        }
    }
    Ok(())
}
