use crate::diagram::Diagram;
use crate::parser::bin_lexer::MAGIC;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Serializes a diagram into the binary dump format understood by
/// [`parse_diagram`](crate::parser::parse_diagram).
pub fn write_diagram(diagram: &Diagram, mut output: impl Write) -> io::Result<()> {
    output.write_all(&MAGIC)?;
    for word in [
        diagram.version,
        diagram.nodes.len() as u32,
        diagram.variable_count,
    ] {
        output.write_all(&word.to_le_bytes())?;
    }

    for node in &diagram.nodes {
        for word in [node.variable, node.low.encode(), node.high.encode()] {
            output.write_all(&word.to_le_bytes())?;
        }
    }

    output.write_all(&diagram.root.encode().to_le_bytes())?;
    output.flush()
}

/// Writes a diagram dump to the given path.
pub fn write_diagram_to_file(diagram: &Diagram, path: &Path) -> io::Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    write_diagram(diagram, writer)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::diagram::{Node, NodeRef};
    use crate::parser::parse_diagram;

    #[test]
    fn written_dump_parses_back_identically() {
        let diagram = Diagram {
            version: 1,
            variable_count: 3,
            nodes: vec![
                Node::new(2, NodeRef::Base, NodeRef::Base),
                Node::new(1, NodeRef::Base, NodeRef::Index(0)),
            ],
            root: NodeRef::Index(1),
        };

        let mut bytes = Vec::new();
        write_diagram(&diagram, &mut bytes).unwrap();

        assert_eq!(parse_diagram(&bytes).unwrap(), diagram);
    }
}
