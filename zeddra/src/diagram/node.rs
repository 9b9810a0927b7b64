/// Variables are dense indices bounded by the diagram header's variable count.
pub type VariableId = u32;

/// Raw reference word of the EMPTY terminal (the empty family).
pub const RAW_EMPTY: u32 = 0;
/// Raw reference word of the BASE terminal (the family containing exactly the empty subset).
pub const RAW_BASE: u32 = 1;

const TERMINALS: u32 = 2;

/// A decoded child reference: one of the two terminal sentinels or an index
/// into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef {
    /// The empty family; paths reaching it contribute no subsets.
    Empty,
    /// The family containing exactly the empty subset; paths reaching it
    /// complete one subset.
    Base,
    /// An inner node, addressed by its record index.
    Index(usize),
}

impl NodeRef {
    /// Decodes a raw reference word. `None` when the word points past the arena.
    pub fn decode(raw: u32, node_count: usize) -> Option<NodeRef> {
        match raw {
            RAW_EMPTY => Some(NodeRef::Empty),
            RAW_BASE => Some(NodeRef::Base),
            _ => {
                let index = (raw - TERMINALS) as usize;
                (index < node_count).then_some(NodeRef::Index(index))
            }
        }
    }

    /// Encodes the reference back into its raw wire word.
    pub fn encode(self) -> u32 {
        match self {
            NodeRef::Empty => RAW_EMPTY,
            NodeRef::Base => RAW_BASE,
            NodeRef::Index(index) => index as u32 + TERMINALS,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, NodeRef::Empty | NodeRef::Base)
    }
}

/// One decision node. `low` continues without the tested variable,
/// `high` includes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub variable: VariableId,
    pub low: NodeRef,
    pub high: NodeRef,
}

impl Node {
    #[inline]
    pub fn new(variable: VariableId, low: NodeRef, high: NodeRef) -> Node {
        Node {
            variable,
            low,
            high,
        }
    }
}
