pub mod enumerate;
pub mod node;
pub mod statistics;

pub use node::{Node, NodeRef, VariableId};

use num::BigInt;

/// A parsed diagram: flat node arena addressed by record index, plus the
/// root reference. Immutable once built; the arena layout matches the
/// binary dump directly, so child links are integer indices rather than
/// language-level references.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    pub version: u32,
    pub variable_count: u32,
    pub nodes: Vec<Node>,
    pub root: NodeRef,
}

impl Diagram {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Exact number of subsets in the encoded family.
    ///
    /// Families can be exponential in the node count, hence the `BigInt`.
    pub fn family_size(&self) -> BigInt {
        let mut memo: Vec<Option<BigInt>> = vec![None; self.nodes.len()];
        self.fill_counts(&mut memo);
        self.count_of(self.root, &memo)
    }

    fn count_of(&self, reference: NodeRef, memo: &[Option<BigInt>]) -> BigInt {
        match reference {
            NodeRef::Empty => BigInt::ZERO,
            NodeRef::Base => BigInt::from(1),
            NodeRef::Index(index) => memo[index]
                .clone()
                .expect("children are counted before their parents"),
        }
    }

    // Bottom-up subset counting: count(node) = count(low) + count(high).
    // Explicit post-order stack; path depth is unbounded.
    fn fill_counts(&self, memo: &mut Vec<Option<BigInt>>) {
        let start = match self.root {
            NodeRef::Index(index) => index,
            _ => return,
        };

        let mut stack = vec![start];
        while let Some(&index) = stack.last() {
            if memo[index].is_some() {
                stack.pop();
                continue;
            }

            let node = self.nodes[index];
            let mut pending = false;
            for child in [node.low, node.high] {
                if let NodeRef::Index(child_index) = child {
                    if memo[child_index].is_none() {
                        stack.push(child_index);
                        pending = true;
                    }
                }
            }
            if pending {
                continue;
            }

            stack.pop();
            let count = self.count_of(node.low, memo) + self.count_of(node.high, memo);
            memo[index] = Some(count);
        }
    }
}
