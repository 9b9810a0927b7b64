use super::{Diagram, NodeRef, VariableId};
use itertools::Itertools;
use num::BigInt;
use std::cmp::Ordering;

/// Canonical order of arrays: ascending cardinality, then lexicographic.
/// All enumeration output, truncation and report tie-breaking use this rank.
pub fn canonical_order(a: &[VariableId], b: &[VariableId]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// The deduplicated family of arrays one diagram encodes, in canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternSet {
    /// Each array is an ascending-sorted variable subset.
    pub arrays: Vec<Vec<VariableId>>,
    /// Exact size of the encoded family; exceeds `arrays.len()` when the
    /// enumeration cap truncated.
    pub family_size: BigInt,
    /// Whether the cap cut the enumeration short. A truncated document is
    /// reported as partial, never as failed.
    pub truncated: bool,
}

impl PatternSet {
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }
}

impl Diagram {
    /// Enumerates the family of variable subsets this diagram encodes.
    ///
    /// Sub-families are memoized per node, so shared sub-diagrams are
    /// expanded exactly once no matter how many parents reference them.
    /// Each memo entry keeps at most `cap` arrays; because the truncation
    /// keeps the smallest arrays in canonical order and both composition
    /// steps are monotone under that order, the final result is exactly
    /// the `cap` smallest members of the true family.
    ///
    /// # Examples
    ///
    /// ```
    /// use zeddra::diagram::{Diagram, Node, NodeRef};
    ///
    /// // Family {{}, {1}, {1, 2}} over two variables.
    /// let diagram = Diagram {
    ///     version: 1,
    ///     variable_count: 3,
    ///     nodes: vec![
    ///         Node::new(2, NodeRef::Base, NodeRef::Base),
    ///         Node::new(1, NodeRef::Base, NodeRef::Index(0)),
    ///     ],
    ///     root: NodeRef::Index(1),
    /// };
    ///
    /// let family = diagram.enumerate(100);
    /// assert_eq!(family.arrays, vec![vec![], vec![1], vec![1, 2]]);
    /// assert!(!family.truncated);
    /// ```
    pub fn enumerate(&self, cap: usize) -> PatternSet {
        let family_size = self.family_size();

        let mut arrays = match self.root {
            NodeRef::Empty => Vec::new(),
            NodeRef::Base => vec![Vec::new()],
            NodeRef::Index(start) => {
                let mut memo: Vec<Option<Vec<Vec<VariableId>>>> = vec![None; self.nodes.len()];
                self.fill_families(start, cap, &mut memo);
                memo[start].take().expect("start node is computed")
            }
        };
        arrays.truncate(cap);

        let truncated = family_size > BigInt::from(arrays.len());
        PatternSet {
            arrays,
            family_size,
            truncated,
        }
    }

    // Bottom-up family construction over the DAG, one memo entry per node.
    // Explicit post-order stack; path depth is unbounded.
    fn fill_families(&self, start: usize, cap: usize, memo: &mut [Option<Vec<Vec<VariableId>>>]) {
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
            let low = family(memo, node.low);
            let high = family(memo, node.high);
            let combined = compose(node.variable, low, high, cap);
            memo[index] = Some(combined);
        }
    }
}

// The sub-family reachable through a child reference.
fn family<'a>(
    memo: &'a [Option<Vec<Vec<VariableId>>>],
    reference: NodeRef,
) -> &'a [Vec<VariableId>] {
    static BASE_FAMILY: [Vec<VariableId>; 1] = [Vec::new()];
    match reference {
        NodeRef::Empty => &[],
        NodeRef::Base => &BASE_FAMILY,
        NodeRef::Index(index) => memo[index]
            .as_ref()
            .expect("children are computed before their parents"),
    }
}

// node result = low ∪ (variable prefixed onto every high array).
//
// The ordering invariant guarantees `variable` is smaller than anything in
// the high sub-family, so the prefix keeps arrays sorted and maps the high
// part monotonically under canonical order. The two parts are disjoint
// (high arrays contain `variable`, low arrays cannot), so merging sorted
// inputs needs no dedup.
fn compose(
    variable: VariableId,
    low: &[Vec<VariableId>],
    high: &[Vec<VariableId>],
    cap: usize,
) -> Vec<Vec<VariableId>> {
    let prefixed = high.iter().map(|tail| {
        let mut array = Vec::with_capacity(tail.len() + 1);
        array.push(variable);
        array.extend_from_slice(tail);
        array
    });

    low.iter()
        .cloned()
        .merge_by(prefixed, |a, b| canonical_order(a, b) != Ordering::Greater)
        .take(cap)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::diagram::Node;

    fn diagram(nodes: Vec<Node>, root: NodeRef, variable_count: u32) -> Diagram {
        Diagram {
            version: 1,
            variable_count,
            nodes,
            root,
        }
    }

    #[test]
    fn base_root_yields_the_empty_array() {
        let family = diagram(Vec::new(), NodeRef::Base, 0).enumerate(10);
        assert_eq!(family.arrays, vec![Vec::<VariableId>::new()]);
        assert!(!family.truncated);
    }

    #[test]
    fn empty_root_yields_nothing() {
        let family = diagram(Vec::new(), NodeRef::Empty, 0).enumerate(10);
        assert!(family.arrays.is_empty());
        assert!(!family.truncated);
    }

    #[test]
    fn enumerates_in_canonical_order() {
        // {{}, {1}, {1, 2}}
        let family = diagram(
            vec![
                Node::new(2, NodeRef::Base, NodeRef::Base),
                Node::new(1, NodeRef::Base, NodeRef::Index(0)),
            ],
            NodeRef::Index(1),
            3,
        )
        .enumerate(100);

        assert_eq!(family.arrays, vec![vec![], vec![1], vec![1, 2]]);
        assert_eq!(family.family_size, BigInt::from(3));
    }

    #[test]
    fn shared_subdiagrams_expand_once_per_parent() {
        // Node 0 is referenced three times; its family must appear under
        // every parent without recomputation artifacts.
        let family = diagram(
            vec![
                Node::new(3, NodeRef::Base, NodeRef::Base),
                Node::new(2, NodeRef::Index(0), NodeRef::Index(0)),
                Node::new(1, NodeRef::Index(1), NodeRef::Index(0)),
            ],
            NodeRef::Index(2),
            4,
        )
        .enumerate(100);

        assert_eq!(
            family.arrays,
            vec![
                vec![],
                vec![1],
                vec![2],
                vec![3],
                vec![1, 3],
                vec![2, 3],
            ]
        );
    }

    #[test]
    fn cap_keeps_the_smallest_arrays() {
        // Power set over {1, 2, 3}, true family size 8.
        let family = diagram(
            vec![
                Node::new(3, NodeRef::Base, NodeRef::Base),
                Node::new(2, NodeRef::Index(0), NodeRef::Index(0)),
                Node::new(1, NodeRef::Index(1), NodeRef::Index(1)),
            ],
            NodeRef::Index(2),
            4,
        )
        .enumerate(5);

        assert_eq!(
            family.arrays,
            vec![vec![], vec![1], vec![2], vec![3], vec![1, 2]]
        );
        assert_eq!(family.family_size, BigInt::from(8));
        assert!(family.truncated);
    }

    #[test]
    fn empty_high_child_contributes_nothing() {
        let family = diagram(
            vec![Node::new(1, NodeRef::Base, NodeRef::Empty)],
            NodeRef::Index(0),
            2,
        )
        .enumerate(10);

        assert_eq!(family.arrays, vec![Vec::<VariableId>::new()]);
        assert_eq!(family.family_size, BigInt::from(1));
    }

    #[test]
    fn enumeration_is_deterministic() {
        let d = diagram(
            vec![
                Node::new(3, NodeRef::Base, NodeRef::Base),
                Node::new(2, NodeRef::Index(0), NodeRef::Index(0)),
                Node::new(1, NodeRef::Index(1), NodeRef::Index(1)),
            ],
            NodeRef::Index(2),
            4,
        );

        assert_eq!(d.enumerate(100), d.enumerate(100));
    }

    #[test]
    fn cap_zero_truncates_everything() {
        let family = diagram(Vec::new(), NodeRef::Base, 0).enumerate(0);
        assert!(family.arrays.is_empty());
        assert!(family.truncated);
    }
}
