use crate::diagram::enumerate::{canonical_order, PatternSet};
use crate::diagram::VariableId;
use crate::util::format_vec_separated_by;
use num::BigInt;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

/// Documents are keyed by the file stem of their dump, e.g. `zdd_7`.
pub type DocumentId = String;

/// Canonical order-independent pattern key: the sorted member variables,
/// ranked by (cardinality, lexicographic) order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Signature(Vec<VariableId>);

impl Signature {
    /// Canonicalizes an arbitrary member list: sorted ascending, deduplicated.
    pub fn new(mut members: Vec<VariableId>) -> Self {
        members.sort_unstable();
        members.dedup();
        Signature(members)
    }

    pub fn members(&self) -> &[VariableId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Ord for Signature {
    fn cmp(&self, other: &Self) -> Ordering {
        canonical_order(&self.0, &other.0)
    }
}

impl PartialOrd for Signature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", format_vec_separated_by(self.0.iter(), ","))
    }
}

/// Cross-document bookkeeping for one pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternRecord {
    /// Number of documents containing the pattern, not total occurrences.
    pub document_count: u32,
    /// Smallest document id containing the pattern. Comparing ids rather
    /// than arrival order keeps this stable under any processing order.
    pub first_seen: DocumentId,
}

/// Cross-document bookkeeping for one variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariableRecord {
    /// Distinct arrays containing the variable, summed over documents.
    pub occurrences: u64,
    /// The documents in which the variable appears.
    pub documents: BTreeSet<DocumentId>,
}

/// Outcome of one document's processing.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentOutcome {
    Analyzed {
        arrays: usize,
        family_size: BigInt,
        /// Set when the enumeration cap truncated the document's family.
        partial: bool,
    },
    Excluded {
        reason: String,
    },
}

/// Aggregated corpus-wide tables.
///
/// Built by folding per-document pattern sets in one at a time. Merging two
/// partial summaries is commutative and associative (each document is
/// processed exactly once, so the per-document maps are disjoint and every
/// counter is a sum), which makes the parallel reduce order irrelevant to
/// the final tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorpusSummary {
    pub documents: BTreeMap<DocumentId, DocumentOutcome>,
    pub patterns: BTreeMap<Signature, PatternRecord>,
    pub variables: BTreeMap<VariableId, VariableRecord>,
    /// Joint array counts per unordered variable pair, keyed `(min, max)`.
    pub pairs: BTreeMap<(VariableId, VariableId), u64>,
    /// Set when the run was cancelled before every document was folded in.
    pub incomplete: bool,
}

impl CorpusSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents that contributed arrays to the tables.
    pub fn analyzed_documents(&self) -> usize {
        self.documents
            .values()
            .filter(|outcome| matches!(outcome, DocumentOutcome::Analyzed { .. }))
            .count()
    }

    /// Folds one enumerated document into the running tables.
    pub fn absorb_document(&mut self, id: DocumentId, patterns: &PatternSet) {
        // Enumeration already emits each array once in canonical form; the
        // signature set re-checks that so a bypassed enumerator still
        // counts a repeated pattern once per document.
        let deduped: BTreeSet<Signature> = patterns
            .arrays
            .iter()
            .map(|array| Signature::new(array.clone()))
            .collect();

        for signature in &deduped {
            for &variable in signature.members() {
                let record = self.variables.entry(variable).or_default();
                record.occurrences += 1;
                record.documents.insert(id.clone());
            }

            for (position, &a) in signature.members().iter().enumerate() {
                for &b in &signature.members()[position + 1..] {
                    *self.pairs.entry((a, b)).or_insert(0) += 1;
                }
            }
        }

        for signature in deduped.iter().cloned() {
            match self.patterns.entry(signature) {
                Entry::Vacant(entry) => {
                    entry.insert(PatternRecord {
                        document_count: 1,
                        first_seen: id.clone(),
                    });
                }
                Entry::Occupied(mut entry) => {
                    let record = entry.get_mut();
                    record.document_count += 1;
                    if id < record.first_seen {
                        record.first_seen = id.clone();
                    }
                }
            }
        }

        self.documents.insert(
            id,
            DocumentOutcome::Analyzed {
                arrays: deduped.len(),
                family_size: patterns.family_size.clone(),
                partial: patterns.truncated,
            },
        );
    }

    /// Records a document excluded from aggregation, with the reason shown
    /// in the per-document report.
    pub fn absorb_failure(&mut self, id: DocumentId, reason: String) {
        self.documents.insert(id, DocumentOutcome::Excluded { reason });
    }

    /// Merges another partial summary into this one.
    pub fn merge(&mut self, other: CorpusSummary) {
        self.documents.extend(other.documents);

        for (signature, record) in other.patterns {
            match self.patterns.entry(signature) {
                Entry::Vacant(entry) => {
                    entry.insert(record);
                }
                Entry::Occupied(mut entry) => {
                    let existing = entry.get_mut();
                    existing.document_count += record.document_count;
                    if record.first_seen < existing.first_seen {
                        existing.first_seen = record.first_seen;
                    }
                }
            }
        }

        for (variable, record) in other.variables {
            let existing = self.variables.entry(variable).or_default();
            existing.occurrences += record.occurrences;
            existing.documents.extend(record.documents);
        }

        for (pair, count) in other.pairs {
            *self.pairs.entry(pair).or_insert(0) += count;
        }

        self.incomplete |= other.incomplete;
    }

    /// Joint array count for a variable pair, symmetric in its arguments.
    pub fn co_occurrence(&self, a: VariableId, b: VariableId) -> u64 {
        self.pairs
            .get(&(a.min(b), a.max(b)))
            .copied()
            .unwrap_or(0)
    }
}
