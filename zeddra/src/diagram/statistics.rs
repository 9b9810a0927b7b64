use super::enumerate::PatternSet;
use super::VariableId;
use serde::Serialize;
use std::collections::BTreeSet;

/// Shape statistics over one diagram's enumerated family.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FamilyStats {
    /// Number of enumerated arrays (after any cap truncation).
    pub arrays: usize,
    /// Total elements across all arrays.
    pub elements: usize,
    /// The length of the shortest array.
    pub shortest: usize,
    /// The length of the longest array.
    pub longest: usize,
    /// The mean array length.
    pub mean_length: f64,
    /// Distinct variables appearing in any array.
    pub distinct_variables: usize,
    /// Smallest and largest variable id seen, when any variable appears.
    pub variable_range: Option<(VariableId, VariableId)>,
}

impl From<&PatternSet> for FamilyStats {
    fn from(patterns: &PatternSet) -> Self {
        let arrays = patterns.arrays.len();
        let elements = patterns.arrays.iter().map(Vec::len).sum();
        let shortest = patterns.arrays.iter().map(Vec::len).min().unwrap_or(0);
        let longest = patterns.arrays.iter().map(Vec::len).max().unwrap_or(0);
        let mean_length = if arrays == 0 {
            0.0
        } else {
            elements as f64 / arrays as f64
        };

        let variables: BTreeSet<VariableId> =
            patterns.arrays.iter().flatten().copied().collect();
        let variable_range = variables
            .first()
            .zip(variables.last())
            .map(|(&low, &high)| (low, high));

        Self {
            arrays,
            elements,
            shortest,
            longest,
            mean_length,
            distinct_variables: variables.len(),
            variable_range,
        }
    }
}
