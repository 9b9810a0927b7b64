use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Failures surfaced by the analysis engine.
///
/// Per-document failures are isolated by the corpus runner: the offending
/// document is excluded and the run continues. Only [`AnalysisError::EmptyCorpus`]
/// (and an unsupported version under the abort policy) fails a whole run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Header or record section malformed, truncated, or referencing out of range.
    #[error("corrupt diagram: {detail}")]
    CorruptFormat { detail: String },

    /// The dump declares a format version newer than this engine understands.
    #[error("unsupported diagram version {found}")]
    UnsupportedVersion { found: u32 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// No valid documents survived filtering; there is nothing to summarize.
    #[error("no valid diagrams in the corpus")]
    EmptyCorpus,
}

impl AnalysisError {
    pub(crate) fn corrupt(detail: impl Into<String>) -> Self {
        AnalysisError::CorruptFormat {
            detail: detail.into(),
        }
    }
}
