pub mod aggregate;
pub mod report;

use crate::diagram::enumerate::PatternSet;
use crate::error::{AnalysisError, Result};
use crate::parser;
use aggregate::{CorpusSummary, DocumentId};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use workctl::WorkQueue;

/// Default per-document enumeration cap.
pub const DEFAULT_CAP: usize = 100_000;

/// What to do with diagrams whose format version is newer than supported.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum VersionPolicy {
    /// Exclude the document and continue with the rest of the corpus.
    #[default]
    Skip,
    /// Fail the whole run.
    Abort,
}

/// Options recognized by a corpus analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Directory holding one `.bin` diagram dump per document.
    pub input: PathBuf,
    /// Enumeration cap per document; larger families are truncated and
    /// the document flagged partial.
    pub max_arrays_per_document: usize,
    pub unsupported_version_policy: VersionPolicy,
    /// Worker threads; 1 processes everything in-thread.
    pub parallelism: usize,
}

impl AnalysisConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        AnalysisConfig {
            input: input.into(),
            max_arrays_per_document: DEFAULT_CAP,
            unsupported_version_policy: VersionPolicy::default(),
            parallelism: 4,
        }
    }
}

type DocumentResult = Result<PatternSet>;

/// Analyzes every diagram dump in the configured directory and reduces the
/// per-document results into one summary.
///
/// Parse failures are isolated per document; the run only fails when no
/// valid document survives, or on an unsupported version under the abort
/// policy.
pub fn analyze_corpus(config: &AnalysisConfig) -> Result<CorpusSummary> {
    analyze_corpus_with_cancel(config, &Arc::new(AtomicBool::new(false)))
}

/// Like [`analyze_corpus`], checking `cancel` between documents. A
/// cancelled run still reduces the documents finished so far and marks the
/// summary incomplete.
pub fn analyze_corpus_with_cancel(
    config: &AnalysisConfig,
    cancel: &Arc<AtomicBool>,
) -> Result<CorpusSummary> {
    let files = collect_diagram_files(&config.input)?;
    info!(
        "analyzing {} diagram files from {}",
        files.len(),
        config.input.display()
    );

    let summary = if config.parallelism <= 1 {
        analyze_single_thread(config, &files, cancel)?
    } else {
        analyze_multi_thread(config, &files, cancel)?
    };

    if !summary.incomplete && summary.analyzed_documents() == 0 {
        return Err(AnalysisError::EmptyCorpus);
    }
    Ok(summary)
}

// Document ids are recovered from the file stem, so `zdd_7.bin` aggregates
// as `zdd_7`. Sorted for stable scheduling and logging; the summary itself
// is order-independent.
fn collect_diagram_files(input: &Path) -> Result<Vec<(DocumentId, PathBuf)>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(input)? {
        let path = entry?.path();
        if path.extension().is_some_and(|extension| extension == "bin") {
            match path.file_stem().and_then(|stem| stem.to_str()) {
                Some(stem) => files.push((stem.to_owned(), path)),
                None => warn!("skipping undecodable file name {}", path.display()),
            }
        }
    }
    files.sort();
    Ok(files)
}

fn process_document(path: &Path, cap: usize) -> DocumentResult {
    let diagram = parser::build_diagram(path)?;
    Ok(diagram.enumerate(cap))
}

// Folds one worker result into the summary, applying the isolation policy:
// only an unsupported version under Abort escapes as a run failure.
fn fold_result(
    summary: &mut CorpusSummary,
    policy: VersionPolicy,
    id: DocumentId,
    result: DocumentResult,
) -> Result<()> {
    match result {
        Ok(patterns) => {
            if patterns.truncated {
                warn!("{id}: family size {} exceeds the cap, flagged partial", patterns.family_size);
            }
            summary.absorb_document(id, &patterns);
            Ok(())
        }
        Err(error @ AnalysisError::UnsupportedVersion { .. })
            if policy == VersionPolicy::Abort =>
        {
            Err(error)
        }
        Err(error) => {
            warn!("excluding {id}: {error}");
            summary.absorb_failure(id, error.to_string());
            Ok(())
        }
    }
}

fn analyze_single_thread(
    config: &AnalysisConfig,
    files: &[(DocumentId, PathBuf)],
    cancel: &Arc<AtomicBool>,
) -> Result<CorpusSummary> {
    let mut summary = CorpusSummary::new();

    for (id, path) in files {
        if cancel.load(Ordering::Relaxed) {
            warn!("run cancelled, summarizing finished documents only");
            summary.incomplete = true;
            break;
        }
        let result = process_document(path, config.max_arrays_per_document);
        fold_result(
            &mut summary,
            config.unsupported_version_policy,
            id.clone(),
            result,
        )?;
    }

    Ok(summary)
}

// Worker-pool variant: a shared work queue feeds the threads, results come
// back over a channel and are reduced by this thread alone. Workers own
// their document's bytes and node table exclusively; the only shared state
// is the queue and the channel.
fn analyze_multi_thread(
    config: &AnalysisConfig,
    files: &[(DocumentId, PathBuf)],
    cancel: &Arc<AtomicBool>,
) -> Result<CorpusSummary> {
    let mut queue = WorkQueue::with_capacity(files.len());

    for work in files.to_vec() {
        queue.push_work(work);
    }

    let (results_tx, results_rx) = mpsc::channel();

    let mut threads = Vec::new();

    for _ in 0..config.parallelism {
        let mut t_queue = queue.clone();
        let t_results_tx = results_tx.clone();
        let t_cancel = Arc::clone(cancel);
        let cap = config.max_arrays_per_document;

        let handle = thread::spawn(move || {
            while let Some((id, path)) = t_queue.pull_work() {
                if t_cancel.load(Ordering::Relaxed) {
                    break;
                }
                let result = process_document(&path, cap);
                if t_results_tx.send((id, result)).is_err() {
                    break;
                }
            }
        });

        threads.push(handle);
    }

    // Workers drop their senders once the queue drains or cancellation
    // hits; the channel closing is the completion signal either way.
    drop(results_tx);

    let mut results = Vec::new();
    for received in results_rx {
        results.push(received);
    }

    for handle in threads {
        handle.join().unwrap();
    }

    let mut summary = CorpusSummary::new();
    if results.len() < files.len() {
        warn!("run cancelled, summarizing finished documents only");
        summary.incomplete = true;
    }

    // Deterministic fold order for readable logs; the merge itself is
    // order-independent.
    results.sort_by(|a, b| a.0.cmp(&b.0));
    for (id, result) in results {
        fold_result(
            &mut summary,
            config.unsupported_version_policy,
            id,
            result,
        )?;
    }

    Ok(summary)
}
