//! Corpus-level runs: isolation of bad documents and deterministic reports.

use file_diff::diff_files;
use std::fs::File;
use std::path::Path;
use zeddra::corpus::aggregate::DocumentOutcome;
use zeddra::corpus::report::{write_reports, REPORT_FILES};
use zeddra::corpus::{analyze_corpus, AnalysisConfig};
use zeddra::diagram::{Diagram, Node, NodeRef};
use zeddra::parser::persisting::write_diagram_to_file;

// A small family over {offset + 1, offset + 2} so documents overlap but
// are not identical.
fn document(offset: u32) -> Diagram {
    Diagram {
        version: 1,
        variable_count: offset + 3,
        nodes: vec![
            Node::new(offset + 2, NodeRef::Base, NodeRef::Base),
            Node::new(offset + 1, NodeRef::Base, NodeRef::Index(0)),
        ],
        root: NodeRef::Index(1),
    }
}

fn write_corpus(dir: &Path, corrupt_third: bool) {
    for index in 1..=5u32 {
        let path = dir.join(format!("doc_{index}.bin"));
        if corrupt_third && index == 3 {
            std::fs::write(&path, b"ZDDBgarbage").unwrap();
        } else {
            write_diagram_to_file(&document(index), &path).unwrap();
        }
    }
}

#[test]
fn one_corrupt_file_never_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path(), true);

    let mut config = AnalysisConfig::new(dir.path());
    config.parallelism = 1;
    let summary = analyze_corpus(&config).unwrap();

    assert_eq!(summary.analyzed_documents(), 4);
    match &summary.documents["doc_3"] {
        DocumentOutcome::Excluded { reason } => {
            assert!(reason.contains("corrupt"), "unexpected reason: {reason}")
        }
        other => panic!("doc_3 should be excluded, got {other:?}"),
    }
    assert!(!summary.incomplete);
}

#[test]
fn thread_count_does_not_change_the_reports() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path(), true);

    let single_dir = tempfile::tempdir().unwrap();
    let multi_dir = tempfile::tempdir().unwrap();

    let mut config = AnalysisConfig::new(dir.path());
    config.parallelism = 1;
    let summary = analyze_corpus(&config).unwrap();
    write_reports(&summary, single_dir.path()).unwrap();

    config.parallelism = 4;
    let summary = analyze_corpus(&config).unwrap();
    write_reports(&summary, multi_dir.path()).unwrap();

    for name in REPORT_FILES {
        let mut single = File::open(single_dir.path().join(name)).unwrap();
        let mut multi = File::open(multi_dir.path().join(name)).unwrap();
        // diff_files is true if the files are identical
        assert!(
            diff_files(&mut single, &mut multi),
            "{name} differs between single and multi threaded runs"
        );
    }
}

#[test]
fn report_files_cover_every_table() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path(), false);

    let out = tempfile::tempdir().unwrap();
    let mut config = AnalysisConfig::new(dir.path());
    config.parallelism = 2;
    let summary = analyze_corpus(&config).unwrap();
    write_reports(&summary, out.path()).unwrap();

    for name in REPORT_FILES {
        let content = std::fs::read_to_string(out.path().join(name)).unwrap();
        assert!(content.lines().count() > 1, "{name} is empty");
    }

    let documents = std::fs::read_to_string(out.path().join("documents.csv")).unwrap();
    // Header plus one row per document, id-sorted.
    assert_eq!(documents.lines().count(), 6);
    assert!(documents.lines().nth(1).unwrap().starts_with("doc_1,"));
}

#[test]
fn document_cap_applies_per_document() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path(), false);

    let mut config = AnalysisConfig::new(dir.path());
    config.parallelism = 1;
    config.max_arrays_per_document = 2;
    let summary = analyze_corpus(&config).unwrap();

    for (id, outcome) in &summary.documents {
        match outcome {
            DocumentOutcome::Analyzed { arrays, partial, .. } => {
                assert_eq!(*arrays, 2, "{id} should be capped");
                assert!(*partial, "{id} should be partial");
            }
            other => panic!("{id} should be analyzed, got {other:?}"),
        }
    }
}
