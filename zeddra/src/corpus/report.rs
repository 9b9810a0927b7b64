use super::aggregate::{CorpusSummary, DocumentOutcome, PatternRecord, Signature, VariableRecord};
use crate::diagram::VariableId;
use crate::util::format_vec;
use std::io::Write;
use std::path::Path;

/// File names of the four corpus tables written by [`write_reports`].
pub const REPORT_FILES: [&str; 4] = [
    "documents.csv",
    "patterns.csv",
    "variables.csv",
    "cooccurrence.csv",
];

/// Writes all four tables into the given directory.
///
/// Purely a projection of the finalized summary; every table carries an
/// explicit sort, so the output is byte-identical regardless of how the
/// corpus was processed.
pub fn write_reports(summary: &CorpusSummary, directory: &Path) -> csv::Result<()> {
    write_documents(
        summary,
        &mut csv::Writer::from_path(directory.join(REPORT_FILES[0]))?,
    )?;
    write_patterns(
        summary,
        &mut csv::Writer::from_path(directory.join(REPORT_FILES[1]))?,
    )?;
    write_variables(
        summary,
        &mut csv::Writer::from_path(directory.join(REPORT_FILES[2]))?,
    )?;
    write_cooccurrence(
        summary,
        &mut csv::Writer::from_path(directory.join(REPORT_FILES[3]))?,
    )?;
    Ok(())
}

/// Per-document outcomes, sorted by document id.
pub fn write_documents<W: Write>(
    summary: &CorpusSummary,
    writer: &mut csv::Writer<W>,
) -> csv::Result<()> {
    writer.write_record(["document", "arrays", "family_size", "partial", "excluded_reason"])?;

    for (id, outcome) in &summary.documents {
        match outcome {
            DocumentOutcome::Analyzed {
                arrays,
                family_size,
                partial,
            } => writer.write_record(vec![
                id.clone(),
                arrays.to_string(),
                family_size.to_string(),
                partial.to_string(),
                String::new(),
            ])?,
            DocumentOutcome::Excluded { reason } => writer.write_record(vec![
                id.clone(),
                String::new(),
                String::new(),
                String::new(),
                reason.clone(),
            ])?,
        }
    }

    // A cancelled run is best-effort; the sentinel row tells CSV consumers
    // the aggregates do not cover the whole corpus.
    if summary.incomplete {
        writer.write_record(vec![
            "(incomplete)".to_string(),
            String::new(),
            String::new(),
            String::new(),
            "run cancelled before the remaining documents were processed".to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Pattern frequency table, sorted by document frequency descending, then
/// signature ascending.
pub fn write_patterns<W: Write>(
    summary: &CorpusSummary,
    writer: &mut csv::Writer<W>,
) -> csv::Result<()> {
    writer.write_record([
        "signature",
        "document_frequency",
        "first_seen",
        "length",
        "members",
    ])?;

    let mut rows: Vec<(&Signature, &PatternRecord)> = summary.patterns.iter().collect();
    rows.sort_by(|a, b| {
        b.1.document_count
            .cmp(&a.1.document_count)
            .then_with(|| a.0.cmp(b.0))
    });

    for (signature, record) in rows {
        writer.write_record(vec![
            signature.to_string(),
            record.document_count.to_string(),
            record.first_seen.clone(),
            signature.len().to_string(),
            format_vec(signature.members().iter()),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Variable frequency table, sorted by occurrence count descending, then
/// variable id ascending.
pub fn write_variables<W: Write>(
    summary: &CorpusSummary,
    writer: &mut csv::Writer<W>,
) -> csv::Result<()> {
    writer.write_record([
        "variable",
        "occurrences",
        "documents",
        "document_frequency",
        "document_ids",
    ])?;

    let analyzed = summary.analyzed_documents();
    let mut rows: Vec<(&VariableId, &VariableRecord)> = summary.variables.iter().collect();
    rows.sort_by(|a, b| b.1.occurrences.cmp(&a.1.occurrences).then_with(|| a.0.cmp(b.0)));

    for (variable, record) in rows {
        let share = if analyzed == 0 {
            0.0
        } else {
            record.documents.len() as f64 / analyzed as f64 * 100.0
        };
        writer.write_record(vec![
            variable.to_string(),
            record.occurrences.to_string(),
            record.documents.len().to_string(),
            format!("{share:.2}"),
            format_vec(record.documents.iter()),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Co-occurrence table, sorted by joint count descending, then pair ascending.
pub fn write_cooccurrence<W: Write>(
    summary: &CorpusSummary,
    writer: &mut csv::Writer<W>,
) -> csv::Result<()> {
    writer.write_record(["variable_a", "variable_b", "count"])?;

    let mut rows: Vec<(&(VariableId, VariableId), &u64)> = summary.pairs.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    for ((a, b), count) in rows {
        writer.write_record(vec![a.to_string(), b.to_string(), count.to_string()])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::diagram::enumerate::PatternSet;
    use num::BigInt;

    fn two_document_summary() -> CorpusSummary {
        let mut summary = CorpusSummary::new();
        summary.absorb_document(
            "doc_a".into(),
            &PatternSet {
                arrays: vec![vec![], vec![1], vec![1, 2]],
                family_size: BigInt::from(3),
                truncated: false,
            },
        );
        summary.absorb_document(
            "doc_b".into(),
            &PatternSet {
                arrays: vec![vec![2, 3]],
                family_size: BigInt::from(1),
                truncated: false,
            },
        );
        summary
    }

    fn render<F>(write: F) -> String
    where
        F: FnOnce(&mut csv::Writer<Vec<u8>>) -> csv::Result<()>,
    {
        let mut writer = csv::Writer::from_writer(Vec::new());
        write(&mut writer).unwrap();
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn document_table_lists_every_outcome() {
        let mut summary = two_document_summary();
        summary.absorb_failure("doc_c".into(), "corrupt diagram: bad magic".into());

        let table = render(|writer| write_documents(&summary, writer));
        assert_eq!(
            table,
            "document,arrays,family_size,partial,excluded_reason\n\
             doc_a,3,3,false,\n\
             doc_b,1,1,false,\n\
             doc_c,,,,corrupt diagram: bad magic\n"
        );
    }

    #[test]
    fn cancelled_runs_are_marked_in_the_document_table() {
        let mut summary = two_document_summary();
        summary.incomplete = true;

        let table = render(|writer| write_documents(&summary, writer));
        assert!(table.ends_with(
            "(incomplete),,,,run cancelled before the remaining documents were processed\n"
        ));
    }

    #[test]
    fn pattern_table_sorts_by_frequency_then_signature() {
        let table = render(|writer| write_patterns(&two_document_summary(), writer));
        assert_eq!(
            table,
            "signature,document_frequency,first_seen,length,members\n\
             [],1,doc_a,0,\n\
             [1],1,doc_a,1,1\n\
             \"[1,2]\",1,doc_a,2,1 2\n\
             \"[2,3]\",1,doc_b,2,2 3\n"
        );
    }

    #[test]
    fn variable_table_includes_document_shares() {
        let table = render(|writer| write_variables(&two_document_summary(), writer));
        assert_eq!(
            table,
            "variable,occurrences,documents,document_frequency,document_ids\n\
             1,2,1,50.00,doc_a\n\
             2,2,2,100.00,doc_a doc_b\n\
             3,1,1,50.00,doc_b\n"
        );
    }

    #[test]
    fn cooccurrence_table_is_pair_sorted() {
        let table = render(|writer| write_cooccurrence(&two_document_summary(), writer));
        assert_eq!(
            table,
            "variable_a,variable_b,count\n\
             1,2,1\n\
             2,3,1\n"
        );
    }
}
