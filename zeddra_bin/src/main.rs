use clap::{Parser, Subcommand};
use log::{error, info};
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::Path;
use std::process;
use std::time::Instant;
use zeddra::corpus::report::write_reports;
use zeddra::corpus::{self, AnalysisConfig, VersionPolicy, DEFAULT_CAP};
use zeddra::diagram::statistics::FamilyStats;
use zeddra::diagram::Diagram;
use zeddra::parser;
use zeddra::util::format_vec_separated_by;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "zeddra", version, arg_required_else_help(true))]
struct Cli {
    /// Input path: a corpus directory for analyze, a single diagram dump otherwise.
    #[arg(short, long, verbatim_doc_comment)]
    input: String,

    /// Output path: a directory for analyze (default "."),
    /// a file for the other operations (stdout when not given).
    #[arg(short, long, verbatim_doc_comment)]
    output: Option<String>,

    /// Choose one of the available
    #[clap(subcommand)]
    operation: Operation,
}

#[derive(Debug, Clone, Subcommand)]
enum Operation {
    /// Analyzes a corpus directory and writes the four report tables.
    Analyze {
        /// Per-document enumeration cap. Documents whose family exceeds
        /// the cap are truncated to the smallest arrays and flagged partial.
        #[arg(short, long, default_value_t = DEFAULT_CAP, verbatim_doc_comment)]
        cap: usize,
        /// Specify how many threads should be used.
        /// Possible values are between 1 and 32.
        #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..=32), default_value_t = 4, verbatim_doc_comment)]
        jobs: u16,
        /// Abort the whole run on a diagram with an unsupported format
        /// version instead of excluding that document.
        #[arg(long, verbatim_doc_comment)]
        abort_unsupported: bool,
    },
    /// Prints every array a single diagram encodes, one per line.
    Arrays {
        /// Enumeration cap, as for analyze.
        #[arg(short, long, default_value_t = DEFAULT_CAP, verbatim_doc_comment)]
        cap: usize,
    },
    /// Prints shape statistics for a single diagram.
    Summary,
}

fn main() {
    let cli = Cli::parse();

    pretty_env_logger::init();

    match &cli.operation {
        Operation::Analyze {
            cap,
            jobs,
            abort_unsupported,
        } => {
            let time = Instant::now();

            let mut config = AnalysisConfig::new(&cli.input);
            config.max_arrays_per_document = *cap;
            config.parallelism = *jobs as usize;
            config.unsupported_version_policy = if *abort_unsupported {
                VersionPolicy::Abort
            } else {
                VersionPolicy::Skip
            };

            let summary = match corpus::analyze_corpus(&config) {
                Ok(summary) => summary,
                Err(err) => {
                    error!("analysis failed: {err}\nAborting...");
                    process::exit(1);
                }
            };

            info!(
                "analyzed {} documents in {:.3}s",
                summary.analyzed_documents(),
                time.elapsed().as_secs_f32()
            );

            let directory = cli.output.as_deref().unwrap_or(".");
            if let Err(err) = write_reports(&summary, Path::new(directory)) {
                error!("failed to write reports: {err}\nAborting...");
                process::exit(1);
            }
            info!("reports written to {directory}");
        }
        Operation::Arrays { cap } => {
            let diagram = load_diagram(&cli.input);
            let family = diagram.enumerate(*cap);

            let mut writer = open_writer(cli.output.as_deref());
            for array in &family.arrays {
                writeln!(
                    writer,
                    "[{}]",
                    format_vec_separated_by(array.iter(), ",")
                )
                .expect("Unable to write line");
            }
            writer.flush().unwrap();

            if family.truncated {
                info!(
                    "family size {} exceeds the cap of {cap}, output truncated",
                    family.family_size
                );
            }
        }
        Operation::Summary => {
            let diagram = load_diagram(&cli.input);
            let family = diagram.enumerate(DEFAULT_CAP);
            let stats = FamilyStats::from(&family);

            let mut writer = open_writer(cli.output.as_deref());
            writeln!(writer, "nodes: {}", diagram.node_count()).unwrap();
            writeln!(writer, "family size: {}", family.family_size).unwrap();
            writeln!(writer, "arrays enumerated: {}", stats.arrays).unwrap();
            writeln!(writer, "elements: {}", stats.elements).unwrap();
            writeln!(
                writer,
                "array length: {} - {} (mean {:.1})",
                stats.shortest, stats.longest, stats.mean_length
            )
            .unwrap();
            writeln!(writer, "distinct variables: {}", stats.distinct_variables).unwrap();
            if let Some((low, high)) = stats.variable_range {
                writeln!(writer, "variable range: {low} - {high}").unwrap();
            }
            writer.flush().unwrap();
        }
    }
}

/// Parses a single diagram dump, printing the error and exiting on failure.
fn load_diagram(input: &str) -> Diagram {
    match parser::build_diagram(Path::new(input)) {
        Ok(diagram) => diagram,
        Err(err) => {
            error!("failed to read {input}: {err}\nAborting...");
            process::exit(1);
        }
    }
}

fn open_writer(output: Option<&str>) -> Box<dyn Write> {
    if let Some(path) = output {
        Box::new(BufWriter::new(
            File::create(path).expect("Unable to create file"),
        ))
    } else {
        Box::new(BufWriter::new(stdout()))
    }
}
