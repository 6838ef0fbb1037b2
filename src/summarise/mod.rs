//! Implementation of `csq summarise` subcommand.

use std::io::{BufRead, Write};

use noodles_vcf as vcf;
use thousands::Separable;
use vcf::variant::io::Write as _;

use crate::{
    common::{self, open_read_maybe_gz, open_write_maybe_gz, worker_version, MaybeGzWriter},
    csq::{fields, CsqFieldMap},
    record::{TryFromVcf, VariantRecord},
    refs::{PredictionAlgorithmTable, ReferenceData, ReferencePaths},
};

pub mod annotate;
pub mod config;
pub mod header;

pub use annotate::{Annotator, Outcome};
pub use config::Config;

/// Number of skipped variant identifiers kept for the final report.
pub const MAX_SKIPPED_EXAMPLES: usize = 100;

/// Command line arguments for `csq summarise` subcommand.
#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about = "Summarise VEP and vcfanno annotations of a VCF file",
    long_about = None
)]
pub struct Args {
    /// Path to input VCF file, optionally gzip-compressed.
    #[clap(long)]
    pub path_in: String,
    /// Path to output VCF file.
    #[clap(long)]
    pub path_out: String,
    /// Path to output VCF file with the PASS records only; optional.
    #[clap(long)]
    pub path_out_pass: Option<String>,
    /// Path to the INFO tag metadata table.
    #[clap(long)]
    pub path_infotags: String,
    /// Path to the gene/transcript cross-reference table.
    #[clap(long)]
    pub path_xref: String,
    /// Path to the name/index map of the per-record xref field.
    #[clap(long)]
    pub path_xref_namemap: String,
    /// Path to the cancer mutation hotspot table.
    #[clap(long)]
    pub path_hotspots: String,
    /// Path to the prediction algorithm list; taken from the VCF header if
    /// not given.
    #[clap(long)]
    pub path_algorithms: Option<String>,
    /// Path to TOML configuration file; optional.
    #[clap(long)]
    pub path_config: Option<String>,
    /// Collect regulatory and motif feature consequences.
    #[clap(long)]
    pub regulatory: bool,
    /// Classify the oncogenicity of each variant.
    #[clap(long)]
    pub oncogenicity: bool,
    /// Keep the loss-of-function fields of the principal consequence.
    #[clap(long)]
    pub lof_prediction: bool,
    /// Tumor type that hotspot evidence must have been observed in.
    #[clap(long)]
    pub tumor_type: Option<String>,
    /// INFO field with per-record transcript cross-references.
    #[clap(long)]
    pub xref_tag: Option<String>,
    /// VEP pick criteria, recorded in the output header.
    #[clap(long, value_delimiter = ',')]
    pub pick_order: Option<Vec<String>>,
}

/// Error type for `csq summarise`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("problem with consequence field schema: {0}")]
    ConsequenceSchema(#[from] fields::Error),
    #[error("problem converting record {index}: {source}")]
    Record {
        index: usize,
        #[source]
        source: crate::record::variant_record::Error,
    },
    #[error("no records written to output, {skipped} skipped")]
    NoRecordsWritten { skipped: usize },
}

/// Records processed on the current chromosome.
#[derive(Debug, Default)]
struct ChromProgress {
    chrom: Option<String>,
    processed: usize,
}

impl ChromProgress {
    /// Count one record, logging and resetting when the chromosome changes.
    fn observe(&mut self, chrom: &str) {
        if self.chrom.as_deref() != Some(chrom) {
            self.finish();
            tracing::debug!("starting on chromosome {}", chrom);
            self.chrom = Some(chrom.to_string());
        }
        self.processed += 1;
    }

    fn finish(&mut self) {
        if let Some(chrom) = self.chrom.take() {
            tracing::info!(
                "... processed {} records on chromosome {}",
                self.processed.separate_with_commas(),
                chrom
            );
        }
        self.processed = 0;
    }
}

/// Counters of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub total: usize,
    pub written: usize,
    pub passed: usize,
    pub not_passed: usize,
    pub skipped: usize,
    /// Identifiers of the first skipped records.
    pub skipped_examples: Vec<String>,
}

/// Output of a run: all records and optionally the PASS records only.
pub struct Outputs<W: Write> {
    pub all: vcf::io::Writer<W>,
    pub pass: Option<vcf::io::Writer<W>>,
}

/// Process the variants from `reader` to `outputs`.
pub fn process_variants<R: BufRead, W: Write>(
    reader: &mut vcf::io::Reader<R>,
    input_header: &vcf::Header,
    output_header: &vcf::Header,
    annotator: &mut Annotator<'_>,
    outputs: &mut Outputs<W>,
) -> Result<RunStats, anyhow::Error> {
    let start = std::time::Instant::now();
    let mut stats = RunStats::default();
    let mut progress = ChromProgress::default();

    let mut vcf_record = vcf::variant::RecordBuf::default();
    loop {
        let bytes_read = reader
            .read_record_buf(input_header, &mut vcf_record)
            .map_err(|e| anyhow::anyhow!("problem reading VCF record: {}", e))?;
        if bytes_read == 0 {
            break; // all done
        }
        stats.total += 1;

        let mut record = VariantRecord::try_from_vcf(&vcf_record, input_header).map_err(
            |source| Error::Record {
                index: stats.total,
                source,
            },
        )?;
        if annotator.annotate(&mut record) == Outcome::NoConsequence {
            tracing::trace!("{}: no consequence, skipping", record.variant_id());
            stats.skipped += 1;
            if stats.skipped_examples.len() < MAX_SKIPPED_EXAMPLES {
                stats.skipped_examples.push(record.variant_id());
            }
            continue;
        }
        progress.observe(&record.chrom);

        record.write_annotations(&mut vcf_record, output_header);
        outputs
            .all
            .write_variant_record(output_header, &vcf_record)
            .map_err(|e| anyhow::anyhow!("problem writing VCF record: {}", e))?;
        stats.written += 1;

        if record.filter_pass {
            stats.passed += 1;
            if let Some(pass) = outputs.pass.as_mut() {
                pass.write_variant_record(output_header, &vcf_record)
                    .map_err(|e| anyhow::anyhow!("problem writing PASS record: {}", e))?;
            }
        } else {
            stats.not_passed += 1;
        }
    }
    progress.finish();

    if stats.skipped > 0 {
        tracing::warn!(
            "skipped {} records without consequence, e.g.: {}",
            stats.skipped.separate_with_commas(),
            stats.skipped_examples.join(", ")
        );
    }
    tracing::info!(
        "... wrote {} of {} records ({} PASS, {} other) in {:?}",
        stats.written.separate_with_commas(),
        stats.total.separate_with_commas(),
        stats.passed.separate_with_commas(),
        stats.not_passed.separate_with_commas(),
        start.elapsed()
    );
    tracing::info!(
        "number of skipped records: {}",
        stats.skipped.separate_with_commas()
    );

    if stats.written == 0 {
        return Err(Error::NoRecordsWritten {
            skipped: stats.skipped,
        }
        .into());
    }

    Ok(stats)
}

/// Open a VCF writer and write the header.
fn open_vcf_writer(
    path: &str,
    header: &vcf::Header,
) -> Result<vcf::io::Writer<MaybeGzWriter>, anyhow::Error> {
    let mut writer = vcf::io::Writer::new(
        open_write_maybe_gz(path)
            .map_err(|e| anyhow::anyhow!("could not open output file {}: {}", path, e))?,
    );
    writer
        .write_header(header)
        .map_err(|e| anyhow::anyhow!("could not write header to {}: {}", path, e))?;
    Ok(writer)
}

/// Main entry point for `csq summarise` sub command.
pub fn run(args_common: &common::Args, args: &Args) -> Result<RunStats, anyhow::Error> {
    let before_anything = std::time::Instant::now();
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    let config = Config::from_args(args)?;
    tracing::info!("config = {:?}", &config);

    tracing::info!("loading reference tables...");
    let refs = ReferenceData::load(&ReferencePaths {
        infotags: args.path_infotags.clone().into(),
        xref: args.path_xref.clone().into(),
        xref_namemap: args.path_xref_namemap.clone().into(),
        hotspots: args.path_hotspots.clone().into(),
        algorithms: args.path_algorithms.clone().map(Into::into),
    })
    .map_err(|e| anyhow::anyhow!("problem loading reference tables: {}", e))?;

    tracing::info!("opening input file...");
    let mut reader = vcf::io::Reader::new(
        open_read_maybe_gz(&args.path_in)
            .map_err(|e| anyhow::anyhow!("could not open input file {}: {}", &args.path_in, e))?,
    );
    let input_header = reader
        .read_header()
        .map_err(|e| anyhow::anyhow!("problem reading VCF header: {}", e))?;

    let csq_fields = CsqFieldMap::from_header(&input_header, annotate::CSQ_KEY).map_err(Error::from)?;
    tracing::info!("consequence subfields: {}", csq_fields.names().join("|"));
    let algorithms = refs.algorithms.clone().or_else(|| {
        input_header
            .infos()
            .get(annotate::DBNSFP_KEY)
            .and_then(|info| PredictionAlgorithmTable::from_header_description(info.description()))
    });
    match &algorithms {
        Some(algorithms) => tracing::info!("{} prediction algorithms", algorithms.len()),
        None => tracing::info!("no prediction algorithms, skipping predictions"),
    }

    let output_header = header::build_output_header(
        &input_header,
        &refs.infotags,
        algorithms.as_ref(),
        &config,
        worker_version(),
    )
    .map_err(|e| anyhow::anyhow!("problem building output header: {}", e))?;

    tracing::info!("opening output files...");
    let mut outputs = Outputs {
        all: open_vcf_writer(&args.path_out, &output_header)?,
        pass: args
            .path_out_pass
            .as_ref()
            .map(|path| open_vcf_writer(path, &output_header))
            .transpose()?,
    };

    tracing::info!("summarising records...");
    let mut annotator = Annotator::new(&refs, &config, csq_fields, algorithms);
    let stats = process_variants(
        &mut reader,
        &input_header,
        &output_header,
        &mut annotator,
        &mut outputs,
    )?;

    let Outputs { all, pass } = outputs;
    all.into_inner()
        .finish()
        .map_err(|e| anyhow::anyhow!("problem closing {}: {}", &args.path_out, e))?;
    if let (Some(pass), Some(path)) = (pass, &args.path_out_pass) {
        pass.into_inner()
            .finish()
            .map_err(|e| anyhow::anyhow!("problem closing {}: {}", path, e))?;
    }

    tracing::info!(
        "All of `csq summarise` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(stats)
}
