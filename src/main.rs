use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use savant::{
    render_bed, ColumnMapping, LdConfig, LdTask, Region, TabixSource, TrackFormat, VariantRecord,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "savant", about = "Genomic track records and linkage disequilibrium")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the records of a tabix-indexed track overlapping a region as BED12.
    Records {
        /// bgzip-compressed track with a `.tbi` index.
        file: PathBuf,
        /// `chrom`, `chrom:start` or `chrom:start-end` (1-based, inclusive).
        region: Region,
        /// Track layout; guessed from the file name when omitted.
        #[arg(long)]
        format: Option<TrackFormat>,
        /// Start column is already 1-based.
        #[arg(long)]
        one_based: bool,
    },
    /// Compute pairwise D' and r² for the variants of a tabix-indexed VCF.
    Ld {
        /// bgzip-compressed VCF with a `.tbi` index.
        vcf: PathBuf,
        /// `chrom`, `chrom:start` or `chrom:start-end` (1-based, inclusive).
        region: Region,
        /// Use dosage r² even when every genotype is phased.
        #[arg(long)]
        unphased: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Records {
            file,
            region,
            format,
            one_based,
        } => run_records(file, region, format, one_based)?,
        Commands::Ld {
            vcf,
            region,
            unphased,
        } => run_ld(vcf, region, unphased)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn guess_format(path: &Path) -> TrackFormat {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    match name.rsplit('.').next() {
        Some("gff") | Some("gff3") => TrackFormat::Gff,
        Some("gtf") => TrackFormat::Gtf,
        Some("genepred") | Some("refgene") => TrackFormat::GenePred,
        Some("bed") => TrackFormat::Bed,
        _ => TrackFormat::Interval,
    }
}

fn run_records(
    path: PathBuf,
    region: Region,
    format: Option<TrackFormat>,
    one_based: bool,
) -> Result<()> {
    let format = format.unwrap_or_else(|| guess_format(&path));
    debug!(%format, "using track layout");
    let mut mapping = ColumnMapping::for_format(format);
    if one_based {
        mapping = mapping.with_one_based(true);
    }
    let mut source = TabixSource::open(&path, mapping)?;
    let records = source
        .interval_records(&region)
        .with_context(|| format!("failed to query {region} in {}", path.display()))?;
    info!(count = records.len(), %region, "records loaded");

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(render_bed(&records).as_bytes())
        .context("failed to write records")?;
    Ok(())
}

fn run_ld(path: PathBuf, region: Region, unphased: bool) -> Result<()> {
    // Variant queries read VCF columns directly; the mapping is never consulted.
    let mut source = TabixSource::open(&path, ColumnMapping::interval())?;
    let records = source
        .variant_records(&region)
        .with_context(|| format!("failed to query {region} in {}", path.display()))?;
    let labels: Vec<String> = records
        .iter()
        .map(|r| match r.name() {
            Some(name) => name.to_string(),
            None => format!("{}:{}", r.reference_name(), r.position()),
        })
        .collect();

    let mut config = LdConfig::detect(&records);
    if unphased {
        config = config.with_phased(false);
    }

    let mut task = LdTask::spawn(records, config);
    let mut reported = 0.0;
    while !task.is_finished() {
        let progress = task.latest_progress();
        if progress - reported >= 0.1 {
            info!("{:.0}% of loci processed", progress * 100.0);
            reported = progress;
        }
        thread::sleep(Duration::from_millis(50));
    }
    let matrices = task.join().context("linkage disequilibrium calculation failed")?;

    let mut stdout = io::stdout().lock();
    matrices
        .write_tsv(&mut stdout, &labels)
        .context("failed to write matrices")?;
    Ok(())
}
