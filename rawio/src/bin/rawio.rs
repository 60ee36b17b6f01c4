use clap::{Parser, Subcommand};
#[cfg(feature = "hdf5")]
use rawio::{H5Source, MaxwellRawIo, RawIo};
use rawio::{
    parse_range, HeaderSummary, NcsFile, NlxHeader, NlxHeaderExt, ParseOptions, SectionConfig,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, long_about = None)]
#[command(about = "rawio - inspect Neuralynx headers and read NCS channel files")]
struct Cli {
    /// Log debug events (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the text header of any Neuralynx file
    Header {
        file: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Only read properties; skip the signature and date checks
        #[arg(long)]
        props_only: bool,
    },
    /// List contiguous recording sections of an NCS file
    Sections {
        file: PathBuf,

        /// Largest timestamp jitter, in samples, inside one section
        #[arg(long, default_value_t = 1.0)]
        tolerance: f64,

        #[arg(long)]
        json: bool,
    },
    /// Print samples of an NCS file
    Samples {
        file: PathBuf,

        /// Sample range (format: start:end)
        #[arg(long)]
        range: String,

        /// Scale to microvolts
        #[arg(long)]
        microvolts: bool,
    },
    /// Show streams and channels of a Maxwell recording
    #[cfg(feature = "hdf5")]
    Maxwell {
        file: PathBuf,

        /// Recording to read when wells hold several
        #[arg(long)]
        rec_name: Option<String>,

        /// Print the full header as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Header {
            file,
            json,
            props_only,
        } => handle_header(file, *json, *props_only)?,
        Commands::Sections {
            file,
            tolerance,
            json,
        } => handle_sections(file, *tolerance, *json)?,
        Commands::Samples {
            file,
            range,
            microvolts,
        } => handle_samples(file, range, *microvolts)?,
        #[cfg(feature = "hdf5")]
        Commands::Maxwell {
            file,
            rec_name,
            json,
        } => handle_maxwell(file, rec_name.as_deref(), *json)?,
    }

    Ok(())
}

fn handle_header(file: &Path, json: bool, props_only: bool) -> Result<(), Box<dyn std::error::Error>> {
    let options = ParseOptions { props_only };
    let header = NlxHeader::from_file(file, options)?;
    let summary = HeaderSummary::new(file.display().to_string(), &header);

    if json {
        println!("{}", summary.to_json()?);
    } else {
        print!("{}", summary.to_text());
    }
    Ok(())
}

fn handle_sections(file: &Path, tolerance: f64, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ncs = NcsFile::open(file)?;
    let config = SectionConfig::default().with_gap_tolerance(tolerance);
    let sections = ncs.sections(&config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sections)?);
        return Ok(());
    }

    println!(
        "{}: {} records, {} samples at {} Hz",
        file.display(),
        ncs.record_count(),
        ncs.total_samples(),
        sections.sampling_rate
    );
    for (index, section) in sections.iter().enumerate() {
        println!(
            "  section {index}: records {}..{}, {} samples, {:.6}s .. {:.6}s",
            section.start_record,
            section.end_record,
            section.n_samples,
            section.t_start(),
            section.t_stop()
        );
    }
    Ok(())
}

fn handle_samples(file: &Path, range: &str, microvolts: bool) -> Result<(), Box<dyn std::error::Error>> {
    let range = parse_range(range)?;
    let ncs = NcsFile::open(file)?;
    let samples = ncs.read_samples(range.clone())?;

    let gain = ncs.microvolts_per_bit();

    for (offset, value) in samples.iter().enumerate() {
        if microvolts {
            println!("{}\t{:.3}", range.start + offset, f64::from(*value) * gain);
        } else {
            println!("{}\t{}", range.start + offset, value);
        }
    }
    Ok(())
}

#[cfg(feature = "hdf5")]
fn handle_maxwell(file: &Path, rec_name: Option<&str>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut io = MaxwellRawIo::new(H5Source::open(file)?, file.display().to_string());
    if let Some(rec_name) = rec_name {
        io = io.with_rec_name(rec_name);
    }
    io.parse_header()?;
    let header = io.header()?;

    if json {
        println!("{}", serde_json::to_string_pretty(header)?);
        return Ok(());
    }

    let version = header
        .annotations
        .first()
        .and_then(|block| block.get("maxwell_version"))
        .map_or("?", String::as_str);
    println!(
        "{}: Maxwell {version}, {:.3}s",
        file.display(),
        io.segment_t_stop(0, 0)?
    );
    for (index, stream) in header.signal_streams.iter().enumerate() {
        let channels = header.channels_of(index)?;
        let rate = channels.first().map_or(0.0, |c| c.sampling_rate);
        println!(
            "  {}: {} channels at {rate} Hz, {} samples",
            stream.id,
            channels.len(),
            io.signal_size(0, 0, index)?
        );
    }
    Ok(())
}
