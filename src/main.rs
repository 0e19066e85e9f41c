//! # rastertotpcl
//!
//! CUPS filter converting raster pages to TPCL for TEC label printers.
//!
//! ## Usage
//!
//! ```bash
//! # As invoked by CUPS (raster on stdin, TPCL on stdout)
//! PPD=/etc/cups/ppd/tec.ppd rastertotpcl 42 alice label 1 "Gap=3" < page.ras > job.tpcl
//!
//! # Read a raster file and keep PNG previews of every page
//! rastertotpcl --ppd tec.ppd --preview-png out/ 42 alice label 1 "" page.ras > job.tpcl
//!
//! # Show the configuration a job would use
//! rastertotpcl --ppd tec.ppd --show-config 1 u t 1 "teGraphicsMode=2 tePrintRate=10"
//! ```
//!
//! Log lines go to stderr with CUPS prefixes. `-v` or `TECRASTER_LOG=debug`
//! enables debug output.

use clap::Parser;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read};
use std::path::PathBuf;

use tecraster::{
    CancelToken, LabelConfig, TecError, job,
    job::JobSummary,
    logging,
    printer::OptionSet,
    raster::RasterReader,
};

/// rastertotpcl - CUPS raster to TEC TPCL filter
#[derive(Parser, Debug)]
#[command(name = "rastertotpcl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// CUPS job ID
    #[arg(required_unless_present = "show_config")]
    job_id: Option<String>,

    /// User who submitted the job
    #[arg(required_unless_present = "show_config")]
    user: Option<String>,

    /// Job title
    #[arg(required_unless_present = "show_config")]
    title: Option<String>,

    /// Number of copies (copies are taken from the page header)
    #[arg(required_unless_present = "show_config")]
    copies: Option<String>,

    /// Job options (`key=value ...`)
    #[arg(required_unless_present = "show_config")]
    options: Option<String>,

    /// Raster file (defaults to stdin)
    file: Option<PathBuf>,

    /// PPD file with the printer defaults
    #[arg(long, env = "PPD", value_name = "FILE")]
    ppd: Option<PathBuf>,

    /// Also write every page as PNG into this directory
    #[arg(long, value_name = "DIR")]
    preview_png: Option<PathBuf>,

    /// Print the resolved label configuration as JSON and exit
    #[arg(long)]
    show_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), TecError> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut options = match &cli.ppd {
        Some(path) => OptionSet::load_ppd(path)?,
        None => {
            log::warn!("No PPD file given, using built-in defaults");
            OptionSet::new()
        }
    };
    if let Some(job_options) = &cli.options {
        options.apply_job_options(job_options);
    }
    let config = LabelConfig::from_options(&options)?;

    if cli.show_config {
        let json = serde_json::to_string_pretty(&config).map_err(io::Error::from)?;
        println!("{}", json);
        return Ok(());
    }

    log::debug!(
        "Job {} for {}: {:?}, {} option(s)",
        cli.job_id.as_deref().unwrap_or("-"),
        cli.user.as_deref().unwrap_or("-"),
        cli.title.as_deref().unwrap_or(""),
        options.len()
    );

    if let Some(dir) = &cli.preview_png {
        fs::create_dir_all(dir)?;
    }

    let cancel = CancelToken::from_sigterm()?;

    let summary = match &cli.file {
        Some(path) => {
            let file = File::open(path).inspect_err(|e| {
                log::error!("Unable to open raster file {}: {}", path.display(), e);
            })?;
            print_job(BufReader::new(file), &config, cancel, &cli)?
        }
        None => print_job(io::stdin().lock(), &config, cancel, &cli)?,
    };

    log::debug!(
        "{} page(s): {} completed, {} short, {} skipped{}",
        summary.pages,
        summary.completed,
        summary.short_reads,
        summary.skipped,
        if summary.canceled { ", canceled" } else { "" }
    );

    Ok(())
}

/// Run the job from a raster stream to stdout.
fn print_job<R: Read>(
    input: R,
    config: &LabelConfig,
    cancel: CancelToken,
    cli: &Cli,
) -> Result<JobSummary, TecError> {
    let mut source = RasterReader::new(input)?;
    let stdout = BufWriter::new(io::stdout().lock());
    job::run(
        &mut source,
        config,
        stdout,
        cancel,
        cli.preview_png.as_deref(),
    )
}
