//! # Job Driver
//!
//! Runs a whole print job: job setup, then every page of the source through a
//! [`PageSession`].
//!
//! ```text
//! {WS|} [{AX..|}] [{RM..|}]             once
//! ┌ for each page ────────────────────────────────┐
//! │ PAGE: n 1        (stderr)                     │
//! │ begin_page ─► encode_line × height ─► end_page│
//! └───────────────────────────────────────────────┘
//! ```
//!
//! A page with unprintable geometry is logged and skipped. After a canceled
//! page no further pages are started.

use std::io::Write;
use std::path::Path;

use crate::error::TecError;
use crate::logging::PAGE_TARGET;
use crate::preview::PagePreview;
use crate::printer::LabelConfig;
use crate::raster::ScanlineSource;
use crate::session::{CancelToken, PageOutcome, PageSession};

/// Lines between progress messages.
const PROGRESS_INTERVAL: u32 = 16;

/// What happened to the pages of a job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobSummary {
    /// Pages found in the source
    pub pages: u32,
    pub completed: u32,
    pub short_reads: u32,
    /// Pages skipped for unprintable geometry
    pub skipped: u32,
    pub canceled: bool,
    /// Scanlines encoded over all pages
    pub lines: u64,
}

/// Print every page of `source` to `sink`.
///
/// When `preview_dir` is given, each printed page is also written there as
/// `page-N.png`.
///
/// ## Example
///
/// ```
/// use tecraster::job;
/// use tecraster::printer::LabelConfig;
/// use tecraster::raster::{Endian, PageHeader, RasterReader, RasterVersion};
/// use tecraster::session::CancelToken;
///
/// let header = PageHeader {
///     width: 8,
///     height: 1,
///     bits_per_color: 1,
///     bits_per_pixel: 1,
///     bytes_per_line: 1,
///     num_copies: 1,
///     ..Default::default()
/// };
/// let mut stream = RasterVersion::V3.sync(Endian::Big).to_vec();
/// stream.extend(header.to_bytes(Endian::Big));
/// stream.push(0xFF);
///
/// let mut source = RasterReader::new(stream.as_slice())?;
/// let mut out = Vec::new();
/// let summary = job::run(&mut source, &LabelConfig::default(), &mut out, CancelToken::new(), None)?;
///
/// assert_eq!(summary.completed, 1);
/// assert!(out.starts_with(b"{WS|}\n"));
/// # Ok::<(), tecraster::TecError>(())
/// ```
pub fn run<S, W>(
    source: &mut S,
    config: &LabelConfig,
    sink: W,
    cancel: CancelToken,
    preview_dir: Option<&Path>,
) -> Result<JobSummary, TecError>
where
    S: ScanlineSource,
    W: Write,
{
    let mut session = PageSession::new(sink, config.clone(), cancel.clone());
    session.sink_mut().write_all(&config.setup_commands())?;

    let mut summary = JobSummary::default();

    while let Some(header) = source.next_page()? {
        if cancel.is_canceled() {
            log::debug!("Job canceled, not starting another page");
            summary.canceled = true;
            break;
        }

        summary.pages += 1;
        let page = summary.pages;
        log::info!(target: PAGE_TARGET, "{} 1", page);

        let geometry = match session.begin_page(&header) {
            Ok(geometry) => geometry,
            Err(e) if e.is_page_local() => {
                log::error!("Skipping page {}: {}", page, e);
                summary.skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        let mut preview = preview_dir.map(|_| PagePreview::new(&geometry));
        let mut line = vec![0u8; geometry.bytes_per_line];

        for y in 0..geometry.height {
            if session.poll_cancel() {
                break;
            }
            if y % PROGRESS_INTERVAL == 0 {
                log::info!(
                    "Printing page {}, {}% complete...",
                    page,
                    u64::from(y) * 100 / u64::from(geometry.height)
                );
            }
            if !source.read_line(&mut line)? {
                break;
            }
            session.encode_line(&line, y)?;
            if let Some(preview) = preview.as_mut() {
                preview.push_line(&line);
            }
        }

        let outcome = session.end_page()?;
        match outcome {
            PageOutcome::Completed => {
                summary.completed += 1;
                summary.lines += u64::from(geometry.height);
            }
            PageOutcome::ShortRead { expected, received } => {
                log::warn!(
                    "Page {} ended after {} of {} lines",
                    page,
                    received,
                    expected
                );
                summary.short_reads += 1;
                summary.lines += u64::from(received);
            }
            PageOutcome::Canceled { received } => {
                log::info!("Page {} canceled after {} lines", page, received);
                summary.lines += u64::from(received);
                summary.canceled = true;
            }
        }

        if let (Some(preview), Some(dir)) = (preview, preview_dir) {
            preview.save_png(&dir.join(format!("page-{}.png", page)))?;
        }

        if summary.canceled {
            break;
        }
    }

    if summary.pages == 0 {
        return Err(TecError::Raster("No pages found".into()));
    }

    log::info!("Ready to print.");
    Ok(summary)
}
