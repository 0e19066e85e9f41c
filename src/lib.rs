//! # tecraster - CUPS Raster to TPCL Filter Library
//!
//! tecraster turns CUPS raster pages into TPCL, the command language of
//! Toshiba TEC label printers. It provides:
//!
//! - **Protocol implementation**: TPCL command builders
//! - **TOPIX compression**: sparse XOR-delta scanline encoding in bounded frames
//! - **Raster input**: streaming CUPS raster reader (v1, v2, v3)
//! - **Job control**: page state machine, `SIGTERM` cancellation, PPD options
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::io;
//! use tecraster::{
//!     job,
//!     printer::{LabelConfig, OptionSet},
//!     raster::RasterReader,
//!     session::CancelToken,
//! };
//!
//! // Printer defaults from the PPD, overridden by job options
//! let mut options = OptionSet::load_ppd("/etc/cups/ppd/tec.ppd")?;
//! options.apply_job_options("teGraphicsMode=1 Gap=3");
//! let config = LabelConfig::from_options(&options)?;
//!
//! // Raster on stdin, TPCL on stdout
//! let mut source = RasterReader::new(io::stdin().lock())?;
//! let cancel = CancelToken::from_sigterm()?;
//! job::run(&mut source, &config, io::stdout().lock(), cancel, None)?;
//!
//! # Ok::<(), tecraster::TecError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | TPCL commands, TOPIX encoder, frame buffering, run-length alphabet |
//! | [`session`] | Per-page state machine, geometry, trailer, cancellation |
//! | [`raster`] | CUPS raster stream reader |
//! | [`printer`] | PPD options and label configuration |
//! | [`job`] | Job driver |
//! | [`preview`] | PNG rendering of printed pages |
//! | [`logging`] | CUPS stderr log format |
//! | [`error`] | Error types |
//!
//! ## Supported Printers
//!
//! TEC printers that accept TPCL graphics (`SG`) commands, such as the
//! B-SX4, B-SX5, B-EX4 and B-SA4 families.

pub mod error;
pub mod job;
pub mod logging;
pub mod preview;
pub mod printer;
pub mod protocol;
pub mod raster;
pub mod session;

// Re-exports for convenience
pub use error::TecError;
pub use printer::LabelConfig;
pub use session::{CancelToken, PageSession};
