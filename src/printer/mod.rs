//! # Printer Module
//!
//! Job configuration for TEC label printers.
//!
//! ## Modules
//!
//! - [`ppd`]: Marked option choices from the PPD and the job
//! - [`config`]: Typed label settings and job setup commands

pub mod config;
pub mod ppd;

pub use config::{GraphicsMode, LabelConfig, PrintMode};
pub use ppd::OptionSet;
