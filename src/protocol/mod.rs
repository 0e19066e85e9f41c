//! # TPCL Protocol Implementation
//!
//! This module provides low-level command builders and graphics encoders for
//! the TPCL protocol used by Toshiba TEC label printers.
//!
//! ## Module Structure
//!
//! - [`commands`]: Text commands (`{WS|}`, `{D...|}`, `{SG;...`, `{XS;...|}`)
//! - [`topix`]: TOPIX sparse delta line encoder
//! - [`framer`]: Length-prefixed TOPIX frames with overflow avoidance
//! - [`run_length`]: Run-length alphabet for hex graphics
//!
//! ## Usage Example
//!
//! ```
//! use tecraster::protocol::{commands, framer::ChunkFramer, topix::TopixEncoder};
//!
//! let mut data = Vec::new();
//! data.extend(commands::label_size(520, 760, 500, 780));
//! data.extend(commands::clear_image_buffer());
//!
//! // Two 64-dot lines, TOPIX compressed into one frame
//! let mut encoder = TopixEncoder::new(8);
//! let mut framer = ChunkFramer::new(64);
//! encoder.encode_line(&[0xFF; 8], framer.buffer_mut());
//! encoder.encode_line(&[0xFF; 8], framer.buffer_mut());
//! framer.flush(&mut data, 0)?;
//!
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod commands;
pub mod framer;
pub mod run_length;
pub mod topix;
