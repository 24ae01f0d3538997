//! # tagline-patch
//!
//! Replace a byte range inside an existing file without rewriting the
//! parts that do not change, while deferring SIGINT until the file is
//! consistent again.
//!
//! ## Example
//! ```rust,no_run
//! use std::path::Path;
//! use tagline_patch::{replace_region, PatchOptions, Strategy};
//!
//! // Swap a 1 KiB header for a 2 KiB one, building the result in a
//! // temporary file that is renamed over the original.
//! let options = PatchOptions::with_strategy(Strategy::CopyViaTemp);
//! replace_region(Path::new("song.mp3"), 0, 1024, &[0u8; 2048], &options).unwrap();
//! ```

pub mod error;
pub mod interrupt;
pub mod replace;

pub use error::{PatchError, Result};
pub use interrupt::defer_interrupts;
pub use replace::{replace_region, replace_region_in_file, PatchOptions, Strategy, DEFAULT_BUFFER_SIZE};
