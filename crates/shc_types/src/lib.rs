//! This crate provides core data types and file format support for the `shc-rs` project.
//!
//! # File Formats
//!
//! - **TGX**: Standalone run-length-encoded images (dimension header plus pixel stream)
//! - **GM1**: Archives bundling many images behind a shared header and ten palettes
//! - **Resource meta**: Line-oriented text sidecars describing extracted resources
//!
//! # Examples
//!
//! ```no_run
//! use shc_types::file::{CoderConfig, Gm1File, TgxFile};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CoderConfig::default();
//!
//! let image = TgxFile::open("frontend_main.tgx")?;
//! let analysis = image.validate(&config)?;
//! println!("{analysis}");
//!
//! let archive = Gm1File::open("tile_castle.gm1")?;
//! archive.validate(&config)?;
//! archive.save_as_raw("tile_castle_raw", &config)?;
//! # Ok(())
//! # }
//! ```

pub mod file;

/// `use shc_types::prelude::*;` to import commonly used items.
pub mod prelude;

// Re-export commonly used file types at crate root for convenience
pub use file::{
	Canvas, CoderConfig, CoderError, ColorMode, Gm1Error, Gm1File, Gm1Type, MetaError, MetaFile,
	TgxAnalysis, TgxError, TgxFile,
};
