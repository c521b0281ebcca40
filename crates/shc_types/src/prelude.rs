//! Prelude module for `shc_types`.
//!
//! This module provides a convenient way to import commonly used types,
//! traits, and constants.
//!
//! # Examples
//!
//! ```no_run
//! use shc_types::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CoderConfig::default();
//! let archive = Gm1File::open("anim_archer.gm1")?;
//! let canvas = archive.decode_image(0, &config)?;
//! # Ok(())
//! # }
//! ```

// File module types
#[doc(inline)]
pub use crate::file::{
	// Canvas and coder configuration
	Canvas,
	CoderConfig,
	CoderError,
	ColorMode,

	// GM1 types
	Gm1Error,
	Gm1File,
	Gm1GeneralInfo,
	Gm1Header,
	Gm1ImageEntry,
	Gm1ImageHeader,
	Gm1ImageValidation,
	Gm1TileObjectInfo,
	Gm1Type,
	ImagePosition,

	// Meta sidecar types
	MetaError,
	MetaFile,
	MetaObject,
	MetaWriter,

	// TGX types
	TgxAnalysis,
	TgxError,
	TgxFile,
};

// Re-export the file module for advanced usage
#[doc(inline)]
pub use crate::file;
