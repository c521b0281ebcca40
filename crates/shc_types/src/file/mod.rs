//! File format support for the `shc-rs` project.

mod canvas;
mod error;

pub mod gm1;
pub mod meta;
pub mod tgx;

/// Name of the meta sidecar file inside an extracted resource directory.
pub const META_FILE_NAME: &str = "resource.meta";

/// Sidecar header map key naming the extracted resource kind.
pub const RESOURCE_TYPE_KEY: &str = "resource type";
/// Resource kind value of extracted TGX files.
pub const RESOURCE_TYPE_TGX: &str = "TGX";
/// Resource kind value of extracted GM1 archives.
pub const RESOURCE_TYPE_GM1: &str = "GM1";

// Re-export unified error types
pub use error::{CoderError, Gm1Error, MetaError, TgxError};

// Re-export main file types
pub use canvas::Canvas;
pub use gm1::{
	File as Gm1File, GeneralInfo as Gm1GeneralInfo, Gm1Type, Header as Gm1Header,
	ImageEntry as Gm1ImageEntry, ImageHeader as Gm1ImageHeader, ImagePosition,
	ImageValidation as Gm1ImageValidation, TileObjectInfo as Gm1TileObjectInfo,
};
pub use meta::{MetaFile, Object as MetaObject, Writer as MetaWriter};
pub use tgx::File as TgxFile;
pub use tgx::coder::{ColorMode, CoderConfig, TgxAnalysis};
