//! `.tgx` standalone image file support.
//!
//! A TGX file is the simplest resource of the game: two little-endian
//! `u32` dimensions followed by a single TGX pixel stream reaching to the
//! end of the file. There is no palette and no sub-type.
//!
//! | Offset | Size | Field    |
//! |--------|------|----------|
//! | 0x00   | 4    | `width`  |
//! | 0x04   | 4    | `height` |
//! | 0x08   | ...  | stream   |

pub mod coder;
mod raw;

pub use raw::{TGX_HEADER_IDENTIFIER, TGX_RESOURCE_IDENTIFIER};

use crate::file::canvas::Canvas;
use crate::file::error::TgxError;
use crate::file::tgx::coder::{ColorMode, CoderConfig, TgxAnalysis};

/// File extension of standalone TGX images.
pub const FILE_EXTENSION: &str = "tgx";

/// Size of the fixed file header in bytes.
pub const HEADER_SIZE: usize = 8;

/// A loaded TGX file: the dimension header plus the raw pixel stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
	width: u32,
	height: u32,
	data: Vec<u8>,
}

impl File {
	/// Opens a TGX file from the specified path.
	///
	/// # Errors
	///
	/// Returns an error if the file cannot be read or is too small for the
	/// dimension header.
	pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, TgxError> {
		log::info!("Try loading provided TGX file.");
		let data = std::fs::read(path)?;
		let file = Self::from_bytes(&data)?;
		log::info!("Loaded TGX resource.");
		Ok(file)
	}

	/// Loads a TGX file from a byte slice.
	///
	/// The pixel stream is not validated here; TGX files carry no internal
	/// size information to check against. Use [`File::validate`].
	///
	/// # Errors
	///
	/// Returns [`TgxError::InsufficientData`] when the dimension header is
	/// incomplete.
	pub fn from_bytes(data: &[u8]) -> Result<Self, TgxError> {
		if data.len() < HEADER_SIZE {
			return Err(TgxError::InsufficientData {
				expected: HEADER_SIZE,
				actual: data.len(),
			});
		}
		Ok(Self {
			width: u32::from_le_bytes([data[0], data[1], data[2], data[3]]),
			height: u32::from_le_bytes([data[4], data[5], data[6], data[7]]),
			data: data[HEADER_SIZE..].to_vec(),
		})
	}

	/// Builds a TGX file by encoding a complete canvas.
	///
	/// # Errors
	///
	/// Returns an error when the encoder rejects the canvas.
	pub fn from_canvas(canvas: &Canvas, config: &CoderConfig) -> Result<Self, TgxError> {
		let data = coder::encode(
			canvas,
			0,
			0,
			canvas.width(),
			canvas.height(),
			ColorMode::Direct,
			config,
		)?;
		Ok(Self {
			width: canvas.width() as u32,
			height: canvas.height() as u32,
			data,
		})
	}

	/// Image width in pixels.
	pub fn width(&self) -> u32 {
		self.width
	}

	/// Image height in pixels.
	pub fn height(&self) -> u32 {
		self.height
	}

	/// The raw pixel stream after the dimension header.
	pub fn data(&self) -> &[u8] {
		&self.data
	}

	/// Serializes the file to bytes.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut bytes = Vec::with_capacity(HEADER_SIZE + self.data.len());
		bytes.extend_from_slice(&self.width.to_le_bytes());
		bytes.extend_from_slice(&self.height.to_le_bytes());
		bytes.extend_from_slice(&self.data);
		bytes
	}

	/// Saves the file to disk, creating missing parent directories.
	///
	/// The written file size is checked against the predicted resource size.
	/// On a mismatch the file is left in place for inspection and an error
	/// is returned.
	///
	/// # Errors
	///
	/// Returns an error if the file cannot be written or ends up with an
	/// unexpected size.
	pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), TgxError> {
		log::info!("Try saving TGX resource as TGX file.");
		let path = path.as_ref();
		if let Some(parent) = path.parent()
			&& !parent.as_os_str().is_empty()
		{
			std::fs::create_dir_all(parent)?;
		}
		let bytes = self.to_bytes();
		std::fs::write(path, &bytes)?;

		let written = std::fs::metadata(path)?.len();
		if written != bytes.len() as u64 {
			log::error!(
				"Saved TGX resource as TGX file, but saved file has not expected size. Might be corrupted."
			);
			return Err(TgxError::SavedSizeMismatch {
				expected: bytes.len() as u64,
				actual: written,
			});
		}
		log::info!("Saved TGX resource as TGX file.");
		Ok(())
	}

	/// Checks the pixel stream against the header dimensions and reports
	/// structural statistics.
	///
	/// # Errors
	///
	/// Returns the first structural defect of the stream.
	pub fn validate(&self, _config: &CoderConfig) -> Result<TgxAnalysis, TgxError> {
		log::info!("Try validating given resource.");
		let analysis = coder::analyze(
			&self.data,
			self.width as usize,
			self.height as usize,
			ColorMode::Direct,
		)?;
		log::info!("Validation completed successfully.");
		Ok(analysis)
	}

	/// Decodes the pixel stream onto a fresh canvas of the header dimensions.
	///
	/// # Errors
	///
	/// Returns the first structural defect of the stream.
	pub fn decode(&self, config: &CoderConfig) -> Result<Canvas, TgxError> {
		let mut canvas = Canvas::new(
			self.width as usize,
			self.height as usize,
			config.transparent_raw_color,
		);
		coder::decode_into(
			&self.data,
			self.width as usize,
			self.height as usize,
			ColorMode::Direct,
			&mut canvas,
			0,
			0,
		)?;
		Ok(canvas)
	}
}

impl std::fmt::Display for File {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"TGX File: {}x{} pixels, {} stream bytes",
			self.width,
			self.height,
			self.data.len()
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_byte_roundtrip() {
		let bytes = [
			0x02, 0x00, 0x00, 0x00, // width 2
			0x01, 0x00, 0x00, 0x00, // height 1
			0x01, 0x34, 0x12, 0x56, 0x34, 0x80, // stream
		];
		let file = File::from_bytes(&bytes).unwrap();
		assert_eq!(file.width(), 2);
		assert_eq!(file.height(), 1);
		assert_eq!(file.data().len(), 6);
		assert_eq!(file.to_bytes(), bytes);
	}

	#[test]
	fn test_too_small_file() {
		assert!(matches!(
			File::from_bytes(&[0; 7]),
			Err(TgxError::InsufficientData { expected: 8, actual: 7 })
		));
	}

	#[test]
	fn test_validate_reports_stream_defects() {
		let file = File::from_bytes(&[1, 0, 0, 0, 1, 0, 0, 0, 0x01, 0x34]).unwrap();
		assert!(matches!(
			file.validate(&CoderConfig::default()),
			Err(TgxError::Coder(crate::file::error::CoderError::InvalidDataSize))
		));
	}

	#[test]
	fn test_canvas_roundtrip() {
		let config = CoderConfig::default();
		let mut canvas = Canvas::new(6, 4, config.transparent_raw_color);
		for i in 0..12 {
			canvas.pixels_mut()[i * 2] = 0x8000 | i as u16;
		}

		let file = File::from_canvas(&canvas, &config).unwrap();
		let analysis = file.validate(&config).unwrap();
		assert_eq!(analysis.newline_marker_count, 4);

		assert_eq!(file.decode(&config).unwrap(), canvas);
	}
}
