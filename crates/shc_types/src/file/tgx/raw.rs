//! Extraction of TGX files into raw directories and packing back.
//!
//! An extracted TGX resource is a directory holding the decoded canvas as
//! little-endian 16-bit pixels (`image.data`) plus the meta sidecar
//! describing it. Packing reverses the process and re-encodes the canvas.

use std::path::Path;

use crate::file::canvas::Canvas;
use crate::file::error::{MetaError, TgxError};
use crate::file::meta::{CURRENT_VERSION, MetaFile, RESOURCE_META_HEADER, Writer};
use crate::file::tgx::File;
use crate::file::tgx::coder::CoderConfig;
use crate::file::{META_FILE_NAME, RESOURCE_TYPE_KEY, RESOURCE_TYPE_TGX};

/// Sidecar identifier of the TGX resource description object.
pub const TGX_RESOURCE_IDENTIFIER: &str = "TgxResource";
/// Sidecar identifier of the TGX dimension header object.
pub const TGX_HEADER_IDENTIFIER: &str = "TgxHeader";

const SUPPORTED_VERSIONS: &[u32] = &[1];

const DATA_PATH_KEY: &str = "data path";
const DATA_SIZE_KEY: &str = "data size";
const TRANSPARENT_PIXEL_KEY: &str = "transparent pixel";

const DATA_FILE_NAME: &str = "image.data";

impl File {
	/// Extracts the resource into `folder`: the decoded canvas as a `.data`
	/// file plus the meta sidecar.
	///
	/// # Errors
	///
	/// Returns an error when the stream does not decode or the directory
	/// cannot be written.
	pub fn save_as_raw(
		&self,
		folder: impl AsRef<Path>,
		config: &CoderConfig,
	) -> Result<(), TgxError> {
		log::info!("Try saving TGX resource as raw folder.");
		let folder = folder.as_ref();
		std::fs::create_dir_all(folder)?;

		let canvas = self.decode(config)?;
		let data = canvas.to_le_bytes();
		std::fs::write(folder.join(DATA_FILE_NAME), &data)?;
		log::debug!("Wrote raw pixel data.");

		let mut writer = Writer::new();
		writer
			.start_object(RESOURCE_META_HEADER, CURRENT_VERSION)
			.map_entry(RESOURCE_TYPE_KEY, RESOURCE_TYPE_TGX);
		writer
			.start_object(TGX_RESOURCE_IDENTIFIER, CURRENT_VERSION)
			.map_entry(DATA_PATH_KEY, DATA_FILE_NAME)
			.map_entry(DATA_SIZE_KEY, data.len())
			.map_entry(
				TRANSPARENT_PIXEL_KEY,
				format!("{:#06x}", config.transparent_raw_color),
			);
		writer
			.start_object(TGX_HEADER_IDENTIFIER, CURRENT_VERSION)
			.commented_list_entry(self.width(), "width")
			.commented_list_entry(self.height(), "height");
		std::fs::write(folder.join(META_FILE_NAME), writer.finish())?;

		log::info!("Saved TGX resource as raw folder.");
		Ok(())
	}

	/// Rebuilds a TGX resource from a folder written by [`File::save_as_raw`].
	///
	/// The transparent pixel recorded in the sidecar takes precedence over
	/// the one in `config`, since it describes the raw data on disk.
	///
	/// # Errors
	///
	/// Returns an error when the sidecar is malformed, the raw data file
	/// does not match the recorded dimensions, or the canvas does not
	/// encode.
	pub fn load_from_raw(
		folder: impl AsRef<Path>,
		config: &CoderConfig,
	) -> Result<Self, TgxError> {
		log::info!("Try loading TGX resource from raw folder.");
		let folder = folder.as_ref();
		let meta = MetaFile::open(folder.join(META_FILE_NAME))?;

		let resource_type = meta.header().map_str(RESOURCE_TYPE_KEY)?;
		if resource_type != RESOURCE_TYPE_TGX {
			return Err(MetaError::UnexpectedObject {
				expected: RESOURCE_TYPE_TGX,
				found: resource_type.to_string(),
			}
			.into());
		}

		let resource = meta.object(0, TGX_RESOURCE_IDENTIFIER)?;
		resource.expect(TGX_RESOURCE_IDENTIFIER, SUPPORTED_VERSIONS)?;
		resource.expect_entry_counts(3, 0)?;
		let data_path = resource.map_str(DATA_PATH_KEY)?;
		let data_size: usize = resource.map_value(DATA_SIZE_KEY)?;
		let transparent_raw_color: u16 = resource.map_value(TRANSPARENT_PIXEL_KEY)?;

		let header = meta.object(1, TGX_HEADER_IDENTIFIER)?;
		header.expect(TGX_HEADER_IDENTIFIER, SUPPORTED_VERSIONS)?;
		header.expect_entry_counts(0, 2)?;
		let width: u32 = header.list_value(0)?;
		let height: u32 = header.list_value(1)?;

		let data = std::fs::read(folder.join(data_path))?;
		let expected = width as usize * height as usize * 2;
		if data.len() != expected || data.len() != data_size {
			return Err(TgxError::DataFileSize {
				expected,
				actual: data.len(),
			});
		}
		let canvas = Canvas::from_le_bytes(width as usize, height as usize, &data)?;

		let config = CoderConfig {
			transparent_raw_color,
			..*config
		};
		let file = Self::from_canvas(&canvas, &config)?;
		log::info!("Loaded TGX resource from raw folder.");
		Ok(file)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::file::tgx::coder::{self, ColorMode};

	fn sample_file(config: &CoderConfig) -> File {
		let mut canvas = Canvas::new(8, 5, config.transparent_raw_color);
		for i in 0..20 {
			canvas.pixels_mut()[i * 2] = 0x8000 | i as u16;
		}
		File::from_canvas(&canvas, config).unwrap()
	}

	#[test]
	fn test_raw_roundtrip_is_byte_identical() {
		let config = CoderConfig::default();
		let folder = tempfile::tempdir().unwrap();
		let file = sample_file(&config);

		file.save_as_raw(folder.path(), &config).unwrap();
		let packed = File::load_from_raw(folder.path(), &config).unwrap();
		assert_eq!(packed.to_bytes(), file.to_bytes());
	}

	#[test]
	fn test_pack_detects_wrong_data_size() {
		let config = CoderConfig::default();
		let folder = tempfile::tempdir().unwrap();
		sample_file(&config).save_as_raw(folder.path(), &config).unwrap();

		std::fs::write(folder.path().join(DATA_FILE_NAME), [0u8; 10]).unwrap();
		assert!(matches!(
			File::load_from_raw(folder.path(), &config),
			Err(TgxError::DataFileSize { .. })
		));
	}

	#[test]
	fn test_pack_rejects_foreign_resource_type() {
		let config = CoderConfig::default();
		let folder = tempfile::tempdir().unwrap();
		sample_file(&config).save_as_raw(folder.path(), &config).unwrap();

		let meta_path = folder.path().join(META_FILE_NAME);
		let text = std::fs::read_to_string(&meta_path).unwrap();
		std::fs::write(&meta_path, text.replace("= TGX", "= GM1")).unwrap();
		assert!(matches!(
			File::load_from_raw(folder.path(), &config),
			Err(TgxError::Meta(MetaError::UnexpectedObject { .. }))
		));
	}

	#[test]
	fn test_sidecar_transparency_governs_the_data() {
		// extract with a non-zero transparency marker, pack with defaults
		let config = CoderConfig {
			transparent_raw_color: 0x1111,
			..CoderConfig::default()
		};
		let mut canvas = Canvas::new(4, 2, 0x1111);
		canvas.pixels_mut()[0] = 0x8001;
		let file = File::from_canvas(&canvas, &config).unwrap();

		let folder = tempfile::tempdir().unwrap();
		file.save_as_raw(folder.path(), &config).unwrap();

		let packed = File::load_from_raw(folder.path(), &CoderConfig::default()).unwrap();
		assert_eq!(packed.to_bytes(), file.to_bytes());

		// the stream still decodes to the same canvas under the marker color
		let decoded = coder::analyze(packed.data(), 4, 2, ColorMode::Direct).unwrap();
		assert_eq!(decoded.transparent_pixel_count + decoded.unfinished_width_pixel_count, 7);
	}
}
