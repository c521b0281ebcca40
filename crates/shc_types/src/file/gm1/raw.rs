//! Extraction of GM1 archives into raw directories and packing back.
//!
//! An extracted archive is a directory holding one `.data` canvas per image,
//! the ten header palettes as `.palette` files and the meta sidecar tying
//! everything together. Packing re-encodes every canvas with the coder of
//! the archive sub-type, concatenates the payloads and recomputes the
//! offset and size tables, so the offsets recorded at extract time are
//! advisory only.

use std::path::Path;

use crate::file::canvas::Canvas;
use crate::file::error::{Gm1Error, MetaError};
use crate::file::gm1::header::{
	HEADER_SCALAR_COUNT, Header, PALETTE_BYTE_SIZE, PALETTE_COUNT, PALETTE_ENTRIES,
};
use crate::file::gm1::image::{GeneralInfo, ImageEntry, ImageHeader, ImagePosition, TileObjectInfo};
use crate::file::gm1::{File, Gm1Type, encode_image, image_canvas_dimensions};
use crate::file::meta::{CURRENT_VERSION, MetaFile, Object, RESOURCE_META_HEADER, Writer};
use crate::file::tgx::coder::CoderConfig;
use crate::file::{META_FILE_NAME, RESOURCE_TYPE_GM1, RESOURCE_TYPE_KEY};

/// Sidecar identifier of the archive description object.
pub const GM1_RESOURCE_IDENTIFIER: &str = "Gm1Resource";
/// Sidecar identifier of the archive header object.
pub const GM1_HEADER_IDENTIFIER: &str = "Gm1HeaderMeta";
/// Sidecar identifier of a per-image header object.
pub const GM1_IMAGE_HEADER_IDENTIFIER: &str = "Gm1ImageHeader";
/// Sidecar identifier of a tile object info object.
pub const GM1_TILE_OBJECT_IMAGE_INFO_IDENTIFIER: &str = "Gm1TileObjectImageInfo";
/// Sidecar identifier of a general info object.
pub const GM1_GENERAL_IMAGE_INFO_IDENTIFIER: &str = "Gm1GeneralImageInfo";

const SUPPORTED_VERSIONS: &[u32] = &[1];

const IMAGE_PATH_PREFIX_KEY: &str = "image data path prefix";
const PALETTE_PATH_PREFIX_KEY: &str = "palette path prefix";
const RESOURCE_SIZE_KEY: &str = "resource size";
const TRANSPARENT_PIXEL_KEY: &str = "transparent pixel";
const CANVAS_WIDTH_KEY: &str = "canvas width";
const CANVAS_HEIGHT_KEY: &str = "canvas height";

const OFFSET_KEY: &str = "data offset";
const SIZE_KEY: &str = "data size";

const IMAGE_PATH_PREFIX: &str = "image";
const PALETTE_PATH_PREFIX: &str = "palette";

fn image_file_name(prefix: &str, index: usize) -> String {
	format!("{prefix}_{index:03}.data")
}

fn palette_file_name(prefix: &str, index: usize) -> String {
	format!("{prefix}_{index}.palette")
}

impl File {
	/// Extracts the archive into `folder`: every image as a decoded `.data`
	/// canvas, the palettes as `.palette` files, plus the meta sidecar.
	///
	/// # Errors
	///
	/// Returns an error when an image does not decode or the directory
	/// cannot be written.
	pub fn save_as_raw(
		&self,
		folder: impl AsRef<Path>,
		config: &CoderConfig,
	) -> Result<(), Gm1Error> {
		log::info!("Try saving GM1 resource as raw folder.");
		let folder = folder.as_ref();
		std::fs::create_dir_all(folder)?;

		for (index, palette) in self.header().palettes.iter().enumerate() {
			let mut bytes = Vec::with_capacity(PALETTE_BYTE_SIZE);
			for color in palette {
				bytes.extend_from_slice(&color.to_le_bytes());
			}
			std::fs::write(folder.join(palette_file_name(PALETTE_PATH_PREFIX, index)), bytes)?;
		}
		log::debug!("Wrote palette files.");

		let mut writer = Writer::new();
		writer
			.start_object(RESOURCE_META_HEADER, CURRENT_VERSION)
			.map_entry(RESOURCE_TYPE_KEY, RESOURCE_TYPE_GM1);
		writer
			.start_object(GM1_RESOURCE_IDENTIFIER, CURRENT_VERSION)
			.map_entry(IMAGE_PATH_PREFIX_KEY, IMAGE_PATH_PREFIX)
			.map_entry(PALETTE_PATH_PREFIX_KEY, PALETTE_PATH_PREFIX)
			.map_entry(RESOURCE_SIZE_KEY, self.resource_size())
			.map_entry(
				TRANSPARENT_PIXEL_KEY,
				format!("{:#06x}", config.transparent_raw_color),
			)
			.map_entry(CANVAS_WIDTH_KEY, self.header().width)
			.map_entry(CANVAS_HEIGHT_KEY, self.header().height);

		log::debug!("Write Gm1Header info object to meta file.");
		writer.start_object(GM1_HEADER_IDENTIFIER, CURRENT_VERSION);
		for (name, value) in self.header().scalars() {
			writer.commented_list_entry(value, name);
		}

		for index in 0..self.images().len() {
			let canvas = self.decode_image(index, config)?;
			let data_file = image_file_name(IMAGE_PATH_PREFIX, index);
			std::fs::write(folder.join(&data_file), canvas.to_le_bytes())?;

			let entry = &self.images()[index];
			log::debug!("Write Gm1ImageHeader object to meta file.");
			writer
				.start_object(GM1_IMAGE_HEADER_IDENTIFIER, CURRENT_VERSION)
				.map_entry(OFFSET_KEY, self.offsets()[index])
				.map_entry(SIZE_KEY, self.sizes()[index])
				.commented_list_entry(entry.header.width, "width")
				.commented_list_entry(entry.header.height, "height")
				.commented_list_entry(entry.header.offset_x, "offset x")
				.commented_list_entry(entry.header.offset_y, "offset y");

			if self.header().gm1_type == Gm1Type::TilesObject {
				let info = TileObjectInfo::from_entry(entry, index)?;
				log::debug!("Write Gm1TileObjectImageInfo object to meta file.");
				writer
					.start_object(GM1_TILE_OBJECT_IMAGE_INFO_IDENTIFIER, CURRENT_VERSION)
					.commented_list_entry(info.image_part, "image part")
					.commented_list_entry(info.sub_parts, "sub parts")
					.commented_list_entry(info.tile_offset, "tile offset")
					.commented_list_entry(info.image_position as u8, "image position")
					.commented_list_entry(info.image_offset_x, "image offset x")
					.commented_list_entry(info.image_width, "image width")
					.commented_list_entry(info.animated_color, "animated color");
			} else {
				let info = GeneralInfo::from_entry(entry);
				log::debug!("Write Gm1GeneralImageInfo object to meta file.");
				writer
					.start_object(GM1_GENERAL_IMAGE_INFO_IDENTIFIER, CURRENT_VERSION)
					.commented_list_entry(info.relative_data_pos, "relative data position")
					.commented_list_entry(info.font_related_size, "font related size")
					.commented_list_entry(info.unknown_0x4, "unknown 0x4")
					.commented_list_entry(info.unknown_0x5, "unknown 0x5")
					.commented_list_entry(info.unknown_0x6, "unknown 0x6")
					.commented_list_entry(info.flags, "flags");
			}
		}

		std::fs::write(folder.join(META_FILE_NAME), writer.finish())?;
		log::info!("Saved GM1 resource as raw folder.");
		Ok(())
	}

	/// Rebuilds a GM1 archive from a folder written by [`File::save_as_raw`].
	///
	/// Every canvas is re-encoded with the coder of the archive sub-type;
	/// the offset and size tables and the header data size are recomputed
	/// from the fresh payloads. The transparent pixel recorded in the
	/// sidecar takes precedence over the one in `config`.
	///
	/// # Errors
	///
	/// Returns an error when the sidecar is malformed, a data or palette
	/// file does not match its recorded shape, or a canvas does not encode.
	pub fn load_from_raw(
		folder: impl AsRef<Path>,
		config: &CoderConfig,
	) -> Result<Self, Gm1Error> {
		log::info!("Try loading GM1 resource from raw folder.");
		let folder = folder.as_ref();
		let meta = MetaFile::open(folder.join(META_FILE_NAME))?;

		let resource_type = meta.header().map_str(RESOURCE_TYPE_KEY)?;
		if resource_type != RESOURCE_TYPE_GM1 {
			return Err(MetaError::UnexpectedObject {
				expected: RESOURCE_TYPE_GM1,
				found: resource_type.to_string(),
			}
			.into());
		}

		let resource = meta.object(0, GM1_RESOURCE_IDENTIFIER)?;
		resource.expect(GM1_RESOURCE_IDENTIFIER, SUPPORTED_VERSIONS)?;
		resource.expect_entry_counts(6, 0)?;
		let image_prefix = resource.map_str(IMAGE_PATH_PREFIX_KEY)?.to_string();
		let palette_prefix = resource.map_str(PALETTE_PATH_PREFIX_KEY)?.to_string();
		let recorded_resource_size: usize = resource.map_value(RESOURCE_SIZE_KEY)?;
		let transparent_raw_color: u16 = resource.map_value(TRANSPARENT_PIXEL_KEY)?;
		let _canvas_width: u32 = resource.map_value(CANVAS_WIDTH_KEY)?;
		let _canvas_height: u32 = resource.map_value(CANVAS_HEIGHT_KEY)?;

		let mut header = read_header_meta(meta.object(1, GM1_HEADER_IDENTIFIER)?)?;
		for index in 0..PALETTE_COUNT {
			let path = folder.join(palette_file_name(&palette_prefix, index));
			let bytes = std::fs::read(path)?;
			if bytes.len() != PALETTE_BYTE_SIZE {
				log::error!("Provided palette has not the fitting size.");
				return Err(Gm1Error::PaletteFileSize {
					index,
					expected: PALETTE_BYTE_SIZE,
					actual: bytes.len(),
				});
			}
			for (entry_index, pair) in bytes.chunks_exact(2).enumerate() {
				header.palettes[index][entry_index] = u16::from_le_bytes([pair[0], pair[1]]);
			}
		}
		log::debug!("Loaded palette files.");

		let picture_count = header.picture_count as usize;
		let image_objects = meta.objects().len().saturating_sub(2);
		if image_objects != picture_count * 2 {
			return Err(Gm1Error::PictureCountMismatch {
				header: header.picture_count,
				actual: image_objects / 2,
			});
		}

		let pack_config = CoderConfig {
			transparent_raw_color,
			..*config
		};

		let mut offsets = Vec::with_capacity(picture_count);
		let mut sizes = Vec::with_capacity(picture_count);
		let mut images = Vec::with_capacity(picture_count);
		let mut data = Vec::new();
		for index in 0..picture_count {
			let (entry, recorded_size) = read_image_meta(&meta, index, header.gm1_type)?;

			let (canvas_width, canvas_height) =
				image_canvas_dimensions(header.gm1_type, &entry, index)?;
			let path = folder.join(image_file_name(&image_prefix, index));
			let bytes = std::fs::read(path)?;
			let expected = canvas_width * canvas_height * 2;
			if bytes.len() != expected {
				return Err(Gm1Error::DataFileSize {
					index,
					expected,
					actual: bytes.len(),
				});
			}
			let canvas = Canvas::from_le_bytes(canvas_width, canvas_height, &bytes)
				.map_err(|source| Gm1Error::ImageCoder { index, source })?;

			let payload = encode_image(header.gm1_type, &entry, index, &canvas, &pack_config)?;
			if payload.len() as u32 != recorded_size {
				log::debug!(
					"Image {index} re-encoded to {} bytes instead of the recorded {recorded_size}.",
					payload.len()
				);
			}
			offsets.push(data.len() as u32);
			sizes.push(payload.len() as u32);
			images.push(entry);
			data.extend_from_slice(&payload);
		}

		let file = Self::from_parts(header, offsets, sizes, images, data);
		if file.resource_size() != recorded_resource_size {
			log::debug!(
				"Rebuilt resource has {} bytes instead of the recorded {recorded_resource_size}.",
				file.resource_size()
			);
		}
		log::info!("Loaded GM1 resource from raw folder.");
		Ok(file)
	}
}

fn read_header_meta(object: &Object) -> Result<Header, Gm1Error> {
	log::debug!("Read Gm1Header info object from meta file.");
	object.expect(GM1_HEADER_IDENTIFIER, SUPPORTED_VERSIONS)?;
	object.expect_entry_counts(0, HEADER_SCALAR_COUNT)?;

	let mut scalars = [0u32; HEADER_SCALAR_COUNT];
	for (index, scalar) in scalars.iter_mut().enumerate() {
		*scalar = object.list_value(index)?;
	}
	Header::from_scalars(scalars, [[0u16; PALETTE_ENTRIES]; PALETTE_COUNT])
}

fn read_image_meta(
	meta: &MetaFile,
	index: usize,
	gm1_type: Gm1Type,
) -> Result<(ImageEntry, u32), Gm1Error> {
	log::debug!("Read Gm1ImageHeader object from meta file.");
	let object = meta.object(2 + index * 2, GM1_IMAGE_HEADER_IDENTIFIER)?;
	object.expect(GM1_IMAGE_HEADER_IDENTIFIER, SUPPORTED_VERSIONS)?;
	object.expect_entry_counts(2, 4)?;
	let _recorded_offset: u32 = object.map_value(OFFSET_KEY)?;
	let recorded_size: u32 = object.map_value(SIZE_KEY)?;
	let header = ImageHeader {
		width: object.list_value(0)?,
		height: object.list_value(1)?,
		offset_x: object.list_value(2)?,
		offset_y: object.list_value(3)?,
	};

	let info_object = meta.object(3 + index * 2, GM1_GENERAL_IMAGE_INFO_IDENTIFIER)?;
	let info = if gm1_type == Gm1Type::TilesObject {
		log::debug!("Read Gm1TileObjectImageInfo object from meta file.");
		info_object.expect(GM1_TILE_OBJECT_IMAGE_INFO_IDENTIFIER, SUPPORTED_VERSIONS)?;
		info_object.expect_entry_counts(0, 7)?;
		let position_value: u8 = info_object.list_value(3)?;
		TileObjectInfo {
			image_part: info_object.list_value(0)?,
			sub_parts: info_object.list_value(1)?,
			tile_offset: info_object.list_value(2)?,
			image_position: ImagePosition::try_from(position_value)
				.map_err(|value| Gm1Error::InvalidImagePosition { index, value })?,
			image_offset_x: info_object.list_value(4)?,
			image_width: info_object.list_value(5)?,
			animated_color: info_object.list_value(6)?,
		}
		.to_info()
	} else {
		log::debug!("Read Gm1GeneralImageInfo object from meta file.");
		info_object.expect(GM1_GENERAL_IMAGE_INFO_IDENTIFIER, SUPPORTED_VERSIONS)?;
		info_object.expect_entry_counts(0, 6)?;
		GeneralInfo {
			relative_data_pos: info_object.list_value(0)?,
			font_related_size: info_object.list_value(1)?,
			unknown_0x4: info_object.list_value(2)?,
			unknown_0x5: info_object.list_value(3)?,
			unknown_0x6: info_object.list_value(4)?,
			flags: info_object.list_value(5)?,
		}
		.to_info()
	};

	Ok((ImageEntry { header, info }, recorded_size))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::file::gm1::header::HEADER_SIZE;
	use crate::file::gm1::{IMAGE_TABLE_ENTRY_SIZE, tile};

	fn test_header(gm1_type: u32, width: u32, height: u32) -> Header {
		let mut scalars = [0u32; HEADER_SCALAR_COUNT];
		scalars[0] = 0xDEAD;
		scalars[5] = gm1_type;
		scalars[12] = width;
		scalars[13] = height;
		scalars[21] = 0xBEEF;
		let mut palettes = [[0u16; PALETTE_ENTRIES]; PALETTE_COUNT];
		for (palette_index, palette) in palettes.iter_mut().enumerate() {
			for (entry_index, entry) in palette.iter_mut().enumerate() {
				*entry = (palette_index * 256 + entry_index) as u16;
			}
		}
		Header::from_scalars(scalars, palettes).unwrap()
	}

	fn build_archive(header: Header, entries: Vec<(ImageEntry, Canvas)>) -> File {
		let config = CoderConfig::default();
		let mut offsets = Vec::new();
		let mut sizes = Vec::new();
		let mut images = Vec::new();
		let mut data = Vec::new();
		for (index, (entry, canvas)) in entries.into_iter().enumerate() {
			let payload = encode_image(header.gm1_type, &entry, index, &canvas, &config).unwrap();
			offsets.push(data.len() as u32);
			sizes.push(payload.len() as u32);
			images.push(entry);
			data.extend_from_slice(&payload);
		}
		File::from_parts(header, offsets, sizes, images, data)
	}

	fn general_entry(width: u16, height: u16) -> ImageEntry {
		ImageEntry {
			header: ImageHeader {
				width,
				height,
				offset_x: 3,
				offset_y: 1,
			},
			info: [1, 0, 16, 0, 7, 8, 9, 2],
		}
	}

	fn animation_archive() -> File {
		let mut entries = Vec::new();
		for frame in 0..3u16 {
			let mut canvas = Canvas::new(6, 4, 0);
			for i in 0..10 {
				canvas.pixels_mut()[i] = 0xFF00 | (frame * 32 + i as u16);
			}
			entries.push((general_entry(6, 4), canvas));
		}
		build_archive(test_header(2, 6, 4), entries)
	}

	fn tile_object_archive() -> File {
		let tile_bytes: Vec<u8> =
			(0..256u16).flat_map(|value| (0x8000 | value).to_le_bytes()).collect();

		// one image with an image part, one with the bare tile
		let with_image = ImageEntry {
			header: ImageHeader {
				width: 30,
				height: 25,
				offset_x: 0,
				offset_y: 0,
			},
			info: TileObjectInfo {
				image_part: 0,
				sub_parts: 2,
				tile_offset: 2,
				image_position: ImagePosition::UpperLeft,
				image_offset_x: 1,
				image_width: 24,
				animated_color: 0,
			}
			.to_info(),
		};
		let (width, height) =
			image_canvas_dimensions(Gm1Type::TilesObject, &with_image, 0).unwrap();
		let mut first_canvas = Canvas::new(width, height, 0);
		for y in 0..9 {
			for x in 1..25 {
				first_canvas.pixels_mut()[x + y * width] = 0x8000 | (x + y * 31) as u16;
			}
		}
		tile::decode_tile(&tile_bytes, &mut first_canvas, 0, 9).unwrap();

		let tile_only = ImageEntry {
			header: ImageHeader {
				width: 30,
				height: 16,
				offset_x: 0,
				offset_y: 0,
			},
			info: TileObjectInfo {
				image_part: 1,
				sub_parts: 2,
				tile_offset: 0,
				image_position: ImagePosition::None,
				image_offset_x: 0,
				image_width: 0,
				animated_color: 0,
			}
			.to_info(),
		};
		let mut second_canvas = Canvas::new(tile::TILE_WIDTH, tile::TILE_HEIGHT, 0);
		tile::decode_tile(&tile_bytes, &mut second_canvas, 0, 0).unwrap();

		build_archive(
			test_header(3, 0, 0),
			vec![(with_image, first_canvas), (tile_only, second_canvas)],
		)
	}

	#[test]
	fn test_animation_raw_roundtrip_is_byte_identical() {
		let config = CoderConfig::default();
		let folder = tempfile::tempdir().unwrap();
		let file = animation_archive();

		file.save_as_raw(folder.path(), &config).unwrap();
		let packed = File::load_from_raw(folder.path(), &config).unwrap();
		assert_eq!(packed.to_bytes(), file.to_bytes());
	}

	#[test]
	fn test_tile_object_raw_roundtrip_is_byte_identical() {
		let config = CoderConfig::default();
		let folder = tempfile::tempdir().unwrap();
		let file = tile_object_archive();

		file.save_as_raw(folder.path(), &config).unwrap();
		let packed = File::load_from_raw(folder.path(), &config).unwrap();
		assert_eq!(packed.to_bytes(), file.to_bytes());
	}

	#[test]
	fn test_uncompressed_raw_roundtrip_is_byte_identical() {
		let config = CoderConfig::default();
		let mut canvas = Canvas::new(5, 6, 0);
		for i in 0..20 {
			canvas.pixels_mut()[i] = 0x8000 | i as u16;
		}
		let file = build_archive(test_header(7, 0, 0), vec![(general_entry(5, 6), canvas)]);

		let folder = tempfile::tempdir().unwrap();
		file.save_as_raw(folder.path(), &config).unwrap();
		let packed = File::load_from_raw(folder.path(), &config).unwrap();
		assert_eq!(packed.to_bytes(), file.to_bytes());
	}

	#[test]
	fn test_extracted_files_are_complete() {
		let config = CoderConfig::default();
		let folder = tempfile::tempdir().unwrap();
		let file = animation_archive();
		file.save_as_raw(folder.path(), &config).unwrap();

		assert!(folder.path().join(META_FILE_NAME).is_file());
		for index in 0..PALETTE_COUNT {
			let palette = folder.path().join(palette_file_name(PALETTE_PATH_PREFIX, index));
			assert_eq!(std::fs::metadata(palette).unwrap().len(), PALETTE_BYTE_SIZE as u64);
		}
		for index in 0..3 {
			let data = folder.path().join(image_file_name(IMAGE_PATH_PREFIX, index));
			assert_eq!(std::fs::metadata(data).unwrap().len(), 6 * 4 * 2);
		}
	}

	#[test]
	fn test_pack_detects_missing_image_objects() {
		let config = CoderConfig::default();
		let folder = tempfile::tempdir().unwrap();
		animation_archive().save_as_raw(folder.path(), &config).unwrap();

		let meta_path = folder.path().join(META_FILE_NAME);
		let text = std::fs::read_to_string(&meta_path).unwrap();
		let objects: Vec<&str> = text.split("\n\n").collect();
		// drop the last image header/info pair
		std::fs::write(&meta_path, objects[..objects.len() - 2].join("\n\n")).unwrap();

		assert!(matches!(
			File::load_from_raw(folder.path(), &config),
			Err(Gm1Error::PictureCountMismatch { header: 3, actual: 2 })
		));
	}

	#[test]
	fn test_pack_detects_bad_palette_file() {
		let config = CoderConfig::default();
		let folder = tempfile::tempdir().unwrap();
		animation_archive().save_as_raw(folder.path(), &config).unwrap();

		std::fs::write(folder.path().join(palette_file_name(PALETTE_PATH_PREFIX, 4)), [0u8; 100])
			.unwrap();
		assert!(matches!(
			File::load_from_raw(folder.path(), &config),
			Err(Gm1Error::PaletteFileSize { index: 4, expected: 512, actual: 100 })
		));
	}

	#[test]
	fn test_pack_detects_bad_data_file() {
		let config = CoderConfig::default();
		let folder = tempfile::tempdir().unwrap();
		animation_archive().save_as_raw(folder.path(), &config).unwrap();

		std::fs::write(folder.path().join(image_file_name(IMAGE_PATH_PREFIX, 1)), [0u8; 10])
			.unwrap();
		assert!(matches!(
			File::load_from_raw(folder.path(), &config),
			Err(Gm1Error::DataFileSize { index: 1, expected: 48, actual: 10 })
		));
	}

	#[test]
	fn test_resource_size_matches_layout() {
		let file = animation_archive();
		assert_eq!(
			file.resource_size(),
			HEADER_SIZE + 3 * IMAGE_TABLE_ENTRY_SIZE + file.data().len()
		);
	}
}
