//! `.gm1` archive file support.
//!
//! A GM1 archive bundles many images behind a fixed header:
//!
//! | Region            | Size                     |
//! |-------------------|--------------------------|
//! | Header + palettes | 5208 bytes               |
//! | Image offsets     | `picture_count` × 4      |
//! | Image sizes       | `picture_count` × 4      |
//! | Image headers     | `picture_count` × 16     |
//! | Image data blob   | `header.data_size` bytes |
//!
//! The archive sub-type selects the coder for every image payload: TGX
//! streams (interface, font, constant size), indexed TGX streams against
//! the header palettes (animations), a 512-byte tile plus an optional TGX
//! stream (tile objects), or plain pixel rows (both uncompressed variants).

pub mod header;
pub mod image;
mod raw;
pub mod tile;
pub mod uncompressed;

pub use header::{Gm1Type, HEADER_SIZE, Header};
pub use image::{GeneralInfo, IMAGE_ENTRY_SIZE, ImageEntry, ImageHeader, ImagePosition, TileObjectInfo};
pub use raw::{
	GM1_GENERAL_IMAGE_INFO_IDENTIFIER, GM1_HEADER_IDENTIFIER, GM1_IMAGE_HEADER_IDENTIFIER,
	GM1_RESOURCE_IDENTIFIER, GM1_TILE_OBJECT_IMAGE_INFO_IDENTIFIER,
};

use crate::file::canvas::Canvas;
use crate::file::error::Gm1Error;
use crate::file::tgx::coder::{self, ColorMode, CoderConfig, TgxAnalysis};

/// File extension of GM1 archives.
pub const FILE_EXTENSION: &str = "gm1";

/// Per-image bytes spent on the offset, size and header tables.
pub const IMAGE_TABLE_ENTRY_SIZE: usize = 4 + 4 + IMAGE_ENTRY_SIZE;

/// Outcome of validating a single image payload.
#[derive(Debug, Clone, Copy)]
pub struct ImageValidation {
	/// Index of the image in the archive.
	pub index: usize,
	/// Stream statistics of the TGX part, for sub-types that carry one.
	pub analysis: Option<TgxAnalysis>,
}

/// A loaded GM1 archive.
///
/// The resource owns all of its bytes; the four table regions are parsed
/// into their own vectors and the image data blob stays contiguous, indexed
/// through the offset and size tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
	header: Header,
	offsets: Vec<u32>,
	sizes: Vec<u32>,
	images: Vec<ImageEntry>,
	data: Vec<u8>,
}

impl File {
	/// Opens a GM1 archive from the specified path.
	///
	/// # Errors
	///
	/// Returns an error if the file cannot be read or its structure is
	/// inconsistent.
	pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, Gm1Error> {
		log::info!("Try loading GM1 file.");
		let data = std::fs::read(path)?;
		let file = Self::from_bytes(&data)?;
		log::info!("Loaded GM1 resource.");
		Ok(file)
	}

	/// Loads a GM1 archive from a byte slice.
	///
	/// Individual images are not checked here; use [`File::validate`].
	///
	/// # Errors
	///
	/// Returns [`Gm1Error::InsufficientData`] for truncated headers,
	/// [`Gm1Error::UnknownType`] for unknown sub-type tags and
	/// [`Gm1Error::BodySizeMismatch`] when the header data size does not
	/// match the file body.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self, Gm1Error> {
		log::debug!("Loading GM1 header.");
		let header = Header::from_bytes(bytes)?;

		let picture_count = header.picture_count as usize;
		let body_size = bytes.len() - HEADER_SIZE;
		let table_size = picture_count * IMAGE_TABLE_ENTRY_SIZE;

		// full size = header + (offset + size + image header) * image count + data size
		let body_data_size = body_size.saturating_sub(table_size);
		if body_size < table_size || header.data_size as usize != body_data_size {
			log::error!("Provided GM1 body does not have the size as specified in the header.");
			return Err(Gm1Error::BodySizeMismatch {
				header: header.data_size,
				body: body_data_size as u32,
			});
		}

		log::debug!("Loading GM1 body.");
		let mut offset = HEADER_SIZE;
		let mut read_u32 = |bytes: &[u8]| {
			let value = u32::from_le_bytes([
				bytes[offset],
				bytes[offset + 1],
				bytes[offset + 2],
				bytes[offset + 3],
			]);
			offset += 4;
			value
		};
		let offsets: Vec<u32> = (0..picture_count).map(|_| read_u32(bytes)).collect();
		let sizes: Vec<u32> = (0..picture_count).map(|_| read_u32(bytes)).collect();

		let mut images = Vec::with_capacity(picture_count);
		for _ in 0..picture_count {
			let mut entry_bytes = [0u8; IMAGE_ENTRY_SIZE];
			entry_bytes.copy_from_slice(&bytes[offset..offset + IMAGE_ENTRY_SIZE]);
			images.push(ImageEntry::from_bytes(&entry_bytes));
			offset += IMAGE_ENTRY_SIZE;
		}

		Ok(Self {
			header,
			offsets,
			sizes,
			images,
			data: bytes[offset..].to_vec(),
		})
	}

	/// Assembles an archive from parsed parts, fixing up the header counts.
	pub(crate) fn from_parts(
		mut header: Header,
		offsets: Vec<u32>,
		sizes: Vec<u32>,
		images: Vec<ImageEntry>,
		data: Vec<u8>,
	) -> Self {
		header.picture_count = images.len() as u32;
		header.data_size = data.len() as u32;
		Self {
			header,
			offsets,
			sizes,
			images,
			data,
		}
	}

	/// The archive header.
	pub fn header(&self) -> &Header {
		&self.header
	}

	/// Per-image data offsets into the image data blob.
	pub fn offsets(&self) -> &[u32] {
		&self.offsets
	}

	/// Per-image data sizes.
	pub fn sizes(&self) -> &[u32] {
		&self.sizes
	}

	/// Per-image header records.
	pub fn images(&self) -> &[ImageEntry] {
		&self.images
	}

	/// The shared image data blob.
	pub fn data(&self) -> &[u8] {
		&self.data
	}

	/// Total size of the serialized archive in bytes.
	pub fn resource_size(&self) -> usize {
		HEADER_SIZE + self.images.len() * IMAGE_TABLE_ENTRY_SIZE + self.data.len()
	}

	/// The payload bytes of a single image.
	///
	/// # Errors
	///
	/// Returns [`Gm1Error::NoSuchImage`] for indices beyond the archive and
	/// [`Gm1Error::ImageOutOfBounds`] when the offset/size pair points
	/// outside the data blob.
	pub fn image_data(&self, index: usize) -> Result<&[u8], Gm1Error> {
		if index >= self.images.len() {
			return Err(Gm1Error::NoSuchImage {
				index,
				count: self.images.len(),
			});
		}
		let offset = self.offsets[index];
		let size = self.sizes[index];
		let end = offset as u64 + size as u64;
		if end > self.data.len() as u64 {
			return Err(Gm1Error::ImageOutOfBounds {
				index,
				offset,
				size,
				available: self.data.len() as u32,
			});
		}
		Ok(&self.data[offset as usize..end as usize])
	}

	/// The TGX stream portion of an image payload, together with its color
	/// mode, for sub-types that carry one.
	///
	/// Tile object images yield their stream part after the tile; images
	/// without an image part and uncompressed payloads yield `None`.
	///
	/// # Errors
	///
	/// Same conditions as [`File::image_data`], plus malformed tile info.
	pub fn image_tgx_stream(&self, index: usize) -> Result<Option<(&[u8], ColorMode)>, Gm1Error> {
		let data = self.image_data(index)?;
		match self.header.gm1_type {
			Gm1Type::Animations => Ok(Some((data, ColorMode::Indexed))),
			Gm1Type::Interface | Gm1Type::Font | Gm1Type::TgxConstSize => {
				Ok(Some((data, ColorMode::Direct)))
			}
			Gm1Type::TilesObject => {
				let info = TileObjectInfo::from_entry(&self.images[index], index)?;
				if info.image_position == ImagePosition::None {
					return Ok(None);
				}
				if data.len() < tile::TILE_BYTE_SIZE {
					return Err(Gm1Error::ImageCoder {
						index,
						source: crate::file::error::CoderError::InvalidDataSize,
					});
				}
				Ok(Some((&data[tile::TILE_BYTE_SIZE..], ColorMode::Direct)))
			}
			Gm1Type::NoCompression1 | Gm1Type::NoCompression2 => Ok(None),
		}
	}

	/// Serializes the archive to bytes.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut bytes = Vec::with_capacity(self.resource_size());
		self.header.write_to(&mut bytes);
		for offset in &self.offsets {
			bytes.extend_from_slice(&offset.to_le_bytes());
		}
		for size in &self.sizes {
			bytes.extend_from_slice(&size.to_le_bytes());
		}
		for image in &self.images {
			image.write_to(&mut bytes);
		}
		bytes.extend_from_slice(&self.data);
		bytes
	}

	/// Saves the archive to disk, creating missing parent directories.
	///
	/// The written file size is checked against the predicted resource size.
	/// On a mismatch the file is left in place for inspection and an error
	/// is returned.
	///
	/// # Errors
	///
	/// Returns an error if the file cannot be written or ends up with an
	/// unexpected size.
	pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), Gm1Error> {
		log::info!("Try saving GM1 resource as GM1 file.");
		let path = path.as_ref();
		if let Some(parent) = path.parent()
			&& !parent.as_os_str().is_empty()
		{
			std::fs::create_dir_all(parent)?;
			log::debug!("Created directories.");
		}

		let bytes = self.to_bytes();
		std::fs::write(path, &bytes)?;

		let written = std::fs::metadata(path)?.len();
		if written != bytes.len() as u64 {
			log::error!(
				"Saved GM1 resource as GM1 file, but saved file has not expected size. Might be corrupted."
			);
			return Err(Gm1Error::SavedSizeMismatch {
				expected: bytes.len() as u64,
				actual: written,
			});
		}
		log::info!("Saved GM1 resource as GM1 file.");
		Ok(())
	}

	/// Runs the per-image validation sweep of the archive, aborting on the
	/// first failure.
	///
	/// # Errors
	///
	/// Returns the failure of the first invalid image.
	pub fn validate(&self, _config: &CoderConfig) -> Result<Vec<ImageValidation>, Gm1Error> {
		log::info!("Try validating given resource.");
		let mut validations = Vec::with_capacity(self.images.len());
		for index in 0..self.images.len() {
			validations.push(self.validate_image(index)?);
		}
		log::info!("Validation completed successfully.");
		Ok(validations)
	}

	fn validate_image(&self, index: usize) -> Result<ImageValidation, Gm1Error> {
		let entry = &self.images[index];
		let data = self.image_data(index)?;

		let analysis = match self.header.gm1_type {
			Gm1Type::Interface | Gm1Type::Font | Gm1Type::TgxConstSize | Gm1Type::Animations => {
				// animations use the origin from the header, so all of them
				// need to share the archive image size
				if self.header.gm1_type == Gm1Type::Animations
					&& (u32::from(entry.header.width) != self.header.width
						|| u32::from(entry.header.height) != self.header.height)
				{
					return Err(Gm1Error::AnimationDimensionMismatch { index });
				}
				let mode = self.color_mode();
				let analysis = coder::analyze(
					data,
					entry.header.width as usize,
					entry.header.height as usize,
					mode,
				)
				.map_err(|source| Gm1Error::ImageCoder { index, source })?;
				Some(analysis)
			}
			Gm1Type::TilesObject => {
				if data.len() < tile::TILE_BYTE_SIZE {
					return Err(Gm1Error::ImageCoder {
						index,
						source: crate::file::error::CoderError::InvalidDataSize,
					});
				}
				let info = TileObjectInfo::from_entry(entry, index)?;
				if info.image_position == ImagePosition::None {
					None
				} else {
					let analysis = coder::analyze(
						&data[tile::TILE_BYTE_SIZE..],
						info.image_width as usize,
						info.tile_offset as usize + tile::TILE_IMAGE_HEIGHT_OFFSET,
						ColorMode::Direct,
					)
					.map_err(|source| Gm1Error::ImageCoder { index, source })?;
					Some(analysis)
				}
			}
			Gm1Type::NoCompression1 | Gm1Type::NoCompression2 => {
				let line_size = entry.header.width as usize * 2;
				let full_size = line_size * entry.header.height as usize;
				if line_size == 0
					|| data.is_empty()
					|| data.len() > full_size
					|| !data.len().is_multiple_of(line_size)
				{
					return Err(Gm1Error::ImageCoder {
						index,
						source: crate::file::error::CoderError::InvalidDataSize,
					});
				}
				None
			}
		};

		Ok(ImageValidation { index, analysis })
	}

	/// The stream color mode of the archive sub-type.
	pub fn color_mode(&self) -> ColorMode {
		if self.header.gm1_type == Gm1Type::Animations {
			ColorMode::Indexed
		} else {
			ColorMode::Direct
		}
	}

	/// Decodes a single image onto a fresh canvas of its
	/// [`image_canvas_dimensions`].
	///
	/// # Errors
	///
	/// Returns the coder failure of the image, or placement errors for
	/// malformed records.
	pub fn decode_image(&self, index: usize, config: &CoderConfig) -> Result<Canvas, Gm1Error> {
		let data = self.image_data(index)?;
		let entry = &self.images[index];
		let (canvas_width, canvas_height) =
			image_canvas_dimensions(self.header.gm1_type, entry, index)?;
		let mut canvas = Canvas::new(canvas_width, canvas_height, config.transparent_raw_color);

		match self.header.gm1_type {
			Gm1Type::Interface
			| Gm1Type::Font
			| Gm1Type::TgxConstSize
			| Gm1Type::Animations => {
				coder::decode_into(
					data,
					entry.header.width as usize,
					entry.header.height as usize,
					self.color_mode(),
					&mut canvas,
					0,
					0,
				)
				.map_err(|source| Gm1Error::ImageCoder { index, source })?;
			}
			Gm1Type::TilesObject => {
				if data.len() < tile::TILE_BYTE_SIZE {
					return Err(Gm1Error::ImageCoder {
						index,
						source: crate::file::error::CoderError::InvalidDataSize,
					});
				}
				let info = TileObjectInfo::from_entry(entry, index)?;
				let tgx_height = tile_image_height(&info);
				tile::decode_tile(&data[..tile::TILE_BYTE_SIZE], &mut canvas, 0, tgx_height)
					.map_err(|source| Gm1Error::ImageCoder { index, source })?;
				if info.image_position != ImagePosition::None {
					coder::decode_into(
						&data[tile::TILE_BYTE_SIZE..],
						info.image_width as usize,
						tgx_height,
						ColorMode::Direct,
						&mut canvas,
						info.image_offset_x as usize,
						0,
					)
					.map_err(|source| Gm1Error::ImageCoder { index, source })?;
				}
			}
			Gm1Type::NoCompression1 | Gm1Type::NoCompression2 => {
				uncompressed::decode_into(
					data,
					entry.header.width as usize,
					entry.header.height as usize,
					&mut canvas,
					0,
					0,
					config.transparent_raw_color,
				)
				.map_err(|source| Gm1Error::ImageCoder { index, source })?;
			}
		}

		Ok(canvas)
	}
}

impl std::fmt::Display for File {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"GM1 File: type {}, {} pictures, {} data bytes",
			self.header.gm1_type,
			self.images.len(),
			self.data.len()
		)
	}
}

/// Height of the image part of a tile object, which is also the vertical
/// tile position within the combined canvas.
fn tile_image_height(info: &TileObjectInfo) -> usize {
	if info.image_position == ImagePosition::None {
		0
	} else {
		info.tile_offset as usize + tile::TILE_IMAGE_HEIGHT_OFFSET
	}
}

/// Canvas dimensions of a decoded image, per archive sub-type.
///
/// Tile object canvases keep the tile below the image part instead of
/// overlapping them, so both parts survive a decode/encode round trip
/// byte-identically.
///
/// # Errors
///
/// Returns [`Gm1Error::InvalidImagePosition`] for malformed tile info.
pub fn image_canvas_dimensions(
	gm1_type: Gm1Type,
	entry: &ImageEntry,
	index: usize,
) -> Result<(usize, usize), Gm1Error> {
	match gm1_type {
		Gm1Type::TilesObject => {
			let info = TileObjectInfo::from_entry(entry, index)?;
			if info.image_position == ImagePosition::None {
				return Ok((tile::TILE_WIDTH, tile::TILE_HEIGHT));
			}
			let width = tile::TILE_WIDTH
				.max(info.image_offset_x as usize + info.image_width as usize);
			Ok((width, tile_image_height(&info) + tile::TILE_HEIGHT))
		}
		_ => Ok((entry.header.width as usize, entry.header.height as usize)),
	}
}

/// Encodes a decoded image canvas back into its payload bytes, per archive
/// sub-type. This is the inverse of [`File::decode_image`].
///
/// # Errors
///
/// Returns the coder failure of the image.
pub fn encode_image(
	gm1_type: Gm1Type,
	entry: &ImageEntry,
	index: usize,
	canvas: &Canvas,
	config: &CoderConfig,
) -> Result<Vec<u8>, Gm1Error> {
	let map_coder = |source| Gm1Error::ImageCoder { index, source };
	match gm1_type {
		Gm1Type::Interface | Gm1Type::Font | Gm1Type::TgxConstSize | Gm1Type::Animations => {
			let mode = if gm1_type == Gm1Type::Animations {
				ColorMode::Indexed
			} else {
				ColorMode::Direct
			};
			coder::encode(
				canvas,
				0,
				0,
				entry.header.width as usize,
				entry.header.height as usize,
				mode,
				config,
			)
			.map_err(map_coder)
		}
		Gm1Type::TilesObject => {
			let info = TileObjectInfo::from_entry(entry, index)?;
			let tgx_height = tile_image_height(&info);
			let tile_bytes =
				tile::encode_tile(canvas, 0, tgx_height, config.transparent_raw_color)
					.map_err(map_coder)?;
			let mut data = tile_bytes.to_vec();
			if info.image_position != ImagePosition::None {
				let stream = coder::encode(
					canvas,
					info.image_offset_x as usize,
					0,
					info.image_width as usize,
					tgx_height,
					ColorMode::Direct,
					config,
				)
				.map_err(map_coder)?;
				data.extend_from_slice(&stream);
			}
			Ok(data)
		}
		Gm1Type::NoCompression1 | Gm1Type::NoCompression2 => {
			let width = entry.header.width as usize;
			let height = entry.header.height as usize;
			let size = uncompressed::encoded_size(
				canvas,
				0,
				0,
				width,
				height,
				config.transparent_raw_color,
			)
			.map_err(map_coder)?;
			let mut data = Vec::with_capacity(size);
			uncompressed::encode_into(
				canvas,
				0,
				0,
				width,
				height,
				config.transparent_raw_color,
				size,
				&mut data,
			)
			.map_err(map_coder)?;
			Ok(data)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::file::error::CoderError;
	use crate::file::gm1::header::{HEADER_SCALAR_COUNT, PALETTE_COUNT, PALETTE_ENTRIES};

	pub(super) fn test_header(
		gm1_type: u32,
		picture_count: u32,
		data_size: u32,
		width: u32,
		height: u32,
	) -> Header {
		let mut scalars = [0u32; HEADER_SCALAR_COUNT];
		scalars[3] = picture_count;
		scalars[5] = gm1_type;
		scalars[12] = width;
		scalars[13] = height;
		scalars[20] = data_size;
		let mut palettes = [[0u16; PALETTE_ENTRIES]; PALETTE_COUNT];
		for (palette_index, palette) in palettes.iter_mut().enumerate() {
			for (entry_index, entry) in palette.iter_mut().enumerate() {
				*entry = (palette_index * 256 + entry_index) as u16;
			}
		}
		Header::from_scalars(scalars, palettes).unwrap()
	}

	fn general_entry(width: u16, height: u16) -> ImageEntry {
		ImageEntry {
			header: ImageHeader {
				width,
				height,
				offset_x: 0,
				offset_y: 0,
			},
			info: [0; 8],
		}
	}

	fn animation_archive(config: &CoderConfig) -> File {
		let mut offsets = Vec::new();
		let mut sizes = Vec::new();
		let mut images = Vec::new();
		let mut data = Vec::new();
		for frame in 0..2u16 {
			let entry = general_entry(4, 3);
			let mut canvas = Canvas::new(4, 3, config.transparent_raw_color);
			for i in 0..6 {
				canvas.pixels_mut()[i] = 0xFF00 | (frame * 16 + i as u16);
			}
			let payload =
				encode_image(Gm1Type::Animations, &entry, frame as usize, &canvas, config).unwrap();
			offsets.push(data.len() as u32);
			sizes.push(payload.len() as u32);
			images.push(entry);
			data.extend_from_slice(&payload);
		}
		File::from_parts(test_header(2, 2, 0, 4, 3), offsets, sizes, images, data)
	}

	#[test]
	fn test_body_size_check() {
		let mut bytes = Vec::new();
		test_header(1, 2, 100, 0, 0).write_to(&mut bytes);
		bytes.resize(HEADER_SIZE + 2 * IMAGE_TABLE_ENTRY_SIZE + 100, 0);
		assert_eq!(bytes.len(), 5356);

		let file = File::from_bytes(&bytes).unwrap();
		assert_eq!(file.images().len(), 2);
		assert_eq!(file.data().len(), 100);

		// one byte of image data missing
		let mut short_header = test_header(1, 2, 99, 0, 0);
		short_header.data_size = 99;
		let mut short_bytes = Vec::new();
		short_header.write_to(&mut short_bytes);
		short_bytes.resize(HEADER_SIZE + 2 * IMAGE_TABLE_ENTRY_SIZE + 100, 0);
		assert!(matches!(
			File::from_bytes(&short_bytes),
			Err(Gm1Error::BodySizeMismatch { header: 99, body: 100 })
		));
	}

	#[test]
	fn test_byte_roundtrip() {
		let config = CoderConfig::default();
		let file = animation_archive(&config);
		let bytes = file.to_bytes();
		assert_eq!(bytes.len(), file.resource_size());

		let reloaded = File::from_bytes(&bytes).unwrap();
		assert_eq!(reloaded, file);
		assert_eq!(reloaded.to_bytes(), bytes);
	}

	#[test]
	fn test_animation_validation_and_decode() {
		let config = CoderConfig::default();
		let file = animation_archive(&config);

		let validations = file.validate(&config).unwrap();
		assert_eq!(validations.len(), 2);
		assert!(validations.iter().all(|validation| validation.analysis.is_some()));

		let canvas = file.decode_image(1, &config).unwrap();
		assert_eq!(canvas.pixel(0, 0), 0xFF10);
		assert_eq!(canvas.pixel(1, 1), 0xFF15);
		assert_eq!(canvas.pixel(2, 1), 0x0000);
	}

	#[test]
	fn test_animation_dimension_mismatch() {
		let config = CoderConfig::default();
		let mut file = animation_archive(&config);
		file.images[1].header.width = 5;

		assert!(matches!(
			file.validate(&config),
			Err(Gm1Error::AnimationDimensionMismatch { index: 1 })
		));
	}

	#[test]
	fn test_image_bounds_check() {
		let config = CoderConfig::default();
		let mut file = animation_archive(&config);
		file.sizes[1] += 1000;

		assert!(matches!(
			file.image_data(1),
			Err(Gm1Error::ImageOutOfBounds { index: 1, .. })
		));
		assert!(matches!(file.image_data(5), Err(Gm1Error::NoSuchImage { index: 5, count: 2 })));
	}

	#[test]
	fn test_tile_object_roundtrip() {
		let config = CoderConfig::default();
		let entry = ImageEntry {
			header: ImageHeader {
				width: 30,
				height: 20,
				offset_x: 0,
				offset_y: 0,
			},
			info: TileObjectInfo {
				image_part: 0,
				sub_parts: 1,
				tile_offset: 4,
				image_position: ImagePosition::Top,
				image_offset_x: 2,
				image_width: 20,
				animated_color: 0,
			}
			.to_info(),
		};

		let (canvas_width, canvas_height) =
			image_canvas_dimensions(Gm1Type::TilesObject, &entry, 0).unwrap();
		// image part is 4 + 7 = 11 rows tall, the tile sits below it
		assert_eq!((canvas_width, canvas_height), (30, 11 + 16));

		let mut canvas = Canvas::new(canvas_width, canvas_height, config.transparent_raw_color);
		// image part content
		for y in 0..11 {
			for x in 2..22 {
				canvas.pixels_mut()[x + y * canvas_width] = 0x8000 | (x * y) as u16;
			}
		}
		// tile content, diamond cells only
		let tile_bytes: Vec<u8> = (0..256u16).flat_map(|value| (0x8000 | value).to_le_bytes()).collect();
		tile::decode_tile(&tile_bytes, &mut canvas, 0, 11).unwrap();

		let payload = encode_image(Gm1Type::TilesObject, &entry, 0, &canvas, &config).unwrap();
		assert_eq!(&payload[..tile::TILE_BYTE_SIZE], tile_bytes.as_slice());

		let file = File::from_parts(
			test_header(3, 1, 0, 0, 0),
			vec![0],
			vec![payload.len() as u32],
			vec![entry],
			payload,
		);
		file.validate(&config).unwrap();
		let decoded = file.decode_image(0, &config).unwrap();
		assert_eq!(decoded, canvas);

		let stream = file.image_tgx_stream(0).unwrap();
		assert!(matches!(stream, Some((_, ColorMode::Direct))));
	}

	#[test]
	fn test_uncompressed_roundtrip() {
		let config = CoderConfig::default();
		let entry = general_entry(4, 4);
		let mut canvas = Canvas::new(4, 4, config.transparent_raw_color);
		for i in 0..8 {
			canvas.pixels_mut()[i] = 0x8000 | i as u16;
		}

		let payload = encode_image(Gm1Type::NoCompression1, &entry, 0, &canvas, &config).unwrap();
		// the transparent tail rows are elided
		assert_eq!(payload.len(), 2 * 4 * 2);

		let file = File::from_parts(
			test_header(5, 1, 0, 0, 0),
			vec![0],
			vec![payload.len() as u32],
			vec![entry],
			payload,
		);
		file.validate(&config).unwrap();
		assert!(file.image_tgx_stream(0).unwrap().is_none());
		assert_eq!(file.decode_image(0, &config).unwrap(), canvas);
	}

	#[test]
	fn test_validation_reports_stream_defects() {
		let config = CoderConfig::default();
		let mut file = animation_archive(&config);
		// drop the last row's newline and the padding of the second image
		file.sizes[1] -= 2;

		assert!(matches!(
			file.validate(&config),
			Err(Gm1Error::ImageCoder { index: 1, source: CoderError::NotEnoughPixels })
		));
	}
}
