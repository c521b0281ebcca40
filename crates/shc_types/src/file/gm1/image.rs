//! Per-image header records of a GM1 archive.
//!
//! Every image is described by a 16-byte record: four `u16` dimension and
//! offset fields, followed by an 8-byte info block whose interpretation
//! depends on the archive sub-type. The info bytes are kept verbatim next to
//! their typed views, because several of them have unknown meaning and must
//! survive a round trip untouched.

use crate::file::error::Gm1Error;

/// Size of a per-image record in bytes (header plus info block).
pub const IMAGE_ENTRY_SIZE: usize = 16;

/// Dimensions and placement of a single image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
	/// Image width in pixels.
	pub width: u16,
	/// Image height in pixels.
	pub height: u16,
	/// Horizontal placement offset used by the game.
	pub offset_x: u16,
	/// Vertical placement offset used by the game.
	pub offset_y: u16,
}

impl std::fmt::Display for ImageHeader {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		writeln!(f, "Width: {}", self.width)?;
		writeln!(f, "Height: {}", self.height)?;
		writeln!(f, "Offset X: {}", self.offset_x)?;
		write!(f, "Offset Y: {}", self.offset_y)
	}
}

/// One per-image record: the image header plus the sub-type specific info
/// block, kept as raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageEntry {
	/// Dimensions and placement of the image.
	pub header: ImageHeader,
	/// The 8 info bytes, interpreted per archive sub-type.
	pub info: [u8; 8],
}

impl ImageEntry {
	/// Parses a record from exactly [`IMAGE_ENTRY_SIZE`] bytes.
	pub fn from_bytes(data: &[u8; IMAGE_ENTRY_SIZE]) -> Self {
		Self {
			header: ImageHeader {
				width: u16::from_le_bytes([data[0], data[1]]),
				height: u16::from_le_bytes([data[2], data[3]]),
				offset_x: u16::from_le_bytes([data[4], data[5]]),
				offset_y: u16::from_le_bytes([data[6], data[7]]),
			},
			info: [data[8], data[9], data[10], data[11], data[12], data[13], data[14], data[15]],
		}
	}

	/// Serializes the record, appending [`IMAGE_ENTRY_SIZE`] bytes to `out`.
	pub fn write_to(&self, out: &mut Vec<u8>) {
		out.extend_from_slice(&self.header.width.to_le_bytes());
		out.extend_from_slice(&self.header.height.to_le_bytes());
		out.extend_from_slice(&self.header.offset_x.to_le_bytes());
		out.extend_from_slice(&self.header.offset_y.to_le_bytes());
		out.extend_from_slice(&self.info);
	}
}

/// Where the image part of a tile object sits relative to its tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ImagePosition {
	/// The record carries only the tile, no image part.
	None = 0,
	/// Image part centered above the tile.
	Top = 1,
	/// Image part above the upper left tile edge.
	UpperLeft = 2,
	/// Image part above the upper right tile edge.
	UpperRight = 3,
}

impl TryFrom<u8> for ImagePosition {
	type Error = u8;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		match value {
			0 => Ok(Self::None),
			1 => Ok(Self::Top),
			2 => Ok(Self::UpperLeft),
			3 => Ok(Self::UpperRight),
			value => Err(value),
		}
	}
}

/// Info block of tile object archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileObjectInfo {
	/// Index of this part within the complete building image.
	pub image_part: u8,
	/// Number of parts the complete building image consists of.
	pub sub_parts: u8,
	/// Vertical offset of the tile within the combined image.
	pub tile_offset: u16,
	/// Placement of the image part relative to the tile.
	pub image_position: ImagePosition,
	/// Horizontal offset of the image part.
	pub image_offset_x: u8,
	/// Width of the image part.
	pub image_width: u8,
	/// Palette index that is animated for player colors.
	pub animated_color: u8,
}

impl TileObjectInfo {
	/// Interprets the info bytes of `entry` as tile object info.
	///
	/// # Errors
	///
	/// Returns [`Gm1Error::InvalidImagePosition`] on an unknown image
	/// position byte; `index` is only used for that diagnostic.
	pub fn from_entry(entry: &ImageEntry, index: usize) -> Result<Self, Gm1Error> {
		let info = &entry.info;
		Ok(Self {
			image_part: info[0],
			sub_parts: info[1],
			tile_offset: u16::from_le_bytes([info[2], info[3]]),
			image_position: ImagePosition::try_from(info[4])
				.map_err(|value| Gm1Error::InvalidImagePosition { index, value })?,
			image_offset_x: info[5],
			image_width: info[6],
			animated_color: info[7],
		})
	}

	/// Serializes the info back into its 8-byte block form.
	pub fn to_info(&self) -> [u8; 8] {
		let tile_offset = self.tile_offset.to_le_bytes();
		[
			self.image_part,
			self.sub_parts,
			tile_offset[0],
			tile_offset[1],
			self.image_position as u8,
			self.image_offset_x,
			self.image_width,
			self.animated_color,
		]
	}
}

impl std::fmt::Display for TileObjectInfo {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		writeln!(f, "Image Part: {}", self.image_part)?;
		writeln!(f, "Sub Parts: {}", self.sub_parts)?;
		writeln!(f, "Tile Offset: {}", self.tile_offset)?;
		writeln!(f, "Image Position: {}", self.image_position as u8)?;
		writeln!(f, "Image Offset X: {}", self.image_offset_x)?;
		writeln!(f, "Image Width: {}", self.image_width)?;
		write!(f, "Animated Color: {}", self.animated_color)
	}
}

/// Info block of interface, animation, font and uncompressed archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneralInfo {
	/// Seems to point at the data of another image to use instead.
	pub relative_data_pos: i16,
	/// Font related size value.
	pub font_related_size: i16,
	/// Unknown info byte at offset 0x4.
	pub unknown_0x4: u8,
	/// Unknown info byte at offset 0x5.
	pub unknown_0x5: u8,
	/// Unknown info byte at offset 0x6.
	pub unknown_0x6: u8,
	/// Indicates together with a game flag whether animation frames are skipped.
	pub flags: u8,
}

impl GeneralInfo {
	/// Interprets the info bytes of `entry` as general info.
	pub fn from_entry(entry: &ImageEntry) -> Self {
		let info = &entry.info;
		Self {
			relative_data_pos: i16::from_le_bytes([info[0], info[1]]),
			font_related_size: i16::from_le_bytes([info[2], info[3]]),
			unknown_0x4: info[4],
			unknown_0x5: info[5],
			unknown_0x6: info[6],
			flags: info[7],
		}
	}

	/// Serializes the info back into its 8-byte block form.
	pub fn to_info(&self) -> [u8; 8] {
		let relative_data_pos = self.relative_data_pos.to_le_bytes();
		let font_related_size = self.font_related_size.to_le_bytes();
		[
			relative_data_pos[0],
			relative_data_pos[1],
			font_related_size[0],
			font_related_size[1],
			self.unknown_0x4,
			self.unknown_0x5,
			self.unknown_0x6,
			self.flags,
		]
	}
}

impl std::fmt::Display for GeneralInfo {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		writeln!(f, "Relative Data Position: {}", self.relative_data_pos)?;
		writeln!(f, "Font Related Size: {}", self.font_related_size)?;
		writeln!(f, "Unknown 0x4: {}", self.unknown_0x4)?;
		writeln!(f, "Unknown 0x5: {}", self.unknown_0x5)?;
		writeln!(f, "Unknown 0x6: {}", self.unknown_0x6)?;
		write!(f, "Flags: {}", self.flags)
	}
}
