//! GM1 archive header.
//!
//! The header is a fixed 88-byte record of 22 little-endian `u32` fields,
//! followed by ten 256-entry 16-bit color palettes (5120 bytes). Sixteen of
//! the scalar fields have unknown purpose; they are carried verbatim so that
//! rebuilt archives stay bit-compatible with their source.

use crate::file::error::Gm1Error;

/// Size of the scalar part of the header in bytes.
pub const HEADER_SCALAR_SIZE: usize = 88;
/// Number of scalar header fields.
pub const HEADER_SCALAR_COUNT: usize = HEADER_SCALAR_SIZE / 4;
/// Number of palettes stored in the header.
pub const PALETTE_COUNT: usize = 10;
/// Number of colors per palette.
pub const PALETTE_ENTRIES: usize = 256;
/// Size of a single palette in bytes.
pub const PALETTE_BYTE_SIZE: usize = PALETTE_ENTRIES * 2;
/// Total size of the header including palettes.
pub const HEADER_SIZE: usize = HEADER_SCALAR_SIZE + PALETTE_COUNT * PALETTE_BYTE_SIZE;

/// Archive sub-type, selecting the coder applied to every image payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Gm1Type {
	/// Interface items and some building animations, stored as TGX streams.
	Interface = 1,
	/// Animations, stored as indexed TGX streams against the header palettes.
	Animations = 2,
	/// Buildings, stored as a tile plus an optional TGX stream per image.
	TilesObject = 3,
	/// Fonts, stored as TGX streams.
	Font = 4,
	/// Uncompressed 16-bit rows, first variant.
	NoCompression1 = 5,
	/// TGX streams with a constant image size.
	TgxConstSize = 6,
	/// Uncompressed 16-bit rows, second variant.
	NoCompression2 = 7,
}

impl Gm1Type {
	/// Whether the image payloads of this sub-type are TGX streams.
	pub fn is_tgx_stream(self) -> bool {
		matches!(self, Self::Interface | Self::Animations | Self::Font | Self::TgxConstSize)
	}

	/// Whether the image payloads of this sub-type are plain pixel rows.
	pub fn is_uncompressed(self) -> bool {
		matches!(self, Self::NoCompression1 | Self::NoCompression2)
	}
}

impl TryFrom<u32> for Gm1Type {
	type Error = Gm1Error;

	fn try_from(value: u32) -> Result<Self, Self::Error> {
		match value {
			1 => Ok(Self::Interface),
			2 => Ok(Self::Animations),
			3 => Ok(Self::TilesObject),
			4 => Ok(Self::Font),
			5 => Ok(Self::NoCompression1),
			6 => Ok(Self::TgxConstSize),
			7 => Ok(Self::NoCompression2),
			value => Err(Gm1Error::UnknownType { value }),
		}
	}
}

impl std::fmt::Display for Gm1Type {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Self::Interface => "interface",
			Self::Animations => "animations",
			Self::TilesObject => "tiles object",
			Self::Font => "font",
			Self::NoCompression1 => "no compression 1",
			Self::TgxConstSize => "TGX constant size",
			Self::NoCompression2 => "no compression 2",
		};
		write!(f, "{} ({})", name, *self as u32)
	}
}

/// The fixed archive header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
	/// Unknown field at offset 0x0.
	pub unknown_0x0: u32,
	/// Unknown field at offset 0x4.
	pub unknown_0x4: u32,
	/// Unknown field at offset 0x8.
	pub unknown_0x8: u32,
	/// Number of images stored in the archive.
	pub picture_count: u32,
	/// Unknown field at offset 0x10.
	pub unknown_0x10: u32,
	/// Archive sub-type.
	pub gm1_type: Gm1Type,
	/// Unknown field at offset 0x18.
	pub unknown_0x18: u32,
	/// Unknown field at offset 0x1C.
	pub unknown_0x1c: u32,
	/// Unknown field at offset 0x20.
	pub unknown_0x20: u32,
	/// Unknown field at offset 0x24.
	pub unknown_0x24: u32,
	/// Unknown field at offset 0x28.
	pub unknown_0x28: u32,
	/// Unknown field at offset 0x2C.
	pub unknown_0x2c: u32,
	/// Canvas width shared by the archive, used by animations.
	pub width: u32,
	/// Canvas height shared by the archive, used by animations.
	pub height: u32,
	/// Unknown field at offset 0x38.
	pub unknown_0x38: u32,
	/// Unknown field at offset 0x3C.
	pub unknown_0x3c: u32,
	/// Unknown field at offset 0x40.
	pub unknown_0x40: u32,
	/// Unknown field at offset 0x44.
	pub unknown_0x44: u32,
	/// Rendering origin, x part.
	pub origin_x: u32,
	/// Rendering origin, y part.
	pub origin_y: u32,
	/// Size of the image data blob in bytes.
	pub data_size: u32,
	/// Unknown field at offset 0x54.
	pub unknown_0x54: u32,
	/// The ten 256-entry color palettes used by animation archives.
	pub palettes: [[u16; PALETTE_ENTRIES]; PALETTE_COUNT],
}

impl Header {
	/// Parses the header from the start of `data`.
	///
	/// # Errors
	///
	/// Returns [`Gm1Error::InsufficientData`] when `data` is shorter than
	/// [`HEADER_SIZE`] and [`Gm1Error::UnknownType`] on an unknown sub-type
	/// tag.
	pub fn from_bytes(data: &[u8]) -> Result<Self, Gm1Error> {
		if data.len() < HEADER_SIZE {
			return Err(Gm1Error::InsufficientData {
				expected: HEADER_SIZE,
				actual: data.len(),
			});
		}

		let mut scalars = [0u32; HEADER_SCALAR_COUNT];
		for (index, scalar) in scalars.iter_mut().enumerate() {
			let offset = index * 4;
			*scalar = u32::from_le_bytes([
				data[offset],
				data[offset + 1],
				data[offset + 2],
				data[offset + 3],
			]);
		}

		let mut palettes = [[0u16; PALETTE_ENTRIES]; PALETTE_COUNT];
		let mut offset = HEADER_SCALAR_SIZE;
		for palette in &mut palettes {
			for color in palette.iter_mut() {
				*color = u16::from_le_bytes([data[offset], data[offset + 1]]);
				offset += 2;
			}
		}

		Self::from_scalars(scalars, palettes)
	}

	/// Builds a header from its 22 scalar fields in file order plus palettes.
	///
	/// # Errors
	///
	/// Returns [`Gm1Error::UnknownType`] on an unknown sub-type tag.
	pub fn from_scalars(
		scalars: [u32; HEADER_SCALAR_COUNT],
		palettes: [[u16; PALETTE_ENTRIES]; PALETTE_COUNT],
	) -> Result<Self, Gm1Error> {
		Ok(Self {
			unknown_0x0: scalars[0],
			unknown_0x4: scalars[1],
			unknown_0x8: scalars[2],
			picture_count: scalars[3],
			unknown_0x10: scalars[4],
			gm1_type: Gm1Type::try_from(scalars[5])?,
			unknown_0x18: scalars[6],
			unknown_0x1c: scalars[7],
			unknown_0x20: scalars[8],
			unknown_0x24: scalars[9],
			unknown_0x28: scalars[10],
			unknown_0x2c: scalars[11],
			width: scalars[12],
			height: scalars[13],
			unknown_0x38: scalars[14],
			unknown_0x3c: scalars[15],
			unknown_0x40: scalars[16],
			unknown_0x44: scalars[17],
			origin_x: scalars[18],
			origin_y: scalars[19],
			data_size: scalars[20],
			unknown_0x54: scalars[21],
			palettes,
		})
	}

	/// The 22 scalar fields in file order, paired with their names.
	///
	/// The order is shared by the binary layout, the meta sidecar and the
	/// textual header dump.
	pub fn scalars(&self) -> [(&'static str, u32); HEADER_SCALAR_COUNT] {
		[
			("unknown 0x0", self.unknown_0x0),
			("unknown 0x4", self.unknown_0x4),
			("unknown 0x8", self.unknown_0x8),
			("number of pictures", self.picture_count),
			("unknown 0x10", self.unknown_0x10),
			("gm1 type", self.gm1_type as u32),
			("unknown 0x18", self.unknown_0x18),
			("unknown 0x1C", self.unknown_0x1c),
			("unknown 0x20", self.unknown_0x20),
			("unknown 0x24", self.unknown_0x24),
			("unknown 0x28", self.unknown_0x28),
			("unknown 0x2C", self.unknown_0x2c),
			("width", self.width),
			("height", self.height),
			("unknown 0x38", self.unknown_0x38),
			("unknown 0x3C", self.unknown_0x3c),
			("unknown 0x40", self.unknown_0x40),
			("unknown 0x44", self.unknown_0x44),
			("origin x", self.origin_x),
			("origin y", self.origin_y),
			("data size", self.data_size),
			("unknown 0x54", self.unknown_0x54),
		]
	}

	/// Serializes the header, appending [`HEADER_SIZE`] bytes to `out`.
	pub fn write_to(&self, out: &mut Vec<u8>) {
		out.reserve(HEADER_SIZE);
		for (_, value) in self.scalars() {
			out.extend_from_slice(&value.to_le_bytes());
		}
		for palette in &self.palettes {
			for color in palette {
				out.extend_from_slice(&color.to_le_bytes());
			}
		}
	}
}

impl std::fmt::Display for Header {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let scalars = self.scalars();
		for (name, value) in &scalars[..scalars.len() - 1] {
			writeln!(f, "{name}: {value}")?;
		}
		let (name, value) = scalars[scalars.len() - 1];
		write!(f, "{name}: {value}")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn header_bytes(gm1_type: u32) -> Vec<u8> {
		let mut bytes = Vec::with_capacity(HEADER_SIZE);
		for index in 0..HEADER_SCALAR_COUNT as u32 {
			let value = if index == 5 { gm1_type } else { index * 11 };
			bytes.extend_from_slice(&value.to_le_bytes());
		}
		for palette in 0..PALETTE_COUNT as u16 {
			for entry in 0..PALETTE_ENTRIES as u16 {
				bytes.extend_from_slice(&(palette * 1000 + entry).to_le_bytes());
			}
		}
		bytes
	}

	#[test]
	fn test_byte_roundtrip_preserves_unknown_fields() {
		let bytes = header_bytes(3);
		let header = Header::from_bytes(&bytes).unwrap();
		assert_eq!(header.gm1_type, Gm1Type::TilesObject);
		assert_eq!(header.picture_count, 33);
		assert_eq!(header.unknown_0x54, 21 * 11);
		assert_eq!(header.palettes[9][255], 9255);

		let mut rebuilt = Vec::new();
		header.write_to(&mut rebuilt);
		assert_eq!(rebuilt, bytes);
	}

	#[test]
	fn test_unknown_type_is_rejected() {
		let result = Header::from_bytes(&header_bytes(8));
		assert!(matches!(result, Err(Gm1Error::UnknownType { value: 8 })));
	}

	#[test]
	fn test_short_header_is_rejected() {
		let result = Header::from_bytes(&[0; HEADER_SIZE - 1]);
		assert!(matches!(result, Err(Gm1Error::InsufficientData { .. })));
	}
}
