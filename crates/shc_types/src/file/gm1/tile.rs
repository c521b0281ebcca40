//! Isometric tile coder.
//!
//! Tile object archives store the ground part of every image as a fixed
//! 30×16 diamond bitmap of exactly 512 bytes (256 little-endian 16-bit
//! pixels). Only pixels inside the diamond appear in the file; rows hold
//! 2, 6, 10, 14, 18, 22, 26, 30, 30, 26, 22, 18, 14, 10, 6, 2 pixels from
//! top to bottom. Rows are traversed top to bottom and pixels inside a row
//! pairwise from left to right.

use crate::file::canvas::Canvas;
use crate::file::error::CoderError;

/// Width of a tile bitmap in pixels.
pub const TILE_WIDTH: usize = 30;
/// Height of a tile bitmap in pixels.
pub const TILE_HEIGHT: usize = 16;
/// Encoded size of a tile in bytes.
pub const TILE_BYTE_SIZE: usize = 512;
/// Number of pixels inside the tile diamond.
pub const TILE_PIXEL_COUNT: usize = TILE_BYTE_SIZE / 2;

/// The image part of a tile object overlaps the upper half of its tile, so
/// its height is the tile offset plus this many pixels.
pub const TILE_IMAGE_HEIGHT_OFFSET: usize = TILE_HEIGHT / 2 - 1;

const HALF_TILE_HEIGHT: i32 = (TILE_HEIGHT / 2) as i32;
const QUARTER_TILE_WIDTH: i32 = (TILE_WIDTH / 2 / 2) as i32;

/// Walks the diamond cells in file order, calling `action` with the canvas
/// position of the first pixel of every in-diamond column pair.
fn for_each_diamond_cell(mut action: impl FnMut(usize, usize)) {
	for y in -HALF_TILE_HEIGHT..=HALF_TILE_HEIGHT {
		if y == 0 {
			continue;
		}
		let row = (if y < 0 { y + HALF_TILE_HEIGHT } else { y + HALF_TILE_HEIGHT - 1 }) as usize;
		for x in -QUARTER_TILE_WIDTH..=QUARTER_TILE_WIDTH {
			if x.abs() + y.abs() <= HALF_TILE_HEIGHT {
				let column = ((x + QUARTER_TILE_WIDTH) * 2) as usize;
				action(column, row);
			}
		}
	}
}

/// Decodes a 512-byte tile into `canvas`, placing the 30×16 rectangle with
/// its top left corner at `(x, y)`.
///
/// Positions outside the diamond are left untouched; the caller guarantees
/// the canvas is pre-filled with the transparent raw color.
///
/// # Errors
///
/// Returns [`CoderError::InvalidDataSize`] unless `tile` is exactly 512
/// bytes, and [`CoderError::CanvasCanNotContainImage`] if the rectangle does
/// not fit.
pub fn decode_tile(tile: &[u8], canvas: &mut Canvas, x: usize, y: usize) -> Result<(), CoderError> {
	if tile.len() != TILE_BYTE_SIZE {
		return Err(CoderError::InvalidDataSize);
	}
	if !canvas.contains_rect(x, y, TILE_WIDTH, TILE_HEIGHT) {
		return Err(CoderError::CanvasCanNotContainImage);
	}

	let raw_width = canvas.width();
	let pixels = canvas.pixels_mut();
	let mut source_index = 0usize;
	for_each_diamond_cell(|column, row| {
		let target_index = x + column + raw_width * (y + row);
		pixels[target_index] = u16::from_le_bytes([tile[source_index], tile[source_index + 1]]);
		pixels[target_index + 1] =
			u16::from_le_bytes([tile[source_index + 2], tile[source_index + 3]]);
		source_index += 4;
	});

	Ok(())
}

/// Encodes the 30×16 rectangle at `(x, y)` of `canvas` as a 512-byte tile.
///
/// Every pixel of the rectangle outside the diamond must equal the
/// transparent raw color; tile data never stores those positions, so
/// anything else would be lost silently.
///
/// # Errors
///
/// Returns [`CoderError::CanvasCanNotContainImage`] if the rectangle does
/// not fit and [`CoderError::ExpectedTransparentPixel`] if an out-of-diamond
/// pixel holds a color.
pub fn encode_tile(
	canvas: &Canvas,
	x: usize,
	y: usize,
	transparent_raw_color: u16,
) -> Result<[u8; TILE_BYTE_SIZE], CoderError> {
	verify_tile(canvas, x, y, transparent_raw_color)?;

	let raw_width = canvas.width();
	let pixels = canvas.pixels();
	let mut tile = [0u8; TILE_BYTE_SIZE];
	let mut target_index = 0usize;
	for_each_diamond_cell(|column, row| {
		let source_index = x + column + raw_width * (y + row);
		tile[target_index..target_index + 2].copy_from_slice(&pixels[source_index].to_le_bytes());
		tile[target_index + 2..target_index + 4]
			.copy_from_slice(&pixels[source_index + 1].to_le_bytes());
		target_index += 4;
	});

	Ok(tile)
}

/// Dry run of [`encode_tile`]: performs the placement and transparency
/// verification without producing the tile bytes.
///
/// # Errors
///
/// Same conditions as [`encode_tile`].
pub fn verify_tile(
	canvas: &Canvas,
	x: usize,
	y: usize,
	transparent_raw_color: u16,
) -> Result<(), CoderError> {
	if !canvas.contains_rect(x, y, TILE_WIDTH, TILE_HEIGHT) {
		return Err(CoderError::CanvasCanNotContainImage);
	}

	for row in 0..TILE_HEIGHT {
		let y_center = if row < TILE_HEIGHT / 2 {
			row as i32 - HALF_TILE_HEIGHT
		} else {
			row as i32 - HALF_TILE_HEIGHT + 1
		};
		for column in 0..TILE_WIDTH {
			let x_center = (column as i32 / 2) - QUARTER_TILE_WIDTH;
			if x_center.abs() + y_center.abs() <= HALF_TILE_HEIGHT {
				continue;
			}
			if canvas.pixel(x + column, y + row) != transparent_raw_color {
				return Err(CoderError::ExpectedTransparentPixel);
			}
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ascending_tile() -> Vec<u8> {
		let mut tile = Vec::with_capacity(TILE_BYTE_SIZE);
		for value in 0..TILE_PIXEL_COUNT as u16 {
			tile.extend_from_slice(&value.to_le_bytes());
		}
		tile
	}

	#[test]
	fn test_diamond_has_256_pixels() {
		let mut cells = 0usize;
		for_each_diamond_cell(|_, _| cells += 1);
		assert_eq!(cells * 2, TILE_PIXEL_COUNT);
	}

	#[test]
	fn test_diamond_row_widths() {
		let mut row_pixels = [0usize; TILE_HEIGHT];
		for_each_diamond_cell(|_, row| row_pixels[row] += 2);
		assert_eq!(
			row_pixels,
			[2, 6, 10, 14, 18, 22, 26, 30, 30, 26, 22, 18, 14, 10, 6, 2]
		);
	}

	#[test]
	fn test_decode_places_top_row_in_the_center() {
		let mut canvas = Canvas::new(TILE_WIDTH, TILE_HEIGHT, 0);
		decode_tile(&ascending_tile(), &mut canvas, 0, 0).unwrap();
		// the 2-pixel top row sits in the middle columns
		assert_eq!(canvas.pixel(14, 0), 0);
		assert_eq!(canvas.pixel(15, 0), 1);
		assert_eq!(canvas.pixel(13, 0), 0x0000);
		// the widest rows span the full tile width
		assert_eq!(canvas.pixel(0, 7), 98);
		assert_eq!(canvas.pixel(29, 8), 157);
	}

	#[test]
	fn test_tile_roundtrip() {
		let tile = ascending_tile();
		let mut canvas = Canvas::new(40, 20, 0);
		decode_tile(&tile, &mut canvas, 5, 2).unwrap();

		let encoded = encode_tile(&canvas, 5, 2, 0).unwrap();
		assert_eq!(encoded.as_slice(), tile.as_slice());
	}

	#[test]
	fn test_encode_rejects_color_outside_diamond() {
		let mut canvas = Canvas::new(TILE_WIDTH, TILE_HEIGHT, 0);
		decode_tile(&ascending_tile(), &mut canvas, 0, 0).unwrap();
		canvas.pixels_mut()[0] = 0x8001; // top left corner is outside the diamond

		assert_eq!(verify_tile(&canvas, 0, 0, 0), Err(CoderError::ExpectedTransparentPixel));
		assert_eq!(encode_tile(&canvas, 0, 0, 0), Err(CoderError::ExpectedTransparentPixel));
	}

	#[test]
	fn test_placement_checks() {
		let mut canvas = Canvas::new(TILE_WIDTH - 1, TILE_HEIGHT, 0);
		assert_eq!(
			decode_tile(&ascending_tile(), &mut canvas, 0, 0),
			Err(CoderError::CanvasCanNotContainImage)
		);
		assert_eq!(verify_tile(&canvas, 0, 0, 0), Err(CoderError::CanvasCanNotContainImage));

		let mut canvas = Canvas::new(TILE_WIDTH, TILE_HEIGHT, 0);
		assert_eq!(decode_tile(&[0; 511], &mut canvas, 0, 0), Err(CoderError::InvalidDataSize));
	}
}
