//! Uncompressed image region coder.
//!
//! Two of the archive sub-types store their images as plain rows of 16-bit
//! pixels. The stored size may fall short of the full rectangle: trailing
//! rows that are entirely transparent are elided, so a region of
//! `data_width`×`data_height` pixels stores only its first
//! `N = data_size / (data_width * 2)` rows.

use crate::file::canvas::Canvas;
use crate::file::error::CoderError;

/// Copies an uncompressed region into `canvas` at `(x, y)`.
///
/// Rows present in `data` are copied verbatim; the remaining rows of the
/// `data_width`×`data_height` rectangle are filled with the transparent raw
/// color.
///
/// # Errors
///
/// Returns [`CoderError::CanvasCanNotContainImage`] if the rectangle does
/// not fit, and [`CoderError::InvalidDataSize`] unless `data.len()` is a
/// positive multiple of the line size no larger than the full rectangle.
pub fn decode_into(
	data: &[u8],
	data_width: usize,
	data_height: usize,
	canvas: &mut Canvas,
	x: usize,
	y: usize,
	transparent_raw_color: u16,
) -> Result<(), CoderError> {
	if !canvas.contains_rect(x, y, data_width, data_height) {
		return Err(CoderError::CanvasCanNotContainImage);
	}
	// the data might not fill every horizontal line
	let line_size = data_width * 2;
	if line_size == 0
		|| data.is_empty()
		|| data.len() > line_size * data_height
		|| !data.len().is_multiple_of(line_size)
	{
		return Err(CoderError::InvalidDataSize);
	}

	let raw_width = canvas.width();
	let pixels = canvas.pixels_mut();
	let lines_with_data = data.len() / line_size;
	let mut source_index = 0usize;
	let mut target_index = x + raw_width * y;
	for _ in 0..lines_with_data {
		for column in 0..data_width {
			pixels[target_index + column] =
				u16::from_le_bytes([data[source_index], data[source_index + 1]]);
			source_index += 2;
		}
		target_index += raw_width;
	}
	for _ in lines_with_data..data_height {
		for column in 0..data_width {
			pixels[target_index + column] = transparent_raw_color;
		}
		target_index += raw_width;
	}

	Ok(())
}

/// Determines the encoded size of the region at `(x, y)` without writing.
///
/// The result is `N * data_width * 2` for the smallest `N` such that all
/// rows from `N` on are entirely transparent. At least one row is always
/// stored so that the encoded size stays positive.
///
/// # Errors
///
/// Returns [`CoderError::CanvasCanNotContainImage`] if the rectangle does
/// not fit.
pub fn encoded_size(
	canvas: &Canvas,
	x: usize,
	y: usize,
	data_width: usize,
	data_height: usize,
	transparent_raw_color: u16,
) -> Result<usize, CoderError> {
	if !canvas.contains_rect(x, y, data_width, data_height) {
		return Err(CoderError::CanvasCanNotContainImage);
	}

	let mut lines_with_data = 0usize;
	for row in 0..data_height {
		let transparent_row = (0..data_width)
			.all(|column| canvas.pixel(x + column, y + row) == transparent_raw_color);
		if !transparent_row {
			lines_with_data = row + 1;
		}
	}

	Ok(lines_with_data.max(1) * data_width * 2)
}

/// Copies `data_size` bytes of the region at `(x, y)` out of the canvas,
/// appending them to `out`.
///
/// The rows beyond the stored ones are validated to be entirely transparent;
/// they are elided from the output and would otherwise lose pixels.
///
/// # Errors
///
/// Returns [`CoderError::CanvasCanNotContainImage`] if the rectangle does
/// not fit, [`CoderError::InvalidDataSize`] if `data_size` does not relate
/// to the dimensions, and [`CoderError::ExpectedTransparentPixel`] if an
/// elided row holds a color.
#[allow(clippy::too_many_arguments)]
pub fn encode_into(
	canvas: &Canvas,
	x: usize,
	y: usize,
	data_width: usize,
	data_height: usize,
	transparent_raw_color: u16,
	data_size: usize,
	out: &mut Vec<u8>,
) -> Result<(), CoderError> {
	if !canvas.contains_rect(x, y, data_width, data_height) {
		return Err(CoderError::CanvasCanNotContainImage);
	}
	let line_size = data_width * 2;
	if line_size == 0
		|| data_size == 0
		|| data_size > line_size * data_height
		|| !data_size.is_multiple_of(line_size)
	{
		return Err(CoderError::InvalidDataSize);
	}

	let lines_with_data = data_size / line_size;
	for row in lines_with_data..data_height {
		for column in 0..data_width {
			if canvas.pixel(x + column, y + row) != transparent_raw_color {
				return Err(CoderError::ExpectedTransparentPixel);
			}
		}
	}

	out.reserve(data_size);
	for row in 0..lines_with_data {
		for column in 0..data_width {
			out.extend_from_slice(&canvas.pixel(x + column, y + row).to_le_bytes());
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_decode_fills_elided_rows() {
		// two stored rows out of four
		let data: Vec<u8> = [0x0102u16, 0x0304, 0x0506, 0x0708]
			.iter()
			.flat_map(|value| value.to_le_bytes())
			.collect();
		let mut canvas = Canvas::new(2, 4, 0x7777);
		decode_into(&data, 2, 4, &mut canvas, 0, 0, 0x0000).unwrap();
		assert_eq!(
			canvas.pixels(),
			&[0x0102, 0x0304, 0x0506, 0x0708, 0x0000, 0x0000, 0x0000, 0x0000]
		);
	}

	#[test]
	fn test_decode_rejects_unrelated_sizes() {
		let mut canvas = Canvas::new(2, 2, 0);
		assert_eq!(decode_into(&[0; 6], 2, 2, &mut canvas, 0, 0, 0), Err(CoderError::InvalidDataSize));
		assert_eq!(decode_into(&[0; 12], 2, 2, &mut canvas, 0, 0, 0), Err(CoderError::InvalidDataSize));
		assert_eq!(decode_into(&[], 2, 2, &mut canvas, 0, 0, 0), Err(CoderError::InvalidDataSize));
	}

	#[test]
	fn test_size_discovery_elides_transparent_tail() {
		let mut canvas = Canvas::new(3, 4, 0);
		canvas.pixels_mut()[0] = 0x8001;
		canvas.pixels_mut()[4] = 0x8002; // row 1 holds the last color

		assert_eq!(encoded_size(&canvas, 0, 0, 3, 4, 0).unwrap(), 2 * 3 * 2);
	}

	#[test]
	fn test_size_discovery_keeps_interior_transparency() {
		// a fully transparent row between two colored ones stays stored
		let mut canvas = Canvas::new(2, 3, 0);
		canvas.pixels_mut()[0] = 0x8001;
		canvas.pixels_mut()[4] = 0x8002;

		assert_eq!(encoded_size(&canvas, 0, 0, 2, 3, 0).unwrap(), 3 * 2 * 2);
	}

	#[test]
	fn test_size_discovery_stores_at_least_one_row() {
		let canvas = Canvas::new(2, 2, 0);
		assert_eq!(encoded_size(&canvas, 0, 0, 2, 2, 0).unwrap(), 2 * 2);
	}

	#[test]
	fn test_encode_validates_elided_rows() {
		let mut canvas = Canvas::new(2, 3, 0);
		canvas.pixels_mut()[0] = 0x8001;
		canvas.pixels_mut()[5] = 0x8002;

		let mut out = Vec::new();
		assert_eq!(
			encode_into(&canvas, 0, 0, 2, 3, 0, 4, &mut out),
			Err(CoderError::ExpectedTransparentPixel)
		);
	}

	#[test]
	fn test_roundtrip() {
		let mut canvas = Canvas::new(4, 4, 0);
		for i in 0..8 {
			canvas.pixels_mut()[i] = 0x8000 | i as u16;
		}

		let size = encoded_size(&canvas, 0, 0, 4, 4, 0).unwrap();
		assert_eq!(size, 2 * 4 * 2);
		let mut data = Vec::new();
		encode_into(&canvas, 0, 0, 4, 4, 0, size, &mut data).unwrap();

		let mut decoded = Canvas::new(4, 4, 0);
		decode_into(&data, 4, 4, &mut decoded, 0, 0, 0).unwrap();
		assert_eq!(decoded, canvas);
	}
}
