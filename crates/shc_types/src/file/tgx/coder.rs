//! TGX pixel stream coder.
//!
//! ## Stream format
//!
//! A TGX stream is a sequence of tokens that fills a `width`×`height` image
//! row by row. Each token starts with a marker byte whose top three bits
//! select the token kind and whose low five bits hold the pixel count minus
//! one (counts 1..=32):
//!
//! | Marker | Kind               | Payload                                  |
//! |--------|--------------------|------------------------------------------|
//! | `0x00` | Stream of pixels   | `count` pixels (2 bytes each, 1 indexed) |
//! | `0x20` | Transparent pixels | none                                     |
//! | `0x40` | Repeating pixels   | one pixel value (2 bytes, 1 indexed)     |
//! | `0x80` | Newline            | none                                     |
//!
//! The remaining top-bit patterns (`0x60`, `0xA0`, `0xC0`, `0xE0`) are
//! unknown markers and rejected. A row either produces exactly `width`
//! pixels or ends early with a newline, in which case the rest of the row is
//! transparent. Rows reaching `width` without an explicit newline wrap
//! implicitly. After the last row, extra newline bytes pad the stream to a
//! multiple of the configured padding alignment.
//!
//! ## Color modes
//!
//! Animation archives store one palette index byte per pixel instead of a
//! 16-bit color. The coder widens indexed pixels to `0xFF00 | index` on
//! decode and narrows them back on encode, so canvases are always 16 bit.
//! Indexed rows additionally short-circuit trailing transparency straight
//! into the newline token.
//!
//! ## Encoding determinism
//!
//! For a fixed canvas, transparent raw color, repeat threshold and padding
//! alignment the encoder output is byte-for-byte reproducible. Repeat
//! detection looks ahead across row boundaries to judge whether a run
//! reaches the threshold, but tokens themselves never span rows.

use crate::file::canvas::Canvas;
use crate::file::error::CoderError;

/// Marker bits for a literal stream-of-pixels token.
pub const MARKER_STREAM_OF_PIXELS: u8 = 0x00;
/// Marker bits for a transparent-pixels token.
pub const MARKER_TRANSPARENT_PIXELS: u8 = 0x20;
/// Marker bits for a repeating-pixels token.
pub const MARKER_REPEATING_PIXELS: u8 = 0x40;
/// Marker bits for an end-of-line token.
pub const MARKER_NEWLINE: u8 = 0x80;

/// Mask selecting the marker bits of a token byte.
pub const MARKER_MASK: u8 = 0xE0;
/// Mask selecting the count field of a token byte.
pub const COUNT_MASK: u8 = 0x1F;

/// Maximum number of pixels a single token can carry.
pub const MAX_PIXELS_PER_MARKER: usize = 32;

/// Alpha bits used to widen an indexed pixel byte into a canvas pixel.
pub const INDEXED_COLOR_ALPHA: u16 = 0xFF00;

/// On-disk pixel representation of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
	/// 16-bit ARGB1555 pixels, two bytes per pixel.
	Direct,
	/// One palette index byte per pixel, widened to `0xFF00 | index`.
	Indexed,
}

impl ColorMode {
	/// Number of bytes a single pixel occupies in the stream.
	pub fn pixel_size(self) -> usize {
		match self {
			Self::Direct => 2,
			Self::Indexed => 1,
		}
	}
}

/// Tuning values shared by all coder runs.
///
/// The defaults reproduce the streams shipped with the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoderConfig {
	/// Color the game itself uses as an in-stream transparency sentinel
	/// (magenta in ARGB1555). Kept configurable; repeating-pixel tokens seem
	/// excluded from this convention.
	pub transparent_tgx_color: u16,
	/// Canvas value that represents "no pixel" on the raw side.
	pub transparent_raw_color: u16,
	/// Minimum run length that is emitted as a repeating-pixels token.
	pub pixel_repeat_threshold: usize,
	/// Encoded streams are padded with newlines to a multiple of this.
	pub padding_alignment: usize,
}

impl Default for CoderConfig {
	fn default() -> Self {
		Self {
			transparent_tgx_color: 0xF81F,
			transparent_raw_color: 0x0000,
			pixel_repeat_threshold: 3,
			padding_alignment: 4,
		}
	}
}

impl std::fmt::Display for CoderConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		writeln!(f, "Transparent Pixel TGX Color: {:#06x}", self.transparent_tgx_color)?;
		writeln!(f, "Transparent Pixel Raw Color: {:#06x}", self.transparent_raw_color)?;
		writeln!(f, "Pixel Repeat Threshold: {}", self.pixel_repeat_threshold)?;
		write!(f, "Padding Alignment: {}", self.padding_alignment)
	}
}

/// Structural statistics collected while scanning a stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TgxAnalysis {
	/// Number of stream-of-pixels tokens.
	pub pixel_stream_marker_count: usize,
	/// Pixels produced by stream-of-pixels tokens.
	pub pixel_stream_pixel_count: usize,
	/// Number of transparent-pixels tokens.
	pub transparent_marker_count: usize,
	/// Pixels skipped by transparent-pixels tokens.
	pub transparent_pixel_count: usize,
	/// Number of repeating-pixels tokens.
	pub repeating_marker_count: usize,
	/// Pixels produced by repeating-pixels tokens.
	pub repeating_pixel_count: usize,
	/// Number of newline tokens that ended a row.
	pub newline_marker_count: usize,
	/// Pixels left transparent by rows that ended short of the width.
	pub unfinished_width_pixel_count: usize,
	/// Rows that reached the width without an explicit newline token.
	pub newline_without_marker_count: usize,
	/// Newline tokens past the last row, used as alignment padding.
	pub padding_newline_marker_count: usize,
}

impl std::fmt::Display for TgxAnalysis {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		writeln!(f, "Marker Count Pixel Stream: {}", self.pixel_stream_marker_count)?;
		writeln!(f, "Pixel Stream Pixel Count: {}", self.pixel_stream_pixel_count)?;
		writeln!(f, "Marker Count Transparent: {}", self.transparent_marker_count)?;
		writeln!(f, "Transparent Pixel Count: {}", self.transparent_pixel_count)?;
		writeln!(f, "Marker Count Repeating Pixels: {}", self.repeating_marker_count)?;
		writeln!(f, "Repeating Pixels Pixel Count: {}", self.repeating_pixel_count)?;
		writeln!(f, "Marker Count Newline: {}", self.newline_marker_count)?;
		writeln!(f, "Unfinished Width Pixel Count: {}", self.unfinished_width_pixel_count)?;
		writeln!(f, "Newline Without Marker Count: {}", self.newline_without_marker_count)?;
		write!(f, "Padding Newline Marker Count: {}", self.padding_newline_marker_count)
	}
}

/// Scans a stream without producing pixels, verifying its structure against
/// the given dimensions and collecting [`TgxAnalysis`] statistics.
///
/// # Errors
///
/// Returns the first structural defect found, see [`CoderError`].
pub fn analyze(
	data: &[u8],
	width: usize,
	height: usize,
	mode: ColorMode,
) -> Result<TgxAnalysis, CoderError> {
	let pixel_size = mode.pixel_size();
	let mut analysis = TgxAnalysis::default();

	let mut current_width = 0usize;
	let mut current_height = 0usize;

	let mut source_index = 0usize;
	while source_index < data.len() {
		let token = data[source_index];
		let marker = token & MARKER_MASK;
		let pixel_number = (token & COUNT_MASK) as usize + 1;
		source_index += 1;

		if marker == MARKER_NEWLINE {
			// newlines past the bottom of the image are alignment padding
			if current_width == 0 && current_height == height {
				analysis.padding_newline_marker_count += 1;
				continue;
			}
			analysis.newline_marker_count += 1;

			if current_width < width {
				analysis.unfinished_width_pixel_count += width - current_width;
			}

			current_width = 0;
			current_height += 1;
			if current_height > height {
				return Err(CoderError::HeightTooBig);
			}
			continue;
		}

		// not every producer emits the explicit newline
		if current_width == width {
			analysis.newline_without_marker_count += 1;
			current_width = 0;
			current_height += 1;
			if current_height > height {
				return Err(CoderError::HeightTooBig);
			}
		}

		// pixel tokens past the bottom of the image would fall outside any
		// canvas the dimensions promise
		if current_height == height {
			return Err(CoderError::HeightTooBig);
		}

		match marker {
			MARKER_STREAM_OF_PIXELS => {
				analysis.pixel_stream_marker_count += 1;
				analysis.pixel_stream_pixel_count += pixel_number;
				source_index += pixel_number * pixel_size;
			}
			MARKER_REPEATING_PIXELS => {
				analysis.repeating_marker_count += 1;
				analysis.repeating_pixel_count += pixel_number;
				source_index += pixel_size;
			}
			MARKER_TRANSPARENT_PIXELS => {
				analysis.transparent_marker_count += 1;
				analysis.transparent_pixel_count += pixel_number;
			}
			_ => return Err(CoderError::UnknownMarker { marker: token }),
		}

		current_width += pixel_number;
		if current_width > width {
			return Err(CoderError::WidthTooBig);
		}
	}

	if source_index != data.len() {
		return Err(CoderError::InvalidDataSize);
	}
	if current_height < height {
		return Err(CoderError::NotEnoughPixels);
	}

	Ok(analysis)
}

/// Decodes a stream into `canvas`, placing the image with its top left corner
/// at `(x, y)`.
///
/// The stream is fully analyzed first, so a partially written canvas only
/// occurs on canvas placement errors, never on stream defects. Transparent
/// positions are left untouched; the caller guarantees the canvas is
/// pre-filled with the transparent raw color ([`Canvas::new`] does).
///
/// # Errors
///
/// Returns the [`analyze`] result on stream defects,
/// [`CoderError::RawWidthTooSmall`] if the canvas is too narrow for the
/// image at `x`, and [`CoderError::CanvasCanNotContainImage`] if the rows do
/// not fit below `y`.
pub fn decode_into(
	data: &[u8],
	width: usize,
	height: usize,
	mode: ColorMode,
	canvas: &mut Canvas,
	x: usize,
	y: usize,
) -> Result<TgxAnalysis, CoderError> {
	let analysis = analyze(data, width, height, mode)?;

	let raw_width = canvas.width();
	if raw_width < x + width {
		return Err(CoderError::RawWidthTooSmall);
	}
	if canvas.height() < y + height {
		return Err(CoderError::CanvasCanNotContainImage);
	}
	let line_jump = raw_width - width;

	let mut current_width = 0usize;
	let mut current_height = 0usize;
	let mut target_index = x + raw_width * y;
	let pixels = canvas.pixels_mut();

	let mut source_index = 0usize;
	while source_index < data.len() {
		let token = data[source_index];
		let marker = token & MARKER_MASK;
		let pixel_number = (token & COUNT_MASK) as usize + 1;
		source_index += 1;

		if marker == MARKER_NEWLINE {
			if current_width == 0 && current_height == height {
				continue;
			}
			if current_width < width {
				target_index += width - current_width;
			}
			current_width = 0;
			current_height += 1;
			target_index += line_jump;
			continue;
		}

		if current_width == width {
			current_width = 0;
			current_height += 1;
			target_index += line_jump;
		}

		match marker {
			MARKER_STREAM_OF_PIXELS => match mode {
				ColorMode::Indexed => {
					for _ in 0..pixel_number {
						pixels[target_index] = INDEXED_COLOR_ALPHA | u16::from(data[source_index]);
						target_index += 1;
						source_index += 1;
					}
				}
				ColorMode::Direct => {
					for _ in 0..pixel_number {
						pixels[target_index] =
							u16::from_le_bytes([data[source_index], data[source_index + 1]]);
						target_index += 1;
						source_index += 2;
					}
				}
			},
			MARKER_REPEATING_PIXELS => {
				let value = match mode {
					ColorMode::Indexed => {
						let value = INDEXED_COLOR_ALPHA | u16::from(data[source_index]);
						source_index += 1;
						value
					}
					ColorMode::Direct => {
						let value = u16::from_le_bytes([data[source_index], data[source_index + 1]]);
						source_index += 2;
						value
					}
				};
				for _ in 0..pixel_number {
					pixels[target_index] = value;
					target_index += 1;
				}
			}
			MARKER_TRANSPARENT_PIXELS => {
				target_index += pixel_number;
			}
			_ => return Err(CoderError::UnknownMarker { marker: token }),
		}
		current_width += pixel_number;
	}

	Ok(analysis)
}

/// Computes the exact encoded size of the `(x, y, width, height)` canvas
/// rectangle without writing any output.
///
/// This is the dry-run half of the two-pass sizing pattern; a second call to
/// [`encode_into`] with the same arguments produces exactly this many bytes.
///
/// # Errors
///
/// Returns [`CoderError::RawWidthTooSmall`] or
/// [`CoderError::CanvasCanNotContainImage`] on placement errors.
pub fn encoded_size(
	canvas: &Canvas,
	x: usize,
	y: usize,
	width: usize,
	height: usize,
	mode: ColorMode,
	config: &CoderConfig,
) -> Result<usize, CoderError> {
	encode_impl(canvas, x, y, width, height, mode, config, None)
}

/// Encodes the `(x, y, width, height)` canvas rectangle, appending the stream
/// to `out`. Returns the number of bytes written.
///
/// # Errors
///
/// Returns [`CoderError::RawWidthTooSmall`] or
/// [`CoderError::CanvasCanNotContainImage`] on placement errors.
pub fn encode_into(
	canvas: &Canvas,
	x: usize,
	y: usize,
	width: usize,
	height: usize,
	mode: ColorMode,
	config: &CoderConfig,
	out: &mut Vec<u8>,
) -> Result<usize, CoderError> {
	encode_impl(canvas, x, y, width, height, mode, config, Some(out))
}

/// Encodes the `(x, y, width, height)` canvas rectangle into a fresh buffer.
///
/// # Errors
///
/// Same conditions as [`encode_into`].
pub fn encode(
	canvas: &Canvas,
	x: usize,
	y: usize,
	width: usize,
	height: usize,
	mode: ColorMode,
	config: &CoderConfig,
) -> Result<Vec<u8>, CoderError> {
	let size = encoded_size(canvas, x, y, width, height, mode, config)?;
	let mut out = Vec::with_capacity(size);
	encode_into(canvas, x, y, width, height, mode, config, &mut out)?;
	Ok(out)
}

#[allow(clippy::too_many_arguments)]
fn encode_impl(
	canvas: &Canvas,
	x: usize,
	y: usize,
	width: usize,
	height: usize,
	mode: ColorMode,
	config: &CoderConfig,
	mut out: Option<&mut Vec<u8>>,
) -> Result<usize, CoderError> {
	let raw_width = canvas.width();
	if raw_width < x + width {
		return Err(CoderError::RawWidthTooSmall);
	}
	if canvas.height() < y + height {
		return Err(CoderError::CanvasCanNotContainImage);
	}
	let line_jump = raw_width - width;
	let transparent = config.transparent_raw_color;
	let pixels = canvas.pixels();

	let mut result_size = 0usize;
	let mut source_index = x + raw_width * y;
	for row in 0..height {
		let mut column = 0usize;
		while column < width {
			// consume all transparency first
			let mut transparent_count = 0usize;
			while column < width && pixels[source_index] == transparent {
				transparent_count += 1;
				column += 1;
				source_index += 1;
			}

			// indexed rows short-circuit trailing transparency into the newline
			if mode == ColorMode::Direct || column < width {
				while transparent_count > 0 {
					let batch = transparent_count.min(MAX_PIXELS_PER_MARKER);
					transparent_count -= batch;
					result_size += 1;
					if let Some(out) = out.as_mut() {
						out.push(MARKER_TRANSPARENT_PIXELS | (batch - 1) as u8);
					}
				}
			}

			let mut pixel_buffer = [0u16; MAX_PIXELS_PER_MARKER];
			let mut count = 0usize;
			let mut repeating_count = 0usize;
			let mut repeating_pixel = 0u16;
			while column < width && count < MAX_PIXELS_PER_MARKER {
				let next_pixel = pixels[source_index];
				if next_pixel == transparent {
					break;
				}

				// count the repetitions that belong to this row, but look into
				// following rows to decide whether the run reaches the threshold
				let mut temp_column = column;
				let mut temp_row = row;
				let mut temp_source = source_index;
				let mut temp_repeating = 0usize;
				loop {
					if temp_repeating >= MAX_PIXELS_PER_MARKER {
						repeating_count += MAX_PIXELS_PER_MARKER;
						temp_repeating = 0;
					}
					if temp_row != row && temp_repeating >= config.pixel_repeat_threshold {
						break;
					}
					if temp_column >= width {
						temp_row += 1;
						if temp_row >= height {
							break;
						}
						temp_column = 0;
						temp_source += line_jump;
					}
					if pixels[temp_source] != next_pixel {
						break;
					}
					temp_repeating += 1;
					temp_source += 1;
					temp_column += 1;
				}
				// with more than one full batch, the remainder only counts if
				// it reaches the threshold on its own
				if repeating_count == 0 || temp_repeating >= config.pixel_repeat_threshold {
					repeating_count += temp_repeating;
				}
				let reached_threshold = repeating_count >= config.pixel_repeat_threshold;

				// emission is row-local, so never claim pixels of the next row
				let remaining = width - column;
				if remaining < repeating_count {
					repeating_count = remaining;
				}

				if reached_threshold {
					repeating_pixel = next_pixel;
					break;
				}

				// run too short for a repeat token, fold it into the stream buffer
				let adjusted = (count + repeating_count).min(MAX_PIXELS_PER_MARKER);
				while count < adjusted {
					source_index += 1;
					column += 1;
					pixel_buffer[count] = next_pixel;
					count += 1;
				}
				repeating_count = 0;
			}

			if count > 0 {
				let pixel_size = count * mode.pixel_size();
				result_size += 1 + pixel_size;
				if let Some(out) = out.as_mut() {
					out.push(MARKER_STREAM_OF_PIXELS | (count - 1) as u8);
					for &pixel in &pixel_buffer[..count] {
						match mode {
							ColorMode::Indexed => out.push((pixel & !INDEXED_COLOR_ALPHA) as u8),
							ColorMode::Direct => out.extend_from_slice(&pixel.to_le_bytes()),
						}
					}
				}
			}

			while repeating_count > 0 {
				let batch = repeating_count.min(MAX_PIXELS_PER_MARKER);
				repeating_count -= batch;
				column += batch;
				source_index += batch;

				result_size += 1 + mode.pixel_size();
				if let Some(out) = out.as_mut() {
					out.push(MARKER_REPEATING_PIXELS | (batch - 1) as u8);
					match mode {
						ColorMode::Indexed => out.push((repeating_pixel & !INDEXED_COLOR_ALPHA) as u8),
						ColorMode::Direct => out.extend_from_slice(&repeating_pixel.to_le_bytes()),
					}
				}
			}
		}

		result_size += 1;
		if let Some(out) = out.as_mut() {
			out.push(MARKER_NEWLINE);
		}
		source_index += line_jump;
	}

	let remainder = result_size % config.padding_alignment;
	if remainder > 0 {
		let required_padding = config.padding_alignment - remainder;
		result_size += required_padding;
		if let Some(out) = out.as_mut() {
			for _ in 0..required_padding {
				out.push(MARKER_NEWLINE);
			}
		}
	}

	Ok(result_size)
}

/// Renders a stream as a human readable token trace, one token per line.
///
/// Dimensions are not needed for the trace, so only token-level structure is
/// checked: unknown markers and payloads running past the stream end.
///
/// # Errors
///
/// Returns [`CoderError::UnknownMarker`] or [`CoderError::InvalidDataSize`].
pub fn decode_to_text(data: &[u8], mode: ColorMode) -> Result<String, CoderError> {
	use std::fmt::Write;

	let mut text = String::new();
	let mut source_index = 0usize;
	while source_index < data.len() {
		let token = data[source_index];
		let marker = token & MARKER_MASK;
		let pixel_number = (token & COUNT_MASK) as usize + 1;
		source_index += 1;

		match marker {
			MARKER_STREAM_OF_PIXELS => {
				if source_index + pixel_number * mode.pixel_size() > data.len() {
					return Err(CoderError::InvalidDataSize);
				}
				let _ = write!(text, "STREAM_PIXEL {pixel_number}");
				for _ in 0..pixel_number {
					match mode {
						ColorMode::Indexed => {
							let _ = write!(text, " {:#04x}", data[source_index]);
							source_index += 1;
						}
						ColorMode::Direct => {
							let value =
								u16::from_le_bytes([data[source_index], data[source_index + 1]]);
							let _ = write!(text, " {value:#06x}");
							source_index += 2;
						}
					}
				}
				text.push('\n');
			}
			MARKER_REPEATING_PIXELS => {
				if source_index + mode.pixel_size() > data.len() {
					return Err(CoderError::InvalidDataSize);
				}
				match mode {
					ColorMode::Indexed => {
						let _ = writeln!(text, "REPEAT_PIXEL {pixel_number} {:#04x}", data[source_index]);
						source_index += 1;
					}
					ColorMode::Direct => {
						let value = u16::from_le_bytes([data[source_index], data[source_index + 1]]);
						let _ = writeln!(text, "REPEAT_PIXEL {pixel_number} {value:#06x}");
						source_index += 2;
					}
				}
			}
			MARKER_TRANSPARENT_PIXELS => {
				let _ = writeln!(text, "TRANSPARENT_PIXEL {pixel_number}");
			}
			MARKER_NEWLINE => {
				let _ = writeln!(text, "NEWLINE {pixel_number}");
			}
			_ => return Err(CoderError::UnknownMarker { marker: token }),
		}
	}

	Ok(text)
}
