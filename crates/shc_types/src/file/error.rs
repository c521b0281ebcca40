//! Error types for resource file parsing and pixel coding.

use thiserror::Error;

/// Failure kinds shared by the pixel coders (TGX stream, tile, uncompressed region).
///
/// The values are dense and copyable on purpose: container validation runs the
/// coders over every image of an archive and keeps the first failure around
/// together with the image index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CoderError {
	/// Encoded data contains a marker byte outside the known token alphabet
	#[error("encountered unknown marker {marker:#04x} in the encoded data")]
	UnknownMarker {
		/// The offending marker byte
		marker: u8,
	},

	/// A line accumulated more pixels than the width given by the meta data
	#[error("encountered line with bigger width than said by meta data")]
	WidthTooBig,

	/// More lines were produced than the height given by the meta data
	#[error("encountered bigger height than said by meta data")]
	HeightTooBig,

	/// Token consumption ran beyond the given data, or the data size does not
	/// relate to the given dimensions
	#[error("data size does not relate to the given dimensions, data likely invalid or incomplete")]
	InvalidDataSize,

	/// The encoded data ended before enough pixels for the requested
	/// dimensions were produced
	#[error("produced an image with less pixels than required by the requested dimensions")]
	NotEnoughPixels,

	/// The canvas is too narrow to hold the image at the requested x offset
	#[error("canvas width is not compatible with the image width at the requested offset")]
	RawWidthTooSmall,

	/// The image rectangle does not fit into the canvas at the requested offset
	#[error("image can not be contained in the raw pixel canvas")]
	CanvasCanNotContainImage,

	/// A source pixel was expected to be transparent, but holds another color
	#[error("expected to find a transparent pixel in the source, but encountered another color")]
	ExpectedTransparentPixel,
}

/// Errors that can occur when parsing or manipulating resource meta sidecar files
#[derive(Debug, Error)]
pub enum MetaError {
	/// The file contains no objects at all
	#[error("meta file is empty")]
	EmptyFile,

	/// The first object is not the resource meta header
	#[error("meta file does not start with a {expected} object (found '{found}')")]
	MissingHeader {
		/// The required header identifier
		expected: &'static str,
		/// Identifier of the first object that was found instead
		found: String,
	},

	/// An object line carries an identifier but no version number
	#[error("object line '{line}' is missing a version number")]
	MissingVersion {
		/// The offending line
		line: String,
	},

	/// An object version is not a valid integer
	#[error("object '{identifier}' has a malformed version '{value}'")]
	MalformedVersion {
		/// Identifier of the object
		identifier: String,
		/// The value that failed to parse
		value: String,
	},

	/// A map entry line is missing the key/value separator
	#[error("map entry line '{line}' is missing the '=' separator")]
	MissingMapSeparator {
		/// The offending line
		line: String,
	},

	/// A line inside an object is neither a list nor a map entry
	#[error("line '{line}' is neither a list entry nor a map entry")]
	MalformedLine {
		/// The offending line
		line: String,
	},

	/// An object did not have the expected identifier at its position
	#[error("did not receive a {expected} object at the expected position (found '{found}')")]
	UnexpectedObject {
		/// The identifier that was expected
		expected: &'static str,
		/// The identifier that was found
		found: String,
	},

	/// Fewer objects were present than the schema requires
	#[error("meta file ended while a {expected} object was still expected")]
	MissingObject {
		/// The identifier that was expected
		expected: &'static str,
	},

	/// An object has a version this implementation does not support
	#[error("{identifier} object has no supported version (provided version: {version})")]
	UnsupportedVersion {
		/// Identifier of the object
		identifier: String,
		/// The unsupported version
		version: u32,
	},

	/// An object does not have the expected number of map and list entries
	#[error("{identifier} object has not expected number of map and list entries")]
	EntryCount {
		/// Identifier of the object
		identifier: String,
	},

	/// A required map entry is missing
	#[error("{identifier} object has not expected entry '{key}'")]
	MissingMapEntry {
		/// Identifier of the object
		identifier: String,
		/// The missing key
		key: String,
	},

	/// A value could not be parsed as the expected integer type
	#[error("{identifier} object entry '{value}' is not a valid number for its field")]
	InvalidNumber {
		/// Identifier of the object
		identifier: String,
		/// The value that failed to parse
		value: String,
	},

	/// IO error
	#[error(transparent)]
	IOError(#[from] std::io::Error),
}

/// Errors that can occur when loading, validating or rebuilding TGX files
#[derive(Debug, Error)]
pub enum TgxError {
	/// Not enough data for the fixed file header
	#[error("insufficient data: expected at least {expected} bytes, got {actual} bytes")]
	InsufficientData {
		/// Expected number of bytes
		expected: usize,
		/// Actual number of bytes
		actual: usize,
	},

	/// The pixel stream is invalid
	#[error(transparent)]
	Coder(#[from] CoderError),

	/// The meta sidecar is invalid
	#[error(transparent)]
	Meta(#[from] MetaError),

	/// A raw pixel data file does not match the dimensions in the sidecar
	#[error("raw data file has {actual} bytes, but the dimensions require {expected} bytes")]
	DataFileSize {
		/// Number of bytes required by the dimensions
		expected: usize,
		/// Actual size of the data file
		actual: usize,
	},

	/// A saved file did not end up with the predicted size
	#[error("saved file has {actual} bytes instead of the expected {expected} bytes, it might be corrupted")]
	SavedSizeMismatch {
		/// Predicted file size
		expected: u64,
		/// Size of the file on disk
		actual: u64,
	},

	/// IO error
	#[error(transparent)]
	IOError(#[from] std::io::Error),
}

/// Errors that can occur when loading, validating or rebuilding GM1 archives
#[derive(Debug, Error)]
pub enum Gm1Error {
	/// Not enough data for the fixed archive header
	#[error("insufficient data: expected at least {expected} bytes, got {actual} bytes")]
	InsufficientData {
		/// Expected number of bytes
		expected: usize,
		/// Actual number of bytes
		actual: usize,
	},

	/// The image data size in the header does not match the file body
	#[error("archive body does not have the size specified in the header (header: {header}, body: {body})")]
	BodySizeMismatch {
		/// Image data size claimed by the header
		header: u32,
		/// Image data size derived from the file body
		body: u32,
	},

	/// The header carries a sub-type tag outside the known range
	#[error("header does not specify a known GM1 type (found {value})")]
	UnknownType {
		/// The unknown tag value
		value: u32,
	},

	/// The archive holds no image with the requested index
	#[error("archive holds {count} images, there is no image {index}")]
	NoSuchImage {
		/// The requested index
		index: usize,
		/// Number of images in the archive
		count: usize,
	},

	/// An image offset/size pair points outside the image data blob
	#[error("image {index} data (offset {offset}, size {size}) lies outside the image data blob of {available} bytes")]
	ImageOutOfBounds {
		/// Index of the image
		index: usize,
		/// Offset of the image data
		offset: u32,
		/// Size of the image data
		size: u32,
		/// Size of the image data blob
		available: u32,
	},

	/// An animation archive image does not share the archive dimensions
	#[error("image {index} is part of an animation archive, but its dimensions do not match the header")]
	AnimationDimensionMismatch {
		/// Index of the image
		index: usize,
	},

	/// A tile object info carries an unknown image position value
	#[error("image {index} carries unknown image position {value}")]
	InvalidImagePosition {
		/// Index of the image
		index: usize,
		/// The offending byte
		value: u8,
	},

	/// A per-image payload failed to code
	#[error("image {index}: {source}")]
	ImageCoder {
		/// Index of the image
		index: usize,
		/// The coder failure
		source: CoderError,
	},

	/// The meta sidecar is invalid
	#[error(transparent)]
	Meta(#[from] MetaError),

	/// The number of image objects in the sidecar does not match the header
	#[error("header specifies {header} pictures, but the sidecar describes {actual} images")]
	PictureCountMismatch {
		/// Picture count from the header
		header: u32,
		/// Number of image objects found
		actual: usize,
	},

	/// A raw pixel data file does not match the dimensions in the sidecar
	#[error("raw data file of image {index} has {actual} bytes, but the dimensions require {expected} bytes")]
	DataFileSize {
		/// Index of the image
		index: usize,
		/// Number of bytes required by the dimensions
		expected: usize,
		/// Actual size of the data file
		actual: usize,
	},

	/// A palette file does not hold exactly one 256-entry palette
	#[error("palette file {index} has {actual} bytes, expected {expected} bytes")]
	PaletteFileSize {
		/// Index of the palette
		index: usize,
		/// Required palette size in bytes
		expected: usize,
		/// Actual size of the palette file
		actual: usize,
	},

	/// A saved file did not end up with the predicted size
	#[error("saved file has {actual} bytes instead of the expected {expected} bytes, it might be corrupted")]
	SavedSizeMismatch {
		/// Predicted file size
		expected: u64,
		/// Size of the file on disk
		actual: u64,
	},

	/// IO error
	#[error(transparent)]
	IOError(#[from] std::io::Error),
}
