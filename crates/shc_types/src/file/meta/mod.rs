//! Resource meta sidecar format, version 1.
//!
//! A very simple line-oriented text format describing an extracted resource.
//!
//! - The file is a list of *objects* separated by blank lines. Object order
//!   is significant.
//! - An object starts with a line holding its identifier, a space and a
//!   version number.
//! - Every further line of the object is either a list entry (`- value`,
//!   order significant) or a map entry (`: key = value`, order not
//!   significant). `=` may not appear in keys but may appear in values.
//!   Keys are conceptually unique; a repeated key overwrites the earlier
//!   value with a warning.
//! - A `#` starts a comment reaching to the end of the line. Leading and
//!   trailing whitespace around identifiers, keys and values is ignored.
//! - The first object must be the `RESOURCE_META_HEADER`; its version
//!   governs the file-level schema and is always readable as version 1.
//!
//! ```text
//! RESOURCE_META_HEADER 1
//! : key 1 = value 1
//! - list entry 1
//!
//! OBJECT 1
//! : key 1 = value 1
//! - list entry 1  # a comment
//! ```

pub mod writer;

pub use writer::Writer;

use std::collections::HashMap;

use crate::file::error::MetaError;

/// Identifier of the mandatory first object of every meta file.
pub const RESOURCE_META_HEADER: &str = "RESOURCE_META_HEADER";
/// Version written by this implementation.
pub const CURRENT_VERSION: u32 = 1;

/// Comment marker character.
pub const COMMENT_CHARACTER: char = '#';
/// List entry marker character.
pub const LIST_ITEM_CHARACTER: char = '-';
/// Map entry marker character.
pub const MAP_ITEM_CHARACTER: char = ':';
/// Separator between map entry key and value.
pub const MAP_SEPARATOR_CHARACTER: char = '=';

/// Conversion from a meta entry string into a typed value.
///
/// Unsigned types accept an optional `0x` prefix for hexadecimal values,
/// matching how pixel colors are written to sidecars.
pub trait FromMetaValue: Sized {
	/// Parses `value`, returning `None` when it does not fill the type.
	fn from_meta(value: &str) -> Option<Self>;
}

macro_rules! impl_from_meta_unsigned {
	($($ty:ty),*) => {
		$(impl FromMetaValue for $ty {
			fn from_meta(value: &str) -> Option<Self> {
				if let Some(hex) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
					<$ty>::from_str_radix(hex, 16).ok()
				} else {
					value.parse().ok()
				}
			}
		})*
	};
}

macro_rules! impl_from_meta_signed {
	($($ty:ty),*) => {
		$(impl FromMetaValue for $ty {
			fn from_meta(value: &str) -> Option<Self> {
				value.parse().ok()
			}
		})*
	};
}

impl_from_meta_unsigned!(u8, u16, u32, u64, usize);
impl_from_meta_signed!(i8, i16, i32, i64);

/// A single parsed meta object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
	identifier: String,
	version: u32,
	list_entries: Vec<String>,
	map_entries: HashMap<String, String>,
}

impl Object {
	/// Identifier naming the handler for this object.
	pub fn identifier(&self) -> &str {
		&self.identifier
	}

	/// Schema version of this object.
	pub fn version(&self) -> u32 {
		self.version
	}

	/// The ordered list entries.
	pub fn list_entries(&self) -> &[String] {
		&self.list_entries
	}

	/// The unordered map entries.
	pub fn map_entries(&self) -> &HashMap<String, String> {
		&self.map_entries
	}

	/// Checks identifier and version against a schema.
	///
	/// # Errors
	///
	/// Returns [`MetaError::UnexpectedObject`] or
	/// [`MetaError::UnsupportedVersion`].
	pub fn expect(&self, identifier: &'static str, supported_versions: &[u32]) -> Result<(), MetaError> {
		if self.identifier != identifier {
			return Err(MetaError::UnexpectedObject {
				expected: identifier,
				found: self.identifier.clone(),
			});
		}
		if !supported_versions.contains(&self.version) {
			return Err(MetaError::UnsupportedVersion {
				identifier: self.identifier.clone(),
				version: self.version,
			});
		}
		Ok(())
	}

	/// Checks that the object holds exactly the expected number of entries.
	///
	/// # Errors
	///
	/// Returns [`MetaError::EntryCount`].
	pub fn expect_entry_counts(&self, map_entries: usize, list_entries: usize) -> Result<(), MetaError> {
		if self.map_entries.len() != map_entries || self.list_entries.len() != list_entries {
			return Err(MetaError::EntryCount {
				identifier: self.identifier.clone(),
			});
		}
		Ok(())
	}

	/// Returns a required map entry as string.
	///
	/// # Errors
	///
	/// Returns [`MetaError::MissingMapEntry`].
	pub fn map_str(&self, key: &str) -> Result<&str, MetaError> {
		self.map_entries
			.get(key)
			.map(String::as_str)
			.ok_or_else(|| MetaError::MissingMapEntry {
				identifier: self.identifier.clone(),
				key: key.to_string(),
			})
	}

	/// Returns a required map entry parsed as `T`.
	///
	/// # Errors
	///
	/// Returns [`MetaError::MissingMapEntry`] or [`MetaError::InvalidNumber`].
	pub fn map_value<T: FromMetaValue>(&self, key: &str) -> Result<T, MetaError> {
		let value = self.map_str(key)?;
		T::from_meta(value).ok_or_else(|| MetaError::InvalidNumber {
			identifier: self.identifier.clone(),
			value: value.to_string(),
		})
	}

	/// Returns the list entry at `index` parsed as `T`.
	///
	/// # Errors
	///
	/// Returns [`MetaError::EntryCount`] when the entry does not exist, and
	/// [`MetaError::InvalidNumber`] when it does not parse.
	pub fn list_value<T: FromMetaValue>(&self, index: usize) -> Result<T, MetaError> {
		let value = self.list_entries.get(index).ok_or_else(|| MetaError::EntryCount {
			identifier: self.identifier.clone(),
		})?;
		T::from_meta(value).ok_or_else(|| MetaError::InvalidNumber {
			identifier: self.identifier.clone(),
			value: value.clone(),
		})
	}

	fn parse_first_line(line: &str) -> Result<Self, MetaError> {
		let Some((identifier, version)) = line.split_once(char::is_whitespace) else {
			return Err(MetaError::MissingVersion {
				line: line.to_string(),
			});
		};
		let identifier = identifier.trim().to_string();
		let version_value = version.trim();
		let version =
			u32::from_meta(version_value).ok_or_else(|| MetaError::MalformedVersion {
				identifier: identifier.clone(),
				value: version_value.to_string(),
			})?;
		Ok(Self {
			identifier,
			version,
			list_entries: Vec::new(),
			map_entries: HashMap::new(),
		})
	}

	fn parse_entry_line(&mut self, line: &str) -> Result<(), MetaError> {
		if let Some(value) = line.strip_prefix(LIST_ITEM_CHARACTER) {
			self.list_entries.push(value.trim().to_string());
			return Ok(());
		}
		if let Some(entry) = line.strip_prefix(MAP_ITEM_CHARACTER) {
			let Some((key, value)) = entry.split_once(MAP_SEPARATOR_CHARACTER) else {
				return Err(MetaError::MissingMapSeparator {
					line: line.to_string(),
				});
			};
			let key = key.trim().to_string();
			let value = value.trim().to_string();
			if let Some(previous) = self.map_entries.insert(key.clone(), value) {
				log::warn!(
					"{} object repeats map key '{key}', overwriting earlier value '{previous}'",
					self.identifier
				);
			}
			return Ok(());
		}
		Err(MetaError::MalformedLine {
			line: line.to_string(),
		})
	}
}

/// A fully parsed meta sidecar file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaFile {
	header: Object,
	objects: Vec<Object>,
}

impl MetaFile {
	/// Reads and parses a meta file from disk.
	///
	/// # Errors
	///
	/// Returns [`MetaError`] on IO failures and malformed content.
	pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, MetaError> {
		let text = std::fs::read_to_string(path)?;
		Self::parse(&text)
	}

	/// Parses a meta file from text.
	///
	/// # Errors
	///
	/// Returns [`MetaError`] on malformed content, a missing header object
	/// or an empty file.
	pub fn parse(text: &str) -> Result<Self, MetaError> {
		let mut objects: Vec<Object> = Vec::new();
		let mut current: Option<Object> = None;

		for raw_line in text.lines() {
			if raw_line.trim().is_empty() {
				// blank lines separate objects
				if let Some(object) = current.take() {
					objects.push(object);
				}
				continue;
			}
			let line = match raw_line.split_once(COMMENT_CHARACTER) {
				Some((content, _)) => content.trim(),
				None => raw_line.trim(),
			};
			if line.is_empty() {
				// comment-only lines do not terminate an object
				continue;
			}
			match current.as_mut() {
				None => current = Some(Object::parse_first_line(line)?),
				Some(object) => object.parse_entry_line(line)?,
			}
		}
		if let Some(object) = current.take() {
			objects.push(object);
		}

		if objects.is_empty() {
			return Err(MetaError::EmptyFile);
		}
		let header = objects.remove(0);
		if header.identifier != RESOURCE_META_HEADER {
			return Err(MetaError::MissingHeader {
				expected: RESOURCE_META_HEADER,
				found: header.identifier,
			});
		}

		Ok(Self { header, objects })
	}

	/// The mandatory header object.
	pub fn header(&self) -> &Object {
		&self.header
	}

	/// All objects after the header, in file order.
	pub fn objects(&self) -> &[Object] {
		&self.objects
	}

	/// The object at `index`, diagnosing a truncated file.
	///
	/// # Errors
	///
	/// Returns [`MetaError::MissingObject`] when the file holds fewer
	/// objects; `expected` names the schema for the diagnostic.
	pub fn object(&self, index: usize, expected: &'static str) -> Result<&Object, MetaError> {
		self.objects.get(index).ok_or(MetaError::MissingObject { expected })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const EXAMPLE: &str = "\
# a file comment
RESOURCE_META_HEADER 1
: key 1 = value 1
- list entry 1

OBJECT 1
:key 1=value 1
:key 2 = value = with separator
-list entry 1
- list entry 2  # trailing comment
-
";

	#[test]
	fn test_parse_example() {
		let file = MetaFile::parse(EXAMPLE).unwrap();
		assert_eq!(file.header().identifier(), RESOURCE_META_HEADER);
		assert_eq!(file.header().version(), 1);
		assert_eq!(file.header().map_str("key 1").unwrap(), "value 1");
		assert_eq!(file.header().list_entries(), ["list entry 1"]);

		assert_eq!(file.objects().len(), 1);
		let object = file.object(0, "OBJECT").unwrap();
		assert_eq!(object.identifier(), "OBJECT");
		assert_eq!(object.map_str("key 1").unwrap(), "value 1");
		assert_eq!(object.map_str("key 2").unwrap(), "value = with separator");
		assert_eq!(object.list_entries(), ["list entry 1", "list entry 2", ""]);
	}

	#[test]
	fn test_parse_numbers() {
		let file = MetaFile::parse("RESOURCE_META_HEADER 1\n: pixel = 0xF81F\n- -12\n- 42\n").unwrap();
		assert_eq!(file.header().map_value::<u16>("pixel").unwrap(), 0xF81F);
		assert_eq!(file.header().list_value::<i16>(0).unwrap(), -12);
		assert_eq!(file.header().list_value::<u32>(1).unwrap(), 42);
		assert!(matches!(
			file.header().list_value::<u8>(0),
			Err(MetaError::InvalidNumber { .. })
		));
	}

	#[test]
	fn test_duplicate_key_overwrites() {
		let file = MetaFile::parse("RESOURCE_META_HEADER 1\n: key = old\n: key = new\n").unwrap();
		assert_eq!(file.header().map_str("key").unwrap(), "new");
	}

	#[test]
	fn test_empty_file() {
		assert!(matches!(MetaFile::parse(""), Err(MetaError::EmptyFile)));
		assert!(matches!(MetaFile::parse("# only a comment\n\n"), Err(MetaError::EmptyFile)));
	}

	#[test]
	fn test_missing_header() {
		assert!(matches!(
			MetaFile::parse("SOMETHING 1\n- entry\n"),
			Err(MetaError::MissingHeader { .. })
		));
	}

	#[test]
	fn test_malformed_version() {
		assert!(matches!(
			MetaFile::parse("RESOURCE_META_HEADER\n"),
			Err(MetaError::MissingVersion { .. })
		));
		assert!(matches!(
			MetaFile::parse("RESOURCE_META_HEADER one\n"),
			Err(MetaError::MalformedVersion { .. })
		));
	}

	#[test]
	fn test_malformed_entries() {
		assert!(matches!(
			MetaFile::parse("RESOURCE_META_HEADER 1\n: key value\n"),
			Err(MetaError::MissingMapSeparator { .. })
		));
		assert!(matches!(
			MetaFile::parse("RESOURCE_META_HEADER 1\nstray content\n"),
			Err(MetaError::MalformedLine { .. })
		));
	}

	#[test]
	fn test_expect_helpers() {
		let file = MetaFile::parse("RESOURCE_META_HEADER 1\n\nTgxHeader 3\n- 10\n- 20\n").unwrap();
		let object = file.object(0, "TgxHeader").unwrap();
		assert!(object.expect("TgxHeader", &[1, 3]).is_ok());
		assert!(matches!(
			object.expect("TgxHeader", &[1]),
			Err(MetaError::UnsupportedVersion { .. })
		));
		assert!(matches!(
			object.expect("Gm1Resource", &[1]),
			Err(MetaError::UnexpectedObject { .. })
		));
		assert!(object.expect_entry_counts(0, 2).is_ok());
		assert!(matches!(object.expect_entry_counts(1, 2), Err(MetaError::EntryCount { .. })));
		assert!(matches!(file.object(1, "Missing"), Err(MetaError::MissingObject { .. })));
	}
}
