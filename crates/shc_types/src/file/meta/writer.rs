//! Textual writer for resource meta sidecar files.

use std::fmt::Display;
use std::fmt::Write as _;

use super::{COMMENT_CHARACTER, LIST_ITEM_CHARACTER, MAP_ITEM_CHARACTER, MAP_SEPARATOR_CHARACTER};

/// Builds the textual form of a meta file object by object.
///
/// The writer produces exactly the layout the parser reads back: one
/// identifier line per object, map entries before list entries by
/// convention, and a blank line between objects.
#[derive(Debug, Default)]
pub struct Writer {
	buffer: String,
	has_objects: bool,
}

impl Writer {
	/// Creates an empty writer.
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts a new object.
	pub fn start_object(&mut self, identifier: &str, version: u32) -> &mut Self {
		if self.has_objects {
			self.buffer.push('\n');
		}
		self.has_objects = true;
		let _ = writeln!(self.buffer, "{identifier} {version}");
		self
	}

	/// Appends a map entry to the current object.
	pub fn map_entry(&mut self, key: &str, value: impl Display) -> &mut Self {
		let _ = writeln!(
			self.buffer,
			"{MAP_ITEM_CHARACTER} {key} {MAP_SEPARATOR_CHARACTER} {value}"
		);
		self
	}

	/// Appends a list entry to the current object.
	pub fn list_entry(&mut self, value: impl Display) -> &mut Self {
		let _ = writeln!(self.buffer, "{LIST_ITEM_CHARACTER} {value}");
		self
	}

	/// Appends a list entry followed by an explanatory comment.
	pub fn commented_list_entry(&mut self, value: impl Display, comment: &str) -> &mut Self {
		let _ = writeln!(
			self.buffer,
			"{LIST_ITEM_CHARACTER} {value} {COMMENT_CHARACTER} {comment}"
		);
		self
	}

	/// Returns the accumulated text.
	pub fn finish(self) -> String {
		self.buffer
	}
}

#[cfg(test)]
mod tests {
	use crate::file::meta::{CURRENT_VERSION, MetaFile, RESOURCE_META_HEADER};

	use super::*;

	#[test]
	fn test_written_text_parses_back() {
		let mut writer = Writer::new();
		writer
			.start_object(RESOURCE_META_HEADER, CURRENT_VERSION)
			.map_entry("resource type", "TGX");
		writer
			.start_object("TgxHeader", 1)
			.commented_list_entry(240, "width")
			.commented_list_entry(180, "height")
			.list_entry("plain");
		let text = writer.finish();

		let file = MetaFile::parse(&text).unwrap();
		assert_eq!(file.header().map_str("resource type").unwrap(), "TGX");
		let header = file.object(0, "TgxHeader").unwrap();
		assert_eq!(header.list_value::<u32>(0).unwrap(), 240);
		assert_eq!(header.list_value::<u32>(1).unwrap(), 180);
		assert_eq!(header.list_entries()[2], "plain");
	}
}
