use std::collections::HashMap;

/// Tag key holding the literal default value.
pub const DEFAULT_KEY: &str = "default";
/// Tag key holding the literal that counts as empty for non-optional fields.
pub const NIL_KEY: &str = "nil";
/// Tag key holding a choice list or a `min:max` bound pair.
pub const RANGE_KEY: &str = "range";

/// Key/value pairs parsed from one field tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagMap {
	entries: HashMap<Box<str>, Box<str>>,
}

impl TagMap {
	/// Parse a `;`-separated list of `key=value` pairs.
	///
	/// Empty segments and segments without exactly one `=` are skipped. Later keys overwrite earlier ones.
	pub fn parse(tag: &str) -> Self {
		let mut entries = HashMap::new();
		for segment in tag.split(';') {
			if segment.is_empty() {
				continue;
			}
			let mut parts = segment.split('=');
			let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
				continue;
			};
			entries.insert(Box::from(key), Box::from(value));
		}
		Self { entries }
	}

	/// Look up a raw value by key.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.entries.get(key).map(|value| value.as_ref())
	}

	/// `default` literal, if declared.
	pub fn default_value(&self) -> Option<&str> {
		self.get(DEFAULT_KEY)
	}

	/// `nil` literal, if declared.
	pub fn nil_value(&self) -> Option<&str> {
		self.get(NIL_KEY)
	}

	/// `range` value, if declared.
	pub fn range(&self) -> Option<&str> {
		self.get(RANGE_KEY)
	}
}

#[cfg(test)]
mod tests {
	use crate::config::TagMap;

	#[test]
	fn parses_known_keys() {
		let tag = TagMap::parse("nil=-1;default=42;range=0:150");
		assert_eq!(tag.nil_value(), Some("-1"));
		assert_eq!(tag.default_value(), Some("42"));
		assert_eq!(tag.range(), Some("0:150"));
	}

	#[test]
	fn skips_empty_and_malformed_segments() {
		let tag = TagMap::parse(";;default=foo;novalue;a=b=c;");
		assert_eq!(tag.default_value(), Some("foo"));
		assert_eq!(tag.get("novalue"), None);
		assert_eq!(tag.get("a"), None);
		assert_eq!(tag, TagMap::parse("default=foo"));
	}

	#[test]
	fn later_duplicates_win() {
		let tag = TagMap::parse("default=first;default=second");
		assert_eq!(tag.default_value(), Some("second"));
	}

	#[test]
	fn keeps_unknown_keys_and_empty_values() {
		let tag = TagMap::parse("omitempty=;default=");
		assert_eq!(tag.get("omitempty"), Some(""));
		assert_eq!(tag.default_value(), Some(""));
	}

	#[test]
	fn empty_tag_parses_to_empty_map() {
		assert_eq!(TagMap::parse(""), TagMap::default());
	}
}
