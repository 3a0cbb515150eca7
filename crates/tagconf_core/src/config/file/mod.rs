use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::interface::{prepare_for_decode_with, unnamed_payloads};
use crate::config::{CodecRegistry, Node, Result, TypeRegistry, complete_decode, prepare_for_encode};

/// Reads and writes configuration files, choosing the codec by file extension.
#[derive(Debug, Clone, Copy)]
pub struct ConfigIo<'a> {
	types: &'a TypeRegistry,
	codecs: &'a CodecRegistry,
}

impl Default for ConfigIo<'static> {
	fn default() -> Self {
		Self::global()
	}
}

impl<'a> ConfigIo<'a> {
	/// Use explicit registries.
	pub fn new(types: &'a TypeRegistry, codecs: &'a CodecRegistry) -> Self {
		Self { types, codecs }
	}

	/// Type registry consulted for dynamic-type wrappers.
	pub fn types(&self) -> &'a TypeRegistry {
		self.types
	}

	/// Codec registry consulted for file extensions.
	pub fn codecs(&self) -> &'a CodecRegistry {
		self.codecs
	}

	/// Encode `config` into `path`, recording wrapper type names first.
	pub fn write<T>(&self, path: impl AsRef<Path>, config: &mut T) -> Result<()>
	where
		T: Node + Serialize + ?Sized,
	{
		let path = path.as_ref();
		let codec = self.codecs.get(extension(path))?;
		prepare_for_encode(config, self.types)?;

		let tree = serde_json::to_value(&*config)?;
		let bytes = codec.encode(&tree)?;
		fs::write(path, &bytes)?;
		debug!(path = %path.display(), codec = codec.name(), bytes = bytes.len(), "config written");
		Ok(())
	}

	/// Decode `path` over `config`.
	///
	/// Entries missing from the file keep their current value. Dynamic-type wrappers are rebuilt from their recorded
	/// type names, with a second pass when any wrapper was touched. Neither `config` nor the type registry changes
	/// unless the whole file decodes.
	pub fn read<T>(&self, path: impl AsRef<Path>, config: &mut T) -> Result<()>
	where
		T: Node + Serialize + DeserializeOwned,
	{
		let path = path.as_ref();
		let codec = self.codecs.get(extension(path))?;
		let bytes = fs::read(path)?;
		let tree = codec.decode(&bytes)?;

		// Payloads not yet named serialize under their canonical name; they are registered only on success.
		let pending = unnamed_payloads(config)?;
		for (name, entry) in &pending {
			self.types.check_entry(name, entry)?;
		}
		let mut merged = serde_json::to_value(&*config)?;
		merge(&mut merged, tree);

		let mut decoded: T = serde_json::from_value(merged)?;
		let stage = prepare_for_decode_with(&mut decoded, &mut |name: &str| {
			self.types.lookup(name).or_else(|err| {
				pending
					.iter()
					.find(|(pending, _)| *pending == name)
					.map(|(_, entry)| *entry)
					.ok_or(err)
			})
		})?;
		debug!(
			path = %path.display(),
			codec = codec.name(),
			second_pass = stage.needs_second_pass(),
			"config read"
		);
		complete_decode(&mut decoded, stage)?;
		for (name, entry) in pending {
			self.types.register_entry(name, entry)?;
		}
		*config = decoded;
		Ok(())
	}
}

impl ConfigIo<'static> {
	/// Use the process-wide registries.
	pub fn global() -> Self {
		Self::new(TypeRegistry::global(), CodecRegistry::global())
	}
}

/// Codec name for `path`: the text after the last dot of the file name, or empty.
pub fn extension(path: &Path) -> &str {
	path.file_name()
		.and_then(|name| name.to_str())
		.and_then(|name| name.rsplit_once('.'))
		.map_or("", |(_, ext)| ext)
}

/// Overlay `overlay` onto `base`. Maps merge key by key; any other value replaces.
fn merge(base: &mut Value, overlay: Value) {
	match (base, overlay) {
		(Value::Object(base), Value::Object(overlay)) => {
			for (key, value) in overlay {
				match base.get_mut(&key) {
					Some(slot) => merge(slot, value),
					None => {
						base.insert(key, value);
					}
				}
			}
		}
		(base, overlay) => *base = overlay,
	}
}
