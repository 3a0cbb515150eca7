use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::config::{ConfigError, Result};

/// File format able to carry a configuration tree.
///
/// Codecs work on the format-neutral [`serde_json::Value`] tree so that callers can merge and inspect documents
/// regardless of the on-disk syntax.
pub trait Codec: Debug + Send + Sync {
	/// Registry name, matched against file extensions.
	fn name(&self) -> &'static str;

	/// Encode a tree into file bytes.
	fn encode(&self, tree: &Value) -> Result<Vec<u8>>;

	/// Decode file bytes into a tree.
	fn decode(&self, bytes: &[u8]) -> Result<Value>;
}

/// Pretty-printed JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl Codec for JsonCodec {
	fn name(&self) -> &'static str {
		"json"
	}

	fn encode(&self, tree: &Value) -> Result<Vec<u8>> {
		let mut bytes = serde_json::to_vec_pretty(tree).map_err(|err| encode_error(self, err))?;
		bytes.push(b'\n');
		Ok(bytes)
	}

	fn decode(&self, bytes: &[u8]) -> Result<Value> {
		serde_json::from_slice(bytes).map_err(|err| decode_error(self, err))
	}
}

/// TOML documents. Null entries are dropped on encode since TOML has no null.
#[derive(Debug, Default, Clone, Copy)]
pub struct TomlCodec;

impl Codec for TomlCodec {
	fn name(&self) -> &'static str {
		"toml"
	}

	fn encode(&self, tree: &Value) -> Result<Vec<u8>> {
		let mut tree = tree.clone();
		strip_nulls(&mut tree);
		let text = toml::to_string_pretty(&tree).map_err(|err| encode_error(self, err))?;
		Ok(text.into_bytes())
	}

	fn decode(&self, bytes: &[u8]) -> Result<Value> {
		let text = std::str::from_utf8(bytes).map_err(|err| decode_error(self, err))?;
		toml::from_str(text).map_err(|err| decode_error(self, err))
	}
}

fn strip_nulls(tree: &mut Value) {
	match tree {
		Value::Object(map) => {
			map.retain(|_, value| !value.is_null());
			map.values_mut().for_each(strip_nulls);
		}
		Value::Array(items) => items.iter_mut().for_each(strip_nulls),
		_ => {}
	}
}

fn encode_error(codec: &dyn Codec, err: impl std::fmt::Display) -> ConfigError {
	ConfigError::Encode {
		codec: codec.name(),
		reason: err.to_string(),
	}
}

fn decode_error(codec: &dyn Codec, err: impl std::fmt::Display) -> ConfigError {
	ConfigError::Decode {
		codec: codec.name(),
		reason: err.to_string(),
	}
}

/// Name to codec mapping consulted by the file entry points.
#[derive(Debug, Default)]
pub struct CodecRegistry {
	codecs: Mutex<HashMap<Box<str>, Arc<dyn Codec>>>,
}

impl CodecRegistry {
	/// Create an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry holding the built-in `json` and `toml` codecs.
	pub fn builtin() -> Self {
		let mut codecs: HashMap<Box<str>, Arc<dyn Codec>> = HashMap::new();
		for codec in [Arc::new(JsonCodec) as Arc<dyn Codec>, Arc::new(TomlCodec)] {
			codecs.insert(Box::from(codec.name()), codec);
		}
		Self { codecs: Mutex::new(codecs) }
	}

	/// Process-wide registry, seeded with the built-in codecs.
	pub fn global() -> &'static CodecRegistry {
		static GLOBAL: OnceLock<CodecRegistry> = OnceLock::new();
		GLOBAL.get_or_init(CodecRegistry::builtin)
	}

	/// Register `codec` under its own name.
	pub fn register(&self, codec: Arc<dyn Codec>) -> Result<()> {
		let name = codec.name();
		let mut codecs = self.codecs.lock();
		if codecs.contains_key(name) {
			return Err(ConfigError::CodecAlreadyRegistered { name: name.to_owned() });
		}
		codecs.insert(Box::from(name), codec);
		drop(codecs);
		debug!(name, "codec registered");
		Ok(())
	}

	/// Codec registered under `name`.
	pub fn get(&self, name: &str) -> Result<Arc<dyn Codec>> {
		self.codecs
			.lock()
			.get(name)
			.cloned()
			.ok_or_else(|| ConfigError::CodecNotRegistered { name: name.to_owned() })
	}

	/// Registered names in lexical order.
	pub fn names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.codecs.lock().keys().map(|name| name.to_string()).collect();
		names.sort();
		names
	}
}
