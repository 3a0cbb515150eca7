use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::OnceLock;

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{ConfigError, Node, Result};

/// A value that can live inside an [`Interface`](crate::config::Interface).
///
/// Implemented for every `Node + Serialize + DeserializeOwned + Default + Clone + PartialEq + Debug` type. `Box<T>`
/// qualifies too; its zero value allocates the pointee.
pub trait Dynamic: Debug + Send + Sync + Any {
	/// Canonical registry name of the concrete type.
	fn canonical_name(&self) -> &'static str;

	/// Registry entry able to allocate zero values of the concrete type.
	fn type_entry(&self) -> TypeEntry;

	/// View as a tree node.
	fn as_node_mut(&mut self) -> &mut dyn Node;

	/// View as `Any` for downcasting.
	fn as_any(&self) -> &dyn Any;

	/// Mutable view as `Any` for downcasting.
	fn as_any_mut(&mut self) -> &mut dyn Any;

	/// Encode into the format-neutral tree.
	fn to_tree(&self) -> serde_json::Result<serde_json::Value>;

	/// Overwrite from the format-neutral tree.
	fn decode_tree(&mut self, tree: serde_json::Value) -> serde_json::Result<()>;

	/// Clone behind a fresh box.
	fn clone_dynamic(&self) -> Box<dyn Dynamic>;

	/// Compare with another dynamic value of possibly different type.
	fn eq_dynamic(&self, other: &dyn Dynamic) -> bool;
}

impl<T> Dynamic for T
where
	T: Node + Serialize + DeserializeOwned + Default + Clone + PartialEq + Debug + Send + Sync + 'static,
{
	fn canonical_name(&self) -> &'static str {
		std::any::type_name::<T>()
	}

	fn type_entry(&self) -> TypeEntry {
		TypeEntry::of::<T>()
	}

	fn as_node_mut(&mut self) -> &mut dyn Node {
		self
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn as_any_mut(&mut self) -> &mut dyn Any {
		self
	}

	fn to_tree(&self) -> serde_json::Result<serde_json::Value> {
		serde_json::to_value(self)
	}

	fn decode_tree(&mut self, tree: serde_json::Value) -> serde_json::Result<()> {
		*self = serde_json::from_value(tree)?;
		Ok(())
	}

	fn clone_dynamic(&self) -> Box<dyn Dynamic> {
		Box::new(self.clone())
	}

	fn eq_dynamic(&self, other: &dyn Dynamic) -> bool {
		other.as_any().downcast_ref::<T>().is_some_and(|other| self == other)
	}
}

/// Registered concrete type: identity plus a zero-value factory.
#[derive(Debug, Clone, Copy)]
pub struct TypeEntry {
	type_id: TypeId,
	rust_name: &'static str,
	factory: fn() -> Box<dyn Dynamic>,
}

impl TypeEntry {
	/// Entry for `T`.
	pub fn of<T: Dynamic + Default>() -> Self {
		Self {
			type_id: TypeId::of::<T>(),
			rust_name: std::any::type_name::<T>(),
			factory: instantiate::<T>,
		}
	}

	/// Identity of the concrete type.
	pub fn type_id(&self) -> TypeId {
		self.type_id
	}

	/// Rust type name of the concrete type.
	pub fn rust_name(&self) -> &'static str {
		self.rust_name
	}

	/// Allocate a zero value of the concrete type.
	pub fn instantiate(&self) -> Box<dyn Dynamic> {
		(self.factory)()
	}
}

fn instantiate<T: Dynamic + Default>() -> Box<dyn Dynamic> {
	Box::new(T::default())
}

/// Name to type mapping used to rebuild dynamic values after decoding.
///
/// One mutex guards the whole map; it is never held across user code.
#[derive(Debug, Default)]
pub struct TypeRegistry {
	types: Mutex<HashMap<Box<str>, TypeEntry>>,
}

impl TypeRegistry {
	/// Create an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Process-wide registry used by the default [`ConfigIo`](crate::config::ConfigIo).
	pub fn global() -> &'static TypeRegistry {
		static GLOBAL: OnceLock<TypeRegistry> = OnceLock::new();
		GLOBAL.get_or_init(TypeRegistry::new)
	}

	/// Register `T` under its canonical name.
	pub fn register<T: Dynamic + Default>(&self) -> Result<()> {
		self.register_entry(std::any::type_name::<T>(), TypeEntry::of::<T>())
	}

	/// Register `T` under an explicit name.
	pub fn register_as<T: Dynamic + Default>(&self, name: &str) -> Result<()> {
		self.register_entry(name, TypeEntry::of::<T>())
	}

	/// Register the runtime type of `value` under its canonical name, returning that name.
	pub fn register_value(&self, value: &dyn Dynamic) -> Result<&'static str> {
		let name = value.canonical_name();
		self.register_entry(name, value.type_entry())?;
		Ok(name)
	}

	/// Register the runtime type of `value` under an explicit name.
	pub fn register_value_as(&self, name: &str, value: &dyn Dynamic) -> Result<()> {
		self.register_entry(name, value.type_entry())
	}

	/// Register an entry. Re-registering the same type under the same name is a no-op.
	pub fn register_entry(&self, name: &str, entry: TypeEntry) -> Result<()> {
		let mut types = self.types.lock();
		if let Some(existing) = types.get(name) {
			if existing.type_id == entry.type_id {
				return Ok(());
			}
			return Err(conflict(name, existing, &entry));
		}
		types.insert(Box::from(name), entry);
		drop(types);
		debug!(name, rust_type = entry.rust_name, "type registered");
		Ok(())
	}

	/// Fail when `name` is taken by a type other than `entry`'s, without registering anything.
	pub(crate) fn check_entry(&self, name: &str, entry: &TypeEntry) -> Result<()> {
		match self.types.lock().get(name) {
			Some(existing) if existing.type_id != entry.type_id => Err(conflict(name, existing, entry)),
			_ => Ok(()),
		}
	}

	/// Look up the entry registered under `name`.
	pub fn lookup(&self, name: &str) -> Result<TypeEntry> {
		self.types
			.lock()
			.get(name)
			.copied()
			.ok_or_else(|| ConfigError::TypeNotRegistered { name: name.to_owned() })
	}

	/// True when `name` is registered.
	pub fn contains(&self, name: &str) -> bool {
		self.types.lock().contains_key(name)
	}

	/// Registered names in lexical order.
	pub fn names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.types.lock().keys().map(|name| name.to_string()).collect();
		names.sort();
		names
	}

	/// Number of registered names.
	pub fn len(&self) -> usize {
		self.types.lock().len()
	}

	/// True when nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.types.lock().is_empty()
	}
}

fn conflict(name: &str, existing: &TypeEntry, entry: &TypeEntry) -> ConfigError {
	ConfigError::DuplicateTypeRegistration {
		name: name.to_owned(),
		registered: existing.rust_name,
		new: entry.rust_name,
	}
}
