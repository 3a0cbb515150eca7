use std::any::Any;

use serde::ser::{Error as _, SerializeStruct};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::config::walk::walk_interfaces;
use crate::config::{ConfigError, Dynamic, Node, NodeMut, Result, TypeEntry, TypeRegistry};

/// Field holding a value whose concrete type is only known at runtime.
///
/// Serialized as `{ "Type": <registered name>, "Value": <payload> }`. After decoding, the payload stays in its
/// format-neutral form until [`prepare_for_decode`] and [`complete_decode`] rebuild the typed value.
#[derive(Debug, Default)]
pub struct Interface {
	type_name: String,
	value: Option<Box<dyn Dynamic>>,
	raw: Option<serde_json::Value>,
}

impl Interface {
	/// Wrap `value`. The type name is filled in by [`prepare_for_encode`].
	pub fn new<T: Dynamic>(value: T) -> Self {
		Self {
			type_name: String::new(),
			value: Some(Box::new(value)),
			raw: None,
		}
	}

	/// Registered name of the payload type, empty until prepared for encoding or read back.
	pub fn type_name(&self) -> &str {
		&self.type_name
	}

	/// Typed payload.
	pub fn value(&self) -> Option<&dyn Dynamic> {
		self.value.as_deref()
	}

	/// Mutable typed payload.
	pub fn value_mut(&mut self) -> Option<&mut dyn Dynamic> {
		self.value.as_deref_mut().map(|value| value as &mut dyn Dynamic)
	}

	/// Replace the payload. The previous type name no longer applies and is cleared.
	pub fn set<T: Dynamic>(&mut self, value: T) {
		self.type_name.clear();
		self.value = Some(Box::new(value));
		self.raw = None;
	}

	/// Remove and return the payload, leaving the wrapper empty.
	pub fn take(&mut self) -> Option<Box<dyn Dynamic>> {
		self.type_name.clear();
		self.raw = None;
		self.value.take()
	}

	/// Payload as `T`, if that is its concrete type.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.value.as_deref()?.as_any().downcast_ref()
	}

	/// Mutable payload as `T`, if that is its concrete type.
	pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
		self.value.as_deref_mut()?.as_any_mut().downcast_mut()
	}

	/// Undecoded payload retained from the last deserialization.
	pub fn raw(&self) -> Option<&serde_json::Value> {
		self.raw.as_ref()
	}

	/// True when neither a typed nor a raw payload is held.
	pub fn is_empty(&self) -> bool {
		self.value.is_none() && self.raw.is_none()
	}
}

impl Clone for Interface {
	fn clone(&self) -> Self {
		Self {
			type_name: self.type_name.clone(),
			value: self.value.as_ref().map(|value| value.clone_dynamic()),
			raw: self.raw.clone(),
		}
	}
}

impl PartialEq for Interface {
	fn eq(&self, other: &Self) -> bool {
		let values = match (&self.value, &other.value) {
			(Some(lhs), Some(rhs)) => lhs.eq_dynamic(rhs.as_ref()),
			(None, None) => true,
			_ => false,
		};
		values && self.type_name == other.type_name && self.raw == other.raw
	}
}

impl Node for Interface {
	fn node_mut(&mut self) -> NodeMut<'_> {
		NodeMut::Interface(self)
	}
}

impl Serialize for Interface {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		let payload = match (&self.value, &self.raw) {
			(Some(value), _) => Some(value.to_tree().map_err(S::Error::custom)?),
			(None, Some(raw)) => Some(raw.clone()),
			(None, None) => None,
		};

		let type_name = match &self.value {
			Some(value) if self.type_name.is_empty() => value.canonical_name(),
			_ => self.type_name.as_str(),
		};

		let mut state = serializer.serialize_struct("Interface", 1 + usize::from(payload.is_some()))?;
		state.serialize_field("Type", type_name)?;
		match &payload {
			Some(payload) => state.serialize_field("Value", payload)?,
			None => state.skip_field("Value")?,
		}
		state.end()
	}
}

#[derive(Deserialize)]
struct Wire {
	#[serde(rename = "Type", default)]
	type_name: String,
	#[serde(rename = "Value", default)]
	value: Option<serde_json::Value>,
}

impl<'de> Deserialize<'de> for Interface {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let wire = Wire::deserialize(deserializer)?;
		Ok(Self {
			type_name: wire.type_name,
			value: None,
			raw: wire.value,
		})
	}
}

/// Outcome of [`prepare_for_decode`].
#[must_use = "a second decode pass may be required"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
	/// No wrapper needs its payload decoded again.
	Complete,
	/// Typed destinations were allocated; run [`complete_decode`].
	SecondPassRequired {
		/// Number of wrappers that received a fresh destination.
		wrappers: usize,
	},
}

impl DecodeStage {
	/// True when [`complete_decode`] has work to do.
	pub fn needs_second_pass(&self) -> bool {
		matches!(self, Self::SecondPassRequired { .. })
	}
}

/// Record the payload type name of every wrapper that does not have one yet, registering the type on the way.
///
/// Wrappers whose type name is already set are left untouched, so repeated calls are harmless.
pub fn prepare_for_encode<R: Node + ?Sized>(root: &mut R, registry: &TypeRegistry) -> Result<()> {
	walk_interfaces(root, &mut |wrapper: &mut Interface| {
		if !wrapper.type_name.is_empty() {
			return Ok(());
		}
		let Some(value) = wrapper.value.as_deref() else {
			return Ok(());
		};
		let name = registry.register_value(value)?;
		wrapper.type_name = name.to_owned();
		Ok(())
	})
}

/// Canonical names and entries of payloads whose wrapper has no type name yet. Nothing is registered.
pub(crate) fn unnamed_payloads<R: Node + ?Sized>(root: &mut R) -> Result<Vec<(&'static str, TypeEntry)>> {
	let mut found = Vec::new();
	walk_interfaces(root, &mut |wrapper: &mut Interface| {
		if let Some(value) = wrapper.value.as_deref().filter(|_| wrapper.type_name.is_empty()) {
			found.push((value.canonical_name(), value.type_entry()));
		}
		Ok(())
	})?;
	Ok(found)
}

/// Allocate a zero value of the registered type into every wrapper that carries a type name.
///
/// Fails with [`ConfigError::TypeNotRegistered`] as soon as one name is unknown.
pub fn prepare_for_decode<R: Node + ?Sized>(root: &mut R, registry: &TypeRegistry) -> Result<DecodeStage> {
	prepare_for_decode_with(root, &mut |name: &str| registry.lookup(name))
}

/// [`prepare_for_decode`] with a caller-supplied name lookup.
pub(crate) fn prepare_for_decode_with<R: Node + ?Sized>(root: &mut R, lookup: &mut dyn FnMut(&str) -> Result<TypeEntry>) -> Result<DecodeStage> {
	let mut wrappers = 0;
	walk_interfaces(root, &mut |wrapper: &mut Interface| {
		if wrapper.type_name.is_empty() {
			return Ok(());
		}
		let entry = lookup(wrapper.type_name.as_str())?;
		wrapper.value = Some(entry.instantiate());
		wrappers += 1;
		Ok(())
	})?;

	debug!(wrappers, "prepared dynamic values for decoding");
	Ok(match wrappers {
		0 => DecodeStage::Complete,
		wrappers => DecodeStage::SecondPassRequired { wrappers },
	})
}

/// Second decode pass: decode each wrapper's retained payload into its preallocated typed value.
pub fn complete_decode<R: Node + ?Sized>(root: &mut R, stage: DecodeStage) -> Result<()> {
	if !stage.needs_second_pass() {
		return Ok(());
	}
	walk_interfaces(root, &mut |wrapper: &mut Interface| {
		let Some(value) = wrapper.value.as_deref_mut() else {
			return Ok(());
		};
		let Some(raw) = wrapper.raw.take() else {
			return Ok(());
		};
		value.decode_tree(raw).map_err(|err| ConfigError::Decode {
			codec: "interface",
			reason: format!("{}: {err}", wrapper.type_name),
		})
	})
}
