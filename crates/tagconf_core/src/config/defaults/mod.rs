use tracing::trace;

use crate::config::walk::{LeafVisitor, walk_root};
use crate::config::{FieldErrorKind, Leaf, Node, NodeMut, Optional, Result, TagMap, Warnings};

/// Assign `default` tag values to empty fields of a configuration tree.
///
/// A field is empty when it equals its `nil` literal, or when no `nil` literal is declared and it holds its type's
/// zero value (absent for optionals). With `reset_all`, every field is treated as empty. Text leaves are always
/// reset. Fields without a tag or without a `default` entry are left untouched and reported.
///
/// Returns [`ConfigError::Warnings`](crate::config::ConfigError::Warnings) when any field produced a warning, and
/// [`ConfigError::InvalidParameter`](crate::config::ConfigError::InvalidParameter) when `root` is not a record.
pub fn apply_defaults<R: Node + ?Sized>(root: &mut R, reset_all: bool) -> Result<()> {
	let mut warnings = Warnings::default();
	walk_root(
		root,
		&mut Defaulter {
			reset_all,
			warnings: &mut warnings,
		},
	)?;
	warnings.into_result()
}

struct Defaulter<'w> {
	reset_all: bool,
	warnings: &'w mut Warnings,
}

impl LeafVisitor for Defaulter<'_> {
	fn visit_leaf(&mut self, field: &'static str, tag: Option<&'static str>, node: NodeMut<'_>) {
		let Some(tag) = tag else {
			self.warnings.push(field, FieldErrorKind::NoTag);
			return;
		};
		let tags = TagMap::parse(tag);
		let Some(default) = tags.default_value() else {
			self.warnings.push(field, FieldErrorKind::NoDefault);
			return;
		};

		match default_node(node, tags.nil_value(), default, self.reset_all, false) {
			Ok(true) => trace!(field, default, "default applied"),
			Ok(false) => {}
			Err(kind) => self.warnings.push(field, kind),
		}
	}
}

/// Default one leaf-shaped node. `indirect` is set once a present optional was crossed.
fn default_node(node: NodeMut<'_>, nil: Option<&str>, default: &str, reset_all: bool, indirect: bool) -> std::result::Result<bool, FieldErrorKind> {
	match node {
		NodeMut::Text(text) => {
			text.unmarshal_text(default).map_err(|reason| invalid_default(default, reason))?;
			Ok(true)
		}
		NodeMut::Leaf(leaf) => {
			let empty = match nil {
				Some(nil) => leaf.get() == leaf.parse(nil).map_err(|err| invalid_default(nil, err.to_string()))?,
				None => !indirect && leaf.is_zero(),
			};
			if !reset_all && !empty {
				return Ok(false);
			}
			reset_leaf(leaf, Some(default))?;
			Ok(true)
		}
		NodeMut::Optional(slot) => match slot.get_mut() {
			Some(inner) => default_node(inner.node_mut(), nil, default, reset_all, true),
			None => allocate(slot, default).map(|()| true),
		},
		NodeMut::Record(_) | NodeMut::Sequence(_) | NodeMut::Map(_) | NodeMut::Interface(_) => Ok(false),
	}
}

/// Unconditionally store `literal` into a freshly allocated leaf-shaped node.
fn assign(node: NodeMut<'_>, literal: &str) -> std::result::Result<(), FieldErrorKind> {
	match node {
		NodeMut::Text(text) => text.unmarshal_text(literal).map_err(|reason| invalid_default(literal, reason)),
		NodeMut::Leaf(leaf) => reset_leaf(leaf, Some(literal)),
		NodeMut::Optional(slot) => allocate(slot, literal),
		NodeMut::Record(_) | NodeMut::Sequence(_) | NodeMut::Map(_) | NodeMut::Interface(_) => Ok(()),
	}
}

/// Fill an absent optional with `literal`. The optional stays absent when the literal does not fit.
fn allocate(slot: &mut dyn Optional, literal: &str) -> std::result::Result<(), FieldErrorKind> {
	let assigned = slot
		.get_or_allocate(literal)
		.map_err(|reason| invalid_default(literal, reason))
		.and_then(|inner| assign(inner.node_mut(), literal));
	if assigned.is_err() {
		slot.clear();
	}
	assigned
}

/// Set a leaf to its parsed default, or to its zero value when no default exists.
///
/// The leaf is left unmodified when the default does not parse.
pub(crate) fn reset_leaf(leaf: &mut dyn Leaf, default: Option<&str>) -> std::result::Result<(), FieldErrorKind> {
	let Some(default) = default else {
		leaf.clear();
		return Ok(());
	};
	let value = leaf.parse(default).map_err(|err| invalid_default(default, err.to_string()))?;
	leaf.set(&value).map_err(|err| invalid_default(default, err.to_string()))
}

fn invalid_default(literal: &str, reason: String) -> FieldErrorKind {
	FieldErrorKind::InvalidDefault {
		literal: literal.to_owned(),
		reason,
	}
}
