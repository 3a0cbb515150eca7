use tracing::trace;

use crate::config::{ConfigError, Interface, Node, NodeMut, Record, Result};

/// Receives every leaf-shaped field reached by [`walk_root`].
pub(crate) trait LeafVisitor {
	/// Handle one leaf, optional-leaf or text field. `tag` is the tag of the record field the leaf belongs to.
	fn visit_leaf(&mut self, field: &'static str, tag: Option<&'static str>, node: NodeMut<'_>);
}

/// Walk a root record depth-first, in field declaration order.
pub(crate) fn walk_root<R: Node + ?Sized>(root: &mut R, visitor: &mut dyn LeafVisitor) -> Result<()> {
	match root.node_mut() {
		NodeMut::Record(record) => {
			walk_record(record, visitor);
			Ok(())
		}
		other => Err(ConfigError::InvalidParameter { got: other.kind_name() }),
	}
}

fn walk_record(record: &mut dyn Record, visitor: &mut dyn LeafVisitor) {
	trace!(record = record.record_name(), "walking record");
	for field in record.fields() {
		walk_node(field.name, field.tag, field.node.node_mut(), visitor);
	}
}

fn walk_node(field: &'static str, tag: Option<&'static str>, node: NodeMut<'_>, visitor: &mut dyn LeafVisitor) {
	match node {
		NodeMut::Record(record) => walk_record(record, visitor),
		NodeMut::Sequence(items) | NodeMut::Map(items) => {
			for item in items {
				walk_node(field, tag, item.node_mut(), visitor);
			}
		}
		NodeMut::Interface(wrapper) => {
			let Some(value) = wrapper.value_mut() else {
				return;
			};
			let inner = value.as_node_mut().node_mut();
			if inner.is_structured() {
				walk_node(field, tag, inner, visitor);
			}
		}
		NodeMut::Optional(slot) if !slot.holds_leaf() => {
			if let Some(inner) = slot.get_mut() {
				walk_node(field, tag, inner.node_mut(), visitor);
			}
		}
		leaf => visitor.visit_leaf(field, tag, leaf),
	}
}

/// Visit every dynamic-type wrapper reachable from a root record, stopping at the first error.
///
/// Wrapper payloads are not searched for further wrappers.
pub(crate) fn walk_interfaces<R: Node + ?Sized>(root: &mut R, visit: &mut dyn FnMut(&mut Interface) -> Result<()>) -> Result<()> {
	match root.node_mut() {
		record @ NodeMut::Record(_) => visit_interfaces(record, visit),
		other => Err(ConfigError::InvalidParameter { got: other.kind_name() }),
	}
}

fn visit_interfaces(node: NodeMut<'_>, visit: &mut dyn FnMut(&mut Interface) -> Result<()>) -> Result<()> {
	match node {
		NodeMut::Record(record) => {
			for field in record.fields() {
				visit_interfaces(field.node.node_mut(), visit)?;
			}
		}
		NodeMut::Sequence(items) | NodeMut::Map(items) => {
			for item in items {
				visit_interfaces(item.node_mut(), visit)?;
			}
		}
		NodeMut::Optional(slot) => {
			if let Some(inner) = slot.get_mut() {
				visit_interfaces(inner.node_mut(), visit)?;
			}
		}
		NodeMut::Interface(wrapper) => visit(wrapper)?,
		NodeMut::Leaf(_) | NodeMut::Text(_) => {}
	}
	Ok(())
}
