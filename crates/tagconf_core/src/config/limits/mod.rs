use std::cmp::Ordering;

use tracing::trace;

use crate::config::defaults::reset_leaf;
use crate::config::scalar::compare;
use crate::config::walk::{LeafVisitor, walk_root};
use crate::config::{FieldErrorKind, Leaf, Node, NodeMut, Result, Scalar, TagMap, Warnings};

/// Enforce `range` tags across a configuration tree.
///
/// Only string and integer leaves take part. A `range` with a comma is an enumeration of allowed values; otherwise
/// one with a colon is a `min:max` pair where either side may be empty. A value outside its range is set to the
/// violated bound when `clamp` is true and otherwise reset to its `default` tag value, or to its zero value when no
/// default is declared (absent, for an optional). Enumeration mismatches are always reset.
///
/// Returns [`ConfigError::Warnings`](crate::config::ConfigError::Warnings) when any field produced a warning, and
/// [`ConfigError::InvalidParameter`](crate::config::ConfigError::InvalidParameter) when `root` is not a record.
pub fn apply_limits<R: Node + ?Sized>(root: &mut R, clamp: bool) -> Result<()> {
	let mut warnings = Warnings::default();
	walk_root(
		root,
		&mut Limiter {
			clamp,
			warnings: &mut warnings,
		},
	)?;
	warnings.into_result()
}

struct Limiter<'w> {
	clamp: bool,
	warnings: &'w mut Warnings,
}

impl LeafVisitor for Limiter<'_> {
	fn visit_leaf(&mut self, field: &'static str, tag: Option<&'static str>, mut node: NodeMut<'_>) {
		if !is_ordered(&mut node) {
			return;
		}
		let Some(tag) = tag else {
			self.warnings.push(field, FieldErrorKind::NoTag);
			return;
		};
		let tags = TagMap::parse(tag);
		let Some(range) = tags.range() else {
			self.warnings.push(field, FieldErrorKind::NoRange);
			return;
		};

		let limited = Range::parse(range).and_then(|range| limit_node(node, &range, self.clamp, tags.default_value()));
		match limited {
			Ok(Verdict::Kept) => {}
			Ok(verdict) => trace!(field, range, ?verdict, "limit applied"),
			Err(kind) => self.warnings.push(field, kind),
		}
	}
}

/// What happened to a limited value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
	Kept,
	Clamped,
	Reset,
}

/// True for leaves of an ordered kind, looking through present optionals.
fn is_ordered(node: &mut NodeMut<'_>) -> bool {
	match node {
		NodeMut::Leaf(leaf) => leaf.kind().is_ordered(),
		NodeMut::Optional(slot) => slot.get_mut().is_some_and(|inner| is_ordered(&mut inner.node_mut())),
		_ => false,
	}
}

/// Apply `range` to an ordered leaf. A present optional whose value is reset without a default becomes absent.
fn limit_node(node: NodeMut<'_>, range: &Range<'_>, clamp: bool, default: Option<&str>) -> std::result::Result<Verdict, FieldErrorKind> {
	match node {
		NodeMut::Leaf(leaf) => {
			let verdict = match range {
				Range::Choices(choices) => check_choices(leaf, choices)?,
				Range::Bounds { min, max } => check_bounds(leaf, *min, *max, clamp)?,
			};
			if verdict == Verdict::Reset {
				reset_leaf(leaf, default)?;
			}
			Ok(verdict)
		}
		NodeMut::Optional(slot) => {
			let Some(inner) = slot.get_mut() else {
				return Ok(Verdict::Kept);
			};
			let verdict = limit_node(inner.node_mut(), range, clamp, default)?;
			if verdict == Verdict::Reset && default.is_none() {
				slot.clear();
			}
			Ok(verdict)
		}
		_ => Ok(Verdict::Kept),
	}
}

/// Parsed `range` tag value.
#[derive(Debug, PartialEq)]
enum Range<'t> {
	Choices(Vec<&'t str>),
	Bounds { min: Option<&'t str>, max: Option<&'t str> },
}

impl<'t> Range<'t> {
	fn parse(range: &'t str) -> std::result::Result<Self, FieldErrorKind> {
		let syntax = || FieldErrorKind::InvalidRangeSyntax { range: range.to_owned() };
		if range.trim().is_empty() {
			return Err(syntax());
		}
		if range.contains(',') || !range.contains(':') {
			let choices: Vec<&str> = range.split(',').map(str::trim).filter(|choice| !choice.is_empty()).collect();
			if choices.is_empty() {
				return Err(syntax());
			}
			return Ok(Self::Choices(choices));
		}

		let mut sides = range.split(':');
		let (Some(min), Some(max), None) = (sides.next(), sides.next(), sides.next()) else {
			return Err(syntax());
		};
		let bound = |side: &'t str| Some(side.trim()).filter(|side| !side.is_empty());
		Ok(Self::Bounds {
			min: bound(min),
			max: bound(max),
		})
	}
}

/// A value matching no choice must be reset.
fn check_choices(leaf: &dyn Leaf, choices: &[&str]) -> std::result::Result<Verdict, FieldErrorKind> {
	let current = leaf.get();
	let mut matched = false;
	for choice in choices {
		let value = parse_bound(leaf, choice)?;
		matched |= compare(&current, &value) == Some(Ordering::Equal);
	}
	Ok(if matched { Verdict::Kept } else { Verdict::Reset })
}

/// Clamp the value into `min..=max`, or report that it must be reset. The min side is checked first.
fn check_bounds(leaf: &mut dyn Leaf, min: Option<&str>, max: Option<&str>, clamp: bool) -> std::result::Result<Verdict, FieldErrorKind> {
	let mut sides = Vec::with_capacity(2);
	for (side, violated) in [(min, Ordering::Less), (max, Ordering::Greater)] {
		if let Some(side) = side {
			sides.push((side, parse_bound(leaf, side)?, violated));
		}
	}

	let mut verdict = Verdict::Kept;
	for (side, bound, violated) in sides {
		if compare(&leaf.get(), &bound) != Some(violated) {
			continue;
		}
		if !clamp {
			return Ok(Verdict::Reset);
		}
		leaf.set(&bound).map_err(|err| invalid_range(side, err.to_string()))?;
		verdict = Verdict::Clamped;
	}
	Ok(verdict)
}

fn parse_bound(leaf: &dyn Leaf, literal: &str) -> std::result::Result<Scalar, FieldErrorKind> {
	leaf.parse(literal).map_err(|err| invalid_range(literal, err.to_string()))
}

fn invalid_range(literal: &str, reason: String) -> FieldErrorKind {
	FieldErrorKind::InvalidRange {
		literal: literal.to_owned(),
		reason,
	}
}

#[cfg(test)]
mod tests;
