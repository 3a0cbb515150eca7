use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

/// Widened value of a scalar leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
	/// Boolean.
	Bool(bool),
	/// Any signed integer width.
	Signed(i64),
	/// Any unsigned integer width.
	Unsigned(u64),
	/// Any float width.
	Float(f64),
	/// UTF-8 string.
	String(Box<str>),
}

impl Scalar {
	/// Kind of this value.
	pub fn kind(&self) -> ScalarKind {
		match self {
			Self::Bool(_) => ScalarKind::Bool,
			Self::Signed(_) => ScalarKind::Signed,
			Self::Unsigned(_) => ScalarKind::Unsigned,
			Self::Float(_) => ScalarKind::Float,
			Self::String(_) => ScalarKind::String,
		}
	}
}

impl fmt::Display for Scalar {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bool(value) => write!(f, "{value}"),
			Self::Signed(value) => write!(f, "{value}"),
			Self::Unsigned(value) => write!(f, "{value}"),
			Self::Float(value) => write!(f, "{value}"),
			Self::String(value) => f.write_str(value),
		}
	}
}

/// Scalar families a leaf may belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
	/// `bool`.
	Bool,
	/// `i8`..`i64`, `isize`.
	Signed,
	/// `u8`..`u64`, `usize`.
	Unsigned,
	/// `f32`, `f64`.
	Float,
	/// `String`.
	String,
}

impl ScalarKind {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Bool => "bool",
			Self::Signed => "signed",
			Self::Unsigned => "unsigned",
			Self::Float => "float",
			Self::String => "string",
		}
	}

	/// True for kinds that take part in range and choice enforcement.
	pub fn is_ordered(self) -> bool {
		matches!(self, Self::Signed | Self::Unsigned | Self::String)
	}
}

/// Literal conversion failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScalarError {
	/// Literal is not valid syntax for the kind.
	#[error("cannot parse '{literal}' as {}", kind.as_str())]
	Syntax {
		/// Target kind.
		kind: ScalarKind,
		/// Offending literal.
		literal: String,
	},
	/// Value does not fit the concrete field type.
	#[error("value {value} out of range for {type_name}")]
	OutOfRange {
		/// Rendered value.
		value: String,
		/// Concrete Rust type.
		type_name: &'static str,
	},
	/// Value kind does not match the leaf kind.
	#[error("kind mismatch: expected {}, got {}", expected.as_str(), got.as_str())]
	KindMismatch {
		/// Leaf kind.
		expected: ScalarKind,
		/// Supplied kind.
		got: ScalarKind,
	},
}

/// Parse a literal into a widened value of `kind`.
pub fn parse(literal: &str, kind: ScalarKind) -> Result<Scalar, ScalarError> {
	let syntax = || ScalarError::Syntax {
		kind,
		literal: literal.to_owned(),
	};
	match kind {
		ScalarKind::Bool => parse_bool(literal).map(Scalar::Bool).ok_or_else(syntax),
		ScalarKind::Signed => literal.parse::<i64>().map(Scalar::Signed).map_err(|_| syntax()),
		ScalarKind::Unsigned => literal.parse::<u64>().map(Scalar::Unsigned).map_err(|_| syntax()),
		ScalarKind::Float => literal.parse::<f64>().map(Scalar::Float).map_err(|_| syntax()),
		ScalarKind::String => Ok(Scalar::String(literal.into())),
	}
}

/// Order two values of the same ordered kind.
///
/// Returns `None` for mixed kinds and for booleans and floats, which never take part in limits.
pub fn compare(a: &Scalar, b: &Scalar) -> Option<Ordering> {
	match (a, b) {
		(Scalar::Signed(a), Scalar::Signed(b)) => Some(a.cmp(b)),
		(Scalar::Unsigned(a), Scalar::Unsigned(b)) => Some(a.cmp(b)),
		(Scalar::String(a), Scalar::String(b)) => Some(a.cmp(b)),
		_ => None,
	}
}

fn parse_bool(literal: &str) -> Option<bool> {
	match literal {
		"1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
		"0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
		_ => None,
	}
}
