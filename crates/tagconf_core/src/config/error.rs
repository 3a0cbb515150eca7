use std::fmt;

use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors produced while defaulting, limiting, encoding, and loading configuration containers.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Traversal root is not a record.
	#[error("invalid parameter: expected a record, got {got}")]
	InvalidParameter {
		/// Node kind that was supplied instead.
		got: &'static str,
	},
	/// One or more fields produced non-fatal warnings.
	#[error("warning: {0}")]
	Warnings(Warnings),
	/// Dynamic-type wrapper names a type missing from the registry.
	#[error("type not registered: {name}")]
	TypeNotRegistered {
		/// Recorded type name.
		name: String,
	},
	/// A different type is already registered under this name.
	#[error("duplicate type registration for {name}: registered={registered}, new={new}")]
	DuplicateTypeRegistration {
		/// Contested registry name.
		name: String,
		/// Rust type currently holding the name.
		registered: &'static str,
		/// Rust type that attempted to take the name.
		new: &'static str,
	},
	/// No codec is registered for a file extension.
	#[error("codec '{name}' not registered")]
	CodecNotRegistered {
		/// Requested codec name.
		name: String,
	},
	/// A codec with this name already exists.
	#[error("codec '{name}' already registered")]
	CodecAlreadyRegistered {
		/// Duplicate codec name.
		name: String,
	},
	/// Codec failed to encode a tree.
	#[error("{codec} encode: {reason}")]
	Encode {
		/// Codec name.
		codec: &'static str,
		/// Underlying codec message.
		reason: String,
	},
	/// Codec failed to decode bytes.
	#[error("{codec} decode: {reason}")]
	Decode {
		/// Codec name.
		codec: &'static str,
		/// Underlying codec message.
		reason: String,
	},
	/// Converting between a typed container and its neutral tree failed.
	#[error("tree conversion: {0}")]
	Tree(#[from] serde_json::Error),
	/// Per-OS configuration path is not known for this platform.
	#[error("unsupported OS '{os}'")]
	UnsupportedOs {
		/// `std::env::consts::OS` value.
		os: &'static str,
	},
	/// Program-directory configuration is only available on Windows.
	#[error("program directory configuration not supported on this os")]
	ProgramDirUnsupported,
	/// No tier of a configuration directory held the requested file.
	#[error("no configuration files loaded for {name}")]
	NoConfigLoaded {
		/// Requested file name.
		name: String,
	},
}

impl ConfigError {
	/// Return the aggregated field warnings when this error carries them.
	pub fn warnings(&self) -> Option<&Warnings> {
		match self {
			Self::Warnings(warnings) => Some(warnings),
			_ => None,
		}
	}

	/// True when the underlying cause is a missing file.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::Io(err) if err.kind() == std::io::ErrorKind::NotFound)
	}
}

/// Kind of a non-fatal per-field problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldErrorKind {
	/// Field carries no tag at all.
	NoTag,
	/// Tag has no `default` entry.
	NoDefault,
	/// Tag has no `range` entry.
	NoRange,
	/// `default` or `nil` literal does not parse into the field type.
	InvalidDefault {
		/// Offending literal.
		literal: String,
		/// Parser or unmarshaler message.
		reason: String,
	},
	/// A range bound or choice does not parse into the field type.
	InvalidRange {
		/// Offending literal.
		literal: String,
		/// Parser message.
		reason: String,
	},
	/// Bound pair is not of the form `min:max`.
	InvalidRangeSyntax {
		/// Raw `range` value.
		range: String,
	},
}

/// One per-field warning, keyed by the immediate field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
	/// Field name as declared on its record.
	pub field: Box<str>,
	/// Problem kind.
	pub kind: FieldErrorKind,
}

impl FieldError {
	pub(crate) fn new(field: &str, kind: FieldErrorKind) -> Self {
		Self { field: field.into(), kind }
	}
}

impl fmt::Display for FieldError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let field = &self.field;
		match &self.kind {
			FieldErrorKind::NoTag => write!(f, "no config tag defined on field '{field}'"),
			FieldErrorKind::NoDefault => write!(f, "no default value defined for field '{field}'"),
			FieldErrorKind::NoRange => write!(f, "no range value defined for field '{field}'"),
			FieldErrorKind::InvalidDefault { literal, reason } => {
				write!(f, "invalid default value '{literal}' defined for field '{field}': {reason}")
			}
			FieldErrorKind::InvalidRange { literal, reason } => {
				write!(f, "invalid range value '{literal}' defined for field '{field}': {reason}")
			}
			FieldErrorKind::InvalidRangeSyntax { range } => write!(f, "invalid range syntax '{range}' on field '{field}'"),
		}
	}
}

impl std::error::Error for FieldError {}

/// Ordered collection of per-field warnings from one traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Warnings {
	items: Vec<FieldError>,
}

impl Warnings {
	pub(crate) fn push(&mut self, field: &str, kind: FieldErrorKind) {
		self.items.push(FieldError::new(field, kind));
	}

	/// Number of collected warnings.
	pub fn len(&self) -> usize {
		self.items.len()
	}

	/// True when nothing was collected.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Iterate warnings in traversal order.
	pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
		self.items.iter()
	}

	/// Turn a finished traversal into its public result.
	pub(crate) fn into_result(self) -> Result<()> {
		if self.is_empty() { Ok(()) } else { Err(ConfigError::Warnings(self)) }
	}
}

impl fmt::Display for Warnings {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (idx, item) in self.items.iter().enumerate() {
			if idx > 0 {
				f.write_str("; ")?;
			}
			write!(f, "{item}")?;
		}
		Ok(())
	}
}

impl<'a> IntoIterator for &'a Warnings {
	type Item = &'a FieldError;
	type IntoIter = std::slice::Iter<'a, FieldError>;

	fn into_iter(self) -> Self::IntoIter {
		self.items.iter()
	}
}
