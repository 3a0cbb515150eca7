use std::collections::{BTreeMap, HashMap, VecDeque};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;

use crate::config::Interface;
use crate::config::scalar::{self, Scalar, ScalarError, ScalarKind};

/// A value that can be placed in a configuration tree.
///
/// Implementations describe their shape once; the engines walk that description instead of inspecting types at
/// runtime.
pub trait Node {
	/// Expose this value as one node variant.
	fn node_mut(&mut self) -> NodeMut<'_>;

	/// True when values of this type end in a scalar or text leaf, possibly behind indirections.
	fn is_leaf_type() -> bool
	where
		Self: Sized,
	{
		false
	}

	/// Fresh value for an absent optional that is about to receive `literal`.
	///
	/// Types with a zero value return it and ignore `literal`; text leaves parse it. Structured types are never
	/// allocated this way.
	fn allocate(_literal: &str) -> Result<Self, String>
	where
		Self: Sized,
	{
		Err(format!("{} cannot be allocated from a literal", std::any::type_name::<Self>()))
	}
}

/// Mutable view of one node in a configuration tree.
pub enum NodeMut<'a> {
	/// Named, individually tagged fields.
	Record(&'a mut dyn Record),
	/// Homogeneous elements in order.
	Sequence(Vec<&'a mut dyn Node>),
	/// Values of an associative collection.
	Map(Vec<&'a mut dyn Node>),
	/// Present or absent indirection.
	Optional(&'a mut dyn Optional),
	/// Dynamic-type wrapper.
	Interface(&'a mut Interface),
	/// Scalar leaf.
	Leaf(&'a mut dyn Leaf),
	/// Leaf set through its own text parser.
	Text(&'a mut dyn TextLeaf),
}

impl NodeMut<'_> {
	/// Stable label for diagnostics.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Self::Record(_) => "record",
			Self::Sequence(_) => "sequence",
			Self::Map(_) => "map",
			Self::Optional(_) => "optional",
			Self::Interface(_) => "interface",
			Self::Leaf(_) => "leaf",
			Self::Text(_) => "text",
		}
	}

	/// True for nodes that contain further fields.
	pub fn is_structured(&self) -> bool {
		match self {
			Self::Record(_) | Self::Sequence(_) | Self::Map(_) => true,
			Self::Optional(item) => !item.holds_leaf(),
			Self::Interface(_) | Self::Leaf(_) | Self::Text(_) => false,
		}
	}
}

/// A struct-like node whose fields carry tags.
pub trait Record {
	/// Declared type name.
	fn record_name(&self) -> &'static str;

	/// Participating fields in declaration order.
	fn fields(&mut self) -> Vec<Field<'_>>;
}

/// One record field as seen by the engines.
pub struct Field<'a> {
	/// Immediate field name.
	pub name: &'static str,
	/// Raw tag string, if declared.
	pub tag: Option<&'static str>,
	/// Field value.
	pub node: &'a mut dyn Node,
}

impl<'a> Field<'a> {
	/// Describe one field.
	pub fn new(name: &'static str, tag: Option<&'static str>, node: &'a mut dyn Node) -> Self {
		Self { name, tag, node }
	}
}

/// Present-or-absent indirection.
pub trait Optional {
	/// Inner node when present.
	fn get_mut(&mut self) -> Option<&mut dyn Node>;

	/// Inner node, allocating one for `literal` when absent.
	fn get_or_allocate(&mut self, literal: &str) -> Result<&mut dyn Node, String>;

	/// Make the indirection absent.
	fn clear(&mut self);

	/// True when the pointee ends in a leaf.
	fn holds_leaf(&self) -> bool;
}

/// Scalar leaf convertible to and from [`Scalar`].
pub trait Leaf {
	/// Scalar family.
	fn kind(&self) -> ScalarKind;

	/// Current value, widened.
	fn get(&self) -> Scalar;

	/// Check that `value` fits this concrete type.
	fn accepts(&self, value: &Scalar) -> Result<(), ScalarError>;

	/// Store `value`, narrowing it to the concrete type.
	fn set(&mut self, value: &Scalar) -> Result<(), ScalarError>;

	/// True at the type's zero value.
	fn is_zero(&self) -> bool;

	/// Reset to the type's zero value.
	fn clear(&mut self);

	/// Parse a literal into a value this leaf accepts.
	fn parse(&self, literal: &str) -> Result<Scalar, ScalarError> {
		let value = scalar::parse(literal, self.kind())?;
		self.accepts(&value)?;
		Ok(value)
	}
}

/// Leaf that parses its own text form, bypassing the scalar bridge.
pub trait TextLeaf {
	/// Replace the value by parsing `text`.
	fn unmarshal_text(&mut self, text: &str) -> Result<(), String>;
}

/// Declare a struct together with its [`Record`] descriptor.
///
/// A field takes part with its tag when followed by `=> "tag"`, and without a tag otherwise.
///
/// ```
/// tagconf::config_record! {
/// 	#[derive(Debug, Default)]
/// 	pub struct Server {
/// 		pub host: String => "default=localhost",
/// 		pub port: u16 => "default=8080;range=1:65535",
/// 	}
/// }
/// ```
#[macro_export]
macro_rules! config_record {
	(
		$(#[$meta:meta])*
		$vis:vis struct $name:ident {
			$(
				$(#[$fmeta:meta])*
				$fvis:vis $field:ident : $ty:ty $(=> $tag:literal)?
			),* $(,)?
		}
	) => {
		$(#[$meta])*
		$vis struct $name {
			$(
				$(#[$fmeta])*
				$fvis $field: $ty,
			)*
		}

		impl $crate::config::Record for $name {
			fn record_name(&self) -> &'static str {
				::std::stringify!($name)
			}

			fn fields(&mut self) -> ::std::vec::Vec<$crate::config::Field<'_>> {
				::std::vec![
					$(
						$crate::config::Field::new(
							::std::stringify!($field),
							$crate::config_record!(@tag $($tag)?),
							&mut self.$field,
						),
					)*
				]
			}
		}

		impl $crate::config::Node for $name {
			fn node_mut(&mut self) -> $crate::config::NodeMut<'_> {
				$crate::config::NodeMut::Record(self)
			}
		}
	};
	(@tag $tag:literal) => {
		::std::option::Option::Some($tag)
	};
	(@tag) => {
		::std::option::Option::None
	};
}

/// Mark `FromStr` types as text leaves.
///
/// Text leaves need no `Default`: an absent `Option` of one is allocated by parsing the literal it receives.
#[macro_export]
macro_rules! text_leaf {
	($($ty:ty),* $(,)?) => {
		$(
			impl $crate::config::TextLeaf for $ty {
				fn unmarshal_text(&mut self, text: &str) -> ::std::result::Result<(), ::std::string::String> {
					*self = text.parse::<$ty>().map_err(|err| err.to_string())?;
					Ok(())
				}
			}

			impl $crate::config::Node for $ty {
				fn node_mut(&mut self) -> $crate::config::NodeMut<'_> {
					$crate::config::NodeMut::Text(self)
				}

				fn is_leaf_type() -> bool {
					true
				}

				fn allocate(literal: &str) -> ::std::result::Result<Self, ::std::string::String> {
					literal.parse::<$ty>().map_err(|err| err.to_string())
				}
			}
		)*
	};
}

text_leaf!(PathBuf, IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr);

macro_rules! leaf_node {
	($($ty:ty),*) => {
		$(
			impl Node for $ty {
				fn node_mut(&mut self) -> NodeMut<'_> {
					NodeMut::Leaf(self)
				}

				fn is_leaf_type() -> bool {
					true
				}

				fn allocate(_literal: &str) -> Result<Self, String> {
					Ok(Self::default())
				}
			}
		)*
	};
}

macro_rules! signed_leaf {
	($($ty:ty),*) => {
		$(
			impl Leaf for $ty {
				fn kind(&self) -> ScalarKind {
					ScalarKind::Signed
				}

				fn get(&self) -> Scalar {
					Scalar::Signed(*self as i64)
				}

				fn accepts(&self, value: &Scalar) -> Result<(), ScalarError> {
					narrow_signed::<$ty>(value).map(|_| ())
				}

				fn set(&mut self, value: &Scalar) -> Result<(), ScalarError> {
					*self = narrow_signed::<$ty>(value)?;
					Ok(())
				}

				fn is_zero(&self) -> bool {
					*self == 0
				}

				fn clear(&mut self) {
					*self = 0;
				}
			}
		)*
		leaf_node!($($ty),*);
	};
}

macro_rules! unsigned_leaf {
	($($ty:ty),*) => {
		$(
			impl Leaf for $ty {
				fn kind(&self) -> ScalarKind {
					ScalarKind::Unsigned
				}

				fn get(&self) -> Scalar {
					Scalar::Unsigned(*self as u64)
				}

				fn accepts(&self, value: &Scalar) -> Result<(), ScalarError> {
					narrow_unsigned::<$ty>(value).map(|_| ())
				}

				fn set(&mut self, value: &Scalar) -> Result<(), ScalarError> {
					*self = narrow_unsigned::<$ty>(value)?;
					Ok(())
				}

				fn is_zero(&self) -> bool {
					*self == 0
				}

				fn clear(&mut self) {
					*self = 0;
				}
			}
		)*
		leaf_node!($($ty),*);
	};
}

macro_rules! float_leaf {
	($($ty:ty),*) => {
		$(
			impl Leaf for $ty {
				fn kind(&self) -> ScalarKind {
					ScalarKind::Float
				}

				fn get(&self) -> Scalar {
					Scalar::Float(f64::from(*self))
				}

				fn accepts(&self, value: &Scalar) -> Result<(), ScalarError> {
					expect_kind(ScalarKind::Float, value)
				}

				fn set(&mut self, value: &Scalar) -> Result<(), ScalarError> {
					let Scalar::Float(value) = value else {
						return Err(mismatch(ScalarKind::Float, value));
					};
					*self = *value as $ty;
					Ok(())
				}

				fn is_zero(&self) -> bool {
					*self == 0.0
				}

				fn clear(&mut self) {
					*self = 0.0;
				}
			}
		)*
		leaf_node!($($ty),*);
	};
}

signed_leaf!(i8, i16, i32, i64, isize);
unsigned_leaf!(u8, u16, u32, u64, usize);
float_leaf!(f32, f64);

impl Leaf for bool {
	fn kind(&self) -> ScalarKind {
		ScalarKind::Bool
	}

	fn get(&self) -> Scalar {
		Scalar::Bool(*self)
	}

	fn accepts(&self, value: &Scalar) -> Result<(), ScalarError> {
		expect_kind(ScalarKind::Bool, value)
	}

	fn set(&mut self, value: &Scalar) -> Result<(), ScalarError> {
		let Scalar::Bool(value) = value else {
			return Err(mismatch(ScalarKind::Bool, value));
		};
		*self = *value;
		Ok(())
	}

	fn is_zero(&self) -> bool {
		!*self
	}

	fn clear(&mut self) {
		*self = false;
	}
}

impl Leaf for String {
	fn kind(&self) -> ScalarKind {
		ScalarKind::String
	}

	fn get(&self) -> Scalar {
		Scalar::String(self.as_str().into())
	}

	fn accepts(&self, value: &Scalar) -> Result<(), ScalarError> {
		expect_kind(ScalarKind::String, value)
	}

	fn set(&mut self, value: &Scalar) -> Result<(), ScalarError> {
		let Scalar::String(value) = value else {
			return Err(mismatch(ScalarKind::String, value));
		};
		*self = value.to_string();
		Ok(())
	}

	fn is_zero(&self) -> bool {
		self.is_empty()
	}

	fn clear(&mut self) {
		String::clear(self);
	}
}

leaf_node!(bool, String);

fn narrow_signed<T: TryFrom<i64>>(value: &Scalar) -> Result<T, ScalarError> {
	let Scalar::Signed(wide) = value else {
		return Err(mismatch(ScalarKind::Signed, value));
	};
	T::try_from(*wide).map_err(|_| ScalarError::OutOfRange {
		value: wide.to_string(),
		type_name: std::any::type_name::<T>(),
	})
}

fn narrow_unsigned<T: TryFrom<u64>>(value: &Scalar) -> Result<T, ScalarError> {
	let Scalar::Unsigned(wide) = value else {
		return Err(mismatch(ScalarKind::Unsigned, value));
	};
	T::try_from(*wide).map_err(|_| ScalarError::OutOfRange {
		value: wide.to_string(),
		type_name: std::any::type_name::<T>(),
	})
}

fn expect_kind(expected: ScalarKind, value: &Scalar) -> Result<(), ScalarError> {
	if value.kind() == expected { Ok(()) } else { Err(mismatch(expected, value)) }
}

fn mismatch(expected: ScalarKind, value: &Scalar) -> ScalarError {
	ScalarError::KindMismatch {
		expected,
		got: value.kind(),
	}
}

impl<T: Node> Optional for Option<T> {
	fn get_mut(&mut self) -> Option<&mut dyn Node> {
		self.as_mut().map(|item| item as &mut dyn Node)
	}

	fn get_or_allocate(&mut self, literal: &str) -> Result<&mut dyn Node, String> {
		let item = match self.take() {
			Some(item) => item,
			None => T::allocate(literal)?,
		};
		Ok(self.insert(item))
	}

	fn clear(&mut self) {
		*self = None;
	}

	fn holds_leaf(&self) -> bool {
		T::is_leaf_type()
	}
}

impl<T: Node> Node for Option<T> {
	fn node_mut(&mut self) -> NodeMut<'_> {
		NodeMut::Optional(self)
	}

	fn is_leaf_type() -> bool {
		T::is_leaf_type()
	}

	fn allocate(_literal: &str) -> Result<Self, String> {
		Ok(None)
	}
}

impl<T: Node> Node for Box<T> {
	fn node_mut(&mut self) -> NodeMut<'_> {
		(**self).node_mut()
	}

	fn is_leaf_type() -> bool {
		T::is_leaf_type()
	}

	fn allocate(literal: &str) -> Result<Self, String> {
		T::allocate(literal).map(Box::new)
	}
}

impl<T: Node> Node for Vec<T> {
	fn node_mut(&mut self) -> NodeMut<'_> {
		NodeMut::Sequence(self.iter_mut().map(|item| item as &mut dyn Node).collect())
	}
}

impl<T: Node, const N: usize> Node for [T; N] {
	fn node_mut(&mut self) -> NodeMut<'_> {
		NodeMut::Sequence(self.iter_mut().map(|item| item as &mut dyn Node).collect())
	}
}

impl<T: Node> Node for VecDeque<T> {
	fn node_mut(&mut self) -> NodeMut<'_> {
		NodeMut::Sequence(self.iter_mut().map(|item| item as &mut dyn Node).collect())
	}
}

impl<K, V: Node, S> Node for HashMap<K, V, S> {
	fn node_mut(&mut self) -> NodeMut<'_> {
		NodeMut::Map(self.values_mut().map(|item| item as &mut dyn Node).collect())
	}
}

impl<K, V: Node> Node for BTreeMap<K, V> {
	fn node_mut(&mut self) -> NodeMut<'_> {
		NodeMut::Map(self.values_mut().map(|item| item as &mut dyn Node).collect())
	}
}

#[cfg(test)]
mod tests;
