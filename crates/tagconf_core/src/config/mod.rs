mod codec;
mod defaults;
mod dir;
mod error;
mod file;
mod interface;
mod limits;
mod node;
mod paths;
mod registry;
mod scalar;
mod tag;
mod walk;

/// Codec trait, built-in codecs and the extension-keyed codec registry.
pub use codec::{Codec, CodecRegistry, JsonCodec, TomlCodec};
/// Default-value engine entry point.
pub use defaults::apply_defaults;
/// Tiered configuration directory.
pub use dir::{ConfigDir, LoadOrder};
/// Error, warning and result types.
pub use error::{ConfigError, FieldError, FieldErrorKind, Result, Warnings};
/// File read/write entry points.
pub use file::{ConfigIo, extension};
/// Dynamic-type wrapper and its encode/decode protocol.
pub use interface::{DecodeStage, Interface, complete_decode, prepare_for_decode, prepare_for_encode};
/// Range and enumeration engine entry point.
pub use limits::apply_limits;
/// Container-tree description types.
pub use node::{Field, Leaf, Node, NodeMut, Optional, Record, TextLeaf};
/// Per-OS configuration base paths.
pub use paths::{program_config_path, system_config_path, user_config_path};
/// Dynamic-type registry and registrable value trait.
pub use registry::{Dynamic, TypeEntry, TypeRegistry};
/// Scalar codec bridge.
pub use scalar::{Scalar, ScalarError, ScalarKind, compare, parse};
/// Field tag parser.
pub use tag::{DEFAULT_KEY, NIL_KEY, RANGE_KEY, TagMap};
