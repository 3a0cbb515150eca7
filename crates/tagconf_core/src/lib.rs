//! Public library API for tag-driven configuration containers.

/// Defaults, limits, dynamic-type wrappers, codecs and configuration directories.
pub mod config;
