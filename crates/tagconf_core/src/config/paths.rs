use std::io;
use std::path::PathBuf;

use directories::BaseDirs;

use crate::config::{ConfigError, Result};

/// Base directory for machine-wide configuration.
///
/// `/private/etc` on macOS, `/etc` on other unix systems, `%ALLUSERSPROFILE%` on Windows.
pub fn system_config_path() -> Result<PathBuf> {
	if cfg!(target_os = "macos") {
		Ok(PathBuf::from("/private/etc"))
	} else if cfg!(unix) {
		Ok(PathBuf::from("/etc"))
	} else if cfg!(windows) {
		std::env::var_os("ALLUSERSPROFILE")
			.map(PathBuf::from)
			.ok_or_else(|| not_found("ALLUSERSPROFILE is not set"))
	} else {
		Err(ConfigError::UnsupportedOs { os: std::env::consts::OS })
	}
}

/// Base directory for per-user configuration.
///
/// `$HOME/.config` on unix systems including macOS, `%USERPROFILE%` on Windows.
pub fn user_config_path() -> Result<PathBuf> {
	if !cfg!(any(unix, windows)) {
		return Err(ConfigError::UnsupportedOs { os: std::env::consts::OS });
	}
	let base = BaseDirs::new().ok_or_else(|| not_found("home directory not found"))?;
	let home = base.home_dir();
	Ok(if cfg!(windows) { home.to_path_buf() } else { home.join(".config") })
}

/// Directory holding the running executable.
pub fn program_config_path() -> Result<PathBuf> {
	let exe = std::env::current_exe()?;
	exe.parent()
		.map(|dir| dir.to_path_buf())
		.ok_or_else(|| not_found("executable has no parent directory"))
}

fn not_found(msg: &'static str) -> ConfigError {
	ConfigError::Io(io::Error::new(io::ErrorKind::NotFound, msg))
}
