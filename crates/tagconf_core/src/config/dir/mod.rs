use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{ConfigError, ConfigIo, Node, Result, program_config_path, system_config_path, user_config_path};

/// Order in which [`ConfigDir::load`] visits configuration tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadOrder {
	/// Program, then user, then system; stop at the first file found.
	#[default]
	FirstFound,
	/// System, then user, then program; every file found overrides values loaded before it.
	Override,
}

/// A named configuration directory present at system, user and program level.
///
/// The prefix may be a relative path; it is rooted at the system and user locations. The program location is the
/// executable directory and ignores the prefix.
#[derive(Debug, Clone)]
pub struct ConfigDir<'a> {
	system: PathBuf,
	user: PathBuf,
	program: Option<PathBuf>,
	io: ConfigIo<'a>,
}

impl ConfigDir<'static> {
	/// Root `prefix` at the platform configuration locations and create the user directory.
	///
	/// The program tier is only available on Windows.
	pub fn new(prefix: impl AsRef<Path>) -> Result<Self> {
		let program = if cfg!(windows) { Some(program_config_path()?) } else { None };
		Self::with_roots(prefix, system_config_path()?, user_config_path()?, program, ConfigIo::global())
	}
}

impl<'a> ConfigDir<'a> {
	/// Root `prefix` at explicit system and user locations and create the user directory.
	pub fn with_roots(
		prefix: impl AsRef<Path>,
		system_root: impl AsRef<Path>,
		user_root: impl AsRef<Path>,
		program: Option<PathBuf>,
		io: ConfigIo<'a>,
	) -> Result<Self> {
		let prefix = prefix.as_ref();
		let dir = Self {
			system: system_root.as_ref().join(prefix),
			user: user_root.as_ref().join(prefix),
			program,
			io,
		};
		fs::create_dir_all(&dir.user)?;
		debug!(system = %dir.system.display(), user = %dir.user.display(), "config dir ready");
		Ok(dir)
	}

	/// System-level directory.
	pub fn system(&self) -> &Path {
		&self.system
	}

	/// User-level directory.
	pub fn user(&self) -> &Path {
		&self.user
	}

	/// Remove the user-level directory and everything in it.
	pub fn remove_user(&self) -> Result<()> {
		fs::remove_dir_all(&self.user)?;
		Ok(())
	}

	/// Read `name` from the system directory.
	pub fn load_system<T>(&self, name: impl AsRef<Path>, out: &mut T) -> Result<()>
	where
		T: Node + Serialize + DeserializeOwned,
	{
		self.io.read(self.system.join(name), out)
	}

	/// Read `name` from the user directory.
	pub fn load_user<T>(&self, name: impl AsRef<Path>, out: &mut T) -> Result<()>
	where
		T: Node + Serialize + DeserializeOwned,
	{
		self.io.read(self.user.join(name), out)
	}

	/// Read `name` from the program directory.
	pub fn load_program<T>(&self, name: impl AsRef<Path>, out: &mut T) -> Result<()>
	where
		T: Node + Serialize + DeserializeOwned,
	{
		self.io.read(self.program_dir()?.join(name), out)
	}

	/// Read `name` from every tier in `order`, skipping tiers where the file does not exist.
	///
	/// Fails with [`ConfigError::NoConfigLoaded`] when no tier held the file.
	pub fn load<T>(&self, name: impl AsRef<Path>, order: LoadOrder, out: &mut T) -> Result<()>
	where
		T: Node + Serialize + DeserializeOwned,
	{
		let name = name.as_ref();
		let mut loaded = false;
		match order {
			LoadOrder::FirstFound => {
				for tier in [Tier::Program, Tier::User, Tier::System] {
					if self.load_tier(tier, name, out)? {
						loaded = true;
						break;
					}
				}
			}
			LoadOrder::Override => {
				for tier in [Tier::System, Tier::User, Tier::Program] {
					loaded |= self.load_tier(tier, name, out)?;
				}
			}
		}
		if !loaded {
			return Err(ConfigError::NoConfigLoaded {
				name: name.display().to_string(),
			});
		}
		Ok(())
	}

	/// Write `name` into the system directory, creating subdirectories as needed.
	pub fn save_system<T>(&self, name: impl AsRef<Path>, config: &mut T) -> Result<()>
	where
		T: Node + Serialize + ?Sized,
	{
		self.save_into(&self.system, name.as_ref(), config)
	}

	/// Write `name` into the user directory, creating subdirectories as needed.
	pub fn save_user<T>(&self, name: impl AsRef<Path>, config: &mut T) -> Result<()>
	where
		T: Node + Serialize + ?Sized,
	{
		self.save_into(&self.user, name.as_ref(), config)
	}

	/// Write `name` into the program directory, creating subdirectories as needed.
	pub fn save_program<T>(&self, name: impl AsRef<Path>, config: &mut T) -> Result<()>
	where
		T: Node + Serialize + ?Sized,
	{
		self.save_into(self.program_dir()?, name.as_ref(), config)
	}

	fn save_into<T>(&self, dir: &Path, name: &Path, config: &mut T) -> Result<()>
	where
		T: Node + Serialize + ?Sized,
	{
		let path = dir.join(name);
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)?;
		}
		self.io.write(path, config)
	}

	fn program_dir(&self) -> Result<&Path> {
		self.program.as_deref().ok_or(ConfigError::ProgramDirUnsupported)
	}

	/// Load one tier. `Ok(false)` means the file or the tier does not exist.
	fn load_tier<T>(&self, tier: Tier, name: &Path, out: &mut T) -> Result<bool>
	where
		T: Node + Serialize + DeserializeOwned,
	{
		let result = match tier {
			Tier::System => self.load_system(name, out),
			Tier::User => self.load_user(name, out),
			Tier::Program => self.load_program(name, out),
		};
		match result {
			Ok(()) => {
				debug!(?tier, name = %name.display(), "config tier loaded");
				Ok(true)
			}
			Err(err) if err.is_not_found() => Ok(false),
			Err(ConfigError::ProgramDirUnsupported) => Ok(false),
			Err(err) => Err(err),
		}
	}
}

#[derive(Debug, Clone, Copy)]
enum Tier {
	System,
	User,
	Program,
}

#[cfg(test)]
mod tests;
