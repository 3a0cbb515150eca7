use std::path::Path;

use serde::{Deserialize, Serialize};
use tagconf_testkit::{init_test_logging, scratch_dir};

use crate::config::{ConfigDir, ConfigError, ConfigIo, LoadOrder};

crate::config_record! {
	#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
	struct Config {
		name: String,
		age: i64,
		motto: String,
	}
}

fn config(name: &str, age: i64, motto: &str) -> Config {
	Config {
		name: name.to_owned(),
		age,
		motto: motto.to_owned(),
	}
}

fn dir_in(root: &Path, prefix: &str, program: bool) -> ConfigDir<'static> {
	let program = program.then(|| root.join("program"));
	ConfigDir::with_roots(prefix, root.join("system"), root.join("user"), program, ConfigIo::global()).expect("config dir")
}

#[test]
fn shallow_save_and_load() {
	init_test_logging();
	let scratch = scratch_dir();
	let dir = dir_in(scratch.path(), "configtest", false);
	assert!(dir.user().is_dir());
	assert_eq!(dir.system(), scratch.path().join("system").join("configtest"));

	let mut saved = config("Foo", 42, "");
	dir.save_user("config.json", &mut saved).expect("save");

	let mut loaded = Config::default();
	dir.load("config.json", LoadOrder::Override, &mut loaded).expect("load");
	assert_eq!(loaded, saved);
}

#[test]
fn deep_prefix_and_name_create_subdirectories() {
	let scratch = scratch_dir();
	let dir = dir_in(scratch.path(), "configtest/child1/child2", false);

	let mut saved = config("Foo", 42, "deep");
	dir.save_user("deep1/deep2/config.toml", &mut saved).expect("save");
	assert!(dir.user().join("deep1/deep2/config.toml").is_file());

	let mut loaded = Config::default();
	dir.load_user("deep1/deep2/config.toml", &mut loaded).expect("load");
	assert_eq!(loaded, saved);
}

#[test]
fn first_found_prefers_user_over_system() {
	let scratch = scratch_dir();
	let dir = dir_in(scratch.path(), "app", false);
	dir.save_system("config.json", &mut config("system", 1, "sys")).expect("save system");
	dir.save_user("config.json", &mut config("user", 2, "")).expect("save user");

	let mut loaded = Config::default();
	dir.load("config.json", LoadOrder::FirstFound, &mut loaded).expect("load");
	assert_eq!(loaded, config("user", 2, ""));
}

#[test]
fn override_layers_system_user_program() {
	let scratch = scratch_dir();
	let dir = dir_in(scratch.path(), "app", true);
	dir.save_system("config.json", &mut config("system", 1, "sys")).expect("save system");
	std::fs::write(dir.user().join("config.json"), r#"{ "name": "user" }"#).expect("write user");
	dir.save_program("config.json", &mut config("program", 3, "prog")).expect("save program");

	let mut loaded = Config::default();
	dir.load("config.json", LoadOrder::Override, &mut loaded).expect("load");
	assert_eq!(loaded, config("program", 3, "prog"));

	std::fs::remove_file(scratch.path().join("program").join("config.json")).expect("remove program file");
	let mut loaded = Config::default();
	dir.load("config.json", LoadOrder::Override, &mut loaded).expect("load");
	assert_eq!(loaded, config("user", 1, "sys"));

	let mut loaded = Config::default();
	dir.load("config.json", LoadOrder::FirstFound, &mut loaded).expect("load");
	assert_eq!(loaded, config("user", 0, ""));
}

#[test]
fn missing_everywhere_is_no_config_loaded() {
	let scratch = scratch_dir();
	let dir = dir_in(scratch.path(), "app", false);
	let mut loaded = Config::default();
	let err = dir.load("absent.json", LoadOrder::FirstFound, &mut loaded).expect_err("nothing to load");
	assert!(matches!(err, ConfigError::NoConfigLoaded { ref name } if name == "absent.json"));

	let err = dir.load("absent.json", LoadOrder::Override, &mut loaded).expect_err("nothing to load");
	assert!(matches!(err, ConfigError::NoConfigLoaded { .. }));
}

#[test]
fn program_tier_requires_a_program_directory() {
	let scratch = scratch_dir();
	let dir = dir_in(scratch.path(), "app", false);
	let mut value = Config::default();
	assert!(matches!(dir.load_program("config.json", &mut value), Err(ConfigError::ProgramDirUnsupported)));
	assert!(matches!(dir.save_program("config.json", &mut value), Err(ConfigError::ProgramDirUnsupported)));
}

#[test]
fn malformed_tier_aborts_load() {
	let scratch = scratch_dir();
	let dir = dir_in(scratch.path(), "app", false);
	std::fs::write(dir.user().join("config.json"), "{ broken").expect("write user");

	let mut loaded = Config::default();
	let err = dir.load("config.json", LoadOrder::FirstFound, &mut loaded).expect_err("decode failure");
	assert!(matches!(err, ConfigError::Decode { codec: "json", .. }));
}

#[test]
fn remove_user_deletes_directory() {
	let scratch = scratch_dir();
	let dir = dir_in(scratch.path(), "app", false);
	dir.save_user("config.json", &mut config("x", 1, "")).expect("save");
	dir.remove_user().expect("remove");
	assert!(!dir.user().exists());
}
