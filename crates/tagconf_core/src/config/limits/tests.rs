use std::collections::BTreeMap;
use std::path::PathBuf;

use super::Range;
use crate::config::{ConfigError, FieldError, FieldErrorKind, apply_limits};

crate::config_record! {
	#[derive(Debug, Default, PartialEq)]
	struct Person {
		name: String => "range=foo,bar,baz;default=bar",
		age: i64 => "range=0:150",
	}
}

fn warnings_of(err: ConfigError) -> Vec<FieldError> {
	err.warnings().expect("warnings").iter().cloned().collect()
}

#[test]
fn range_parsing() {
	assert_eq!(Range::parse("a, b ,,c"), Ok(Range::Choices(vec!["a", "b", "c"])));
	assert_eq!(Range::parse("only"), Ok(Range::Choices(vec!["only"])));
	assert_eq!(Range::parse("1:2"), Ok(Range::Bounds { min: Some("1"), max: Some("2") }));
	assert_eq!(Range::parse(" :9"), Ok(Range::Bounds { min: None, max: Some("9") }));
	assert_eq!(Range::parse("3:"), Ok(Range::Bounds { min: Some("3"), max: None }));
	assert_eq!(Range::parse("a:b,c"), Ok(Range::Choices(vec!["a:b", "c"])));
	assert!(matches!(Range::parse("1:2:3"), Err(FieldErrorKind::InvalidRangeSyntax { .. })));
	assert!(matches!(Range::parse("  "), Err(FieldErrorKind::InvalidRangeSyntax { .. })));
	assert!(matches!(Range::parse(", ,"), Err(FieldErrorKind::InvalidRangeSyntax { .. })));
}

#[test]
fn enumeration_mismatch_resets_to_default() {
	let mut person = Person {
		name: "INVALID".to_owned(),
		age: 30,
	};
	apply_limits(&mut person, true).expect("no warnings");
	assert_eq!(person.name, "bar");
	assert_eq!(person.age, 30);
}

#[test]
fn enumeration_match_is_kept() {
	let mut person = Person {
		name: "baz".to_owned(),
		age: 0,
	};
	apply_limits(&mut person, false).expect("no warnings");
	assert_eq!(person.name, "baz");
}

#[test]
fn bound_violation_is_clamped() {
	let mut person = Person {
		name: "foo".to_owned(),
		age: 210,
	};
	apply_limits(&mut person, true).expect("no warnings");
	assert_eq!(person.age, 150);

	person.age = -4;
	apply_limits(&mut person, true).expect("no warnings");
	assert_eq!(person.age, 0);
}

#[test]
fn bound_violation_without_clamp_resets_to_zero() {
	let mut person = Person {
		name: "foo".to_owned(),
		age: 210,
	};
	apply_limits(&mut person, false).expect("no warnings");
	assert_eq!(person.age, 0);
}

crate::config_record! {
	#[derive(Debug, Default)]
	struct Limits {
		retries: u8 => "range=1:5;default=3",
		level: String => "range=debug,info",
		ceiling: i32 => "range=:10",
		floor: u32 => "range=100:",
		label: String => "range=b:m",
	}
}

#[test]
fn bound_violation_without_clamp_uses_default() {
	let mut limits = Limits {
		retries: 9,
		level: "info".to_owned(),
		ceiling: -50,
		floor: 100,
		label: "c".to_owned(),
	};
	apply_limits(&mut limits, false).expect("no warnings");
	assert_eq!(limits.retries, 3);
	assert_eq!(limits.ceiling, -50);
	assert_eq!(limits.floor, 100);
}

#[test]
fn open_ended_bounds_and_strings() {
	let mut limits = Limits {
		retries: 0,
		level: "trace".to_owned(),
		ceiling: 11,
		floor: 7,
		label: "zebra".to_owned(),
	};
	apply_limits(&mut limits, true).expect("no warnings");
	assert_eq!(limits.retries, 1);
	assert_eq!(limits.level, "");
	assert_eq!(limits.ceiling, 10);
	assert_eq!(limits.floor, 100);
	assert_eq!(limits.label, "m");

	limits.label = "a".to_owned();
	apply_limits(&mut limits, true).expect("no warnings");
	assert_eq!(limits.label, "b");
}

crate::config_record! {
	#[derive(Debug, Default)]
	struct Mixed {
		untagged: i32,
		no_range: i32 => "default=1",
		bad_bound: i32 => "range=x:10",
		bad_syntax: i32 => "range=1:2:3",
		bad_default: i32 => "range=1:2;default=nope",
		flag: bool => "range=1:2",
		ratio: f64 => "range=0:1",
		path: PathBuf => "range=a,b",
		unset: Option<i32> => "range=1:2",
		set: Option<i32> => "range=1:2",
	}
}

#[test]
fn warnings_are_collected_per_field() {
	let mut mixed = Mixed {
		untagged: 5,
		bad_default: 9,
		ratio: 4.0,
		set: Some(7),
		..Mixed::default()
	};
	let err = apply_limits(&mut mixed, false).expect_err("warnings expected");
	let warnings = warnings_of(err);
	let fields: Vec<&str> = warnings.iter().map(|warning| &*warning.field).collect();
	assert_eq!(fields, ["untagged", "no_range", "bad_bound", "bad_syntax", "bad_default"]);
	assert_eq!(warnings[0].kind, FieldErrorKind::NoTag);
	assert_eq!(warnings[1].kind, FieldErrorKind::NoRange);
	assert!(matches!(warnings[2].kind, FieldErrorKind::InvalidRange { ref literal, .. } if literal == "x"));
	assert!(matches!(warnings[3].kind, FieldErrorKind::InvalidRangeSyntax { .. }));
	assert!(matches!(warnings[4].kind, FieldErrorKind::InvalidDefault { .. }));

	assert_eq!(mixed.untagged, 5);
	assert_eq!(mixed.bad_default, 9);
	assert_eq!(mixed.ratio, 4.0);
	assert_eq!(mixed.unset, None);
	assert_eq!(mixed.set, None);
}

crate::config_record! {
	#[derive(Debug, Default)]
	struct Optionals {
		bare: Option<i32> => "range=1:5",
		with_default: Option<i32> => "range=1:5;default=3",
		choice: Option<String> => "range=on,off",
		nested: Option<Option<u8>> => "range=1:5",
	}
}

#[test]
fn present_optional_without_default_is_cleared_on_reset() {
	let mut optionals = Optionals {
		bare: Some(9),
		with_default: Some(9),
		choice: Some("maybe".to_owned()),
		nested: Some(Some(0)),
	};
	apply_limits(&mut optionals, false).expect("no warnings");
	assert_eq!(optionals.bare, None);
	assert_eq!(optionals.with_default, Some(3));
	assert_eq!(optionals.choice, None);
	assert_eq!(optionals.nested, None);

	optionals.bare = Some(9);
	optionals.nested = Some(Some(9));
	apply_limits(&mut optionals, true).expect("no warnings");
	assert_eq!(optionals.bare, Some(5));
	assert_eq!(optionals.nested, Some(Some(5)));

	optionals.bare = Some(4);
	apply_limits(&mut optionals, false).expect("no warnings");
	assert_eq!(optionals.bare, Some(4));
}

crate::config_record! {
	#[derive(Debug, Default)]
	struct Tree {
		people: Vec<Person>,
		by_name: BTreeMap<String, Person>,
		sizes: Vec<u16> => "range=1:4",
		nested: Option<Person>,
	}
}

#[test]
fn limits_recurse_into_containers() {
	let mut tree = Tree {
		people: vec![Person {
			name: "nope".to_owned(),
			age: 200,
		}],
		by_name: BTreeMap::from([(
			"x".to_owned(),
			Person {
				name: "foo".to_owned(),
				age: 151,
			},
		)]),
		sizes: vec![0, 2, 9],
		nested: Some(Person {
			name: "baz".to_owned(),
			age: 500,
		}),
	};
	apply_limits(&mut tree, true).expect("no warnings");
	assert_eq!(tree.people[0].name, "bar");
	assert_eq!(tree.people[0].age, 150);
	assert_eq!(tree.by_name["x"].age, 150);
	assert_eq!(tree.sizes, [1, 2, 4]);
	assert_eq!(tree.nested.as_ref().map(|person| person.age), Some(150));
}

#[test]
fn non_record_root_is_rejected() {
	let mut ages = vec![1_i64, 2];
	let err = apply_limits(&mut ages, true).expect_err("sequence root");
	assert!(matches!(err, ConfigError::InvalidParameter { got: "sequence" }));
}
