use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::{Leaf, Node, NodeMut, Record, Scalar, ScalarError, ScalarKind, TextLeaf};

crate::config_record! {
	#[derive(Debug, Default)]
	struct Sample {
		name: String => "default=foo",
		count: u8,
		items: Vec<i32> => "default=1",
		by_key: BTreeMap<String, bool>,
		path: Option<PathBuf>,
	}
}

#[test]
fn record_macro_lists_fields_in_order_with_tags() {
	let mut sample = Sample::default();
	assert_eq!(sample.record_name(), "Sample");

	let fields = sample.fields();
	let names: Vec<_> = fields.iter().map(|field| field.name).collect();
	assert_eq!(names, ["name", "count", "items", "by_key", "path"]);
	assert_eq!(fields[0].tag, Some("default=foo"));
	assert_eq!(fields[1].tag, None);
	assert_eq!(fields[2].tag, Some("default=1"));
}

#[test]
fn record_macro_exposes_record_node() {
	let mut sample = Sample::default();
	assert!(matches!(sample.node_mut(), NodeMut::Record(_)));
}

#[test]
fn node_kinds_for_std_containers() {
	let mut items = vec![1_i32, 2];
	let NodeMut::Sequence(children) = items.node_mut() else {
		panic!("expected sequence");
	};
	assert_eq!(children.len(), 2);

	let mut map = BTreeMap::from([("a".to_owned(), true)]);
	assert_eq!(map.node_mut().kind_name(), "map");

	let mut boxed = Box::new(5_u16);
	assert_eq!(boxed.node_mut().kind_name(), "leaf");

	let mut path = PathBuf::new();
	assert_eq!(path.node_mut().kind_name(), "text");
}

#[test]
fn leaf_type_detection_follows_indirections() {
	assert!(String::is_leaf_type());
	assert!(Option::<Option<String>>::is_leaf_type());
	assert!(Box::<i64>::is_leaf_type());
	assert!(Option::<PathBuf>::is_leaf_type());
	assert!(!Vec::<String>::is_leaf_type());
	assert!(!Sample::is_leaf_type());
}

#[test]
fn optional_structured_flag() {
	let mut leafy: Option<String> = None;
	assert!(!leafy.node_mut().is_structured());

	let mut nested: Option<Sample> = None;
	assert!(nested.node_mut().is_structured());
}

#[test]
fn optional_allocates_and_clears() {
	let mut value: Option<i64> = None;
	{
		let NodeMut::Optional(slot) = value.node_mut() else {
			panic!("expected optional");
		};
		assert!(slot.get_mut().is_none());
		let NodeMut::Leaf(leaf) = slot.get_or_allocate("ignored").expect("integers allocate").node_mut() else {
			panic!("expected leaf");
		};
		leaf.set(&Scalar::Signed(9)).expect("set succeeds");
	}
	assert_eq!(value, Some(9));

	let NodeMut::Optional(slot) = value.node_mut() else {
		panic!("expected optional");
	};
	slot.clear();
	assert_eq!(value, None);
}

#[test]
fn optional_text_leaf_allocates_from_literal() {
	let mut addr: Option<std::net::IpAddr> = None;
	{
		let NodeMut::Optional(slot) = addr.node_mut() else {
			panic!("expected optional");
		};
		assert!(slot.get_or_allocate("not-an-ip").is_err());
		assert!(slot.get_mut().is_none());
		assert!(matches!(slot.get_or_allocate("10.1.2.3").expect("address parses").node_mut(), NodeMut::Text(_)));
	}
	assert_eq!(addr.map(|addr| addr.to_string()).as_deref(), Some("10.1.2.3"));

	assert_eq!(Option::<Option<u8>>::allocate("x"), Ok(None));
	assert!(Sample::allocate("x").is_err());
}

#[test]
fn narrow_integers_reject_out_of_range_values() {
	let mut small = 0_i8;
	assert_eq!(small.parse("100"), Ok(Scalar::Signed(100)));
	assert!(matches!(small.parse("300"), Err(ScalarError::OutOfRange { .. })));
	assert!(matches!(small.set(&Scalar::Signed(-129)), Err(ScalarError::OutOfRange { .. })));
	assert_eq!(small, 0);

	let mut byte = 0_u8;
	byte.set(&Scalar::Unsigned(255)).expect("255 fits u8");
	assert_eq!(byte, 255);
	assert!(matches!(byte.set(&Scalar::Signed(1)), Err(ScalarError::KindMismatch { .. })));
}

#[test]
fn leaf_zero_and_clear() {
	let mut flag = true;
	assert!(!flag.is_zero());
	flag.clear();
	assert!(flag.is_zero());

	let mut text = "x".to_owned();
	assert_eq!(text.kind(), ScalarKind::String);
	text.clear();
	assert!(text.is_zero());

	let mut ratio = 0.5_f32;
	assert_eq!(ratio.get(), Scalar::Float(0.5));
	ratio.set(&Scalar::Float(2.0)).expect("float set succeeds");
	assert_eq!(ratio, 2.0);
}

#[test]
fn text_leaf_parses_itself() {
	let mut addr: std::net::IpAddr = "127.0.0.1".parse().expect("valid address");
	addr.unmarshal_text("::1").expect("ipv6 parses");
	assert_eq!(addr.to_string(), "::1");
	assert!(addr.unmarshal_text("not-an-ip").is_err());
}
