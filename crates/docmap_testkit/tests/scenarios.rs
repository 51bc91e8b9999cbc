//! End-to-end mapping scenarios.

use docmap_core::{
    doc, Document, MapperConfig, MapperError, ObjectId, ObjectMapper, UnknownFieldPolicy, Value,
};
use docmap_testkit::prelude::*;

#[test]
fn widget_scenario() {
    let mapper = fixture_mapper();
    let widget: Widget = mapper.from_document(&widget_document()).unwrap();

    assert_eq!(widget.id.as_deref(), Some("507f"));
    assert_eq!(widget.name, "gizmo");
    assert_eq!(widget.tags, vec!["a", "b"]);
    assert_eq!(mapper.stats().unknown_fields(), 1);
}

#[test]
fn nested_scenario() {
    let mapper = fixture_mapper();
    let parent: Parent = mapper.from_document(&parent_document()).unwrap();

    assert_eq!(parent.id.as_deref(), Some("1"));
    assert_eq!(parent.child.unwrap().name, "x");
}

#[test]
fn absent_document_yields_none() {
    let mapper = fixture_mapper();
    assert!(mapper.document_to_entity::<Widget>(None).unwrap().is_none());
}

#[test]
fn identity_only_document() {
    let mapper = fixture_mapper();
    let widget: Widget = mapper.from_document(&doc! { "_id" => "abc" }).unwrap();
    assert_eq!(
        widget,
        Widget {
            id: Some("abc".to_string()),
            ..Widget::default()
        }
    );
}

#[test]
fn object_id_identity_becomes_hex() {
    let mapper = fixture_mapper();
    let id = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
    let widget: Widget = mapper.from_document(&doc! { "_id" => id }).unwrap();
    assert_eq!(widget.id.as_deref(), Some("507f1f77bcf86cd799439011"));

    let document = mapper.to_document(&widget).unwrap();
    assert_eq!(
        document.get("_id"),
        Some(&Value::from("507f1f77bcf86cd799439011"))
    );
}

#[test]
fn unknown_fields_are_dropped_on_reserialize() {
    let mapper = fixture_mapper();
    let widget: Widget = mapper.from_document(&widget_document()).unwrap();
    let document = mapper.to_document(&widget).unwrap();

    assert!(!document.contains_key("extra"));
    let mut expected = widget_document();
    expected.remove("extra");
    assert_eq!(document, expected);
}

#[test]
fn ignore_policy_still_skips() {
    let mapper = fixture_mapper_with(MapperConfig::new().unknown_fields(UnknownFieldPolicy::Ignore));
    let widget: Widget = mapper.from_document(&widget_document()).unwrap();
    assert_eq!(widget.name, "gizmo");
    assert_eq!(mapper.stats().unknown_fields(), 1);
}

#[test]
fn numeric_tags_fail_without_dropping() {
    let mapper = fixture_mapper();
    let document = doc! { "tags" => vec![Value::from("a"), Value::Integer(2)] };

    match mapper.from_document::<Widget>(&document).unwrap_err() {
        MapperError::NoConverterFound {
            path, source_type, ..
        } => {
            assert_eq!(path, "tags[1]");
            assert_eq!(source_type, "integer");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn null_list_element_fails() {
    let mapper = fixture_mapper();
    let document = doc! { "tags" => vec![Value::Null] };
    assert!(matches!(
        mapper.from_document::<Widget>(&document),
        Err(MapperError::NoConverterFound { .. })
    ));
}

#[test]
fn wrong_shape_for_nested_entity() {
    let mapper = fixture_mapper();
    let document = doc! { "child" => "not a document" };
    assert!(matches!(
        mapper.from_document::<Parent>(&document),
        Err(MapperError::NoConverterFound { .. })
    ));
}

#[test]
fn gadget_round_trip() {
    let mapper = fixture_mapper();
    let gadget = sample_gadget();

    let document = mapper.to_document(&gadget).unwrap();
    assert_eq!(document.get("color"), Some(&Value::from("blue")));
    assert_eq!(document.get("note"), Some(&Value::Null));
    assert_eq!(
        document.get("parts").and_then(Value::as_array).map(<[Value]>::len),
        Some(2)
    );

    let back: Gadget = mapper.from_document(&document).unwrap();
    assert_eq!(back, gadget);
}

#[test]
fn gadget_cbor_round_trip() {
    let mapper = fixture_mapper();
    let gadget = sample_gadget();
    let bytes = mapper.to_cbor(&gadget).unwrap();
    assert_eq!(mapper.from_cbor::<Gadget>(&bytes).unwrap(), gadget);
}

#[test]
fn integer_ratio_is_widened() {
    let mapper = fixture_mapper();
    let gadget: Gadget = mapper.from_document(&doc! { "ratio" => 2i64 }).unwrap();
    assert_eq!(gadget.ratio, 2.0);
}

#[test]
fn unknown_enum_text_is_invalid() {
    let mapper = fixture_mapper();
    match mapper
        .from_document::<Gadget>(&doc! { "color" => "mauve" })
        .unwrap_err()
    {
        MapperError::InvalidValue { path, .. } => assert_eq!(path, "color"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn nested_entity_errors_carry_full_path() {
    let mapper = fixture_mapper();
    let document = doc! {
        "parts" => vec![Value::from(doc! { "name" => "ok" }), Value::from(doc! { "name" => 5i64 })],
    };
    match mapper.from_document::<Gadget>(&document).unwrap_err() {
        MapperError::NoConverterFound { path, .. } => assert_eq!(path, "parts[1].name"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn json_fixture_maps() {
    let mapper = fixture_mapper();
    let document = json_document(
        r#"{
            "_id": "g-9",
            "label": "from json",
            "owner": {"$oid": "0102030405060708090a0b0c"},
            "attrs": {"a": "1"},
            "history": [[1], [2, 3]],
            "small": 12
        }"#,
    );
    let gadget: Gadget = mapper.from_document(&document).unwrap();
    assert_eq!(gadget.label, "from json");
    assert_eq!(
        gadget.owner.map(|id| id.to_hex()).as_deref(),
        Some("0102030405060708090a0b0c")
    );
    assert_eq!(gadget.history, vec![vec![1], vec![2, 3]]);
    assert_eq!(gadget.small, 12);
}

#[test]
fn unregistered_entity() {
    let mapper = ObjectMapper::builder().entity::<Widget>().build();
    assert!(matches!(
        mapper.from_document::<Gadget>(&Document::new()),
        Err(MapperError::UnsupportedType { .. })
    ));
    assert!(matches!(
        mapper.describe::<Gadget>(),
        Err(MapperError::UnsupportedType { .. })
    ));
}

#[test]
fn unregistered_nested_entity_has_no_converter() {
    let mapper = ObjectMapper::builder().entity::<Parent>().build();
    assert!(matches!(
        mapper.from_document::<Parent>(&parent_document()),
        Err(MapperError::NoConverterFound { .. })
    ));
}

#[test]
fn corrupt_cbor_is_a_codec_error() {
    let mapper = fixture_mapper();
    assert!(matches!(
        mapper.from_cbor::<Widget>(&[0xa1, 0x61]),
        Err(MapperError::Codec(_))
    ));
}
