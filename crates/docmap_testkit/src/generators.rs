//! Property-based test generators using proptest.

use crate::fixtures::{Child, Color, Gadget, Widget};
use docmap_core::{Binary, Document, ObjectId, Value};
use proptest::prelude::*;

/// Field names the fixture entities declare, plus the identity key.
pub const RESERVED_FIELDS: &[&str] = &[
    "_id", "name", "tags", "child", "label", "active", "count", "small", "ratio", "blob", "owner",
    "color", "attrs", "lookup", "history", "parts", "note",
];

/// Strategy for document field names.
pub fn field_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,11}").expect("Invalid regex")
}

/// Strategy for field names no fixture entity declares.
pub fn unknown_field_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("x_[a-z0-9]{1,8}").expect("Invalid regex")
}

/// Strategy for object ids.
pub fn object_id_strategy() -> impl Strategy<Value = ObjectId> {
    any::<[u8; 12]>().prop_map(ObjectId::from_bytes)
}

fn leaf_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        (-1.0e9f64..1.0e9).prop_map(Value::Double),
        "[ -~]{0,16}".prop_map(Value::Text),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(Value::Bytes),
        object_id_strategy().prop_map(Value::ObjectId),
    ]
}

/// Strategy for arbitrary values, nested up to three levels.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    leaf_value_strategy().prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map(field_name_strategy(), inner, 0..4)
                .prop_map(|fields| Value::Document(fields.into_iter().collect())),
        ]
    })
}

/// Strategy for arbitrary documents.
pub fn document_strategy() -> impl Strategy<Value = Document> {
    prop::collection::btree_map(field_name_strategy(), value_strategy(), 0..8)
        .prop_map(|fields| fields.into_iter().collect())
}

/// Strategy for documents made only of unknown fields.
pub fn unknown_fields_strategy() -> impl Strategy<Value = Document> {
    prop::collection::btree_map(unknown_field_strategy(), value_strategy(), 1..6)
        .prop_map(|fields| fields.into_iter().collect())
}

/// Strategy for widgets with a text identity.
pub fn widget_strategy() -> impl Strategy<Value = Widget> {
    (
        prop::option::of("[a-f0-9]{1,24}"),
        "[ -~]{0,24}",
        prop::collection::vec("[a-z]{0,8}", 0..6),
    )
        .prop_map(|(id, name, tags)| Widget { id, name, tags })
}

/// Strategy for documents whose fields all map onto [`Widget`].
pub fn widget_document_strategy() -> impl Strategy<Value = Document> {
    (
        "[a-f0-9]{1,24}",
        "[ -~]{0,24}",
        prop::collection::vec("[a-z]{0,8}", 0..6),
    )
        .prop_map(|(id, name, tags)| {
            let mut document = Document::new();
            document.insert("_id", id);
            document.insert("name", name);
            document.insert("tags", tags);
            document
        })
}

/// Strategy for nested children.
pub fn child_strategy() -> impl Strategy<Value = Child> {
    "[a-z]{0,12}".prop_map(|name| Child { name })
}

/// Strategy for colors.
pub fn color_strategy() -> impl Strategy<Value = Color> {
    prop::sample::select(Color::ALL.to_vec())
}

/// Strategy for fully populated gadgets.
pub fn gadget_strategy() -> impl Strategy<Value = Gadget> {
    let scalars = (
        prop::option::of("[a-z0-9-]{1,16}"),
        "[ -~]{0,16}",
        any::<bool>(),
        any::<i64>(),
        any::<i32>(),
        (-1.0e9f64..1.0e9),
        prop::collection::vec(any::<u8>(), 0..32),
    );
    let composites = (
        prop::option::of(object_id_strategy()),
        color_strategy(),
        prop::collection::btree_map("[a-z]{1,6}", "[a-z]{0,6}", 0..4),
        prop::collection::hash_map("[a-z]{1,6}", any::<i64>(), 0..4),
        prop::collection::vec(prop::collection::vec(any::<i64>(), 0..4), 0..4),
        prop::collection::vec(child_strategy(), 0..4),
        prop::option::of("[ -~]{0,16}"),
    );

    (scalars, composites).prop_map(
        |(
            (id, label, active, count, small, ratio, blob),
            (owner, color, attrs, lookup, history, parts, note),
        )| Gadget {
            id,
            label,
            active,
            count,
            small,
            ratio,
            blob: Binary(blob),
            owner,
            color,
            attrs,
            lookup,
            history,
            parts,
            note,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::strategy::ValueTree;
    use proptest::test_runner::TestRunner;

    #[test]
    fn unknown_fields_avoid_declared_names() {
        let mut runner = TestRunner::default();
        for _ in 0..32 {
            let document = unknown_fields_strategy()
                .new_tree(&mut runner)
                .unwrap()
                .current();
            for key in document.keys() {
                assert!(!RESERVED_FIELDS.contains(&key));
            }
        }
    }

    #[test]
    fn widget_documents_have_text_identity() {
        let mut runner = TestRunner::default();
        let document = widget_document_strategy()
            .new_tree(&mut runner)
            .unwrap()
            .current();
        assert!(document.get("_id").and_then(Value::as_text).is_some());
    }
}
