//! Fixture entities and mapper helpers.
//!
//! The entities here cover every built-in converter: scalars, binary,
//! object ids, text enums, lists, maps, nested entities and lists of
//! entities.

use docmap_core::{
    doc, Binary, DescriptorBuilder, Document, Entity, MappedType, MapperConfig, ObjectId,
    ObjectMapper,
};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// A small entity with an identity, a name and a list of tags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Widget {
    /// Identity.
    pub id: Option<String>,
    /// Display name.
    pub name: String,
    /// Free-form tags.
    pub tags: Vec<String>,
}

impl MappedType for Widget {}

impl Entity for Widget {
    fn describe(builder: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> {
        builder
            .factory(Widget::default)
            .identity(|w| w.id.as_deref(), |w, id| w.id = Some(id))
            .field("name", |w| &w.name, |w, v| w.name = v)
            .field("tags", |w| &w.tags, |w, v| w.tags = v)
    }
}

/// An entity without identity, used nested inside others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Child {
    /// Name.
    pub name: String,
}

impl MappedType for Child {}

impl Entity for Child {
    fn describe(builder: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> {
        builder
            .factory(Child::default)
            .field("name", |c| &c.name, |c, v| c.name = v)
    }
}

/// An entity holding one optional nested [`Child`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parent {
    /// Identity.
    pub id: Option<String>,
    /// The nested child.
    pub child: Option<Child>,
}

impl MappedType for Parent {}

impl Entity for Parent {
    fn describe(builder: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> {
        builder
            .factory(Parent::default)
            .identity(|p| p.id.as_deref(), |p, id| p.id = Some(id))
            .optional_field("child", |p| p.child.as_ref(), |p, v| p.child = v)
    }
}

/// A text-mapped enum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Color {
    /// Red.
    #[default]
    Red,
    /// Green.
    Green,
    /// Blue.
    Blue,
}

impl Color {
    /// Every variant.
    pub const ALL: [Color; 3] = [Color::Red, Color::Green, Color::Blue];
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Blue => "blue",
        })
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "blue" => Ok(Color::Blue),
            other => Err(format!("unknown color {other:?}")),
        }
    }
}

impl MappedType for Color {}

/// An entity with one property of every supported shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gadget {
    /// Identity.
    pub id: Option<String>,
    /// Label.
    pub label: String,
    /// Flag.
    pub active: bool,
    /// 64-bit counter.
    pub count: i64,
    /// 32-bit, range-checked on read.
    pub small: i32,
    /// Ratio; integers are accepted on read.
    pub ratio: f64,
    /// Opaque payload.
    pub blob: Binary,
    /// Owner object id.
    pub owner: Option<ObjectId>,
    /// Text-mapped enum.
    pub color: Color,
    /// String attributes.
    pub attrs: BTreeMap<String, String>,
    /// Integer counters.
    pub lookup: HashMap<String, i64>,
    /// Nested lists.
    pub history: Vec<Vec<i64>>,
    /// Nested entities.
    pub parts: Vec<Child>,
    /// Optional note.
    pub note: Option<String>,
}

impl MappedType for Gadget {}

impl Entity for Gadget {
    fn describe(builder: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> {
        builder
            .factory(Gadget::default)
            .identity(|g| g.id.as_deref(), |g, id| g.id = Some(id))
            .field("label", |g| &g.label, |g, v| g.label = v)
            .field("active", |g| &g.active, |g, v| g.active = v)
            .field("count", |g| &g.count, |g, v| g.count = v)
            .field("small", |g| &g.small, |g, v| g.small = v)
            .field("ratio", |g| &g.ratio, |g, v| g.ratio = v)
            .field("blob", |g| &g.blob, |g, v| g.blob = v)
            .optional_field("owner", |g| g.owner.as_ref(), |g, v| g.owner = v)
            .field("color", |g| &g.color, |g, v| g.color = v)
            .field("attrs", |g| &g.attrs, |g, v| g.attrs = v)
            .field("lookup", |g| &g.lookup, |g, v| g.lookup = v)
            .field("history", |g| &g.history, |g, v| g.history = v)
            .field("parts", |g| &g.parts, |g, v| g.parts = v)
            .optional_field("note", |g| g.note.as_ref(), |g, v| g.note = v)
    }
}

/// A mapper with every fixture entity registered.
pub fn fixture_mapper() -> ObjectMapper {
    fixture_mapper_with(MapperConfig::default())
}

/// A mapper with every fixture entity registered, using `config`.
pub fn fixture_mapper_with(config: MapperConfig) -> ObjectMapper {
    ObjectMapper::builder()
        .config(config)
        .entity::<Widget>()
        .entity::<Child>()
        .entity::<Parent>()
        .entity::<Gadget>()
        .text_enum::<Color>()
        .build()
}

/// `{_id: "507f", name: "gizmo", tags: ["a", "b"], extra: 1}`.
pub fn widget_document() -> Document {
    doc! {
        "_id" => "507f",
        "name" => "gizmo",
        "tags" => vec!["a", "b"],
        "extra" => 1i64,
    }
}

/// `{_id: "1", child: {name: "x"}}`.
pub fn parent_document() -> Document {
    doc! {
        "_id" => "1",
        "child" => doc! { "name" => "x" },
    }
}

/// A gadget with every property set.
pub fn sample_gadget() -> Gadget {
    Gadget {
        id: Some("g-1".to_string()),
        label: "sprocket".to_string(),
        active: true,
        count: -42,
        small: 7,
        ratio: 0.25,
        blob: Binary(vec![0xde, 0xad, 0xbe, 0xef]),
        owner: Some(ObjectId::from_bytes([7; 12])),
        color: Color::Blue,
        attrs: [("size".to_string(), "xl".to_string())].into_iter().collect(),
        lookup: [("hits".to_string(), 3)].into_iter().collect(),
        history: vec![vec![1, 2], vec![], vec![3]],
        parts: vec![
            Child {
                name: "bolt".to_string(),
            },
            Child {
                name: "nut".to_string(),
            },
        ],
        note: None,
    }
}

/// Parses a JSON fixture into a document.
///
/// # Panics
///
/// Panics if `json` is not a JSON object.
pub fn json_document(json: &str) -> Document {
    serde_json::from_str(json).expect("Invalid JSON document fixture")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_text_form() {
        for color in Color::ALL {
            assert_eq!(color.to_string().parse::<Color>().unwrap(), color);
        }
        assert!("mauve".parse::<Color>().is_err());
    }

    #[test]
    fn fixture_descriptors_build() {
        let mapper = fixture_mapper();
        assert_eq!(mapper.describe::<Widget>().unwrap().len(), 2);
        assert_eq!(mapper.describe::<Gadget>().unwrap().len(), 13);
        assert!(mapper.describe::<Child>().unwrap().identity().is_none());
    }

    #[test]
    fn json_fixture() {
        let document = json_document(r#"{"_id": "507f", "tags": []}"#);
        assert_eq!(document.len(), 2);
    }
}
