//! # docmap Core
//!
//! Bidirectional mapping between schema-less documents and typed entities.
//!
//! This crate provides:
//! - [`Entity`] and [`DescriptorBuilder`] for declaring an entity's
//!   persisted properties and identity
//! - [`TypeResolver`], which classifies declared property types
//! - [`ConverterRegistry`], the extension point for new value types
//! - [`ObjectMapper`], which drives conversion in both directions
//!
//! ## Usage
//!
//! ```
//! use docmap_core::{doc, DescriptorBuilder, Entity, MappedType, ObjectMapper};
//!
//! #[derive(Default)]
//! struct Widget {
//!     id: Option<String>,
//!     name: String,
//!     tags: Vec<String>,
//! }
//!
//! impl MappedType for Widget {}
//!
//! impl Entity for Widget {
//!     fn describe(builder: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> {
//!         builder
//!             .factory(Widget::default)
//!             .identity(|w| w.id.as_deref(), |w, id| w.id = Some(id))
//!             .field("name", |w| &w.name, |w, v| w.name = v)
//!             .field("tags", |w| &w.tags, |w, v| w.tags = v)
//!     }
//! }
//!
//! let mapper = ObjectMapper::builder().entity::<Widget>().build();
//! let document = doc! {
//!     "_id" => "507f",
//!     "name" => "gizmo",
//!     "tags" => vec!["a", "b"],
//!     "extra" => 1i64,
//! };
//!
//! let widget: Widget = mapper.from_document(&document).unwrap();
//! assert_eq!(widget.tags, vec!["a", "b"]);
//! assert_eq!(mapper.stats().unknown_fields(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod convert;
mod descriptor;
mod error;
mod mapper;
mod registry;
mod resolver;
mod stats;
mod types;

pub use config::{MapperConfig, UnknownFieldPolicy, DEFAULT_IDENTITY_FIELD};
pub use convert::{
    builtin_readers, builtin_writers, EntityReader, EntityWriter, ListReader, ListWriter,
    MapReader, MapWriter, ReadContext, ReadConverter, SimpleReader, SimpleWriter,
    TextEnumConverter, WriteContext, WriteConverter,
};
pub use descriptor::{
    DescriptorBuilder, DescriptorCache, Entity, EntityDescriptor, Identity, Property,
};
pub use error::{MapperError, MapperResult};
pub use mapper::{ObjectMapper, ObjectMapperBuilder};
pub use registry::{ConverterRegistry, ConverterRegistryBuilder};
pub use resolver::TypeResolver;
pub use stats::{MapperStats, StatsSnapshot};
pub use types::{
    AnyValue, Binary, ContainerKind, ContainerParts, ContainerShape, ContainerView, DeclaredType,
    MappedType, TargetKey, TypeRef, TypeSpec,
};

pub use docmap_document::{doc, Document, ObjectId, Value, ValueKind};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
