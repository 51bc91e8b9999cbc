//! Document ↔ entity mapping.

use crate::config::{MapperConfig, UnknownFieldPolicy};
use crate::convert::{
    join_path, EntityReader, EntityWriter, ReadContext, ReadConverter, TextEnumConverter,
    WriteContext, WriteConverter,
};
use crate::descriptor::{DescriptorCache, Entity, EntityDescriptor};
use crate::error::{MapperError, MapperResult};
use crate::registry::{ConverterRegistry, ConverterRegistryBuilder};
use crate::resolver::TypeResolver;
use crate::stats::MapperStats;
use crate::types::{AnyValue, TypeRef};
use docmap_document::{Document, Value};
use std::any::{type_name, Any};
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

/// Builder for [`ObjectMapper`].
pub struct ObjectMapperBuilder {
    config: MapperConfig,
    registry: ConverterRegistryBuilder,
    resolver: TypeResolver,
}

impl ObjectMapperBuilder {
    /// Creates a builder with the built-in converters and default config.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: MapperConfig::default(),
            registry: ConverterRegistryBuilder::new().with_builtins(),
            resolver: TypeResolver::new(),
        }
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: MapperConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers `E` as a mappable entity.
    ///
    /// This also registers the converters that read and write `E` when it
    /// appears nested in another entity.
    #[must_use]
    pub fn entity<E: Entity>(mut self) -> Self {
        if self.resolver.register_entity(TypeRef::of::<E>()) {
            self.registry
                .register_reader(Arc::new(EntityReader::<E>::new()));
            self.registry
                .register_writer(Arc::new(EntityWriter::<E>::new()));
        } else {
            debug!(entity = type_name::<E>(), "entity already registered");
        }
        self
    }

    /// Adds a read converter.
    #[must_use]
    pub fn read_converter(mut self, converter: impl ReadConverter + 'static) -> Self {
        self.registry.register_reader(Arc::new(converter));
        self
    }

    /// Adds a write converter.
    #[must_use]
    pub fn write_converter(mut self, converter: impl WriteConverter + 'static) -> Self {
        self.registry.register_writer(Arc::new(converter));
        self
    }

    /// Maps `T` through its text form in both directions.
    #[must_use]
    pub fn text_enum<T>(mut self) -> Self
    where
        T: FromStr + Display + Any + Send,
    {
        let converter = Arc::new(TextEnumConverter::<T>::new());
        self.registry.register_reader(Arc::clone(&converter) as Arc<dyn ReadConverter>);
        self.registry.register_writer(converter);
        self
    }

    /// Builds the mapper.
    #[must_use]
    pub fn build(self) -> ObjectMapper {
        let registry = self.registry.build();
        let stats = MapperStats::new();
        stats.record_converter_overrides(registry.override_count());
        ObjectMapper {
            config: self.config,
            registry,
            resolver: self.resolver,
            descriptors: DescriptorCache::new(),
            stats,
        }
    }
}

impl Default for ObjectMapperBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts between documents and registered entity types.
///
/// A built mapper is immutable apart from its descriptor cache and
/// counters; share it across threads with an `Arc`.
///
/// ```
/// use docmap_core::{doc, DescriptorBuilder, Entity, MappedType, ObjectMapper};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Widget {
///     id: Option<String>,
///     name: String,
/// }
///
/// impl MappedType for Widget {}
///
/// impl Entity for Widget {
///     fn describe(builder: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> {
///         builder
///             .factory(Widget::default)
///             .identity(|w| w.id.as_deref(), |w, id| w.id = Some(id))
///             .field("name", |w| &w.name, |w, v| w.name = v)
///     }
/// }
///
/// let mapper = ObjectMapper::builder().entity::<Widget>().build();
///
/// let widget: Widget = mapper.from_document(&doc! { "_id" => "507f", "name" => "gizmo" })?;
/// assert_eq!(widget.id.as_deref(), Some("507f"));
///
/// let document = mapper.to_document(&widget)?;
/// assert_eq!(document, doc! { "_id" => "507f", "name" => "gizmo" });
/// # Ok::<(), docmap_core::MapperError>(())
/// ```
pub struct ObjectMapper {
    config: MapperConfig,
    registry: ConverterRegistry,
    resolver: TypeResolver,
    descriptors: DescriptorCache,
    stats: MapperStats,
}

impl ObjectMapper {
    /// Starts building a mapper.
    #[must_use]
    pub fn builder() -> ObjectMapperBuilder {
        ObjectMapperBuilder::new()
    }

    /// The configuration.
    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// The converter registry.
    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// The type resolver.
    pub fn resolver(&self) -> &TypeResolver {
        &self.resolver
    }

    /// Conversion counters.
    pub fn stats(&self) -> &MapperStats {
        &self.stats
    }

    /// Returns the descriptor of `E`, building and caching it on first use.
    pub fn describe<E: Entity>(&self) -> MapperResult<Arc<EntityDescriptor<E>>> {
        if !self.resolver.is_entity(TypeRef::of::<E>()) {
            return Err(MapperError::unsupported_type(type_name::<E>()));
        }
        let (descriptor, filled) = self.descriptors.get_or_build(|| {
            EntityDescriptor::<E>::of(&self.resolver, &self.config.identity_field)
        })?;
        if filled {
            self.stats.record_descriptor_fill();
        }
        Ok(descriptor)
    }

    /// Populates a new `E` from `document`. An absent document maps to `None`.
    pub fn document_to_entity<E: Entity>(
        &self,
        document: Option<&Document>,
    ) -> MapperResult<Option<E>> {
        document
            .map(|document| self.read_entity(document, "", 0))
            .transpose()
    }

    /// Populates a new `E` from `document`.
    pub fn from_document<E: Entity>(&self, document: &Document) -> MapperResult<E> {
        self.read_entity(document, "", 0)
    }

    /// Serializes `entity`. An absent entity maps to `None`.
    pub fn entity_to_document<E: Entity>(&self, entity: Option<&E>) -> MapperResult<Option<Document>> {
        entity
            .map(|entity| self.write_entity(entity, "", 0))
            .transpose()
    }

    /// Serializes `entity`.
    pub fn to_document<E: Entity>(&self, entity: &E) -> MapperResult<Document> {
        self.write_entity(entity, "", 0)
    }

    /// Decodes CBOR bytes and maps the document to `E`.
    pub fn from_cbor<E: Entity>(&self, bytes: &[u8]) -> MapperResult<E> {
        let document = docmap_document::from_cbor(bytes)?;
        self.from_document(&document)
    }

    /// Serializes `entity` and encodes it as CBOR.
    pub fn to_cbor<E: Entity>(&self, entity: &E) -> MapperResult<Vec<u8>> {
        let document = self.to_document(entity)?;
        Ok(docmap_document::to_cbor(&document)?)
    }

    /// Converts one value through the registry.
    ///
    /// The converted value must be exactly of the context's target type.
    pub fn read_value(&self, ctx: &ReadContext<'_>) -> MapperResult<AnyValue> {
        self.check_depth(ctx.path(), ctx.depth())?;
        let value = self.registry.read(ctx, self)?;

        let expected = ctx.target().type_ref();
        if (*value).type_id() != expected.id() {
            return Err(MapperError::type_mismatch(
                ctx.path(),
                expected.name(),
                "converter produced a value of another type",
            ));
        }
        Ok(value)
    }

    /// Converts one application value through the registry.
    pub fn write_value(&self, ctx: &WriteContext<'_>) -> MapperResult<Value> {
        self.check_depth(ctx.path(), ctx.depth())?;
        self.registry.write(ctx, self)
    }

    /// Populates a new `E` from `document`, whose fields sit at `path`.
    pub fn read_entity<E: Entity>(
        &self,
        document: &Document,
        path: &str,
        depth: usize,
    ) -> MapperResult<E> {
        self.check_depth(path, depth)?;
        let descriptor = self.describe::<E>()?;
        let mut entity = descriptor.instantiate()?;

        for (key, value) in document.iter() {
            if key == self.config.identity_field {
                if let Some(identity) = descriptor.identity() {
                    if !value.is_null() {
                        identity.set(&mut entity, value.external_form());
                    }
                    continue;
                }
            }

            let field_path = join_path(path, key);
            let Some(property) = descriptor.property(key) else {
                self.skip_unknown(descriptor.type_name(), &field_path);
                continue;
            };

            let converted = if value.is_null() {
                None
            } else {
                let ctx = ReadContext::at_depth(value, property.spec(), &field_path, depth + 1);
                Some(self.read_value(&ctx)?)
            };
            property.assign(&mut entity, converted).map_err(|_| {
                MapperError::type_mismatch(
                    &field_path,
                    property.spec().type_ref().name(),
                    "value rejected by property",
                )
            })?;
            self.stats.record_field();
        }

        self.stats.record_entity_read();
        Ok(entity)
    }

    /// Serializes `entity`, whose fields sit at `path`.
    pub fn write_entity<E: Entity>(
        &self,
        entity: &E,
        path: &str,
        depth: usize,
    ) -> MapperResult<Document> {
        self.check_depth(path, depth)?;
        let descriptor = self.describe::<E>()?;
        let mut document = Document::with_capacity(descriptor.len() + 1);

        if let Some(id) = descriptor.identity().and_then(|identity| identity.get(entity)) {
            document.insert(self.config.identity_field.as_str(), id);
        }

        for property in descriptor.properties() {
            let Some(value) = property.read(entity) else {
                if self.config.write_nulls {
                    document.insert(property.name(), Value::Null);
                }
                continue;
            };

            let field_path = join_path(path, property.name());
            let ctx = WriteContext::at_depth(value, property.spec(), field_path, depth + 1);
            document.insert(property.name(), self.write_value(&ctx)?);
            self.stats.record_field();
        }

        self.stats.record_entity_written();
        Ok(document)
    }

    fn check_depth(&self, path: &str, depth: usize) -> MapperResult<()> {
        if depth > self.config.max_depth {
            return Err(MapperError::DepthExceeded {
                path: path.to_string(),
                max_depth: self.config.max_depth,
            });
        }
        Ok(())
    }

    fn skip_unknown(&self, entity: &str, field: &str) {
        self.stats.record_unknown_field();
        match self.config.unknown_fields {
            UnknownFieldPolicy::Warn => warn!(entity, field, "skipping unknown document field"),
            UnknownFieldPolicy::Ignore => debug!(entity, field, "skipping unknown document field"),
        }
    }
}

impl Default for ObjectMapper {
    fn default() -> Self {
        ObjectMapperBuilder::new().build()
    }
}

impl std::fmt::Debug for ObjectMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectMapper")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("entities", &self.resolver.entity_count())
            .field("descriptors", &self.descriptors)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorBuilder;
    use crate::types::{MappedType, TargetKey};
    use docmap_document::{doc, ValueKind};
    use std::collections::BTreeMap;

    #[derive(Debug, Default, PartialEq)]
    struct Child {
        name: String,
    }

    impl MappedType for Child {}

    impl Entity for Child {
        fn describe(builder: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> {
            builder
                .factory(Child::default)
                .field("name", |c| &c.name, |c, v| c.name = v)
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Parent {
        id: Option<String>,
        child: Option<Child>,
        scores: BTreeMap<String, Vec<i64>>,
        size: i32,
    }

    impl MappedType for Parent {}

    impl Entity for Parent {
        fn describe(builder: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> {
            builder
                .factory(Parent::default)
                .identity(|p| p.id.as_deref(), |p, id| p.id = Some(id))
                .optional_field("child", |p| p.child.as_ref(), |p, v| p.child = v)
                .field("scores", |p| &p.scores, |p, v| p.scores = v)
                .field("size", |p| &p.size, |p, v| p.size = v)
        }
    }

    #[derive(Debug, Default)]
    struct Chain {
        next: Option<Box<Chain>>,
    }

    impl MappedType for Chain {}

    impl Entity for Chain {
        fn describe(builder: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> {
            builder.factory(Chain::default).optional_field(
                "next",
                |c| c.next.as_deref(),
                |c, v: Option<Chain>| c.next = v.map(Box::new),
            )
        }
    }

    fn mapper() -> ObjectMapper {
        ObjectMapper::builder()
            .entity::<Child>()
            .entity::<Parent>()
            .build()
    }

    #[test]
    fn mapper_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ObjectMapper>();
    }

    #[test]
    fn absent_document_maps_to_none() {
        let mapper = mapper();
        assert_eq!(mapper.document_to_entity::<Parent>(None).unwrap(), None);
        assert_eq!(mapper.entity_to_document::<Parent>(None).unwrap(), None);
    }

    #[test]
    fn unregistered_entity_is_unsupported() {
        let mapper = ObjectMapper::builder().entity::<Child>().build();
        assert!(matches!(
            mapper.from_document::<Parent>(&Document::new()),
            Err(MapperError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn nested_map_of_lists() {
        let mapper = mapper();
        let document = doc! {
            "_id" => "p1",
            "child" => doc! { "name" => "x" },
            "scores" => doc! { "a" => vec![1i64, 2], "b" => Vec::<i64>::new() },
            "size" => 3i64,
        };

        let parent: Parent = mapper.from_document(&document).unwrap();
        assert_eq!(parent.id.as_deref(), Some("p1"));
        assert_eq!(parent.child.as_ref().map(|c| c.name.as_str()), Some("x"));
        assert_eq!(parent.scores["a"], vec![1, 2]);
        assert!(parent.scores["b"].is_empty());
        assert_eq!(parent.size, 3);

        assert_eq!(mapper.to_document(&parent).unwrap(), document);
    }

    #[test]
    fn element_errors_carry_their_path() {
        let mapper = mapper();
        let document = doc! { "scores" => doc! { "a" => vec![Value::Integer(1), Value::from("two")] } };
        match mapper.from_document::<Parent>(&document).unwrap_err() {
            MapperError::NoConverterFound { path, .. } => assert_eq!(path, "scores.a[1]"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn out_of_range_integer_is_invalid() {
        let mapper = mapper();
        let document = doc! { "size" => i64::MAX };
        assert!(matches!(
            mapper.from_document::<Parent>(&document),
            Err(MapperError::InvalidValue { .. })
        ));
    }

    #[test]
    fn nulls_assign_without_conversion() {
        let mapper = mapper();
        let document = doc! { "_id" => (), "child" => (), "size" => () };
        let parent: Parent = mapper.from_document(&document).unwrap();
        assert_eq!(parent, Parent::default());
    }

    #[test]
    fn absent_optionals_follow_write_nulls() {
        let parent = Parent::default();

        let document = mapper().to_document(&parent).unwrap();
        assert_eq!(document.get("child"), Some(&Value::Null));
        assert!(!document.contains_key("_id"));

        let quiet = ObjectMapper::builder()
            .config(MapperConfig::new().write_nulls(false))
            .entity::<Child>()
            .entity::<Parent>()
            .build();
        assert!(!quiet.to_document(&parent).unwrap().contains_key("child"));
    }

    #[test]
    fn custom_identity_field() {
        let mapper = ObjectMapper::builder()
            .config(MapperConfig::new().identity_field("key"))
            .entity::<Child>()
            .entity::<Parent>()
            .build();
        let parent: Parent = mapper.from_document(&doc! { "key" => 9i64 }).unwrap();
        assert_eq!(parent.id.as_deref(), Some("9"));
        assert_eq!(mapper.to_document(&parent).unwrap().get("key"), Some(&Value::from("9")));
    }

    #[test]
    fn depth_is_bounded() {
        let mapper = ObjectMapper::builder()
            .config(MapperConfig::new().max_depth(4))
            .entity::<Chain>()
            .build();

        let mut document = Document::new();
        for _ in 0..6 {
            document = doc! { "next" => document };
        }
        assert!(matches!(
            mapper.from_document::<Chain>(&document),
            Err(MapperError::DepthExceeded { max_depth: 4, .. })
        ));

        let shallow = doc! { "next" => doc! { "next" => () } };
        let chain: Chain = mapper.from_document(&shallow).unwrap();
        assert!(chain.next.is_some());
    }

    #[test]
    fn stats_are_counted() {
        let mapper = mapper();
        let document = doc! { "_id" => "1", "child" => doc! { "name" => "x" }, "extra" => 1i64 };
        let parent: Parent = mapper.from_document(&document).unwrap();
        mapper.to_document(&parent).unwrap();

        let stats = mapper.stats().snapshot();
        assert_eq!(stats.entities_read, 2);
        assert_eq!(stats.entities_written, 2);
        assert_eq!(stats.unknown_fields, 1);
        assert_eq!(stats.descriptor_fills, 2);
        assert_eq!(stats.converter_overrides, 0);
    }

    #[test]
    fn repeated_entity_registration_is_ignored() {
        let mapper = ObjectMapper::builder()
            .entity::<Child>()
            .entity::<Child>()
            .build();
        assert_eq!(mapper.resolver().entity_count(), 1);
        assert_eq!(mapper.stats().converter_overrides(), 0);
    }

    struct MisreportingReader;

    impl ReadConverter for MisreportingReader {
        fn source_kind(&self) -> ValueKind {
            ValueKind::Text
        }

        fn target(&self) -> TargetKey {
            TargetKey::of::<String>()
        }

        fn read(&self, _ctx: &ReadContext<'_>, _mapper: &ObjectMapper) -> MapperResult<AnyValue> {
            Ok(Box::new(7i64))
        }
    }

    #[test]
    fn converter_result_of_wrong_type_is_rejected() {
        let mapper = ObjectMapper::builder()
            .entity::<Child>()
            .read_converter(MisreportingReader)
            .build();

        match mapper.from_document::<Child>(&doc! { "name" => "x" }).unwrap_err() {
            MapperError::TypeMismatch { path, .. } => assert_eq!(path, "name"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(mapper.stats().converter_overrides(), 1);
    }
}
