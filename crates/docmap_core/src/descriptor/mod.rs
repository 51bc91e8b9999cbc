//! Entity descriptors.
//!
//! An entity type lists its persisted properties once, in
//! [`Entity::describe`]. The mapper resolves every declared type when the
//! descriptor is first built and caches the result for its lifetime.
//!
//! ```
//! use docmap_core::{DescriptorBuilder, Entity, MappedType};
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
//! ```

mod cache;
mod property;

pub use cache::DescriptorCache;
pub use property::{Identity, Property};

use crate::error::{MapperError, MapperResult};
use crate::resolver::TypeResolver;
use crate::types::{DeclaredType, MappedType, TypeRef};
use property::PropertyDecl;
use std::collections::HashMap;
use std::fmt;

type FactoryFn<E> = Box<dyn Fn() -> Result<E, String> + Send + Sync>;

/// A type that maps to and from documents.
pub trait Entity: MappedType {
    /// Declares the entity's factory, identity and properties.
    fn describe(builder: DescriptorBuilder<Self>) -> DescriptorBuilder<Self>;
}

/// Collects the property table of an entity type.
pub struct DescriptorBuilder<E> {
    factory: Option<FactoryFn<E>>,
    identity: Option<Identity<E>>,
    properties: Vec<PropertyDecl<E>>,
}

impl<E: Entity> DescriptorBuilder<E> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factory: None,
            identity: None,
            properties: Vec::new(),
        }
    }

    /// Sets the constructor used for every document read.
    #[must_use]
    pub fn factory(self, factory: fn() -> E) -> Self {
        self.try_factory(move || Ok(factory()))
    }

    /// Sets a constructor that can fail.
    #[must_use]
    pub fn try_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Result<E, String> + Send + Sync + 'static,
    {
        self.factory = Some(Box::new(factory));
        self
    }

    /// Declares the identity attribute, stored under the reserved key.
    #[must_use]
    pub fn identity<G, S>(mut self, get: G, set: S) -> Self
    where
        G: Fn(&E) -> Option<&str> + Send + Sync + 'static,
        S: Fn(&mut E, String) + Send + Sync + 'static,
    {
        self.identity = Some(Identity::new(get, set));
        self
    }

    /// Declares a required property.
    ///
    /// A document `null` assigns `T::default()`.
    #[must_use]
    pub fn field<T, G, S>(mut self, name: impl Into<String>, get: G, set: S) -> Self
    where
        T: MappedType + Default,
        G: Fn(&E) -> &T + Send + Sync + 'static,
        S: Fn(&mut E, T) + Send + Sync + 'static,
    {
        self.properties
            .push(PropertyDecl::required(name.into(), get, set));
        self
    }

    /// Declares an optional property.
    ///
    /// A document `null` assigns `None`.
    #[must_use]
    pub fn optional_field<T, G, S>(mut self, name: impl Into<String>, get: G, set: S) -> Self
    where
        T: MappedType,
        G: Fn(&E) -> Option<&T> + Send + Sync + 'static,
        S: Fn(&mut E, Option<T>) + Send + Sync + 'static,
    {
        self.properties
            .push(PropertyDecl::optional(name.into(), get, set));
        self
    }

    /// Resolves every property and freezes the descriptor.
    ///
    /// `identity_field` is the document key reserved for the identity. An
    /// entity with an identity cannot also declare a property of that name.
    pub fn build(
        self,
        resolver: &TypeResolver,
        identity_field: &str,
    ) -> MapperResult<EntityDescriptor<E>> {
        let type_ref = TypeRef::of::<E>();
        let mut index = HashMap::with_capacity(self.properties.len());
        let mut properties = Vec::with_capacity(self.properties.len());
        let has_identity = self.identity.is_some();

        for decl in self.properties {
            let shadows_identity = has_identity && decl.name == identity_field;
            if shadows_identity || index.contains_key(&decl.name) {
                return Err(MapperError::DuplicateProperty {
                    type_name: type_ref.name().to_string(),
                    property: decl.name,
                });
            }
            if !decl.optional && matches!(decl.declared, DeclaredType::Optional(_)) {
                return Err(MapperError::unresolvable_type(
                    decl.declared.name(),
                    format!(
                        "property {:?} has an Option type; declare it with optional_field",
                        decl.name
                    ),
                ));
            }
            let spec = resolver.resolve(&decl.declared)?;
            index.insert(decl.name.clone(), properties.len());
            properties.push(decl.resolved(spec));
        }

        Ok(EntityDescriptor {
            type_ref,
            properties,
            index,
            identity: self.identity,
            factory: self.factory,
        })
    }
}

impl<E: Entity> Default for DescriptorBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// The resolved property table of one entity type.
pub struct EntityDescriptor<E> {
    type_ref: TypeRef,
    properties: Vec<Property<E>>,
    index: HashMap<String, usize>,
    identity: Option<Identity<E>>,
    factory: Option<FactoryFn<E>>,
}

impl<E: Entity> EntityDescriptor<E> {
    /// Builds the descriptor declared by `E`.
    pub fn of(resolver: &TypeResolver, identity_field: &str) -> MapperResult<Self> {
        E::describe(DescriptorBuilder::new()).build(resolver, identity_field)
    }

    /// The entity type.
    pub fn type_ref(&self) -> TypeRef {
        self.type_ref
    }

    /// The entity type name.
    pub fn type_name(&self) -> &'static str {
        self.type_ref.name()
    }

    /// Looks up a property by name.
    pub fn property(&self, name: &str) -> Option<&Property<E>> {
        self.index.get(name).map(|&i| &self.properties[i])
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> &[Property<E>] {
        &self.properties
    }

    /// The identity accessor, if the entity has one.
    pub fn identity(&self) -> Option<&Identity<E>> {
        self.identity.as_ref()
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns true if the entity declares no properties.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Creates a fresh instance through the factory.
    pub fn instantiate(&self) -> MapperResult<E> {
        let factory = self.factory.as_ref().ok_or_else(|| {
            MapperError::entity_instantiation(self.type_name(), "no factory registered")
        })?;
        factory().map_err(|reason| MapperError::entity_instantiation(self.type_name(), reason))
    }
}

impl<E> fmt::Debug for EntityDescriptor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("type", &self.type_ref)
            .field("properties", &self.properties)
            .field("identity", &self.identity.is_some())
            .finish()
    }
}
