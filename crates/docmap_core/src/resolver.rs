//! Declared type resolution.

use crate::error::{MapperError, MapperResult};
use crate::types::{ContainerKind, DeclaredType, TypeRef, TypeSpec};
use std::collections::HashMap;

/// Resolves declared property types into [`TypeSpec`]s.
///
/// Resolution is a pure function of the declared type and the set of
/// entity types registered with the mapper.
#[derive(Debug, Default, Clone)]
pub struct TypeResolver {
    entities: HashMap<TypeRef, &'static str>,
}

impl TypeResolver {
    /// Creates a resolver that knows no entity types.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `ty` as a mappable entity. Returns false if it already was.
    pub fn register_entity(&mut self, ty: TypeRef) -> bool {
        self.entities.insert(ty, ty.name()).is_none()
    }

    /// Returns true if `ty` is a registered entity.
    #[must_use]
    pub fn is_entity(&self, ty: TypeRef) -> bool {
        self.entities.contains_key(&ty)
    }

    /// Number of registered entity types.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Resolves a property's declared type.
    ///
    /// A top-level `Optional` is normalized to its inner type; the property
    /// accessor carries the nullability.
    pub fn resolve(&self, declared: &DeclaredType) -> MapperResult<TypeSpec> {
        match declared {
            DeclaredType::Optional(inner) => self.resolve(inner),
            other => self.resolve_strict(other),
        }
    }

    fn resolve_strict(&self, declared: &DeclaredType) -> MapperResult<TypeSpec> {
        match declared {
            DeclaredType::Class(ty) if self.is_entity(*ty) => Ok(TypeSpec::Nested(*ty)),
            DeclaredType::Class(ty) => Ok(TypeSpec::Simple(*ty)),
            DeclaredType::Optional(inner) => Err(MapperError::unresolvable_type(
                inner.name(),
                "optional values are not supported as type arguments",
            )),
            DeclaredType::Raw { ty, .. } => Err(MapperError::unresolvable_type(
                ty.name(),
                "container declared without type arguments",
            )),
            DeclaredType::Generic { shape, args } => {
                let kind = shape.kind();
                if args.len() != kind.arity() {
                    return Err(MapperError::unresolvable_type(
                        shape.type_ref().name(),
                        format!(
                            "{kind} takes {} type argument(s), {} given",
                            kind.arity(),
                            args.len()
                        ),
                    ));
                }

                let args = args
                    .iter()
                    .map(|arg| self.resolve_strict(arg))
                    .collect::<MapperResult<Vec<_>>>()?;

                if kind == ContainerKind::Map && args[0] != TypeSpec::Simple(TypeRef::of::<String>())
                {
                    return Err(MapperError::unresolvable_type(
                        shape.type_ref().name(),
                        "map keys must be String",
                    ));
                }

                Ok(TypeSpec::Parameterized {
                    shape: *shape,
                    args,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContainerShape, MappedType};
    use std::collections::BTreeMap;

    struct Child;

    fn resolver_with_child() -> TypeResolver {
        let mut resolver = TypeResolver::new();
        assert!(resolver.register_entity(TypeRef::of::<Child>()));
        resolver
    }

    #[test]
    fn simple_types() {
        let resolver = TypeResolver::new();
        assert_eq!(
            resolver.resolve(&String::declared_type()).unwrap(),
            TypeSpec::Simple(TypeRef::of::<String>())
        );
    }

    #[test]
    fn optional_is_normalized() {
        let resolver = TypeResolver::new();
        assert_eq!(
            resolver.resolve(&Option::<i64>::declared_type()).unwrap(),
            TypeSpec::Simple(TypeRef::of::<i64>())
        );
    }

    #[test]
    fn entities_resolve_to_nested() {
        let resolver = resolver_with_child();
        assert_eq!(
            resolver.resolve(&DeclaredType::class::<Child>()).unwrap(),
            TypeSpec::Nested(TypeRef::of::<Child>())
        );
    }

    #[test]
    fn parameterized_recursively() {
        let resolver = resolver_with_child();
        let declared = DeclaredType::Generic {
            shape: ContainerShape::list::<Child>(),
            args: vec![DeclaredType::class::<Child>()],
        };
        let spec = resolver.resolve(&declared).unwrap();
        assert_eq!(spec.type_args(), &[TypeSpec::Nested(TypeRef::of::<Child>())]);
        assert_eq!(spec.type_ref(), TypeRef::of::<Vec<Child>>());
    }

    #[test]
    fn nested_containers() {
        let resolver = TypeResolver::new();
        let spec = resolver
            .resolve(&BTreeMap::<String, Vec<i64>>::declared_type())
            .unwrap();
        let value_spec = &spec.type_args()[1];
        assert_eq!(value_spec.type_ref(), TypeRef::of::<Vec<i64>>());
        assert_eq!(value_spec.type_args(), &[TypeSpec::Simple(TypeRef::of::<i64>())]);
    }

    #[test]
    fn raw_container_is_unresolvable() {
        let resolver = TypeResolver::new();
        let declared = DeclaredType::Raw {
            kind: ContainerKind::List,
            ty: TypeRef::of::<Vec<()>>(),
        };
        assert!(matches!(
            resolver.resolve(&declared),
            Err(MapperError::UnresolvableType { .. })
        ));
    }

    #[test]
    fn wrong_arity_is_unresolvable() {
        let resolver = TypeResolver::new();
        let declared = DeclaredType::Generic {
            shape: ContainerShape::list::<String>(),
            args: vec![],
        };
        assert!(matches!(
            resolver.resolve(&declared),
            Err(MapperError::UnresolvableType { .. })
        ));
    }

    #[test]
    fn optional_type_argument_is_unresolvable() {
        let resolver = TypeResolver::new();
        assert!(matches!(
            resolver.resolve(&Vec::<Option<String>>::declared_type()),
            Err(MapperError::UnresolvableType { .. })
        ));
    }

    #[test]
    fn map_keys_must_be_strings() {
        let resolver = TypeResolver::new();
        let declared = DeclaredType::Generic {
            shape: ContainerShape::btree_map::<i64>(),
            args: vec![DeclaredType::class::<i64>(), DeclaredType::class::<i64>()],
        };
        assert!(matches!(
            resolver.resolve(&declared),
            Err(MapperError::UnresolvableType { .. })
        ));
    }

    #[test]
    fn register_twice() {
        let mut resolver = resolver_with_child();
        assert!(!resolver.register_entity(TypeRef::of::<Child>()));
        assert_eq!(resolver.entity_count(), 1);
    }
}
