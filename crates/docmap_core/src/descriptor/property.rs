//! Typed property accessors.

use crate::types::{AnyValue, DeclaredType, MappedType, TypeSpec};
use std::any::Any;
use std::fmt;

pub(crate) type GetFn<E> = Box<dyn for<'a> Fn(&'a E) -> Option<&'a dyn Any> + Send + Sync>;
pub(crate) type SetFn<E> = Box<dyn Fn(&mut E, Option<AnyValue>) -> Result<(), AnyValue> + Send + Sync>;

type IdGetFn<E> = Box<dyn for<'a> Fn(&'a E) -> Option<&'a str> + Send + Sync>;
type IdSetFn<E> = Box<dyn Fn(&mut E, String) + Send + Sync>;

fn getter<E, F>(f: F) -> GetFn<E>
where
    F: for<'a> Fn(&'a E) -> Option<&'a dyn Any> + Send + Sync + 'static,
{
    Box::new(f)
}

fn setter<E, F>(f: F) -> SetFn<E>
where
    F: Fn(&mut E, Option<AnyValue>) -> Result<(), AnyValue> + Send + Sync + 'static,
{
    Box::new(f)
}

/// A property as declared on the builder, before its type is resolved.
pub(crate) struct PropertyDecl<E> {
    pub(crate) name: String,
    pub(crate) declared: DeclaredType,
    pub(crate) optional: bool,
    pub(crate) get: GetFn<E>,
    pub(crate) set: SetFn<E>,
}

impl<E: 'static> PropertyDecl<E> {
    pub(crate) fn required<T, G, S>(name: String, get: G, set: S) -> Self
    where
        T: MappedType + Default,
        G: Fn(&E) -> &T + Send + Sync + 'static,
        S: Fn(&mut E, T) + Send + Sync + 'static,
    {
        Self {
            name,
            declared: T::declared_type(),
            optional: false,
            get: getter(move |entity: &E| Some(get(entity) as &dyn Any)),
            set: setter(move |entity: &mut E, value: Option<AnyValue>| {
                let value = match value {
                    Some(value) => *value.downcast::<T>()?,
                    None => T::default(),
                };
                set(entity, value);
                Ok(())
            }),
        }
    }

    pub(crate) fn optional<T, G, S>(name: String, get: G, set: S) -> Self
    where
        T: MappedType,
        G: Fn(&E) -> Option<&T> + Send + Sync + 'static,
        S: Fn(&mut E, Option<T>) + Send + Sync + 'static,
    {
        Self {
            name,
            declared: Option::<T>::declared_type(),
            optional: true,
            get: getter(move |entity: &E| get(entity).map(|v| v as &dyn Any)),
            set: setter(move |entity: &mut E, value: Option<AnyValue>| {
                let value = match value {
                    Some(value) => Some(*value.downcast::<T>()?),
                    None => None,
                };
                set(entity, value);
                Ok(())
            }),
        }
    }

    pub(crate) fn resolved(self, spec: TypeSpec) -> Property<E> {
        Property {
            name: self.name,
            declared: self.declared,
            spec,
            optional: self.optional,
            get: self.get,
            set: self.set,
        }
    }
}

/// A named, typed slot on an entity.
///
/// Values cross the accessor type-erased; [`Property::assign`] rejects a
/// value whose runtime type is not the declared one.
pub struct Property<E> {
    name: String,
    declared: DeclaredType,
    spec: TypeSpec,
    optional: bool,
    get: GetFn<E>,
    set: SetFn<E>,
}

impl<E> Property<E> {
    /// Property name, which is also its document key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type.
    pub fn declared_type(&self) -> &DeclaredType {
        &self.declared
    }

    /// The resolved, optional-normalized type spec.
    pub fn spec(&self) -> &TypeSpec {
        &self.spec
    }

    /// Whether the property was declared optional.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Reads the current value. `None` means the optional value is absent.
    pub fn read<'a>(&self, entity: &'a E) -> Option<&'a dyn Any> {
        (self.get)(entity)
    }

    /// Assigns a converted value, or the null value when `value` is `None`.
    ///
    /// A value of the wrong type is handed back unchanged.
    pub fn assign(&self, entity: &mut E, value: Option<AnyValue>) -> Result<(), AnyValue> {
        (self.set)(entity, value)
    }
}

impl<E> fmt::Debug for Property<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("spec", &self.spec)
            .field("optional", &self.optional)
            .finish()
    }
}

/// Accessor pair for an entity's identity attribute.
pub struct Identity<E> {
    get: IdGetFn<E>,
    set: IdSetFn<E>,
}

impl<E> Identity<E> {
    pub(crate) fn new<G, S>(get: G, set: S) -> Self
    where
        G: Fn(&E) -> Option<&str> + Send + Sync + 'static,
        S: Fn(&mut E, String) + Send + Sync + 'static,
    {
        Self {
            get: Box::new(get),
            set: Box::new(set),
        }
    }

    /// Returns the identity, if set.
    pub fn get<'a>(&self, entity: &'a E) -> Option<&'a str> {
        (self.get)(entity)
    }

    /// Sets the identity.
    pub fn set(&self, entity: &mut E, id: String) {
        (self.set)(entity, id);
    }
}

impl<E> fmt::Debug for Identity<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Identity")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeRef;

    #[derive(Default)]
    struct Sample {
        count: i64,
        label: Option<String>,
    }

    fn count() -> Property<Sample> {
        PropertyDecl::required::<i64, _, _>(
            "count".to_string(),
            |s: &Sample| &s.count,
            |s: &mut Sample, v| s.count = v,
        )
        .resolved(TypeSpec::Simple(TypeRef::of::<i64>()))
    }

    fn label() -> Property<Sample> {
        PropertyDecl::optional::<String, _, _>(
            "label".to_string(),
            |s: &Sample| s.label.as_ref(),
            |s: &mut Sample, v| s.label = v,
        )
        .resolved(TypeSpec::Simple(TypeRef::of::<String>()))
    }

    #[test]
    fn required_read_and_assign() {
        let property = count();
        let mut sample = Sample::default();

        property.assign(&mut sample, Some(Box::new(5i64))).unwrap();
        assert_eq!(sample.count, 5);
        let read = property.read(&sample).unwrap();
        assert_eq!(read.downcast_ref::<i64>(), Some(&5));

        property.assign(&mut sample, None).unwrap();
        assert_eq!(sample.count, 0);
        assert!(!property.is_optional());
    }

    #[test]
    fn optional_read_and_assign() {
        let property = label();
        let mut sample = Sample::default();
        assert!(property.read(&sample).is_none());

        property
            .assign(&mut sample, Some(Box::new("x".to_string())))
            .unwrap();
        assert_eq!(sample.label.as_deref(), Some("x"));

        property.assign(&mut sample, None).unwrap();
        assert!(sample.label.is_none());
        assert!(property.is_optional());
        assert_eq!(property.declared_type(), &Option::<String>::declared_type());
    }

    #[test]
    fn wrong_type_is_handed_back() {
        let property = count();
        let mut sample = Sample::default();
        let rejected = property
            .assign(&mut sample, Some(Box::new("seven".to_string())))
            .unwrap_err();
        assert_eq!(rejected.downcast_ref::<String>().unwrap(), "seven");
        assert_eq!(sample.count, 0);
    }

    #[test]
    fn identity_accessors() {
        struct Keyed {
            id: Option<String>,
        }
        let identity = Identity::new(
            |k: &Keyed| k.id.as_deref(),
            |k: &mut Keyed, id| k.id = Some(id),
        );
        let mut keyed = Keyed { id: None };
        assert!(identity.get(&keyed).is_none());
        identity.set(&mut keyed, "507f".to_string());
        assert_eq!(identity.get(&keyed), Some("507f"));
    }
}
