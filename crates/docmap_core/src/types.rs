//! Runtime type metadata.
//!
//! Properties declare their type as a [`DeclaredType`]; the
//! [`TypeResolver`](crate::TypeResolver) turns that into a [`TypeSpec`],
//! which keys converter dispatch.

use docmap_document::ObjectId;
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A type-erased application value produced by a read converter.
pub type AnyValue = Box<dyn Any + Send>;

/// Identity of a concrete Rust type, with its name for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
}

impl TypeRef {
    /// Returns the reference for `T`.
    #[must_use]
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Returns the type id.
    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the full type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self.name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The raw (unparameterized) form of a container type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// A sequence of one element type.
    List,
    /// A string-keyed map of one value type.
    Map,
}

impl ContainerKind {
    /// Number of type arguments the container takes.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            ContainerKind::List => 1,
            ContainerKind::Map => 2,
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerKind::List => f.write_str("list"),
            ContainerKind::Map => f.write_str("map"),
        }
    }
}

/// Converted elements handed to a container for assembly.
pub enum ContainerParts {
    /// List elements in order.
    List(Vec<AnyValue>),
    /// Map entries.
    Map(Vec<(String, AnyValue)>),
}

/// Borrowed view of a container's elements.
pub enum ContainerView<'a> {
    /// List elements in order.
    List(Vec<&'a dyn Any>),
    /// Map entries.
    Map(Vec<(&'a str, &'a dyn Any)>),
}

/// Type-erased construction and inspection of one concrete container type,
/// such as `Vec<String>`.
#[derive(Clone, Copy)]
pub struct ContainerShape {
    kind: ContainerKind,
    ty: TypeRef,
    assemble: fn(ContainerParts) -> Result<AnyValue, String>,
    inspect: fn(&dyn Any) -> Option<ContainerView<'_>>,
}

impl ContainerShape {
    /// Shape of `Vec<T>`.
    #[must_use]
    pub fn list<T: Any + Send>() -> Self {
        Self {
            kind: ContainerKind::List,
            ty: TypeRef::of::<Vec<T>>(),
            assemble: assemble_vec::<T>,
            inspect: inspect_vec::<T>,
        }
    }

    /// Shape of `BTreeMap<String, V>`.
    #[must_use]
    pub fn btree_map<V: Any + Send>() -> Self {
        Self {
            kind: ContainerKind::Map,
            ty: TypeRef::of::<BTreeMap<String, V>>(),
            assemble: assemble_btree_map::<V>,
            inspect: inspect_btree_map::<V>,
        }
    }

    /// Shape of `HashMap<String, V>`.
    #[must_use]
    pub fn hash_map<V: Any + Send>() -> Self {
        Self {
            kind: ContainerKind::Map,
            ty: TypeRef::of::<HashMap<String, V>>(),
            assemble: assemble_hash_map::<V>,
            inspect: inspect_hash_map::<V>,
        }
    }

    /// Returns the raw container kind.
    #[must_use]
    pub const fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Returns the concrete container type.
    #[must_use]
    pub const fn type_ref(&self) -> TypeRef {
        self.ty
    }

    /// Builds the concrete container from converted elements.
    ///
    /// On failure returns the position (`[i]` or `.key`) of the first element
    /// that is not of the element type.
    pub fn assemble(&self, parts: ContainerParts) -> Result<AnyValue, String> {
        (self.assemble)(parts)
    }

    /// Views the elements of a concrete container value.
    ///
    /// Returns `None` if `value` is not of this shape's type.
    pub fn inspect<'a>(&self, value: &'a dyn Any) -> Option<ContainerView<'a>> {
        (self.inspect)(value)
    }
}

impl PartialEq for ContainerShape {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.ty == other.ty
    }
}

impl Eq for ContainerShape {}

impl fmt::Debug for ContainerShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerShape")
            .field("kind", &self.kind)
            .field("ty", &self.ty)
            .finish()
    }
}

fn assemble_vec<T: Any + Send>(parts: ContainerParts) -> Result<AnyValue, String> {
    let ContainerParts::List(items) = parts else {
        return Err("map entries given to a list".to_string());
    };
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        out.push(*item.downcast::<T>().map_err(|_| format!("[{i}]"))?);
    }
    Ok(Box::new(out))
}

fn inspect_vec<T: Any>(value: &dyn Any) -> Option<ContainerView<'_>> {
    value
        .downcast_ref::<Vec<T>>()
        .map(|v| ContainerView::List(v.iter().map(|x| x as &dyn Any).collect()))
}

fn downcast_entries<V: Any>(parts: ContainerParts) -> Result<Vec<(String, V)>, String> {
    let ContainerParts::Map(entries) = parts else {
        return Err("list elements given to a map".to_string());
    };
    entries
        .into_iter()
        .map(|(k, v)| match v.downcast::<V>() {
            Ok(v) => Ok((k, *v)),
            Err(_) => Err(format!(".{k}")),
        })
        .collect()
}

fn assemble_btree_map<V: Any + Send>(parts: ContainerParts) -> Result<AnyValue, String> {
    let map: BTreeMap<String, V> = downcast_entries(parts)?.into_iter().collect();
    Ok(Box::new(map))
}

fn assemble_hash_map<V: Any + Send>(parts: ContainerParts) -> Result<AnyValue, String> {
    let map: HashMap<String, V> = downcast_entries(parts)?.into_iter().collect();
    Ok(Box::new(map))
}

fn inspect_btree_map<V: Any>(value: &dyn Any) -> Option<ContainerView<'_>> {
    value.downcast_ref::<BTreeMap<String, V>>().map(|m| {
        ContainerView::Map(m.iter().map(|(k, v)| (k.as_str(), v as &dyn Any)).collect())
    })
}

fn inspect_hash_map<V: Any>(value: &dyn Any) -> Option<ContainerView<'_>> {
    value.downcast_ref::<HashMap<String, V>>().map(|m| {
        let mut entries: Vec<_> = m.iter().map(|(k, v)| (k.as_str(), v as &dyn Any)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        ContainerView::Map(entries)
    })
}

/// The type a property declares, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
    /// A concrete, non-generic type.
    Class(TypeRef),
    /// A nullable wrapper around another declared type.
    Optional(Box<DeclaredType>),
    /// A container with its type arguments.
    Generic {
        /// The concrete container.
        shape: ContainerShape,
        /// Declared element types.
        args: Vec<DeclaredType>,
    },
    /// A container whose type arguments are not known.
    Raw {
        /// Container kind.
        kind: ContainerKind,
        /// The container type.
        ty: TypeRef,
    },
}

impl DeclaredType {
    /// Declares a concrete type.
    #[must_use]
    pub fn class<T: Any>() -> Self {
        DeclaredType::Class(TypeRef::of::<T>())
    }

    /// Returns the name of the outermost declared type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DeclaredType::Class(ty) | DeclaredType::Raw { ty, .. } => ty.name(),
            DeclaredType::Optional(inner) => inner.name(),
            DeclaredType::Generic { shape, .. } => shape.type_ref().name(),
        }
    }
}

/// A resolved property type: how its values are converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSpec {
    /// A directly convertible type.
    Simple(TypeRef),
    /// A container with resolved type arguments.
    Parameterized {
        /// The concrete container.
        shape: ContainerShape,
        /// Resolved argument specs.
        args: Vec<TypeSpec>,
    },
    /// Another mappable entity.
    Nested(TypeRef),
}

impl TypeSpec {
    /// The concrete type values of this spec must have.
    #[must_use]
    pub const fn type_ref(&self) -> TypeRef {
        match self {
            TypeSpec::Simple(ty) | TypeSpec::Nested(ty) => *ty,
            TypeSpec::Parameterized { shape, .. } => shape.type_ref(),
        }
    }

    /// The converter dispatch key.
    #[must_use]
    pub const fn target_key(&self) -> TargetKey {
        match self {
            TypeSpec::Simple(ty) | TypeSpec::Nested(ty) => TargetKey::Type(*ty),
            TypeSpec::Parameterized { shape, .. } => TargetKey::Container(shape.kind()),
        }
    }

    /// Resolved type arguments; empty unless parameterized.
    #[must_use]
    pub fn type_args(&self) -> &[TypeSpec] {
        match self {
            TypeSpec::Parameterized { args, .. } => args,
            _ => &[],
        }
    }

    /// The container shape, if parameterized.
    #[must_use]
    pub const fn shape(&self) -> Option<&ContainerShape> {
        match self {
            TypeSpec::Parameterized { shape, .. } => Some(shape),
            _ => None,
        }
    }
}

/// The application-side half of a converter key.
///
/// Parameterized types key on their raw container kind, so one list
/// converter serves every element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKey {
    /// A concrete simple or entity type.
    Type(TypeRef),
    /// Any container of this kind.
    Container(ContainerKind),
}

impl TargetKey {
    /// Key for the concrete type `T`.
    #[must_use]
    pub fn of<T: Any>() -> Self {
        TargetKey::Type(TypeRef::of::<T>())
    }
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKey::Type(ty) => write!(f, "{ty}"),
            TargetKey::Container(kind) => write!(f, "{kind}<..>"),
        }
    }
}

/// A type that can appear as a mapped property.
///
/// The default declaration is a plain class; containers and optionals
/// override it. Entities implement this with an empty body.
pub trait MappedType: Any + Send + Sync + Sized {
    /// Describes the declared type.
    fn declared_type() -> DeclaredType {
        DeclaredType::class::<Self>()
    }
}

/// An opaque byte string property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Binary(pub Vec<u8>);

impl From<Vec<u8>> for Binary {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Binary {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl MappedType for String {}
impl MappedType for bool {}
impl MappedType for i32 {}
impl MappedType for i64 {}
impl MappedType for f64 {}
impl MappedType for Binary {}
impl MappedType for ObjectId {}

impl<T: MappedType> MappedType for Option<T> {
    fn declared_type() -> DeclaredType {
        DeclaredType::Optional(Box::new(T::declared_type()))
    }
}

impl<T: MappedType> MappedType for Vec<T> {
    fn declared_type() -> DeclaredType {
        DeclaredType::Generic {
            shape: ContainerShape::list::<T>(),
            args: vec![T::declared_type()],
        }
    }
}

impl<V: MappedType> MappedType for BTreeMap<String, V> {
    fn declared_type() -> DeclaredType {
        DeclaredType::Generic {
            shape: ContainerShape::btree_map::<V>(),
            args: vec![String::declared_type(), V::declared_type()],
        }
    }
}

impl<V: MappedType> MappedType for HashMap<String, V> {
    fn declared_type() -> DeclaredType {
        DeclaredType::Generic {
            shape: ContainerShape::hash_map::<V>(),
            args: vec![String::declared_type(), V::declared_type()],
        }
    }
}
