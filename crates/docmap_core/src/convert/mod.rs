//! Converters between document values and application types.
//!
//! A [`ReadConverter`] turns one [`ValueKind`] into one [`TargetKey`]; a
//! [`WriteConverter`] goes the other way. Both receive the mapper so that
//! container and entity converters can recurse.

mod container;
mod entity;
mod simple;
mod text_enum;

pub use container::{ListReader, ListWriter, MapReader, MapWriter};
pub use entity::{EntityReader, EntityWriter};
pub use simple::{builtin_readers, builtin_writers, SimpleReader, SimpleWriter};
pub use text_enum::TextEnumConverter;

use crate::error::MapperResult;
use crate::mapper::ObjectMapper;
use crate::types::{AnyValue, TargetKey, TypeSpec};
use docmap_document::{Value, ValueKind};
use std::any::Any;

/// Converts a document value into an application value.
pub trait ReadConverter: Send + Sync {
    /// The document value kind this converter accepts.
    fn source_kind(&self) -> ValueKind;

    /// The application type this converter produces.
    fn target(&self) -> TargetKey;

    /// Converts `ctx.value()`. The result must be of `ctx.target()`'s type.
    fn read(&self, ctx: &ReadContext<'_>, mapper: &ObjectMapper) -> MapperResult<AnyValue>;
}

/// Converts an application value into a document value.
pub trait WriteConverter: Send + Sync {
    /// The application type this converter accepts.
    fn source(&self) -> TargetKey;

    /// The document value kind this converter produces.
    fn target_kind(&self) -> ValueKind;

    /// Converts `ctx.value()`.
    fn write(&self, ctx: &WriteContext<'_>, mapper: &ObjectMapper) -> MapperResult<Value>;
}

/// Joins a field path and a field name.
pub(crate) fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

/// One document value on its way to an application type.
#[derive(Debug)]
pub struct ReadContext<'a> {
    value: &'a Value,
    target: &'a TypeSpec,
    path: String,
    depth: usize,
}

impl<'a> ReadContext<'a> {
    /// Creates a top-level context.
    pub fn new(value: &'a Value, target: &'a TypeSpec, path: impl Into<String>) -> Self {
        Self::at_depth(value, target, path, 0)
    }

    /// Creates a context at a given nesting depth.
    pub fn at_depth(
        value: &'a Value,
        target: &'a TypeSpec,
        path: impl Into<String>,
        depth: usize,
    ) -> Self {
        Self {
            value,
            target,
            path: path.into(),
            depth,
        }
    }

    /// Context for the `index`th element of a list.
    pub fn element(&self, index: usize, value: &'a Value, target: &'a TypeSpec) -> Self {
        Self::at_depth(value, target, format!("{}[{index}]", self.path), self.depth + 1)
    }

    /// Context for the entry `key` of a map or document.
    pub fn entry(&self, key: &str, value: &'a Value, target: &'a TypeSpec) -> Self {
        Self::at_depth(value, target, join_path(&self.path, key), self.depth + 1)
    }

    /// The value being converted.
    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// Its kind, the source half of the dispatch key.
    pub fn source_kind(&self) -> ValueKind {
        self.value.kind()
    }

    /// The expected target type.
    pub fn target(&self) -> &'a TypeSpec {
        self.target
    }

    /// Type arguments of a parameterized target.
    pub fn type_args(&self) -> &'a [TypeSpec] {
        self.target.type_args()
    }

    /// Field path for diagnostics.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// One application value on its way to a document value.
pub struct WriteContext<'a> {
    value: &'a dyn Any,
    target: &'a TypeSpec,
    path: String,
    depth: usize,
}

impl<'a> WriteContext<'a> {
    /// Creates a top-level context.
    pub fn new(value: &'a dyn Any, target: &'a TypeSpec, path: impl Into<String>) -> Self {
        Self::at_depth(value, target, path, 0)
    }

    /// Creates a context at a given nesting depth.
    pub fn at_depth(
        value: &'a dyn Any,
        target: &'a TypeSpec,
        path: impl Into<String>,
        depth: usize,
    ) -> Self {
        Self {
            value,
            target,
            path: path.into(),
            depth,
        }
    }

    /// Context for the `index`th element of a list.
    pub fn element(&self, index: usize, value: &'a dyn Any, target: &'a TypeSpec) -> Self {
        Self::at_depth(value, target, format!("{}[{index}]", self.path), self.depth + 1)
    }

    /// Context for the entry `key` of a map.
    pub fn entry(&self, key: &str, value: &'a dyn Any, target: &'a TypeSpec) -> Self {
        Self::at_depth(value, target, join_path(&self.path, key), self.depth + 1)
    }

    /// The value being converted.
    pub fn value(&self) -> &'a dyn Any {
        self.value
    }

    /// Downcasts the value to `T`.
    pub fn value_as<T: Any>(&self) -> Option<&'a T> {
        self.value.downcast_ref::<T>()
    }

    /// The declared type of the value.
    pub fn target(&self) -> &'a TypeSpec {
        self.target
    }

    /// Type arguments of a parameterized source.
    pub fn type_args(&self) -> &'a [TypeSpec] {
        self.target.type_args()
    }

    /// Field path for diagnostics.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl std::fmt::Debug for WriteContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteContext")
            .field("target", &self.target)
            .field("path", &self.path)
            .field("depth", &self.depth)
            .finish()
    }
}
