//! Nested entity converters, registered for every mapped entity type.

use super::{ReadContext, ReadConverter, WriteContext, WriteConverter};
use crate::descriptor::Entity;
use crate::error::{MapperError, MapperResult};
use crate::mapper::ObjectMapper;
use crate::types::{AnyValue, TargetKey};
use docmap_document::{Value, ValueKind};
use std::any::type_name;
use std::marker::PhantomData;

/// Reads a `Document` into the entity `E`.
pub struct EntityReader<E> {
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> EntityReader<E> {
    /// Creates the reader.
    pub const fn new() -> Self {
        Self {
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> Default for EntityReader<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> ReadConverter for EntityReader<E> {
    fn source_kind(&self) -> ValueKind {
        ValueKind::Document
    }

    fn target(&self) -> TargetKey {
        TargetKey::of::<E>()
    }

    fn read(&self, ctx: &ReadContext<'_>, mapper: &ObjectMapper) -> MapperResult<AnyValue> {
        let document = ctx.value().as_document().ok_or_else(|| {
            MapperError::no_converter(ctx.path(), ctx.source_kind().name(), type_name::<E>())
        })?;
        let entity = mapper.read_entity::<E>(document, ctx.path(), ctx.depth())?;
        Ok(Box::new(entity))
    }
}

/// Writes the entity `E` as a `Document`.
pub struct EntityWriter<E> {
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> EntityWriter<E> {
    /// Creates the writer.
    pub const fn new() -> Self {
        Self {
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> Default for EntityWriter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> WriteConverter for EntityWriter<E> {
    fn source(&self) -> TargetKey {
        TargetKey::of::<E>()
    }

    fn target_kind(&self) -> ValueKind {
        ValueKind::Document
    }

    fn write(&self, ctx: &WriteContext<'_>, mapper: &ObjectMapper) -> MapperResult<Value> {
        let entity = ctx.value_as::<E>().ok_or_else(|| {
            MapperError::type_mismatch(ctx.path(), type_name::<E>(), "value has a different type")
        })?;
        mapper
            .write_entity(entity, ctx.path(), ctx.depth())
            .map(Value::Document)
    }
}
