//! List and map converters.
//!
//! These are keyed on the raw container kind and recurse into the element
//! type spec carried by the context, so a single pair serves `Vec<String>`,
//! `Vec<Child>`, `BTreeMap<String, Vec<i64>>` and so on.

use super::{ReadContext, ReadConverter, WriteContext, WriteConverter};
use crate::error::{MapperError, MapperResult};
use crate::mapper::ObjectMapper;
use crate::types::{
    AnyValue, ContainerKind, ContainerParts, ContainerShape, ContainerView, TargetKey, TypeSpec,
};
use docmap_document::{Document, Value, ValueKind};

fn container_parts<'a>(
    path: &str,
    target: &'a TypeSpec,
    kind: ContainerKind,
) -> MapperResult<(&'a ContainerShape, &'a TypeSpec)> {
    let shape = target
        .shape()
        .filter(|shape| shape.kind() == kind)
        .ok_or_else(|| {
            MapperError::type_mismatch(
                path,
                target.type_ref().name(),
                format!("target is not a {kind}"),
            )
        })?;
    let element = target.type_args().last().ok_or_else(|| {
        MapperError::unresolvable_type(shape.type_ref().name(), "missing type arguments")
    })?;
    Ok((shape, element))
}

fn assemble(
    ctx_path: &str,
    shape: &ContainerShape,
    element: &TypeSpec,
    parts: ContainerParts,
) -> MapperResult<AnyValue> {
    shape.assemble(parts).map_err(|position| {
        MapperError::type_mismatch(
            format!("{ctx_path}{position}"),
            element.type_ref().name(),
            "element has a different type",
        )
    })
}

fn unexpected_source(ctx: &ReadContext<'_>, expected: ValueKind) -> MapperError {
    MapperError::no_converter(ctx.path(), ctx.source_kind().name(), expected.name())
}

/// Reads an `Array` into any list type.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListReader;

impl ReadConverter for ListReader {
    fn source_kind(&self) -> ValueKind {
        ValueKind::Array
    }

    fn target(&self) -> TargetKey {
        TargetKey::Container(ContainerKind::List)
    }

    fn read(&self, ctx: &ReadContext<'_>, mapper: &ObjectMapper) -> MapperResult<AnyValue> {
        let (shape, element) = container_parts(ctx.path(), ctx.target(), ContainerKind::List)?;
        let items = ctx
            .value()
            .as_array()
            .ok_or_else(|| unexpected_source(ctx, ValueKind::Array))?;

        let mut converted = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            converted.push(mapper.read_value(&ctx.element(i, item, element))?);
        }
        assemble(ctx.path(), shape, element, ContainerParts::List(converted))
    }
}

/// Reads a `Document` into any string-keyed map type.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapReader;

impl ReadConverter for MapReader {
    fn source_kind(&self) -> ValueKind {
        ValueKind::Document
    }

    fn target(&self) -> TargetKey {
        TargetKey::Container(ContainerKind::Map)
    }

    fn read(&self, ctx: &ReadContext<'_>, mapper: &ObjectMapper) -> MapperResult<AnyValue> {
        let (shape, element) = container_parts(ctx.path(), ctx.target(), ContainerKind::Map)?;
        let document = ctx
            .value()
            .as_document()
            .ok_or_else(|| unexpected_source(ctx, ValueKind::Document))?;

        let mut converted = Vec::with_capacity(document.len());
        for (key, value) in document.iter() {
            let entry = mapper.read_value(&ctx.entry(key, value, element))?;
            converted.push((key.to_string(), entry));
        }
        assemble(ctx.path(), shape, element, ContainerParts::Map(converted))
    }
}

/// Writes any list type as an `Array`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListWriter;

impl WriteConverter for ListWriter {
    fn source(&self) -> TargetKey {
        TargetKey::Container(ContainerKind::List)
    }

    fn target_kind(&self) -> ValueKind {
        ValueKind::Array
    }

    fn write(&self, ctx: &WriteContext<'_>, mapper: &ObjectMapper) -> MapperResult<Value> {
        let (shape, element) = container_parts(ctx.path(), ctx.target(), ContainerKind::List)?;
        let Some(ContainerView::List(items)) = shape.inspect(ctx.value()) else {
            return Err(MapperError::type_mismatch(
                ctx.path(),
                shape.type_ref().name(),
                "value has a different type",
            ));
        };

        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            out.push(mapper.write_value(&ctx.element(i, item, element))?);
        }
        Ok(Value::Array(out))
    }
}

/// Writes any string-keyed map type as a `Document`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapWriter;

impl WriteConverter for MapWriter {
    fn source(&self) -> TargetKey {
        TargetKey::Container(ContainerKind::Map)
    }

    fn target_kind(&self) -> ValueKind {
        ValueKind::Document
    }

    fn write(&self, ctx: &WriteContext<'_>, mapper: &ObjectMapper) -> MapperResult<Value> {
        let (shape, element) = container_parts(ctx.path(), ctx.target(), ContainerKind::Map)?;
        let Some(ContainerView::Map(entries)) = shape.inspect(ctx.value()) else {
            return Err(MapperError::type_mismatch(
                ctx.path(),
                shape.type_ref().name(),
                "value has a different type",
            ));
        };

        let mut document = Document::with_capacity(entries.len());
        for (key, value) in entries {
            document.insert(key, mapper.write_value(&ctx.entry(key, value, element))?);
        }
        Ok(Value::Document(document))
    }
}
