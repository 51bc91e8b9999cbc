//! Text form converters for enum-like types.

use super::{ReadContext, ReadConverter, WriteContext, WriteConverter};
use crate::error::{MapperError, MapperResult};
use crate::mapper::ObjectMapper;
use crate::types::{AnyValue, TargetKey};
use docmap_document::{Value, ValueKind};
use std::any::{type_name, Any};
use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

/// Maps `T` to and from its `Display` / `FromStr` text form.
///
/// ```
/// use docmap_core::{MappedType, ObjectMapper, TargetKey};
/// use docmap_document::ValueKind;
/// use std::fmt;
/// use std::str::FromStr;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum Color {
///     Red,
///     Blue,
/// }
///
/// impl fmt::Display for Color {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         f.write_str(match self {
///             Color::Red => "red",
///             Color::Blue => "blue",
///         })
///     }
/// }
///
/// impl FromStr for Color {
///     type Err = String;
///
///     fn from_str(s: &str) -> Result<Self, String> {
///         match s {
///             "red" => Ok(Color::Red),
///             "blue" => Ok(Color::Blue),
///             other => Err(format!("unknown color {other}")),
///         }
///     }
/// }
///
/// impl MappedType for Color {}
///
/// let mapper = ObjectMapper::builder().text_enum::<Color>().build();
/// let registry = mapper.registry();
/// assert!(registry.reader(ValueKind::Text, TargetKey::of::<Color>()).is_some());
/// assert!(registry.writer(TargetKey::of::<Color>()).is_some());
/// ```
pub struct TextEnumConverter<T> {
    _target: PhantomData<fn() -> T>,
}

impl<T> TextEnumConverter<T>
where
    T: FromStr + Display + Any + Send,
{
    /// Creates the converter.
    pub const fn new() -> Self {
        Self {
            _target: PhantomData,
        }
    }
}

impl<T> Default for TextEnumConverter<T>
where
    T: FromStr + Display + Any + Send,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ReadConverter for TextEnumConverter<T>
where
    T: FromStr + Display + Any + Send,
{
    fn source_kind(&self) -> ValueKind {
        ValueKind::Text
    }

    fn target(&self) -> TargetKey {
        TargetKey::of::<T>()
    }

    fn read(&self, ctx: &ReadContext<'_>, _mapper: &ObjectMapper) -> MapperResult<AnyValue> {
        let text = ctx.value().as_text().ok_or_else(|| {
            MapperError::no_converter(ctx.path(), ctx.source_kind().name(), type_name::<T>())
        })?;
        let value = text.parse::<T>().map_err(|_| {
            MapperError::invalid_value(
                ctx.path(),
                type_name::<T>(),
                format!("unrecognized value {text:?}"),
            )
        })?;
        Ok(Box::new(value))
    }
}

impl<T> WriteConverter for TextEnumConverter<T>
where
    T: FromStr + Display + Any + Send,
{
    fn source(&self) -> TargetKey {
        TargetKey::of::<T>()
    }

    fn target_kind(&self) -> ValueKind {
        ValueKind::Text
    }

    fn write(&self, ctx: &WriteContext<'_>, _mapper: &ObjectMapper) -> MapperResult<Value> {
        let value = ctx.value_as::<T>().ok_or_else(|| {
            MapperError::type_mismatch(ctx.path(), type_name::<T>(), "value has a different type")
        })?;
        Ok(Value::Text(value.to_string()))
    }
}
