//! Converters for scalar types.

use super::{ReadContext, ReadConverter, WriteContext, WriteConverter};
use crate::error::{MapperError, MapperResult};
use crate::mapper::ObjectMapper;
use crate::types::{AnyValue, Binary, TargetKey};
use docmap_document::{ObjectId, Value, ValueKind};
use std::any::{type_name, Any};
use std::marker::PhantomData;
use std::sync::Arc;

/// Reads one value kind into `T` through a plain function.
pub struct SimpleReader<T> {
    source: ValueKind,
    convert: fn(&Value) -> Result<T, String>,
    _target: PhantomData<fn() -> T>,
}

impl<T: Any + Send> SimpleReader<T> {
    /// Creates a reader from `source` values.
    pub const fn new(source: ValueKind, convert: fn(&Value) -> Result<T, String>) -> Self {
        Self {
            source,
            convert,
            _target: PhantomData,
        }
    }
}

impl<T: Any + Send> ReadConverter for SimpleReader<T> {
    fn source_kind(&self) -> ValueKind {
        self.source
    }

    fn target(&self) -> TargetKey {
        TargetKey::of::<T>()
    }

    fn read(&self, ctx: &ReadContext<'_>, _mapper: &ObjectMapper) -> MapperResult<AnyValue> {
        (self.convert)(ctx.value())
            .map(|value| Box::new(value) as AnyValue)
            .map_err(|reason| MapperError::invalid_value(ctx.path(), type_name::<T>(), reason))
    }
}

/// Writes `T` as one value kind through a plain function.
pub struct SimpleWriter<T> {
    target: ValueKind,
    convert: fn(&T) -> Value,
}

impl<T: Any> SimpleWriter<T> {
    /// Creates a writer producing `target` values.
    pub const fn new(target: ValueKind, convert: fn(&T) -> Value) -> Self {
        Self { target, convert }
    }
}

impl<T: Any> WriteConverter for SimpleWriter<T> {
    fn source(&self) -> TargetKey {
        TargetKey::of::<T>()
    }

    fn target_kind(&self) -> ValueKind {
        self.target
    }

    fn write(&self, ctx: &WriteContext<'_>, _mapper: &ObjectMapper) -> MapperResult<Value> {
        let value = ctx.value_as::<T>().ok_or_else(|| {
            MapperError::type_mismatch(ctx.path(), type_name::<T>(), "value has a different type")
        })?;
        Ok((self.convert)(value))
    }
}

fn unexpected(value: &Value) -> String {
    format!("unexpected {} value", value.kind())
}

fn text_to_string(value: &Value) -> Result<String, String> {
    value
        .as_text()
        .map(str::to_string)
        .ok_or_else(|| unexpected(value))
}

fn object_id_to_string(value: &Value) -> Result<String, String> {
    value
        .as_object_id()
        .map(|id| id.to_hex())
        .ok_or_else(|| unexpected(value))
}

fn bool_value(value: &Value) -> Result<bool, String> {
    value.as_bool().ok_or_else(|| unexpected(value))
}

fn integer_to_i64(value: &Value) -> Result<i64, String> {
    value.as_integer().ok_or_else(|| unexpected(value))
}

fn integer_to_i32(value: &Value) -> Result<i32, String> {
    let n = integer_to_i64(value)?;
    i32::try_from(n).map_err(|_| format!("{n} is out of range"))
}

fn double_to_f64(value: &Value) -> Result<f64, String> {
    value.as_double().ok_or_else(|| unexpected(value))
}

#[allow(clippy::cast_precision_loss)]
fn integer_to_f64(value: &Value) -> Result<f64, String> {
    integer_to_i64(value).map(|n| n as f64)
}

fn bytes_to_binary(value: &Value) -> Result<Binary, String> {
    value
        .as_bytes()
        .map(|b| Binary(b.to_vec()))
        .ok_or_else(|| unexpected(value))
}

fn object_id_value(value: &Value) -> Result<ObjectId, String> {
    value.as_object_id().ok_or_else(|| unexpected(value))
}

fn text_to_object_id(value: &Value) -> Result<ObjectId, String> {
    let text = value.as_text().ok_or_else(|| unexpected(value))?;
    ObjectId::parse_str(text).map_err(|e| e.to_string())
}

/// The read converters every registry starts with.
pub fn builtin_readers() -> Vec<Arc<dyn ReadConverter>> {
    vec![
        Arc::new(SimpleReader::<String>::new(ValueKind::Text, text_to_string)),
        Arc::new(SimpleReader::<String>::new(ValueKind::ObjectId, object_id_to_string)),
        Arc::new(SimpleReader::<bool>::new(ValueKind::Bool, bool_value)),
        Arc::new(SimpleReader::<i64>::new(ValueKind::Integer, integer_to_i64)),
        Arc::new(SimpleReader::<i32>::new(ValueKind::Integer, integer_to_i32)),
        Arc::new(SimpleReader::<f64>::new(ValueKind::Double, double_to_f64)),
        Arc::new(SimpleReader::<f64>::new(ValueKind::Integer, integer_to_f64)),
        Arc::new(SimpleReader::<Binary>::new(ValueKind::Bytes, bytes_to_binary)),
        Arc::new(SimpleReader::<ObjectId>::new(ValueKind::ObjectId, object_id_value)),
        Arc::new(SimpleReader::<ObjectId>::new(ValueKind::Text, text_to_object_id)),
        Arc::new(super::ListReader),
        Arc::new(super::MapReader),
    ]
}

/// The write converters every registry starts with.
pub fn builtin_writers() -> Vec<Arc<dyn WriteConverter>> {
    vec![
        Arc::new(SimpleWriter::<String>::new(ValueKind::Text, |s: &String| {
            Value::Text(s.clone())
        })),
        Arc::new(SimpleWriter::<bool>::new(ValueKind::Bool, |b: &bool| Value::Bool(*b))),
        Arc::new(SimpleWriter::<i64>::new(ValueKind::Integer, |n: &i64| {
            Value::Integer(*n)
        })),
        Arc::new(SimpleWriter::<i32>::new(ValueKind::Integer, |n: &i32| {
            Value::Integer(i64::from(*n))
        })),
        Arc::new(SimpleWriter::<f64>::new(ValueKind::Double, |n: &f64| Value::Double(*n))),
        Arc::new(SimpleWriter::<Binary>::new(ValueKind::Bytes, |b: &Binary| {
            Value::Bytes(b.0.clone())
        })),
        Arc::new(SimpleWriter::<ObjectId>::new(ValueKind::ObjectId, |id: &ObjectId| {
            Value::ObjectId(*id)
        })),
        Arc::new(super::ListWriter),
        Arc::new(super::MapWriter),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    proptest! {
        #[test]
        fn i32_range_is_exact(n in any::<i64>()) {
            let fits = i32::try_from(n).is_ok();
            prop_assert_eq!(integer_to_i32(&Value::Integer(n)).is_ok(), fits);
        }
    }

    #[test]
    fn scalar_functions() {
        assert_eq!(text_to_string(&Value::from("a")).unwrap(), "a");
        assert_eq!(integer_to_i32(&Value::Integer(-4)).unwrap(), -4);
        assert!(integer_to_i32(&Value::Integer(i64::from(i32::MAX) + 1)).is_err());
        assert_eq!(integer_to_f64(&Value::Integer(3)).unwrap(), 3.0);
        assert!(bool_value(&Value::Integer(1)).is_err());

        let id = ObjectId::from_bytes([0xab; 12]);
        assert_eq!(
            object_id_to_string(&Value::ObjectId(id)).unwrap(),
            "abababababababababababab"
        );
        assert_eq!(
            text_to_object_id(&Value::from("abababababababababababab")).unwrap(),
            id
        );
        assert!(text_to_object_id(&Value::from("zz")).is_err());
    }

    #[test]
    fn builtin_keys_are_distinct() {
        let readers = builtin_readers();
        let read_keys: HashSet<_> = readers
            .iter()
            .map(|c| (c.source_kind(), c.target()))
            .collect();
        assert_eq!(read_keys.len(), readers.len());

        let writers = builtin_writers();
        let write_keys: HashSet<_> = writers.iter().map(|c| c.source()).collect();
        assert_eq!(write_keys.len(), writers.len());
    }
}
