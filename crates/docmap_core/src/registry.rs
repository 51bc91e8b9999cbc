//! Converter registry.
//!
//! The registry is assembled once through [`ConverterRegistryBuilder`] and
//! is immutable afterwards. Lookups are plain hash map reads, so a built
//! registry can be shared across threads freely.

use crate::convert::{
    builtin_readers, builtin_writers, ReadContext, ReadConverter, WriteContext, WriteConverter,
};
use crate::error::{MapperError, MapperResult};
use crate::mapper::ObjectMapper;
use crate::types::{AnyValue, TargetKey};
use docmap_document::{Value, ValueKind};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{trace, warn};

type ReadKey = (ValueKind, TargetKey);

/// Builder for [`ConverterRegistry`].
///
/// A later registration for the same pair replaces the earlier one. Every
/// replacement is logged and counted.
#[derive(Default)]
pub struct ConverterRegistryBuilder {
    readers: HashMap<ReadKey, Arc<dyn ReadConverter>>,
    writers: HashMap<TargetKey, Arc<dyn WriteConverter>>,
    overrides: u64,
}

impl ConverterRegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the built-in scalar and container converters.
    #[must_use]
    pub fn with_builtins(mut self) -> Self {
        for reader in builtin_readers() {
            self.register_reader(reader);
        }
        for writer in builtin_writers() {
            self.register_writer(writer);
        }
        self
    }

    /// Adds a read converter.
    #[must_use]
    pub fn read_converter(mut self, converter: impl ReadConverter + 'static) -> Self {
        self.register_reader(Arc::new(converter));
        self
    }

    /// Adds a write converter.
    #[must_use]
    pub fn write_converter(mut self, converter: impl WriteConverter + 'static) -> Self {
        self.register_writer(Arc::new(converter));
        self
    }

    /// Adds a shared read converter.
    pub fn register_reader(&mut self, converter: Arc<dyn ReadConverter>) {
        let key = (converter.source_kind(), converter.target());
        if self.readers.insert(key, converter).is_some() {
            self.overrides += 1;
            warn!(source = %key.0, target = %key.1, "read converter replaced");
        }
    }

    /// Adds a shared write converter.
    pub fn register_writer(&mut self, converter: Arc<dyn WriteConverter>) {
        let key = converter.source();
        if self.writers.insert(key, converter).is_some() {
            self.overrides += 1;
            warn!(source = %key, "write converter replaced");
        }
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> ConverterRegistry {
        ConverterRegistry {
            readers: self.readers,
            writers: self.writers,
            overrides: self.overrides,
        }
    }
}

/// Immutable converter lookup tables.
pub struct ConverterRegistry {
    readers: HashMap<ReadKey, Arc<dyn ReadConverter>>,
    writers: HashMap<TargetKey, Arc<dyn WriteConverter>>,
    overrides: u64,
}

impl ConverterRegistry {
    /// Starts a registry with no converters.
    #[must_use]
    pub fn builder() -> ConverterRegistryBuilder {
        ConverterRegistryBuilder::new()
    }

    /// A registry holding only the built-in converters.
    #[must_use]
    pub fn with_builtins() -> Self {
        ConverterRegistryBuilder::new().with_builtins().build()
    }

    /// Looks up the read converter for a pair.
    pub fn reader(&self, source: ValueKind, target: TargetKey) -> Option<&Arc<dyn ReadConverter>> {
        self.readers.get(&(source, target))
    }

    /// Looks up the write converter for an application type.
    pub fn writer(&self, source: TargetKey) -> Option<&Arc<dyn WriteConverter>> {
        self.writers.get(&source)
    }

    /// Number of read converters.
    pub fn reader_count(&self) -> usize {
        self.readers.len()
    }

    /// Number of write converters.
    pub fn writer_count(&self) -> usize {
        self.writers.len()
    }

    /// Registrations that replaced an earlier converter.
    pub fn override_count(&self) -> u64 {
        self.overrides
    }

    /// Converts a document value with the converter registered for its pair.
    pub fn read(&self, ctx: &ReadContext<'_>, mapper: &ObjectMapper) -> MapperResult<AnyValue> {
        let source = ctx.source_kind();
        let target = ctx.target().target_key();
        let converter = self.reader(source, target).ok_or_else(|| {
            MapperError::no_converter(ctx.path(), source.name(), ctx.target().type_ref().name())
        })?;

        trace!(path = ctx.path(), %source, %target, "read");
        converter.read(ctx, mapper)
    }

    /// Converts an application value with the converter registered for its
    /// type.
    ///
    /// The produced value must be of the converter's declared kind or null.
    pub fn write(&self, ctx: &WriteContext<'_>, mapper: &ObjectMapper) -> MapperResult<Value> {
        let source = ctx.target().target_key();
        let converter = self.writer(source).ok_or_else(|| {
            MapperError::no_converter(ctx.path(), ctx.target().type_ref().name(), "document value")
        })?;

        trace!(path = ctx.path(), %source, "write");
        let value = converter.write(ctx, mapper)?;
        let expected = converter.target_kind();
        if !value.is_null() && value.kind() != expected {
            return Err(MapperError::type_mismatch(
                ctx.path(),
                expected.name(),
                format!("converter produced {}", value.kind()),
            ));
        }
        Ok(value)
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("readers", &self.readers.len())
            .field("writers", &self.writers.len())
            .field("overrides", &self.overrides)
            .finish()
    }
}
