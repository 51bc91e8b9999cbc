//! Mapper statistics.
//!
//! Counters are atomic and can be read while conversions are in progress.

use std::sync::atomic::{AtomicU64, Ordering};

/// Conversion counters for one mapper.
#[derive(Debug, Default)]
pub struct MapperStats {
    /// Entities populated from documents (nested entities included).
    entities_read: AtomicU64,
    /// Documents produced from entities (nested entities included).
    entities_written: AtomicU64,
    /// Fields converted through the registry, in either direction.
    fields_converted: AtomicU64,
    /// Document fields skipped because no property matched.
    unknown_fields: AtomicU64,
    /// Entity descriptors built and cached.
    descriptor_fills: AtomicU64,
    /// Converter registrations that replaced an earlier one.
    converter_overrides: AtomicU64,
}

impl MapperStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_entity_read(&self) {
        self.entities_read.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_entity_written(&self) {
        self.entities_written.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_field(&self) {
        self.fields_converted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unknown_field(&self) {
        self.unknown_fields.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_descriptor_fill(&self) {
        self.descriptor_fills.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_converter_overrides(&self, count: u64) {
        self.converter_overrides.fetch_add(count, Ordering::Relaxed);
    }

    /// Returns the number of entities read.
    pub fn entities_read(&self) -> u64 {
        self.entities_read.load(Ordering::Relaxed)
    }

    /// Returns the number of entities written.
    pub fn entities_written(&self) -> u64 {
        self.entities_written.load(Ordering::Relaxed)
    }

    /// Returns the number of converted fields.
    pub fn fields_converted(&self) -> u64 {
        self.fields_converted.load(Ordering::Relaxed)
    }

    /// Returns the number of skipped unknown fields.
    pub fn unknown_fields(&self) -> u64 {
        self.unknown_fields.load(Ordering::Relaxed)
    }

    /// Returns the number of descriptor cache fills.
    pub fn descriptor_fills(&self) -> u64 {
        self.descriptor_fills.load(Ordering::Relaxed)
    }

    /// Returns the number of converter overrides at build time.
    pub fn converter_overrides(&self) -> u64 {
        self.converter_overrides.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all stats.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            entities_read: self.entities_read(),
            entities_written: self.entities_written(),
            fields_converted: self.fields_converted(),
            unknown_fields: self.unknown_fields(),
            descriptor_fills: self.descriptor_fills(),
            converter_overrides: self.converter_overrides(),
        }
    }
}

/// A point-in-time snapshot of mapper statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Entities populated from documents.
    pub entities_read: u64,
    /// Documents produced from entities.
    pub entities_written: u64,
    /// Fields converted through the registry.
    pub fields_converted: u64,
    /// Unknown fields skipped.
    pub unknown_fields: u64,
    /// Entity descriptors built and cached.
    pub descriptor_fills: u64,
    /// Converter overrides at build time.
    pub converter_overrides: u64,
}
