//! Per-type descriptor cache.

use super::{Entity, EntityDescriptor};
use crate::error::{MapperError, MapperResult};
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Thread-safe, fill-once cache of entity descriptors.
///
/// Descriptors are built outside the lock. If two threads race on the same
/// type, the first insert wins and both get the same descriptor.
#[derive(Default)]
pub struct DescriptorCache {
    entries: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl DescriptorCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached descriptor for `E`, if any.
    pub fn get<E: Entity>(&self) -> Option<Arc<EntityDescriptor<E>>> {
        let entry = self.entries.read().get(&TypeId::of::<E>()).cloned()?;
        entry.downcast::<EntityDescriptor<E>>().ok()
    }

    /// Returns the descriptor for `E`, building it with `build` on a miss.
    ///
    /// The flag is true when this call inserted the descriptor.
    pub fn get_or_build<E, F>(&self, build: F) -> MapperResult<(Arc<EntityDescriptor<E>>, bool)>
    where
        E: Entity,
        F: FnOnce() -> MapperResult<EntityDescriptor<E>>,
    {
        if let Some(descriptor) = self.get::<E>() {
            return Ok((descriptor, false));
        }

        let built: Arc<dyn Any + Send + Sync> = Arc::new(build()?);
        let (entry, inserted) = {
            let mut entries = self.entries.write();
            match entries.get(&TypeId::of::<E>()) {
                Some(existing) => (Arc::clone(existing), false),
                None => {
                    entries.insert(TypeId::of::<E>(), Arc::clone(&built));
                    (built, true)
                }
            }
        };

        if inserted {
            debug!(entity = std::any::type_name::<E>(), "cached entity descriptor");
        }

        entry
            .downcast::<EntityDescriptor<E>>()
            .map(|descriptor| (descriptor, inserted))
            .map_err(|_| MapperError::unsupported_type(std::any::type_name::<E>()))
    }

    /// Number of cached descriptors.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl std::fmt::Debug for DescriptorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorCache")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorBuilder;
    use crate::resolver::TypeResolver;
    use crate::types::MappedType;
    use std::thread;

    #[derive(Default)]
    struct Note {
        text: String,
    }

    impl MappedType for Note {}

    impl Entity for Note {
        fn describe(builder: DescriptorBuilder<Self>) -> DescriptorBuilder<Self> {
            builder
                .factory(Note::default)
                .field("text", |n| &n.text, |n, v| n.text = v)
        }
    }

    #[test]
    fn fills_once() {
        let cache = DescriptorCache::new();
        let resolver = TypeResolver::new();
        assert!(cache.is_empty());

        let (first, inserted) = cache
            .get_or_build(|| EntityDescriptor::<Note>::of(&resolver, "_id"))
            .unwrap();
        assert!(inserted);

        let (second, inserted) = cache
            .get_or_build::<Note, _>(|| panic!("descriptor rebuilt"))
            .unwrap();
        assert!(!inserted);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn build_errors_are_not_cached() {
        let cache = DescriptorCache::new();
        let result = cache.get_or_build::<Note, _>(|| {
            Err(MapperError::unsupported_type("Note"))
        });
        assert!(result.is_err());
        assert!(cache.get::<Note>().is_none());
    }

    #[test]
    fn concurrent_fills_share_one_descriptor() {
        let cache = Arc::new(DescriptorCache::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    let resolver = TypeResolver::new();
                    cache
                        .get_or_build(|| EntityDescriptor::<Note>::of(&resolver, "_id"))
                        .unwrap()
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|(_, inserted)| *inserted).count(), 1);
        let cached = cache.get::<Note>().unwrap();
        for (descriptor, _) in &results {
            assert!(Arc::ptr_eq(descriptor, &cached));
        }
    }
}
