// Copyright (C) 2020-2024 Andy Kurnia.

use super::{config, error};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type Key = (TypeId, String);
type Object = Arc<dyn Any + Send + Sync>;

/// Immutable objects that can be loaded by name from the data path.
pub trait Loadable: Any + Send + Sync + Sized {
    fn load(cfg: &config::Config, name: &str) -> error::Returns<Self>;
}

/// Grow-only memo of dictionaries and distributions, shared between games.
///
/// Loaders are plain function pointers, so they cannot hold a handle back
/// into the cache while its lock is held.
#[derive(Default)]
pub struct ObjectCache {
    objects: Mutex<HashMap<Key, Object>>,
}

impl ObjectCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memoized object, loading it under the lock on a miss.
    /// A failed load leaves no entry, so the next call retries.
    pub fn get<T: Any + Send + Sync>(
        &self,
        cfg: &config::Config,
        name: &str,
        loader: fn(&config::Config, &str) -> error::Returns<T>,
    ) -> error::Returns<Arc<T>> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| error::GameError::CachePoisoned)?;
        let key = (TypeId::of::<T>(), name.to_string());
        if let Some(obj) = objects.get(&key) {
            return Arc::clone(obj)
                .downcast::<T>()
                .map_err(|_| error::GameError::CachePoisoned);
        }
        log::debug!("cache miss: {} {}", std::any::type_name::<T>(), name);
        let obj = Arc::new(loader(cfg, name)?);
        objects.insert(key, Arc::clone(&obj) as Object);
        Ok(obj)
    }

    pub fn load<T: Loadable>(&self, cfg: &config::Config, name: &str) -> error::Returns<Arc<T>> {
        self.get(cfg, name, T::load)
    }

    /// Populates or replaces an entry, e.g. with an in-memory fixture.
    pub fn put<T: Any + Send + Sync>(&self, name: &str, obj: T) -> error::Returns<Arc<T>> {
        let obj = Arc::new(obj);
        self.objects
            .lock()
            .map_err(|_| error::GameError::CachePoisoned)?
            .insert((TypeId::of::<T>(), name.to_string()), Arc::clone(&obj) as Object);
        Ok(obj)
    }

    pub fn contains<T: Any + Send + Sync>(&self, name: &str) -> bool {
        self.objects
            .lock()
            .map(|objects| objects.contains_key(&(TypeId::of::<T>(), name.to_string())))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.objects.lock().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
