//! A registry of built GPU textures, keyed by [`TextureId`].
//!
//! The [`TextureCache`] owns the factory textures are created with, so its lifetime is the
//! lifetime of the device. Entries are only ever added; dropping the cache releases every
//! texture it holds.

use crate::factory::TextureFactory;
use crate::handle::TextureHandle;
use crate::identity::TextureId;
use crate::staging::StagingPool;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

pub type SharedTexture<F> = Arc<TextureHandle<F>>;

pub struct TextureCache<F: TextureFactory> {
    factory: F,
    entries: Mutex<HashMap<TextureId, SharedTexture<F>>>,
    staging: StagingPool,
}

impl<F: TextureFactory> TextureCache<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            entries: Mutex::new(HashMap::new()),
            staging: StagingPool::new(),
        }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn staging(&self) -> &StagingPool {
        &self.staging
    }

    pub fn lookup(&self, identity: &str) -> Option<SharedTexture<F>> {
        let hit = self.entries.lock().get(identity).cloned();
        if hit.is_some() {
            trace!("Texture cache hit for {identity:?}");
        }
        hit
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.entries.lock().contains_key(identity)
    }

    /// Registers `handle` under `identity`, replacing and returning any previous entry.
    pub fn register(
        &self,
        identity: TextureId,
        handle: SharedTexture<F>,
    ) -> Option<SharedTexture<F>> {
        trace!("Registering texture {identity:?}");
        self.entries.lock().insert(identity, handle)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn identities(&self) -> Vec<TextureId> {
        let mut ids: Vec<TextureId> = self.entries.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Returns the entry for `identity`, or builds and registers one while holding the
    /// registry lock. Nothing is registered if `build` fails.
    pub(crate) fn get_or_try_insert_with<E>(
        &self,
        identity: &TextureId,
        build: impl FnOnce(&F, &StagingPool) -> Result<TextureHandle<F>, E>,
    ) -> Result<SharedTexture<F>, E> {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(identity) {
            trace!("Texture cache hit for {identity:?}");
            return Ok(existing.clone());
        }

        let handle = Arc::new(build(&self.factory, &self.staging)?);
        entries.insert(identity.clone(), handle.clone());
        trace!("Registered texture {identity:?}");

        Ok(handle)
    }
}
