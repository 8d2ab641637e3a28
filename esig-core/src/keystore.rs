//! In-memory key store with single-winner lazy generation.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use esig_primitives::AlgorithmKeyPair;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, instrument};

use crate::error::{CoreError, Result};
use crate::traits::KeyStore;
use crate::types::AlgorithmProfile;

type Slot = Arc<Mutex<Option<Arc<AlgorithmKeyPair>>>>;

/// Process-local [`KeyStore`].
///
/// Each algorithm gets its own slot; generation holds only that slot's lock,
/// so a slow key generation (SLH-DSA) never blocks other algorithms.
#[derive(Debug, Default)]
pub struct InMemoryKeyStore {
    slots: RwLock<HashMap<String, Slot>>,
    generated: AtomicUsize,
}

impl InMemoryKeyStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs an externally supplied key, replacing any existing one.
    pub fn insert(&self, algorithm: impl Into<String>, key: AlgorithmKeyPair) {
        let slot = self.slot(&algorithm.into());
        *slot.lock() = Some(Arc::new(key));
    }

    /// Public half of the key for `algorithm`, if present.
    #[must_use]
    pub fn public_key(&self, algorithm: &str) -> Option<Vec<u8>> {
        self.get_key(algorithm).map(|key| key.public_key().to_vec())
    }

    /// Number of keys generated by this store.
    #[must_use]
    pub fn generated_count(&self) -> usize {
        self.generated.load(Ordering::Relaxed)
    }

    /// Number of algorithms holding a key.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.read().values().filter(|slot| slot.lock().is_some()).count()
    }

    /// Returns `true` if no key is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, algorithm: &str) -> Slot {
        if let Some(slot) = self.slots.read().get(algorithm) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write();
        Arc::clone(slots.entry(algorithm.to_string()).or_default())
    }
}

impl KeyStore for InMemoryKeyStore {
    #[instrument(level = "debug", skip(self, profile), fields(algorithm = %profile.name))]
    fn get_or_create_key(&self, profile: &AlgorithmProfile) -> Result<Arc<AlgorithmKeyPair>> {
        let slot = self.slot(&profile.name);
        let mut guard = slot.lock();
        if let Some(key) = guard.as_ref() {
            return Ok(Arc::clone(key));
        }

        let key = profile.capability.generate_keypair().map_err(|e| CoreError::KeyUnavailable {
            algorithm: profile.name.clone(),
            reason: e.to_string(),
        })?;
        let key = Arc::new(key);
        *guard = Some(Arc::clone(&key));
        self.generated.fetch_add(1, Ordering::Relaxed);
        debug!(public_key_len = key.public_key().len(), "generated key");
        Ok(key)
    }

    fn get_key(&self, algorithm: &str) -> Option<Arc<AlgorithmKeyPair>> {
        let slot = self.slots.read().get(algorithm).map(Arc::clone)?;
        let guard = slot.lock();
        guard.as_ref().map(Arc::clone)
    }
}
