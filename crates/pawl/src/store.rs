//! Session persistence and skipped-message-key storage.

use std::collections::HashMap;

use crate::{Error, MessageKey, PublicKey, State};

/// Default cap on cached skipped-message keys.
pub const DEFAULT_MAX_SKIP: usize = 1000;

/// Backing storage for session state snapshots and skipped message keys.
///
/// Skipped keys are indexed globally by `(n, public_key)`; the sender's
/// ratchet public key identifies the chain a message belongs to, so indices
/// from different chains cannot collide.
///
/// A store shared between sessions must synchronise internally.
pub trait Store {
    /// Persists a snapshot of the session state.
    ///
    /// Sessions call this before committing any state transition; failing
    /// here aborts the transition.
    ///
    /// # Errors
    ///
    /// Implementation-defined; surfaced to the caller unchanged.
    fn save_state(&mut self, state: &State) -> Result<(), Error>;

    /// Caches a skipped message key under `(n, public)`, overwriting any
    /// existing entry.
    ///
    /// # Errors
    ///
    /// Must return [`Error::TooManySkipped`] when the store is at capacity
    /// and the insert would grow it. The cap bounds the chain-derivation
    /// work a forged far-future message index can force.
    fn store_key(&mut self, n: u64, public: &PublicKey, key: MessageKey) -> Result<(), Error>;

    /// Looks up a cached key; a miss is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Implementation-defined; surfaced to the caller unchanged.
    fn load_key(&mut self, n: u64, public: &PublicKey) -> Result<Option<MessageKey>, Error>;

    /// Removes a cached key. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Implementation-defined; surfaced to the caller unchanged.
    fn delete_key(&mut self, n: u64, public: &PublicKey) -> Result<(), Error>;
}

impl<S: Store + ?Sized> Store for &mut S {
    fn save_state(&mut self, state: &State) -> Result<(), Error> {
        (**self).save_state(state)
    }

    fn store_key(&mut self, n: u64, public: &PublicKey, key: MessageKey) -> Result<(), Error> {
        (**self).store_key(n, public, key)
    }

    fn load_key(&mut self, n: u64, public: &PublicKey) -> Result<Option<MessageKey>, Error> {
        (**self).load_key(n, public)
    }

    fn delete_key(&mut self, n: u64, public: &PublicKey) -> Result<(), Error> {
        (**self).delete_key(n, public)
    }
}

/// In-memory [`Store`]: snapshots are discarded, skipped keys live in a
/// bounded map. Sessions using it are ephemeral.
pub struct MemoryStore {
    max_skip: usize,
    keys: HashMap<(u64, PublicKey), MessageKey>,
}

impl MemoryStore {
    /// Creates a store capped at [`DEFAULT_MAX_SKIP`] skipped keys.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_skip(DEFAULT_MAX_SKIP)
    }

    /// Creates a store capped at `max_skip` skipped keys.
    #[must_use]
    pub fn with_max_skip(max_skip: usize) -> Self {
        Self {
            max_skip,
            keys: HashMap::new(),
        }
    }

    /// Number of cached skipped keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the store holds no skipped keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn save_state(&mut self, _state: &State) -> Result<(), Error> {
        Ok(())
    }

    fn store_key(&mut self, n: u64, public: &PublicKey, key: MessageKey) -> Result<(), Error> {
        let slot = (n, public.clone());
        if !self.keys.contains_key(&slot) && self.keys.len() >= self.max_skip {
            return Err(Error::TooManySkipped);
        }
        self.keys.insert(slot, key);
        Ok(())
    }

    fn load_key(&mut self, n: u64, public: &PublicKey) -> Result<Option<MessageKey>, Error> {
        Ok(self.keys.get(&(n, public.clone())).cloned())
    }

    fn delete_key(&mut self, n: u64, public: &PublicKey) -> Result<(), Error> {
        self.keys.remove(&(n, public.clone()));
        Ok(())
    }
}
