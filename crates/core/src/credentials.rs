//! Credential Store: durable client-side storage of the credential pair
//!
//! The store is pure data access. Only the login, refresh and logout paths
//! write to it; everything else reads through [`CredentialStore::get`].

use crate::types::CredentialPair;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Storage for the current access/refresh credential pair.
///
/// Every login and every clear starts a new generation; a refresh keeps it.
/// A pair read under one generation must not be used once it has moved on.
pub trait CredentialStore {
    /// Current pair, or `None` when either token is missing
    fn get(&self) -> Option<CredentialPair>;

    /// Store the pair of a new session and advance the generation
    fn set(&self, pair: &CredentialPair);

    /// Replace the pair after a refresh, keeping the generation
    fn renew(&self, pair: &CredentialPair);

    /// Remove both tokens and advance the generation. Idempotent on the
    /// stored pair.
    fn clear(&self);

    /// Identifies the session the stored pair belongs to
    fn generation(&self) -> u64;

    /// Whether an access credential is present
    fn has_access_credential(&self) -> bool {
        self.get().is_some()
    }
}

impl<S: CredentialStore + ?Sized> CredentialStore for Rc<S> {
    fn get(&self) -> Option<CredentialPair> {
        (**self).get()
    }

    fn set(&self, pair: &CredentialPair) {
        (**self).set(pair)
    }

    fn renew(&self, pair: &CredentialPair) {
        (**self).renew(pair)
    }

    fn clear(&self) {
        (**self).clear()
    }

    fn generation(&self) -> u64 {
        (**self).generation()
    }

    fn has_access_credential(&self) -> bool {
        (**self).has_access_credential()
    }
}

/// In-process store, used natively and in tests
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    pair: RefCell<Option<CredentialPair>>,
    generation: Cell<u64>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pair(pair: CredentialPair) -> Self {
        Self {
            pair: RefCell::new(Some(pair)),
            generation: Cell::new(0),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<CredentialPair> {
        self.pair.borrow().clone()
    }

    fn set(&self, pair: &CredentialPair) {
        *self.pair.borrow_mut() = Some(pair.clone());
        self.generation.set(self.generation.get() + 1);
    }

    fn renew(&self, pair: &CredentialPair) {
        *self.pair.borrow_mut() = Some(pair.clone());
    }

    fn clear(&self) {
        self.pair.borrow_mut().take();
        self.generation.set(self.generation.get() + 1);
    }

    fn generation(&self) -> u64 {
        self.generation.get()
    }
}
