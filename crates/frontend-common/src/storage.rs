//! Cookie-backed credential store

use portal_core::CredentialPair;
use portal_core::CredentialStore;
use portal_core::cookies::{CookieSettings, pair_from_cookie_string};
use std::cell::Cell;
use tracing::warn;
use wasm_bindgen::JsCast;
use web_sys::HtmlDocument;

/// Persists the credential pair in `document.cookie`.
///
/// The generation lives in memory and only tracks sessions of this page.
#[derive(Debug, Default)]
pub struct CookieCredentialStore {
    settings: CookieSettings,
    generation: Cell<u64>,
}

impl CookieCredentialStore {
    pub fn new(settings: CookieSettings) -> Self {
        Self {
            settings,
            generation: Cell::new(0),
        }
    }

    pub fn settings(&self) -> &CookieSettings {
        &self.settings
    }

    fn document() -> Option<HtmlDocument> {
        web_sys::window()?
            .document()?
            .dyn_into::<HtmlDocument>()
            .ok()
    }

    fn write(&self, assignment: &str) {
        let Some(document) = Self::document() else {
            warn!("No document available, credential cookie not written");
            return;
        };
        if let Err(err) = document.set_cookie(assignment) {
            warn!(?err, "Failed to write credential cookie");
        }
    }
}

impl CredentialStore for CookieCredentialStore {
    fn get(&self) -> Option<CredentialPair> {
        let cookies = Self::document()?.cookie().ok()?;
        pair_from_cookie_string(&cookies)
    }

    fn set(&self, pair: &CredentialPair) {
        self.renew(pair);
        self.generation.set(self.generation.get() + 1);
    }

    fn renew(&self, pair: &CredentialPair) {
        for assignment in self.settings.pair_assignments(pair) {
            self.write(&assignment);
        }
    }

    fn clear(&self) {
        for removal in self.settings.pair_removals() {
            self.write(&removal);
        }
        self.generation.set(self.generation.get() + 1);
    }

    fn generation(&self) -> u64 {
        self.generation.get()
    }
}
