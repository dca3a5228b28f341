//! Client configuration and initialization

use crate::config;
use crate::storage::CookieCredentialStore;
use portal_core::{CredentialStore, Session};
use portal_http::{ApiClient, AuthService, ClientError};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::info;

thread_local! {
    /// The page's single auth service, created on first use
    static AUTH_SERVICE: RefCell<Option<AuthService>> = const { RefCell::new(None) };
}

/// Get the auth service for this page, building it on first use.
///
/// All views share one session, one cookie store and therefore one refresh
/// coordinator.
pub fn auth_service() -> Result<AuthService, ClientError> {
    AUTH_SERVICE.with(|slot| {
        if let Some(service) = slot.borrow().as_ref() {
            return Ok(service.clone());
        }

        let service = create_auth_service()?;
        *slot.borrow_mut() = Some(service.clone());
        Ok(service)
    })
}

fn create_auth_service() -> Result<AuthService, ClientError> {
    let settings = config::settings();
    let store: Rc<dyn CredentialStore> =
        Rc::new(CookieCredentialStore::new(settings.cookies.clone()));
    let client = ApiClient::from_settings(&settings.api, store)?;
    info!(base_url = %client.base_url(), "API client initialized");
    Ok(AuthService::new(client, Rc::new(Session::new())))
}
