//! Portal API client
//!
//! [`ApiClient`] is the only place requests to the remote API are made. It
//! attaches the access credential to protected calls, renews it once through
//! the [`RefreshCoordinator`] when the server answers 401, and classifies the
//! terminal outcome.
//!
//! The client is single-threaded (`Rc`, `!Send` futures), matching the
//! browser event loop it runs on.

pub mod auth;
pub mod error;
pub mod refresh;

use error::{ClientError, RefreshDenied};
use portal_core::settings::ApiSettings;
use portal_core::{CredentialStore, MemoryCredentialStore};
use refresh::RefreshCoordinator;
use reqwest::{Client, ClientBuilder, Method, Response, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, warn};

pub use auth::AuthService;
pub use refresh::REFRESH_PATH;

const DEFAULT_USER_AGENT: &str = concat!("portal-client/", env!("CARGO_PKG_VERSION"));

type AuthExpiredHook = Rc<dyn Fn()>;

/// Portal API client
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Rc<str>,
    store: Rc<dyn CredentialStore>,
    refresher: Rc<RefreshCoordinator>,
    on_auth_expired: Rc<RefCell<Option<AuthExpiredHook>>>,
}

impl ApiClient {
    /// Create a new client with an in-memory credential store
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn from_settings(
        settings: &ApiSettings,
        store: Rc<dyn CredentialStore>,
    ) -> Result<Self, ClientError> {
        let mut builder = Self::builder()
            .base_url(settings.base_url.clone())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .credential_store(store);
        if let Some(agent) = &settings.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        builder.build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The credential store this client reads from
    pub fn credentials(&self) -> &Rc<dyn CredentialStore> {
        &self.store
    }

    pub fn refresher(&self) -> &RefreshCoordinator {
        &self.refresher
    }

    /// Register the callback fired whenever a call ends with
    /// [`ClientError::AuthenticationExpired`] and no credential remains.
    pub fn set_auth_expired_hook(&self, hook: impl Fn() + 'static) {
        *self.on_auth_expired.borrow_mut() = Some(Rc::new(hook));
    }

    /// Resolve `path` against the base URL; absolute URLs pass through
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Issue a call to the API.
    ///
    /// With `requires_auth` the stored access credential is attached, a 401
    /// triggers one refresh and one retry, and an empty store fails with
    /// [`ClientError::Unauthenticated`] before any network traffic. Without
    /// it the store is never consulted.
    pub async fn dispatch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        requires_auth: bool,
    ) -> Result<T, ClientError> {
        let url = self.url(path);

        if !requires_auth {
            let response = self.send(method, &url, body, None).await?;
            return decode(response).await;
        }

        let generation = self.store.generation();
        let Some(credentials) = self.store.get() else {
            debug!(%method, path, "No access credential for protected call");
            return Err(ClientError::Unauthenticated);
        };

        let response = self
            .send(method.clone(), &url, body, Some(&credentials.access_token))
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return decode(response).await;
        }

        debug!(%method, path, "Access credential rejected, refreshing");
        let renewed = match self
            .refresher
            .refresh_rejected(&credentials.access_token, generation)
            .await
        {
            Ok(pair) => pair,
            Err(RefreshDenied::Superseded) => {
                // The store now belongs to a newer session; never retry with it.
                warn!(%method, path, "Session changed while request was in flight");
                return Err(ClientError::AuthenticationExpired);
            }
            Err(denied) => {
                warn!(%method, path, %denied, "Session could not be renewed");
                return Err(self.authentication_expired());
            }
        };

        let retry = self
            .send(method.clone(), &url, body, Some(&renewed.access_token))
            .await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            warn!(%method, path, "Renewed access credential rejected");
            if self.store.generation() != generation {
                return Err(ClientError::AuthenticationExpired);
            }
            if self
                .store
                .get()
                .is_some_and(|current| current.access_token == renewed.access_token)
            {
                self.store.clear();
            }
            return Err(self.authentication_expired());
        }
        decode(retry).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.dispatch(Method::GET, path, None, true).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ClientError> {
        let body = to_body(body)?;
        self.dispatch(Method::POST, path, Some(&body), true).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ClientError> {
        let body = to_body(body)?;
        self.dispatch(Method::PUT, path, Some(&body), true).await
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ClientError> {
        let body = to_body(body)?;
        self.dispatch(Method::PATCH, path, Some(&body), true).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.dispatch(Method::DELETE, path, None, true).await
    }

    /// GET a public endpoint; never carries a credential
    pub async fn public_get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.dispatch(Method::GET, path, None, false).await
    }

    /// POST to a public endpoint; never carries a credential
    pub async fn public_post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ClientError> {
        let body = to_body(body)?;
        self.dispatch(Method::POST, path, Some(&body), false).await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        access_token: Option<&str>,
    ) -> Result<Response, ClientError> {
        let mut request = self.http.request(method, url);
        if let Some(token) = access_token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    fn authentication_expired(&self) -> ClientError {
        // A credential still present belongs to a session that replaced ours.
        if !self.store.has_access_credential() {
            let hook = self.on_auth_expired.borrow().clone();
            if let Some(hook) = hook {
                hook();
            }
        }
        ClientError::AuthenticationExpired
    }
}

fn to_body(body: &impl Serialize) -> Result<Value, ClientError> {
    serde_json::to_value(body).map_err(ClientError::Serialization)
}

/// Decode a response against the endpoint contract. Empty 2xx bodies decode
/// as JSON `null`.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        return Err(ClientError::from_response(status, &bytes));
    }

    let payload: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        &bytes
    };
    serde_json::from_slice(payload).map_err(ClientError::InvalidResponse)
}

/// Builder for [`ApiClient`]
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    store: Option<Rc<dyn CredentialStore>>,
}

impl ApiClientBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout (ignored on wasm)
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn credential_store(mut self, store: Rc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut client_builder = ClientBuilder::new();

        #[cfg(not(target_arch = "wasm32"))]
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        client_builder = client_builder.user_agent(
            self.user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        );

        let http = client_builder.build()?;
        let store = self
            .store
            .unwrap_or_else(|| Rc::new(MemoryCredentialStore::new()));
        let refresher = RefreshCoordinator::new(http.clone(), &base_url, Rc::clone(&store));

        Ok(ApiClient {
            http,
            base_url: base_url.into(),
            store,
            refresher: Rc::new(refresher),
            on_auth_expired: Rc::new(RefCell::new(None)),
        })
    }
}
