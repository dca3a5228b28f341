//! Refresh Coordinator: single-flight exchange of the refresh credential
//!
//! Concurrent callers share one pending refresh. The shared handle lives in
//! `in_flight` from the moment the exchange starts until the first waiter
//! observes its outcome.

use super::error::RefreshDenied;
use crate::types::{RefreshRequest, RefreshResponse};
use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};
use portal_core::{CredentialPair, CredentialStore};
use reqwest::Client;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info, warn};

pub const REFRESH_PATH: &str = "/auth/refresh/";

type RefreshOutcome = Result<CredentialPair, RefreshDenied>;
type PendingRefresh = Shared<LocalBoxFuture<'static, RefreshOutcome>>;

struct InFlight {
    generation: u64,
    pending: PendingRefresh,
}

pub struct RefreshCoordinator {
    http: Client,
    refresh_url: String,
    store: Rc<dyn CredentialStore>,
    in_flight: RefCell<Option<InFlight>>,
}

impl RefreshCoordinator {
    pub fn new(http: Client, base_url: &str, store: Rc<dyn CredentialStore>) -> Self {
        Self {
            http,
            refresh_url: format!("{base_url}{REFRESH_PATH}"),
            store,
            in_flight: RefCell::new(None),
        }
    }

    /// Whether a refresh is currently pending
    pub fn is_refreshing(&self) -> bool {
        self.in_flight.borrow().is_some()
    }

    fn is_refreshing_generation(&self, generation: u64) -> bool {
        self.in_flight
            .borrow()
            .as_ref()
            .is_some_and(|flight| flight.generation == generation)
    }

    /// Exchange the stored refresh credential for a new pair, joining any
    /// refresh already in flight for the current session.
    pub async fn refresh(&self) -> RefreshOutcome {
        self.refresh_generation(self.store.generation()).await
    }

    async fn refresh_generation(&self, generation: u64) -> RefreshOutcome {
        let pending = {
            let mut slot = self.in_flight.borrow_mut();
            match slot.as_ref() {
                Some(flight) if flight.generation == generation => {
                    debug!("Joining in-flight credential refresh");
                    flight.pending.clone()
                }
                _ => {
                    let Some(current) = self.store.get() else {
                        debug!("No refresh credential stored");
                        return Err(RefreshDenied::MissingCredential);
                    };
                    let pending = exchange(
                        self.http.clone(),
                        self.refresh_url.clone(),
                        Rc::clone(&self.store),
                        current.refresh_token,
                        generation,
                    )
                    .boxed_local()
                    .shared();
                    *slot = Some(InFlight {
                        generation,
                        pending: pending.clone(),
                    });
                    pending
                }
            }
        };

        let outcome = pending.clone().await;

        let mut slot = self.in_flight.borrow_mut();
        if slot
            .as_ref()
            .is_some_and(|flight| flight.pending.ptr_eq(&pending))
        {
            *slot = None;
        }
        outcome
    }

    /// Refresh on behalf of a request whose `rejected_access` credential got a
    /// 401 while the store was at `generation`.
    ///
    /// Fails with [`RefreshDenied::Superseded`] if the session changed since.
    /// If the store already holds a different access credential of the same
    /// session, another caller renewed it and no exchange is needed.
    pub async fn refresh_rejected(&self, rejected_access: &str, generation: u64) -> RefreshOutcome {
        if self.store.generation() != generation {
            debug!("Session changed since the rejected request was sent");
            return Err(RefreshDenied::Superseded);
        }
        if !self.is_refreshing_generation(generation) {
            if let Some(current) = self.store.get() {
                if current.access_token != rejected_access {
                    debug!("Access credential already renewed");
                    return Ok(current);
                }
            }
        }
        self.refresh_generation(generation).await
    }
}

async fn exchange(
    http: Client,
    url: String,
    store: Rc<dyn CredentialStore>,
    refresh_token: String,
    generation: u64,
) -> RefreshOutcome {
    let still_ours = |store: &Rc<dyn CredentialStore>| store.generation() == generation;

    match request_pair(&http, &url, &refresh_token).await {
        Ok(pair) if still_ours(&store) => {
            store.renew(&pair);
            info!("Credentials refreshed");
            Ok(pair)
        }
        Ok(_) => {
            warn!("Session changed during refresh, discarding renewed credentials");
            Err(RefreshDenied::Superseded)
        }
        Err(denied) => {
            if still_ours(&store) {
                store.clear();
            }
            warn!(%denied, "Credential refresh denied");
            Err(denied)
        }
    }
}

async fn request_pair(http: &Client, url: &str, refresh_token: &str) -> RefreshOutcome {
    let response = http
        .post(url)
        .json(&RefreshRequest {
            refresh: refresh_token.to_string(),
        })
        .send()
        .await
        .map_err(|e| RefreshDenied::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(RefreshDenied::Rejected {
            status: status.as_u16(),
        });
    }

    let body: RefreshResponse = response
        .json()
        .await
        .map_err(|e| RefreshDenied::InvalidResponse(e.to_string()))?;

    Ok(CredentialPair::new(
        body.access,
        body.refresh.unwrap_or_else(|| refresh_token.to_string()),
    ))
}
