//! Session State: the single observable truth about the current principal
//!
//! All mutation goes through four transitions:
//!
//! - [`Session::resolve_startup`] leaves `Initializing` once per application start
//! - [`Session::authenticate`] after login, registration or an OAuth callback
//! - [`Session::logout`] on explicit logout
//! - [`Session::expire`] when a request ends with `AuthenticationExpired`
//!
//! Every effective transition is delivered synchronously to each subscriber
//! in subscription order.

use crate::types::{Role, UserSummary};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Initializing,
    Authenticated(UserSummary),
    Unauthenticated,
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Initializing)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn user(&self) -> Option<&UserSummary> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|user| user.role)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            loading: self.is_loading(),
            is_authenticated: self.is_authenticated(),
            user: self.user().cloned(),
            role: self.role(),
        }
    }
}

/// Flat view of the session as consumed by views
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SessionSnapshot {
    pub loading: bool,
    pub is_authenticated: bool,
    pub user: Option<UserSummary>,
    pub role: Option<Role>,
}

/// Why the session left `Authenticated`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    StartupCheckFailed,
    Logout,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(&SessionState)>;

/// Owned, observable session state machine
#[derive(Default)]
pub struct Session {
    state: RefCell<SessionState>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_id: Cell<u64>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &*self.state.borrow())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().snapshot()
    }

    pub fn subscribe(&self, listener: impl Fn(&SessionState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.borrow_mut().retain(|(other, _)| *other != id);
    }

    /// Settle the startup session check. Ignored once the session has left
    /// `Initializing`, e.g. because a login completed first.
    pub fn resolve_startup(&self, user: Option<UserSummary>) -> bool {
        if !self.state.borrow().is_loading() {
            debug!("Startup check settled after session was already resolved");
            return false;
        }
        match user {
            Some(user) => self.authenticate(user),
            None => self.end(EndReason::StartupCheckFailed),
        }
    }

    /// Enter `Authenticated`, replacing any previous principal wholesale
    pub fn authenticate(&self, user: UserSummary) -> bool {
        info!(role = %user.role, "Session authenticated");
        self.transition(SessionState::Authenticated(user))
    }

    pub fn logout(&self) -> bool {
        self.end(EndReason::Logout)
    }

    pub fn expire(&self) -> bool {
        self.end(EndReason::Expired)
    }

    fn end(&self, reason: EndReason) -> bool {
        if *self.state.borrow() == SessionState::Unauthenticated {
            return false;
        }
        info!(?reason, "Session unauthenticated");
        self.transition(SessionState::Unauthenticated)
    }

    fn transition(&self, next: SessionState) -> bool {
        {
            let mut state = self.state.borrow_mut();
            if *state == next {
                return false;
            }
            *state = next.clone();
        }
        // Snapshot the listener list so callbacks may (un)subscribe.
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&next);
        }
        true
    }
}
