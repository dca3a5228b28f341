//! Route Guard: per-navigation access decision for protected views

use crate::credentials::CredentialStore;
use crate::routes::{Access, HOME_PATH, LOGIN_PATH, required_access};
use crate::session::{Session, SessionState};
use crate::types::Role;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Startup check still running: show a neutral indicator, do not redirect
    Pending,
    Allow,
    DenyRedirect(&'static str),
}

/// Decide whether a view requiring `required_role` may render.
///
/// A missing access credential denies even an authenticated session.
pub fn authorize(
    state: &SessionState,
    has_access_credential: bool,
    required_role: Option<Role>,
) -> GuardDecision {
    match state {
        SessionState::Initializing => GuardDecision::Pending,
        SessionState::Unauthenticated => GuardDecision::DenyRedirect(LOGIN_PATH),
        SessionState::Authenticated(_) if !has_access_credential => {
            GuardDecision::DenyRedirect(LOGIN_PATH)
        }
        SessionState::Authenticated(user) => match required_role {
            Some(role) if role != user.role => GuardDecision::DenyRedirect(HOME_PATH),
            _ => GuardDecision::Allow,
        },
    }
}

/// Guard bound to the live session and credential store
pub struct RouteGuard<S> {
    session: std::rc::Rc<Session>,
    store: S,
}

impl<S: CredentialStore> RouteGuard<S> {
    pub fn new(session: std::rc::Rc<Session>, store: S) -> Self {
        Self { session, store }
    }

    pub fn authorize(&self, required_role: Option<Role>) -> GuardDecision {
        let decision = authorize(
            &self.session.state(),
            self.store.has_access_credential(),
            required_role,
        );
        debug!(?required_role, ?decision, "Route guard decision");
        decision
    }

    /// Decision for a concrete view path; public paths always render
    pub fn authorize_path(&self, path: &str) -> GuardDecision {
        match required_access(path) {
            Access::Public => GuardDecision::Allow,
            Access::Protected(role) => self.authorize(role),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::MemoryCredentialStore;
    use crate::types::{CredentialPair, UserId, UserSummary};
    use std::rc::Rc;

    fn authenticated(role: Role) -> SessionState {
        SessionState::Authenticated(UserSummary::new(UserId::Numeric(1), "u@x.io", role))
    }

    #[test]
    fn test_pending_while_initializing() {
        assert_eq!(
            authorize(&SessionState::Initializing, false, Some(Role::Student)),
            GuardDecision::Pending
        );
        assert_eq!(
            authorize(&SessionState::Initializing, true, None),
            GuardDecision::Pending
        );
    }

    #[test]
    fn test_unauthenticated_goes_to_login() {
        assert_eq!(
            authorize(&SessionState::Unauthenticated, true, None),
            GuardDecision::DenyRedirect("/login")
        );
    }

    #[test]
    fn test_missing_credential_goes_to_login() {
        assert_eq!(
            authorize(&authenticated(Role::Student), false, Some(Role::Student)),
            GuardDecision::DenyRedirect("/login")
        );
    }

    #[test]
    fn test_wrong_role_goes_home() {
        assert_eq!(
            authorize(&authenticated(Role::Student), true, Some(Role::Company)),
            GuardDecision::DenyRedirect("/")
        );
    }

    #[test]
    fn test_allow() {
        assert_eq!(
            authorize(&authenticated(Role::Company), true, Some(Role::Company)),
            GuardDecision::Allow
        );
        assert_eq!(
            authorize(&authenticated(Role::Student), true, None),
            GuardDecision::Allow
        );
    }

    #[test]
    fn test_bound_guard_reads_live_state() {
        let session = Rc::new(Session::new());
        let store = Rc::new(MemoryCredentialStore::new());
        let guard = RouteGuard::new(Rc::clone(&session), Rc::clone(&store));

        assert_eq!(guard.authorize_path("/student/profile"), GuardDecision::Pending);
        assert_eq!(guard.authorize_path("/jobs"), GuardDecision::Allow);

        store.set(&CredentialPair::new("a", "r"));
        session.authenticate(UserSummary::role_only(Role::Student));
        assert_eq!(guard.authorize_path("/student/profile"), GuardDecision::Allow);
        assert_eq!(
            guard.authorize_path("/company/dashboard"),
            GuardDecision::DenyRedirect("/")
        );

        store.clear();
        session.logout();
        assert_eq!(
            guard.authorize_path("/student/profile"),
            GuardDecision::DenyRedirect("/login")
        );
    }
}
