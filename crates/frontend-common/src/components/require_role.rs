//! Route guard component for role-restricted views

use super::Spinner;
use crate::auth::use_auth;
use crate::client::auth_service;
use portal_core::routes::LOGIN_PATH;
use portal_core::{CredentialStore, GuardDecision, Role, SessionState, authorize};
use tracing::error;
use yew::prelude::*;
use yew_router::AnyRoute;
use yew_router::components::Redirect;

#[derive(Properties, PartialEq)]
pub struct RequireRoleProps {
    /// Role the view is restricted to; `None` admits any signed-in principal
    #[prop_or_default]
    pub role: Option<Role>,
    pub children: Children,
}

/// Renders its children only when the guard allows it.
///
/// Shows the spinner while the startup check runs and redirects to `/login`
/// or `/` on denial. Must sit inside an [`crate::AuthProvider`] and a router.
#[function_component(RequireRole)]
pub fn require_role(props: &RequireRoleProps) -> Html {
    let state = use_auth().map(|auth| auth.state.clone());
    let decision = decide(state.as_ref(), props.role, || {
        auth_service().is_ok_and(|service| service.client().credentials().has_access_credential())
    });

    match decision {
        GuardDecision::Pending => html! { <Spinner text="Loading..." /> },
        GuardDecision::Allow => html! { <>{ props.children.clone() }</> },
        GuardDecision::DenyRedirect(path) => html! {
            <Redirect<AnyRoute> to={AnyRoute::new(path)} />
        },
    }
}

/// Guard decision for the mounted session; without one the view is denied
fn decide(
    state: Option<&SessionState>,
    role: Option<Role>,
    has_credential: impl FnOnce() -> bool,
) -> GuardDecision {
    let Some(state) = state else {
        error!("RequireRole rendered outside AuthProvider");
        return GuardDecision::DenyRedirect(LOGIN_PATH);
    };
    let has_credential = matches!(state, SessionState::Authenticated(_)) && has_credential();
    authorize(state, has_credential, role)
}
