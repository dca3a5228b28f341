//! Landing view for the OAuth redirect

use super::Spinner;
use crate::client::auth_service;
use portal_core::routes::LOGIN_PATH;
use tracing::error;
use url::form_urlencoded;
use yew::prelude::*;
use yew_router::AnyRoute;
use yew_router::hooks::use_navigator;

/// Completes sign-in from the `role` query parameter and navigates to the
/// role's landing page, or to `/login` when the role is missing or unknown.
#[function_component(OAuthCallback)]
pub fn oauth_callback() -> Html {
    let navigator = use_navigator();

    use_effect_with((), move |_| {
        let role = current_query().as_deref().and_then(role_from_query);
        let target = match auth_service() {
            Ok(service) => service.complete_oauth(role.as_deref()),
            Err(err) => {
                error!(error = %err, "OAuth callback without an API client");
                LOGIN_PATH
            }
        };
        if let Some(navigator) = navigator {
            navigator.replace(&AnyRoute::new(target));
        }
    });

    html! { <Spinner text="Completing sign-in..." /> }
}

fn current_query() -> Option<String> {
    web_sys::window()?.location().search().ok()
}

/// `role` parameter of a `?a=b&role=...` query string
fn role_from_query(search: &str) -> Option<String> {
    form_urlencoded::parse(search.trim_start_matches('?').as_bytes())
        .find(|(key, _)| key == "role")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
