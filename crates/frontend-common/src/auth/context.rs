//! Global authentication context and provider

use crate::client::auth_service;
use portal_core::{SessionSnapshot, SessionState};
use std::rc::Rc;
use tracing::error;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

/// Authentication context data, mirrored from the session
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthContextData {
    pub state: SessionState,
}

impl AuthContextData {
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot()
    }
}

/// Authentication context actions
pub enum AuthAction {
    /// The session broadcast a transition
    Sync(SessionState),
}

/// Authentication context
pub type AuthContext = UseReducerHandle<AuthContextData>;

impl Reducible for AuthContextData {
    type Action = AuthAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        match action {
            AuthAction::Sync(state) if state == self.state => self,
            AuthAction::Sync(state) => Rc::new(Self { state }),
        }
    }
}

/// Auth provider props
#[derive(Properties, PartialEq)]
pub struct AuthProviderProps {
    pub children: Children,
}

/// Subscribes the component tree to the session and runs the startup
/// session check once on mount
#[function_component(AuthProvider)]
pub fn auth_provider(props: &AuthProviderProps) -> Html {
    let auth_state = use_reducer(AuthContextData::default);

    {
        let auth_state = auth_state.clone();
        use_effect_with((), move |_| {
            let subscription = match auth_service() {
                Ok(service) => {
                    let session = Rc::clone(service.session());
                    auth_state.dispatch(AuthAction::Sync(session.state()));

                    let handle = auth_state.clone();
                    let id = session
                        .subscribe(move |state| handle.dispatch(AuthAction::Sync(state.clone())));

                    spawn_local(async move {
                        service.check_session().await;
                    });
                    Some((session, id))
                }
                Err(err) => {
                    error!(error = %err, "Failed to initialize API client");
                    auth_state.dispatch(AuthAction::Sync(SessionState::Unauthenticated));
                    None
                }
            };

            // Cleanup on unmount
            move || {
                if let Some((session, id)) = subscription {
                    session.unsubscribe(id);
                }
            }
        });
    }

    html! {
        <ContextProvider<AuthContext> context={auth_state}>
            {props.children.clone()}
        </ContextProvider<AuthContext>>
    }
}

/// Hook to use auth context; `None` outside an [`AuthProvider`]
#[hook]
pub fn use_auth() -> Option<AuthContext> {
    use_context::<AuthContext>()
}

/// Hook to get the current session snapshot
#[hook]
pub fn use_session() -> SessionSnapshot {
    let auth = use_auth();
    auth.map_or_else(
        || SessionState::Initializing.snapshot(),
        |auth| auth.snapshot(),
    )
}
