//! Portal core: session domain types and the pieces of the auth layer that
//! never touch the network.

pub mod cookies;
pub mod credentials;
pub mod error;
pub mod guard;
#[cfg(not(target_arch = "wasm32"))]
pub mod logging;
pub mod routes;
pub mod session;
pub mod settings;
pub mod types;
pub mod validation;

pub use credentials::{CredentialStore, MemoryCredentialStore};
pub use error::{CoreError, CoreResult};
pub use guard::{GuardDecision, RouteGuard, authorize};
pub use session::{Session, SessionSnapshot, SessionState, SubscriptionId};
pub use settings::Settings;
pub use types::{CredentialPair, Role, UserId, UserSummary};
pub use validation::{LoginRequest, RegisterRequest, RegistrationProfile, ValidationError};
