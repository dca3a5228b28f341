mod oauth_callback;
mod require_role;
mod spinner;

pub use oauth_callback::OAuthCallback;
pub use require_role::RequireRole;
pub use spinner::LoadingSpinner as Spinner;
