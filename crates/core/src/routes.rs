//! Access requirements of the application's view paths

use crate::types::Role;

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";

const STUDENT_PREFIX: &str = "/student";
const COMPANY_PREFIX: &str = "/company";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected(Option<Role>),
}

/// Access requirement for a view path.
///
/// Everything under `/student` needs a student session and everything under
/// `/company` a company session; the rest of the site is public.
pub fn required_access(path: &str) -> Access {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    if is_under(path, STUDENT_PREFIX) {
        Access::Protected(Some(Role::Student))
    } else if is_under(path, COMPANY_PREFIX) {
        Access::Protected(Some(Role::Company))
    } else {
        Access::Public
    }
}

fn is_under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Where a freshly authenticated principal lands
pub fn landing_path(role: Role) -> &'static str {
    match role {
        Role::Student => "/student/edit-profile",
        Role::Company => "/company/edit-profile",
    }
}
