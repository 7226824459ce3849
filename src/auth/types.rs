//! Identity types exchanged between the decoders, the verifier and the
//! response strategies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Credentials submitted with a single login request.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginData {
    pub userid: String,
    pub password: String,
}

impl LoginData {
    pub fn new(userid: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            userid: userid.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginData")
            .field("userid", &self.userid)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Information about an authenticated user, as returned by the verifier.
///
/// `roles` does not contain `user_role`; see [`UserInfo::transmitted_roles`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    /// Unique and stable username.
    pub username: String,

    /// Human-readable name (e.g. "Peter Lustig").
    pub display_name: String,

    pub roles: Vec<String>,

    /// The role that is unique to this user.
    pub user_role: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_realm_handle: Option<String>,
}

impl UserInfo {
    /// Roles as sent to the host session service: `roles` followed by
    /// `user_role`. Order and duplicates are kept as they are.
    pub fn transmitted_roles(&self) -> Vec<&str> {
        self.roles
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.user_role.as_str()))
            .collect()
    }
}

/// Result of a credential check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The credentials were checked and rejected.
    Forbidden,
    Authenticated(UserInfo),
}
