//! Development verifier with a fixed set of accounts.
//!
//! Every account uses the password `tobira`. Not meant for production.

use async_trait::async_trait;
use tower::BoxError;

use crate::auth::{LoginData, LoginOutcome, UserInfo, Verifier};

const DUMMY_PASSWORD: &str = "tobira";

struct DummyAccount {
    username: &'static str,
    display_name: &'static str,
    roles: &'static [&'static str],
    user_role: &'static str,
}

const ACCOUNTS: &[DummyAccount] = &[
    DummyAccount {
        username: "admin",
        display_name: "Administrator",
        roles: &["ROLE_ADMIN", "ROLE_ANONYMOUS", "ROLE_USER", "ROLE_SUDO"],
        user_role: "ROLE_USER_ADMIN",
    },
    DummyAccount {
        username: "sabine",
        display_name: "Sabine Rudolfs",
        roles: &["ROLE_ANONYMOUS", "ROLE_USER", "ROLE_INSTRUCTOR", "ROLE_TOBIRA_MODERATOR"],
        user_role: "ROLE_USER_SABINE",
    },
    DummyAccount {
        username: "augustus",
        display_name: "Augustus Pagenkämper",
        roles: &["ROLE_ANONYMOUS", "ROLE_USER", "ROLE_STUDENT"],
        user_role: "ROLE_USER_AUGUSTUS",
    },
];

/// Accepts the built-in development accounts and forbids everything else.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyVerifier;

impl DummyVerifier {
    fn lookup(login: &LoginData) -> Option<UserInfo> {
        if login.password != DUMMY_PASSWORD {
            return None;
        }

        ACCOUNTS
            .iter()
            .find(|account| account.username == login.userid)
            .map(|account| UserInfo {
                username: account.username.to_string(),
                display_name: account.display_name.to_string(),
                roles: account.roles.iter().map(|r| r.to_string()).collect(),
                user_role: account.user_role.to_string(),
                email: None,
                user_realm_handle: None,
            })
    }
}

#[async_trait]
impl Verifier for DummyVerifier {
    async fn check(&self, login: &LoginData) -> Result<LoginOutcome, BoxError> {
        Ok(match Self::lookup(login) {
            Some(info) => LoginOutcome::Authenticated(info),
            None => LoginOutcome::Forbidden,
        })
    }
}
