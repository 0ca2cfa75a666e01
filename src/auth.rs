//! Identity collaborator.
//!
//! Accounts come from the config file; `login` checks a credential
//! pair and produces a [`Session`]. The admin flag on a session gates
//! which affordances the UI draws, but authorization itself is
//! re-checked by the content store on every mutation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Viewer,
}

/// A configured account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// The current visitor's session. Defaults to anonymous.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    authenticated: bool,
    admin: bool,
    username: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    #[cfg(test)]
    pub fn admin_for_tests() -> Self {
        Self {
            authenticated: true,
            admin: true,
            username: Some("test-admin".to_string()),
        }
    }
}

/// Validates credentials against the configured account table.
pub struct Identity {
    accounts: Vec<Account>,
}

impl Identity {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self { accounts }
    }

    pub fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let account = self
            .accounts
            .iter()
            .find(|a| a.username == username && a.password == password)
            .ok_or(AuthError::InvalidCredentials)?;

        tracing::info!(username = %account.username, "login");
        Ok(Session {
            authenticated: true,
            admin: account.role == Role::Admin,
            username: Some(account.username.clone()),
        })
    }

    pub fn logout(&self) -> Session {
        Session::anonymous()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity::new(vec![
            Account {
                username: "admin".to_string(),
                password: "admin2024".to_string(),
                role: Role::Admin,
            },
            Account {
                username: "dev".to_string(),
                password: "dev2024".to_string(),
                role: Role::Viewer,
            },
        ])
    }

    #[test]
    fn valid_admin_login() {
        let session = identity().login("admin", "admin2024").unwrap();
        assert!(session.is_authenticated());
        assert!(session.is_admin());
        assert_eq!(session.username(), Some("admin"));
    }

    #[test]
    fn viewer_login_is_not_admin() {
        let session = identity().login("dev", "dev2024").unwrap();
        assert!(session.is_authenticated());
        assert!(!session.is_admin());
    }

    #[test]
    fn wrong_password_is_rejected() {
        let err = identity().login("admin", "nope").unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn logout_returns_anonymous() {
        let id = identity();
        let session = id.logout();
        assert!(!session.is_authenticated());
        assert!(!session.is_admin());
    }
}
