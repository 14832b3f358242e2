//! Credential checks for the dashboard login.
//!
//! Authentication distinguishes an unknown email from a wrong password so the
//! login form can say which field is wrong.

use crate::{
    entities::{Role, User, user},
    errors::Result,
};
use sea_orm::{
    prelude::*,
    sea_query::{Expr, Func},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The identity an authenticated tab holds for its lifetime.
///
/// Field names match the serialized session object stored in the tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Login email
    pub email: String,
    /// Permission class
    pub role: Role,
    /// Display name
    pub name: String,
    /// Date-format locale
    pub dateformat: String,
}

impl From<user::Model> for Identity {
    fn from(user: user::Model) -> Self {
        Self {
            email: user.email,
            role: user.role,
            name: user.name,
            dateformat: user.date_format,
        }
    }
}

/// Why a login attempt was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    /// No account has this email
    UnknownEmail,
    /// The account exists but the password differs
    WrongPassword,
}

impl fmt::Display for LoginFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UnknownEmail => "Invalid email",
            Self::WrongPassword => "Invalid password",
        })
    }
}

/// Result of a login attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials matched
    Authenticated(Identity),
    /// Credentials were refused
    Rejected(LoginFailure),
}

/// Checks `email` (case-insensitive) and `password` against the user table.
pub async fn authenticate(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<LoginOutcome> {
    let found = User::find()
        .filter(
            Expr::expr(Func::lower(Expr::col(user::Column::Email)))
                .eq(email.trim().to_lowercase()),
        )
        .one(db)
        .await?;

    let outcome = match found {
        None => LoginOutcome::Rejected(LoginFailure::UnknownEmail),
        Some(u) if u.password != password => LoginOutcome::Rejected(LoginFailure::WrongPassword),
        Some(u) => LoginOutcome::Authenticated(u.into()),
    };
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_seeded_db;

    #[tokio::test]
    async fn test_authenticate_success_is_case_insensitive() -> Result<()> {
        let db = setup_seeded_db().await?;

        let outcome = authenticate(&db, "Admin@Example.com", "admin").await?;
        let LoginOutcome::Authenticated(identity) = outcome else {
            panic!("expected success, got {outcome:?}");
        };
        assert_eq!(identity.email, "admin@example.com");
        assert_eq!(identity.role, Role::Admin);
        assert_eq!(identity.name, "Administrator");
        assert_eq!(identity.dateformat, "en-IN");
        Ok(())
    }

    #[tokio::test]
    async fn test_wrong_password_differs_from_unknown_email() -> Result<()> {
        let db = setup_seeded_db().await?;

        let wrong_password = authenticate(&db, "teacher@example.com", "nope").await?;
        let unknown_email = authenticate(&db, "nobody@example.com", "teacher").await?;

        assert_eq!(
            wrong_password,
            LoginOutcome::Rejected(LoginFailure::WrongPassword)
        );
        assert_eq!(
            unknown_email,
            LoginOutcome::Rejected(LoginFailure::UnknownEmail)
        );
        assert_eq!(LoginFailure::WrongPassword.to_string(), "Invalid password");
        assert_eq!(LoginFailure::UnknownEmail.to_string(), "Invalid email");
        Ok(())
    }

    #[test]
    fn test_identity_serializes_session_shape() {
        let identity = Identity {
            email: "teacher@example.com".to_string(),
            role: Role::Teacher,
            name: "Alice Smith".to_string(),
            dateformat: "en-IN".to_string(),
        };
        let json = serde_json::to_value(&identity).unwrap_or_default();
        assert_eq!(json["role"], "teacher");
        assert_eq!(json["dateformat"], "en-IN");
    }
}
