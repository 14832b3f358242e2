//! User entity - Dashboard accounts seeded at startup.
//!
//! Users are immutable for the lifetime of a session. The role decides which
//! dashboard sections are rendered for the user.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Permission class gating which sections a user sees
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including fees and class settings
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Classroom access: students, attendance, marks
    #[sea_orm(string_value = "teacher")]
    Teacher,
}

impl Role {
    /// Lowercase name as shown next to the user's display name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Teacher => "teacher",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Login email, unique per user
    #[sea_orm(primary_key, auto_increment = false)]
    pub email: String,
    /// Credential compared verbatim at login
    pub password: String,
    /// Permission class
    pub role: Role,
    /// Display name shown in the navigation bar
    pub name: String,
    /// Locale used to format dates for this user (e.g. `en-IN`)
    pub date_format: String,
}

/// `User` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
