//! Shared test utilities for `SchoolDesk`.
//!
//! This module provides common helper functions for setting up test stores
//! and building test records with sensible defaults.

#![allow(clippy::expect_used)]

use crate::{
    config::{AppConfig, SeedData, database, seed},
    core::{Facade, auth::Identity, student::StudentDetails},
    entities::Role,
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use std::time::Duration;

/// The repository's config.toml, whose seed tables double as test fixtures.
const REPOSITORY_CONFIG: &str = include_str!("../config.toml");

/// Seed fixtures from the repository config.
///
/// Users: admin + teacher. Classes: "Class 5" (A, B) and "Class 6" (A).
/// Students: STD0001 and STD0002 active in Class 5, STD0003 inactive in Class 6.
/// Fees: STD0001 charged and paid 1200, STD0002 charged 1200.
/// Marks: STD0001 Term 1 Math 85, Science 92.
#[must_use]
pub fn sample_seed() -> SeedData {
    let config: AppConfig =
        toml::from_str(REPOSITORY_CONFIG).expect("repository config.toml must parse");
    config.seed
}

/// Creates an in-memory `SQLite` store with all tables and no rows.
pub async fn setup_empty_db() -> Result<DatabaseConnection> {
    let db = database::create_connection(database::DEFAULT_DATABASE_URL).await?;
    database::create_tables(&db).await?;
    Ok(db)
}

/// Creates an in-memory store populated with [`sample_seed`].
/// This is the standard setup for integration tests.
pub async fn setup_seeded_db() -> Result<DatabaseConnection> {
    let db = setup_empty_db().await?;
    seed::seed_database(&db, &sample_seed()).await?;
    Ok(db)
}

/// A seeded facade with no artificial latency.
pub async fn setup_facade() -> Result<Facade> {
    Ok(Facade::new(setup_seeded_db().await?, Duration::ZERO))
}

/// Shorthand for a calendar date.
#[must_use]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("test dates are valid")
}

/// Student details with sensible defaults.
///
/// # Defaults
/// * class: "Class 5", section "A", roll number 3
/// * born 2014-01-01, admitted 2025-04-01
#[must_use]
pub fn sample_details(name: &str) -> StudentDetails {
    StudentDetails {
        roll_no: 3,
        name: name.to_string(),
        class_name: "Class 5".to_string(),
        section: "A".to_string(),
        parent_name: "Guardian".to_string(),
        contact: "9000000000".to_string(),
        address: "1 School Road".to_string(),
        email: "student@email.com".to_string(),
        date_of_birth: date(2014, 1, 1),
        gender: "Female".to_string(),
        admission_date: date(2025, 4, 1),
    }
}

/// The seeded admin's identity.
#[must_use]
pub fn admin_identity() -> Identity {
    Identity {
        email: "admin@example.com".to_string(),
        role: Role::Admin,
        name: "Administrator".to_string(),
        dateformat: "en-IN".to_string(),
    }
}

/// The seeded teacher's identity.
#[must_use]
pub fn teacher_identity() -> Identity {
    Identity {
        email: "teacher@example.com".to_string(),
        role: Role::Teacher,
        name: "Alice Smith".to_string(),
        dateformat: "en-IN".to_string(),
    }
}
