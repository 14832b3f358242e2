//! Seed fixtures loaded from the `[seed]` tables of config.toml
//!
//! The fixtures are inserted into the record store on startup when it holds no
//! users yet. Structured class columns are encoded to JSON here, once, on the
//! way in.

use crate::{
    core::{class::ClassInfo, fee::start_of_day},
    entities::{
        PaymentMode, Role, StudentStatus, TransactionKind, fee_transaction, mark, student, user,
    },
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set, TransactionTrait,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// All seed fixtures
#[derive(Debug, Deserialize, Default, Clone)]
pub struct SeedData {
    /// Dashboard accounts
    #[serde(default)]
    pub users: Vec<UserSeed>,
    /// Class configurations
    #[serde(default)]
    pub classes: Vec<ClassSeed>,
    /// Enrolled students
    #[serde(default)]
    pub students: Vec<StudentSeed>,
    /// Opening fee ledger entries
    #[serde(default)]
    pub fees: Vec<FeeSeed>,
    /// Recorded marks
    #[serde(default)]
    pub marks: Vec<MarkSeed>,
}

/// A dashboard account
#[derive(Debug, Deserialize, Clone)]
pub struct UserSeed {
    /// Login email
    pub email: String,
    /// Login password
    pub password: String,
    /// Permission class
    pub role: Role,
    /// Display name
    pub name: String,
    /// Date-format locale
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_date_format() -> String {
    "en-IN".to_string()
}

/// A class configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ClassSeed {
    /// Class id
    pub id: i32,
    /// Class name
    pub name: String,
    /// Section labels
    pub sections: Vec<String>,
    /// Fee label to amount
    pub fee_structure: BTreeMap<String, f64>,
    /// Term labels
    pub terms: Vec<String>,
    /// Subject names
    pub subjects: Vec<String>,
}

/// An enrolled student
#[derive(Debug, Deserialize, Clone)]
#[allow(missing_docs)]
pub struct StudentSeed {
    pub id: String,
    pub roll_no: i32,
    pub name: String,
    pub class_name: String,
    pub section: String,
    pub parent_name: String,
    pub contact: String,
    pub address: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub admission_date: NaiveDate,
    pub status: StudentStatus,
}

/// An opening ledger entry
#[derive(Debug, Deserialize, Clone)]
#[allow(missing_docs)]
pub struct FeeSeed {
    pub invoice_no: String,
    pub student_id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub kind: TransactionKind,
    #[serde(default)]
    pub payment_mode: Option<PaymentMode>,
}

/// A recorded mark
#[derive(Debug, Deserialize, Clone)]
#[allow(missing_docs)]
pub struct MarkSeed {
    pub student_id: String,
    pub class_name: String,
    pub term: String,
    pub subject: String,
    pub score: f64,
}

/// Inserts the fixtures when the store has no users yet.
///
/// Returns `true` when fixtures were written, `false` when the store was
/// already populated. All rows are written in one transaction.
pub async fn seed_database(db: &DatabaseConnection, seed: &SeedData) -> Result<bool> {
    let existing_users = user::Entity::find().count(db).await?;
    if existing_users > 0 {
        debug!(existing_users, "Store already populated, skipping seed");
        return Ok(false);
    }

    let txn = db.begin().await?;

    for u in &seed.users {
        user::ActiveModel {
            email: Set(u.email.clone()),
            password: Set(u.password.clone()),
            role: Set(u.role),
            name: Set(u.name.clone()),
            date_format: Set(u.date_format.clone()),
        }
        .insert(&txn)
        .await?;
    }

    for c in &seed.classes {
        let info = ClassInfo {
            id: c.id,
            name: c.name.clone(),
            sections: c.sections.clone(),
            fee_structure: c.fee_structure.clone(),
            terms: c.terms.clone(),
            subjects: c.subjects.clone(),
        };
        info.to_active_model()?.insert(&txn).await?;
    }

    for s in &seed.students {
        student::ActiveModel {
            id: Set(s.id.clone()),
            roll_no: Set(s.roll_no),
            name: Set(s.name.clone()),
            class_name: Set(s.class_name.clone()),
            section: Set(s.section.clone()),
            parent_name: Set(s.parent_name.clone()),
            contact: Set(s.contact.clone()),
            address: Set(s.address.clone()),
            email: Set(s.email.clone()),
            date_of_birth: Set(s.date_of_birth),
            gender: Set(s.gender.clone()),
            admission_date: Set(s.admission_date),
            status: Set(s.status),
        }
        .insert(&txn)
        .await?;
    }

    for f in &seed.fees {
        fee_transaction::ActiveModel {
            invoice_no: Set(f.invoice_no.clone()),
            student_id: Set(f.student_id.clone()),
            date: Set(start_of_day(f.date)),
            description: Set(f.description.clone()),
            amount: Set(f.amount),
            kind: Set(f.kind),
            payment_mode: Set(f.payment_mode),
        }
        .insert(&txn)
        .await?;
    }

    for m in &seed.marks {
        mark::ActiveModel {
            student_id: Set(m.student_id.clone()),
            class_name: Set(m.class_name.clone()),
            term: Set(m.term.clone()),
            subject: Set(m.subject.clone()),
            score: Set(m.score),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    info!(
        users = seed.users.len(),
        classes = seed.classes.len(),
        students = seed.students.len(),
        fees = seed.fees.len(),
        marks = seed.marks.len(),
        "Seeded record store"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{sample_seed, setup_empty_db};

    #[test]
    fn test_parse_seed_tables() {
        let toml_str = r#"
            [[users]]
            email = "admin@example.com"
            password = "admin"
            role = "admin"
            name = "Administrator"

            [[classes]]
            id = 1
            name = "Class 5"
            sections = ["A", "B"]
            fee_structure = { "Monthly Fee" = 1200.0, "Admission Fee" = 5000.0 }
            terms = ["Term 1", "Term 2"]
            subjects = ["English", "Math", "Science"]

            [[fees]]
            invoice_no = "INV00001"
            student_id = "STD0001"
            date = "2025-08-31"
            description = "Monthly Fee - 202508"
            amount = 1200.0
            kind = "Charge"

            [[fees]]
            invoice_no = "INV00002"
            student_id = "STD0001"
            date = "2025-09-05"
            description = "Payment Received (Cash)"
            amount = 1200.0
            kind = "Payment"
            payment_mode = "Cash"
        "#;

        let seed: SeedData = toml::from_str(toml_str).unwrap();
        assert_eq!(seed.users[0].role, Role::Admin);
        assert_eq!(seed.users[0].date_format, "en-IN");
        assert_eq!(seed.classes[0].fee_structure["Monthly Fee"], 1200.0);
        assert_eq!(seed.fees[0].payment_mode, None);
        assert_eq!(seed.fees[1].payment_mode, Some(PaymentMode::Cash));
        assert_eq!(seed.fees[1].kind, TransactionKind::Payment);
    }

    #[tokio::test]
    async fn test_seed_only_once() -> Result<()> {
        let db = setup_empty_db().await?;
        let seed = sample_seed();

        assert!(seed_database(&db, &seed).await?);
        assert!(!seed_database(&db, &seed).await?);

        let users = user::Entity::find().count(&db).await?;
        assert_eq!(users, 2);
        let fees = fee_transaction::Entity::find().count(&db).await?;
        assert_eq!(fees, 3);
        Ok(())
    }
}
