//! Student entity - Enrolled pupils and their guardian contact details.
//!
//! Class membership is a plain string match against `school_class::Model::name`;
//! nothing enforces that the class exists.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Enrollment status
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum StudentStatus {
    /// Currently enrolled
    #[sea_orm(string_value = "Active")]
    Active,
    /// Left the school or suspended
    #[sea_orm(string_value = "Inactive")]
    Inactive,
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        })
    }
}

/// Student database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    /// Identifier of the form `STD0001`
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Roll number within the class section
    pub roll_no: i32,
    /// Full name
    pub name: String,
    /// Name of the class the student belongs to (e.g. "Class 5")
    pub class_name: String,
    /// Section label within the class (e.g. "A")
    pub section: String,
    /// Guardian name
    pub parent_name: String,
    /// Guardian phone number
    pub contact: String,
    /// Postal address
    pub address: String,
    /// Contact email
    pub email: String,
    /// Date of birth
    pub date_of_birth: Date,
    /// Gender as recorded on the admission form
    pub gender: String,
    /// Date the student was admitted
    pub admission_date: Date,
    /// Enrollment status
    pub status: StudentStatus,
}

impl Model {
    /// Whether the student is currently enrolled
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == StudentStatus::Active
    }
}

/// Defines relationships between Student and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One student has many fee transactions
    #[sea_orm(has_many = "super::fee_transaction::Entity")]
    FeeTransactions,
    /// One student has many marks
    #[sea_orm(has_many = "super::mark::Entity")]
    Marks,
}

impl Related<super::fee_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FeeTransactions.def()
    }
}

impl Related<super::mark::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Marks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
