//! School class entity - Class configuration rows.
//!
//! Sections, the fee structure, terms and subjects are stored as JSON text.
//! They are decoded into `core::class::ClassInfo` before leaving the data
//! access layer; nothing outside `core` reads these columns directly.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// School class database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "classes")]
pub struct Model {
    /// Unique identifier for the class
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Display name, also the key students reference (e.g. "Class 5")
    pub name: String,
    /// JSON array of section labels, in display order
    pub sections: String,
    /// JSON object mapping fee labels to amounts
    pub fee_structure: String,
    /// JSON array of term labels, in display order
    pub terms: String,
    /// JSON array of subject names, in display order
    pub subjects: String,
}

/// `SchoolClass` has no foreign-keyed relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
