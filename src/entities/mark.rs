//! Mark entity - Scores recorded per student, class, term and subject.
//!
//! Marks are append-only. When several rows exist for the same key the most
//! recently recorded one is authoritative.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Mark database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "marks")]
pub struct Model {
    /// Unique identifier, increasing in recording order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Student the score belongs to
    pub student_id: String,
    /// Class the student sat the exam in
    pub class_name: String,
    /// Term label (e.g. "Term 1")
    pub term: String,
    /// Subject name
    pub subject: String,
    /// Score
    pub score: f64,
}

/// Defines relationships between Mark and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each mark belongs to one student
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id"
    )]
    Student,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
