//! Student business logic - enrollment records and their lifecycle.
//!
//! Students are created and edited by admins. Deleting a student is a soft
//! delete: the record flips to `Inactive` and its fee ledger is preserved.

use crate::{
    core::next_sequence_id,
    entities::{Student, StudentStatus, student},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{ActiveValue::Unchanged, QueryOrder, QuerySelect, Set, prelude::*};
use serde::{Deserialize, Serialize};

/// Editable student fields, used for both admission and edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct StudentDetails {
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
}

impl StudentDetails {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation {
                message: "Student name cannot be empty".to_string(),
            });
        }
        if self.class_name.trim().is_empty() {
            return Err(Error::Validation {
                message: "Class cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Retrieves every student ordered by id.
pub async fn get_all_students(db: &DatabaseConnection) -> Result<Vec<student::Model>> {
    Student::find()
        .order_by_asc(student::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a student by id, returning None if not found.
pub async fn get_student_by_id(
    db: &DatabaseConnection,
    student_id: &str,
) -> Result<Option<student::Model>> {
    Student::find_by_id(student_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the active students of a class, ordered by roll number.
pub async fn get_active_students_in_class(
    db: &DatabaseConnection,
    class_name: &str,
) -> Result<Vec<student::Model>> {
    Student::find()
        .filter(student::Column::ClassName.eq(class_name))
        .filter(student::Column::Status.eq(StudentStatus::Active))
        .order_by_asc(student::Column::RollNo)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Admits a new student, assigning the next `STD` id.
pub async fn create_student(
    db: &DatabaseConnection,
    details: StudentDetails,
) -> Result<student::Model> {
    details.validate()?;

    let ids: Vec<String> = Student::find()
        .select_only()
        .column(student::Column::Id)
        .into_tuple()
        .all(db)
        .await?;
    let id = next_sequence_id("STD", 4, ids.iter().map(String::as_str));

    let model = student::ActiveModel {
        id: Set(id),
        roll_no: Set(details.roll_no),
        name: Set(details.name.trim().to_string()),
        class_name: Set(details.class_name),
        section: Set(details.section),
        parent_name: Set(details.parent_name),
        contact: Set(details.contact),
        address: Set(details.address),
        email: Set(details.email),
        date_of_birth: Set(details.date_of_birth),
        gender: Set(details.gender),
        admission_date: Set(details.admission_date),
        status: Set(StudentStatus::Active),
    };

    model.insert(db).await.map_err(Into::into)
}

/// Replaces a student's editable fields and status.
///
/// Returns None if the student does not exist.
pub async fn update_student(
    db: &DatabaseConnection,
    student_id: &str,
    details: StudentDetails,
    status: StudentStatus,
) -> Result<Option<student::Model>> {
    details.validate()?;

    if get_student_by_id(db, student_id).await?.is_none() {
        return Ok(None);
    }

    let model = student::ActiveModel {
        id: Unchanged(student_id.to_string()),
        roll_no: Set(details.roll_no),
        name: Set(details.name.trim().to_string()),
        class_name: Set(details.class_name),
        section: Set(details.section),
        parent_name: Set(details.parent_name),
        contact: Set(details.contact),
        address: Set(details.address),
        email: Set(details.email),
        date_of_birth: Set(details.date_of_birth),
        gender: Set(details.gender),
        admission_date: Set(details.admission_date),
        status: Set(status),
    };

    Ok(Some(model.update(db).await?))
}

/// Soft-deletes a student by marking them inactive.
///
/// Returns false if the student does not exist.
pub async fn deactivate_student(db: &DatabaseConnection, student_id: &str) -> Result<bool> {
    let Some(existing) = get_student_by_id(db, student_id).await? else {
        return Ok(false);
    };

    let mut model: student::ActiveModel = existing.into();
    model.status = Set(StudentStatus::Inactive);
    model.update(db).await?;
    Ok(true)
}
