//! Dashboard headline figures.

use crate::{
    core::fee::get_fee_summaries,
    entities::{Role, Student, StudentStatus, User, student, user},
    errors::Result,
};
use sea_orm::{PaginatorTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Figures shown on the dashboard landing section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Students with `Active` status
    pub total_students: u64,
    /// Accounts with the teacher role
    pub total_teachers: u64,
    /// Sum of outstanding balances; advances do not offset other students' dues
    pub total_due: f64,
    /// Every student, active or not, counted per class name
    pub student_count_by_class: BTreeMap<String, u64>,
}

/// Computes the dashboard figures from the current store contents.
pub async fn get_dashboard_stats(db: &DatabaseConnection) -> Result<DashboardStats> {
    let total_students = Student::find()
        .filter(student::Column::Status.eq(StudentStatus::Active))
        .count(db)
        .await?;

    let total_teachers = User::find()
        .filter(user::Column::Role.eq(Role::Teacher))
        .count(db)
        .await?;

    let total_due = get_fee_summaries(db)
        .await?
        .iter()
        .map(|s| s.total_due)
        .filter(|due| *due > 0.0)
        .sum();

    let mut student_count_by_class = BTreeMap::new();
    for s in Student::find().all(db).await? {
        *student_count_by_class.entry(s.class_name).or_insert(0) += 1;
    }

    Ok(DashboardStats {
        total_students,
        total_teachers,
        total_due,
        student_count_by_class,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::setup_seeded_db;

    #[tokio::test]
    async fn test_dashboard_stats_from_seed() -> Result<()> {
        let db = setup_seeded_db().await?;

        let stats = get_dashboard_stats(&db).await?;
        assert_eq!(stats.total_students, 2);
        assert_eq!(stats.total_teachers, 1);
        assert_eq!(stats.total_due, 1200.0);
        assert_eq!(stats.student_count_by_class.get("Class 5"), Some(&2));
        assert_eq!(stats.student_count_by_class.get("Class 6"), Some(&1));
        Ok(())
    }
}
