//! Mark business logic - recording scores and assembling report cards.
//!
//! Marks are append-only; when a score is entered twice for the same student,
//! term and subject the later entry wins. Totals and grades are not derived
//! here, report cards carry them as absent.

use crate::{
    core::class::get_class_by_name,
    entities::{Mark, mark},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A score as entered in the class marks form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct NewMark {
    pub student_id: String,
    pub class_name: String,
    pub term: String,
    pub subject: String,
    pub score: f64,
}

impl NewMark {
    fn validate(&self) -> Result<()> {
        if !self.score.is_finite() || self.score < 0.0 {
            return Err(Error::Validation {
                message: format!("Invalid score: {}", self.score),
            });
        }
        Ok(())
    }

    fn into_active_model(self) -> mark::ActiveModel {
        mark::ActiveModel {
            student_id: Set(self.student_id),
            class_name: Set(self.class_name),
            term: Set(self.term),
            subject: Set(self.subject),
            score: Set(self.score),
            ..Default::default()
        }
    }
}

/// One subject row of a report card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectReport {
    /// Subject name
    pub subject_name: String,
    /// Score per term, in the class's term order; `None` where nothing was recorded
    pub marks: Vec<(String, Option<f64>)>,
    /// Total across terms, not computed by the store
    pub total: Option<f64>,
    /// Letter grade, not computed by the store
    pub grade: Option<String>,
}

impl SubjectReport {
    /// Score recorded for `term`, if any.
    #[must_use]
    pub fn mark_for(&self, term: &str) -> Option<f64> {
        self.marks
            .iter()
            .find(|(t, _)| t == term)
            .and_then(|(_, score)| *score)
    }
}

/// A student's marks for one class: subjects × terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportCard {
    /// Subject rows in the class's subject order
    pub subjects: Vec<SubjectReport>,
    /// Term labels in display order
    pub terms: Vec<String>,
}

/// Appends a mark.
pub async fn record_mark(db: &DatabaseConnection, entry: NewMark) -> Result<mark::Model> {
    entry.validate()?;
    entry.into_active_model().insert(db).await.map_err(Into::into)
}

/// Appends a batch of marks, all or nothing.
///
/// Every score is checked before the first insert and the inserts share one
/// database transaction. Returns the number of marks written.
pub async fn record_marks(db: &DatabaseConnection, entries: Vec<NewMark>) -> Result<usize> {
    for entry in &entries {
        entry.validate()?;
    }

    let txn = db.begin().await?;
    let count = entries.len();
    for entry in entries {
        entry.into_active_model().insert(&txn).await?;
    }
    txn.commit().await?;
    Ok(count)
}

/// Scores for one class, term and subject keyed by student id.
pub async fn get_class_marks(
    db: &DatabaseConnection,
    class_name: &str,
    term: &str,
    subject: &str,
) -> Result<BTreeMap<String, f64>> {
    let marks = Mark::find()
        .filter(mark::Column::ClassName.eq(class_name))
        .filter(mark::Column::Term.eq(term))
        .filter(mark::Column::Subject.eq(subject))
        .order_by_asc(mark::Column::Id)
        .all(db)
        .await?;

    Ok(marks
        .into_iter()
        .map(|m| (m.student_id, m.score))
        .collect())
}

/// Assembles a student's report card for a class.
///
/// Returns None when the class does not exist. A student with no marks still
/// gets a full grid of absent scores.
pub async fn get_report_card(
    db: &DatabaseConnection,
    student_id: &str,
    class_name: &str,
) -> Result<Option<ReportCard>> {
    let Some(class) = get_class_by_name(db, class_name).await? else {
        return Ok(None);
    };

    let recorded = Mark::find()
        .filter(mark::Column::StudentId.eq(student_id))
        .filter(mark::Column::ClassName.eq(class_name))
        .order_by_asc(mark::Column::Id)
        .all(db)
        .await?;

    // Later entries overwrite earlier ones
    let latest: BTreeMap<(&str, &str), f64> = recorded
        .iter()
        .map(|m| ((m.subject.as_str(), m.term.as_str()), m.score))
        .collect();

    let subjects = class
        .subjects
        .iter()
        .map(|subject| SubjectReport {
            subject_name: subject.clone(),
            marks: class
                .terms
                .iter()
                .map(|term| {
                    let score = latest.get(&(subject.as_str(), term.as_str())).copied();
                    (term.clone(), score)
                })
                .collect(),
            total: None,
            grade: None,
        })
        .collect();

    Ok(Some(ReportCard {
        subjects,
        terms: class.terms,
    }))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::setup_seeded_db;

    fn entry(student_id: &str, term: &str, subject: &str, score: f64) -> NewMark {
        NewMark {
            student_id: student_id.to_string(),
            class_name: "Class 5".to_string(),
            term: term.to_string(),
            subject: subject.to_string(),
            score,
        }
    }

    #[tokio::test]
    async fn test_report_card_fills_grid() -> Result<()> {
        let db = setup_seeded_db().await?;

        let report = get_report_card(&db, "STD0001", "Class 5").await?.unwrap();
        assert_eq!(report.terms, vec!["Term 1", "Term 2"]);
        let names: Vec<&str> = report
            .subjects
            .iter()
            .map(|s| s.subject_name.as_str())
            .collect();
        assert_eq!(names, vec!["English", "Math", "Science"]);

        let math = &report.subjects[1];
        assert_eq!(math.mark_for("Term 1"), Some(85.0));
        assert_eq!(math.mark_for("Term 2"), None);
        assert_eq!(report.subjects[2].mark_for("Term 1"), Some(92.0));
        assert_eq!(report.subjects[0].mark_for("Term 1"), None);
        assert!(report.subjects.iter().all(|s| s.total.is_none() && s.grade.is_none()));
        Ok(())
    }

    #[tokio::test]
    async fn test_report_card_unknown_class_is_none() -> Result<()> {
        let db = setup_seeded_db().await?;
        assert!(get_report_card(&db, "STD0001", "Class 12").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_latest_mark_wins() -> Result<()> {
        let db = setup_seeded_db().await?;

        record_mark(&db, entry("STD0001", "Term 1", "Math", 88.0)).await?;
        record_mark(&db, entry("STD0002", "Term 1", "Math", 73.0)).await?;

        let sheet = get_class_marks(&db, "Class 5", "Term 1", "Math").await?;
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet["STD0001"], 88.0);
        assert_eq!(sheet["STD0002"], 73.0);

        let report = get_report_card(&db, "STD0001", "Class 5").await?.unwrap();
        assert_eq!(report.subjects[1].mark_for("Term 1"), Some(88.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_record_mark_rejects_negative() -> Result<()> {
        let db = setup_seeded_db().await?;
        let result = record_mark(&db, entry("STD0001", "Term 2", "English", -1.0)).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_record_marks_rejects_whole_batch() -> Result<()> {
        let db = setup_seeded_db().await?;
        let batch = vec![
            entry("STD0001", "Term 2", "English", 50.0),
            entry("STD0002", "Term 2", "English", -5.0),
        ];

        let result = record_marks(&db, batch).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(get_class_marks(&db, "Class 5", "Term 2", "English").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_record_marks_writes_every_entry() -> Result<()> {
        let db = setup_seeded_db().await?;
        let batch = vec![
            entry("STD0001", "Term 2", "English", 50.0),
            entry("STD0002", "Term 2", "English", 64.5),
        ];

        assert_eq!(record_marks(&db, batch).await?, 2);
        let sheet = get_class_marks(&db, "Class 5", "Term 2", "English").await?;
        assert_eq!(sheet.get("STD0002"), Some(&64.5));
        assert_eq!(sheet.len(), 2);
        Ok(())
    }
}
