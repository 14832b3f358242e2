//! The data access facade - the single entry point every view depends on.
//!
//! Each operation runs against the record store and then waits out a fixed
//! artificial latency before resolving, so callers always handle completion
//! asynchronously the way they would against a remote API. With a fixed delay,
//! calls complete in the order they were issued. Results are owned copies of
//! the stored rows; mutating them never touches the store.

use crate::{
    core::{
        auth::{self, LoginOutcome},
        class::{self, ClassInfo},
        fee::{self, FeeSummary, NewPayment},
        mark::{self, NewMark, ReportCard},
        stats::{self, DashboardStats},
        student::{self, StudentDetails},
    },
    entities::{StudentStatus, fee_transaction, mark as mark_entity, student as student_entity},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use std::{collections::BTreeMap, time::Duration};
use tracing::{debug, instrument};

/// Deferred query/command operations over the record store.
#[derive(Debug, Clone)]
pub struct Facade {
    db: DatabaseConnection,
    latency: Duration,
}

impl Facade {
    /// Creates a facade over `db` that delays every call by `latency`.
    #[must_use]
    pub const fn new(db: DatabaseConnection, latency: Duration) -> Self {
        Self { db, latency }
    }

    /// The underlying connection, for setup code that bypasses the latency.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Configured artificial latency.
    #[must_use]
    pub const fn latency(&self) -> Duration {
        self.latency
    }

    async fn settle<T>(&self, value: T) -> T {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        value
    }

    /// Checks login credentials.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let outcome = auth::authenticate(&self.db, email, password).await;
        self.settle(outcome).await
    }

    /// Every student ordered by id.
    pub async fn students(&self) -> Result<Vec<student_entity::Model>> {
        let students = student::get_all_students(&self.db).await;
        self.settle(students).await
    }

    /// One student, or None for an unknown id.
    pub async fn student(&self, student_id: &str) -> Result<Option<student_entity::Model>> {
        let found = student::get_student_by_id(&self.db, student_id).await;
        self.settle(found).await
    }

    /// Active students of a class, ordered by roll number.
    pub async fn active_students_in_class(
        &self,
        class_name: &str,
    ) -> Result<Vec<student_entity::Model>> {
        let students = student::get_active_students_in_class(&self.db, class_name).await;
        self.settle(students).await
    }

    /// Admits a new student.
    #[instrument(skip(self, details), fields(name = %details.name))]
    pub async fn create_student(&self, details: StudentDetails) -> Result<student_entity::Model> {
        let created = student::create_student(&self.db, details).await;
        self.settle(created).await
    }

    /// Edits a student; None for an unknown id.
    #[instrument(skip(self, details))]
    pub async fn update_student(
        &self,
        student_id: &str,
        details: StudentDetails,
        status: StudentStatus,
    ) -> Result<Option<student_entity::Model>> {
        let updated = student::update_student(&self.db, student_id, details, status).await;
        self.settle(updated).await
    }

    /// Soft-deletes a student; false for an unknown id.
    #[instrument(skip(self))]
    pub async fn delete_student(&self, student_id: &str) -> Result<bool> {
        let deleted = student::deactivate_student(&self.db, student_id).await;
        self.settle(deleted).await
    }

    /// Every class with decoded configuration.
    pub async fn classes(&self) -> Result<Vec<ClassInfo>> {
        let classes = class::get_all_classes(&self.db).await;
        self.settle(classes).await
    }

    /// One class, or None for an unknown id.
    pub async fn class(&self, class_id: i32) -> Result<Option<ClassInfo>> {
        let found = class::get_class_by_id(&self.db, class_id).await;
        self.settle(found).await
    }

    /// Balance of every active student folded from the ledger.
    pub async fn fee_summaries(&self) -> Result<Vec<FeeSummary>> {
        let summaries = fee::get_fee_summaries(&self.db).await;
        self.settle(summaries).await
    }

    /// A student's ledger in chronological order.
    pub async fn student_ledger(&self, student_id: &str) -> Result<Vec<fee_transaction::Model>> {
        let ledger = fee::get_ledger(&self.db, student_id).await;
        self.settle(ledger).await
    }

    /// One ledger entry by invoice number, or None.
    pub async fn receipt(&self, invoice_no: &str) -> Result<Option<fee_transaction::Model>> {
        let found = fee::get_transaction_by_invoice(&self.db, invoice_no).await;
        self.settle(found).await
    }

    /// Appends a payment and returns the new invoice entry.
    #[instrument(
        skip(self, payment),
        fields(student_id = %payment.student_id, amount = payment.amount)
    )]
    pub async fn record_payment(&self, payment: NewPayment) -> Result<fee_transaction::Model> {
        let recorded = fee::record_payment(&self.db, payment).await;
        self.settle(recorded).await
    }

    /// Appends a charge.
    #[instrument(skip(self, description))]
    pub async fn charge_fee(
        &self,
        student_id: &str,
        description: String,
        amount: f64,
        date: NaiveDate,
    ) -> Result<fee_transaction::Model> {
        let charged = fee::charge_fee(&self.db, student_id, description, amount, date).await;
        self.settle(charged).await
    }

    /// Scores for one class, term and subject keyed by student id.
    pub async fn class_marks(
        &self,
        class_name: &str,
        term: &str,
        subject: &str,
    ) -> Result<BTreeMap<String, f64>> {
        let sheet = mark::get_class_marks(&self.db, class_name, term, subject).await;
        self.settle(sheet).await
    }

    /// Appends a mark.
    #[instrument(
        skip(self, entry),
        fields(student_id = %entry.student_id, subject = %entry.subject)
    )]
    pub async fn record_mark(&self, entry: NewMark) -> Result<mark_entity::Model> {
        let recorded = mark::record_mark(&self.db, entry).await;
        self.settle(recorded).await
    }

    /// Appends a batch of marks; one invalid score rejects the whole batch.
    #[instrument(skip(self, entries), fields(count = entries.len()))]
    pub async fn record_marks(&self, entries: Vec<NewMark>) -> Result<usize> {
        let recorded = mark::record_marks(&self.db, entries).await;
        self.settle(recorded).await
    }

    /// Subjects × terms report for one student, or None for an unknown class.
    pub async fn report_card(
        &self,
        student_id: &str,
        class_name: &str,
    ) -> Result<Option<ReportCard>> {
        let report = mark::get_report_card(&self.db, student_id, class_name).await;
        self.settle(report).await
    }

    /// Dashboard headline figures.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        let figures = stats::get_dashboard_stats(&self.db).await;
        debug!("Computed dashboard figures");
        self.settle(figures).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::PaymentMode;
    use crate::test_utils::{date, setup_facade, setup_seeded_db};
    use std::time::Instant;

    #[tokio::test]
    async fn test_calls_resolve_after_latency() -> Result<()> {
        let db = setup_seeded_db().await?;
        let facade = Facade::new(db, Duration::from_millis(30));

        let started = Instant::now();
        let students = facade.students().await?;
        assert_eq!(students.len(), 3);
        assert!(started.elapsed() >= Duration::from_millis(30));
        Ok(())
    }

    #[tokio::test]
    async fn test_fixed_latency_completes_fifo() -> Result<()> {
        let db = setup_seeded_db().await?;
        let facade = Facade::new(db, Duration::from_millis(30));
        let order = std::sync::Mutex::new(Vec::new());

        let first = async {
            facade.classes().await.unwrap();
            order.lock().unwrap().push("classes");
        };
        let second = async {
            facade.students().await.unwrap();
            order.lock().unwrap().push("students");
        };
        tokio::join!(first, second);

        assert_eq!(*order.lock().unwrap(), vec!["classes", "students"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_results_are_copies() -> Result<()> {
        let facade = setup_facade().await?;

        let mut students = facade.students().await?;
        students[0].name = "Changed Locally".to_string();

        let fresh = facade.student("STD0001").await?.unwrap();
        assert_eq!(fresh.name, "Rohan Sharma");
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_lookups_resolve_empty() -> Result<()> {
        let facade = setup_facade().await?;
        assert!(facade.student("STD0404").await?.is_none());
        assert!(facade.class(404).await?.is_none());
        assert!(facade.receipt("INV40404").await?.is_none());
        assert!(facade.student_ledger("STD0404").await?.is_empty());
        assert!(facade.report_card("STD0001", "Class 404").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_payment_visible_on_next_read() -> Result<()> {
        let facade = setup_facade().await?;

        let recorded = facade
            .record_payment(NewPayment {
                student_id: "STD0002".to_string(),
                amount: 1200.0,
                payment_mode: PaymentMode::Cash,
                payment_date: date(2025, 9, 12),
            })
            .await?;

        let summaries = facade.fee_summaries().await?;
        let priya = summaries.iter().find(|s| s.student_id == "STD0002").unwrap();
        assert_eq!(priya.total_due, 0.0);
        assert_eq!(facade.receipt(&recorded.invoice_no).await?.unwrap(), recorded);
        Ok(())
    }
}
