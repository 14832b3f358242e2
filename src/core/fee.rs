//! Fee ledger business logic - Charges, payments, and derived balances.
//!
//! The ledger is append-only. A student's balance is never stored: it is folded
//! from their transactions on every read, so it always agrees with the log.
//! Invoice numbers follow one `INV` sequence shared by charges and payments;
//! the next number is the highest existing one plus one, computed inside the
//! same database transaction as the insert.

use crate::{
    core::next_sequence_id,
    entities::{
        FeeTransaction, PaymentMode, Student, StudentStatus, TransactionKind, fee_transaction,
        student,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Invoice number prefix
pub const INVOICE_PREFIX: &str = "INV";
/// Digits in the zero-padded invoice sequence
pub const INVOICE_DIGITS: usize = 5;

/// Midnight UTC on `date`, the timestamp stored for date-only ledger entries.
#[must_use]
pub fn start_of_day(date: NaiveDate) -> DateTimeUtc {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Folds a ledger into a balance: charges minus payments.
///
/// Positive means money is owed, negative means the student paid in advance.
#[must_use]
pub fn balance_of(ledger: &[fee_transaction::Model]) -> f64 {
    ledger
        .iter()
        .map(fee_transaction::Model::signed_amount)
        .sum()
}

/// Balance of an active student, as shown on the fees overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeSummary {
    /// Student id
    pub student_id: String,
    /// Student name
    pub student_name: String,
    /// Class the student belongs to
    pub class_name: String,
    /// Charges minus payments
    pub total_due: f64,
}

/// A payment as entered in the payment form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    /// Paying student
    pub student_id: String,
    /// Amount received, must be positive
    pub amount: f64,
    /// How the money was received
    pub payment_mode: PaymentMode,
    /// Date the money was received
    pub payment_date: NaiveDate,
}

/// Retrieves a student's ledger in chronological order.
pub async fn get_ledger(
    db: &DatabaseConnection,
    student_id: &str,
) -> Result<Vec<fee_transaction::Model>> {
    FeeTransaction::find()
        .filter(fee_transaction::Column::StudentId.eq(student_id))
        .order_by_asc(fee_transaction::Column::Date)
        .order_by_asc(fee_transaction::Column::InvoiceNo)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a transaction by invoice number, returning None if not found.
pub async fn get_transaction_by_invoice(
    db: &DatabaseConnection,
    invoice_no: &str,
) -> Result<Option<fee_transaction::Model>> {
    FeeTransaction::find_by_id(invoice_no.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Computes the balance of every active student by folding each ledger.
pub async fn get_fee_summaries(db: &DatabaseConnection) -> Result<Vec<FeeSummary>> {
    let students = Student::find()
        .filter(student::Column::Status.eq(StudentStatus::Active))
        .order_by_asc(student::Column::Id)
        .all(db)
        .await?;

    let mut summaries = Vec::with_capacity(students.len());
    for s in students {
        let ledger = get_ledger(db, &s.id).await?;
        summaries.push(FeeSummary {
            total_due: balance_of(&ledger),
            student_id: s.id,
            student_name: s.name,
            class_name: s.class_name,
        });
    }
    Ok(summaries)
}

/// Records a payment and returns the new ledger entry.
///
/// Appends exactly one `Payment` whose invoice number is greater than every
/// existing one. The amount must be positive and finite and the student must
/// exist.
pub async fn record_payment(
    db: &DatabaseConnection,
    payment: NewPayment,
) -> Result<fee_transaction::Model> {
    let description = format!("Payment Received ({})", payment.payment_mode);
    append_transaction(
        db,
        &payment.student_id,
        description,
        payment.amount,
        TransactionKind::Payment,
        Some(payment.payment_mode),
        payment.payment_date,
    )
    .await
}

/// Posts a charge (e.g. a fee-structure item) to a student's ledger.
pub async fn charge_fee(
    db: &DatabaseConnection,
    student_id: &str,
    description: String,
    amount: f64,
    date: NaiveDate,
) -> Result<fee_transaction::Model> {
    append_transaction(
        db,
        student_id,
        description,
        amount,
        TransactionKind::Charge,
        None,
        date,
    )
    .await
}

async fn append_transaction(
    db: &DatabaseConnection,
    student_id: &str,
    description: String,
    amount: f64,
    kind: TransactionKind,
    payment_mode: Option<PaymentMode>,
    date: NaiveDate,
) -> Result<fee_transaction::Model> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }

    // Numbering and insert share one transaction
    let txn = db.begin().await?;

    Student::find_by_id(student_id.to_string())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::StudentNotFound {
            id: student_id.to_string(),
        })?;

    let invoice_numbers: Vec<String> = FeeTransaction::find()
        .select_only()
        .column(fee_transaction::Column::InvoiceNo)
        .into_tuple()
        .all(&txn)
        .await?;
    let invoice_no = next_sequence_id(
        INVOICE_PREFIX,
        INVOICE_DIGITS,
        invoice_numbers.iter().map(String::as_str),
    );

    let entry = fee_transaction::ActiveModel {
        invoice_no: Set(invoice_no),
        student_id: Set(student_id.to_string()),
        date: Set(start_of_day(date)),
        description: Set(description),
        amount: Set(amount),
        kind: Set(kind),
        payment_mode: Set(payment_mode),
    };

    let result = entry.insert(&txn).await?;
    txn.commit().await?;

    info!(
        invoice_no = %result.invoice_no,
        student_id = %result.student_id,
        amount = result.amount,
        kind = ?result.kind,
        "Appended fee transaction"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{date, setup_seeded_db};

    fn payment(student_id: &str, amount: f64) -> NewPayment {
        NewPayment {
            student_id: student_id.to_string(),
            amount,
            payment_mode: PaymentMode::Online,
            payment_date: date(2025, 9, 10),
        }
    }

    #[tokio::test]
    async fn test_balance_matches_charges_minus_payments() -> Result<()> {
        let db = setup_seeded_db().await?;

        for s in crate::core::student::get_all_students(&db).await? {
            let ledger = get_ledger(&db, &s.id).await?;
            let charges: f64 = ledger
                .iter()
                .filter(|t| t.kind == TransactionKind::Charge)
                .map(|t| t.amount)
                .sum();
            let payments: f64 = ledger
                .iter()
                .filter(|t| t.kind == TransactionKind::Payment)
                .map(|t| t.amount)
                .sum();
            assert_eq!(balance_of(&ledger), charges - payments);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_fee_summaries_only_active_students() -> Result<()> {
        let db = setup_seeded_db().await?;

        let summaries = get_fee_summaries(&db).await?;
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].student_id, "STD0001");
        assert_eq!(summaries[0].total_due, 0.0);
        assert_eq!(summaries[1].student_id, "STD0002");
        assert_eq!(summaries[1].total_due, 1200.0);

        // Repeated reads are identical
        assert_eq!(get_fee_summaries(&db).await?, summaries);
        Ok(())
    }

    #[tokio::test]
    async fn test_charge_payment_charge_leaves_one_charge_due() -> Result<()> {
        let db = setup_seeded_db().await?;

        // STD0001 already has Charge 1200 + Payment 1200
        charge_fee(&db, "STD0001", "Monthly Fee - 202509".to_string(), 1200.0, date(2025, 9, 30))
            .await?;

        let ledger = get_ledger(&db, "STD0001").await?;
        assert_eq!(ledger.len(), 3);
        assert_eq!(balance_of(&ledger), 1200.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_record_payment_appends_one_with_higher_invoice() -> Result<()> {
        let db = setup_seeded_db().await?;
        let before = FeeTransaction::find().all(&db).await?;

        let recorded = record_payment(&db, payment("STD0002", 700.0)).await?;

        assert_eq!(recorded.invoice_no, "INV00004");
        assert!(before.iter().all(|t| recorded.invoice_no > t.invoice_no));
        assert_eq!(recorded.kind, TransactionKind::Payment);
        assert_eq!(recorded.payment_mode, Some(PaymentMode::Online));
        assert_eq!(recorded.description, "Payment Received (Online)");

        let after = FeeTransaction::find().all(&db).await?;
        assert_eq!(after.len(), before.len() + 1);

        // Read-after-write: the next ledger read reflects the payment
        let ledger = get_ledger(&db, "STD0002").await?;
        assert_eq!(ledger.last().unwrap(), &recorded);
        assert_eq!(balance_of(&ledger), 500.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_record_payment_rejects_bad_amounts() -> Result<()> {
        let db = setup_seeded_db().await?;

        for amount in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let result = record_payment(&db, payment("STD0001", amount)).await;
            assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        }

        assert_eq!(FeeTransaction::find().all(&db).await?.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_record_payment_unknown_student() -> Result<()> {
        let db = setup_seeded_db().await?;
        let result = record_payment(&db, payment("STD0404", 100.0)).await;
        assert!(matches!(result, Err(Error::StudentNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_receipt_lookup() -> Result<()> {
        let db = setup_seeded_db().await?;
        let receipt = get_transaction_by_invoice(&db, "INV00002").await?.unwrap();
        assert_eq!(receipt.payment_mode, Some(PaymentMode::Cash));
        assert!(get_transaction_by_invoice(&db, "INV99999").await?.is_none());
        Ok(())
    }

    #[test]
    fn test_start_of_day_is_midnight_utc() {
        let ts = start_of_day(date(2025, 8, 31));
        assert_eq!(ts.to_rfc3339(), "2025-08-31T00:00:00+00:00");
    }
}
