//! Fee transaction entity - The append-only fee ledger.
//!
//! Each row is either a `Charge` (money owed) or a `Payment` (money received).
//! Balances are never stored; they are folded from these rows on every read.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Direction of a ledger entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TransactionKind {
    /// Fee owed by the student
    #[sea_orm(string_value = "Charge")]
    Charge,
    /// Money received from the student
    #[sea_orm(string_value = "Payment")]
    Payment,
}

/// How a payment was made
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PaymentMode {
    /// Paid at the school office
    #[sea_orm(string_value = "Cash")]
    Cash,
    /// Bank transfer or card
    #[sea_orm(string_value = "Online")]
    Online,
}

impl PaymentMode {
    /// Every accepted payment mode, in form order
    pub const ALL: [Self; 2] = [Self::Cash, Self::Online];

    /// Label used in forms and ledger descriptions
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Online => "Online",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMode {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::errors::Error::Validation {
                message: format!("Unknown payment mode: {s}"),
            })
    }
}

/// Fee transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fee_transactions")]
pub struct Model {
    /// Invoice number of the form `INV00001`
    #[sea_orm(primary_key, auto_increment = false)]
    pub invoice_no: String,
    /// Student this entry belongs to
    pub student_id: String,
    /// When the charge was raised or the payment received
    pub date: DateTimeUtc,
    /// Human-readable description (e.g. "Monthly Fee - 202508")
    pub description: String,
    /// Amount in rupees, always positive
    pub amount: f64,
    /// Charge or payment
    pub kind: TransactionKind,
    /// Payment mode, `None` for charges
    pub payment_mode: Option<PaymentMode>,
}

impl Model {
    /// Contribution of this entry to the student's balance
    #[must_use]
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Charge => self.amount,
            TransactionKind::Payment => -self.amount,
        }
    }
}

/// Defines relationships between FeeTransaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one student
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
