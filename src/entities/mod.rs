//! Entity module - Contains all SeaORM entity definitions for the record store.
//! These entities represent the tables of the in-memory school database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod fee_transaction;
pub mod mark;
pub mod school_class;
pub mod student;
pub mod user;

// Re-export specific types to avoid conflicts
pub use fee_transaction::{
    Column as FeeTransactionColumn, Entity as FeeTransaction, Model as FeeTransactionModel,
    PaymentMode, TransactionKind,
};
pub use mark::{Column as MarkColumn, Entity as Mark, Model as MarkModel};
pub use school_class::{
    Column as SchoolClassColumn, Entity as SchoolClass, Model as SchoolClassModel,
};
pub use student::{Column as StudentColumn, Entity as Student, Model as StudentModel, StudentStatus};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, Role};
