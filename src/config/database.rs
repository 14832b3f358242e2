//! Record store configuration module for `SchoolDesk`.
//!
//! The store is an in-memory `SQLite` database reached through `SeaORM`. Tables
//! are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs.

use crate::entities::{FeeTransaction, Mark, SchoolClass, Student, User};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Default store URL: a private in-memory database
pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";

/// Gets the store URL from `DATABASE_URL`, falling back to an in-memory database.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Opens a connection to the record store at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates every table using `SeaORM`'s schema generation from entity definitions.
///
/// Students are created before the tables that reference them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let user_table = schema.create_table_from_entity(User);
    let class_table = schema.create_table_from_entity(SchoolClass);
    let student_table = schema.create_table_from_entity(Student);
    let fee_table = schema.create_table_from_entity(FeeTransaction);
    let mark_table = schema.create_table_from_entity(Mark);

    db.execute(builder.build(&user_table)).await?;
    db.execute(builder.build(&class_table)).await?;
    db.execute(builder.build(&student_table)).await?;
    db.execute(builder.build(&fee_table)).await?;
    db.execute(builder.build(&mark_table)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        FeeTransactionModel, MarkModel, SchoolClassModel, StudentModel, UserModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = create_connection(DEFAULT_DATABASE_URL).await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<UserModel> = User::find().limit(1).all(&db).await?;
        let _: Vec<SchoolClassModel> = SchoolClass::find().limit(1).all(&db).await?;
        let _: Vec<StudentModel> = Student::find().limit(1).all(&db).await?;
        let _: Vec<FeeTransactionModel> = FeeTransaction::find().limit(1).all(&db).await?;
        let _: Vec<MarkModel> = Mark::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_twice_fails() -> Result<()> {
        let db = create_connection(DEFAULT_DATABASE_URL).await?;
        create_tables(&db).await?;
        assert!(create_tables(&db).await.is_err());
        Ok(())
    }
}
