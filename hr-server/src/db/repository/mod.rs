//! Repository Module
//!
//! CRUD operations over the SurrealDB tables, including the referential
//! integrity guards and the transactional identity-uniqueness writes.

pub mod company;
pub mod department;
pub mod employee;
pub mod position;
pub mod survey;

pub use company::CompanyRepository;
pub use department::DepartmentRepository;
pub use employee::EmployeeRepository;
pub use position::PositionRepository;
pub use survey::SurveyRepository;

use serde::Deserialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Referential-integrity conflict (delete blocked by dependents)
    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    #[allow(dead_code)]
    count: i64,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }

    /// Parse a "table:id" string into a RecordId, as a validation error
    pub fn parse_id(id: &str) -> RepoResult<RecordId> {
        id.parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))
    }

    /// True when at least one row of `table` references `id` through `field`.
    ///
    /// A failed query propagates as a database error; it is never treated as
    /// "no references".
    pub async fn has_reference(
        &self,
        table: &str,
        field: &str,
        id: &RecordId,
    ) -> RepoResult<bool> {
        // table/field come from repository code, never from user input
        let sql = format!(
            "SELECT count() AS count FROM {} WHERE {} = $id LIMIT 1",
            table, field
        );
        let mut result = self.db.query(sql).bind(("id", id.clone())).await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(!rows.is_empty())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use surrealdb::Surreal;
    use surrealdb::engine::local::{Db, Mem};

    /// Fresh in-memory database for repository tests
    pub async fn test_db() -> Surreal<Db> {
        let db = Surreal::new::<Mem>(()).await.expect("in-memory db");
        db.use_ns("test").use_db("test").await.expect("namespace");
        db
    }
}
