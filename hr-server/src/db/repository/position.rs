//! Position Repository
//!
//! Positions are scoped under one department. Same guard rules as
//! departments: per-department name uniqueness, delete blocked while
//! employees reference the position.

use super::department::name_key;
use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Position, PositionCreate, PositionUpdate, now_millis};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

#[derive(Clone)]
pub struct PositionRepository {
    base: BaseRepository,
}

impl PositionRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(&self, department: &RecordId) -> RepoResult<Vec<Position>> {
        let positions: Vec<Position> = self
            .base
            .db()
            .query("SELECT * FROM position WHERE departmentId = $department ORDER BY name")
            .bind(("department", department.clone()))
            .await?
            .take(0)?;
        Ok(positions)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Position>> {
        let thing = BaseRepository::parse_id(id)?;
        let position: Option<Position> = self.base.db().select(thing).await?;
        Ok(position)
    }

    /// Find a position by display name within a department
    pub async fn find_by_name(
        &self,
        department: &RecordId,
        name: &str,
    ) -> RepoResult<Option<Position>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM position
                 WHERE departmentId = $department
                   AND string::lowercase(string::trim(name)) = $key
                 LIMIT 1",
            )
            .bind(("department", department.clone()))
            .bind(("key", name_key(name)))
            .await?;
        let positions: Vec<Position> = result.take(0)?;
        Ok(positions.into_iter().next())
    }

    pub async fn create(
        &self,
        company: &RecordId,
        department: &RecordId,
        data: PositionCreate,
    ) -> RepoResult<Position> {
        if self.find_by_name(department, &data.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Position '{}' already exists in this department",
                data.name.trim()
            )));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE position SET
                    name = $name,
                    companyId = $company,
                    departmentId = $department,
                    createdAt = $now,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("name", data.name.trim().to_string()))
            .bind(("company", company.clone()))
            .bind(("department", department.clone()))
            .bind(("now", now_millis()))
            .await?;

        let created: Option<Position> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create position".to_string()))
    }

    /// Update a position. A name change is propagated to the denormalized
    /// `positionName` copies on employees in the same transaction.
    pub async fn update(&self, id: &str, data: PositionUpdate) -> RepoResult<Position> {
        let thing = BaseRepository::parse_id(id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Position {} not found", id)))?;

        let Some(new_name) = data.name else {
            return Ok(existing);
        };

        if name_key(&new_name) != name_key(&existing.name)
            && self
                .find_by_name(&existing.department, &new_name)
                .await?
                .is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Position '{}' already exists in this department",
                new_name.trim()
            )));
        }

        self.base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                UPDATE $thing SET name = $name, updatedAt = $now;
                UPDATE employee SET positionName = $name, updatedAt = $now
                    WHERE positionId = $thing;
                COMMIT TRANSACTION;"#,
            )
            .bind(("thing", thing.clone()))
            .bind(("name", new_name.trim().to_string()))
            .bind(("now", now_millis()))
            .await?
            .check()
            .map_err(|e| RepoError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Position {} not found", id)))
    }

    /// Delete a position. Fails with a conflict while employees reference it.
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let thing = BaseRepository::parse_id(id)?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Position {} not found", id)))?;

        if self
            .base
            .has_reference("employee", "positionId", &thing)
            .await?
        {
            return Err(RepoError::Conflict(
                "Cannot delete position: employees are still assigned to it".to_string(),
            ));
        }

        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_db;

    fn ids() -> (RecordId, RecordId) {
        (
            RecordId::from_table_key("company", "c1"),
            RecordId::from_table_key("department", "d1"),
        )
    }

    #[tokio::test]
    async fn positions_are_scoped_to_departments() {
        let repo = PositionRepository::new(test_db().await);
        let (company, dept) = ids();
        repo.create(
            &company,
            &dept,
            PositionCreate {
                name: "Analista".to_string(),
            },
        )
        .await
        .unwrap();

        let dup = repo
            .create(
                &company,
                &dept,
                PositionCreate {
                    name: "analista".to_string(),
                },
            )
            .await;
        assert!(matches!(dup, Err(RepoError::Duplicate(_))));

        // Same name under a different department is allowed
        let other_dept = RecordId::from_table_key("department", "d2");
        assert!(
            repo.create(
                &company,
                &other_dept,
                PositionCreate {
                    name: "Analista".to_string(),
                },
            )
            .await
            .is_ok()
        );

        let listed = repo.find_all(&dept).await.unwrap();
        assert_eq!(listed.len(), 1);
    }
}
