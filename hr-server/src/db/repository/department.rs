//! Department Repository
//!
//! Departments are scoped under one company. Names are unique per company
//! (compared trimmed and case-insensitively), and a department cannot be
//! deleted while employees still reference it.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Department, DepartmentCreate, DepartmentUpdate, now_millis};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

/// Lookup key for per-company name uniqueness: trimmed, lowercased
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Clone)]
pub struct DepartmentRepository {
    base: BaseRepository,
}

impl DepartmentRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(&self, company: &RecordId) -> RepoResult<Vec<Department>> {
        let departments: Vec<Department> = self
            .base
            .db()
            .query("SELECT * FROM department WHERE companyId = $company ORDER BY name")
            .bind(("company", company.clone()))
            .await?
            .take(0)?;
        Ok(departments)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Department>> {
        let thing = BaseRepository::parse_id(id)?;
        let department: Option<Department> = self.base.db().select(thing).await?;
        Ok(department)
    }

    /// Find a department by display name within a company, using the
    /// normalized lookup key.
    pub async fn find_by_name(
        &self,
        company: &RecordId,
        name: &str,
    ) -> RepoResult<Option<Department>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM department
                 WHERE companyId = $company AND string::lowercase(string::trim(name)) = $key
                 LIMIT 1",
            )
            .bind(("company", company.clone()))
            .bind(("key", name_key(name)))
            .await?;
        let departments: Vec<Department> = result.take(0)?;
        Ok(departments.into_iter().next())
    }

    pub async fn create(
        &self,
        company: &RecordId,
        data: DepartmentCreate,
    ) -> RepoResult<Department> {
        if self.find_by_name(company, &data.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Department '{}' already exists in this company",
                data.name.trim()
            )));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE department SET
                    name = $name,
                    companyId = $company,
                    createdAt = $now,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("name", data.name.trim().to_string()))
            .bind(("company", company.clone()))
            .bind(("now", now_millis()))
            .await?;

        let created: Option<Department> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create department".to_string()))
    }

    /// Update a department. A name change is propagated to the denormalized
    /// `departmentName` copies on employees in the same transaction.
    pub async fn update(&self, id: &str, data: DepartmentUpdate) -> RepoResult<Department> {
        let thing = BaseRepository::parse_id(id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Department {} not found", id)))?;

        let Some(new_name) = data.name else {
            return Ok(existing);
        };

        if name_key(&new_name) != name_key(&existing.name)
            && self
                .find_by_name(&existing.company, &new_name)
                .await?
                .is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Department '{}' already exists in this company",
                new_name.trim()
            )));
        }

        self.base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                UPDATE $thing SET name = $name, updatedAt = $now;
                UPDATE employee SET departmentName = $name, updatedAt = $now
                    WHERE departmentId = $thing;
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
            .ok_or_else(|| RepoError::NotFound(format!("Department {} not found", id)))
    }

    /// Delete a department. Fails with a conflict while employees reference it.
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let thing = BaseRepository::parse_id(id)?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Department {} not found", id)))?;

        if self
            .base
            .has_reference("employee", "departmentId", &thing)
            .await?
        {
            return Err(RepoError::Conflict(
                "Cannot delete department: employees are still assigned to it".to_string(),
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

    fn company_id() -> RecordId {
        RecordId::from_table_key("company", "c1")
    }

    #[tokio::test]
    async fn name_is_unique_per_company_case_insensitive() {
        let repo = DepartmentRepository::new(test_db().await);
        repo.create(
            &company_id(),
            DepartmentCreate {
                name: "Recursos Humanos".to_string(),
            },
        )
        .await
        .unwrap();

        let dup = repo
            .create(
                &company_id(),
                DepartmentCreate {
                    name: "  recursos humanos ".to_string(),
                },
            )
            .await;
        assert!(matches!(dup, Err(RepoError::Duplicate(_))));

        // Same name under another company is fine
        let other = RecordId::from_table_key("company", "c2");
        assert!(
            repo.create(
                &other,
                DepartmentCreate {
                    name: "Recursos Humanos".to_string(),
                },
            )
            .await
            .is_ok()
        );
    }

    #[tokio::test]
    async fn find_by_name_normalizes_key() {
        let repo = DepartmentRepository::new(test_db().await);
        let created = repo
            .create(
                &company_id(),
                DepartmentCreate {
                    name: "Comercial".to_string(),
                },
            )
            .await
            .unwrap();

        let found = repo
            .find_by_name(&company_id(), "  COMERCIAL  ")
            .await
            .unwrap()
            .expect("should find by normalized name");
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn delete_without_employees_succeeds() {
        let repo = DepartmentRepository::new(test_db().await);
        let created = repo
            .create(
                &company_id(),
                DepartmentCreate {
                    name: "Financeiro".to_string(),
                },
            )
            .await
            .unwrap();
        let id = created.id.unwrap().to_string();
        repo.delete(&id).await.unwrap();
        assert!(repo.find_by_id(&id).await.unwrap().is_none());
    }
}
