//! Company Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Company, CompanyCreate, CompanyUpdate, now_millis};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct CompanyRepository {
    base: BaseRepository,
}

impl CompanyRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Company>> {
        let companies: Vec<Company> = self
            .base
            .db()
            .query("SELECT * FROM company ORDER BY fantasy_name")
            .await?
            .take(0)?;
        Ok(companies)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Company>> {
        let thing = BaseRepository::parse_id(id)?;
        let company: Option<Company> = self.base.db().select(thing).await?;
        Ok(company)
    }

    async fn find_by_cnpj(&self, cnpj: &str) -> RepoResult<Option<Company>> {
        let cnpj_owned = cnpj.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM company WHERE cnpj = $cnpj LIMIT 1")
            .bind(("cnpj", cnpj_owned))
            .await?;
        let companies: Vec<Company> = result.take(0)?;
        Ok(companies.into_iter().next())
    }

    /// Create a new company. CNPJ must be unique across the system.
    pub async fn create(&self, data: CompanyCreate) -> RepoResult<Company> {
        if self.find_by_cnpj(&data.cnpj).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "CNPJ '{}' is already registered",
                data.cnpj
            )));
        }

        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE company SET
                    cnpj = $cnpj,
                    fantasy_name = $fantasy_name,
                    full_address = $full_address,
                    owner = $owner,
                    focal_point = $focal_point,
                    createdAt = $now,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("cnpj", data.cnpj))
            .bind(("fantasy_name", data.fantasy_name))
            .bind(("full_address", data.full_address))
            .bind(("owner", data.owner))
            .bind(("focal_point", data.focal_point))
            .bind(("now", now))
            .await?;

        let created: Option<Company> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create company".to_string()))
    }

    pub async fn update(&self, id: &str, data: CompanyUpdate) -> RepoResult<Company> {
        let thing = BaseRepository::parse_id(id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Company {} not found", id)))?;

        // Changing the CNPJ must not collide with another company
        if let Some(ref new_cnpj) = data.cnpj
            && new_cnpj != &existing.cnpj
            && self.find_by_cnpj(new_cnpj).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "CNPJ '{}' is already registered",
                new_cnpj
            )));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    cnpj = $cnpj OR cnpj,
                    fantasy_name = $fantasy_name OR fantasy_name,
                    full_address = $full_address OR full_address,
                    owner = $owner OR owner,
                    focal_point = $focal_point OR focal_point,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("cnpj", data.cnpj))
            .bind(("fantasy_name", data.fantasy_name))
            .bind(("full_address", data.full_address))
            .bind(("owner", data.owner))
            .bind(("focal_point", data.focal_point))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<Company>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Company {} not found", id)))
    }

    /// Delete a company.
    ///
    /// Blocked while any department, position or employee still references it;
    /// the store does not cascade-delete descendants.
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let thing = BaseRepository::parse_id(id)?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Company {} not found", id)))?;

        for table in ["employee", "position", "department"] {
            if self.base.has_reference(table, "companyId", &thing).await? {
                return Err(RepoError::Conflict(format!(
                    "Cannot delete company: {} records still reference it",
                    table
                )));
            }
        }

        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(())
    }
}
