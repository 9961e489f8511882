//! Bulk Employee Import
//!
//! Orchestrates a spreadsheet upload: decode the CSV, then process rows
//! sequentially in file order. Departments and positions are resolved
//! get-or-create by normalized name, memoized for the run so a repeated name
//! costs one lookup. Each row then goes through the same identity resolution
//! and persistence path as single employee creation. A failed row is recorded
//! with its spreadsheet row number and original cells, and the loop continues.

pub mod sheet;

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use tracing::{info, warn};

use crate::db::models::{
    DepartmentCreate, EmployeeCreate, Gender, PositionCreate, Scholarity,
};
use crate::db::repository::{
    DepartmentRepository, EmployeeRepository, PositionRepository, RepoError, RepoResult,
    department::name_key,
};
use crate::utils::AppResult;
use sheet::SheetRow;

/// One failed row: spreadsheet row number, failure message, original cells
#[derive(Debug, Serialize)]
pub struct ImportRowError {
    pub row: usize,
    pub message: String,
    pub data: serde_json::Value,
}

/// Import outcome returned to the client
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub message: String,
    pub success_count: usize,
    pub failed_count: usize,
    pub errors: Vec<ImportRowError>,
}

pub struct ImportService {
    departments: DepartmentRepository,
    positions: PositionRepository,
    employees: EmployeeRepository,
}

impl ImportService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            departments: DepartmentRepository::new(db.clone()),
            positions: PositionRepository::new(db.clone()),
            employees: EmployeeRepository::new(db),
        }
    }

    /// Run a full import for one company.
    ///
    /// A malformed file or header mismatch aborts before any row is
    /// processed; row-level failures are collected and do not stop the run.
    pub async fn run(&self, company: &RecordId, bytes: &[u8]) -> AppResult<ImportSummary> {
        let rows = sheet::decode(bytes)?;
        info!(rows = rows.len(), company = %company, "Starting employee import");

        // Run-scoped get-or-create caches, keyed by normalized name
        let mut department_cache: HashMap<String, RecordId> = HashMap::new();
        let mut position_cache: HashMap<String, RecordId> = HashMap::new();

        let mut success_count = 0;
        let mut errors = Vec::new();

        for row in rows {
            match self
                .import_row(company, &row, &mut department_cache, &mut position_cache)
                .await
            {
                Ok(()) => success_count += 1,
                Err(e) => {
                    warn!(row = row.number, error = %e, "Import row failed");
                    errors.push(ImportRowError {
                        row: row.number,
                        message: e.to_string(),
                        data: row.echo(),
                    });
                }
            }
        }

        let failed_count = errors.len();
        info!(success_count, failed_count, "Employee import finished");
        Ok(ImportSummary {
            message: format!(
                "Import finished: {} imported, {} failed",
                success_count, failed_count
            ),
            success_count,
            failed_count,
            errors,
        })
    }

    async fn import_row(
        &self,
        company: &RecordId,
        row: &SheetRow,
        department_cache: &mut HashMap<String, RecordId>,
        position_cache: &mut HashMap<String, RecordId>,
    ) -> RepoResult<()> {
        let department = self
            .resolve_department(company, &row.department, department_cache)
            .await?;
        let position = self
            .resolve_position(company, &department, &row.position, position_cache)
            .await?;

        let data = EmployeeCreate {
            name: row.name.clone(),
            cpf: row.cpf.clone(),
            department_id: department.to_string(),
            position_id: position.to_string(),
            birth_date: parse_date(&row.birth_date, "Data Nascimento")?,
            admission_date: parse_date(&row.admission_date, "Data Admissão")?,
            gender: Gender::parse(&row.gender).ok_or_else(|| {
                RepoError::Validation(format!("Unknown value for Sexo: '{}'", row.gender))
            })?,
            scholarity: Scholarity::parse(&row.scholarity).ok_or_else(|| {
                RepoError::Validation(format!(
                    "Unknown value for Escolaridade: '{}'",
                    row.scholarity
                ))
            })?,
            is_leader: parse_leader(&row.leader)?,
        };

        self.employees.create(company, data).await?;
        Ok(())
    }

    async fn resolve_department(
        &self,
        company: &RecordId,
        name: &str,
        cache: &mut HashMap<String, RecordId>,
    ) -> RepoResult<RecordId> {
        if name.trim().is_empty() {
            return Err(RepoError::Validation(
                "Departamento must not be empty".to_string(),
            ));
        }
        let cache_key = format!("dep-{}", name_key(name));
        if let Some(id) = cache.get(&cache_key) {
            return Ok(id.clone());
        }

        let department = match self.departments.find_by_name(company, name).await? {
            Some(existing) => existing,
            None => {
                self.departments
                    .create(
                        company,
                        DepartmentCreate {
                            name: name.trim().to_string(),
                        },
                    )
                    .await?
            }
        };
        let id = department
            .id
            .ok_or_else(|| RepoError::Database("Department record has no id".to_string()))?;
        cache.insert(cache_key, id.clone());
        Ok(id)
    }

    async fn resolve_position(
        &self,
        company: &RecordId,
        department: &RecordId,
        name: &str,
        cache: &mut HashMap<String, RecordId>,
    ) -> RepoResult<RecordId> {
        if name.trim().is_empty() {
            return Err(RepoError::Validation("Cargo must not be empty".to_string()));
        }
        let cache_key = format!("pos-{}-{}", department.key(), name_key(name));
        if let Some(id) = cache.get(&cache_key) {
            return Ok(id.clone());
        }

        let position = match self.positions.find_by_name(department, name).await? {
            Some(existing) => existing,
            None => {
                self.positions
                    .create(
                        company,
                        department,
                        PositionCreate {
                            name: name.trim().to_string(),
                        },
                    )
                    .await?
            }
        };
        let id = position
            .id
            .ok_or_else(|| RepoError::Database("Position record has no id".to_string()))?;
        cache.insert(cache_key, id.clone());
        Ok(id)
    }
}

/// Parse a date cell, accepting ISO (`2023-01-02`) and Brazilian
/// (`02/01/2023`) forms.
fn parse_date(value: &str, column: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .map_err(|_| RepoError::Validation(format!("Invalid date for {}: '{}'", column, value)))
}

/// Parse the leader flag ("Sim"/"Não"; empty counts as no)
fn parse_leader(value: &str) -> RepoResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "sim" => Ok(true),
        "não" | "nao" | "" => Ok(false),
        other => Err(RepoError::Validation(format!(
            "Unknown value for Líder: '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_db;

    const HEADER: &str = "Nome Completo,CPF,Email,Telefone,Departamento,Cargo,Data Nascimento,Data Admissão,Sexo,Escolaridade,Líder";

    fn company_id() -> RecordId {
        RecordId::from_table_key("company", "c1")
    }

    #[tokio::test]
    async fn imports_rows_and_creates_hierarchy_on_the_fly() {
        let db = test_db().await;
        let service = ImportService::new(db.clone());
        let sheet = format!(
            "{HEADER}\n\
             Ana Silva Santos,529.982.247-25,ana@acme.com,(11) 91234-5678,Comercial,Vendedor,1990-05-20,2023-01-02,Feminino,ensino_medio,Não\n\
             Bruno Costa Lima,111.444.777-35,bruno@acme.com,(11) 2345-6789,comercial,Gerente,11/03/1985,01/06/2022,Masculino,ensino_superior,Sim\n"
        );

        let summary = service.run(&company_id(), sheet.as_bytes()).await.unwrap();
        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.failed_count, 0);

        // "Comercial" and "comercial" resolve to the same department
        let departments = DepartmentRepository::new(db.clone())
            .find_all(&company_id())
            .await
            .unwrap();
        assert_eq!(departments.len(), 1);

        let positions = PositionRepository::new(db.clone())
            .find_all(departments[0].id.as_ref().unwrap())
            .await
            .unwrap();
        assert_eq!(positions.len(), 2);

        let employees = EmployeeRepository::new(db)
            .find_all(&company_id())
            .await
            .unwrap();
        assert_eq!(employees.len(), 2);
        let bruno = employees.iter().find(|e| e.login == "bruno.lima").unwrap();
        assert!(bruno.is_leader);
    }

    #[tokio::test]
    async fn failed_rows_are_reported_and_do_not_stop_the_run() {
        let db = test_db().await;
        let service = ImportService::new(db.clone());
        // Row 3 reuses Ana's CPF, row 4 has a bad date
        let sheet = format!(
            "{HEADER}\n\
             Ana Silva Santos,529.982.247-25,ana@acme.com,,Comercial,Vendedor,1990-05-20,2023-01-02,Feminino,ensino_medio,Não\n\
             Bruno Costa Lima,529.982.247-25,bruno@acme.com,,Comercial,Vendedor,1985-03-11,2022-06-01,Masculino,ensino_superior,Não\n\
             Carla Dias Rocha,111.444.777-35,carla@acme.com,,Comercial,Vendedor,not-a-date,2022-06-01,Feminino,mestrado,Não\n"
        );

        let summary = service.run(&company_id(), sheet.as_bytes()).await.unwrap();
        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.failed_count, 2);
        assert_eq!(summary.errors[0].row, 3);
        assert_eq!(summary.errors[1].row, 4);
        // Original cells are echoed back for the failed row
        assert_eq!(summary.errors[0].data["Nome Completo"], "Bruno Costa Lima");
    }

    #[tokio::test]
    async fn reimport_reuses_existing_departments_and_positions() {
        let db = test_db().await;
        let service = ImportService::new(db.clone());
        let first = format!(
            "{HEADER}\n\
             Ana Silva Santos,529.982.247-25,ana@acme.com,,Comercial,Vendedor,1990-05-20,2023-01-02,Feminino,ensino_medio,Não\n"
        );
        let second = format!(
            "{HEADER}\n\
             Bruno Costa Lima,111.444.777-35,bruno@acme.com,, COMERCIAL ,vendedor,1985-03-11,2022-06-01,Masculino,ensino_superior,Não\n"
        );

        service.run(&company_id(), first.as_bytes()).await.unwrap();
        let summary = service.run(&company_id(), second.as_bytes()).await.unwrap();
        assert_eq!(summary.success_count, 1);

        // The second run found the existing records by normalized name
        let departments = DepartmentRepository::new(db.clone())
            .find_all(&company_id())
            .await
            .unwrap();
        assert_eq!(departments.len(), 1);
        let positions = PositionRepository::new(db)
            .find_all(departments[0].id.as_ref().unwrap())
            .await
            .unwrap();
        assert_eq!(positions.len(), 1);
    }

    #[tokio::test]
    async fn header_mismatch_aborts_without_processing() {
        let db = test_db().await;
        let service = ImportService::new(db.clone());
        let sheet = "Nome,CPF\nAna Silva,529.982.247-25\n";

        assert!(service.run(&company_id(), sheet.as_bytes()).await.is_err());
        let employees = EmployeeRepository::new(db)
            .find_all(&company_id())
            .await
            .unwrap();
        assert!(employees.is_empty());
    }
}
