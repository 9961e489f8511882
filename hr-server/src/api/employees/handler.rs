//! Employee API Handlers
//!
//! Creation runs the identity resolution path: derived login, validated CPF,
//! hashed initial password, all persisted atomically with the uniqueness
//! indexes. Duplicate login/CPF surfaces as 409.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::record_ref;
use crate::core::ServerState;
use crate::db::models::{Employee, EmployeeCreate, EmployeeUpdate};
use crate::db::repository::{CompanyRepository, EmployeeRepository};
use crate::utils::{AppError, AppResult};

/// GET /api/companies/:company_id/employees
pub async fn list(
    State(state): State<ServerState>,
    Path(company_id): Path<String>,
) -> AppResult<Json<Vec<Employee>>> {
    let company = record_ref("company", &company_id)?;
    let repo = EmployeeRepository::new(state.db.clone());
    let employees = repo.find_all(&company).await?;
    Ok(Json(employees))
}

/// GET .../employees/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path((_company_id, id)): Path<(String, String)>,
) -> AppResult<Json<Employee>> {
    let id = record_ref("employee", &id)?.to_string();
    let repo = EmployeeRepository::new(state.db.clone());
    let employee = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Employee {} not found", id)))?;
    Ok(Json(employee))
}

/// POST /api/companies/:company_id/employees
pub async fn create(
    State(state): State<ServerState>,
    Path(company_id): Path<String>,
    Json(payload): Json<EmployeeCreate>,
) -> AppResult<(StatusCode, Json<Employee>)> {
    payload
        .validate()
        .map_err(AppError::from_validation_errors)?;

    let company = record_ref("company", &company_id)?;
    CompanyRepository::new(state.db.clone())
        .find_by_id(&company.to_string())
        .await?
        .ok_or_else(|| AppError::not_found(format!("Company {} not found", company_id)))?;

    let repo = EmployeeRepository::new(state.db.clone());
    let employee = repo.create(&company, payload).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

/// PUT .../employees/:id
pub async fn update(
    State(state): State<ServerState>,
    Path((_company_id, id)): Path<(String, String)>,
    Json(payload): Json<EmployeeUpdate>,
) -> AppResult<Json<Employee>> {
    if payload.is_empty() {
        return Err(AppError::invalid("Update payload is empty"));
    }
    payload
        .validate()
        .map_err(AppError::from_validation_errors)?;

    let id = record_ref("employee", &id)?.to_string();
    let repo = EmployeeRepository::new(state.db.clone());
    let employee = repo.update(&id, payload).await?;
    Ok(Json(employee))
}

/// DELETE .../employees/:id - removes profile and identity indexes too
pub async fn delete(
    State(state): State<ServerState>,
    Path((_company_id, id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    let id = record_ref("employee", &id)?.to_string();
    let repo = EmployeeRepository::new(state.db.clone());
    repo.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
