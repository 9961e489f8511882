//! Department API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::record_ref;
use crate::core::ServerState;
use crate::db::models::{Department, DepartmentCreate, DepartmentUpdate};
use crate::db::repository::{CompanyRepository, DepartmentRepository};
use crate::utils::{AppError, AppResult};

/// GET /api/companies/:company_id/departments
pub async fn list(
    State(state): State<ServerState>,
    Path(company_id): Path<String>,
) -> AppResult<Json<Vec<Department>>> {
    let company = record_ref("company", &company_id)?;
    let repo = DepartmentRepository::new(state.db.clone());
    let departments = repo.find_all(&company).await?;
    Ok(Json(departments))
}

/// POST /api/companies/:company_id/departments
pub async fn create(
    State(state): State<ServerState>,
    Path(company_id): Path<String>,
    Json(payload): Json<DepartmentCreate>,
) -> AppResult<(StatusCode, Json<Department>)> {
    payload
        .validate()
        .map_err(AppError::from_validation_errors)?;

    let company = record_ref("company", &company_id)?;
    CompanyRepository::new(state.db.clone())
        .find_by_id(&company.to_string())
        .await?
        .ok_or_else(|| AppError::not_found(format!("Company {} not found", company_id)))?;

    let repo = DepartmentRepository::new(state.db.clone());
    let department = repo.create(&company, payload).await?;
    Ok((StatusCode::CREATED, Json(department)))
}

/// PUT /api/companies/:company_id/departments/:id
pub async fn update(
    State(state): State<ServerState>,
    Path((_company_id, id)): Path<(String, String)>,
    Json(payload): Json<DepartmentUpdate>,
) -> AppResult<Json<Department>> {
    payload
        .validate()
        .map_err(AppError::from_validation_errors)?;

    let id = record_ref("department", &id)?.to_string();
    let repo = DepartmentRepository::new(state.db.clone());
    let department = repo.update(&id, payload).await?;
    Ok(Json(department))
}

/// DELETE /api/companies/:company_id/departments/:id - 409 with employees
pub async fn delete(
    State(state): State<ServerState>,
    Path((_company_id, id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    let id = record_ref("department", &id)?.to_string();
    let repo = DepartmentRepository::new(state.db.clone());
    repo.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
