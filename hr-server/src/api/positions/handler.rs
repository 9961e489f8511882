//! Position API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::record_ref;
use crate::core::ServerState;
use crate::db::models::{Position, PositionCreate, PositionUpdate};
use crate::db::repository::{DepartmentRepository, PositionRepository};
use crate::utils::{AppError, AppResult};

/// GET /api/companies/:company_id/departments/:department_id/positions
pub async fn list(
    State(state): State<ServerState>,
    Path((_company_id, department_id)): Path<(String, String)>,
) -> AppResult<Json<Vec<Position>>> {
    let department = record_ref("department", &department_id)?;
    let repo = PositionRepository::new(state.db.clone());
    let positions = repo.find_all(&department).await?;
    Ok(Json(positions))
}

/// POST /api/companies/:company_id/departments/:department_id/positions
pub async fn create(
    State(state): State<ServerState>,
    Path((company_id, department_id)): Path<(String, String)>,
    Json(payload): Json<PositionCreate>,
) -> AppResult<(StatusCode, Json<Position>)> {
    payload
        .validate()
        .map_err(AppError::from_validation_errors)?;

    let company = record_ref("company", &company_id)?;
    let department_ref = record_ref("department", &department_id)?;

    // The department must exist and hang off the company in the path
    let department = DepartmentRepository::new(state.db.clone())
        .find_by_id(&department_ref.to_string())
        .await?
        .ok_or_else(|| AppError::not_found(format!("Department {} not found", department_id)))?;
    if department.company != company {
        return Err(AppError::invalid(
            "Department does not belong to this company",
        ));
    }

    let repo = PositionRepository::new(state.db.clone());
    let position = repo.create(&company, &department_ref, payload).await?;
    Ok((StatusCode::CREATED, Json(position)))
}

/// PUT .../positions/:id
pub async fn update(
    State(state): State<ServerState>,
    Path((_company_id, _department_id, id)): Path<(String, String, String)>,
    Json(payload): Json<PositionUpdate>,
) -> AppResult<Json<Position>> {
    payload
        .validate()
        .map_err(AppError::from_validation_errors)?;

    let id = record_ref("position", &id)?.to_string();
    let repo = PositionRepository::new(state.db.clone());
    let position = repo.update(&id, payload).await?;
    Ok(Json(position))
}

/// DELETE .../positions/:id - 409 with employees
pub async fn delete(
    State(state): State<ServerState>,
    Path((_company_id, _department_id, id)): Path<(String, String, String)>,
) -> AppResult<StatusCode> {
    let id = record_ref("position", &id)?.to_string();
    let repo = PositionRepository::new(state.db.clone());
    repo.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
