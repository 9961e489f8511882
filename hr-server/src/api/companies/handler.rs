//! Company API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::{Company, CompanyCreate, CompanyUpdate};
use crate::db::repository::CompanyRepository;
use crate::utils::{AppError, AppResult};

/// GET /api/companies - list all companies
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Company>>> {
    let repo = CompanyRepository::new(state.db.clone());
    let companies = repo.find_all().await?;
    Ok(Json(companies))
}

/// GET /api/companies/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Company>> {
    let id = crate::api::record_ref("company", &id)?.to_string();
    let repo = CompanyRepository::new(state.db.clone());
    let company = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Company {} not found", id)))?;
    Ok(Json(company))
}

/// POST /api/companies
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CompanyCreate>,
) -> AppResult<(StatusCode, Json<Company>)> {
    payload
        .validate()
        .map_err(AppError::from_validation_errors)?;

    let repo = CompanyRepository::new(state.db.clone());
    let company = repo.create(payload).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// PUT /api/companies/:id
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<CompanyUpdate>,
) -> AppResult<Json<Company>> {
    if payload.is_empty() {
        return Err(AppError::invalid("Update payload is empty"));
    }
    payload
        .validate()
        .map_err(AppError::from_validation_errors)?;

    let id = crate::api::record_ref("company", &id)?.to_string();
    let repo = CompanyRepository::new(state.db.clone());
    let company = repo.update(&id, payload).await?;
    Ok(Json(company))
}

/// DELETE /api/companies/:id - blocked while dependents exist
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = crate::api::record_ref("company", &id)?.to_string();
    let repo = CompanyRepository::new(state.db.clone());
    repo.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
