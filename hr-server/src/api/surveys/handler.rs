//! Survey API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::record_ref;
use crate::core::ServerState;
use crate::db::models::{
    SurveyCampaign, SurveyCampaignCreate, SurveyResponse, SurveyResponseCreate, SurveyTemplate,
    SurveyTemplateCreate,
};
use crate::db::repository::SurveyRepository;
use crate::utils::{AppError, AppResult};

/// GET /api/survey-templates
pub async fn list_templates(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<SurveyTemplate>>> {
    let repo = SurveyRepository::new(state.db.clone());
    let templates = repo.find_templates().await?;
    Ok(Json(templates))
}

/// POST /api/survey-templates
pub async fn create_template(
    State(state): State<ServerState>,
    Json(payload): Json<SurveyTemplateCreate>,
) -> AppResult<(StatusCode, Json<SurveyTemplate>)> {
    payload
        .validate()
        .map_err(AppError::from_validation_errors)?;

    let repo = SurveyRepository::new(state.db.clone());
    let template = repo.create_template(payload).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

/// GET /api/companies/:company_id/survey-campaigns
pub async fn list_campaigns(
    State(state): State<ServerState>,
    Path(company_id): Path<String>,
) -> AppResult<Json<Vec<SurveyCampaign>>> {
    let company = record_ref("company", &company_id)?;
    let repo = SurveyRepository::new(state.db.clone());
    let campaigns = repo.find_campaigns(&company).await?;
    Ok(Json(campaigns))
}

/// POST /api/companies/:company_id/survey-campaigns
pub async fn create_campaign(
    State(state): State<ServerState>,
    Path(company_id): Path<String>,
    Json(payload): Json<SurveyCampaignCreate>,
) -> AppResult<(StatusCode, Json<SurveyCampaign>)> {
    payload
        .validate()
        .map_err(AppError::from_validation_errors)?;

    let company = record_ref("company", &company_id)?;
    let repo = SurveyRepository::new(state.db.clone());
    let campaign = repo.create_campaign(&company, payload).await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

/// GET .../survey-campaigns/:id
pub async fn get_campaign(
    State(state): State<ServerState>,
    Path((_company_id, id)): Path<(String, String)>,
) -> AppResult<Json<SurveyCampaign>> {
    let id = record_ref("survey_campaign", &id)?.to_string();
    let repo = SurveyRepository::new(state.db.clone());
    let campaign = repo
        .find_campaign_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Campaign {} not found", id)))?;
    Ok(Json(campaign))
}

/// DELETE .../survey-campaigns/:id - removes its responses too
pub async fn delete_campaign(
    State(state): State<ServerState>,
    Path((_company_id, id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    let id = record_ref("survey_campaign", &id)?.to_string();
    let repo = SurveyRepository::new(state.db.clone());
    repo.delete_campaign(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST .../survey-campaigns/:id/responses - once per assessor, inside the window
pub async fn create_response(
    State(state): State<ServerState>,
    Path((_company_id, id)): Path<(String, String)>,
    Json(payload): Json<SurveyResponseCreate>,
) -> AppResult<(StatusCode, Json<SurveyResponse>)> {
    payload
        .validate()
        .map_err(AppError::from_validation_errors)?;

    let id = record_ref("survey_campaign", &id)?.to_string();
    let repo = SurveyRepository::new(state.db.clone());
    let response = repo.create_response(&id, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET .../survey-campaigns/:id/responses - anonymized
pub async fn list_responses(
    State(state): State<ServerState>,
    Path((_company_id, id)): Path<(String, String)>,
) -> AppResult<Json<Vec<SurveyResponse>>> {
    let id = record_ref("survey_campaign", &id)?.to_string();
    let repo = SurveyRepository::new(state.db.clone());
    let responses = repo.find_responses(&id).await?;
    Ok(Json(responses))
}
