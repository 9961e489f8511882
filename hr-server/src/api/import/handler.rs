//! Bulk Import Handler
//!
//! Accepts a multipart form with a `companyId` field and a `file` field
//! carrying the CSV bytes. The whole file is processed before responding;
//! per-row failures are returned in the summary, not as an error status.

use axum::{
    Json,
    extract::{Multipart, State},
};

use crate::api::record_ref;
use crate::core::ServerState;
use crate::db::repository::CompanyRepository;
use crate::import::{ImportService, ImportSummary};
use crate::utils::{AppError, AppResult};

/// Maximum upload size (5MB)
pub(super) const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// POST /api/import/employees
pub async fn employees(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> AppResult<Json<ImportSummary>> {
    let mut company_id: Option<String> = None;
    let mut file: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("companyId") => {
                company_id = Some(field.text().await?);
            }
            Some("file") => {
                let bytes = field.bytes().await?;
                if bytes.len() > MAX_FILE_SIZE {
                    return Err(AppError::validation(format!(
                        "File too large ({} bytes, max {})",
                        bytes.len(),
                        MAX_FILE_SIZE
                    )));
                }
                file = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let company_id =
        company_id.ok_or_else(|| AppError::validation("Missing form field: companyId"))?;
    let file = file.ok_or_else(|| AppError::validation("Missing form field: file"))?;

    let company = record_ref("company", &company_id)?;
    CompanyRepository::new(state.db.clone())
        .find_by_id(&company.to_string())
        .await?
        .ok_or_else(|| AppError::not_found(format!("Company {} not found", company_id)))?;

    let service = ImportService::new(state.db.clone());
    let summary = service.run(&company, &file).await?;
    Ok(Json(summary))
}
