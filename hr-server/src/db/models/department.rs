//! Department Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;

pub type DepartmentId = RecordId;

/// Department entity, scoped under one company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<DepartmentId>,

    pub name: String,

    #[serde(rename = "companyId", with = "serde_helpers::record_id")]
    pub company: RecordId,

    #[serde(rename = "createdAt", default)]
    pub created_at: i64,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: i64,
}

/// Create department payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DepartmentCreate {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// Update department payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DepartmentUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
}
