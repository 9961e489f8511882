//! Position Model
//!
//! Canonical scoping: a position belongs to one department (which belongs to
//! one company). The company reference is carried redundantly for
//! query-by-field lookups.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;

pub type PositionId = RecordId;

/// Position entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<PositionId>,

    pub name: String,

    #[serde(rename = "companyId", with = "serde_helpers::record_id")]
    pub company: RecordId,

    #[serde(rename = "departmentId", with = "serde_helpers::record_id")]
    pub department: RecordId,

    #[serde(rename = "createdAt", default)]
    pub created_at: i64,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: i64,
}

/// Create position payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PositionCreate {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// Update position payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PositionUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
}
