//! Company Model
//!
//! The root aggregate: departments, positions and employees all hang off a
//! company.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;
use crate::utils::validation::{validate_cnpj_format, validate_phone_format};

pub type CompanyId = RecordId;

/// Focal-point contact of a company
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FocalPoint {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email, length(max = 254))]
    pub email: String,
    #[validate(custom(function = validate_phone_format))]
    pub phone: String,
}

/// Company entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<CompanyId>,

    /// Tax-registration number, externally formatted (XX.XXX.XXX/XXXX-XX)
    pub cnpj: String,

    pub fantasy_name: String,

    pub full_address: String,

    /// Owner name
    pub owner: String,

    pub focal_point: FocalPoint,

    #[serde(rename = "createdAt", default)]
    pub created_at: i64,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: i64,
}

/// Create company payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CompanyCreate {
    #[validate(custom(function = validate_cnpj_format))]
    pub cnpj: String,
    #[validate(length(min = 1, max = 100))]
    pub fantasy_name: String,
    #[validate(length(min = 1, max = 500))]
    pub full_address: String,
    #[validate(length(min = 1, max = 100))]
    pub owner: String,
    #[validate(nested)]
    pub focal_point: FocalPoint,
}

/// Update company payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CompanyUpdate {
    #[validate(custom(function = validate_cnpj_format))]
    pub cnpj: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub fantasy_name: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub full_address: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub owner: Option<String>,
    #[validate(nested)]
    pub focal_point: Option<FocalPoint>,
}

impl CompanyUpdate {
    /// True when the payload carries nothing to change
    pub fn is_empty(&self) -> bool {
        self.cnpj.is_none()
            && self.fantasy_name.is_none()
            && self.full_address.is_none()
            && self.owner.is_none()
            && self.focal_point.is_none()
    }
}
