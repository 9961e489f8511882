//! Employee Model
//!
//! The employee document carries non-owning references to its department and
//! position plus denormalized copies of their display names, kept consistent
//! at write time by the repositories.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;

pub type EmployeeId = RecordId;

/// Gender enum (source locale values)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    Masculino,
    Feminino,
}

impl Gender {
    /// Parse a spreadsheet cell value
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Masculino" => Some(Self::Masculino),
            "Feminino" => Some(Self::Feminino),
            _ => None,
        }
    }
}

/// Education level enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Scholarity {
    EnsinoFundamental,
    EnsinoMedio,
    EnsinoSuperior,
    PosGraduacao,
    Mestrado,
    Doutorado,
}

impl Scholarity {
    /// Parse a spreadsheet cell value
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "ensino_fundamental" => Some(Self::EnsinoFundamental),
            "ensino_medio" => Some(Self::EnsinoMedio),
            "ensino_superior" => Some(Self::EnsinoSuperior),
            "pos_graduacao" => Some(Self::PosGraduacao),
            "mestrado" => Some(Self::Mestrado),
            "doutorado" => Some(Self::Doutorado),
            _ => None,
        }
    }
}

/// Employee entity matching the persisted document shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<EmployeeId>,

    pub name: String,

    /// National-ID, digits-only, stored post-validation
    pub cpf: String,

    pub birth_date: NaiveDate,
    pub admission_date: NaiveDate,

    pub gender: Gender,
    pub scholarity: Scholarity,

    #[serde(rename = "isLeader", default, deserialize_with = "serde_helpers::bool_false")]
    pub is_leader: bool,

    #[serde(rename = "companyId", with = "serde_helpers::record_id")]
    pub company: RecordId,
    #[serde(rename = "departmentId", with = "serde_helpers::record_id")]
    pub department: RecordId,
    #[serde(rename = "positionId", with = "serde_helpers::record_id")]
    pub position: RecordId,

    /// Denormalized display names, copied at write time
    #[serde(rename = "departmentName")]
    pub department_name: String,
    #[serde(rename = "positionName")]
    pub position_name: String,

    /// Derived sign-in handle, globally unique
    pub login: String,

    /// Argon2 hash of the initial password; never serialized out
    #[serde(skip_serializing)]
    pub hash_pass: String,

    /// Role tag, defaulted to "employee"
    pub role: String,

    #[serde(rename = "createdAt", default)]
    pub created_at: i64,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: i64,
}

/// Create employee payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmployeeCreate {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1))]
    pub cpf: String,
    #[serde(rename = "departmentId")]
    pub department_id: String,
    #[serde(rename = "positionId")]
    pub position_id: String,
    pub birth_date: NaiveDate,
    pub admission_date: NaiveDate,
    pub gender: Gender,
    pub scholarity: Scholarity,
    #[serde(rename = "isLeader")]
    pub is_leader: bool,
}

/// Update employee payload
///
/// Identity fields (cpf, login, password) are fixed at creation and not
/// updatable through this route.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct EmployeeUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[serde(rename = "departmentId")]
    pub department_id: Option<String>,
    #[serde(rename = "positionId")]
    pub position_id: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub admission_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub scholarity: Option<Scholarity>,
    #[serde(rename = "isLeader")]
    pub is_leader: Option<bool>,
}

impl EmployeeUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.department_id.is_none()
            && self.position_id.is_none()
            && self.birth_date.is_none()
            && self.admission_date.is_none()
            && self.gender.is_none()
            && self.scholarity.is_none()
            && self.is_leader.is_none()
    }
}

/// Companion user-profile record, deleted atomically with its employee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub login: String,
    #[serde(with = "serde_helpers::record_id")]
    pub employee: RecordId,
}

impl Employee {
    /// Hash a password using argon2
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }

    /// Verify a password against the stored argon2 hash
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHash, PasswordVerifier},
        };

        let parsed_hash = PasswordHash::new(&self.hash_pass)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
