//! Survey Models
//!
//! Early-stage assessment module: questionnaire templates, campaigns with a
//! participant list and a date window, and anonymized-on-read responses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;

/// Question kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Scale,
    Text,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyQuestion {
    pub text: String,
    pub kind: QuestionKind,
}

/// Questionnaire definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyTemplate {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub title: String,
    pub questions: Vec<SurveyQuestion>,
    #[serde(rename = "createdAt", default)]
    pub created_at: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SurveyTemplateCreate {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(min = 1))]
    pub questions: Vec<SurveyQuestion>,
}

/// A campaign runs one template against a set of participants inside a date
/// window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyCampaign {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(rename = "companyId", with = "serde_helpers::record_id")]
    pub company: RecordId,
    #[serde(rename = "templateId", with = "serde_helpers::record_id")]
    pub template: RecordId,
    pub title: String,
    pub starts_at: NaiveDate,
    pub ends_at: NaiveDate,
    #[serde(with = "serde_helpers::record_id_vec")]
    pub participants: Vec<RecordId>,
    #[serde(rename = "createdAt", default)]
    pub created_at: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SurveyCampaignCreate {
    #[serde(rename = "templateId")]
    pub template_id: String,
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    pub starts_at: NaiveDate,
    pub ends_at: NaiveDate,
    /// Employee ids ("employee:key" strings)
    #[validate(length(min = 1))]
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyAnswer {
    /// Index into the template's question list
    pub question: usize,
    pub value: String,
}

/// A submitted response. The assessor reference is persisted for the
/// one-response-per-assessor constraint but never serialized out, so reads
/// are anonymous by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyResponse {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(rename = "campaignId", with = "serde_helpers::record_id")]
    pub campaign: RecordId,
    #[serde(
        skip_serializing,
        deserialize_with = "serde_helpers::record_id::deserialize"
    )]
    pub assessor: RecordId,
    pub answers: Vec<SurveyAnswer>,
    #[serde(rename = "createdAt", default)]
    pub created_at: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SurveyResponseCreate {
    /// Employee id of the assessor ("employee:key")
    #[serde(rename = "assessorId")]
    pub assessor_id: String,
    #[validate(length(min = 1))]
    pub answers: Vec<SurveyAnswer>,
}
