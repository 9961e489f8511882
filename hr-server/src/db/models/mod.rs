//! Data models matching the SurrealDB schema

pub mod company;
pub mod department;
pub mod employee;
pub mod position;
pub mod serde_helpers;
pub mod survey;

pub use company::{Company, CompanyCreate, CompanyId, CompanyUpdate, FocalPoint};
pub use department::{Department, DepartmentCreate, DepartmentId, DepartmentUpdate};
pub use employee::{
    Employee, EmployeeCreate, EmployeeId, EmployeeUpdate, Gender, Scholarity, UserProfile,
};
pub use position::{Position, PositionCreate, PositionId, PositionUpdate};
pub use survey::{
    QuestionKind, SurveyAnswer, SurveyCampaign, SurveyCampaignCreate, SurveyQuestion,
    SurveyResponse, SurveyResponseCreate, SurveyTemplate, SurveyTemplateCreate,
};

/// Server-side timestamp in unix millis
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
