//! Survey Repository
//!
//! Templates, campaigns and responses. A response is accepted only from a
//! campaign participant inside the campaign's date window, once per assessor;
//! the once-per-assessor rule is enforced with a composite-key index record
//! written in the same transaction as the response.

use chrono::{NaiveDate, Utc};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{
    Employee, SurveyCampaign, SurveyCampaignCreate, SurveyResponse, SurveyResponseCreate,
    SurveyTemplate, SurveyTemplateCreate, now_millis,
};

#[derive(Clone)]
pub struct SurveyRepository {
    base: BaseRepository,
}

impl SurveyRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    // ========== Templates ==========

    pub async fn create_template(&self, data: SurveyTemplateCreate) -> RepoResult<SurveyTemplate> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE survey_template SET
                    title = $title,
                    questions = $questions,
                    createdAt = $now
                RETURN AFTER"#,
            )
            .bind(("title", data.title.trim().to_string()))
            .bind(("questions", data.questions))
            .bind(("now", now_millis()))
            .await?;

        let created: Option<SurveyTemplate> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create survey template".to_string()))
    }

    pub async fn find_templates(&self) -> RepoResult<Vec<SurveyTemplate>> {
        let templates: Vec<SurveyTemplate> = self
            .base
            .db()
            .query("SELECT * FROM survey_template ORDER BY title")
            .await?
            .take(0)?;
        Ok(templates)
    }

    pub async fn find_template_by_id(&self, id: &str) -> RepoResult<Option<SurveyTemplate>> {
        let thing = BaseRepository::parse_id(id)?;
        let template: Option<SurveyTemplate> = self.base.db().select(thing).await?;
        Ok(template)
    }

    // ========== Campaigns ==========

    /// Create a campaign. Every participant must be an employee of the given
    /// company; the date window must not be inverted.
    pub async fn create_campaign(
        &self,
        company: &RecordId,
        data: SurveyCampaignCreate,
    ) -> RepoResult<SurveyCampaign> {
        if data.ends_at < data.starts_at {
            return Err(RepoError::Validation(
                "Campaign end date precedes its start date".to_string(),
            ));
        }

        let template = self
            .find_template_by_id(&data.template_id)
            .await?
            .ok_or_else(|| {
                RepoError::NotFound(format!("Survey template {} not found", data.template_id))
            })?;
        let template_ref = template
            .id
            .ok_or_else(|| RepoError::Database("Template record has no id".to_string()))?;

        let mut participants = Vec::with_capacity(data.participants.len());
        for participant_id in &data.participants {
            let thing = BaseRepository::parse_id(participant_id)?;
            let employee: Option<Employee> = self.base.db().select(thing.clone()).await?;
            let employee = employee.ok_or_else(|| {
                RepoError::NotFound(format!("Employee {} not found", participant_id))
            })?;
            if &employee.company != company {
                return Err(RepoError::Validation(format!(
                    "Employee {} does not belong to this company",
                    participant_id
                )));
            }
            participants.push(thing);
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE survey_campaign SET
                    companyId = $company,
                    templateId = $template,
                    title = $title,
                    starts_at = $starts_at,
                    ends_at = $ends_at,
                    participants = $participants,
                    createdAt = $now
                RETURN AFTER"#,
            )
            .bind(("company", company.clone()))
            .bind(("template", template_ref))
            .bind(("title", data.title.trim().to_string()))
            .bind(("starts_at", data.starts_at))
            .bind(("ends_at", data.ends_at))
            .bind(("participants", participants))
            .bind(("now", now_millis()))
            .await?;

        let created: Option<SurveyCampaign> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create survey campaign".to_string()))
    }

    pub async fn find_campaigns(&self, company: &RecordId) -> RepoResult<Vec<SurveyCampaign>> {
        let campaigns: Vec<SurveyCampaign> = self
            .base
            .db()
            .query("SELECT * FROM survey_campaign WHERE companyId = $company ORDER BY starts_at")
            .bind(("company", company.clone()))
            .await?
            .take(0)?;
        Ok(campaigns)
    }

    pub async fn find_campaign_by_id(&self, id: &str) -> RepoResult<Option<SurveyCampaign>> {
        let thing = BaseRepository::parse_id(id)?;
        let campaign: Option<SurveyCampaign> = self.base.db().select(thing).await?;
        Ok(campaign)
    }

    /// Delete a campaign together with its responses and index records.
    pub async fn delete_campaign(&self, id: &str) -> RepoResult<()> {
        let thing = BaseRepository::parse_id(id)?;
        self.find_campaign_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Campaign {} not found", id)))?;

        self.base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                DELETE survey_response WHERE campaignId = $thing;
                DELETE response_index WHERE campaign = $thing;
                DELETE $thing;
                COMMIT TRANSACTION;"#,
            )
            .bind(("thing", thing))
            .await?
            .check()
            .map_err(|e| RepoError::Database(e.to_string()))?;
        Ok(())
    }

    // ========== Responses ==========

    /// Submit a response for today's date.
    pub async fn create_response(
        &self,
        campaign_id: &str,
        data: SurveyResponseCreate,
    ) -> RepoResult<SurveyResponse> {
        self.create_response_at(campaign_id, data, Utc::now().date_naive())
            .await
    }

    /// Submission path with an explicit "today", so the window rule is
    /// testable without clock control.
    pub(crate) async fn create_response_at(
        &self,
        campaign_id: &str,
        data: SurveyResponseCreate,
        today: NaiveDate,
    ) -> RepoResult<SurveyResponse> {
        let campaign = self
            .find_campaign_by_id(campaign_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Campaign {} not found", campaign_id)))?;
        let campaign_ref = campaign
            .id
            .clone()
            .ok_or_else(|| RepoError::Database("Campaign record has no id".to_string()))?;

        if today < campaign.starts_at || today > campaign.ends_at {
            return Err(RepoError::Validation(
                "Campaign is not open for responses".to_string(),
            ));
        }

        let assessor = BaseRepository::parse_id(&data.assessor_id)?;
        if !campaign.participants.contains(&assessor) {
            return Err(RepoError::Validation(
                "Assessor is not a participant of this campaign".to_string(),
            ));
        }

        let question_count = match self
            .find_template_by_id(&campaign.template.to_string())
            .await?
        {
            Some(template) => template.questions.len(),
            None => {
                return Err(RepoError::Database(
                    "Campaign references a missing template".to_string(),
                ));
            }
        };
        if data.answers.iter().any(|a| a.question >= question_count) {
            return Err(RepoError::Validation(
                "Answer references a question outside the template".to_string(),
            ));
        }

        // Composite key keeps one response per assessor per campaign; the
        // index record and the response commit or abort together.
        let index_key = format!("{}-{}", campaign_ref.key(), assessor.key());
        let mut response = self
            .base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                CREATE type::thing('response_index', $index_key)
                    SET campaign = $campaign, assessor = $assessor;
                CREATE survey_response SET
                    campaignId = $campaign,
                    assessor = $assessor,
                    answers = $answers,
                    createdAt = $now;
                COMMIT TRANSACTION;"#,
            )
            .bind(("index_key", index_key))
            .bind(("campaign", campaign_ref.clone()))
            .bind(("assessor", assessor.clone()))
            .bind(("answers", data.answers))
            .bind(("now", now_millis()))
            .await?;

        // Scan every statement's error: cancelled statements only carry the
        // generic "not executed" message, not the colliding index.
        let errors = response.take_errors();
        if !errors.is_empty() {
            let combined = errors
                .values()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(if combined.contains("response_index") {
                RepoError::Duplicate(
                    "This assessor has already responded to the campaign".to_string(),
                )
            } else {
                RepoError::Database(combined)
            });
        }

        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM survey_response
                 WHERE campaignId = $campaign AND assessor = $assessor
                 LIMIT 1",
            )
            .bind(("campaign", campaign_ref))
            .bind(("assessor", assessor))
            .await?;
        result
            .take::<Vec<SurveyResponse>>(0)?
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create survey response".to_string()))
    }

    /// All responses of a campaign. Anonymous: the response type never
    /// serializes the assessor reference out.
    pub async fn find_responses(&self, campaign_id: &str) -> RepoResult<Vec<SurveyResponse>> {
        let thing = BaseRepository::parse_id(campaign_id)?;
        let responses: Vec<SurveyResponse> = self
            .base
            .db()
            .query(
                "SELECT * FROM survey_response WHERE campaignId = $campaign ORDER BY createdAt",
            )
            .bind(("campaign", thing))
            .await?
            .take(0)?;
        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{
        DepartmentCreate, EmployeeCreate, Gender, PositionCreate, QuestionKind, Scholarity,
        SurveyAnswer, SurveyQuestion,
    };
    use crate::db::repository::test_support::test_db;
    use crate::db::repository::{DepartmentRepository, EmployeeRepository, PositionRepository};

    struct Fixture {
        repo: SurveyRepository,
        company: RecordId,
        employee_id: String,
        campaign_id: String,
        window: (NaiveDate, NaiveDate),
    }

    async fn fixture() -> Fixture {
        let db = test_db().await;
        let company = RecordId::from_table_key("company", "c1");

        let department = DepartmentRepository::new(db.clone())
            .create(
                &company,
                DepartmentCreate {
                    name: "Operações".to_string(),
                },
            )
            .await
            .unwrap();
        let department_ref = department.id.unwrap();
        let position = PositionRepository::new(db.clone())
            .create(
                &company,
                &department_ref,
                PositionCreate {
                    name: "Operador".to_string(),
                },
            )
            .await
            .unwrap();

        let employee = EmployeeRepository::new(db.clone())
            .create(
                &company,
                EmployeeCreate {
                    name: "Ana Silva Santos".to_string(),
                    cpf: "529.982.247-25".to_string(),
                    department_id: department_ref.to_string(),
                    position_id: position.id.unwrap().to_string(),
                    birth_date: NaiveDate::from_ymd_opt(1990, 5, 20).unwrap(),
                    admission_date: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
                    gender: Gender::Feminino,
                    scholarity: Scholarity::EnsinoMedio,
                    is_leader: false,
                },
            )
            .await
            .unwrap();
        let employee_id = employee.id.unwrap().to_string();

        let repo = SurveyRepository::new(db);
        let template = repo
            .create_template(SurveyTemplateCreate {
                title: "Clima Organizacional".to_string(),
                questions: vec![
                    SurveyQuestion {
                        text: "Como avalia o ambiente de trabalho?".to_string(),
                        kind: QuestionKind::Scale,
                    },
                    SurveyQuestion {
                        text: "Comentários adicionais".to_string(),
                        kind: QuestionKind::Text,
                    },
                ],
            })
            .await
            .unwrap();

        let window = (
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        );
        let campaign = repo
            .create_campaign(
                &company,
                SurveyCampaignCreate {
                    template_id: template.id.unwrap().to_string(),
                    title: "Clima 2026".to_string(),
                    starts_at: window.0,
                    ends_at: window.1,
                    participants: vec![employee_id.clone()],
                },
            )
            .await
            .unwrap();

        Fixture {
            repo,
            company,
            employee_id,
            campaign_id: campaign.id.unwrap().to_string(),
            window,
        }
    }

    fn answers() -> Vec<SurveyAnswer> {
        vec![SurveyAnswer {
            question: 0,
            value: "4".to_string(),
        }]
    }

    #[tokio::test]
    async fn response_inside_window_is_accepted_once() {
        let fix = fixture().await;
        let mid_window = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();

        fix.repo
            .create_response_at(
                &fix.campaign_id,
                SurveyResponseCreate {
                    assessor_id: fix.employee_id.clone(),
                    answers: answers(),
                },
                mid_window,
            )
            .await
            .unwrap();

        let second = fix
            .repo
            .create_response_at(
                &fix.campaign_id,
                SurveyResponseCreate {
                    assessor_id: fix.employee_id.clone(),
                    answers: answers(),
                },
                mid_window,
            )
            .await;
        assert!(matches!(second, Err(RepoError::Duplicate(_))));

        let responses = fix.repo.find_responses(&fix.campaign_id).await.unwrap();
        assert_eq!(responses.len(), 1);
    }

    #[tokio::test]
    async fn response_outside_window_is_rejected() {
        let fix = fixture().await;
        let after_close = fix.window.1.succ_opt().unwrap();
        let err = fix
            .repo
            .create_response_at(
                &fix.campaign_id,
                SurveyResponseCreate {
                    assessor_id: fix.employee_id.clone(),
                    answers: answers(),
                },
                after_close,
            )
            .await;
        assert!(matches!(err, Err(RepoError::Validation(_))));
    }

    #[tokio::test]
    async fn non_participant_is_rejected() {
        let fix = fixture().await;
        let err = fix
            .repo
            .create_response_at(
                &fix.campaign_id,
                SurveyResponseCreate {
                    assessor_id: "employee:intruder".to_string(),
                    answers: answers(),
                },
                NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            )
            .await;
        assert!(matches!(err, Err(RepoError::Validation(_))));
    }

    #[tokio::test]
    async fn listed_responses_do_not_expose_the_assessor() {
        let fix = fixture().await;
        fix.repo
            .create_response_at(
                &fix.campaign_id,
                SurveyResponseCreate {
                    assessor_id: fix.employee_id.clone(),
                    answers: answers(),
                },
                NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            )
            .await
            .unwrap();

        let responses = fix.repo.find_responses(&fix.campaign_id).await.unwrap();
        let json = serde_json::to_value(&responses).unwrap();
        assert!(json[0].get("assessor").is_none());
        assert!(json[0].get("answers").is_some());
    }

    #[tokio::test]
    async fn inverted_window_is_rejected() {
        let fix = fixture().await;
        let template = fix.repo.find_templates().await.unwrap().remove(0);
        let err = fix
            .repo
            .create_campaign(
                &fix.company,
                SurveyCampaignCreate {
                    template_id: template.id.unwrap().to_string(),
                    title: "Janela invertida".to_string(),
                    starts_at: NaiveDate::from_ymd_opt(2026, 4, 30).unwrap(),
                    ends_at: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
                    participants: vec![fix.employee_id.clone()],
                },
            )
            .await;
        assert!(matches!(err, Err(RepoError::Validation(_))));
    }

    #[tokio::test]
    async fn campaign_delete_removes_responses() {
        let fix = fixture().await;
        fix.repo
            .create_response_at(
                &fix.campaign_id,
                SurveyResponseCreate {
                    assessor_id: fix.employee_id.clone(),
                    answers: answers(),
                },
                NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            )
            .await
            .unwrap();

        fix.repo.delete_campaign(&fix.campaign_id).await.unwrap();
        assert!(
            fix.repo
                .find_campaign_by_id(&fix.campaign_id)
                .await
                .unwrap()
                .is_none()
        );
        let responses = fix.repo.find_responses(&fix.campaign_id).await.unwrap();
        assert!(responses.is_empty());
    }
}
