//! Employee Repository
//!
//! Creation runs the identity resolution contract: derive the login from the
//! full name, validate and normalize the CPF, hash the initial password, and
//! persist the employee together with its uniqueness-index records and the
//! companion user-profile record in a single store transaction. Uniqueness of
//! login and CPF is global, across all companies: the `login_index` /
//! `cpf_index` tables are keyed by the value itself, so a second insert with
//! the same key aborts the whole transaction.

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use uuid::Uuid;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{
    Department, Employee, EmployeeCreate, EmployeeUpdate, Position, now_millis,
};
use crate::identity;

#[derive(Clone)]
pub struct EmployeeRepository {
    base: BaseRepository,
}

impl EmployeeRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All employees of one company, ordered by name
    pub async fn find_all(&self, company: &RecordId) -> RepoResult<Vec<Employee>> {
        let employees: Vec<Employee> = self
            .base
            .db()
            .query("SELECT * FROM employee WHERE companyId = $company ORDER BY name")
            .bind(("company", company.clone()))
            .await?
            .take(0)?;
        Ok(employees)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Employee>> {
        let thing = BaseRepository::parse_id(id)?;
        let employee: Option<Employee> = self.base.db().select(thing).await?;
        Ok(employee)
    }

    /// Global lookup by login, across all companies
    pub async fn find_by_login(&self, login: &str) -> RepoResult<Option<Employee>> {
        let login_owned = login.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM employee WHERE login = $login LIMIT 1")
            .bind(("login", login_owned))
            .await?;
        let employees: Vec<Employee> = result.take(0)?;
        Ok(employees.into_iter().next())
    }

    async fn fetch_department(
        &self,
        company: &RecordId,
        department_id: &str,
    ) -> RepoResult<Department> {
        let thing = BaseRepository::parse_id(department_id)?;
        let department: Option<Department> = self.base.db().select(thing).await?;
        let department = department.ok_or_else(|| {
            RepoError::NotFound(format!("Department {} not found", department_id))
        })?;
        if &department.company != company {
            return Err(RepoError::Validation(
                "Department does not belong to this company".to_string(),
            ));
        }
        Ok(department)
    }

    async fn fetch_position(
        &self,
        department: &RecordId,
        position_id: &str,
    ) -> RepoResult<Position> {
        let thing = BaseRepository::parse_id(position_id)?;
        let position: Option<Position> = self.base.db().select(thing).await?;
        let position = position
            .ok_or_else(|| RepoError::NotFound(format!("Position {} not found", position_id)))?;
        if &position.department != department {
            return Err(RepoError::Validation(
                "Position does not belong to this department".to_string(),
            ));
        }
        Ok(position)
    }

    /// Create a new employee through the identity resolution contract.
    pub async fn create(&self, company: &RecordId, data: EmployeeCreate) -> RepoResult<Employee> {
        let login = identity::derive_login(&data.name)?;
        let cpf = identity::normalize_cpf(&data.cpf)?;

        let department = self.fetch_department(company, &data.department_id).await?;
        let department_ref = department.id.clone().ok_or_else(|| {
            RepoError::Database("Department record has no id".to_string())
        })?;
        let position = self.fetch_position(&department_ref, &data.position_id).await?;
        let position_ref = position
            .id
            .clone()
            .ok_or_else(|| RepoError::Database("Position record has no id".to_string()))?;

        let hash_pass = Employee::hash_password(&identity::initial_password(&cpf))
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;

        let emp_key = Uuid::new_v4().simple().to_string();

        // Index records, employee document and user profile commit or abort
        // together; a duplicate index key aborts the whole transaction.
        let mut response = self
            .base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                CREATE type::thing('login_index', $login)
                    SET login = $login, employee = type::thing('employee', $emp_key);
                CREATE type::thing('cpf_index', $cpf)
                    SET cpf = $cpf, employee = type::thing('employee', $emp_key);
                CREATE type::thing('employee', $emp_key) SET
                    name = $name,
                    cpf = $cpf,
                    birth_date = $birth_date,
                    admission_date = $admission_date,
                    gender = $gender,
                    scholarity = $scholarity,
                    isLeader = $is_leader,
                    companyId = $company,
                    departmentId = $department,
                    positionId = $position,
                    departmentName = $department_name,
                    positionName = $position_name,
                    login = $login,
                    hash_pass = $hash_pass,
                    role = 'employee',
                    createdAt = $now,
                    updatedAt = $now;
                CREATE type::thing('user_profile', $login)
                    SET login = $login, employee = type::thing('employee', $emp_key);
                COMMIT TRANSACTION;"#,
            )
            .bind(("login", login.clone()))
            .bind(("cpf", cpf.clone()))
            .bind(("emp_key", emp_key.clone()))
            .bind(("name", data.name.trim().to_string()))
            .bind(("birth_date", data.birth_date))
            .bind(("admission_date", data.admission_date))
            .bind(("gender", data.gender))
            .bind(("scholarity", data.scholarity))
            .bind(("is_leader", data.is_leader))
            .bind(("company", company.clone()))
            .bind(("department", department_ref))
            .bind(("position", position_ref))
            .bind(("department_name", department.name))
            .bind(("position_name", position.name))
            .bind(("hash_pass", hash_pass))
            .bind(("now", now_millis()))
            .await?;

        // A cancelled transaction reports the generic "not executed" error for
        // every statement except the one that collided, so every statement's
        // error has to be inspected to find which index rejected the write.
        let errors = response.take_errors();
        if !errors.is_empty() {
            let combined = errors
                .values()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(if combined.contains("login_index") {
                RepoError::Duplicate(format!("Login '{}' is already in use", login))
            } else if combined.contains("cpf_index") {
                RepoError::Duplicate(format!("CPF '{}' is already registered", cpf))
            } else {
                RepoError::Database(combined)
            });
        }

        let created: Option<Employee> = self
            .base
            .db()
            .select(RecordId::from_table_key("employee", emp_key))
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create employee".to_string()))
    }

    /// Update an employee. Department/position changes re-copy the
    /// denormalized display names; cpf and login are immutable here.
    pub async fn update(&self, id: &str, data: EmployeeUpdate) -> RepoResult<Employee> {
        let thing = BaseRepository::parse_id(id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Employee {} not found", id)))?;

        // Resolve the effective department/position pair, validating the
        // hierarchy when either reference changes
        let (department_ref, department_name) = match &data.department_id {
            Some(dep_id) => {
                let department = self.fetch_department(&existing.company, dep_id).await?;
                let department_ref = department.id.clone().ok_or_else(|| {
                    RepoError::Database("Department record has no id".to_string())
                })?;
                (department_ref, department.name)
            }
            None => (existing.department.clone(), existing.department_name.clone()),
        };

        let (position_ref, position_name) = match &data.position_id {
            Some(pos_id) => {
                let position = self.fetch_position(&department_ref, pos_id).await?;
                let position_ref = position.id.clone().ok_or_else(|| {
                    RepoError::Database("Position record has no id".to_string())
                })?;
                (position_ref, position.name)
            }
            None => {
                if data.department_id.is_some() {
                    // Moving departments requires re-selecting the position
                    return Err(RepoError::Validation(
                        "Changing the department requires a position in the new department"
                            .to_string(),
                    ));
                }
                (existing.position.clone(), existing.position_name.clone())
            }
        };

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    name = $name,
                    birth_date = $birth_date,
                    admission_date = $admission_date,
                    gender = $gender,
                    scholarity = $scholarity,
                    isLeader = $is_leader,
                    departmentId = $department,
                    positionId = $position,
                    departmentName = $department_name,
                    positionName = $position_name,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind((
                "name",
                data.name
                    .map(|n| n.trim().to_string())
                    .unwrap_or(existing.name),
            ))
            .bind(("birth_date", data.birth_date.unwrap_or(existing.birth_date)))
            .bind((
                "admission_date",
                data.admission_date.unwrap_or(existing.admission_date),
            ))
            .bind(("gender", data.gender.unwrap_or(existing.gender)))
            .bind(("scholarity", data.scholarity.unwrap_or(existing.scholarity)))
            .bind(("is_leader", data.is_leader.unwrap_or(existing.is_leader)))
            .bind(("department", department_ref))
            .bind(("position", position_ref))
            .bind(("department_name", department_name))
            .bind(("position_name", position_name))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<Employee>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Employee {} not found", id)))
    }

    /// Delete an employee together with its user profile and uniqueness-index
    /// records. All four deletions commit or abort together.
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let thing = BaseRepository::parse_id(id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Employee {} not found", id)))?;

        self.base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                DELETE $thing;
                DELETE type::thing('user_profile', $login);
                DELETE type::thing('login_index', $login);
                DELETE type::thing('cpf_index', $cpf);
                COMMIT TRANSACTION;"#,
            )
            .bind(("thing", thing))
            .bind(("login", existing.login))
            .bind(("cpf", existing.cpf))
            .await?
            .check()
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(())
    }
}
