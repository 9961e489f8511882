//! Server Implementation
//!
//! HTTP server bootstrap: router assembly and graceful shutdown.

use std::time::Duration;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::core::{Config, ServerState};
use crate::utils::AppError;

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state (tests build state themselves)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    /// Assemble the full API router for a given state
    pub fn build_router(state: ServerState) -> Router {
        let timeout = Duration::from_millis(state.config.request_timeout_ms);
        Router::new()
            .merge(api::health::router())
            .merge(api::companies::router())
            .merge(api::departments::router())
            .merge(api::positions::router())
            .merge(api::employees::router())
            .merge(api::import::router())
            .merge(api::surveys::router())
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(timeout))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    pub async fn run(&self) -> Result<(), AppError> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        let app = Self::build_router(state);

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        tracing::info!("HR Server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
            })
            .await
            .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use surrealdb::Surreal;
    use surrealdb::engine::local::Mem;
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let db = Surreal::new::<Mem>(()).await.expect("in-memory db");
        db.use_ns("test").use_db("test").await.expect("namespace");
        let state = ServerState::new(Config::with_overrides("/tmp/hr-server-test", 0), db);
        Server::build_router(state)
    }

    async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = match body {
            Some(json) => Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        };
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn company_payload() -> Value {
        json!({
            "cnpj": "12.345.678/0001-95",
            "fantasy_name": "Acme Ltda",
            "full_address": "Rua das Flores, 123",
            "owner": "Maria Souza",
            "focal_point": {
                "name": "Carlos Lima",
                "email": "carlos@acme.com",
                "phone": "(11) 91234-5678"
            }
        })
    }

    #[tokio::test]
    async fn health_endpoint_responds() {
        let router = test_router().await;
        let (status, body) = send(&router, "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn company_crud_over_http() {
        let router = test_router().await;

        let (status, created) =
            send(&router, "POST", "/api/companies", Some(company_payload())).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();

        // Duplicate CNPJ
        let (status, _) = send(&router, "POST", "/api/companies", Some(company_payload())).await;
        assert_eq!(status, StatusCode::CONFLICT);

        // Malformed CNPJ gets field-level details
        let mut bad = company_payload();
        bad["cnpj"] = json!("12345678000195");
        let (status, body) = send(&router, "POST", "/api/companies", Some(bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"].is_object());

        let (status, listed) = send(&router, "GET", "/api/companies", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (status, _) = send(&router, "DELETE", &format!("/api/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&router, "DELETE", &format!("/api/companies/{}", id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn employee_lifecycle_and_delete_guards_over_http() {
        let router = test_router().await;

        let (_, company) = send(&router, "POST", "/api/companies", Some(company_payload())).await;
        let company_id = company["id"].as_str().unwrap().to_string();

        let (status, department) = send(
            &router,
            "POST",
            &format!("/api/companies/{}/departments", company_id),
            Some(json!({ "name": "Comercial" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let department_id = department["id"].as_str().unwrap().to_string();

        let (status, position) = send(
            &router,
            "POST",
            &format!(
                "/api/companies/{}/departments/{}/positions",
                company_id, department_id
            ),
            Some(json!({ "name": "Vendedor" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let position_id = position["id"].as_str().unwrap().to_string();

        let (status, employee) = send(
            &router,
            "POST",
            &format!("/api/companies/{}/employees", company_id),
            Some(json!({
                "name": "Ana Silva Santos",
                "cpf": "529.982.247-25",
                "departmentId": department_id,
                "positionId": position_id,
                "birth_date": "1990-05-20",
                "admission_date": "2023-01-02",
                "gender": "Feminino",
                "scholarity": "ensino_medio",
                "isLeader": false
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(employee["login"], "ana.santos");
        assert_eq!(employee["departmentName"], "Comercial");
        // The password hash never leaves the server
        assert!(employee.get("hash_pass").is_none());
        let employee_id = employee["id"].as_str().unwrap().to_string();

        // Department and company deletes are blocked while the employee exists
        let (status, _) = send(
            &router,
            "DELETE",
            &format!("/api/companies/{}/departments/{}", company_id, department_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        let (status, _) = send(&router, "DELETE", &format!("/api/companies/{}", company_id), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(
            &router,
            "DELETE",
            &format!("/api/companies/{}/employees/{}", company_id, employee_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(
            &router,
            "DELETE",
            &format!("/api/companies/{}/departments/{}", company_id, department_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn import_accepts_uploads_beyond_the_default_body_cap() {
        let router = test_router().await;
        let (_, company) = send(&router, "POST", "/api/companies", Some(company_payload())).await;
        let company_id = company["id"].as_str().unwrap().to_string();

        // One good row plus a ~3MB row, pushing the request past axum's
        // 2MB default body limit
        let padding = "x".repeat(3 * 1024 * 1024);
        let csv = format!(
            "Nome Completo,CPF,Email,Telefone,Departamento,Cargo,Data Nascimento,Data Admissão,Sexo,Escolaridade,Líder\n\
             Ana Silva Santos,529.982.247-25,ana@acme.com,,Comercial,Vendedor,1990-05-20,2023-01-02,Feminino,ensino_medio,Não\n\
             {padding} Silva,123,,,Comercial,Vendedor,bad,bad,X,Y,Z\n"
        );

        let boundary = "hr-upload-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"companyId\"\r\n\r\n\
             {company_id}\r\n\
             --{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"employees.csv\"\r\n\
             Content-Type: text/csv\r\n\r\n\
             {csv}\r\n\
             --{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/import/employees")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let summary: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(summary["successCount"], 1);
        assert_eq!(summary["failedCount"], 1);
        assert_eq!(summary["errors"][0]["row"], 3);
    }
}
