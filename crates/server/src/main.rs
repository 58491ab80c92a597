// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use casetrack_api::{
    AdvanceStageRequest, ApiError, AuthenticatedActor, CaseCapabilities, CaseResponse,
    CreateCaseRequest, DeleteAttachmentResponse, ListCasesRequest, ListCasesResponse,
    RejectRequest, SaveCostRequest, SaveFinalCostRequest, UpdateCaseRequest,
    UploadAttachmentsRequest, UploadAttachmentsResponse, advance_stage, approve_cost,
    approve_final_cost, authenticate_stub, cancel_case, close_case, create_case,
    delete_attachment, get_case, get_case_capabilities, list_cases, redo_case, reject_cost,
    reject_final_cost, save_cost, save_final_cost, update_case, upload_attachments,
};
use casetrack_audit::Cause;
use casetrack_persistence::Persistence;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// CaseTrack Server - HTTP server for the warranty case workflow
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,
}

/// Application state shared across handlers.
///
/// The store sits behind a single mutex, so each action loads, applies,
/// and saves a case without interleaving with another action.
#[derive(Clone)]
struct AppState {
    /// The case store.
    persistence: Arc<Mutex<Persistence>>,
}

/// A request body carrying the caller's identity and the reason for the
/// action next to the action's own fields.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ActorRequest<T> {
    /// The caller's identifier, as recorded in audit events.
    actor_id: String,
    /// The caller's workflow user id.
    actor_user_id: i64,
    /// `cs`, `technician`, or `leader`.
    actor_role: String,
    /// Cause ID for audit trail.
    cause_id: String,
    /// Cause description for audit trail.
    cause_description: String,
    /// The action's own fields.
    #[serde(flatten)]
    request: T,
}

impl<T> ActorRequest<T> {
    /// Authenticates the caller and splits off the audit cause.
    fn into_parts(self) -> Result<(AuthenticatedActor, Cause, T), HttpError> {
        let actor: AuthenticatedActor =
            authenticate_stub(self.actor_id, self.actor_user_id, &self.actor_role)
                .map_err(ApiError::from)?;
        let cause: Cause = Cause::new(self.cause_id, self.cause_description);
        Ok((actor, cause, self.request))
    }
}

/// Body of actions that carry nothing beyond the caller's identity.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct NoFields {}

/// Caller identity for read-only requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ActorQuery {
    /// The caller's identifier.
    actor_id: String,
    /// The caller's workflow user id.
    actor_user_id: i64,
    /// `cs`, `technician`, or `leader`.
    actor_role: String,
}

impl ActorQuery {
    fn authenticate(self) -> Result<AuthenticatedActor, HttpError> {
        authenticate_stub(self.actor_id, self.actor_user_id, &self.actor_role)
            .map_err(|e| HttpError::from(ApiError::from(e)))
    }
}

/// Query parameters for GET `/cases`.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ListCasesQuery {
    /// The caller's identifier.
    actor_id: String,
    /// The caller's workflow user id.
    actor_user_id: i64,
    /// `cs`, `technician`, or `leader`.
    actor_role: String,
    /// Optional status filter.
    status: Option<String>,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::CaseClosed { .. } | ApiError::StaleStage { .. } => StatusCode::CONFLICT,
            ApiError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::CostApprovalPending
            | ApiError::FinalCostPending
            | ApiError::FinalCostMissing
            | ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_client_error() {
            warn!(status = status.as_u16(), error = %err, "Request rejected");
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Handler for POST `/cases` endpoint.
///
/// Registers a new case.
async fn handle_create_case(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorRequest<CreateCaseRequest>>,
) -> Result<(StatusCode, Json<CaseResponse>), HttpError> {
    info!(actor_id = %req.actor_id, role = %req.actor_role, "Handling create_case request");
    let (actor, cause, request) = req.into_parts()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: CaseResponse = create_case(&mut *persistence, request, &actor, cause)?;
    drop(persistence);

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET `/cases` endpoint.
async fn handle_list_cases(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<ListCasesQuery>,
) -> Result<Json<ListCasesResponse>, HttpError> {
    let request: ListCasesRequest = ListCasesRequest {
        status: query.status,
    };
    let actor: AuthenticatedActor = ActorQuery {
        actor_id: query.actor_id,
        actor_user_id: query.actor_user_id,
        actor_role: query.actor_role,
    }
    .authenticate()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: ListCasesResponse = list_cases(&mut *persistence, &request, &actor)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/cases/{case_id}` endpoint.
async fn handle_get_case(
    AxumState(app_state): AxumState<AppState>,
    Path(case_id): Path<i64>,
    Query(query): Query<ActorQuery>,
) -> Result<Json<CaseResponse>, HttpError> {
    let actor: AuthenticatedActor = query.authenticate()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: CaseResponse = get_case(&mut *persistence, case_id, &actor)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/cases/{case_id}/update` endpoint.
async fn handle_update_case(
    AxumState(app_state): AxumState<AppState>,
    Path(case_id): Path<i64>,
    Json(req): Json<ActorRequest<UpdateCaseRequest>>,
) -> Result<Json<CaseResponse>, HttpError> {
    info!(case_id, actor_id = %req.actor_id, "Handling update_case request");
    let (actor, cause, request) = req.into_parts()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: CaseResponse = update_case(&mut *persistence, case_id, request, &actor, cause)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/cases/{case_id}/advance` endpoint.
async fn handle_advance_stage(
    AxumState(app_state): AxumState<AppState>,
    Path(case_id): Path<i64>,
    Json(req): Json<ActorRequest<AdvanceStageRequest>>,
) -> Result<Json<CaseResponse>, HttpError> {
    info!(
        case_id,
        actor_id = %req.actor_id,
        from_stage = req.request.from_stage,
        "Handling advance_stage request"
    );
    let (actor, cause, request) = req.into_parts()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: CaseResponse =
        advance_stage(&mut *persistence, case_id, request, &actor, cause)?;
    drop(persistence);

    info!(
        case_id,
        current_stage = response.case.current_stage,
        "Successfully advanced case"
    );
    Ok(Json(response))
}

/// Handler for POST `/cases/{case_id}/cost` endpoint.
async fn handle_save_cost(
    AxumState(app_state): AxumState<AppState>,
    Path(case_id): Path<i64>,
    Json(req): Json<ActorRequest<SaveCostRequest>>,
) -> Result<Json<CaseResponse>, HttpError> {
    info!(
        case_id,
        actor_id = %req.actor_id,
        required = req.request.required,
        "Handling save_cost request"
    );
    let (actor, cause, request) = req.into_parts()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: CaseResponse = save_cost(&mut *persistence, case_id, request, &actor, cause)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/cases/{case_id}/cost/approve` endpoint.
async fn handle_approve_cost(
    AxumState(app_state): AxumState<AppState>,
    Path(case_id): Path<i64>,
    Json(req): Json<ActorRequest<NoFields>>,
) -> Result<Json<CaseResponse>, HttpError> {
    info!(case_id, actor_id = %req.actor_id, "Handling approve_cost request");
    let (actor, cause, _) = req.into_parts()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: CaseResponse = approve_cost(&mut *persistence, case_id, &actor, cause)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/cases/{case_id}/cost/reject` endpoint.
async fn handle_reject_cost(
    AxumState(app_state): AxumState<AppState>,
    Path(case_id): Path<i64>,
    Json(req): Json<ActorRequest<RejectRequest>>,
) -> Result<Json<CaseResponse>, HttpError> {
    info!(case_id, actor_id = %req.actor_id, "Handling reject_cost request");
    let (actor, cause, request) = req.into_parts()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: CaseResponse = reject_cost(&mut *persistence, case_id, request, &actor, cause)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/cases/{case_id}/final_cost` endpoint.
async fn handle_save_final_cost(
    AxumState(app_state): AxumState<AppState>,
    Path(case_id): Path<i64>,
    Json(req): Json<ActorRequest<SaveFinalCostRequest>>,
) -> Result<Json<CaseResponse>, HttpError> {
    info!(case_id, actor_id = %req.actor_id, "Handling save_final_cost request");
    let (actor, cause, request) = req.into_parts()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: CaseResponse =
        save_final_cost(&mut *persistence, case_id, request, &actor, cause)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/cases/{case_id}/final_cost/approve` endpoint.
async fn handle_approve_final_cost(
    AxumState(app_state): AxumState<AppState>,
    Path(case_id): Path<i64>,
    Json(req): Json<ActorRequest<NoFields>>,
) -> Result<Json<CaseResponse>, HttpError> {
    info!(case_id, actor_id = %req.actor_id, "Handling approve_final_cost request");
    let (actor, cause, _) = req.into_parts()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: CaseResponse = approve_final_cost(&mut *persistence, case_id, &actor, cause)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/cases/{case_id}/final_cost/reject` endpoint.
async fn handle_reject_final_cost(
    AxumState(app_state): AxumState<AppState>,
    Path(case_id): Path<i64>,
    Json(req): Json<ActorRequest<RejectRequest>>,
) -> Result<Json<CaseResponse>, HttpError> {
    info!(case_id, actor_id = %req.actor_id, "Handling reject_final_cost request");
    let (actor, cause, request) = req.into_parts()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: CaseResponse =
        reject_final_cost(&mut *persistence, case_id, request, &actor, cause)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/cases/{case_id}/close` endpoint.
async fn handle_close_case(
    AxumState(app_state): AxumState<AppState>,
    Path(case_id): Path<i64>,
    Json(req): Json<ActorRequest<NoFields>>,
) -> Result<Json<CaseResponse>, HttpError> {
    info!(case_id, actor_id = %req.actor_id, "Handling close_case request");
    let (actor, cause, _) = req.into_parts()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: CaseResponse = close_case(&mut *persistence, case_id, &actor, cause)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/cases/{case_id}/redo` endpoint.
async fn handle_redo_case(
    AxumState(app_state): AxumState<AppState>,
    Path(case_id): Path<i64>,
    Json(req): Json<ActorRequest<NoFields>>,
) -> Result<Json<CaseResponse>, HttpError> {
    info!(case_id, actor_id = %req.actor_id, "Handling redo_case request");
    let (actor, cause, _) = req.into_parts()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: CaseResponse = redo_case(&mut *persistence, case_id, &actor, cause)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/cases/{case_id}/cancel` endpoint.
async fn handle_cancel_case(
    AxumState(app_state): AxumState<AppState>,
    Path(case_id): Path<i64>,
    Json(req): Json<ActorRequest<NoFields>>,
) -> Result<Json<CaseResponse>, HttpError> {
    info!(case_id, actor_id = %req.actor_id, "Handling cancel_case request");
    let (actor, cause, _) = req.into_parts()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: CaseResponse = cancel_case(&mut *persistence, case_id, &actor, cause)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/cases/{case_id}/attachments` endpoint.
async fn handle_upload_attachments(
    AxumState(app_state): AxumState<AppState>,
    Path(case_id): Path<i64>,
    Json(req): Json<ActorRequest<UploadAttachmentsRequest>>,
) -> Result<Json<UploadAttachmentsResponse>, HttpError> {
    info!(
        case_id,
        actor_id = %req.actor_id,
        stage = req.request.stage,
        files = req.request.files.len(),
        "Handling upload_attachments request"
    );
    let (actor, cause, request) = req.into_parts()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: UploadAttachmentsResponse =
        upload_attachments(&mut *persistence, case_id, request, &actor, cause)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/cases/{case_id}/attachments/{attachment_id}/delete` endpoint.
async fn handle_delete_attachment(
    AxumState(app_state): AxumState<AppState>,
    Path((case_id, attachment_id)): Path<(i64, i64)>,
    Json(req): Json<ActorRequest<NoFields>>,
) -> Result<Json<DeleteAttachmentResponse>, HttpError> {
    info!(
        case_id,
        attachment_id,
        actor_id = %req.actor_id,
        "Handling delete_attachment request"
    );
    let (actor, cause, _) = req.into_parts()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: DeleteAttachmentResponse =
        delete_attachment(&mut *persistence, case_id, attachment_id, &actor, cause)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/cases/{case_id}/capabilities` endpoint.
async fn handle_get_capabilities(
    AxumState(app_state): AxumState<AppState>,
    Path(case_id): Path<i64>,
    Json(req): Json<ActorRequest<NoFields>>,
) -> Result<Json<CaseCapabilities>, HttpError> {
    let (actor, _, _) = req.into_parts()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: CaseCapabilities = get_case_capabilities(&mut *persistence, case_id, &actor)?;
    drop(persistence);

    Ok(Json(response))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/cases", post(handle_create_case).get(handle_list_cases))
        .route("/cases/{case_id}", get(handle_get_case))
        .route("/cases/{case_id}/update", post(handle_update_case))
        .route("/cases/{case_id}/advance", post(handle_advance_stage))
        .route("/cases/{case_id}/cost", post(handle_save_cost))
        .route("/cases/{case_id}/cost/approve", post(handle_approve_cost))
        .route("/cases/{case_id}/cost/reject", post(handle_reject_cost))
        .route("/cases/{case_id}/final_cost", post(handle_save_final_cost))
        .route(
            "/cases/{case_id}/final_cost/approve",
            post(handle_approve_final_cost),
        )
        .route(
            "/cases/{case_id}/final_cost/reject",
            post(handle_reject_final_cost),
        )
        .route("/cases/{case_id}/close", post(handle_close_case))
        .route("/cases/{case_id}/redo", post(handle_redo_case))
        .route("/cases/{case_id}/cancel", post(handle_cancel_case))
        .route(
            "/cases/{case_id}/attachments",
            post(handle_upload_attachments),
        )
        .route(
            "/cases/{case_id}/attachments/{attachment_id}/delete",
            post(handle_delete_attachment),
        )
        .route(
            "/cases/{case_id}/capabilities",
            post(handle_get_capabilities),
        )
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing CaseTrack Server");

    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
    };

    let app: Router = build_router(app_state);

    let listener = tokio::net::TcpListener::bind((args.bind.as_str(), args.port)).await?;
    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode as HttpStatusCode},
    };
    use casetrack_api::{AssignmentForm, CaseInfo, FileInfo, InvestigationForm};
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    /// Helper to create test app state with in-memory persistence.
    fn create_test_app_state() -> AppState {
        let persistence: Persistence =
            Persistence::new_in_memory().expect("Failed to create in-memory persistence");
        AppState {
            persistence: Arc::new(Mutex::new(persistence)),
        }
    }

    fn create_test_app() -> Router {
        build_router(create_test_app_state())
    }

    /// Wraps a request body with the identity of a caller.
    fn as_actor<T: Serialize>(role: &str, user_id: i64, request: T) -> String {
        let body: ActorRequest<T> = ActorRequest {
            actor_id: format!("{role}-{user_id}"),
            actor_user_id: user_id,
            actor_role: role.to_string(),
            cause_id: String::from("test-cause"),
            cause_description: String::from("Server test"),
            request,
        };
        serde_json::to_string(&body).unwrap()
    }

    fn as_cs<T: Serialize>(request: T) -> String {
        as_actor("cs", 1, request)
    }

    fn as_technician<T: Serialize>(request: T) -> String {
        as_actor("technician", 7, request)
    }

    fn as_leader<T: Serialize>(request: T) -> String {
        as_actor("leader", 9, request)
    }

    async fn post(app: &Router, uri: &str, body: String) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn get(app: &Router, uri: &str) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> T {
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body_bytes).unwrap()
    }

    fn create_test_request() -> CreateCaseRequest {
        CreateCaseRequest {
            assignment: AssignmentForm {
                client_id: Some(10),
                site_id: Some(20),
                contact_id: None,
                assigned_to: Some(7),
                case_type: Some(String::from("warranty")),
                priority: Some(String::from("normal")),
                description: Some(String::from("Drawer runner broken")),
            },
        }
    }

    async fn create_test_case(app: &Router) -> CaseInfo {
        let response: Response = post(app, "/cases", as_cs(create_test_request())).await;
        assert_eq!(response.status(), HttpStatusCode::CREATED);
        read_json::<CaseResponse>(response).await.case
    }

    async fn advance(app: &Router, case_id: i64, from_stage: u8, body_role: &str) -> Response {
        let request: AdvanceStageRequest = AdvanceStageRequest { from_stage };
        let body: String = match body_role {
            "cs" => as_cs(request),
            _ => as_technician(request),
        };
        post(app, &format!("/cases/{case_id}/advance"), body).await
    }

    /// Walks a new case to the solution stage.
    async fn create_test_case_at_solution(app: &Router) -> i64 {
        let case_id: i64 = create_test_case(app).await.case_id;
        assert_eq!(advance(app, case_id, 1, "cs").await.status(), HttpStatusCode::OK);
        let update: UpdateCaseRequest = UpdateCaseRequest {
            investigation: Some(InvestigationForm {
                report: Some(String::from("Runner bent")),
                checklist: Vec::new(),
            }),
            ..UpdateCaseRequest::default()
        };
        let response: Response =
            post(app, &format!("/cases/{case_id}/update"), as_technician(update)).await;
        assert_eq!(response.status(), HttpStatusCode::OK);
        assert_eq!(
            advance(app, case_id, 2, "technician").await.status(),
            HttpStatusCode::OK
        );
        case_id
    }

    #[tokio::test]
    async fn test_create_case_as_cs_succeeds() {
        let app: Router = create_test_app();

        let case: CaseInfo = create_test_case(&app).await;

        assert_eq!(case.current_stage, 1);
        assert_eq!(case.status, "open");
        assert!(case.case_number.starts_with("WC-"));
    }

    #[tokio::test]
    async fn test_create_case_as_technician_is_forbidden() {
        let app: Router = create_test_app();

        let response: Response = post(&app, "/cases", as_technician(create_test_request())).await;

        assert_eq!(response.status(), HttpStatusCode::FORBIDDEN);
        let error: ErrorResponse = read_json(response).await;
        assert!(error.error);
    }

    #[tokio::test]
    async fn test_unknown_role_is_unauthorized() {
        let app: Router = create_test_app();

        let response: Response =
            post(&app, "/cases", as_actor("admin", 1, create_test_request())).await;

        assert_eq!(response.status(), HttpStatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_get_case_round_trip() {
        let app: Router = create_test_app();
        let created: CaseInfo = create_test_case(&app).await;

        let response: Response = get(
            &app,
            &format!(
                "/cases/{}?actor_id=tech-7&actor_user_id=7&actor_role=technician",
                created.case_id
            ),
        )
        .await;

        assert_eq!(response.status(), HttpStatusCode::OK);
        let fetched: CaseResponse = read_json(response).await;
        assert_eq!(fetched.case, created);
    }

    #[tokio::test]
    async fn test_get_missing_case_is_not_found() {
        let app: Router = create_test_app();

        let response: Response =
            get(&app, "/cases/77?actor_id=cs-1&actor_user_id=1&actor_role=cs").await;

        assert_eq!(response.status(), HttpStatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_advance_twice_from_same_stage_conflicts() {
        let app: Router = create_test_app();
        let case_id: i64 = create_test_case(&app).await.case_id;

        assert_eq!(advance(&app, case_id, 1, "cs").await.status(), HttpStatusCode::OK);
        let response: Response = advance(&app, case_id, 1, "cs").await;

        assert_eq!(response.status(), HttpStatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_advance_with_invalid_stage_is_bad_request() {
        let app: Router = create_test_app();
        let case_id: i64 = create_test_case(&app).await.case_id;

        let response: Response = advance(&app, case_id, 9, "cs").await;

        assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cost_approval_flow() {
        let app: Router = create_test_app();
        let case_id: i64 = create_test_case_at_solution(&app).await;

        let cost: SaveCostRequest = SaveCostRequest {
            required: true,
            estimated_cost: Some(500.0),
            description: Some(String::from("New runners")),
        };
        let response: Response =
            post(&app, &format!("/cases/{case_id}/cost"), as_technician(cost)).await;
        assert_eq!(response.status(), HttpStatusCode::OK);
        let saved: CaseResponse = read_json(response).await;
        assert_eq!(saved.case.status, "pending");

        let blocked: Response = advance(&app, case_id, 3, "technician").await;
        assert_eq!(blocked.status(), HttpStatusCode::UNPROCESSABLE_ENTITY);

        let response: Response = post(
            &app,
            &format!("/cases/{case_id}/cost/approve"),
            as_leader(NoFields::default()),
        )
        .await;
        assert_eq!(response.status(), HttpStatusCode::OK);

        let response: Response = advance(&app, case_id, 3, "technician").await;
        assert_eq!(response.status(), HttpStatusCode::OK);
        let advanced: CaseResponse = read_json(response).await;
        assert_eq!(advanced.case.current_stage, 4);
    }

    #[tokio::test]
    async fn test_cancelled_case_rejects_changes() {
        let app: Router = create_test_app();
        let case_id: i64 = create_test_case_at_solution(&app).await;
        let cost: SaveCostRequest = SaveCostRequest {
            required: true,
            estimated_cost: Some(900.0),
            description: None,
        };
        post(&app, &format!("/cases/{case_id}/cost"), as_technician(cost)).await;
        let rejected: Response = post(
            &app,
            &format!("/cases/{case_id}/cost/reject"),
            as_leader(RejectRequest {
                reason: Some(String::from("Over budget")),
            }),
        )
        .await;
        assert_eq!(rejected.status(), HttpStatusCode::OK);

        let cancelled: Response = post(
            &app,
            &format!("/cases/{case_id}/cancel"),
            as_cs(NoFields::default()),
        )
        .await;
        assert_eq!(cancelled.status(), HttpStatusCode::OK);

        let response: Response = post(
            &app,
            &format!("/cases/{case_id}/update"),
            as_cs(UpdateCaseRequest {
                assignment: Some(AssignmentForm::default()),
                ..UpdateCaseRequest::default()
            }),
        )
        .await;
        assert_eq!(response.status(), HttpStatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_list_cases_with_status_filter() {
        let app: Router = create_test_app();
        create_test_case(&app).await;
        create_test_case_at_solution(&app).await;

        let response: Response = get(
            &app,
            "/cases?actor_id=cs-1&actor_user_id=1&actor_role=cs&status=in_progress",
        )
        .await;

        assert_eq!(response.status(), HttpStatusCode::OK);
        let listing: ListCasesResponse = read_json(response).await;
        assert_eq!(listing.cases.len(), 1);
        assert_eq!(listing.cases[0].current_stage, 3);
    }

    #[tokio::test]
    async fn test_upload_and_delete_attachment() {
        let app: Router = create_test_app();
        let case_id: i64 = create_test_case(&app).await.case_id;

        let upload: UploadAttachmentsRequest = UploadAttachmentsRequest {
            stage: 1,
            files: vec![FileInfo {
                filename: String::from("receipt.jpg"),
                url: String::from("https://files.example.test/receipt.jpg"),
            }],
            attachment_type: None,
        };
        let response: Response = post(
            &app,
            &format!("/cases/{case_id}/attachments"),
            as_cs(upload),
        )
        .await;
        assert_eq!(response.status(), HttpStatusCode::OK);
        let uploaded: UploadAttachmentsResponse = read_json(response).await;
        assert_eq!(uploaded.attachments.len(), 1);
        let attachment_id: i64 = uploaded.attachments[0].attachment_id;

        let response: Response = post(
            &app,
            &format!("/cases/{case_id}/attachments/{attachment_id}/delete"),
            as_cs(NoFields::default()),
        )
        .await;
        assert_eq!(response.status(), HttpStatusCode::OK);

        let again: Response = post(
            &app,
            &format!("/cases/{case_id}/attachments/{attachment_id}/delete"),
            as_cs(NoFields::default()),
        )
        .await;
        assert_eq!(again.status(), HttpStatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_capabilities_endpoint() {
        let app: Router = create_test_app();
        let case_id: i64 = create_test_case(&app).await.case_id;

        let response: Response = post(
            &app,
            &format!("/cases/{case_id}/capabilities"),
            as_cs(NoFields::default()),
        )
        .await;

        assert_eq!(response.status(), HttpStatusCode::OK);
        let caps: CaseCapabilities = read_json(response).await;
        assert!(caps.can_advance.is_allowed());
        assert!(caps.can_edit_stage[0].is_allowed());
        assert!(!caps.can_close.is_allowed());
    }

    #[test]
    fn test_error_status_mapping() {
        let cases: [(ApiError, HttpStatusCode); 4] = [
            (ApiError::CaseClosed { case_id: 1 }, HttpStatusCode::CONFLICT),
            (ApiError::FinalCostMissing, HttpStatusCode::UNPROCESSABLE_ENTITY),
            (
                ApiError::Internal {
                    message: String::from("disk full"),
                },
                HttpStatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::InvalidInput {
                    field: String::from("stage"),
                    message: String::from("bad"),
                },
                HttpStatusCode::BAD_REQUEST,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(HttpError::from(err).status, expected);
        }
    }
}
