//! # API REST
//!
//! REST API implementation for the screening service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (form and JSON bodies, redirects, CORS)
//!
//! Uses `api-shared` for request/response bodies and `screening-core` for all behaviour.

#![warn(rust_2018_idioms)]

mod error;

pub use error::{ApiError, ApiResult};

use api_shared::{
    DiseaseProfileRes, DiseaseStatus, DiseaseSummary, ErrorRes, FeatureValueRes, HealthRes,
    HealthService, ListDiseasesRes, RecordRes, ResultViewRes, SubmitScreeningReq,
    SubmitScreeningRes,
};
use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
        Form, Path, Query, State,
    },
    http::StatusCode,
    response::{Json, Redirect},
    routing::{get, post},
    Router,
};
use screening_core::{RecordId, ScreeningService};
use serde::Deserialize;
use std::collections::HashMap;
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Application state for the REST API server
#[derive(Clone)]
pub struct AppState {
    pub screening: ScreeningService,
}

impl AppState {
    pub fn new(screening: ScreeningService) -> Self {
        Self { screening }
    }

    fn is_ready(&self, disease: &str) -> bool {
        self.screening
            .artifact_status()
            .iter()
            .any(|s| s.disease.as_str() == disease && s.ready)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_diseases,
        get_disease,
        predict_form,
        submit_screening,
        results,
    ),
    components(schemas(
        HealthRes,
        DiseaseStatus,
        DiseaseSummary,
        ListDiseasesRes,
        DiseaseProfileRes,
        SubmitScreeningReq,
        SubmitScreeningRes,
        FeatureValueRes,
        RecordRes,
        ResultViewRes,
        ErrorRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with Swagger UI and permissive CORS.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/diseases", get(list_diseases))
        .route("/diseases/:disease", get(get_disease))
        .route("/predict/:disease", post(predict_form))
        .route("/api/screenings/:disease", post(submit_screening))
        .route("/results", get(results))
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn results_url(disease: &str, id: RecordId) -> String {
    format!("/results?disease={disease}&id={id}&view=current")
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint, including per-disease artifact readiness.
#[axum::debug_handler]
async fn health(State(state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health(state.screening.artifact_status()))
}

#[utoipa::path(
    get,
    path = "/diseases",
    responses(
        (status = 200, description = "Supported diseases", body = ListDiseasesRes)
    )
)]
#[axum::debug_handler]
async fn list_diseases(State(state): State<AppState>) -> Json<ListDiseasesRes> {
    let diseases = state
        .screening
        .profiles()
        .iter()
        .map(|profile| DiseaseSummary {
            key: profile.key.to_string(),
            display_name: profile.display_name.to_string(),
            ready: state.is_ready(profile.key.as_str()),
        })
        .collect();

    Json(ListDiseasesRes { diseases })
}

#[utoipa::path(
    get,
    path = "/diseases/{disease}",
    params(("disease" = String, Path, description = "Disease key, e.g. `diabetes`")),
    responses(
        (status = 200, description = "Disease profile", body = DiseaseProfileRes),
        (status = 404, description = "Unknown disease", body = ErrorRes)
    )
)]
/// Describes one disease: its form fields and the two possible labels.
#[axum::debug_handler]
async fn get_disease(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<DiseaseProfileRes>> {
    let Path(disease) = path?;
    let profile = state.screening.profile(&disease)?;
    Ok(Json(DiseaseProfileRes::new(profile, state.is_ready(&disease))))
}

#[utoipa::path(
    post,
    path = "/predict/{disease}",
    params(("disease" = String, Path, description = "Disease key, e.g. `diabetes`")),
    request_body(
        content = String,
        content_type = "application/x-www-form-urlencoded",
        description = "One field per feature name"
    ),
    responses(
        (status = 303, description = "Screening recorded; redirects to the current result view"),
        (status = 400, description = "A value is not numeric", body = ErrorRes),
        (status = 415, description = "Body is not form-encoded", body = ErrorRes),
        (status = 404, description = "Unknown disease", body = ErrorRes),
        (status = 500, description = "The screening could not be stored", body = ErrorRes)
    )
)]
/// HTML form submission.
///
/// Records the screening and redirects (303) to `/results` for the new record in `current`
/// view mode.
#[axum::debug_handler]
async fn predict_form(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> ApiResult<Redirect> {
    let Path(disease) = path?;
    let Form(raw) = form?;
    let id = state.screening.submit(&disease, &raw)?;
    Ok(Redirect::to(&results_url(&disease, id)))
}

#[utoipa::path(
    post,
    path = "/api/screenings/{disease}",
    params(("disease" = String, Path, description = "Disease key, e.g. `diabetes`")),
    request_body = SubmitScreeningReq,
    responses(
        (status = 201, description = "Screening recorded", body = SubmitScreeningRes),
        (status = 400, description = "A value is not numeric or the body is not JSON", body = ErrorRes),
        (status = 415, description = "Body is not `application/json`", body = ErrorRes),
        (status = 422, description = "Feature values must be strings", body = ErrorRes),
        (status = 404, description = "Unknown disease", body = ErrorRes),
        (status = 500, description = "The screening could not be stored", body = ErrorRes)
    )
)]
/// JSON submission; same semantics as the form route.
#[axum::debug_handler]
async fn submit_screening(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<SubmitScreeningReq>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SubmitScreeningRes>)> {
    let Path(disease) = path?;
    let Json(req) = body?;
    let id = state.screening.submit(&disease, &req.features)?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitScreeningRes {
            id: id.to_string(),
            results_url: results_url(&disease, id),
            disease,
        }),
    ))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
struct ResultsQuery {
    /// Disease key. A missing key is reported like an unknown disease.
    disease: Option<String>,
    /// Record to show as the current screening.
    id: Option<String>,
    /// `current` shows only that record; anything else also lists the history.
    view: Option<String>,
}

#[utoipa::path(
    get,
    path = "/results",
    params(ResultsQuery),
    responses(
        (status = 200, description = "Result view", body = ResultViewRes),
        (status = 400, description = "Malformed query string", body = ErrorRes),
        (status = 404, description = "Unknown or missing disease", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn results(
    State(state): State<AppState>,
    query: Result<Query<ResultsQuery>, QueryRejection>,
) -> ApiResult<Json<ResultViewRes>> {
    let Query(query) = query?;
    let view = state.screening.result_view(
        query.disease.as_deref().unwrap_or_default(),
        query.id.as_deref(),
        query.view.as_deref(),
    )?;
    Ok(Json(ResultViewRes::from(view)))
}
