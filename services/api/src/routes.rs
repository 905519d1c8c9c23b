use crate::infra::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use barnehage::error::AppError;
use barnehage::intake::{intake_router, IntakeRepository, IntakeService};
use barnehage::statistics::{
    aggregate, chart, AverageExtreme, CoverageTable, RankedAverage, SeriesPoint, YearExtreme,
    YearMinimum,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Year column reported when a summary request does not name one.
const DEFAULT_SUMMARY_YEAR: &str = "y23";

#[derive(Debug, Deserialize)]
pub(crate) struct SummaryRequest {
    #[serde(default)]
    pub(crate) year: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SummaryResponse {
    pub(crate) year: String,
    pub(crate) maximum: Option<YearExtreme>,
    pub(crate) minimum: Option<YearMinimum>,
    pub(crate) mean: Option<f64>,
    pub(crate) highest_average: Vec<AverageExtreme>,
    pub(crate) lowest_average: Vec<AverageExtreme>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChartRequest {
    pub(crate) municipality: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChartResponse {
    pub(crate) municipality: String,
    pub(crate) points: Vec<SeriesPoint>,
    pub(crate) spec: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TopRequest {
    #[serde(default = "default_top_limit")]
    pub(crate) limit: usize,
}

fn default_top_limit() -> usize {
    10
}

#[derive(Debug, Serialize)]
pub(crate) struct TopResponse {
    pub(crate) municipalities: Vec<RankedAverage>,
}

pub(crate) fn with_service_routes<R>(
    intake: Arc<IntakeService<R>>,
    table: Arc<CoverageTable>,
) -> axum::Router
where
    R: IntakeRepository + 'static,
{
    intake_router(intake)
        .merge(statistics_router(table))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

fn statistics_router(table: Arc<CoverageTable>) -> axum::Router {
    axum::Router::new()
        .route(
            "/api/v1/municipalities",
            axum::routing::get(municipalities_endpoint),
        )
        .route(
            "/api/v1/statistics/summary",
            axum::routing::post(summary_endpoint),
        )
        .route(
            "/api/v1/statistics/chart",
            axum::routing::post(chart_endpoint),
        )
        .route("/api/v1/statistics/top", axum::routing::post(top_endpoint))
        .with_state(table)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn municipalities_endpoint(
    State(table): State<Arc<CoverageTable>>,
) -> Json<serde_json::Value> {
    Json(json!({ "municipalities": table.municipalities() }))
}

pub(crate) async fn summary_endpoint(
    State(table): State<Arc<CoverageTable>>,
    Json(payload): Json<SummaryRequest>,
) -> Result<Json<SummaryResponse>, AppError> {
    let code = payload
        .year
        .unwrap_or_else(|| DEFAULT_SUMMARY_YEAR.to_string());
    let year = aggregate::parse_year(&code)?;

    Ok(Json(SummaryResponse {
        year: code,
        maximum: aggregate::year_max(&table, year),
        minimum: aggregate::year_min(&table, year),
        mean: aggregate::year_mean(&table, year),
        highest_average: aggregate::max_average_entries(&table),
        lowest_average: aggregate::min_average_entries(&table),
    }))
}

pub(crate) async fn chart_endpoint(
    State(table): State<Arc<CoverageTable>>,
    Json(payload): Json<ChartRequest>,
) -> Result<Json<ChartResponse>, AppError> {
    let points = chart::municipality_series(&table, &payload.municipality)?;
    let spec = chart::line_chart_spec(&payload.municipality, &points);

    Ok(Json(ChartResponse {
        municipality: payload.municipality,
        points,
        spec,
    }))
}

pub(crate) async fn top_endpoint(
    State(table): State<Arc<CoverageTable>>,
    Json(payload): Json<TopRequest>,
) -> Json<TopResponse> {
    Json(TopResponse {
        municipalities: aggregate::top_averages(&table, payload.limit),
    })
}
