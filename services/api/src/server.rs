use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryIntakeRepository};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use barnehage::config::AppConfig;
use barnehage::error::AppError;
use barnehage::intake::{FacilityRoster, IntakeService};
use barnehage::statistics::{loader, CoverageTable};
use barnehage::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let table = match &config.data.workbook {
        Some(path) => loader::load_workbook(path, &config.data.sheet)?,
        None => {
            warn!("APP_WORKBOOK not set, starting with an empty coverage table");
            CoverageTable::default()
        }
    };

    let roster = match &config.data.facility_roster {
        Some(path) => FacilityRoster::from_path(path)?,
        None => FacilityRoster::standard(),
    };

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryIntakeRepository::with_roster(roster));
    let intake_service = Arc::new(IntakeService::new(repository));

    let app = with_service_routes(intake_service, Arc::new(table))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "kindergarten statistics service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
