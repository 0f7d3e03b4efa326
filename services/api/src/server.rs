use crate::cli::ServeArgs;
use crate::infra::{AppState, OfficeService};
use crate::routes::with_office_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use exam_duty::config::AppConfig;
use exam_duty::error::AppError;
use exam_duty::telemetry;
use exam_duty::workflows::archive::PersistentOffice;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(data) = args.data.take() {
        config.office.data_path = data;
    }
    if let Some(seed) = args.seed.take() {
        config.office.shuffle_seed = Some(seed);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let session = PersistentOffice::open(config.office.store(), config.office.settings())?;
    let office_service = Arc::new(OfficeService::new(
        session,
        config.office.shuffler(),
        config.office.workload_policy,
    ));

    let app = with_office_routes(office_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        data = %config.office.data_path.display(),
        "exam duty service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
