use crate::cli::ServeArgs;
use crate::infra::{AppState, ConfiguredRegistry, InMemoryAllocationLedger};
use crate::routes::with_allocation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use fund_allocator::allocation::{FundAccountRegistry, FundAllocationService};
use fund_allocator::config::AppConfig;
use fund_allocator::error::AppError;
use fund_allocator::telemetry;
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
    if let Some(accounts) = args.accounts.take() {
        config.registry.accounts_path = Some(accounts);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let registry = ConfiguredRegistry::from_path(config.registry.accounts_path.clone());
    let snapshot = registry.snapshot()?;
    let count = snapshot.all()?.len();
    if count == 0 {
        warn!(
            source = %registry.describe(),
            "fund account registry is empty; every application will be unallocated"
        );
    } else {
        info!(
            source = %registry.describe(),
            count,
            "fund account registry loaded"
        );
    }

    let allocation_service = Arc::new(FundAllocationService::new(
        Arc::new(snapshot),
        Arc::new(InMemoryAllocationLedger::default()),
        config.selection.selector(),
    ));

    let app = with_allocation_routes(allocation_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        distance_mode = config.selection.distance_mode.label(),
        order = config.selection.order.label(),
        "fund allocator ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
