use crate::cli::ServeArgs;
use crate::infra::{Adapters, AppState, Sources};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use sscs_hearings::config::AppConfig;
use sscs_hearings::error::AppError;
use sscs_hearings::hearings::{
    service_hearings_router, HearingRequestHandler, HearingsJourneyService, HearingsService,
    HmcMessageHandler, Listener, ServiceHearingValuesService,
};
use sscs_hearings::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let adapters = Adapters::from_config(&config)?;
    let sources = Sources::from_config(&config.messaging, config.http.timeout)?;

    let journey = Arc::new(HearingsJourneyService::new(
        adapters.ccd.clone(),
        adapters.hmc.clone(),
        adapters.venues.clone(),
    ));
    let hearings = Arc::new(HearingsService::new(
        adapters.ccd.clone(),
        adapters.hmc.clone(),
        adapters.mapper.clone(),
    ));
    let values = Arc::new(ServiceHearingValuesService::new(
        adapters.ccd.clone(),
        adapters.mapper.clone(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut listeners = Vec::new();
    match sources {
        Some(sources) => {
            let poll_interval = config.messaging.poll_interval;
            let hmc_listener = Listener::new(
                "hmc-topic",
                Arc::new(sources.hmc_topic),
                Arc::new(HmcMessageHandler::new(&config.hearings.service_code, journey)),
                poll_interval,
            );
            let request_listener = Listener::new(
                "hearing-requests",
                Arc::new(sources.hearing_requests),
                Arc::new(HearingRequestHandler::new(hearings)),
                poll_interval,
            );
            listeners.push(tokio::spawn({
                let shutdown = shutdown_rx.clone();
                async move { hmc_listener.run(shutdown).await }
            }));
            listeners.push(tokio::spawn(async move {
                request_listener.run(shutdown_rx).await
            }));
        }
        None => warn!("SERVICE_BUS_CONNECTION_STRING not set; hearing listeners disabled"),
    }

    let app = with_operational_routes(service_hearings_router(values, adapters.auth.clone()))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        service_code = %config.hearings.service_code,
        "hearings api ready"
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    readiness_flag.store(false, Ordering::Release);
    let _ = shutdown_tx.send(true);
    for handle in listeners {
        if let Err(err) = handle.await {
            warn!(error = %err, "listener task ended abnormally");
        }
    }
    info!("hearings api stopped");

    served?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
