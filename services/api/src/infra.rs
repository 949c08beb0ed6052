use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;
use sscs_hearings::config::{AppConfig, MessagingConfig};
use sscs_hearings::error::AppError;
use sscs_hearings::hearings::listener::ConnectionString;
use sscs_hearings::hearings::{
    CaseMapper, CcdCredentials, HmcCredentials, HttpCcdClient, HttpHmcClient, S2sServiceAuth,
    ServiceAuthError, ServiceAuthValidator, ServiceBusSource, StaticServiceAuth, VenueDirectory,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Outbound adapters and reference data shared by the listeners and routes.
pub(crate) struct Adapters {
    pub(crate) ccd: Arc<HttpCcdClient>,
    pub(crate) hmc: Arc<HttpHmcClient>,
    pub(crate) auth: Arc<ServiceAuth>,
    pub(crate) venues: Arc<VenueDirectory>,
    pub(crate) mapper: CaseMapper,
}

impl Adapters {
    pub(crate) fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.http.timeout)
            .build()?;

        let ccd = HttpCcdClient::with_http_client(
            &config.ccd.base_url,
            CcdCredentials {
                idam_token: config.ccd.idam_token.clone(),
                s2s_token: config.auth.s2s_token.clone(),
            },
            http.clone(),
        );
        let hmc = HttpHmcClient::with_http_client(
            &config.hmc.base_url,
            HmcCredentials {
                idam_token: config.ccd.idam_token.clone(),
                s2s_token: config.auth.s2s_token.clone(),
                deployment_id: config.hmc.deployment_id.clone(),
            },
            http.clone(),
        );

        let auth = match &config.auth.s2s_url {
            Some(url) => ServiceAuth::S2s(S2sServiceAuth::with_http_client(
                url,
                config.auth.authorised_services.clone(),
                http,
            )),
            None => {
                warn!("S2S_URL not set; accepting only the configured development tokens");
                ServiceAuth::Static(StaticServiceAuth::new(config.auth.dev_tokens.clone()))
            }
        };

        let venues = VenueDirectory::load(config.venues.data_path.as_deref())?;
        info!(venues = venues.len(), "venue reference data loaded");

        Ok(Self {
            ccd: Arc::new(ccd),
            hmc: Arc::new(hmc),
            auth: Arc::new(auth),
            venues: Arc::new(venues),
            mapper: CaseMapper::new(&config.hearings.service_code, &config.hearings.exui_url),
        })
    }
}

/// Inbound service token check: the S2S provider, or a static allow-list.
pub(crate) enum ServiceAuth {
    S2s(S2sServiceAuth),
    Static(StaticServiceAuth),
}

#[async_trait]
impl ServiceAuthValidator for ServiceAuth {
    async fn validate(&self, token: &str) -> Result<String, ServiceAuthError> {
        match self {
            ServiceAuth::S2s(auth) => auth.validate(token).await,
            ServiceAuth::Static(auth) => auth.validate(token).await,
        }
    }
}

/// The two Service Bus entities this service consumes.
pub(crate) struct Sources {
    pub(crate) hmc_topic: ServiceBusSource,
    pub(crate) hearing_requests: ServiceBusSource,
}

impl Sources {
    /// `None` when no Service Bus namespace is configured.
    pub(crate) fn from_config(
        messaging: &MessagingConfig,
        timeout: Duration,
    ) -> Result<Option<Self>, AppError> {
        let Some(raw) = messaging.connection_string.as_deref() else {
            return Ok(None);
        };

        let connection = ConnectionString::parse(raw)?;
        info!(
            endpoint = %connection.endpoint,
            topic = %messaging.hmc_topic,
            subscription = %messaging.hmc_subscription,
            queue = %messaging.hearings_queue,
            "consuming from service bus"
        );
        Ok(Some(Self {
            hmc_topic: ServiceBusSource::subscription(
                &connection,
                &messaging.hmc_topic,
                &messaging.hmc_subscription,
                timeout,
            )?,
            hearing_requests: ServiceBusSource::queue(
                &connection,
                &messaging.hearings_queue,
                timeout,
            )?,
        }))
    }
}
