use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub hearings: HearingsConfig,
    pub ccd: CcdConfig,
    pub hmc: HmcConfig,
    pub auth: ServiceAuthConfig,
    pub messaging: MessagingConfig,
    pub venues: VenueConfig,
    pub http: HttpClientConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&var_or("APP_ENV", "development"));

        let host = var_or("APP_HOST", "127.0.0.1");
        let port = var_or("APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = var_or("APP_LOG_LEVEL", "info");
        let format = match optional_var("APP_LOG_FORMAT") {
            Some(value) => LogFormat::from_str(&value),
            None if environment == AppEnvironment::Production => LogFormat::Json,
            None => LogFormat::Compact,
        };

        let hearings = HearingsConfig {
            service_code: var_or("HEARINGS_SERVICE_CODE", "BBA3"),
            exui_url: var_or("EXUI_URL", "http://localhost:3455"),
        };

        let ccd = CcdConfig {
            base_url: var_or("CCD_API_URL", "http://localhost:4452"),
            idam_token: optional_var("IDAM_BEARER_TOKEN"),
        };

        let hmc = HmcConfig {
            base_url: var_or("HMC_API_URL", "http://localhost:8084"),
            deployment_id: optional_var("HMC_DEPLOYMENT_ID"),
        };

        let auth = ServiceAuthConfig {
            s2s_token: optional_var("S2S_TOKEN"),
            s2s_url: optional_var("S2S_URL"),
            authorised_services: list_var("S2S_AUTHORISED_SERVICES", "hmc_cft_hearing_service"),
            dev_tokens: list_var("S2S_DEV_TOKENS", ""),
        };

        let messaging = MessagingConfig {
            connection_string: optional_var("SERVICE_BUS_CONNECTION_STRING"),
            hmc_topic: var_or("HMC_TOPIC_NAME", "hmc-to-cft"),
            hmc_subscription: var_or("HMC_SUBSCRIPTION_NAME", "hmc-to-sscs-subscription"),
            hearings_queue: var_or("HEARINGS_QUEUE_NAME", "tribunals-to-hearing-api"),
            poll_interval: Duration::from_millis(parse_u64("LISTENER_POLL_INTERVAL_MS", 1000)?),
        };

        let venues = VenueConfig {
            data_path: optional_var("VENUE_DATA_PATH").map(PathBuf::from),
        };

        let http = HttpClientConfig {
            timeout: Duration::from_secs(parse_u64("HTTP_TIMEOUT_SECS", 30)?),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, format },
            hearings,
            ccd,
            hmc,
            auth,
            messaging,
            venues,
            http,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn list_var(key: &str, default: &str) -> Vec<String> {
    var_or(key, default)
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn from_str(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Compact
        }
    }
}

/// Identity of this tribunal service on the hearings platform.
#[derive(Debug, Clone)]
pub struct HearingsConfig {
    /// HMCTS service code; messages for other services are skipped.
    pub service_code: String,
    /// Base URL used to build case deep links.
    pub exui_url: String,
}

#[derive(Debug, Clone)]
pub struct CcdConfig {
    pub base_url: String,
    pub idam_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HmcConfig {
    pub base_url: String,
    pub deployment_id: Option<String>,
}

/// Outbound service token plus the inbound service-to-service checks.
#[derive(Debug, Clone)]
pub struct ServiceAuthConfig {
    pub s2s_token: Option<String>,
    pub s2s_url: Option<String>,
    pub authorised_services: Vec<String>,
    pub dev_tokens: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MessagingConfig {
    /// When absent no listeners are started.
    pub connection_string: Option<String>,
    pub hmc_topic: String,
    pub hmc_subscription: String,
    pub hearings_queue: String,
    pub poll_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct VenueConfig {
    pub data_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key } => {
                write!(f, "{key} must be a non-negative integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_LOG_FORMAT",
            "HEARINGS_SERVICE_CODE",
            "SERVICE_BUS_CONNECTION_STRING",
            "LISTENER_POLL_INTERVAL_MS",
            "HTTP_TIMEOUT_SECS",
            "S2S_AUTHORISED_SERVICES",
            "S2S_DEV_TOKENS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.format, LogFormat::Compact);
        assert_eq!(config.hearings.service_code, "BBA3");
        assert!(config.messaging.connection_string.is_none());
        assert_eq!(config.messaging.poll_interval, Duration::from_millis(1000));
        assert_eq!(
            config.auth.authorised_services,
            vec!["hmc_cft_hearing_service".to_string()]
        );
        assert!(config.auth.dev_tokens.is_empty());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn production_defaults_to_json_logs() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "prod");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.telemetry.format, LogFormat::Json);
        reset_env();
    }

    #[test]
    fn rejects_non_numeric_poll_interval() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LISTENER_POLL_INTERVAL_MS", "soon");
        let err = AppConfig::load().expect_err("invalid interval rejected");
        assert!(err.to_string().contains("LISTENER_POLL_INTERVAL_MS"));
        reset_env();
    }

    #[test]
    fn splits_authorised_service_list() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("S2S_AUTHORISED_SERVICES", "hmc_cft_hearing_service, sscs ,");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(
            config.auth.authorised_services,
            vec!["hmc_cft_hearing_service".to_string(), "sscs".to_string()]
        );
        reset_env();
    }
}
