//! Azure Service Bus over its REST interface: peek-lock receive, complete by
//! deleting the lock, abandon by unlocking it.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use sha2::Sha256;
use tracing::debug;

use super::{Delivery, ListenerError, MessageSource};

type HmacSha256 = Hmac<Sha256>;

const TOKEN_TTL_SECS: i64 = 3600;
const RECEIVE_TIMEOUT_SECS: u64 = 30;

/// `Endpoint=sb://…;SharedAccessKeyName=…;SharedAccessKey=…`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    /// Namespace base URL, `https://` scheme, no trailing slash.
    pub endpoint: String,
    pub key_name: String,
    pub key: String,
}

impl ConnectionString {
    pub fn parse(raw: &str) -> Result<Self, ListenerError> {
        let mut endpoint = None;
        let mut key_name = None;
        let mut key = None;

        for part in raw.split(';').map(str::trim).filter(|part| !part.is_empty()) {
            let Some((name, value)) = part.split_once('=') else {
                return Err(ListenerError::ConnectionString(format!(
                    "malformed segment `{part}`"
                )));
            };
            match name.trim().to_ascii_lowercase().as_str() {
                "endpoint" => endpoint = Some(value.trim().to_string()),
                "sharedaccesskeyname" => key_name = Some(value.trim().to_string()),
                "sharedaccesskey" => key = Some(value.trim().to_string()),
                _ => {}
            }
        }

        let endpoint = endpoint
            .ok_or_else(|| ListenerError::ConnectionString("missing Endpoint".to_string()))?;
        let host = endpoint
            .strip_prefix("sb://")
            .or_else(|| endpoint.strip_prefix("https://"))
            .unwrap_or(&endpoint)
            .trim_end_matches('/');

        Ok(Self {
            endpoint: format!("https://{host}"),
            key_name: key_name.ok_or_else(|| {
                ListenerError::ConnectionString("missing SharedAccessKeyName".to_string())
            })?,
            key: key.ok_or_else(|| {
                ListenerError::ConnectionString("missing SharedAccessKey".to_string())
            })?,
        })
    }
}

/// Signs shared access signature tokens for one resource URI.
#[derive(Debug, Clone)]
pub struct SasTokenProvider {
    key_name: String,
    key: String,
}

impl SasTokenProvider {
    pub fn new(key_name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            key_name: key_name.into(),
            key: key.into(),
        }
    }

    /// Token for `resource_uri` valid until `expiry` (unix seconds).
    pub fn token(&self, resource_uri: &str, expiry: i64) -> Result<String, ListenerError> {
        let encoded_uri = urlencoding::encode(&resource_uri.to_ascii_lowercase()).into_owned();
        let string_to_sign = format!("{encoded_uri}\n{expiry}");

        let mut mac = <HmacSha256 as Mac>::new_from_slice(self.key.as_bytes())
            .map_err(|err| ListenerError::ConnectionString(err.to_string()))?;
        mac.update(string_to_sign.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());

        Ok(format!(
            "SharedAccessSignature sr={encoded_uri}&sig={}&se={expiry}&skn={}",
            urlencoding::encode(&signature),
            urlencoding::encode(&self.key_name),
        ))
    }

    fn current_token(&self, resource_uri: &str) -> Result<String, ListenerError> {
        self.token(resource_uri, Utc::now().timestamp() + TOKEN_TTL_SECS)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BrokerProperties {
    #[serde(default)]
    message_id: Option<String>,
    #[serde(default)]
    delivery_count: Option<u32>,
    #[serde(default)]
    lock_token: Option<String>,
}

/// Peek-lock consumer of a queue or topic subscription.
#[derive(Debug, Clone)]
pub struct ServiceBusSource {
    entity_url: String,
    tokens: SasTokenProvider,
    http: Client,
}

impl ServiceBusSource {
    /// Consumer for a queue.
    pub fn queue(
        connection: &ConnectionString,
        queue: &str,
        timeout: Duration,
    ) -> Result<Self, ListenerError> {
        Self::new(connection, &urlencoding::encode(queue), timeout)
    }

    /// Consumer for a topic subscription.
    pub fn subscription(
        connection: &ConnectionString,
        topic: &str,
        subscription: &str,
        timeout: Duration,
    ) -> Result<Self, ListenerError> {
        let entity = format!(
            "{}/subscriptions/{}",
            urlencoding::encode(topic),
            urlencoding::encode(subscription)
        );
        Self::new(connection, &entity, timeout)
    }

    fn new(
        connection: &ConnectionString,
        entity: &str,
        timeout: Duration,
    ) -> Result<Self, ListenerError> {
        // The receive call long-polls, so the client must outlive it.
        let http = Client::builder()
            .timeout(timeout + Duration::from_secs(RECEIVE_TIMEOUT_SECS))
            .build()?;
        Ok(Self::with_http_client(
            format!("{}/{entity}", connection.endpoint),
            SasTokenProvider::new(&connection.key_name, &connection.key),
            http,
        ))
    }

    pub fn with_http_client(
        entity_url: impl Into<String>,
        tokens: SasTokenProvider,
        http: Client,
    ) -> Self {
        Self {
            entity_url: entity_url.into().trim_end_matches('/').to_string(),
            tokens,
            http,
        }
    }

    fn authorization(&self) -> Result<String, ListenerError> {
        self.tokens.current_token(&self.entity_url)
    }

    /// `lock_token` holds the message's lock URI as returned in `Location`.
    async fn settle(
        &self,
        delivery: &Delivery,
        method: reqwest::Method,
    ) -> Result<(), ListenerError> {
        if delivery.lock_token.is_empty() {
            return Err(ListenerError::UnknownLock(delivery.message_id.clone()));
        }
        let response = self
            .http
            .request(method, &delivery.lock_token)
            .header("Authorization", self.authorization()?)
            .header("Content-Length", "0")
            .send()
            .await?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND | StatusCode::GONE => {
                Err(ListenerError::UnknownLock(delivery.message_id.clone()))
            }
            status => Err(ListenerError::Broker {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }
}

#[async_trait]
impl MessageSource for ServiceBusSource {
    async fn receive(&self) -> Result<Option<Delivery>, ListenerError> {
        let url = format!("{}/messages/head?timeout={RECEIVE_TIMEOUT_SECS}", self.entity_url);
        let response = self
            .http
            .post(&url)
            .header("Authorization", self.authorization()?)
            .header("Content-Length", "0")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ListenerError::Broker {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let properties: BrokerProperties = response
            .headers()
            .get("BrokerProperties")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| serde_json::from_str(value).ok())
            .unwrap_or_default();
        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        let message_id = properties
            .message_id
            .or_else(|| properties.lock_token.clone())
            .unwrap_or_default();
        let lock_token = match (location, properties.lock_token) {
            (Some(location), _) => location,
            (None, Some(lock)) => format!(
                "{}/messages/{}/{lock}",
                self.entity_url,
                urlencoding::encode(&message_id)
            ),
            (None, None) => String::new(),
        };
        debug!(%message_id, "service bus message locked");

        Ok(Some(Delivery {
            message_id,
            body,
            delivery_count: properties.delivery_count.unwrap_or(1),
            lock_token,
        }))
    }

    async fn complete(&self, delivery: &Delivery) -> Result<(), ListenerError> {
        self.settle(delivery, reqwest::Method::DELETE).await
    }

    async fn abandon(&self, delivery: &Delivery) -> Result<(), ListenerError> {
        self.settle(delivery, reqwest::Method::PUT).await
    }
}
