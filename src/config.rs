use crate::{Error, Result};
use rdkafka::ClientConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the SASL username.
pub const USERNAME_ENV: &str = "KAFKA_USER";
/// Environment variable holding the SASL password (the service API key).
pub const API_KEY_ENV: &str = "KAFKA_API_KEY";

/// TLS 1.2 AEAD suites. Restricting the cipher list to these refuses
/// anything older than TLS 1.2; TLS 1.3 suites are configured separately by
/// OpenSSL and stay available.
const TLS12_CIPHER_SUITES: &str = "ECDHE-ECDSA-AES256-GCM-SHA384:ECDHE-RSA-AES256-GCM-SHA384:\
ECDHE-ECDSA-AES128-GCM-SHA256:ECDHE-RSA-AES128-GCM-SHA256:\
ECDHE-ECDSA-CHACHA20-POLY1305:ECDHE-RSA-CHACHA20-POLY1305";

/// SASL credentials read from the process environment.
///
/// Missing values are passed through as absent; the client reports them as
/// an authentication or setup failure.
#[derive(Clone, Default)]
pub struct Credentials {
    pub username: Option<String>,
    pub api_key: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            api_key: Some(api_key.into()),
        }
    }

    pub fn from_env() -> Self {
        Self {
            username: env::var(USERNAME_ENV).ok(),
            api_key: env::var(API_KEY_ENV).ok(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
pub enum TlsVersion {
    #[default]
    #[serde(rename = "TLSv1.2")]
    Tls12,
}

impl TlsVersion {
    fn cipher_suites(self) -> &'static str {
        match self {
            Self::Tls12 => TLS12_CIPHER_SUITES,
        }
    }
}

/// Fixed connection profile applied to every producer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecurityProfile {
    #[serde(default)]
    pub min_tls_version: TlsVersion,
    #[serde(default = "default_trust_store")]
    pub trust_store: PathBuf,
    #[serde(default = "default_connections_max_idle_ms")]
    pub connections_max_idle_ms: u64,
    #[serde(default = "default_max_block_ms")]
    pub max_block_ms: u64,
}

impl Default for SecurityProfile {
    fn default() -> Self {
        Self {
            min_tls_version: TlsVersion::default(),
            trust_store: default_trust_store(),
            connections_max_idle_ms: default_connections_max_idle_ms(),
            max_block_ms: default_max_block_ms(),
        }
    }
}

impl SecurityProfile {
    pub fn max_block(&self) -> Duration {
        Duration::from_millis(self.max_block_ms)
    }
}

/// Validated inputs for a producer: where to connect, what to publish to,
/// and how to authenticate.
#[derive(Debug, Clone)]
pub struct ProducerSettings {
    brokers: String,
    topic: String,
    credentials: Credentials,
    profile: SecurityProfile,
}

impl ProducerSettings {
    /// Validates the broker address and topic.
    ///
    /// The topic is checked first, so a missing topic is reported whatever
    /// the broker value is.
    pub fn new(brokers: &str, topic: &str, credentials: Credentials) -> Result<Self> {
        if topic.trim().is_empty() {
            return Err(Error::Config("Missing required topic name.".to_string()));
        }
        if brokers.trim().is_empty() {
            return Err(Error::Config(
                "Missing required bootstrap server address.".to_string(),
            ));
        }

        Ok(Self {
            brokers: brokers.trim().to_string(),
            topic: topic.trim().to_string(),
            credentials,
            profile: SecurityProfile::default(),
        })
    }

    /// Same as [`ProducerSettings::new`] with credentials taken from
    /// `KAFKA_USER` and `KAFKA_API_KEY`.
    pub fn from_env(brokers: &str, topic: &str) -> Result<Self> {
        Self::new(brokers, topic, Credentials::from_env())
    }

    pub fn with_profile(mut self, profile: SecurityProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn brokers(&self) -> &str {
        &self.brokers
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn profile(&self) -> &SecurityProfile {
        &self.profile
    }

    /// Builds the librdkafka property set for a SASL_SSL producer.
    pub fn client_config(&self) -> ClientConfig {
        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", &self.brokers)
            .set("security.protocol", "SASL_SSL")
            .set(
                "ssl.cipher.suites",
                self.profile.min_tls_version.cipher_suites(),
            )
            .set(
                "ssl.ca.location",
                self.profile.trust_store.to_string_lossy(),
            )
            .set("ssl.endpoint.identification.algorithm", "https")
            .set("sasl.mechanisms", "PLAIN")
            .set(
                "connections.max.idle.ms",
                self.profile.connections_max_idle_ms.to_string(),
            )
            .set("message.timeout.ms", self.profile.max_block_ms.to_string())
            .set("retries", "0")
            .set("enable.idempotence", "false");

        if let Some(username) = &self.credentials.username {
            client_config.set("sasl.username", username);
        }
        if let Some(api_key) = &self.credentials.api_key {
            client_config.set("sasl.password", api_key);
        }

        client_config
    }
}

/// Settings file read by the `es-produce` binary.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub kafka: KafkaSection,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct KafkaSection {
    pub brokers: Option<String>,
    pub topic: Option<String>,
    #[serde(default)]
    pub profile: SecurityProfile,
}

impl FileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("EVENT_STREAMS")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

fn default_trust_store() -> PathBuf {
    PathBuf::from("resources/security/certs.pem")
}

fn default_connections_max_idle_ms() -> u64 {
    10_000
}

fn default_max_block_ms() -> u64 {
    4_000
}
