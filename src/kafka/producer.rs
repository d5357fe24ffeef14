use super::sink::{Placement, RecordSink};
use crate::config::ProducerSettings;
use crate::{Error, Result};
use rdkafka::producer::FutureProducer;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Publishes string messages to a single topic over SASL_SSL.
///
/// Dropping the handle without calling [`ProducerHandle::shutdown`] discards
/// anything the client still buffers.
pub struct ProducerHandle<S = FutureProducer> {
    topic: String,
    max_block: Duration,
    sink: S,
}

impl ProducerHandle<FutureProducer> {
    /// Connects to `broker` with credentials from `KAFKA_USER` and
    /// `KAFKA_API_KEY`.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if `topic` or `broker` is empty
    /// - [`Error::ConnectionSetup`] if librdkafka rejects the configuration
    pub fn new(broker: &str, topic: &str) -> Result<Self> {
        Self::from_settings(ProducerSettings::from_env(broker, topic)?)
    }
}

impl<S: RecordSink> ProducerHandle<S> {
    pub fn from_settings(settings: ProducerSettings) -> Result<Self> {
        let sink = S::create(&settings.client_config()).map_err(|e| {
            warn!(
                brokers = %settings.brokers(),
                topic = %settings.topic(),
                "Error while creating producer: {}",
                e
            );
            Error::ConnectionSetup(e)
        })?;

        info!(
            brokers = %settings.brokers(),
            topic = %settings.topic(),
            "Producer ready"
        );

        Ok(Self {
            topic: settings.topic().to_string(),
            max_block: settings.profile().max_block(),
            sink,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Publishes `message` without a key and waits for the acknowledgment.
    ///
    /// Delivery is attempted once; the caller decides whether to retry.
    #[instrument(skip(self, message), fields(topic = %self.topic, bytes = message.len()))]
    pub async fn produce(&self, message: &str) -> Result<Placement> {
        match self.sink.deliver(&self.topic, message, self.max_block).await {
            Ok(placement) => {
                debug!(
                    partition = placement.partition,
                    offset = placement.offset,
                    "Message acknowledged"
                );
                Ok(placement)
            }
            Err(e) => {
                let err = Error::publish(e);
                warn!("Message delivery failed: {}", err);
                Err(err)
            }
        }
    }

    /// Flushes buffered records and closes the connection.
    pub fn shutdown(self) {
        if let Err(e) = self.sink.flush_pending(self.max_block) {
            warn!(topic = %self.topic, "Flush before shutdown failed: {}", e);
        }
        info!(topic = %self.topic, "Producer closed");
    }
}
