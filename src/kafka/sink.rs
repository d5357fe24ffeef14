use rdkafka::error::KafkaResult;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::ClientConfig;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Where an acknowledged record landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

impl Placement {
    pub fn new(topic: impl Into<String>, partition: i32, offset: i64) -> Self {
        Self {
            topic: topic.into(),
            partition,
            offset,
        }
    }
}

/// The Kafka client a [`ProducerHandle`](super::ProducerHandle) drives.
///
/// Implemented for rdkafka's [`FutureProducer`]; tests plug in fakes.
pub trait RecordSink: Sized + Send + Sync {
    /// Instantiates the client from a librdkafka property set.
    fn create(config: &ClientConfig) -> KafkaResult<Self>;

    /// Sends an unkeyed UTF-8 record and resolves once the broker
    /// acknowledges it or the delivery fails.
    fn deliver<'a>(
        &'a self,
        topic: &'a str,
        payload: &'a str,
        queue_timeout: Duration,
    ) -> impl Future<Output = KafkaResult<Placement>> + Send + 'a;

    /// Waits for every outstanding delivery.
    fn flush_pending(&self, timeout: Duration) -> KafkaResult<()>;
}

impl RecordSink for FutureProducer {
    fn create(config: &ClientConfig) -> KafkaResult<Self> {
        config.create()
    }

    fn deliver<'a>(
        &'a self,
        topic: &'a str,
        payload: &'a str,
        queue_timeout: Duration,
    ) -> impl Future<Output = KafkaResult<Placement>> + Send + 'a {
        async move {
            let record = FutureRecord::<(), str>::to(topic).payload(payload);

            self.send(record, queue_timeout)
                .await
                .map(|(partition, offset)| Placement::new(topic, partition, offset))
                .map_err(|(e, _)| e)
        }
    }

    fn flush_pending(&self, timeout: Duration) -> KafkaResult<()> {
        self.flush(timeout)
    }
}
