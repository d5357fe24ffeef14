#![allow(dead_code)]

use event_streams_producer::{Placement, RecordSink};
use rdkafka::error::{KafkaError, KafkaResult, RDKafkaErrorCode};
use rdkafka::ClientConfig;
use std::collections::HashMap;
use std::env;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

/// Brokers for tests that need a live SASL_SSL cluster.
pub fn test_brokers() -> String {
    env::var("TEST_KAFKA_BROKERS").unwrap_or_else(|_| "localhost:9093".to_string())
}

/// Topic for tests that need a live cluster, unique per process.
pub fn test_topic() -> String {
    format!("test_{}", std::process::id())
}

/// What a [`FakeSink`] saw, shared with the test that created it.
///
/// Probes are keyed by the bootstrap address so that tests running in
/// parallel stay isolated.
#[derive(Default)]
pub struct Probe {
    pub deliveries: AtomicUsize,
    pub flushes: AtomicUsize,
    pub dropped: AtomicBool,
    next_offset: AtomicI64,
    pub client_config: Mutex<Option<ClientConfig>>,
    pub queue_timeout: Mutex<Option<Duration>>,
}

static PROBES: OnceLock<Mutex<HashMap<String, Arc<Probe>>>> = OnceLock::new();

pub fn probe(brokers: &str) -> Arc<Probe> {
    let probes = PROBES.get_or_init(|| Mutex::new(HashMap::new()));
    probes
        .lock()
        .unwrap()
        .entry(brokers.to_string())
        .or_default()
        .clone()
}

#[derive(Debug, Clone, Copy)]
enum Behavior {
    Acknowledge,
    Unreachable,
    Cancel,
}

/// In-memory stand-in for the Kafka client.
///
/// The bootstrap address picks the behavior:
/// - `reject-*` fails client creation
/// - `unreachable-*` times every delivery out
/// - `cancel-*` cancels every delivery
/// - anything else acknowledges on partition 0 with increasing offsets
pub struct FakeSink {
    behavior: Behavior,
    probe: Arc<Probe>,
}

impl RecordSink for FakeSink {
    fn create(config: &ClientConfig) -> KafkaResult<Self> {
        let brokers = config.get("bootstrap.servers").unwrap_or_default();
        if brokers.starts_with("reject") {
            return Err(KafkaError::ClientCreation(
                "sasl.username and sasl.password must be set".to_string(),
            ));
        }

        let behavior = if brokers.starts_with("unreachable") {
            Behavior::Unreachable
        } else if brokers.starts_with("cancel") {
            Behavior::Cancel
        } else {
            Behavior::Acknowledge
        };

        let probe = probe(brokers);
        *probe.client_config.lock().unwrap() = Some(config.clone());

        Ok(Self { behavior, probe })
    }

    fn deliver<'a>(
        &'a self,
        topic: &'a str,
        _payload: &'a str,
        queue_timeout: Duration,
    ) -> impl Future<Output = KafkaResult<Placement>> + Send + 'a {
        async move {
            self.probe.deliveries.fetch_add(1, Ordering::SeqCst);
            *self.probe.queue_timeout.lock().unwrap() = Some(queue_timeout);

            match self.behavior {
                Behavior::Acknowledge => {
                    let offset = self.probe.next_offset.fetch_add(1, Ordering::SeqCst);
                    Ok(Placement::new(topic, 0, offset))
                }
                Behavior::Unreachable => Err(KafkaError::MessageProduction(
                    RDKafkaErrorCode::MessageTimedOut,
                )),
                Behavior::Cancel => Err(KafkaError::Canceled),
            }
        }
    }

    fn flush_pending(&self, _timeout: Duration) -> KafkaResult<()> {
        self.probe.flushes.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Unreachable => Err(KafkaError::Flush(RDKafkaErrorCode::OperationTimedOut)),
            _ => Ok(()),
        }
    }
}

impl Drop for FakeSink {
    fn drop(&mut self) {
        self.probe.dropped.store(true, Ordering::SeqCst);
    }
}
