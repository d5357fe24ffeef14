//! Error types and result handling for event-streams-producer.
//!
//! This module defines the main error type [`Error`] and a convenience
//! [`Result`] type alias used throughout the crate.
//!
//! # Example
//!
//! ```rust
//! use event_streams_producer::{Error, Result};
//!
//! fn require_topic(topic: &str) -> Result<()> {
//!     if topic.is_empty() {
//!         return Err(Error::Config("Missing required topic name.".to_string()));
//!     }
//!     Ok(())
//! }
//!
//! match require_topic("") {
//!     Ok(()) => println!("Topic present"),
//!     Err(Error::Config(msg)) => eprintln!("Configuration error: {}", msg),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use std::fmt;
use thiserror::Error;

/// The main error type for producer operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A required construction parameter is missing or empty.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The Kafka client rejected the producer configuration.
    ///
    /// The underlying [`KafkaError`] is available through
    /// [`std::error::Error::source`].
    #[error("Connection setup error: {0}")]
    ConnectionSetup(#[source] KafkaError),

    /// A message could not be delivered to the broker.
    #[error("Publish error ({kind}): {source}")]
    Publish {
        /// Coarse classification of the failure
        kind: PublishErrorKind,
        /// Error reported by the Kafka client
        #[source]
        source: KafkaError,
    },

    /// The settings file or environment overrides could not be loaded.
    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    /// I/O error, typically while reading messages from stdin.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a publish failed.
///
/// The wrapper never retries; the kind only helps callers decide whether
/// retrying the whole `produce` call makes sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishErrorKind {
    /// The delivery was canceled before an acknowledgment arrived.
    Interrupted,
    /// No broker could be reached within the max-block window.
    Unreachable,
    /// The broker or client refused the record.
    Rejected,
}

impl PublishErrorKind {
    /// Classifies a client error returned from a send.
    pub fn classify(error: &KafkaError) -> Self {
        match error {
            KafkaError::Canceled => Self::Interrupted,
            other => match other.rdkafka_error_code() {
                Some(
                    RDKafkaErrorCode::MessageTimedOut
                    | RDKafkaErrorCode::AllBrokersDown
                    | RDKafkaErrorCode::BrokerTransportFailure
                    | RDKafkaErrorCode::Resolve
                    | RDKafkaErrorCode::Authentication
                    | RDKafkaErrorCode::SaslAuthenticationFailed
                    | RDKafkaErrorCode::RequestTimedOut,
                ) => Self::Unreachable,
                _ => Self::Rejected,
            },
        }
    }
}

impl fmt::Display for PublishErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Interrupted => "interrupted",
            Self::Unreachable => "unreachable",
            Self::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Wraps a send failure, classifying it on the way.
    pub fn publish(source: KafkaError) -> Self {
        Self::Publish {
            kind: PublishErrorKind::classify(&source),
            source,
        }
    }

    /// Returns the publish failure kind, if this is a publish error.
    pub fn publish_kind(&self) -> Option<PublishErrorKind> {
        match self {
            Self::Publish { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// A convenient Result type alias for producer operations.
///
/// This is equivalent to `std::result::Result<T, event_streams_producer::Error>`.
pub type Result<T> = std::result::Result<T, Error>;
