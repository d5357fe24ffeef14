pub mod config;
pub mod error;

pub mod kafka;

pub use config::{Credentials, ProducerSettings, SecurityProfile};
pub use error::{Error, PublishErrorKind, Result};
pub use kafka::{Placement, ProducerHandle, RecordSink};
