pub mod producer;
pub mod sink;


pub use producer::ProducerHandle;
pub use sink::{Placement, RecordSink};
