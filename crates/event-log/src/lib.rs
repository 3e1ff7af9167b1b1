pub mod error;
pub mod event;
pub mod log;
pub mod memory;
pub mod topic;

pub use common::AggregateId;
pub use error::{BoxError, EventLogError, Result};
pub use event::{EventEnvelope, EventEnvelopeBuilder, EventId, Sequence};
pub use log::{CascadeGuard, EventLog, EventLogExt, Handler, HandlerResult};
pub use memory::InMemoryEventLog;
pub use topic::Topic;
