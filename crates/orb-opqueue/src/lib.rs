pub mod cutter;
pub mod queue;

pub use cutter::{BatchSink, Cutter};
pub use queue::{Operation, OperationQueue, QueueConfig};
