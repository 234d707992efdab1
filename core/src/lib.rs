//! Fixed-capacity FIFO blocking queue with fair producer and consumer ordering.

pub mod queue;

pub use queue::*;

pub use fair_queue_utils_rs::{FairLock, FairLockError, TicketLock, WeakAcquisition};
