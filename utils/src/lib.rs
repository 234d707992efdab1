//! Fairness primitives shared by the Fair Queue crates.

pub mod sync;

pub use sync::{FairLock, FairLockError, TicketLock, WeakAcquisition};
