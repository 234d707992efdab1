use thiserror::Error;

/// Failure reported by a [`FairLock`](super::FairLock) primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FairLockError {
  /// The lock was destroyed before or while the caller was waiting for it.
  #[error("fair lock: destroyed")]
  Destroyed,
  /// The ticket dispenser cannot hand out another ticket.
  #[error("fair lock: ticket counter overflowed")]
  TicketOverflow,
  /// The primitive could not be constructed.
  #[error("fair lock: initialization failed: {0}")]
  Initialization(&'static str),
}

static_assertions::assert_impl_all!(FairLockError: Send, Sync);
