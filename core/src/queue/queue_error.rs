use fair_queue_utils_rs::FairLockError;
use thiserror::Error;

/// Raised when a queue cannot be constructed.
///
/// Whatever was built before the failure has already been dropped when this
/// is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
  #[error("capacity must be greater than zero")]
  ZeroCapacity,
  #[error("failed to allocate storage for {capacity} elements")]
  Allocation { capacity: usize },
  #[error("failed to initialize fair lock: {0}")]
  Lock(#[from] FairLockError),
}

/// Outcome of a queue operation that did not succeed.
///
/// Variants carrying an element hand the rejected element back to the
/// producer; the queue never keeps or drops it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError<E> {
  /// A non-blocking insert found no space.
  #[error("queue: full")]
  Full(E),
  /// A non-blocking removal found no element.
  #[error("queue: empty")]
  Empty,
  /// The queue was closed or destroyed before or during the call.
  #[error("queue: closed")]
  Closed(Option<E>),
  /// A fair lock failed while the call was in flight.
  #[error("queue: lock failure: {1}")]
  Lock(Option<E>, #[source] FairLockError),
  /// The worker running a blocking call on behalf of an async caller was lost.
  #[error("queue: interrupted")]
  Interrupted,
}

impl<E> QueueError<E> {
  pub fn is_full(&self) -> bool {
    matches!(self, QueueError::Full(_))
  }

  pub fn is_empty(&self) -> bool {
    matches!(self, QueueError::Empty)
  }

  pub fn is_closed(&self) -> bool {
    matches!(self, QueueError::Closed(_))
  }

  /// Recovers the element a rejected insert handed back, if any.
  pub fn into_element(self) -> Option<E> {
    match self {
      QueueError::Full(element) => Some(element),
      QueueError::Closed(element) | QueueError::Lock(element, _) => element,
      QueueError::Empty | QueueError::Interrupted => None,
    }
  }
}

static_assertions::assert_impl_all!(InitError: Send, Sync);
static_assertions::assert_impl_all!(QueueError<u32>: Send, Sync);
