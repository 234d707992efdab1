use super::FairLockError;

/// Outcome of [`FairLock::acquire_weak`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeakAcquisition {
  /// The lock is now held by the caller and must be released.
  Granted,
  /// The lock was not taken. The caller did not queue and holds nothing.
  Abandoned,
}

impl WeakAcquisition {
  pub fn is_granted(&self) -> bool {
    matches!(self, WeakAcquisition::Granted)
  }
}

/// A mutual-exclusion primitive that grants blocking waiters in arrival order.
///
/// Besides the usual blocking acquisition, a fair lock offers a *weak*
/// acquisition that never waits: it either takes an idle lock immediately or
/// gives up without disturbing the queue of strong waiters. Weak acquisitions
/// can be administratively disabled, so callers that already know no progress
/// is possible fail fast instead of racing for the lock.
///
/// Every method takes `&self` and must be safe to call from many threads at
/// once.
pub trait FairLock: Send + Sync {
  /// Constructs a new, unlocked instance with weak acquisitions allowed.
  ///
  /// # Returns
  ///
  /// * `Ok(lock)` - The lock is ready for use
  /// * `Err(FairLockError)` - An underlying resource could not be created
  fn try_new() -> Result<Self, FairLockError>
  where
    Self: Sized;

  /// Blocks until the lock is granted to the caller.
  ///
  /// Waiters are granted strictly in the order they arrived.
  ///
  /// # Returns
  ///
  /// * `Ok(())` - The caller now holds the lock
  /// * `Err(FairLockError)` - The primitive failed; the caller holds nothing
  fn acquire_strong(&self) -> Result<(), FairLockError>;

  /// Attempts to take the lock without blocking.
  ///
  /// Returns [`WeakAcquisition::Abandoned`] when weak acquisitions are blocked
  /// or when the lock is held or has queued waiters. An abandoned attempt never
  /// changes the order in which strong waiters are served.
  fn acquire_weak(&self) -> Result<WeakAcquisition, FairLockError>;

  /// Releases a lock held by the caller.
  ///
  /// Calling this without holding the lock breaks the contract.
  fn release(&self);

  /// Makes every subsequent [`FairLock::acquire_weak`] return
  /// [`WeakAcquisition::Abandoned`] until [`FairLock::allow_weak_acquisitions`] is called.
  fn block_weak_acquisitions(&self);

  /// Lets weak acquisitions succeed again when the lock is idle.
  fn allow_weak_acquisitions(&self);

  /// Returns whether weak acquisitions are currently blocked.
  fn is_weak_blocked(&self) -> bool;

  /// Tears the lock down. Waiters still parked are woken and fail with
  /// [`FairLockError::Destroyed`], as does any later acquisition.
  fn destroy(&self);
}
