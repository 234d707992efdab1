use fair_queue_utils_rs::FairLock;

/// Cached view of whether a side's fair lock currently rejects weak
/// acquisitions, so the lock is only toggled on real transitions.
///
/// Mutated only under the queue's state mutex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum WeakGate {
  #[default]
  Open,
  Blocked,
}

impl WeakGate {
  /// Open -> Blocked. Returns `true` if the lock was toggled.
  pub(crate) fn block<L: FairLock>(&mut self, lock: &L) -> bool {
    match self {
      WeakGate::Open => {
        lock.block_weak_acquisitions();
        *self = WeakGate::Blocked;
        true
      }
      WeakGate::Blocked => false,
    }
  }

  /// Blocked -> Open. Returns `true` if the lock was toggled.
  pub(crate) fn allow<L: FairLock>(&mut self, lock: &L) -> bool {
    match self {
      WeakGate::Blocked => {
        lock.allow_weak_acquisitions();
        *self = WeakGate::Open;
        true
      }
      WeakGate::Open => false,
    }
  }
}
