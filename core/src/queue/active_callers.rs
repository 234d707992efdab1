use parking_lot::{Condvar, Mutex};

/// Where a queue is in its teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
  /// Accepting callers.
  Active,
  /// `destroy` has begun; waiting for in-flight callers to leave.
  Draining,
  /// No callers remain and storage has been released.
  Destroyed,
}

#[derive(Debug)]
struct Registry {
  count: usize,
  lifecycle: Lifecycle,
}

/// Counts callers currently inside a queue operation so teardown can wait
/// for quiescence.
#[derive(Debug)]
pub(crate) struct ActiveCallers {
  registry: Mutex<Registry>,
  quiescent: Condvar,
}

/// Registration of one in-flight caller; deregisters on drop.
#[derive(Debug)]
pub(crate) struct ActiveCall<'a> {
  callers: &'a ActiveCallers,
}

impl Drop for ActiveCall<'_> {
  fn drop(&mut self) {
    self.callers.leave();
  }
}

impl ActiveCallers {
  pub(crate) fn new() -> Self {
    Self {
      registry: Mutex::new(Registry {
        count: 0,
        lifecycle: Lifecycle::Active,
      }),
      quiescent: Condvar::new(),
    }
  }

  /// Registers the caller. Returns `None` once teardown has started.
  pub(crate) fn enter(&self) -> Option<ActiveCall<'_>> {
    let mut registry = self.registry.lock();
    if registry.lifecycle != Lifecycle::Active {
      return None;
    }
    registry.count += 1;
    Some(ActiveCall { callers: self })
  }

  fn leave(&self) {
    let mut registry = self.registry.lock();
    registry.count -= 1;
    self.quiescent.notify_all();
  }

  pub(crate) fn count(&self) -> usize {
    self.registry.lock().count
  }

  pub(crate) fn lifecycle(&self) -> Lifecycle {
    self.registry.lock().lifecycle
  }

  /// Moves to [`Lifecycle::Draining`], waits until no caller is registered and
  /// then runs `release` exactly once across all drainers.
  ///
  /// `wake` is called before every wait so parked callers can observe the
  /// closed queue and leave. It must not block or take the registry.
  /// Returns `None` if another drainer already released.
  pub(crate) fn drain<R>(&self, mut wake: impl FnMut(), release: impl FnOnce() -> R) -> Option<R> {
    let mut registry = self.registry.lock();
    if registry.lifecycle == Lifecycle::Active {
      registry.lifecycle = Lifecycle::Draining;
    }
    while registry.count > 0 {
      wake();
      self.quiescent.wait(&mut registry);
    }
    if registry.lifecycle == Lifecycle::Destroyed {
      return None;
    }
    let released = release();
    registry.lifecycle = Lifecycle::Destroyed;
    Some(released)
  }
}
