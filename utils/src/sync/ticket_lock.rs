use parking_lot::{Condvar, Mutex};

use super::{FairLock, FairLockError, WeakAcquisition};

#[cfg(test)]
mod tests;

#[derive(Debug, Default)]
struct TicketState {
  next_ticket: u64,
  now_serving: u64,
  weak_blocked: bool,
  destroyed: bool,
}

impl TicketState {
  // No holder and nobody queued.
  fn is_idle(&self) -> bool {
    self.next_ticket == self.now_serving
  }

  fn draw_ticket(&mut self) -> Result<u64, FairLockError> {
    let ticket = self.next_ticket;
    self.next_ticket = ticket.checked_add(1).ok_or(FairLockError::TicketOverflow)?;
    Ok(ticket)
  }
}

/// Ticket-based [`FairLock`].
///
/// Every strong acquisition draws the next ticket and parks until that ticket
/// is being served, so the lock is handed over in exactly the order tickets
/// were drawn. A weak acquisition only succeeds on an idle lock and then takes
/// the next ticket itself, which keeps it from overtaking anybody.
#[derive(Debug, Default)]
pub struct TicketLock {
  state: Mutex<TicketState>,
  turn: Condvar,
}

impl TicketLock {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of tickets drawn but not yet released: the holder plus every
  /// queued waiter.
  pub fn outstanding(&self) -> u64 {
    let state = self.state.lock();
    state.next_ticket - state.now_serving
  }

  pub fn is_locked(&self) -> bool {
    !self.state.lock().is_idle()
  }

  pub fn is_destroyed(&self) -> bool {
    self.state.lock().destroyed
  }
}

impl FairLock for TicketLock {
  fn try_new() -> Result<Self, FairLockError> {
    Ok(Self::new())
  }

  fn acquire_strong(&self) -> Result<(), FairLockError> {
    let mut state = self.state.lock();
    if state.destroyed {
      return Err(FairLockError::Destroyed);
    }
    let ticket = state.draw_ticket()?;
    while state.now_serving != ticket {
      self.turn.wait(&mut state);
      if state.destroyed {
        return Err(FairLockError::Destroyed);
      }
    }
    Ok(())
  }

  fn acquire_weak(&self) -> Result<WeakAcquisition, FairLockError> {
    let mut state = self.state.lock();
    if state.destroyed {
      return Err(FairLockError::Destroyed);
    }
    if state.weak_blocked || !state.is_idle() {
      return Ok(WeakAcquisition::Abandoned);
    }
    state.draw_ticket()?;
    Ok(WeakAcquisition::Granted)
  }

  fn release(&self) {
    let mut state = self.state.lock();
    if state.is_idle() {
      tracing::warn!("TicketLock::release: lock is not held");
      return;
    }
    state.now_serving += 1;
    let has_waiters = !state.is_idle();
    drop(state);
    if has_waiters {
      self.turn.notify_all();
    }
  }

  fn block_weak_acquisitions(&self) {
    self.state.lock().weak_blocked = true;
  }

  fn allow_weak_acquisitions(&self) {
    self.state.lock().weak_blocked = false;
  }

  fn is_weak_blocked(&self) -> bool {
    self.state.lock().weak_blocked
  }

  fn destroy(&self) {
    let mut state = self.state.lock();
    if state.destroyed {
      return;
    }
    state.destroyed = true;
    let waiters = state.next_ticket - state.now_serving;
    drop(state);
    tracing::debug!("TicketLock::destroy: outstanding tickets = {}", waiters);
    self.turn.notify_all();
  }
}

static_assertions::assert_impl_all!(TicketLock: Send, Sync);
