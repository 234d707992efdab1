use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use fair_queue_utils_rs::{FairLock, FairLockError, TicketLock, WeakAcquisition};
use parking_lot::{Condvar, Mutex};

use crate::queue::active_callers::{ActiveCallers, Lifecycle};
use crate::queue::ring_buffer::RingBuffer;
use crate::queue::weak_gate::WeakGate;
use crate::queue::{Config, ConfigOption, InitError, QueueError};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallMode {
  Blocking,
  NonBlocking,
}

#[derive(Debug)]
struct State<E> {
  buffer: RingBuffer<E>,
  closed: bool,
  producer_gate: WeakGate,
  consumer_gate: WeakGate,
}

struct Inner<E, L> {
  config: Config,
  capacity: usize,
  // serializes producers among themselves
  producer_lock: L,
  // serializes consumers among themselves
  consumer_lock: L,
  state: Mutex<State<E>>,
  changed: Condvar,
  active_callers: ActiveCallers,
}

/// Holds one side's fair lock for the rest of an operation.
struct SideGuard<'a, L: FairLock> {
  lock: &'a L,
}

impl<'a, L: FairLock> SideGuard<'a, L> {
  /// `Ok(None)` means a non-blocking attempt was abandoned.
  fn acquire(lock: &'a L, mode: CallMode) -> Result<Option<Self>, FairLockError> {
    match mode {
      CallMode::Blocking => lock.acquire_strong()?,
      CallMode::NonBlocking => {
        if lock.acquire_weak()? == WeakAcquisition::Abandoned {
          return Ok(None);
        }
      }
    }
    Ok(Some(Self { lock }))
  }
}

impl<L: FairLock> Drop for SideGuard<'_, L> {
  fn drop(&mut self) {
    self.lock.release();
  }
}

/// Fixed-capacity FIFO queue that serves blocked producers and consumers in
/// arrival order.
///
/// Producers are ordered by one fair lock and consumers by another; a single
/// state mutex guards the buffer itself. Lock order is always: active-caller
/// registration, side fair lock, state mutex.
///
/// Handles are cheap to clone and share one queue.
///
/// # Examples
///
/// ```
/// use fair_queue_core_rs::{BlockingQueue, QueueError};
///
/// let queue = BlockingQueue::new(1).unwrap();
/// queue.add(1).unwrap();
/// assert_eq!(queue.add(2), Err(QueueError::Full(2)));
/// assert_eq!(queue.poll(), Ok(1));
/// assert_eq!(queue.poll(), Err(QueueError::Empty));
///
/// queue.put(3).unwrap();
/// assert_eq!(queue.take(), Ok(3));
/// assert!(queue.destroy().is_empty());
/// ```
pub struct BlockingQueue<E, L: FairLock = TicketLock> {
  inner: Arc<Inner<E, L>>,
}

impl<E> BlockingQueue<E> {
  /// Creates a queue holding at most `capacity` elements.
  pub fn new(capacity: usize) -> Result<Self, InitError> {
    Self::with_config(Config::from([ConfigOption::with_capacity(capacity)]))
  }
}

impl<E, L: FairLock> BlockingQueue<E, L> {
  pub fn with_config(config: Config) -> Result<Self, InitError> {
    let buffer = RingBuffer::try_with_capacity(config.capacity)?;
    let consumer_lock = L::try_new()?;
    let producer_lock = L::try_new()?;
    tracing::debug!("{}BlockingQueue::init: capacity = {}", config.log_prefix, config.capacity);
    Ok(Self {
      inner: Arc::new(Inner {
        capacity: config.capacity,
        config,
        producer_lock,
        consumer_lock,
        state: Mutex::new(State {
          buffer,
          closed: false,
          producer_gate: WeakGate::Open,
          consumer_gate: WeakGate::Open,
        }),
        changed: Condvar::new(),
        active_callers: ActiveCallers::new(),
      }),
    })
  }

  /// Inserts without blocking.
  ///
  /// # Returns
  ///
  /// * `Ok(())` - The element was enqueued
  /// * `Err(QueueError::Full(element))` - No space, or another producer is in the way
  /// * `Err(QueueError::Closed(Some(element)))` - The queue was closed
  /// * `Err(QueueError::Lock(Some(element), _))` - The producer lock failed
  pub fn add(&self, element: E) -> Result<(), QueueError<E>> {
    self.insert(element, CallMode::NonBlocking)
  }

  /// Inserts, waiting for space if necessary. Waiting producers are served
  /// in arrival order.
  ///
  /// # Returns
  ///
  /// * `Ok(())` - The element was enqueued
  /// * `Err(QueueError::Closed(Some(element)))` - The queue was closed before space appeared
  /// * `Err(QueueError::Lock(Some(element), _))` - The producer lock failed
  pub fn put(&self, element: E) -> Result<(), QueueError<E>> {
    self.insert(element, CallMode::Blocking)
  }

  /// Removes the front element without blocking.
  ///
  /// # Returns
  ///
  /// * `Ok(element)` - The oldest element
  /// * `Err(QueueError::Empty)` - Nothing to take, or another consumer is in the way
  /// * `Err(QueueError::Closed(None))` - The queue was closed
  /// * `Err(QueueError::Lock(None, _))` - The consumer lock failed
  pub fn poll(&self) -> Result<E, QueueError<E>> {
    self.remove(CallMode::NonBlocking)
  }

  /// Removes the front element, waiting for one if necessary. Waiting
  /// consumers are served in arrival order.
  ///
  /// # Returns
  ///
  /// * `Ok(element)` - The oldest element
  /// * `Err(QueueError::Closed(None))` - The queue was closed before an element appeared
  /// * `Err(QueueError::Lock(None, _))` - The consumer lock failed
  pub fn take(&self) -> Result<E, QueueError<E>> {
    self.remove(CallMode::Blocking)
  }

  fn insert(&self, element: E, mode: CallMode) -> Result<(), QueueError<E>> {
    let inner = &*self.inner;
    let Some(_call) = inner.active_callers.enter() else {
      return Err(QueueError::Closed(Some(element)));
    };
    let _side = match SideGuard::acquire(&inner.producer_lock, mode) {
      Ok(Some(guard)) => guard,
      Ok(None) if inner.state.lock().closed => return Err(QueueError::Closed(Some(element))),
      Ok(None) => return Err(QueueError::Full(element)),
      Err(error) => {
        tracing::warn!("{}BlockingQueue::insert: producer lock failed: {}", inner.config.log_prefix, error);
        return Err(QueueError::Lock(Some(element), error));
      }
    };

    let mut state = inner.state.lock();
    if state.closed {
      return Err(QueueError::Closed(Some(element)));
    }
    if state.buffer.is_full() {
      if state.producer_gate.block(&inner.producer_lock) {
        tracing::trace!("{}BlockingQueue::insert: full, weak producers blocked", inner.config.log_prefix);
      }
      if mode == CallMode::NonBlocking {
        return Err(QueueError::Full(element));
      }
      while state.buffer.is_full() && !state.closed {
        inner.changed.wait(&mut state);
      }
      if state.closed {
        return Err(QueueError::Closed(Some(element)));
      }
    }
    if state.consumer_gate.allow(&inner.consumer_lock) {
      tracing::trace!("{}BlockingQueue::insert: weak consumers allowed", inner.config.log_prefix);
    }
    inner.changed.notify_one();
    state.buffer.push_back(element).map_err(QueueError::Full)
  }

  fn remove(&self, mode: CallMode) -> Result<E, QueueError<E>> {
    let inner = &*self.inner;
    let Some(_call) = inner.active_callers.enter() else {
      return Err(QueueError::Closed(None));
    };
    let _side = match SideGuard::acquire(&inner.consumer_lock, mode) {
      Ok(Some(guard)) => guard,
      Ok(None) if inner.state.lock().closed => return Err(QueueError::Closed(None)),
      Ok(None) => return Err(QueueError::Empty),
      Err(error) => {
        tracing::warn!("{}BlockingQueue::remove: consumer lock failed: {}", inner.config.log_prefix, error);
        return Err(QueueError::Lock(None, error));
      }
    };

    let mut state = inner.state.lock();
    if state.closed {
      return Err(QueueError::Closed(None));
    }
    if state.buffer.is_empty() {
      if state.consumer_gate.block(&inner.consumer_lock) {
        tracing::trace!("{}BlockingQueue::remove: empty, weak consumers blocked", inner.config.log_prefix);
      }
      if mode == CallMode::NonBlocking {
        return Err(QueueError::Empty);
      }
      while state.buffer.is_empty() && !state.closed {
        inner.changed.wait(&mut state);
      }
      if state.closed {
        return Err(QueueError::Closed(None));
      }
    }
    if state.producer_gate.allow(&inner.producer_lock) {
      tracing::trace!("{}BlockingQueue::remove: weak producers allowed", inner.config.log_prefix);
    }
    inner.changed.notify_one();
    state.buffer.pop_front().ok_or(QueueError::Empty)
  }

  /// Closes the queue without releasing it.
  ///
  /// Every parked caller wakes up and, like every later caller, gets
  /// `QueueError::Closed`. Buffered elements stay in place until
  /// [`BlockingQueue::destroy`]. Calling this more than once has no effect.
  pub fn close(&self) {
    let inner = &*self.inner;
    let mut state = inner.state.lock();
    if state.closed {
      return;
    }
    state.closed = true;
    let remaining = state.buffer.len();
    drop(state);
    inner.changed.notify_all();
    tracing::debug!("{}BlockingQueue::close: remaining = {}", inner.config.log_prefix, remaining);
  }

  /// Closes the queue, waits until no caller is inside it any more and then
  /// releases the storage and both fair locks.
  ///
  /// Callers parked in `put` or `take` return `QueueError::Closed` before
  /// this returns. Elements still buffered are handed back oldest first; if
  /// another handle already finished destroying the queue the result is
  /// empty.
  pub fn destroy(self) -> Vec<E> {
    let inner = &*self.inner;
    tracing::debug!(
      "{}BlockingQueue::destroy: start, active callers = {}",
      inner.config.log_prefix,
      inner.active_callers.count()
    );
    self.close();
    let released = inner.active_callers.drain(
      || {
        inner.changed.notify_all();
      },
      || {
        let remaining = inner.state.lock().buffer.release();
        inner.producer_lock.destroy();
        inner.consumer_lock.destroy();
        remaining
      },
    );
    match released {
      Some(remaining) => {
        tracing::debug!(
          "{}BlockingQueue::destroy: finished, handed back = {}",
          inner.config.log_prefix,
          remaining.len()
        );
        remaining
      }
      None => Vec::new(),
    }
  }

  pub fn len(&self) -> usize {
    self.inner.state.lock().buffer.len()
  }

  pub fn capacity(&self) -> usize {
    self.inner.capacity
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn is_full(&self) -> bool {
    self.len() == self.inner.capacity
  }

  /// Number of elements that could be inserted right now without waiting.
  pub fn remaining_capacity(&self) -> usize {
    let state = self.inner.state.lock();
    if state.closed {
      return 0;
    }
    self.inner.capacity - state.buffer.len()
  }

  pub fn is_closed(&self) -> bool {
    self.inner.state.lock().closed
  }

  pub fn lifecycle(&self) -> Lifecycle {
    self.inner.active_callers.lifecycle()
  }

  /// Number of callers currently inside `add`, `put`, `poll` or `take`.
  pub fn active_callers(&self) -> usize {
    self.inner.active_callers.count()
  }

  pub fn config(&self) -> &Config {
    &self.inner.config
  }

  #[cfg(test)]
  fn producer_lock(&self) -> &L {
    &self.inner.producer_lock
  }

  #[cfg(test)]
  fn consumer_lock(&self) -> &L {
    &self.inner.consumer_lock
  }
}

impl<E, L: FairLock> Clone for BlockingQueue<E, L> {
  fn clone(&self) -> Self {
    Self {
      inner: self.inner.clone(),
    }
  }
}

impl<E, L: FairLock> Debug for BlockingQueue<E, L> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let state = self.inner.state.lock();
    f.debug_struct("BlockingQueue")
      .field("capacity", &self.inner.capacity)
      .field("len", &state.buffer.len())
      .field("closed", &state.closed)
      .field("producer_gate", &state.producer_gate)
      .field("consumer_gate", &state.consumer_gate)
      .finish()
  }
}

static_assertions::assert_impl_all!(BlockingQueue<u32>: Send, Sync, Clone);
