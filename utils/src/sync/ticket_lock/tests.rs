use std::env;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use rstest::*;
use tracing_subscriber::EnvFilter;

use crate::sync::{FairLock, FairLockError, TicketLock, WeakAcquisition};

fn init_tracing() {
  env::set_var("RUST_LOG", "debug");
  let _ = tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .try_init();
}

fn wait_for_outstanding(lock: &TicketLock, expected: u64) {
  while lock.outstanding() != expected {
    thread::sleep(Duration::from_millis(1));
  }
}

#[test]
fn test_strong_acquire_and_release() {
  init_tracing();
  let lock = TicketLock::new();
  assert!(!lock.is_locked());

  lock.acquire_strong().unwrap();
  assert!(lock.is_locked());
  assert_eq!(lock.outstanding(), 1);

  lock.release();
  assert!(!lock.is_locked());
  assert_eq!(lock.outstanding(), 0);
}

#[rstest]
#[case(2)]
#[case(4)]
#[case(8)]
fn test_strong_waiters_are_granted_in_arrival_order(#[case] waiters: usize) {
  init_tracing();
  let lock = Arc::new(TicketLock::new());
  let granted = Arc::new(Mutex::new(Vec::new()));

  lock.acquire_strong().unwrap();

  let mut handles = Vec::new();
  for id in 0..waiters {
    let waiter_lock = lock.clone();
    let granted = granted.clone();
    handles.push(thread::spawn(move || {
      waiter_lock.acquire_strong().unwrap();
      granted.lock().push(id);
      waiter_lock.release();
    }));
    // the holder plus every waiter spawned so far
    wait_for_outstanding(&lock, id as u64 + 2);
  }

  lock.release();
  for handle in handles {
    handle.join().unwrap();
  }

  assert_eq!(*granted.lock(), (0..waiters).collect::<Vec<_>>());
  assert!(!lock.is_locked());
}

#[test]
fn test_weak_acquire_on_idle_lock_is_granted() {
  let lock = TicketLock::new();
  assert_eq!(lock.acquire_weak().unwrap(), WeakAcquisition::Granted);
  assert!(lock.is_locked());
  lock.release();
  assert!(!lock.is_locked());
}

#[test]
fn test_weak_acquire_on_held_lock_is_abandoned() {
  let lock = TicketLock::new();
  lock.acquire_strong().unwrap();

  assert_eq!(lock.acquire_weak().unwrap(), WeakAcquisition::Abandoned);
  // an abandoned attempt draws no ticket
  assert_eq!(lock.outstanding(), 1);

  lock.release();
}

#[test]
fn test_weak_acquire_never_overtakes_queued_waiter() {
  let lock = Arc::new(TicketLock::new());
  let (acquired_tx, acquired_rx) = mpsc::channel();
  let (release_tx, release_rx) = mpsc::channel::<()>();
  lock.acquire_strong().unwrap();

  let waiter = {
    let waiter_lock = lock.clone();
    thread::spawn(move || {
      waiter_lock.acquire_strong().unwrap();
      acquired_tx.send(()).unwrap();
      release_rx.recv().unwrap();
      waiter_lock.release();
    })
  };
  wait_for_outstanding(&lock, 2);

  lock.release();
  // the turn already belongs to the waiter, whether or not it has woken yet
  assert_eq!(lock.acquire_weak().unwrap(), WeakAcquisition::Abandoned);
  assert_eq!(lock.outstanding(), 1);

  acquired_rx.recv().unwrap();
  assert_eq!(lock.acquire_weak().unwrap(), WeakAcquisition::Abandoned);
  release_tx.send(()).unwrap();
  waiter.join().unwrap();

  assert_eq!(lock.acquire_weak().unwrap(), WeakAcquisition::Granted);
  lock.release();
  assert_eq!(lock.outstanding(), 0);
}

#[test]
fn test_blocked_weak_acquisitions_are_abandoned_until_allowed() {
  let lock = TicketLock::new();
  lock.block_weak_acquisitions();
  assert!(lock.is_weak_blocked());
  assert_eq!(lock.acquire_weak().unwrap(), WeakAcquisition::Abandoned);
  assert!(!lock.is_locked());

  // strong acquisitions are unaffected
  lock.acquire_strong().unwrap();
  lock.release();

  lock.allow_weak_acquisitions();
  assert!(!lock.is_weak_blocked());
  assert!(lock.acquire_weak().unwrap().is_granted());
  lock.release();
}

#[test]
fn test_destroy_fails_parked_and_later_acquisitions() {
  init_tracing();
  let lock = Arc::new(TicketLock::new());
  lock.acquire_strong().unwrap();

  let waiter = {
    let lock = lock.clone();
    thread::spawn(move || lock.acquire_strong())
  };
  wait_for_outstanding(&lock, 2);

  lock.destroy();
  assert_eq!(waiter.join().unwrap(), Err(FairLockError::Destroyed));
  assert!(lock.is_destroyed());
  assert_eq!(lock.acquire_strong(), Err(FairLockError::Destroyed));
  assert_eq!(lock.acquire_weak(), Err(FairLockError::Destroyed));
}

#[test]
fn test_release_without_holder_is_ignored() {
  init_tracing();
  let lock = TicketLock::new();
  lock.release();
  assert_eq!(lock.outstanding(), 0);
  assert!(lock.acquire_weak().unwrap().is_granted());
  lock.release();
}
