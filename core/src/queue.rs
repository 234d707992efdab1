mod active_callers;
mod async_blocking_queue;
mod blocking_queue;
mod config;
mod config_option;
mod queue_error;
mod ring_buffer;
mod weak_gate;

pub use self::{
  active_callers::Lifecycle, async_blocking_queue::*, blocking_queue::*, config::*, config_option::*, queue_error::*,
};
