mod fair_lock;
mod fair_lock_error;
mod ticket_lock;

pub use self::{fair_lock::*, fair_lock_error::*, ticket_lock::*};
