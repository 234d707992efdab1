use fair_queue_utils_rs::{FairLock, TicketLock};

use crate::queue::{BlockingQueue, QueueError};


/// Async front end for a [`BlockingQueue`].
///
/// Calls that may park (`put`, `take`, `destroy`) run on tokio's blocking
/// pool so runtime workers are never stalled. Ordering and fairness are those
/// of the wrapped queue.
#[derive(Debug)]
pub struct AsyncBlockingQueue<E, L: FairLock = TicketLock> {
  queue: BlockingQueue<E, L>,
}

impl<E, L: FairLock> Clone for AsyncBlockingQueue<E, L> {
  fn clone(&self) -> Self {
    Self {
      queue: self.queue.clone(),
    }
  }
}

impl<E, L: FairLock> From<BlockingQueue<E, L>> for AsyncBlockingQueue<E, L> {
  fn from(queue: BlockingQueue<E, L>) -> Self {
    Self { queue }
  }
}

impl<E, L> AsyncBlockingQueue<E, L>
where
  E: Send + 'static,
  L: FairLock + 'static,
{
  pub fn new(queue: BlockingQueue<E, L>) -> Self {
    Self { queue }
  }

  pub fn queue(&self) -> &BlockingQueue<E, L> {
    &self.queue
  }

  pub async fn add(&self, element: E) -> Result<(), QueueError<E>> {
    self.queue.add(element)
  }

  pub async fn poll(&self) -> Result<E, QueueError<E>> {
    self.queue.poll()
  }

  pub async fn put(&self, element: E) -> Result<(), QueueError<E>> {
    let queue = self.queue.clone();
    match tokio::task::spawn_blocking(move || queue.put(element)).await {
      Ok(result) => result,
      Err(error) => {
        tracing::warn!("AsyncBlockingQueue::put: {}", error);
        Err(QueueError::Interrupted)
      }
    }
  }

  pub async fn take(&self) -> Result<E, QueueError<E>> {
    let queue = self.queue.clone();
    match tokio::task::spawn_blocking(move || queue.take()).await {
      Ok(result) => result,
      Err(error) => {
        tracing::warn!("AsyncBlockingQueue::take: {}", error);
        Err(QueueError::Interrupted)
      }
    }
  }

  pub async fn close(&self) {
    self.queue.close();
  }

  /// See [`BlockingQueue::destroy`]. If the blocking task is lost the
  /// leftovers cannot be recovered and `QueueError::Interrupted` is returned.
  pub async fn destroy(self) -> Result<Vec<E>, QueueError<E>> {
    let queue = self.queue;
    tokio::task::spawn_blocking(move || queue.destroy())
      .await
      .map_err(|error| {
        tracing::warn!("AsyncBlockingQueue::destroy: {}", error);
        QueueError::Interrupted
      })
  }
}
