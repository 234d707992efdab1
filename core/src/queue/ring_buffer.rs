use crate::queue::InitError;

/// Fixed-capacity circular storage.
///
/// `front` is the slot of the next element to remove and `rear` the slot of
/// the last element inserted; both advance modulo the capacity. `len` is only
/// changed by [`RingBuffer::push_back`] and [`RingBuffer::pop_front`].
#[derive(Debug)]
pub(crate) struct RingBuffer<E> {
  slots: Box<[Option<E>]>,
  front: usize,
  rear: usize,
  len: usize,
}

impl<E> RingBuffer<E> {
  pub(crate) fn try_with_capacity(capacity: usize) -> Result<Self, InitError> {
    if capacity == 0 {
      return Err(InitError::ZeroCapacity);
    }
    let mut slots = Vec::new();
    slots
      .try_reserve_exact(capacity)
      .map_err(|_| InitError::Allocation { capacity })?;
    slots.resize_with(capacity, || None);
    Ok(Self {
      slots: slots.into_boxed_slice(),
      front: 0,
      rear: capacity - 1,
      len: 0,
    })
  }

  pub(crate) fn len(&self) -> usize {
    self.len
  }

  #[cfg(test)]
  pub(crate) fn capacity(&self) -> usize {
    self.slots.len()
  }

  pub(crate) fn is_empty(&self) -> bool {
    self.len == 0
  }

  pub(crate) fn is_full(&self) -> bool {
    self.len == self.slots.len()
  }

  /// Stores `element` behind the current rear; hands it back when full.
  pub(crate) fn push_back(&mut self, element: E) -> Result<(), E> {
    if self.is_full() {
      return Err(element);
    }
    self.rear = (self.rear + 1) % self.slots.len();
    self.slots[self.rear] = Some(element);
    self.len += 1;
    Ok(())
  }

  pub(crate) fn pop_front(&mut self) -> Option<E> {
    if self.is_empty() {
      return None;
    }
    let element = self.slots[self.front].take();
    self.front = (self.front + 1) % self.slots.len();
    self.len -= 1;
    element
  }

  /// Frees the storage and returns whatever was still buffered, oldest first.
  /// The buffer has zero capacity afterwards.
  pub(crate) fn release(&mut self) -> Vec<E> {
    let mut remaining = Vec::with_capacity(self.len);
    while let Some(element) = self.pop_front() {
      remaining.push(element);
    }
    self.slots = Box::new([]);
    self.front = 0;
    self.rear = 0;
    remaining
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_zero_capacity_is_rejected() {
    assert_eq!(
      RingBuffer::<u32>::try_with_capacity(0).unwrap_err(),
      InitError::ZeroCapacity
    );
  }

  #[test]
  fn test_oversized_capacity_fails_allocation() {
    assert_eq!(
      RingBuffer::<u64>::try_with_capacity(usize::MAX).unwrap_err(),
      InitError::Allocation { capacity: usize::MAX }
    );
  }

  #[test]
  fn test_push_until_full_then_pop_in_order() {
    let mut buffer = RingBuffer::try_with_capacity(3).unwrap();
    assert!(buffer.is_empty());
    buffer.push_back(1).unwrap();
    buffer.push_back(2).unwrap();
    buffer.push_back(3).unwrap();
    assert!(buffer.is_full());
    assert_eq!(buffer.push_back(4), Err(4));
    assert_eq!(buffer.len(), 3);

    assert_eq!(buffer.pop_front(), Some(1));
    assert_eq!(buffer.pop_front(), Some(2));
    assert_eq!(buffer.pop_front(), Some(3));
    assert_eq!(buffer.pop_front(), None);
  }

  #[test]
  fn test_indices_wrap_around() {
    let mut buffer = RingBuffer::try_with_capacity(2).unwrap();
    for round in 0..5 {
      buffer.push_back(round * 2).unwrap();
      buffer.push_back(round * 2 + 1).unwrap();
      assert_eq!(buffer.pop_front(), Some(round * 2));
      buffer.push_back(100 + round).unwrap();
      assert_eq!(buffer.pop_front(), Some(round * 2 + 1));
      assert_eq!(buffer.pop_front(), Some(100 + round));
      assert!(buffer.is_empty());
    }
  }

  #[test]
  fn test_release_returns_leftovers_and_frees_storage() {
    let mut buffer = RingBuffer::try_with_capacity(3).unwrap();
    buffer.push_back("a").unwrap();
    buffer.push_back("b").unwrap();
    buffer.pop_front();
    buffer.push_back("c").unwrap();
    buffer.push_back("d").unwrap();

    assert_eq!(buffer.release(), vec!["b", "c", "d"]);
    assert_eq!(buffer.capacity(), 0);
    assert!(buffer.is_empty());
    assert!(buffer.release().is_empty());
  }
}
