//! Bounded blocking log queue
//!
//! Multi-producer, single-consumer circular buffer. One slot is always left
//! empty so `head == tail` means empty and `head + 1 == tail` means full,
//! without a separate counter. The mutex only guards the indices, the slots
//! and the closed flag, and is held for O(1) per operation.

use parking_lot::{Condvar, Mutex};
use std::fmt;

/// Returned by [`RingBuffer::enqueue`] once the queue has been closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueClosed;

impl fmt::Display for QueueClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "log queue closed")
    }
}

impl std::error::Error for QueueClosed {}

struct RingState<T> {
    slots: Box<[Option<T>]>,
    head: usize,
    tail: usize,
    closed: bool,
}

impl<T> RingState<T> {
    #[inline]
    fn len(&self) -> usize {
        let size = self.slots.len();
        (self.head + size - self.tail) % size
    }

    #[inline]
    fn is_full(&self) -> bool {
        (self.head + 1) % self.slots.len() == self.tail
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.head == self.tail
    }
}

pub struct RingBuffer<T> {
    state: Mutex<RingState<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Create a queue holding up to `capacity` items
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be at least 1");
        let slots: Vec<Option<T>> = (0..capacity + 1).map(|_| None).collect();
        Self {
            state: Mutex::new(RingState {
                slots: slots.into_boxed_slice(),
                head: 0,
                tail: 0,
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            capacity,
        }
    }

    /// Append `item`, blocking while the queue is full
    ///
    /// Fails as soon as the queue is closed, even if there is room: shutdown
    /// takes priority over new work.
    pub fn enqueue(&self, item: T) -> Result<(), QueueClosed> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(QueueClosed);
            }
            if !state.is_full() {
                break;
            }
            self.not_full.wait(&mut state);
        }

        let head = state.head;
        state.slots[head] = Some(item);
        state.head = (head + 1) % state.slots.len();
        drop(state);

        self.not_empty.notify_one();
        Ok(())
    }

    /// Remove the oldest item, blocking while the queue is empty
    ///
    /// Returns `None` only once the queue is closed and fully drained.
    pub fn dequeue(&self) -> Option<T> {
        let mut state = self.state.lock();
        loop {
            if !state.is_empty() {
                break;
            }
            if state.closed {
                return None;
            }
            self.not_empty.wait(&mut state);
        }

        let tail = state.tail;
        let item = state.slots[tail].take();
        state.tail = (tail + 1) % state.slots.len();
        drop(state);

        self.not_full.notify_one();
        item
    }

    /// Refuse new items and wake every waiter; idempotent
    pub fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        drop(state);

        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn len(&self) -> usize {
        self.state.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity)
            .field("len", &state.len())
            .field("closed", &state.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let queue = RingBuffer::new(8);
        for i in 0..8 {
            queue.enqueue(i).unwrap();
        }
        assert_eq!(queue.len(), 8);
        for i in 0..8 {
            assert_eq!(queue.dequeue(), Some(i));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_wraps_around() {
        let queue = RingBuffer::new(3);
        for round in 0..10 {
            queue.enqueue(round * 2).unwrap();
            queue.enqueue(round * 2 + 1).unwrap();
            assert_eq!(queue.dequeue(), Some(round * 2));
            assert_eq!(queue.dequeue(), Some(round * 2 + 1));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_enqueue_blocks_when_full() {
        let queue = Arc::new(RingBuffer::new(2));
        queue.enqueue(1).unwrap();
        queue.enqueue(2).unwrap();

        let done = Arc::new(AtomicBool::new(false));
        let producer = {
            let queue = Arc::clone(&queue);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                queue.enqueue(3).unwrap();
                done.store(true, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(100));
        assert!(!done.load(Ordering::SeqCst), "third enqueue must block");
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.dequeue(), Some(1));
        producer.join().unwrap();
        assert!(done.load(Ordering::SeqCst));
        assert_eq!(queue.dequeue(), Some(2));
        assert_eq!(queue.dequeue(), Some(3));
    }

    #[test]
    fn test_close_rejects_but_drains() {
        let queue = RingBuffer::new(4);
        queue.enqueue("a").unwrap();
        queue.enqueue("b").unwrap();
        queue.close();
        queue.close();

        assert_eq!(queue.enqueue("c"), Err(QueueClosed));
        assert_eq!(queue.dequeue(), Some("a"));
        assert_eq!(queue.dequeue(), Some("b"));
        assert_eq!(queue.dequeue(), None);
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn test_close_wakes_blocked_producer() {
        let queue = Arc::new(RingBuffer::new(1));
        queue.enqueue(0).unwrap();

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.enqueue(1))
        };
        thread::sleep(Duration::from_millis(50));
        queue.close();

        assert_eq!(producer.join().unwrap(), Err(QueueClosed));
        assert_eq!(queue.dequeue(), Some(0));
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn test_close_wakes_blocked_consumer() {
        let queue: Arc<RingBuffer<u32>> = Arc::new(RingBuffer::new(4));
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.dequeue())
        };
        thread::sleep(Duration::from_millis(50));
        queue.close();
        assert_eq!(consumer.join().unwrap(), None);
    }

    #[test]
    #[should_panic]
    fn test_zero_capacity_panics() {
        let _ = RingBuffer::<u8>::new(0);
    }
}
