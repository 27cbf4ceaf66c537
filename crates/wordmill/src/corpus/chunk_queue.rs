//! # Bounded Chunk Queue

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

#[derive(Debug)]
struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// A bounded, closeable queue of work chunks.
///
/// Producers block in [`ChunkQueue::push`] while the queue is full, which
/// bounds peak buffering to `capacity * chunk_size * avg_line_length`.
/// Ordering is FIFO per producer; nothing is guaranteed across producers.
#[derive(Debug)]
pub struct ChunkQueue<T> {
    capacity: usize,
    state: Mutex<QueueState<T>>,
    not_empty: Condvar,
    not_full: Condvar,
}

impl<T> ChunkQueue<T> {
    /// Create a queue holding at most `capacity` chunks.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be positive");
        Self {
            capacity,
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }

    /// Push a chunk, blocking while the queue is full.
    ///
    /// ## Panics
    /// Panics if the queue has been closed; pushing after [`ChunkQueue::close`]
    /// is a programming error.
    pub fn push(
        &self,
        item: T,
    ) {
        let mut state = self.state.lock();
        while state.items.len() >= self.capacity && !state.closed {
            self.not_full.wait(&mut state);
        }
        assert!(!state.closed, "push on a closed queue");
        state.items.push_back(item);
        self.not_empty.notify_one();
    }

    /// Pop a chunk, blocking until one is available.
    ///
    /// ## Returns
    /// * `Some(chunk)` - the next chunk.
    /// * `None` - the queue is closed and drained.
    pub fn wait_and_pop(&self) -> Option<T> {
        let mut state = self.state.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                self.not_full.notify_one();
                return Some(item);
            }
            if state.closed {
                return None;
            }
            self.not_empty.wait(&mut state);
        }
    }

    /// Close the queue and wake every waiter. Idempotent.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    /// Whether the queue has been closed.
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// The number of chunks currently buffered.
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Whether the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_fifo_order() {
        let queue = ChunkQueue::with_capacity(4);
        queue.push(1);
        queue.push(2);
        queue.push(3);

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.wait_and_pop(), Some(1));
        assert_eq!(queue.wait_and_pop(), Some(2));
        assert_eq!(queue.wait_and_pop(), Some(3));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_close_drains_then_ends() {
        let queue = ChunkQueue::with_capacity(4);
        queue.push("a");
        queue.close();
        queue.close(); // idempotent

        assert!(queue.is_closed());
        assert_eq!(queue.wait_and_pop(), Some("a"));
        assert_eq!(queue.wait_and_pop(), None);
    }

    #[test]
    fn test_close_wakes_waiting_consumer() {
        let queue: Arc<ChunkQueue<i32>> = Arc::new(ChunkQueue::with_capacity(1));

        let waiter = {
            let queue = queue.clone();
            thread::spawn(move || queue.wait_and_pop())
        };

        thread::sleep(Duration::from_millis(20));
        queue.close();

        assert_eq!(waiter.join().unwrap(), None);
    }

    #[test]
    fn test_push_blocks_when_full() {
        let queue: Arc<ChunkQueue<i32>> = Arc::new(ChunkQueue::with_capacity(1));
        queue.push(1);

        let producer = {
            let queue = queue.clone();
            thread::spawn(move || {
                queue.push(2);
            })
        };

        thread::sleep(Duration::from_millis(20));
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.wait_and_pop(), Some(1));
        producer.join().unwrap();
        assert_eq!(queue.wait_and_pop(), Some(2));
    }

    #[test]
    #[should_panic(expected = "push on a closed queue")]
    fn test_push_after_close_panics() {
        let queue = ChunkQueue::with_capacity(1);
        queue.close();
        queue.push(1);
    }
}
