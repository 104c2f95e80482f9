//! Bounded blocking queue
use std::collections::VecDeque;
use std::fmt::{self, Debug};

use parking_lot::{Condvar, Mutex};

use crate::errors::{Error, Result};

// -----------------------------------------------------------------------------
// 		- Queue state -
// -----------------------------------------------------------------------------
struct State<T> {
    items: VecDeque<T>,
    // Effective capacity. Every pending receive widens this by one
    // until it has taken its item.
    capacity: usize,
    closed: bool,
}

impl<T> State<T> {
    fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }
}

// -----------------------------------------------------------------------------
// 		- Bounded queue -
// -----------------------------------------------------------------------------
/// A bounded FIFO queue with blocking `send` and `recv`.
///
/// A queue with a capacity of zero holds no values at all: a `send` blocks
/// until a receiver picks the value up. A queue with a positive capacity
/// buffers up to `capacity` values before `send` blocks.
///
/// Both modes share the same code path. A receiver makes room for exactly one
/// value by widening the capacity while it waits, and narrows it again once
/// it has taken an item.
///
/// Every state change wakes all waiters.
///
/// ```
/// # use std::thread;
/// use std::sync::Arc;
/// use handoff::BoundedQueue;
///
/// let queue = Arc::new(BoundedQueue::new(0));
/// let tx = queue.clone();
///
/// let handle = thread::spawn(move || {
///     tx.send(7).unwrap();
/// });
///
/// assert_eq!(queue.recv(), Some(7));
/// handle.join().unwrap();
/// assert!(queue.is_empty());
/// ```
pub struct BoundedQueue<T> {
    state: Mutex<State<T>>,
    cond: Condvar,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` values.
    /// Setting the capacity to zero means no data will be held in the
    /// queue and the sending thread will block until the data is picked up
    /// by a receiver.
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(State {
                items: VecDeque::with_capacity(capacity),
                capacity,
                closed: false,
            }),
            cond: Condvar::new(),
            capacity,
        }
    }

    /// Push a value onto the back of the queue, blocking while the queue is full.
    ///
    /// Returns `Error::ClosedQueueSend` if the queue is closed on entry,
    /// or is closed while this call is waiting for room.
    pub fn send(&self, val: T) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(Error::ClosedQueueSend);
        }

        while state.is_full() {
            self.cond.wait(&mut state);
            if state.closed {
                return Err(Error::ClosedQueueSend);
            }
        }

        state.items.push_back(val);
        trace!("enqueued (len: {}, capacity: {})", state.items.len(), state.capacity);
        self.cond.notify_all();
        Ok(())
    }

    /// Take the value at the front of the queue, blocking until one is available.
    ///
    /// Returns `None` once the queue is closed, even if values are still
    /// buffered. Use `recv_buffered` to drain them.
    ///
    /// Unlike a plain hand-off queue, a receive that is already waiting when
    /// the queue is closed does not keep waiting: it takes an item if one was
    /// pushed before it woke up, otherwise it gives up and returns `None`.
    pub fn recv(&self) -> Option<T> {
        self.take(false)
    }

    /// Like `recv`, but values buffered before the queue was closed are
    /// still handed out. `None` is returned once the closed queue is empty.
    pub fn recv_buffered(&self) -> Option<T> {
        self.take(true)
    }

    fn take(&self, drain: bool) -> Option<T> {
        let mut state = self.state.lock();
        if state.closed {
            if !drain {
                return None;
            }
            let val = state.items.pop_front();
            if val.is_some() {
                trace!("drained (len: {})", state.items.len());
                self.cond.notify_all();
            }
            return val;
        }

        // Make room for one value so a blocked sender can hand it over
        state.capacity += 1;
        self.cond.notify_all();

        while state.items.is_empty() {
            if state.closed {
                state.capacity -= 1;
                self.cond.notify_all();
                return None;
            }
            self.cond.wait(&mut state);
        }

        state.capacity -= 1;
        let val = state.items.pop_front();
        trace!("dequeued (len: {}, capacity: {})", state.items.len(), state.capacity);
        self.cond.notify_all();
        val
    }

    /// Close the queue.
    ///
    /// All blocked senders fail with `Error::ClosedQueueSend` and every
    /// subsequent `recv` returns `None`. `recv_buffered` keeps returning
    /// the values left in the queue until it is empty.
    /// Closing a queue twice returns `Error::AlreadyClosed`.
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(Error::AlreadyClosed);
        }
        state.closed = true;
        debug!("queue closed with {} item(s) left", state.items.len());
        self.cond.notify_all();
        Ok(())
    }

    /// `true` once `close` has been called
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Number of values currently held by the queue
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// `true` if the queue holds no values
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The capacity the queue was created with
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate over received values until the queue is closed.
    ///
    /// Each call to `next` blocks the same way `recv` does.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { queue: self, drain: false }
    }

    /// Iterate over received values, including the ones still buffered
    /// when the queue was closed.
    ///
    /// Each call to `next` blocks the same way `recv_buffered` does.
    pub fn drain_iter(&self) -> Iter<'_, T> {
        Iter { queue: self, drain: true }
    }
}

impl<T> Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BoundedQueue")
            .field("len", &state.items.len())
            .field("capacity", &self.capacity)
            .field("closed", &state.closed)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// 		- Iter -
// -----------------------------------------------------------------------------
/// A blocking iterator over the values of a [`BoundedQueue`].
///
/// [`BoundedQueue`]: struct.BoundedQueue.html
pub struct Iter<'a, T> {
    queue: &'a BoundedQueue<T>,
    drain: bool,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.queue.take(self.drain)
    }
}

impl<'a, T> IntoIterator for &'a BoundedQueue<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
