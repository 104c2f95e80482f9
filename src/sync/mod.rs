//! Blocking synchronization primitives.
//!
//! * [`StateMonitor`]: a single value served by a coordinator thread
//! * [`BoundedQueue`]: a bounded (or rendezvous) blocking FIFO queue
//! * [`TopicBroker`]: topic based publish / subscribe over per subscriber mailboxes
//!
//! [`StateMonitor`]: monitor/struct.StateMonitor.html
//! [`BoundedQueue`]: queue/struct.BoundedQueue.html
//! [`TopicBroker`]: broker/struct.TopicBroker.html
pub mod monitor;
pub mod queue;
pub mod broker;
