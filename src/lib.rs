#![deny(missing_docs)]
//! # Blocking hand-off primitives
//!
//! Handoff provides three in-process synchronization primitives built on
//! top of [parking_lot](https://crates.io/crates/parking_lot) and
//! [crossbeam](https://crates.io/crates/crossbeam) channels:
//!
//! * [`StateMonitor`], a value owned by a coordinator thread that serves
//!   reads and writes one at a time.
//! * [`BoundedQueue`], a blocking FIFO queue that buffers up to its capacity,
//!   or hands values over directly when the capacity is zero.
//! * [`TopicBroker`], which broadcasts messages to every subscriber of a topic.
//!
//! [`StateMonitor`]: sync/monitor/struct.StateMonitor.html
//! [`BoundedQueue`]: sync/queue/struct.BoundedQueue.html
//! [`TopicBroker`]: sync/broker/struct.TopicBroker.html
#[macro_use] extern crate log;
             extern crate crossbeam;
             extern crate parking_lot;

pub mod sync;
pub mod errors;

// Pub uses
pub use errors::{Error, Result};
pub use sync::monitor::StateMonitor;
pub use sync::queue::BoundedQueue;
pub use sync::broker::{Subscription, TopicBroker};
