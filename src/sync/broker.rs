//! Topic broker
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::errors::{Error, Result};

use super::queue::{BoundedQueue, Iter};

/// Mailbox capacity used by `TopicBroker::new`
pub const DEFAULT_MAILBOX_CAPACITY: usize = 1;

type Mailbox<T> = Arc<BoundedQueue<T>>;

// -----------------------------------------------------------------------------
//              - Subscription -
// -----------------------------------------------------------------------------
/// The receiving end of a subscriber's mailbox.
///
/// Only the broker can write to or close the mailbox. Once the subscriber is
/// removed, or the topic is closed, `recv` hands out the messages still in
/// the mailbox and then returns `None`.
pub struct Subscription<T> {
    topic: String,
    mailbox: Mailbox<T>,
}

impl<T> Subscription<T> {
    /// Receive the next published message, blocking until one arrives.
    /// Returns `None` once the subscription has been closed and every
    /// message delivered before that has been received.
    pub fn recv(&self) -> Option<T> {
        self.mailbox.recv_buffered()
    }

    /// Iterate over published messages until the subscription is closed
    /// and its mailbox is empty
    pub fn iter(&self) -> Iter<'_, T> {
        self.mailbox.drain_iter()
    }

    /// `true` once the broker has closed this subscription.
    /// Messages may still be waiting in the mailbox.
    pub fn is_closed(&self) -> bool {
        self.mailbox.is_closed()
    }

    /// Name of the topic this subscription was created for
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl<'a, T> IntoIterator for &'a Subscription<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T> Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("mailbox", &self.mailbox)
            .finish()
    }
}

// -----------------------------------------------------------------------------
//              - Topic broker -
//              every subscriber gets its own copy, meaning T has to be Clone
// -----------------------------------------------------------------------------
/// Publish messages to every subscriber of a topic.
///
/// Each subscriber owns a small bounded mailbox. Publishing pushes a clone of
/// the message into every mailbox of the topic, in subscription order.
///
/// Publishing to a topic whose subscriber has a full mailbox blocks until
/// that subscriber makes room. While blocked the publisher holds the shared
/// side of the registry lock, so `create_topic`, `subscribe`, `close_topic`
/// and `close_subscriber` wait for the publish to finish.
///
/// Publishes to different topics run in parallel; publishes to the same
/// topic are delivered one after the other.
///
/// ```
/// # use std::thread;
/// use std::sync::Arc;
/// use handoff::TopicBroker;
///
/// # fn main() -> handoff::Result<()> {
/// let broker: Arc<TopicBroker> = Arc::new(TopicBroker::new());
/// broker.create_topic("news");
/// let sub = broker.subscribe("news")?;
///
/// let publisher = broker.clone();
/// let handle = thread::spawn(move || publisher.publish("news", "hi".to_string()));
///
/// assert_eq!(sub.recv().as_deref(), Some("hi"));
/// handle.join().unwrap()?;
///
/// broker.close_topic("news")?;
/// assert_eq!(sub.recv(), None);
/// # Ok(())
/// # }
/// ```
pub struct TopicBroker<T = String> {
    topics: RwLock<HashMap<String, Mutex<Vec<Mailbox<T>>>>>,
    mailbox_capacity: usize,
}

impl<T: Clone> TopicBroker<T> {
    /// Create a broker where every subscriber mailbox holds one message
    pub fn new() -> Self {
        Self::with_mailbox_capacity(DEFAULT_MAILBOX_CAPACITY)
    }

    /// Create a broker where every subscriber mailbox holds up to `capacity` messages.
    /// A capacity of zero means a publish blocks until every subscriber
    /// has picked up the message.
    pub fn with_mailbox_capacity(capacity: usize) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            mailbox_capacity: capacity,
        }
    }

    /// Register a topic.
    /// Registering a topic that already exists leaves it and its
    /// subscribers untouched.
    pub fn create_topic(&self, topic: &str) {
        let mut topics = self.topics.write();
        if topics.contains_key(topic) {
            debug!("topic \"{}\" already exists", topic);
            return;
        }
        topics.insert(topic.to_owned(), Mutex::new(Vec::new()));
        debug!("topic \"{}\" created", topic);
    }

    /// Subscribe to a topic.
    /// Returns `Error::TopicNotFound` if the topic does not exist.
    pub fn subscribe(&self, topic: &str) -> Result<Subscription<T>> {
        let topics = self.topics.write();
        let subscribers = topics
            .get(topic)
            .ok_or_else(|| Error::TopicNotFound(topic.to_owned()))?;

        let mailbox = Arc::new(BoundedQueue::new(self.mailbox_capacity));
        let mut subscribers = subscribers.lock();
        subscribers.push(mailbox.clone());
        debug!("subscribed to \"{}\" ({} subscriber(s))", topic, subscribers.len());

        Ok(Subscription {
            topic: topic.to_owned(),
            mailbox,
        })
    }

    /// Publish a message to every subscriber of a topic.
    /// Note that the published message is cloned for each subscriber.
    ///
    /// Returns `Error::TopicNotFound` if the topic does not exist.
    pub fn publish(&self, topic: &str, message: T) -> Result<()> {
        let topics = self.topics.read();
        let subscribers = topics
            .get(topic)
            .ok_or_else(|| Error::TopicNotFound(topic.to_owned()))?;

        let subscribers = subscribers.lock();
        for mailbox in subscribers.iter() {
            mailbox.send(message.clone())?;
        }
        trace!("published to \"{}\" ({} subscriber(s))", topic, subscribers.len());
        Ok(())
    }

    /// Close every subscription of a topic and remove the topic.
    /// Messages already published stay readable by each subscriber.
    /// Returns `Error::TopicNotFound` if the topic does not exist.
    pub fn close_topic(&self, topic: &str) -> Result<()> {
        let mut topics = self.topics.write();
        let subscribers = topics
            .remove(topic)
            .ok_or_else(|| Error::TopicNotFound(topic.to_owned()))?
            .into_inner();

        for mailbox in &subscribers {
            mailbox.close()?;
        }
        debug!("topic \"{}\" closed ({} subscriber(s))", topic, subscribers.len());
        Ok(())
    }

    /// Close a single subscription and remove it from the topic.
    ///
    /// Returns `Error::TopicNotFound` if the topic does not exist, or
    /// `Error::SubscriberNotFound` if the subscription is not part of it.
    pub fn close_subscriber(&self, topic: &str, subscription: &Subscription<T>) -> Result<()> {
        let topics = self.topics.write();
        let subscribers = topics
            .get(topic)
            .ok_or_else(|| Error::TopicNotFound(topic.to_owned()))?;

        let mut subscribers = subscribers.lock();
        let index = subscribers
            .iter()
            .position(|mailbox| Arc::ptr_eq(mailbox, &subscription.mailbox))
            .ok_or_else(|| Error::SubscriberNotFound(topic.to_owned()))?;

        let mailbox = subscribers.remove(index);
        mailbox.close()?;
        debug!("subscriber removed from \"{}\" ({} left)", topic, subscribers.len());
        Ok(())
    }

    /// `true` if the topic exists
    pub fn has_topic(&self, topic: &str) -> bool {
        self.topics.read().contains_key(topic)
    }

    /// Number of subscribers of a topic.
    /// Returns `Error::TopicNotFound` if the topic does not exist.
    pub fn subscriber_count(&self, topic: &str) -> Result<usize> {
        let topics = self.topics.read();
        let subscribers = topics
            .get(topic)
            .ok_or_else(|| Error::TopicNotFound(topic.to_owned()))?;
        let count = subscribers.lock().len();
        Ok(count)
    }

    /// Names of all registered topics, sorted
    pub fn topics(&self) -> Vec<String> {
        let mut names = self.topics.read().keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }
}

impl<T: Clone> Default for TopicBroker<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debug for TopicBroker<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TopicBroker")
            .field("topics", &self.topics.read().len())
            .field("mailbox_capacity", &self.mailbox_capacity)
            .finish()
    }
}
