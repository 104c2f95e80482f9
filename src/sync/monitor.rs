//! Single value monitor
use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;

use crate::errors::Result;

// -----------------------------------------------------------------------------
// 		- Requests -
// -----------------------------------------------------------------------------
enum Request<T> {
    Read(Sender<T>),
    Write(T),
    Stop,
}

struct Shared {
    closed: AtomicBool,
    served: AtomicUsize,
    coordinator: Mutex<Option<JoinHandle<()>>>,
}

// -----------------------------------------------------------------------------
// 		- State monitor -
// -----------------------------------------------------------------------------
/// Holds a single value owned by a dedicated coordinator thread.
///
/// Every `get` and `send` is a request to the coordinator, which serves one
/// request at a time in the order they arrive. No lock is exposed to the
/// caller and no caller ever touches the value directly.
///
/// The handle is cheap to clone; all clones talk to the same coordinator.
/// The coordinator stops when `close` is called or when the last handle
/// is dropped.
///
/// **Note:** calling `get` or `send` after `close` blocks forever, as there is
/// no coordinator left to serve the request.
///
/// ```
/// use handoff::StateMonitor;
///
/// # fn main() -> handoff::Result<()> {
/// let monitor = StateMonitor::with_value(1u32)?;
/// monitor.send(2);
/// assert_eq!(monitor.get(), 2);
/// monitor.close();
/// # Ok(())
/// # }
/// ```
pub struct StateMonitor<T> {
    requests: Sender<Request<T>>,
    // Keeps the request channel connected once the coordinator is gone,
    // so late requests wait instead of failing.
    _parked: Receiver<Request<T>>,
    shared: Arc<Shared>,
}

impl<T: Clone + Send + 'static> StateMonitor<T> {
    /// Start a monitor holding `T::default()`
    pub fn new() -> Result<Self>
    where
        T: Default,
    {
        Self::with_value(T::default())
    }

    /// Start a monitor holding `value`
    pub fn with_value(value: T) -> Result<Self> {
        // Zero capacity: a request is handed directly to the coordinator
        let (requests, rx) = bounded(0);
        let parked = rx.clone();
        let shared = Arc::new(Shared {
            closed: AtomicBool::new(false),
            served: AtomicUsize::new(0),
            coordinator: Mutex::new(None),
        });

        let coordinator_shared = shared.clone();
        let handle = thread::Builder::new()
            .name("state-monitor".into())
            .spawn(move || serve(value, rx, coordinator_shared))?;
        *shared.coordinator.lock() = Some(handle);

        Ok(Self {
            requests,
            _parked: parked,
            shared,
        })
    }

    /// Get a copy of the current value.
    /// Blocks until the coordinator has served the request.
    pub fn get(&self) -> T {
        let (tx, rx) = bounded(1);
        self.request(Request::Read(tx));
        match rx.recv() {
            Ok(val) => val,
            Err(_) => block_forever(),
        }
    }

    /// Replace the current value.
    /// Returns once the coordinator has accepted the new value.
    pub fn send(&self, val: T) {
        self.request(Request::Write(val));
    }
}

impl<T> StateMonitor<T> {
    /// Stop the coordinator and wait for it to exit.
    ///
    /// Closing an already closed monitor does nothing.
    pub fn close(&self) {
        if self.shared.closed.swap(true, Ordering::SeqCst) {
            warn!("state monitor closed more than once");
            return;
        }

        self.request(Request::Stop);
        let coordinator = self.shared.coordinator.lock().take();
        if let Some(handle) = coordinator {
            if handle.join().is_err() {
                error!("state monitor coordinator panicked");
            }
        }
    }

    /// `true` once `close` has been called
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }

    /// Number of `get` and `send` requests the coordinator has served
    pub fn requests_served(&self) -> usize {
        self.shared.served.load(Ordering::SeqCst)
    }

    fn request(&self, request: Request<T>) {
        // The channel can't disconnect while `self` holds `_parked`
        if self.requests.send(request).is_err() {
            block_forever();
        }
    }
}

impl<T> Clone for StateMonitor<T> {
    fn clone(&self) -> Self {
        Self {
            requests: self.requests.clone(),
            _parked: self._parked.clone(),
            shared: self.shared.clone(),
        }
    }
}

impl<T> Debug for StateMonitor<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("StateMonitor")
            .field("closed", &self.is_closed())
            .field("requests_served", &self.requests_served())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// 		- Coordinator -
// -----------------------------------------------------------------------------
fn serve<T: Clone>(mut value: T, requests: Receiver<Request<T>>, shared: Arc<Shared>) {
    debug!("state monitor coordinator started");

    while let Ok(request) = requests.recv() {
        match request {
            Request::Read(reply) => {
                shared.served.fetch_add(1, Ordering::SeqCst);
                let _ = reply.send(value.clone());
            }
            Request::Write(val) => {
                shared.served.fetch_add(1, Ordering::SeqCst);
                value = val;
            }
            Request::Stop => break,
        }
        trace!("state monitor served request");
    }

    debug!(
        "state monitor coordinator stopped after {} request(s)",
        shared.served.load(Ordering::SeqCst)
    );
}

fn block_forever() -> ! {
    loop {
        thread::park();
    }
}
