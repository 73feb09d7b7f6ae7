//! In-memory reference transport.
//!
//! Routes publications and queries to callbacks registered under exact key
//! expressions, delivering every callback invocation on a transport-owned
//! worker thread, the same execution model a real wire transport imposes
//! on the queuing subsystem. Suitable for tests and single-process use;
//! distributed deployments plug a wire transport behind the same callback
//! shapes.

use crate::clock;
use crate::handles::{SamplePayload, TransportQuery, TransportReply};
use std::collections::HashMap;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, Weak};
use std::thread::JoinHandle;
use tracing::{debug, error, warn};
use viaduct_types::GlobalId;

/// Callback invoked with each sample delivered to a subscriber.
pub type SampleCallback = Arc<dyn Fn(SamplePayload) + Send + Sync>;

/// Callback invoked with each query delivered to a queryable.
pub type QueryCallback = Arc<dyn Fn(&TransportQuery) + Send + Sync>;

/// One-shot callback invoked with the reply to a query.
pub type ReplyCallback = Box<dyn FnOnce(TransportReply) + Send>;

enum Job {
    Task(Box<dyn FnOnce() + Send>),
    Shutdown,
}

/// Cloneable scheduling handle onto the delivery thread.
#[derive(Clone)]
pub(crate) struct WorkerHandle {
    tx: Sender<Job>,
}

impl WorkerHandle {
    pub(crate) fn schedule(&self, task: Box<dyn FnOnce() + Send>) {
        if self.tx.send(Job::Task(task)).is_err() {
            warn!("transport worker stopped, dropping delivery");
        }
    }
}

/// The transport-owned delivery thread. All subscriber, queryable, and
/// reply callbacks run here.
struct DeliveryWorker {
    handle: WorkerHandle,
    thread: Option<JoinHandle<()>>,
}

impl DeliveryWorker {
    fn spawn() -> Self {
        let (tx, rx) = mpsc::channel::<Job>();
        let thread = std::thread::Builder::new()
            .name("viaduct-delivery".to_string())
            .spawn(move || {
                while let Ok(job) = rx.recv() {
                    match job {
                        Job::Task(task) => task(),
                        Job::Shutdown => break,
                    }
                }
            })
            .expect("failed to spawn transport delivery thread");

        Self {
            handle: WorkerHandle { tx },
            thread: Some(thread),
        }
    }
}

impl Drop for DeliveryWorker {
    fn drop(&mut self) {
        // Queued deliveries drain before the shutdown marker is reached.
        let _ = self.handle.tx.send(Job::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

struct SubscriberEntry {
    id: u64,
    callback: SampleCallback,
}

struct QueryableEntry {
    id: u64,
    callback: QueryCallback,
}

#[derive(Default)]
struct Registry {
    subscribers: HashMap<String, Vec<SubscriberEntry>>,
    queryables: HashMap<String, QueryableEntry>,
    next_id: u64,
}

struct TransportShared {
    registry: Mutex<Registry>,
    worker: WorkerHandle,
}

/// In-memory transport session.
pub struct InMemoryTransport {
    shared: Arc<TransportShared>,
    // Owns the delivery thread; dropping the session joins it.
    _worker: DeliveryWorker,
}

impl InMemoryTransport {
    /// Open a new session with its own delivery thread.
    #[must_use]
    pub fn new() -> Self {
        let worker = DeliveryWorker::spawn();
        let shared = Arc::new(TransportShared {
            registry: Mutex::new(Registry::default()),
            worker: worker.handle.clone(),
        });
        Self {
            shared,
            _worker: worker,
        }
    }

    /// Declare a publisher on a key expression.
    #[must_use]
    pub fn declare_publisher(&self, key_expr: impl Into<String>) -> TransportPublisher {
        TransportPublisher {
            key_expr: key_expr.into(),
            gid: GlobalId::generate(),
            shared: Arc::clone(&self.shared),
        }
    }

    /// Register a subscriber callback under a key expression.
    ///
    /// The returned handle undeclares the subscriber when dropped.
    #[must_use]
    pub fn declare_subscriber(
        &self,
        key_expr: impl Into<String>,
        callback: SampleCallback,
    ) -> SubscriberHandle {
        let key_expr = key_expr.into();
        let mut registry = self.lock_registry();
        let id = registry.next_id;
        registry.next_id += 1;
        registry
            .subscribers
            .entry(key_expr.clone())
            .or_default()
            .push(SubscriberEntry { id, callback });

        debug!(key_expr = %key_expr, id, "subscriber declared");
        SubscriberHandle {
            id,
            key_expr,
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Register the queryable callback for a key expression, replacing any
    /// previous one.
    #[must_use]
    pub fn declare_queryable(
        &self,
        key_expr: impl Into<String>,
        callback: QueryCallback,
    ) -> QueryableHandle {
        let key_expr = key_expr.into();
        let mut registry = self.lock_registry();
        let id = registry.next_id;
        registry.next_id += 1;
        if registry
            .queryables
            .insert(key_expr.clone(), QueryableEntry { id, callback })
            .is_some()
        {
            warn!(key_expr = %key_expr, "replacing existing queryable");
        }

        debug!(key_expr = %key_expr, id, "queryable declared");
        QueryableHandle {
            id,
            key_expr,
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Send a query to the queryable registered under `key_expr`.
    ///
    /// The payload's publisher identity is the requesting client's.
    /// `on_reply` fires exactly once on the delivery thread: with the
    /// queryable's answer, or with an error-flagged reply if no queryable
    /// matched.
    pub fn query(
        &self,
        key_expr: impl Into<String>,
        payload: SamplePayload,
        sequence_number: i64,
        on_reply: ReplyCallback,
    ) {
        let key_expr = key_expr.into();
        let callback = self
            .lock_registry()
            .queryables
            .get(&key_expr)
            .map(|entry| Arc::clone(&entry.callback));

        match callback {
            Some(callback) => {
                let query = TransportQuery::new(
                    key_expr,
                    sequence_number,
                    payload,
                    on_reply,
                    self.shared.worker.clone(),
                );
                self.shared
                    .worker
                    .schedule(Box::new(move || callback(&query)));
            }
            None => {
                error!(key_expr = %key_expr, "no queryable matched key expression");
                self.shared.worker.schedule(Box::new(move || {
                    on_reply(TransportReply::error("no queryable matched key expression"));
                }));
            }
        }
    }

    /// Number of subscribers currently registered under a key expression.
    #[must_use]
    pub fn subscriber_count(&self, key_expr: &str) -> usize {
        self.lock_registry()
            .subscribers
            .get(key_expr)
            .map_or(0, Vec::len)
    }

    fn lock_registry(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.shared
            .registry
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Publishing side of a key expression.
pub struct TransportPublisher {
    key_expr: String,
    gid: GlobalId,
    shared: Arc<TransportShared>,
}

impl TransportPublisher {
    /// Publish a sample to every subscriber of the key expression.
    ///
    /// Bytes are reference-counted once and shared across subscribers;
    /// each delivery runs on the transport's thread.
    pub fn put(&self, bytes: Vec<u8>) {
        let shared_bytes: Arc<[u8]> = bytes.into();
        let timestamp = clock::unix_time_nanos();

        let callbacks: Vec<SampleCallback> = {
            let registry = self
                .shared
                .registry
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            registry
                .subscribers
                .get(&self.key_expr)
                .map(|entries| entries.iter().map(|e| Arc::clone(&e.callback)).collect())
                .unwrap_or_default()
        };

        if callbacks.is_empty() {
            debug!(key_expr = %self.key_expr, "sample dropped (no subscribers)");
            return;
        }

        for callback in callbacks {
            let sample =
                SamplePayload::from_shared(Arc::clone(&shared_bytes), self.gid, timestamp);
            self.shared
                .worker
                .schedule(Box::new(move || callback(sample)));
        }
    }

    /// The publisher's global identity.
    #[must_use]
    pub fn gid(&self) -> GlobalId {
        self.gid
    }

    /// The key expression published to.
    #[must_use]
    pub fn key_expr(&self) -> &str {
        &self.key_expr
    }
}

/// Handle keeping a subscriber registered; undeclares on drop.
pub struct SubscriberHandle {
    id: u64,
    key_expr: String,
    shared: Weak<TransportShared>,
}

impl Drop for SubscriberHandle {
    fn drop(&mut self) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let Ok(mut registry) = shared.registry.lock() else {
            return;
        };
        if let Some(entries) = registry.subscribers.get_mut(&self.key_expr) {
            entries.retain(|entry| entry.id != self.id);
            if entries.is_empty() {
                registry.subscribers.remove(&self.key_expr);
            }
        }
        debug!(key_expr = %self.key_expr, id = self.id, "subscriber undeclared");
    }
}

/// Handle keeping a queryable registered; undeclares on drop.
pub struct QueryableHandle {
    id: u64,
    key_expr: String,
    shared: Weak<TransportShared>,
}

impl Drop for QueryableHandle {
    fn drop(&mut self) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let Ok(mut registry) = shared.registry.lock() else {
            return;
        };
        // Only remove the entry this handle declared; a replacement stays.
        if registry
            .queryables
            .get(&self.key_expr)
            .is_some_and(|entry| entry.id == self.id)
        {
            registry.queryables.remove(&self.key_expr);
        }
        debug!(key_expr = %self.key_expr, id = self.id, "queryable undeclared");
    }
}
