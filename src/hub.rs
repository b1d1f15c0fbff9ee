//! Fan-out of state changes to every listening connection.
//!
//! Each listener owns a private unbounded queue. Publishing clones the
//! current set of queue senders under a short lock, releases the lock, and
//! then enqueues a copy on each. Enqueueing onto an unbounded queue never
//! waits, so a stalled consumer cannot hold up the publisher or any other
//! listener.
//!
//! A [`ListenerHandle`] removes its queue from the hub when dropped, so every
//! exit path of the owning connection releases the registration.

use derive_more::Display;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, trace};

/// Stable identifier of one registration. Never reused within a hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub struct ListenerId(u64);

struct HubInner<T> {
    listeners: Mutex<HashMap<ListenerId, mpsc::UnboundedSender<T>>>,
    next_id: AtomicU64,
}

impl<T> HubInner<T> {
    fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let removed = listeners.remove(&id).is_some();
        if removed {
            info!(listener_id = %id, remaining = listeners.len(), "Listener unregistered");
        }
        removed
    }
}

/// Registry of listener queues with snapshot publish.
pub struct BroadcastHub<T> {
    inner: Arc<HubInner<T>>,
}

impl<T> Clone for BroadcastHub<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for BroadcastHub<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl<T> Default for BroadcastHub<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(HubInner {
                listeners: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }
}

impl<T> BroadcastHub<T> {
    /// Creates a hub with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new private queue to the active set.
    #[instrument(skip(self))]
    pub fn register(&self) -> ListenerHandle<T> {
        let id = ListenerId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut listeners = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        listeners.insert(id, sender.clone());
        info!(listener_id = %id, total = listeners.len(), "Listener registered");
        ListenerHandle {
            id,
            sender,
            receiver,
            hub: Arc::downgrade(&self.inner),
            registered: true,
        }
    }

    /// Number of currently registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<T: Clone> BroadcastHub<T> {
    /// Delivers a copy of `message` to every listener registered right now.
    ///
    /// Returns how many queues accepted the message. Listeners whose
    /// receiving side is already gone are skipped.
    #[instrument(skip(self, message))]
    pub fn publish(&self, message: T) -> usize {
        let targets: Vec<(ListenerId, mpsc::UnboundedSender<T>)> = {
            let listeners = self
                .inner
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            listeners
                .iter()
                .map(|(id, sender)| (*id, sender.clone()))
                .collect()
        };

        let mut delivered = 0;
        for (id, sender) in targets {
            match sender.send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(_) => trace!(listener_id = %id, "Listener closed before delivery"),
            }
        }
        debug!(delivered, "Published message");
        delivered
    }
}

/// One registration in a [`BroadcastHub`].
///
/// Owns the receiving end of the listener's queue. Dropping the handle (or
/// calling [`ListenerHandle::unregister`]) removes the queue from the hub.
pub struct ListenerHandle<T> {
    id: ListenerId,
    sender: mpsc::UnboundedSender<T>,
    receiver: mpsc::UnboundedReceiver<T>,
    hub: Weak<HubInner<T>>,
    registered: bool,
}

impl<T> std::fmt::Debug for ListenerHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("id", &self.id)
            .field("registered", &self.registered)
            .finish()
    }
}

impl<T> ListenerHandle<T> {
    /// Identifier of this registration.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Waits for the next message, in publish order.
    pub async fn recv(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Takes the next message if one is already queued.
    pub fn try_recv(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// Enqueues a message for this listener only.
    ///
    /// Ordered with respect to broadcasts already queued.
    pub fn send_direct(&self, message: T) {
        // The receiver lives in `self`, so the queue cannot be closed here.
        let _ = self.sender.send(message);
    }

    /// Returns a sender that enqueues onto this listener's queue only.
    ///
    /// Lets another task reply to the connection while this handle is
    /// busy receiving.
    pub fn direct_sender(&self) -> DirectSender<T> {
        DirectSender {
            id: self.id,
            sender: self.sender.clone(),
        }
    }

    /// Removes this listener from the hub.
    ///
    /// Messages already queued stay readable until the handle is dropped,
    /// but nothing further is delivered by `publish`.
    pub fn unregister(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.registered {
            return;
        }
        self.registered = false;
        if let Some(hub) = self.hub.upgrade() {
            hub.remove(self.id);
        }
    }
}

/// Enqueues messages for exactly one listener.
pub struct DirectSender<T> {
    id: ListenerId,
    sender: mpsc::UnboundedSender<T>,
}

impl<T> Clone for DirectSender<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            sender: self.sender.clone(),
        }
    }
}

impl<T> DirectSender<T> {
    /// Enqueues `message`; dropped silently once the listener is gone.
    pub fn send(&self, message: T) {
        if self.sender.send(message).is_err() {
            trace!(listener_id = %self.id, "Direct message after listener closed");
        }
    }
}

impl<T> Drop for ListenerHandle<T> {
    fn drop(&mut self) {
        self.release();
    }
}
