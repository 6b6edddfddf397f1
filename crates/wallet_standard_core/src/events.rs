//! Typed publish/subscribe table.
//!
//! # Responsibility
//! - Map a closed event enumeration to ordered subscriber lists.
//! - Hand out unsubscribe tokens instead of relying on closure identity.
//!
//! # Invariants
//! - Subscribers run in subscription order.
//! - Emission iterates a snapshot taken before the first subscriber runs, and
//!   the table lock is never held while a subscriber runs.
//! - A panicking subscriber is logged and skipped; later subscribers still run.
//! - Unsubscribing is idempotent.

use log::error;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use uuid::Uuid;

/// Closed event-name enumeration usable as a listener-table key.
pub trait EventKind: Copy + Ord + Send + Sync + 'static {
    /// Stable event name used in logs.
    fn as_str(self) -> &'static str;
}

/// Shared subscriber callback receiving the event payload.
pub type Listener<A> = Arc<dyn Fn(&A) + Send + Sync>;

type ListenerTable<E, A> = Mutex<BTreeMap<E, Vec<(Uuid, Listener<A>)>>>;

/// Ordered listener table keyed by event kind.
pub struct Emitter<E: EventKind, A: ?Sized + 'static> {
    table: Arc<ListenerTable<E, A>>,
}

impl<E: EventKind, A: ?Sized + 'static> Default for Emitter<E, A> {
    fn default() -> Self {
        Self {
            table: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }
}

impl<E: EventKind, A: ?Sized + 'static> Emitter<E, A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `listener` under `event` and returns its unsubscribe token.
    pub fn subscribe(&self, event: E, listener: Listener<A>) -> Unsubscribe {
        let id = Uuid::new_v4();
        lock(&self.table)
            .entry(event)
            .or_default()
            .push((id, listener));

        let table: Weak<ListenerTable<E, A>> = Arc::downgrade(&self.table);
        Unsubscribe::new(move || {
            // Emitter already dropped: nothing left to remove from.
            let Some(table) = table.upgrade() else {
                return;
            };
            let mut guard = lock(&table);
            if let Some(listeners) = guard.get_mut(&event) {
                listeners.retain(|(listener_id, _)| *listener_id != id);
                if listeners.is_empty() {
                    guard.remove(&event);
                }
            }
        })
    }

    /// Invokes every listener currently subscribed to `event`, in order.
    ///
    /// Returns how many listeners panicked.
    pub fn emit(&self, event: E, payload: &A) -> usize {
        let snapshot: Vec<Listener<A>> = lock(&self.table)
            .get(&event)
            .map(|listeners| listeners.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default();

        let mut panicked = 0;
        for (index, listener) in snapshot.iter().enumerate() {
            if catch_unwind(AssertUnwindSafe(|| listener(payload))).is_err() {
                panicked += 1;
                error!(
                    "event=listener_panicked module=events status=error event_name={} index={}",
                    event.as_str(),
                    index
                );
            }
        }
        panicked
    }

    /// Number of listeners subscribed to `event`.
    pub fn listener_count(&self, event: E) -> usize {
        lock(&self.table).get(&event).map_or(0, Vec::len)
    }
}

impl<E: EventKind, A: ?Sized + 'static> Debug for Emitter<E, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let guard = lock(&self.table);
        let mut map = f.debug_map();
        for (event, listeners) in guard.iter() {
            map.entry(&event.as_str(), &listeners.len());
        }
        map.finish()
    }
}

// Subscribers never run under the lock, so poisoning can only come from a
// panic inside the table bookkeeping itself; the table stays consistent.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Token removing exactly one subscription.
#[derive(Clone)]
pub struct Unsubscribe {
    remove: Arc<dyn Fn() + Send + Sync>,
}

impl Unsubscribe {
    pub fn new(remove: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            remove: Arc::new(remove),
        }
    }

    /// Token for a subscription that was never recorded.
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    /// Removes the subscription. Calling again is a no-op.
    pub fn unsubscribe(&self) {
        (self.remove)();
    }
}

impl Debug for Unsubscribe {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Unsubscribe")
    }
}
