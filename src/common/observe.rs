//! Row-scoped reactive cells.
//!
//! An [`Observable`] holds an optional value plus a subscriber list; setting
//! the value fires every subscriber with the new value. Subscriptions are
//! scoped to one cell (row + field pair) to bound fanout, and detach
//! themselves when the [`Subscription`] handle is dropped.

use std::sync::{
    Arc, RwLock, Weak,
    atomic::{AtomicU64, Ordering},
};

use crate::ShareLock;

pub type ObserveHandle<T> = Arc<dyn Fn(&T) + Send + Sync>;

type HandleList<T> = ShareLock<Vec<(u64, ObserveHandle<T>)>>;

/// A mutable cell whose writes are pushed to subscribers.
pub struct Observable<T> {
    value: ShareLock<Option<T>>,
    handles: HandleList<T>,
    next_id: AtomicU64,
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Observable").field("value", &self.value).finish_non_exhaustive()
    }
}

impl<T> Default for Observable<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Observable<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            value: Arc::new(RwLock::new(None)),
            handles: Arc::new(RwLock::new(Vec::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Current value, if one has ever been set.
    pub fn get(&self) -> Option<T> {
        self.value.read().unwrap().clone()
    }

    /// Store a new value and fire every subscriber with it.
    pub fn set(
        &self,
        value: T,
    ) {
        *self.value.write().unwrap() = Some(value.clone());

        // Clone the handle list out so a subscriber may drop its own
        // subscription without deadlocking on the list lock.
        let handles: Vec<_> = self.handles.read().unwrap().iter().map(|(_, h)| h.clone()).collect();
        for handle in handles.iter() {
            (handle)(&value);
        }
    }

    /// Register a subscriber. The returned handle detaches it on drop.
    pub fn subscribe(
        &self,
        handle: impl Fn(&T) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.handles.write().unwrap().push((id, Arc::new(handle)));

        let handles = Arc::downgrade(&self.handles);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(handles) = Weak::upgrade(&handles) {
                    handles.write().unwrap().retain(|(hid, _)| *hid != id);
                }
            })),
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.handles.read().unwrap().len()
    }
}

/// Handle tying a subscriber to an [`Observable`]; dropping it detaches the
/// subscriber.
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            (detach)();
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::Observable;

    #[test]
    fn test_set_fires_subscribers() {
        let cell = Observable::<f64>::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let seen_in_handle = seen.clone();
        let _sub = cell.subscribe(move |v| {
            assert_eq!(*v, 0.5);
            seen_in_handle.fetch_add(1, Ordering::Relaxed);
        });

        cell.set(0.5);
        assert_eq!(seen.load(Ordering::Relaxed), 1);
        assert_eq!(cell.get(), Some(0.5));
    }

    #[test]
    fn test_drop_detaches_subscriber() {
        let cell = Observable::<f64>::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let seen_in_handle = seen.clone();
        let sub = cell.subscribe(move |_| {
            seen_in_handle.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(cell.subscriber_count(), 1);

        drop(sub);
        assert_eq!(cell.subscriber_count(), 0);

        cell.set(1.0);
        assert_eq!(seen.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_unset_cell_has_no_value() {
        let cell = Observable::<f64>::new();
        assert_eq!(cell.get(), None);
    }
}
