//! Observer lists with explicit unsubscribe tokens.
//!
//! Callbacks are invoked outside of any lock, so a callback may subscribe,
//! unsubscribe or call back into the component that notified it. A callback
//! that panics is logged and skipped; the remaining callbacks still run.

use std::{
    any::Any,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{Arc, Mutex, PoisonError, Weak},
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error};

pub type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Slots<T> {
    next_id: u64,
    entries: Vec<(u64, Callback<T>)>,
}

pub struct Subscribers<T> {
    label: &'static str,
    slots: Mutex<Slots<T>>,
}

impl<T: 'static> Subscribers<T> {
    pub fn new(label: &'static str) -> Arc<Self> {
        Arc::new(Self {
            label,
            slots: Mutex::new(Slots {
                next_id: 0,
                entries: Vec::new(),
            }),
        })
    }

    pub fn subscribe<F>(self: &Arc<Self>, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            let id = slots.next_id;
            slots.next_id += 1;
            slots.entries.push((id, Arc::new(callback)));
            id
        };

        let weak: Weak<Self> = Arc::downgrade(self);
        Subscription::new(move || {
            if let Some(list) = weak.upgrade() {
                list.remove(id);
            }
        })
    }

    fn remove(&self, id: u64) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entries.retain(|(entry_id, _)| *entry_id != id);
    }

    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .clear();
    }

    /// Delivers `value` to every subscriber in subscription order.
    /// Returns how many callbacks completed without panicking.
    pub fn emit(&self, value: &T) -> usize {
        let callbacks: Vec<Callback<T>> = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.entries.iter().map(|(_, cb)| cb.clone()).collect()
        };

        let mut delivered = 0;
        for callback in callbacks {
            if invoke_guarded(self.label, || callback(value)) {
                delivered += 1;
            }
        }
        log_debug!("{} delivered to {} subscriber(s)", self.label, delivered);
        delivered
    }
}

/// Runs `f`, converting a panic into an error log. Returns false on panic.
pub fn invoke_guarded<F: FnOnce()>(label: &str, f: F) -> bool {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(()) => true,
        Err(payload) => {
            log_error!("{} callback panicked: {}", label, panic_message(payload.as_ref()));
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Handle returned by every `on_*` registration.
///
/// Dropping the handle keeps the callback registered; call
/// [`Subscription::unsubscribe`] to remove it.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn unsubscribe_removes_only_that_callback() {
        let list = Subscribers::<u64>::new("test");
        let hits = Arc::new(AtomicUsize::new(0));

        let first = {
            let hits = hits.clone();
            list.subscribe(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };
        let _second = {
            let hits = hits.clone();
            list.subscribe(move |_| {
                hits.fetch_add(10, Ordering::SeqCst);
            })
        };

        list.emit(&1);
        assert_eq!(hits.load(Ordering::SeqCst), 11);

        first.unsubscribe();
        list.emit(&1);
        assert_eq!(hits.load(Ordering::SeqCst), 21);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn panicking_callback_does_not_block_others() {
        let list = Subscribers::<u64>::new("test");
        let seen = Arc::new(AtomicUsize::new(0));

        let _bad = list.subscribe(|_| panic!("subscriber failure"));
        let _good = {
            let seen = seen.clone();
            list.subscribe(move |v| {
                seen.store(*v as usize, Ordering::SeqCst);
            })
        };

        assert_eq!(list.emit(&42), 1);
        assert_eq!(seen.load(Ordering::SeqCst), 42);
    }

    #[test]
    fn stale_token_after_clear_does_not_remove_new_subscriber() {
        let list = Subscribers::<u64>::new("test");
        let old = list.subscribe(|_| {});
        list.clear();
        let _fresh = list.subscribe(|_| {});

        old.unsubscribe();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn callback_may_subscribe_during_emit() {
        let list = Subscribers::<u64>::new("test");
        let inner = list.clone();
        let _sub = list.subscribe(move |_| {
            let _ = inner.subscribe(|_| {});
        });
        list.emit(&0);
        assert_eq!(list.len(), 2);
    }
}
