//! Global-scope key listeners with scoped subscriptions.
//!
//! A [`KeyListeners`] registry plays the role of the window: hosts forward
//! every key press to [`KeyListeners::dispatch`]. Components attach a
//! handler with [`KeyListeners::subscribe`] and keep the returned
//! [`Subscription`] for as long as they are mounted. Dropping the
//! subscription detaches the handler, so an unmount, an early return or an
//! unwinding panic all leave the registry clean.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::{Key, Modifiers};

type Handler = Rc<dyn Fn(Key, Modifiers)>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<(u64, Handler)>,
}

/// Registry of key handlers attached to the global scope.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct KeyListeners {
    inner: Rc<RefCell<Registry>>,
}

impl KeyListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a handler. It stays attached until the returned guard is dropped.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(Key, Modifiers) + 'static,
    {
        let mut registry = self.inner.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.entries.push((id, Rc::new(handler)));
        log::debug!(
            "Key listener {} attached ({} active)",
            id,
            registry.entries.len()
        );
        Subscription {
            id,
            registry: Rc::downgrade(&self.inner),
        }
    }

    /// Deliver a key press to every attached handler. Returns how many ran.
    ///
    /// Handlers are invoked on a snapshot, so a handler may subscribe or
    /// drop subscriptions while the dispatch is running.
    pub fn dispatch(&self, key: Key, modifiers: Modifiers) -> usize {
        let snapshot: Vec<Handler> = self
            .inner
            .borrow()
            .entries
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        for handler in &snapshot {
            handler(key, modifiers);
        }
        snapshot.len()
    }

    /// Number of attached handlers.
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for KeyListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyListeners")
            .field("active", &self.len())
            .finish()
    }
}

/// Guard for an attached key handler. Dropping it detaches the handler.
#[must_use = "dropping a Subscription immediately detaches its handler"]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether the handler is still attached to a live registry.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.borrow().entries.iter().any(|(id, _)| *id == self.id))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        // Never panic in drop.
        let borrowed = registry.try_borrow_mut();
        if let Ok(mut registry) = borrowed {
            registry.entries.retain(|(id, _)| *id != self.id);
            log::debug!(
                "Key listener {} detached ({} active)",
                self.id,
                registry.entries.len()
            );
        } else {
            log::warn!("Key listener {} could not be detached: registry busy", self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_subscription_drop_detaches() {
        let listeners = KeyListeners::new();
        let sub = listeners.subscribe(|_, _| {});
        assert_eq!(listeners.len(), 1);
        assert!(sub.is_active());
        drop(sub);
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_dispatch_reaches_all_handlers() {
        let listeners = KeyListeners::new();
        let hits = Rc::new(Cell::new(0));
        let h1 = Rc::clone(&hits);
        let h2 = Rc::clone(&hits);
        let _a = listeners.subscribe(move |_, _| h1.set(h1.get() + 1));
        let _b = listeners.subscribe(move |_, _| h2.set(h2.get() + 1));

        let ran = listeners.dispatch(Key::Escape, Modifiers::default());
        assert_eq!(ran, 2);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_handler_may_drop_own_subscription() {
        let listeners = KeyListeners::new();
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let slot_in_handler = Rc::clone(&slot);
        let sub = listeners.subscribe(move |_, _| {
            slot_in_handler.borrow_mut().take();
        });
        *slot.borrow_mut() = Some(sub);

        listeners.dispatch(Key::Escape, Modifiers::default());
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_repeated_subscribe_leaves_no_residue() {
        let listeners = KeyListeners::new();
        for _ in 0..25 {
            let _sub = listeners.subscribe(|_, _| {});
        }
        assert_eq!(listeners.len(), 0);
    }

    #[test]
    fn test_guard_outliving_registry_is_harmless() {
        let sub = {
            let listeners = KeyListeners::new();
            listeners.subscribe(|_, _| {})
        };
        assert!(!sub.is_active());
        drop(sub);
    }
}
