//! A session attached to a rendered surface.
//!
//! Escape has to work even when the surface does not have keyboard focus, so
//! mounting subscribes to the host's global [`KeyListeners`]. The subscription
//! lives exactly as long as the mount: dropping or unmounting the surface
//! detaches it, and repeated mount/unmount cycles leave nothing behind.

use std::cell::RefCell;
use std::rc::Rc;

use canvas_input::{InputEvent, KeyListeners, Rectangle, Subscription};

use super::{Effect, Session};

/// A session with its global key listener attached.
#[derive(Debug)]
pub struct MountedSurface {
    session: Rc<RefCell<Session>>,
    escape: Subscription,
}

impl MountedSurface {
    /// Attach `session` to the host's key scope.
    pub fn mount(session: Rc<RefCell<Session>>, listeners: &KeyListeners) -> Self {
        // The listener must not keep the session alive after unmount.
        let weak = Rc::downgrade(&session);
        let escape = listeners.subscribe(move |key, modifiers| {
            let Some(session) = weak.upgrade() else {
                return;
            };
            match session.try_borrow_mut() {
                Ok(mut session) => session.handle_key(key, modifiers),
                Err(_) => log::warn!("Key {:?} dropped: session is busy", key),
            }
        });
        log::debug!("Annotation surface mounted (listener {})", escape.id());
        Self { session, escape }
    }

    /// Shared handle to the session.
    pub fn session(&self) -> Rc<RefCell<Session>> {
        Rc::clone(&self.session)
    }

    pub fn is_listening(&self) -> bool {
        self.escape.is_active()
    }

    /// Forward a pointer event from the surface element.
    ///
    /// Key events arrive through the global listener, so any `KeyDown` routed
    /// here is ignored to avoid handling it twice.
    pub fn handle_event(&self, event: &InputEvent) {
        if matches!(event, InputEvent::KeyDown { .. }) {
            log::trace!("Key event on mounted surface ignored; handled by global listener");
            return;
        }
        self.session.borrow_mut().handle_event(event);
    }

    /// The container was resized or moved.
    pub fn resize(&self, container: Rectangle) {
        self.session.borrow_mut().set_container(container);
    }

    pub fn take_effects(&self) -> Vec<Effect> {
        self.session.borrow_mut().take_effects()
    }

    /// Detach the key listener and hand the session back.
    pub fn unmount(self) -> Rc<RefCell<Session>> {
        let Self { session, escape } = self;
        drop(escape);
        log::debug!("Annotation surface unmounted");
        session
    }
}
