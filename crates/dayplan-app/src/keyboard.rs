// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyboardNotice {
    Shown,
    Hidden,
}

impl KeyboardNotice {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shown => "keyboard_shown",
            Self::Hidden => "keyboard_hidden",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

pub type KeyboardListener = Arc<dyn Fn() + Send + Sync>;

pub trait KeyboardNotifier: Send + Sync {
    fn add_listener(&self, notice: KeyboardNotice, listener: KeyboardListener) -> ListenerId;
    /// Returns false when `id` was not registered.
    fn remove_listener(&self, id: ListenerId) -> bool;
}

#[derive(Default)]
pub struct KeyboardHub {
    listeners: Mutex<BTreeMap<ListenerId, (KeyboardNotice, KeyboardListener)>>,
    next_id: AtomicU64,
}

impl fmt::Debug for KeyboardHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyboardHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl KeyboardHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<KeyboardHub>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(KeyboardHub::new())))
    }

    pub fn emit(&self, notice: KeyboardNotice) -> usize {
        let targets: Vec<KeyboardListener> = self
            .lock()
            .values()
            .filter(|(registered, _)| *registered == notice)
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in &targets {
            listener();
        }
        debug!(
            notice = notice.as_str(),
            listeners = targets.len(),
            "keyboard notice delivered"
        );
        targets.len()
    }

    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<ListenerId, (KeyboardNotice, KeyboardListener)>> {
        match self.listeners.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl KeyboardNotifier for KeyboardHub {
    fn add_listener(&self, notice: KeyboardNotice, listener: KeyboardListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().insert(id, (notice, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.lock().remove(&id).is_some()
    }
}

/// Screen-scoped view of keyboard visibility.
pub struct KeyboardVisibilityTracker {
    visible: Arc<AtomicBool>,
    notifier: Arc<dyn KeyboardNotifier>,
    subscriptions: Vec<ListenerId>,
}

impl fmt::Debug for KeyboardVisibilityTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyboardVisibilityTracker")
            .field("visible", &self.is_visible())
            .field("subscriptions", &self.subscriptions)
            .finish()
    }
}

impl KeyboardVisibilityTracker {
    pub fn subscribe(notifier: Arc<dyn KeyboardNotifier>) -> Self {
        let visible = Arc::new(AtomicBool::new(false));
        let subscriptions = [
            (KeyboardNotice::Shown, true),
            (KeyboardNotice::Hidden, false),
        ]
        .into_iter()
        .map(|(notice, value)| {
            let flag = Arc::clone(&visible);
            notifier.add_listener(
                notice,
                Arc::new(move || flag.store(value, Ordering::SeqCst)),
            )
        })
        .collect();

        Self {
            visible,
            notifier,
            subscriptions,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn is_subscribed(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    pub fn release(&mut self) {
        for id in self.subscriptions.drain(..) {
            if !self.notifier.remove_listener(id) {
                debug!(?id, "keyboard listener was already gone");
            }
        }
    }
}

impl Drop for KeyboardVisibilityTracker {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyboardHub, KeyboardNotice, KeyboardVisibilityTracker};
    use std::sync::Arc;

    #[test]
    fn visibility_follows_show_and_hide() {
        let hub = Arc::new(KeyboardHub::new());
        let tracker = KeyboardVisibilityTracker::subscribe(hub.clone());
        assert!(!tracker.is_visible());
        assert_eq!(hub.listener_count(), 2);

        assert_eq!(hub.emit(KeyboardNotice::Shown), 1);
        assert!(tracker.is_visible());
        hub.emit(KeyboardNotice::Shown);
        assert!(tracker.is_visible());

        assert_eq!(hub.emit(KeyboardNotice::Hidden), 1);
        assert!(!tracker.is_visible());
    }

    #[test]
    fn drop_removes_listeners() {
        let hub = Arc::new(KeyboardHub::new());
        {
            let _tracker = KeyboardVisibilityTracker::subscribe(hub.clone());
            assert_eq!(hub.listener_count(), 2);
        }
        assert_eq!(hub.listener_count(), 0);
        assert_eq!(hub.emit(KeyboardNotice::Shown), 0);
    }

    #[test]
    fn explicit_release_then_drop_is_harmless() {
        let hub = Arc::new(KeyboardHub::new());
        let other = KeyboardVisibilityTracker::subscribe(hub.clone());
        let mut tracker = KeyboardVisibilityTracker::subscribe(hub.clone());
        assert_eq!(hub.listener_count(), 4);

        tracker.release();
        assert!(!tracker.is_subscribed());
        assert_eq!(hub.listener_count(), 2);
        drop(tracker);
        assert_eq!(hub.listener_count(), 2);

        hub.emit(KeyboardNotice::Shown);
        assert!(other.is_visible());
    }

    #[test]
    fn global_hub_is_shared() {
        let first = KeyboardHub::global();
        let second = KeyboardHub::global();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
