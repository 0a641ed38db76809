//! Listener tables and event dispatch.
//!
//! Design principles:
//! - One table keyed by (scope, event), each entry an ordered listener list
//! - Listeners are compared by identity, never by value
//! - Emitting snapshots the list; a dedicated thread invokes it later
//! - A panicking listener is logged and does not stop the rest

use crate::registry::PanelHandle;
use crate::types::{EventInfo, EventType};
use crossbeam_channel::{Receiver, Sender};
use log::{debug, warn};
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread;
use tokio::sync::oneshot;

/// A registered callback. Clones share identity.
#[derive(Clone)]
pub struct Listener(Arc<dyn Fn(&EventInfo) + Send + Sync>);

impl Listener {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&EventInfo) + Send + Sync + 'static,
    {
        Self(Arc::new(callback))
    }

    /// Identity comparison.
    pub fn same(&self, other: &Listener) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn call(&self, info: &EventInfo) {
        (self.0)(info)
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Listener({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}

/// Owner of a listener list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKey {
    Manager,
    Panel(PanelHandle),
}

enum Notification {
    Dispatch {
        info: EventInfo,
        listeners: Vec<Listener>,
    },
    Barrier(oneshot::Sender<()>),
}

/// Listener storage plus the queue feeding the dispatcher thread.
pub struct EventHub {
    listeners: RwLock<HashMap<(ScopeKey, EventType), Vec<Listener>>>,
    queue: Sender<Notification>,
}

impl EventHub {
    /// Create the hub and start its dispatcher thread.
    /// The thread exits once the hub is dropped and the queue drains.
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        thread::spawn(move || run_dispatcher(rx));
        Self {
            listeners: RwLock::new(HashMap::new()),
            queue: tx,
        }
    }

    /// Append a listener. Registering the same listener twice keeps both.
    pub fn on(&self, scope: ScopeKey, event: EventType, listener: Listener) {
        let mut table = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let list = table.entry((scope, event)).or_default();
        list.push(listener);
        debug!("{:?} {}: {} listener(s)", scope, event, list.len());
    }

    /// Remove one listener, or all of them when `listener` is None.
    /// Removing something that was never registered is not an error.
    pub fn off(&self, scope: ScopeKey, event: EventType, listener: Option<&Listener>) {
        let mut table = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match listener {
            None => {
                table.remove(&(scope, event));
                debug!("{:?} {}: all listeners removed", scope, event);
            }
            Some(target) => {
                let Some(list) = table.get_mut(&(scope, event)) else {
                    return;
                };
                if let Some(pos) = list.iter().position(|l| l.same(target)) {
                    list.remove(pos);
                    debug!("{:?} {}: listener removed", scope, event);
                }
                if list.is_empty() {
                    table.remove(&(scope, event));
                }
            }
        }
    }

    /// Drop every listener owned by a panel.
    pub fn clear_panel(&self, handle: PanelHandle) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(scope, _), _| *scope != ScopeKey::Panel(handle));
    }

    /// Drop every listener. Returns how many were removed.
    pub fn clear_all(&self) -> usize {
        let mut table = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let count = table.values().map(Vec::len).sum();
        table.clear();
        count
    }

    pub fn listener_count(&self, scope: ScopeKey, event: EventType) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(scope, event))
            .map_or(0, Vec::len)
    }

    /// Queue `info` for every listener registered right now.
    pub fn emit(&self, scope: ScopeKey, info: EventInfo) {
        let event = info.event();
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(scope, event))
            .cloned()
            .unwrap_or_default();

        if listeners.is_empty() {
            debug!("{:?} {}: no listeners", scope, event);
            return;
        }

        debug!("{:?} {}: queued for {} listener(s)", scope, event, listeners.len());
        if self
            .queue
            .send(Notification::Dispatch { info, listeners })
            .is_err()
        {
            warn!("Dispatcher gone, dropping {} event", event);
        }
    }

    /// Resolves once everything queued before this call has been dispatched.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.queue.send(Notification::Barrier(tx)).is_ok() {
            let _ = rx.await;
        }
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

fn run_dispatcher(rx: Receiver<Notification>) {
    debug!("Event dispatcher started");
    for notification in rx {
        match notification {
            Notification::Dispatch { info, listeners } => {
                for listener in &listeners {
                    if catch_unwind(AssertUnwindSafe(|| listener.call(&info))).is_err() {
                        warn!("{} listener panicked", info.event());
                    }
                }
            }
            Notification::Barrier(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("Event dispatcher stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SelectionInfo;
    use std::sync::Mutex;

    fn recorder(tag: &'static str, log: &Arc<Mutex<Vec<&'static str>>>) -> Listener {
        let log = Arc::clone(log);
        Listener::new(move |_| log.lock().unwrap().push(tag))
    }

    fn selection() -> EventInfo {
        EventInfo::Selection(SelectionInfo::default())
    }

    #[tokio::test]
    async fn test_dispatch_in_registration_order() {
        let hub = EventHub::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = recorder("first", &log);
        hub.on(ScopeKey::Manager, EventType::SelectionCompleted, first.clone());
        hub.on(ScopeKey::Manager, EventType::SelectionCompleted, recorder("second", &log));
        hub.on(ScopeKey::Manager, EventType::SelectionCompleted, first);

        hub.emit(ScopeKey::Manager, selection());
        hub.flush().await;

        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "first"]);
    }

    #[tokio::test]
    async fn test_off_without_listener_removes_all() {
        let hub = EventHub::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        hub.on(ScopeKey::Manager, EventType::SelectionCompleted, recorder("a", &log));
        hub.on(ScopeKey::Manager, EventType::SelectionCompleted, recorder("b", &log));

        hub.off(ScopeKey::Manager, EventType::SelectionCompleted, None);
        hub.emit(ScopeKey::Manager, selection());
        hub.flush().await;

        assert!(log.lock().unwrap().is_empty());
        assert_eq!(
            hub.listener_count(ScopeKey::Manager, EventType::SelectionCompleted),
            0
        );
    }

    #[tokio::test]
    async fn test_off_removes_one_identity() {
        let hub = EventHub::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = recorder("a", &log);
        hub.on(ScopeKey::Manager, EventType::SelectionCompleted, a.clone());
        hub.on(ScopeKey::Manager, EventType::SelectionCompleted, recorder("b", &log));

        hub.off(ScopeKey::Manager, EventType::SelectionCompleted, Some(&a));
        // Unmatched removal is a no-op
        let stranger = recorder("c", &log);
        hub.off(ScopeKey::Manager, EventType::SelectionCompleted, Some(&stranger));

        hub.emit(ScopeKey::Manager, selection());
        hub.flush().await;

        assert_eq!(*log.lock().unwrap(), vec!["b"]);
    }

    #[tokio::test]
    async fn test_panicking_listener_does_not_block_others() {
        let hub = EventHub::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        hub.on(
            ScopeKey::Manager,
            EventType::SelectionCompleted,
            Listener::new(|_| panic!("boom")),
        );
        hub.on(ScopeKey::Manager, EventType::SelectionCompleted, recorder("after", &log));

        hub.emit(ScopeKey::Manager, selection());
        hub.flush().await;

        assert_eq!(*log.lock().unwrap(), vec!["after"]);
    }

    #[tokio::test]
    async fn test_listener_may_unregister_during_dispatch() {
        let hub = Arc::new(EventHub::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        let weak = Arc::downgrade(&hub);
        hub.on(
            ScopeKey::Manager,
            EventType::SelectionCompleted,
            Listener::new(move |_| {
                if let Some(hub) = weak.upgrade() {
                    hub.off(ScopeKey::Manager, EventType::SelectionCompleted, None);
                }
            }),
        );
        hub.on(ScopeKey::Manager, EventType::SelectionCompleted, recorder("second", &log));

        hub.emit(ScopeKey::Manager, selection());
        hub.flush().await;
        hub.emit(ScopeKey::Manager, selection());
        hub.flush().await;

        assert_eq!(*log.lock().unwrap(), vec!["second"]);
    }

    #[test]
    fn test_clear_all_empties_every_scope() {
        let hub = EventHub::new();
        let registry = crate::registry::PanelRegistry::new(1);
        let info = crate::types::PanelInfo::new(crate::types::PanelType::MenuPanel, 0, 0, 1, 1);
        let panel = registry.insert(crate::panel::PanelRecord::new(&info, 1));
        let noop = Listener::new(|_| {});

        hub.on(ScopeKey::Manager, EventType::SelectionCompleted, noop.clone());
        hub.on(ScopeKey::Manager, EventType::SelectionCompleted, noop.clone());
        hub.on(ScopeKey::Panel(panel), EventType::Hidden, noop);

        assert_eq!(hub.clear_all(), 3);
        assert_eq!(
            hub.listener_count(ScopeKey::Manager, EventType::SelectionCompleted),
            0
        );
        assert_eq!(hub.listener_count(ScopeKey::Panel(panel), EventType::Hidden), 0);
    }

    #[test]
    fn test_clear_panel_keeps_other_scopes() {
        let hub = EventHub::new();
        let registry = crate::registry::PanelRegistry::new(1);
        let info = crate::types::PanelInfo::new(crate::types::PanelType::MainPanel, 0, 0, 1, 1);
        let a = registry.insert(crate::panel::PanelRecord::new(&info, 1));
        let b = registry.insert(crate::panel::PanelRecord::new(&info, 2));
        let noop = Listener::new(|_| {});

        hub.on(ScopeKey::Panel(a), EventType::Hidden, noop.clone());
        hub.on(ScopeKey::Panel(a), EventType::Destroyed, noop.clone());
        hub.on(ScopeKey::Panel(b), EventType::Hidden, noop.clone());
        hub.on(ScopeKey::Manager, EventType::SelectionCompleted, noop);

        hub.clear_panel(a);

        assert_eq!(hub.listener_count(ScopeKey::Panel(a), EventType::Hidden), 0);
        assert_eq!(hub.listener_count(ScopeKey::Panel(a), EventType::Destroyed), 0);
        assert_eq!(hub.listener_count(ScopeKey::Panel(b), EventType::Hidden), 1);
        assert_eq!(
            hub.listener_count(ScopeKey::Manager, EventType::SelectionCompleted),
            1
        );
    }
}
