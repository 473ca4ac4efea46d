//! Listener registry and event records for session outcomes.

use std::{cell::RefCell, rc::Rc};

use crate::error::SessionError;
use crate::state::SessionState;
use crate::types::FileInfo;

#[derive(Debug, Clone, PartialEq)]
/// Outcome of a create operation.
pub struct CreateFileEvent {
    /// File info on success, classified error otherwise.
    pub result: Result<FileInfo, SessionError>,
}

#[derive(Debug, Clone, PartialEq)]
/// Outcome of an open operation.
pub struct OpenFileEvent {
    /// File info on success, classified error otherwise.
    pub result: Result<FileInfo, SessionError>,
}

#[derive(Debug, Clone, PartialEq)]
/// Outcome of a close operation.
pub struct CloseFileEvent {
    /// Final file info on success, classified error otherwise.
    pub result: Result<FileInfo, SessionError>,
}

#[derive(Debug, Clone, PartialEq)]
/// Outcome of a manual or autosave-triggered save.
pub struct SaveFileEvent {
    /// Content the save attempted to write.
    pub content: String,
    /// Classified error when the save failed.
    pub error: Option<SessionError>,
}

impl SaveFileEvent {
    /// Returns true when the save failed.
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Emitted when the session state snapshot actually changed.
pub struct StateChangeEvent {
    /// Snapshot after the change.
    pub current: SessionState,
    /// Snapshot before the change.
    pub previous: SessionState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Emitted when the autosave process starts or stops.
pub struct AutosaveRunningChangeEvent {
    /// Whether autosave is running after the change.
    pub running: bool,
}

type Listeners<E> = Vec<(u64, Rc<dyn Fn(&E)>)>;

#[derive(Default)]
struct ObserverInner {
    next_id: u64,
    create_file: Listeners<CreateFileEvent>,
    open_file: Listeners<OpenFileEvent>,
    close_file: Listeners<CloseFileEvent>,
    save_file: Listeners<SaveFileEvent>,
    autosave_file: Listeners<SaveFileEvent>,
    state_change: Listeners<StateChangeEvent>,
    autosave_running: Listeners<AutosaveRunningChangeEvent>,
}

#[derive(Clone, Default)]
/// Stores and notifies listeners for every session event kind.
///
/// Listeners run synchronously in registration order; notification snapshots
/// the listener list first, so a listener may register or unsubscribe others
/// without disturbing the in-flight notification.
pub struct SessionObserver {
    inner: Rc<RefCell<ObserverInner>>,
}

/// Removes its listener when [`Subscription::unsubscribe`] is called.
///
/// Dropping the subscription without calling it leaves the listener
/// registered for the observer's lifetime.
pub struct Subscription {
    remove: Box<dyn FnOnce()>,
}

impl Subscription {
    /// Removes the listener this subscription was returned for.
    pub fn unsubscribe(self) {
        (self.remove)();
    }
}

macro_rules! listener_methods {
    ($add:ident, $notify:ident, $list:ident, $event:ty, $doc:literal) => {
        #[doc = $doc]
        pub fn $add(&self, listener: impl Fn(&$event) + 'static) -> Subscription {
            let id = self.next_id();
            let listener: Rc<dyn Fn(&$event)> = Rc::new(listener);
            self.inner.borrow_mut().$list.push((id, listener));
            let inner = Rc::clone(&self.inner);
            Subscription {
                remove: Box::new(move || {
                    inner.borrow_mut().$list.retain(|(lid, _)| *lid != id);
                }),
            }
        }

        pub(crate) fn $notify(&self, event: &$event) {
            let listeners: Vec<_> = self
                .inner
                .borrow()
                .$list
                .iter()
                .map(|(_, listener)| Rc::clone(listener))
                .collect();
            for listener in listeners {
                listener(event);
            }
        }
    };
}

impl SessionObserver {
    fn next_id(&self) -> u64 {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        inner.next_id
    }

    listener_methods!(
        add_create_file_listener,
        notify_create_file,
        create_file,
        CreateFileEvent,
        "Adds a listener notified every time a create operation completes."
    );

    listener_methods!(
        add_open_file_listener,
        notify_open_file,
        open_file,
        OpenFileEvent,
        "Adds a listener notified every time an open operation completes."
    );

    listener_methods!(
        add_close_file_listener,
        notify_close_file,
        close_file,
        CloseFileEvent,
        "Adds a listener notified every time a close operation completes."
    );

    listener_methods!(
        add_save_file_listener,
        notify_save_file,
        save_file,
        SaveFileEvent,
        "Adds a listener notified every time a save operation completes."
    );

    listener_methods!(
        add_autosave_file_listener,
        notify_autosave_file,
        autosave_file,
        SaveFileEvent,
        "Adds a listener notified after every executed autosave tick."
    );

    listener_methods!(
        add_state_change_listener,
        notify_state_change,
        state_change,
        StateChangeEvent,
        "Adds a listener notified every time the session state changes."
    );

    listener_methods!(
        add_autosave_running_listener,
        notify_autosave_running,
        autosave_running,
        AutosaveRunningChangeEvent,
        "Adds a listener notified every time the autosave process starts or stops."
    );
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn listeners_are_notified_until_unsubscribed() {
        let observer = SessionObserver::default();
        let seen = Rc::new(Cell::new(0u32));

        let seen_a = Rc::clone(&seen);
        let sub = observer.add_save_file_listener(move |_| seen_a.set(seen_a.get() + 1));
        let seen_b = Rc::clone(&seen);
        let _keep = observer.add_save_file_listener(move |_| seen_b.set(seen_b.get() + 1));

        let event = SaveFileEvent {
            content: "x".to_string(),
            error: None,
        };
        observer.notify_save_file(&event);
        assert_eq!(seen.get(), 2);

        sub.unsubscribe();
        observer.notify_save_file(&event);
        assert_eq!(seen.get(), 3);
    }

    #[test]
    fn event_kinds_are_delivered_independently() {
        let observer = SessionObserver::default();
        let opened = Rc::new(Cell::new(false));

        let opened_flag = Rc::clone(&opened);
        let _sub = observer.add_open_file_listener(move |event| {
            assert!(event.result.is_ok());
            opened_flag.set(true);
        });

        observer.notify_close_file(&CloseFileEvent {
            result: Err(crate::error::SessionError::new(
                crate::error::SessionErrorKind::MissingFile,
                "There is no file to close",
            )),
        });
        assert!(!opened.get());

        observer.notify_open_file(&OpenFileEvent {
            result: Ok(FileInfo {
                name: "a.txt".to_string(),
                size: 1,
                mime_type: String::new(),
                content: "a".to_string(),
            }),
        });
        assert!(opened.get());
    }
}
