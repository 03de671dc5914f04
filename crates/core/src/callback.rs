// Listener registry for playback notifications
// One slot per notification kind; registering again replaces the handler

use crate::error::ErrorReport;
use crate::session::SessionId;

pub type CompleteListener = Box<dyn FnMut(&SessionId) + Send>;
pub type ErrorListener = Box<dyn FnMut(&ErrorReport) + Send>;
pub type ProgressListener = Box<dyn FnMut(u8, &SessionId) + Send>;

/// Single-slot holder with an explicit "nothing registered" state
pub enum ListenerSlot<L> {
    Unset,
    Set(L),
}

impl<L> Default for ListenerSlot<L> {
    fn default() -> Self {
        ListenerSlot::Unset
    }
}

impl<L> ListenerSlot<L> {
    /// Store `listener`, returning true if it replaced a previous one
    pub fn set(&mut self, listener: L) -> bool {
        let replaced = self.is_set();
        *self = ListenerSlot::Set(listener);
        replaced
    }

    pub fn clear(&mut self) {
        *self = ListenerSlot::Unset;
    }

    pub fn is_set(&self) -> bool {
        matches!(self, ListenerSlot::Set(_))
    }

    pub fn get_mut(&mut self) -> Option<&mut L> {
        match self {
            ListenerSlot::Set(listener) => Some(listener),
            ListenerSlot::Unset => None,
        }
    }
}

/// Completion, error and progress listeners
///
/// The `notify_*` methods return whether a listener received the event.
#[derive(Default)]
pub struct ListenerRegistry {
    complete: ListenerSlot<CompleteListener>,
    error: ListenerSlot<ErrorListener>,
    progress: ListenerSlot<ProgressListener>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_complete(&mut self, listener: CompleteListener) {
        if self.complete.set(listener) {
            log::debug!("Replaced complete listener");
        }
    }

    pub fn set_error(&mut self, listener: ErrorListener) {
        if self.error.set(listener) {
            log::debug!("Replaced error listener");
        }
    }

    pub fn set_progress(&mut self, listener: ProgressListener) {
        if self.progress.set(listener) {
            log::debug!("Replaced progress listener");
        }
    }

    pub fn has_complete(&self) -> bool {
        self.complete.is_set()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_set()
    }

    pub fn has_progress(&self) -> bool {
        self.progress.is_set()
    }

    pub fn clear(&mut self) {
        self.complete.clear();
        self.error.clear();
        self.progress.clear();
    }

    pub fn notify_complete(&mut self, session_id: &SessionId) -> bool {
        match self.complete.get_mut() {
            Some(listener) => {
                listener(session_id);
                true
            }
            None => {
                log::debug!("No complete listener registered for {}", session_id);
                false
            }
        }
    }

    pub fn notify_error(&mut self, report: &ErrorReport) -> bool {
        match self.error.get_mut() {
            Some(listener) => {
                listener(report);
                true
            }
            None => {
                log::debug!(
                    "No error listener registered for {}: {}",
                    report.session_id,
                    report.message
                );
                false
            }
        }
    }

    pub fn notify_progress(&mut self, percent: u8, session_id: &SessionId) -> bool {
        match self.progress.get_mut() {
            Some(listener) => {
                listener(percent, session_id);
                true
            }
            // Progress fires on every time update; not worth a log line
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, PlaybackError};
    use std::sync::{Arc, Mutex};

    fn id() -> SessionId {
        SessionId::from_uri("assets/audio/voice-female/audio-cat.mp3")
    }

    #[test]
    fn test_unset_slot_reports_not_delivered() {
        let mut registry = ListenerRegistry::new();
        assert!(!registry.has_complete());
        assert!(!registry.notify_complete(&id()));
        assert!(!registry.notify_progress(10, &id()));
        let report = ErrorReport::new(id(), &PlaybackError::EngineUnknown("x".into()));
        assert!(!registry.notify_error(&report));
    }

    #[test]
    fn test_registration_replaces_previous_listener() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::new();

        let first = calls.clone();
        registry.set_progress(Box::new(move |p: u8, _: &SessionId| {
            first.lock().unwrap().push(("first", p))
        }));
        let second = calls.clone();
        registry.set_progress(Box::new(move |p: u8, _: &SessionId| {
            second.lock().unwrap().push(("second", p))
        }));

        assert!(registry.notify_progress(40, &id()));
        assert_eq!(*calls.lock().unwrap(), vec![("second", 40)]);
    }

    #[test]
    fn test_error_listener_receives_report() {
        let seen = Arc::new(Mutex::new(None));
        let mut registry = ListenerRegistry::new();
        let sink = seen.clone();
        registry.set_error(Box::new(move |r: &ErrorReport| {
            *sink.lock().unwrap() = Some(r.clone())
        }));

        let report = ErrorReport::new(id(), &PlaybackError::EngineNetwork("offline".into()));
        assert!(registry.notify_error(&report));

        let got = seen.lock().unwrap().clone().unwrap();
        assert_eq!(got.kind, ErrorKind::EngineNetwork);
        assert_eq!(got.session_id.as_str(), "audio-cat");
    }

    #[test]
    fn test_clear_unsets_every_slot() {
        let mut registry = ListenerRegistry::new();
        registry.set_complete(Box::new(|_: &SessionId| {}));
        registry.set_error(Box::new(|_: &ErrorReport| {}));
        registry.set_progress(Box::new(|_: u8, _: &SessionId| {}));
        registry.clear();
        assert!(!registry.has_complete() && !registry.has_error() && !registry.has_progress());
    }
}
