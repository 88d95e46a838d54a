//! Thread hook that records its notifications.

use std::sync::Mutex;

use crate::thread_hook::ThreadNotification;

/// Notification received by a [`RecordingThreadHook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    Start,
    Stop,
}

/// Records start and stop calls in order.
#[derive(Debug, Default)]
pub struct RecordingThreadHook {
    events: Mutex<Vec<HookEvent>>,
}

impl RecordingThreadHook {
    /// Captures a copy of the recorded notifications.
    #[must_use]
    pub fn events(&self) -> Vec<HookEvent> {
        self.events
            .lock()
            .expect("thread hook mutex poisoned")
            .clone()
    }

    fn record(&self, event: HookEvent) {
        self.events
            .lock()
            .expect("thread hook mutex poisoned")
            .push(event);
    }
}

impl ThreadNotification for RecordingThreadHook {
    fn start(&self) {
        self.record(HookEvent::Start);
    }

    fn stop(&self) {
        self.record(HookEvent::Stop);
    }
}
