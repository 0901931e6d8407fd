//! Notification sinks for user-facing toasts.

use std::sync::{Mutex, PoisonError};

use study_core::Notification;

/// Receives toasts raised by the planner services.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes toasts to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        if notification.is_error() {
            tracing::warn!(title = %notification.title, "{}", notification.description);
        } else {
            tracing::info!(title = %notification.title, "{}", notification.description);
        }
    }
}

/// Queues toasts in memory until drained.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    queue: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every queued toast, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.queue.lock().unwrap_or_else(PoisonError::into_inner))
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<Notification> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_notifier_drains_in_order() {
        let sink = MemoryNotifier::new();
        sink.notify(Notification::info("One", "first"));
        sink.notify(Notification::error("second"));

        assert_eq!(sink.snapshot().len(), 2);
        let drained = sink.drain();
        assert_eq!(drained[0].title, "One");
        assert!(drained[1].is_error());
        assert!(sink.drain().is_empty());
    }
}
