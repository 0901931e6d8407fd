//! Runtime driver for the Pomodoro timer.
//!
//! [`PomodoroService`] owns a [`PomodoroTimer`] and, while it runs, a single
//! tokio task that ticks it once per second. Every mutation happens under one
//! mutex and is published as a [`TimerSnapshot`] on a watch channel.
//! Cancelling bumps a generation counter and aborts the task, so a tick that
//! raced with the cancel sees a stale generation and does nothing.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use storage::local::{LocalStore, StorageKey};
use study_core::pomodoro::{
    PomodoroTimer, TimerMode, TimerSettings, TimerSettingsPatch, TimerSnapshot,
};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::{debug, warn};

use crate::error::PomodoroError;
use crate::notify::Notifier;

const TICK: Duration = Duration::from_secs(1);

struct TimerState {
    timer: PomodoroTimer,
    generation: u64,
    ticker: Option<JoinHandle<()>>,
}

impl TimerState {
    fn cancel_ticker(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

struct Inner {
    state: Mutex<TimerState>,
    updates: watch::Sender<TimerSnapshot>,
    notifier: Arc<dyn Notifier>,
    local: LocalStore,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &TimerState) {
        self.updates.send_replace(state.timer.snapshot());
    }

    /// One elapsed second. Returns whether the ticker should keep going.
    fn on_tick(&self, generation: u64) -> bool {
        let (event, finished) = {
            let mut state = self.state();
            if state.generation != generation || !state.timer.is_running() {
                return false;
            }
            let event = state.timer.tick();
            let finished = !state.timer.is_running();
            if finished {
                // Completion ends this task; detach rather than abort ourselves.
                state.ticker = None;
            }
            self.publish(&state);
            (event, finished)
        };

        if let Some(event) = event {
            debug!(?event, "countdown completed");
            self.notifier.notify(event.notification());
        }
        !finished
    }
}

/// Shared Pomodoro timer with a background ticker.
///
/// Share it behind an `Arc`. Dropping the last handle stops the ticker.
pub struct PomodoroService {
    inner: Arc<Inner>,
}

impl fmt::Debug for PomodoroService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PomodoroService")
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}

impl PomodoroService {
    /// Timer configured from the stored `pomodoroSettings`, or defaults.
    #[must_use]
    pub fn new(local: LocalStore, notifier: Arc<dyn Notifier>) -> Self {
        let settings = load_settings(&local);
        Self::with_settings(settings, local, notifier)
    }

    #[must_use]
    pub fn with_settings(
        settings: TimerSettings,
        local: LocalStore,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let timer = PomodoroTimer::new(settings);
        let (updates, _) = watch::channel(timer.snapshot());
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(TimerState {
                    timer,
                    generation: 0,
                    ticker: None,
                }),
                updates,
                notifier,
                local,
            }),
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.inner.updates.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> TimerSnapshot {
        self.inner.state().timer.snapshot()
    }

    #[must_use]
    pub fn settings(&self) -> TimerSettings {
        self.inner.state().timer.settings()
    }

    /// Begin counting down. Returns `false` when already running, when the
    /// clock is empty, or outside a tokio runtime.
    pub fn start(&self) -> bool {
        let mut state = self.inner.state();
        let Ok(runtime) = Handle::try_current() else {
            warn!("pomodoro start ignored: no tokio runtime");
            return false;
        };
        if !state.timer.start() {
            return false;
        }

        state.cancel_ticker();
        let generation = state.generation;
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        state.ticker = Some(runtime.spawn(async move {
            let mut interval = interval_at(Instant::now() + TICK, TICK);
            loop {
                interval.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                if !inner.on_tick(generation) {
                    break;
                }
            }
        }));

        debug!(mode = %state.timer.mode(), remaining = state.timer.seconds_remaining(), "timer started");
        self.inner.publish(&state);
        true
    }

    pub fn pause(&self) -> bool {
        let mut state = self.inner.state();
        state.cancel_ticker();
        let paused = state.timer.pause();
        if paused {
            debug!(remaining = state.timer.seconds_remaining(), "timer paused");
        }
        self.inner.publish(&state);
        paused
    }

    pub fn reset(&self) {
        let mut state = self.inner.state();
        state.cancel_ticker();
        state.timer.reset();
        self.inner.publish(&state);
    }

    pub fn set_mode(&self, mode: TimerMode) {
        let mut state = self.inner.state();
        state.cancel_ticker();
        state.timer.set_mode(mode);
        debug!(%mode, "timer mode set");
        self.inner.publish(&state);
    }

    pub fn skip_to_next(&self) -> TimerMode {
        let mut state = self.inner.state();
        state.cancel_ticker();
        let next = state.timer.skip_to_next();
        debug!(mode = %next, "skipped to next mode");
        self.inner.publish(&state);
        next
    }

    /// Merge, validate and apply new settings, then persist them.
    ///
    /// Persistence is best effort; a failed save is logged and the new
    /// settings stay in effect.
    ///
    /// # Errors
    ///
    /// Returns `PomodoroError::Settings` if the merged settings are invalid.
    /// The timer is left untouched in that case.
    pub fn update_settings(
        &self,
        patch: TimerSettingsPatch,
    ) -> Result<TimerSettings, PomodoroError> {
        let settings = {
            let mut state = self.inner.state();
            state.timer.settings().merged(patch).validate()?;
            state.cancel_ticker();
            let settings = state.timer.update_settings(patch);
            self.inner.publish(&state);
            settings
        };
        self.inner.local.save(StorageKey::PomodoroSettings, &settings);
        Ok(settings)
    }

    /// Stop the ticker and pause. Safe to call more than once.
    pub fn shutdown(&self) {
        let mut state = self.inner.state();
        state.cancel_ticker();
        state.timer.pause();
        self.inner.publish(&state);
    }
}

impl Drop for PomodoroService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn load_settings(local: &LocalStore) -> TimerSettings {
    let patch = match local.load::<TimerSettingsPatch>(StorageKey::PomodoroSettings) {
        Ok(Some(patch)) => patch,
        Ok(None) => return TimerSettings::default(),
        Err(e) => {
            warn!(error = %e, "stored pomodoro settings unreadable; using defaults");
            return TimerSettings::default();
        }
    };
    let settings = TimerSettings::default().merged(patch);
    match settings.validate() {
        Ok(()) => settings,
        Err(e) => {
            warn!(error = %e, "stored pomodoro settings invalid; using defaults");
            TimerSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemoryNotifier;

    #[test]
    fn start_without_runtime_is_refused() {
        let service = PomodoroService::new(LocalStore::in_memory(), Arc::new(MemoryNotifier::new()));
        assert!(!service.start());
        assert!(!service.snapshot().is_running);
    }

    #[test]
    fn partial_stored_settings_merge_into_defaults() {
        let local = LocalStore::in_memory();
        local.save(
            StorageKey::PomodoroSettings,
            &serde_json::json!({ "focusDuration": 50 }),
        );
        let settings = load_settings(&local);
        assert_eq!(settings.focus_duration, 50);
        assert_eq!(settings.short_break_duration, 5);

        local.save(
            StorageKey::PomodoroSettings,
            &serde_json::json!({ "focusDuration": 0 }),
        );
        assert_eq!(load_settings(&local), TimerSettings::default());
    }
}
