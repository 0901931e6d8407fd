//! Pomodoro countdown state machine.
//!
//! The machine is purely synchronous: a driver calls [`PomodoroTimer::tick`]
//! once per elapsed second while [`PomodoroTimer::is_running`] is true and
//! forwards any returned [`TimerEvent`] to the user.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::notification::Notification;

//
// ─── MODE ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            TimerMode::Focus => "Focus",
            TimerMode::ShortBreak => "Short Break",
            TimerMode::LongBreak => "Long Break",
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TimerSettingsError {
    #[error("{mode} duration must be > 0 minutes")]
    ZeroDuration { mode: TimerMode },

    #[error("sessions before long break must be > 0")]
    ZeroSessionsBeforeLongBreak,
}

/// Durations (minutes) and the long-break cadence.
///
/// Field names on the wire match the persisted `pomodoroSettings` document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSettings {
    pub focus_duration: u32,
    pub short_break_duration: u32,
    pub long_break_duration: u32,
    pub sessions_before_long_break: u32,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            focus_duration: 25,
            short_break_duration: 5,
            long_break_duration: 15,
            sessions_before_long_break: 4,
        }
    }
}

impl TimerSettings {
    /// Configured length of `mode` in minutes.
    #[must_use]
    pub fn minutes(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Focus => self.focus_duration,
            TimerMode::ShortBreak => self.short_break_duration,
            TimerMode::LongBreak => self.long_break_duration,
        }
    }

    /// Configured length of `mode` in seconds.
    #[must_use]
    pub fn seconds(&self, mode: TimerMode) -> u32 {
        self.minutes(mode).saturating_mul(60)
    }

    /// Break that follows the `completed`-th focus session.
    #[must_use]
    pub fn break_after(&self, completed: u32) -> TimerMode {
        if self.sessions_before_long_break != 0 && completed % self.sessions_before_long_break == 0
        {
            TimerMode::LongBreak
        } else {
            TimerMode::ShortBreak
        }
    }

    #[must_use]
    pub fn merged(mut self, patch: TimerSettingsPatch) -> Self {
        if let Some(v) = patch.focus_duration {
            self.focus_duration = v;
        }
        if let Some(v) = patch.short_break_duration {
            self.short_break_duration = v;
        }
        if let Some(v) = patch.long_break_duration {
            self.long_break_duration = v;
        }
        if let Some(v) = patch.sessions_before_long_break {
            self.sessions_before_long_break = v;
        }
        self
    }

    /// Check every value is positive.
    ///
    /// The timer itself does not enforce this; callers validate before
    /// handing settings over.
    ///
    /// # Errors
    ///
    /// Returns `TimerSettingsError` for the first zero value found.
    pub fn validate(&self) -> Result<(), TimerSettingsError> {
        for mode in [TimerMode::Focus, TimerMode::ShortBreak, TimerMode::LongBreak] {
            if self.minutes(mode) == 0 {
                return Err(TimerSettingsError::ZeroDuration { mode });
            }
        }
        if self.sessions_before_long_break == 0 {
            return Err(TimerSettingsError::ZeroSessionsBeforeLongBreak);
        }
        Ok(())
    }
}

/// Partial settings update; absent fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimerSettingsPatch {
    pub focus_duration: Option<u32>,
    pub short_break_duration: Option<u32>,
    pub long_break_duration: Option<u32>,
    pub sessions_before_long_break: Option<u32>,
}

//
// ─── EVENTS ────────────────────────────────────────────────────────────────────
//

/// Emitted by [`PomodoroTimer::tick`] when a countdown reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    FocusCompleted { completed_sessions: u32, next: TimerMode },
    BreakCompleted { mode: TimerMode },
}

impl TimerEvent {
    #[must_use]
    pub fn notification(&self) -> Notification {
        match self {
            TimerEvent::FocusCompleted {
                completed_sessions, ..
            } => Notification::info(
                "Focus Session Complete!",
                format!("Great job! You've completed {completed_sessions} sessions today."),
            ),
            TimerEvent::BreakCompleted { mode } => {
                Notification::info(format!("{} Complete", mode.label()), "Time to focus again!")
            }
        }
    }
}

//
// ─── SNAPSHOT ──────────────────────────────────────────────────────────────────
//

/// Read-only view of the timer for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub mode: TimerMode,
    pub time: String,
    pub seconds_remaining: u32,
    pub is_running: bool,
    pub progress: f64,
    pub completed_focus_count: u32,
    pub total_focus_minutes: u32,
    pub settings: TimerSettings,
}

/// Formats seconds as `MM:SS`.
#[must_use]
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

//
// ─── TIMER ─────────────────────────────────────────────────────────────────────
//

/// Countdown over Focus / ShortBreak / LongBreak.
///
/// Invariants: `seconds_remaining` never exceeds the current mode's duration,
/// the timer is never running with zero seconds left, and the completed-focus
/// counter only moves on countdown completion or `skip_to_next` out of Focus.
#[derive(Debug, Clone, PartialEq)]
pub struct PomodoroTimer {
    settings: TimerSettings,
    mode: TimerMode,
    seconds_remaining: u32,
    running: bool,
    progress: f64,
    completed_focus_count: u32,
    total_focus_minutes: u32,
}

impl Default for PomodoroTimer {
    fn default() -> Self {
        Self::new(TimerSettings::default())
    }
}

impl PomodoroTimer {
    /// New timer in Focus mode with a full, paused countdown.
    #[must_use]
    pub fn new(settings: TimerSettings) -> Self {
        Self {
            settings,
            mode: TimerMode::Focus,
            seconds_remaining: settings.seconds(TimerMode::Focus),
            running: false,
            progress: 100.0,
            completed_focus_count: 0,
            total_focus_minutes: 0,
        }
    }

    #[must_use]
    pub fn settings(&self) -> TimerSettings {
        self.settings
    }

    #[must_use]
    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    #[must_use]
    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Percentage of the current countdown still left, for display.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    #[must_use]
    pub fn completed_focus_count(&self) -> u32 {
        self.completed_focus_count
    }

    #[must_use]
    pub fn total_focus_minutes(&self) -> u32 {
        self.total_focus_minutes
    }

    #[must_use]
    pub fn mode_duration_secs(&self) -> u32 {
        self.settings.seconds(self.mode)
    }

    /// Remaining time as `MM:SS`.
    #[must_use]
    pub fn formatted_time(&self) -> String {
        format_clock(self.seconds_remaining)
    }

    #[must_use]
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            mode: self.mode,
            time: self.formatted_time(),
            seconds_remaining: self.seconds_remaining,
            is_running: self.running,
            progress: self.progress,
            completed_focus_count: self.completed_focus_count,
            total_focus_minutes: self.total_focus_minutes,
            settings: self.settings,
        }
    }

    /// Begin counting down. Returns `true` if the timer transitioned to running.
    ///
    /// No-op when already running or nothing is left on the clock.
    pub fn start(&mut self) -> bool {
        if self.running || self.seconds_remaining == 0 {
            return false;
        }
        self.running = true;
        true
    }

    /// Stop counting down, keeping the remaining time. Returns `true` if the
    /// timer was running.
    pub fn pause(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        true
    }

    /// Refill the current mode's countdown and stop. Mode and counters stay.
    pub fn reset(&mut self) {
        self.running = false;
        self.seconds_remaining = self.mode_duration_secs();
        self.progress = 100.0;
    }

    /// Switch to `mode` with a full, stopped countdown. Counters stay.
    pub fn set_mode(&mut self, mode: TimerMode) {
        self.mode = mode;
        self.reset();
    }

    /// Leave the current mode early.
    ///
    /// Leaving Focus counts as a completed session and credits the elapsed
    /// time, rounded up to whole minutes. Returns the new mode.
    pub fn skip_to_next(&mut self) -> TimerMode {
        let next = match self.mode {
            TimerMode::Focus => {
                self.completed_focus_count += 1;
                let elapsed = self
                    .mode_duration_secs()
                    .saturating_sub(self.seconds_remaining);
                if elapsed > 0 {
                    self.total_focus_minutes += elapsed.div_ceil(60);
                }
                self.settings.break_after(self.completed_focus_count)
            }
            TimerMode::ShortBreak | TimerMode::LongBreak => TimerMode::Focus,
        };
        self.set_mode(next);
        next
    }

    /// Merge new settings and reset the current mode under them.
    pub fn update_settings(&mut self, patch: TimerSettingsPatch) -> TimerSettings {
        self.settings = self.settings.merged(patch);
        self.reset();
        self.settings
    }

    /// Advance one second. Returns an event when the countdown completes.
    ///
    /// Ignored while paused so that a late tick from a cancelled driver has
    /// no effect.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if !self.running {
            return None;
        }

        if self.seconds_remaining <= 1 {
            self.seconds_remaining = 0;
            self.running = false;
            let event = match self.mode {
                TimerMode::Focus => {
                    self.completed_focus_count += 1;
                    self.total_focus_minutes += self.settings.focus_duration;
                    let next = self.settings.break_after(self.completed_focus_count);
                    TimerEvent::FocusCompleted {
                        completed_sessions: self.completed_focus_count,
                        next,
                    }
                }
                mode => TimerEvent::BreakCompleted { mode },
            };
            let next = match event {
                TimerEvent::FocusCompleted { next, .. } => next,
                TimerEvent::BreakCompleted { .. } => TimerMode::Focus,
            };
            self.set_mode(next);
            return Some(event);
        }

        let total = self.mode_duration_secs();
        self.progress = f64::from(self.seconds_remaining - 1) / f64::from(total) * 100.0;
        self.seconds_remaining -= 1;
        None
    }
}
