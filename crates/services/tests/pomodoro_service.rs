use std::sync::Arc;
use std::time::Duration;

use services::{MemoryNotifier, PomodoroService};
use storage::local::{LocalStore, StorageKey};
use study_core::pomodoro::{TimerMode, TimerSettings, TimerSettingsPatch};

fn one_minute_focus() -> TimerSettings {
    TimerSettings {
        focus_duration: 1,
        short_break_duration: 1,
        long_break_duration: 2,
        sessions_before_long_break: 2,
    }
}

fn service(settings: TimerSettings) -> (PomodoroService, Arc<MemoryNotifier>) {
    let notifier = Arc::new(MemoryNotifier::new());
    let service = PomodoroService::with_settings(settings, LocalStore::in_memory(), notifier.clone());
    (service, notifier)
}

async fn wait(secs: f64) {
    tokio::time::sleep(Duration::from_secs_f64(secs)).await;
}

#[tokio::test(start_paused = true)]
async fn focus_completion_notifies_and_switches_to_break() {
    let (timer, notes) = service(one_minute_focus());
    let mut updates = timer.subscribe();

    assert!(timer.start());
    wait(60.5).await;

    let snap = timer.snapshot();
    assert_eq!(snap.mode, TimerMode::ShortBreak);
    assert!(!snap.is_running);
    assert_eq!(snap.time, "01:00");
    assert_eq!(snap.completed_focus_count, 1);
    assert_eq!(snap.total_focus_minutes, 1);

    let toasts = notes.drain();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].title, "Focus Session Complete!");
    assert_eq!(
        toasts[0].description,
        "Great job! You've completed 1 sessions today."
    );

    assert!(updates.has_changed().unwrap());
    assert_eq!(*updates.borrow_and_update(), snap);

    // Nothing ticks after completion.
    wait(10.0).await;
    assert_eq!(timer.snapshot(), snap);
}

#[tokio::test(start_paused = true)]
async fn second_start_does_not_double_tick() {
    let (timer, _) = service(TimerSettings::default());
    assert!(timer.start());
    assert!(!timer.start());

    wait(10.5).await;
    assert_eq!(timer.snapshot().seconds_remaining, 25 * 60 - 10);
}

#[tokio::test(start_paused = true)]
async fn pause_freezes_and_resume_continues() {
    let (timer, _) = service(TimerSettings::default());
    timer.start();
    wait(10.5).await;
    assert!(timer.pause());
    assert!(!timer.pause());

    wait(30.0).await;
    assert_eq!(timer.snapshot().time, "24:50");

    timer.start();
    wait(5.5).await;
    assert_eq!(timer.snapshot().seconds_remaining, 25 * 60 - 15);
}

#[tokio::test(start_paused = true)]
async fn mode_changes_stop_the_ticker() {
    let (timer, _) = service(TimerSettings::default());
    timer.start();
    wait(3.5).await;

    timer.set_mode(TimerMode::LongBreak);
    wait(5.0).await;
    let snap = timer.snapshot();
    assert!(!snap.is_running);
    assert_eq!(snap.time, "15:00");

    timer.start();
    wait(2.5).await;
    assert_eq!(timer.skip_to_next(), TimerMode::Focus);
    wait(5.0).await;
    assert_eq!(timer.snapshot().seconds_remaining, 25 * 60);

    timer.start();
    wait(61.5).await;
    timer.reset();
    wait(5.0).await;
    let snap = timer.snapshot();
    assert_eq!(snap.seconds_remaining, 25 * 60);
    assert_eq!(snap.progress, 100.0);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_service_cancels_ticking() {
    let (timer, notes) = service(one_minute_focus());
    let updates = timer.subscribe();
    timer.start();
    wait(30.5).await;
    drop(timer);

    wait(120.0).await;
    assert!(notes.drain().is_empty());
    assert!(!updates.borrow().is_running);
}

#[tokio::test]
async fn settings_are_validated_persisted_and_reloaded() {
    let local = LocalStore::in_memory();
    let notifier = Arc::new(MemoryNotifier::new());
    let timer = PomodoroService::new(local.clone(), notifier.clone());
    assert_eq!(timer.settings(), TimerSettings::default());

    let err = timer.update_settings(TimerSettingsPatch {
        short_break_duration: Some(0),
        ..TimerSettingsPatch::default()
    });
    assert!(err.is_err());
    assert_eq!(timer.settings(), TimerSettings::default());
    assert_eq!(
        local
            .load::<TimerSettings>(StorageKey::PomodoroSettings)
            .unwrap(),
        None
    );

    let updated = timer
        .update_settings(TimerSettingsPatch {
            focus_duration: Some(50),
            ..TimerSettingsPatch::default()
        })
        .unwrap();
    assert_eq!(updated.focus_duration, 50);
    assert_eq!(timer.snapshot().time, "50:00");
    drop(timer);

    let reopened = PomodoroService::new(local, notifier);
    assert_eq!(reopened.settings().focus_duration, 50);
    assert_eq!(reopened.snapshot().seconds_remaining, 50 * 60);
}
