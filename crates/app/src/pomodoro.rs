use std::future::Future;
use std::io::BufRead;
use std::sync::Arc;

use services::{LogNotifier, PomodoroService};
use storage::local::LocalStore;
use study_core::pomodoro::{TimerMode, TimerSettingsPatch, TimerSnapshot};
use tokio::sync::mpsc;

use crate::args::PomodoroArgs;
use crate::error::AppError;

const HELP: &str = "commands: [s]tart [p]ause [r]eset [n]ext [f]ocus [b]reak [l]ong-break [q]uit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Start,
    Pause,
    Reset,
    Next,
    Mode(TimerMode),
    Quit,
    Empty,
}

impl Input {
    fn parse(line: &str) -> Option<Self> {
        let input = match line.trim() {
            "s" | "start" => Self::Start,
            "p" | "pause" => Self::Pause,
            "r" | "reset" => Self::Reset,
            "n" | "next" => Self::Next,
            "f" | "focus" => Self::Mode(TimerMode::Focus),
            "b" | "break" => Self::Mode(TimerMode::ShortBreak),
            "l" | "long" => Self::Mode(TimerMode::LongBreak),
            "q" | "quit" | "exit" => Self::Quit,
            "" => Self::Empty,
            _ => return None,
        };
        Some(input)
    }
}

fn status_line(snap: &TimerSnapshot) -> String {
    let state = if snap.is_running { "running" } else { "paused" };
    format!(
        "{:<11} {}  {:>3.0}%  {state}  [{} done, {} min]",
        snap.mode.label(),
        snap.time,
        snap.progress,
        snap.completed_focus_count,
        snap.total_focus_minutes,
    )
}

/// Forwards stdin lines from a plain thread so a pending read never holds
/// up runtime shutdown.
fn stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stdin read failed");
                    break;
                }
            }
        }
    });
    rx
}

/// Applies input lines to the timer until quit, end of input or `shutdown`.
async fn drive<F>(timer: &PomodoroService, lines: &mut mpsc::Receiver<String>, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    loop {
        let line = tokio::select! {
            line = lines.recv() => line,
            () = &mut shutdown => None,
        };
        let Some(line) = line else {
            break;
        };
        match Input::parse(&line) {
            Some(Input::Start) => {
                if !timer.start() {
                    println!("timer is already running");
                }
            }
            Some(Input::Pause) => {
                timer.pause();
            }
            Some(Input::Reset) => timer.reset(),
            Some(Input::Next) => {
                timer.skip_to_next();
            }
            Some(Input::Mode(mode)) => timer.set_mode(mode),
            Some(Input::Quit) => break,
            Some(Input::Empty) => {}
            None => println!("{HELP}"),
        }
    }
}

pub async fn run(args: PomodoroArgs) -> Result<(), AppError> {
    let local = LocalStore::open(&args.data_dir)?;
    let timer = PomodoroService::new(local, Arc::new(LogNotifier));
    if args.overrides != TimerSettingsPatch::default() {
        let settings = timer.update_settings(args.overrides)?;
        tracing::info!(?settings, "pomodoro settings updated");
    }

    let mut updates = timer.subscribe();
    println!("{}", status_line(&updates.borrow_and_update()));
    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let line = status_line(&updates.borrow_and_update());
            println!("{line}");
        }
    });

    println!("{HELP}");
    let mut lines = stdin_lines();
    drive(&timer, &mut lines, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await;

    drop(timer);
    let _ = printer.await;
    Ok(())
}
