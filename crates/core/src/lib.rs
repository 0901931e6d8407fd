#![forbid(unsafe_code)]

pub mod model;
pub mod notification;
pub mod pomodoro;
pub mod stats;
pub mod time;

pub use notification::{Notification, NotificationVariant};
pub use time::Clock;
