use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use serde::Serialize;

/// A simple clock abstraction for deterministic time in services and tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Calendar date of `now()` in UTC, the day key used by records.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

//
// ─── DATE RANGES ───────────────────────────────────────────────────────────────
//

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Sunday through Saturday of the week containing `day`.
    #[must_use]
    pub fn week_of(day: NaiveDate) -> Self {
        let offset = i64::from(day.weekday().num_days_from_sunday());
        let start = day - Duration::days(offset);
        Self {
            start,
            end: start + Duration::days(6),
        }
    }

    /// First through last day of the month containing `day`.
    #[must_use]
    pub fn month_of(day: NaiveDate) -> Self {
        let start = day.with_day(1).unwrap_or(day);
        let next_month = if start.month() == 12 {
            NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
        };
        let end = next_month.map_or(day, |d| d - Duration::days(1));
        Self { start, end }
    }

    /// Every day in the range, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

//
// ─── FORMATTING ────────────────────────────────────────────────────────────────
//

/// Formats a minute total as `2h 5m`, `2h` or `45m`.
#[must_use]
pub fn format_hours_minutes(total_minutes: u32) -> String {
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    match (hours, minutes) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

/// Minutes between two wall-clock times, wrapping past midnight.
#[must_use]
pub fn duration_minutes(start: NaiveTime, end: NaiveTime) -> u32 {
    let start = start.hour() * 60 + start.minute();
    let end = end.hour() * 60 + end.minute();
    if end >= start {
        end - start
    } else {
        end + 24 * 60 - start
    }
}

/// Human duration between two wall-clock times, e.g. `1h 30m`.
#[must_use]
pub fn calculate_duration(start: NaiveTime, end: NaiveTime) -> String {
    format_hours_minutes(duration_minutes(start, end))
}

/// 12-hour display form of a time, e.g. `2:30 PM`.
#[must_use]
pub fn format_display_time(time: NaiveTime) -> String {
    let (pm, hour) = time.hour12();
    let period = if pm { "PM" } else { "AM" };
    format!("{hour}:{:02} {period}", time.minute())
}

/// Whole days from `today` until `due`, never negative.
#[must_use]
pub fn days_left(due: NaiveDate, today: NaiveDate) -> u32 {
    u32::try_from((due - today).num_days().max(0)).unwrap_or(u32::MAX)
}

/// `Today`, `Tomorrow`, or a short month/day such as `Mar 5`.
#[must_use]
pub fn format_due_date(due: NaiveDate, today: NaiveDate) -> String {
    if due == today {
        "Today".to_string()
    } else if Some(due) == today.succ_opt() {
        "Tomorrow".to_string()
    } else {
        due.format("%b %-d").to_string()
    }
}

/// Serde adapter for `HH:MM` wall-clock times.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(D::Error::custom)
    }

    /// Accepts `14:30` as well as `14:30:00`.
    ///
    /// # Errors
    ///
    /// Returns the chrono parse error when neither form matches.
    pub fn parse(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(raw.trim(), FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S"))
    }

    /// Optional variant for patch payloads.
    pub mod option {
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer, Serializer, de::Error};

        pub fn serialize<S: Serializer>(
            time: &Option<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(t) => super::serialize(t, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| super::parse(&raw).map_err(D::Error::custom))
                .transpose()
        }
    }
}
