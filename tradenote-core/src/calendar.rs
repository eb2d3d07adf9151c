//! Calendar helpers: user date input, terminal clock shift, weekday labels.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DATETIME_FORMATS: [&str; 2] = ["%Y/%m/%dT%H:%M:%S", "%Y/%m/%dt%H:%M:%S"];
const DATE_FORMAT: &str = "%Y/%m/%d";

/// Parse a date typed at the prompt.
///
/// Accepts `2024/1/14T14:30:00`, the same with a lowercase `t`, or a bare
/// `2024/1/14` (midnight). Returns `None` for anything else.
pub fn parse_user_datetime(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if input.contains(['T', 't']) {
        return DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok());
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Offset between the user's wall clock and the terminal clock deals are
/// stamped with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalClock {
    shift: Duration,
}

impl TerminalClock {
    pub fn new(shift: Duration) -> Self {
        Self { shift }
    }

    pub fn from_hours(hours: i64) -> Self {
        Self::new(Duration::hours(hours))
    }

    /// Wall-clock time to terminal time.
    pub fn to_terminal(&self, wall: NaiveDateTime) -> NaiveDateTime {
        wall + self.shift
    }

    /// Terminal time back to wall-clock time.
    pub fn to_wall(&self, terminal: NaiveDateTime) -> NaiveDateTime {
        terminal - self.shift
    }
}

impl Default for TerminalClock {
    fn default() -> Self {
        Self::new(Duration::zero())
    }
}

/// Language of the weekday column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeekdayLocale {
    #[default]
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "en")]
    English,
}

impl WeekdayLocale {
    pub fn label(self, weekday: Weekday) -> &'static str {
        match self {
            WeekdayLocale::Japanese => match weekday {
                Weekday::Mon => "月",
                Weekday::Tue => "火",
                Weekday::Wed => "水",
                Weekday::Thu => "木",
                Weekday::Fri => "金",
                Weekday::Sat => "土",
                Weekday::Sun => "日",
            },
            WeekdayLocale::English => match weekday {
                Weekday::Mon => "Mon",
                Weekday::Tue => "Tue",
                Weekday::Wed => "Wed",
                Weekday::Thu => "Thu",
                Weekday::Fri => "Fri",
                Weekday::Sat => "Sat",
                Weekday::Sun => "Sun",
            },
        }
    }
}

/// How terminal timestamps become the ledger's date and weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Localization {
    pub clock: TerminalClock,
    pub weekdays: WeekdayLocale,
}

impl Localization {
    /// Trade date and weekday label for a terminal timestamp.
    pub fn date_of(&self, terminal: NaiveDateTime) -> (NaiveDate, &'static str) {
        let date = self.clock.to_wall(terminal).date();
        (date, self.weekdays.label(date.weekday()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("from ({from}) is later than to ({to})")]
    Inverted { from: NaiveDateTime, to: NaiveDateTime },
}

/// Inclusive time range for a history query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(from: NaiveDateTime, to: NaiveDateTime) -> Result<Self, WindowError> {
        if from > to {
            return Err(WindowError::Inverted { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.from <= at && at <= self.to
    }

    /// The same window expressed on the terminal clock.
    pub fn to_terminal(&self, clock: &TerminalClock) -> TimeWindow {
        TimeWindow {
            from: clock.to_terminal(self.from),
            to: clock.to_terminal(self.to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn parses_datetime_with_either_separator() {
        assert_eq!(
            parse_user_datetime("2024/1/14T14:30:00"),
            Some(at(2024, 1, 14, 14, 30, 0))
        );
        assert_eq!(
            parse_user_datetime("2024/01/14t22:20:05"),
            Some(at(2024, 1, 14, 22, 20, 5))
        );
    }

    #[test]
    fn bare_date_is_midnight() {
        assert_eq!(parse_user_datetime(" 2024/1/14 "), Some(at(2024, 1, 14, 0, 0, 0)));
    }

    #[test]
    fn rejects_other_formats() {
        assert_eq!(parse_user_datetime("2024-01-14"), None);
        assert_eq!(parse_user_datetime("2024/13/01"), None);
        assert_eq!(parse_user_datetime("2024/1/14T25:00:00"), None);
        assert_eq!(parse_user_datetime("2024/1/14 14:30:00"), None);
        assert_eq!(parse_user_datetime(""), None);
    }

    #[test]
    fn clock_shift_round_trips() {
        let clock = TerminalClock::from_hours(9);
        let wall = at(2024, 1, 14, 23, 0, 0);
        assert_eq!(clock.to_terminal(wall), at(2024, 1, 15, 8, 0, 0));
        assert_eq!(clock.to_wall(clock.to_terminal(wall)), wall);
    }

    #[test]
    fn weekday_labels() {
        assert_eq!(WeekdayLocale::Japanese.label(Weekday::Mon), "月");
        assert_eq!(WeekdayLocale::Japanese.label(Weekday::Sun), "日");
        assert_eq!(WeekdayLocale::English.label(Weekday::Fri), "Fri");
    }

    #[test]
    fn date_of_applies_shift_before_taking_the_date() {
        let loc = Localization {
            clock: TerminalClock::from_hours(9),
            weekdays: WeekdayLocale::English,
        };
        // 2024-01-15 05:00 on the terminal is still Sunday the 14th on the wall clock.
        let (date, label) = loc.date_of(at(2024, 1, 15, 5, 0, 0));
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 14).unwrap());
        assert_eq!(label, "Sun");
    }

    #[test]
    fn window_rejects_inverted_range() {
        let err = TimeWindow::new(at(2024, 1, 15, 0, 0, 0), at(2024, 1, 14, 0, 0, 0)).unwrap_err();
        assert!(matches!(err, WindowError::Inverted { .. }));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let window = TimeWindow::new(at(2024, 1, 14, 0, 0, 0), at(2024, 1, 14, 12, 0, 0)).unwrap();
        assert!(window.contains(at(2024, 1, 14, 0, 0, 0)));
        assert!(window.contains(at(2024, 1, 14, 12, 0, 0)));
        assert!(!window.contains(at(2024, 1, 14, 12, 0, 1)));
    }
}
