use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use crate::errors::CoreError;
use crate::models::settings::MarketHours;

/// How far ahead `next_open_after` searches before giving up.
const NEXT_OPEN_SEARCH_DAYS: i64 = 14;

/// Anything that can answer "is the market open right now?".
///
/// The refresh workflow depends on this seam rather than on the wall clock, so
/// tests can pin the answer.
pub trait MarketStatus: Send + Sync {
    fn is_market_open(&self) -> bool;
}

/// Trading-session clock for a single exchange.
///
/// Pure: the answer depends only on the instant asked about and the configured
/// session (timezone, weekdays, open/close times, holidays).
#[derive(Debug, Clone)]
pub struct MarketClock {
    tz: Tz,
    open: NaiveTime,
    close: NaiveTime,
    trading_days: Vec<Weekday>,
    holidays: Vec<NaiveDate>,
}

impl MarketClock {
    pub fn new(hours: &MarketHours) -> Result<Self, CoreError> {
        let tz: Tz = hours.timezone.parse().map_err(|e| {
            CoreError::Config(format!("unknown timezone '{}': {e}", hours.timezone))
        })?;
        let open = parse_hhmm(&hours.open)?;
        let close = parse_hhmm(&hours.close)?;
        if open >= close {
            return Err(CoreError::Config(format!(
                "market open ({}) must be before close ({})",
                hours.open, hours.close
            )));
        }
        if hours.trading_days.is_empty() {
            return Err(CoreError::Config(
                "at least one trading day is required".into(),
            ));
        }

        Ok(Self {
            tz,
            open,
            close,
            trading_days: hours.trading_days.clone(),
            holidays: hours.holidays.clone(),
        })
    }

    /// NSE hours (Mon–Fri 09:15–15:30 Asia/Kolkata).
    pub fn nse() -> Self {
        Self {
            tz: chrono_tz::Asia::Kolkata,
            open: NaiveTime::from_hms_opt(9, 15, 0).unwrap_or(NaiveTime::MIN),
            close: NaiveTime::from_hms_opt(15, 30, 0).unwrap_or(NaiveTime::MIN),
            trading_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            holidays: Vec::new(),
        }
    }

    /// Is the market open at `instant`? Open time inclusive, close time exclusive.
    #[must_use]
    pub fn is_open_at(&self, instant: DateTime<Utc>) -> bool {
        let local = instant.with_timezone(&self.tz);
        let date = local.date_naive();
        if !self.is_trading_day(date) {
            return false;
        }
        let time = local.time();
        time >= self.open && time < self.close
    }

    /// The next session open strictly after `instant`, if one falls within two weeks.
    #[must_use]
    pub fn next_open_after(&self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let start = instant.with_timezone(&self.tz).date_naive();
        (0..=NEXT_OPEN_SEARCH_DAYS)
            .filter_map(|offset| start.checked_add_signed(Duration::days(offset)))
            .filter(|date| self.is_trading_day(*date))
            .filter_map(|date| {
                self.tz
                    .from_local_datetime(&date.and_time(self.open))
                    .earliest()
                    .map(|dt| dt.with_timezone(&Utc))
            })
            .find(|open| *open > instant)
    }

    fn is_trading_day(&self, date: NaiveDate) -> bool {
        self.trading_days.contains(&date.weekday()) && !self.holidays.contains(&date)
    }
}

impl Default for MarketClock {
    fn default() -> Self {
        Self::nse()
    }
}

impl MarketStatus for MarketClock {
    fn is_market_open(&self) -> bool {
        self.is_open_at(Utc::now())
    }
}

fn parse_hhmm(text: &str) -> Result<NaiveTime, CoreError> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M")
        .map_err(|e| CoreError::Config(format!("invalid time '{text}' (expected HH:MM): {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    // IST is UTC+05:30, so 09:15 IST = 03:45 UTC and 15:30 IST = 10:00 UTC.

    #[test]
    fn open_during_weekday_session() {
        let clock = MarketClock::nse();
        // Monday 2025-01-13, 12:00 IST
        assert!(clock.is_open_at(utc(2025, 1, 13, 6, 30)));
    }

    #[test]
    fn open_is_inclusive_close_is_exclusive() {
        let clock = MarketClock::nse();
        assert!(!clock.is_open_at(utc(2025, 1, 13, 3, 44)));
        assert!(clock.is_open_at(utc(2025, 1, 13, 3, 45)));
        assert!(clock.is_open_at(utc(2025, 1, 13, 9, 59)));
        assert!(!clock.is_open_at(utc(2025, 1, 13, 10, 0)));
    }

    #[test]
    fn closed_on_weekends() {
        let clock = MarketClock::nse();
        // Saturday 2025-01-11 and Sunday 2025-01-12, midday IST
        assert!(!clock.is_open_at(utc(2025, 1, 11, 6, 30)));
        assert!(!clock.is_open_at(utc(2025, 1, 12, 6, 30)));
    }

    #[test]
    fn weekday_is_taken_in_exchange_timezone() {
        let clock = MarketClock::nse();
        // Sunday 23:00 UTC is Monday 04:30 IST: still before the open.
        assert!(!clock.is_open_at(utc(2025, 1, 12, 23, 0)));
    }

    #[test]
    fn closed_on_configured_holiday() {
        let hours = MarketHours {
            holidays: vec![NaiveDate::from_ymd_opt(2025, 1, 13).unwrap()],
            ..MarketHours::default()
        };
        let clock = MarketClock::new(&hours).unwrap();
        assert!(!clock.is_open_at(utc(2025, 1, 13, 6, 30)));
        assert!(clock.is_open_at(utc(2025, 1, 14, 6, 30)));
    }

    #[test]
    fn deterministic_for_same_instant() {
        let clock = MarketClock::nse();
        let t = utc(2025, 1, 15, 5, 0);
        assert_eq!(clock.is_open_at(t), clock.is_open_at(t));
    }

    #[test]
    fn next_open_skips_weekend() {
        let clock = MarketClock::nse();
        // Friday 2025-01-10 after close -> Monday 2025-01-13 09:15 IST
        let next = clock.next_open_after(utc(2025, 1, 10, 11, 0)).unwrap();
        assert_eq!(next, utc(2025, 1, 13, 3, 45));
    }

    #[test]
    fn next_open_same_day_before_open() {
        let clock = MarketClock::nse();
        let next = clock.next_open_after(utc(2025, 1, 13, 1, 0)).unwrap();
        assert_eq!(next, utc(2025, 1, 13, 3, 45));
    }

    #[test]
    fn rejects_bad_configuration() {
        let bad_tz = MarketHours {
            timezone: "Mars/Olympus".into(),
            ..MarketHours::default()
        };
        assert!(matches!(MarketClock::new(&bad_tz), Err(CoreError::Config(_))));

        let inverted = MarketHours {
            open: "16:00".into(),
            close: "09:00".into(),
            ..MarketHours::default()
        };
        assert!(matches!(MarketClock::new(&inverted), Err(CoreError::Config(_))));

        let bad_time = MarketHours {
            open: "9am".into(),
            ..MarketHours::default()
        };
        assert!(MarketClock::new(&bad_time).is_err());
    }

    #[test]
    fn default_hours_match_nse() {
        let from_settings = MarketClock::new(&MarketHours::default()).unwrap();
        let t = utc(2025, 1, 13, 3, 45);
        assert_eq!(from_settings.is_open_at(t), MarketClock::nse().is_open_at(t));
    }
}
