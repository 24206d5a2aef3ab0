//! Market session gating.
//!
//! Trades may only be created or settled while the exchange session is
//! open: weekdays inside a fixed window in the exchange timezone.
//! chrono-tz handles DST transitions.

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;

/// Exchange timezone for the trading session.
pub const EXCHANGE_TZ: Tz = chrono_tz::America::New_York;

/// Fixed-window trading calendar in the exchange timezone.
#[derive(Debug, Clone, Copy)]
pub struct MarketCalendar {
    /// Session open, minutes after local midnight.
    open_minute: u32,
    /// Session close, minutes after local midnight (exclusive, up to 1440).
    close_minute: u32,
    /// Whether Saturday and Sunday are closed.
    weekdays_only: bool,
}

impl Default for MarketCalendar {
    fn default() -> Self {
        // Regular US equity options session: 09:30-16:00 ET.
        Self {
            open_minute: 9 * 60 + 30,
            close_minute: 16 * 60,
            weekdays_only: true,
        }
    }
}

impl MarketCalendar {
    /// Creates a calendar with the given session window.
    pub fn new(open_minute: u32, close_minute: u32, weekdays_only: bool) -> Self {
        Self {
            open_minute,
            close_minute,
            weekdays_only,
        }
    }

    fn is_trading_day(&self, weekday: Weekday) -> bool {
        !self.weekdays_only || !matches!(weekday, Weekday::Sat | Weekday::Sun)
    }

    /// Whether the market is open at the given instant.
    pub fn is_open(&self, at: DateTime<Utc>) -> bool {
        let local = at.with_timezone(&EXCHANGE_TZ);
        if !self.is_trading_day(local.weekday()) {
            return false;
        }
        let minute = local.hour() * 60 + local.minute();
        minute >= self.open_minute && minute < self.close_minute
    }

    /// Session bounds (as UTC instants) for the local day containing `at`.
    /// Returns `None` on non-trading days.
    pub fn session_bounds(&self, at: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let local = at.with_timezone(&EXCHANGE_TZ);
        if !self.is_trading_day(local.weekday()) {
            return None;
        }

        let date = local.date_naive();
        let open = date.and_hms_opt(self.open_minute / 60, self.open_minute % 60, 0)?;
        // A close of 1440 means local midnight of the next day.
        let close = if self.close_minute >= 1440 {
            (date + Duration::days(1)).and_hms_opt(0, 0, 0)?
        } else {
            date.and_hms_opt(self.close_minute / 60, self.close_minute % 60, 0)?
        };

        let open_utc = EXCHANGE_TZ
            .from_local_datetime(&open)
            .earliest()?
            .with_timezone(&Utc);
        let close_utc = EXCHANGE_TZ
            .from_local_datetime(&close)
            .earliest()?
            .with_timezone(&Utc);

        Some((open_utc, close_utc))
    }

    /// Exchange timezone name for API responses.
    pub fn timezone_name(&self) -> &'static str {
        EXCHANGE_TZ.name()
    }
}
