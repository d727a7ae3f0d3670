//! Exchange time zone: a standard UTC offset plus optional US daylight saving.
//!
//! US rule: daylight time starts the second Sunday of March at 02:00 local
//! standard time and ends the first Sunday of November at 02:00 local
//! daylight time, shifting the offset by one hour in between.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Utc, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeZone {
    standard: FixedOffset,
    us_daylight_saving: bool,
}

impl ExchangeZone {
    pub fn new(standard: FixedOffset, us_daylight_saving: bool) -> Self {
        Self {
            standard,
            us_daylight_saving,
        }
    }

    /// A zone that never changes offset.
    pub fn fixed(offset: FixedOffset) -> Self {
        Self::new(offset, false)
    }

    pub fn standard(&self) -> FixedOffset {
        self.standard
    }

    /// Offset in effect at instant `t`.
    pub fn offset_at(&self, t: DateTime<Utc>) -> FixedOffset {
        if !self.us_daylight_saving {
            return self.standard;
        }
        let year = t.with_timezone(&self.standard).year();
        match self.dst_window_utc(year) {
            Some((start, end)) if t >= start && t < end => self.daylight(),
            _ => self.standard,
        }
    }

    /// Offset in effect during the trading day on local `date`.
    pub fn offset_on(&self, date: NaiveDate) -> FixedOffset {
        if !self.us_daylight_saving {
            return self.standard;
        }
        match dst_dates(date.year()) {
            Some((start, end)) if date >= start && date < end => self.daylight(),
            _ => self.standard,
        }
    }

    /// Local wall-clock time of `t`.
    pub fn local(&self, t: DateTime<Utc>) -> DateTime<FixedOffset> {
        t.with_timezone(&self.offset_at(t))
    }

    fn daylight(&self) -> FixedOffset {
        FixedOffset::east_opt(self.standard.local_minus_utc() + 3600).unwrap_or(self.standard)
    }

    fn dst_window_utc(&self, year: i32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let (start, end) = dst_dates(year)?;
        let two_am = NaiveTime::from_hms_opt(2, 0, 0)?;
        let std_secs = i64::from(self.standard.local_minus_utc());
        let start_utc = (start.and_time(two_am) - Duration::seconds(std_secs)).and_utc();
        let end_utc = (end.and_time(two_am) - Duration::seconds(std_secs + 3600)).and_utc();
        Some((start_utc, end_utc))
    }
}

/// Local dates daylight time starts and ends in `year`.
fn dst_dates(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_weekday_of_month_opt(year, 3, Weekday::Sun, 2)?;
    let end = NaiveDate::from_weekday_of_month_opt(year, 11, Weekday::Sun, 1)?;
    Some((start, end))
}
