//! Civil (zone-less) date, backed by `chrono::NaiveDate`.

use chrono::{Datelike, Duration as ChronoDuration, NaiveDate, Weekday as ChronoWeekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(NaiveDate);

impl Date {
    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    #[must_use]
    pub fn from_naive(d: NaiveDate) -> Self {
        Self(d)
    }

    #[must_use]
    pub fn naive(self) -> NaiveDate {
        self.0
    }

    #[must_use]
    pub fn year(self) -> i32 {
        self.0.year()
    }

    #[must_use]
    pub fn month(self) -> u32 {
        self.0.month()
    }

    #[must_use]
    pub fn day(self) -> u32 {
        self.0.day()
    }

    #[must_use]
    pub fn weekday(self) -> ChronoWeekday {
        self.0.weekday()
    }

    /// ISO week number (1..=53).
    #[must_use]
    pub fn iso_week(self) -> u32 {
        self.0.iso_week().week()
    }

    /// 1-based ordinal day within the civil year.
    #[must_use]
    pub fn ordinal(self) -> u32 {
        self.0.ordinal()
    }

    #[must_use]
    pub fn days_in_month(self) -> u32 {
        days_in_month(self.year(), self.month())
    }

    #[must_use]
    pub fn is_leap_year(self) -> bool {
        NaiveDate::from_ymd_opt(self.year(), 2, 29).is_some()
    }

    #[must_use]
    pub fn add_days(self, n: i64) -> Self {
        Self(self.0 + ChronoDuration::days(n))
    }

    /// Adds whole months, clamping the day into the resulting month
    /// (e.g. Jan 31 + 1 month = Feb 28/29, never Mar 3).
    #[must_use]
    pub fn add_months(self, n: i32) -> Self {
        let total = self.year() * 12 + (self.month() as i32 - 1) + n;
        let year = total.div_euclid(12);
        let month = (total.rem_euclid(12) + 1) as u32;
        let day = self.day().min(days_in_month(year, month));
        Self(NaiveDate::from_ymd_opt(year, month, day).expect("clamped day is always valid"))
    }

    #[must_use]
    pub fn add_years(self, n: i32) -> Self {
        self.add_months(n * 12)
    }

    #[must_use]
    pub fn first_of_month(self) -> Self {
        Self(NaiveDate::from_ymd_opt(self.year(), self.month(), 1).expect("day 1 always valid"))
    }

    #[must_use]
    pub fn first_of_year(self) -> Self {
        Self(NaiveDate::from_ymd_opt(self.year(), 1, 1).expect("Jan 1 always valid"))
    }
}

/// Number of days in `month` of `year`, accounting for leap years.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let next = NaiveDate::from_ymd_opt(ny, nm, 1).expect("valid calendar month boundary");
    let this = NaiveDate::from_ymd_opt(year, month, 1).expect("valid calendar month boundary");
    (next - this).num_days() as u32
}

impl std::fmt::Display for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}{:02}{:02}", self.year(), self.month(), self.day())
    }
}
