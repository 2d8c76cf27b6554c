//! Wire representation of a RECUR value (RFC 5545 §3.3.10): the RRULE
//! and EXRULE property payload.
//!
//! This is a pure data carrier, not an evaluator — [`crate::recurrence`]
//! compiles an `RRule` plus a start instant into the runtime `Rule` that
//! actually enumerates occurrences.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Secondly => "SECONDLY",
            Self::Minutely => "MINUTELY",
            Self::Hourly => "HOURLY",
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SECONDLY" => Some(Self::Secondly),
            "MINUTELY" => Some(Self::Minutely),
            "HOURLY" => Some(Self::Hourly),
            "DAILY" => Some(Self::Daily),
            "WEEKLY" => Some(Self::Weekly),
            "MONTHLY" => Some(Self::Monthly),
            "YEARLY" => Some(Self::Yearly),
            _ => None,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sunday => "SU",
            Self::Monday => "MO",
            Self::Tuesday => "TU",
            Self::Wednesday => "WE",
            Self::Thursday => "TH",
            Self::Friday => "FR",
            Self::Saturday => "SA",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SU" => Some(Self::Sunday),
            "MO" => Some(Self::Monday),
            "TU" => Some(Self::Tuesday),
            "WE" => Some(Self::Wednesday),
            "TH" => Some(Self::Thursday),
            "FR" => Some(Self::Friday),
            "SA" => Some(Self::Saturday),
            _ => None,
        }
    }

    #[must_use]
    pub fn all() -> [Self; 7] {
        [
            Self::Sunday,
            Self::Monday,
            Self::Tuesday,
            Self::Wednesday,
            Self::Thursday,
            Self::Friday,
            Self::Saturday,
        ]
    }

    #[must_use]
    pub fn from_chrono(w: chrono::Weekday) -> Self {
        match w {
            chrono::Weekday::Sun => Self::Sunday,
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
        }
    }

    #[must_use]
    pub fn to_chrono(self) -> chrono::Weekday {
        match self {
            Self::Sunday => chrono::Weekday::Sun,
            Self::Monday => chrono::Weekday::Mon,
            Self::Tuesday => chrono::Weekday::Tue,
            Self::Wednesday => chrono::Weekday::Wed,
            Self::Thursday => chrono::Weekday::Thu,
            Self::Friday => chrono::Weekday::Fri,
            Self::Saturday => chrono::Weekday::Sat,
        }
    }

    /// ISO weekday number, Monday=1..Sunday=7, as used for `weekStart`.
    #[must_use]
    pub fn iso_number(self) -> u8 {
        self.to_chrono().number_from_monday() as u8
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A weekday with an optional ordinal (`BYDAY=2MO`, `BYDAY=-1FR`, `BYDAY=MO`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekdayNum {
    pub ordinal: Option<i8>,
    pub weekday: Weekday,
}

impl WeekdayNum {
    #[must_use]
    pub fn every(weekday: Weekday) -> Self {
        Self { ordinal: None, weekday }
    }

    #[must_use]
    pub fn nth(ordinal: i8, weekday: Weekday) -> Self {
        Self { ordinal: Some(ordinal), weekday }
    }
}

impl fmt::Display for WeekdayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.ordinal {
            write!(f, "{n}{}", self.weekday)
        } else {
            write!(f, "{}", self.weekday)
        }
    }
}

use crate::ical::core::datetime::{Date, DateTime};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RRuleUntil {
    Date(Date),
    DateTime(DateTime),
}

impl fmt::Display for RRuleUntil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{d}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
        }
    }
}

/// The RECUR value itself: a RRULE or EXRULE property payload.
///
/// Every field is optional at the wire level; defaults and fall-through
/// semantics (invariant I3) are applied at compilation time, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RRule {
    pub freq: Option<Frequency>,
    pub interval: Option<u32>,
    pub until: Option<RRuleUntil>,
    pub count: Option<u32>,
    pub wkst: Option<Weekday>,
    pub by_second: Vec<u8>,
    pub by_minute: Vec<u8>,
    pub by_hour: Vec<u8>,
    pub by_day: Vec<WeekdayNum>,
    pub by_monthday: Vec<i8>,
    pub by_yearday: Vec<i16>,
    pub by_weekno: Vec<i8>,
    pub by_month: Vec<u8>,
    pub by_setpos: Vec<i16>,
}

impl RRule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn daily() -> Self {
        Self { freq: Some(Frequency::Daily), ..Self::default() }
    }

    #[must_use]
    pub fn weekly() -> Self {
        Self { freq: Some(Frequency::Weekly), ..Self::default() }
    }

    #[must_use]
    pub fn monthly() -> Self {
        Self { freq: Some(Frequency::Monthly), ..Self::default() }
    }

    #[must_use]
    pub fn yearly() -> Self {
        Self { freq: Some(Frequency::Yearly), ..Self::default() }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = Some(interval);
        self
    }

    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    #[must_use]
    pub fn with_until_date(mut self, date: Date) -> Self {
        self.until = Some(RRuleUntil::Date(date));
        self
    }

    #[must_use]
    pub fn with_until_datetime(mut self, dt: DateTime) -> Self {
        self.until = Some(RRuleUntil::DateTime(dt));
        self
    }

    #[must_use]
    pub fn with_by_day(mut self, by_day: Vec<WeekdayNum>) -> Self {
        self.by_day = by_day;
        self
    }

    #[must_use]
    pub fn with_by_month(mut self, by_month: Vec<u8>) -> Self {
        self.by_month = by_month;
        self
    }

    #[must_use]
    pub fn with_wkst(mut self, wkst: Weekday) -> Self {
        self.wkst = Some(wkst);
        self
    }

    /// The effective interval, defaulting to 1 when unset.
    #[must_use]
    pub fn interval_or_default(&self) -> u32 {
        self.interval.unwrap_or(1)
    }

    /// The effective week-start, defaulting to Monday.
    #[must_use]
    pub fn wkst_or_default(&self) -> Weekday {
        self.wkst.unwrap_or(Weekday::Monday)
    }
}

fn fmt_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, name: &str, items: &[T]) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    write!(f, ";{name}=")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for RRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(freq) = self.freq {
            write!(f, "FREQ={freq}")?;
        }
        if let Some(interval) = self.interval {
            write!(f, ";INTERVAL={interval}")?;
        }
        if let Some(until) = &self.until {
            write!(f, ";UNTIL={until}")?;
        }
        if let Some(count) = self.count {
            write!(f, ";COUNT={count}")?;
        }
        if let Some(wkst) = self.wkst {
            write!(f, ";WKST={wkst}")?;
        }
        fmt_list(f, "BYSECOND", &self.by_second)?;
        fmt_list(f, "BYMINUTE", &self.by_minute)?;
        fmt_list(f, "BYHOUR", &self.by_hour)?;
        fmt_list(f, "BYDAY", &self.by_day)?;
        fmt_list(f, "BYMONTHDAY", &self.by_monthday)?;
        fmt_list(f, "BYYEARDAY", &self.by_yearday)?;
        fmt_list(f, "BYWEEKNO", &self.by_weekno)?;
        fmt_list(f, "BYMONTH", &self.by_month)?;
        fmt_list(f, "BYSETPOS", &self.by_setpos)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rrule_display_basic() {
        let r = RRule::daily().with_count(10);
        assert_eq!(r.to_string(), "FREQ=DAILY;COUNT=10");
    }

    #[test]
    fn rrule_display_weekly_byday() {
        let r = RRule::weekly().with_by_day(vec![
            WeekdayNum::every(Weekday::Monday),
            WeekdayNum::every(Weekday::Wednesday),
            WeekdayNum::every(Weekday::Friday),
        ]);
        assert_eq!(r.to_string(), "FREQ=WEEKLY;BYDAY=MO,WE,FR");
    }

    #[test]
    fn rrule_display_monthly_nth() {
        let r = RRule::monthly().with_by_day(vec![WeekdayNum::nth(-1, Weekday::Friday)]);
        assert_eq!(r.to_string(), "FREQ=MONTHLY;BYDAY=-1FR");
    }

    #[test]
    fn rrule_display_with_interval() {
        let r = RRule::yearly().with_interval(2).with_by_month(vec![3]);
        assert_eq!(r.to_string(), "FREQ=YEARLY;INTERVAL=2;BYMONTH=3");
    }

    #[test]
    fn weekday_parse() {
        assert_eq!(Weekday::parse("mo"), Some(Weekday::Monday));
        assert_eq!(Weekday::parse("XX"), None);
    }

    #[test]
    fn frequency_parse() {
        assert_eq!(Frequency::parse("weekly"), Some(Frequency::Weekly));
        assert_eq!(Frequency::parse("bogus"), None);
    }
}
