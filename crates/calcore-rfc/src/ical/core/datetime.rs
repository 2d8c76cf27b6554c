//! Wire-format DATE and DATE-TIME values (RFC 5545 §3.3.4/§3.3.5).
//!
//! These are flat, directly-parsed structures; `model::Instant` is the
//! richer zone-aware representation the recurrence and timezone engines
//! operate on. `to_instant`/`from_instant` bridge the two.

use std::fmt;

use crate::model;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl Date {
    #[must_use]
    pub fn to_model(self) -> model::Date {
        model::Date::from_ymd(i32::from(self.year), u32::from(self.month), u32::from(self.day))
            .expect("wire dates are range-checked at parse time")
    }

    #[must_use]
    pub fn from_model(d: model::Date) -> Self {
        Self {
            year: d.year() as u16,
            month: d.month() as u8,
            day: d.day() as u8,
        }
    }

    #[must_use]
    pub fn to_instant(self) -> model::Instant {
        model::Instant::date_only(self.to_model(), model::TimeSpec::Floating)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}{:02}", self.year, self.month, self.day)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub is_utc: bool,
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}{:02}", self.hour, self.minute, self.second)?;
        if self.is_utc {
            write!(f, "Z")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DateTimeForm {
    Utc,
    Zoned { tzid: String },
    Floating,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub form: DateTimeForm,
}

impl DateTime {
    #[must_use]
    pub fn is_utc(&self) -> bool {
        matches!(self.form, DateTimeForm::Utc)
    }

    #[must_use]
    pub fn is_floating(&self) -> bool {
        matches!(self.form, DateTimeForm::Floating)
    }

    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match &self.form {
            DateTimeForm::Zoned { tzid } => Some(tzid),
            _ => None,
        }
    }

    #[must_use]
    pub fn date(&self) -> Date {
        Date { year: self.year, month: self.month, day: self.day }
    }

    #[must_use]
    pub fn to_time_spec(&self) -> model::TimeSpec {
        match &self.form {
            DateTimeForm::Utc => model::TimeSpec::Utc,
            DateTimeForm::Zoned { tzid } => model::TimeSpec::NamedZone(tzid.clone()),
            DateTimeForm::Floating => model::TimeSpec::Floating,
        }
    }

    #[must_use]
    pub fn to_instant(&self) -> model::Instant {
        let date = model::Date::from_ymd(i32::from(self.year), u32::from(self.month), u32::from(self.day))
            .expect("wire date-times are range-checked at parse time");
        let time = model::Time::new(self.hour, self.minute, self.second.min(59))
            .expect("wire date-times are range-checked at parse time");
        model::Instant::new(date, time, self.to_time_spec())
    }

    #[must_use]
    pub fn from_instant(instant: &model::Instant) -> Self {
        let form = match &instant.spec {
            model::TimeSpec::Utc => DateTimeForm::Utc,
            model::TimeSpec::NamedZone(tzid) => DateTimeForm::Zoned { tzid: tzid.clone() },
            model::TimeSpec::Floating | model::TimeSpec::FixedOffset(_) => DateTimeForm::Floating,
        };
        Self {
            year: instant.date.year() as u16,
            month: instant.date.month() as u8,
            day: instant.date.day() as u8,
            hour: instant.time.hour,
            minute: instant.time.minute,
            second: instant.time.second,
            form,
        }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}{:02}{:02}T{:02}{:02}{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )?;
        if self.is_utc() {
            write!(f, "Z")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_datetime_roundtrips_through_instant() {
        let dt = DateTime {
            year: 2026,
            month: 1,
            day: 23,
            hour: 12,
            minute: 0,
            second: 0,
            form: DateTimeForm::Utc,
        };
        let instant = dt.to_instant();
        let back = DateTime::from_instant(&instant);
        assert_eq!(dt, back);
    }

    #[test]
    fn display_appends_z_for_utc() {
        let dt = DateTime { year: 2026, month: 1, day: 1, hour: 0, minute: 0, second: 0, form: DateTimeForm::Utc };
        assert_eq!(dt.to_string(), "20260101T000000Z");
    }
}
