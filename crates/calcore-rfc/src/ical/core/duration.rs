//! Wire-format DURATION value (RFC 5545 §3.3.6): `[+/-]P[nW]` or
//! `[+/-]P[nD][T[nH][nM][nS]]`.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Duration {
    pub negative: bool,
    pub weeks: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl Duration {
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Total signed seconds, treating a week as exactly 7 civil days.
    /// Not safe to apply directly across a DST boundary; see
    /// [`crate::model::Span`] for the distinction between wall-days and
    /// clock-seconds.
    #[must_use]
    pub fn total_seconds(&self) -> i64 {
        let unsigned = i64::from(self.weeks) * 604_800
            + i64::from(self.days) * 86_400
            + i64::from(self.hours) * 3600
            + i64::from(self.minutes) * 60
            + i64::from(self.seconds);
        if self.negative { -unsigned } else { unsigned }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        write!(f, "P")?;
        if self.weeks > 0 {
            return write!(f, "{}W", self.weeks);
        }
        if self.days > 0 {
            write!(f, "{}D", self.days)?;
        }
        if self.hours > 0 || self.minutes > 0 || self.seconds > 0 {
            write!(f, "T")?;
            if self.hours > 0 {
                write!(f, "{}H", self.hours)?;
            }
            if self.minutes > 0 {
                write!(f, "{}M", self.minutes)?;
            }
            if self.seconds > 0 {
                write!(f, "{}S", self.seconds)?;
            }
        } else if self.days == 0 && self.weeks == 0 {
            write!(f, "T0S")?;
        }
        Ok(())
    }
}
