//! An instant: (civil date, civil time, time-spec, date-only?, second-occurrence?).

use super::date::Date;
use super::time::Time;
use super::timespec::TimeSpec;

/// Resolves a [`TimeSpec`] to/from UTC seconds.
///
/// Implemented by [`crate::timezone::ZoneCollection`] for `NamedZone`;
/// `Utc`, `FixedOffset` and `Floating` resolve without consulting any
/// table. Defined here (rather than in the timezone module) so that
/// `Instant` can depend on the trait without the model layer depending
/// on the timezone layer.
pub trait ZoneResolver {
    /// UTC offset in seconds in effect for `spec` at approximately the
    /// given civil local time. For `NamedZone`, ambiguous local times
    /// resolve using `second_occurrence` (false picks the earlier/larger
    /// offset, true the later/smaller one); gap times fall back to the
    /// offset of the phase following the gap.
    fn offset_seconds(&self, spec: &TimeSpec, date: Date, time: Time, second_occurrence: bool) -> i32;

    /// Civil (date, time, second-occurrence) for an absolute UTC instant
    /// observed under `spec`.
    fn to_local(&self, spec: &TimeSpec, utc_seconds: i64) -> (Date, Time, bool);
}

/// Epoch used for raw civil-seconds arithmetic: 1970-01-01, matching Unix time.
fn epoch() -> Date {
    Date::from_ymd(1970, 1, 1).expect("epoch date is valid")
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instant {
    pub date: Date,
    pub time: Time,
    pub spec: TimeSpec,
    pub date_only: bool,
    pub second_occurrence: bool,
}

impl Instant {
    #[must_use]
    pub fn new(date: Date, time: Time, spec: TimeSpec) -> Self {
        Self {
            date,
            time,
            spec,
            date_only: false,
            second_occurrence: false,
        }
    }

    #[must_use]
    pub fn date_only(date: Date, spec: TimeSpec) -> Self {
        Self {
            date,
            time: Time::MIDNIGHT,
            spec,
            date_only: true,
            second_occurrence: false,
        }
    }

    /// Raw civil seconds since the epoch, ignoring time-spec entirely.
    /// This is the "wall clock" value two floating observers agree on.
    #[must_use]
    pub fn civil_seconds(&self) -> i64 {
        let days = (self.date.naive() - epoch().naive()).num_days();
        days * 86_400 + i64::from(self.time.seconds_since_midnight())
    }

    fn from_civil_seconds(total: i64) -> (Date, Time) {
        let days = total.div_euclid(86_400);
        let secs_of_day = total.rem_euclid(86_400) as u32;
        (epoch().add_days(days), Time::from_seconds_since_midnight(secs_of_day))
    }

    /// Normalizes to UTC seconds per invariant I1. This is the basis for
    /// ordering: two instants are compared by `to_utc_seconds`, then by
    /// `second_occurrence` (false < true).
    #[must_use]
    pub fn to_utc_seconds(&self, resolver: &dyn ZoneResolver) -> i64 {
        let offset = resolver.offset_seconds(&self.spec, self.date, self.time, self.second_occurrence);
        self.civil_seconds() - i64::from(offset)
    }

    /// Orders `self` against `other` per invariant I1: UTC projection
    /// first, then `second_occurrence` (false < true).
    #[must_use]
    pub fn compare(&self, other: &Self, resolver: &dyn ZoneResolver) -> std::cmp::Ordering {
        self.to_utc_seconds(resolver)
            .cmp(&other.to_utc_seconds(resolver))
            .then(self.second_occurrence.cmp(&other.second_occurrence))
    }

    /// Re-tags with `new_spec`, keeping the UTC instant numerically
    /// identical (the local wall-clock representation may shift).
    #[must_use]
    pub fn to_time_spec(&self, new_spec: TimeSpec, resolver: &dyn ZoneResolver) -> Self {
        let utc = self.to_utc_seconds(resolver);
        let new_offset = match &new_spec {
            TimeSpec::Utc => 0,
            TimeSpec::FixedOffset(o) => *o,
            TimeSpec::Floating => 0,
            TimeSpec::NamedZone(_) => {
                let (date, time, _) = resolver.to_local(&new_spec, utc);
                return Self {
                    date,
                    time,
                    spec: new_spec,
                    date_only: self.date_only,
                    second_occurrence: false,
                };
            }
        };
        let (date, time) = Self::from_civil_seconds(utc + i64::from(new_offset));
        Self {
            date,
            time,
            spec: new_spec,
            date_only: self.date_only,
            second_occurrence: false,
        }
    }

    /// Keeps the wall-clock fields as-is and swaps the spec, possibly
    /// shifting the represented UTC moment.
    #[must_use]
    pub fn set_time_spec(&self, new_spec: TimeSpec) -> Self {
        Self {
            date: self.date,
            time: self.time,
            spec: new_spec,
            date_only: self.date_only,
            second_occurrence: false,
        }
    }

    /// Shifts the civil date only; the wall-clock time-of-day and spec
    /// are unchanged. Not the same as adding N×86400 seconds across a
    /// DST boundary.
    #[must_use]
    pub fn add_days(&self, n: i64) -> Self {
        Self {
            date: self.date.add_days(n),
            ..self.clone()
        }
    }

    /// Shifts the absolute (UTC) instant by `n` seconds and re-derives
    /// the civil representation under the same spec.
    #[must_use]
    pub fn add_secs(&self, n: i64, resolver: &dyn ZoneResolver) -> Self {
        let utc = self.to_utc_seconds(resolver) + n;
        match &self.spec {
            TimeSpec::Utc | TimeSpec::Floating => {
                let (date, time) = Self::from_civil_seconds(utc);
                Self { date, time, spec: self.spec.clone(), date_only: false, second_occurrence: false }
            }
            TimeSpec::FixedOffset(o) => {
                let (date, time) = Self::from_civil_seconds(utc + i64::from(*o));
                Self { date, time, spec: self.spec.clone(), date_only: false, second_occurrence: false }
            }
            TimeSpec::NamedZone(_) => {
                let (date, time, second_occurrence) = resolver.to_local(&self.spec, utc);
                Self { date, time, spec: self.spec.clone(), date_only: false, second_occurrence }
            }
        }
    }
}

/// A [`ZoneResolver`] for contexts with no named zones in play: resolves
/// `Utc`/`FixedOffset`/`Floating` directly and treats any `NamedZone` as
/// UTC (0 offset). Used by tests and by call sites that have already
/// established no VTIMEZONE is referenced.
pub struct TrivialResolver;

impl ZoneResolver for TrivialResolver {
    fn offset_seconds(&self, spec: &TimeSpec, _date: Date, _time: Time, _second_occurrence: bool) -> i32 {
        match spec {
            TimeSpec::Utc | TimeSpec::Floating | TimeSpec::NamedZone(_) => 0,
            TimeSpec::FixedOffset(o) => *o,
        }
    }

    fn to_local(&self, spec: &TimeSpec, utc_seconds: i64) -> (Date, Time, bool) {
        let offset = match spec {
            TimeSpec::FixedOffset(o) => *o,
            _ => 0,
        };
        let (date, time) = Instant::from_civil_seconds(utc_seconds + i64::from(offset));
        (date, time, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u8, mi: u8, s: u8, spec: TimeSpec) -> Instant {
        Instant::new(Date::from_ymd(y, m, d).unwrap(), Time::new(h, mi, s).unwrap(), spec)
    }

    #[test]
    fn utc_round_trips_through_civil_seconds() {
        let i = dt(2026, 1, 23, 12, 0, 0, TimeSpec::Utc);
        let secs = i.to_utc_seconds(&TrivialResolver);
        assert_eq!(secs, i.civil_seconds());
    }

    #[test]
    fn fixed_offset_subtracts_from_civil() {
        let i = dt(2026, 1, 23, 12, 0, 0, TimeSpec::FixedOffset(3600));
        let utc = dt(2026, 1, 23, 11, 0, 0, TimeSpec::Utc);
        assert_eq!(
            i.to_utc_seconds(&TrivialResolver),
            utc.to_utc_seconds(&TrivialResolver)
        );
    }

    #[test]
    fn add_days_does_not_touch_time_of_day() {
        let i = dt(2026, 1, 31, 9, 0, 0, TimeSpec::Utc);
        let shifted = i.add_days(1);
        assert_eq!(shifted.date, Date::from_ymd(2026, 2, 1).unwrap());
        assert_eq!(shifted.time, i.time);
    }

    #[test]
    fn add_secs_crosses_day_boundary() {
        let i = dt(2026, 1, 23, 23, 30, 0, TimeSpec::Utc);
        let shifted = i.add_secs(3600, &TrivialResolver);
        assert_eq!(shifted.date, Date::from_ymd(2026, 1, 24).unwrap());
        assert_eq!(shifted.time, Time::new(0, 30, 0).unwrap());
    }

    #[test]
    fn compare_orders_by_utc_then_second_occurrence() {
        let a = dt(2026, 1, 1, 0, 0, 0, TimeSpec::Utc);
        let mut b = a.clone();
        b.second_occurrence = true;
        assert_eq!(a.compare(&b, &TrivialResolver), std::cmp::Ordering::Less);
    }
}
