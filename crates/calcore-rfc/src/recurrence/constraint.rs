//! Compiled recurrence constraints (§4.D.2): the cross-product of a
//! rule's BY-lists, plus the start-instant fall-through defaults
//! (invariant I3).

use chrono::Weekday;

use crate::ical::core::{RRule, WeekdayNum};
use crate::model::Date;

/// One fully-resolved combination of BY-list values. A rule compiles to
/// a `Vec<Constraint>`; an instant matches the rule if it matches *any*
/// one of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Constraint {
    pub month: Option<u8>,
    pub monthday: Option<i8>,
    pub yearday: Option<i16>,
    pub weekno: Option<i8>,
    pub weekday: Option<Weekday>,
    pub weekday_nth: Option<i8>,
    pub hour: Option<u8>,
    pub minute: Option<u8>,
    pub second: Option<u8>,
}

impl Constraint {
    /// Whether `date` (at time-of-day `hour:minute:second`) satisfies
    /// this constraint. Time fields are matched separately by callers
    /// that already know the candidate time-of-day.
    #[must_use]
    pub fn matches_date(&self, date: Date) -> bool {
        if let Some(m) = self.month
            && u32::from(m) != date.month()
        {
            return false;
        }
        if let Some(md) = self.monthday && !monthday_matches(md, date) {
            return false;
        }
        if let Some(yd) = self.yearday && !yearday_matches(yd, date) {
            return false;
        }
        if let Some(wn) = self.weekno && !weekno_matches(wn, date) {
            return false;
        }
        if let Some(wd) = self.weekday {
            if date.weekday() != wd {
                return false;
            }
            if let Some(nth) = self.weekday_nth && !nth_weekday_matches(nth, date) {
                return false;
            }
        }
        true
    }

    #[must_use]
    pub fn matches_time(&self, hour: u8, minute: u8, second: u8) -> bool {
        self.hour.is_none_or(|h| h == hour)
            && self.minute.is_none_or(|m| m == minute)
            && self.second.is_none_or(|s| s == second)
    }
}

fn monthday_matches(md: i8, date: Date) -> bool {
    let days = date.days_in_month() as i32;
    let target = if md < 0 { days + i32::from(md) + 1 } else { i32::from(md) };
    target == date.day() as i32
}

fn yearday_matches(yd: i16, date: Date) -> bool {
    let days_in_year = if date.is_leap_year() { 366 } else { 365 };
    let target = if yd < 0 { days_in_year + i32::from(yd) + 1 } else { i32::from(yd) };
    target == date.ordinal() as i32
}

fn weekno_matches(wn: i8, date: Date) -> bool {
    let weeks_in_year = iso_weeks_in_year(date.year());
    let target = if wn < 0 { weeks_in_year + i32::from(wn) + 1 } else { i32::from(wn) };
    target == date.iso_week() as i32
}

fn iso_weeks_in_year(year: i32) -> i32 {
    let p = |y: i32| (y + y / 4 - y / 100 + y / 400) % 7;
    if p(year) == 4 || p(year - 1) == 3 { 53 } else { 52 }
}

/// True if `date` is the `nth` occurrence of its weekday within its
/// enclosing period (month, for monthly/yearly-with-month rules; year
/// otherwise). This is resolved by the caller supplying the correct
/// period bounds; here we assume month-scoped counting, which covers
/// the common BYDAY ordinal cases (`BYDAY=2MO`, `BYDAY=-1FR`).
fn nth_weekday_matches(nth: i8, date: Date) -> bool {
    let first_of_month = date.first_of_month();
    let days_in_month = date.days_in_month();
    let last_of_month = first_of_month.add_days(i64::from(days_in_month) - 1);

    if nth > 0 {
        let mut count = 0;
        let mut d = first_of_month;
        loop {
            if d.weekday() == date.weekday() {
                count += 1;
                if count == nth {
                    return d == date;
                }
            }
            if d == last_of_month {
                return false;
            }
            d = d.add_days(1);
        }
    } else {
        let mut count = 0;
        let mut d = last_of_month;
        loop {
            if d.weekday() == date.weekday() {
                count -= 1;
                if count == i32::from(nth) {
                    return d == date;
                }
            }
            if d == first_of_month {
                return false;
            }
            d = d.add_days(-1);
        }
    }
}

/// Compiles the cross-product of `rrule`'s BY-lists into `Constraint`s,
/// applying the start-instant fall-through defaults (I3).
#[must_use]
pub fn compile(rrule: &RRule, start_date: Date, start_hour: u8, start_minute: u8, start_second: u8) -> Vec<Constraint> {
    let mut constraints = vec![Constraint::default()];

    cross(&mut constraints, &rrule.by_month, |c, v| c.month = Some(v));
    cross(&mut constraints, &rrule.by_monthday, |c, v| c.monthday = Some(v));
    cross(&mut constraints, &rrule.by_yearday, |c, v| c.yearday = Some(v));
    cross(&mut constraints, &rrule.by_weekno, |c, v| c.weekno = Some(v));
    cross_weekday(&mut constraints, &rrule.by_day);
    cross(&mut constraints, &rrule.by_hour, |c, v| c.hour = Some(v));
    cross(&mut constraints, &rrule.by_minute, |c, v| c.minute = Some(v));
    cross(&mut constraints, &rrule.by_second, |c, v| c.second = Some(v));

    for c in &mut constraints {
        apply_fallthrough(c, rrule, start_date, start_hour, start_minute, start_second);
    }

    constraints.retain(is_consistent);
    constraints
}

fn cross<T: Copy>(constraints: &mut Vec<Constraint>, values: &[T], set: impl Fn(&mut Constraint, T)) {
    if values.is_empty() {
        return;
    }
    let base = std::mem::take(constraints);
    let mut out = Vec::with_capacity(base.len() * values.len());
    for c in &base {
        for &v in values {
            let mut nc = *c;
            set(&mut nc, v);
            out.push(nc);
        }
    }
    *constraints = out;
}

fn cross_weekday(constraints: &mut Vec<Constraint>, by_day: &[WeekdayNum]) {
    if by_day.is_empty() {
        return;
    }
    let base = std::mem::take(constraints);
    let mut out = Vec::with_capacity(base.len() * by_day.len());
    for c in &base {
        for wdn in by_day {
            let mut nc = *c;
            nc.weekday = Some(wdn.weekday.to_chrono());
            nc.weekday_nth = wdn.ordinal;
            out.push(nc);
        }
    }
    *constraints = out;
}

fn apply_fallthrough(
    c: &mut Constraint,
    rrule: &RRule,
    start_date: Date,
    start_hour: u8,
    start_minute: u8,
    start_second: u8,
) {
    use crate::ical::core::Frequency;

    if c.hour.is_none() && rrule.by_hour.is_empty() {
        c.hour = Some(start_hour);
    }
    if c.minute.is_none() && rrule.by_minute.is_empty() {
        c.minute = Some(start_minute);
    }
    if c.second.is_none() && rrule.by_second.is_empty() {
        c.second = Some(start_second);
    }

    match rrule.freq {
        Some(Frequency::Yearly) => {
            if c.month.is_none() && rrule.by_month.is_empty() && rrule.by_weekno.is_empty() && rrule.by_yearday.is_empty() {
                c.month = Some(start_date.month() as u8);
            }
            if c.monthday.is_none() && c.weekday.is_none() && rrule.by_yearday.is_empty() && rrule.by_weekno.is_empty() {
                c.monthday = Some(start_date.day() as i8);
            }
        }
        Some(Frequency::Monthly) => {
            if c.monthday.is_none() && c.weekday.is_none() {
                c.monthday = Some(start_date.day() as i8);
            }
        }
        Some(Frequency::Weekly) => {
            if c.weekday.is_none() {
                c.weekday = Some(start_date.weekday());
            }
        }
        _ => {}
    }
}

fn is_consistent(c: &Constraint) -> bool {
    if let (Some(month), Some(monthday)) = (c.month, c.monthday) {
        let days = crate::model::date::days_in_month(2000, u32::from(month)).max(
            crate::model::date::days_in_month(2001, u32::from(month)),
        );
        if i32::from(monthday.unsigned_abs()) > days as i32 {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ical::core::RRule;

    #[test]
    fn weekly_fallthrough_defaults_weekday_to_start() {
        let rrule = RRule::weekly();
        let start = Date::from_ymd(2026, 1, 5).unwrap(); // a Monday
        let constraints = compile(&rrule, start, 9, 0, 0);
        assert_eq!(constraints.len(), 1);
        assert_eq!(constraints[0].weekday, Some(chrono::Weekday::Mon));
    }

    #[test]
    fn monthly_byday_nth_cross_product() {
        let rrule = RRule::monthly().with_by_day(vec![
            crate::ical::core::WeekdayNum::nth(-1, crate::ical::core::Weekday::Friday),
        ]);
        let start = Date::from_ymd(2026, 1, 1).unwrap();
        let constraints = compile(&rrule, start, 9, 0, 0);
        assert_eq!(constraints.len(), 1);
        assert_eq!(constraints[0].weekday_nth, Some(-1));
    }

    #[test]
    fn last_friday_of_month_matches_correct_date() {
        // January 2026: last Friday is Jan 30.
        let c = Constraint { weekday: Some(chrono::Weekday::Fri), weekday_nth: Some(-1), ..Default::default() };
        assert!(c.matches_date(Date::from_ymd(2026, 1, 30).unwrap()));
        assert!(!c.matches_date(Date::from_ymd(2026, 1, 23).unwrap()));
    }

    #[test]
    fn second_monday_of_month_matches_correct_date() {
        // January 2026: Mondays are 5, 12, 19, 26 -> second is Jan 12.
        let c = Constraint { weekday: Some(chrono::Weekday::Mon), weekday_nth: Some(2), ..Default::default() };
        assert!(c.matches_date(Date::from_ymd(2026, 1, 12).unwrap()));
        assert!(!c.matches_date(Date::from_ymd(2026, 1, 5).unwrap()));
        assert!(!c.matches_date(Date::from_ymd(2026, 1, 19).unwrap()));
    }

    #[test]
    fn inconsistent_monthday_for_month_is_dropped() {
        let rrule = RRule::monthly().with_by_month(vec![2]).with_count(1);
        let mut r = rrule.clone();
        r.by_monthday = vec![30];
        let start = Date::from_ymd(2026, 2, 1).unwrap();
        let constraints = compile(&r, start, 0, 0, 0);
        assert!(constraints.is_empty());
    }
}
