//! Compiled recurrence rule (§4.D): the runtime evaluator built from a
//! wire [`RRule`] plus a start instant.

use std::cell::RefCell;

use chrono::Weekday;

use super::constraint::{self, Constraint};
use crate::ical::core::{Frequency, RRule, RRuleUntil};
use crate::model::{Date, Instant, TimeSpec, ZoneResolver};

/// Hard ceiling on interval-advance steps per query (§4.D.4), bounding
/// pathological BY-combinations.
const MAX_INTERVAL_ADVANCES: u32 = 10_000;

#[derive(Debug, Clone, Default, PartialEq)]
struct RuleCache {
    occurrences: Vec<Instant>,
    complete: bool,
    built: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub freq: Frequency,
    pub interval: u32,
    pub start: Instant,
    pub until: Option<Instant>,
    pub count: Option<u32>,
    pub wkst: Weekday,
    constraints: Vec<Constraint>,
    by_setpos: Vec<i16>,
    interval_seconds: Option<i64>,
    max_interval_advances: u32,
    cache: RefCell<RuleCache>,
}

impl Rule {
    /// Compiles `rrule` against `start`, applying the start-instant
    /// fall-through defaults and computing the sub-daily fast-path
    /// shortcut when applicable.
    #[must_use]
    pub fn compile(rrule: &RRule, start: Instant, max_interval_advances: u32) -> Self {
        let freq = rrule.freq.unwrap_or(Frequency::Daily);
        let interval = rrule.interval_or_default();
        let wkst = rrule.wkst_or_default().to_chrono();

        let constraints = constraint::compile(rrule, start.date, start.time.hour, start.time.minute, start.time.second);

        let no_by_lists = rrule.by_second.is_empty()
            && rrule.by_minute.is_empty()
            && rrule.by_hour.is_empty()
            && rrule.by_day.is_empty()
            && rrule.by_monthday.is_empty()
            && rrule.by_yearday.is_empty()
            && rrule.by_weekno.is_empty()
            && rrule.by_month.is_empty()
            && rrule.by_setpos.is_empty();

        let interval_seconds = if no_by_lists {
            match freq {
                Frequency::Secondly => Some(i64::from(interval)),
                Frequency::Minutely => Some(i64::from(interval) * 60),
                Frequency::Hourly => Some(i64::from(interval) * 3600),
                _ => None,
            }
        } else {
            None
        };

        let until = rrule.until.as_ref().map(|u| match u {
            RRuleUntil::Date(d) => Instant::date_only(d.to_model(), start.spec.clone()),
            RRuleUntil::DateTime(dt) => dt.to_instant(),
        });

        Self {
            freq,
            interval,
            start,
            until,
            count: rrule.count,
            wkst,
            constraints,
            by_setpos: rrule.by_setpos.clone(),
            interval_seconds,
            max_interval_advances,
            cache: RefCell::new(RuleCache::default()),
        }
    }

    #[must_use]
    pub fn is_sub_daily_fast_path(&self) -> bool {
        self.interval_seconds.is_some()
    }

    /// An instant satisfies some compiled constraint, ignoring interval
    /// phase and UNTIL/COUNT termination.
    #[must_use]
    pub fn matches_rules(&self, instant: &Instant) -> bool {
        self.constraints.iter().any(|c| {
            c.matches_date(instant.date) && c.matches_time(instant.time.hour, instant.time.minute, instant.time.second)
        })
    }

    /// Whether an occurrence matches `instant` exactly, respecting
    /// interval phase.
    #[must_use]
    pub fn recurs_at(&self, instant: &Instant, resolver: &dyn ZoneResolver) -> bool {
        if let Some(interval_secs) = self.interval_seconds {
            let start_utc = self.start.to_utc_seconds(resolver);
            let i_utc = instant.to_utc_seconds(resolver);
            return i_utc >= start_utc && (i_utc - start_utc).rem_euclid(interval_secs) == 0 && !self.past_until(instant, resolver);
        }
        if !self.matches_rules(instant) {
            return false;
        }
        self.on_interval_phase(instant.date) && !self.past_until(instant, resolver)
    }

    /// Any occurrence intersects civil day `date`.
    #[must_use]
    pub fn recurs_on(&self, date: Date, resolver: &dyn ZoneResolver) -> bool {
        !self.recur_times_on(date, resolver).is_empty()
    }

    /// Sorted times-of-day (as instants on `date`) that recur.
    #[must_use]
    pub fn recur_times_on(&self, date: Date, resolver: &dyn ZoneResolver) -> Vec<Instant> {
        if !self.on_interval_phase(date) {
            return Vec::new();
        }
        let candidates: Vec<Instant> = self
            .constraints
            .iter()
            .filter(|c| c.matches_date(date))
            .map(|c| {
                Instant::new(
                    date,
                    crate::model::Time::new(c.hour.unwrap_or(0), c.minute.unwrap_or(0), c.second.unwrap_or(0))
                        .unwrap_or(crate::model::Time::MIDNIGHT),
                    self.start.spec.clone(),
                )
            })
            .filter(|i| !self.past_until(i, resolver) && self.on_or_after_start(i, resolver))
            .collect();
        dedup_sorted(candidates, resolver)
    }

    fn on_or_after_start(&self, instant: &Instant, resolver: &dyn ZoneResolver) -> bool {
        instant.to_utc_seconds(resolver) >= self.start.to_utc_seconds(resolver)
    }

    fn past_until(&self, instant: &Instant, resolver: &dyn ZoneResolver) -> bool {
        match &self.until {
            Some(u) => instant.to_utc_seconds(resolver) > u.to_utc_seconds(resolver),
            None => false,
        }
    }

    /// Whether `date`'s containing period is on an active interval
    /// multiple relative to `start` (INTERVAL stepping).
    fn on_interval_phase(&self, date: Date) -> bool {
        if self.interval <= 1 {
            return true;
        }
        let periods = self.periods_between(self.period_anchor(self.start.date), self.period_anchor(date));
        periods.rem_euclid(i64::from(self.interval)) == 0
    }

    fn period_anchor(&self, date: Date) -> Date {
        match self.freq {
            Frequency::Weekly => {
                let delta = weekday_distance(self.wkst, date.weekday());
                date.add_days(-i64::from(delta))
            }
            Frequency::Monthly | Frequency::Yearly => date.first_of_month(),
            _ => date,
        }
    }

    fn periods_between(&self, from: Date, to: Date) -> i64 {
        match self.freq {
            Frequency::Secondly | Frequency::Minutely | Frequency::Hourly | Frequency::Daily => {
                (to.naive() - from.naive()).num_days()
            }
            Frequency::Weekly => (to.naive() - from.naive()).num_days() / 7,
            Frequency::Monthly => i64::from(to.year() - from.year()) * 12 + i64::from(to.month() as i32 - from.month() as i32),
            Frequency::Yearly => i64::from(to.year() - from.year()),
        }
    }

    /// Advances `date`'s period by one interval step, in the rule's
    /// native period unit.
    fn step_period(&self, anchor: Date) -> Date {
        match self.freq {
            Frequency::Secondly | Frequency::Minutely | Frequency::Hourly | Frequency::Daily => {
                anchor.add_days(i64::from(self.interval))
            }
            Frequency::Weekly => anchor.add_days(i64::from(self.interval) * 7),
            Frequency::Monthly => anchor.add_months(self.interval as i32),
            Frequency::Yearly => anchor.add_years(self.interval as i32),
        }
    }

    fn period_dates(&self, anchor: Date) -> Vec<Date> {
        match self.freq {
            Frequency::Secondly | Frequency::Minutely | Frequency::Hourly | Frequency::Daily => vec![anchor],
            Frequency::Weekly => (0..7).map(|n| anchor.add_days(n)).collect(),
            Frequency::Monthly => {
                let days = anchor.days_in_month();
                (0..days).map(|n| anchor.add_days(i64::from(n))).collect()
            }
            Frequency::Yearly => {
                let start_of_year = anchor.first_of_year();
                let days = if anchor.is_leap_year() { 366 } else { 365 };
                (0..days).map(|n| start_of_year.add_days(i64::from(n))).collect()
            }
        }
    }

    /// All occurrence instants within the period anchored at `anchor`,
    /// post-filtered by BYSETPOS.
    fn occurrences_in_period(&self, anchor: Date, resolver: &dyn ZoneResolver) -> Vec<Instant> {
        let mut candidates = Vec::new();
        for date in self.period_dates(anchor) {
            for c in &self.constraints {
                if !c.matches_date(date) {
                    continue;
                }
                let time = crate::model::Time::new(c.hour.unwrap_or(0), c.minute.unwrap_or(0), c.second.unwrap_or(0))
                    .unwrap_or(crate::model::Time::MIDNIGHT);
                candidates.push(Instant::new(date, time, self.start.spec.clone()));
            }
        }
        let mut candidates = dedup_sorted(candidates, resolver);

        if !self.by_setpos.is_empty() {
            let n = candidates.len() as i64;
            let mut selected = Vec::new();
            for &pos in &self.by_setpos {
                let idx = if pos > 0 { i64::from(pos) - 1 } else { n + i64::from(pos) };
                if idx >= 0 && idx < n {
                    selected.push(candidates[idx as usize].clone());
                }
            }
            candidates = dedup_sorted(selected, resolver);
        }

        candidates
            .into_iter()
            .filter(|i| !self.past_until(i, resolver) && self.on_or_after_start(i, resolver))
            .collect()
    }

    /// First occurrence strictly after `instant`, respecting both UNTIL
    /// and COUNT.
    #[must_use]
    pub fn next_after(&self, instant: &Instant, resolver: &dyn ZoneResolver) -> Option<Instant> {
        if let Some(count) = self.count {
            self.ensure_cache(count, resolver);
            let cache = self.cache.borrow();
            return cache
                .occurrences
                .iter()
                .find(|o| o.to_utc_seconds(resolver) > instant.to_utc_seconds(resolver))
                .cloned();
        }
        self.next_after_unbounded(instant, resolver)
    }

    /// First occurrence strictly after `instant`, respecting only UNTIL.
    /// Used internally to build the COUNT cache, which must not recurse
    /// back through `next_after`.
    fn next_after_unbounded(&self, instant: &Instant, resolver: &dyn ZoneResolver) -> Option<Instant> {
        if let Some(interval_secs) = self.interval_seconds {
            let start_utc = self.start.to_utc_seconds(resolver);
            let i_utc = instant.to_utc_seconds(resolver);
            if i_utc < start_utc {
                return if self.past_until(&self.start, resolver) { None } else { Some(self.start.clone()) };
            }
            let k = (i_utc - start_utc).div_euclid(interval_secs) + 1;
            let candidate = self.start.add_secs(k * interval_secs, resolver);
            return if self.past_until(&candidate, resolver) { None } else { Some(candidate) };
        }

        let mut anchor = self.period_anchor(instant.date.max(self.start.date));
        for _ in 0..self.max_interval_advances {
            let found = self
                .occurrences_in_period(anchor, resolver)
                .into_iter()
                .find(|o| o.to_utc_seconds(resolver) > instant.to_utc_seconds(resolver));
            if let Some(o) = found {
                return Some(o);
            }
            anchor = self.step_period(anchor);
            if let Some(until) = &self.until
                && anchor.naive() > until.date.naive()
            {
                return None;
            }
        }
        None
    }

    /// Last occurrence strictly before `instant`.
    #[must_use]
    pub fn previous_before(&self, instant: &Instant, resolver: &dyn ZoneResolver) -> Option<Instant> {
        if let Some(interval_secs) = self.interval_seconds {
            let start_utc = self.start.to_utc_seconds(resolver);
            let i_utc = instant.to_utc_seconds(resolver);
            if i_utc <= start_utc {
                return None;
            }
            let k = (i_utc - start_utc - 1).div_euclid(interval_secs);
            return Some(self.start.add_secs(k * interval_secs, resolver));
        }

        let mut anchor = self.period_anchor(instant.date);
        for _ in 0..self.max_interval_advances {
            let found = self
                .occurrences_in_period(anchor, resolver)
                .into_iter()
                .filter(|o| o.to_utc_seconds(resolver) < instant.to_utc_seconds(resolver))
                .next_back();
            if let Some(o) = found {
                return Some(o);
            }
            if anchor.naive() <= self.start.date.naive() {
                return None;
            }
            anchor = match self.freq {
                Frequency::Secondly | Frequency::Minutely | Frequency::Hourly | Frequency::Daily => {
                    anchor.add_days(-i64::from(self.interval))
                }
                Frequency::Weekly => anchor.add_days(-i64::from(self.interval) * 7),
                Frequency::Monthly => anchor.add_months(-(self.interval as i32)),
                Frequency::Yearly => anchor.add_years(-(self.interval as i32)),
            };
        }
        None
    }

    /// Sorted occurrence instants in `[start_utc, end_utc]` (§4.D.1). If
    /// the rule is open-ended and the scan does not terminate within the
    /// interval, an incomplete marker (`Instant` equal to `end`) is
    /// appended to signal truncation.
    #[must_use]
    pub fn times_in_interval(&self, start: &Instant, end: &Instant, resolver: &dyn ZoneResolver) -> Vec<Instant> {
        let mut out = Vec::new();
        let cursor = if self.start.to_utc_seconds(resolver) >= start.to_utc_seconds(resolver) {
            Some(self.start.clone())
        } else {
            self.next_after(start, resolver)
        };

        let Some(first) = cursor else { return out };
        if first.to_utc_seconds(resolver) > end.to_utc_seconds(resolver) {
            return out;
        }
        out.push(first.clone());
        let mut cursor = Some(first);

        let mut advances = 0u32;
        while let Some(current) = cursor {
            advances += 1;
            if advances > self.max_interval_advances {
                out.push(end.clone());
                break;
            }
            match self.next_after(&current, resolver) {
                Some(next) if next.to_utc_seconds(resolver) <= end.to_utc_seconds(resolver) => {
                    out.push(next.clone());
                    cursor = Some(next);
                }
                _ => break,
            }
        }
        out
    }

    /// Count of occurrences at or before `instant`, 1-indexed from the
    /// start instant.
    #[must_use]
    pub fn duration_to(&self, instant: &Instant, resolver: &dyn ZoneResolver) -> u32 {
        if let Some(interval_secs) = self.interval_seconds {
            let start_utc = self.start.to_utc_seconds(resolver);
            let i_utc = instant.to_utc_seconds(resolver);
            if i_utc < start_utc {
                return 0;
            }
            return ((i_utc - start_utc) / interval_secs) as u32 + 1;
        }
        let mut count = 0;
        let mut cursor = self.start.clone();
        if cursor.to_utc_seconds(resolver) <= instant.to_utc_seconds(resolver) {
            count += 1;
        }
        let mut advances = 0u32;
        while let Some(next) = self.next_after_unbounded(&cursor, resolver) {
            if next.to_utc_seconds(resolver) > instant.to_utc_seconds(resolver) {
                break;
            }
            count += 1;
            if self.count.is_some_and(|limit| count >= limit) {
                break;
            }
            cursor = next;
            advances += 1;
            if advances > self.max_interval_advances {
                break;
            }
        }
        count
    }

    /// Last occurrence, or `None` if the rule is unbounded or its cache
    /// is incomplete.
    #[must_use]
    pub fn end_dt(&self, resolver: &dyn ZoneResolver) -> Option<Instant> {
        if let Some(until) = &self.until {
            return self.previous_before(&until.add_secs(1, resolver), resolver);
        }
        if let Some(count) = self.count {
            self.ensure_cache(count, resolver);
            let cache = self.cache.borrow();
            if cache.complete {
                return cache.occurrences.last().cloned();
            }
        }
        None
    }

    fn ensure_cache(&self, count: u32, resolver: &dyn ZoneResolver) {
        let mut cache = self.cache.borrow_mut();
        if cache.built {
            return;
        }
        let mut occurrences = Vec::with_capacity(count as usize);
        if self.recurs_at(&self.start, resolver) || self.matches_rules(&self.start) {
            occurrences.push(self.start.clone());
        }
        let mut cursor = self.start.clone();
        let mut advances = 0u32;
        let mut complete = true;
        while (occurrences.len() as u32) < count {
            let Some(next) = self.next_after_unbounded(&cursor, resolver) else { break };
            occurrences.push(next.clone());
            cursor = next;
            advances += 1;
            if advances > self.max_interval_advances {
                complete = false;
                break;
            }
        }
        if (occurrences.len() as u32) < count {
            complete = false;
        }
        cache.occurrences = occurrences;
        cache.complete = complete;
        cache.built = true;
    }

    /// Re-tags `start`/`until` with `new_spec`, keeping their wall-clock
    /// representation invariant (§4.D.6). Invalidates the count cache.
    #[must_use]
    pub fn shift_times(&self, new_spec: TimeSpec) -> Self {
        Self {
            freq: self.freq,
            interval: self.interval,
            start: self.start.set_time_spec(new_spec.clone()),
            until: self.until.as_ref().map(|u| u.set_time_spec(new_spec.clone())),
            count: self.count,
            wkst: self.wkst,
            constraints: self.constraints.clone(),
            by_setpos: self.by_setpos.clone(),
            interval_seconds: self.interval_seconds,
            max_interval_advances: self.max_interval_advances,
            cache: RefCell::new(RuleCache::default()),
        }
    }
}

fn weekday_distance(wkst: Weekday, from: Weekday) -> i32 {
    (from.num_days_from_monday() as i32 - wkst.num_days_from_monday() as i32).rem_euclid(7)
}

fn dedup_sorted(mut instants: Vec<Instant>, resolver: &dyn ZoneResolver) -> Vec<Instant> {
    instants.sort_by(|a, b| a.compare(b, resolver));
    instants.dedup_by(|a, b| a.compare(b, resolver) == std::cmp::Ordering::Equal);
    instants
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Time, TrivialResolver};

    fn start(y: i32, m: u32, d: u32, h: u8, mi: u8, s: u8) -> Instant {
        Instant::new(Date::from_ymd(y, m, d).unwrap(), Time::new(h, mi, s).unwrap(), TimeSpec::Utc)
    }

    #[test]
    fn s1_daily_with_count() {
        let rrule = RRule::daily().with_count(3);
        let rule = Rule::compile(&rrule, start(2006, 1, 1, 12, 0, 0), MAX_INTERVAL_ADVANCES);
        let end = start(2006, 1, 5, 0, 0, 0);
        let occurrences = rule.times_in_interval(&rule.start.clone(), &end, &TrivialResolver);
        assert_eq!(occurrences.len(), 3);
        assert_eq!(occurrences[0].date, Date::from_ymd(2006, 1, 1).unwrap());
        assert_eq!(occurrences[2].date, Date::from_ymd(2006, 1, 3).unwrap());
        assert_eq!(rule.end_dt(&TrivialResolver), Some(start(2006, 1, 3, 12, 0, 0)));
        assert_eq!(rule.duration_to(&end, &TrivialResolver), 3);
    }

    #[test]
    fn weekly_byday_generates_three_weekdays() {
        let rrule = RRule::weekly().with_by_day(vec![
            crate::ical::core::WeekdayNum::every(crate::ical::core::Weekday::Monday),
            crate::ical::core::WeekdayNum::every(crate::ical::core::Weekday::Wednesday),
            crate::ical::core::WeekdayNum::every(crate::ical::core::Weekday::Friday),
        ]);
        let rule = Rule::compile(&rrule, start(2026, 1, 5, 9, 0, 0), MAX_INTERVAL_ADVANCES); // Monday
        let times = rule.recur_times_on(Date::from_ymd(2026, 1, 5).unwrap(), &TrivialResolver);
        assert_eq!(times.len(), 1);
        assert!(rule.recurs_on(Date::from_ymd(2026, 1, 7).unwrap(), &TrivialResolver)); // Wednesday
        assert!(!rule.recurs_on(Date::from_ymd(2026, 1, 6).unwrap(), &TrivialResolver)); // Tuesday
    }

    #[test]
    fn monthly_last_friday_next_after() {
        let rrule = RRule::monthly().with_by_day(vec![crate::ical::core::WeekdayNum::nth(
            -1,
            crate::ical::core::Weekday::Friday,
        )]);
        let rule = Rule::compile(&rrule, start(2026, 1, 1, 9, 0, 0), MAX_INTERVAL_ADVANCES);
        let next = rule.next_after(&start(2026, 1, 1, 9, 0, 0), &TrivialResolver).unwrap();
        assert_eq!(next.date, Date::from_ymd(2026, 1, 30).unwrap());
        let next2 = rule.next_after(&next, &TrivialResolver).unwrap();
        assert_eq!(next2.date, Date::from_ymd(2026, 2, 27).unwrap());
    }

    #[test]
    fn sub_daily_fast_path_hourly() {
        let rrule = RRule { freq: Some(Frequency::Hourly), interval: Some(2), ..RRule::new() };
        let rule = Rule::compile(&rrule, start(2026, 1, 1, 0, 0, 0), MAX_INTERVAL_ADVANCES);
        assert!(rule.is_sub_daily_fast_path());
        let next = rule.next_after(&start(2026, 1, 1, 0, 0, 0), &TrivialResolver).unwrap();
        assert_eq!(next.time.hour, 2);
        assert_eq!(rule.duration_to(&start(2026, 1, 1, 5, 0, 0), &TrivialResolver), 3);
    }

    #[test]
    fn previous_before_is_strict() {
        let rrule = RRule::daily();
        let rule = Rule::compile(&rrule, start(2026, 1, 1, 9, 0, 0), MAX_INTERVAL_ADVANCES);
        let prev = rule.previous_before(&start(2026, 1, 3, 9, 0, 0), &TrivialResolver).unwrap();
        assert_eq!(prev.date, Date::from_ymd(2026, 1, 2).unwrap());
    }
}
