//! Recurrence aggregator (§4.E): combines RRULEs, EXRULEs, RDATEs, and
//! EXDATEs into a single occurrence set.

use crate::model::{Instant, ZoneResolver};

use super::rule::Rule;

/// Hard ceiling on passes for the exclusion re-loop in `next_after`/
/// `previous_before` (§4.E).
const MAX_AGGREGATOR_PASSES: u32 = 1_000;

/// Owns a start instant plus the RRULEs/EXRULEs/RDATEs/EXDATEs layered
/// on top of it, and answers occurrence queries against the combined
/// set.
#[derive(Default)]
pub struct Aggregator {
    start: Option<Instant>,
    rrules: Vec<Rule>,
    exrules: Vec<Rule>,
    rdates: Vec<Instant>,
    exdates: Vec<Instant>,
    dirty_observers: Vec<Box<dyn Fn()>>,
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("start", &self.start)
            .field("rrules", &self.rrules)
            .field("exrules", &self.exrules)
            .field("rdates", &self.rdates)
            .field("exdates", &self.exdates)
            .finish_non_exhaustive()
    }
}

impl Clone for Aggregator {
    fn clone(&self) -> Self {
        Self {
            start: self.start.clone(),
            rrules: self.rrules.clone(),
            exrules: self.exrules.clone(),
            rdates: self.rdates.clone(),
            exdates: self.exdates.clone(),
            dirty_observers: Vec::new(),
        }
    }
}

impl PartialEq for Aggregator {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start
            && self.rrules == other.rrules
            && self.exrules == other.exrules
            && self.rdates == other.rdates
            && self.exdates == other.exdates
    }
}

impl Aggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this aggregator has any RRULE, RDATE, or EXRULE/EXDATE
    /// layered on top of its start instant — i.e. whether the owning
    /// incidence is recurring.
    #[must_use]
    pub fn has_rules(&self) -> bool {
        !self.rrules.is_empty() || !self.rdates.is_empty()
    }

    pub fn set_start(&mut self, start: Instant) {
        self.start = Some(start);
        self.set_dirty();
    }

    pub fn add_rrule(&mut self, rule: Rule) {
        self.rrules.push(rule);
        self.set_dirty();
    }

    pub fn add_exrule(&mut self, rule: Rule) {
        self.exrules.push(rule);
        self.set_dirty();
    }

    pub fn add_rdate(&mut self, instant: Instant) {
        self.rdates.push(instant);
        self.set_dirty();
    }

    pub fn add_exdate(&mut self, instant: Instant) {
        self.exdates.push(instant);
        self.set_dirty();
    }

    pub fn on_dirty(&mut self, observer: Box<dyn Fn()>) {
        self.dirty_observers.push(observer);
    }

    /// Clears any derived state and notifies observers. The cache lives
    /// on the individual `Rule`s, which have no cross-rule state to
    /// invalidate here; this exists as the hook point for callers (e.g.
    /// an owning incidence) that cache their own derived recurrence
    /// summaries.
    pub fn set_dirty(&mut self) {
        for observer in &self.dirty_observers {
            observer();
        }
    }

    fn is_rdate_or_rrule(&self, instant: &Instant, resolver: &dyn ZoneResolver) -> bool {
        if let Some(start) = &self.start
            && start.compare(instant, resolver) == std::cmp::Ordering::Equal
        {
            return true;
        }
        if self.rdates.iter().any(|d| d.compare(instant, resolver) == std::cmp::Ordering::Equal) {
            return true;
        }
        self.rrules.iter().any(|r| r.recurs_at(instant, resolver))
    }

    fn is_excluded(&self, instant: &Instant, resolver: &dyn ZoneResolver) -> bool {
        let exdate_match = self.exdates.iter().any(|d| {
            if d.date_only || instant.date_only {
                d.date == instant.date
            } else {
                d.compare(instant, resolver) == std::cmp::Ordering::Equal
            }
        });
        if exdate_match {
            return true;
        }
        self.exrules.iter().any(|r| {
            if r.start.date_only {
                r.recurs_on(instant.date, resolver)
            } else {
                r.recurs_at(instant, resolver)
            }
        })
    }

    /// Whether `instant` is an occurrence of this recurrence set.
    #[must_use]
    pub fn occurs(&self, instant: &Instant, resolver: &dyn ZoneResolver) -> bool {
        self.is_rdate_or_rrule(instant, resolver) && !self.is_excluded(instant, resolver)
    }

    /// First occurrence strictly after `instant`.
    #[must_use]
    pub fn next_after(&self, instant: &Instant, resolver: &dyn ZoneResolver) -> Option<Instant> {
        let mut after = instant.clone();
        for _ in 0..MAX_AGGREGATOR_PASSES {
            let candidate = self.next_candidate_after(&after, resolver)?;
            if self.is_excluded(&candidate, resolver) {
                after = candidate;
                continue;
            }
            return Some(candidate);
        }
        None
    }

    /// Last occurrence strictly before `instant`.
    #[must_use]
    pub fn previous_before(&self, instant: &Instant, resolver: &dyn ZoneResolver) -> Option<Instant> {
        let mut before = instant.clone();
        for _ in 0..MAX_AGGREGATOR_PASSES {
            let candidate = self.previous_candidate_before(&before, resolver)?;
            if self.is_excluded(&candidate, resolver) {
                before = candidate;
                continue;
            }
            return Some(candidate);
        }
        None
    }

    fn next_candidate_after(&self, instant: &Instant, resolver: &dyn ZoneResolver) -> Option<Instant> {
        let mut best: Option<Instant> = None;
        if let Some(start) = &self.start
            && start.compare(instant, resolver) == std::cmp::Ordering::Greater
        {
            best = Some(start.clone());
        }
        for d in &self.rdates {
            if d.compare(instant, resolver) == std::cmp::Ordering::Greater {
                best = Some(closer(best, d.clone(), resolver));
            }
        }
        for r in &self.rrules {
            if let Some(next) = r.next_after(instant, resolver) {
                best = Some(closer(best, next, resolver));
            }
        }
        best
    }

    fn previous_candidate_before(&self, instant: &Instant, resolver: &dyn ZoneResolver) -> Option<Instant> {
        let mut best: Option<Instant> = None;
        if let Some(start) = &self.start
            && start.compare(instant, resolver) == std::cmp::Ordering::Less
        {
            best = Some(start.clone());
        }
        for d in &self.rdates {
            if d.compare(instant, resolver) == std::cmp::Ordering::Less {
                best = Some(farther(best, d.clone(), resolver));
            }
        }
        for r in &self.rrules {
            if let Some(prev) = r.previous_before(instant, resolver) {
                best = Some(farther(best, prev, resolver));
            }
        }
        best
    }

    /// All occurrence instants on civil `date`.
    #[must_use]
    pub fn recur_times_on(&self, date: crate::model::Date, resolver: &dyn ZoneResolver) -> Vec<Instant> {
        let mut out = Vec::new();
        if let Some(start) = &self.start
            && start.date == date
        {
            out.push(start.clone());
        }
        out.extend(self.rdates.iter().filter(|d| d.date == date).cloned());
        for r in &self.rrules {
            out.extend(r.recur_times_on(date, resolver));
        }
        out.retain(|i| !self.is_excluded(i, resolver));
        dedup_sorted(out, resolver)
    }

    /// Sorted occurrence instants in `[start, end]`, unioning RDATEs and
    /// RRULEs and subtracting EXDATEs/EXRULEs.
    #[must_use]
    pub fn times_in_interval(&self, start: &Instant, end: &Instant, resolver: &dyn ZoneResolver) -> Vec<Instant> {
        let mut out = Vec::new();
        if let Some(s) = &self.start
            && s.to_utc_seconds(resolver) >= start.to_utc_seconds(resolver)
            && s.to_utc_seconds(resolver) <= end.to_utc_seconds(resolver)
        {
            out.push(s.clone());
        }
        out.extend(self.rdates.iter().filter(|d| {
            d.to_utc_seconds(resolver) >= start.to_utc_seconds(resolver) && d.to_utc_seconds(resolver) <= end.to_utc_seconds(resolver)
        }).cloned());
        for r in &self.rrules {
            out.extend(r.times_in_interval(start, end, resolver));
        }
        out.retain(|i| !self.is_excluded(i, resolver));
        dedup_sorted(out, resolver)
    }
}

fn closer(best: Option<Instant>, candidate: Instant, resolver: &dyn ZoneResolver) -> Instant {
    match best {
        Some(b) if b.compare(&candidate, resolver) != std::cmp::Ordering::Greater => b,
        _ => candidate,
    }
}

fn farther(best: Option<Instant>, candidate: Instant, resolver: &dyn ZoneResolver) -> Instant {
    match best {
        Some(b) if b.compare(&candidate, resolver) != std::cmp::Ordering::Less => b,
        _ => candidate,
    }
}

fn dedup_sorted(mut instants: Vec<Instant>, resolver: &dyn ZoneResolver) -> Vec<Instant> {
    instants.sort_by(|a, b| a.compare(b, resolver));
    instants.dedup_by(|a, b| a.compare(b, resolver) == std::cmp::Ordering::Equal);
    instants
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ical::core::RRule;
    use crate::model::{Date, Time, TimeSpec, TrivialResolver};

    fn dt(y: i32, m: u32, d: u32, h: u8, mi: u8, s: u8) -> Instant {
        Instant::new(Date::from_ymd(y, m, d).unwrap(), Time::new(h, mi, s).unwrap(), TimeSpec::Utc)
    }

    #[test]
    fn exdate_suppresses_single_occurrence() {
        let mut agg = Aggregator::new();
        let start = dt(2026, 1, 1, 9, 0, 0);
        agg.set_start(start.clone());
        agg.add_rrule(Rule::compile(&RRule::daily().with_count(5), start, 10_000));
        agg.add_exdate(dt(2026, 1, 3, 9, 0, 0));

        assert!(agg.occurs(&dt(2026, 1, 2, 9, 0, 0), &TrivialResolver));
        assert!(!agg.occurs(&dt(2026, 1, 3, 9, 0, 0), &TrivialResolver));

        let next = agg.next_after(&dt(2026, 1, 2, 9, 0, 0), &TrivialResolver).unwrap();
        assert_eq!(next.date, Date::from_ymd(2026, 1, 4).unwrap());
    }

    #[test]
    fn rdate_adds_an_extra_occurrence() {
        let mut agg = Aggregator::new();
        let start = dt(2026, 1, 1, 9, 0, 0);
        agg.set_start(start);
        agg.add_rdate(dt(2026, 3, 1, 9, 0, 0));
        assert!(agg.occurs(&dt(2026, 3, 1, 9, 0, 0), &TrivialResolver));
        assert!(!agg.occurs(&dt(2026, 3, 2, 9, 0, 0), &TrivialResolver));
    }

    #[test]
    fn all_day_exrule_suppresses_the_whole_day() {
        let mut agg = Aggregator::new();
        let start = dt(2026, 1, 1, 9, 0, 0);
        agg.set_start(start.clone());
        agg.add_rrule(Rule::compile(&RRule::daily(), start, 10_000));
        let exrule_start = Instant::date_only(Date::from_ymd(2026, 1, 2).unwrap(), TimeSpec::Utc);
        agg.add_exrule(Rule::compile(&RRule::daily().with_count(1), exrule_start, 10_000));
        assert!(agg.occurs(&dt(2026, 1, 1, 9, 0, 0), &TrivialResolver));
        assert!(!agg.occurs(&dt(2026, 1, 2, 9, 0, 0), &TrivialResolver));
    }
}
