//! In-memory calendar index (§3 Calendar index, §4.G): three views over
//! incidences that stay consistent after every mutation (I6).

use std::collections::{BTreeMap, HashMap};

use crate::entity::{Incidence, IncidenceBase};
use crate::model::{Date, Instant, Span, ZoneResolver};

/// Which sub-list an incidence belongs to, for the date-bucket view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Event,
    Todo,
    Journal,
    FreeBusy,
}

impl Kind {
    #[must_use]
    pub fn of(incidence: &Incidence) -> Self {
        match incidence {
            Incidence::Event(_) => Self::Event,
            Incidence::Todo(_) => Self::Todo,
            Incidence::Journal(_) => Self::Journal,
            Incidence::FreeBusy(_) => Self::FreeBusy,
        }
    }
}

/// `(uid, recurrenceId)` — the same instance identity as [`Incidence::instance_identifier`].
pub type InstanceId = (String, Option<Instant>);

fn instant_key(i: &Option<Instant>) -> (i64, bool) {
    i.as_ref().map_or((i64::MIN, false), |t| (t.civil_seconds(), t.second_occurrence))
}

fn dt_end(incidence: &Incidence) -> Option<&Instant> {
    match incidence {
        Incidence::Event(e) => e.dt_end.as_ref(),
        Incidence::FreeBusy(f) => f.dt_end.as_ref(),
        Incidence::Todo(_) | Incidence::Journal(_) => None,
    }
}

/// Owns every incidence in a calendar and keeps the primary (UID →
/// instances), identifier (instance → incidence), and date-bucket
/// views in sync (I6).
#[derive(Debug, Default)]
pub struct CalendarIndex {
    primary: HashMap<String, Vec<Option<Instant>>>,
    by_identifier: HashMap<InstanceId, Incidence>,
    by_date: BTreeMap<(Kind, Date), Vec<InstanceId>>,
    deleted: HashMap<InstanceId, Incidence>,
    track_deletions: bool,
}

impl CalendarIndex {
    #[must_use]
    pub fn new(track_deletions: bool) -> Self {
        Self { track_deletions, ..Self::default() }
    }

    #[must_use]
    pub fn get(&self, id: &InstanceId) -> Option<&Incidence> {
        self.by_identifier.get(id)
    }

    /// Mutable access to an indexed incidence in place, for editing an
    /// exception's overridden fields after `create_exception` without a
    /// read-modify-`upsert` round trip.
    pub fn get_mut(&mut self, id: &InstanceId) -> Option<&mut Incidence> {
        self.by_identifier.get_mut(id)
    }

    #[must_use]
    pub fn instances_for_uid(&self, uid: &str) -> &[Option<Instant>] {
        self.primary.get(uid).map_or(&[], Vec::as_slice)
    }

    fn bucket_key(incidence: &Incidence) -> Option<(Kind, Date)> {
        incidence.base().dt_start.as_ref().map(|dt| (Kind::of(incidence), dt.date))
    }

    fn unbucket(&mut self, id: &InstanceId, old: &Incidence) {
        if let Some(key) = Self::bucket_key(old)
            && let Some(bucket) = self.by_date.get_mut(&key)
        {
            bucket.retain(|existing| existing != id);
            if bucket.is_empty() {
                self.by_date.remove(&key);
            }
        }
    }

    /// Inserts or replaces an incidence, keeping all three views
    /// consistent (I6). Sets `last_modified` to `now` on replacement.
    pub fn upsert(&mut self, mut incidence: Incidence, now: Instant) {
        let id = incidence.instance_identifier();

        if let Some(old) = self.by_identifier.get(&id).cloned() {
            self.unbucket(&id, &old);
            incidence.base_mut().last_modified = Some(now);
        } else {
            self.primary.entry(id.0.clone()).or_default().push(id.1.clone());
            self.primary.get_mut(&id.0).expect("just inserted").sort_by_key(instant_key);
        }

        if let Some(key) = Self::bucket_key(&incidence) {
            self.by_date.entry(key).or_default().push(id.clone());
        }
        self.by_identifier.insert(id, incidence);
    }

    /// Removes the instance, cascading to every exception that shares
    /// its UID when `id` is the parent (`recurrenceId == None`). Soft
    /// deletion retains a copy in the deleted-set if enabled.
    pub fn delete(&mut self, id: &InstanceId) -> Vec<Incidence> {
        let mut removed = Vec::new();
        if let Some(incidence) = self.by_identifier.remove(id) {
            self.unbucket(id, &incidence);
            if let Some(list) = self.primary.get_mut(&id.0) {
                list.retain(|rid| rid != &id.1);
            }
            if self.track_deletions {
                self.deleted.insert(id.clone(), incidence.clone());
            }
            removed.push(incidence);
        }

        if id.1.is_none() {
            let children: Vec<InstanceId> =
                self.by_identifier.keys().filter(|(uid, rid)| uid == &id.0 && rid.is_some()).cloned().collect();
            for child in children {
                removed.extend(self.delete(&child));
            }
        }
        removed
    }

    #[must_use]
    pub fn deleted(&self) -> impl Iterator<Item = &Incidence> {
        self.deleted.values()
    }

    /// Clones the parent's base (minus its recurrence rules, with a
    /// fresh identity at `recurrence_id`), shifts `dtDue`/`dtEnd` by the
    /// same delta as `dtStart`, and inserts it as a new instance. The
    /// parent's own aggregator is left untouched: `recurrenceId` is
    /// excluded implicitly (I5), not removed from the RRULE.
    pub fn create_exception(&mut self, uid: &str, recurrence_id: Instant, now: Instant) -> Option<InstanceId> {
        let parent = self.by_identifier.get(&(uid.to_string(), None))?.clone();
        let old_start = parent.base().dt_start.clone()?;
        let delta = recurrence_id.civil_seconds() - old_start.civil_seconds();

        let mut exception = parent;
        let base = exception.base_mut();
        base.dt_start = Some(recurrence_id.clone());
        base.recurrence_id = Some(recurrence_id);
        base.recurrence = crate::recurrence::Aggregator::new();
        base.last_modified = Some(now.clone());

        match &mut exception {
            Incidence::Event(e) => {
                if let Some(end) = &e.dt_end {
                    e.dt_end = Some(end.add_secs_unzoned(delta));
                }
            }
            Incidence::Todo(t) => {
                if let Some(due) = &t.dt_due {
                    t.dt_due = Some(due.add_secs_unzoned(delta));
                }
            }
            Incidence::Journal(_) | Incidence::FreeBusy(_) => {}
        }

        let id = exception.instance_identifier();
        self.upsert(exception, now);
        Some(id)
    }

    /// Items starting on `date`, multi-day items spanning it, and
    /// recurring items whose aggregator recurs on it (§4.G).
    #[must_use]
    pub fn raw_events_for_date(&self, date: Date, resolver: &dyn ZoneResolver) -> Vec<&Incidence> {
        let mut out = Vec::new();
        for kind in [Kind::Event, Kind::Todo, Kind::Journal, Kind::FreeBusy] {
            if let Some(ids) = self.by_date.get(&(kind, date)) {
                out.extend(ids.iter().filter_map(|id| self.by_identifier.get(id)));
            }
        }
        for incidence in self.by_identifier.values() {
            if out.iter().any(|existing| std::ptr::eq(*existing, incidence)) {
                continue;
            }
            if let Some(end) = dt_end(incidence)
                && let Some(start) = &incidence.base().dt_start
                && start.date <= date
                && date <= end.date
            {
                out.push(incidence);
                continue;
            }
            if incidence.base().is_recurring() && !incidence.base().recurrence.recur_times_on(date, resolver).is_empty() {
                out.push(incidence);
            }
        }
        out
    }

    /// Alarms firing in `[from, to]`: non-recurring incidences are
    /// checked once; recurring incidences are expanded over every
    /// occurrence in the interval.
    #[must_use]
    pub fn alarms(&self, from: &Instant, to: &Instant, resolver: &dyn ZoneResolver) -> Vec<(InstanceId, Instant)> {
        let mut out = Vec::new();
        for incidence in self.by_identifier.values() {
            let base = incidence.base();
            if base.alarms.is_empty() {
                continue;
            }
            let Some(start) = &base.dt_start else { continue };
            let occurrences = if base.is_recurring() {
                base.recurrence.times_in_interval(from, to, resolver)
            } else {
                vec![start.clone()]
            };
            for occurrence in &occurrences {
                for alarm in &base.alarms {
                    let fire = apply_trigger(occurrence, alarm.trigger, resolver);
                    if fire.to_utc_seconds(resolver) >= from.to_utc_seconds(resolver)
                        && fire.to_utc_seconds(resolver) <= to.to_utc_seconds(resolver)
                    {
                        out.push((incidence.instance_identifier(), fire));
                    }
                }
            }
        }
        out
    }
}

fn apply_trigger(occurrence: &Instant, trigger: Span, resolver: &dyn ZoneResolver) -> Instant {
    match trigger {
        Span::Seconds(n) => occurrence.add_secs(n, resolver),
        Span::Days(n) => occurrence.add_days(n),
    }
}

trait ShiftUnzoned {
    fn add_secs_unzoned(&self, n: i64) -> Self;
}

impl ShiftUnzoned for Instant {
    /// Shifts the wall-clock fields by `n` raw seconds, ignoring the
    /// time-spec. Used for the exception-creation delta (§4.G), which
    /// shifts `dtDue`/`dtEnd` by the same civil delta as `dtStart` was
    /// shifted, independent of any zone.
    fn add_secs_unzoned(&self, n: i64) -> Self {
        let epoch = Date::from_ymd(1970, 1, 1).expect("epoch date is valid");
        let total = self.civil_seconds() + n;
        let days = total.div_euclid(86_400);
        let secs_of_day = u32::try_from(total.rem_euclid(86_400)).expect("rem_euclid(86_400) fits in u32");
        let date = epoch.add_days(days);
        let time = crate::model::Time::from_seconds_since_midnight(secs_of_day);
        Self { date, time, spec: self.spec.clone(), date_only: self.date_only, second_occurrence: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Event, IncidenceBase};
    use crate::model::{Date, Time, TimeSpec, TrivialResolver};

    fn instant(y: i32, m: u32, d: u32, h: u8) -> Instant {
        Instant::new(Date::from_ymd(y, m, d).unwrap(), Time::new(h, 0, 0).unwrap(), TimeSpec::Utc)
    }

    fn event(uid: &str, start: Instant) -> Incidence {
        let mut base = IncidenceBase::new(uid);
        base.dt_start = Some(start);
        Incidence::Event(Event { base, ..Event::default() })
    }

    #[test]
    fn upsert_populates_all_three_views() {
        let mut index = CalendarIndex::new(false);
        let start = instant(2026, 3, 1, 9);
        index.upsert(event("a@b", start.clone()), start.clone());

        assert_eq!(index.instances_for_uid("a@b"), &[None]);
        assert!(index.get(&("a@b".to_string(), None)).is_some());
        assert_eq!(index.raw_events_for_date(start.date, &TrivialResolver).len(), 1);
    }

    #[test]
    fn delete_removes_from_every_view() {
        let mut index = CalendarIndex::new(false);
        let start = instant(2026, 3, 1, 9);
        index.upsert(event("a@b", start.clone()), start.clone());
        let removed = index.delete(&("a@b".to_string(), None));
        assert_eq!(removed.len(), 1);
        assert!(index.get(&("a@b".to_string(), None)).is_none());
        assert!(index.raw_events_for_date(start.date, &TrivialResolver).is_empty());
    }

    #[test]
    fn soft_deletion_keeps_a_copy_when_enabled() {
        let mut index = CalendarIndex::new(true);
        let start = instant(2026, 3, 1, 9);
        index.upsert(event("a@b", start.clone()), start.clone());
        index.delete(&("a@b".to_string(), None));
        assert_eq!(index.deleted().count(), 1);
    }

    #[test]
    fn deleting_a_parent_cascades_to_exceptions() {
        let mut index = CalendarIndex::new(false);
        let start = instant(2026, 3, 1, 9);
        let now = start.clone();
        index.upsert(event("a@b", start.clone()), now.clone());
        let recurrence_id = instant(2026, 3, 8, 9);
        index.create_exception("a@b", recurrence_id.clone(), now);

        assert_eq!(index.instances_for_uid("a@b").len(), 2);
        let removed = index.delete(&("a@b".to_string(), None));
        assert_eq!(removed.len(), 2);
        assert!(index.get(&("a@b".to_string(), Some(recurrence_id))).is_none());
    }
}
