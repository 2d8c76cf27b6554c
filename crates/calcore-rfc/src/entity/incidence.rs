//! The incidence hierarchy (§3 Incidence base, §4.F): `IncidenceBase`
//! plus the `Event`/`Todo`/`Journal`/`FreeBusy` subtypes, dirty-field
//! tracking, and the `Visitor` dispatch used instead of downcasting.

use crate::model::{Instant, Span};
use crate::recurrence::Aggregator;

use super::attendee::Attendee;
use super::custom_properties::CustomProperties;
use super::person::Person;

/// One mutable field of an incidence, used for dirty-tracking. Plain
/// assignment (deserializing from wire text) marks `Unknown` rather
/// than enumerating every field it touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirtyField {
    Unknown,
    Summary,
    Description,
    DtStart,
    DtEnd,
    DtDue,
    Location,
    Status,
    Attendees,
    Organizer,
    CustomProperty,
}

/// Batches dirty-field marks so a bracketed `start_updates`/`end_updates`
/// edit notifies observers exactly once, mirroring
/// [`crate::recurrence::Aggregator`]'s `set_dirty`.
#[derive(Default)]
pub struct DirtyTracker {
    dirty: std::collections::HashSet<DirtyField>,
    batch_depth: u32,
    observers: Vec<Box<dyn Fn(&std::collections::HashSet<DirtyField>)>>,
}

impl std::fmt::Debug for DirtyTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirtyTracker").field("dirty", &self.dirty).field("batch_depth", &self.batch_depth).finish_non_exhaustive()
    }
}

impl Clone for DirtyTracker {
    fn clone(&self) -> Self {
        Self { dirty: self.dirty.clone(), batch_depth: 0, observers: Vec::new() }
    }
}

impl PartialEq for DirtyTracker {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl DirtyTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_change(&mut self, observer: Box<dyn Fn(&std::collections::HashSet<DirtyField>)>) {
        self.observers.push(observer);
    }

    pub fn start_updates(&mut self) {
        self.batch_depth += 1;
    }

    pub fn end_updates(&mut self) {
        self.batch_depth = self.batch_depth.saturating_sub(1);
        if self.batch_depth == 0 && !self.dirty.is_empty() {
            self.flush();
        }
    }

    fn flush(&mut self) {
        for observer in &self.observers {
            observer(&self.dirty);
        }
        self.dirty.clear();
    }

    pub fn mark(&mut self, field: DirtyField) {
        self.dirty.insert(field);
        if self.batch_depth == 0 {
            self.flush();
        }
    }

    #[must_use]
    pub fn is_dirty(&self, field: DirtyField) -> bool {
        self.dirty.contains(&field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transparency {
    Opaque,
    Transparent,
}

impl Transparency {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Opaque => "OPAQUE",
            Self::Transparent => "TRANSPARENT",
        }
    }
}

impl Default for Transparency {
    fn default() -> Self {
        Self::Opaque
    }
}

/// A VALARM attached to an incidence: fires `trigger` relative to the
/// incidence's start (negative spans trigger before it).
#[derive(Debug, Clone, PartialEq)]
pub struct Alarm {
    pub action: String,
    pub trigger: Span,
}

/// Fields common to every incidence kind (§3 Incidence base).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IncidenceBase {
    pub uid: String,
    /// RFC 5545 SEQUENCE: revision counter bumped on every significant
    /// change, used by the scheduling classifier (§4.I) to tell an
    /// update from a stale re-send.
    pub sequence: u32,
    pub last_modified: Option<Instant>,
    /// Creation timestamp, distinct from `last_modified` (§4.H's
    /// `X-KDE-ICAL-IMPLEMENTATION-VERSION` legacy handling reinterprets
    /// `CREATED` against this field rather than `last_modified`).
    pub created: Option<Instant>,
    pub dt_start: Option<Instant>,
    pub organizer: Option<Person>,
    pub duration: Option<Span>,
    pub has_duration: bool,
    pub all_day: bool,
    pub attendees: Vec<Attendee>,
    pub comments: Vec<String>,
    pub contacts: Vec<String>,
    pub custom_properties: CustomProperties,
    pub url: Option<String>,
    pub read_only: bool,
    /// Instance identity (I5): `None` for a non-exception parent.
    pub recurrence_id: Option<Instant>,
    /// Distinct wire identity used by the scheduling classifier (§4.I)
    /// when the transport uid differs from the locally stored uid.
    pub scheduling_id: Option<String>,
    pub recurrence: Aggregator,
    pub alarms: Vec<Alarm>,
    pub dirty: DirtyTracker,
}

impl IncidenceBase {
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into(), ..Self::default() }
    }

    #[must_use]
    pub fn is_recurring(&self) -> bool {
        self.recurrence.has_rules()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Event {
    pub base: IncidenceBase,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub dt_end: Option<Instant>,
    pub transparency: Transparency,
    /// Mutually exclusive with `base.has_duration`.
    pub has_end_date: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Todo {
    pub base: IncidenceBase,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub dt_due: Option<Instant>,
    pub dt_completed: Option<Instant>,
    /// 0..=100.
    pub percent_complete: u8,
    pub related_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Journal {
    pub base: IncidenceBase,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FreeBusy {
    pub base: IncidenceBase,
    pub dt_end: Option<Instant>,
    pub busy_periods: Vec<(Instant, Instant)>,
}

/// Dispatches on an incidence's concrete kind without downcasting
/// (§4.F). The codec, the calendar index, and external consumers all
/// implement this instead of matching on an `Incidence` enum directly.
pub trait Visitor {
    fn visit_event(&mut self, event: &Event);
    fn visit_todo(&mut self, todo: &Todo);
    fn visit_journal(&mut self, journal: &Journal);
    fn visit_freebusy(&mut self, freebusy: &FreeBusy);
}

#[derive(Debug, Clone, PartialEq)]
pub enum Incidence {
    Event(Event),
    Todo(Todo),
    Journal(Journal),
    FreeBusy(FreeBusy),
}

impl Incidence {
    pub fn accept(&self, visitor: &mut dyn Visitor) {
        match self {
            Self::Event(e) => visitor.visit_event(e),
            Self::Todo(t) => visitor.visit_todo(t),
            Self::Journal(j) => visitor.visit_journal(j),
            Self::FreeBusy(f) => visitor.visit_freebusy(f),
        }
    }

    #[must_use]
    pub fn base(&self) -> &IncidenceBase {
        match self {
            Self::Event(e) => &e.base,
            Self::Todo(t) => &t.base,
            Self::Journal(j) => &j.base,
            Self::FreeBusy(f) => &f.base,
        }
    }

    #[must_use]
    pub fn base_mut(&mut self) -> &mut IncidenceBase {
        match self {
            Self::Event(e) => &mut e.base,
            Self::Todo(t) => &mut t.base,
            Self::Journal(j) => &mut j.base,
            Self::FreeBusy(f) => &mut f.base,
        }
    }

    /// Instance identity (I5): `(uid, recurrenceId)`.
    #[must_use]
    pub fn instance_identifier(&self) -> (String, Option<Instant>) {
        let base = self.base();
        (base.uid.clone(), base.recurrence_id.clone())
    }

    /// Structural equality excluding `lastModified` (§4.F). Compares
    /// through the shared `base()` view plus kind-specific fields,
    /// rather than deriving `Eq`, since `lastModified` must not
    /// participate.
    #[must_use]
    pub fn content_eq(&self, other: &Self) -> bool {
        fn base_content_eq(a: &IncidenceBase, b: &IncidenceBase) -> bool {
            a.uid == b.uid
                && a.sequence == b.sequence
                && a.dt_start == b.dt_start
                && a.organizer == b.organizer
                && a.duration == b.duration
                && a.has_duration == b.has_duration
                && a.all_day == b.all_day
                && a.attendees == b.attendees
                && a.comments == b.comments
                && a.contacts == b.contacts
                && a.custom_properties == b.custom_properties
                && a.url == b.url
                && a.read_only == b.read_only
                && a.recurrence_id == b.recurrence_id
        }

        match (self, other) {
            (Self::Event(a), Self::Event(b)) => {
                base_content_eq(&a.base, &b.base)
                    && a.summary == b.summary
                    && a.description == b.description
                    && a.location == b.location
                    && a.dt_end == b.dt_end
                    && a.transparency == b.transparency
                    && a.has_end_date == b.has_end_date
            }
            (Self::Todo(a), Self::Todo(b)) => {
                base_content_eq(&a.base, &b.base)
                    && a.summary == b.summary
                    && a.description == b.description
                    && a.dt_due == b.dt_due
                    && a.dt_completed == b.dt_completed
                    && a.percent_complete == b.percent_complete
                    && a.related_to == b.related_to
            }
            (Self::Journal(a), Self::Journal(b)) => base_content_eq(&a.base, &b.base) && a.description == b.description,
            (Self::FreeBusy(a), Self::FreeBusy(b)) => {
                base_content_eq(&a.base, &b.base) && a.dt_end == b.dt_end && a.busy_periods == b.busy_periods
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Date, Time, TimeSpec};

    fn instant(y: i32, m: u32, d: u32) -> Instant {
        Instant::new(Date::from_ymd(y, m, d).unwrap(), Time::new(9, 0, 0).unwrap(), TimeSpec::Utc)
    }

    #[test]
    fn content_eq_ignores_last_modified() {
        let mut a = Event { base: IncidenceBase::new("a@b"), ..Event::default() };
        a.base.dt_start = Some(instant(2026, 1, 1));
        a.base.last_modified = Some(instant(2026, 1, 1));
        let mut b = a.clone();
        b.base.last_modified = Some(instant(2026, 6, 1));

        assert!(Incidence::Event(a).content_eq(&Incidence::Event(b)));
    }

    #[test]
    fn dirty_tracker_batches_notifications() {
        let count = std::rc::Rc::new(std::cell::RefCell::new(0));
        let counted = count.clone();
        let mut dirty = DirtyTracker::new();
        dirty.on_change(Box::new(move |_fields| {
            *counted.borrow_mut() += 1;
        }));

        dirty.start_updates();
        dirty.mark(DirtyField::Summary);
        dirty.mark(DirtyField::Location);
        dirty.end_updates();

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn unbatched_mark_notifies_immediately() {
        let count = std::rc::Rc::new(std::cell::RefCell::new(0));
        let counted = count.clone();
        let mut dirty = DirtyTracker::new();
        dirty.on_change(Box::new(move |_fields| {
            *counted.borrow_mut() += 1;
        }));
        dirty.mark(DirtyField::Summary);
        dirty.mark(DirtyField::Location);
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn instance_identifier_is_uid_and_recurrence_id() {
        let mut base = IncidenceBase::new("a@b");
        base.recurrence_id = Some(instant(2026, 2, 1));
        let incidence = Incidence::Journal(Journal { base, description: None });
        assert_eq!(incidence.instance_identifier(), ("a@b".to_string(), Some(instant(2026, 2, 1))));
    }
}
