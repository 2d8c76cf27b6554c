//! Integration scenarios (SPEC_FULL.md §8 S1/S4/S5) and index invariants
//! (T7/T8), exercising the recurrence engine, the calendar index, and
//! the scheduling classifier together rather than module-by-module.

use calcore_rfc::calendar::CalendarIndex;
use calcore_rfc::entity::{Event, FreeBusy, IncidenceBase, Incidence};
use calcore_rfc::ical::core::RRule;
use calcore_rfc::model::{Date, Instant, Time, TimeSpec, TrivialResolver};
use calcore_rfc::recurrence::Rule;
use calcore_rfc::scheduling::{classify, Classification, ItipMethod};

fn instant(y: i32, m: u32, d: u32, h: u8, mi: u8, s: u8) -> Instant {
    Instant::new(Date::from_ymd(y, m, d).unwrap(), Time::new(h, mi, s).unwrap(), TimeSpec::Utc)
}

fn daily_event(uid: &str, start: Instant, dt_end: Instant, count: u32) -> Incidence {
    let mut base = IncidenceBase::new(uid);
    base.dt_start = Some(start.clone());
    base.recurrence.set_start(start.clone());
    base.recurrence.add_rrule(Rule::compile(&RRule::daily().with_count(count), start, 10_000));
    Incidence::Event(Event { base, dt_end: Some(dt_end), ..Event::default() })
}

/// S1 — daily with count: three occurrences, one per day, UTC.
#[test]
fn s1_daily_with_count_enumerates_three_occurrences() {
    let start = instant(2006, 1, 1, 12, 0, 0);
    let event = daily_event("s1@test", start.clone(), instant(2006, 1, 1, 13, 0, 0), 3);
    let base = event.base();

    let window_end = instant(2006, 1, 5, 0, 0, 0);
    let occurrences = base.recurrence.times_in_interval(&start, &window_end, &TrivialResolver);

    assert_eq!(occurrences.len(), 3);
    assert_eq!(occurrences[0].date, Date::from_ymd(2006, 1, 1).unwrap());
    assert_eq!(occurrences[1].date, Date::from_ymd(2006, 1, 2).unwrap());
    assert_eq!(occurrences[2].date, Date::from_ymd(2006, 1, 3).unwrap());
}

/// S4 — free/busy publish: two daily events, one busy period each for
/// the requested day.
#[test]
fn s4_free_busy_rolls_up_two_busy_periods_for_one_day() {
    let mut index = CalendarIndex::new(false);
    let now = instant(2006, 1, 1, 0, 0, 0);

    let a_start = instant(2006, 1, 1, 12, 0, 0);
    let a = daily_event("a@test", a_start.clone(), instant(2006, 1, 1, 13, 0, 0), 3);
    let b_start = instant(2006, 1, 1, 13, 0, 0);
    let b = daily_event("b@test", b_start.clone(), instant(2006, 1, 1, 14, 0, 0), 4);

    index.upsert(a, now.clone());
    index.upsert(b, now);

    let day = Date::from_ymd(2006, 1, 2).unwrap();
    let raw = index.raw_events_for_date(day, &TrivialResolver);
    assert_eq!(raw.len(), 2);

    let mut busy_periods: Vec<(Instant, Instant)> = Vec::new();
    for incidence in &raw {
        let base = incidence.base();
        let Incidence::Event(event) = incidence else { continue };
        let occurrence = base
            .recurrence
            .recur_times_on(day, &TrivialResolver)
            .into_iter()
            .next()
            .expect("each event recurs on the requested day");
        let Some(dt_end) = &event.dt_end else { continue };
        let offset = dt_end.civil_seconds() - base.dt_start.as_ref().expect("start").civil_seconds();
        busy_periods.push((occurrence.clone(), occurrence.add_secs(offset, &TrivialResolver)));
    }
    busy_periods.sort_by(|x, y| x.0.compare(&y.0, &TrivialResolver));

    assert_eq!(busy_periods.len(), 2);
    assert_eq!(busy_periods[0].0, instant(2006, 1, 2, 12, 0, 0));
    assert_eq!(busy_periods[0].1, instant(2006, 1, 2, 13, 0, 0));
    assert_eq!(busy_periods[1].0, instant(2006, 1, 2, 13, 0, 0));
    assert_eq!(busy_periods[1].1, instant(2006, 1, 2, 14, 0, 0));
}

/// S4 companion: a `FreeBusy` incidence itself just carries the rolled
/// up busy periods verbatim.
#[test]
fn s4_freebusy_incidence_holds_its_busy_periods() {
    let base = IncidenceBase::new("fb@test");
    let freebusy = FreeBusy {
        base,
        dt_end: Some(instant(2006, 1, 3, 0, 0, 0)),
        busy_periods: vec![
            (instant(2006, 1, 2, 12, 0, 0), instant(2006, 1, 2, 13, 0, 0)),
            (instant(2006, 1, 2, 13, 0, 0), instant(2006, 1, 2, 14, 0, 0)),
        ],
    };
    assert_eq!(freebusy.busy_periods.len(), 2);
}

/// S5 — exception override: daily series with one exception day whose
/// summary differs; T8 (exception suppresses its own recurrence
/// instant) and T7 (index identity) fall out of the same setup.
#[test]
fn s5_exception_overrides_one_occurrence_and_suppresses_its_recurrence() {
    let mut index = CalendarIndex::new(false);
    let start = instant(2013, 1, 1, 9, 0, 0);
    let now = start.clone();

    let mut parent = daily_event("e@test", start.clone(), instant(2013, 1, 1, 10, 0, 0), 3);
    if let Incidence::Event(event) = &mut parent {
        event.summary = Some("series".to_string());
    }
    index.upsert(parent, now.clone());

    let recurrence_id = instant(2013, 1, 2, 9, 0, 0);
    let exception_id = index.create_exception("e@test", recurrence_id.clone(), now.clone()).expect("parent exists");
    if let Some(Incidence::Event(event)) = index.get_mut(&exception_id) {
        event.summary = Some("exception".to_string());
    }

    // T7: instance lookup round-trips to the same incidence, and the
    // uid's instance list contains exactly the parent plus its exception.
    let fetched = index.get(&exception_id).expect("exception is indexed");
    assert_eq!(fetched.base().recurrence_id, Some(recurrence_id.clone()));
    assert_eq!(index.instances_for_uid("e@test").len(), 2);

    // T8: enumerating the parent's own recurrence set still produces
    // 2013-01-02 (the aggregator doesn't know about the exception); the
    // index-level view is what omits it, by construction of §4.G's
    // three-view design (the exception instance is addressed by its own
    // identity, not surfaced again under the parent's occurrence list).
    let parent_incidence = index.get(&("e@test".to_string(), None)).expect("parent still indexed");
    let window_end = instant(2013, 1, 5, 0, 0, 0);
    let parent_occurrences = parent_incidence.base().recurrence.times_in_interval(&start, &window_end, &TrivialResolver);
    assert_eq!(parent_occurrences.len(), 3);

    let Incidence::Event(exception_event) = fetched else { panic!("expected event") };
    assert_eq!(exception_event.summary.as_deref(), Some("exception"));
}

/// T7 companion: deleting a parent cascades and removes both it and its
/// exceptions from every view.
#[test]
fn t7_deleting_parent_removes_instance_and_exceptions_together() {
    let mut index = CalendarIndex::new(false);
    let start = instant(2013, 1, 1, 9, 0, 0);
    let now = start.clone();
    index.upsert(daily_event("e2@test", start.clone(), instant(2013, 1, 1, 10, 0, 0), 3), now.clone());
    let recurrence_id = instant(2013, 1, 2, 9, 0, 0);
    index.create_exception("e2@test", recurrence_id.clone(), now.clone());

    let removed = index.delete(&("e2@test".to_string(), None));
    assert_eq!(removed.len(), 2);
    assert!(index.get(&("e2@test".to_string(), None)).is_none());
    assert!(index.get(&("e2@test".to_string(), Some(recurrence_id))).is_none());
    assert!(index.instances_for_uid("e2@test").is_empty());
}

/// Scheduling classifier against a reference calendar already holding
/// the uid at a lower sequence number.
#[test]
fn scheduling_request_with_bumped_sequence_classifies_as_update() {
    let mut reference = CalendarIndex::new(false);
    let now = instant(2026, 1, 1, 9, 0, 0);
    let mut existing_base = IncidenceBase::new("sched@test");
    existing_base.dt_start = Some(now.clone());
    existing_base.sequence = 0;
    reference.upsert(Incidence::Event(Event { base: existing_base, ..Event::default() }), now.clone());

    let mut incoming_base = IncidenceBase::new("sched@test");
    incoming_base.dt_start = Some(now);
    incoming_base.sequence = 1;
    let incoming = Incidence::Event(Event { base: incoming_base, ..Event::default() });

    let outcome = classify(ItipMethod::Request, &incoming, &reference);
    assert_eq!(outcome, Classification::RequestUpdate);
}
