//! One zone's phase/transition table (§4.C): built once from a decoded
//! VTIMEZONE component, then queried by UTC or local instant.

use crate::ical::core::{Component, ComponentKind, Property, names};
use crate::model::{Date, Instant, Time, TimeSpec};
use crate::recurrence::Rule;
use crate::{RfcError, RfcResult};

use super::phase::{Phase, PhaseKind, is_useless_tzname};

/// Hard ceiling on interval advances when expanding a VTIMEZONE RRULE,
/// matching the recurrence engine's own ceiling (§4.D.4).
const MAX_INTERVAL_ADVANCES: u32 = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub utc_seconds: i64,
    pub phase: Phase,
}

/// Result of a local (civil, zone-less) time lookup (§4.C `offsetAtLocal`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalOffset {
    /// Unambiguous: exactly one offset applies.
    Single(i32),
    /// Fall-back overlap: `.0` is the offset of the first occurrence
    /// (larger/earlier), `.1` the second occurrence (smaller/later).
    Ambiguous(i32, i32),
    /// Spring-forward gap: no valid offset. Carries the offset of the
    /// phase following the gap, used as `ZoneResolver`'s fallback.
    Gap(i32),
}

#[derive(Debug, Clone)]
pub struct Zone {
    pub tzid: String,
    pub tzurl: Option<String>,
    pub last_modified_utc: Option<i64>,
    pub previous_utc_offset: i32,
    pub transitions: Vec<Transition>,
    /// Verbatim source component, kept for byte-faithful re-emission.
    pub source: Component,
}

struct RawTransition {
    utc_seconds: i64,
    offset_from: i32,
    phase: Phase,
}

impl Zone {
    /// Decodes a `VTIMEZONE` component per §4.C's five-step algorithm.
    ///
    /// ## Errors
    /// Returns [`RfcError::MissingField`] if the component has no TZID.
    pub fn decode(component: &Component, current_date: Date, horizon_years: u32) -> RfcResult<Self> {
        if component.kind != Some(ComponentKind::Timezone) {
            tracing::warn!("decode called on a non-VTIMEZONE component");
        }

        let tzid = component
            .get_property(names::TZID)
            .and_then(Property::as_text)
            .ok_or_else(|| RfcError::MissingField("TZID".to_string()))?
            .to_string();

        let tzurl = component.get_property(names::TZURL).and_then(Property::as_text).map(str::to_string);

        let last_modified_utc = component.get_property(names::LAST_MODIFIED).and_then(|p| {
            let dt = p.as_datetime()?;
            if dt.is_utc() {
                Some(dt.to_instant().to_utc_seconds(&crate::model::TrivialResolver))
            } else {
                tracing::warn!(tzid = %tzid, "LAST-MODIFIED not in UTC; ignoring");
                None
            }
        });

        let horizon = current_date.add_years(i32::try_from(horizon_years).unwrap_or(20));
        let horizon_instant = Instant::date_only(horizon, TimeSpec::Floating);

        let mut raw: Vec<RawTransition> = Vec::new();
        for sub in component.children.iter().filter(|c| matches!(c.kind, Some(ComponentKind::Standard | ComponentKind::Daylight))) {
            let kind = if sub.kind == Some(ComponentKind::Daylight) { PhaseKind::Daylight } else { PhaseKind::Standard };
            decode_observance(sub, kind, &horizon_instant, &tzid, &mut raw);
        }

        if raw.is_empty() {
            tracing::warn!(tzid = %tzid, "VTIMEZONE has no usable STANDARD/DAYLIGHT observances");
        }

        raw.sort_by_key(|t| t.utc_seconds);

        let previous_utc_offset = raw.first().map_or(0, |t| t.offset_from);

        let mut transitions: Vec<Transition> = Vec::with_capacity(raw.len());
        for t in raw {
            if transitions.last().is_some_and(|prev| prev.phase == t.phase) {
                continue;
            }
            transitions.push(Transition { utc_seconds: t.utc_seconds, phase: t.phase });
        }

        Ok(Self {
            tzid,
            tzurl,
            last_modified_utc,
            previous_utc_offset,
            transitions,
            source: component.clone(),
        })
    }

    /// `offsetAtUtc` (§4.C): binary search for the latest transition at
    /// or before `utc_seconds`; falls back to `previousUtcOffset`.
    #[must_use]
    pub fn offset_at_utc(&self, utc_seconds: i64) -> i32 {
        match self.transitions.partition_point(|t| t.utc_seconds <= utc_seconds) {
            0 => self.previous_utc_offset,
            n => self.transitions[n - 1].phase.offset_seconds,
        }
    }

    /// `offsetAtLocal` (§4.C): detects the spring-forward gap and the
    /// fall-back overlap explicitly, else resolves unambiguously.
    #[must_use]
    pub fn offset_at_local(&self, date: Date, time: Time) -> LocalOffset {
        let local = civil_seconds(date, time);

        let mut prev_offset = self.previous_utc_offset;
        for t in &self.transitions {
            let cur_offset = t.phase.offset_seconds;
            let local_before = t.utc_seconds + i64::from(prev_offset);
            let local_after = t.utc_seconds + i64::from(cur_offset);

            if cur_offset > prev_offset {
                if local >= local_before && local < local_after {
                    return LocalOffset::Gap(cur_offset);
                }
            } else if cur_offset < prev_offset && local >= local_after && local < local_before {
                return LocalOffset::Ambiguous(prev_offset, cur_offset);
            }
            prev_offset = cur_offset;
        }

        // Unambiguous: the offset whose corresponding UTC instant maps
        // back to the same offset is the only valid one.
        let mut distinct = vec![self.previous_utc_offset];
        for t in &self.transitions {
            if !distinct.contains(&t.phase.offset_seconds) {
                distinct.push(t.phase.offset_seconds);
            }
        }
        for offset in distinct {
            let utc = local - i64::from(offset);
            if self.offset_at_utc(utc) == offset {
                return LocalOffset::Single(offset);
            }
        }
        // Degenerate (no transitions at all): trust previousUtcOffset.
        LocalOffset::Single(self.previous_utc_offset)
    }
}

#[must_use]
fn civil_seconds(date: Date, time: Time) -> i64 {
    let epoch = Date::from_ymd(1970, 1, 1).expect("epoch date is valid");
    let days = (date.naive() - epoch.naive()).num_days();
    days * 86_400 + i64::from(time.seconds_since_midnight())
}

fn decode_observance(sub: &Component, kind: PhaseKind, horizon: &Instant, tzid: &str, out: &mut Vec<RawTransition>) {
    let Some(dtstart_prop) = sub.get_property(names::DTSTART) else {
        tracing::warn!(tzid, "VTIMEZONE observance missing DTSTART; skipping phase");
        return;
    };
    let Some(dtstart) = dtstart_prop.as_datetime() else {
        tracing::warn!(tzid, "VTIMEZONE observance DTSTART is not a DATE-TIME; skipping phase");
        return;
    };

    let Some(offset_from) = sub.get_property(names::TZOFFSETFROM).and_then(|p| match &p.value {
        crate::ical::core::Value::UtcOffset(o) => Some(o.seconds),
        _ => None,
    }) else {
        tracing::warn!(tzid, "VTIMEZONE observance missing TZOFFSETFROM; skipping phase");
        return;
    };

    let Some(offset_to) = sub.get_property(names::TZOFFSETTO).and_then(|p| match &p.value {
        crate::ical::core::Value::UtcOffset(o) => Some(o.seconds),
        _ => None,
    }) else {
        tracing::warn!(tzid, "VTIMEZONE observance missing TZOFFSETTO; skipping phase");
        return;
    };

    let abbreviations: Vec<String> = sub
        .get_properties(names::TZNAME)
        .into_iter()
        .filter_map(Property::as_text)
        .filter(|s| !is_useless_tzname(s))
        .map(str::to_string)
        .collect();
    let comment = sub.get_property(names::COMMENT).and_then(Property::as_text).map(str::to_string);
    let phase = Phase { offset_seconds: offset_to, kind, abbreviations, comment };

    let start_date = Date::from_ymd(i32::from(dtstart.year), u32::from(dtstart.month), u32::from(dtstart.day));
    let Some(start_date) = start_date else {
        tracing::warn!(tzid, "VTIMEZONE observance DTSTART has an invalid date; skipping phase");
        return;
    };
    let start_time = Time::new(dtstart.hour, dtstart.minute, dtstart.second.min(59));
    let Some(start_time) = start_time else {
        tracing::warn!(tzid, "VTIMEZONE observance DTSTART has an invalid time; skipping phase");
        return;
    };

    let dtstart_utc = civil_seconds(start_date, start_time) - i64::from(offset_from);
    out.push(RawTransition { utc_seconds: dtstart_utc, offset_from, phase: phase.clone() });

    for rdate_prop in sub.get_properties(names::RDATE) {
        for dt in rdate_prop.value.as_datetime_list().unwrap_or(&[]) {
            let date = Date::from_ymd(i32::from(dt.year), u32::from(dt.month), u32::from(dt.day));
            let time = Time::new(dt.hour, dt.minute, dt.second.min(59));
            if let (Some(date), Some(time)) = (date, time) {
                let utc = civil_seconds(date, time) - i64::from(offset_from);
                out.push(RawTransition { utc_seconds: utc, offset_from, phase: phase.clone() });
            }
        }
        if let Some(date) = rdate_prop.value.as_date() {
            let utc = civil_seconds(date.to_model(), start_time) - i64::from(offset_from);
            out.push(RawTransition { utc_seconds: utc, offset_from, phase: phase.clone() });
        }
    }

    if let Some(rrule_prop) = sub.get_property(names::RRULE)
        && let Some(rrule) = rrule_prop.value.as_recur()
    {
        let mut shifted = rrule.clone();
        if let Some(crate::ical::core::RRuleUntil::DateTime(until)) = &shifted.until {
            let until_instant = until.to_instant();
            let until_local_seconds = until_instant.civil_seconds() + i64::from(offset_from);
            let (date, time) = from_civil_seconds(until_local_seconds);
            shifted.until = Some(crate::ical::core::RRuleUntil::DateTime(crate::ical::core::DateTime::from_instant(
                &Instant::new(date, time, TimeSpec::Floating),
            )));
        }

        let start_instant = Instant::new(start_date, start_time, TimeSpec::Floating);
        let rule = Rule::compile(&shifted, start_instant.clone(), MAX_INTERVAL_ADVANCES);
        let occurrences = rule.times_in_interval(&start_instant, horizon, &crate::model::TrivialResolver);
        for occ in occurrences {
            let utc = civil_seconds(occ.date, occ.time) - i64::from(offset_from);
            if utc == dtstart_utc {
                continue;
            }
            out.push(RawTransition { utc_seconds: utc, offset_from, phase: phase.clone() });
        }
    }
}

pub(crate) fn from_civil_seconds(total: i64) -> (Date, Time) {
    let epoch = Date::from_ymd(1970, 1, 1).expect("epoch date is valid");
    let days = total.div_euclid(86_400);
    let secs_of_day = u32::try_from(total.rem_euclid(86_400)).expect("rem_euclid(86_400) fits in u32");
    (epoch.add_days(days), Time::from_seconds_since_midnight(secs_of_day))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ical::core::{Property, Value};

    fn us_eastern() -> Zone {
        let mut root = Component::timezone();
        root.add_property(Property::new(names::TZID, Value::Text("Test-Dummy-Western".into()), "Test-Dummy-Western"));

        let mut standard = Component::custom("STANDARD");
        standard.add_property(Property::new(
            names::DTSTART,
            Value::DateTime(crate::ical::core::DateTime {
                year: 1987, month: 10, day: 25, hour: 2, minute: 0, second: 0,
                form: crate::ical::core::DateTimeForm::Floating,
            }),
            "19871025T020000",
        ));
        standard.add_property(Property::new(names::TZOFFSETFROM, Value::UtcOffset(crate::ical::core::UtcOffset::from_seconds(-14_400)), "-0400"));
        standard.add_property(Property::new(names::TZOFFSETTO, Value::UtcOffset(crate::ical::core::UtcOffset::from_seconds(-18_000)), "-0500"));
        standard.add_property(Property::new(names::TZNAME, Value::Text("EST".into()), "EST"));
        root.add_child(standard);

        let mut daylight = Component::custom("DAYLIGHT");
        daylight.add_property(Property::new(
            names::DTSTART,
            Value::DateTime(crate::ical::core::DateTime {
                year: 1987, month: 4, day: 5, hour: 2, minute: 0, second: 0,
                form: crate::ical::core::DateTimeForm::Floating,
            }),
            "19870405T020000",
        ));
        daylight.add_property(Property::new(names::TZOFFSETFROM, Value::UtcOffset(crate::ical::core::UtcOffset::from_seconds(-18_000)), "-0500"));
        daylight.add_property(Property::new(names::TZOFFSETTO, Value::UtcOffset(crate::ical::core::UtcOffset::from_seconds(-14_400)), "-0400"));
        daylight.add_property(Property::new(names::TZNAME, Value::Text("EDT".into()), "EDT"));
        root.add_child(daylight);

        Zone::decode(&root, Date::from_ymd(1987, 1, 1).unwrap(), 1).unwrap()
    }

    #[test]
    fn spring_forward_gap() {
        let zone = us_eastern();
        let date = Date::from_ymd(1987, 4, 5).unwrap();
        assert_eq!(zone.offset_at_local(date, Time::new(2, 30, 0).unwrap()), LocalOffset::Gap(-14_400));
        assert_eq!(zone.offset_at_local(date, Time::new(1, 59, 59).unwrap()), LocalOffset::Single(-18_000));
        assert_eq!(zone.offset_at_local(date, Time::new(3, 0, 0).unwrap()), LocalOffset::Single(-14_400));
    }

    #[test]
    fn fall_back_overlap() {
        let zone = us_eastern();
        let date = Date::from_ymd(1987, 10, 25).unwrap();
        assert_eq!(
            zone.offset_at_local(date, Time::new(1, 30, 0).unwrap()),
            LocalOffset::Ambiguous(-14_400, -18_000)
        );
    }

    #[test]
    fn offset_at_utc_before_first_transition_uses_previous_offset() {
        let zone = us_eastern();
        assert_eq!(zone.offset_at_utc(0), -18_000);
    }
}
