//! A TZID-keyed registry of decoded zones (§4.C), and the
//! [`ZoneResolver`] implementation that lets [`crate::model::Instant`]
//! resolve a `NamedZone` time-spec without depending on this module.

use std::collections::HashMap;

use crate::ical::core::{Component, ComponentKind};
use crate::model::{Date, Time, TimeSpec, ZoneResolver};

use super::zone::{LocalOffset, Zone};

/// A process- or calendar-scoped set of decoded VTIMEZONEs, indexed by TZID.
#[derive(Debug, Clone, Default)]
pub struct ZoneCollection {
    zones: HashMap<String, Zone>,
}

impl ZoneCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes every VTIMEZONE child of `root` (a VCALENDAR component)
    /// and registers it. A VTIMEZONE that fails to decode is logged and
    /// skipped rather than aborting the whole load, since the calendar's
    /// other components may not reference it.
    pub fn decode_all(&mut self, root: &Component, current_date: Date, horizon_years: u32) {
        for child in root.children_of_kind(ComponentKind::Timezone) {
            match Zone::decode(child, current_date, horizon_years) {
                Ok(zone) => {
                    self.zones.insert(zone.tzid.clone(), zone);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to decode VTIMEZONE; skipping");
                }
            }
        }
    }

    pub fn register(&mut self, zone: Zone) {
        self.zones.insert(zone.tzid.clone(), zone);
    }

    #[must_use]
    pub fn get(&self, tzid: &str) -> Option<&Zone> {
        self.zones.get(tzid)
    }

    #[must_use]
    pub fn contains(&self, tzid: &str) -> bool {
        self.zones.contains_key(tzid)
    }

    #[must_use]
    pub fn tzids(&self) -> Vec<&str> {
        self.zones.keys().map(String::as_str).collect()
    }

    /// Emits each registered zone's verbatim source VTIMEZONE component
    /// (§4.C's encoding algorithm: prefer the component the zone was
    /// decoded from over re-synthesizing one from its transition table).
    #[must_use]
    pub fn encode(&self) -> Vec<Component> {
        self.zones.values().map(|z| z.source.clone()).collect()
    }
}

impl ZoneResolver for ZoneCollection {
    fn offset_seconds(&self, spec: &TimeSpec, date: Date, time: Time, second_occurrence: bool) -> i32 {
        let TimeSpec::NamedZone(tzid) = spec else {
            return match spec {
                TimeSpec::FixedOffset(o) => *o,
                _ => 0,
            };
        };
        let Some(zone) = self.zones.get(tzid) else {
            tracing::warn!(tzid, "unknown TZID; treating as UTC");
            return 0;
        };
        match zone.offset_at_local(date, time) {
            LocalOffset::Single(o) => o,
            LocalOffset::Ambiguous(earlier, later) => {
                if second_occurrence {
                    later
                } else {
                    earlier
                }
            }
            LocalOffset::Gap(after) => after,
        }
    }

    fn to_local(&self, spec: &TimeSpec, utc_seconds: i64) -> (Date, Time, bool) {
        let offset = match spec {
            TimeSpec::NamedZone(tzid) => self.zones.get(tzid).map_or_else(
                || {
                    tracing::warn!(tzid, "unknown TZID; treating as UTC");
                    0
                },
                |zone| zone.offset_at_utc(utc_seconds),
            ),
            TimeSpec::FixedOffset(o) => *o,
            TimeSpec::Utc | TimeSpec::Floating => 0,
        };
        let (date, time) = super::zone::from_civil_seconds(utc_seconds + i64::from(offset));
        (date, time, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ical::core::{names, Property, Value};

    fn sample_component(tzid: &str) -> Component {
        let mut tz = Component::timezone();
        tz.add_property(Property::new(names::TZID, Value::Text(tzid.into()), tzid));
        let mut standard = Component::custom("STANDARD");
        standard.add_property(Property::new(
            names::DTSTART,
            Value::DateTime(crate::ical::core::DateTime {
                year: 1970,
                month: 1,
                day: 1,
                hour: 0,
                minute: 0,
                second: 0,
                form: crate::ical::core::DateTimeForm::Floating,
            }),
            "19700101T000000",
        ));
        standard.add_property(Property::new(
            names::TZOFFSETFROM,
            Value::UtcOffset(crate::ical::core::UtcOffset::from_seconds(0)),
            "+0000",
        ));
        standard.add_property(Property::new(
            names::TZOFFSETTO,
            Value::UtcOffset(crate::ical::core::UtcOffset::from_seconds(0)),
            "+0000",
        ));
        tz.add_child(standard);
        tz
    }

    #[test]
    fn unknown_tzid_falls_back_to_utc_with_a_warning() {
        let zones = ZoneCollection::new();
        let spec = TimeSpec::NamedZone("Nowhere".into());
        let offset = zones.offset_seconds(&spec, Date::from_ymd(2026, 1, 1).unwrap(), Time::new(12, 0, 0).unwrap(), false);
        assert_eq!(offset, 0);
    }

    #[test]
    fn decode_all_registers_by_tzid() {
        let mut root = Component::calendar();
        root.add_child(sample_component("Zero"));
        let mut zones = ZoneCollection::new();
        zones.decode_all(&root, Date::from_ymd(2026, 1, 1).unwrap(), 5);
        assert!(zones.contains("Zero"));
        assert_eq!(zones.get("Zero").unwrap().tzid, "Zero");
    }
}
