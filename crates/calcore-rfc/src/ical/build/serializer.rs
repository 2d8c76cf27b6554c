//! Canonical iCalendar serialization (RFC 5545 §3.1-§3.6).
//!
//! Property ordering is deterministic: known properties serialize in a
//! fixed canonical order per component kind, with anything else
//! (X- extensions, VOLATILE- scratch properties) appended afterward in
//! the order they were added.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use super::escape::{escape_param_value, escape_text};
use super::fold::fold_line;
use crate::ical::core::{
    Component, ComponentKind, ICalendar, Parameter, Period, Property, Value, parameter, property,
};

/// Serializes a full iCalendar document.
#[must_use]
pub fn serialize(ical: &ICalendar) -> String {
    serialize_component(&ical.root)
}

/// Serializes a single component (and its children) to folded content lines.
#[must_use]
pub fn serialize_component(component: &Component) -> String {
    let mut out = String::new();
    out.push_str(&fold_line(&format!("BEGIN:{}", component.name)));

    for p in ordered_properties(component) {
        out.push_str(&serialize_property(p));
    }

    for child in &component.children {
        out.push_str(&serialize_component(child));
    }

    out.push_str(&fold_line(&format!("END:{}", component.name)));
    out
}

/// Serializes a single property as a (possibly folded) content line.
#[must_use]
pub fn serialize_property(p: &Property) -> String {
    let mut line = p.name.clone();

    for param in implied_params(p).iter().chain(p.params.iter()) {
        line.push(';');
        line.push_str(&param.name);
        line.push('=');
        let values: Vec<String> = param.values.iter().map(|v| escape_param_value(v)).collect();
        line.push_str(&values.join(","));
    }

    line.push(':');
    line.push_str(&value_to_wire(&p.value));
    fold_line(&line)
}

/// Parameters implied by the value itself (TZID, VALUE=DATE) that
/// aren't already present on the property's own parameter list.
fn implied_params(p: &Property) -> Vec<Parameter> {
    let mut implied = Vec::new();

    if let Value::DateTime(dt) = &p.value
        && let Some(tzid) = dt.tzid()
        && p.param(parameter::names::TZID).is_none()
    {
        implied.push(Parameter::tzid(tzid));
    }

    if matches!(p.value, Value::Date(_) | Value::DateList(_)) && p.param(parameter::names::VALUE).is_none() {
        implied.push(Parameter::value_type("DATE"));
    }

    if matches!(p.value, Value::Binary(_)) && p.param(parameter::names::VALUE).is_none() {
        implied.push(Parameter::value_type("BINARY"));
        implied.push(Parameter::new(parameter::names::ENCODING, "BASE64"));
    }

    implied
}

fn value_to_wire(value: &Value) -> String {
    match value {
        Value::Text(s) => escape_text(s),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Value::Date(d) => d.to_string(),
        Value::DateList(list) => join_display(list),
        Value::DateTime(dt) => dt.to_string(),
        Value::DateTimeList(list) => join_display(list),
        Value::Time(t) => t.to_string(),
        Value::Duration(d) => d.to_string(),
        Value::Period(p) => period_to_wire(p),
        Value::PeriodList(list) => list.iter().map(period_to_wire).collect::<Vec<_>>().join(","),
        Value::Recur(r) => r.to_string(),
        Value::UtcOffset(o) => o.to_string(),
        Value::Uri(s) | Value::Unknown(s) => s.clone(),
        Value::Binary(data) => BASE64.encode(data),
    }
}

fn period_to_wire(p: &Period) -> String {
    match p {
        Period::Explicit { start, end } => format!("{start}/{end}"),
        Period::Duration { start, duration } => format!("{start}/{duration}"),
    }
}

fn join_display<T: std::fmt::Display>(items: &[T]) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
}

/// Canonical property order for a given component kind. Properties not
/// named here keep their original relative position, appended after the
/// known ones.
fn canonical_order(kind: Option<ComponentKind>) -> &'static [&'static str] {
    match kind {
        Some(ComponentKind::Calendar) => &[
            property::names::VERSION,
            property::names::PRODID,
            property::names::CALSCALE,
            property::names::METHOD,
        ],
        Some(ComponentKind::Event | ComponentKind::Todo | ComponentKind::Journal | ComponentKind::FreeBusy) => &[
            property::names::UID,
            property::names::DTSTAMP,
            property::names::DTSTART,
            property::names::DTEND,
            property::names::DUE,
            property::names::DURATION,
            property::names::RECURRENCE_ID,
            property::names::SEQUENCE,
            property::names::SUMMARY,
            property::names::DESCRIPTION,
            property::names::LOCATION,
            property::names::STATUS,
            property::names::CLASS,
            property::names::TRANSP,
            property::names::PRIORITY,
            property::names::PERCENT_COMPLETE,
            property::names::COMPLETED,
            property::names::CATEGORIES,
            property::names::ORGANIZER,
            property::names::ATTENDEE,
            property::names::URL,
            property::names::RELATED_TO,
            property::names::RRULE,
            property::names::EXRULE,
            property::names::RDATE,
            property::names::EXDATE,
            property::names::ATTACH,
            property::names::COMMENT,
            property::names::CONTACT,
            property::names::CREATED,
            property::names::LAST_MODIFIED,
        ],
        Some(ComponentKind::Timezone) => &[property::names::TZID, property::names::TZURL],
        Some(ComponentKind::Standard | ComponentKind::Daylight) => &[
            property::names::DTSTART,
            property::names::TZOFFSETFROM,
            property::names::TZOFFSETTO,
            property::names::TZNAME,
            property::names::RRULE,
            property::names::RDATE,
        ],
        Some(ComponentKind::Alarm) => &[
            property::names::ACTION,
            property::names::TRIGGER,
            property::names::DURATION,
            property::names::REPEAT,
            property::names::DESCRIPTION,
        ],
        Some(ComponentKind::Unknown) | None => &[],
    }
}

fn ordered_properties(component: &Component) -> Vec<&Property> {
    let order = canonical_order(component.kind);
    let rank = |name: &str| order.iter().position(|n| n.eq_ignore_ascii_case(name));

    let mut indexed: Vec<(usize, &Property)> = component.properties.iter().enumerate().collect();
    indexed.sort_by_key(|(original_index, p)| {
        (rank(&p.name).unwrap_or(order.len()), *original_index)
    });
    indexed.into_iter().map(|(_, p)| p).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ical::core::{DateTime, DateTimeForm};

    #[test]
    fn serialize_simple_text_property() {
        let p = Property::new("SUMMARY", Value::Text("Hello, world".into()), "");
        assert_eq!(serialize_property(&p), "SUMMARY:Hello\\, world\r\n");
    }

    #[test]
    fn serialize_zoned_datetime_adds_tzid_param() {
        let dt = DateTime {
            year: 2026,
            month: 1,
            day: 23,
            hour: 9,
            minute: 0,
            second: 0,
            form: DateTimeForm::Zoned { tzid: "America/New_York".into() },
        };
        let p = Property::new("DTSTART", Value::DateTime(dt), "");
        let line = serialize_property(&p);
        assert!(line.contains("TZID=America/New_York"));
        assert!(line.contains("20260123T090000"));
    }

    #[test]
    fn serialize_orders_known_properties_before_unknown() {
        let mut event = Component::event();
        event.add_property(Property::new("X-CUSTOM", Value::Text("v".into()), "v"));
        event.add_property(Property::new("SUMMARY", Value::Text("Title".into()), "Title"));
        event.add_property(Property::new("UID", Value::Text("a@b".into()), "a@b"));

        let out = serialize_component(&event);
        let uid_pos = out.find("UID:").unwrap();
        let summary_pos = out.find("SUMMARY:").unwrap();
        let custom_pos = out.find("X-CUSTOM:").unwrap();
        assert!(uid_pos < summary_pos);
        assert!(summary_pos < custom_pos);
    }

    #[test]
    fn serialize_long_line_folds() {
        let p = Property::new("DESCRIPTION", Value::Text("A".repeat(100)), "");
        let line = serialize_property(&p);
        assert!(line.contains("\r\n "));
    }
}
