//! iCalendar document parser (RFC 5545).
//!
//! Parses complete iCalendar documents, or a bare sub-component, into
//! typed structures.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::lexer::{parse_content_line, split_lines};
use super::values::{
    parse_boolean, parse_date, parse_datetime, parse_duration, parse_float, parse_integer,
    parse_period, parse_rrule, parse_utc_offset, unescape_text,
};
use crate::ical::core::{
    Component, ComponentKind, ContentLine, Date, DateTime, ICalendar, Period, Property, Value,
};

/// Parses a full iCalendar document from a string.
///
/// ## Errors
///
/// Returns an error if the input is not valid iCalendar or its root
/// component is not VCALENDAR.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse(input: &str) -> ParseResult<ICalendar> {
    tracing::debug!("parsing iCalendar document");

    let lines = split_lines(input);

    if lines.is_empty() {
        tracing::warn!("empty iCalendar input");
        return Err(ParseError::new(ParseErrorKind::MissingBegin, 1, 1));
    }

    tracing::trace!(count = lines.len(), "split content lines");

    let content_lines: Vec<(usize, ContentLine)> = lines
        .into_iter()
        .map(|(line_num, line)| parse_content_line(&line, line_num).map(|cl| (line_num, cl)))
        .collect::<ParseResult<_>>()?;

    let mut iter = content_lines.into_iter().peekable();
    let root = parse_component(&mut iter, None)?;

    if root.kind != Some(ComponentKind::Calendar) {
        tracing::warn!("root component is not VCALENDAR");
        return Err(
            ParseError::new(ParseErrorKind::MissingBegin, 1, 1).with_context("expected VCALENDAR")
        );
    }

    tracing::debug!("iCalendar document parsed successfully");
    Ok(ICalendar { root })
}

/// Parses a bare sub-component string (not wrapped in VCALENDAR), as
/// used by the single-incidence codec fast paths (§4.H).
///
/// ## Errors
/// Returns an error if the input is not a single well-formed component.
pub fn parse_component_str(input: &str) -> ParseResult<Component> {
    let lines = split_lines(input);
    if lines.is_empty() {
        return Err(ParseError::new(ParseErrorKind::MissingBegin, 1, 1));
    }
    let content_lines: Vec<(usize, ContentLine)> = lines
        .into_iter()
        .map(|(line_num, line)| parse_content_line(&line, line_num).map(|cl| (line_num, cl)))
        .collect::<ParseResult<_>>()?;
    let mut iter = content_lines.into_iter().peekable();
    parse_component(&mut iter, None)
}

fn parse_component(
    iter: &mut std::iter::Peekable<impl Iterator<Item = (usize, ContentLine)>>,
    expected_name: Option<&str>,
) -> ParseResult<Component> {
    let (line_num, begin_line) = iter
        .next()
        .ok_or_else(|| ParseError::new(ParseErrorKind::MissingBegin, 1, 1))?;

    if begin_line.name != "BEGIN" {
        return Err(ParseError::new(ParseErrorKind::MissingBegin, line_num, 1));
    }

    let component_name = begin_line.raw_value.to_ascii_uppercase();
    if let Some(expected) = expected_name
        && component_name != expected
    {
        return Err(
            ParseError::new(ParseErrorKind::MismatchedComponent, line_num, 1)
                .with_context(format!("expected {expected}, got {component_name}")),
        );
    }

    parse_component_body(iter, line_num, component_name)
}

fn parse_component_body(
    iter: &mut std::iter::Peekable<impl Iterator<Item = (usize, ContentLine)>>,
    begin_line_num: usize,
    component_name: String,
) -> ParseResult<Component> {
    let kind = ComponentKind::parse(&component_name);
    let mut component = Component {
        kind: Some(kind),
        name: component_name.clone(),
        properties: Vec::new(),
        children: Vec::new(),
    };

    let mut last_line_num = begin_line_num;

    loop {
        let Some((line_num, content_line)) = iter.next() else {
            return Err(ParseError::new(ParseErrorKind::MissingEnd, last_line_num, 1)
                .with_context(format!("missing END:{component_name}")));
        };
        last_line_num = line_num;

        match content_line.name.as_str() {
            "BEGIN" => {
                let nested_name = content_line.raw_value.to_ascii_uppercase();
                let nested = parse_component_body(iter, line_num, nested_name)?;
                component.children.push(nested);
            }
            "END" => {
                let end_name = content_line.raw_value.to_ascii_uppercase();
                if end_name != component_name {
                    return Err(
                        ParseError::new(ParseErrorKind::MismatchedComponent, line_num, 1)
                            .with_context(format!(
                                "expected END:{component_name}, got END:{end_name}"
                            )),
                    );
                }
                break;
            }
            _ => {
                let property = parse_property(content_line, line_num)?;
                component.properties.push(property);
            }
        }
    }

    Ok(component)
}

fn parse_property(cl: ContentLine, line_num: usize) -> ParseResult<Property> {
    let value_type = determine_value_type(&cl);
    let tzid = cl.tzid();
    let parsed_value = parse_value(&cl.raw_value, value_type, tzid, line_num)?;

    Ok(Property {
        name: cl.name,
        params: cl.params,
        value: parsed_value,
        raw_value: cl.raw_value,
    })
}

fn determine_value_type(cl: &ContentLine) -> ValueType {
    if let Some(value_type) = cl.value_type() {
        return ValueType::from_param(value_type);
    }

    match cl.name.as_str() {
        "DTSTART" | "DTEND" | "DTSTAMP" | "CREATED" | "LAST-MODIFIED" | "COMPLETED" | "DUE"
        | "RECURRENCE-ID" => ValueType::DateTime,

        "EXDATE" | "RDATE" => {
            if cl.raw_value.len() == 8 && !cl.raw_value.contains('T') {
                ValueType::Date
            } else if cl.raw_value.contains('/') {
                ValueType::Period
            } else {
                ValueType::DateTime
            }
        }

        "DURATION" | "TRIGGER" => {
            if cl.raw_value.starts_with('P')
                || cl.raw_value.starts_with('-')
                || cl.raw_value.starts_with('+')
            {
                ValueType::Duration
            } else {
                ValueType::DateTime
            }
        }

        "PERCENT-COMPLETE" | "PRIORITY" | "REPEAT" | "SEQUENCE" => ValueType::Integer,
        "RSVP" => ValueType::Boolean,
        "RRULE" | "EXRULE" => ValueType::Recur,
        "TZOFFSETFROM" | "TZOFFSETTO" => ValueType::UtcOffset,
        "URL" | "TZURL" | "SOURCE" => ValueType::Uri,
        "FREEBUSY" => ValueType::Period,
        "ATTENDEE" | "ORGANIZER" => ValueType::CalAddress,
        _ => ValueType::Text,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueType {
    Binary,
    Boolean,
    CalAddress,
    Date,
    DateTime,
    Duration,
    Float,
    Integer,
    Period,
    Recur,
    Text,
    Time,
    Uri,
    UtcOffset,
    Unknown,
}

impl ValueType {
    fn from_param(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "BINARY" => Self::Binary,
            "BOOLEAN" => Self::Boolean,
            "CAL-ADDRESS" => Self::CalAddress,
            "DATE" => Self::Date,
            "DATE-TIME" => Self::DateTime,
            "DURATION" => Self::Duration,
            "FLOAT" => Self::Float,
            "INTEGER" => Self::Integer,
            "PERIOD" => Self::Period,
            "RECUR" => Self::Recur,
            "TEXT" => Self::Text,
            "TIME" => Self::Time,
            "URI" => Self::Uri,
            "UTC-OFFSET" => Self::UtcOffset,
            _ => Self::Unknown,
        }
    }
}

fn parse_value(raw: &str, value_type: ValueType, tzid: Option<&str>, line_num: usize) -> ParseResult<Value> {
    match value_type {
        ValueType::Text => Ok(Value::Text(unescape_text(raw))),
        ValueType::DateTime => {
            if raw.contains(',') && !raw.contains('/') {
                let dts: Vec<DateTime> = raw
                    .split(',')
                    .map(|s| parse_datetime(s.trim(), tzid, line_num, 1))
                    .collect::<ParseResult<_>>()?;
                if dts.is_empty() {
                    Ok(Value::Unknown(raw.to_string()))
                } else {
                    Ok(Value::DateTimeList(dts))
                }
            } else {
                Ok(Value::DateTime(parse_datetime(raw, tzid, line_num, 1)?))
            }
        }
        ValueType::Date => {
            if raw.contains(',') {
                let dates: Vec<Date> = raw
                    .split(',')
                    .map(|s| parse_date(s.trim(), line_num, 1))
                    .collect::<ParseResult<_>>()?;
                if dates.is_empty() {
                    Ok(Value::Unknown(raw.to_string()))
                } else {
                    Ok(Value::DateList(dates))
                }
            } else {
                Ok(Value::Date(parse_date(raw, line_num, 1)?))
            }
        }
        ValueType::Duration => Ok(Value::Duration(parse_duration(raw, line_num, 1)?)),
        ValueType::Period => {
            if raw.contains(',') {
                let periods: Vec<Period> = raw
                    .split(',')
                    .map(|s| parse_period(s.trim(), tzid, line_num, 1))
                    .collect::<ParseResult<_>>()?;
                if periods.is_empty() {
                    Ok(Value::Unknown(raw.to_string()))
                } else {
                    Ok(Value::PeriodList(periods))
                }
            } else {
                Ok(Value::Period(parse_period(raw, tzid, line_num, 1)?))
            }
        }
        ValueType::Integer => Ok(Value::Integer(parse_integer(raw, line_num, 1)?)),
        ValueType::Float => Ok(Value::Float(parse_float(raw, line_num, 1)?)),
        ValueType::Boolean => Ok(Value::Boolean(parse_boolean(raw, line_num, 1)?)),
        ValueType::Recur => Ok(Value::Recur(Box::new(parse_rrule(raw, line_num, 1)?))),
        ValueType::UtcOffset => Ok(Value::UtcOffset(parse_utc_offset(raw, line_num, 1)?)),
        ValueType::Uri | ValueType::CalAddress => Ok(Value::Uri(raw.to_string())),
        ValueType::Binary => {
            use base64::{Engine, engine::general_purpose::STANDARD};
            let decoded = STANDARD.decode(raw).map_err(|e| {
                ParseError::new(ParseErrorKind::InvalidValue, line_num, 1)
                    .with_context(format!("invalid Base64 encoding: {e}"))
            })?;
            Ok(Value::Binary(decoded))
        }
        ValueType::Time => Ok(Value::Time(super::values::parse_time(raw, line_num, 1)?)),
        ValueType::Unknown => Ok(Value::Unknown(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_VEVENT: &str = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:test-uid-123@example.com\r\n\
DTSTAMP:20260123T120000Z\r\n\
DTSTART:20260123T140000Z\r\n\
DTEND:20260123T150000Z\r\n\
SUMMARY:Test Event\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn parse_simple_vevent() {
        let ical = parse(SIMPLE_VEVENT).unwrap();
        assert_eq!(ical.version(), Some("2.0"));
        let events = ical.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].uid(), Some("test-uid-123@example.com"));
        assert_eq!(events[0].summary(), Some("Test Event"));
    }

    #[test]
    fn parse_with_timezone() {
        let input = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:test@example.com\r\n\
DTSTAMP:20260123T120000Z\r\n\
DTSTART;TZID=America/New_York:20260123T090000\r\n\
SUMMARY:Morning Meeting\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";
        let ical = parse(input).unwrap();
        let event = &ical.events()[0];
        let dt = event.get_property("DTSTART").unwrap().as_datetime().unwrap();
        assert_eq!(dt.tzid(), Some("America/New_York"));
        assert_eq!(dt.hour, 9);
    }

    #[test]
    fn parse_with_rrule() {
        let input = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:recurring@example.com\r\n\
DTSTAMP:20260123T120000Z\r\n\
DTSTART:20260123T090000Z\r\n\
RRULE:FREQ=WEEKLY;BYDAY=MO,WE,FR;COUNT=10\r\n\
SUMMARY:Recurring Meeting\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";
        let ical = parse(input).unwrap();
        let rrule = ical.events()[0].get_property("RRULE").unwrap().value.as_recur().unwrap();
        assert_eq!(rrule.freq, Some(crate::ical::core::Frequency::Weekly));
        assert_eq!(rrule.count, Some(10));
        assert_eq!(rrule.by_day.len(), 3);
    }

    #[test]
    fn parse_multiple_events() {
        let input = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:event1@example.com\r\n\
DTSTAMP:20260123T120000Z\r\n\
DTSTART:20260123T090000Z\r\n\
SUMMARY:Event 1\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:event2@example.com\r\n\
DTSTAMP:20260123T120000Z\r\n\
DTSTART:20260124T090000Z\r\n\
SUMMARY:Event 2\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";
        let ical = parse(input).unwrap();
        assert_eq!(ical.events().len(), 2);
        assert_eq!(ical.uids(), vec!["event1@example.com", "event2@example.com"]);
    }

    #[test]
    fn parse_with_escaped_text() {
        let input = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:escaped@example.com\r\n\
DTSTAMP:20260123T120000Z\r\n\
DTSTART:20260123T090000Z\r\n\
SUMMARY:Meeting\\, important\r\n\
DESCRIPTION:Line 1\\nLine 2\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";
        let ical = parse(input).unwrap();
        let event = &ical.events()[0];
        assert_eq!(event.summary(), Some("Meeting, important"));
        assert_eq!(event.description(), Some("Line 1\nLine 2"));
    }

    #[test]
    fn parse_missing_begin() {
        assert!(parse("VERSION:2.0\r\n").is_err());
    }

    #[test]
    fn parse_mismatched_end() {
        let input = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VEVENT\r\n";
        assert!(parse(input).is_err());
    }

    #[test]
    fn parse_preserves_x_properties() {
        let input = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:xprop@example.com\r\n\
DTSTAMP:20260123T120000Z\r\n\
DTSTART:20260123T090000Z\r\n\
X-CUSTOM-PROP:Custom Value\r\n\
SUMMARY:Event\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";
        let ical = parse(input).unwrap();
        let x_custom = ical.events()[0].get_property("X-CUSTOM-PROP").unwrap();
        assert_eq!(x_custom.raw_value, "Custom Value");
    }

    #[test]
    fn parse_binary_base64() {
        let input = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:binary-test@example.com\r\n\
DTSTAMP:20260123T120000Z\r\n\
DTSTART:20260123T140000Z\r\n\
ATTACH;ENCODING=BASE64;VALUE=BINARY:SGVsbG8gV29ybGQ=\r\n\
SUMMARY:Binary Test\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";
        let ical = parse(input).unwrap();
        let attach = ical.events()[0].get_property("ATTACH").unwrap();
        match &attach.value {
            Value::Binary(data) => assert_eq!(data, b"Hello World"),
            other => panic!("expected Binary, got {other:?}"),
        }
    }
}
