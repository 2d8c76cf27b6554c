//! Content lines and properties (RFC 5545 §3.1/§3.5/§3.6/§3.7/§3.8).

use super::parameter::{self, Parameter};
use super::value::Value;

/// A raw, unfolded content line before its value has been interpreted
/// according to a VALUE type: `NAME;PARAM=V;...:raw-value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    pub name: String,
    pub params: Vec<Parameter>,
    pub raw_value: String,
}

impl ContentLine {
    #[must_use]
    pub fn new(name: impl Into<String>, raw_value: impl Into<String>) -> Self {
        Self { name: name.into(), params: Vec::new(), raw_value: raw_value.into() }
    }

    #[must_use]
    pub fn with_params(mut self, params: Vec<Parameter>) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        self.param(parameter::names::TZID).and_then(Parameter::value)
    }

    #[must_use]
    pub fn value_type(&self) -> Option<&str> {
        self.param(parameter::names::VALUE).and_then(Parameter::value)
    }
}

/// A property whose raw value has been parsed into a typed [`Value`].
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub params: Vec<Parameter>,
    pub value: Value,
    pub raw_value: String,
}

impl Property {
    #[must_use]
    pub fn new(name: impl Into<String>, value: Value, raw_value: impl Into<String>) -> Self {
        Self { name: name.into(), params: Vec::new(), value, raw_value: raw_value.into() }
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.value.as_text()
    }

    #[must_use]
    pub fn as_datetime(&self) -> Option<&super::datetime::DateTime> {
        self.value.as_datetime()
    }

    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.name.starts_with("X-")
    }

    #[must_use]
    pub fn is_volatile(&self) -> bool {
        self.name.starts_with("VOLATILE-")
    }
}

/// RFC 5545 property-name string constants.
pub mod names {
    pub const BEGIN: &str = "BEGIN";
    pub const END: &str = "END";
    pub const PRODID: &str = "PRODID";
    pub const VERSION: &str = "VERSION";
    pub const CALSCALE: &str = "CALSCALE";
    pub const METHOD: &str = "METHOD";

    pub const UID: &str = "UID";
    pub const DTSTAMP: &str = "DTSTAMP";
    pub const DTSTART: &str = "DTSTART";
    pub const DTEND: &str = "DTEND";
    pub const DUE: &str = "DUE";
    pub const DURATION: &str = "DURATION";
    pub const COMPLETED: &str = "COMPLETED";
    pub const PERCENT_COMPLETE: &str = "PERCENT-COMPLETE";
    pub const CREATED: &str = "CREATED";
    pub const LAST_MODIFIED: &str = "LAST-MODIFIED";
    pub const SUMMARY: &str = "SUMMARY";
    pub const DESCRIPTION: &str = "DESCRIPTION";
    pub const LOCATION: &str = "LOCATION";
    pub const STATUS: &str = "STATUS";
    pub const TRANSP: &str = "TRANSP";
    pub const SEQUENCE: &str = "SEQUENCE";
    pub const PRIORITY: &str = "PRIORITY";
    pub const CLASS: &str = "CLASS";
    pub const CATEGORIES: &str = "CATEGORIES";
    pub const URL: &str = "URL";
    pub const RELATED_TO: &str = "RELATED-TO";
    pub const ORGANIZER: &str = "ORGANIZER";
    pub const ATTENDEE: &str = "ATTENDEE";
    pub const ATTACH: &str = "ATTACH";
    pub const COMMENT: &str = "COMMENT";
    pub const CONTACT: &str = "CONTACT";
    pub const RECURRENCE_ID: &str = "RECURRENCE-ID";

    pub const RRULE: &str = "RRULE";
    pub const EXRULE: &str = "EXRULE";
    pub const RDATE: &str = "RDATE";
    pub const EXDATE: &str = "EXDATE";

    pub const FREEBUSY: &str = "FREEBUSY";

    pub const ACTION: &str = "ACTION";
    pub const TRIGGER: &str = "TRIGGER";
    pub const REPEAT: &str = "REPEAT";

    pub const TZID: &str = "TZID";
    pub const TZURL: &str = "TZURL";
    pub const TZOFFSETFROM: &str = "TZOFFSETFROM";
    pub const TZOFFSETTO: &str = "TZOFFSETTO";
    pub const TZNAME: &str = "TZNAME";

    pub const X_KDE_ICAL_IMPLEMENTATION_VERSION: &str = "X-KDE-ICAL-IMPLEMENTATION-VERSION";
    pub const X_LIC_LOCATION: &str = "X-LIC-LOCATION";
}
