//! Property parameters (RFC 5545 §3.2): `NAME=value[,value...]`.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub values: Vec<String>,
}

impl Parameter {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), values: vec![value.into()] }
    }

    #[must_use]
    pub fn with_values(name: impl Into<String>, values: Vec<String>) -> Self {
        Self { name: name.into(), values }
    }

    #[must_use]
    pub fn tzid(tzid: impl Into<String>) -> Self {
        Self::new("TZID", tzid)
    }

    #[must_use]
    pub fn value_type(value_type: impl Into<String>) -> Self {
        Self::new("VALUE", value_type)
    }

    /// The single value, when the parameter is not a multi-valued list.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

pub mod names {
    pub const TZID: &str = "TZID";
    pub const VALUE: &str = "VALUE";
    pub const ALTREP: &str = "ALTREP";
    pub const CN: &str = "CN";
    pub const CUTYPE: &str = "CUTYPE";
    pub const DELEGATED_FROM: &str = "DELEGATED-FROM";
    pub const DELEGATED_TO: &str = "DELEGATED-TO";
    pub const DIR: &str = "DIR";
    pub const ENCODING: &str = "ENCODING";
    pub const FMTTYPE: &str = "FMTTYPE";
    pub const FBTYPE: &str = "FBTYPE";
    pub const LANGUAGE: &str = "LANGUAGE";
    pub const MEMBER: &str = "MEMBER";
    pub const PARTSTAT: &str = "PARTSTAT";
    pub const RANGE: &str = "RANGE";
    pub const RELATED: &str = "RELATED";
    pub const RELTYPE: &str = "RELTYPE";
    pub const ROLE: &str = "ROLE";
    pub const RSVP: &str = "RSVP";
    pub const SENT_BY: &str = "SENT-BY";
}
