//! A zone phase (§4.C): the `(utcOffset, isDst, abbreviations, comment)`
//! tuple describing a zone's behavior between two transitions.

/// `STANDARD` or `DAYLIGHT`, mirroring the VTIMEZONE sub-component kind
/// that produced this phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Standard,
    Daylight,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    pub offset_seconds: i32,
    pub kind: PhaseKind,
    pub abbreviations: Vec<String>,
    pub comment: Option<String>,
}

impl Phase {
    #[must_use]
    pub fn is_dst(&self) -> bool {
        matches!(self.kind, PhaseKind::Daylight)
    }
}

/// Windows/Outlook placeholder TZNAME strings that carry no information
/// and are dropped rather than kept as an abbreviation (§4.C step 2).
const USELESS_TZNAMES: [&str; 2] = ["Standard Time", "Daylight Time"];

#[must_use]
pub fn is_useless_tzname(name: &str) -> bool {
    USELESS_TZNAMES.iter().any(|w| w.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn useless_tzname_detection() {
        assert!(is_useless_tzname("Standard Time"));
        assert!(is_useless_tzname("daylight time"));
        assert!(!is_useless_tzname("EST"));
    }

    #[test]
    fn phase_equality_ignores_nothing_but_is_structural() {
        let a = Phase { offset_seconds: -18_000, kind: PhaseKind::Standard, abbreviations: vec!["EST".into()], comment: None };
        let b = a.clone();
        assert_eq!(a, b);
    }
}
