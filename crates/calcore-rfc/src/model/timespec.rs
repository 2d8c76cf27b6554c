//! Time-spec: what zone, if any, governs an instant's civil fields.

/// One of {UTC, fixed offset, named zone, floating/clock}.
///
/// `NamedZone` carries only the TZID; resolving it to an offset requires
/// a `ZoneCollection` (see [`crate::timezone`]), which is why `Instant`
/// cannot implement a context-free `Ord` — invariant I1 in the data
/// model requires normalizing through the time-spec first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimeSpec {
    Utc,
    FixedOffset(i32),
    NamedZone(String),
    Floating,
}

impl TimeSpec {
    #[must_use]
    pub fn is_utc(&self) -> bool {
        matches!(self, Self::Utc)
    }

    #[must_use]
    pub fn is_floating(&self) -> bool {
        matches!(self, Self::Floating)
    }

    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match self {
            Self::NamedZone(tzid) => Some(tzid),
            _ => None,
        }
    }
}

impl std::fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Utc => write!(f, "UTC"),
            Self::FixedOffset(secs) => {
                let sign = if *secs < 0 { '-' } else { '+' };
                let abs = secs.unsigned_abs();
                write!(f, "{sign}{:02}{:02}", abs / 3600, (abs % 3600) / 60)
            }
            Self::NamedZone(tzid) => write!(f, "TZID={tzid}"),
            Self::Floating => write!(f, "FLOATING"),
        }
    }
}
