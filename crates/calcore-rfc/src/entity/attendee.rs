//! Attendee role/status enums and the `Attendee` record (§4.F).
//!
//! Wire strings are RFC 5545 §3.2 canonical forms; these are what the
//! codec reads and writes, never a localized display string.

use super::custom_properties::CustomProperties;
use super::person::Person;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    ReqParticipant,
    OptParticipant,
    NonParticipant,
    Chair,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReqParticipant => "REQ-PARTICIPANT",
            Self::OptParticipant => "OPT-PARTICIPANT",
            Self::NonParticipant => "NON-PARTICIPANT",
            Self::Chair => "CHAIR",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "OPT-PARTICIPANT" => Self::OptParticipant,
            "NON-PARTICIPANT" => Self::NonParticipant,
            "CHAIR" => Self::Chair,
            _ => Self::ReqParticipant,
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::ReqParticipant
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartStat {
    NeedsAction,
    Accepted,
    Declined,
    Tentative,
    Delegated,
    Completed,
    InProcess,
}

impl PartStat {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NeedsAction => "NEEDS-ACTION",
            Self::Accepted => "ACCEPTED",
            Self::Declined => "DECLINED",
            Self::Tentative => "TENTATIVE",
            Self::Delegated => "DELEGATED",
            Self::Completed => "COMPLETED",
            Self::InProcess => "IN-PROCESS",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "ACCEPTED" => Self::Accepted,
            "DECLINED" => Self::Declined,
            "TENTATIVE" => Self::Tentative,
            "DELEGATED" => Self::Delegated,
            "COMPLETED" => Self::Completed,
            "IN-PROCESS" => Self::InProcess,
            _ => Self::NeedsAction,
        }
    }
}

impl Default for PartStat {
    fn default() -> Self {
        Self::NeedsAction
    }
}

impl std::fmt::Display for PartStat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar-user type (RFC 5545 §3.2.3). `Unknown` keeps the raw string
/// for an `X-`-prefixed or otherwise non-standard CUTYPE.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CuType {
    Individual,
    Group,
    Resource,
    Room,
    Unknown(String),
}

impl CuType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Individual => "INDIVIDUAL",
            Self::Group => "GROUP",
            Self::Resource => "RESOURCE",
            Self::Room => "ROOM",
            Self::Unknown(raw) => raw,
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "INDIVIDUAL" => Self::Individual,
            "GROUP" => Self::Group,
            "RESOURCE" => Self::Resource,
            "ROOM" => Self::Room,
            _ => Self::Unknown(s.to_string()),
        }
    }
}

impl Default for CuType {
    fn default() -> Self {
        Self::Individual
    }
}

impl std::fmt::Display for CuType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attendee {
    pub person: Person,
    pub rsvp: bool,
    pub role: Role,
    pub part_stat: PartStat,
    pub uid: Option<String>,
    pub delegate: Option<String>,
    pub delegator: Option<String>,
    pub cu_type: CuType,
    pub custom_properties: CustomProperties,
}

impl Attendee {
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self { person: Person::new(name, email), ..Self::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_canonical_string() {
        for role in [Role::ReqParticipant, Role::OptParticipant, Role::NonParticipant, Role::Chair] {
            assert_eq!(Role::parse(role.as_str()), role);
        }
    }

    #[test]
    fn part_stat_round_trips_canonical_string() {
        for stat in [
            PartStat::NeedsAction,
            PartStat::Accepted,
            PartStat::Declined,
            PartStat::Tentative,
            PartStat::Delegated,
            PartStat::Completed,
            PartStat::InProcess,
        ] {
            assert_eq!(PartStat::parse(stat.as_str()), stat);
        }
    }

    #[test]
    fn cutype_keeps_unknown_raw_string() {
        let cu = CuType::parse("X-FLOCK");
        assert_eq!(cu, CuType::Unknown("X-FLOCK".to_string()));
        assert_eq!(cu.as_str(), "X-FLOCK");
    }

    #[test]
    fn new_attendee_defaults_to_needs_action() {
        let a = Attendee::new("Ada", "ada@example.com");
        assert_eq!(a.part_stat, PartStat::NeedsAction);
        assert_eq!(a.role, Role::ReqParticipant);
    }
}
