//! iTIP scheduling classifier (§4.I): reads a METHOD off an incoming
//! calendar component and classifies it against a reference calendar.

use crate::calendar::CalendarIndex;
use crate::entity::Incidence;
use crate::error::{ParseErrorKind, RfcError, RfcResult};
use crate::model::{Instant, TimeSpec};

/// RFC 5546 iTIP method. Wire strings are hyphenated exactly as RFC
/// 5546 spells them (`DECLINE-COUNTER`, not `DECLINECOUNTER`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItipMethod {
    Publish,
    Request,
    Refresh,
    Cancel,
    Add,
    Reply,
    Counter,
    DeclineCounter,
}

impl ItipMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Publish => "PUBLISH",
            Self::Request => "REQUEST",
            Self::Refresh => "REFRESH",
            Self::Cancel => "CANCEL",
            Self::Add => "ADD",
            Self::Reply => "REPLY",
            Self::Counter => "COUNTER",
            Self::DeclineCounter => "DECLINE-COUNTER",
        }
    }

    /// Parses a wire METHOD string. Unknown methods are a parse error
    /// (§4.I); an absent METHOD property is a distinct `None` case,
    /// handled by the caller before this parse is attempted.
    ///
    /// ## Errors
    /// Returns [`ParseErrorKind::MethodProperty`] if `s` is not one of
    /// the eight recognized iTIP methods.
    pub fn parse(s: &str) -> Result<Self, ParseErrorKind> {
        match s.to_ascii_uppercase().as_str() {
            "PUBLISH" => Ok(Self::Publish),
            "REQUEST" => Ok(Self::Request),
            "REFRESH" => Ok(Self::Refresh),
            "CANCEL" => Ok(Self::Cancel),
            "ADD" => Ok(Self::Add),
            "REPLY" => Ok(Self::Reply),
            "COUNTER" => Ok(Self::Counter),
            "DECLINE-COUNTER" => Ok(Self::DeclineCounter),
            _ => Err(ParseErrorKind::MethodProperty),
        }
    }
}

impl std::fmt::Display for ItipMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The logical classification of an incoming iTIP message against a
/// reference calendar (§4.I).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    PublishNew,
    PublishUpdate,
    Obsolete,
    RequestNew,
    RequestUpdate,
    Unknown,
}

/// Classifies `incoming` (already matched to its iTIP method) against
/// whatever incidence of the same UID `reference` already holds.
///
/// An update is one whose sequence number is not lower than the
/// existing instance's, or whose `lastModified` is not older — either
/// signal winning is enough to call it current rather than stale.
#[must_use]
pub fn classify(method: ItipMethod, incoming: &Incidence, reference: &CalendarIndex) -> Classification {
    let id = incoming.instance_identifier();
    let existing = reference.get(&id);

    match method {
        ItipMethod::Publish => match existing {
            None => Classification::PublishNew,
            Some(current) if is_update(incoming, current) => Classification::PublishUpdate,
            Some(_) => Classification::Obsolete,
        },
        ItipMethod::Request | ItipMethod::Counter => match existing {
            None => Classification::RequestNew,
            Some(current) if is_update(incoming, current) => Classification::RequestUpdate,
            Some(_) => Classification::Obsolete,
        },
        ItipMethod::Cancel => {
            if existing.is_some() {
                Classification::Obsolete
            } else {
                Classification::Unknown
            }
        }
        ItipMethod::Refresh | ItipMethod::Add | ItipMethod::Reply | ItipMethod::DeclineCounter => Classification::Unknown,
    }
}

fn is_update(incoming: &Incidence, current: &Incidence) -> bool {
    let a = incoming.base();
    let b = current.base();
    if a.sequence != b.sequence {
        return a.sequence > b.sequence;
    }
    match (&a.last_modified, &b.last_modified) {
        (Some(new), Some(old)) => new.civil_seconds() >= old.civil_seconds(),
        (Some(_), None) => true,
        _ => false,
    }
}

/// Prepares `incidence` for outgoing transport (§4.I): non-recurring
/// instants are normalized to UTC (cross-DST safe over the wire), and
/// if the incidence carries a distinct scheduling id the wire copy's
/// uid is swapped to it (the local store keeps the original uid).
#[must_use]
pub fn prepare_outgoing(mut incidence: Incidence, resolver: &dyn crate::model::ZoneResolver) -> Incidence {
    let recurring = incidence.base().is_recurring();
    let base = incidence.base_mut();
    if !recurring {
        if let Some(dt_start) = base.dt_start.take() {
            base.dt_start = Some(to_utc(&dt_start, resolver));
        }
    }
    if let Some(scheduling_id) = base.scheduling_id.clone() {
        base.uid = scheduling_id;
    }
    incidence
}

fn to_utc(instant: &Instant, resolver: &dyn crate::model::ZoneResolver) -> Instant {
    instant.to_time_spec(TimeSpec::Utc, resolver)
}

/// Reads the METHOD off a parsed iTIP component and extracts its
/// single contained incidence, or fails per §7's parse-error taxonomy.
///
/// ## Errors
/// - [`RfcError::ParseError`] wrapping [`ParseErrorKind::EmptyMessage`] if no incidence is attached.
/// - [`RfcError::ParseError`] wrapping [`ParseErrorKind::MethodProperty`] if METHOD is absent or unrecognized.
pub fn extract(method_str: Option<&str>, incidence: Option<Incidence>) -> RfcResult<(ItipMethod, Incidence)> {
    let method_str = method_str.ok_or(RfcError::ParseError(ParseErrorKind::MethodProperty))?;
    let method = ItipMethod::parse(method_str).map_err(RfcError::ParseError)?;
    let incidence = incidence.ok_or(RfcError::ParseError(ParseErrorKind::EmptyMessage))?;
    Ok((method, incidence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Event, IncidenceBase};
    use crate::model::{Date, Time, TrivialResolver};

    fn event(uid: &str, sequence: u32) -> Incidence {
        let mut base = IncidenceBase::new(uid);
        base.sequence = sequence;
        base.dt_start = Some(Instant::new(Date::from_ymd(2026, 1, 1).unwrap(), Time::new(9, 0, 0).unwrap(), TimeSpec::Utc));
        Incidence::Event(Event { base, ..Event::default() })
    }

    #[test]
    fn method_round_trips_hyphenated_decline_counter() {
        assert_eq!(ItipMethod::parse("DECLINE-COUNTER").unwrap(), ItipMethod::DeclineCounter);
        assert_eq!(ItipMethod::DeclineCounter.as_str(), "DECLINE-COUNTER");
    }

    #[test]
    fn unrecognized_method_is_a_parse_error() {
        assert!(ItipMethod::parse("DECLINECOUNTER").is_err());
    }

    #[test]
    fn publish_of_unknown_uid_is_new() {
        let calendar = CalendarIndex::new(false);
        let incoming = event("new@b", 0);
        assert_eq!(classify(ItipMethod::Publish, &incoming, &calendar), Classification::PublishNew);
    }

    #[test]
    fn request_with_higher_sequence_is_an_update() {
        let mut calendar = CalendarIndex::new(false);
        let now = Instant::new(Date::from_ymd(2026, 1, 1).unwrap(), Time::new(9, 0, 0).unwrap(), TimeSpec::Utc);
        calendar.upsert(event("a@b", 1), now.clone());
        let incoming = event("a@b", 2);
        assert_eq!(classify(ItipMethod::Request, &incoming, &calendar), Classification::RequestUpdate);
    }

    #[test]
    fn request_with_stale_sequence_is_obsolete() {
        let mut calendar = CalendarIndex::new(false);
        let now = Instant::new(Date::from_ymd(2026, 1, 1).unwrap(), Time::new(9, 0, 0).unwrap(), TimeSpec::Utc);
        calendar.upsert(event("a@b", 5), now.clone());
        let incoming = event("a@b", 1);
        assert_eq!(classify(ItipMethod::Request, &incoming, &calendar), Classification::Obsolete);
    }

    #[test]
    fn prepare_outgoing_swaps_to_scheduling_id() {
        let mut incidence = event("local-uid", 0);
        incidence.base_mut().scheduling_id = Some("wire-uid".to_string());
        let prepared = prepare_outgoing(incidence, &TrivialResolver);
        assert_eq!(prepared.base().uid, "wire-uid");
    }
}
