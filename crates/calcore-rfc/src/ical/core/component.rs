//! The component tree (RFC 5545 §3.6): VCALENDAR and its nested
//! VEVENT/VTODO/VJOURNAL/VFREEBUSY/VTIMEZONE/VALARM components.

use super::property::{Property, names};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Calendar,
    Event,
    Todo,
    Journal,
    FreeBusy,
    Timezone,
    Alarm,
    Standard,
    Daylight,
    Unknown,
}

impl ComponentKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Calendar => "VCALENDAR",
            Self::Event => "VEVENT",
            Self::Todo => "VTODO",
            Self::Journal => "VJOURNAL",
            Self::FreeBusy => "VFREEBUSY",
            Self::Timezone => "VTIMEZONE",
            Self::Alarm => "VALARM",
            Self::Standard => "STANDARD",
            Self::Daylight => "DAYLIGHT",
            Self::Unknown => "UNKNOWN",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "VCALENDAR" => Self::Calendar,
            "VEVENT" => Self::Event,
            "VTODO" => Self::Todo,
            "VJOURNAL" => Self::Journal,
            "VFREEBUSY" => Self::FreeBusy,
            "VTIMEZONE" => Self::Timezone,
            "VALARM" => Self::Alarm,
            "STANDARD" => Self::Standard,
            "DAYLIGHT" => Self::Daylight,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn can_have_children(self) -> bool {
        matches!(self, Self::Calendar | Self::Event | Self::Todo | Self::Timezone)
    }

    #[must_use]
    pub fn is_schedulable(self) -> bool {
        matches!(self, Self::Event | Self::Todo | Self::Journal | Self::FreeBusy)
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub kind: Option<ComponentKind>,
    pub name: String,
    pub properties: Vec<Property>,
    pub children: Vec<Component>,
}

impl Component {
    #[must_use]
    pub fn new(kind: ComponentKind) -> Self {
        Self { kind: Some(kind), name: kind.as_str().to_string(), properties: Vec::new(), children: Vec::new() }
    }

    #[must_use]
    pub fn calendar() -> Self {
        Self::new(ComponentKind::Calendar)
    }

    #[must_use]
    pub fn event() -> Self {
        Self::new(ComponentKind::Event)
    }

    #[must_use]
    pub fn todo() -> Self {
        Self::new(ComponentKind::Todo)
    }

    #[must_use]
    pub fn journal() -> Self {
        Self::new(ComponentKind::Journal)
    }

    #[must_use]
    pub fn freebusy() -> Self {
        Self::new(ComponentKind::FreeBusy)
    }

    #[must_use]
    pub fn timezone() -> Self {
        Self::new(ComponentKind::Timezone)
    }

    #[must_use]
    pub fn alarm() -> Self {
        Self::new(ComponentKind::Alarm)
    }

    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        let name = name.into();
        Self { kind: Some(ComponentKind::parse(&name)), name, properties: Vec::new(), children: Vec::new() }
    }

    pub fn add_property(&mut self, property: Property) -> &mut Self {
        self.properties.push(property);
        self
    }

    pub fn add_child(&mut self, child: Component) -> &mut Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn get_property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn get_properties(&self, name: &str) -> Vec<&Property> {
        self.properties.iter().filter(|p| p.name.eq_ignore_ascii_case(name)).collect()
    }

    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.get_property(names::UID).and_then(Property::as_text)
    }

    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.get_property(names::SUMMARY).and_then(Property::as_text)
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.get_property(names::DESCRIPTION).and_then(Property::as_text)
    }

    #[must_use]
    pub fn children_of_kind(&self, kind: ComponentKind) -> Vec<&Component> {
        self.children.iter().filter(|c| c.kind == Some(kind)).collect()
    }

    #[must_use]
    pub fn events(&self) -> Vec<&Component> {
        self.children_of_kind(ComponentKind::Event)
    }

    #[must_use]
    pub fn todos(&self) -> Vec<&Component> {
        self.children_of_kind(ComponentKind::Todo)
    }

    #[must_use]
    pub fn journals(&self) -> Vec<&Component> {
        self.children_of_kind(ComponentKind::Journal)
    }

    #[must_use]
    pub fn freebusys(&self) -> Vec<&Component> {
        self.children_of_kind(ComponentKind::FreeBusy)
    }

    #[must_use]
    pub fn timezones(&self) -> Vec<&Component> {
        self.children_of_kind(ComponentKind::Timezone)
    }

    #[must_use]
    pub fn alarms(&self) -> Vec<&Component> {
        self.children_of_kind(ComponentKind::Alarm)
    }
}

/// The parsed top-level document: a VCALENDAR root plus its children.
#[derive(Debug, Clone, PartialEq)]
pub struct ICalendar {
    pub root: Component,
}

/// Default PRODID stamped on calendars built programmatically; callers
/// that decoded a calendar from text keep whatever PRODID it carried.
pub const DEFAULT_PRODID: &str = "-//calcore//calcore-rfc//EN";

impl ICalendar {
    #[must_use]
    pub fn new(prodid: impl Into<String>) -> Self {
        let mut root = Component::calendar();
        root.add_property(Property::new(
            names::PRODID,
            super::value::Value::Text(prodid.into()),
            "",
        ));
        root.add_property(Property::new(names::VERSION, super::value::Value::Text("2.0".into()), "2.0"));
        Self { root }
    }

    #[must_use]
    pub fn prodid(&self) -> Option<&str> {
        self.root.get_property(names::PRODID).and_then(Property::as_text)
    }

    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.root.get_property(names::VERSION).and_then(Property::as_text)
    }

    #[must_use]
    pub fn calscale(&self) -> Option<&str> {
        self.root.get_property(names::CALSCALE).and_then(Property::as_text)
    }

    #[must_use]
    pub fn method(&self) -> Option<&str> {
        self.root.get_property(names::METHOD).and_then(Property::as_text)
    }

    pub fn add_event(&mut self, event: Component) -> &mut Self {
        self.root.add_child(event);
        self
    }

    pub fn add_todo(&mut self, todo: Component) -> &mut Self {
        self.root.add_child(todo);
        self
    }

    pub fn add_journal(&mut self, journal: Component) -> &mut Self {
        self.root.add_child(journal);
        self
    }

    pub fn add_timezone(&mut self, timezone: Component) -> &mut Self {
        self.root.add_child(timezone);
        self
    }

    #[must_use]
    pub fn events(&self) -> Vec<&Component> {
        self.root.events()
    }

    #[must_use]
    pub fn todos(&self) -> Vec<&Component> {
        self.root.todos()
    }

    #[must_use]
    pub fn journals(&self) -> Vec<&Component> {
        self.root.journals()
    }

    #[must_use]
    pub fn freebusy(&self) -> Vec<&Component> {
        self.root.freebusys()
    }

    #[must_use]
    pub fn timezones(&self) -> Vec<&Component> {
        self.root.timezones()
    }

    #[must_use]
    pub fn uids(&self) -> Vec<&str> {
        self.root
            .children
            .iter()
            .filter_map(Component::uid)
            .collect()
    }
}

impl Default for ICalendar {
    fn default() -> Self {
        Self::new(DEFAULT_PRODID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_calendar_has_version_and_prodid() {
        let cal = ICalendar::default();
        assert_eq!(cal.version(), Some("2.0"));
        assert_eq!(cal.prodid(), Some(DEFAULT_PRODID));
    }

    #[test]
    fn add_event_is_discoverable() {
        let mut cal = ICalendar::default();
        let mut event = Component::event();
        event.add_property(Property::new(names::UID, super::super::value::Value::Text("a@b".into()), "a@b"));
        cal.add_event(event);
        assert_eq!(cal.uids(), vec!["a@b"]);
        assert_eq!(cal.events().len(), 1);
    }
}
