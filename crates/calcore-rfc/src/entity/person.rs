//! A named, optionally-addressed participant (§3 Attendee, §4.F).

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Person {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Person {
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self { name: Some(name.into()), email: Some(email.into()) }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.as_deref().is_none_or(str::is_empty) && self.email.as_deref().is_none_or(str::is_empty)
    }

    /// `"Name <email>"`, or just whichever half is present.
    #[must_use]
    pub fn full_name(&self) -> String {
        match (&self.name, &self.email) {
            (Some(name), Some(email)) if !name.is_empty() => format!("{name} <{email}>"),
            (Some(name), None) => name.clone(),
            (_, Some(email)) => email.clone(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_combines_name_and_email() {
        let p = Person::new("Ada Lovelace", "ada@example.com");
        assert_eq!(p.full_name(), "Ada Lovelace <ada@example.com>");
    }

    #[test]
    fn email_only_has_no_angle_brackets() {
        let p = Person { name: None, email: Some("ada@example.com".to_string()) };
        assert_eq!(p.full_name(), "ada@example.com");
    }

    #[test]
    fn default_person_is_empty() {
        assert!(Person::default().is_empty());
    }
}
