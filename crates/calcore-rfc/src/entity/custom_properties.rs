//! Arbitrary `X-`-prefixed (and other non-standard) property passthrough
//! (§4.F). Observers are notified after every change, mirroring
//! [`crate::recurrence::Aggregator`]'s `on_dirty` hook.

use std::collections::BTreeMap;

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[derive(Default)]
pub struct CustomProperties {
    values: BTreeMap<String, String>,
    observers: Vec<Box<dyn Fn()>>,
}

impl std::fmt::Debug for CustomProperties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomProperties").field("values", &self.values).finish_non_exhaustive()
    }
}

impl Clone for CustomProperties {
    fn clone(&self) -> Self {
        Self { values: self.values.clone(), observers: Vec::new() }
    }
}

impl PartialEq for CustomProperties {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl CustomProperties {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_change(&mut self, observer: Box<dyn Fn()>) {
        self.observers.push(observer);
    }

    fn notify(&self) {
        for observer in &self.observers {
            observer();
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Sets `name` to `value`; an empty value deletes the entry instead.
    /// Invalid names (outside `[A-Za-z0-9-]`) are ignored with a warning.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if !is_valid_name(&name) {
            tracing::warn!(name, "ignoring custom property with an invalid name");
            return;
        }
        let value = value.into();
        if value.is_empty() {
            self.values.remove(&name);
        } else {
            self.values.insert(name, value);
        }
        self.notify();
    }

    pub fn remove(&mut self, name: &str) {
        if self.values.remove(name).is_some() {
            self.notify();
        }
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// App-scoped accessor for names of the form `X-<APP>-<KEY>`.
    #[must_use]
    pub fn app_property(&self, app: &str, key: &str) -> Option<&str> {
        self.get(&format!("X-{app}-{key}"))
    }

    pub fn set_app_property(&mut self, app: &str, key: &str, value: impl Into<String>) {
        self.set(format!("X-{app}-{key}"), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_value_deletes_the_entry() {
        let mut props = CustomProperties::new();
        props.set("X-FOO", "bar");
        assert_eq!(props.get("X-FOO"), Some("bar"));
        props.set("X-FOO", "");
        assert_eq!(props.get("X-FOO"), None);
    }

    #[test]
    fn invalid_name_is_ignored() {
        let mut props = CustomProperties::new();
        props.set("has space", "x");
        assert_eq!(props.get("has space"), None);
    }

    #[test]
    fn app_scoped_accessor_reads_what_it_wrote() {
        let mut props = CustomProperties::new();
        props.set_app_property("KDE", "TEST", "1");
        assert_eq!(props.app_property("KDE", "TEST"), Some("1"));
        assert_eq!(props.get("X-KDE-TEST"), Some("1"));
    }

    #[test]
    fn change_notifies_observer() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let count = Arc::new(AtomicUsize::new(0));
        let counted = count.clone();
        let mut props = CustomProperties::new();
        props.on_change(Box::new(move || {
            counted.fetch_add(1, Ordering::SeqCst);
        }));
        props.set("X-A", "1");
        props.set("X-A", "2");
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
