//! Ordered, duplicate-free attribute names.

use crate::error::Error;

/// The names a configuration declares, in declaration order.
///
/// No name appears twice. Lookups are linear; declarations are small.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    names: Vec<String>,
}

impl AttributeSet {
    /// Collects `names`, keeping the first occurrence of each.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for name in names {
            set.insert(name.into());
        }
        set
    }

    /// Positional names followed by default keys, first-seen order.
    ///
    /// Default keys are declarations in their own right: a name that only
    /// appears as a default key still becomes an attribute.
    ///
    /// ```rust
    /// use configurable::AttributeSet;
    ///
    /// let set = AttributeSet::union(["title", "country"], ["name", "title"]);
    /// assert_eq!(set.names(), ["title", "country", "name"]);
    /// ```
    pub fn union<P, D, S, T>(positional: P, default_keys: D) -> Self
    where
        P: IntoIterator<Item = S>,
        D: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        let mut set = Self::new(positional);
        for name in default_keys {
            set.insert(name.into());
        }
        set
    }

    fn insert(&mut self, name: String) {
        if !self.contains(&name) {
            self.names.push(name);
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|known| known == name)
    }

    /// Index of `name`, or [`Error::UnknownAttribute`].
    pub(crate) fn require(&self, name: &str) -> Result<usize, Error> {
        self.position(name)
            .ok_or_else(|| Error::UnknownAttribute(name.to_string()))
    }
}

impl<S: Into<String>> FromIterator<S> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a AttributeSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}
