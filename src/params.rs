//! The ordered, non-null view of a configuration.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer, de::DeserializeOwned, ser::SerializeMap};
use serde_value::Value;

use crate::error::Error;

/// Attribute values that are set, in declaration order.
///
/// Serializes as a map, so it can be handed to anything that takes request
/// or serialization parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, Value)>,
}

impl Params {
    pub(crate) fn push(&mut self, name: &str, value: Value) {
        self.entries.push((name.to_string(), value));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, Error> {
        self.get(name)
            .map(|value| T::deserialize(value.clone()))
            .transpose()
            .map_err(Error::from)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts into a [`Value::Map`]. The map is key-ordered, not
    /// declaration-ordered.
    pub fn into_value(self) -> Value {
        let map: BTreeMap<Value, Value> = self
            .entries
            .into_iter()
            .map(|(key, value)| (Value::String(key), value))
            .collect();
        Value::Map(map)
    }

    /// Renders the parameters as a TOML table, in declaration order.
    pub fn to_toml_string(&self) -> Result<String, Error> {
        Ok(toml::to_string(self)?)
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl IntoIterator for Params {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a (String, Value);
    type IntoIter = std::slice::Iter<'a, (String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
