//! Configuration instances.
//!
//! A [`Configuration`] holds one value per declared attribute. Every
//! accessor validates the attribute name first, so a configuration can only
//! ever hold what its declaration lists.
//!
//! # Example
//!
//! ```rust
//! use configurable::{ConfigurationClass, Declaration, Error};
//!
//! let declaration = Declaration::builder().attribute("name").build()?;
//! let mut config = ConfigurationClass::build(&declaration).construct([])?;
//!
//! config.set("name", "Jane")?;
//! assert_eq!(config.get_as::<String>("name")?.as_deref(), Some("Jane"));
//!
//! assert!(matches!(config.set("origin", "USA"), Err(Error::UnknownAttribute(_))));
//! # Ok::<(), configurable::Error>(())
//! ```

use std::{fmt, sync::Arc};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Serialize, de::DeserializeOwned};
use serde_value::Value;

use crate::{attribute::AttributeSet, class::ConfigurationClass, error::Error, params::Params};

/// Maps values that mean "nothing" to the null sentinel and unwraps `Some`.
pub(crate) fn normalize(value: Value) -> Option<Value> {
    match value {
        Value::Unit | Value::Option(None) => None,
        Value::Option(Some(inner)) => normalize(*inner),
        other => Some(other),
    }
}

#[derive(Clone)]
pub struct Configuration {
    class: ConfigurationClass,
    values: Vec<Option<Value>>,
}

impl Configuration {
    pub(crate) fn new(class: ConfigurationClass, values: Vec<Option<Value>>) -> Self {
        Self { class, values }
    }

    pub fn class(&self) -> &ConfigurationClass {
        &self.class
    }

    pub fn attributes(&self) -> &AttributeSet {
        self.class.attributes()
    }

    /// The current value of `attribute`; `None` while it is unset.
    pub fn get(&self, attribute: &str) -> Result<Option<&Value>, Error> {
        let index = self.class.attributes().require(attribute)?;
        Ok(self.values[index].as_ref())
    }

    /// Reads `attribute` and deserializes it into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, attribute: &str) -> Result<Option<T>, Error> {
        self.get(attribute)?
            .map(|value| T::deserialize(value.clone()))
            .transpose()
            .map_err(Error::from)
    }

    /// Serializes `value` into `attribute`.
    ///
    /// `None` and `()` reset the attribute to null.
    pub fn set<T: Serialize>(&mut self, attribute: &str, value: T) -> Result<(), Error> {
        let index = self.class.attributes().require(attribute)?;
        self.values[index] = normalize(serde_value::to_value(value)?);
        Ok(())
    }

    pub fn set_value(&mut self, attribute: &str, value: Option<Value>) -> Result<(), Error> {
        let index = self.class.attributes().require(attribute)?;
        self.values[index] = value.and_then(normalize);
        Ok(())
    }

    pub fn clear(&mut self, attribute: &str) -> Result<(), Error> {
        self.set_value(attribute, None)
    }

    /// Sets every attribute named in `params`. Stops at the first unknown
    /// name; earlier attributes stay set.
    pub fn apply(&mut self, params: &Params) -> Result<(), Error> {
        for (name, value) in params.iter() {
            self.set_value(name, Some(value.clone()))?;
        }
        Ok(())
    }

    /// Non-null attributes in declaration order.
    pub fn to_params(&self) -> Params {
        let mut params = Params::default();
        for (name, value) in self.class.attributes().iter().zip(&self.values) {
            if let Some(value) = value {
                params.push(name, value.clone());
            }
        }
        params
    }

    pub fn responds_to(&self, method: &str) -> bool {
        self.class.responds_to(method)
    }

    /// Invokes an extension method.
    pub fn call(&self, method: &str) -> Result<Value, Error> {
        if !self.responds_to(method) {
            return Err(Error::UnknownMethod(method.to_string()));
        }
        self.class.extension().invoke(method, self)
    }

    /// Invokes an extension method that may change attribute values.
    pub fn call_mut(&mut self, method: &str) -> Result<Value, Error> {
        if !self.responds_to(method) {
            return Err(Error::UnknownMethod(method.to_string()));
        }
        let extension = Arc::clone(self.class.extension());
        extension.invoke_mut(method, self)
    }

    pub fn call_as<T: DeserializeOwned>(&self, method: &str) -> Result<T, Error> {
        Ok(T::deserialize(self.call(method)?)?)
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.class.attributes().iter().zip(&self.values))
            .finish()
    }
}

/// Shared handle to a host's configuration singleton.
///
/// Every clone points at the same instance; changes made through
/// [`write`](ConfigurationRef::write) are visible to all holders.
#[derive(Clone)]
pub struct ConfigurationRef(Arc<RwLock<Configuration>>);

impl ConfigurationRef {
    pub(crate) fn new(config: Configuration) -> Self {
        Self(Arc::new(RwLock::new(config)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Configuration> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Configuration> {
        self.0.write()
    }

    pub fn to_params(&self) -> Params {
        self.read().to_params()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ConfigurationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_read() {
            Some(config) => f.debug_tuple("ConfigurationRef").field(&*config).finish(),
            None => f.debug_tuple("ConfigurationRef").field(&"<locked>").finish(),
        }
    }
}
