//! Extra behavior merged into every configuration of a declaration.
//!
//! An extension contributes named methods that run against a
//! [`Configuration`] and may read or write its attributes through the usual
//! validated accessors. Method names are checked against the declared
//! attributes when the [`Declaration`](crate::Declaration) is built, so an
//! extension can never shadow an attribute.
//!
//! # Example
//!
//! ```rust
//! use configurable::{Configuration, Error, Extension, Value};
//!
//! struct Greeting;
//!
//! impl Extension for Greeting {
//!     fn methods(&self) -> &[&'static str] {
//!         &["greeting"]
//!     }
//!
//!     fn invoke(&self, _method: &str, config: &Configuration) -> Result<Value, Error> {
//!         let name: Option<String> = config.get_as("name")?;
//!         Ok(Value::String(format!("Hello {}", name.unwrap_or_default())))
//!     }
//! }
//! ```

use std::fmt;

use serde::Serialize;
use serde_value::Value;

use crate::{configuration::Configuration, error::Error};

pub trait Extension: Send + Sync + 'static {
    /// Names of the methods this extension answers to.
    fn methods(&self) -> &[&'static str] {
        &[]
    }

    /// Runs a read-only method. Only called for names listed in
    /// [`methods`](Extension::methods).
    fn invoke(&self, method: &str, _config: &Configuration) -> Result<Value, Error> {
        Err(Error::UnknownMethod(method.to_string()))
    }

    /// Runs a method that may mutate the configuration.
    fn invoke_mut(&self, method: &str, config: &mut Configuration) -> Result<Value, Error> {
        self.invoke(method, config)
    }

    /// Runs once per constructed configuration, after the initial values are
    /// in place.
    ///
    /// For a registered host this runs while the registry creates the host's
    /// configuration. Asking the registry for that same configuration from
    /// here fails with [`Error::ReentrantInitialization`]; use `config`.
    fn initialize(&self, _config: &mut Configuration) -> Result<(), Error> {
        Ok(())
    }
}

/// The empty extension block.
impl Extension for () {}

type Method = Box<dyn Fn(&Configuration) -> Result<Value, Error> + Send + Sync>;

/// An extension assembled from closures.
///
/// ```rust
/// use configurable::{Declaration, Methods};
///
/// let declaration = Declaration::builder()
///     .attribute("host")
///     .attribute("port")
///     .extension(Methods::new().method("address", |c| {
///         let host: String = c.get_as("host")?.unwrap_or_default();
///         let port: u16 = c.get_as("port")?.unwrap_or(80);
///         Ok(format!("{host}:{port}"))
///     }))
///     .build()?;
/// # Ok::<(), configurable::Error>(())
/// ```
#[derive(Default)]
pub struct Methods {
    names: Vec<&'static str>,
    bodies: Vec<Method>,
}

impl Methods {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a method whose result is serialized into a [`Value`].
    ///
    /// Registering the same name twice is reported as
    /// [`Error::MethodCollision`] when the declaration is built.
    pub fn method<F, T>(mut self, name: &'static str, body: F) -> Self
    where
        F: Fn(&Configuration) -> Result<T, Error> + Send + Sync + 'static,
        T: Serialize,
    {
        self.names.push(name);
        self.bodies.push(Box::new(move |config| {
            let result = body(config)?;
            Ok(serde_value::to_value(result)?)
        }));
        self
    }
}

impl Extension for Methods {
    fn methods(&self) -> &[&'static str] {
        &self.names
    }

    fn invoke(&self, method: &str, config: &Configuration) -> Result<Value, Error> {
        let index = self
            .names
            .iter()
            .rposition(|name| *name == method)
            .ok_or_else(|| Error::UnknownMethod(method.to_string()))?;

        (self.bodies[index])(config)
    }
}

impl fmt::Debug for Methods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Methods").field("names", &self.names).finish()
    }
}
