//! Configuration declarations.
//!
//! A [`Declaration`] is what a host type registers: the attribute names,
//! their defaults and the extension block. It is validated once, when it is
//! built, and never changes afterwards.

use std::{fmt, sync::Arc};

use derive_builder::Builder;
use serde::Serialize;
use serde_value::Value;

use crate::{attribute::AttributeSet, error::Error, extension::Extension};

/// Name of the built-in serialization method, reserved for extensions.
const TO_PARAMS: &str = "to_params";

/// Initial attribute values, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefaultMap {
    entries: Vec<(String, Value)>,
}

impl DefaultMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default for `name`, replacing an earlier one.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Serializes `value` and sets it as the default for `name`.
    pub fn with<T: Serialize>(mut self, name: impl Into<String>, value: T) -> Result<Self, Error> {
        self.insert(name, serde_value::to_value(value)?);
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Builder)]
#[builder(
    name = "DeclarationBuilder",
    public,
    pattern = "owned",
    build_fn(private, name = "build_raw")
)]
struct RawDeclaration {
    #[builder(setter(each(name = "attribute", into)), default)]
    attributes: Vec<String>,

    #[builder(setter(custom), default)]
    defaults: DefaultMap,

    #[builder(setter(custom), default)]
    extension: Option<Arc<dyn Extension>>,
}

impl DeclarationBuilder {
    /// Declares a default value. `name` becomes an attribute even if it was
    /// not listed with [`attribute`](DeclarationBuilder::attribute).
    pub fn default_value<T: Serialize>(
        mut self,
        name: impl Into<String>,
        value: T,
    ) -> Result<Self, Error> {
        let value = serde_value::to_value(value)?;
        self.defaults
            .get_or_insert_with(DefaultMap::new)
            .insert(name, value);
        Ok(self)
    }

    pub fn defaults(mut self, defaults: DefaultMap) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn extension<E: Extension>(mut self, extension: E) -> Self {
        let extension: Arc<dyn Extension> = Arc::new(extension);
        self.extension = Some(Some(extension));
        self
    }

    pub fn build(self) -> Result<Declaration, Error> {
        let raw = self.build_raw()?;
        let extension: Arc<dyn Extension> = match raw.extension {
            Some(extension) => extension,
            None => Arc::new(()),
        };
        Declaration::from_parts(raw.attributes, raw.defaults, extension)
    }
}

/// The attributes, defaults and extension a host type registers.
///
/// The final attribute set is the union of the listed attributes and the
/// default keys, in first-seen order.
///
/// # Example
///
/// ```rust
/// use configurable::Declaration;
///
/// let declaration = Declaration::builder()
///     .attribute("title")
///     .attribute("country")
///     .default_value("name", "John Doe")?
///     .build()?;
///
/// assert_eq!(declaration.attributes().names(), ["title", "country", "name"]);
/// # Ok::<(), configurable::Error>(())
/// ```
#[derive(Clone)]
pub struct Declaration {
    attributes: AttributeSet,
    defaults: DefaultMap,
    extension: Arc<dyn Extension>,
}

impl Declaration {
    pub fn builder() -> DeclarationBuilder {
        DeclarationBuilder::default()
    }

    /// Builds a declaration in one call.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidAttributeName`] if any name is empty
    /// - [`Error::MethodCollision`] if an extension method is named like an
    ///   attribute, like `to_params`, or like another extension method
    pub fn new<I, S, E>(attributes: I, defaults: DefaultMap, extension: E) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        E: Extension,
    {
        Self::from_parts(
            attributes.into_iter().map(Into::into).collect(),
            defaults,
            Arc::new(extension),
        )
    }

    fn from_parts(
        positional: Vec<String>,
        defaults: DefaultMap,
        extension: Arc<dyn Extension>,
    ) -> Result<Self, Error> {
        let attributes = AttributeSet::union(positional, defaults.keys());
        if attributes.iter().any(str::is_empty) {
            return Err(Error::InvalidAttributeName);
        }

        let methods = extension.methods();
        for (index, method) in methods.iter().enumerate() {
            if *method == TO_PARAMS
                || attributes.contains(method)
                || methods[..index].contains(method)
            {
                return Err(Error::MethodCollision(method.to_string()));
            }
        }

        Ok(Self {
            attributes,
            defaults,
            extension,
        })
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    pub fn defaults(&self) -> &DefaultMap {
        &self.defaults
    }

    pub fn extension(&self) -> &Arc<dyn Extension> {
        &self.extension
    }

    /// Default values lined up with the attributes; `None` where no default
    /// was declared.
    pub fn ordered_defaults(&self) -> Vec<Option<Value>> {
        self.attributes
            .iter()
            .map(|name| self.defaults.get(name).cloned())
            .collect()
    }
}

impl fmt::Debug for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Declaration")
            .field("attributes", &self.attributes)
            .field("defaults", &self.defaults)
            .field("methods", &self.extension.methods())
            .finish()
    }
}
