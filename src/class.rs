use std::{fmt, sync::Arc};

use serde_value::Value;

use crate::{
    attribute::AttributeSet,
    configuration::{Configuration, normalize},
    declaration::Declaration,
    error::Error,
    extension::Extension,
};

struct ClassInner {
    attributes: AttributeSet,
    extension: Arc<dyn Extension>,
}

/// A constructible configuration type: one field per declared attribute plus
/// the declaration's extension methods.
///
/// Cloning shares the class. Two classes built from the same declaration
/// are distinct.
#[derive(Clone)]
pub struct ConfigurationClass {
    inner: Arc<ClassInner>,
}

impl ConfigurationClass {
    pub fn build(declaration: &Declaration) -> Self {
        Self {
            inner: Arc::new(ClassInner {
                attributes: declaration.attributes().clone(),
                extension: Arc::clone(declaration.extension()),
            }),
        }
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.inner.attributes
    }

    pub fn extension(&self) -> &Arc<dyn Extension> {
        &self.inner.extension
    }

    pub fn responds_to(&self, method: &str) -> bool {
        self.inner
            .extension
            .methods()
            .iter()
            .any(|name| *name == method)
    }

    /// Creates an instance from positional values in attribute order.
    ///
    /// Missing trailing values start out null; declared defaults are not
    /// consulted here. The extension's
    /// [`initialize`](Extension::initialize) hook runs last.
    pub fn construct<I>(&self, values: I) -> Result<Configuration, Error>
    where
        I: IntoIterator<Item = Option<Value>>,
    {
        let expected = self.inner.attributes.len();
        let mut values: Vec<Option<Value>> = values
            .into_iter()
            .map(|value| value.and_then(normalize))
            .collect();

        if values.len() > expected {
            return Err(Error::Arity {
                expected,
                given: values.len(),
            });
        }
        values.resize(expected, None);

        let mut config = Configuration::new(self.clone(), values);
        let extension = Arc::clone(&self.inner.extension);
        extension.initialize(&mut config)?;

        Ok(config)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ConfigurationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationClass")
            .field("attributes", &self.inner.attributes)
            .field("methods", &self.inner.extension.methods())
            .finish()
    }
}
