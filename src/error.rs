use thiserror::Error;

use crate::declaration::DeclarationBuilderError;

#[derive(Debug, Error)]
pub enum Error {
    /// Attempted to read or write an attribute that was not declared.
    ///
    /// Every accessor on [`Configuration`](crate::Configuration) validates
    /// the name against the declared [`AttributeSet`](crate::AttributeSet),
    /// so a typo inside a [`configure`](crate::Configurable::configure) block
    /// fails loudly instead of being silently accepted.
    ///
    /// The contained string is the offending attribute name.
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    /// A configuration was constructed with more positional values than the
    /// class declares attributes.
    #[error("Wrong number of values: expected at most {expected}, given {given}")]
    Arity { expected: usize, given: usize },

    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// An extension method shares its name with an attribute, with the
    /// built-in `to_params`, or with another extension method.
    #[error("Extension method collides with an existing name: {0}")]
    MethodCollision(String),

    #[error("Attribute names must not be empty")]
    InvalidAttributeName,

    /// Attempted to access the configuration of a host type that was never
    /// registered.
    ///
    /// The contained string is the type name of the host.
    ///
    /// # How to Fix
    ///
    /// Derive [`Configurable`](crate::Configurable) on the host, submit it
    /// with [`submit_configurable!`](crate::submit_configurable), or call
    /// [`register`](crate::register) before the first access.
    #[error("Host not registered: {0}")]
    UnregisteredHost(&'static str),

    #[error("Host already registered: {0}")]
    AlreadyRegistered(&'static str),

    /// The host's declaration or configuration was requested while it was
    /// still being created on the same thread, typically from an
    /// [`Extension::initialize`](crate::Extension::initialize) hook or a
    /// declaration function that reads its own host.
    #[error("Configuration requested while it is being created: {0}")]
    ReentrantInitialization(&'static str),

    #[error("Serialization: {0}")]
    Serialization(#[from] serde_value::SerializerError),

    #[error("Deserialization: {0}")]
    Deserialization(#[from] serde_value::DeserializerError),

    #[error("TOML Serialization: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// Wraps the error of the generated declaration builder.
    ///
    /// Every builder field currently has a default, so the builder itself
    /// never fails; the variant lets [`DeclarationBuilder::build`] forward
    /// the generated `build` result with `?` and keeps the signature stable
    /// if a required field is added.
    ///
    /// [`DeclarationBuilder::build`]: crate::DeclarationBuilder::build
    #[error("Declaration: {0}")]
    Builder(#[from] DeclarationBuilderError),

    /// Raised by extension methods for failures of their own.
    #[error("Extension: {0}")]
    Extension(String),
}
