pub mod attribute;
pub mod class;
pub mod configuration;
pub mod declaration;
pub mod error;
pub mod extension;
pub mod host;
pub mod params;
pub mod registry;

pub use attribute::AttributeSet;
pub use class::ConfigurationClass;
pub use configuration::{Configuration, ConfigurationRef};
pub use declaration::{Declaration, DeclarationBuilder, DeclarationBuilderError, DefaultMap};
pub use error::Error;
pub use extension::{Extension, Methods};
pub use host::{Configurable, RegisteredHost};
pub use params::Params;
pub use registry::Registry;
pub use serde_value::Value;

// re-export derive macro
pub use configurable_macros::Configurable;

#[doc(hidden)]
pub use inventory;

/// Registers `declaration` for host `H` in the global registry.
pub fn register<H: 'static>(declaration: Declaration) -> Result<(), Error> {
    Registry::global().register::<H>(declaration)
}

/// The configuration of host `H` from the global registry.
pub fn configuration<H: 'static>() -> Result<ConfigurationRef, Error> {
    Registry::global().configuration::<H>()
}

/// Runs `f` against the configuration of host `H` from the global registry.
pub fn configure<H, F, R>(f: F) -> Result<R, Error>
where
    H: 'static,
    F: FnOnce(&mut Configuration) -> Result<R, Error>,
{
    Registry::global().configure::<H, F, R>(f)
}
