use std::any::{TypeId, type_name};

use crate::{
    configuration::{Configuration, ConfigurationRef},
    declaration::Declaration,
    error::Error,
    registry::Registry,
};

/// A host type with a configuration singleton.
///
/// Implement it with `#[derive(Configurable)]`, or by hand together with
/// [`submit_configurable!`](crate::submit_configurable).
pub trait Configurable: 'static {
    fn declaration() -> Result<Declaration, Error>;

    /// The host's configuration, created with the declared defaults on first
    /// access.
    fn configuration() -> Result<ConfigurationRef, Error>
    where
        Self: Sized,
    {
        Registry::global().configuration::<Self>()
    }

    /// Hands the configuration to `f` for mutation and returns its result.
    ///
    /// Holds the write lock while `f` runs; reading this host's
    /// configuration from inside `f` deadlocks.
    fn configure<F, R>(f: F) -> Result<R, Error>
    where
        Self: Sized,
        F: FnOnce(&mut Configuration) -> Result<R, Error>,
    {
        Registry::global().configure::<Self, _, _>(f)
    }
}

pub struct RegisteredHost {
    pub id: fn() -> TypeId,
    pub name: fn() -> &'static str,
    pub declaration: fn() -> Result<Declaration, Error>,
}

impl RegisteredHost {
    pub const fn new<H: Configurable>() -> Self {
        Self {
            id: || TypeId::of::<H>(),
            name: || type_name::<H>(),
            declaration: H::declaration,
        }
    }
}

inventory::collect!(RegisteredHost);

#[macro_export]
macro_rules! submit_configurable {
    ($host_type:ty) => {
        $crate::inventory::submit! {
            $crate::RegisteredHost::new::<$host_type>()
        }
    };
}
