//! Per-host registry of declarations and configuration singletons.
//!
//! This module provides the [`Registry`] type, which binds a
//! [`Declaration`] to a host type and owns that host's configuration
//! instance. The registry is the explicit form of "each host type has its
//! own configuration": entries are keyed by the host's [`TypeId`], and two
//! hosts never share an entry even when they declare the same attributes.
//!
//! # Overview
//!
//! Every entry moves through three states:
//!
//! 1. **Unregistered**: the host has no entry
//! 2. **Registered**: the declaration is stored, no instance exists yet
//! 3. **Instantiated**: the first access built the configuration class and
//!    created the instance from the declared defaults
//!
//! Instances are never evicted or reset by the registry.
//!
//! A process-wide registry is available through [`Registry::global`]. It is
//! populated from every host submitted with
//! [`submit_configurable!`](crate::submit_configurable) (which
//! `#[derive(Configurable)]` does for you). Standalone registries created
//! with [`Registry::new`] are independent of it.
//!
//! # Example
//!
//! ```rust
//! use configurable::{Declaration, Registry};
//!
//! struct Mailer;
//!
//! let registry = Registry::new();
//! registry.register::<Mailer>(
//!     Declaration::builder()
//!         .attribute("host")
//!         .default_value("port", 25)?
//!         .build()?,
//! )?;
//!
//! registry.configure::<Mailer, _, _>(|c| c.set("host", "smtp.example.com"))?;
//!
//! let config = registry.configuration::<Mailer>()?;
//! assert_eq!(config.read().get_as::<u16>("port")?, Some(25));
//! # Ok::<(), configurable::Error>(())
//! ```
use std::{
    any::{TypeId, type_name},
    collections::{HashMap, hash_map},
    sync::{Arc, LazyLock},
    thread::{self, ThreadId},
};

use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};

use crate::{
    class::ConfigurationClass,
    configuration::{Configuration, ConfigurationRef},
    declaration::Declaration,
    error::Error,
    host::RegisteredHost,
};

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::from_inventory);

/// Thread currently running a once-cell initializer.
#[derive(Default)]
struct Initializing(Mutex<Option<ThreadId>>);

/// Clears the [`Initializing`] slot, also when the initializer panics.
struct Running<'a>(&'a Mutex<Option<ThreadId>>);

impl Drop for Running<'_> {
    fn drop(&mut self) {
        *self.0.lock() = None;
    }
}

impl Initializing {
    /// Initializes `cell` with `init`, failing instead of blocking when the
    /// current thread is already inside this initializer.
    fn run<'a, T>(
        &self,
        host: &'static str,
        cell: &'a OnceCell<T>,
        init: impl FnOnce() -> Result<T, Error>,
    ) -> Result<&'a T, Error> {
        if let Some(value) = cell.get() {
            return Ok(value);
        }

        let current = thread::current().id();
        if *self.0.lock() == Some(current) {
            return Err(Error::ReentrantInitialization(host));
        }

        cell.get_or_try_init(|| {
            *self.0.lock() = Some(current);
            let _running = Running(&self.0);
            init()
        })
    }
}

struct Entry {
    host: &'static str,
    declare: Option<fn() -> Result<Declaration, Error>>,
    declaration: OnceCell<Declaration>,
    instance: OnceCell<ConfigurationRef>,
    declaring: Initializing,
    instantiating: Initializing,
    duplicated: bool,
}

impl Entry {
    fn new(host: &'static str, declare: Option<fn() -> Result<Declaration, Error>>) -> Self {
        Self {
            host,
            declare,
            declaration: OnceCell::new(),
            instance: OnceCell::new(),
            declaring: Initializing::default(),
            instantiating: Initializing::default(),
            duplicated: false,
        }
    }

    fn ready(host: &'static str, declaration: Declaration) -> Self {
        Self {
            declaration: OnceCell::with_value(declaration),
            ..Self::new(host, None)
        }
    }

    fn deferred(host: &'static str, declare: fn() -> Result<Declaration, Error>) -> Self {
        Self::new(host, Some(declare))
    }

    fn duplicated(host: &'static str) -> Self {
        Self {
            duplicated: true,
            ..Self::new(host, None)
        }
    }

    fn declaration(&self) -> Result<&Declaration, Error> {
        if self.duplicated {
            return Err(Error::AlreadyRegistered(self.host));
        }

        self.declaring
            .run(self.host, &self.declaration, || match self.declare {
                Some(declare) => declare(),
                None => Err(Error::UnregisteredHost(self.host)),
            })
    }

    fn instance(&self) -> Result<ConfigurationRef, Error> {
        let declaration = self.declaration()?;

        self.instantiating
            .run(self.host, &self.instance, || {
                let class = ConfigurationClass::build(declaration);
                let config = class.construct(declaration.ordered_defaults())?;

                tracing::debug!(
                    host = self.host,
                    attributes = declaration.attributes().len(),
                    "created configuration"
                );

                Ok(ConfigurationRef::new(config))
            })
            .cloned()
    }
}

/// Binds declarations to host types and owns their configuration
/// singletons.
///
/// `Registry` is responsible for:
///
/// - Storing exactly one [`Declaration`] per host type
/// - Creating the host's configuration lazily, on first access
/// - Returning the same instance on every later access
/// - Handing the instance out for mutation through
///   [`configure`](Registry::configure)
///
/// # Thread Safety
///
/// All methods take `&self`. Instance creation runs exactly once per host
/// even when several threads race for it, and the instance itself sits
/// behind a read-write lock. A thread that asks for a host's configuration
/// while it is creating that same configuration gets
/// [`Error::ReentrantInitialization`] instead of waiting on itself.
pub struct Registry {
    /// Map from host type IDs to their entries.
    entries: RwLock<HashMap<TypeId, Arc<Entry>>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a registry holding every host submitted with
    /// [`submit_configurable!`](crate::submit_configurable).
    ///
    /// Declarations are not evaluated here. Each is built on the first
    /// access to its host, and a failure is reported from that access.
    ///
    /// A host submitted more than once is kept, but every access to it
    /// returns [`Error::AlreadyRegistered`].
    pub fn from_inventory() -> Self {
        let mut entries = HashMap::new();
        for registration in inventory::iter::<RegisteredHost> {
            let host = (registration.name)();
            match entries.entry((registration.id)()) {
                hash_map::Entry::Vacant(slot) => {
                    slot.insert(Arc::new(Entry::deferred(host, registration.declaration)));
                }
                hash_map::Entry::Occupied(mut slot) => {
                    tracing::warn!(host, "host submitted more than once");
                    slot.insert(Arc::new(Entry::duplicated(host)));
                }
            }
        }

        tracing::debug!(hosts = entries.len(), "collected configurable hosts");

        Self {
            entries: RwLock::new(entries),
        }
    }

    /// The process-wide registry, created from the submitted hosts on first
    /// use.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    /// Stores `declaration` as the declaration of host `H`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyRegistered`] if `H` already has an entry,
    /// whether it came from an earlier call or from
    /// [`submit_configurable!`](crate::submit_configurable).
    ///
    /// # Example
    ///
    /// ```rust
    /// use configurable::{Declaration, Error, Registry};
    ///
    /// struct Host;
    ///
    /// let registry = Registry::new();
    /// let declaration = Declaration::builder().attribute("name").build()?;
    ///
    /// registry.register::<Host>(declaration.clone())?;
    /// assert!(matches!(
    ///     registry.register::<Host>(declaration),
    ///     Err(Error::AlreadyRegistered(_))
    /// ));
    /// # Ok::<(), configurable::Error>(())
    /// ```
    pub fn register<H: 'static>(&self, declaration: Declaration) -> Result<(), Error> {
        let host = type_name::<H>();
        let mut entries = self.entries.write();

        match entries.entry(TypeId::of::<H>()) {
            hash_map::Entry::Occupied(_) => Err(Error::AlreadyRegistered(host)),
            hash_map::Entry::Vacant(slot) => {
                tracing::debug!(
                    host,
                    attributes = declaration.attributes().len(),
                    "registered host"
                );
                slot.insert(Arc::new(Entry::ready(host, declaration)));
                Ok(())
            }
        }
    }

    pub fn is_registered<H: 'static>(&self) -> bool {
        self.entries.read().contains_key(&TypeId::of::<H>())
    }

    /// Returns a copy of the declaration registered for `H`.
    pub fn declaration<H: 'static>(&self) -> Result<Declaration, Error> {
        self.entry::<H>()?.declaration().cloned()
    }

    /// Type names of all registered hosts, sorted.
    pub fn hosts(&self) -> Vec<&'static str> {
        let mut hosts: Vec<_> = self.entries.read().values().map(|e| e.host).collect();
        hosts.sort_unstable();
        hosts
    }

    /// Returns the configuration of host `H`.
    ///
    /// The first call builds the configuration class from the host's
    /// declaration and creates the instance with the declared defaults,
    /// leaving every other attribute null. Later calls return the same
    /// instance: the returned handles are [`ptr_eq`](ConfigurationRef::ptr_eq).
    ///
    /// # Errors
    ///
    /// - [`Error::UnregisteredHost`] if `H` has no entry
    /// - [`Error::AlreadyRegistered`] if `H` was submitted more than once
    /// - Any error from evaluating a deferred declaration or from the
    ///   extension's [`initialize`](crate::Extension::initialize) hook
    /// - [`Error::ReentrantInitialization`] if called for `H` from inside
    ///   the creation of `H`'s own configuration on the same thread, such as
    ///   from its `initialize` hook; the instance stays uncreated
    pub fn configuration<H: 'static>(&self) -> Result<ConfigurationRef, Error> {
        self.entry::<H>()?.instance()
    }

    /// Runs `f` against the configuration of host `H` and returns its
    /// result.
    ///
    /// The configuration is created first if needed. `f` receives the
    /// instance mutably, under the write lock.
    ///
    /// # Atomicity
    ///
    /// There is none. If `f` fails part way through, the attributes it set
    /// before failing keep their new values.
    ///
    /// # Deadlocks
    ///
    /// Reading the same host's configuration from inside `f` blocks forever,
    /// because `f` runs while the write lock is held. Use the
    /// [`Configuration`] passed to `f` instead.
    ///
    /// # Example
    ///
    /// ```rust
    /// use configurable::{Declaration, Error, Registry};
    ///
    /// struct Host;
    ///
    /// let registry = Registry::new();
    /// registry.register::<Host>(Declaration::builder().attribute("name").build()?)?;
    ///
    /// let result = registry.configure::<Host, _, _>(|c| {
    ///     c.set("name", "Jane")?;
    ///     c.set("origin", "USA")
    /// });
    /// assert!(matches!(result, Err(Error::UnknownAttribute(_))));
    ///
    /// // No rollback.
    /// let config = registry.configuration::<Host>()?;
    /// assert_eq!(config.read().get_as::<String>("name")?.as_deref(), Some("Jane"));
    /// # Ok::<(), configurable::Error>(())
    /// ```
    pub fn configure<H, F, R>(&self, f: F) -> Result<R, Error>
    where
        H: 'static,
        F: FnOnce(&mut Configuration) -> Result<R, Error>,
    {
        let entry = self.entry::<H>()?;
        let instance = entry.instance()?;

        tracing::trace!(host = entry.host, "configuring");

        let mut config = instance.write();
        f(&mut config)
    }

    fn entry<H: 'static>(&self) -> Result<Arc<Entry>, Error> {
        self.entries
            .read()
            .get(&TypeId::of::<H>())
            .cloned()
            .ok_or(Error::UnregisteredHost(type_name::<H>()))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
