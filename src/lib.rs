#![deny(missing_docs)]
//! A registry of saved memcached "contexts" (named host/port endpoints) and a small session
//! layer for looking up keys on one of them.
//!
//! This crate provides the [`ContextRegistry`], [`MemcachedSession`] and [`Console`] types, as
//! well as a `memctx` executable that drives them from the terminal.
//!
//! ## Contexts
//! A [`ContextRecord`] is a `name`, `host` and `port`. Records are built from raw user input
//! ([`ContextInput`]) and validated once, when they are added or edited:
//!
//! - the name and host must not be blank
//! - the port must be an integer between 1 and 65535, and defaults to 11211 when left blank
//!
//! ## ContextRegistry
//! [`ContextRegistry`] keeps the ordered list of contexts and persists it as a JSON array in a
//! file whose path is given when the registry is created. Load order is display order.
//! A missing file is an empty registry; a corrupt file is reported as a [`LoadError`] and leaves
//! the registry empty.
//!
//! ## Sessions
//! The memcached wire protocol is not implemented here. A [`MemcachedSession`] wraps any
//! [`CacheClient`] and only tracks whether it is connected, refusing to `get` without a
//! connection and to `connect` twice. [`RemoteClient`] is the `CacheClient` that talks to a
//! real server through the [`memcache`] crate.
//!
//! A missing key is a normal result ([`Lookup::Absent`]), not an error.
//!
//! ## Console
//! [`Console`] ties a registry and a session together: select a context, connect to it,
//! retrieve keys, and keep a transcript of what happened.
//!
//! [`memcache`]: https://docs.rs/memcache

pub use client::{CacheClient, ClientOptions, Lookup, RemoteClient};
pub use console::Console;
pub use context::{ContextInput, ContextRecord, DEFAULT_PORT};
pub use error::{
    ClientError, ConsoleError, IndexError, LoadError, MemctxError, RegistryError, Result,
    SaveError, SessionError, ValidationError,
};
pub use registry::ContextRegistry;
pub use session::{Endpoint, MemcachedSession, SessionState};

pub mod client;
mod console;
mod context;
mod error;
mod registry;
mod session;
