//! This module defines the capability a [`MemcachedSession`] needs from a memcached client,
//! and the [`RemoteClient`] implementation that talks to a real server through the `memcache`
//! crate.
//!
//! [`MemcachedSession`]: crate::MemcachedSession
use crate::error::ClientError;

/// The result of looking up a key.
///
/// A missing key is a normal outcome of a memcached `get`, so it is a variant here rather
/// than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// the raw bytes stored under the key
    Found(Vec<u8>),
    /// the server holds no value for the key
    Absent,
}

impl Lookup {
    /// true if a value was found
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// the value rendered as text, replacing invalid UTF-8
    pub fn as_text(&self) -> Option<String> {
        match self {
            Lookup::Found(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            Lookup::Absent => None,
        }
    }
}

/// A trait for the operations of a memcached client that a session delegates to.
///
/// Implementations own the wire protocol, timeouts and retries.
pub trait CacheClient {
    /// opens a connection to `host:port`
    ///
    /// # Errors
    /// a [`ClientError`] carrying the client's own message if the server cannot be reached
    fn connect(&mut self, host: &str, port: u16) -> Result<(), ClientError>;

    /// retrieves the value stored under `key`
    fn get(&mut self, key: &str) -> Result<Lookup, ClientError>;

    /// drops the current connection, if any
    fn disconnect(&mut self);

    /// releases every resource held by the client. Safe to call more than once.
    fn close(&mut self);
}

mod remote;

pub use self::remote::{ClientOptions, RemoteClient};
