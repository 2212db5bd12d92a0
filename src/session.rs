use std::fmt;

use tracing::{debug, info, instrument, warn};

use crate::client::{CacheClient, Lookup};
use crate::error::SessionError;

/// The connection state of a [`MemcachedSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// no connection is open
    Disconnected,
    /// a connection to [`MemcachedSession::endpoint`] is open
    Connected,
}

/// The server a session is connected to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// host name or IP literal
    pub host: String,
    /// TCP port
    pub port: u16,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Gates `connect`/`get`/`disconnect` calls on a [`CacheClient`] so that requests are only ever
/// issued on an open connection.
///
/// A session holds at most one connection. Connecting while connected is refused with
/// [`SessionError::AlreadyConnected`]; `disconnect` is idempotent. Every call completes before
/// it returns, so there is never more than one request in flight.
pub struct MemcachedSession<C: CacheClient> {
    client: C,
    // Some(..) exactly when connected
    endpoint: Option<Endpoint>,
}

impl<C: CacheClient> MemcachedSession<C> {
    /// creates a disconnected session over `client`
    pub fn new(client: C) -> Self {
        MemcachedSession {
            client,
            endpoint: None,
        }
    }

    /// the current state
    pub fn state(&self) -> SessionState {
        if self.endpoint.is_some() {
            SessionState::Connected
        } else {
            SessionState::Disconnected
        }
    }

    /// true when connected
    pub fn is_connected(&self) -> bool {
        self.endpoint.is_some()
    }

    /// the endpoint of the open connection
    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    /// the wrapped client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// opens a connection to `host:port`
    ///
    /// # Errors
    /// [`SessionError::AlreadyConnected`] if a connection is open (the session keeps it),
    /// [`SessionError::Client`] with the client's message if connecting failed (the session
    /// stays disconnected)
    #[instrument(skip(self))]
    pub fn connect(&mut self, host: &str, port: u16) -> Result<(), SessionError> {
        if let Some(current) = &self.endpoint {
            warn!(%current, "connect refused, session already connected");
            return Err(SessionError::AlreadyConnected(current.to_string()));
        }

        self.client.connect(host, port)?;
        let endpoint = Endpoint {
            host: host.to_string(),
            port,
        };
        info!(%endpoint, "session connected");
        self.endpoint = Some(endpoint);
        Ok(())
    }

    /// looks up `key` on the open connection
    ///
    /// # Errors
    /// [`SessionError::NotConnected`] if no connection is open. A missing key is
    /// `Ok(Lookup::Absent)`, not an error.
    #[instrument(skip(self))]
    pub fn get(&mut self, key: &str) -> Result<Lookup, SessionError> {
        if self.endpoint.is_none() {
            return Err(SessionError::NotConnected);
        }
        let lookup = self.client.get(key)?;
        debug!(found = lookup.is_found(), "lookup finished");
        Ok(lookup)
    }

    /// closes the open connection, doing nothing if there is none
    pub fn disconnect(&mut self) {
        if let Some(endpoint) = self.endpoint.take() {
            self.client.disconnect();
            info!(%endpoint, "session disconnected");
        }
    }

    /// disconnects and releases the client's resources
    pub fn close(&mut self) {
        self.disconnect();
        self.client.close();
    }
}
