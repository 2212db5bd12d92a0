use std::time::Duration;

use tracing::{debug, info, instrument};

use super::{CacheClient, Lookup};
use crate::error::ClientError;

/// the I/O timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Settings applied to every connection a [`RemoteClient`] opens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    /// timeout for establishing a connection and for each read/write
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// A [`CacheClient`] backed by the [`memcache`] crate, speaking the ASCII protocol.
///
/// [`memcache`]: https://docs.rs/memcache
pub struct RemoteClient {
    options: ClientOptions,
    // present while connected
    inner: Option<memcache::Client>,
}

impl RemoteClient {
    /// creates a disconnected client
    pub fn new(options: ClientOptions) -> Self {
        RemoteClient {
            options,
            inner: None,
        }
    }

    /// the options this client connects with
    pub fn options(&self) -> ClientOptions {
        self.options
    }

    /// builds the connection url understood by `memcache::Client::connect`
    fn url(&self, host: &str, port: u16) -> String {
        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{}]", host)
        } else {
            host.to_string()
        };
        // `timeout` covers socket reads/writes, `connect_timeout` the pool's wait for a connection
        let secs = self.options.timeout.as_secs_f64();
        format!(
            "memcache://{}:{}?timeout={}&connect_timeout={}&protocol=ascii",
            host, port, secs, secs
        )
    }
}

impl Default for RemoteClient {
    fn default() -> Self {
        RemoteClient::new(ClientOptions::default())
    }
}

impl CacheClient for RemoteClient {
    /// connects and asks the server for its version, so that an unreachable server is reported
    /// here rather than on the first `get`
    #[instrument(skip(self))]
    fn connect(&mut self, host: &str, port: u16) -> Result<(), ClientError> {
        self.disconnect();

        let url = self.url(host, port);
        debug!(%url, "connecting");
        let client = memcache::Client::connect(url).map_err(to_client_error)?;
        let versions = client.version().map_err(to_client_error)?;
        for (server, version) in &versions {
            info!(%server, %version, "connected");
        }

        self.inner = Some(client);
        Ok(())
    }

    #[instrument(skip(self))]
    fn get(&mut self, key: &str) -> Result<Lookup, ClientError> {
        let client = self
            .inner
            .as_ref()
            .ok_or_else(|| ClientError("client is not connected".to_string()))?;

        match client.get::<Vec<u8>>(key).map_err(to_client_error)? {
            Some(value) => {
                debug!(len = value.len(), "value found");
                Ok(Lookup::Found(value))
            }
            None => {
                debug!("key not found");
                Ok(Lookup::Absent)
            }
        }
    }

    fn disconnect(&mut self) {
        if self.inner.take().is_some() {
            debug!("connection dropped");
        }
    }

    fn close(&mut self) {
        self.disconnect();
    }
}

impl Drop for RemoteClient {
    fn drop(&mut self) {
        self.close();
    }
}

fn to_client_error(e: memcache::MemcacheError) -> ClientError {
    ClientError(e.to_string())
}
