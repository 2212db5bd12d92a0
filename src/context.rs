use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// the port used when a context is created without one
pub const DEFAULT_PORT: u16 = 11211;

/// A named memcached endpoint.
///
/// Records can only be built through [`ContextInput::validate`] (or by loading a context file,
/// which runs the same validation), so a `ContextRecord` always has a non-empty name and host
/// and a port in `1..=65535`.
///
/// `colors` is presentation metadata written by other front ends. It is kept exactly as it was
/// read and written back on save, but never interpreted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredContext")]
pub struct ContextRecord {
    name: String,
    host: String,
    port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    colors: Option<Value>,
}

impl ContextRecord {
    /// the display name of this context
    pub fn name(&self) -> &str {
        &self.name
    }

    /// the host name or IP literal of the server
    pub fn host(&self) -> &str {
        &self.host
    }

    /// the TCP port of the server
    pub fn port(&self) -> u16 {
        self.port
    }

    /// the opaque metadata attached to this context, if any
    pub fn colors(&self) -> Option<&Value> {
        self.colors.as_ref()
    }

    /// attaches opaque metadata to this context
    pub fn with_colors(mut self, colors: Value) -> Self {
        self.colors = Some(colors);
        self
    }

    /// `host:port` of this context
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub(crate) fn set_colors(&mut self, colors: Option<Value>) {
        self.colors = colors;
    }
}

/// formats a record as `name (host:port)`, for listings only
impl fmt::Display for ContextRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.name, self.host, self.port)
    }
}

/// Raw, unvalidated context fields as a user typed them.
///
/// The port is kept as text so that non-numeric input can be reported as
/// [`ValidationError::InvalidPort`] instead of failing somewhere else. A blank port means
/// [`DEFAULT_PORT`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextInput {
    /// display name
    pub name: String,
    /// host name or IP literal
    pub host: String,
    /// port text, blank for the default
    pub port: String,
}

impl ContextInput {
    /// builds an input from any displayable port value
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: impl ToString) -> Self {
        ContextInput {
            name: name.into(),
            host: host.into(),
            port: port.to_string(),
        }
    }

    /// builds an input that will use [`DEFAULT_PORT`]
    pub fn with_default_port(name: impl Into<String>, host: impl Into<String>) -> Self {
        ContextInput {
            name: name.into(),
            host: host.into(),
            port: String::new(),
        }
    }

    /// checks the fields and produces a [`ContextRecord`]
    ///
    /// # Errors
    /// `EmptyName` or `EmptyHost` when those are blank, `InvalidPort` when the port is not an
    /// integer between 1 and 65535
    pub fn validate(&self) -> Result<ContextRecord, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let host = self.host.trim();
        if host.is_empty() {
            return Err(ValidationError::EmptyHost);
        }

        Ok(ContextRecord {
            name: name.to_string(),
            host: host.to_string(),
            port: parse_port(&self.port)?,
            colors: None,
        })
    }
}

fn parse_port(raw: &str) -> Result<u16, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(DEFAULT_PORT);
    }
    match raw.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ValidationError::InvalidPort(raw.to_string())),
    }
}

/// A port as it may appear in a context file: older files store it as a string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredPort {
    Number(i64),
    Text(String),
}

impl Default for StoredPort {
    fn default() -> Self {
        StoredPort::Text(String::new())
    }
}

/// On-disk shape of a context, before validation
#[derive(Debug, Deserialize)]
struct StoredContext {
    name: String,
    host: String,
    #[serde(default)]
    port: StoredPort,
    #[serde(default, deserialize_with = "present_value")]
    colors: Option<Value>,
}

/// wraps any value that is present in the file, `null` included, so it is written back as is
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl TryFrom<StoredContext> for ContextRecord {
    type Error = ValidationError;

    fn try_from(stored: StoredContext) -> Result<Self, Self::Error> {
        let port = match stored.port {
            StoredPort::Number(n) => n.to_string(),
            StoredPort::Text(s) => s,
        };
        let mut record = ContextInput::new(stored.name, stored.host, port).validate()?;
        record.colors = stored.colors;
        Ok(record)
    }
}
