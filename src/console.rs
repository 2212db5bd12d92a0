use tracing::{debug, error, instrument};

use crate::client::{CacheClient, Lookup};
use crate::context::{ContextInput, ContextRecord};
use crate::error::ConsoleError;
use crate::registry::ContextRegistry;
use crate::session::{MemcachedSession, SessionState};

/// Drives a [`ContextRegistry`] and a [`MemcachedSession`] the way an interactive front end does:
/// a context is selected from the list, connected to, and then queried.
///
/// Every mutation of the registry is saved right away. Protocol activity is written to a
/// transcript that the front end can show next to the retrieved values.
pub struct Console<C: CacheClient> {
    registry: ContextRegistry,
    session: MemcachedSession<C>,
    selected: Option<usize>,
    transcript: Vec<String>,
}

impl<C: CacheClient> Console<C> {
    /// creates a console with nothing selected
    pub fn new(registry: ContextRegistry, session: MemcachedSession<C>) -> Self {
        Console {
            registry,
            session,
            selected: None,
            transcript: Vec::new(),
        }
    }

    /// the contexts
    pub fn registry(&self) -> &ContextRegistry {
        &self.registry
    }

    /// the session
    pub fn session(&self) -> &MemcachedSession<C> {
        &self.session
    }

    /// index of the selected context
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// the protocol transcript, oldest line first
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// selects the context at `index`. An open connection is closed first.
    #[instrument(skip(self))]
    pub fn select(&mut self, index: usize) -> Result<&ContextRecord, ConsoleError> {
        self.registry.get(index)?;
        if self.session.is_connected() {
            self.disconnect();
        }
        self.selected = Some(index);
        Ok(self.registry.get(index)?)
    }

    /// connects to the selected context, or disconnects if a connection is already open
    ///
    /// Returns the resulting state.
    #[instrument(skip(self))]
    pub fn connect(&mut self) -> Result<SessionState, ConsoleError> {
        if self.session.is_connected() {
            self.disconnect();
            return Ok(SessionState::Disconnected);
        }

        let index = self.selected.ok_or(ConsoleError::NoSelection)?;
        let record = self.registry.get(index)?.clone();
        match self.session.connect(record.host(), record.port()) {
            Ok(()) => {
                self.log(format!("connected to {}", record.address()));
                Ok(SessionState::Connected)
            }
            Err(e) => {
                error!("connection to {} failed: {}", record.address(), e);
                self.log(format!("connection failed: {}", e));
                Err(e.into())
            }
        }
    }

    /// closes the open connection, if any
    pub fn disconnect(&mut self) {
        if self.session.is_connected() {
            self.session.disconnect();
            self.log("disconnected".to_string());
        }
    }

    /// looks up `key` on the open connection
    #[instrument(skip(self))]
    pub fn retrieve(&mut self, key: &str) -> Result<Lookup, ConsoleError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ConsoleError::EmptyKey);
        }

        self.log(format!("retrieving key: {}", key));
        match self.session.get(key) {
            Ok(lookup) => {
                let line = match lookup.as_text() {
                    Some(text) => format!("result: {}", text),
                    None => "result: key not found".to_string(),
                };
                self.log(line);
                Ok(lookup)
            }
            Err(e) => {
                self.log(format!("retrieval failed: {}", e));
                Err(e.into())
            }
        }
    }

    /// appends a context and saves the registry
    pub fn add(&mut self, input: &ContextInput) -> Result<(), ConsoleError> {
        self.registry.add(input)?;
        self.registry.save()?;
        Ok(())
    }

    /// replaces the context at `index` and saves the registry
    pub fn edit(&mut self, index: usize, input: &ContextInput) -> Result<(), ConsoleError> {
        self.registry.edit(index, input)?;
        self.registry.save()?;
        Ok(())
    }

    /// removes the context at `index` and saves the registry.
    ///
    /// Removing the selected context clears the selection and closes its connection.
    #[instrument(skip(self))]
    pub fn remove(&mut self, index: usize) -> Result<ContextRecord, ConsoleError> {
        let removed = self.registry.remove(index)?;
        match self.selected {
            Some(sel) if sel == index => {
                self.disconnect();
                self.selected = None;
            }
            Some(sel) if sel > index => self.selected = Some(sel - 1),
            _ => {}
        }
        debug!(selected = ?self.selected, "context removed");
        self.registry.save()?;
        Ok(removed)
    }

    /// disconnects and releases the session's client
    pub fn close(&mut self) {
        self.disconnect();
        self.session.close();
    }

    fn log(&mut self, line: String) {
        debug!("{}", line);
        self.transcript.push(line);
    }
}
