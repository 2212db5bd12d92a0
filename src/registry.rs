use std::fs;
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::context::{ContextInput, ContextRecord};
use crate::error::{IndexError, LoadError, RegistryError, SaveError, ValidationError};

/// The ordered list of saved contexts, backed by a JSON file.
///
/// Insertion order is display order, and it is written to and read back from the file
/// unchanged. Records are validated once, when they are added or edited, so every record held
/// by the registry is valid. Duplicate names are allowed.
///
/// The file is a JSON array:
/// ```json
/// [
///   {"name": "local", "host": "127.0.0.1", "port": 11211}
/// ]
/// ```
/// `port` is accepted as a number or a string when loading and always written as a number.
#[derive(Debug)]
pub struct ContextRegistry {
    // file the contexts are loaded from and saved to
    path: PathBuf,

    contexts: Vec<ContextRecord>,
}

impl ContextRegistry {
    /// creates an empty registry that persists to `path`. Nothing is read until [`load`] is called.
    ///
    /// [`load`]: ContextRegistry::load
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ContextRegistry {
            path: path.into(),
            contexts: Vec::new(),
        }
    }

    /// creates a registry for `path` and loads it
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LoadError> {
        let mut registry = ContextRegistry::new(path);
        registry.load()?;
        Ok(registry)
    }

    /// the backing file of this registry
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// validates `input` and appends it to the end of the list
    ///
    /// # Errors
    /// returns a [`ValidationError`] and leaves the list unchanged if `input` is invalid
    #[instrument(skip(self))]
    pub fn add(&mut self, input: &ContextInput) -> Result<(), ValidationError> {
        let record = input.validate()?;
        debug!(%record, "adding context");
        self.contexts.push(record);
        Ok(())
    }

    /// validates `input` and replaces the record at `index` with it, keeping its position and
    /// its `colors` metadata
    #[instrument(skip(self))]
    pub fn edit(&mut self, index: usize, input: &ContextInput) -> Result<(), RegistryError> {
        let len = self.contexts.len();
        let slot = self
            .contexts
            .get_mut(index)
            .ok_or(IndexError { index, len })?;
        let mut record = input.validate()?;
        record.set_colors(slot.colors().cloned());
        debug!(%record, "editing context");
        *slot = record;
        Ok(())
    }

    /// removes and returns the record at `index`
    #[instrument(skip(self))]
    pub fn remove(&mut self, index: usize) -> Result<ContextRecord, IndexError> {
        if index >= self.contexts.len() {
            return Err(IndexError {
                index,
                len: self.contexts.len(),
            });
        }
        Ok(self.contexts.remove(index))
    }

    /// all records in display order
    pub fn list(&self) -> &[ContextRecord] {
        &self.contexts
    }

    /// the record at `index`
    pub fn get(&self, index: usize) -> Result<&ContextRecord, IndexError> {
        self.contexts.get(index).ok_or(IndexError {
            index,
            len: self.contexts.len(),
        })
    }

    /// the number of records
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// true if there are no records
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// replaces the in-memory list with the contents of the backing file.
    ///
    /// A missing file leaves the registry empty and is not an error.
    ///
    /// # Errors
    /// [`LoadError::Parse`] if the file is not a valid list of contexts, [`LoadError::Io`] if it
    /// could not be read. In both cases the registry is left empty.
    #[instrument(skip(self), fields(path = ?self.path))]
    pub fn load(&mut self) -> Result<(), LoadError> {
        self.contexts.clear();

        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("no context file yet, starting empty");
                return Ok(());
            }
            Err(e) => return Err(LoadError::Io(e)),
        };

        let contexts: Vec<ContextRecord> = serde_json::from_slice(&data).map_err(|e| {
            warn!("context file is invalid: {}", e);
            LoadError::Parse(e.to_string())
        })?;
        info!(count = contexts.len(), "loaded contexts");
        self.contexts = contexts;
        Ok(())
    }

    /// writes the current list to the backing file, creating its parent directory if needed.
    ///
    /// # Errors
    /// [`SaveError::Io`] if the file could not be written; the in-memory list is kept either way
    #[instrument(skip(self), fields(path = ?self.path))]
    pub fn save(&self) -> Result<(), SaveError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let mut writer = BufWriter::new(fs::File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, &self.contexts)
            .map_err(|e| SaveError::Io(io::Error::new(ErrorKind::Other, e)))?;
        writer.flush()?;
        debug!(count = self.contexts.len(), "saved contexts");
        Ok(())
    }
}
