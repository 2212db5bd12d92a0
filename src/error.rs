use std::io;
use thiserror::Error;

/// type alias for operations of the `memctx` binary that could fail with a [`MemctxError`]
pub type Result<T> = std::result::Result<T, MemctxError>;

/// Reasons a [`ContextInput`](crate::ContextInput) is refused at the add/edit boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// the context name was empty or only whitespace
    #[error("context name must not be empty")]
    EmptyName,

    /// the host was empty or only whitespace
    #[error("context host must not be empty")]
    EmptyHost,

    /// the port was not an integer in 1..=65535
    #[error("invalid port `{0}`, expected an integer between 1 and 65535")]
    InvalidPort(String),
}

/// An index did not refer to an existing context
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no context at index {index} (registry holds {len})")]
pub struct IndexError {
    /// the requested index
    pub index: usize,
    /// the number of contexts at the time of the request
    pub len: usize,
}

/// Errors from registry mutations that take an index and a record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// the record was rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// the index was out of bounds
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Errors while loading the persisted context list
#[derive(Error, Debug)]
pub enum LoadError {
    /// the file exists but could not be read
    #[error("could not read context file: {0}")]
    Io(#[from] io::Error),

    /// the file contents are not a valid list of contexts
    #[error("could not parse context file: {0}")]
    Parse(String),
}

/// Errors while persisting the context list
#[derive(Error, Debug)]
pub enum SaveError {
    /// the file could not be written
    #[error("could not write context file: {0}")]
    Io(#[from] io::Error),
}

/// An error reported by the external memcached client, message kept verbatim
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ClientError(pub String);

/// Errors from [`MemcachedSession`](crate::MemcachedSession) operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// `connect` was called while a connection is open
    #[error("already connected to {0}, disconnect first")]
    AlreadyConnected(String),

    /// `get` was called without an open connection
    #[error("not connected")]
    NotConnected,

    /// the client failed to connect or retrieve
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Errors from [`Console`](crate::Console) actions
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// no context has been selected yet
    #[error("select a context first")]
    NoSelection,

    /// a retrieval was requested with a blank key
    #[error("enter a key to retrieve")]
    EmptyKey,

    /// a registry mutation was refused
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// the mutation was applied but could not be persisted
    #[error(transparent)]
    Save(#[from] SaveError),

    /// a session operation failed
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl From<ValidationError> for ConsoleError {
    fn from(e: ValidationError) -> Self {
        ConsoleError::Registry(e.into())
    }
}

impl From<IndexError> for ConsoleError {
    fn from(e: IndexError) -> Self {
        ConsoleError::Registry(e.into())
    }
}

/// The umbrella error used by the `memctx` binary
#[derive(Error, Debug)]
pub enum MemctxError {
    /// wraps io errors from the terminal
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// errors while parsing command line values
    #[error("{0}")]
    Parsing(String),

    /// errors from the registry
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// errors while loading the context file
    #[error(transparent)]
    Load(#[from] LoadError),

    /// errors while saving the context file
    #[error(transparent)]
    Save(#[from] SaveError),

    /// errors from the session
    #[error(transparent)]
    Session(#[from] SessionError),

    /// errors from the console
    #[error(transparent)]
    Console(#[from] ConsoleError),
}

impl From<ValidationError> for MemctxError {
    fn from(e: ValidationError) -> Self {
        MemctxError::Registry(e.into())
    }
}

impl From<IndexError> for MemctxError {
    fn from(e: IndexError) -> Self {
        MemctxError::Registry(e.into())
    }
}
