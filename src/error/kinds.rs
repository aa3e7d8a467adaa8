use std::{fmt, io};

/// Crate-wide `Result` type using [`TabgenError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, TabgenError>;

/// Top-level error type for tabgen operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum TabgenError {
    /// The command specification cannot be compiled.
    Specification(SpecificationError),

    /// Configuration errors.
    Config(ConfigError),

    /// A specification document could not be read or decoded.
    Document(DocumentError),

    /// I/O errors.
    Io(io::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Fatal, generation-time problems with a command specification.
///
/// Any of these aborts generation; no partial artifact is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecificationError {
    /// Two subcommands of the same node share a name.
    DuplicateSubcommand { prefix: String, name: String },

    /// One invocation string is declared twice with different slot data.
    ConflictingOption { prefix: String, flag: String },

    /// Two distinct subcommand paths collapse onto the same prefix.
    DuplicatePrefix { prefix: String },

    /// A subcommand name or invocation string cannot be represented.
    InvalidName { prefix: String, name: String },

    /// Unrecognised arity text.
    InvalidArity { text: String },
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/// Specification document errors.
#[derive(Debug)]
pub enum DocumentError {
    /// TOML document failed to decode.
    Toml(String),

    /// JSON document failed to decode.
    Json(String),
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for TabgenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabgenError::Specification(e) => write!(f, "Specification error: {e}"),
            TabgenError::Config(e) => write!(f, "Configuration error: {e}"),
            TabgenError::Document(e) => write!(f, "Document error: {e}"),
            TabgenError::Io(e) => write!(f, "I/O error: {e}"),
            TabgenError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for SpecificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecificationError::DuplicateSubcommand { prefix, name } => {
                write!(f, "duplicate subcommand '{name}' under '{prefix}'")
            }
            SpecificationError::ConflictingOption { prefix, flag } => {
                write!(f, "conflicting declarations of option '{flag}' under '{prefix}'")
            }
            SpecificationError::DuplicatePrefix { prefix } => {
                write!(f, "two subcommand paths share the prefix '{prefix}'")
            }
            SpecificationError::InvalidName { prefix, name } => {
                write!(f, "invalid name '{name}' under '{prefix}'")
            }
            SpecificationError::InvalidArity { text } => {
                write!(f, "invalid arity '{text}' (expected a count, '?', '*', '+' or '...')")
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::Toml(msg) => write!(f, "invalid TOML specification: {msg}"),
            DocumentError::Json(msg) => write!(f, "invalid JSON specification: {msg}"),
        }
    }
}

impl std::error::Error for TabgenError {}
impl std::error::Error for SpecificationError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for DocumentError {}

/* ========================= Conversions to TabgenError ========================= */

impl From<io::Error> for TabgenError {
    fn from(err: io::Error) -> Self {
        TabgenError::Io(err)
    }
}

impl From<SpecificationError> for TabgenError {
    fn from(err: SpecificationError) -> Self {
        TabgenError::Specification(err)
    }
}

impl From<ConfigError> for TabgenError {
    fn from(err: ConfigError) -> Self {
        TabgenError::Config(err)
    }
}

impl From<DocumentError> for TabgenError {
    fn from(err: DocumentError) -> Self {
        TabgenError::Document(err)
    }
}

impl From<String> for TabgenError {
    fn from(msg: String) -> Self {
        TabgenError::Generic(msg)
    }
}

impl From<&str> for TabgenError {
    fn from(msg: &str) -> Self {
        TabgenError::Generic(msg.to_owned())
    }
}
