//! Error types for decoding and encoding OMSI configuration files.
//!
//! Every error raised while reading a document carries the line number, the
//! field being read and the command type that declares it, so a failure can
//! be traced back to the offending line of the source file.
//!
//! ## Error Categories
//!
//! - **Data Errors**: truncated commands, unparseable values, over-long lines
//! - **Schema Errors**: malformed [`Command`](crate::Command) registrations
//! - **Sub-file Errors**: failures inside recursively expanded documents
//! - **I/O Errors**: failures of the underlying stream
//!
//! Unrecognised tags are never errors; they are kept as comments.
//!
//! ## Examples
//!
//! ```rust
//! use serde_omsi::formats::paths::Paths;
//! use serde_omsi::{from_str, Error};
//!
//! let result: Result<Paths, Error> = from_str("[pathpnt]\n1\noops\n");
//! match result {
//!     Err(Error::InvalidValue { line, field, .. }) => {
//!         assert_eq!(line, 3);
//!         assert_eq!(field, "y");
//!     }
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! ```

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Represents all possible errors that can occur while decoding or encoding.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// The stream ended while a field of a command was still expected.
    #[error("Couldn't read field [{field}] of {owner}! Reached the end of the file unexpectedly at line {line}")]
    UnexpectedEof {
        line: usize,
        field: String,
        owner: String,
    },

    /// A field line could not be converted to its declared type.
    #[error("Couldn't deserialize field [{field}] of {owner}! At file line {line}\nValue '{value}' is not {expected}")]
    InvalidValue {
        line: usize,
        field: String,
        owner: String,
        value: String,
        expected: String,
    },

    /// A field line is longer than [`DecodeOptions::max_line_length`](crate::DecodeOptions).
    #[error("Couldn't deserialize field [{field}] of {owner}! At file line {line}\nLine has {length} characters, the limit is {limit}")]
    LineTooLong {
        line: usize,
        field: String,
        owner: String,
        length: usize,
        limit: usize,
    },

    /// Malformed command registration, reported the first time the type is used.
    #[error("Invalid schema for field [{field}] of {owner}: {message}")]
    Schema {
        owner: String,
        field: String,
        message: String,
    },

    /// A referenced sub-file could not be decoded.
    #[error("Couldn't read referenced file '{}': {source}", path.display())]
    SubFile {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// A referenced sub-file is already being decoded further up the include chain.
    #[error("Referenced file '{}' includes itself", path.display())]
    IncludeCycle { path: PathBuf },

    /// Sub-file expansion nested deeper than the configured limit.
    #[error("Referenced file '{}' exceeds the include depth limit of {limit}", path.display())]
    IncludeDepth { path: PathBuf, limit: usize },

    /// A resolved document did not fit the Rust type of one of its fields.
    #[error("Couldn't convert {}{owner}! {message}", field_of(.field))]
    Conversion {
        owner: String,
        field: String,
        message: String,
    },

    /// Generic message, raised through the serde data model
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Creates a schema construction error for `field` of `owner`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_omsi::Error;
    ///
    /// let err = Error::schema("Mesh", "matls", "no command identifier");
    /// assert!(err.to_string().contains("[matls] of Mesh"));
    /// ```
    pub fn schema(owner: &str, field: &str, message: impl fmt::Display) -> Self {
        Error::Schema {
            owner: owner.to_string(),
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    /// Creates an end-of-file error for a field that was still expected.
    pub fn unexpected_eof(line: usize, field: &str, owner: &str) -> Self {
        Error::UnexpectedEof {
            line,
            field: field.to_string(),
            owner: owner.to_string(),
        }
    }

    /// Creates an error for a field line that failed its type conversion.
    pub fn invalid_value(line: usize, field: &str, owner: &str, value: &str, expected: &str) -> Self {
        Error::InvalidValue {
            line,
            field: field.to_string(),
            owner: owner.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_omsi::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }

    /// Creates an I/O error for file reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Attaches the declaring type and field to a bare message.
    ///
    /// Errors that already name their position are returned unchanged, so
    /// the innermost owner wins.
    pub(crate) fn in_field(self, owner: &str, field: &str) -> Self {
        match self {
            Error::Message(message) => Error::Conversion {
                owner: owner.to_string(),
                field: field.to_string(),
                message,
            },
            other => other,
        }
    }

    /// Whether an optional field may fall back to its default after this error.
    ///
    /// Only failures that concern the content of a single field line qualify;
    /// I/O and schema errors always propagate.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::UnexpectedEof { .. } | Error::InvalidValue { .. } | Error::LineTooLong { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

fn field_of(field: &str) -> String {
    if field.is_empty() {
        String::new()
    } else {
        format!("field [{}] of ", field)
    }
}
