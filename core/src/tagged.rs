//! Categorized errors that remember where they were raised.
//!
//! A [`TaggedError`] carries an [`ErrorCategory`], a message, an optional
//! cause and the source location of the code that built it. Callers further
//! up the stack ask [`category_of`] or [`matches`] what kind of failure they
//! are looking at, even when the tagged error sits underneath other errors.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::panic::Location;
use thiserror::Error;

/// Owned cause stored inside a [`TaggedError`].
pub type BoxedCause = Box<dyn StdError + Send + Sync + 'static>;

/// Kind of failure a [`TaggedError`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// A file, key, record or host that was looked up does not exist.
    NotFound,
    /// Caller-supplied input was rejected.
    Validation,
    /// A persistence layer failed.
    Database,
    /// A remote endpoint could not be reached or answered badly.
    Network,
    /// Local I/O failed for a reason other than a missing path.
    Io,
    /// Encoding or decoding structured data failed.
    Serialization,
    /// A cryptographic primitive rejected its input.
    Crypto,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 7] = [
        ErrorCategory::NotFound,
        ErrorCategory::Validation,
        ErrorCategory::Database,
        ErrorCategory::Network,
        ErrorCategory::Io,
        ErrorCategory::Serialization,
        ErrorCategory::Crypto,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::NotFound => "NotFoundError",
            Self::Validation => "ValidationError",
            Self::Database => "DatabaseError",
            Self::Network => "NetworkError",
            Self::Io => "IoError",
            Self::Serialization => "SerializationError",
            Self::Crypto => "CryptoError",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An immutable, categorized error.
///
/// The origin is captured with `#[track_caller]`, so it points at the line
/// that called the constructor rather than at this module.
#[derive(Debug, Error)]
#[error("[{category}] {message} ({origin})")]
pub struct TaggedError {
    category: ErrorCategory,
    message: String,
    #[source]
    cause: Option<BoxedCause>,
    origin: &'static Location<'static>,
}

impl TaggedError {
    #[track_caller]
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            cause: None,
            origin: Location::caller(),
        }
    }

    /// Create a tagged error that keeps `cause` as its source.
    #[track_caller]
    pub fn with_cause(
        category: ErrorCategory,
        message: impl Into<String>,
        cause: impl Into<BoxedCause>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            cause: Some(cause.into()),
            origin: Location::caller(),
        }
    }

    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::NotFound, message)
    }

    #[track_caller]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Validation, message)
    }

    #[track_caller]
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Database, message)
    }

    #[track_caller]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Network, message)
    }

    #[track_caller]
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Io, message)
    }

    #[track_caller]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Serialization, message)
    }

    #[track_caller]
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Crypto, message)
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn origin(&self) -> &'static Location<'static> {
        self.origin
    }

    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Give up the tagged wrapper and return the owned cause.
    pub fn into_cause(self) -> Option<BoxedCause> {
        self.cause
    }
}

/// Category of the first [`TaggedError`] found while walking `err` and its
/// `source()` chain. The outermost tagged error wins.
pub fn category_of(err: &(dyn StdError + 'static)) -> Option<ErrorCategory> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(tagged) = e.downcast_ref::<TaggedError>() {
            return Some(tagged.category);
        }
        current = e.source();
    }
    None
}

pub fn matches(err: &(dyn StdError + 'static), category: ErrorCategory) -> bool {
    category_of(err) == Some(category)
}

/// [`matches`] for an error that may be absent; `None` never matches.
pub fn matches_opt(err: Option<&(dyn StdError + 'static)>, category: ErrorCategory) -> bool {
    err.is_some_and(|e| matches(e, category))
}

/// Tag the error side of a `Result`.
pub trait ResultExt<T> {
    fn tag(self, category: ErrorCategory, message: impl Into<String>) -> Result<T, TaggedError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    #[track_caller]
    fn tag(self, category: ErrorCategory, message: impl Into<String>) -> Result<T, TaggedError> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(TaggedError::with_cause(category, message, e)),
        }
    }
}
