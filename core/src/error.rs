use crate::tagged::{category_of, ErrorCategory, TaggedError};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Tagged(#[from] TaggedError),
}

impl CoreError {
    /// Category of the tagged error inside this one, if any.
    pub fn category(&self) -> Option<ErrorCategory> {
        category_of(self)
    }
}

impl From<walkdir::Error> for CoreError {
    fn from(err: walkdir::Error) -> Self {
        CoreError::Io(err.into())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

// A missing path is worth a NotFound tag; every other I/O failure stays raw.
#[track_caller]
pub(crate) fn io_error(path: &Path, err: std::io::Error) -> CoreError {
    if err.kind() == std::io::ErrorKind::NotFound {
        TaggedError::with_cause(
            ErrorCategory::NotFound,
            format!("{} does not exist", path.display()),
            err,
        )
        .into()
    } else {
        CoreError::Io(err)
    }
}
