//! Error surface for the localization compiler.
//!
//! Two classes of failures flow through this type: known errors that a user
//! can act on (malformed interchange files, file-system failures, mixing the
//! runtime and compile-time configuration APIs) and `Internal` errors that
//! signal a violated contract between the extraction step and the transform
//! pass. Internal errors still carry a diagnostic naming the broken
//! invariant.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid locale code {0:?}")]
    InvalidLocale(String),

    #[error("message has an empty name")]
    EmptyMessageName,

    #[error("error parsing translation file {}: {message}", path.display())]
    CorruptTranslationFile { path: PathBuf, message: String },

    #[error("invalid config {}: {message}", path.display())]
    BadConfig { path: PathBuf, message: String },

    #[error("failed to read {}: {source} (is the file readable?)", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source} (do you have write permission for this directory?)", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid translations glob {pattern:?}: {message}")]
    BadGlob { pattern: String, message: String },

    #[error(
        "{file}: configureLocalization() is incompatible with transform output; \
         use configureTransformLocalization() instead"
    )]
    RuntimeConfigInTransformMode { file: String },

    #[error(
        "translation of message {id:?} for locale {locale:?} alters its placeholders; \
         placeholders may be reordered but never edited, added, or dropped"
    )]
    PlaceholderMismatch { id: String, locale: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for a violated extraction/transform contract.
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal(message.into())
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::CorruptTranslationFile {
            path: path.into(),
            message: message.into(),
        }
    }
}
