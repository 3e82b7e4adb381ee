use thiserror::Error;

use crate::field::FieldId;

/// Rejected commits. None of these are fatal: the form reverts the field
/// to its last valid value and keeps going.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("label {label:?} has no identifier in the current {field} list")]
    UnknownLabel { field: FieldId, label: String },

    #[error("identifier {identifier:?} is not part of the current {field} list")]
    UnknownIdentifier { field: FieldId, identifier: String },

    #[error("{field} cannot be committed before {parent}")]
    MissingParent { field: FieldId, parent: FieldId },

    #[error("field {0} is not handled here")]
    UnsupportedField(FieldId),
}

/// Loading failures for bundled or user supplied data files.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ron error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("embedded asset missing: {0}")]
    MissingAsset(String),

    #[error("embedded asset is not valid UTF-8: {0}")]
    InvalidAsset(String),
}

/// Remote collection failures. Callers log these and keep their fallback.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid base url {url:?}: {reason}")]
    InvalidBase { url: String, reason: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server answered {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("malformed body from {url}: {reason}")]
    Malformed { url: String, reason: String },

    #[error("collection {0} returned no usable items")]
    Empty(String),
}
