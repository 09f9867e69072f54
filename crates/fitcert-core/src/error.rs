//! Error types for the fitcert-core library.

use thiserror::Error;

/// Errors raised by the internal extraction stages.
///
/// Absence of a field is never an error; unresolved fields fall back to
/// empty/false defaults. These variants cover the catastrophic cases
/// only, and the public extraction entry points catch them and return a
/// minimal fallback record instead of propagating.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The envelope carried neither markdown nor evidence captions.
    #[error("no document text found in envelope")]
    NoData,

    /// The input could not be interpreted as a certificate document.
    #[error("malformed input: {0}")]
    Malformed(String),
}

/// Result type for the fitcert-core library.
pub type Result<T> = std::result::Result<T, ExtractionError>;
