//! Certificate extraction pipeline.

pub mod parser;
pub mod rules;

pub use parser::{CertificateExtractor, CertificateParser, ExtractionResult};
