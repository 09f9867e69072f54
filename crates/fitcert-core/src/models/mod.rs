//! Data models for certificate extraction.

pub mod certificate;
pub mod envelope;

pub use certificate::{
    CertificateRecord, ExaminationType, FitnessDeclaration, RestrictionItem, TestItem,
    map_to_certificate_fields,
};
pub use envelope::{DocumentEnvelope, EvidenceChunk};
