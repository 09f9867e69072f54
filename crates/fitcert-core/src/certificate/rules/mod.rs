//! Declarative detection rules for certificate fields.

pub mod checkbox;
pub mod exams;
pub mod fields;
pub mod fitness;
pub mod patterns;
pub mod resolve;
pub mod restrictions;

pub use checkbox::{Detection, MARKER_WINDOW};
pub use resolve::{EvidenceSource, FieldResolver};
