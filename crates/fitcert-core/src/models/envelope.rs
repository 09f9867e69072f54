//! Input envelope for a recognized document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One recognized chunk of a source document, typically a page region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceChunk {
    /// Caption lines recognized for this chunk.
    #[serde(default)]
    pub captions: Vec<String>,
}

/// Document-level input to the extraction engine.
///
/// The usual payload is the full markdown rendering of the document.
/// Some upstream pipelines only deliver per-region evidence captions
/// keyed `"<filename>:<page>"`; those are joined line-wise and run
/// through the same pipeline when no markdown is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentEnvelope {
    /// Markdown-ish OCR rendering of the whole document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,

    /// Recognized chunks keyed by source location. BTreeMap keeps the
    /// join order stable across runs.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub evidence: BTreeMap<String, Vec<EvidenceChunk>>,
}

impl DocumentEnvelope {
    pub fn from_markdown(markdown: impl Into<String>) -> Self {
        DocumentEnvelope {
            markdown: Some(markdown.into()),
            evidence: BTreeMap::new(),
        }
    }

    /// The text the engine should run over: markdown when present,
    /// otherwise all evidence captions joined line-wise in key order.
    pub fn document_text(&self) -> Option<String> {
        if let Some(markdown) = &self.markdown {
            if !markdown.trim().is_empty() {
                return Some(markdown.clone());
            }
        }
        let mut lines = Vec::new();
        for chunks in self.evidence.values() {
            for chunk in chunks {
                for caption in &chunk.captions {
                    if !caption.trim().is_empty() {
                        lines.push(caption.trim().to_string());
                    }
                }
            }
        }
        if lines.is_empty() { None } else { Some(lines.join("\n")) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn markdown_takes_precedence_over_evidence() {
        let mut envelope = DocumentEnvelope::from_markdown("## Document Details");
        envelope.evidence.insert(
            "scan.pdf:1".to_string(),
            vec![EvidenceChunk { captions: vec!["ignored".to_string()] }],
        );
        assert_eq!(envelope.document_text().unwrap(), "## Document Details");
    }

    #[test]
    fn captions_join_in_key_order() {
        let mut envelope = DocumentEnvelope::default();
        envelope.evidence.insert(
            "scan.pdf:2".to_string(),
            vec![EvidenceChunk { captions: vec!["UNFIT".to_string()] }],
        );
        envelope.evidence.insert(
            "scan.pdf:1".to_string(),
            vec![EvidenceChunk {
                captions: vec!["Name: J. Doe".to_string(), " ".to_string()],
            }],
        );
        assert_eq!(envelope.document_text().unwrap(), "Name: J. Doe\nUNFIT");
    }

    #[test]
    fn empty_envelope_yields_no_text() {
        assert_eq!(DocumentEnvelope::default().document_text(), None);
        assert_eq!(DocumentEnvelope::from_markdown("   ").document_text(), None);
    }
}
