//! Conflict resolution across evidence sources.
//!
//! Every detected field is scanned in up to five places. When sources
//! disagree, the ranking below decides; within one rank the first
//! offered value sticks.

/// Where a piece of evidence came from. Declaration order is priority
/// order, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EvidenceSource {
    /// A table whose inferred type matches the field family.
    TypedTable,
    /// A headed section dedicated to the field family.
    MatchingSection,
    /// Any other recognized table.
    OtherTable,
    /// Any other headed section.
    OtherSection,
    /// The raw document text.
    RawText,
}

impl EvidenceSource {
    /// All sources in priority order.
    pub const RANKED: [EvidenceSource; 5] = [
        EvidenceSource::TypedTable,
        EvidenceSource::MatchingSection,
        EvidenceSource::OtherTable,
        EvidenceSource::OtherSection,
        EvidenceSource::RawText,
    ];
}

/// Keeps the best-ranked value offered so far for one field.
#[derive(Debug, Clone)]
pub struct FieldResolver<T> {
    best: Option<(EvidenceSource, T)>,
}

impl<T> FieldResolver<T> {
    pub fn new() -> Self {
        FieldResolver { best: None }
    }

    /// True once a value is held; lower-ranked sources need not be
    /// consulted.
    pub fn resolved(&self) -> bool {
        self.best.is_some()
    }

    /// Offers a value. Kept only when strictly better ranked than the
    /// current holder (first offer wins within a rank).
    pub fn offer(&mut self, source: EvidenceSource, value: T) {
        match &self.best {
            Some((held, _)) if *held <= source => {}
            _ => self.best = Some((source, value)),
        }
    }

    pub fn into_value(self) -> Option<T> {
        self.best.map(|(_, value)| value)
    }
}

impl<T> Default for FieldResolver<T> {
    fn default() -> Self {
        FieldResolver::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_ranked_source_wins() {
        let mut resolver = FieldResolver::new();
        resolver.offer(EvidenceSource::RawText, "raw");
        resolver.offer(EvidenceSource::TypedTable, "table");
        assert_eq!(resolver.into_value(), Some("table"));
    }

    #[test]
    fn first_offer_wins_within_a_rank() {
        let mut resolver = FieldResolver::new();
        resolver.offer(EvidenceSource::MatchingSection, "first");
        resolver.offer(EvidenceSource::MatchingSection, "second");
        assert_eq!(resolver.into_value(), Some("first"));
    }

    #[test]
    fn lower_ranked_source_never_replaces() {
        let mut resolver = FieldResolver::new();
        resolver.offer(EvidenceSource::OtherTable, 1);
        resolver.offer(EvidenceSource::RawText, 2);
        assert!(resolver.resolved());
        assert_eq!(resolver.into_value(), Some(1));
    }
}
