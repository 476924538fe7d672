use std::fmt;

/// Structural comparison between two contracts, read as "left relates to
/// right": `Subset` means the left contract describes a narrower set of
/// values than the right one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relationship {
    Same,
    Subset,
    Superset,
    None,
}

impl Relationship {
    /// Inversion used by complement contracts: `Same` and `None` trade
    /// places, as do `Subset` and `Superset`.
    pub fn invert(self) -> Self {
        match self {
            Relationship::Same => Relationship::None,
            Relationship::None => Relationship::Same,
            Relationship::Subset => Relationship::Superset,
            Relationship::Superset => Relationship::Subset,
        }
    }

    /// Swaps the point of view: if A relates to B as `self`, B relates to
    /// A as `self.flip()`.
    pub fn flip(self) -> Self {
        match self {
            Relationship::Subset => Relationship::Superset,
            Relationship::Superset => Relationship::Subset,
            other => other,
        }
    }

    /// True when a value of the probed contract can be stored under the
    /// probing contract without conversion.
    pub fn accepts(self) -> bool {
        matches!(self, Relationship::Same | Relationship::Superset)
    }

    fn rank(self) -> u8 {
        match self {
            Relationship::Same => 3,
            Relationship::Superset => 2,
            Relationship::Subset => 1,
            Relationship::None => 0,
        }
    }

    /// Picks the stronger of two relationships. Union contracts answer
    /// with the best relationship any of their members has.
    pub fn best(self, other: Self) -> Self {
        if other.rank() > self.rank() { other } else { self }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Relationship::Same => "same",
            Relationship::Subset => "subset",
            Relationship::Superset => "superset",
            Relationship::None => "none",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invert_swaps_pairs() {
        assert_eq!(Relationship::Same.invert(), Relationship::None);
        assert_eq!(Relationship::None.invert(), Relationship::Same);
        assert_eq!(Relationship::Subset.invert(), Relationship::Superset);
        assert_eq!(Relationship::Superset.invert(), Relationship::Subset);
    }

    #[test]
    fn invert_is_an_involution() {
        for rel in [
            Relationship::Same,
            Relationship::Subset,
            Relationship::Superset,
            Relationship::None,
        ] {
            assert_eq!(rel.invert().invert(), rel);
        }
    }

    #[test]
    fn flip_only_touches_directional_variants() {
        assert_eq!(Relationship::Same.flip(), Relationship::Same);
        assert_eq!(Relationship::None.flip(), Relationship::None);
        assert_eq!(Relationship::Subset.flip(), Relationship::Superset);
    }

    #[test]
    fn best_prefers_same_over_everything() {
        assert_eq!(
            Relationship::Subset.best(Relationship::Same),
            Relationship::Same
        );
        assert_eq!(
            Relationship::None.best(Relationship::Superset),
            Relationship::Superset
        );
        assert_eq!(
            Relationship::Superset.best(Relationship::Subset),
            Relationship::Superset
        );
    }

    #[test]
    fn accepts_requires_same_or_superset() {
        assert!(Relationship::Same.accepts());
        assert!(Relationship::Superset.accepts());
        assert!(!Relationship::Subset.accepts());
        assert!(!Relationship::None.accepts());
    }
}
