use crate::contracts::{ContractRef, fingerprint_parts};

/// Homogeneous array contract: an element contract plus a rank.
///
/// Rank is enforced when an array value is constructed, never by the
/// relationship computation. Two array contracts relate exactly as their
/// element contracts do.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayContract {
    element: ContractRef,
    rank: u8,
    fingerprint: u64,
}

impl ArrayContract {
    pub(crate) fn new(element: ContractRef, rank: u8) -> Self {
        let fingerprint = fingerprint_parts(10, [element.fingerprint(), rank as u64]);
        Self {
            element,
            rank,
            fingerprint,
        }
    }

    pub fn element(&self) -> &ContractRef {
        &self.element
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    pub(crate) fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}
