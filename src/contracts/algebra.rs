//! Algebraic contract combinators: unions, complements and cartesian
//! products.

use crate::contracts::{Contract, ContractRef, fingerprint_parts, relationship::Relationship};

/// Ordered union of member contracts. Relates to a probe as the best
/// relationship any member has with it.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionContract {
    members: Vec<ContractRef>,
    fingerprint: u64,
}

impl UnionContract {
    pub(crate) fn new(members: Vec<ContractRef>) -> Self {
        let parts = members.iter().map(|m| m.fingerprint());
        let fingerprint = fingerprint_parts(13, parts);
        Self {
            members,
            fingerprint,
        }
    }

    pub fn members(&self) -> &[ContractRef] {
        &self.members
    }

    pub(crate) fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub(crate) fn relationship_to(&self, probe: &Contract) -> Relationship {
        self.members
            .iter()
            .map(|m| m.relationship_to(probe))
            .fold(Relationship::None, Relationship::best)
    }
}

/// Negation of a contract: relates to a probe as the inversion of the
/// negated contract's relationship. `Complement(Void)` therefore relates
/// `Same` to every non-void contract and doubles as an "anything" shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplementContract {
    negated: ContractRef,
    fingerprint: u64,
}

impl ComplementContract {
    pub(crate) fn new(negated: ContractRef) -> Self {
        let fingerprint = fingerprint_parts(14, [negated.fingerprint()]);
        Self {
            negated,
            fingerprint,
        }
    }

    pub fn negated(&self) -> &ContractRef {
        &self.negated
    }

    pub(crate) fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub(crate) fn relationship_to(&self, probe: &Contract) -> Relationship {
        self.negated.relationship_to(probe).invert()
    }
}

/// Ordered product of member contracts, the shape of tuple values.
#[derive(Debug, Clone, PartialEq)]
pub struct CartesianContract {
    members: Vec<ContractRef>,
    fingerprint: u64,
}

impl CartesianContract {
    pub(crate) fn new(members: Vec<ContractRef>) -> Self {
        let parts = members.iter().map(|m| m.fingerprint());
        let fingerprint = fingerprint_parts(15, parts);
        Self {
            members,
            fingerprint,
        }
    }

    pub fn members(&self) -> &[ContractRef] {
        &self.members
    }

    pub fn arity(&self) -> usize {
        self.members.len()
    }

    pub(crate) fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Every member pair over the shared prefix must be related somehow;
    /// the longer product then counts as a `Subset` of the shorter one.
    /// The directionality is deliberate and pinned by tests.
    pub(crate) fn relationship_to(&self, other: &CartesianContract) -> Relationship {
        let shared = self.members.len().min(other.members.len());
        for (left, right) in self.members.iter().zip(&other.members).take(shared) {
            if left.relationship_to(right) == Relationship::None {
                return Relationship::None;
            }
        }
        match self.members.len().cmp(&other.members.len()) {
            std::cmp::Ordering::Equal => Relationship::Same,
            std::cmp::Ordering::Greater => Relationship::Subset,
            std::cmp::Ordering::Less => Relationship::Superset,
        }
    }
}
