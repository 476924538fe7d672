use crate::contracts::{fingerprint_parts, relationship::Relationship};
use crate::runtime::{intern::BitKey, value::Value};

/// A literal enumeration contract: a finite list of at least two member
/// values. A value satisfies the contract by being equal to one of the
/// members.
///
/// Zero- and one-member enumerations are rejected at construction; a
/// single-member set is a literal constant, not a distinct contract.
#[derive(Debug, Clone, PartialEq)]
pub struct SetContract {
    members: Vec<Value>,
    fingerprint: u64,
}

impl SetContract {
    pub(crate) fn new(members: Vec<Value>) -> Self {
        let parts = members.iter().map(member_fingerprint);
        let fingerprint = fingerprint_parts(12, parts);
        Self {
            members,
            fingerprint,
        }
    }

    pub fn members(&self) -> &[Value] {
        &self.members
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.members.iter().any(|m| m == value)
    }

    pub(crate) fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Counts pairwise-equal members between the two enumerations. Full
    /// overlap on both sides is `Same`; the enumeration containing every
    /// member of the other is its `Superset`; anything else is `None`.
    pub(crate) fn relationship_to(&self, other: &SetContract) -> Relationship {
        let shared = self.members.iter().filter(|m| other.contains(m)).count();
        if shared == self.members.len() && shared == other.members.len() {
            Relationship::Same
        } else if shared == other.members.len() {
            Relationship::Superset
        } else if shared == self.members.len() {
            Relationship::Subset
        } else {
            Relationship::None
        }
    }
}

fn member_fingerprint(value: &Value) -> u64 {
    use std::hash::{DefaultHasher, Hash, Hasher};
    match BitKey::of(value) {
        Some(key) => {
            let mut hasher = DefaultHasher::new();
            key.hash(&mut hasher);
            hasher.finish()
        }
        Option::None => value.contract().fingerprint(),
    }
}
