use crate::contracts::{ContractRef, fingerprint_parts, relationship::Relationship};

/// Signature contract of a callable: ordered parameter contracts plus an
/// optional return contract. Actions are type-checked exactly like data
/// values through this contract.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionContract {
    parameters: Vec<ContractRef>,
    returns: Option<ContractRef>,
    fingerprint: u64,
}

impl ActionContract {
    pub(crate) fn new(parameters: Vec<ContractRef>, returns: Option<ContractRef>) -> Self {
        let parts = parameters
            .iter()
            .map(|p| p.fingerprint())
            .chain(returns.iter().map(|r| r.fingerprint()));
        let fingerprint = fingerprint_parts(11, parts);
        Self {
            parameters,
            returns,
            fingerprint,
        }
    }

    pub fn parameters(&self) -> &[ContractRef] {
        &self.parameters
    }

    pub fn returns(&self) -> Option<&ContractRef> {
        self.returns.as_ref()
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub(crate) fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Signatures relate conservatively: structurally equal ones are
    /// `Same`, everything else is `None`.
    pub(crate) fn relationship_to(&self, other: &ActionContract) -> Relationship {
        if self.parameters.len() != other.parameters.len() {
            return Relationship::None;
        }
        let params_match = self
            .parameters
            .iter()
            .zip(&other.parameters)
            .all(|(a, b)| a.relationship_to(b) == Relationship::Same);
        if !params_match {
            return Relationship::None;
        }
        match (&self.returns, &other.returns) {
            (Option::None, Option::None) => Relationship::Same,
            (Some(a), Some(b)) if a.relationship_to(b) == Relationship::Same => Relationship::Same,
            _ => Relationship::None,
        }
    }
}
