//! Structural type descriptors ("contracts") and their relationship
//! algebra.
//!
//! Builtin contracts are process-lifetime singletons compared by pointer
//! identity first. Composite contracts are constructed once, immutable
//! afterwards, and carry a fingerprint computed at construction so hashing
//! and equality never walk the structure twice.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

pub mod action;
pub mod algebra;
pub mod array;
mod conversion;
pub mod relationship;
pub mod set;

pub use action::ActionContract;
pub use algebra::{CartesianContract, ComplementContract, UnionContract};
pub use array::ArrayContract;
pub use relationship::Relationship;
pub use set::SetContract;

use crate::runtime::{fault::Fault, value::Value};

pub type ContractRef = Arc<Contract>;

/// The builtin Boolean contract.
pub static BOOLEAN: LazyLock<ContractRef> = LazyLock::new(|| Arc::new(Contract::Boolean));
/// The builtin Integer contract.
pub static INTEGER: LazyLock<ContractRef> = LazyLock::new(|| Arc::new(Contract::Integer));
/// The builtin Real contract.
pub static REAL: LazyLock<ContractRef> = LazyLock::new(|| Arc::new(Contract::Real));
/// The builtin String contract.
pub static STRING: LazyLock<ContractRef> = LazyLock::new(|| Arc::new(Contract::String));
/// The builtin Void contract.
pub static VOID: LazyLock<ContractRef> = LazyLock::new(|| Arc::new(Contract::Void));
/// The builtin Callable contract, satisfied by every action value.
pub static CALLABLE: LazyLock<ContractRef> = LazyLock::new(|| Arc::new(Contract::Callable));
/// The builtin Meta contract, satisfied by contract values.
pub static META: LazyLock<ContractRef> = LazyLock::new(|| Arc::new(Contract::Meta));
/// The builtin FiniteSet contract, satisfied by set values.
pub static FINITE_SET: LazyLock<ContractRef> = LazyLock::new(|| Arc::new(Contract::FiniteSet));
/// The builtin Dimensional contract for unit-carrying quantities.
pub static DIMENSIONAL: LazyLock<ContractRef> = LazyLock::new(|| Arc::new(Contract::Dimensional));
/// `Complement(Void)`: relates `Same` to every non-void contract and is
/// used wherever "any value" is an acceptable shape.
pub static NON_VOID: LazyLock<ContractRef> =
    LazyLock::new(|| Arc::new(Contract::Complement(ComplementContract::new(VOID.clone()))));

#[derive(Debug)]
pub enum Contract {
    Boolean,
    Integer,
    Real,
    String,
    Void,
    Callable,
    Meta,
    FiniteSet,
    Dimensional,
    Array(ArrayContract),
    Action(ActionContract),
    Set(SetContract),
    Union(UnionContract),
    Complement(ComplementContract),
    Cartesian(CartesianContract),
}

impl Contract {
    /// Builds an array contract. Rank zero is structurally meaningless.
    pub fn array_of(element: ContractRef, rank: u8) -> Result<ContractRef, Fault> {
        if rank == 0 {
            return Err(Fault::Unsupported(
                "array contracts require a rank of at least 1".to_string(),
            ));
        }
        Ok(Arc::new(Contract::Array(ArrayContract::new(element, rank))))
    }

    pub fn action_of(parameters: Vec<ContractRef>, returns: Option<ContractRef>) -> ContractRef {
        Arc::new(Contract::Action(ActionContract::new(parameters, returns)))
    }

    /// Builds a literal enumeration contract from at least two members.
    pub fn set_of(members: Vec<Value>) -> Result<ContractRef, Fault> {
        if members.len() < 2 {
            return Err(Fault::Unsupported(format!(
                "set contracts require at least 2 literal members, got {}",
                members.len()
            )));
        }
        Ok(Arc::new(Contract::Set(SetContract::new(members))))
    }

    /// Builds a union. A single member collapses to that member.
    pub fn union_of(mut members: Vec<ContractRef>) -> Result<ContractRef, Fault> {
        match members.len() {
            0 => Err(Fault::Unsupported(
                "union contracts require at least one member".to_string(),
            )),
            1 => Ok(members.swap_remove(0)),
            _ => Ok(Arc::new(Contract::Union(UnionContract::new(members)))),
        }
    }

    pub fn complement_of(negated: ContractRef) -> ContractRef {
        Arc::new(Contract::Complement(ComplementContract::new(negated)))
    }

    pub fn cartesian_of(members: Vec<ContractRef>) -> ContractRef {
        Arc::new(Contract::Cartesian(CartesianContract::new(members)))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Contract::Void)
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(
            self,
            Contract::Array(_)
                | Contract::Action(_)
                | Contract::Set(_)
                | Contract::Union(_)
                | Contract::Complement(_)
                | Contract::Cartesian(_)
        )
    }

    /// The short kind label used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Contract::Boolean => "Boolean",
            Contract::Integer => "Integer",
            Contract::Real => "Real",
            Contract::String => "String",
            Contract::Void => "Void",
            Contract::Callable => "Callable",
            Contract::Meta => "Meta",
            Contract::FiniteSet => "FiniteSet",
            Contract::Dimensional => "Dimensional",
            Contract::Array(_) => "Array",
            Contract::Action(_) => "Action",
            Contract::Set(_) => "Set",
            Contract::Union(_) => "Union",
            Contract::Complement(_) => "Complement",
            Contract::Cartesian(_) => "Cartesian",
        }
    }

    pub fn fingerprint(&self) -> u64 {
        match self {
            Contract::Boolean => 1,
            Contract::Integer => 2,
            Contract::Real => 3,
            Contract::String => 4,
            Contract::Void => 5,
            Contract::Callable => 6,
            Contract::Meta => 7,
            Contract::FiniteSet => 8,
            Contract::Dimensional => 9,
            Contract::Array(c) => c.fingerprint(),
            Contract::Action(c) => c.fingerprint(),
            Contract::Set(c) => c.fingerprint(),
            Contract::Union(c) => c.fingerprint(),
            Contract::Complement(c) => c.fingerprint(),
            Contract::Cartesian(c) => c.fingerprint(),
        }
    }

    /// Computes how `self` relates to `other`, read left to right.
    ///
    /// Unions and complements are resolved before the kind-by-kind rules
    /// so that algebraic combinators compose on either side of the probe.
    pub fn relationship_to(&self, other: &Contract) -> Relationship {
        if std::ptr::eq(self, other) || self == other {
            return Relationship::Same;
        }
        match (self, other) {
            // Complements resolve before unions on either side, keeping
            // the inversion law exact for union probes.
            (Contract::Complement(c), _) => c.relationship_to(other),
            (_, Contract::Complement(c)) => c.relationship_to(self).flip(),
            (Contract::Union(u), _) => u.relationship_to(other),
            (_, Contract::Union(u)) => u.relationship_to(self).flip(),
            (Contract::Array(a), Contract::Array(b)) => a.element().relationship_to(b.element()),
            (Contract::Action(a), Contract::Action(b)) => a.relationship_to(b),
            (Contract::Action(_), Contract::Callable) => Relationship::Subset,
            (Contract::Callable, Contract::Action(_)) => Relationship::Superset,
            (Contract::Set(a), Contract::Set(b)) => a.relationship_to(b),
            (Contract::Cartesian(a), Contract::Cartesian(b)) => a.relationship_to(b),
            _ => Relationship::None,
        }
    }
}

impl PartialEq for Contract {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        if self.fingerprint() != other.fingerprint() {
            return false;
        }
        match (self, other) {
            (Contract::Boolean, Contract::Boolean)
            | (Contract::Integer, Contract::Integer)
            | (Contract::Real, Contract::Real)
            | (Contract::String, Contract::String)
            | (Contract::Void, Contract::Void)
            | (Contract::Callable, Contract::Callable)
            | (Contract::Meta, Contract::Meta)
            | (Contract::FiniteSet, Contract::FiniteSet)
            | (Contract::Dimensional, Contract::Dimensional) => true,
            (Contract::Array(a), Contract::Array(b)) => a == b,
            (Contract::Action(a), Contract::Action(b)) => a == b,
            (Contract::Set(a), Contract::Set(b)) => a == b,
            (Contract::Union(a), Contract::Union(b)) => a == b,
            (Contract::Complement(a), Contract::Complement(b)) => a == b,
            (Contract::Cartesian(a), Contract::Cartesian(b)) => a == b,
            _ => false,
        }
    }
}

impl Hash for Contract {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.fingerprint());
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contract::Array(c) => {
                write!(f, "{}", c.element())?;
                for _ in 0..c.rank() {
                    write!(f, "[]")?;
                }
                Ok(())
            }
            Contract::Action(c) => {
                write!(f, "(")?;
                for (i, p) in c.parameters().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ")")?;
                match c.returns() {
                    Some(r) => write!(f, " -> {}", r),
                    Option::None => write!(f, " -> Void"),
                }
            }
            Contract::Set(c) => {
                write!(f, "{{")?;
                for (i, m) in c.members().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", m)?;
                }
                write!(f, "}}")
            }
            Contract::Union(c) => {
                for (i, m) in c.members().iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", m)?;
                }
                Ok(())
            }
            Contract::Complement(c) => write!(f, "!{}", c.negated()),
            Contract::Cartesian(c) => {
                write!(f, "(")?;
                for (i, m) in c.members().iter().enumerate() {
                    if i > 0 {
                        write!(f, " * ")?;
                    }
                    write!(f, "{}", m)?;
                }
                write!(f, ")")
            }
            builtin => write!(f, "{}", builtin.kind_name()),
        }
    }
}

/// Mixes a kind tag and part fingerprints into a cached contract
/// fingerprint.
pub(crate) fn fingerprint_parts(tag: u8, parts: impl IntoIterator<Item = u64>) -> u64 {
    use std::hash::DefaultHasher;
    let mut hasher = DefaultHasher::new();
    tag.hash(&mut hasher);
    for part in parts {
        part.hash(&mut hasher);
    }
    hasher.finish()
}
