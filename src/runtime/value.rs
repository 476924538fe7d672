use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::actions::ActionValue;
use crate::contracts::{self, Contract, ContractRef};
use crate::runtime::{
    fault::Fault,
    proxy::Proxy,
    slot::{Slot, SlotKind, SlotRef},
    state::InterpreterState,
};

/// Runtime value of the Vouch core.
///
/// ## Sharing model
///
/// Heap-backed variants use `Arc` so cloning is O(1) and a value may be
/// held by several slots at once. Proxies resolve on arbitrary threads,
/// so every payload is `Send + Sync`. Values are immutable after
/// construction with one exception: arrays, the explicitly mutable
/// composite, guard their items behind an `RwLock`.
///
/// Every value carries exactly one contract, fixed at construction for
/// primitives.
#[derive(Debug, Clone)]
pub enum Value {
    /// Boolean value.
    Boolean(bool),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit IEEE-754 floating point number.
    Real(f64),
    /// UTF-8 string value.
    String(Arc<str>),
    /// Absence of a value.
    Void,
    /// Mutable homogeneous array.
    Array(Arc<ArrayValue>),
    /// Immutable ordered product of values.
    Tuple(Arc<TupleValue>),
    /// Finite set of distinct values.
    Set(Arc<SetValue>),
    /// A contract as a first-class (Meta-typed) value.
    Contract(ContractRef),
    /// Callable action value.
    Action(Arc<dyn ActionValue>),
    /// Deferred value pending resolution.
    Proxy(Arc<Proxy>),
}

impl Value {
    pub fn string(text: &str) -> Value {
        Value::String(Arc::from(text))
    }

    /// The contract this value is bound to.
    pub fn contract(&self) -> ContractRef {
        match self {
            Value::Boolean(_) => contracts::BOOLEAN.clone(),
            Value::Integer(_) => contracts::INTEGER.clone(),
            Value::Real(_) => contracts::REAL.clone(),
            Value::String(_) => contracts::STRING.clone(),
            Value::Void => contracts::VOID.clone(),
            Value::Array(v) => v.contract().clone(),
            Value::Tuple(v) => v.contract().clone(),
            Value::Set(_) => contracts::FINITE_SET.clone(),
            Value::Contract(_) => contracts::META.clone(),
            Value::Action(v) => v.contract().clone(),
            Value::Proxy(v) => v.contract(),
        }
    }

    /// Canonical runtime type label used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Real(_) => "Real",
            Value::String(_) => "String",
            Value::Void => "Void",
            Value::Array(_) => "Array",
            Value::Tuple(_) => "Tuple",
            Value::Set(_) => "Set",
            Value::Contract(_) => "Contract",
            Value::Action(_) => "Action",
            Value::Proxy(_) => "Proxy",
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    /// Only `Boolean(false)` and `Void` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Boolean(false) | Value::Void)
    }

    /// Looks up an intrinsic named slot. Composite values expose their
    /// shape through read-only constant slots; primitives expose nothing
    /// beyond a string's length.
    pub fn member(&self, name: &str) -> Option<SlotRef> {
        let intrinsic = |value: i64, name: &str| {
            Some(Slot::preloaded(
                name,
                contracts::INTEGER.clone(),
                SlotKind::Constant,
                Value::Integer(value),
            ))
        };
        match (self, name) {
            (Value::Array(v), "length") => intrinsic(v.len() as i64, name),
            (Value::Array(v), "rank") => intrinsic(v.rank() as i64, name),
            (Value::String(v), "length") => intrinsic(v.chars().count() as i64, name),
            (Value::Set(v), "count") => intrinsic(v.len() as i64, name),
            (Value::Tuple(v), "count") => intrinsic(v.len() as i64, name),
            _ => None,
        }
    }

    /// Invokes this value with positional arguments. Actions run their
    /// bodies, contract values construct objects, completed proxies
    /// forward to the resolved value.
    pub fn invoke(
        &self,
        this: Option<Value>,
        args: Vec<Value>,
        state: &InterpreterState,
    ) -> Result<Value, Fault> {
        match self {
            Value::Action(action) => action.invoke(this, args, state),
            Value::Contract(contract) => contract.create_object(&args, state),
            Value::Proxy(proxy) if proxy.is_completed() => {
                proxy.unwrap(state)?.invoke(this, args, state)
            }
            _ => Err(Fault::Unsupported(format!(
                "value of contract {} is not callable",
                self.contract()
            ))),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            // IEEE-754 semantics: NaN != NaN, -0.0 == 0.0.
            (Value::Real(a), Value::Real(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Void, Value::Void) => true,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a == b,
            (Value::Contract(a), Value::Contract(b)) => Arc::ptr_eq(a, b) || a == b,
            (Value::Action(a), Value::Action(b)) => {
                std::ptr::eq(Arc::as_ptr(a) as *const u8, Arc::as_ptr(b) as *const u8)
            }
            (Value::Proxy(a), Value::Proxy(b)) => Arc::ptr_eq(a, b),
            // Different kinds are never equal; the equality operator
            // promotes numerics separately.
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Real(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "\"{}\"", v),
            Value::Void => write!(f, "void"),
            Value::Array(v) => {
                let items: Vec<String> = v.snapshot().iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Value::Tuple(v) => {
                let items: Vec<String> = v.members().iter().map(|e| e.to_string()).collect();
                write!(f, "({})", items.join(", "))
            }
            Value::Set(v) => {
                let items: Vec<String> = v.members().iter().map(|e| e.to_string()).collect();
                write!(f, "{{{}}}", items.join(", "))
            }
            Value::Contract(c) => write!(f, "{}", c),
            Value::Action(a) => write!(f, "<action {}>", a.name()),
            Value::Proxy(p) if p.is_completed() => write!(f, "<proxy: completed>"),
            Value::Proxy(_) => write!(f, "<proxy: pending>"),
        }
    }
}

/// Mutable homogeneous array value: an element contract, a rank, and the
/// guarded item storage. Rank is enforced here, at construction and on
/// every write, not by the contract relationship.
#[derive(Debug)]
pub struct ArrayValue {
    element: ContractRef,
    rank: u8,
    item_contract: ContractRef,
    contract: ContractRef,
    items: RwLock<Vec<Value>>,
}

impl ArrayValue {
    /// Builds an array, converting every item into the item contract
    /// (the element contract for rank 1, an array contract one rank
    /// lower otherwise).
    pub fn new(
        element: ContractRef,
        rank: u8,
        items: Vec<Value>,
        state: &InterpreterState,
    ) -> Result<Arc<Self>, Fault> {
        let array = ArrayValue::empty(element, rank);
        for item in items {
            array.push(item, state)?;
        }
        Ok(array)
    }

    pub fn empty(element: ContractRef, rank: u8) -> Arc<Self> {
        let rank = rank.max(1);
        let item_contract = if rank == 1 {
            element.clone()
        } else {
            Contract::array_of(element.clone(), rank - 1).unwrap_or_else(|_| element.clone())
        };
        let contract =
            Contract::array_of(element.clone(), rank).unwrap_or_else(|_| element.clone());
        Arc::new(Self {
            element,
            rank,
            item_contract,
            contract,
            items: RwLock::new(Vec::new()),
        })
    }

    pub fn element(&self) -> &ContractRef {
        &self.element
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    pub fn contract(&self) -> &ContractRef {
        &self.contract
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.read().get(index).cloned()
    }

    pub fn push(&self, value: Value, state: &InterpreterState) -> Result<(), Fault> {
        let stored = self.admit(value, state)?;
        self.items.write().push(stored);
        Ok(())
    }

    pub fn set(&self, index: usize, value: Value, state: &InterpreterState) -> Result<(), Fault> {
        let stored = self.admit(value, state)?;
        let mut items = self.items.write();
        match items.get_mut(index) {
            Some(slot) => {
                *slot = stored;
                Ok(())
            }
            None => Err(Fault::script_text(&format!(
                "array index {} out of range (length {})",
                index,
                items.len()
            ))),
        }
    }

    /// A point-in-time copy of the items.
    pub fn snapshot(&self) -> Vec<Value> {
        self.items.read().clone()
    }

    fn admit(&self, value: Value, state: &InterpreterState) -> Result<Value, Fault> {
        if self
            .item_contract
            .relationship_to(&value.contract())
            .accepts()
        {
            Ok(value)
        } else {
            self.item_contract.convert(value, state)
        }
    }
}

impl PartialEq for ArrayValue {
    fn eq(&self, other: &Self) -> bool {
        self.rank == other.rank
            && *self.element == *other.element
            && self.snapshot() == other.snapshot()
    }
}

/// Immutable ordered product of values under a cartesian contract.
#[derive(Debug, PartialEq)]
pub struct TupleValue {
    members: Vec<Value>,
    contract: ContractRef,
}

impl TupleValue {
    pub fn new(members: Vec<Value>) -> Arc<Self> {
        let contract = Contract::cartesian_of(members.iter().map(|m| m.contract()).collect());
        Arc::new(Self { members, contract })
    }

    pub fn members(&self) -> &[Value] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.members.get(index)
    }

    pub fn contract(&self) -> &ContractRef {
        &self.contract
    }
}

/// Finite set value: distinct members in insertion order.
#[derive(Debug)]
pub struct SetValue {
    members: Vec<Value>,
}

impl SetValue {
    pub fn new(members: Vec<Value>) -> Arc<Self> {
        let mut distinct: Vec<Value> = Vec::with_capacity(members.len());
        for member in members {
            if !distinct.contains(&member) {
                distinct.push(member);
            }
        }
        Arc::new(Self { members: distinct })
    }

    pub fn members(&self) -> &[Value] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.members.iter().any(|m| m == value)
    }
}

impl PartialEq for SetValue {
    fn eq(&self, other: &Self) -> bool {
        self.members.len() == other.members.len() && self.members.iter().all(|m| other.contains(m))
    }
}
