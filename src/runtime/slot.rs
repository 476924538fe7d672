use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::contracts::ContractRef;
use crate::runtime::{
    fault::Fault,
    state::{EvalMode, InterpreterState},
    value::Value,
};

/// Storage policy of a slot: variables take repeated writes, constants
/// take exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Variable,
    Constant,
}

pub type SlotRef = Arc<Slot>;

/// A named, contract-bound storage cell.
///
/// Writes are contract-checked; mutation is mutually exclusive per slot
/// through the cell mutex, never through a global lock. A slot may hold
/// a pending proxy; the proxy then carries the slot's contract as a
/// resolution requirement.
pub struct Slot {
    name: Arc<str>,
    contract: ContractRef,
    kind: SlotKind,
    cell: Mutex<Option<Value>>,
}

impl Slot {
    pub fn variable(name: &str, contract: ContractRef) -> SlotRef {
        Arc::new(Self {
            name: Arc::from(name),
            contract,
            kind: SlotKind::Variable,
            cell: Mutex::new(None),
        })
    }

    pub fn constant(name: &str, contract: ContractRef) -> SlotRef {
        Arc::new(Self {
            name: Arc::from(name),
            contract,
            kind: SlotKind::Constant,
            cell: Mutex::new(None),
        })
    }

    /// Builds a slot already holding `value`, bypassing the write path.
    /// Used for intrinsic members and other core-seeded cells.
    pub(crate) fn preloaded(
        name: &str,
        contract: ContractRef,
        kind: SlotKind,
        value: Value,
    ) -> SlotRef {
        Arc::new(Self {
            name: Arc::from(name),
            contract,
            kind,
            cell: Mutex::new(Some(value)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contract(&self) -> &ContractRef {
        &self.contract
    }

    pub fn kind(&self) -> SlotKind {
        self.kind
    }

    pub fn is_constant(&self) -> bool {
        self.kind == SlotKind::Constant
    }

    /// True iff the slot currently holds a value.
    pub fn has_value(&self) -> bool {
        self.cell.lock().is_some()
    }

    /// Writes `value` into the slot and returns what was stored.
    ///
    /// `None` stores nothing and yields the contract's void-default. A
    /// completed proxy is unwrapped first; a pending proxy is stored
    /// as-is after registering this slot's contract as a resolution
    /// requirement. Anything else must satisfy the slot contract, by
    /// relationship or by implicit conversion. Populated constants
    /// fault in Checked mode and keep their value in Unchecked mode.
    pub fn set_value(
        &self,
        value: Option<Value>,
        state: &InterpreterState,
    ) -> Result<Value, Fault> {
        // Unwrap completed proxies before taking the cell lock so
        // resolution code never runs under it.
        let value = match value {
            Some(Value::Proxy(proxy)) if proxy.is_completed() => Some(proxy.unwrap(state)?),
            other => other,
        };

        let mut cell = self.cell.lock();
        if self.is_constant() {
            if let Some(existing) = cell.as_ref() {
                return match state.mode() {
                    EvalMode::Checked => Err(Fault::ConstantWrite {
                        slot: self.name.to_string(),
                    }),
                    EvalMode::Unchecked => Ok(existing.clone()),
                };
            }
        }

        match value {
            None => {
                drop(cell);
                debug!(slot = %self.name, "empty write, yielding void-default");
                self.contract.from_void(state)
            }
            Some(Value::Proxy(proxy)) => {
                proxy.require_contract(self.contract.clone(), state)?;
                let stored = Value::Proxy(proxy);
                *cell = Some(stored.clone());
                trace!(slot = %self.name, "stored pending proxy");
                Ok(stored)
            }
            Some(value) => {
                let stored = if self
                    .contract
                    .relationship_to(&value.contract())
                    .accepts()
                {
                    value
                } else {
                    self.contract.convert(value, state)?
                };
                *cell = Some(stored.clone());
                trace!(slot = %self.name, contract = %self.contract, "stored value");
                Ok(stored)
            }
        }
    }

    /// Reads the slot. An empty slot yields the contract's void-default
    /// in Unchecked mode and faults in Checked mode.
    pub fn get_value(&self, state: &InterpreterState) -> Result<Value, Fault> {
        let stored = self.cell.lock().clone();
        match stored {
            Some(value) => Ok(value),
            None => match state.mode() {
                EvalMode::Unchecked => self.contract.from_void(state),
                EvalMode::Checked => Err(Fault::UnassignedRead {
                    slot: self.name.to_string(),
                }),
            },
        }
    }

    /// Clears the stored value. Constants and empty slots are a no-op
    /// returning `false`. The reclamation flag is accepted for protocol
    /// compatibility; dropping the value is already eager here.
    pub fn delete_value(&self, _force_reclaim: bool) -> bool {
        if self.is_constant() {
            return false;
        }
        let dropped = self.cell.lock().take().is_some();
        if dropped {
            debug!(slot = %self.name, "cleared");
        }
        dropped
    }
}

impl PartialEq for Slot {
    /// Two slots are equal when they bind the same contract and are
    /// either both empty or hold equal values.
    fn eq(&self, other: &Self) -> bool {
        if *self.contract != *other.contract {
            return false;
        }
        let ours = self.cell.lock().clone();
        let theirs = other.cell.lock().clone();
        ours == theirs
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("name", &self.name)
            .field("contract", &self.contract.to_string())
            .field("kind", &self.kind)
            .field("populated", &self.has_value())
            .finish()
    }
}
