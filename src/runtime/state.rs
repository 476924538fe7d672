//! Ambient interpreter state threaded through every core operation, plus
//! the collaborator interfaces the core consumes but does not implement.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::runtime::{slot::SlotRef, value::Value};

/// Ambient evaluation policy: Checked faults on mismatches, Unchecked
/// silently coerces to a contract's void-default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalMode {
    Checked,
    Unchecked,
}

/// Deduplicating pool for primitive values, keyed by canonical bit
/// identity. Purely a cache: the core behaves identically with it absent.
pub trait InternPool: Send + Sync {
    fn intern(&self, value: Value) -> Value;
    fn is_interned(&self, value: &Value) -> bool;
}

/// Inspection hook notified when a named slot is created. The core
/// functions correctly without one.
pub trait SlotObserver: Send + Sync {
    fn slot_declared(&self, name: &str, slot: &SlotRef);
}

/// Converter from a foreign host value into a contract-typed value.
/// Consulted only at the interpreter boundary, never by the contract,
/// slot, proxy or action logic.
pub trait HostConversion: Send + Sync {
    fn try_convert(&self, host: &dyn Any) -> Option<Value>;
}

/// Ordered registry of host converters; the first converter that accepts
/// a host value wins.
#[derive(Default)]
pub struct HostBridge {
    converters: Vec<Arc<dyn HostConversion>>,
}

impl HostBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, converter: Arc<dyn HostConversion>) {
        self.converters.push(converter);
    }

    pub fn convert_host(&self, host: &dyn Any) -> Option<Value> {
        self.converters.iter().find_map(|c| c.try_convert(host))
    }
}

/// Per-evaluation interpreter state: the mode plus optional collaborator
/// handles. Cheap to clone and safe to share across threads.
#[derive(Clone)]
pub struct InterpreterState {
    mode: EvalMode,
    interner: Option<Arc<dyn InternPool>>,
    observer: Option<Arc<dyn SlotObserver>>,
}

impl InterpreterState {
    pub fn new(mode: EvalMode) -> Self {
        Self {
            mode,
            interner: None,
            observer: None,
        }
    }

    pub fn checked() -> Self {
        Self::new(EvalMode::Checked)
    }

    pub fn unchecked() -> Self {
        Self::new(EvalMode::Unchecked)
    }

    pub fn with_interner(mut self, interner: Arc<dyn InternPool>) -> Self {
        self.interner = Some(interner);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn SlotObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn mode(&self) -> EvalMode {
        self.mode
    }

    pub fn is_checked(&self) -> bool {
        self.mode == EvalMode::Checked
    }

    pub fn is_unchecked(&self) -> bool {
        self.mode == EvalMode::Unchecked
    }

    /// Routes a value through the intern pool when one is attached.
    pub fn intern(&self, value: Value) -> Value {
        match &self.interner {
            Some(pool) => pool.intern(value),
            None => value,
        }
    }

    pub(crate) fn observe_slot(&self, name: &str, slot: &SlotRef) {
        if let Some(observer) = &self.observer {
            observer.slot_declared(name, slot);
        }
    }
}

impl fmt::Debug for InterpreterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterpreterState")
            .field("mode", &self.mode)
            .field("interner", &self.interner.is_some())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
