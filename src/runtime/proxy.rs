use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::contracts::{self, ContractRef};
use crate::runtime::{
    fault::Fault,
    operators::{BinaryOp, UnaryOp},
    state::InterpreterState,
    value::Value,
};

type Resolver = Box<dyn FnOnce(&InterpreterState) -> Result<Value, Fault> + Send>;

/// A deferred value: a resolver that has not run yet, or its published
/// outcome.
///
/// The state machine is `Pending -> Completed` with no other
/// transitions. The first caller of [`Proxy::unwrap`] takes the resolver
/// under the resolution lock and computes while holding it; concurrent
/// callers block on that lock, then read the same published outcome from
/// the write-once cell. A cached fault is re-raised to every waiter.
///
/// A resolver must not re-enter `unwrap` on its own proxy.
pub struct Proxy {
    resolver: Mutex<Option<Resolver>>,
    done: OnceLock<Result<Value, Fault>>,
    required: Mutex<Vec<ContractRef>>,
}

impl Proxy {
    pub fn new<F>(resolver: F) -> Arc<Self>
    where
        F: FnOnce(&InterpreterState) -> Result<Value, Fault> + Send + 'static,
    {
        Arc::new(Self {
            resolver: Mutex::new(Some(Box::new(resolver))),
            done: OnceLock::new(),
            required: Mutex::new(Vec::new()),
        })
    }

    /// A proxy born completed. Useful when a deferred computation turns
    /// out to be available immediately.
    pub fn completed(value: Value) -> Arc<Self> {
        let proxy = Self {
            resolver: Mutex::new(None),
            done: OnceLock::new(),
            required: Mutex::new(Vec::new()),
        };
        let _ = proxy.done.set(Ok(value));
        Arc::new(proxy)
    }

    pub fn is_completed(&self) -> bool {
        self.done.get().is_some()
    }

    /// The proxy's best known contract: the resolved value's contract
    /// once completed, otherwise the most recently required contract,
    /// `Void` when nothing was declared yet.
    pub fn contract(&self) -> ContractRef {
        if let Some(Ok(value)) = self.done.get() {
            return value.contract();
        }
        self.required
            .lock()
            .last()
            .cloned()
            .unwrap_or_else(|| contracts::VOID.clone())
    }

    /// Declares a contract the eventual value must satisfy. Requirements
    /// accumulate conjunctively; a value failing any of them turns the
    /// resolution outcome into a fault. Declared against a completed
    /// proxy, the requirement is checked immediately.
    pub fn require_contract(
        &self,
        contract: ContractRef,
        state: &InterpreterState,
    ) -> Result<(), Fault> {
        if let Some(outcome) = self.done.get() {
            let value = outcome.clone()?;
            if contract.relationship_to(&value.contract()).accepts() {
                return Ok(());
            }
            contract.convert(value, state)?;
            return Ok(());
        }
        trace!(contract = %contract, "requirement declared on pending proxy");
        self.required.lock().push(contract);
        Ok(())
    }

    /// Resolves the proxy, running the resolver at most once across all
    /// callers, and returns the cached outcome thereafter.
    pub fn unwrap(&self, state: &InterpreterState) -> Result<Value, Fault> {
        if let Some(outcome) = self.done.get() {
            return outcome.clone();
        }
        let mut resolver = self.resolver.lock();
        // A racing caller may have published while this one waited.
        if let Some(outcome) = self.done.get() {
            return outcome.clone();
        }
        let outcome = match resolver.take() {
            Some(run) => run(state).and_then(|value| self.apply_requirements(value, state)),
            None => Err(Fault::Unsupported(
                "proxy has no resolver and no outcome".to_string(),
            )),
        };
        let _ = self.done.set(outcome.clone());
        debug!(completed = outcome.is_ok(), "proxy resolved");
        outcome
    }

    fn apply_requirements(
        &self,
        mut value: Value,
        state: &InterpreterState,
    ) -> Result<Value, Fault> {
        let required = self.required.lock().clone();
        for contract in required {
            if contract.relationship_to(&value.contract()).accepts() {
                continue;
            }
            value = contract.convert(value, state)?;
        }
        Ok(value)
    }

    /// Schedules `left <op> self` against the eventual value. A
    /// completed proxy evaluates immediately; a pending one yields a new
    /// proxy, itself enqueueable, so deferred operations chain without
    /// blocking.
    pub fn enqueue(
        self: &Arc<Self>,
        left: Value,
        op: BinaryOp,
        state: &InterpreterState,
    ) -> Result<Value, Fault> {
        if self.is_completed() {
            let value = self.unwrap(state)?;
            return left.binary_operation(op, &value, state);
        }
        let source = Arc::clone(self);
        Ok(Value::Proxy(Proxy::new(move |state| {
            let right = source.unwrap(state)?;
            left.binary_operation(op, &right, state)
        })))
    }

    /// Schedules `self <op> right` for a pending proxy on the left of a
    /// binary operator.
    pub(crate) fn defer_left(
        source: &Arc<Self>,
        op: BinaryOp,
        right: Value,
        state: &InterpreterState,
    ) -> Result<Value, Fault> {
        if source.is_completed() {
            let left = source.unwrap(state)?;
            return left.binary_operation(op, &right, state);
        }
        let source = Arc::clone(source);
        Ok(Value::Proxy(Proxy::new(move |state| {
            let left = source.unwrap(state)?;
            left.binary_operation(op, &right, state)
        })))
    }

    /// Schedules `<op> self` for a pending proxy under a unary operator.
    pub(crate) fn defer_unary(
        source: &Arc<Self>,
        op: UnaryOp,
        state: &InterpreterState,
    ) -> Result<Value, Fault> {
        if source.is_completed() {
            return source.unwrap(state)?.unary_operation(op, state);
        }
        let source = Arc::clone(source);
        Ok(Value::Proxy(Proxy::new(move |state| {
            source.unwrap(state)?.unary_operation(op, state)
        })))
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("completed", &self.is_completed())
            .field("requirements", &self.required.lock().len())
            .finish()
    }
}
