use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::actions::native::{ActionValue, Parameter};
use crate::contracts::{Contract, ContractRef};
use crate::runtime::{fault::Fault, state::InterpreterState, value::Value};

/// An overload bundle: an ordered list of candidate actions under a
/// unioned signature contract.
///
/// Invocation scans candidates in registration order and runs the first
/// one whose arity and parameter contracts accept the arguments. There
/// is no best-match scoring; order is the tiebreak, so registration
/// order is significant and preserved by combination.
pub struct CombinedAction {
    name: Arc<str>,
    candidates: Vec<Arc<dyn ActionValue>>,
    contract: ContractRef,
}

impl CombinedAction {
    pub fn of(name: &str, candidates: Vec<Arc<dyn ActionValue>>) -> Result<Arc<Self>, Fault> {
        if candidates.is_empty() {
            return Err(Fault::Unsupported(
                "a combined action requires at least one candidate".to_string(),
            ));
        }
        let contract =
            Contract::union_of(candidates.iter().map(|c| c.contract().clone()).collect())?;
        Ok(Arc::new(Self {
            name: Arc::from(name),
            candidates,
            contract,
        }))
    }

    /// Combines two actions into one bundle. Bundles flatten: combining
    /// two combined actions concatenates their candidate lists, and
    /// combining with a single action appends it.
    pub fn combine(
        name: &str,
        left: &Arc<dyn ActionValue>,
        right: &Arc<dyn ActionValue>,
    ) -> Result<Arc<Self>, Fault> {
        let mut candidates = Vec::new();
        push_flat(&mut candidates, left);
        push_flat(&mut candidates, right);
        CombinedAction::of(name, candidates)
    }

    fn applicable_arities(&self) -> String {
        let mut arities: Vec<usize> = self.candidates.iter().map(|c| c.arity()).collect();
        arities.sort_unstable();
        arities.dedup();
        arities
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(" or ")
    }
}

fn push_flat(list: &mut Vec<Arc<dyn ActionValue>>, action: &Arc<dyn ActionValue>) {
    match action.candidates() {
        Some(inner) => list.extend(inner.iter().cloned()),
        None => list.push(action.clone()),
    }
}

impl ActionValue for CombinedAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn contract(&self) -> &ContractRef {
        &self.contract
    }

    /// A bundle has no single parameter list of its own.
    fn parameters(&self) -> &[Parameter] {
        &[]
    }

    fn returns(&self) -> Option<&ContractRef> {
        None
    }

    fn accepts(&self, args: &[Value]) -> bool {
        self.candidates.iter().any(|c| c.accepts(args))
    }

    fn candidates(&self) -> Option<&[Arc<dyn ActionValue>]> {
        Some(&self.candidates)
    }

    fn invoke(
        &self,
        this: Option<Value>,
        args: Vec<Value>,
        state: &InterpreterState,
    ) -> Result<Value, Fault> {
        for candidate in &self.candidates {
            if candidate.accepts(&args) {
                trace!(bundle = %self.name, candidate = %candidate.name(), "selected");
                return candidate.invoke(this, args, state);
            }
        }
        Err(Fault::ArgumentCount {
            action: self.name.to_string(),
            expected: self.applicable_arities(),
            got: args.len(),
        })
    }
}

impl fmt::Debug for CombinedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombinedAction")
            .field("name", &self.name)
            .field("candidates", &self.candidates.len())
            .finish()
    }
}
