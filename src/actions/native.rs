use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::actions::context::InvocationContext;
use crate::contracts::{Contract, ContractRef};
use crate::runtime::{
    fault::Fault,
    slot::{Slot, SlotRef},
    state::InterpreterState,
    value::Value,
};

/// A named, contract-typed parameter of an action.
#[derive(Debug, Clone)]
pub struct Parameter {
    name: Arc<str>,
    contract: ContractRef,
}

impl Parameter {
    pub fn new(name: &str, contract: ContractRef) -> Self {
        Self {
            name: Arc::from(name),
            contract,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contract(&self) -> &ContractRef {
        &self.contract
    }
}

/// Capability set of every callable value.
///
/// Arity is data: an ordered parameter list of any length, never a
/// family of fixed-arity shapes. Implementations differ only in what
/// `invoke` runs once the calling convention has done its work.
pub trait ActionValue: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// The composite signature contract; actions type-check like data.
    fn contract(&self) -> &ContractRef;

    fn parameters(&self) -> &[Parameter];

    fn returns(&self) -> Option<&ContractRef>;

    fn invoke(
        &self,
        this: Option<Value>,
        args: Vec<Value>,
        state: &InterpreterState,
    ) -> Result<Value, Fault>;

    fn arity(&self) -> usize {
        self.parameters().len()
    }

    /// Mode-independent probe: would these arguments bind? Overload
    /// scanning relies on this answering identically in Checked and
    /// Unchecked mode.
    fn accepts(&self, args: &[Value]) -> bool {
        args.len() == self.arity()
            && self
                .parameters()
                .iter()
                .zip(args)
                .all(|(parameter, arg)| parameter.contract().admits(arg))
    }

    /// The ordered candidate list when this action is an overload
    /// bundle; plain actions answer `None`.
    fn candidates(&self) -> Option<&[Arc<dyn ActionValue>]> {
        None
    }
}

pub type NativeBody =
    Arc<dyn Fn(&mut InvocationContext<'_>) -> Result<Value, Fault> + Send + Sync>;

/// A native-implemented action: ordered parameters, an optional return
/// contract, and the body run under an [`InvocationContext`].
pub struct NativeAction {
    name: Arc<str>,
    parameters: Vec<Parameter>,
    returns: Option<ContractRef>,
    contract: ContractRef,
    body: NativeBody,
}

impl NativeAction {
    pub fn new<F>(
        name: &str,
        parameters: Vec<Parameter>,
        returns: Option<ContractRef>,
        body: F,
    ) -> Arc<Self>
    where
        F: Fn(&mut InvocationContext<'_>) -> Result<Value, Fault> + Send + Sync + 'static,
    {
        let contract = Contract::action_of(
            parameters.iter().map(|p| p.contract().clone()).collect(),
            returns.clone(),
        );
        Arc::new(Self {
            name: Arc::from(name),
            parameters,
            returns,
            contract,
            body: Arc::new(body),
        })
    }

    /// Binds positional arguments into fresh slots typed by the
    /// parameter contracts. The arity check runs before any binding; a
    /// rejected argument reports which parameter refused it.
    fn bind(&self, args: Vec<Value>, state: &InterpreterState) -> Result<Vec<SlotRef>, Fault> {
        if args.len() != self.parameters.len() {
            return Err(Fault::ArgumentCount {
                action: self.name.to_string(),
                expected: self.parameters.len().to_string(),
                got: args.len(),
            });
        }
        let mut slots = Vec::with_capacity(args.len());
        for (parameter, arg) in self.parameters.iter().zip(args) {
            let slot = Slot::variable(parameter.name(), parameter.contract().clone());
            slot.set_value(Some(arg), state)
                .map_err(|fault| Fault::ArgumentContract {
                    action: self.name.to_string(),
                    parameter: parameter.name().to_string(),
                    reason: fault.to_string(),
                })?;
            state.observe_slot(parameter.name(), &slot);
            slots.push(slot);
        }
        Ok(slots)
    }
}

impl ActionValue for NativeAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn contract(&self) -> &ContractRef {
        &self.contract
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    fn returns(&self) -> Option<&ContractRef> {
        self.returns.as_ref()
    }

    fn invoke(
        &self,
        this: Option<Value>,
        args: Vec<Value>,
        state: &InterpreterState,
    ) -> Result<Value, Fault> {
        let slots = self.bind(args, state)?;
        debug!(action = %self.name, arity = slots.len(), "invoking");
        let mut context = InvocationContext::new(state, self, this, slots);
        let result = (self.body)(&mut context)?;
        match &self.returns {
            Some(ret) => {
                if ret.relationship_to(&result.contract()).accepts() {
                    Ok(result)
                } else {
                    ret.convert(result, state)
                }
            }
            // Without a declared return contract the action is
            // effect-only and always yields Void.
            None => Ok(Value::Void),
        }
    }
}

impl fmt::Debug for NativeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeAction")
            .field("name", &self.name)
            .field("contract", &self.contract.to_string())
            .finish()
    }
}
