//! Operators as first-class action values.
//!
//! Unary and binary invokers are the 1- and 2-arity degenerate case of
//! the action framework: each closes over an operator tag and forwards
//! to the operand's own dispatch. The static tables below hand out one
//! shared invoker per operator.

use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::actions::native::{ActionValue, Parameter};
use crate::contracts::{self, Contract, ContractRef};
use crate::runtime::{
    fault::Fault,
    operators::{BinaryOp, UnaryOp},
    state::InterpreterState,
    value::Value,
};

pub struct BinaryOperatorAction {
    op: BinaryOp,
    name: Arc<str>,
    parameters: Vec<Parameter>,
    returns: ContractRef,
    contract: ContractRef,
}

impl BinaryOperatorAction {
    fn new(op: BinaryOp) -> Arc<Self> {
        let anything = contracts::NON_VOID.clone();
        let parameters = vec![
            Parameter::new("left", anything.clone()),
            Parameter::new("right", anything.clone()),
        ];
        let contract = Contract::action_of(
            vec![anything.clone(), anything.clone()],
            Some(anything.clone()),
        );
        Arc::new(Self {
            op,
            name: Arc::from(format!("operator {}", op.symbol())),
            parameters,
            returns: anything,
            contract,
        })
    }

    pub fn operator(&self) -> BinaryOp {
        self.op
    }
}

impl ActionValue for BinaryOperatorAction {
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
        Some(&self.returns)
    }

    fn invoke(
        &self,
        _this: Option<Value>,
        mut args: Vec<Value>,
        state: &InterpreterState,
    ) -> Result<Value, Fault> {
        if args.len() != 2 {
            return Err(Fault::ArgumentCount {
                action: self.name.to_string(),
                expected: "2".to_string(),
                got: args.len(),
            });
        }
        let right = args.pop().unwrap_or(Value::Void);
        let left = args.pop().unwrap_or(Value::Void);
        left.binary_operation(self.op, &right, state)
    }
}

impl fmt::Debug for BinaryOperatorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BinaryOperatorAction({})", self.op)
    }
}

pub struct UnaryOperatorAction {
    op: UnaryOp,
    name: Arc<str>,
    parameters: Vec<Parameter>,
    returns: ContractRef,
    contract: ContractRef,
}

impl UnaryOperatorAction {
    fn new(op: UnaryOp) -> Arc<Self> {
        let anything = contracts::NON_VOID.clone();
        let parameters = vec![Parameter::new("operand", anything.clone())];
        let contract = Contract::action_of(vec![anything.clone()], Some(anything.clone()));
        Arc::new(Self {
            op,
            name: Arc::from(format!("operator {}", op.symbol())),
            parameters,
            returns: anything,
            contract,
        })
    }

    pub fn operator(&self) -> UnaryOp {
        self.op
    }
}

impl ActionValue for UnaryOperatorAction {
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
        Some(&self.returns)
    }

    fn invoke(
        &self,
        _this: Option<Value>,
        mut args: Vec<Value>,
        state: &InterpreterState,
    ) -> Result<Value, Fault> {
        if args.len() != 1 {
            return Err(Fault::ArgumentCount {
                action: self.name.to_string(),
                expected: "1".to_string(),
                got: args.len(),
            });
        }
        let operand = args.pop().unwrap_or(Value::Void);
        operand.unary_operation(self.op, state)
    }
}

impl fmt::Debug for UnaryOperatorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnaryOperatorAction({})", self.op)
    }
}

/// One shared invoker per binary operator, in declaration order.
pub static BINARY_INVOKERS: LazyLock<Vec<Arc<BinaryOperatorAction>>> =
    LazyLock::new(|| BinaryOp::ALL.iter().map(|op| BinaryOperatorAction::new(*op)).collect());

/// One shared invoker per unary operator.
pub static UNARY_INVOKERS: LazyLock<Vec<Arc<UnaryOperatorAction>>> = LazyLock::new(|| {
    [UnaryOp::Neg, UnaryOp::Not]
        .iter()
        .map(|op| UnaryOperatorAction::new(*op))
        .collect()
});

pub fn binary_invoker(op: BinaryOp) -> Arc<BinaryOperatorAction> {
    BINARY_INVOKERS
        .iter()
        .find(|invoker| invoker.operator() == op)
        .cloned()
        .unwrap_or_else(|| BinaryOperatorAction::new(op))
}

pub fn unary_invoker(op: UnaryOp) -> Arc<UnaryOperatorAction> {
    UNARY_INVOKERS
        .iter()
        .find(|invoker| invoker.operator() == op)
        .cloned()
        .unwrap_or_else(|| UnaryOperatorAction::new(op))
}
