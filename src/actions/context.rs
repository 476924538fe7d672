use std::sync::Arc;

use crate::actions::native::ActionValue;
use crate::runtime::{fault::Fault, slot::SlotRef, state::InterpreterState, value::Value};

/// Everything a native body sees while it runs: the ambient state, the
/// invoked action, the optional receiver, and the bound parameter slots.
pub struct InvocationContext<'a> {
    state: &'a InterpreterState,
    action: &'a dyn ActionValue,
    this: Option<Value>,
    slots: Vec<SlotRef>,
}

impl<'a> InvocationContext<'a> {
    pub(crate) fn new(
        state: &'a InterpreterState,
        action: &'a dyn ActionValue,
        this: Option<Value>,
        slots: Vec<SlotRef>,
    ) -> Self {
        Self {
            state,
            action,
            this,
            slots,
        }
    }

    pub fn state(&self) -> &InterpreterState {
        self.state
    }

    pub fn action(&self) -> &dyn ActionValue {
        self.action
    }

    pub fn this(&self) -> Option<&Value> {
        self.this.as_ref()
    }

    pub fn slot(&self, index: usize) -> Option<&SlotRef> {
        self.slots.get(index)
    }

    pub fn slot_named(&self, name: &str) -> Option<&SlotRef> {
        self.slots.iter().find(|slot| slot.name() == name)
    }

    /// Reads the bound argument at `index`.
    pub fn arg(&self, index: usize) -> Result<Value, Fault> {
        match self.slots.get(index) {
            Some(slot) => slot.get_value(self.state),
            None => Err(Fault::Unsupported(format!(
                "{} has no argument at position {}",
                self.action.name(),
                index
            ))),
        }
    }

    pub fn integer_arg(&self, index: usize) -> Result<i64, Fault> {
        match self.arg(index)? {
            Value::Integer(v) => Ok(v),
            other => Err(self.argument_shape(index, "Integer", &other)),
        }
    }

    /// Numeric accessor with integer promotion.
    pub fn real_arg(&self, index: usize) -> Result<f64, Fault> {
        match self.arg(index)? {
            Value::Real(v) => Ok(v),
            Value::Integer(v) => Ok(v as f64),
            other => Err(self.argument_shape(index, "Real", &other)),
        }
    }

    pub fn boolean_arg(&self, index: usize) -> Result<bool, Fault> {
        match self.arg(index)? {
            Value::Boolean(v) => Ok(v),
            other => Err(self.argument_shape(index, "Boolean", &other)),
        }
    }

    pub fn string_arg(&self, index: usize) -> Result<Arc<str>, Fault> {
        match self.arg(index)? {
            Value::String(v) => Ok(v),
            other => Err(self.argument_shape(index, "String", &other)),
        }
    }

    fn argument_shape(&self, index: usize, expected: &str, got: &Value) -> Fault {
        let parameter = self
            .slots
            .get(index)
            .map(|slot| slot.name().to_string())
            .unwrap_or_else(|| index.to_string());
        Fault::ArgumentContract {
            action: self.action.name().to_string(),
            parameter,
            reason: format!("expected {}, got {}", expected, got.type_name()),
        }
    }
}
