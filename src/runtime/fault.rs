//! Recoverable fault conditions raised by contract checks, slot access,
//! proxy resolution and action invocation.
//!
//! Every fault propagates synchronously through `Result` to the nearest
//! catching frame or to the embedding host; none is process-fatal. Faults
//! are `Clone` so a proxy can cache one and re-raise it to every waiter.

use thiserror::Error;

use crate::contracts::Contract;
use crate::runtime::value::Value;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum Fault {
    /// A value's contract is incompatible with a required contract and no
    /// implicit conversion exists.
    #[error("cannot bind value of contract {found} to contract {expected}")]
    ContractMismatch { expected: String, found: String },

    /// Invocation arity check failed before any body ran. `expected` is a
    /// human-readable arity description ("2", "1 or 2").
    #[error("{action} expects {expected} arguments, got {got}")]
    ArgumentCount {
        action: String,
        expected: String,
        got: usize,
    },

    /// A positional argument failed its parameter contract.
    #[error("{action}: argument '{parameter}' rejected: {reason}")]
    ArgumentContract {
        action: String,
        parameter: String,
        reason: String,
    },

    /// Read of an unpopulated slot in Checked mode.
    #[error("slot '{slot}' read before assignment")]
    UnassignedRead { slot: String },

    /// Write to an already-populated constant slot in Checked mode.
    #[error("constant '{slot}' cannot be changed")]
    ConstantWrite { slot: String },

    /// The operation is structurally undefined for the receiver.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// A script-level exception carrying an arbitrary contract-typed
    /// payload.
    #[error("script fault: {payload}")]
    Script { payload: Value },
}

impl Fault {
    pub fn contract_mismatch(expected: &Contract, found: &Value) -> Self {
        Fault::ContractMismatch {
            expected: expected.to_string(),
            found: found.contract().to_string(),
        }
    }

    pub fn script(payload: Value) -> Self {
        Fault::Script { payload }
    }

    pub fn script_text(message: &str) -> Self {
        Fault::Script {
            payload: Value::string(message),
        }
    }

    /// The payload of a script fault, when this is one.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Fault::Script { payload } => Some(payload),
            _ => None,
        }
    }
}
