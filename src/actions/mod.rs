//! The invocation framework: a uniform calling convention across
//! native-implemented callables of every arity.
//!
//! Arguments bind into fresh contract-typed slots before any body runs,
//! so invocation reuses the same write path as ordinary variables and
//! inherits its dual-mode policy.

pub mod combined;
pub mod context;
pub mod native;
pub mod operator_invokers;

pub use combined::CombinedAction;
pub use context::InvocationContext;
pub use native::{ActionValue, NativeAction, NativeBody, Parameter};
pub use operator_invokers::{
    BinaryOperatorAction, UnaryOperatorAction, binary_invoker, unary_invoker,
};

#[cfg(test)]
mod combined_test;
