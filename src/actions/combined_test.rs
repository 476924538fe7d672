use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::actions::combined::CombinedAction;
use crate::actions::native::{ActionValue, NativeAction, Parameter};
use crate::actions::operator_invokers::{binary_invoker, unary_invoker};
use crate::contracts::{self, Contract};
use crate::runtime::{
    fault::Fault,
    operators::{BinaryOp, UnaryOp},
    state::InterpreterState,
    value::Value,
};

fn checked() -> InterpreterState {
    InterpreterState::checked()
}

fn tagged(name: &str, contract: crate::contracts::ContractRef, tag: i64) -> Arc<dyn ActionValue> {
    NativeAction::new(
        name,
        vec![Parameter::new("x", contract)],
        Some(contracts::INTEGER.clone()),
        move |_| Ok(Value::Integer(tag)),
    )
}

#[test]
fn first_applicable_candidate_wins() {
    let combined = CombinedAction::of(
        "f",
        vec![
            tagged("f_int", contracts::INTEGER.clone(), 1),
            tagged("f_str", contracts::STRING.clone(), 2),
        ],
    )
    .unwrap();

    // A String argument must select the second candidate, never the
    // first.
    let result = combined
        .invoke(None, vec![Value::string("hello")], &checked())
        .unwrap();
    assert_eq!(result, Value::Integer(2));

    let result = combined
        .invoke(None, vec![Value::Integer(5)], &checked())
        .unwrap();
    assert_eq!(result, Value::Integer(1));
}

#[test]
fn registration_order_breaks_ties() {
    // Both candidates admit an Integer argument (Real converts it), so
    // the earlier registration wins.
    let combined = CombinedAction::of(
        "g",
        vec![
            tagged("g_real", contracts::REAL.clone(), 10),
            tagged("g_int", contracts::INTEGER.clone(), 20),
        ],
    )
    .unwrap();

    let result = combined
        .invoke(None, vec![Value::Integer(4)], &checked())
        .unwrap();
    assert_eq!(result, Value::Integer(10));
}

#[test]
fn no_applicable_candidate_faults() {
    let combined = CombinedAction::of(
        "f",
        vec![tagged("f_int", contracts::INTEGER.clone(), 1)],
    )
    .unwrap();

    let err = combined
        .invoke(None, vec![Value::Integer(1), Value::Integer(2)], &checked())
        .unwrap_err();
    assert!(matches!(err, Fault::ArgumentCount { .. }));
}

#[test]
fn arity_disambiguates_candidates() {
    let one = tagged("one", contracts::INTEGER.clone(), 1);
    let two: Arc<dyn ActionValue> = NativeAction::new(
        "two",
        vec![
            Parameter::new("a", contracts::INTEGER.clone()),
            Parameter::new("b", contracts::INTEGER.clone()),
        ],
        Some(contracts::INTEGER.clone()),
        |_| Ok(Value::Integer(2)),
    );
    let combined = CombinedAction::of("n", vec![one, two]).unwrap();

    assert_eq!(
        combined
            .invoke(None, vec![Value::Integer(0)], &checked())
            .unwrap(),
        Value::Integer(1)
    );
    assert_eq!(
        combined
            .invoke(None, vec![Value::Integer(0), Value::Integer(0)], &checked())
            .unwrap(),
        Value::Integer(2)
    );
}

#[test]
fn combining_flattens_candidate_lists_in_order() {
    let a = tagged("a", contracts::INTEGER.clone(), 1);
    let b = tagged("b", contracts::STRING.clone(), 2);
    let c = tagged("c", contracts::REAL.clone(), 3);

    let left = CombinedAction::of("left", vec![a, b]).unwrap();
    let left: Arc<dyn ActionValue> = left;
    let combined = CombinedAction::combine("all", &left, &c).unwrap();

    let names: Vec<String> = combined
        .candidates()
        .unwrap()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn combining_two_bundles_concatenates() {
    let first = CombinedAction::of(
        "first",
        vec![tagged("a", contracts::INTEGER.clone(), 1)],
    )
    .unwrap();
    let second = CombinedAction::of(
        "second",
        vec![
            tagged("b", contracts::STRING.clone(), 2),
            tagged("c", contracts::REAL.clone(), 3),
        ],
    )
    .unwrap();

    let first: Arc<dyn ActionValue> = first;
    let second: Arc<dyn ActionValue> = second;
    let combined = CombinedAction::combine("both", &first, &second).unwrap();
    assert_eq!(combined.candidates().unwrap().len(), 3);
}

#[test]
fn empty_candidate_list_is_rejected() {
    assert!(matches!(
        CombinedAction::of("none", vec![]),
        Err(Fault::Unsupported(_))
    ));
}

#[test]
fn bundle_contract_is_a_union_of_signatures() {
    let combined = CombinedAction::of(
        "f",
        vec![
            tagged("f_int", contracts::INTEGER.clone(), 1),
            tagged("f_str", contracts::STRING.clone(), 2),
        ],
    )
    .unwrap();
    assert!(matches!(&**combined.contract(), Contract::Union(_)));
}

#[test]
fn binary_invoker_forwards_to_operand_dispatch() {
    let add = binary_invoker(BinaryOp::Add);
    let result = add
        .invoke(None, vec![Value::Integer(2), Value::Integer(3)], &checked())
        .unwrap();
    assert_eq!(result, Value::Integer(5));

    let err = add
        .invoke(None, vec![Value::Integer(2)], &checked())
        .unwrap_err();
    assert!(matches!(err, Fault::ArgumentCount { .. }));
}

#[test]
fn unary_invoker_forwards_to_operand_dispatch() {
    let not = unary_invoker(UnaryOp::Not);
    let result = not
        .invoke(None, vec![Value::Boolean(false)], &checked())
        .unwrap();
    assert_eq!(result, Value::Boolean(true));
}

#[test]
fn invokers_are_shared_singletons() {
    let a = binary_invoker(BinaryOp::Mul);
    let b = binary_invoker(BinaryOp::Mul);
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn operator_invokers_mix_into_bundles() {
    let ran = Arc::new(AtomicUsize::new(0));
    let witness = ran.clone();
    let fallback: Arc<dyn ActionValue> = NativeAction::new(
        "fallback",
        vec![Parameter::new("s", contracts::STRING.clone())],
        Some(contracts::STRING.clone()),
        move |ctx| {
            witness.fetch_add(1, Ordering::SeqCst);
            Ok(Value::String(ctx.string_arg(0)?))
        },
    );
    let add: Arc<dyn ActionValue> = binary_invoker(BinaryOp::Add);
    let combined = CombinedAction::combine("plus", &add, &fallback).unwrap();

    let result = combined
        .invoke(None, vec![Value::Integer(1), Value::Integer(2)], &checked())
        .unwrap();
    assert_eq!(result, Value::Integer(3));

    let result = combined
        .invoke(None, vec![Value::string("solo")], &checked())
        .unwrap();
    assert_eq!(result, Value::string("solo"));
    assert_eq!(ran.load(Ordering::SeqCst), 1);
}
