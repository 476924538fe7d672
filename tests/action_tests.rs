use std::sync::Arc;

use vouch::actions::{
    ActionValue, CombinedAction, NativeAction, Parameter, binary_invoker,
};
use vouch::contracts::{self, Contract};
use vouch::runtime::{
    fault::Fault,
    operators::BinaryOp,
    state::InterpreterState,
    value::Value,
};

fn checked() -> InterpreterState {
    InterpreterState::checked()
}

fn concat_action() -> Arc<NativeAction> {
    NativeAction::new(
        "concat",
        vec![
            Parameter::new("left", contracts::STRING.clone()),
            Parameter::new("right", contracts::STRING.clone()),
        ],
        Some(contracts::STRING.clone()),
        |ctx| {
            let left = ctx.string_arg(0)?;
            let right = ctx.string_arg(1)?;
            Ok(Value::string(&format!("{}{}", left, right)))
        },
    )
}

#[test]
fn actions_are_first_class_values() {
    let state = checked();
    let action: Arc<dyn ActionValue> = concat_action();
    let value = Value::Action(action);

    assert!(matches!(&*value.contract(), Contract::Action(_)));
    assert!(
        contracts::CALLABLE
            .relationship_to(&value.contract())
            .accepts()
    );

    let result = value
        .invoke(None, vec![Value::string("a"), Value::string("b")], &state)
        .unwrap();
    assert_eq!(result, Value::string("ab"));
}

#[test]
fn action_values_bind_into_callable_slots() {
    use vouch::runtime::slot::Slot;

    let state = checked();
    let slot = Slot::variable("f", contracts::CALLABLE.clone());
    let action: Arc<dyn ActionValue> = concat_action();
    slot.set_value(Some(Value::Action(action)), &state).unwrap();

    let stored = slot.get_value(&state).unwrap();
    let result = stored
        .invoke(None, vec![Value::string("x"), Value::string("y")], &state)
        .unwrap();
    assert_eq!(result, Value::string("xy"));

    // Data values do not satisfy the Callable contract.
    assert!(matches!(
        slot.set_value(Some(Value::Integer(1)), &state),
        Err(Fault::ContractMismatch { .. })
    ));
}

#[test]
fn dispatch_scenario_integer_then_string() {
    let state = checked();
    let f_int: Arc<dyn ActionValue> = NativeAction::new(
        "f_int",
        vec![Parameter::new("x", contracts::INTEGER.clone())],
        Some(contracts::STRING.clone()),
        |_| Ok(Value::string("integer branch")),
    );
    let f_str: Arc<dyn ActionValue> = NativeAction::new(
        "f_str",
        vec![Parameter::new("x", contracts::STRING.clone())],
        Some(contracts::STRING.clone()),
        |_| Ok(Value::string("string branch")),
    );
    let combined = CombinedAction::combine("f", &f_int, &f_str).unwrap();

    let result = combined
        .invoke(None, vec![Value::string("probe")], &state)
        .unwrap();
    assert_eq!(result, Value::string("string branch"));
}

#[test]
fn faults_propagate_out_of_native_bodies() {
    let state = checked();
    let failing = NativeAction::new(
        "failing",
        vec![],
        Some(contracts::INTEGER.clone()),
        |_| Err(Fault::script(Value::string("raised by the body"))),
    );
    let err = failing.invoke(None, vec![], &state).unwrap_err();
    assert_eq!(err.payload(), Some(&Value::string("raised by the body")));
}

#[test]
fn pending_proxy_arguments_carry_the_parameter_contract() {
    use vouch::runtime::proxy::Proxy;

    let state = checked();
    let echo = NativeAction::new(
        "echo",
        vec![Parameter::new("x", contracts::REAL.clone())],
        Some(contracts::NON_VOID.clone()),
        |ctx| ctx.arg(0),
    );

    let proxy = Proxy::new(|_| Ok(Value::Integer(8)));
    let result = echo
        .invoke(None, vec![Value::Proxy(proxy.clone())], &state)
        .unwrap();

    // The body saw the still-pending proxy; resolving it afterwards
    // honours the Real parameter contract it picked up while binding.
    assert!(matches!(result, Value::Proxy(_)));
    assert_eq!(proxy.unwrap(&state).unwrap(), Value::Real(8.0));
}

#[test]
fn operators_compose_with_actions_as_values() {
    let state = checked();
    let add: Arc<dyn ActionValue> = binary_invoker(BinaryOp::Add);
    let value = Value::Action(add);

    let result = value
        .invoke(None, vec![Value::Integer(20), Value::Integer(22)], &state)
        .unwrap();
    assert_eq!(result, Value::Integer(42));
}

#[test]
fn unchecked_invocation_never_faults_on_argument_shape() {
    let state = InterpreterState::unchecked();
    let action = NativeAction::new(
        "tolerant",
        vec![Parameter::new("n", contracts::INTEGER.clone())],
        Some(contracts::INTEGER.clone()),
        |ctx| ctx.arg(0),
    );
    // The string coerces to Integer's void-default instead of faulting.
    let result = action
        .invoke(None, vec![Value::string("not a number")], &state)
        .unwrap();
    assert_eq!(result, Value::Integer(0));
}
