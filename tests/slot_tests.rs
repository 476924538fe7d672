use std::sync::{Arc, Mutex};

use vouch::contracts;
use vouch::runtime::{
    fault::Fault,
    slot::{Slot, SlotRef},
    state::{InterpreterState, SlotObserver},
    value::Value,
};

#[test]
fn void_write_scenario_is_mode_dependent() {
    let slot = Slot::variable("n", contracts::INTEGER.clone());

    let err = slot
        .set_value(Some(Value::Void), &InterpreterState::checked())
        .unwrap_err();
    assert!(matches!(err, Fault::ContractMismatch { .. }));

    let stored = slot
        .set_value(Some(Value::Void), &InterpreterState::unchecked())
        .unwrap();
    assert_eq!(stored, Value::Integer(0));
}

#[test]
fn constants_bind_once_and_hold() {
    let checked = InterpreterState::checked();
    let slot = Slot::constant("origin", contracts::STRING.clone());

    slot.set_value(Some(Value::string("north")), &checked)
        .unwrap();
    assert!(matches!(
        slot.set_value(Some(Value::string("south")), &checked),
        Err(Fault::ConstantWrite { .. })
    ));
    assert_eq!(slot.get_value(&checked).unwrap(), Value::string("north"));
    assert!(!slot.delete_value(true));
}

#[test]
fn slots_shared_across_threads_stay_consistent() {
    let slot = Slot::variable("shared", contracts::REAL.clone());
    let mut handles = Vec::new();
    for i in 0..4 {
        let slot = slot.clone();
        handles.push(std::thread::spawn(move || {
            let state = InterpreterState::checked();
            for j in 0..50 {
                slot.set_value(Some(Value::Integer(i * 100 + j)), &state)
                    .unwrap();
                let value = slot.get_value(&state).unwrap();
                assert!(matches!(value, Value::Real(_)));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn observer_sees_parameter_slots() {
    #[derive(Default)]
    struct Recorder {
        names: Mutex<Vec<String>>,
    }
    impl SlotObserver for Recorder {
        fn slot_declared(&self, name: &str, _slot: &SlotRef) {
            self.names.lock().unwrap().push(name.to_string());
        }
    }

    use vouch::actions::{NativeAction, Parameter};

    let recorder = Arc::new(Recorder::default());
    let state = InterpreterState::checked().with_observer(recorder.clone());

    let action = NativeAction::new(
        "observe_me",
        vec![
            Parameter::new("first", contracts::INTEGER.clone()),
            Parameter::new("second", contracts::STRING.clone()),
        ],
        None,
        |_| Ok(Value::Void),
    );
    use vouch::actions::ActionValue;
    action
        .invoke(None, vec![Value::Integer(1), Value::string("x")], &state)
        .unwrap();

    assert_eq!(
        *recorder.names.lock().unwrap(),
        vec!["first".to_string(), "second".to_string()]
    );
}

#[test]
fn intern_pool_round_trips_values() {
    use std::collections::HashMap;
    use vouch::runtime::intern::BitKey;
    use vouch::runtime::state::InternPool;

    #[derive(Default)]
    struct Pool {
        entries: Mutex<HashMap<BitKey, Value>>,
    }
    impl InternPool for Pool {
        fn intern(&self, value: Value) -> Value {
            match BitKey::of(&value) {
                Some(key) => self
                    .entries
                    .lock()
                    .unwrap()
                    .entry(key)
                    .or_insert(value)
                    .clone(),
                None => value,
            }
        }
        fn is_interned(&self, value: &Value) -> bool {
            BitKey::of(value)
                .map(|key| self.entries.lock().unwrap().contains_key(&key))
                .unwrap_or(false)
        }
    }

    let pool = Arc::new(Pool::default());
    let state = InterpreterState::checked().with_interner(pool.clone());

    let first = state.intern(Value::string("shared"));
    assert!(pool.is_interned(&first));
    let second = state.intern(Value::string("shared"));
    match (first, second) {
        (Value::String(a), Value::String(b)) => assert!(Arc::ptr_eq(&a, &b)),
        _ => panic!("expected string values"),
    }
}
