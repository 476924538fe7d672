use std::sync::Arc;

use crate::contracts::Contract;
use crate::runtime::{
    fault::Fault,
    state::InterpreterState,
    value::{ArrayValue, SetValue, TupleValue, Value},
};

impl Contract {
    /// Attempts the builtin coercion of `value` into this contract.
    ///
    /// Mapping is deliberately narrow: it never invents structure, it only
    /// reinterprets primitives whose payload already fits (`1` into
    /// `true`, an integer into a real). Composite contracts never map.
    pub fn mapping(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (Contract::Boolean, Value::Boolean(v)) => Some(Value::Boolean(*v)),
            (Contract::Boolean, Value::Integer(0)) => Some(Value::Boolean(false)),
            (Contract::Boolean, Value::Integer(1)) => Some(Value::Boolean(true)),
            (Contract::Boolean, Value::Real(v)) if *v == 0.0 => Some(Value::Boolean(false)),
            (Contract::Boolean, Value::Real(v)) if *v == 1.0 => Some(Value::Boolean(true)),
            (Contract::Integer, Value::Integer(v)) => Some(Value::Integer(*v)),
            (Contract::Integer, Value::Boolean(v)) => Some(Value::Integer(i64::from(*v))),
            (Contract::Integer, Value::Real(v)) if v.fract() == 0.0 => {
                Some(Value::Integer(*v as i64))
            }
            (Contract::Real, Value::Real(v)) => Some(Value::Real(*v)),
            (Contract::Real, Value::Integer(v)) => Some(Value::Real(*v as f64)),
            (Contract::Real, Value::Boolean(v)) => {
                Some(Value::Real(if *v { 1.0 } else { 0.0 }))
            }
            (Contract::String, Value::String(v)) => Some(Value::String(v.clone())),
            (Contract::Void, Value::Void) => Some(Value::Void),
            (Contract::Callable, Value::Action(_)) => Some(value.clone()),
            (Contract::Meta, Value::Contract(_)) => Some(value.clone()),
            (Contract::FiniteSet, Value::Set(_)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Mode-independent probe: would `convert` succeed in Checked mode?
    /// Used by overload scanning, which must behave identically in both
    /// evaluation modes.
    pub fn admits(&self, value: &Value) -> bool {
        if self.relationship_to(&value.contract()).accepts() {
            return true;
        }
        if self.mapping(value).is_some() {
            return true;
        }
        match self {
            Contract::Set(s) => s.contains(value),
            Contract::Union(u) => u.members().iter().any(|m| m.admits(value)),
            _ => false,
        }
    }

    /// Implicit conversion of `value` into this contract.
    ///
    /// Values already accepted by the relationship pass through untouched.
    /// In Unchecked mode a failed conversion coerces to the contract's
    /// void-default instead of faulting.
    pub fn convert(&self, value: Value, state: &InterpreterState) -> Result<Value, Fault> {
        if self.relationship_to(&value.contract()).accepts() {
            return Ok(value);
        }
        if let Some(mapped) = self.mapping(&value) {
            return Ok(mapped);
        }
        match self {
            Contract::Set(s) if s.contains(&value) => return Ok(value),
            Contract::Union(u) => {
                for member in u.members() {
                    if member.admits(&value) {
                        return member.convert(value, state);
                    }
                }
            }
            _ => {}
        }
        if state.is_unchecked() {
            return self.from_void(state);
        }
        Err(Fault::contract_mismatch(self, &value))
    }

    /// The canonical zero value, when the contract has one.
    pub(crate) fn zero_value(&self) -> Option<Value> {
        match self {
            Contract::Boolean => Some(Value::Boolean(false)),
            Contract::Integer => Some(Value::Integer(0)),
            Contract::Real => Some(Value::Real(0.0)),
            Contract::String => Some(Value::String(Arc::from(""))),
            Contract::Void => Some(Value::Void),
            Contract::Array(c) => Some(Value::Array(ArrayValue::empty(
                c.element().clone(),
                c.rank(),
            ))),
            _ => None,
        }
    }

    /// Produces the contract's void-default. Contracts without one fault
    /// in Checked mode and yield `Void` in Unchecked mode.
    pub fn from_void(&self, state: &InterpreterState) -> Result<Value, Fault> {
        if let Some(zero) = self.zero_value() {
            return Ok(zero);
        }
        if state.is_unchecked() {
            return Ok(Value::Void);
        }
        Err(Fault::Unsupported(format!(
            "contract {} has no void-default",
            self
        )))
    }

    /// Object factory. Primitives accept zero arguments (their default) or
    /// one argument (converted); arrays, products and finite sets build
    /// their composite values; the remaining contracts are not
    /// constructible.
    pub fn create_object(&self, args: &[Value], state: &InterpreterState) -> Result<Value, Fault> {
        match self {
            Contract::Boolean | Contract::Integer | Contract::Real | Contract::String => {
                match args {
                    [] => self.from_void(state),
                    [value] => self.convert(value.clone(), state),
                    _ => Err(Fault::ArgumentCount {
                        action: self.to_string(),
                        expected: "0 or 1".to_string(),
                        got: args.len(),
                    }),
                }
            }
            Contract::Array(c) => Ok(Value::Array(ArrayValue::new(
                c.element().clone(),
                c.rank(),
                args.to_vec(),
                state,
            )?)),
            Contract::Cartesian(c) => {
                if args.len() != c.arity() {
                    return Err(Fault::ArgumentCount {
                        action: self.to_string(),
                        expected: c.arity().to_string(),
                        got: args.len(),
                    });
                }
                let mut members = Vec::with_capacity(args.len());
                for (member, arg) in c.members().iter().zip(args) {
                    members.push(member.convert(arg.clone(), state)?);
                }
                Ok(Value::Tuple(TupleValue::new(members)))
            }
            Contract::FiniteSet => Ok(Value::Set(SetValue::new(args.to_vec()))),
            _ => Err(Fault::Unsupported(format!(
                "contract {} cannot construct objects",
                self
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{self, Contract, Relationship};

    fn checked() -> InterpreterState {
        InterpreterState::checked()
    }

    fn unchecked() -> InterpreterState {
        InterpreterState::unchecked()
    }

    #[test]
    fn boolean_mapping_accepts_zero_and_one() {
        let boolean = &**contracts::BOOLEAN;
        assert_eq!(
            boolean.mapping(&Value::Integer(1)),
            Some(Value::Boolean(true))
        );
        assert_eq!(
            boolean.mapping(&Value::Integer(0)),
            Some(Value::Boolean(false))
        );
        assert_eq!(boolean.mapping(&Value::Integer(2)), None);
        assert_eq!(boolean.mapping(&Value::string("true")), None);
    }

    #[test]
    fn boolean_convert_faults_on_string_in_checked_mode() {
        let err = contracts::BOOLEAN
            .convert(Value::string("yes"), &checked())
            .unwrap_err();
        assert!(matches!(err, Fault::ContractMismatch { .. }));
    }

    #[test]
    fn convert_falls_back_to_default_in_unchecked_mode() {
        let value = contracts::INTEGER
            .convert(Value::string("five"), &unchecked())
            .unwrap();
        assert_eq!(value, Value::Integer(0));
    }

    #[test]
    fn real_mapping_promotes_integers_and_booleans() {
        let real = &**contracts::REAL;
        assert_eq!(real.mapping(&Value::Integer(3)), Some(Value::Real(3.0)));
        assert_eq!(real.mapping(&Value::Boolean(true)), Some(Value::Real(1.0)));
    }

    #[test]
    fn integer_mapping_rejects_fractional_reals() {
        let integer = &**contracts::INTEGER;
        assert_eq!(integer.mapping(&Value::Real(2.0)), Some(Value::Integer(2)));
        assert_eq!(integer.mapping(&Value::Real(2.5)), None);
    }

    #[test]
    fn from_void_yields_canonical_zeroes() {
        let state = checked();
        assert_eq!(
            contracts::BOOLEAN.from_void(&state).unwrap(),
            Value::Boolean(false)
        );
        assert_eq!(
            contracts::INTEGER.from_void(&state).unwrap(),
            Value::Integer(0)
        );
        assert_eq!(contracts::REAL.from_void(&state).unwrap(), Value::Real(0.0));
        assert_eq!(
            contracts::STRING.from_void(&state).unwrap(),
            Value::string("")
        );
    }

    #[test]
    fn from_void_faults_for_defaultless_contracts() {
        let state = checked();
        for contract in [
            &**contracts::CALLABLE,
            &**contracts::META,
            &**contracts::DIMENSIONAL,
        ] {
            assert!(matches!(
                contract.from_void(&state),
                Err(Fault::Unsupported(_))
            ));
        }
    }

    #[test]
    fn from_void_yields_void_for_defaultless_contracts_unchecked() {
        assert_eq!(
            contracts::CALLABLE.from_void(&unchecked()).unwrap(),
            Value::Void
        );
    }

    #[test]
    fn set_contract_converts_members_only() {
        let set = Contract::set_of(vec![Value::Integer(1), Value::Integer(2)]).unwrap();
        let state = checked();
        assert_eq!(
            set.convert(Value::Integer(1), &state).unwrap(),
            Value::Integer(1)
        );
        assert!(set.convert(Value::Integer(9), &state).is_err());
    }

    #[test]
    fn union_convert_tries_members_in_order() {
        let union = Contract::union_of(vec![
            contracts::INTEGER.clone(),
            contracts::STRING.clone(),
        ])
        .unwrap();
        let state = checked();
        assert_eq!(
            union.convert(Value::string("abc"), &state).unwrap(),
            Value::string("abc")
        );
        assert_eq!(
            union.convert(Value::Real(4.0), &state).unwrap(),
            Value::Integer(4)
        );
    }

    #[test]
    fn create_object_builds_primitives() {
        let state = checked();
        assert_eq!(
            contracts::INTEGER.create_object(&[], &state).unwrap(),
            Value::Integer(0)
        );
        assert_eq!(
            contracts::REAL
                .create_object(&[Value::Integer(2)], &state)
                .unwrap(),
            Value::Real(2.0)
        );
    }

    #[test]
    fn create_object_rejects_void() {
        assert!(matches!(
            contracts::VOID.create_object(&[], &checked()),
            Err(Fault::Unsupported(_))
        ));
    }

    #[test]
    fn cartesian_create_object_checks_arity() {
        let pair = Contract::cartesian_of(vec![
            contracts::INTEGER.clone(),
            contracts::STRING.clone(),
        ]);
        let state = checked();
        let err = pair.create_object(&[Value::Integer(1)], &state).unwrap_err();
        assert!(matches!(err, Fault::ArgumentCount { .. }));

        let tuple = pair
            .create_object(&[Value::Integer(1), Value::string("a")], &state)
            .unwrap();
        assert_eq!(tuple.contract().relationship_to(&pair), Relationship::Same);
    }
}
