use std::fmt;

use crate::runtime::value::Value;

/// Canonical bit identity of a primitive value, the key an intern pool
/// deduplicates by.
///
/// Reals are keyed by their raw IEEE-754 bit pattern so that `0.0` and
/// `-0.0` intern separately and NaN payloads are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BitKey {
    Boolean(bool),
    Integer(i64),
    Real(u64),
    String(String),
}

impl BitKey {
    /// Returns the key for primitive values, `None` for composites,
    /// actions and proxies.
    pub fn of(value: &Value) -> Option<BitKey> {
        match value {
            Value::Boolean(v) => Some(BitKey::Boolean(*v)),
            Value::Integer(v) => Some(BitKey::Integer(*v)),
            Value::Real(v) => Some(BitKey::Real(v.to_bits())),
            Value::String(v) => Some(BitKey::String(v.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for BitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitKey::Boolean(v) => write!(f, "{}", v),
            BitKey::Integer(v) => write!(f, "{}", v),
            BitKey::Real(bits) => write!(f, "0x{:016x}", bits),
            BitKey::String(v) => write!(f, "\"{}\"", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_have_keys() {
        assert_eq!(
            BitKey::of(&Value::Integer(7)),
            Some(BitKey::Integer(7))
        );
        assert_eq!(
            BitKey::of(&Value::Boolean(true)),
            Some(BitKey::Boolean(true))
        );
        assert_eq!(
            BitKey::of(&Value::string("a")),
            Some(BitKey::String("a".to_string()))
        );
    }

    #[test]
    fn reals_key_by_bit_pattern() {
        assert_ne!(
            BitKey::of(&Value::Real(0.0)),
            BitKey::of(&Value::Real(-0.0))
        );
        assert_eq!(
            BitKey::of(&Value::Real(1.5)),
            Some(BitKey::Real(1.5_f64.to_bits()))
        );
    }

    #[test]
    fn composites_have_no_key() {
        assert_eq!(BitKey::of(&Value::Void), None);
    }
}
