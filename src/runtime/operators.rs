use std::fmt;

use crate::runtime::{fault::Fault, proxy::Proxy, state::InterpreterState, value::Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    And,
    Or,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 13] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Mod,
        BinaryOp::Eq,
        BinaryOp::NotEq,
        BinaryOp::Less,
        BinaryOp::LessEq,
        BinaryOp::Greater,
        BinaryOp::GreaterEq,
        BinaryOp::And,
        BinaryOp::Or,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEq => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "subtract",
            BinaryOp::Mul => "multiply",
            BinaryOp::Div => "divide",
            BinaryOp::Mod => "modulo",
            _ => "compare",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl Value {
    /// Applies a unary operator. A pending proxy receiver defers the
    /// operation until resolution.
    pub fn unary_operation(
        &self,
        op: UnaryOp,
        state: &InterpreterState,
    ) -> Result<Value, Fault> {
        if let Value::Proxy(proxy) = self {
            if !proxy.is_completed() {
                return Proxy::defer_unary(proxy, op, state);
            }
            return proxy.unwrap(state)?.unary_operation(op, state);
        }
        match (op, self) {
            (UnaryOp::Neg, Value::Integer(v)) => Ok(Value::Integer(-v)),
            (UnaryOp::Neg, Value::Real(v)) => Ok(Value::Real(-v)),
            (UnaryOp::Not, Value::Boolean(v)) => Ok(Value::Boolean(!v)),
            _ => Err(Fault::Unsupported(format!(
                "cannot apply {} to {}",
                op,
                self.type_name()
            ))),
        }
    }

    /// Applies a binary operator. A pending proxy on either side turns
    /// the operation into a new proxy that runs once the operand
    /// resolves; completed proxies evaluate immediately.
    pub fn binary_operation(
        &self,
        op: BinaryOp,
        right: &Value,
        state: &InterpreterState,
    ) -> Result<Value, Fault> {
        match (self, right) {
            (Value::Proxy(proxy), _) if !proxy.is_completed() => {
                return Proxy::defer_left(proxy, op, right.clone(), state);
            }
            (_, Value::Proxy(proxy)) if !proxy.is_completed() => {
                return Proxy::enqueue(proxy, self.clone(), op, state);
            }
            _ => {}
        }
        if let Value::Proxy(proxy) = self {
            return proxy.unwrap(state)?.binary_operation(op, right, state);
        }
        if let Value::Proxy(proxy) = right {
            let resolved = proxy.unwrap(state)?;
            return self.binary_operation(op, &resolved, state);
        }
        apply_binary(self, op, right)
    }
}

fn apply_binary(left: &Value, op: BinaryOp, right: &Value) -> Result<Value, Fault> {
    match op {
        BinaryOp::And | BinaryOp::Or => match (left, right) {
            (Value::Boolean(l), Value::Boolean(r)) => Ok(Value::Boolean(match op {
                BinaryOp::And => *l && *r,
                _ => *l || *r,
            })),
            _ => Err(unsupported(left, op, right)),
        },
        BinaryOp::Eq => Ok(Value::Boolean(values_equal(left, right))),
        BinaryOp::NotEq => Ok(Value::Boolean(!values_equal(left, right))),
        BinaryOp::Less | BinaryOp::LessEq | BinaryOp::Greater | BinaryOp::GreaterEq => {
            compare(left, op, right)
        }
        _ => arithmetic(left, op, right),
    }
}

/// Equality with numeric promotion: an integer equals a real with the
/// same magnitude even though the values themselves never compare equal.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Integer(l), Value::Real(r)) => (*l as f64) == *r,
        (Value::Real(l), Value::Integer(r)) => *l == (*r as f64),
        _ => left == right,
    }
}

fn compare(left: &Value, op: BinaryOp, right: &Value) -> Result<Value, Fault> {
    let ordering = match (left, right) {
        (Value::Integer(l), Value::Integer(r)) => Some(l.cmp(r)),
        (Value::Real(l), Value::Real(r)) => l.partial_cmp(r),
        (Value::Integer(l), Value::Real(r)) => (*l as f64).partial_cmp(r),
        (Value::Real(l), Value::Integer(r)) => l.partial_cmp(&(*r as f64)),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        _ => return Err(unsupported(left, op, right)),
    };
    // NaN operands order with nothing, so every comparison is false.
    let Some(ordering) = ordering else {
        return Ok(Value::Boolean(false));
    };
    Ok(Value::Boolean(match op {
        BinaryOp::Less => ordering.is_lt(),
        BinaryOp::LessEq => ordering.is_le(),
        BinaryOp::Greater => ordering.is_gt(),
        _ => ordering.is_ge(),
    }))
}

fn arithmetic(left: &Value, op: BinaryOp, right: &Value) -> Result<Value, Fault> {
    match (left, right) {
        (Value::Integer(l), Value::Integer(r)) => {
            if *r == 0 && (op == BinaryOp::Div || op == BinaryOp::Mod) {
                return Err(Fault::script_text("division by zero"));
            }
            Ok(Value::Integer(match op {
                BinaryOp::Add => l + r,
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                BinaryOp::Div => l / r,
                _ => l % r,
            }))
        }
        (Value::Real(l), Value::Real(r)) => Ok(Value::Real(real_op(*l, op, *r))),
        (Value::Integer(l), Value::Real(r)) => Ok(Value::Real(real_op(*l as f64, op, *r))),
        (Value::Real(l), Value::Integer(r)) => Ok(Value::Real(real_op(*l, op, *r as f64))),
        (Value::String(l), Value::String(r)) if op == BinaryOp::Add => {
            Ok(Value::string(&format!("{}{}", l, r)))
        }
        _ => Err(unsupported(left, op, right)),
    }
}

fn real_op(l: f64, op: BinaryOp, r: f64) -> f64 {
    match op {
        BinaryOp::Add => l + r,
        BinaryOp::Sub => l - r,
        BinaryOp::Mul => l * r,
        BinaryOp::Div => l / r,
        _ => l % r,
    }
}

fn unsupported(left: &Value, op: BinaryOp, right: &Value) -> Fault {
    Fault::Unsupported(format!(
        "cannot {} {} and {}",
        op.verb(),
        left.type_name(),
        right.type_name()
    ))
}
