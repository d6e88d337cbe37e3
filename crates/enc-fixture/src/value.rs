use serde::{Deserialize, Serialize};

/// Deepest nesting of lists, tuples and unary signs a value may have.
pub const MAX_NESTING: usize = 64;

/// Literal value bound at the top level of a fixture file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Integer literal.
    Int(i64),
    /// Float literal, including the `inf`/`nan` constants.
    Float(f64),
    /// `True` / `False`.
    Bool(bool),
    /// String literal.
    Str(String),
    /// Parenthesised, comma separated values.
    Tuple(Vec<Value>),
    /// Bracketed list.
    List(Vec<Value>),
}

impl Value {
    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "str",
            Value::Tuple(_) => "tuple",
            Value::List(_) => "list",
        }
    }

    /// Numeric view of a scalar.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer view; floats are accepted when they are integral.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            // `i64::MAX as f64` is 2^63, one past the largest i64.
            Value::Float(v)
                if v.fract() == 0.0 && *v >= i64::MIN as f64 && *v < i64::MAX as f64 =>
            {
                Some(*v as i64)
            }
            _ => None,
        }
    }

    /// String view.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a tuple or list.
    pub fn items(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(items) | Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Numbers of a flat sequence. A bare scalar widens to a one element
    /// sequence, so `weight = (1)` and `weight = (1, 1)` read alike.
    pub fn as_f64_seq(&self) -> Option<Vec<f64>> {
        match self.items() {
            Some(items) => items.iter().map(Value::as_f64).collect(),
            None => self.as_f64().map(|v| vec![v]),
        }
    }

    /// Flattens a rectangular nest of numeric lists into row-major values
    /// plus the shape. Scalars have an empty shape.
    /// Nests deeper than [`MAX_NESTING`] are rejected.
    pub fn to_array(&self) -> Option<(Vec<usize>, Vec<f64>)> {
        let mut values = Vec::new();
        let shape = flatten_into(self, &mut values, 0)?;
        Some((shape, values))
    }
}

fn flatten_into(value: &Value, out: &mut Vec<f64>, depth: usize) -> Option<Vec<usize>> {
    let Some(items) = value.items() else {
        out.push(value.as_f64()?);
        return Some(Vec::new());
    };
    if depth >= MAX_NESTING {
        return None;
    }
    let mut inner: Option<Vec<usize>> = None;
    for item in items {
        let shape = flatten_into(item, out, depth + 1)?;
        match &inner {
            Some(expected) if *expected != shape => return None,
            Some(_) => {}
            None => inner = Some(shape),
        }
    }
    let mut shape = vec![items.len()];
    // An empty list has no inner shape to report.
    shape.extend(inner.unwrap_or_default());
    Some(shape)
}
