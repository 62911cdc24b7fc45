use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use ulid::Ulid;
use uuid::Uuid;

///
/// Value
///
/// Runtime representation of a single field value, used on both sides of a
/// filter clause: field accessors produce one, filter literals are supplied
/// as one.
///
/// `Null` means the field's value is `Option::None`.
///

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Ulid(Ulid),
    Uuid(Uuid),
    /// Ordered list of values, used for membership literals.
    List(Vec<Self>),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The kind tag of this value, or `None` for `Null`.
    #[must_use]
    pub const fn kind(&self) -> Option<ValueKind> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(ValueKind::Bool),
            Self::Int(_) => Some(ValueKind::Int),
            Self::Uint(_) => Some(ValueKind::Uint),
            Self::Float(_) => Some(ValueKind::Float),
            Self::Text(_) => Some(ValueKind::Text),
            Self::Timestamp(_) => Some(ValueKind::Timestamp),
            Self::Ulid(_) => Some(ValueKind::Ulid),
            Self::Uuid(_) => Some(ValueKind::Uuid),
            Self::List(_) => Some(ValueKind::List),
        }
    }

    /// Coerce this value to a field's declared kind.
    ///
    /// Exact kind matches pass through; the numeric family widens losslessly
    /// (`Int`/`Uint` into `Float`, sign conversions when in range). Anything
    /// else is `None` and the caller reports a type mismatch.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
    pub fn coerce_to(&self, kind: ValueKind) -> Option<Self> {
        if self.kind() == Some(kind) {
            return Some(self.clone());
        }

        match (self, kind) {
            (Self::Int(i), ValueKind::Float) => Some(Self::Float(*i as f64)),
            (Self::Uint(u), ValueKind::Float) => Some(Self::Float(*u as f64)),
            (Self::Int(i), ValueKind::Uint) if *i >= 0 => Some(Self::Uint(*i as u64)),
            (Self::Uint(u), ValueKind::Int) => {
                i64::try_from(*u).ok().map(Self::Int)
            }
            _ => None,
        }
    }
}

///
/// ValueKind
///
/// Closed tag set for declared field types; drives literal coercion at
/// predicate build time.
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueKind {
    Bool,
    Float,
    Int,
    List,
    Text,
    Timestamp,
    Uint,
    Ulid,
    Uuid,
}

///
/// FieldValue
///
/// Conversion from plain Rust field types into [`Value`]. Implemented for
/// the scalar types entities are built from; `Option<T>` maps `None` to
/// `Value::Null` and `Vec<T>` to `Value::List`.
///

pub trait FieldValue {
    fn to_value(&self) -> Value;
}

impl FieldValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FieldValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FieldValue for i32 {
    fn to_value(&self) -> Value {
        Value::Int(i64::from(*self))
    }
}

impl FieldValue for i64 {
    fn to_value(&self) -> Value {
        Value::Int(*self)
    }
}

impl FieldValue for u32 {
    fn to_value(&self) -> Value {
        Value::Uint(u64::from(*self))
    }
}

impl FieldValue for u64 {
    fn to_value(&self) -> Value {
        Value::Uint(*self)
    }
}

impl FieldValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl FieldValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl FieldValue for &str {
    fn to_value(&self) -> Value {
        Value::Text((*self).to_owned())
    }
}

impl FieldValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl FieldValue for DateTime<Utc> {
    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }
}

impl FieldValue for Ulid {
    fn to_value(&self) -> Value {
        Value::Ulid(*self)
    }
}

impl FieldValue for Uuid {
    fn to_value(&self) -> Value {
        Value::Uuid(*self)
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldValue::to_value).collect())
    }
}

///
/// Comparison semantics
///
/// `compare_eq`/`compare_order` implement clause evaluation: same-kind
/// comparisons only (literals are coerced to the field kind at build time),
/// `Null` never equal to and never ordered against anything.
/// `strict_value_order` is the total order used for sorting result sets.
///

#[must_use]
pub fn compare_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Float(x), Value::Float(y)) => x == y,
        _ => a == b,
    }
}

#[must_use]
pub fn compare_order(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Uint(x), Value::Uint(y)) => Some(x.cmp(y)),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y),
        (Value::Text(x), Value::Text(y)) => Some(x.cmp(y)),
        (Value::Timestamp(x), Value::Timestamp(y)) => Some(x.cmp(y)),
        (Value::Ulid(x), Value::Ulid(y)) => Some(x.cmp(y)),
        (Value::Uuid(x), Value::Uuid(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Total order over all values: `Null` sorts first, then by kind rank, then
/// within kind. Floats use `total_cmp` so sorting never panics.
#[must_use]
pub fn strict_value_order(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Float(x), Value::Float(y)) => x.total_cmp(y),
        (Value::List(x), Value::List(y)) => {
            for (l, r) in x.iter().zip(y.iter()) {
                let ord = strict_value_order(l, r);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => match compare_order(a, b) {
            Some(ord) => ord,
            None => rank(a).cmp(&rank(b)),
        },
    }
}

// Kind rank for cross-kind ordering; only reachable when a result set mixes
// kinds under one field, which well-formed registries do not produce.
const fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Int(_) => 2,
        Value::Uint(_) => 3,
        Value::Float(_) => 4,
        Value::Text(_) => 5,
        Value::Timestamp(_) => 6,
        Value::Ulid(_) => 7,
        Value::Uuid(_) => 8,
        Value::List(_) => 9,
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_never_equal() {
        assert!(!compare_eq(&Value::Null, &Value::Null));
        assert!(!compare_eq(&Value::Null, &Value::Int(0)));
        assert!(!compare_eq(&Value::Int(0), &Value::Null));
    }

    #[test]
    fn same_kind_equality() {
        assert!(compare_eq(&Value::Int(3), &Value::Int(3)));
        assert!(!compare_eq(&Value::Int(3), &Value::Int(4)));
        assert!(compare_eq(
            &Value::Text("a".into()),
            &Value::Text("a".into())
        ));
        // different kinds never compare equal, even numerically
        assert!(!compare_eq(&Value::Int(3), &Value::Uint(3)));
    }

    #[test]
    fn coercion_bridges_the_numeric_family() {
        assert_eq!(
            Value::Int(3).coerce_to(ValueKind::Float),
            Some(Value::Float(3.0))
        );
        assert_eq!(
            Value::Int(3).coerce_to(ValueKind::Uint),
            Some(Value::Uint(3))
        );
        assert_eq!(Value::Int(-1).coerce_to(ValueKind::Uint), None);
        assert_eq!(
            Value::Uint(7).coerce_to(ValueKind::Int),
            Some(Value::Int(7))
        );
        assert_eq!(Value::Text("3".into()).coerce_to(ValueKind::Int), None);
    }

    #[test]
    fn ordering_is_same_kind_only() {
        assert_eq!(
            compare_order(&Value::Int(1), &Value::Int(2)),
            Some(Ordering::Less)
        );
        assert_eq!(compare_order(&Value::Int(1), &Value::Uint(2)), None);
        assert_eq!(compare_order(&Value::Null, &Value::Int(2)), None);
    }

    #[test]
    fn option_and_vec_conversions() {
        assert_eq!(None::<i64>.to_value(), Value::Null);
        assert_eq!(Some(5i64).to_value(), Value::Int(5));
        assert_eq!(
            vec![1i64, 2].to_value(),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn strict_order_sorts_nulls_first() {
        let mut values = vec![Value::Int(2), Value::Null, Value::Int(1)];
        values.sort_by(strict_value_order);
        assert_eq!(values, vec![Value::Null, Value::Int(1), Value::Int(2)]);
    }
}
