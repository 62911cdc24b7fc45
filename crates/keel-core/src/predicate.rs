use crate::{
    entity::{Entity, FieldDef, FieldPathError, Related},
    value::{FieldValue, Value, ValueKind, compare_eq, compare_order},
};
use std::{
    cmp::Ordering,
    fmt,
    ops::{BitAnd, BitOr},
    sync::Arc,
};
use thiserror::Error as ThisError;

///
/// Operator
/// Closed set of filter operations a clause can express.
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operator {
    /// Existential test over a to-many relation; only valid through
    /// [`Predicate::build_related`].
    Any,
    Eq,
    Gt,
    Gte,
    /// Membership: the field's value is contained in a literal list.
    In,
    /// Substring match on text fields.
    Like,
    Lt,
    Lte,
    Ne,
}

type TestFn<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

///
/// Clause
///
/// One compiled comparison: the resolved field, the operator, and a test
/// closed over the coerced literal. The comparison is generated once at
/// build time; evaluation performs no lookups.
///

#[derive(Clone)]
pub struct Clause<E> {
    field: &'static str,
    op: Operator,
    test: TestFn<E>,
}

impl<E> Clause<E> {
    #[must_use]
    pub const fn field(&self) -> &'static str {
        self.field
    }

    #[must_use]
    pub const fn op(&self) -> Operator {
        self.op
    }
}

///
/// Predicate
///
/// A typed boolean condition over one entity type. Composite nodes are
/// flattened on combination; `True` is the identity produced by the
/// documented no-op degradations (null literal, empty membership list).
///

#[derive(Clone, Default)]
pub enum Predicate<E> {
    #[default]
    True,
    Clause(Clause<E>),
    And(Vec<Self>),
    Or(Vec<Self>),
}

impl<E> Predicate<E> {
    /// The always-true predicate.
    #[must_use]
    pub const fn always() -> Self {
        Self::True
    }

    /// Evaluate this predicate against one entity.
    #[must_use]
    pub fn matches(&self, entity: &E) -> bool {
        match self {
            Self::True => true,
            Self::Clause(clause) => (clause.test)(entity),
            Self::And(children) => children.iter().all(|p| p.matches(entity)),
            Self::Or(children) => children.iter().any(|p| p.matches(entity)),
        }
    }

    /// Combine two predicates into an `And`, flattening nested `And`s so
    /// `(a AND b) AND c` becomes `AND[a, b, c]`.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::And(mut a), Self::And(mut b)) => {
                a.append(&mut b);
                Self::And(a)
            }
            (Self::And(mut a), b) => {
                a.push(b);
                Self::And(a)
            }
            (a, Self::And(mut b)) => {
                let mut list = vec![a];
                list.append(&mut b);
                Self::And(list)
            }
            (a, b) => Self::And(vec![a, b]),
        }
    }

    /// Combine two predicates into an `Or`, flattening like [`Self::and`].
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::Or(mut a), Self::Or(mut b)) => {
                a.append(&mut b);
                Self::Or(a)
            }
            (Self::Or(mut a), b) => {
                a.push(b);
                Self::Or(a)
            }
            (a, Self::Or(mut b)) => {
                let mut list = vec![a];
                list.append(&mut b);
                Self::Or(list)
            }
            (a, b) => Self::Or(vec![a, b]),
        }
    }

    #[must_use]
    pub fn and_option(self, other: Option<Self>) -> Self {
        match other {
            Some(p) => self.and(p),
            None => self,
        }
    }

    #[must_use]
    pub fn or_option(self, other: Option<Self>) -> Self {
        match other {
            Some(p) => self.or(p),
            None => self,
        }
    }

    /// `AND` with an optional left operand: an absent left yields exactly
    /// `right`, making the operator the identity element when folding an
    /// open-ended chain of optional filters.
    #[must_use]
    pub fn combine_and(left: Option<Self>, right: Self) -> Self {
        match left {
            Some(l) => l.and(right),
            None => right,
        }
    }

    /// `OR` with an optional left operand; see [`Self::combine_and`].
    #[must_use]
    pub fn combine_or(left: Option<Self>, right: Self) -> Self {
        match left {
            Some(l) => l.or(right),
            None => right,
        }
    }
}

impl<E: Entity> Predicate<E> {
    /// Build a single typed clause from a field path, an operator, and a
    /// runtime literal.
    ///
    /// A `Null` literal yields the always-true predicate (a deliberate
    /// no-op filter). An unresolved path is an error. The literal is
    /// coerced to the field's declared kind; the comparison closure is
    /// generated here, once.
    pub fn build(
        path: &str,
        op: Operator,
        literal: impl FieldValue,
    ) -> Result<Self, PredicateError> {
        let literal = literal.to_value();
        if literal.is_null() {
            return Ok(Self::True);
        }

        let field = Self::resolve(path)?;

        match op {
            Operator::Eq => Self::equality_clause(field, op, literal, false),
            Operator::Ne => Self::equality_clause(field, op, literal, true),
            Operator::Lt => {
                Self::ordering_clause(field, op, literal, |o| o == Ordering::Less)
            }
            Operator::Lte => {
                Self::ordering_clause(field, op, literal, |o| o != Ordering::Greater)
            }
            Operator::Gt => {
                Self::ordering_clause(field, op, literal, |o| o == Ordering::Greater)
            }
            Operator::Gte => {
                Self::ordering_clause(field, op, literal, |o| o != Ordering::Less)
            }
            Operator::Like => Self::like_clause(field, literal),
            Operator::In => Self::membership_clause(field, literal),
            Operator::Any => Err(PredicateError::UnsupportedOperator { op }),
        }
    }

    /// Build an existential clause over a to-many relation: true iff the
    /// related collection holds at least one element satisfying `nested`.
    /// Only [`Operator::Any`] has semantics in this form.
    pub fn build_related<R: Entity>(
        path: &str,
        op: Operator,
        nested: Predicate<R>,
    ) -> Result<Self, PredicateError>
    where
        E: Related<R>,
    {
        if op != Operator::Any {
            return Err(PredicateError::UnsupportedOperator { op });
        }

        let relation = <E as Related<R>>::RELATIONS
            .iter()
            .find(|r| r.name == path)
            .ok_or_else(|| PredicateError::UnknownField {
                entity: E::NAME,
                path: path.to_owned(),
            })?;

        let get = relation.get;
        Ok(Self::Clause(Clause {
            field: relation.name,
            op,
            test: Arc::new(move |e| get(e).iter().any(|r| nested.matches(r))),
        }))
    }

    fn resolve(path: &str) -> Result<&'static FieldDef<E>, PredicateError> {
        E::FIELDS.resolve(path).map_err(|err| match err {
            FieldPathError::Unknown => PredicateError::UnknownField {
                entity: E::NAME,
                path: path.to_owned(),
            },
            FieldPathError::TooDeep => PredicateError::PathTooDeep {
                path: path.to_owned(),
            },
        })
    }

    fn coerced(field: &'static FieldDef<E>, literal: Value) -> Result<Value, PredicateError> {
        literal
            .coerce_to(field.kind)
            .ok_or(PredicateError::TypeMismatch {
                field: field.name,
                kind: field.kind,
                value: literal,
            })
    }

    fn equality_clause(
        field: &'static FieldDef<E>,
        op: Operator,
        literal: Value,
        negate: bool,
    ) -> Result<Self, PredicateError> {
        let rhs = Self::coerced(field, literal)?;
        let get = field.get;
        let test: TestFn<E> = if negate {
            Arc::new(move |e| !compare_eq(&get(e), &rhs))
        } else {
            Arc::new(move |e| compare_eq(&get(e), &rhs))
        };

        Ok(Self::Clause(Clause {
            field: field.name,
            op,
            test,
        }))
    }

    fn ordering_clause(
        field: &'static FieldDef<E>,
        op: Operator,
        literal: Value,
        accept: fn(Ordering) -> bool,
    ) -> Result<Self, PredicateError> {
        let rhs = Self::coerced(field, literal)?;
        let get = field.get;

        Ok(Self::Clause(Clause {
            field: field.name,
            op,
            test: Arc::new(move |e| compare_order(&get(e), &rhs).is_some_and(accept)),
        }))
    }

    fn like_clause(field: &'static FieldDef<E>, literal: Value) -> Result<Self, PredicateError> {
        let Value::Text(needle) = literal else {
            return Err(PredicateError::TypeMismatch {
                field: field.name,
                kind: field.kind,
                value: literal,
            });
        };
        if field.kind != ValueKind::Text {
            return Err(PredicateError::TypeMismatch {
                field: field.name,
                kind: field.kind,
                value: Value::Text(needle),
            });
        }

        let get = field.get;
        Ok(Self::Clause(Clause {
            field: field.name,
            op: Operator::Like,
            // a null field value never contains anything
            test: Arc::new(move |e| matches!(get(e), Value::Text(s) if s.contains(&needle))),
        }))
    }

    fn membership_clause(
        field: &'static FieldDef<E>,
        literal: Value,
    ) -> Result<Self, PredicateError> {
        let Value::List(items) = literal else {
            return Err(PredicateError::TypeMismatch {
                field: field.name,
                kind: field.kind,
                value: literal,
            });
        };

        // an empty membership list filters nothing
        if items.is_empty() {
            return Ok(Self::True);
        }

        let members = items
            .into_iter()
            .map(|item| Self::coerced(field, item))
            .collect::<Result<Vec<_>, _>>()?;

        let get = field.get;
        Ok(Self::Clause(Clause {
            field: field.name,
            op: Operator::In,
            test: Arc::new(move |e| {
                let value = get(e);
                members.iter().any(|m| compare_eq(&value, m))
            }),
        }))
    }
}

impl<E> fmt::Debug for Predicate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "True"),
            Self::Clause(clause) => write!(f, "Clause({} {:?})", clause.field, clause.op),
            Self::And(children) => f.debug_tuple("And").field(children).finish(),
            Self::Or(children) => f.debug_tuple("Or").field(children).finish(),
        }
    }
}

impl<E> BitAnd for Predicate<E> {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl<E> BitOr for Predicate<E> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

///
/// PredicateError
///

#[remain::sorted]
#[derive(Clone, Debug, ThisError)]
pub enum PredicateError {
    #[error("field path '{path}' is nested deeper than one level")]
    PathTooDeep { path: String },

    #[error("cannot compare field '{field}' of kind {kind:?} with {value:?}")]
    TypeMismatch {
        field: &'static str,
        kind: ValueKind,
        value: Value,
    },

    #[error("unknown field '{path}' on entity '{entity}'")]
    UnknownField { entity: &'static str, path: String },

    #[error("operator {op:?} has no semantics in this form")]
    UnsupportedOperator { op: Operator },
}

///
/// TESTS
///
