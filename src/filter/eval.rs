use super::ast::Expression;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

/// Read access to the named fields of a message
///
/// Keys are lower-case field names. Implementations may decode lazily, which
/// is why values come back as a [`Cow`].
pub trait Fields {
    fn field(&self, name: &str) -> Option<Cow<'_, str>>;
}

impl<T: Fields + ?Sized> Fields for &T {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        (**self).field(name)
    }
}

impl Fields for HashMap<String, String> {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(|value| Cow::Borrowed(value.as_str()))
    }
}

impl Fields for BTreeMap<String, String> {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(|value| Cow::Borrowed(value.as_str()))
    }
}

/// Evaluate an expression against one message
///
/// Absent fields compare as the empty string. `and` / `or` short-circuit:
/// the right operand is not looked at when the left one decides the result.
pub fn evaluate<F: Fields + ?Sized>(expr: &Expression, message: &F) -> bool {
    match expr {
        Expression::Match(clause) => {
            let value = message.field(&clause.field).unwrap_or_default();
            clause.predicate.apply(&value)
        }
        Expression::And(left, right) => evaluate(left, message) && evaluate(right, message),
        Expression::Or(left, right) => evaluate(left, message) || evaluate(right, message),
    }
}
