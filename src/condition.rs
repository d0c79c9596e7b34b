//! Typed comparison conditions applied to a single field.
//!
//! A condition serializes as a single-key object, `{"$op": payload}`, which is
//! exactly the shape the selector expects under a field name.

use serde::Serialize;
use serde_json::Value;

/// A comparison operator together with its operand.
///
/// Operands are only checked by their static type. Whether a regex compiles or
/// a modulo divisor is non-zero is left to the database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Condition {
    /// The field is greater than the argument.
    #[serde(rename = "$gt")]
    GreaterThan(i64),
    /// The field is greater than or equal to the argument.
    #[serde(rename = "$gte")]
    GreaterThanOrEqual(i64),
    /// The field is less than the argument.
    #[serde(rename = "$lt")]
    LessThan(i64),
    /// The field is less than or equal to the argument.
    #[serde(rename = "$lte")]
    LessThanOrEqual(i64),
    #[serde(rename = "$eq")]
    Equal(Value),
    #[serde(rename = "$neq")]
    NotEqual(Value),
    /// Checks whether the field exists, regardless of its value.
    #[serde(rename = "$exists")]
    Exists(bool),
    /// Matches the length of an array field. Non-array fields never match.
    #[serde(rename = "$size")]
    Size(u64),
    /// The document field must exist in the list provided.
    #[serde(rename = "$in")]
    In(Vec<Value>),
    /// Checks the field's type: "null", "boolean", "number", "string", "array" or "object".
    #[serde(rename = "$type")]
    Type(String),
    /// A PCRE pattern matched against string fields.
    #[serde(rename = "$regex")]
    RegEx(String),
    /// `[divisor, remainder]`: matches integer fields where `field % divisor == remainder`.
    #[serde(rename = "$mod")]
    Mod([i64; 2]),
}

impl Condition {
    pub fn equal<V: Into<Value>>(value: V) -> Self {
        Condition::Equal(value.into())
    }

    pub fn not_equal<V: Into<Value>>(value: V) -> Self {
        Condition::NotEqual(value.into())
    }

    pub fn in_values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Condition::In(values.into_iter().map(Into::into).collect())
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Condition::RegEx(pattern.into())
    }

    pub fn type_of(name: impl Into<String>) -> Self {
        Condition::Type(name.into())
    }

    pub fn modulo(divisor: i64, remainder: i64) -> Self {
        Condition::Mod([divisor, remainder])
    }
}
