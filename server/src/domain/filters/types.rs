//! Filter expression types
//!
//! The compiled form of a race-event search query. Serializes to the
//! nested `{field: {op: value}}` / `{races: {some: {...}}}` shape used in
//! API docs and debug logs.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Filters keyed by API field name (camelCase)
pub type FieldFilters = BTreeMap<String, FieldFilter>;

/// Coerced filter operand
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Number(f64),
    Text(String),
    DateTime(DateTimeValue),
}

/// Result of date coercion. An unparseable input keeps its place in the
/// filter as `Invalid` and is rejected by the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeValue {
    Valid(DateTime<Utc>),
    Invalid,
}

/// Case-sensitive-or-not string matching operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOp {
    Contains,
    StartsWith,
    EndsWith,
}

impl TextOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::StartsWith => "startsWith",
            Self::EndsWith => "endsWith",
        }
    }
}

/// Condition attached to a single field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldFilter {
    /// Direct equality (`field = value`)
    Equals(FilterValue),
    /// String match
    Text {
        op: TextOp,
        value: FilterValue,
        case_insensitive: bool,
    },
    /// Inclusive range; at least one bound is set
    Range {
        gte: Option<FilterValue>,
        lte: Option<FilterValue>,
    },
    /// Array column contains any of the values
    HasSome(Vec<String>),
    /// Column value is one of the values
    In(Vec<String>),
}

/// Compiled filter tree for race events
///
/// `fields` constrain the event itself. `races` holds conditions that a
/// single related race must satisfy together; `None` means no race-level
/// filtering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterExpression {
    pub fields: FieldFilters,
    pub races: Option<FieldFilters>,
}

impl FilterExpression {
    /// True when the expression matches every record
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.races.is_none()
    }

    /// JSON rendering of the filter tree
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => {
                // Integral values render without a fractional part
                if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Self::Text(s) => serializer.serialize_str(s),
            Self::DateTime(dt) => dt.serialize(serializer),
        }
    }
}

impl Serialize for DateTimeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Valid(dt) => {
                serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Self::Invalid => serializer.serialize_none(),
        }
    }
}

impl Serialize for FieldFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Equals(value) => value.serialize(serializer),
            Self::Text {
                op,
                value,
                case_insensitive,
            } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry(op.as_str(), value)?;
                if *case_insensitive {
                    map.serialize_entry("mode", "insensitive")?;
                }
                map.end()
            }
            Self::Range { gte, lte } => {
                let mut map = serializer.serialize_map(None)?;
                if let Some(gte) = gte {
                    map.serialize_entry("gte", gte)?;
                }
                if let Some(lte) = lte {
                    map.serialize_entry("lte", lte)?;
                }
                map.end()
            }
            Self::HasSome(values) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("hasSome", values)?;
                map.end()
            }
            Self::In(values) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("in", values)?;
                map.end()
            }
        }
    }
}

/// Wrapper for the existential `{some: {...}}` relation filter
struct SomeOf<'a>(&'a FieldFilters);

impl Serialize for SomeOf<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("some", self.0)?;
        map.end()
    }
}

impl Serialize for FilterExpression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (field, filter) in &self.fields {
            map.serialize_entry(field, filter)?;
        }
        if let Some(races) = &self.races {
            map.serialize_entry(super::RELATION_NAME, &SomeOf(races))?;
        }
        map.end()
    }
}
