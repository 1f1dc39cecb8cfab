//! Query-string filter compiler
//!
//! Turns the raw `(key, value)` pairs of a race-event search request into a
//! [`FilterExpression`]. Compilation never fails: keys that don't match an
//! operator pattern degrade to equality, values that don't coerce stay
//! strings, and unparseable dates become [`DateTimeValue::Invalid`] for the
//! storage layer to reject.

use super::types::{DateTimeValue, FieldFilter, FieldFilters, FilterExpression, FilterValue, TextOp};
use super::{
    COMPETITION_IDS_IN_KEY, COMPETITION_ID_FIELD, MERGED_RANGE_FIELD, RELATION_SCOPED_FIELDS,
    SPECIAL_KEYS, TAGS_FIELD, TAGS_IN_KEY,
};
use crate::utils::time::parse_datetime;

/// Operators recognised in `<field>_<op>` keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Contains,
    StartsWith,
    EndsWith,
    Gte,
    Lte,
    Eq,
}

impl Operator {
    /// Suffix table, scanned in order
    const SUFFIXES: [(&'static str, Operator); 6] = [
        ("_contains", Operator::Contains),
        ("_startsWith", Operator::StartsWith),
        ("_endsWith", Operator::EndsWith),
        ("_gte", Operator::Gte),
        ("_lte", Operator::Lte),
        ("_eq", Operator::Eq),
    ];

    /// Split `<field>_<op>` into its parts. The field part must be non-empty.
    pub fn split_key(key: &str) -> Option<(&str, Operator)> {
        Self::SUFFIXES.iter().find_map(|(suffix, op)| {
            key.strip_suffix(suffix)
                .filter(|field| !field.is_empty())
                .map(|field| (field, *op))
        })
    }

    /// Operators whose operand is tried as a number first
    fn accepts_numbers(self) -> bool {
        matches!(self, Self::Gte | Self::Lte | Self::Eq)
    }

    fn into_filter(self, value: FilterValue) -> FieldFilter {
        match self {
            Self::Contains => text_filter(TextOp::Contains, value),
            Self::StartsWith => text_filter(TextOp::StartsWith, value),
            Self::EndsWith => text_filter(TextOp::EndsWith, value),
            Self::Gte => FieldFilter::Range {
                gte: Some(value),
                lte: None,
            },
            Self::Lte => FieldFilter::Range {
                gte: None,
                lte: Some(value),
            },
            Self::Eq => FieldFilter::Equals(value),
        }
    }
}

fn text_filter(op: TextOp, value: FilterValue) -> FieldFilter {
    FieldFilter::Text {
        op,
        value,
        case_insensitive: true,
    }
}

/// Compile query parameters into a filter expression
///
/// Keys are processed in order; a later key targeting the same field and
/// tier replaces the earlier one.
pub fn compile<I, K, V>(params: I) -> FilterExpression
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut fields = FieldFilters::new();
    let mut relation = FieldFilters::new();
    let mut length_gte: Option<FilterValue> = None;
    let mut length_lte: Option<FilterValue> = None;

    for (key, value) in params {
        let (key, value) = (key.as_ref(), value.as_ref());

        if SPECIAL_KEYS.contains(&key) {
            continue;
        }

        if key == TAGS_IN_KEY {
            fields.insert(TAGS_FIELD.to_string(), FieldFilter::HasSome(split_list(value)));
            continue;
        }

        if key == COMPETITION_IDS_IN_KEY {
            relation.insert(
                COMPETITION_ID_FIELD.to_string(),
                FieldFilter::In(split_list(value)),
            );
            continue;
        }

        if let Some((field, op)) = Operator::split_key(key) {
            let operand = coerce_operand(field, op, value);

            if field == MERGED_RANGE_FIELD {
                match op {
                    Operator::Gte => length_gte = Some(operand.clone()),
                    Operator::Lte => length_lte = Some(operand.clone()),
                    _ => {}
                }
            }

            let tier = if is_relation_field(field) {
                &mut relation
            } else {
                &mut fields
            };
            tier.insert(field.to_string(), op.into_filter(operand));
            continue;
        }

        fields.insert(key.to_string(), FieldFilter::Equals(coerce_bare(value)));
    }

    if length_gte.is_some() || length_lte.is_some() {
        relation.insert(
            MERGED_RANGE_FIELD.to_string(),
            FieldFilter::Range {
                gte: length_gte,
                lte: length_lte,
            },
        );
    }

    let races = if relation.is_empty() {
        None
    } else {
        // The relation wrapper owns the `races` key
        fields.remove(super::RELATION_NAME);
        Some(relation)
    };

    FilterExpression { fields, races }
}

/// Whether a field's conditions belong to the related race tier
pub fn is_relation_field(field: &str) -> bool {
    RELATION_SCOPED_FIELDS.contains(&field)
}

/// Whether a field name denotes a date/time value
pub fn is_date_field(field: &str) -> bool {
    field.to_ascii_lowercase().contains("date")
}

fn coerce_operand(field: &str, op: Operator, raw: &str) -> FilterValue {
    if op.accepts_numbers()
        && let Some(n) = parse_number(raw)
    {
        return FilterValue::Number(n);
    }

    if is_date_field(field) {
        let parsed = parse_datetime(raw)
            .map(DateTimeValue::Valid)
            .unwrap_or(DateTimeValue::Invalid);
        return FilterValue::DateTime(parsed);
    }

    FilterValue::Text(raw.to_string())
}

fn coerce_bare(raw: &str) -> FilterValue {
    match parse_number(raw) {
        Some(n) => FilterValue::Number(n),
        None => FilterValue::Text(raw.to_string()),
    }
}

/// Parse a finite number; blank input is not a number
fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Split a comma-separated list, trimming each element
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).collect()
}
