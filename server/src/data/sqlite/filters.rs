//! SQL translation of race-event filters
//!
//! Appends `AND ...` conditions for a [`FilterExpression`] to a query over
//! `race_events e`. API field names resolve through fixed column
//! whitelists; anything that cannot be evaluated against the column's kind
//! is rejected as [`SqliteError::InvalidFilter`].

use sqlx::{QueryBuilder, Sqlite};

use super::SqliteError;
use crate::domain::filters::{
    DateTimeValue, FieldFilter, FieldFilters, FilterExpression, FilterValue, TextOp,
};
use crate::utils::sql::escape_like_pattern;
use crate::utils::time::parse_datetime;

/// Alias of the event table in list queries
pub const EVENT_ALIAS: &str = "e";
const RACE_ALIAS: &str = "r";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Text,
    Number,
    DateTime,
    Id,
    /// JSON array of strings
    TextArray,
}

struct Column {
    field: &'static str,
    name: &'static str,
    kind: ColumnKind,
}

const fn col(field: &'static str, name: &'static str, kind: ColumnKind) -> Column {
    Column { field, name, kind }
}

const EVENT_COLUMNS: &[Column] = &[
    col("id", "id", ColumnKind::Id),
    col("eventName", "event_name", ColumnKind::Text),
    col("slug", "slug", ColumnKind::Text),
    col("description", "description", ColumnKind::Text),
    col("mainImage", "main_image", ColumnKind::Text),
    col("organizerId", "organizer_id", ColumnKind::Id),
    col("contactPhone", "contact_phone", ColumnKind::Text),
    col("contactEmail", "contact_email", ColumnKind::Text),
    col("organizerSite", "organizer_site", ColumnKind::Text),
    col("registrationSite", "registration_site", ColumnKind::Text),
    col("socialMedia", "social_media", ColumnKind::Text),
    col("tags", "tags", ColumnKind::TextArray),
    col("createdAt", "created_at", ColumnKind::DateTime),
    col("updatedAt", "updated_at", ColumnKind::DateTime),
];

const RACE_COLUMNS: &[Column] = &[
    col("elevation", "elevation", ColumnKind::Number),
    col("length", "length", ColumnKind::Number),
    col("startLocation", "start_location", ColumnKind::Text),
    col("startDateTime", "start_date_time", ColumnKind::DateTime),
    col("endDateTime", "end_date_time", ColumnKind::DateTime),
    col("gpsFile", "gps_file", ColumnKind::Text),
    col("competitionId", "competition_id", ColumnKind::Id),
];

/// Bound parameter after coercion to the column's storage type
enum Operand {
    Int(i64),
    Real(f64),
    Text(String),
}

/// Append filter conditions to a query whose FROM clause aliases the event
/// table as `e` and which already has a `WHERE` clause.
pub fn push_race_event_filters(
    qb: &mut QueryBuilder<'_, Sqlite>,
    expr: &FilterExpression,
) -> Result<(), SqliteError> {
    push_tier(qb, EVENT_ALIAS, EVENT_COLUMNS, &expr.fields)?;

    if let Some(races) = &expr.races {
        qb.push(" AND EXISTS (SELECT 1 FROM races ")
            .push(RACE_ALIAS)
            .push(" WHERE ")
            .push(RACE_ALIAS)
            .push(".race_event_id = ")
            .push(EVENT_ALIAS)
            .push(".id");
        push_tier(qb, RACE_ALIAS, RACE_COLUMNS, races)?;
        qb.push(")");
    }

    Ok(())
}

fn push_tier(
    qb: &mut QueryBuilder<'_, Sqlite>,
    alias: &str,
    columns: &[Column],
    filters: &FieldFilters,
) -> Result<(), SqliteError> {
    for (field, filter) in filters {
        let column = columns
            .iter()
            .find(|c| c.field == field)
            .ok_or_else(|| SqliteError::InvalidFilter(format!("Unknown filter field: {}", field)))?;
        qb.push(" AND (");
        push_condition(qb, alias, column, filter)?;
        qb.push(")");
    }
    Ok(())
}

fn push_condition(
    qb: &mut QueryBuilder<'_, Sqlite>,
    alias: &str,
    column: &Column,
    filter: &FieldFilter,
) -> Result<(), SqliteError> {
    let target = format!("{}.{}", alias, column.name);

    match filter {
        FieldFilter::Equals(value) => {
            let operand = operand_for(column, value)?;
            if column.kind == ColumnKind::TextArray {
                qb.push("EXISTS (SELECT 1 FROM json_each(")
                    .push(&target)
                    .push(") WHERE json_each.value = ");
                push_operand(qb, operand);
                qb.push(")");
            } else {
                qb.push(&target).push(" = ");
                push_operand(qb, operand);
            }
        }
        FieldFilter::Text {
            op,
            value,
            case_insensitive,
        } => {
            if !matches!(column.kind, ColumnKind::Text | ColumnKind::Id) {
                return Err(SqliteError::InvalidFilter(format!(
                    "{} is not supported for {}",
                    op.as_str(),
                    column.field
                )));
            }
            let needle = match operand_for(column, value)? {
                Operand::Text(s) => s,
                Operand::Int(i) => i.to_string(),
                Operand::Real(f) => f.to_string(),
            };
            push_text_match(qb, &target, *op, needle, *case_insensitive);
        }
        FieldFilter::Range { gte, lte } => {
            if column.kind == ColumnKind::TextArray {
                return Err(SqliteError::InvalidFilter(format!(
                    "Range filters are not supported for {}",
                    column.field
                )));
            }
            let mut first = true;
            for (bound, cmp) in [(gte, " >= "), (lte, " <= ")] {
                if let Some(value) = bound {
                    let operand = operand_for(column, value)?;
                    if !first {
                        qb.push(" AND ");
                    }
                    qb.push(&target).push(cmp);
                    push_operand(qb, operand);
                    first = false;
                }
            }
            if first {
                qb.push("1=1");
            }
        }
        FieldFilter::HasSome(values) => {
            if column.kind != ColumnKind::TextArray {
                return Err(SqliteError::InvalidFilter(format!(
                    "hasSome is not supported for {}",
                    column.field
                )));
            }
            if values.is_empty() {
                qb.push("0");
            } else {
                qb.push("EXISTS (SELECT 1 FROM json_each(")
                    .push(&target)
                    .push(") WHERE json_each.value IN (");
                push_list(qb, values);
                qb.push("))");
            }
        }
        FieldFilter::In(values) => {
            if !matches!(column.kind, ColumnKind::Text | ColumnKind::Id) {
                return Err(SqliteError::InvalidFilter(format!(
                    "in is not supported for {}",
                    column.field
                )));
            }
            if values.is_empty() {
                qb.push("0");
            } else {
                qb.push(&target).push(" IN (");
                push_list(qb, values);
                qb.push(")");
            }
        }
    }

    Ok(())
}

fn push_text_match(
    qb: &mut QueryBuilder<'_, Sqlite>,
    target: &str,
    op: TextOp,
    needle: String,
    case_insensitive: bool,
) {
    if case_insensitive {
        let escaped = escape_like_pattern(&needle);
        let pattern = match op {
            TextOp::Contains => format!("%{}%", escaped),
            TextOp::StartsWith => format!("{}%", escaped),
            TextOp::EndsWith => format!("%{}", escaped),
        };
        qb.push(target).push(" LIKE ");
        qb.push_bind(pattern);
        qb.push(" ESCAPE '\\'");
        return;
    }

    match op {
        TextOp::Contains => {
            qb.push("instr(").push(target).push(", ");
            qb.push_bind(needle);
            qb.push(") > 0");
        }
        TextOp::StartsWith => {
            qb.push("substr(").push(target).push(", 1, length(");
            qb.push_bind(needle.clone());
            qb.push(")) = ");
            qb.push_bind(needle);
        }
        TextOp::EndsWith => {
            qb.push("substr(").push(target).push(", -length(");
            qb.push_bind(needle.clone());
            qb.push(")) = ");
            qb.push_bind(needle);
        }
    }
}

fn push_list(qb: &mut QueryBuilder<'_, Sqlite>, values: &[String]) {
    let mut separated = qb.separated(", ");
    for value in values {
        separated.push_bind(value.clone());
    }
}

fn push_operand(qb: &mut QueryBuilder<'_, Sqlite>, operand: Operand) {
    match operand {
        Operand::Int(i) => {
            qb.push_bind(i);
        }
        Operand::Real(f) => {
            qb.push_bind(f);
        }
        Operand::Text(s) => {
            qb.push_bind(s);
        }
    }
}

/// Coerce a filter value to the storage type of `column`
fn operand_for(column: &Column, value: &FilterValue) -> Result<Operand, SqliteError> {
    match column.kind {
        ColumnKind::Number => match value {
            FilterValue::Number(n) => Ok(Operand::Real(*n)),
            _ => Err(SqliteError::InvalidFilter(format!(
                "{} expects a number",
                column.field
            ))),
        },
        ColumnKind::DateTime => match value {
            // Numbers on date columns are unix seconds
            FilterValue::Number(n) => Ok(Operand::Int(*n as i64)),
            FilterValue::DateTime(DateTimeValue::Valid(dt)) => Ok(Operand::Int(dt.timestamp())),
            FilterValue::DateTime(DateTimeValue::Invalid) => Err(SqliteError::InvalidFilter(
                format!("Invalid date for {}", column.field),
            )),
            FilterValue::Text(s) => parse_datetime(s)
                .map(|dt| Operand::Int(dt.timestamp()))
                .ok_or_else(|| {
                    SqliteError::InvalidFilter(format!("Invalid date for {}", column.field))
                }),
        },
        ColumnKind::Text | ColumnKind::Id | ColumnKind::TextArray => match value {
            FilterValue::Text(s) => Ok(Operand::Text(s.clone())),
            FilterValue::Number(n) => Ok(Operand::Text(render_number(*n))),
            FilterValue::DateTime(_) => Err(SqliteError::InvalidFilter(format!(
                "{} does not accept a date",
                column.field
            ))),
        },
    }
}

/// Text form of a coerced number, integral values without a fraction
fn render_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        (n as i64).to_string()
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filters::compile;

    const BASE: &str = "SELECT e.id FROM race_events e WHERE 1=1";

    fn build(pairs: &[(&str, &str)]) -> Result<String, SqliteError> {
        let expr = compile(pairs.iter().copied());
        let mut qb = QueryBuilder::<Sqlite>::new(BASE);
        push_race_event_filters(&mut qb, &expr)?;
        Ok(qb.sql().to_string())
    }

    #[test]
    fn test_empty_filter_adds_nothing() {
        assert_eq!(build(&[]).unwrap(), BASE);
    }

    #[test]
    fn test_contains_uses_escaped_like() {
        let sql = build(&[("eventName_contains", "city")]).unwrap();
        assert_eq!(sql, format!("{} AND (e.event_name LIKE ? ESCAPE '\\')", BASE));
    }

    #[test]
    fn test_case_sensitive_text_match_skips_like() {
        let text = |op, value: &str| FieldFilter::Text {
            op,
            value: FilterValue::Text(value.to_string()),
            case_insensitive: false,
        };
        let mut expr = FilterExpression::default();
        expr.fields.insert("eventName".to_string(), text(TextOp::Contains, "City"));
        expr.fields.insert("slug".to_string(), text(TextOp::StartsWith, "city-"));
        expr.fields.insert("organizerId".to_string(), text(TextOp::EndsWith, "_x"));

        let mut qb = QueryBuilder::<Sqlite>::new(BASE);
        push_race_event_filters(&mut qb, &expr).unwrap();
        let sql = qb.sql().to_string();

        assert!(!sql.contains("LIKE"));
        assert!(sql.contains("(instr(e.event_name, ?) > 0)"));
        assert!(sql.contains("(substr(e.slug, 1, length(?)) = ?)"));
        assert!(sql.contains("(substr(e.organizer_id, -length(?)) = ?)"));
    }

    #[test]
    fn test_relation_tier_becomes_exists() {
        let sql = build(&[("elevation_gte", "100"), ("length_lte", "42")]).unwrap();
        assert!(sql.contains("EXISTS (SELECT 1 FROM races r WHERE r.race_event_id = e.id"));
        assert!(sql.contains("(r.elevation >= ?)"));
        assert!(sql.contains("(r.length <= ?)"));
    }

    #[test]
    fn test_length_range_has_both_bounds() {
        let sql = build(&[("length_gte", "10"), ("length_lte", "42")]).unwrap();
        assert!(sql.contains("(r.length >= ? AND r.length <= ?)"));
    }

    #[test]
    fn test_tags_has_some_uses_json_each() {
        let sql = build(&[("tags_in", "trail,road")]).unwrap();
        assert!(sql.contains("EXISTS (SELECT 1 FROM json_each(e.tags) WHERE json_each.value IN (?, ?))"));
    }

    #[test]
    fn test_competition_ids_use_in_list() {
        let sql = build(&[("competitionIds_in", "a,b,c")]).unwrap();
        assert!(sql.contains("(r.competition_id IN (?, ?, ?))"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = build(&[("nickname", "x")]).unwrap_err();
        assert!(matches!(err, SqliteError::InvalidFilter(msg) if msg.contains("nickname")));
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        let err = build(&[("startDateTime_gte", "someday")]).unwrap_err();
        assert!(matches!(err, SqliteError::InvalidFilter(msg) if msg.contains("startDateTime")));
    }

    #[test]
    fn test_non_numeric_value_on_number_column_is_rejected() {
        assert!(build(&[("elevation_gte", "high")]).is_err());
    }

    #[test]
    fn test_text_value_on_created_at_is_parsed_as_date() {
        let sql = build(&[("createdAt_gte", "2025-01-01")]).unwrap();
        assert!(sql.contains("(e.created_at >= ?)"));
        assert!(build(&[("createdAt_gte", "soon")]).is_err());
    }

    #[test]
    fn test_text_op_on_number_column_is_rejected() {
        assert!(build(&[("elevation_contains", "1")]).is_err());
    }

    #[test]
    fn test_render_number() {
        assert_eq!(render_number(42.0), "42");
        assert_eq!(render_number(2.5), "2.5");
    }
}
