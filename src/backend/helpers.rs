use crate::query::Filter;
use crate::record::Row;
use serde_json::Value;
use std::cmp::Ordering;

/// Whether `row` passes `filter`, following PostgREST's `eq` and `ilike` semantics.
pub(super) fn matches(row: &Row, filter: &Filter) -> bool {
    match filter {
        Filter::Eq { column, value } => row
            .get(column)
            .is_some_and(|stored| values_eq(stored, value)),
        Filter::IlikeAny { columns, term } => {
            let term = term.to_lowercase();
            columns.iter().any(|column| match row.get(column) {
                Some(Value::String(text)) => text.to_lowercase().contains(&term),
                _ => false,
            })
        }
    }
}

/// SQL equality between a stored value and a filter value. `NULL` equals nothing, and booleans
/// compare equal to `0` and `1` the way Postgres casts them.
fn values_eq(stored: &Value, value: &Value) -> bool {
    match (stored, value) {
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Bool(flag), Value::Number(number)) | (Value::Number(number), Value::Bool(flag)) => {
            number.as_i64() == Some(i64::from(*flag))
        }
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (stored, value) => stored == value,
    }
}

/// Ascending order on one column, with nulls and missing values last.
pub(super) fn compare(a: &Row, b: &Row, column: &str) -> Ordering {
    match (non_null(a.get(column)), non_null(b.get(column))) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
    }
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|value| !value.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(row) => row,
            _ => unreachable!("test rows are objects"),
        }
    }

    #[test]
    fn eq_casts_booleans() {
        let ai_tool = row(json!({ "is_ai_tool": true }));
        let filter = |value: Value| Filter::Eq {
            column: "is_ai_tool".to_owned(),
            value,
        };
        assert!(matches(&ai_tool, &filter(json!(true))));
        assert!(matches(&ai_tool, &filter(json!(1))));
        assert!(!matches(&ai_tool, &filter(json!(0))));
        assert!(!matches(&row(json!({ "is_ai_tool": null })), &filter(Value::Null)));
    }

    #[test]
    fn ilike_searches_every_column() {
        let filter = Filter::IlikeAny {
            columns: vec!["node_type".to_owned(), "description".to_owned()],
            term: "HTTP".to_owned(),
        };
        assert!(matches(
            &row(json!({ "node_type": "x", "description": "Makes an http request" })),
            &filter
        ));
        assert!(!matches(
            &row(json!({ "node_type": "x", "display_name": "HTTP Request" })),
            &filter
        ));
    }

    #[test]
    fn nulls_sort_last() {
        let a = row(json!({ "display_name": "A" }));
        let none = row(json!({ "display_name": null }));
        assert_eq!(compare(&a, &none, "display_name"), Ordering::Less);
        assert_eq!(compare(&none, &a, "display_name"), Ordering::Greater);
        assert_eq!(
            compare(&row(json!({ "n": 10 })), &row(json!({ "n": 9 })), "n"),
            Ordering::Greater
        );
    }
}
