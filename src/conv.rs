//! Conversion of positional parameters into typed values.

use crate::error::Error;
use crate::record::NodeRecord;
use serde_json::Value;

impl TryFrom<&[Value]> for NodeRecord {
    type Error = Error;

    /// Convert the parameters of a node `INSERT`, in column order.
    fn try_from(params: &[Value]) -> Result<Self, Self::Error> {
        let [node_type, package_name, display_name, description, category, development_style, is_ai_tool, is_trigger, is_webhook, is_versioned, version, documentation, properties_schema, operations, credentials_required, outputs, output_names] =
            params
        else {
            return Err(Error::InvalidParameter(format!(
                "a node insert takes {} parameters, got {}",
                NodeRecord::PARAMS,
                params.len()
            )));
        };

        Ok(Self {
            node_type: required_text("node_type", node_type)?,
            package_name: required_text("package_name", package_name)?,
            display_name: required_text("display_name", display_name)?,
            description: optional_text("description", description)?,
            category: optional_text("category", category)?,
            development_style: optional_text("development_style", development_style)?,
            is_ai_tool: flag("is_ai_tool", is_ai_tool)?,
            is_trigger: flag("is_trigger", is_trigger)?,
            is_webhook: flag("is_webhook", is_webhook)?,
            is_versioned: flag("is_versioned", is_versioned)?,
            version: match version {
                Value::Number(number) => Some(number.to_string()),
                value => optional_text("version", value)?,
            },
            documentation: optional_text("documentation", documentation)?,
            properties_schema: blob(properties_schema),
            operations: blob(operations),
            credentials_required: blob(credentials_required),
            outputs: blob(outputs),
            output_names: blob(output_names),
        })
    }
}

/// The search term of a `LIKE` query: the parameter's text with every `%` wildcard removed.
pub(crate) fn search_term(param: &Value) -> String {
    match param {
        Value::String(text) => text.replace('%', ""),
        value => value.to_string().replace('%', ""),
    }
}

/// A text column that must be present.
fn required_text(column: &str, value: &Value) -> Result<String, Error> {
    match value {
        Value::String(text) => Ok(text.clone()),
        value => Err(mismatch(column, "a string", value)),
    }
}

/// A nullable text column.
fn optional_text(column: &str, value: &Value) -> Result<Option<String>, Error> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text.clone())),
        value => Err(mismatch(column, "a string or null", value)),
    }
}

/// A boolean column. Callers written against SQLite pass `0` and `1`.
fn flag(column: &str, value: &Value) -> Result<bool, Error> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(mismatch(column, "a boolean, 0 or 1", value)),
        },
        value => Err(mismatch(column, "a boolean, 0 or 1", value)),
    }
}

/// A blob column, stored as given. `null` means absent.
fn blob(value: &Value) -> Option<Value> {
    (!value.is_null()).then(|| value.clone())
}

fn mismatch(column: &str, expected: &str, value: &Value) -> Error {
    Error::InvalidParameter(format!("{column} must be {expected}, got {value}"))
}
