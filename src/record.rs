//! Shapes of data moving through the adapter.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single row, keyed by column name. Its shape is dictated by the remote table.
pub type Row = serde_json::Map<String, Value>;

/// The outcome of a statement that modifies a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    /// The number of rows changed.
    pub changes: u64,
    /// Always [`RunResult::NO_ROWID`]. Hosted backends do not expose autoincrement ids.
    pub last_insert_rowid: i64,
}

impl RunResult {
    /// The placeholder stored in `last_insert_rowid`.
    pub const NO_ROWID: i64 = 0;

    /// A result reporting `changes` rows changed.
    pub const fn changed(changes: u64) -> Self {
        Self {
            changes,
            last_insert_rowid: Self::NO_ROWID,
        }
    }
}

/// Describes one column of a statement's result. Never produced at the moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDefinition {
    /// The column name.
    pub name: String,
    /// The column the value originates from, if any.
    pub column: Option<String>,
    /// The table the value originates from, if any.
    pub table: Option<String>,
    /// The declared type, if any.
    pub data_type: Option<String>,
}

/// A row of the node catalog, as written by `INSERT`.
///
/// Blob columns hold whatever JSON the caller supplies; most callers store serialized JSON text.
#[allow(missing_docs, clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub node_type: String,
    pub package_name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub development_style: Option<String>,
    #[serde(default)]
    pub is_ai_tool: bool,
    #[serde(default)]
    pub is_trigger: bool,
    #[serde(default)]
    pub is_webhook: bool,
    #[serde(default)]
    pub is_versioned: bool,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub documentation: Option<String>,
    #[serde(default)]
    pub properties_schema: Option<Value>,
    #[serde(default)]
    pub operations: Option<Value>,
    #[serde(default)]
    pub credentials_required: Option<Value>,
    #[serde(default)]
    pub outputs: Option<Value>,
    #[serde(default)]
    pub output_names: Option<Value>,
}

impl NodeRecord {
    /// The number of positional parameters an `INSERT` of a node takes.
    pub const PARAMS: usize = 17;

    /// The record as a row, ready to be sent to a backend.
    pub fn to_row(&self) -> Row {
        match serde_json::to_value(self) {
            Ok(Value::Object(row)) => row,
            // A struct of strings, booleans and JSON values always serializes to an object.
            _ => Row::new(),
        }
    }
}
