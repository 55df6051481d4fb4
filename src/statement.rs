//! Prepared statements translated onto table queries.

use crate::backend::TableBackend;
use crate::conv::search_term;
use crate::error::{Error, NotImplemented, Result};
use crate::query::TableQuery;
use crate::record::{ColumnDefinition, NodeRecord, Row, RunResult};
use crate::sql::{self, Operation, SelectIntent};
use crate::tracing_shim::{debug, error};
use serde_json::Value;

/// The columns searched by [`SelectIntent::SearchText`].
pub const SEARCH_COLUMNS: [&str; 3] = ["node_type", "display_name", "description"];

/// The column listings are ordered by.
const ORDER_COLUMN: &str = "display_name";

/// A statement bound to a backend.
///
/// Statements hold no cursor or transaction state and can be executed any number of times. Text
/// is classified once, when the statement is prepared.
#[must_use]
#[derive(Debug)]
pub struct Statement<'a, Backend> {
    backend: &'a Backend,
    sql: String,
    table: String,
    operation: Operation,
    intent: Option<SelectIntent>,
}

impl<'a, Backend> Statement<'a, Backend>
where
    Backend: TableBackend,
{
    /// Classify `text` and bind it to `backend`. This never fails.
    pub(crate) fn new(backend: &'a Backend, text: &str) -> Self {
        let operation = Operation::from_sql(text);
        Self {
            backend,
            sql: text.to_owned(),
            table: sql::table_name(text),
            operation,
            intent: (operation == Operation::Select).then(|| SelectIntent::from_sql(text)),
        }
    }

    /// A `SELECT` with an explicit intent rather than one inferred from text.
    pub(crate) fn with_intent(backend: &'a Backend, table: &str, intent: SelectIntent) -> Self {
        let table = sql::backend_table(table).to_owned();
        Self {
            backend,
            sql: format!("SELECT * FROM {table}"),
            table,
            operation: Operation::Select,
            intent: Some(intent),
        }
    }

    /// The text the statement was prepared from.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The backend table the statement targets.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The kind of statement.
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// How the statement reads, if it is a `SELECT`.
    pub const fn intent(&self) -> Option<SelectIntent> {
        self.intent
    }

    /// Execute a statement that modifies a table.
    ///
    /// Only `INSERT` is translated. It takes the [`NodeRecord::PARAMS`] columns of a node in
    /// order and upserts them.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(sql = %self.sql)))]
    pub async fn run(&self, params: &[Value]) -> Result<RunResult> {
        let result = match self.operation {
            Operation::Insert => match NodeRecord::try_from(params) {
                Ok(record) => self.insert(&record).await,
                Err(err) => Err(err),
            },
            Operation::Update => Err(NotImplemented::Update.into()),
            Operation::Delete => Err(NotImplemented::Delete.into()),
            operation @ (Operation::Select | Operation::Unknown) => Err(Error::Unsupported {
                method: "run",
                operation,
            }),
        };
        result.inspect_err(|err| {
            error!(%err, "run failed");
        })
    }

    /// Execute an `INSERT` with a typed record instead of positional parameters.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(sql = %self.sql)))]
    pub async fn run_record(&self, record: &NodeRecord) -> Result<RunResult> {
        let result = match self.operation {
            Operation::Insert => self.insert(record).await,
            operation => Err(Error::Unsupported {
                method: "run_record",
                operation,
            }),
        };
        result.inspect_err(|err| {
            error!(%err, "run failed");
        })
    }

    /// The first row a `SELECT` produces, if any.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(sql = %self.sql)))]
    pub async fn get(&self, params: &[Value]) -> Result<Option<Row>> {
        let result = match self.intent {
            Some(intent) => self
                .select(intent, params)
                .await
                .map(|rows| rows.into_iter().next()),
            None => Err(Error::Unsupported {
                method: "get",
                operation: self.operation,
            }),
        };
        result.inspect_err(|err| {
            error!(%err, "get failed");
        })
    }

    /// Every row a `SELECT` produces.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(sql = %self.sql)))]
    pub async fn all(&self, params: &[Value]) -> Result<Vec<Row>> {
        let result = match self.intent {
            Some(intent) => self.select(intent, params).await,
            None => Err(Error::Unsupported {
                method: "all",
                operation: self.operation,
            }),
        };
        result.inspect_err(|err| {
            error!(%err, "all failed");
        })
    }

    /// Always fails: remote backends have no synchronous transport.
    pub fn run_sync(&self, _params: &[Value]) -> Result<RunResult> {
        Err(NotImplemented::Sync("run").into())
    }

    /// Always fails: remote backends have no synchronous transport.
    pub fn get_sync(&self, _params: &[Value]) -> Result<Option<Row>> {
        Err(NotImplemented::Sync("get").into())
    }

    /// Always fails: remote backends have no synchronous transport.
    pub fn all_sync(&self, _params: &[Value]) -> Result<Vec<Row>> {
        Err(NotImplemented::Sync("all").into())
    }

    /// Always fails. Use [`Statement::all`].
    pub fn iterate(&self, _params: &[Value]) -> Result<std::vec::IntoIter<Row>> {
        Err(NotImplemented::Iterate.into())
    }

    /// Accepted for compatibility. Rows are always returned whole.
    pub const fn pluck(&self, _toggle: Option<bool>) -> &Self {
        self
    }

    /// Accepted for compatibility. Rows are always returned whole.
    pub const fn expand(&self, _toggle: Option<bool>) -> &Self {
        self
    }

    /// Accepted for compatibility. Rows are always returned whole.
    pub const fn raw(&self, _toggle: Option<bool>) -> &Self {
        self
    }

    /// Accepted for compatibility. Parameters are passed when executing.
    pub const fn bind(&self, _params: &[Value]) -> &Self {
        self
    }

    /// Column metadata. Always empty; the backend's schema is not introspected.
    pub fn columns(&self) -> Vec<ColumnDefinition> {
        Vec::new()
    }

    async fn insert(&self, record: &NodeRecord) -> Result<RunResult> {
        debug!(table = %self.table, node_type = %record.node_type, "upserting node");
        let _stored = self.backend.upsert(&self.table, record.to_row()).await?;
        Ok(RunResult::changed(1))
    }

    async fn select(&self, intent: SelectIntent, params: &[Value]) -> Result<Vec<Row>> {
        debug!(table = %self.table, ?intent, "translating select");
        let query = TableQuery::from_table(&self.table);

        let query = match intent {
            SelectIntent::FilterByType => {
                let node_type = params.first().ok_or_else(|| {
                    Error::InvalidParameter("a node_type filter takes one parameter".to_owned())
                })?;
                query.eq("node_type", node_type.clone())
            }
            SelectIntent::FilterByAiTool => query.eq("is_ai_tool", true),
            SelectIntent::CountAll => {
                let selection = self.backend.select(query.head_count()).await?;
                let mut row = Row::new();
                let _previous = row.insert("count".to_owned(), selection.count.unwrap_or(0).into());
                return Ok(vec![row]);
            }
            SelectIntent::SearchText => match params.first() {
                Some(term) => query.ilike_any(SEARCH_COLUMNS, search_term(term)),
                None => query,
            },
            SelectIntent::ListOrdered { limit } => {
                let query = query.order_asc(ORDER_COLUMN);
                match limit {
                    Some(limit) => query.limit(limit),
                    None => query,
                }
            }
        };

        Ok(self.backend.select(query).await?.rows)
    }
}
