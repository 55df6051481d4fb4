use crate::backend::{helpers, DatabaseBackend, TableBackend};
use crate::error::{ApiError, RemoteError};
use crate::query::{CountMode, Selection, TableQuery};
use crate::record::Row;
use crate::tracing_shim::debug;
use crate::Location;
use std::collections::BTreeMap;
use std::future::{self, Future};
use std::sync::{Mutex, PoisonError, RwLock};

/// A request received by a [`Memory`] backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// A read.
    Select(TableQuery),
    /// An upsert of one row.
    Upsert {
        /// The target table.
        table: String,
        /// The row sent.
        row: Row,
    },
}

/// An in-process backend with the same observable behavior as a hosted one.
///
/// Tables must be created with [`Memory::create_table`] before use; reading a missing table fails
/// the same way Postgres does. Every request is recorded and can be inspected with
/// [`Memory::requests`].
#[derive(Debug)]
pub struct Memory {
    location: Location,
    tables: RwLock<BTreeMap<String, Table>>,
    requests: Mutex<Vec<Request>>,
}

#[derive(Debug)]
struct Table {
    /// The primary-key column upserts conflict on.
    key: String,
    rows: Vec<Row>,
}

impl Memory {
    /// An empty in-memory backend.
    #[inline]
    pub fn new() -> Self {
        Self {
            location: Location::InMemory,
            tables: RwLock::new(BTreeMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create `table` with the given primary-key column. Nothing happens if it already exists.
    pub fn create_table(&self, table: &str, key: &str) {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let _table = tables.entry(table.to_owned()).or_insert_with(|| Table {
            key: key.to_owned(),
            rows: Vec::new(),
        });
    }

    /// The rows currently stored in `table`, in insertion order. Not recorded as a request.
    pub fn rows(&self, table: &str) -> Option<Vec<Row>> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        tables.get(table).map(|table| table.rows.clone())
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<Request> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, request: Request) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
    }

    fn select_now(&self, query: TableQuery) -> Result<Selection, RemoteError> {
        self.record(Request::Select(query.clone()));

        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        let table = tables.get(&query.table).ok_or_else(|| undefined_table(&query.table))?;

        let mut rows: Vec<_> = table
            .rows
            .iter()
            .filter(|row| query.filter.as_ref().map_or(true, |filter| helpers::matches(row, filter)))
            .cloned()
            .collect();
        drop(tables);

        let count = match query.count {
            CountMode::None => None,
            CountMode::Exact | CountMode::ExactHead => Some(rows.len() as u64),
        };
        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = helpers::compare(a, b, &order.column);
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        if query.count == CountMode::ExactHead {
            rows.clear();
        }

        debug!(table = %query.table, rows = rows.len(), ?count, "memory select");
        Ok(Selection { rows, count })
    }

    fn upsert_now(&self, table_name: &str, row: Row) -> Result<Vec<Row>, RemoteError> {
        self.record(Request::Upsert {
            table: table_name.to_owned(),
            row: row.clone(),
        });

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let table = tables
            .get_mut(table_name)
            .ok_or_else(|| undefined_table(table_name))?;

        let key = match row.get(&table.key) {
            Some(key) if !key.is_null() => key.clone(),
            _ => {
                return Err(ApiError::new(
                    "23502",
                    format!(
                        "null value in column \"{}\" of relation \"{table_name}\" violates not-null \
                         constraint",
                        table.key
                    ),
                )
                .into())
            }
        };

        let existing = table
            .rows
            .iter_mut()
            .find(|stored| stored.get(&table.key) == Some(&key));
        match existing {
            Some(stored) => *stored = row.clone(),
            None => table.rows.push(row.clone()),
        }

        Ok(vec![row])
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseBackend for Memory {
    fn at_location(location: Location) -> Result<Self, RemoteError> {
        match location {
            Location::InMemory => Ok(Self::new()),
            location => Err(RemoteError::Location(format!(
                "the memory backend cannot be opened at {location:?}"
            ))),
        }
    }

    fn location(&self) -> &Location {
        &self.location
    }
}

impl TableBackend for Memory {
    fn select(
        &self,
        query: TableQuery,
    ) -> impl Future<Output = Result<Selection, RemoteError>> + Send {
        future::ready(self.select_now(query))
    }

    fn upsert(
        &self,
        table: &str,
        row: Row,
    ) -> impl Future<Output = Result<Vec<Row>, RemoteError>> + Send {
        future::ready(self.upsert_now(table, row))
    }
}

fn undefined_table(table: &str) -> RemoteError {
    ApiError::new("42P01", format!("relation \"{table}\" does not exist")).into()
}
