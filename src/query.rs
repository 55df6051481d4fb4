//! The remote query builder.
//!
//! A [`TableQuery`] describes a single read against one table: an optional filter, ordering, row
//! cap and counting mode. Backends translate it into their own request format.

use crate::record::Row;
use serde_json::Value;

/// How a backend should count the rows matching a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CountMode {
    /// Don't count.
    #[default]
    None,
    /// Count exactly and return the rows.
    Exact,
    /// Count exactly and return no rows.
    ExactHead,
}

/// A row filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `column = value`.
    Eq {
        /// The column to compare.
        column: String,
        /// The value it must equal.
        value: Value,
    },
    /// Any of `columns` contains `term`, ignoring case.
    IlikeAny {
        /// The columns searched.
        columns: Vec<String>,
        /// The text searched for, without wildcards.
        term: String,
    },
}

/// An ordering on a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// The column to sort by.
    pub column: String,
    /// Whether to sort ascending.
    pub ascending: bool,
}

/// A read against one table.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    /// The table to read.
    pub table: String,
    /// Which rows to return.
    pub filter: Option<Filter>,
    /// How to sort the rows.
    pub order: Option<Order>,
    /// The maximum number of rows to return.
    pub limit: Option<u64>,
    /// Whether to count the matching rows.
    pub count: CountMode,
}

impl TableQuery {
    /// Select every column of every row of `table`.
    pub fn from_table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filter: None,
            order: None,
            limit: None,
            count: CountMode::None,
        }
    }

    /// Only keep rows where `column` equals `value`.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter = Some(Filter::Eq {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    /// Only keep rows where any of `columns` contains `term`, ignoring case.
    pub fn ilike_any<I, S>(mut self, columns: I, term: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter = Some(Filter::IlikeAny {
            columns: columns.into_iter().map(Into::into).collect(),
            term: term.into(),
        });
        self
    }

    /// Sort ascending by `column`.
    pub fn order_asc(mut self, column: impl Into<String>) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending: true,
        });
        self
    }

    /// Return at most `limit` rows.
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Count matching rows exactly without returning any of them.
    pub const fn head_count(mut self) -> Self {
        self.count = CountMode::ExactHead;
        self
    }
}

/// The rows returned for a [`TableQuery`], along with the count if one was requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// The rows, in backend order.
    pub rows: Vec<Row>,
    /// The exact number of matching rows, if counted.
    pub count: Option<u64>,
}
