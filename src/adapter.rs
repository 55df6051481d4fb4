//! The adapter: a database handle over a table backend.

use crate::backend::TableBackend;
use crate::error::{Error, RemoteError, Result};
use crate::query::TableQuery;
use crate::sql::SelectIntent;
use crate::statement::Statement;
use crate::tracing_shim::{debug, error, info, warn};
use crate::Location;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};

/// The table probed when connecting.
pub const PRIMARY_TABLE: &str = "n8n_nodes";

/// A database handle that prepares statements against a table backend.
///
/// The backend is owned for the lifetime of the adapter and shared by every statement prepared
/// from it. There are no transactions: each statement execution is a single, individually atomic
/// request. See [`Adapter::transaction`].
#[derive(Debug)]
pub struct Adapter<Backend> {
    backend: Backend,
    in_transaction: AtomicBool,
}

impl<Backend> Adapter<Backend>
where
    Backend: TableBackend,
{
    /// Wrap a backend without checking that it can be reached.
    #[inline]
    pub const fn new(backend: Backend) -> Self {
        Self {
            backend,
            in_transaction: AtomicBool::new(false),
        }
    }

    /// Open a backend at the given location without checking that it can be reached.
    #[inline]
    pub fn at_location(location: Location) -> Result<Self, RemoteError> {
        Backend::at_location(location).map(Self::new)
    }

    /// Wrap a backend after checking that it can be reached.
    ///
    /// One exact head count is made against [`PRIMARY_TABLE`]. The table not existing yet is
    /// tolerated; any other failure is returned as [`Error::Connect`].
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub async fn connect(backend: Backend) -> Result<Self> {
        match backend
            .select(TableQuery::from_table(PRIMARY_TABLE).head_count())
            .await
        {
            Ok(selection) => {
                debug!(count = ?selection.count, "probe succeeded");
            }
            Err(err) if err.is_undefined_table(PRIMARY_TABLE) => {
                warn!(%err, "{PRIMARY_TABLE} does not exist yet");
            }
            Err(err) => {
                error!(%err, "failed to initialize adapter");
                return Err(Error::Connect(err));
            }
        }

        info!("adapter initialized");
        Ok(Self::new(backend))
    }

    /// Open a backend at the given location and check that it can be reached.
    pub async fn connect_at(location: Location) -> Result<Self> {
        let backend = Backend::at_location(location).map_err(Error::Connect)?;
        Self::connect(backend).await
    }

    /// The backend statements are executed against.
    pub const fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Prepare a statement from its text. This never fails; see [`Statement`] for what is
    /// translated.
    pub fn prepare(&self, sql: &str) -> Statement<'_, Backend> {
        Statement::new(&self.backend, sql)
    }

    /// Prepare a read against `table` with an explicit intent.
    pub fn prepare_select(&self, table: &str, intent: SelectIntent) -> Statement<'_, Backend> {
        Statement::with_intent(&self.backend, table, intent)
    }

    /// Does nothing. Schema changes are made with the backend's own migration tooling.
    pub fn exec(&self, sql: &str) {
        warn!(sql, "exec() ignored; DDL must be applied through backend migrations");
    }

    /// Does nothing; the backend needs no teardown.
    pub fn close(self) {
        info!("adapter closed");
    }

    /// Does nothing. The backend has no equivalent of SQLite pragmas.
    pub fn pragma(&self, key: &str, value: Option<&Value>) -> Option<Value> {
        debug!(key, ?value, "pragma() not supported");
        None
    }

    /// Whether a [`transaction`](Self::transaction) body is currently running.
    ///
    /// This is informational only. Other users of the adapter are not excluded while it is set.
    pub fn in_transaction(&self) -> bool {
        self.in_transaction.load(Ordering::Acquire)
    }

    /// Run `body` with [`in_transaction`](Self::in_transaction) set.
    ///
    /// No atomicity is provided: statements executed by `body` are applied as they run and are
    /// not rolled back if it fails. The flag is cleared however `body` exits, and its result is
    /// returned unchanged.
    pub fn transaction<T, E>(&self, body: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        /// Clears the flag on drop, including while unwinding.
        struct Reset<'a>(&'a AtomicBool);

        impl Drop for Reset<'_> {
            fn drop(&mut self) {
                self.0.store(false, Ordering::Release);
            }
        }

        self.in_transaction.store(true, Ordering::Release);
        let _reset = Reset(&self.in_transaction);
        body()
    }

    /// Full-text search is always available through the backend's native text search.
    pub const fn check_fts5_support(&self) -> bool {
        true
    }
}
