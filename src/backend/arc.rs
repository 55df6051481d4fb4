use crate::backend::{DatabaseBackend, TableBackend};
use crate::error::RemoteError;
use crate::query::{Selection, TableQuery};
use crate::record::Row;
use crate::Location;
use std::future::Future;
use std::sync::Arc;

impl<Backend> DatabaseBackend for Arc<Backend>
where
    Backend: DatabaseBackend,
{
    fn at_location(location: Location) -> Result<Self, RemoteError> {
        Backend::at_location(location).map(Self::new)
    }

    fn location(&self) -> &Location {
        self.as_ref().location()
    }
}

impl<Backend> TableBackend for Arc<Backend>
where
    Backend: TableBackend,
{
    fn select(
        &self,
        query: TableQuery,
    ) -> impl Future<Output = Result<Selection, RemoteError>> + Send {
        self.as_ref().select(query)
    }

    fn upsert(
        &self,
        table: &str,
        row: Row,
    ) -> impl Future<Output = Result<Vec<Row>, RemoteError>> + Send {
        self.as_ref().upsert(table, row)
    }
}
