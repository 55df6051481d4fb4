//! Table backends: the remote services statements are translated onto.

mod arc;
mod helpers;
mod memory;
#[cfg(feature = "rest")]
mod rest;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::memory::Memory {}
    #[cfg(feature = "rest")]
    impl Sealed for super::rest::Rest {}
    impl<T: Sealed> Sealed for std::sync::Arc<T> {}
}

pub use self::memory::{Memory, Request};
#[cfg(feature = "rest")]
pub use self::rest::Rest;
use crate::error::RemoteError;
use crate::internal_macros::future_send;
use crate::query::{Selection, TableQuery};
use crate::record::Row;
use crate::Location;

/// A backend that can be opened at a [`Location`].
pub trait DatabaseBackend: sealed::Sealed + Sized {
    /// Open the backend. No request is made; see [`Adapter::connect`](crate::Adapter::connect)
    /// for a checked construction.
    fn at_location(location: Location) -> Result<Self, RemoteError>;
    /// The location the backend was opened at.
    fn location(&self) -> &Location;
}

/// A backend exposing tables that can be read and upserted into.
///
/// Every call is a single request and is atomic on its own. There is no way to group calls into
/// a transaction.
pub trait TableBackend: DatabaseBackend + Send + Sync {
    /// Read the rows described by `query`.
    fn select(&self, query: TableQuery) -> future_send!(Result<Selection, RemoteError>);

    /// Insert `row` into `table`, replacing any row with the same primary key. Returns the rows as
    /// stored.
    fn upsert(&self, table: &str, row: Row) -> future_send!(Result<Vec<Row>, RemoteError>);
}
