//! A prepared-statement adapter over hosted table backends.
//!
//! Callers written against an embedded SQL database prepare statements and execute them with
//! positional parameters. [`Adapter`] recognizes the fixed set of statements the node catalog
//! issues and translates each onto a single request to a [`TableBackend`], such as a hosted
//! PostgREST service ([`backend::Rest`]) or an in-process store ([`backend::Memory`]).
//!
//! ```no_run
//! # async fn example() -> tablebridge::Result<()> {
//! use serde_json::json;
//! use tablebridge::backend::Rest;
//! use tablebridge::{Adapter, Location};
//!
//! let adapter = Adapter::<Rest>::connect_at(Location::remote(
//!     "https://project.supabase.co",
//!     "access-key",
//! ))
//! .await?;
//! let webhook = adapter
//!     .prepare("SELECT * FROM nodes WHERE node_type = ?")
//!     .get(&[json!("nodes-base.webhook")])
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod adapter;
pub mod backend;
mod conv;
pub mod error;
mod internal_macros;
mod location;
pub mod query;
pub mod record;
pub mod sql;
mod statement;
mod tracing_shim;

pub use self::adapter::{Adapter, PRIMARY_TABLE};
pub use self::backend::{DatabaseBackend, TableBackend};
pub use self::error::{Error, Result};
pub use self::location::Location;
pub use self::record::{NodeRecord, Row, RunResult};
pub use self::statement::{Statement, SEARCH_COLUMNS};
