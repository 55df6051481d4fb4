//! Command-line interface for tablebridge.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for tablebridge.
#[derive(Debug, Parser)]
#[command(version, propagate_version = true)]
pub(crate) struct Args {
    /// The base URL of the hosted project.
    #[arg(long, env = "TABLEBRIDGE_URL")]
    pub(crate) url: String,
    /// The access key sent with every request.
    #[arg(long, env = "TABLEBRIDGE_KEY", hide_env_values = true)]
    pub(crate) key: String,
    /// Which log events to write to stderr, as a `tracing` filter directive.
    #[arg(long, default_value = "warn")]
    pub(crate) log: String,
    /// The operation to perform.
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// What operation to perform.
///
/// Rows are written to stdout as JSON, one per line.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Prepare and execute a statement.
    ///
    /// `SELECT` statements print their rows. Other statements print the number of rows changed.
    #[clap(aliases = ["sql", "exec"])]
    Query {
        /// The statement text.
        sql: String,
        /// Positional parameters. Each is parsed as JSON, or used as a string if that fails.
        params: Vec<String>,
        /// Only print the first row.
        #[arg(long)]
        first: bool,
    },
    /// Print the number of nodes in the catalog.
    Count,
    /// List nodes ordered by display name.
    #[clap(alias = "ls")]
    List {
        /// The maximum number of nodes to list.
        #[arg(short, long)]
        limit: Option<u64>,
    },
    /// Find nodes whose type, display name or description contains the given text.
    #[clap(alias = "find")]
    Search {
        /// The text to search for. `%` wildcards are ignored.
        term: String,
    },
    /// Print the node with the given type.
    ///
    /// The process exits with a failure status code if there is no such node.
    #[clap(alias = "get")]
    Node {
        /// The node type, such as `nodes-base.webhook`.
        node_type: String,
    },
    /// Insert a node into the catalog, replacing any node with the same type.
    #[clap(aliases = ["put", "save"])]
    Upsert {
        /// A JSON file holding the node's columns.
        ///
        /// If `-`, the node is read from stdin.
        file_path: PathBuf,
    },
}
