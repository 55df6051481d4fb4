//! A command-line interface for querying a hosted node catalog through tablebridge.
//!
//! For usage, run `cargo run --features binary -- --help`.

mod cli;

use crate::cli::{Args, Command};
use clap::Parser as _;
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use tablebridge::backend::Rest;
use tablebridge::sql::{Operation, SelectIntent};
use tablebridge::{Adapter, Location, NodeRecord};
use tokio::fs;
use tokio::io::{self, AsyncReadExt as _, AsyncWriteExt as _};
use tracing_subscriber::EnvFilter;

/// The table every catalog command reads from.
const CATALOG: &str = "nodes";

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let Args {
        url,
        key,
        log,
        command,
    } = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(log)?)
        .with_writer(std::io::stderr)
        .init();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(Location::remote(url, key), command))
}

/// Connect to the backend and perform a single command.
async fn run(
    location: Location,
    command: Command,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let adapter = Adapter::<Rest>::connect_at(location).await?;

    let output: Vec<Value> = match command {
        Command::Query { sql, params, first } => {
            let params: Vec<_> = params.iter().map(|param| parse_param(param)).collect();
            let statement = adapter.prepare(&sql);
            match statement.operation() {
                Operation::Select if first => statement
                    .get(&params)
                    .await?
                    .into_iter()
                    .map(Value::Object)
                    .collect(),
                Operation::Select => statement
                    .all(&params)
                    .await?
                    .into_iter()
                    .map(Value::Object)
                    .collect(),
                _ => vec![serde_json::to_value(statement.run(&params).await?)?],
            }
        }
        Command::Count => adapter
            .prepare_select(CATALOG, SelectIntent::CountAll)
            .all(&[])
            .await?
            .into_iter()
            .map(Value::Object)
            .collect(),
        Command::List { limit } => adapter
            .prepare_select(CATALOG, SelectIntent::ListOrdered { limit })
            .all(&[])
            .await?
            .into_iter()
            .map(Value::Object)
            .collect(),
        Command::Search { term } => adapter
            .prepare_select(CATALOG, SelectIntent::SearchText)
            .all(&[Value::String(term)])
            .await?
            .into_iter()
            .map(Value::Object)
            .collect(),
        Command::Node { node_type } => {
            let node = adapter
                .prepare_select(CATALOG, SelectIntent::FilterByType)
                .get(&[Value::String(node_type)])
                .await?;
            match node {
                Some(node) => vec![Value::Object(node)],
                None => return Ok(ExitCode::FAILURE),
            }
        }
        Command::Upsert { file_path } => {
            let record: NodeRecord =
                serde_json::from_slice(&read_file_or_stdin(file_path).await?)?;
            let result = adapter
                .prepare("INSERT OR REPLACE INTO nodes")
                .run_record(&record)
                .await?;
            vec![serde_json::to_value(result)?]
        }
    };

    let mut stdout = io::stdout();
    for value in output {
        stdout.write_all(value.to_string().as_bytes()).await?;
        stdout.write_all(b"\n").await?;
    }
    stdout.flush().await?;

    adapter.close();
    Ok(ExitCode::SUCCESS)
}

/// A positional parameter given on the command line: JSON if it parses, otherwise a string.
fn parse_param(param: &str) -> Value {
    serde_json::from_str(param).unwrap_or_else(|_| Value::String(param.to_owned()))
}

/// Given a path, read from stdin if the path is "-". Otherwise, read the file at that path.
async fn read_file_or_stdin(file_path: PathBuf) -> io::Result<Vec<u8>> {
    if file_path == PathBuf::from("-") {
        let mut bytes = Vec::new();
        let _num_bytes = io::stdin().read_to_end(&mut bytes).await?;
        Ok(bytes)
    } else {
        fs::read(file_path).await
    }
}
