#![allow(dead_code)]

use anyhow::Result;
use serde_json::{json, Value};
use tablebridge::backend::{Memory, Request};
use tablebridge::Adapter;

/// The backend table that `nodes` maps onto.
pub(crate) const NODES: &str = "n8n_nodes";

pub(crate) const INSERT_NODE: &str = "INSERT OR REPLACE INTO nodes (node_type, package_name, \
     display_name, description, category, development_style, is_ai_tool, is_trigger, is_webhook, \
     is_versioned, version, documentation, properties_schema, operations, credentials_required, \
     outputs, output_names) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

/// `(node_type, display_name, description, is_ai_tool)` for each seeded node.
pub(crate) const SEED: [(&str, &str, &str, bool); 5] = [
    (
        "nodes-base.webhook",
        "Webhook",
        "Starts the workflow when a webhook is called",
        false,
    ),
    (
        "nodes-base.httpRequest",
        "HTTP Request",
        "Makes a request and returns the response data",
        true,
    ),
    ("nodes-base.slack", "Slack", "Consume the Slack API", true),
    ("nodes-base.code", "Code", "Run custom JavaScript code", false),
    (
        "nodes-base.respondToWebhook",
        "Respond to Webhook",
        "Returns data to the HTTP caller",
        false,
    ),
];

/// An adapter over an in-memory node catalog.
pub(crate) struct Catalog {
    pub(crate) adapter: Adapter<Memory>,
    seeded: usize,
}

impl Catalog {
    /// A catalog whose table exists but holds no nodes.
    pub(crate) fn empty() -> Self {
        let memory = Memory::new();
        memory.create_table(NODES, "node_type");
        Self {
            adapter: Adapter::new(memory),
            seeded: 0,
        }
    }

    /// A catalog holding the nodes in [`SEED`], inserted through the adapter.
    pub(crate) async fn seeded() -> Result<Self> {
        let mut catalog = Self::empty();
        for (node_type, display_name, description, is_ai_tool) in SEED {
            let _result = catalog
                .adapter
                .prepare(INSERT_NODE)
                .run(&node_params(node_type, display_name, description, is_ai_tool))
                .await?;
        }
        catalog.seeded = catalog.adapter.backend().requests().len();
        Ok(catalog)
    }

    /// The requests the backend received after seeding.
    pub(crate) fn requests(&self) -> Vec<Request> {
        let mut requests = self.adapter.backend().requests();
        requests.split_off(self.seeded)
    }

    pub(crate) fn stored(&self) -> Vec<tablebridge::Row> {
        self.adapter.backend().rows(NODES).unwrap_or_default()
    }
}

/// The 17 positional parameters of [`INSERT_NODE`], the way a SQLite caller passes them.
pub(crate) fn node_params(
    node_type: &str,
    display_name: &str,
    description: &str,
    is_ai_tool: bool,
) -> Vec<Value> {
    vec![
        json!(node_type),
        json!("n8n-nodes-base"),
        json!(display_name),
        json!(description),
        json!("core"),
        json!("programmatic"),
        json!(i64::from(is_ai_tool)),
        json!(0),
        json!(i64::from(node_type.ends_with("ebhook"))),
        json!(1),
        json!("1"),
        Value::Null,
        json!("[]"),
        json!("[]"),
        json!("[]"),
        Value::Null,
        Value::Null,
    ]
}

/// The `node_type` column of each row.
pub(crate) fn node_types(rows: &[tablebridge::Row]) -> Vec<&str> {
    rows.iter()
        .filter_map(|row| row.get("node_type").and_then(Value::as_str))
        .collect()
}
