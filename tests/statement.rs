mod helpers;

use crate::helpers::{node_params, node_types, Catalog, INSERT_NODE, NODES};
use anyhow::Result;
use serde_json::{json, Value};
use tablebridge::backend::Request;
use tablebridge::error::{NotImplemented, RemoteError};
use tablebridge::query::{CountMode, Filter, Order};
use tablebridge::sql::{Operation, SelectIntent};
use tablebridge::{Error, NodeRecord, RunResult, SEARCH_COLUMNS};

#[test]
fn test_classify_mutations_ignoring_case() {
    let catalog = Catalog::empty();
    let adapter = &catalog.adapter;

    for sql in ["UPDATE nodes SET x = ?", "update Nodes set x = ?", "  UpDaTe NODES SET x = 1"] {
        assert_eq!(adapter.prepare(sql).operation(), Operation::Update, "{sql}");
    }
    for sql in ["DELETE FROM nodes", "delete from Nodes WHERE x = ?", "\tDelete From NODES"] {
        assert_eq!(adapter.prepare(sql).operation(), Operation::Delete, "{sql}");
    }
    assert_eq!(adapter.prepare("VACUUM").operation(), Operation::Unknown);
}

#[test]
fn test_table_mapping() {
    let catalog = Catalog::empty();
    let adapter = &catalog.adapter;

    assert_eq!(adapter.prepare("SELECT * FROM nodes").table(), "n8n_nodes");
    assert_eq!(adapter.prepare("SELECT * FROM templates").table(), "templates");
    assert_eq!(adapter.prepare("INSERT INTO node_docs VALUES (?)").table(), "node_docs");
    assert_eq!(adapter.prepare("SELECT 1").table(), "n8n_nodes");
}

#[tokio::test]
async fn test_get_by_node_type() -> Result<()> {
    let catalog = Catalog::seeded().await?;
    let statement = catalog
        .adapter
        .prepare("SELECT * FROM nodes WHERE node_type = ?");

    let row = statement
        .get(&[json!("nodes-base.webhook")])
        .await?
        .expect("webhook is seeded");
    assert_eq!(row["display_name"], json!("Webhook"));
    assert_eq!(row["is_webhook"], json!(true));

    let requests = catalog.requests();
    let [Request::Select(query)] = requests.as_slice() else {
        panic!("expected exactly one select, got {requests:?}");
    };
    assert_eq!(query.table, NODES);
    assert_eq!(
        query.filter,
        Some(Filter::Eq {
            column: "node_type".to_owned(),
            value: json!("nodes-base.webhook"),
        })
    );

    assert_eq!(statement.get(&[json!("webhook")]).await?, None);
    Ok(())
}

#[tokio::test]
async fn test_ai_tools() -> Result<()> {
    let catalog = Catalog::seeded().await?;
    let rows = catalog
        .adapter
        .prepare("SELECT * FROM nodes WHERE is_ai_tool = 1 ORDER BY display_name")
        .all(&[])
        .await?;

    let mut found = node_types(&rows);
    found.sort_unstable();
    assert_eq!(found, ["nodes-base.httpRequest", "nodes-base.slack"]);
    assert!(matches!(
        catalog.requests().as_slice(),
        [Request::Select(query)]
            if query.filter == Some(Filter::Eq { column: "is_ai_tool".to_owned(), value: json!(true) })
    ));
    Ok(())
}

#[tokio::test]
async fn test_count() -> Result<()> {
    let catalog = Catalog::seeded().await?;
    let rows = catalog
        .adapter
        .prepare("SELECT COUNT(*) as count FROM nodes")
        .all(&[])
        .await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(Value::Object(rows[0].clone()), json!({ "count": 5 }));
    assert!(matches!(
        catalog.requests().as_slice(),
        [Request::Select(query)] if query.count == CountMode::ExactHead && query.filter.is_none()
    ));

    let empty = Catalog::empty();
    let rows = empty
        .adapter
        .prepare("SELECT COUNT(*) FROM nodes")
        .all(&[])
        .await?;
    assert_eq!(Value::Object(rows[0].clone()), json!({ "count": 0 }));
    Ok(())
}

#[tokio::test]
async fn test_search_strips_wildcards() -> Result<()> {
    let catalog = Catalog::seeded().await?;
    let rows = catalog
        .adapter
        .prepare(
            "SELECT * FROM nodes WHERE node_type LIKE ? OR display_name LIKE ? OR description \
             LIKE ?",
        )
        .all(&[json!("%http%"), json!("%http%"), json!("%http%")])
        .await?;

    let mut found = node_types(&rows);
    found.sort_unstable();
    assert_eq!(found, ["nodes-base.httpRequest", "nodes-base.respondToWebhook"]);

    let requests = catalog.requests();
    let [Request::Select(query)] = requests.as_slice() else {
        panic!("expected exactly one select, got {requests:?}");
    };
    assert_eq!(
        query.filter,
        Some(Filter::IlikeAny {
            columns: SEARCH_COLUMNS.map(str::to_owned).to_vec(),
            term: "http".to_owned(),
        })
    );
    Ok(())
}

#[tokio::test]
async fn test_list_ordered_with_limit() -> Result<()> {
    let catalog = Catalog::seeded().await?;

    let rows = catalog
        .adapter
        .prepare("SELECT * FROM nodes ORDER BY display_name LIMIT 2")
        .all(&[])
        .await?;
    assert_eq!(node_types(&rows), ["nodes-base.code", "nodes-base.httpRequest"]);

    let rows = catalog
        .adapter
        .prepare("SELECT node_type FROM nodes")
        .all(&[])
        .await?;
    assert_eq!(rows.len(), 5);
    // Every column is returned regardless of the projection.
    assert!(rows.iter().all(|row| row.contains_key("description")));

    let requests = catalog.requests();
    assert!(matches!(
        requests.as_slice(),
        [Request::Select(first), Request::Select(second)]
            if first.limit == Some(2)
                && second.limit.is_none()
                && first.order == Some(Order { column: "display_name".to_owned(), ascending: true })
    ));
    Ok(())
}

#[tokio::test]
async fn test_explicit_intent_matches_text() -> Result<()> {
    let catalog = Catalog::seeded().await?;
    let adapter = &catalog.adapter;

    let from_text = adapter
        .prepare("SELECT * FROM nodes WHERE display_name LIKE ?")
        .all(&[json!("%slack%")])
        .await?;
    let from_intent = adapter
        .prepare_select("nodes", SelectIntent::SearchText)
        .all(&[json!("slack")])
        .await?;
    assert_eq!(from_text, from_intent);
    assert_eq!(node_types(&from_intent), ["nodes-base.slack"]);
    Ok(())
}

#[tokio::test]
async fn test_insert() -> Result<()> {
    let catalog = Catalog::empty();
    let statement = catalog.adapter.prepare(INSERT_NODE);

    let params = node_params("nodes-base.set", "Set", "Sets values", false);
    let result = statement.run(&params).await?;
    assert_eq!(result, RunResult::changed(1));
    assert_eq!(result.last_insert_rowid, RunResult::NO_ROWID);

    let requests = catalog.requests();
    let [Request::Upsert { table, row }] = requests.as_slice() else {
        panic!("expected exactly one upsert, got {requests:?}");
    };
    assert_eq!(table, NODES);
    assert_eq!(row.len(), NodeRecord::PARAMS);
    assert_eq!(row["is_ai_tool"], json!(false));
    assert_eq!(row["is_versioned"], json!(true));

    // Replacing an existing node still reports one change.
    let params = node_params("nodes-base.set", "Edit Fields (Set)", "Sets values", false);
    let result = statement.run(&params).await?;
    assert_eq!(result.changes, 1);
    assert_eq!(result.last_insert_rowid, 0);

    let stored = catalog.stored();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["display_name"], json!("Edit Fields (Set)"));
    Ok(())
}

#[tokio::test]
async fn test_insert_record() -> Result<()> {
    let catalog = Catalog::empty();
    let record: NodeRecord = serde_json::from_value(json!({
        "node_type": "nodes-base.openAi",
        "package_name": "n8n-nodes-base",
        "display_name": "OpenAI",
        "is_ai_tool": true,
    }))?;

    let result = catalog
        .adapter
        .prepare("INSERT INTO nodes")
        .run_record(&record)
        .await?;
    assert_eq!(result, RunResult::changed(1));
    assert_eq!(catalog.stored()[0]["is_ai_tool"], json!(true));

    let err = catalog
        .adapter
        .prepare("SELECT * FROM nodes")
        .run_record(&record)
        .await
        .expect_err("run_record requires an INSERT");
    assert!(matches!(
        err,
        Error::Unsupported { method: "run_record", operation: Operation::Select }
    ));
    Ok(())
}

#[tokio::test]
async fn test_insert_rejects_misaligned_params() -> Result<()> {
    let catalog = Catalog::empty();
    let statement = catalog.adapter.prepare(INSERT_NODE);

    let mut params = node_params("nodes-base.set", "Set", "Sets values", false);
    params.truncate(16);
    assert!(matches!(
        statement.run(&params).await,
        Err(Error::InvalidParameter(_))
    ));

    let mut params = node_params("nodes-base.set", "Set", "Sets values", false);
    params.swap(3, 6);
    assert!(matches!(
        statement.run(&params).await,
        Err(Error::InvalidParameter(_))
    ));

    assert!(catalog.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unimplemented_operations_have_no_side_effects() -> Result<()> {
    let catalog = Catalog::seeded().await?;
    let adapter = &catalog.adapter;
    let params = [json!("nodes-base.webhook")];

    let update = adapter.prepare("UPDATE nodes SET display_name = ? WHERE node_type = ?");
    assert!(matches!(
        update.run(&params).await,
        Err(Error::NotImplemented(NotImplemented::Update))
    ));
    let delete = adapter.prepare("DELETE FROM nodes WHERE node_type = ?");
    assert!(matches!(
        delete.run(&params).await,
        Err(Error::NotImplemented(NotImplemented::Delete))
    ));

    let select = adapter.prepare("SELECT * FROM nodes WHERE node_type = ?");
    assert!(matches!(
        select.iterate(&params),
        Err(Error::NotImplemented(NotImplemented::Iterate))
    ));
    assert!(matches!(
        select.get_sync(&params),
        Err(Error::NotImplemented(NotImplemented::Sync("get")))
    ));
    assert!(matches!(
        select.all_sync(&params),
        Err(Error::NotImplemented(NotImplemented::Sync("all")))
    ));

    let insert = adapter.prepare(INSERT_NODE);
    let err = insert
        .run_sync(&node_params("nodes-base.x", "X", "x", false))
        .expect_err("synchronous run is unsupported");
    assert!(err.to_string().contains("use the async form"));

    assert!(catalog.requests().is_empty());
    assert_eq!(catalog.stored().len(), 5);
    Ok(())
}

#[tokio::test]
async fn test_mismatched_methods() -> Result<()> {
    let catalog = Catalog::seeded().await?;
    let adapter = &catalog.adapter;

    let insert = adapter.prepare(INSERT_NODE);
    assert!(matches!(
        insert.get(&[]).await,
        Err(Error::Unsupported { method: "get", operation: Operation::Insert })
    ));
    assert!(matches!(
        insert.all(&[]).await,
        Err(Error::Unsupported { method: "all", operation: Operation::Insert })
    ));

    let select = adapter.prepare("SELECT * FROM nodes");
    assert!(matches!(
        select.run(&[]).await,
        Err(Error::Unsupported { method: "run", operation: Operation::Select })
    ));
    let ddl = adapter.prepare("CREATE TABLE nodes (node_type TEXT)");
    assert!(matches!(
        ddl.run(&[]).await,
        Err(Error::Unsupported { method: "run", operation: Operation::Unknown })
    ));

    assert!(catalog.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_remote_errors_pass_through() -> Result<()> {
    let catalog = Catalog::empty();
    let err = catalog
        .adapter
        .prepare("SELECT * FROM templates")
        .all(&[])
        .await
        .expect_err("templates does not exist");

    let remote = match err {
        Error::Remote(remote) => remote,
        err => panic!("expected a remote error, got {err:?}"),
    };
    assert!(remote.is_undefined_table("templates"));
    assert!(matches!(remote, RemoteError::Api(ref api) if api.code.as_deref() == Some("42P01")));
    Ok(())
}
