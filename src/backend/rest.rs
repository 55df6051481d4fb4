use crate::backend::{DatabaseBackend, TableBackend};
use crate::error::{ApiError, RemoteError};
use crate::query::{CountMode, Filter, Selection, TableQuery};
use crate::record::Row;
use crate::tracing_shim::{debug, debug_span, warn, Instrument};
use crate::Location;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::future::Future;

/// The path under the project URL where tables are exposed.
const REST_PATH: &str = "/rest/v1";

/// The code PostgREST uses when a table is missing from its schema cache.
const UNDEFINED_TABLE: &str = "PGRST205";

/// A hosted backend spoken to over PostgREST's HTTP interface.
#[derive(Debug)]
pub struct Rest {
    location: Location,
    base_url: String,
    client: Client,
}

impl DatabaseBackend for Rest {
    fn at_location(location: Location) -> Result<Self, RemoteError> {
        let Location::Remote { url, key } = &location else {
            return Err(RemoteError::Location(
                "the rest backend requires a remote location".to_owned(),
            ));
        };

        let invalid_key =
            |_| RemoteError::Location("the access key is not a valid header value".to_owned());
        let mut headers = HeaderMap::new();
        let _previous = headers.insert("apikey", HeaderValue::from_str(key).map_err(invalid_key)?);
        let _previous = headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}")).map_err(invalid_key)?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            base_url: format!("{}{REST_PATH}", url.trim_end_matches('/')),
            location,
            client,
        })
    }

    fn location(&self) -> &Location {
        &self.location
    }
}

impl Rest {
    fn table_url(&self, table: &str) -> String {
        format!("{}/{table}", self.base_url)
    }

    fn select_request(&self, query: &TableQuery) -> RequestBuilder {
        let url = self.table_url(&query.table);
        let request = match query.count {
            CountMode::ExactHead => self.client.head(url),
            CountMode::None | CountMode::Exact => self.client.get(url),
        };
        let request = match query.count {
            CountMode::None => request,
            CountMode::Exact | CountMode::ExactHead => request.header("Prefer", "count=exact"),
        };
        request.query(&query_pairs(query))
    }
}

impl TableBackend for Rest {
    fn select(
        &self,
        query: TableQuery,
    ) -> impl Future<Output = Result<Selection, RemoteError>> + Send {
        let span = debug_span!("rest_select", table = %query.table);
        let request = self.select_request(&query);

        async move {
            debug!(?query, "sending select");
            let head = (query.count == CountMode::ExactHead).then_some(query.table.as_str());
            let response = check(request.send().await.map_err(from_reqwest)?, head).await?;

            let count = match query.count {
                CountMode::None => None,
                CountMode::Exact | CountMode::ExactHead => {
                    response
                        .headers()
                        .get(CONTENT_RANGE)
                        .and_then(|range| range.to_str().ok())
                        .and_then(content_range_total)
                }
            };
            let rows = match query.count {
                CountMode::ExactHead => Vec::new(),
                CountMode::None | CountMode::Exact => {
                    response.json::<Vec<Row>>().await.map_err(from_reqwest)?
                }
            };

            Ok::<_, RemoteError>(Selection { rows, count })
        }
        .instrument(span)
    }

    fn upsert(
        &self,
        table: &str,
        row: Row,
    ) -> impl Future<Output = Result<Vec<Row>, RemoteError>> + Send {
        let span = debug_span!("rest_upsert", table = %table);
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&row);

        async move {
            debug!("sending upsert");
            let response = check(request.send().await.map_err(from_reqwest)?, None).await?;
            response.json::<Vec<Row>>().await.map_err(from_reqwest)
        }
        .instrument(span)
    }
}

/// Turn a non-success response into the error it carries.
///
/// `head_table` names the table of a `HEAD` request. Such responses have no body, so a bare 404
/// is the only sign that the table does not exist.
async fn check(response: Response, head_table: Option<&str>) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.map_err(from_reqwest)?;
    if let Some(table) = head_table {
        if status == StatusCode::NOT_FOUND && text.is_empty() {
            let mut err = ApiError::new(
                UNDEFINED_TABLE,
                format!("relation \"{table}\" does not exist"),
            );
            err.status = Some(status.as_u16());
            debug!(%err, "head request found no table");
            return Err(err.into());
        }
    }

    let mut err = serde_json::from_str::<ApiError>(&text).unwrap_or_else(|_| ApiError {
        message: if text.is_empty() {
            status.canonical_reason().unwrap_or("request failed").to_owned()
        } else {
            text
        },
        ..ApiError::default()
    });
    err.status = Some(status.as_u16());

    warn!(%err, "backend rejected request");
    Err(err.into())
}

fn from_reqwest(err: reqwest::Error) -> RemoteError {
    if err.is_decode() {
        RemoteError::Decode(err.to_string())
    } else {
        RemoteError::Transport(err.to_string())
    }
}

/// The query string for a read, in PostgREST's filter syntax.
fn query_pairs(query: &TableQuery) -> Vec<(String, String)> {
    let mut pairs = vec![("select".to_owned(), "*".to_owned())];

    match &query.filter {
        None => {}
        Some(Filter::Eq { column, value }) => {
            pairs.push((column.clone(), format!("eq.{}", literal(value))));
        }
        Some(Filter::IlikeAny { columns, term }) => {
            let pattern = quote(&format!("*{term}*"));
            let conditions: Vec<_> = columns
                .iter()
                .map(|column| format!("{column}.ilike.{pattern}"))
                .collect();
            pairs.push(("or".to_owned(), format!("({})", conditions.join(","))));
        }
    }

    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        pairs.push(("order".to_owned(), format!("{}.{direction}", order.column)));
    }
    if let Some(limit) = query.limit {
        pairs.push(("limit".to_owned(), limit.to_string()));
    }

    pairs
}

/// A filter operand as PostgREST expects it: strings verbatim, everything else as JSON text.
fn literal(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        value => value.to_string(),
    }
}

/// Double-quote a value used inside a logical filter if it contains reserved characters.
fn quote(value: &str) -> String {
    if !value.contains([',', '.', ':', '(', ')', '"', '\\']) {
        return value.to_owned();
    }
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// The total in a `Content-Range` header such as `0-24/3573` or `*/0`.
fn content_range_total(range: &str) -> Option<u64> {
    let (_, total) = range.rsplit_once('/')?;
    total.trim().parse().ok()
}
