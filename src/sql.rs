//! Classification of statement text.
//!
//! This is not a SQL parser. Statements are matched against the handful of shapes the node
//! catalog issues, and anything else falls through to a conservative default.

use std::fmt;

/// The table used when the statement names none.
pub const DEFAULT_TABLE: &str = "nodes";

/// The kind of a statement, taken from its leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    #[allow(missing_docs)]
    Select,
    #[allow(missing_docs)]
    Insert,
    #[allow(missing_docs)]
    Update,
    #[allow(missing_docs)]
    Delete,
    /// Anything else, including DDL.
    Unknown,
}

impl Operation {
    /// Classify a statement by its leading keyword, ignoring case and surrounding whitespace.
    pub fn from_sql(sql: &str) -> Self {
        let sql = sql.trim_start();
        [
            ("SELECT", Self::Select),
            ("INSERT", Self::Insert),
            ("UPDATE", Self::Update),
            ("DELETE", Self::Delete),
        ]
        .into_iter()
        .find(|(keyword, _)| starts_with_ignore_case(sql, keyword))
        .map_or(Self::Unknown, |(_, operation)| operation)
    }

    /// The leading keyword, or `UNKNOWN`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The shape of a read, chosen from the fixed set the node catalog issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectIntent {
    /// Rows whose `node_type` equals the first parameter.
    FilterByType,
    /// Rows flagged as AI tools.
    FilterByAiTool,
    /// A single `{count}` row holding the number of rows in the table.
    CountAll,
    /// Rows where the type, display name or description contains the first parameter.
    SearchText,
    /// Every row ordered by display name, optionally capped.
    ListOrdered {
        /// The maximum number of rows to return.
        limit: Option<u64>,
    },
}

impl SelectIntent {
    /// Pick the intent of a `SELECT` statement. The first matching rule wins.
    pub fn from_sql(sql: &str) -> Self {
        if sql.contains("WHERE node_type = ?") {
            Self::FilterByType
        } else if sql.contains("WHERE is_ai_tool = 1") {
            Self::FilterByAiTool
        } else if sql.contains("COUNT(*)") {
            Self::CountAll
        } else if sql.contains("LIKE") {
            Self::SearchText
        } else {
            Self::ListOrdered {
                limit: literal_limit(sql),
            }
        }
    }
}

/// The table a statement targets, mapped onto the backend's naming.
///
/// The table is the first word following `FROM`, `INTO` or `UPDATE` (in any case) and at least
/// one whitespace character. [`DEFAULT_TABLE`] is assumed if there is no such word.
pub fn table_name(sql: &str) -> String {
    let name = (0..sql.len())
        .filter(|&start| sql.is_char_boundary(start))
        .find_map(|start| {
            ["FROM", "INTO", "UPDATE"]
                .into_iter()
                .find_map(|keyword| word_after(&sql[start..], keyword))
        })
        .unwrap_or(DEFAULT_TABLE);

    backend_table(name).to_owned()
}

/// Map a table name onto the name used by the backend.
pub fn backend_table(name: &str) -> &str {
    match name {
        "nodes" => "n8n_nodes",
        name => name,
    }
}

/// The `n` of the first `LIMIT n` clause, if any.
fn literal_limit(sql: &str) -> Option<u64> {
    (0..sql.len())
        .filter(|&start| sql.is_char_boundary(start))
        .find_map(|start| {
            let digits = after_keyword(&sql[start..], "LIMIT")?;
            let end = digits
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(digits.len());
            (end > 0).then(|| &digits[..end])
        })
        .and_then(|digits| digits.parse().ok())
}

/// If `text` starts with `keyword` and some whitespace, the word that follows.
fn word_after<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = after_keyword(text, keyword)?;
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

/// If `text` starts with `keyword` and some whitespace, whatever follows the whitespace.
fn after_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    if !starts_with_ignore_case(text, keyword) {
        return None;
    }
    let rest = &text[keyword.len()..];
    let trimmed = rest.trim_start();
    (trimmed.len() < rest.len()).then_some(trimmed)
}

/// `str::starts_with`, ignoring ASCII case.
fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.as_bytes()
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_from_leading_keyword() {
        assert_eq!(Operation::from_sql("SELECT * FROM nodes"), Operation::Select);
        assert_eq!(Operation::from_sql("  insert or replace into nodes"), Operation::Insert);
        assert_eq!(Operation::from_sql("update Nodes SET x = 1"), Operation::Update);
        assert_eq!(Operation::from_sql("\n\tDelete FROM NODES"), Operation::Delete);
        assert_eq!(Operation::from_sql("CREATE TABLE nodes (x)"), Operation::Unknown);
        assert_eq!(Operation::from_sql(""), Operation::Unknown);
    }

    #[test]
    fn table_names() {
        assert_eq!(table_name("SELECT * FROM nodes"), "n8n_nodes");
        assert_eq!(table_name("SELECT * FROM templates WHERE id = ?"), "templates");
        assert_eq!(table_name("insert into nodes (a) values (?)"), "n8n_nodes");
        assert_eq!(table_name("UPDATE Nodes SET a = 1"), "Nodes");
        assert_eq!(table_name("DELETE FROM\n  node_docs"), "node_docs");
        assert_eq!(table_name("PRAGMA journal_mode"), "n8n_nodes");
    }

    #[test]
    fn earliest_reference_wins() {
        assert_eq!(
            table_name("INSERT INTO a SELECT * FROM b"),
            "a",
        );
        // `updated_at` is not the `UPDATE` keyword because no whitespace follows it.
        assert_eq!(table_name("SELECT updated_at FROM stats"), "stats");
    }

    #[test]
    fn select_intents() {
        assert_eq!(
            SelectIntent::from_sql("SELECT * FROM nodes WHERE node_type = ?"),
            SelectIntent::FilterByType
        );
        assert_eq!(
            SelectIntent::from_sql("SELECT * FROM nodes WHERE is_ai_tool = 1 ORDER BY display_name"),
            SelectIntent::FilterByAiTool
        );
        assert_eq!(
            SelectIntent::from_sql("SELECT COUNT(*) as count FROM nodes"),
            SelectIntent::CountAll
        );
        assert_eq!(
            SelectIntent::from_sql("SELECT * FROM nodes WHERE display_name LIKE ? OR description LIKE ?"),
            SelectIntent::SearchText
        );
        assert_eq!(
            SelectIntent::from_sql("SELECT * FROM nodes ORDER BY display_name"),
            SelectIntent::ListOrdered { limit: None }
        );
        assert_eq!(
            SelectIntent::from_sql("SELECT * FROM nodes ORDER BY display_name limit 20"),
            SelectIntent::ListOrdered { limit: Some(20) }
        );
    }

    #[test]
    fn first_rule_wins() {
        assert_eq!(
            SelectIntent::from_sql("SELECT COUNT(*) FROM nodes WHERE node_type = ?"),
            SelectIntent::FilterByType
        );
    }

    #[test]
    fn limit_requires_digits() {
        assert_eq!(literal_limit("SELECT * FROM nodes LIMIT ?"), None);
        assert_eq!(literal_limit("SELECT * FROM nodes LIMIT\t7 OFFSET 2"), Some(7));
        assert_eq!(literal_limit("SELECT * FROM nodes LIMIT99"), None);
    }
}
