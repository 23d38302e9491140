//! Operation and table detection used to name execution spans.

use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::DbBackend;

/// Kind of statement, from its leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Select,
    Insert,
    Replace,
    Update,
    Delete,
    Create,
    Drop,
    Alter,
    Truncate,
    Call,
    Other,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Select => "SELECT",
            Operation::Insert => "INSERT",
            Operation::Replace => "REPLACE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
            Operation::Create => "CREATE",
            Operation::Drop => "DROP",
            Operation::Alter => "ALTER",
            Operation::Truncate => "TRUNCATE",
            Operation::Call => "CALL",
            Operation::Other => "QUERY",
        }
    }

    fn from_keyword(keyword: &str) -> Self {
        match keyword.to_ascii_uppercase().as_str() {
            "SELECT" | "WITH" => Operation::Select,
            "INSERT" => Operation::Insert,
            "REPLACE" => Operation::Replace,
            "UPDATE" => Operation::Update,
            "DELETE" => Operation::Delete,
            "CREATE" => Operation::Create,
            "DROP" => Operation::Drop,
            "ALTER" => Operation::Alter,
            "TRUNCATE" => Operation::Truncate,
            "CALL" | "EXEC" | "EXECUTE" => Operation::Call,
            _ => Operation::Other,
        }
    }

    /// Pattern whose first group captures the target table.
    fn table_pattern(&self) -> Option<&'static Regex> {
        let regex = match self {
            Operation::Select | Operation::Delete => &*FROM_TABLE,
            Operation::Insert | Operation::Replace => &*INTO_TABLE,
            Operation::Update => &*UPDATE_TABLE,
            Operation::Create | Operation::Drop | Operation::Alter | Operation::Truncate => {
                &*DDL_TABLE
            }
            Operation::Call | Operation::Other => return None,
        };
        Some(regex)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

static LEADING_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\s(]*([A-Za-z]+)").expect("valid keyword regex"));

static FROM_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bFROM\s+[`"\[]?(\w+)"#).expect("valid FROM regex")
});

static INTO_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bINTO\s+[`"\[]?(\w+)"#).expect("valid INTO regex")
});

static UPDATE_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^\s*UPDATE\s+(?:OR\s+\w+\s+)?[`"\[]?(\w+)"#).expect("valid UPDATE regex")
});

static DDL_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\bTABLE\s+(?:IF\s+(?:NOT\s+)?EXISTS\s+)?[`"\[]?(\w+)|^\s*TRUNCATE\s+[`"\[]?(\w+)"#,
    )
    .expect("valid DDL regex")
});

// Quoted strings and identifiers match without the capture group.
static QUESTION_MARK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"'(?:[^']|'')*'|"(?:[^"]|"")*"|`[^`]*`|(\?)"#).expect("valid placeholder regex")
});

static NUMBERED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"'(?:[^']|'')*'|"(?:[^"]|"")*"|\$(\d+)"#).expect("valid placeholder regex")
});

/// Number of values a query needs for its positional placeholders.
///
/// Postgres counts up to the highest `$n`; the other backends count `?` marks.
pub fn placeholder_count(sql: &str, backend: DbBackend) -> usize {
    match backend {
        DbBackend::Postgres => NUMBERED
            .captures_iter(sql)
            .filter_map(|caps| caps.get(1))
            .filter_map(|m| m.as_str().parse::<usize>().ok())
            .max()
            .unwrap_or(0),
        DbBackend::MySql | DbBackend::Sqlite => QUESTION_MARK
            .captures_iter(sql)
            .filter(|caps| caps.get(1).is_some())
            .count(),
    }
}

/// Operation and table of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlSummary {
    pub operation: Operation,
    pub table: Option<String>,
}

impl SqlSummary {
    pub fn of(sql: &str) -> Self {
        let operation = LEADING_KEYWORD
            .captures(sql)
            .and_then(|caps| caps.get(1))
            .map_or(Operation::Other, |m| Operation::from_keyword(m.as_str()));

        let table = operation
            .table_pattern()
            .and_then(|regex| regex.captures(sql))
            .and_then(|caps| caps.iter().skip(1).flatten().next())
            .map(|m| m.as_str().to_lowercase());

        Self { operation, table }
    }

    /// `"SELECT users"`, or just the operation when no table was found.
    pub fn span_name(&self) -> String {
        match &self.table {
            Some(table) => format!("{} {}", self.operation, table),
            None => self.operation.as_str().to_string(),
        }
    }
}
