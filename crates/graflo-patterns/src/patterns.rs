//! Resource patterns (C5): the sum type binding a resource name to where its records come
//! from, plus query builders for the SQL-backed variant.

use graflo_core::{FilterExpression, Flavor, GrafloError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// `(table, schema?, alias, on_self, on_other, join_type='LEFT', select_fields?)`. Column
/// aliasing convention: selected columns from a join with alias `A` are projected as
/// `A."col" AS "A__col"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinClause {
    pub table: String,
    #[serde(default)]
    pub schema: Option<String>,
    pub alias: String,
    pub on_self: String,
    pub on_other: String,
    #[serde(default = "default_join_type")]
    pub join_type: String,
    #[serde(default)]
    pub select_fields: Option<Vec<String>>,
}

fn default_join_type() -> String {
    "LEFT".to_string()
}

/// Regex over filenames within a directory, with optional date-field metadata for the
/// legacy date-filter trio.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FilePattern {
    #[serde(default)]
    pub regex: Option<String>,
    #[serde(default)]
    pub sub_path: Option<PathBuf>,
    #[serde(default)]
    pub date_field: Option<String>,
    #[serde(default)]
    pub date_filter: Option<String>,
    #[serde(default)]
    pub date_range_start: Option<String>,
    #[serde(default)]
    pub date_range_days: Option<i64>,
}

impl FilePattern {
    /// Uses the configured regex; returns false if none is set.
    pub fn matches(&self, name: &str) -> bool {
        match &self.regex {
            Some(pattern) => Regex::new(pattern).map(|re| re.is_match(name)).unwrap_or(false),
            None => false,
        }
    }
}

/// `(table_name, schema_name?, filters, joins, date_field?, select_columns?)`. Carries
/// enough state to render a parameterized SQL query via `build_query`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TablePattern {
    pub table_name: String,
    #[serde(default)]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub filters: Vec<FilterExpression>,
    #[serde(default)]
    pub joins: Vec<JoinClause>,
    #[serde(default)]
    pub date_field: Option<String>,
    #[serde(default)]
    pub select_columns: Option<Vec<String>>,
    // Legacy date-filter trio, kept alongside the `filters` list for back-compat (spec §6).
    #[serde(default)]
    pub date_filter: Option<String>,
    #[serde(default)]
    pub date_range_start: Option<String>,
    #[serde(default)]
    pub date_range_days: Option<i64>,
}

impl TablePattern {
    /// `table_name` is compiled as a regex if it looks like one (begins with `^` or ends
    /// with `$`), else as an exact-match anchored pattern.
    pub fn matches(&self, identifier: &str) -> bool {
        let looks_like_regex = self.table_name.starts_with('^') || self.table_name.ends_with('$');
        let compiled = if looks_like_regex {
            Regex::new(&self.table_name)
        } else {
            Regex::new(&format!("^{}$", regex::escape(&self.table_name)))
        };
        compiled.map(|re| re.is_match(identifier)).unwrap_or(false)
    }

    /// Builds the legacy date-filter trio's WHERE fragment, if any of its fields are set.
    fn legacy_date_where_clause(&self) -> Option<String> {
        let date_field = self.date_field.as_ref()?;
        if let Some(filter_value) = &self.date_filter {
            return Some(format!(
                "\"{date_field}\" = '{}'",
                filter_value.replace('\'', "''")
            ));
        }
        if let (Some(start), Some(days)) = (&self.date_range_start, self.date_range_days) {
            if let Ok(start_date) = chrono::NaiveDate::parse_from_str(start, "%Y-%m-%d") {
                let end_date = start_date + chrono::Duration::days(days);
                return Some(format!(
                    "\"{date_field}\" >= '{start_date}' AND \"{date_field}\" < '{end_date}'"
                ));
            }
        }
        None
    }

    /// Constructs a SELECT statement per spec §4.5. The degenerate case (no joins, no
    /// filters, no select_columns, no date filter) renders the bare
    /// `SELECT * FROM "<schema>"."<table>"` form verbatim (spec §8's round-trip property);
    /// any structure present brings in the base-relation alias `r` the general algorithm
    /// describes.
    pub fn build_query(&self, schema: &str) -> String {
        let effective_schema = self.schema_name.clone().unwrap_or_else(|| schema.to_string());

        let trivial = self.joins.is_empty()
            && self.filters.is_empty()
            && self.select_columns.is_none()
            && self.date_field.is_none();
        if trivial {
            return format!("SELECT * FROM \"{effective_schema}\".\"{}\"", self.table_name);
        }

        let mut cols = match &self.select_columns {
            Some(columns) => columns
                .iter()
                .map(|c| format!("r.\"{c}\""))
                .collect::<Vec<_>>()
                .join(", "),
            None => "r.*".to_string(),
        };
        for join in &self.joins {
            if let Some(fields) = &join.select_fields {
                for field in fields {
                    cols.push_str(&format!(", {}.\"{field}\" AS \"{}__{field}\"", join.alias, join.alias));
                }
            }
        }

        let mut query = format!(
            "SELECT {cols} FROM \"{effective_schema}\".\"{}\" r",
            self.table_name
        );

        for join in &self.joins {
            let join_schema = join.schema.clone().unwrap_or_else(|| effective_schema.clone());
            query.push_str(&format!(
                " {} JOIN \"{join_schema}\".\"{}\" {} ON r.\"{}\" = {}.\"{}\"",
                join.join_type, join.table, join.alias, join.on_self, join.alias, join.on_other
            ));
        }

        let mut where_clauses = Vec::new();
        if let Some(clause) = self.legacy_date_where_clause() {
            where_clauses.push(clause);
        }
        for filter in &self.filters {
            where_clauses.push(filter.render(Flavor::Sql, "r"));
        }
        if !where_clauses.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&where_clauses.join(" AND "));
        }

        query
    }
}

/// Either `endpoint_url` (+ optional SPARQL text) or `rdf_file`, both carrying `rdf_class`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SparqlPattern {
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default)]
    pub sparql_query: Option<String>,
    pub rdf_class: String,
    #[serde(default)]
    pub graph_uri: Option<String>,
    #[serde(default)]
    pub rdf_file: Option<PathBuf>,
}

/// Dispatch tag recovered by the registry builder to decide how to register a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    File,
    SqlTable,
    Sparql,
}

/// A connection-string-bearing Postgres config, keyed by connection key in `Patterns`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub connection_key: String,
    #[serde(default)]
    pub schema_name: Option<String>,
    pub connection_string: String,
}

/// Physical table identity for a resource, independent of its `TablePattern.table_name`
/// (which may itself be a regex) — ported from `graflo/util/onto.py` (spec §11).
#[derive(Debug, Clone)]
pub struct TableInfo {
    pub connection_key: String,
    pub schema_name: Option<String>,
    pub table_name: String,
}

/// The full set of resource patterns for an ingestion run. Serializes with two top-level
/// fields, `file_patterns` and `table_patterns` (plus `sparql_patterns`); for back-compat a
/// single tagged `patterns` mapping (`__tag__: file|table|sparql`) is also accepted.
#[derive(Debug, Clone, Default)]
pub struct Patterns {
    pub file_patterns: HashMap<String, FilePattern>,
    pub table_patterns: HashMap<String, TablePattern>,
    pub sparql_patterns: HashMap<String, SparqlPattern>,
    pub postgres_configs: HashMap<String, PostgresConfig>,
    pub table_info: HashMap<String, TableInfo>,
}

/// A pattern of any one of the three variants, returned by `Patterns::pattern`.
pub enum PatternRef<'a> {
    File(&'a FilePattern),
    Table(&'a TablePattern),
    Sparql(&'a SparqlPattern),
}

impl Patterns {
    pub fn get_resource_type(&self, resource_name: &str) -> Option<ResourceType> {
        if self.file_patterns.contains_key(resource_name) {
            Some(ResourceType::File)
        } else if self.table_patterns.contains_key(resource_name) {
            Some(ResourceType::SqlTable)
        } else if self.sparql_patterns.contains_key(resource_name) {
            Some(ResourceType::Sparql)
        } else {
            None
        }
    }

    pub fn pattern(&self, resource_name: &str) -> Option<PatternRef<'_>> {
        if let Some(p) = self.file_patterns.get(resource_name) {
            return Some(PatternRef::File(p));
        }
        if let Some(p) = self.table_patterns.get(resource_name) {
            return Some(PatternRef::Table(p));
        }
        if let Some(p) = self.sparql_patterns.get(resource_name) {
            return Some(PatternRef::Sparql(p));
        }
        None
    }

    pub fn get_table_info(&self, resource_name: &str) -> Option<&TableInfo> {
        self.table_info.get(resource_name)
    }

    pub fn get_postgres_config(&self, resource_name: &str) -> Option<&PostgresConfig> {
        let info = self.get_table_info(resource_name)?;
        self.postgres_configs.get(&info.connection_key)
    }

    /// Parses either serialization surface described in spec §6.
    pub fn from_json(v: &serde_json::Value) -> Result<Self, GrafloError> {
        let obj = v
            .as_object()
            .ok_or_else(|| GrafloError::Config("patterns document must be an object".into()))?;

        let mut patterns = Patterns::default();

        if let Some(legacy) = obj.get("patterns").and_then(|v| v.as_object()) {
            for (name, entry) in legacy {
                let entry_obj = entry
                    .as_object()
                    .ok_or_else(|| GrafloError::Config(format!("pattern '{name}' is not an object")))?;
                let tag = entry_obj
                    .get("__tag__")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| GrafloError::Config(format!("pattern '{name}' missing __tag__")))?;
                let mut stripped = entry_obj.clone();
                stripped.remove("__tag__");
                let stripped_value = serde_json::Value::Object(stripped);
                match tag {
                    "file" => {
                        let fp: FilePattern = serde_json::from_value(stripped_value)
                            .map_err(|e| GrafloError::Config(e.to_string()))?;
                        patterns.file_patterns.insert(name.clone(), fp);
                    }
                    "table" => {
                        let tp: TablePattern = serde_json::from_value(stripped_value)
                            .map_err(|e| GrafloError::Config(e.to_string()))?;
                        patterns.table_patterns.insert(name.clone(), tp);
                    }
                    "sparql" => {
                        let sp: SparqlPattern = serde_json::from_value(stripped_value)
                            .map_err(|e| GrafloError::Config(e.to_string()))?;
                        patterns.sparql_patterns.insert(name.clone(), sp);
                    }
                    other => {
                        return Err(GrafloError::Config(format!(
                            "pattern '{name}' has unknown __tag__ '{other}'"
                        )))
                    }
                }
            }
            return Ok(patterns);
        }

        if let Some(files) = obj.get("file_patterns").and_then(|v| v.as_object()) {
            for (name, entry) in files {
                let fp: FilePattern = serde_json::from_value(entry.clone())
                    .map_err(|e| GrafloError::Config(e.to_string()))?;
                patterns.file_patterns.insert(name.clone(), fp);
            }
        }
        if let Some(tables) = obj.get("table_patterns").and_then(|v| v.as_object()) {
            for (name, entry) in tables {
                let tp: TablePattern = serde_json::from_value(entry.clone())
                    .map_err(|e| GrafloError::Config(e.to_string()))?;
                patterns.table_patterns.insert(name.clone(), tp);
            }
        }
        if let Some(sparqls) = obj.get("sparql_patterns").and_then(|v| v.as_object()) {
            for (name, entry) in sparqls {
                let sp: SparqlPattern = serde_json::from_value(entry.clone())
                    .map_err(|e| GrafloError::Config(e.to_string()))?;
                patterns.sparql_patterns.insert(name.clone(), sp);
            }
        }

        Ok(patterns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_query_trivial_case_is_verbatim() {
        let pattern = TablePattern {
            table_name: "purchases".to_string(),
            ..Default::default()
        };
        assert_eq!(pattern.build_query("public"), "SELECT * FROM \"public\".\"purchases\"");
    }

    #[test]
    fn table_pattern_matches_exact_and_regex() {
        let exact = TablePattern {
            table_name: "users".to_string(),
            ..Default::default()
        };
        assert!(exact.matches("users"));
        assert!(!exact.matches("users2"));

        let regex = TablePattern {
            table_name: "^user_.*$".to_string(),
            ..Default::default()
        };
        assert!(regex.matches("user_accounts"));
        assert!(!regex.matches("accounts"));
    }

    #[test]
    fn file_pattern_matches_requires_regex() {
        let no_regex = FilePattern::default();
        assert!(!no_regex.matches("anything.csv"));

        let with_regex = FilePattern {
            regex: Some(r"^orders_\d+\.csv$".to_string()),
            ..Default::default()
        };
        assert!(with_regex.matches("orders_2020.csv"));
        assert!(!with_regex.matches("orders.csv"));
    }

    #[test]
    fn legacy_tagged_format_parses() {
        let json = serde_json::json!({
            "patterns": {
                "servers": {"__tag__": "table", "table_name": "servers"},
                "logs": {"__tag__": "file", "regex": "^log_.*\\.csv$"}
            }
        });
        let patterns = Patterns::from_json(&json).unwrap();
        assert!(patterns.table_patterns.contains_key("servers"));
        assert!(patterns.file_patterns.contains_key("logs"));
    }

    #[test]
    fn split_format_parses() {
        let json = serde_json::json!({
            "table_patterns": {"servers": {"table_name": "servers"}},
            "file_patterns": {"logs": {"regex": "^log_.*\\.csv$"}}
        });
        let patterns = Patterns::from_json(&json).unwrap();
        assert!(patterns.table_patterns.contains_key("servers"));
        assert!(patterns.file_patterns.contains_key("logs"));
    }
}
