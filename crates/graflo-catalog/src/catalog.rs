//! Relational catalog reader (C2): queries a Postgres source's system catalog for tables,
//! columns, primary keys, and foreign keys, preferring the standards catalog
//! (`information_schema`) with a fallback to the engine-native catalog (`pg_catalog`).

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// A column's name and best-effort normalized type name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
}

/// One row of a (possibly multi-column) foreign key, ordered by position within its
/// constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKeyEdge {
    pub column: String,
    pub references_table: String,
    pub references_column: String,
    pub constraint_name: String,
}

/// Everything the schema inferrer needs to know about one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCatalog {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKeyEdge>,
}

/// Folds a length-parameterized type name to its base and remaps a small alias table, e.g.
/// `varchar(255)` → `varchar`, `integer` → `int4`.
pub fn normalize_type(raw: &str) -> String {
    let base = raw.split('(').next().unwrap_or(raw).trim().to_lowercase();
    match base.as_str() {
        "integer" => "int4",
        "bigint" => "int8",
        "smallint" => "int2",
        "character varying" => "varchar",
        "character" => "char",
        "double precision" => "float8",
        "real" => "float4",
        other => return other.to_string(),
    }
    .to_string()
}

/// Reads a Postgres database's catalog for one schema namespace, preferring
/// `information_schema` and falling back to `pg_catalog` when the standards catalog looks
/// unreliable.
pub struct CatalogReader {
    pool: PgPool,
    schema: String,
}

impl CatalogReader {
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        Self {
            pool,
            schema: schema.into(),
        }
    }

    pub fn with_default_schema(pool: PgPool) -> Self {
        Self::new(pool, "public")
    }

    pub async fn list_tables(&self) -> anyhow::Result<Vec<String>> {
        match self.list_tables_standard().await {
            Ok(tables) if !tables.is_empty() => Ok(tables),
            standard_result => {
                if self.standards_catalog_reliable().await {
                    standard_result
                } else {
                    tracing::warn!(
                        schema = %self.schema,
                        "information_schema looked unreliable, falling back to pg_catalog"
                    );
                    self.list_tables_native().await
                }
            }
        }
    }

    pub async fn read_table(&self, table: &str) -> anyhow::Result<TableCatalog> {
        let columns = self.read_columns(table).await?;
        let primary_key = self.read_primary_key(table).await?;
        let foreign_keys = self.read_foreign_keys(table).await?;
        Ok(TableCatalog {
            name: table.to_string(),
            columns,
            primary_key,
            foreign_keys,
        })
    }

    pub async fn read_all(&self) -> anyhow::Result<Vec<TableCatalog>> {
        let mut out = Vec::new();
        for table in self.list_tables().await? {
            out.push(self.read_table(&table).await?);
        }
        Ok(out)
    }

    /// A cheap query against the standards catalog used only to decide whether an empty
    /// result from `list_tables_standard` means "this schema has no tables" or
    /// "information_schema is not reliable here".
    async fn standards_catalog_reliable(&self) -> bool {
        sqlx::query_scalar::<_, i64>("SELECT count(*) FROM information_schema.schemata WHERE schema_name = $1")
            .bind(&self.schema)
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }

    async fn list_tables_standard(&self) -> anyhow::Result<Vec<String>> {
        let rows: Vec<String> = sqlx::query_scalar(
            "SELECT table_name FROM information_schema.tables WHERE table_schema = $1 AND table_type = 'BASE TABLE' ORDER BY table_name",
        )
        .bind(&self.schema)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_tables_native(&self) -> anyhow::Result<Vec<String>> {
        let rows: Vec<String> = sqlx::query_scalar(
            "SELECT c.relname FROM pg_catalog.pg_class c \
             JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
             WHERE n.nspname = $1 AND c.relkind = 'r' ORDER BY c.relname",
        )
        .bind(&self.schema)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn read_columns(&self, table: &str) -> anyhow::Result<Vec<ColumnInfo>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT column_name, data_type FROM information_schema.columns \
             WHERE table_schema = $1 AND table_name = $2 ORDER BY ordinal_position",
        )
        .bind(&self.schema)
        .bind(table)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(name, data_type)| ColumnInfo {
                name,
                data_type: normalize_type(&data_type),
            })
            .collect())
    }

    async fn read_primary_key(&self, table: &str) -> anyhow::Result<Vec<String>> {
        let rows: Vec<String> = sqlx::query_scalar(
            "SELECT kcu.column_name \
             FROM information_schema.table_constraints tc \
             JOIN information_schema.key_column_usage kcu \
               ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema \
             WHERE tc.table_schema = $1 AND tc.table_name = $2 AND tc.constraint_type = 'PRIMARY KEY' \
             ORDER BY kcu.ordinal_position",
        )
        .bind(&self.schema)
        .bind(table)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn read_foreign_keys(&self, table: &str) -> anyhow::Result<Vec<ForeignKeyEdge>> {
        let rows: Vec<(String, String, String, String)> = sqlx::query_as(
            "SELECT kcu.column_name, ccu.table_name AS references_table, \
                    ccu.column_name AS references_column, tc.constraint_name \
             FROM information_schema.table_constraints tc \
             JOIN information_schema.key_column_usage kcu \
               ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema \
             JOIN information_schema.constraint_column_usage ccu \
               ON tc.constraint_name = ccu.constraint_name AND tc.table_schema = ccu.table_schema \
             WHERE tc.table_schema = $1 AND tc.table_name = $2 AND tc.constraint_type = 'FOREIGN KEY' \
             ORDER BY tc.constraint_name, kcu.ordinal_position",
        )
        .bind(&self.schema)
        .bind(table)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(column, references_table, references_column, constraint_name)| ForeignKeyEdge {
                column,
                references_table,
                references_column,
                constraint_name,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_length_parameterized_and_aliased_types() {
        assert_eq!(normalize_type("varchar(255)"), "varchar");
        assert_eq!(normalize_type("integer"), "int4");
        assert_eq!(normalize_type("BIGINT"), "int8");
        assert_eq!(normalize_type("character varying"), "varchar");
        assert_eq!(normalize_type("double precision"), "float8");
        assert_eq!(normalize_type("text"), "text");
    }
}
